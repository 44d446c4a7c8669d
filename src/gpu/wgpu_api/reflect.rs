//! WGSL reflection for the wgpu backend.
//!
//! The GL-style command model needs three things from a shader module that
//! WGSL only expresses structurally: the byte offset of each named uniform
//! (which becomes its "location"), the texture units the fragment stage
//! samples, and the vertex inputs with their component counts. All of them
//! are read from the naga IR after the module has been validated.

use std::collections::HashMap;

use naga::{
    AddressSpace, Binding, ImageDimension, Module, ResourceBinding, TypeInner,
    valid::{Capabilities, ValidationFlags, Validator},
};

use crate::gpu::ShaderStage;

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Bind group holding the uniform block at binding 0.
pub const UNIFORM_GROUP: u32 = 0;
/// Bind group holding texture unit `k` at binding `2k` and its sampler at `2k + 1`.
pub const TEXTURE_GROUP: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum ReflectError {
    #[error("failed to parse WGSL:\n{0}")]
    Parse(String),
    #[error("invalid WGSL module: {0}")]
    Validation(String),
    #[error("entry point `{0}` not found")]
    MissingEntryPoint(&'static str),
    #[error("uniform block must be a struct")]
    UniformNotStruct,
    #[error("vertex input `{0}` must be a float scalar or vector")]
    UnsupportedVertexInput(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformMember {
    pub offset: u32,
    pub size: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UniformBlock {
    pub size: u32,
    pub members: HashMap<String, UniformMember>,
}

impl UniformBlock {
    pub fn member_at(&self, offset: u32) -> Option<UniformMember> {
        self.members.values().copied().find(|m| m.offset == offset)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SampledKind {
    D2,
    Cube,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VertexInput {
    pub name: String,
    pub location: u32,
    pub components: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModuleReflection {
    pub uniforms: Option<UniformBlock>,
    /// Sorted by unit.
    pub texture_units: Vec<(u32, SampledKind)>,
    /// Empty for fragment modules.
    pub vertex_inputs: Vec<VertexInput>,
}

pub fn reflect(source: &str, stage: ShaderStage) -> Result<ModuleReflection, ReflectError> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| ReflectError::Parse(e.emit_to_string(source)))?;
    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|e| ReflectError::Validation(e.to_string()))?;

    let (entry, naga_stage) = match stage {
        ShaderStage::Vertex => (VERTEX_ENTRY, naga::ShaderStage::Vertex),
        ShaderStage::Fragment => (FRAGMENT_ENTRY, naga::ShaderStage::Fragment),
    };
    let entry_point = module
        .entry_points
        .iter()
        .find(|ep| ep.name == entry && ep.stage == naga_stage)
        .ok_or(ReflectError::MissingEntryPoint(entry))?;

    let mut reflection = ModuleReflection {
        uniforms: uniform_block(&module)?,
        texture_units: texture_units(&module),
        vertex_inputs: Vec::new(),
    };
    if stage == ShaderStage::Vertex {
        for argument in &entry_point.function.arguments {
            let name = argument.name.clone().unwrap_or_default();
            match &module.types[argument.ty].inner {
                TypeInner::Struct { members, .. } => {
                    for member in members {
                        let name = member.name.clone().unwrap_or_default();
                        if let Some(input) =
                            vertex_input(&module, name, member.ty, &member.binding)?
                        {
                            reflection.vertex_inputs.push(input);
                        }
                    }
                }
                _ => {
                    if let Some(input) =
                        vertex_input(&module, name, argument.ty, &argument.binding)?
                    {
                        reflection.vertex_inputs.push(input);
                    }
                }
            }
        }
        reflection.vertex_inputs.sort_by_key(|input| input.location);
    }
    Ok(reflection)
}

fn uniform_block(module: &Module) -> Result<Option<UniformBlock>, ReflectError> {
    let target = ResourceBinding {
        group: UNIFORM_GROUP,
        binding: 0,
    };
    let Some((_, var)) = module
        .global_variables
        .iter()
        .find(|(_, var)| {
            var.space == AddressSpace::Uniform && var.binding.as_ref() == Some(&target)
        })
    else {
        return Ok(None);
    };
    let TypeInner::Struct { members, span } = &module.types[var.ty].inner else {
        return Err(ReflectError::UniformNotStruct);
    };
    let members = members
        .iter()
        .filter_map(|member| {
            let name = member.name.clone()?;
            let size = module.types[member.ty].inner.size(module.to_ctx());
            Some((
                name,
                UniformMember {
                    offset: member.offset,
                    size,
                },
            ))
        })
        .collect();
    Ok(Some(UniformBlock {
        size: *span,
        members,
    }))
}

fn texture_units(module: &Module) -> Vec<(u32, SampledKind)> {
    let mut units: Vec<(u32, SampledKind)> = module
        .global_variables
        .iter()
        .filter_map(|(_, var)| {
            let binding = var.binding.as_ref()?;
            if binding.group != TEXTURE_GROUP || binding.binding % 2 != 0 {
                return None;
            }
            match module.types[var.ty].inner {
                TypeInner::Image {
                    dim: ImageDimension::Cube,
                    ..
                } => Some((binding.binding / 2, SampledKind::Cube)),
                TypeInner::Image { .. } => Some((binding.binding / 2, SampledKind::D2)),
                _ => None,
            }
        })
        .collect();
    units.sort();
    units
}

fn vertex_input(
    module: &Module,
    name: String,
    ty: naga::Handle<naga::Type>,
    binding: &Option<Binding>,
) -> Result<Option<VertexInput>, ReflectError> {
    let Some(Binding::Location { location, .. }) = binding else {
        return Ok(None);
    };
    let components = match module.types[ty].inner {
        TypeInner::Scalar(scalar) if scalar.kind == naga::ScalarKind::Float => 1,
        TypeInner::Vector { size, scalar } if scalar.kind == naga::ScalarKind::Float => size as u32,
        _ => return Err(ReflectError::UnsupportedVertexInput(name)),
    };
    Ok(Some(VertexInput {
        name,
        location: *location,
        components,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = r#"
struct Uniforms {
    transformationMatrix: mat4x4<f32>,
    tint: vec3<f32>,
    weight: f32,
};
@group(0) @binding(0) var<uniform> u: Uniforms;
@group(1) @binding(0) var guiTexture: texture_2d<f32>;
@group(1) @binding(1) var guiSampler: sampler;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@location(0) position: vec2<f32>) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = u.transformationMatrix * vec4<f32>(position, 0.0, 1.0);
    out.uv = position;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(guiTexture, guiSampler, in.uv) * u.weight;
}
"#;

    #[test]
    fn reflects_uniform_offsets() {
        let reflection = reflect(QUAD, ShaderStage::Vertex).unwrap();
        let block = reflection.uniforms.unwrap();
        assert_eq!(block.members["transformationMatrix"], UniformMember { offset: 0, size: 64 });
        assert_eq!(block.members["tint"], UniformMember { offset: 64, size: 12 });
        // a scalar packs into the tail of the preceding vec3
        assert_eq!(block.members["weight"].offset, 76);
        assert_eq!(block.size, 80);
    }

    #[test]
    fn reflects_inputs_and_units() {
        let reflection = reflect(QUAD, ShaderStage::Vertex).unwrap();
        assert_eq!(
            reflection.vertex_inputs,
            vec![VertexInput {
                name: "position".into(),
                location: 0,
                components: 2
            }]
        );
        assert_eq!(reflection.texture_units, vec![(0, SampledKind::D2)]);
    }

    #[test]
    fn rejects_broken_source() {
        assert!(matches!(
            reflect("fn vs_main( {", ShaderStage::Vertex),
            Err(ReflectError::Parse(_))
        ));
    }

    #[test]
    fn requires_entry_point_for_stage() {
        assert!(matches!(
            reflect(QUAD.replace("fs_main", "main").as_str(), ShaderStage::Fragment),
            Err(ReflectError::MissingEntryPoint(FRAGMENT_ENTRY))
        ));
    }
}
