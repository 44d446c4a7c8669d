//! GPU-resident models and the shading data attached to them.

use crate::gpu::{TextureId, VertexArrayId};

/// A vertex array on the GPU and how many vertices (or indices) to draw from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawModel {
    pub vao: VertexArrayId,
    pub vertex_count: u32,
    /// Whether `vertex_count` counts indices of an index buffer.
    pub indexed: bool,
}

/// Surface colour of a model: a texture, a flat colour, or a blend of both.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub texture: Option<TextureId>,
    /// `1.0` samples the texture, `0.0` uses `diffuse_colour`.
    pub texture_weight: f32,
    pub diffuse_colour: [f32; 4],
}

impl Material {
    pub const DEFAULT_COLOUR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

    pub fn textured(texture: TextureId) -> Self {
        Self {
            texture: Some(texture),
            texture_weight: 1.0,
            diffuse_colour: Self::DEFAULT_COLOUR,
        }
    }

    pub fn coloured(diffuse_colour: [f32; 4]) -> Self {
        Self {
            texture: None,
            texture_weight: 0.0,
            diffuse_colour,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::coloured(Self::DEFAULT_COLOUR)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TexturedModel {
    pub raw_model: RawModel,
    pub material: Material,
    pub shine_damper: f32,
    pub reflectivity: f32,
    /// Drawn without back-face culling.
    pub has_transparency: bool,
    /// Lit as if every normal pointed straight up (grass, ferns).
    pub normals_pointing_up: bool,
}

impl TexturedModel {
    pub fn new(raw_model: RawModel, material: Material) -> Self {
        Self {
            raw_model,
            material,
            shine_damper: 1.0,
            reflectivity: 0.0,
            has_transparency: false,
            normals_pointing_up: false,
        }
    }

    pub fn with_shine(mut self, shine_damper: f32, reflectivity: f32) -> Self {
        self.shine_damper = shine_damper;
        self.reflectivity = reflectivity;
        self
    }

    pub fn with_transparency(mut self, has_transparency: bool) -> Self {
        self.has_transparency = has_transparency;
        self
    }

    pub fn with_normals_pointing_up(mut self, normals_pointing_up: bool) -> Self {
        self.normals_pointing_up = normals_pointing_up;
        self
    }
}

/// A model definition shared by every entity placed from it.
///
/// A model file with several groups yields several textured models. The id
/// is the key entities are batched by.
#[derive(Clone, Debug, PartialEq)]
pub struct GenericEntity {
    pub id: String,
    pub models: Vec<TexturedModel>,
}

impl GenericEntity {
    pub fn new(id: impl Into<String>, models: Vec<TexturedModel>) -> Self {
        Self {
            id: id.into(),
            models,
        }
    }
}
