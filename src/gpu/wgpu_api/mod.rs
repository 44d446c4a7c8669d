//! [`RenderApi`] on top of wgpu.
//!
//! wgpu has no notion of a current program or of uniforms set one by one,
//! so this backend keeps the GL-like state on the CPU side:
//!
//! * every program owns a shadow copy of its uniform block; `load_uniform`
//!   writes into it at the reflected byte offset,
//! * every draw snapshots the shadow block into a per-frame arena together
//!   with the bound vertex array, textures and render flags,
//! * [`WgpuApi::end_frame`] uploads the arena once, builds (or reuses) the
//!   pipelines and replays all draws inside a single render pass.

pub mod pipeline;
pub mod reflect;
pub mod texture;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::num::NonZeroU64;
use std::ops::Range;

use wgpu::util::DeviceExt;

use crate::gpu::{
    BufferId, Capability, Primitive, ProgramId, RenderApi, Sampling, ShaderId, ShaderStage,
    TextureData, TextureFace, TextureId, TextureTarget, UniformValue, VertexArrayId,
};

use pipeline::{PipelineKey, RenderFlags, mk_render_pipeline};
use reflect::{ModuleReflection, SampledKind, UniformBlock, VertexInput};
use texture::{Texture, create_sampler};

#[derive(Clone, Copy, Debug)]
struct AttributeStream {
    buffer: BufferId,
    components: u32,
}

#[derive(Debug, Default)]
struct VertexArray {
    attributes: BTreeMap<u32, AttributeStream>,
    enabled: HashSet<u32>,
    index_buffer: Option<BufferId>,
}

#[derive(Debug)]
struct TextureEntry {
    kind: SampledKind,
    gpu: Option<Texture>,
    sampler: wgpu::Sampler,
}

#[derive(Debug)]
struct ShaderEntry {
    stage: ShaderStage,
    module: wgpu::ShaderModule,
    reflection: ModuleReflection,
}

#[derive(Debug)]
struct ProgramEntry {
    vertex_module: wgpu::ShaderModule,
    fragment_module: wgpu::ShaderModule,
    vertex: ModuleReflection,
    fragment: ModuleReflection,
    linked: Option<LinkedProgram>,
}

#[derive(Debug)]
struct LinkedProgram {
    uniforms: Option<UniformBlock>,
    texture_units: Vec<(u32, SampledKind)>,
    vertex_inputs: Vec<VertexInput>,
    uniform_data: Vec<u8>,
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
}

#[derive(Debug)]
struct DrawCommand {
    key: PipelineKey,
    vertex_buffers: Vec<BufferId>,
    index_buffer: Option<BufferId>,
    range: Range<u32>,
    uniform_offset: Option<u32>,
    textures: Vec<Option<TextureId>>,
}

#[derive(Debug, Default)]
struct FrameRecording {
    clear_colour: Option<[f32; 4]>,
    draws: Vec<DrawCommand>,
    uniform_bytes: Vec<u8>,
}

pub struct WgpuApi {
    device: wgpu::Device,
    queue: wgpu::Queue,
    color_format: wgpu::TextureFormat,
    depth_texture: Texture,
    uniform_alignment: u32,
    next_id: u32,
    buffers: HashMap<BufferId, Option<wgpu::Buffer>>,
    vertex_arrays: HashMap<VertexArrayId, VertexArray>,
    textures: HashMap<TextureId, TextureEntry>,
    shaders: HashMap<ShaderId, ShaderEntry>,
    programs: HashMap<ProgramId, ProgramEntry>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    blank_2d: Texture,
    blank_cube: Texture,
    blank_sampler: wgpu::Sampler,
    current_vao: Option<VertexArrayId>,
    current_program: Option<ProgramId>,
    units: HashMap<u32, TextureId>,
    flags: RenderFlags,
    frame: FrameRecording,
}

impl WgpuApi {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        color_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let depth_texture =
            Texture::create_depth_texture(&device, [width, height], "depth_texture");
        let blank_2d = Texture::create_blank(&device, &queue, SampledKind::D2);
        let blank_cube = Texture::create_blank(&device, &queue, SampledKind::Cube);
        let blank_sampler = create_sampler(&device, Sampling::default());
        let uniform_alignment = device.limits().min_uniform_buffer_offset_alignment;
        Self {
            device,
            queue,
            color_format,
            depth_texture,
            uniform_alignment,
            next_id: 0,
            buffers: HashMap::new(),
            vertex_arrays: HashMap::new(),
            textures: HashMap::new(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
            pipelines: HashMap::new(),
            blank_2d,
            blank_cube,
            blank_sampler,
            current_vao: None,
            current_program: None,
            units: HashMap::new(),
            flags: RenderFlags::default(),
            frame: FrameRecording::default(),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.depth_texture =
            Texture::create_depth_texture(&self.device, [width, height], "depth_texture");
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Number of draws recorded since the last [`end_frame`](Self::end_frame).
    pub fn pending_draws(&self) -> usize {
        self.frame.draws.len()
    }

    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn current_vertex_array(&mut self) -> Option<&mut VertexArray> {
        let vao = self.current_vao?;
        self.vertex_arrays.get_mut(&vao)
    }

    /// Snapshot the current state into a draw command. Undrawable state is logged and skipped.
    fn record_draw(&mut self, primitive: Primitive, range: Range<u32>, indexed: bool) {
        let Some(program_id) = self.current_program else {
            log::warn!("Draw call without a program in use, skipping");
            return;
        };
        let Some(program) = self.programs.get(&program_id).and_then(|p| p.linked.as_ref()) else {
            log::warn!("Draw call with unlinked program {:?}, skipping", program_id);
            return;
        };
        let Some(vao) = self.current_vao.and_then(|id| self.vertex_arrays.get(&id)) else {
            log::warn!("Draw call without a vertex array bound, skipping");
            return;
        };
        if indexed && vao.index_buffer.is_none() {
            log::warn!("Indexed draw on a vertex array without indices, skipping");
            return;
        }

        let mut vertex_streams = Vec::with_capacity(program.vertex_inputs.len());
        let mut vertex_buffers = Vec::with_capacity(program.vertex_inputs.len());
        for input in &program.vertex_inputs {
            match vao.attributes.get(&input.location) {
                Some(stream) if vao.enabled.contains(&input.location) => {
                    vertex_streams.push((input.location, stream.components));
                    vertex_buffers.push(stream.buffer);
                }
                _ => {
                    log::warn!(
                        "Attribute `{}` (slot {}) is missing or disabled, skipping draw",
                        input.name,
                        input.location
                    );
                    return;
                }
            }
        }

        let uniform_offset = program.uniforms.as_ref().map(|_| {
            let arena = &mut self.frame.uniform_bytes;
            let offset = arena.len() as u32;
            arena.extend_from_slice(&program.uniform_data);
            let aligned = arena.len().next_multiple_of(self.uniform_alignment as usize);
            arena.resize(aligned, 0);
            offset
        });
        let textures = program
            .texture_units
            .iter()
            .map(|(unit, _)| self.units.get(unit).copied())
            .collect();

        self.frame.draws.push(DrawCommand {
            key: PipelineKey {
                program: program_id,
                primitive,
                flags: self.flags,
                vertex_streams,
            },
            vertex_buffers,
            index_buffer: if indexed { vao.index_buffer } else { None },
            range,
            uniform_offset,
            textures,
        });
    }

    fn texture_view(
        &self,
        texture: Option<TextureId>,
        kind: SampledKind,
    ) -> (&wgpu::TextureView, &wgpu::Sampler) {
        let blank = match kind {
            SampledKind::D2 => &self.blank_2d,
            SampledKind::Cube => &self.blank_cube,
        };
        let fallback = (&blank.view, &self.blank_sampler);
        let Some(entry) = texture.and_then(|id| self.textures.get(&id)) else {
            return fallback;
        };
        match &entry.gpu {
            Some(gpu) if entry.kind == kind => (&gpu.view, &entry.sampler),
            Some(_) => {
                log::warn!("Texture {:?} bound to a unit of another kind", texture);
                fallback
            }
            None => fallback,
        }
    }

    /// Drops the draws recorded for a frame that cannot be presented.
    pub fn discard_frame(&mut self) {
        self.frame = FrameRecording::default();
    }

    /// Replay every draw recorded since the previous frame into `target`.
    pub fn end_frame(&mut self, target: &wgpu::TextureView) {
        let frame = std::mem::take(&mut self.frame);

        for draw in &frame.draws {
            if self.pipelines.contains_key(&draw.key) {
                continue;
            }
            let Some(program) = self.programs.get(&draw.key.program) else {
                continue;
            };
            let Some(linked) = program.linked.as_ref() else {
                continue;
            };
            let pipeline = mk_render_pipeline(
                &self.device,
                &linked.pipeline_layout,
                self.color_format,
                &program.vertex_module,
                &program.fragment_module,
                &draw.key,
            );
            self.pipelines.insert(draw.key.clone(), pipeline);
        }

        let uniform_buffer = (!frame.uniform_bytes.is_empty()).then(|| {
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Frame Uniform Buffer"),
                    contents: &frame.uniform_bytes,
                    usage: wgpu::BufferUsages::UNIFORM,
                })
        });

        let mut uniform_groups: HashMap<ProgramId, wgpu::BindGroup> = HashMap::new();
        let mut texture_groups: HashMap<(ProgramId, Vec<Option<TextureId>>), wgpu::BindGroup> =
            HashMap::new();
        for draw in &frame.draws {
            let Some(linked) = self
                .programs
                .get(&draw.key.program)
                .and_then(|p| p.linked.as_ref())
            else {
                continue;
            };
            if !uniform_groups.contains_key(&draw.key.program) {
                let entries: Vec<wgpu::BindGroupEntry> =
                    match (&linked.uniforms, &uniform_buffer) {
                        (Some(block), Some(buffer)) => vec![wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                                buffer,
                                offset: 0,
                                size: NonZeroU64::new(block.size as u64),
                            }),
                        }],
                        _ => Vec::new(),
                    };
                let group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    layout: &linked.uniform_layout,
                    entries: &entries,
                    label: Some("uniform_bind_group"),
                });
                uniform_groups.insert(draw.key.program, group);
            }
            let texture_key = (draw.key.program, draw.textures.clone());
            if !texture_groups.contains_key(&texture_key) {
                let mut entries = Vec::with_capacity(linked.texture_units.len() * 2);
                for (&(unit, kind), &texture) in linked.texture_units.iter().zip(&draw.textures) {
                    let (view, sampler) = self.texture_view(texture, kind);
                    entries.push(wgpu::BindGroupEntry {
                        binding: unit * 2,
                        resource: wgpu::BindingResource::TextureView(view),
                    });
                    entries.push(wgpu::BindGroupEntry {
                        binding: unit * 2 + 1,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    });
                }
                let group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    layout: &linked.texture_layout,
                    entries: &entries,
                    label: Some("texture_bind_group"),
                });
                texture_groups.insert(texture_key, group);
            }
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let load = match frame.clear_colour {
                Some([r, g, b, a]) => wgpu::LoadOp::Clear(wgpu::Color {
                    r: r as f64,
                    g: g as f64,
                    b: b as f64,
                    a: a as f64,
                }),
                None => wgpu::LoadOp::Load,
            };
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            for draw in &frame.draws {
                let (Some(pipeline), Some(uniform_group), Some(texture_group)) = (
                    self.pipelines.get(&draw.key),
                    uniform_groups.get(&draw.key.program),
                    texture_groups.get(&(draw.key.program, draw.textures.clone())),
                ) else {
                    continue;
                };
                let buffers: Option<Vec<&wgpu::Buffer>> = draw
                    .vertex_buffers
                    .iter()
                    .map(|id| self.buffers.get(id).and_then(Option::as_ref))
                    .collect();
                let Some(buffers) = buffers else {
                    log::warn!("Vertex buffer deleted before the frame was submitted");
                    continue;
                };

                render_pass.set_pipeline(pipeline);
                match draw.uniform_offset {
                    Some(offset) => render_pass.set_bind_group(0, uniform_group, &[offset]),
                    None => render_pass.set_bind_group(0, uniform_group, &[]),
                }
                render_pass.set_bind_group(1, texture_group, &[]);
                for (slot, buffer) in buffers.into_iter().enumerate() {
                    render_pass.set_vertex_buffer(slot as u32, buffer.slice(..));
                }
                match draw
                    .index_buffer
                    .and_then(|id| self.buffers.get(&id).and_then(Option::as_ref))
                {
                    Some(indices) => {
                        render_pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                        render_pass.draw_indexed(draw.range.clone(), 0, 0..1);
                    }
                    None => render_pass.draw(draw.range.clone(), 0..1),
                }
            }
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn link(&self, program: &ProgramEntry) -> Result<LinkedProgram, String> {
        let uniforms = match (&program.vertex.uniforms, &program.fragment.uniforms) {
            (Some(v), Some(f)) if v != f => {
                return Err("vertex and fragment stages declare different uniform blocks".into());
            }
            (Some(block), _) | (None, Some(block)) => Some(block.clone()),
            (None, None) => None,
        };
        let mut texture_units = program.vertex.texture_units.clone();
        for unit in &program.fragment.texture_units {
            match texture_units.iter().find(|(u, _)| *u == unit.0) {
                Some(existing) if existing.1 != unit.1 => {
                    return Err(format!("texture unit {} declared with two kinds", unit.0));
                }
                Some(_) => {}
                None => texture_units.push(*unit),
            }
        }
        texture_units.sort();

        let visibility = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;
        let uniform_entries: Vec<wgpu::BindGroupLayoutEntry> = uniforms
            .iter()
            .map(|block| wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(block.size as u64),
                },
                count: None,
            })
            .collect();
        let uniform_layout = self
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &uniform_entries,
                label: Some("uniform_bind_group_layout"),
            });

        let texture_entries: Vec<wgpu::BindGroupLayoutEntry> = texture_units
            .iter()
            .flat_map(|&(unit, kind)| {
                [
                    wgpu::BindGroupLayoutEntry {
                        binding: unit * 2,
                        visibility,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: match kind {
                                SampledKind::D2 => wgpu::TextureViewDimension::D2,
                                SampledKind::Cube => wgpu::TextureViewDimension::Cube,
                            },
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: unit * 2 + 1,
                        visibility,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ]
            })
            .collect();
        let texture_layout = self
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &texture_entries,
                label: Some("texture_bind_group_layout"),
            });

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Render Pipeline Layout"),
                bind_group_layouts: &[Some(&uniform_layout), Some(&texture_layout)],
                immediate_size: 0,
            });

        Ok(LinkedProgram {
            uniform_data: vec![0; uniforms.as_ref().map_or(0, |b| b.size as usize)],
            uniforms,
            texture_units,
            vertex_inputs: program.vertex.vertex_inputs.clone(),
            uniform_layout,
            texture_layout,
            pipeline_layout,
        })
    }
}

impl RenderApi for WgpuApi {
    fn create_vertex_array(&mut self) -> VertexArrayId {
        let id = VertexArrayId(self.next());
        self.vertex_arrays.insert(id, VertexArray::default());
        id
    }

    fn bind_vertex_array(&mut self, vao: Option<VertexArrayId>) {
        self.current_vao = vao;
    }

    fn create_buffer(&mut self) -> BufferId {
        let id = BufferId(self.next());
        self.buffers.insert(id, None);
        id
    }

    fn upload_indices(&mut self, buffer: BufferId, indices: &[u32]) {
        let gpu = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        self.buffers.insert(buffer, Some(gpu));
        match self.current_vertex_array() {
            Some(vao) => vao.index_buffer = Some(buffer),
            None => log::warn!("Index buffer {:?} uploaded without a vertex array bound", buffer),
        }
    }

    fn upload_attribute(&mut self, buffer: BufferId, slot: u32, components: u32, data: &[f32]) {
        let gpu = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::VERTEX,
            });
        self.buffers.insert(buffer, Some(gpu));
        match self.current_vertex_array() {
            Some(vao) => {
                vao.attributes
                    .insert(slot, AttributeStream { buffer, components });
            }
            None => log::warn!("Attribute {} uploaded without a vertex array bound", slot),
        }
    }

    fn enable_attribute(&mut self, slot: u32) {
        if let Some(vao) = self.current_vertex_array() {
            vao.enabled.insert(slot);
        }
    }

    fn disable_attribute(&mut self, slot: u32) {
        if let Some(vao) = self.current_vertex_array() {
            vao.enabled.remove(&slot);
        }
    }

    fn create_texture(&mut self, target: TextureTarget) -> TextureId {
        let id = TextureId(self.next());
        let kind = match target {
            TextureTarget::Texture2D => SampledKind::D2,
            TextureTarget::CubeMap => SampledKind::Cube,
        };
        self.textures.insert(
            id,
            TextureEntry {
                kind,
                gpu: None,
                sampler: create_sampler(&self.device, Sampling::default()),
            },
        );
        id
    }

    fn upload_texture(&mut self, texture: TextureId, face: TextureFace, image: &TextureData) {
        let Some(entry) = self.textures.get_mut(&texture) else {
            log::warn!("Upload to unknown texture {:?}", texture);
            return;
        };
        let expects_cube = entry.kind == SampledKind::Cube;
        if expects_cube == (face == TextureFace::Flat) {
            log::warn!("Face {:?} does not match texture {:?}", face, texture);
            return;
        }
        if expects_cube && image.width() != image.height() {
            log::warn!(
                "Cube face {:?} is {}x{}, faces must be square",
                face,
                image.width(),
                image.height()
            );
            return;
        }
        let allocate = match &entry.gpu {
            Some(gpu) if expects_cube => {
                if gpu.width() != image.width() || gpu.height() != image.height() {
                    log::warn!("Cube face {:?} differs in size from the first face", face);
                    return;
                }
                false
            }
            _ => true,
        };
        if allocate {
            entry.gpu = Some(Texture::allocate(
                &self.device,
                entry.kind,
                image.width(),
                image.height(),
                "texture",
            ));
        }
        if let Some(gpu) = &entry.gpu {
            gpu.write_image(&self.queue, face.layer(), image);
        }
    }

    fn set_sampling(&mut self, texture: TextureId, sampling: Sampling) {
        let sampler = create_sampler(&self.device, sampling);
        if let Some(entry) = self.textures.get_mut(&texture) {
            entry.sampler = sampler;
        }
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureId) {
        self.units.insert(unit, texture);
    }

    fn unbind_texture(&mut self, unit: u32) {
        self.units.remove(&unit);
    }

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Option<ShaderId> {
        let reflection = match reflect::reflect(source, stage) {
            Ok(reflection) => reflection,
            Err(e) => {
                log::error!("Could not compile {:?} shader: {}", stage, e);
                return None;
            }
        };
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(match stage {
                    ShaderStage::Vertex => "Vertex Shader",
                    ShaderStage::Fragment => "Fragment Shader",
                }),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
        let id = ShaderId(self.next());
        self.shaders.insert(
            id,
            ShaderEntry {
                stage,
                module,
                reflection,
            },
        );
        Some(id)
    }

    fn create_program(&mut self, vertex: ShaderId, fragment: ShaderId) -> Option<ProgramId> {
        let (Some(v), Some(f)) = (self.shaders.get(&vertex), self.shaders.get(&fragment)) else {
            log::error!("Program from unknown shaders {:?}/{:?}", vertex, fragment);
            return None;
        };
        if v.stage != ShaderStage::Vertex || f.stage != ShaderStage::Fragment {
            log::error!("Program needs one vertex and one fragment shader");
            return None;
        }
        let entry = ProgramEntry {
            vertex_module: v.module.clone(),
            fragment_module: f.module.clone(),
            vertex: v.reflection.clone(),
            fragment: f.reflection.clone(),
            linked: None,
        };
        let id = ProgramId(self.next());
        self.programs.insert(id, entry);
        Some(id)
    }

    fn bind_attribute_location(&mut self, program: ProgramId, slot: u32, name: &str) {
        // WGSL fixes locations in the source, so binding only checks they agree
        let Some(entry) = self.programs.get(&program) else {
            return;
        };
        match entry.vertex.vertex_inputs.iter().find(|i| i.name == name) {
            Some(input) if input.location != slot => log::warn!(
                "Attribute `{}` is declared at location {} but bound to slot {}",
                name,
                input.location,
                slot
            ),
            Some(_) => {}
            None => log::debug!("Attribute `{}` is not used by program {:?}", name, program),
        }
    }

    fn link_program(&mut self, program: ProgramId) -> bool {
        let Some(entry) = self.programs.get(&program) else {
            return false;
        };
        match self.link(entry) {
            Ok(linked) => {
                if let Some(entry) = self.programs.get_mut(&program) {
                    entry.linked = Some(linked);
                }
                true
            }
            Err(e) => {
                log::error!("Could not link program {:?}: {}", program, e);
                false
            }
        }
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> i32 {
        self.programs
            .get(&program)
            .and_then(|p| p.linked.as_ref())
            .and_then(|linked| linked.uniforms.as_ref())
            .and_then(|block| block.members.get(name))
            .map_or(-1, |member| member.offset as i32)
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        self.current_program = program;
    }

    fn load_uniform(&mut self, location: i32, value: UniformValue) {
        let Ok(offset) = u32::try_from(location) else {
            return;
        };
        let Some(linked) = self
            .current_program
            .and_then(|id| self.programs.get_mut(&id))
            .and_then(|p| p.linked.as_mut())
        else {
            log::warn!("Uniform loaded without a linked program in use");
            return;
        };
        let Some(member) = linked.uniforms.as_ref().and_then(|b| b.member_at(offset)) else {
            log::warn!("No uniform at location {}", location);
            return;
        };
        let bytes = value.to_bytes();
        if bytes.len() > member.size as usize {
            log::warn!(
                "Uniform value of {} bytes does not fit location {} ({} bytes)",
                bytes.len(),
                location,
                member.size
            );
            return;
        }
        let start = offset as usize;
        linked.uniform_data[start..start + bytes.len()].copy_from_slice(&bytes);
    }

    fn set_capability(&mut self, capability: Capability, enabled: bool) {
        match capability {
            Capability::DepthTest => self.flags.depth_test = enabled,
            Capability::CullBackFaces => self.flags.cull_back_faces = enabled,
            Capability::AlphaBlend => self.flags.alpha_blend = enabled,
        }
    }

    fn clear(&mut self, colour: [f32; 4]) {
        if !self.frame.draws.is_empty() {
            log::warn!("Clear after draws in the same frame, the earlier draws are kept");
        }
        self.frame.clear_colour = Some(colour);
    }

    fn draw_elements(&mut self, primitive: Primitive, count: u32) {
        self.record_draw(primitive, 0..count, true);
    }

    fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32) {
        self.record_draw(primitive, first..first + count, false);
    }

    fn delete_vertex_array(&mut self, vao: VertexArrayId) {
        self.vertex_arrays.remove(&vao);
        if self.current_vao == Some(vao) {
            self.current_vao = None;
        }
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(&buffer);
    }

    fn delete_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
        self.units.retain(|_, bound| *bound != texture);
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        self.shaders.remove(&shader);
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.programs.remove(&program);
        self.pipelines.retain(|key, _| key.program != program);
        if self.current_program == Some(program) {
            self.current_program = None;
        }
    }
}
