//! Headless [`RenderApi`] that records every call.
//!
//! Identifiers are handed out from a single counter starting at 1 so the
//! order of creation can be read straight off the ids. Compilation, linking
//! and uniform resolution can be made to fail on demand.

use std::collections::{HashMap, HashSet};

use super::{
    BufferId, Capability, Primitive, ProgramId, RenderApi, Sampling, ShaderId, ShaderStage,
    TextureData, TextureFace, TextureId, TextureTarget, UniformValue, VertexArrayId,
};

/// One recorded call. Bulk data is summarised by its length.
#[derive(Clone, Debug, PartialEq)]
pub enum GpuCall {
    CreateVertexArray(VertexArrayId),
    BindVertexArray(Option<VertexArrayId>),
    CreateBuffer(BufferId),
    UploadIndices { buffer: BufferId, count: usize },
    UploadAttribute { buffer: BufferId, slot: u32, components: u32, len: usize },
    EnableAttribute(u32),
    DisableAttribute(u32),
    CreateTexture(TextureId, TextureTarget),
    UploadTexture { texture: TextureId, face: TextureFace, width: u32, height: u32 },
    SetSampling(TextureId, Sampling),
    BindTexture { unit: u32, texture: TextureId },
    UnbindTexture(u32),
    CompileShader(ShaderStage, Option<ShaderId>),
    CreateProgram(ProgramId),
    BindAttributeLocation { program: ProgramId, slot: u32, name: String },
    LinkProgram(ProgramId, bool),
    UniformLocation { program: ProgramId, name: String, location: i32 },
    UseProgram(Option<ProgramId>),
    LoadUniform { location: i32, value: UniformValue },
    SetCapability(Capability, bool),
    Clear([f32; 4]),
    DrawElements { primitive: Primitive, count: u32 },
    DrawArrays { primitive: Primitive, first: u32, count: u32 },
    DeleteVertexArray(VertexArrayId),
    DeleteBuffer(BufferId),
    DeleteTexture(TextureId),
    DeleteShader(ShaderId),
    DeleteProgram(ProgramId),
}

#[derive(Debug, Default)]
pub struct RecordingApi {
    calls: Vec<GpuCall>,
    next_id: u32,
    failing_stages: HashSet<ShaderStage>,
    failing_link: bool,
    missing_uniforms: HashSet<String>,
    uniform_locations: HashMap<(ProgramId, String), i32>,
    current_vao: Option<VertexArrayId>,
    current_program: Option<ProgramId>,
}

impl RecordingApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every compilation of `stage` fail.
    pub fn with_failing_stage(mut self, stage: ShaderStage) -> Self {
        self.failing_stages.insert(stage);
        self
    }

    pub fn with_failing_link(mut self) -> Self {
        self.failing_link = true;
        self
    }

    /// Makes the named uniform unresolvable in every program.
    pub fn with_missing_uniform(mut self, name: &str) -> Self {
        self.missing_uniforms.insert(name.to_string());
        self
    }

    pub fn calls(&self) -> &[GpuCall] {
        &self.calls
    }

    /// Forgets every recorded call, keeping ids and bindings.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn current_vertex_array(&self) -> Option<VertexArrayId> {
        self.current_vao
    }

    pub fn current_program(&self) -> Option<ProgramId> {
        self.current_program
    }

    fn next(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

impl RenderApi for RecordingApi {
    fn create_vertex_array(&mut self) -> VertexArrayId {
        let id = VertexArrayId(self.next());
        self.calls.push(GpuCall::CreateVertexArray(id));
        id
    }

    fn bind_vertex_array(&mut self, vao: Option<VertexArrayId>) {
        self.current_vao = vao;
        self.calls.push(GpuCall::BindVertexArray(vao));
    }

    fn create_buffer(&mut self) -> BufferId {
        let id = BufferId(self.next());
        self.calls.push(GpuCall::CreateBuffer(id));
        id
    }

    fn upload_indices(&mut self, buffer: BufferId, indices: &[u32]) {
        self.calls.push(GpuCall::UploadIndices {
            buffer,
            count: indices.len(),
        });
    }

    fn upload_attribute(&mut self, buffer: BufferId, slot: u32, components: u32, data: &[f32]) {
        self.calls.push(GpuCall::UploadAttribute {
            buffer,
            slot,
            components,
            len: data.len(),
        });
    }

    fn enable_attribute(&mut self, slot: u32) {
        self.calls.push(GpuCall::EnableAttribute(slot));
    }

    fn disable_attribute(&mut self, slot: u32) {
        self.calls.push(GpuCall::DisableAttribute(slot));
    }

    fn create_texture(&mut self, target: TextureTarget) -> TextureId {
        let id = TextureId(self.next());
        self.calls.push(GpuCall::CreateTexture(id, target));
        id
    }

    fn upload_texture(&mut self, texture: TextureId, face: TextureFace, image: &TextureData) {
        self.calls.push(GpuCall::UploadTexture {
            texture,
            face,
            width: image.width(),
            height: image.height(),
        });
    }

    fn set_sampling(&mut self, texture: TextureId, sampling: Sampling) {
        self.calls.push(GpuCall::SetSampling(texture, sampling));
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureId) {
        self.calls.push(GpuCall::BindTexture { unit, texture });
    }

    fn unbind_texture(&mut self, unit: u32) {
        self.calls.push(GpuCall::UnbindTexture(unit));
    }

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Option<ShaderId> {
        let id = if self.failing_stages.contains(&stage) || source.trim().is_empty() {
            None
        } else {
            Some(ShaderId(self.next()))
        };
        self.calls.push(GpuCall::CompileShader(stage, id));
        id
    }

    fn create_program(&mut self, _vertex: ShaderId, _fragment: ShaderId) -> Option<ProgramId> {
        let id = ProgramId(self.next());
        self.calls.push(GpuCall::CreateProgram(id));
        Some(id)
    }

    fn bind_attribute_location(&mut self, program: ProgramId, slot: u32, name: &str) {
        self.calls.push(GpuCall::BindAttributeLocation {
            program,
            slot,
            name: name.to_string(),
        });
    }

    fn link_program(&mut self, program: ProgramId) -> bool {
        let linked = !self.failing_link;
        self.calls.push(GpuCall::LinkProgram(program, linked));
        linked
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> i32 {
        let location = if self.missing_uniforms.contains(name) {
            -1
        } else {
            let next = self
                .uniform_locations
                .keys()
                .filter(|(p, _)| *p == program)
                .count() as i32;
            *self
                .uniform_locations
                .entry((program, name.to_string()))
                .or_insert(next)
        };
        self.calls.push(GpuCall::UniformLocation {
            program,
            name: name.to_string(),
            location,
        });
        location
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        self.current_program = program;
        self.calls.push(GpuCall::UseProgram(program));
    }

    fn load_uniform(&mut self, location: i32, value: UniformValue) {
        self.calls.push(GpuCall::LoadUniform { location, value });
    }

    fn set_capability(&mut self, capability: Capability, enabled: bool) {
        self.calls.push(GpuCall::SetCapability(capability, enabled));
    }

    fn clear(&mut self, colour: [f32; 4]) {
        self.calls.push(GpuCall::Clear(colour));
    }

    fn draw_elements(&mut self, primitive: Primitive, count: u32) {
        self.calls.push(GpuCall::DrawElements { primitive, count });
    }

    fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32) {
        self.calls.push(GpuCall::DrawArrays {
            primitive,
            first,
            count,
        });
    }

    fn delete_vertex_array(&mut self, vao: VertexArrayId) {
        self.calls.push(GpuCall::DeleteVertexArray(vao));
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        self.calls.push(GpuCall::DeleteBuffer(buffer));
    }

    fn delete_texture(&mut self, texture: TextureId) {
        self.calls.push(GpuCall::DeleteTexture(texture));
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        self.calls.push(GpuCall::DeleteShader(shader));
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.calls.push(GpuCall::DeleteProgram(program));
    }
}
