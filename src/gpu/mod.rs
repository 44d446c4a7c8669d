//! GL-style command interface used by the engine core.
//!
//! Everything above this module (the [`Loader`](crate::resources::Loader),
//! the shader managers, the renderers and [`MasterRender`](crate::render::MasterRender))
//! talks to the GPU exclusively through [`RenderApi`]. The trait mirrors the
//! small subset of a classic immediate-mode API the engine needs: vertex
//! arrays with numbered attribute slots, 2D and cube textures bound to units,
//! programs with named uniforms resolved to integer locations, a few render
//! state toggles and indexed/unindexed draws.
//!
//! Two implementations ship with the crate:
//!
//! * [`recording::RecordingApi`] keeps a log of every call and is used for
//!   headless runs and tests.
//! * [`wgpu_api::WgpuApi`] translates the calls into wgpu resources and replays
//!   the recorded draws inside a single render pass per frame.

pub mod recording;
pub mod wgpu_api;

macro_rules! gpu_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);
    };
}

gpu_id!(
    /// Handle of a vertex array (a set of attribute streams plus an optional index buffer).
    VertexArrayId
);
gpu_id!(
    /// Handle of a vertex or index buffer.
    BufferId
);
gpu_id!(
    /// Handle of a 2D or cube-map texture.
    TextureId
);
gpu_id!(
    /// Handle of a single compiled shader stage.
    ShaderId
);
gpu_id!(
    /// Handle of a program made from a vertex and a fragment stage.
    ProgramId
);

/// Attribute slots shared by the loader and every shader's vertex input layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeSlot {
    Position = 0,
    TextureCoords = 1,
    Normal = 2,
}

impl AttributeSlot {
    pub const fn index(self) -> u32 {
        self as u32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    Texture2D,
    CubeMap,
}

/// Destination of an image upload.
///
/// Cube faces are listed in the order the loader uploads them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureFace {
    Flat,
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl TextureFace {
    pub const CUBE: [TextureFace; 6] = [
        TextureFace::PositiveX,
        TextureFace::NegativeX,
        TextureFace::PositiveY,
        TextureFace::NegativeY,
        TextureFace::PositiveZ,
        TextureFace::NegativeZ,
    ];

    /// Array layer of the face inside a cube texture, `0` for flat textures.
    pub fn layer(self) -> u32 {
        match self {
            TextureFace::Flat | TextureFace::PositiveX => 0,
            TextureFace::NegativeX => 1,
            TextureFace::PositiveY => 2,
            TextureFace::NegativeY => 3,
            TextureFace::PositiveZ => 4,
            TextureFace::NegativeZ => 5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Filter {
    Nearest,
    Linear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Wrap {
    Repeat,
    ClampToEdge,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Sampling {
    pub min_filter: Filter,
    pub mag_filter: Filter,
    pub wrap: Wrap,
}

impl Sampling {
    /// Linear filtering, clamped at the edges. Used for every texture the loader creates.
    pub const LINEAR_CLAMP: Sampling = Sampling {
        min_filter: Filter::Linear,
        mag_filter: Filter::Linear,
        wrap: Wrap::ClampToEdge,
    };
}

impl Default for Sampling {
    fn default() -> Self {
        Self::LINEAR_CLAMP
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    DepthTest,
    CullBackFaces,
    /// Source-alpha / one-minus-source-alpha blending.
    AlphaBlend,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Triangles,
    TriangleStrip,
}

/// A typed value pushed into a uniform location.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    /// Column-major 4x4 matrix.
    Mat4([[f32; 4]; 4]),
}

impl UniformValue {
    /// Raw little-endian bytes of the value as laid out in a uniform block.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            UniformValue::Int(v) => v.to_le_bytes().to_vec(),
            UniformValue::Float(v) => v.to_le_bytes().to_vec(),
            UniformValue::Vec2(v) => bytemuck::cast_slice(v).to_vec(),
            UniformValue::Vec3(v) => bytemuck::cast_slice(v).to_vec(),
            UniformValue::Vec4(v) => bytemuck::cast_slice(v).to_vec(),
            UniformValue::Mat4(m) => bytemuck::cast_slice(m).to_vec(),
        }
    }
}

impl From<cgmath::Matrix4<f32>> for UniformValue {
    fn from(matrix: cgmath::Matrix4<f32>) -> Self {
        UniformValue::Mat4(matrix.into())
    }
}

/// RGBA8 pixels of a decoded image.
#[derive(Clone, Debug, PartialEq)]
pub struct TextureData {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl TextureData {
    /// Wraps a tightly packed RGBA8 buffer, checking that it matches the dimensions.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> anyhow::Result<Self> {
        let expected = width as usize * height as usize * 4;
        anyhow::ensure!(
            pixels.len() == expected,
            "texture of {}x{} needs {} bytes but {} were given",
            width,
            height,
            expected,
            pixels.len()
        );
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// The command set the engine core issues to the GPU.
///
/// The model is the one of a classic state machine: a current vertex array,
/// a current program and a set of texture units. Uploads and attribute
/// configuration act on the currently bound vertex array.
pub trait RenderApi {
    fn create_vertex_array(&mut self) -> VertexArrayId;
    /// Binds `vao` as the current vertex array, `None` unbinds.
    fn bind_vertex_array(&mut self, vao: Option<VertexArrayId>);
    fn create_buffer(&mut self) -> BufferId;
    /// Fills `buffer` with indices and attaches it to the current vertex array.
    fn upload_indices(&mut self, buffer: BufferId, indices: &[u32]);
    /// Fills `buffer` with floats and points attribute `slot` of the current
    /// vertex array at it, `components` floats per vertex, tightly packed.
    fn upload_attribute(&mut self, buffer: BufferId, slot: u32, components: u32, data: &[f32]);
    fn enable_attribute(&mut self, slot: u32);
    fn disable_attribute(&mut self, slot: u32);

    fn create_texture(&mut self, target: TextureTarget) -> TextureId;
    fn upload_texture(&mut self, texture: TextureId, face: TextureFace, image: &TextureData);
    fn set_sampling(&mut self, texture: TextureId, sampling: Sampling);
    fn bind_texture(&mut self, unit: u32, texture: TextureId);
    /// Leaves `unit` empty, so draws sample the blank fallback there.
    fn unbind_texture(&mut self, unit: u32);

    /// Compiles one stage, `None` when the source is rejected.
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Option<ShaderId>;
    fn create_program(&mut self, vertex: ShaderId, fragment: ShaderId) -> Option<ProgramId>;
    fn bind_attribute_location(&mut self, program: ProgramId, slot: u32, name: &str);
    fn link_program(&mut self, program: ProgramId) -> bool;
    /// Location of a named uniform, negative when the program has no such uniform.
    fn uniform_location(&mut self, program: ProgramId, name: &str) -> i32;
    fn use_program(&mut self, program: Option<ProgramId>);
    /// Pushes a value into a location of the current program.
    fn load_uniform(&mut self, location: i32, value: UniformValue);

    fn set_capability(&mut self, capability: Capability, enabled: bool);
    fn clear(&mut self, colour: [f32; 4]);
    /// Draws `count` indices of the current vertex array.
    fn draw_elements(&mut self, primitive: Primitive, count: u32);
    /// Draws `count` vertices of the current vertex array starting at `first`.
    fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32);

    fn delete_vertex_array(&mut self, vao: VertexArrayId);
    fn delete_buffer(&mut self, buffer: BufferId);
    fn delete_texture(&mut self, texture: TextureId);
    fn delete_shader(&mut self, shader: ShaderId);
    fn delete_program(&mut self, program: ProgramId);
}
