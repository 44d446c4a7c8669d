//! Shader programs and their uniform tables.
//!
//! A [`ShaderManager`] compiles the `<name>.vsh` / `<name>.fsh` pair of one
//! [`ShaderDomain`], binds the domain's attribute names to the fixed
//! [`AttributeSlot`]s, and resolves every uniform slot of the domain to a
//! location once. Renderers then push values by slot.

use std::marker::PhantomData;

use cgmath::{Matrix4, Vector2, Vector3};

use crate::gpu::{AttributeSlot, ProgramId, RenderApi, ShaderId, ShaderStage, UniformValue};
use crate::resources::Assets;

pub mod entity;
pub mod gui;
pub mod sky_box;
pub mod terrain;

pub const VERTEX_EXTENSION: &str = "vsh";
pub const FRAGMENT_EXTENSION: &str = "fsh";

/// An enumeration of the uniforms of one shader domain.
pub trait UniformSlot: Copy + std::fmt::Debug + 'static {
    /// Every slot with the name of its shader variable.
    const BINDINGS: &'static [(Self, &'static str)];

    fn index(self) -> usize;
}

/// Declares a uniform slot enum and its shader variable names.
macro_rules! uniform_slots {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $variable:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $crate::shaders::UniformSlot for $name {
            const BINDINGS: &'static [(Self, &'static str)] = &[$(($name::$variant, $variable)),+];

            fn index(self) -> usize {
                self as usize
            }
        }
    };
}
pub(crate) use uniform_slots;

/// The per-domain tables a [`ShaderManager`] is built from.
pub trait ShaderDomain {
    type Uniform: UniformSlot;

    /// File stem of the shader sources.
    const NAME: &'static str;

    fn attribute_bindings() -> &'static [(AttributeSlot, &'static str)];

    fn uniform_bindings() -> &'static [(Self::Uniform, &'static str)] {
        Self::Uniform::BINDINGS
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderState {
    Uninitialized,
    Compiling,
    Linked,
    Failed,
}

/// A compiled program of domain `D` with its resolved uniform locations.
///
/// A manager that failed to compile or link stays in [`ShaderState::Failed`]
/// and ignores `start` and every load, so a renderer holding it draws nothing
/// useful but never touches another program's state.
pub struct ShaderManager<D: ShaderDomain> {
    state: ShaderState,
    program: Option<ProgramId>,
    vertex_shader: Option<ShaderId>,
    fragment_shader: Option<ShaderId>,
    locations: Vec<i32>,
    _domain: PhantomData<D>,
}

impl<D: ShaderDomain> ShaderManager<D> {
    /// Reads the domain's sources from `assets` and builds the program.
    pub fn new(api: &mut dyn RenderApi, assets: &Assets) -> Self {
        let sources = assets
            .shader_source(D::NAME, VERTEX_EXTENSION)
            .and_then(|vertex| Ok((vertex, assets.shader_source(D::NAME, FRAGMENT_EXTENSION)?)));
        match sources {
            Ok((vertex, fragment)) => Self::from_sources(api, &vertex, &fragment),
            Err(e) => {
                log::error!("Could not read {} shaders: {:#}", D::NAME, e);
                Self::unlinked(ShaderState::Failed)
            }
        }
    }

    pub fn from_sources(
        api: &mut dyn RenderApi,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Self {
        let mut manager = Self::unlinked(ShaderState::Compiling);
        log::debug!("Compiling {} shaders", D::NAME);

        manager.vertex_shader = api.compile_shader(ShaderStage::Vertex, vertex_source);
        manager.fragment_shader = api.compile_shader(ShaderStage::Fragment, fragment_source);
        let (Some(vertex), Some(fragment)) = (manager.vertex_shader, manager.fragment_shader) else {
            log::error!("Could not compile {} shaders", D::NAME);
            manager.fail(api);
            return manager;
        };

        let Some(program) = api.create_program(vertex, fragment) else {
            log::error!("Could not create the {} program", D::NAME);
            manager.fail(api);
            return manager;
        };
        manager.program = Some(program);

        for (slot, name) in D::attribute_bindings() {
            api.bind_attribute_location(program, slot.index(), name);
        }
        if !api.link_program(program) {
            log::error!("Could not link the {} program", D::NAME);
            manager.fail(api);
            return manager;
        }

        manager.locations = vec![-1; D::uniform_bindings().len()];
        for (slot, name) in D::uniform_bindings() {
            let location = api.uniform_location(program, name);
            if location < 0 {
                log::warn!("Problems getting {}'s location", name);
            }
            if let Some(entry) = manager.locations.get_mut(slot.index()) {
                *entry = location;
            }
        }
        manager.state = ShaderState::Linked;
        manager
    }

    fn unlinked(state: ShaderState) -> Self {
        Self {
            state,
            program: None,
            vertex_shader: None,
            fragment_shader: None,
            locations: Vec::new(),
            _domain: PhantomData,
        }
    }

    fn fail(&mut self, api: &mut dyn RenderApi) {
        self.release(api);
        self.state = ShaderState::Failed;
    }

    fn release(&mut self, api: &mut dyn RenderApi) {
        if let Some(program) = self.program.take() {
            api.delete_program(program);
        }
        if let Some(shader) = self.vertex_shader.take() {
            api.delete_shader(shader);
        }
        if let Some(shader) = self.fragment_shader.take() {
            api.delete_shader(shader);
        }
    }

    pub fn state(&self) -> ShaderState {
        self.state
    }

    pub fn is_linked(&self) -> bool {
        self.state == ShaderState::Linked
    }

    pub fn program(&self) -> Option<ProgramId> {
        self.program
    }

    /// Resolved location of `slot`, negative when unresolved.
    pub fn location(&self, slot: D::Uniform) -> i32 {
        self.locations.get(slot.index()).copied().unwrap_or(-1)
    }

    pub fn start(&self, api: &mut dyn RenderApi) {
        match self.program {
            Some(program) if self.is_linked() => api.use_program(Some(program)),
            _ => log::debug!("{} shader is not linked, not starting it", D::NAME),
        }
    }

    pub fn stop(&self, api: &mut dyn RenderApi) {
        if self.is_linked() {
            api.use_program(None);
        }
    }

    fn load(&self, api: &mut dyn RenderApi, slot: D::Uniform, value: UniformValue) {
        if !self.is_linked() {
            return;
        }
        let location = self.location(slot);
        if location >= 0 {
            api.load_uniform(location, value);
        }
    }

    pub fn load_int(&self, api: &mut dyn RenderApi, slot: D::Uniform, value: i32) {
        self.load(api, slot, UniformValue::Int(value));
    }

    pub fn load_float(&self, api: &mut dyn RenderApi, slot: D::Uniform, value: f32) {
        self.load(api, slot, UniformValue::Float(value));
    }

    pub fn load_vector2(&self, api: &mut dyn RenderApi, slot: D::Uniform, value: Vector2<f32>) {
        self.load(api, slot, UniformValue::Vec2(value.into()));
    }

    pub fn load_vector3(&self, api: &mut dyn RenderApi, slot: D::Uniform, value: Vector3<f32>) {
        self.load(api, slot, UniformValue::Vec3(value.into()));
    }

    pub fn load_colour_rgb(&self, api: &mut dyn RenderApi, slot: D::Uniform, colour: [f32; 3]) {
        self.load(api, slot, UniformValue::Vec3(colour));
    }

    pub fn load_colour_rgba(&self, api: &mut dyn RenderApi, slot: D::Uniform, colour: [f32; 4]) {
        self.load(api, slot, UniformValue::Vec4(colour));
    }

    /// Booleans are float uniforms: `1.0` or `0.0`.
    pub fn load_boolean(&self, api: &mut dyn RenderApi, slot: D::Uniform, value: bool) {
        self.load_float(api, slot, if value { 1.0 } else { 0.0 });
    }

    pub fn load_matrix(&self, api: &mut dyn RenderApi, slot: D::Uniform, matrix: Matrix4<f32>) {
        self.load(api, slot, matrix.into());
    }

    /// Releases the program and both stages. Safe to call more than once.
    pub fn cleanup(&mut self, api: &mut dyn RenderApi) {
        self.stop(api);
        self.release(api);
        if self.state == ShaderState::Linked {
            self.state = ShaderState::Uninitialized;
        }
    }
}
