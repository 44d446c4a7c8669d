//! terra-ngin
//!
//! A small real-time 3D engine for a touch-driven game: it loads models,
//! textures and shaders onto the GPU, batches entities by model and renders
//! terrain, entities, a sky box and an on-screen gamepad every frame.
//!
//! High-level modules
//! - `gpu`: the GL-style [`gpu::RenderApi`] the core draws through, with a
//!   recording backend and a wgpu backend
//! - `resources`: asset lookup, decoding and the GPU resource [`resources::Loader`]
//! - `shaders`: shader programs and their per-domain uniform tables
//! - `pipelines`: entity, terrain, sky box and GUI renderers
//! - `render`: [`render::MasterRender`], the per-frame orchestrator
//! - `data_structures`: models, entities, terrain and scene objects
//! - `camera`, `input`: third-person camera, touch input and virtual gamepad
//! - `world`: generators for the default scene
//! - `context`, `flow`: window, surface and event loop
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod gpu;
pub mod input;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod shaders;
pub mod world;

pub use cgmath;
