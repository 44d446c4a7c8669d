//! Engine data structures: models, entities, terrain and scene objects.
//!
//! - `shape` holds CPU-side geometry before it is uploaded
//! - `model` contains GPU models and their materials
//! - `entity` places models in the world, including the player
//! - `terrain` builds height-mapped terrain tiles
//! - `scene` has lights, the sky box and GUI elements
//! - `transform` builds the matrices the shaders consume

pub mod entity;
pub mod model;
pub mod scene;
pub mod shape;
pub mod terrain;
pub mod transform;
