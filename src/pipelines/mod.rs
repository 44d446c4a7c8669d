//! Per-domain renderers.
//!
//! Each renderer owns the [`ShaderManager`](crate::shaders::ShaderManager) of
//! its domain, loads the projection matrix once at construction and then,
//! every frame, starts its program, loads the per-frame uniforms, draws its
//! objects and stops the program again.

use crate::data_structures::model::RawModel;
use crate::gpu::{AttributeSlot, Primitive, RenderApi};

pub mod entity;
pub mod gui;
pub mod sky_box;
pub mod terrain;

pub use entity::EntityRenderer;
pub use gui::GuiRenderer;
pub use sky_box::SkyBoxRenderer;
pub use terrain::TerrainRenderer;

pub(crate) fn bind_model(api: &mut dyn RenderApi, model: &RawModel, slots: &[AttributeSlot]) {
    api.bind_vertex_array(Some(model.vao));
    for slot in slots {
        api.enable_attribute(slot.index());
    }
}

pub(crate) fn unbind_model(api: &mut dyn RenderApi, slots: &[AttributeSlot]) {
    for slot in slots {
        api.disable_attribute(slot.index());
    }
    api.bind_vertex_array(None);
}

/// Draws the bound model as triangles, through its indices when it has some.
pub(crate) fn draw_model(api: &mut dyn RenderApi, model: &RawModel) {
    if model.indexed {
        api.draw_elements(Primitive::Triangles, model.vertex_count);
    } else {
        api.draw_arrays(Primitive::Triangles, 0, model.vertex_count);
    }
}

pub(crate) const MESH_SLOTS: [AttributeSlot; 3] = [
    AttributeSlot::Position,
    AttributeSlot::TextureCoords,
    AttributeSlot::Normal,
];
