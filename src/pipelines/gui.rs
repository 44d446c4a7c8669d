use super::{bind_model, unbind_model};
use crate::data_structures::model::RawModel;
use crate::data_structures::scene::GuiTexture;
use crate::data_structures::shape::GUI_QUAD;
use crate::data_structures::transform::gui_transformation_matrix;
use crate::gpu::{AttributeSlot, Capability, Primitive, RenderApi};
use crate::resources::Loader;
use crate::shaders::gui::GuiShaderManager;

const SLOTS: [AttributeSlot; 1] = [AttributeSlot::Position];

/// Draws screen-space quads on top of the scene.
pub struct GuiRenderer {
    shader: GuiShaderManager,
    quad: RawModel,
}

impl GuiRenderer {
    pub fn new(api: &mut dyn RenderApi, loader: &mut Loader) -> Self {
        let quad = loader.load_positions_to_model(api, &GUI_QUAD, 2);
        let shader = GuiShaderManager::new(api, loader.assets());
        Self { shader, quad }
    }

    pub fn shader(&self) -> &GuiShaderManager {
        &self.shader
    }

    pub fn quad(&self) -> &RawModel {
        &self.quad
    }

    /// Blends every element over the frame with depth testing off, then
    /// restores depth testing and disables blending again.
    pub fn render(&self, api: &mut dyn RenderApi, guis: &[GuiTexture]) {
        if guis.is_empty() || !self.shader.is_linked() {
            return;
        }
        self.shader.start(api);
        bind_model(api, &self.quad, &SLOTS);
        api.set_capability(Capability::AlphaBlend, true);
        api.set_capability(Capability::DepthTest, false);
        for gui in guis {
            match gui.texture {
                Some(texture) => api.bind_texture(0, texture),
                None => api.unbind_texture(0),
            }
            self.shader.load_transformation_matrix(
                api,
                gui_transformation_matrix(gui.position, gui.scale),
            );
            api.draw_arrays(Primitive::TriangleStrip, 0, self.quad.vertex_count);
        }
        api.set_capability(Capability::DepthTest, true);
        api.set_capability(Capability::AlphaBlend, false);
        unbind_model(api, &SLOTS);
        self.shader.stop(api);
    }

    pub fn clean_up(&mut self, api: &mut dyn RenderApi) {
        self.shader.cleanup(api);
    }
}
