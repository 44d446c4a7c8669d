use cgmath::Matrix4;

use super::{bind_model, unbind_model};
use crate::data_structures::scene::SkyBox;
use crate::gpu::{AttributeSlot, Capability, Primitive, RenderApi};
use crate::resources::Assets;
use crate::shaders::sky_box::SkyBoxShaderManager;

const SLOTS: [AttributeSlot; 1] = [AttributeSlot::Position];

pub struct SkyBoxRenderer {
    shader: SkyBoxShaderManager,
}

impl SkyBoxRenderer {
    pub fn new(api: &mut dyn RenderApi, assets: &Assets, projection: Matrix4<f32>) -> Self {
        let shader = SkyBoxShaderManager::new(api, assets);
        shader.start(api);
        shader.load_projection_matrix(api, projection);
        shader.stop(api);
        Self { shader }
    }

    pub fn shader(&self) -> &SkyBoxShaderManager {
        &self.shader
    }

    /// Draws the cube around the camera. A sky box without a cube map is skipped.
    pub fn render(&self, api: &mut dyn RenderApi, view: Matrix4<f32>, sky_box: &SkyBox) {
        let Some(texture) = sky_box.texture else {
            return;
        };
        if !self.shader.is_linked() {
            return;
        }
        self.shader.start(api);
        self.shader.load_view_matrix(api, view);
        bind_model(api, &sky_box.model, &SLOTS);
        api.bind_texture(0, texture);
        // the cube is seen from inside
        api.set_capability(Capability::CullBackFaces, false);
        api.draw_arrays(Primitive::Triangles, 0, sky_box.model.vertex_count);
        api.set_capability(Capability::CullBackFaces, true);
        unbind_model(api, &SLOTS);
        self.shader.stop(api);
    }

    pub fn clean_up(&mut self, api: &mut dyn RenderApi) {
        self.shader.cleanup(api);
    }
}
