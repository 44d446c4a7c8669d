use std::collections::HashMap;

use cgmath::Matrix4;

use super::{MESH_SLOTS, bind_model, draw_model, unbind_model};
use crate::data_structures::entity::Entity;
use crate::data_structures::model::TexturedModel;
use crate::data_structures::scene::Light;
use crate::gpu::{Capability, RenderApi};
use crate::resources::Assets;
use crate::shaders::entity::EntityShaderManager;

/// Draws entities batch by batch, so every model is bound once per frame.
pub struct EntityRenderer {
    shader: EntityShaderManager,
}

impl EntityRenderer {
    pub fn new(api: &mut dyn RenderApi, assets: &Assets, projection: Matrix4<f32>) -> Self {
        let shader = EntityShaderManager::new(api, assets);
        shader.start(api);
        shader.load_projection_matrix(api, projection);
        shader.stop(api);
        Self { shader }
    }

    pub fn shader(&self) -> &EntityShaderManager {
        &self.shader
    }

    /// Draws every batch, then `player` on its own.
    pub fn render(
        &self,
        api: &mut dyn RenderApi,
        sky_colour: [f32; 3],
        sun: &Light,
        view: Matrix4<f32>,
        batches: &HashMap<String, Vec<Entity>>,
        player: Option<&Entity>,
    ) {
        if !self.shader.is_linked() {
            return;
        }
        self.shader.start(api);
        self.shader.load_sky_colour(api, sky_colour);
        self.shader.load_light(api, sun);
        self.shader.load_view_matrix(api, view);

        for batch in batches.values() {
            self.render_batch(api, batch);
        }
        if let Some(player) = player {
            self.render_batch(api, std::slice::from_ref(player));
        }
        self.shader.stop(api);
    }

    fn render_batch(&self, api: &mut dyn RenderApi, batch: &[Entity]) {
        let Some(first) = batch.first() else {
            return;
        };
        for model in &first.generic_entity.models {
            self.prepare_textured_model(api, model);
            for entity in batch {
                self.shader.load_transformation_matrix(api, entity.transformation_matrix());
                draw_model(api, &model.raw_model);
            }
            Self::unbind_textured_model(api, model);
        }
    }

    fn prepare_textured_model(&self, api: &mut dyn RenderApi, model: &TexturedModel) {
        bind_model(api, &model.raw_model, &MESH_SLOTS);
        if model.has_transparency {
            api.set_capability(Capability::CullBackFaces, false);
        }
        self.shader.load_normals_pointing_up(api, model.normals_pointing_up);
        self.shader
            .load_shine_variables(api, model.shine_damper, model.reflectivity);
        self.shader.load_material(api, &model.material);
        match model.material.texture {
            Some(texture) => api.bind_texture(0, texture),
            None => api.unbind_texture(0),
        }
    }

    fn unbind_textured_model(api: &mut dyn RenderApi, model: &TexturedModel) {
        if model.has_transparency {
            api.set_capability(Capability::CullBackFaces, true);
        }
        unbind_model(api, &MESH_SLOTS);
    }

    pub fn clean_up(&mut self, api: &mut dyn RenderApi) {
        self.shader.cleanup(api);
    }
}
