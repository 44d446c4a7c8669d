use cgmath::Matrix4;

use super::{MESH_SLOTS, bind_model, draw_model, unbind_model};
use crate::data_structures::scene::Light;
use crate::data_structures::terrain::Terrain;
use crate::gpu::RenderApi;
use crate::resources::Assets;
use crate::shaders::terrain::TerrainShaderManager;

pub struct TerrainRenderer {
    shader: TerrainShaderManager,
}

impl TerrainRenderer {
    pub fn new(api: &mut dyn RenderApi, assets: &Assets, projection: Matrix4<f32>) -> Self {
        let shader = TerrainShaderManager::new(api, assets);
        shader.start(api);
        shader.load_projection_matrix(api, projection);
        shader.stop(api);
        Self { shader }
    }

    pub fn shader(&self) -> &TerrainShaderManager {
        &self.shader
    }

    pub fn render(
        &self,
        api: &mut dyn RenderApi,
        sky_colour: [f32; 3],
        sun: &Light,
        view: Matrix4<f32>,
        terrains: &[Terrain],
    ) {
        if !self.shader.is_linked() {
            return;
        }
        self.shader.start(api);
        self.shader.load_sky_colour(api, sky_colour);
        self.shader.load_light(api, sun);
        self.shader.load_view_matrix(api, view);

        for terrain in terrains {
            bind_model(api, &terrain.model, &MESH_SLOTS);
            // background, mud, grass, path and weight map on units 0 to 4
            for (unit, texture) in terrain.textures.units().into_iter().enumerate() {
                match texture {
                    Some(texture) => api.bind_texture(unit as u32, texture),
                    None => api.unbind_texture(unit as u32),
                }
            }
            self.shader.load_shine_variables(api, 1.0, 0.0);
            self.shader
                .load_transformation_matrix(api, terrain.transformation_matrix());
            draw_model(api, &terrain.model);
            unbind_model(api, &MESH_SLOTS);
        }
        self.shader.stop(api);
    }

    pub fn clean_up(&mut self, api: &mut dyn RenderApi) {
        self.shader.cleanup(api);
    }
}
