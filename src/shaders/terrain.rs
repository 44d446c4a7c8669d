use cgmath::Matrix4;

use super::{ShaderDomain, ShaderManager, uniform_slots};
use crate::data_structures::scene::Light;
use crate::gpu::{AttributeSlot, RenderApi};

uniform_slots!(
    /// Uniforms of the terrain program. Its five textures sit on the fixed
    /// units 0 to 4 and need no uniforms.
    TerrainUniform {
        TransformationMatrix => "transformationMatrix",
        ViewMatrix => "viewMatrix",
        ProjectionMatrix => "projectionMatrix",
        LightPosition => "lightPosition",
        LightColour => "lightColor",
        ShineDamper => "shineDamper",
        Reflectivity => "reflectivity",
        SkyColour => "skyColor",
    }
);

pub struct TerrainShader;

impl ShaderDomain for TerrainShader {
    type Uniform = TerrainUniform;
    const NAME: &'static str = "terrain";

    fn attribute_bindings() -> &'static [(AttributeSlot, &'static str)] {
        &[
            (AttributeSlot::Position, "position"),
            (AttributeSlot::TextureCoords, "textureCoords"),
            (AttributeSlot::Normal, "normal"),
        ]
    }
}

pub type TerrainShaderManager = ShaderManager<TerrainShader>;

impl ShaderManager<TerrainShader> {
    pub fn load_projection_matrix(&self, api: &mut dyn RenderApi, matrix: Matrix4<f32>) {
        self.load_matrix(api, TerrainUniform::ProjectionMatrix, matrix);
    }

    pub fn load_view_matrix(&self, api: &mut dyn RenderApi, matrix: Matrix4<f32>) {
        self.load_matrix(api, TerrainUniform::ViewMatrix, matrix);
    }

    pub fn load_transformation_matrix(&self, api: &mut dyn RenderApi, matrix: Matrix4<f32>) {
        self.load_matrix(api, TerrainUniform::TransformationMatrix, matrix);
    }

    pub fn load_light(&self, api: &mut dyn RenderApi, light: &Light) {
        self.load_vector3(api, TerrainUniform::LightPosition, light.position);
        self.load_vector3(api, TerrainUniform::LightColour, light.colour);
    }

    pub fn load_sky_colour(&self, api: &mut dyn RenderApi, colour: [f32; 3]) {
        self.load_colour_rgb(api, TerrainUniform::SkyColour, colour);
    }

    pub fn load_shine_variables(&self, api: &mut dyn RenderApi, damper: f32, reflectivity: f32) {
        self.load_float(api, TerrainUniform::ShineDamper, damper);
        self.load_float(api, TerrainUniform::Reflectivity, reflectivity);
    }
}
