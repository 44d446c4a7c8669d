use cgmath::Matrix4;

use super::{ShaderDomain, ShaderManager, uniform_slots};
use crate::data_structures::model::Material;
use crate::data_structures::scene::Light;
use crate::gpu::{AttributeSlot, RenderApi};

uniform_slots!(
    /// Uniforms of the lit, fogged entity program.
    EntityUniform {
        ProjectionMatrix => "projectionMatrix",
        ViewMatrix => "viewMatrix",
        TransformationMatrix => "transformationMatrix",
        LightPosition => "lightPosition",
        LightColour => "lightColor",
        ShineDamper => "shineDamper",
        Reflectivity => "reflectivity",
        SkyColour => "skyColor",
        NormalsPointingUp => "normalsPointingUp",
        TextureWeight => "textureWeight",
        DiffuseColour => "diffuseColor",
    }
);

pub struct EntityShader;

impl ShaderDomain for EntityShader {
    type Uniform = EntityUniform;
    const NAME: &'static str = "entity";

    fn attribute_bindings() -> &'static [(AttributeSlot, &'static str)] {
        &[
            (AttributeSlot::Position, "position"),
            (AttributeSlot::TextureCoords, "textureCoords"),
            (AttributeSlot::Normal, "normal"),
        ]
    }
}

pub type EntityShaderManager = ShaderManager<EntityShader>;

impl ShaderManager<EntityShader> {
    pub fn load_projection_matrix(&self, api: &mut dyn RenderApi, matrix: Matrix4<f32>) {
        self.load_matrix(api, EntityUniform::ProjectionMatrix, matrix);
    }

    pub fn load_view_matrix(&self, api: &mut dyn RenderApi, matrix: Matrix4<f32>) {
        self.load_matrix(api, EntityUniform::ViewMatrix, matrix);
    }

    pub fn load_transformation_matrix(&self, api: &mut dyn RenderApi, matrix: Matrix4<f32>) {
        self.load_matrix(api, EntityUniform::TransformationMatrix, matrix);
    }

    pub fn load_light(&self, api: &mut dyn RenderApi, light: &Light) {
        self.load_vector3(api, EntityUniform::LightPosition, light.position);
        self.load_vector3(api, EntityUniform::LightColour, light.colour);
    }

    pub fn load_sky_colour(&self, api: &mut dyn RenderApi, colour: [f32; 3]) {
        self.load_colour_rgb(api, EntityUniform::SkyColour, colour);
    }

    pub fn load_shine_variables(&self, api: &mut dyn RenderApi, damper: f32, reflectivity: f32) {
        self.load_float(api, EntityUniform::ShineDamper, damper);
        self.load_float(api, EntityUniform::Reflectivity, reflectivity);
    }

    pub fn load_normals_pointing_up(&self, api: &mut dyn RenderApi, pointing_up: bool) {
        self.load_boolean(api, EntityUniform::NormalsPointingUp, pointing_up);
    }

    pub fn load_material(&self, api: &mut dyn RenderApi, material: &Material) {
        self.load_float(api, EntityUniform::TextureWeight, material.texture_weight);
        self.load_colour_rgba(api, EntityUniform::DiffuseColour, material.diffuse_colour);
    }
}
