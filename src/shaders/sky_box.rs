use cgmath::Matrix4;

use super::{ShaderDomain, ShaderManager, uniform_slots};
use crate::data_structures::transform::rotation_only;
use crate::gpu::{AttributeSlot, RenderApi};

uniform_slots!(SkyBoxUniform {
    ProjectionMatrix => "projectionMatrix",
    ViewMatrix => "viewMatrix",
});

pub struct SkyBoxShader;

impl ShaderDomain for SkyBoxShader {
    type Uniform = SkyBoxUniform;
    const NAME: &'static str = "sky_box";

    fn attribute_bindings() -> &'static [(AttributeSlot, &'static str)] {
        &[(AttributeSlot::Position, "position")]
    }
}

pub type SkyBoxShaderManager = ShaderManager<SkyBoxShader>;

impl ShaderManager<SkyBoxShader> {
    pub fn load_projection_matrix(&self, api: &mut dyn RenderApi, matrix: Matrix4<f32>) {
        self.load_matrix(api, SkyBoxUniform::ProjectionMatrix, matrix);
    }

    /// Loads the camera rotation only; the sky box moves with the camera.
    pub fn load_view_matrix(&self, api: &mut dyn RenderApi, view: Matrix4<f32>) {
        self.load_matrix(api, SkyBoxUniform::ViewMatrix, rotation_only(view));
    }
}
