use cgmath::Matrix4;

use super::{ShaderDomain, ShaderManager, uniform_slots};
use crate::gpu::{AttributeSlot, RenderApi};

uniform_slots!(GuiUniform {
    TransformationMatrix => "transformationMatrix",
});

pub struct GuiShader;

impl ShaderDomain for GuiShader {
    type Uniform = GuiUniform;
    const NAME: &'static str = "gui";

    fn attribute_bindings() -> &'static [(AttributeSlot, &'static str)] {
        &[(AttributeSlot::Position, "position")]
    }
}

pub type GuiShaderManager = ShaderManager<GuiShader>;

impl ShaderManager<GuiShader> {
    pub fn load_transformation_matrix(&self, api: &mut dyn RenderApi, matrix: Matrix4<f32>) {
        self.load_matrix(api, GuiUniform::TransformationMatrix, matrix);
    }
}
