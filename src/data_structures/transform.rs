//! Matrices uploaded to the shaders.
//!
//! All matrices follow the OpenGL clip-space convention (depth in `[-1, 1]`);
//! the vertex shaders remap depth to the `[0, 1]` range wgpu expects.

use cgmath::{Deg, Matrix4, Vector2, Vector3};

use crate::camera::Camera;
use crate::config::EngineConfig;

/// World transform of a placed object: translate, rotate about X, Y, Z, then scale uniformly.
pub fn transformation_matrix(
    position: Vector3<f32>,
    rot_x: f32,
    rot_y: f32,
    rot_z: f32,
    scale: f32,
) -> Matrix4<f32> {
    Matrix4::from_translation(position)
        * Matrix4::from_angle_x(Deg(rot_x))
        * Matrix4::from_angle_y(Deg(rot_y))
        * Matrix4::from_angle_z(Deg(rot_z))
        * Matrix4::from_scale(scale)
}

/// Screen-space transform of a GUI quad.
pub fn gui_transformation_matrix(position: Vector2<f32>, scale: Vector2<f32>) -> Matrix4<f32> {
    Matrix4::from_translation(Vector3::new(position.x, position.y, 0.0))
        * Matrix4::from_nonuniform_scale(scale.x, scale.y, 1.0)
}

/// Look-from-camera transform: rotate by pitch, then yaw, then move the world by `-position`.
pub fn view_matrix(camera: &Camera) -> Matrix4<f32> {
    Matrix4::from_angle_x(Deg(camera.pitch))
        * Matrix4::from_angle_y(Deg(camera.yaw))
        * Matrix4::from_translation(-camera.position)
}

/// The view matrix without its translation, so the sky box stays centred on the camera.
pub fn rotation_only(view: Matrix4<f32>) -> Matrix4<f32> {
    let mut rotation = view;
    rotation.w.x = 0.0;
    rotation.w.y = 0.0;
    rotation.w.z = 0.0;
    rotation
}

pub fn projection_matrix(config: &EngineConfig) -> Matrix4<f32> {
    cgmath::perspective(
        Deg(config.fov),
        config.aspect_ratio(),
        config.near_plane,
        config.far_plane,
    )
}
