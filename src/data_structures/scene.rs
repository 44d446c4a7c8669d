use cgmath::{Vector2, Vector3};

use crate::data_structures::model::RawModel;
use crate::gpu::TextureId;
use crate::input::GamePadKey;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub position: Vector3<f32>,
    pub colour: Vector3<f32>,
}

impl Light {
    pub fn new(position: Vector3<f32>, colour: Vector3<f32>) -> Self {
        Self { position, colour }
    }
}

/// Cube around the camera textured with a cube map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkyBox {
    pub model: RawModel,
    /// `None` when the cube map failed to load; such a sky box is not drawn.
    pub texture: Option<TextureId>,
}

/// Screen-space image, optionally acting as a virtual gamepad button.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GuiTexture {
    pub texture: Option<TextureId>,
    /// Centre in normalized device coordinates.
    pub position: Vector2<f32>,
    /// Half extents in normalized device coordinates.
    pub scale: Vector2<f32>,
    pub game_pad_key: Option<GamePadKey>,
}

impl GuiTexture {
    pub fn new(texture: Option<TextureId>, position: Vector2<f32>, scale: Vector2<f32>) -> Self {
        Self {
            texture,
            position,
            scale,
            game_pad_key: None,
        }
    }

    pub fn with_game_pad_key(mut self, key: GamePadKey) -> Self {
        self.game_pad_key = Some(key);
        self
    }

    /// Whether a point in normalized device coordinates lies on the element.
    pub fn contains_location(&self, x: f32, y: f32) -> bool {
        (x - self.position.x).abs() <= self.scale.x && (y - self.position.y).abs() <= self.scale.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_location_uses_half_extents() {
        let gui = GuiTexture::new(None, Vector2::new(-0.5, -0.5), Vector2::new(0.1, 0.2));
        assert!(gui.contains_location(-0.5, -0.5));
        assert!(gui.contains_location(-0.45, -0.35));
        assert!(!gui.contains_location(-0.35, -0.5));
        assert!(!gui.contains_location(0.5, 0.5));
    }
}
