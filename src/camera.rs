//! Third-person camera following the player.

use cgmath::Vector3;

use crate::data_structures::entity::Player;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vector3<f32>,
    /// Degrees, positive looks down.
    pub pitch: f32,
    /// Degrees around the Y axis, `0` looks along `-Z`.
    pub yaw: f32,
    pub roll: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 10.0, 0.0),
            pitch: 10.0,
            yaw: 0.0,
            roll: 0.0,
        }
    }
}

/// Keeps a [`Camera`] behind the player at a fixed distance and elevation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThirdPersonCamera {
    pub camera: Camera,
    pub distance_from_player: f32,
    /// Extra rotation around the player, in degrees.
    pub angle_around_player: f32,
    /// Height of the point looked at above the player's feet.
    pub target_height: f32,
}

impl Default for ThirdPersonCamera {
    fn default() -> Self {
        Self {
            camera: Camera {
                pitch: 20.0,
                ..Default::default()
            },
            distance_from_player: 50.0,
            angle_around_player: 0.0,
            target_height: 5.0,
        }
    }
}

impl ThirdPersonCamera {
    pub fn update(&mut self, player: &Player) {
        let pitch = self.camera.pitch.to_radians();
        let horizontal = self.distance_from_player * pitch.cos();
        let vertical = self.distance_from_player * pitch.sin();

        let theta = player.entity.rot_y + self.angle_around_player;
        let (sin, cos) = theta.to_radians().sin_cos();
        // the player faces (-sin, 0, cos); the camera sits behind it
        let target = player.entity.position;
        self.camera.position = Vector3::new(
            target.x + horizontal * sin,
            target.y + self.target_height + vertical,
            target.z - horizontal * cos,
        );
        self.camera.yaw = 180.0 + theta;
    }
}
