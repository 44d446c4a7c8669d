use std::rc::Rc;

use cgmath::{Matrix4, Vector3};

use crate::data_structures::{model::GenericEntity, terrain::Terrain, transform};
use crate::input::{GamePad, GamePadKey};

/// A [`GenericEntity`] placed in the world.
#[derive(Clone, Debug)]
pub struct Entity {
    pub generic_entity: Rc<GenericEntity>,
    pub position: Vector3<f32>,
    /// Rotations in degrees.
    pub rot_x: f32,
    pub rot_y: f32,
    pub rot_z: f32,
    pub scale: f32,
}

impl Entity {
    pub fn new(
        generic_entity: Rc<GenericEntity>,
        position: Vector3<f32>,
        rot_x: f32,
        rot_y: f32,
        rot_z: f32,
        scale: f32,
    ) -> Self {
        Self {
            generic_entity,
            position,
            rot_x,
            rot_y,
            rot_z,
            scale,
        }
    }

    /// Key entities are batched by: the id of the shared model definition.
    pub fn model_key(&self) -> &str {
        &self.generic_entity.id
    }

    pub fn increase_position(&mut self, dx: f32, dy: f32, dz: f32) {
        self.position += Vector3::new(dx, dy, dz);
    }

    pub fn increase_rotation(&mut self, dx: f32, dy: f32, dz: f32) {
        self.rot_x += dx;
        self.rot_y += dy;
        self.rot_z += dz;
    }

    pub fn transformation_matrix(&self) -> Matrix4<f32> {
        transform::transformation_matrix(
            self.position,
            self.rot_x,
            self.rot_y,
            self.rot_z,
            self.scale,
        )
    }
}

/// The entity steered with the virtual gamepad.
#[derive(Clone, Debug)]
pub struct Player {
    pub entity: Entity,
    current_speed: f32,
    current_turn_speed: f32,
    upwards_speed: f32,
    is_jumping: bool,
}

impl Player {
    /// Distance covered in one second.
    pub const RUN_SPEED: f32 = 90.0;
    /// Degrees turned in one second.
    pub const TURN_SPEED: f32 = 160.0;
    /// Vertical acceleration in units per second squared.
    pub const GRAVITY: f32 = -50.0;
    /// Vertical speed at take-off in units per second.
    pub const JUMP_POWER: f32 = 30.0;

    pub fn new(entity: Entity) -> Self {
        Self {
            entity,
            current_speed: 0.0,
            current_turn_speed: 0.0,
            upwards_speed: 0.0,
            is_jumping: false,
        }
    }

    pub fn is_jumping(&self) -> bool {
        self.is_jumping
    }

    /// Advance the player by one frame.
    ///
    /// `time_to_render` is the duration of the previous frame in seconds. Without a
    /// terrain the ground is the plane `y = 0`.
    pub fn move_player(
        &mut self,
        time_to_render: f32,
        game_pad: &GamePad,
        terrain: Option<&Terrain>,
    ) {
        let ground = self.ground_height(terrain);
        self.check_inputs(game_pad, ground);
        self.move_and_rotate(time_to_render);
        let ground = self.ground_height(terrain);
        self.fall_down(time_to_render, ground);
    }

    fn ground_height(&self, terrain: Option<&Terrain>) -> f32 {
        terrain.map_or(0.0, |t| t.height_at(self.entity.position.x, self.entity.position.z))
    }

    fn check_inputs(&mut self, game_pad: &GamePad, ground: f32) {
        self.current_speed = if game_pad.is_down(GamePadKey::X) {
            Self::RUN_SPEED
        } else if game_pad.is_down(GamePadKey::Circle) {
            -Self::RUN_SPEED
        } else {
            0.0
        };
        self.current_turn_speed = if game_pad.is_down(GamePadKey::Left) {
            -Self::TURN_SPEED
        } else if game_pad.is_down(GamePadKey::Right) {
            Self::TURN_SPEED
        } else {
            0.0
        };
        if game_pad.is_down(GamePadKey::Triangle) {
            self.jump(ground);
        }
    }

    fn move_and_rotate(&mut self, time_to_render: f32) {
        self.entity
            .increase_rotation(0.0, self.current_turn_speed * time_to_render, 0.0);
        let distance = self.current_speed * time_to_render;
        let angle = self.entity.rot_y.to_radians();
        let dx = -distance * angle.sin();
        let dz = distance * angle.cos();
        self.entity.increase_position(dx, 0.0, dz);
    }

    fn fall_down(&mut self, time_to_render: f32, ground: f32) {
        if self.is_jumping && (self.entity.position.y > ground || self.upwards_speed > 0.0) {
            self.upwards_speed += Self::GRAVITY * time_to_render;
            self.entity
                .increase_position(0.0, self.upwards_speed * time_to_render, 0.0);
        } else {
            self.entity.position.y = ground;
        }
        if self.entity.position.y <= ground {
            self.entity.position.y = ground;
            self.is_jumping = false;
        }
    }

    fn jump(&mut self, ground: f32) {
        if self.entity.position.y <= ground && !self.is_jumping {
            self.upwards_speed = Self::JUMP_POWER;
            self.is_jumping = true;
        }
    }
}
