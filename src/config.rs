//! Engine-wide settings fixed at construction time.

use std::path::PathBuf;

/// Environment variable overriding [`EngineConfig::asset_root`].
pub const ASSETS_ENV: &str = "TERRA_NGIN_ASSETS";

#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    /// Fog colour the entity and terrain shaders fade into.
    pub sky_colour: [f32; 3],
    pub clear_colour: [f32; 4],
    /// Directory with `shaders/`, `textures/` and `models/`.
    pub asset_root: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fov: 65.0,
            near_plane: 0.1,
            far_plane: 1000.0,
            sky_colour: [0.5, 0.5, 0.5],
            clear_colour: [0.5, 0.5, 0.5, 1.0],
            asset_root: PathBuf::from("assets"),
            width: 1280,
            height: 720,
        }
    }
}

impl EngineConfig {
    /// Defaults with the asset root taken from `TERRA_NGIN_ASSETS` when set.
    pub fn from_env() -> Self {
        let config = Self::default();
        match std::env::var_os(ASSETS_ENV) {
            Some(root) => config.with_asset_root(root),
            None => config,
        }
    }

    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    pub fn with_screen_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_sky_colour(mut self, sky_colour: [f32; 3]) -> Self {
        self.sky_colour = sky_colour;
        self
    }

    pub fn with_clear_colour(mut self, clear_colour: [f32; 4]) -> Self {
        self.clear_colour = clear_colour;
        self
    }

    /// `|width / height|`, `1.0` for a degenerate screen.
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            return 1.0;
        }
        (self.width as f32 / self.height as f32).abs()
    }
}
