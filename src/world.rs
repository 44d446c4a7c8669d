//! Builds the default world: scattered plants, one terrain tile, the sky box,
//! the virtual gamepad and the player.
//!
//! Every asset is optional. Whatever is missing below the asset root is
//! logged by the [`Loader`] and left out of the scene.

use std::rc::Rc;

use cgmath::{Vector2, Vector3};
use rand::Rng;

use crate::data_structures::entity::{Entity, Player};
use crate::data_structures::model::GenericEntity;
use crate::data_structures::scene::{GuiTexture, Light, SkyBox};
use crate::data_structures::shape::{SKY_BOX_SIZE, sky_box_positions};
use crate::data_structures::terrain::{HeightMap, Terrain, TerrainTexturesPack};
use crate::gpu::RenderApi;
use crate::input::GamePadKey;
use crate::resources::{Loader, TEXTURE_DIR, texture};

/// How one kind of scenery is loaded and how often it is placed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scenery {
    pub object_name: &'static str,
    pub texture_name: &'static str,
    pub scale: f32,
    pub has_transparency: bool,
    pub normals_pointing_up: bool,
    pub count: usize,
}

pub const SCENERY: [Scenery; 5] = [
    Scenery {
        object_name: "fern",
        texture_name: "fern",
        scale: 1.0,
        has_transparency: true,
        normals_pointing_up: true,
        count: 10,
    },
    Scenery {
        object_name: "tree",
        texture_name: "tree",
        scale: 10.0,
        has_transparency: false,
        normals_pointing_up: false,
        count: 10,
    },
    Scenery {
        object_name: "banana_tree",
        texture_name: "banana_tree",
        scale: 1.0,
        has_transparency: true,
        normals_pointing_up: false,
        count: 10,
    },
    Scenery {
        object_name: "grass",
        texture_name: "grass",
        scale: 1.0,
        has_transparency: true,
        normals_pointing_up: true,
        count: 5,
    },
    Scenery {
        object_name: "flower",
        texture_name: "flower",
        scale: 1.0,
        has_transparency: true,
        normals_pointing_up: true,
        count: 10,
    },
];

/// Cube map faces in upload order: +X, -X, +Y, -Y, +Z, -Z.
pub const SKY_FACES: [&str; 6] = [
    "sky_right",
    "sky_left",
    "sky_top",
    "sky_bottom",
    "sky_back",
    "sky_front",
];

pub const HEIGHT_MAP: &str = "height_map";
/// Grid resolution of the terrain when no height map image is present.
pub const FLAT_TERRAIN_VERTICES: usize = 128;

pub const PLAYER_MODEL: &str = "player";
pub const PLAYER_START: Vector3<f32> = Vector3::new(100.0, 0.0, 100.0);

const SHINE_DAMPER: f32 = 10.0;
const REFLECTIVITY: f32 = 1.0;

/// Places the scenery at random on the square `x ∈ [20, 420)`, `z ∈ [0, 400)`,
/// standing on `terrain` when given.
pub fn entities(
    api: &mut dyn RenderApi,
    loader: &mut Loader,
    terrain: Option<&Terrain>,
    rng: &mut impl Rng,
) -> Vec<Entity> {
    let mut entities = Vec::new();
    for scenery in SCENERY {
        let models: Vec<_> = loader
            .load_obj_models(api, scenery.object_name, Some(scenery.texture_name))
            .into_iter()
            .map(|model| {
                model
                    .with_shine(SHINE_DAMPER, REFLECTIVITY)
                    .with_transparency(scenery.has_transparency)
                    .with_normals_pointing_up(scenery.normals_pointing_up)
            })
            .collect();
        if models.is_empty() {
            log::warn!("Skipping {}, no model loaded", scenery.object_name);
            continue;
        }
        let generic = Rc::new(GenericEntity::new(scenery.object_name, models));
        for _ in 0..scenery.count {
            let x = 20.0 + rng.gen_range(0..400) as f32;
            let z = rng.gen_range(0..400) as f32;
            let y = terrain.map_or(0.0, |t| t.height_at(x, z));
            entities.push(Entity::new(
                generic.clone(),
                Vector3::new(x, y, z),
                0.0,
                0.0,
                0.0,
                scenery.scale,
            ));
        }
    }
    entities
}

pub fn light() -> Light {
    Light::new(Vector3::new(10.0, 100.0, 10.0), Vector3::new(1.0, 1.0, 1.0))
}

/// The terrain tile at grid cell (0, 0), shaped by `textures/height_map.png`
/// or flat when that image is absent or broken.
pub fn terrain(api: &mut dyn RenderApi, loader: &mut Loader) -> Terrain {
    let textures = TerrainTexturesPack {
        background: loader.load_texture(api, "terrain_background"),
        mud: loader.load_texture(api, "mud"),
        grass: loader.load_texture(api, "grass_flowers"),
        path: loader.load_texture(api, "path"),
        weight_map: loader.load_texture(api, "blend_map"),
    };
    let heights = loader
        .assets()
        .resolve(TEXTURE_DIR, HEIGHT_MAP, "png")
        .and_then(|path| match texture::load_height_map(&path) {
            Ok(heights) => Some(heights),
            Err(e) => {
                log::warn!("Height map could not be loaded: {:#}", e);
                None
            }
        })
        .unwrap_or_else(|| HeightMap::flat(FLAT_TERRAIN_VERTICES));
    Terrain::new(api, loader, 0, 0, textures, heights)
}

pub fn sky_box(api: &mut dyn RenderApi, loader: &mut Loader) -> SkyBox {
    let model = loader.load_positions_to_model(api, &sky_box_positions(SKY_BOX_SIZE), 3);
    let texture = loader.load_cube_map(api, SKY_FACES);
    SkyBox { model, texture }
}

/// Direction pad in the lower left corner, action buttons in the lower right.
pub fn game_pad(api: &mut dyn RenderApi, loader: &mut Loader) -> Vec<GuiTexture> {
    const SCALE: Vector2<f32> = Vector2::new(0.08, 0.08);
    let buttons = [
        (GamePadKey::Up, "pad_up", Vector2::new(-0.75, -0.45)),
        (GamePadKey::Down, "pad_down", Vector2::new(-0.75, -0.8)),
        (GamePadKey::Left, "pad_left", Vector2::new(-0.88, -0.625)),
        (GamePadKey::Right, "pad_right", Vector2::new(-0.62, -0.625)),
        (GamePadKey::Triangle, "pad_triangle", Vector2::new(0.75, -0.45)),
        (GamePadKey::X, "pad_x", Vector2::new(0.75, -0.8)),
        (GamePadKey::Square, "pad_square", Vector2::new(0.62, -0.625)),
        (GamePadKey::Circle, "pad_circle", Vector2::new(0.88, -0.625)),
    ];
    buttons
        .into_iter()
        .map(|(key, texture_name, position)| {
            GuiTexture::new(loader.load_texture(api, texture_name), position, SCALE)
                .with_game_pad_key(key)
        })
        .collect()
}

pub fn player(
    api: &mut dyn RenderApi,
    loader: &mut Loader,
    terrain: Option<&Terrain>,
) -> Option<Player> {
    let models = loader.load_obj_models(api, PLAYER_MODEL, Some(PLAYER_MODEL));
    if models.is_empty() {
        log::warn!("No player model, the camera stays put");
        return None;
    }
    let mut position = PLAYER_START;
    position.y = terrain.map_or(0.0, |t| t.height_at(position.x, position.z));
    let entity = Entity::new(
        Rc::new(GenericEntity::new(PLAYER_MODEL, models)),
        position,
        0.0,
        0.0,
        0.0,
        1.0,
    );
    Some(Player::new(entity))
}

/// Everything the default scene is made of.
pub struct World {
    pub entities: Vec<Entity>,
    pub terrain: Terrain,
    pub sky_box: SkyBox,
    pub guis: Vec<GuiTexture>,
    pub player: Option<Player>,
    pub light: Light,
}

impl World {
    pub fn generate(api: &mut dyn RenderApi, loader: &mut Loader, rng: &mut impl Rng) -> Self {
        let terrain = terrain(api, loader);
        let entities = entities(api, loader, Some(&terrain), rng);
        let player = player(api, loader, Some(&terrain));
        Self {
            entities,
            sky_box: sky_box(api, loader),
            guis: game_pad(api, loader),
            terrain,
            player,
            light: light(),
        }
    }
}
