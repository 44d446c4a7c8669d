//! Frame orchestration.
//!
//! [`MasterRender`] owns one renderer per domain plus the scene handed to it
//! and runs the per-frame protocol:
//!
//! 1. [`MasterRender::start_frame_render`] stamps the frame start.
//! 2. [`MasterRender::render`] clears the frame, maps the touch snapshot onto
//!    the gamepad, moves the player with the previous frame's duration, moves
//!    the camera after it, then draws entities, terrain, sky box and GUI, in
//!    that order.
//! 3. [`MasterRender::end_frame_render`] stores the frame's duration for the
//!    next player update.

use std::collections::HashMap;

use cgmath::Matrix4;
use instant::Instant;

use crate::camera::ThirdPersonCamera;
use crate::config::EngineConfig;
use crate::data_structures::entity::{Entity, Player};
use crate::data_structures::scene::{GuiTexture, Light, SkyBox};
use crate::data_structures::terrain::Terrain;
use crate::data_structures::transform::{projection_matrix, view_matrix};
use crate::gpu::{Capability, RenderApi};
use crate::input::{GamePad, TouchState};
use crate::pipelines::{EntityRenderer, GuiRenderer, SkyBoxRenderer, TerrainRenderer};
use crate::resources::Loader;

pub struct MasterRender {
    config: EngineConfig,
    projection: Matrix4<f32>,
    entity_renderer: EntityRenderer,
    terrain_renderer: TerrainRenderer,
    sky_box_renderer: SkyBoxRenderer,
    gui_renderer: GuiRenderer,
    entities: HashMap<String, Vec<Entity>>,
    terrains: Vec<Terrain>,
    guis: Vec<GuiTexture>,
    player: Option<Player>,
    sky_box: Option<SkyBox>,
    camera: ThirdPersonCamera,
    game_pad: GamePad,
    frame_start: Option<Instant>,
    time_to_render: f32,
}

impl MasterRender {
    /// Builds the renderers with a projection for the configured screen size.
    ///
    /// Shaders are read through the loader's assets; the GUI quad is uploaded
    /// through the loader and lives as long as it does.
    pub fn new(api: &mut dyn RenderApi, loader: &mut Loader, config: EngineConfig) -> Self {
        let projection = projection_matrix(&config);
        let entity_renderer = EntityRenderer::new(api, loader.assets(), projection);
        let terrain_renderer = TerrainRenderer::new(api, loader.assets(), projection);
        let sky_box_renderer = SkyBoxRenderer::new(api, loader.assets(), projection);
        let gui_renderer = GuiRenderer::new(api, loader);
        api.set_capability(Capability::CullBackFaces, true);

        Self {
            config,
            projection,
            entity_renderer,
            terrain_renderer,
            sky_box_renderer,
            gui_renderer,
            entities: HashMap::new(),
            terrains: Vec::new(),
            guis: Vec::new(),
            player: None,
            sky_box: None,
            camera: ThirdPersonCamera::default(),
            game_pad: GamePad::default(),
            frame_start: None,
            time_to_render: 0.0,
        }
    }

    /// Rebuilds the batches: every entity is appended under its model key.
    pub fn process_entities(&mut self, entities: &[Entity]) {
        self.entities.clear();
        for entity in entities {
            self.entities
                .entry(entity.model_key().to_string())
                .or_default()
                .push(entity.clone());
        }
    }

    pub fn process_terrains(&mut self, terrains: Vec<Terrain>) {
        self.terrains = terrains;
    }

    pub fn process_guis(&mut self, guis: Vec<GuiTexture>) {
        self.guis = guis;
    }

    pub fn process_player(&mut self, player: Player) {
        self.player = Some(player);
    }

    pub fn process_sky_box(&mut self, sky_box: SkyBox) {
        self.sky_box = Some(sky_box);
    }

    pub fn start_frame_render(&mut self) {
        self.frame_start = Some(Instant::now());
    }

    /// Renders one frame from the touch state captured before the frame began.
    pub fn render(&mut self, api: &mut dyn RenderApi, sun: &Light, touch: TouchState) {
        self.prepare(api);
        self.update_game_pad(touch);
        self.update_player();
        self.update_camera();
        let view = view_matrix(&self.camera.camera);
        let sky_colour = self.config.sky_colour;

        self.entity_renderer.render(
            api,
            sky_colour,
            sun,
            view,
            &self.entities,
            self.player.as_ref().map(|p| &p.entity),
        );
        self.terrain_renderer
            .render(api, sky_colour, sun, view, &self.terrains);
        if let Some(sky_box) = &self.sky_box {
            self.sky_box_renderer.render(api, view, sky_box);
        }
        self.gui_renderer.render(api, &self.guis);
    }

    pub fn end_frame_render(&mut self) {
        if let Some(start) = self.frame_start.take() {
            self.time_to_render = start.elapsed().as_secs_f32();
            log::trace!("Frame rendered in {:.2} ms", self.time_to_render * 1000.0);
        }
    }

    fn prepare(&self, api: &mut dyn RenderApi) {
        api.set_capability(Capability::DepthTest, true);
        api.clear(self.config.clear_colour);
    }

    /// A bound key is down iff the touch is active and on its button.
    fn update_game_pad(&mut self, touch: TouchState) {
        for gui in &self.guis {
            if let Some(key) = gui.game_pad_key {
                let pressed = touch.pressed && gui.contains_location(touch.x, touch.y);
                self.game_pad.set(key, pressed);
            }
        }
    }

    fn update_player(&mut self) {
        if let Some(player) = &mut self.player {
            player.move_player(self.time_to_render, &self.game_pad, self.terrains.first());
        }
    }

    fn update_camera(&mut self) {
        if let Some(player) = &self.player {
            self.camera.update(player);
        }
    }

    /// Releases every shader program, then every object the loader created.
    pub fn clean_up(&mut self, api: &mut dyn RenderApi, loader: &mut Loader) {
        self.entity_renderer.clean_up(api);
        self.terrain_renderer.clean_up(api);
        self.sky_box_renderer.clean_up(api);
        self.gui_renderer.clean_up(api);
        loader.shutdown(api);
    }

    pub fn batches(&self) -> &HashMap<String, Vec<Entity>> {
        &self.entities
    }

    pub fn terrains(&self) -> &[Terrain] {
        &self.terrains
    }

    pub fn guis(&self) -> &[GuiTexture] {
        &self.guis
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn game_pad(&self) -> &GamePad {
        &self.game_pad
    }

    pub fn camera(&self) -> &ThirdPersonCamera {
        &self.camera
    }

    pub fn projection(&self) -> Matrix4<f32> {
        self.projection
    }

    pub fn entity_renderer(&self) -> &EntityRenderer {
        &self.entity_renderer
    }

    /// Duration of the last complete frame in seconds.
    pub fn time_to_render(&self) -> f32 {
        self.time_to_render
    }

    /// Overrides the duration the next player update uses.
    pub fn set_time_to_render(&mut self, seconds: f32) {
        self.time_to_render = seconds;
    }
}
