//! Application event loop.
//!
//! The window, the wgpu [`Context`] and the default world are created on the
//! first `resumed` event. Every `RedrawRequested` then runs one frame:
//!
//! 1. re-batch the entities and take a snapshot of the touch state,
//! 2. `start_frame_render`, `render`, replay the recorded draws into the
//!    surface texture and present it,
//! 3. `end_frame_render` and request the next redraw.
//!
//! Mouse presses stand in for touches on desktop platforms.

use std::sync::Arc;

use tokio::runtime::Runtime;
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, MouseButton, TouchPhase, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

use crate::config::EngineConfig;
use crate::context::Context;
use crate::data_structures::entity::Entity;
use crate::data_structures::scene::Light;
use crate::input::TouchInput;
use crate::render::MasterRender;
use crate::resources::{Assets, Loader};
use crate::world::World;

/// Everything alive while the window exists.
struct Engine {
    ctx: Context,
    loader: Loader,
    master: MasterRender,
    entities: Vec<Entity>,
    light: Light,
    touch: TouchInput,
    cursor: PhysicalPosition<f64>,
}

impl Engine {
    fn new(mut ctx: Context, config: &EngineConfig) -> Self {
        let config = config
            .clone()
            .with_screen_size(ctx.config.width, ctx.config.height);
        let mut loader = Loader::new(Assets::new(config.asset_root.clone()));
        let mut master = MasterRender::new(&mut ctx.api, &mut loader, config.clone());

        let world = World::generate(&mut ctx.api, &mut loader, &mut rand::thread_rng());
        log::info!("World generated with {} entities", world.entities.len());
        master.process_terrains(vec![world.terrain]);
        master.process_guis(world.guis);
        master.process_sky_box(world.sky_box);
        if let Some(player) = world.player {
            master.process_player(player);
        }

        Self {
            touch: TouchInput::new(config.width, config.height),
            ctx,
            loader,
            master,
            entities: world.entities,
            light: world.light,
            cursor: PhysicalPosition::new(0.0, 0.0),
        }
    }

    fn render_frame(&mut self) {
        self.master.process_entities(&self.entities);
        let touch = self.touch.snapshot();

        self.master.start_frame_render();
        self.master.render(&mut self.ctx.api, &self.light, touch);
        match self.ctx.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(output)
            | wgpu::CurrentSurfaceTexture::Suboptimal(output) => {
                let view = output
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                self.ctx.api.end_frame(&view);
                output.present();
            }
            wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated => {
                self.ctx.api.discard_frame();
                let size = self.ctx.window().inner_size();
                self.ctx.resize(size.width, size.height);
            }
            e => {
                self.ctx.api.discard_frame();
                log::error!("Unable to render {:?}", e);
            }
        }
        self.master.end_frame_render();
    }

    fn clean_up(&mut self) {
        self.master.clean_up(&mut self.ctx.api, &mut self.loader);
    }
}

struct App {
    config: EngineConfig,
    async_runtime: Runtime,
    engine: Option<Engine>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.engine.is_some() {
            return;
        }
        let window_attributes = Window::default_attributes()
            .with_title("terra-ngin")
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Could not create a window: {}", e);
                event_loop.exit();
                return;
            }
        };

        match self.async_runtime.block_on(Context::new(window.clone())) {
            Ok(ctx) => {
                self.engine = Some(Engine::new(ctx, &self.config));
                window.request_redraw();
            }
            Err(e) => {
                log::error!("App initialization failed: {:#}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(engine) = &mut self.engine else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                engine.ctx.resize(size.width, size.height);
                engine.touch.resize(size.width, size.height);
            }
            WindowEvent::CursorMoved { position, .. } => {
                engine.cursor = position;
                engine.touch.touch_moved(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => engine
                    .touch
                    .touch_down(engine.cursor.x as f32, engine.cursor.y as f32),
                ElementState::Released => engine.touch.touch_up(),
            },
            WindowEvent::Touch(touch) => {
                let (x, y) = (touch.location.x as f32, touch.location.y as f32);
                match touch.phase {
                    TouchPhase::Started => engine.touch.touch_down(x, y),
                    TouchPhase::Moved => engine.touch.touch_moved(x, y),
                    TouchPhase::Ended | TouchPhase::Cancelled => engine.touch.touch_up(),
                }
            }
            WindowEvent::RedrawRequested => {
                engine.render_frame();
                engine.ctx.window().request_redraw();
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut engine) = self.engine.take() {
            engine.clean_up();
        }
    }
}

/// Opens a window and runs the default world until it is closed.
pub fn run(config: EngineConfig) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let event_loop = EventLoop::new()?;
    let mut app = App {
        config,
        async_runtime: Runtime::new()?,
        engine: None,
    };
    event_loop.run_app(&mut app)?;
    Ok(())
}
