//! Window creation and event handling via winit.
//!
//! [`AppState`] implements winit's [`ApplicationHandler`]. Input handlers
//! only record state or enqueue [`AnimationEvent`]s; the redraw handler is
//! the single consumer that applies them, advances the animation and draws.

use std::sync::Arc;

use glam::Vec2;
use terminus_animation::{AnimationEvent, AnimationState, EventQueue};
use terminus_config::Config;
use terminus_input::{MouseState, PointerSample};
use terminus_lighting::LightRig;
use terminus_render::{
    Camera, FrameEncoder, PhysicalSize, RenderContext, SurfaceError, SurfaceOptions,
    SurfaceWrapper, TextureLoader, TextureSlot, init_render_context_blocking,
};
use tracing::{debug, error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::game_loop::GameLoop;
use crate::renderer::SceneRenderer;
use crate::scene::Scene;

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ))
        .with_transparent(config.window.transparent)
}

/// Application state: window, GPU, scene and animation.
pub struct AppState {
    pub config: Config,
    pub window: Option<Arc<Window>>,
    pub gpu: Option<RenderContext>,
    pub renderer: Option<SceneRenderer>,
    pub surface_wrapper: SurfaceWrapper,
    pub game_loop: GameLoop,
    pub camera: Camera,
    pub scene: Scene,
    pub rig: LightRig,
    pub animation: AnimationState,
    pub events: EventQueue,
    /// Drained events waiting for the next tick.
    pending: Vec<AnimationEvent>,
    pub mouse_state: MouseState,
    loader: Option<TextureLoader>,
}

impl AppState {
    pub fn with_config(config: Config) -> Self {
        let width = config.window.width;
        let height = config.window.height;
        let surface_wrapper = SurfaceWrapper::new(width, height, 1.0);
        let size = surface_wrapper.physical_size();
        let camera = Camera::from_config(&config.camera, size.aspect_ratio());
        let animation = AnimationState::new(
            &config.animation,
            Vec2::new(size.width as f32, size.height as f32),
        );
        let mut scene = Scene::from_config(&config.scene);
        scene.update(&animation);

        Self {
            window: None,
            gpu: None,
            renderer: None,
            surface_wrapper,
            game_loop: GameLoop::new(),
            camera,
            scene,
            rig: LightRig::from_config(&config.lights),
            animation,
            events: EventQueue::new(),
            pending: Vec::new(),
            mouse_state: MouseState::new(),
            loader: None,
            config,
        }
    }

    pub fn surface_width(&self) -> u32 {
        self.surface_wrapper.physical_size().width
    }

    pub fn surface_height(&self) -> u32 {
        self.surface_wrapper.physical_size().height
    }

    /// Turns a cursor position into a pointer event: display UV for the
    /// shader and a point on the camera ray for the light.
    pub fn pointer_event(&self, x: f64, y: f64) -> AnimationEvent {
        let sample = PointerSample::from_screen(
            x as f32,
            y as f32,
            self.surface_width() as f32,
            self.surface_height() as f32,
        );
        let ray = self.camera.ray_from_ndc(sample.ndc);
        AnimationEvent::PointerMoved {
            uv: sample.uv,
            light_position: ray.at(self.config.scene.light_ray_distance),
        }
    }

    fn handle_resize(&mut self, width: u32, height: u32) {
        if let Some(size) = self.surface_wrapper.handle_resize(width, height) {
            self.apply_size(size);
        }
    }

    /// Pushes a new physical size to the camera, surface, depth buffer and
    /// shading uniforms.
    fn apply_size(&mut self, size: PhysicalSize) {
        self.camera
            .set_aspect_ratio(size.width as f32, size.height as f32);
        if let Some(gpu) = &mut self.gpu {
            gpu.resize(size.width, size.height);
            if let Some(renderer) = &mut self.renderer {
                renderer.resize(&gpu.device, size.width, size.height);
            }
        }
        self.events.push(AnimationEvent::Resized {
            width: size.width,
            height: size.height,
        });
        info!("Window resized to {}x{}", size.width, size.height);
    }

    fn request_textures(&mut self) {
        let loader = match TextureLoader::new() {
            Ok(loader) => loader,
            Err(e) => {
                warn!("Texture loader unavailable, keeping placeholders: {e}");
                return;
            }
        };
        let assets = &self.config.assets;
        for slot in TextureSlot::ALL {
            let file = match slot {
                TextureSlot::Day => &assets.day,
                TextureSlot::Displacement => &assets.displacement,
                TextureSlot::Clouds => &assets.clouds,
                TextureSlot::Night => &assets.night,
                TextureSlot::Environment => &assets.environment,
            };
            if let Err(e) = loader.request(slot, assets.path(file)) {
                warn!("Could not queue {slot:?}: {e}");
            }
        }
        self.loader = Some(loader);
    }

    fn apply_loaded_textures(&mut self) {
        let (Some(loader), Some(gpu), Some(renderer)) =
            (&self.loader, &self.gpu, &mut self.renderer)
        else {
            return;
        };
        for outcome in loader.drain_results() {
            renderer.apply_texture(&gpu.device, outcome, &mut self.rig);
        }
    }

    /// Queues one pointer event for the latest cursor position, if the
    /// cursor moved since the last redraw.
    fn queue_pointer_move(&mut self) {
        if !self.mouse_state.moved() {
            return;
        }
        let position = self.mouse_state.position();
        let event = self.pointer_event(position.x as f64, position.y as f64);
        self.events.push(event);
    }

    fn advance_animation(&mut self) {
        let frame_time = self.game_loop.measure();
        self.advance_animation_by(frame_time);
    }

    /// Applies this frame's input and runs the ticks `frame_time` covers.
    ///
    /// Pointer moves and resizes land immediately, so the sun marker and its
    /// lights match the pointer in this frame even when no tick is due.
    /// Clicks go to the first tick; with none due they wait for the next
    /// frame. Returns how many ticks ran.
    fn advance_animation_by(&mut self, frame_time: f64) -> u32 {
        for event in self.events.drain() {
            if !self.animation.apply_input(&event) {
                self.pending.push(event);
            }
        }

        let pending = &mut self.pending;
        let animation = &mut self.animation;
        let ticks = self.game_loop.advance(frame_time, |now| {
            let events = std::mem::take(pending);
            let report = animation.tick(now, &events);
            if report.fade_write.is_some() && report.oscillator_write.is_some() {
                debug!(
                    "Oscillator value {:?} hidden by fade {:?}",
                    report.oscillator_write, report.fade_write
                );
            }
        });

        self.rig.follow_light_marker(
            self.animation.light_position,
            self.config.scene.directional_radius,
        );
        self.scene.update(&self.animation);
        ticks
    }

    fn draw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(gpu), Some(renderer)) = (&self.gpu, &self.renderer) else {
            return;
        };
        renderer.update(&self.scene, &self.animation, &self.rig, &self.camera);

        match gpu.get_current_texture() {
            Ok(surface_texture) => {
                let order = self.scene.draw_order(&self.camera);
                let mut frame =
                    FrameEncoder::new(&gpu.device, Arc::clone(&gpu.queue), surface_texture);
                renderer.render(&mut frame, &order);
                frame.submit();
            }
            Err(SurfaceError::Timeout) => {
                debug!("Surface timeout, skipping frame");
            }
            Err(e) => {
                error!("Surface error: {e}");
                event_loop.exit();
            }
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let window = match event_loop.create_window(window_attributes_from_config(&self.config)) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Window creation failed: {e}");
                event_loop.exit();
                return;
            }
        };

        let inner = window.inner_size();
        self.surface_wrapper = SurfaceWrapper::new(inner.width, inner.height, window.scale_factor());
        let size = self.surface_wrapper.physical_size();
        self.camera
            .set_aspect_ratio(size.width as f32, size.height as f32);
        self.events.push(AnimationEvent::Resized {
            width: size.width,
            height: size.height,
        });
        info!(
            "Surface wrapper initialized: {}x{} (scale: {:.2})",
            size.width,
            size.height,
            window.scale_factor()
        );

        let options = SurfaceOptions {
            vsync: self.config.window.vsync,
            transparent: self.config.window.transparent,
        };
        let gpu = match init_render_context_blocking(Arc::clone(&window), options) {
            Ok(gpu) => gpu,
            Err(e) => {
                error!("GPU initialization failed: {e}");
                event_loop.exit();
                return;
            }
        };

        match SceneRenderer::new(
            &gpu.device,
            Arc::clone(&gpu.queue),
            gpu.surface_format,
            (size.width, size.height),
            &self.config,
            &self.scene,
            &self.camera,
            &self.animation,
            &self.rig,
        ) {
            Ok(renderer) => self.renderer = Some(renderer),
            Err(e) => {
                error!("Shader setup failed: {e}");
                event_loop.exit();
                return;
            }
        }

        self.gpu = Some(gpu);
        self.request_textures();
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                if let Some(loader) = &mut self.loader {
                    loader.shutdown();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.handle_resize(new_size.width, new_size.height);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(window) = &self.window {
                    let inner = window.inner_size();
                    if let Some(size) = self.surface_wrapper.handle_scale_factor_changed(
                        scale_factor,
                        inner.width,
                        inner.height,
                    ) {
                        self.apply_size(size);
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse_state.on_cursor_moved(position.x, position.y);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let before = self.mouse_state.clicks();
                self.mouse_state.on_button(button, state);
                for _ in before..self.mouse_state.clicks() {
                    self.events.push(AnimationEvent::Clicked);
                }
            }
            WindowEvent::RedrawRequested => {
                self.apply_loaded_textures();
                self.queue_pointer_move();
                self.advance_animation();
                self.draw(event_loop);
                self.mouse_state.clear_transients();

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Creates an event loop and runs the viewer until the window closes.
#[instrument(skip(config))]
pub fn run(config: Config) -> Result<(), winit::error::EventLoopError> {
    let event_loop = EventLoop::new()?;
    let mut app = AppState::with_config(config);
    event_loop.run_app(&mut app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_loop::FIXED_DT;
    use crate::scene::SceneMesh;
    use glam::Vec3;

    #[test]
    fn test_initial_dimensions_follow_config() {
        let state = AppState::with_config(Config::default());
        assert_eq!(state.surface_width(), 1280);
        assert_eq!(state.surface_height(), 720);
        assert!(state.window.is_none());
        assert!(state.gpu.is_none());
    }

    #[test]
    fn test_pointer_event_at_center() {
        let state = AppState::with_config(Config::default());
        let AnimationEvent::PointerMoved { uv, light_position } = state.pointer_event(640.0, 360.0)
        else {
            panic!("expected a pointer event");
        };
        assert_eq!(uv, Vec2::splat(0.5));
        assert!((light_position - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_pointer_event_light_is_one_unit_from_camera() {
        let state = AppState::with_config(Config::default());
        let AnimationEvent::PointerMoved { uv, light_position } = state.pointer_event(0.0, 0.0)
        else {
            panic!("expected a pointer event");
        };
        assert_eq!(uv, Vec2::new(0.0, 1.0));
        assert!((light_position.distance(state.camera.position) - 1.0).abs() < 1e-5);
        assert!(light_position.x < 0.0 && light_position.y > 0.0);
    }

    #[test]
    fn test_resize_without_gpu_queues_event() {
        let mut state = AppState::with_config(Config::default());
        state.handle_resize(800, 600);
        assert_eq!(state.surface_width(), 800);
        assert!((state.camera.aspect_ratio - 800.0 / 600.0).abs() < 1e-6);
        assert_eq!(
            state.events.drain(),
            vec![AnimationEvent::Resized {
                width: 800,
                height: 600
            }]
        );
    }

    #[test]
    fn test_unchanged_resize_is_ignored() {
        let mut state = AppState::with_config(Config::default());
        state.handle_resize(1280, 720);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_pointer_moves_light_in_a_frame_without_ticks() {
        let mut state = AppState::with_config(Config::default());
        let event = state.pointer_event(0.0, 0.0);
        let AnimationEvent::PointerMoved { light_position, .. } = event else {
            panic!("expected a pointer event");
        };
        state.events.push(event);

        assert_eq!(state.advance_animation_by(0.25 * FIXED_DT), 0);
        assert_eq!(state.animation.light_position, light_position);
        assert_eq!(state.rig.sun.position, light_position);
        let sun = state.scene.model(SceneMesh::Sun).transform_point3(Vec3::ZERO);
        assert!((sun - light_position).length() < 1e-6);
    }

    #[test]
    fn test_click_waits_for_the_next_tick() {
        let mut state = AppState::with_config(Config::default());
        state.events.push(AnimationEvent::Clicked);

        assert_eq!(state.advance_animation_by(0.25 * FIXED_DT), 0);
        assert!(state.animation.active_fade().is_none());
        assert_eq!(state.pending, vec![AnimationEvent::Clicked]);

        assert_eq!(state.advance_animation_by(FIXED_DT), 1);
        assert!(state.animation.active_fade().is_some());
        assert!(state.pending.is_empty());
    }

    #[test]
    fn test_cursor_moves_coalesce_into_one_event() {
        let mut state = AppState::with_config(Config::default());
        state.queue_pointer_move();
        assert!(state.events.is_empty());

        state.mouse_state.on_cursor_moved(10.0, 10.0);
        state.mouse_state.on_cursor_moved(640.0, 360.0);
        state.queue_pointer_move();
        assert_eq!(state.events.drain(), vec![state.pointer_event(640.0, 360.0)]);
    }

    #[test]
    fn test_queued_events_reach_the_animation() {
        let mut state = AppState::with_config(Config::default());
        let event = state.pointer_event(0.0, 0.0);
        state.events.push(event);
        state.events.push(AnimationEvent::Clicked);
        state.pending.extend(state.events.drain());
        let events = std::mem::take(&mut state.pending);
        let report = state.animation.tick(1.0 / 60.0, &events);
        assert_eq!(report.clicks, 1);
        assert_eq!(state.animation.pointer_uv, Vec2::new(0.0, 1.0));
    }
}
