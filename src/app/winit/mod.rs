//! Winit-based Application Framework
//!
//! - [`App`]: builder for configuring and launching the window
//! - [`AppHandler`]: trait the application implements
//!
//! ```rust,ignore
//! use marionette::app::winit::{App, AppHandler};
//!
//! struct Viewer;
//!
//! impl AppHandler for Viewer {
//!     fn init(engine: &mut Engine, window: &Arc<Window>) -> Self {
//!         Viewer
//!     }
//! }
//!
//! fn main() -> marionette::errors::Result<()> {
//!     App::new().with_title("Viewer").run::<Viewer>()
//! }
//! ```

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
pub use winit::window::{Window, WindowId};

use crate::engine::{Engine, FrameState};
use crate::errors::Error;
use crate::renderer::RenderSettings;
use crate::utils::Timer;
use crate::viewer::StageConfig;

pub mod input_adapter;

/// Application behaviour driven by the event loop.
///
/// Lifecycle: [`init`](Self::init) once the renderer is ready, then per
/// frame [`on_event`](Self::on_event) for each event,
/// [`update`](Self::update), and [`compose_frame`](Self::compose_frame).
pub trait AppHandler: Sized + 'static {
    fn init(engine: &mut Engine, window: &Arc<Window>) -> Self;

    /// Return `true` to consume the event. Consumed events skip input
    /// tracking but resizes and redraws are still handled.
    #[allow(unused_variables)]
    fn on_event(&mut self, engine: &mut Engine, window: &Arc<Window>, event: &WindowEvent) -> bool {
        false
    }

    #[allow(unused_variables)]
    fn update(&mut self, engine: &mut Engine, window: &Arc<Window>, frame: &FrameState) {}

    /// Records and presents the frame. Override to add overlay nodes
    /// through [`Renderer::begin_frame`](crate::renderer::Renderer::begin_frame).
    fn compose_frame(&mut self, engine: &mut Engine) {
        engine.render();
    }
}

type InitFn<H> = Box<dyn FnOnce(&mut Engine, &Arc<Window>) -> H>;

pub struct App {
    title: String,
    render_settings: RenderSettings,
    stage: StageConfig,
    inner_size: (f64, f64),
}

impl App {
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: "Marionette".into(),
            render_settings: RenderSettings::default(),
            stage: StageConfig::default(),
            inner_size: (1280.0, 720.0),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: RenderSettings) -> Self {
        self.render_settings = settings;
        self
    }

    #[must_use]
    pub fn with_stage(mut self, stage: StageConfig) -> Self {
        self.stage = stage;
        self
    }

    /// Logical window size.
    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.inner_size = (width, height);
        self
    }

    pub fn run<H: AppHandler>(self) -> crate::errors::Result<()> {
        self.run_with(H::init)
    }

    /// Like [`run`](Self::run) with a custom constructor, for handlers that
    /// need state from outside the event loop.
    pub fn run_with<H, F>(self, init: F) -> crate::errors::Result<()>
    where
        H: AppHandler,
        F: FnOnce(&mut Engine, &Arc<Window>) -> H + 'static,
    {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut runner = AppRunner::<H>::new(self, Box::new(init));
        event_loop.run_app(&mut runner).map_err(Error::from)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

struct AppRunner<H: AppHandler> {
    config: App,
    init: Option<InitFn<H>>,

    window: Option<Arc<Window>>,
    engine: Option<Engine>,
    user_state: Option<H>,

    timer: Timer,
}

impl<H: AppHandler> AppRunner<H> {
    fn new(config: App, init: InitFn<H>) -> Self {
        Self {
            config,
            init: Some(init),
            window: None,
            engine: None,
            user_state: None,
            timer: Timer::new(),
        }
    }

    fn update_logic(&mut self) {
        self.timer.tick();
        let dt = self.timer.dt_seconds();

        let (Some(window), Some(engine), Some(user_state)) =
            (&self.window, &mut self.engine, &mut self.user_state)
        else {
            return;
        };

        let frame_state = engine.frame_state(dt);
        user_state.update(engine, window, &frame_state);
        engine.update(dt);
    }

    fn render_frame(&mut self) {
        let (Some(engine), Some(user_state)) = (&mut self.engine, &mut self.user_state) else {
            return;
        };
        user_state.compose_frame(engine);
    }

    fn redraw(&mut self) {
        self.update_logic();
        self.render_frame();
        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }
}

impl<H: AppHandler> ApplicationHandler for AppRunner<H> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let Some(init) = self.init.take() else {
            return;
        };

        let (w, h) = self.config.inner_size;
        let window_attributes = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(w, h));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        log::info!("Initializing Renderer Backend...");

        let mut engine = Engine::new(
            self.config.render_settings.clone(),
            self.config.stage.clone(),
        );
        let size = window.inner_size();

        if let Err(e) = pollster::block_on(engine.init(window.clone(), size.width, size.height)) {
            log::error!("Fatal Renderer Error: {e}");
            event_loop.exit();
            return;
        }

        self.user_state = Some(init(&mut engine, &window));
        self.engine = Some(engine);
        self.timer = Timer::new();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let (Some(window), Some(engine), Some(user_state)) =
            (&self.window, &mut self.engine, &mut self.user_state)
        else {
            return;
        };

        let consumed = user_state.on_event(engine, window, &event);
        if !consumed {
            input_adapter::process_window_event(&mut engine.input, &event);
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(physical_size) => {
                engine.resize(physical_size.width, physical_size.height);
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.engine.is_some()
            && let Some(window) = &self.window
        {
            window.request_redraw();
        }
    }
}
