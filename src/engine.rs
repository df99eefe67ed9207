//! Engine Core Module
//!
//! [`Engine`] bundles the renderer and input state without any window
//! management, so it can be driven by the winit runner or by tests.
//!
//! ```rust,ignore
//! let mut engine = Engine::new(RenderSettings::default(), StageConfig::default());
//! engine.init(window, 1280, 720).await?;
//!
//! loop {
//!     engine.update(dt);
//!     // ... render frame ...
//! }
//! ```

use std::sync::Arc;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::app::input::Input;
use crate::renderer::{RenderSettings, Renderer};
use crate::scene::PerspectiveCamera;
use crate::viewer::StageConfig;

/// Timing of the frame being updated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    /// Seconds since startup.
    pub time: f32,
    /// Seconds since the previous frame.
    pub dt: f32,
    pub frame_count: u64,
}

pub struct Engine {
    pub renderer: Renderer,
    pub input: Input,
    /// Camera used for the scene pass. Its aspect follows the surface.
    pub camera: PerspectiveCamera,

    time: f32,
    frame_count: u64,
}

impl Engine {
    /// GPU resources are not allocated until [`init`](Self::init) is called.
    #[must_use]
    pub fn new(settings: RenderSettings, stage: StageConfig) -> Self {
        Self {
            renderer: Renderer::new(settings, stage),
            input: Input::new(),
            camera: PerspectiveCamera::new(45.0, 16.0 / 9.0, 1.0, 2000.0),
            time: 0.0,
            frame_count: 0,
        }
    }

    pub async fn init<W>(
        &mut self,
        window: Arc<W>,
        width: u32,
        height: u32,
    ) -> crate::errors::Result<()>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        self.renderer.init(window, width, height).await?;
        self.input.inject_resize(width, height);
        self.camera.set_aspect(width, height);
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Current surface size, or `(0, 0)` before initialization.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        self.renderer.context().map_or((0, 0), |ctx| ctx.size())
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.renderer.resize(width, height);
        self.input.inject_resize(width, height);
        self.camera.set_aspect(width, height);
    }

    /// Renders the scene with no overlays.
    pub fn render(&mut self) {
        if let Some(composer) = self.renderer.begin_frame(&self.camera) {
            composer.render();
        }
    }

    /// Advances the clock and clears per-frame input. Call after the
    /// application has consumed this frame's input.
    pub fn update(&mut self, dt: f32) {
        self.time += dt;
        self.frame_count += 1;
        self.input.end_frame();
    }

    /// Snapshot of the timing for the frame about to be updated.
    #[must_use]
    pub fn frame_state(&self, dt: f32) -> FrameState {
        FrameState {
            time: self.time + dt,
            dt,
            frame_count: self.frame_count,
        }
    }
}
