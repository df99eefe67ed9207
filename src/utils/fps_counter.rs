use std::time::{Duration, Instant};

/// Frame rate averaged over one-second windows.
pub struct FpsCounter {
    last_update: Instant,
    frame_count: u32,
    accumulated_time: Duration,
    pub current_fps: f32,
    /// Mean frame time of the last window, in milliseconds.
    pub frame_time_ms: f32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsCounter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_update: Instant::now(),
            frame_count: 0,
            accumulated_time: Duration::ZERO,
            current_fps: 0.0,
            frame_time_ms: 0.0,
        }
    }

    /// Counts one frame. Returns the new rate when a window closes.
    pub fn update(&mut self) -> Option<f32> {
        let now = Instant::now();
        let delta = now - self.last_update;
        self.last_update = now;
        self.record(delta)
    }

    /// Counts one frame of the given duration.
    pub fn record(&mut self, delta: Duration) -> Option<f32> {
        self.frame_count += 1;
        self.accumulated_time += delta;

        let window = self.accumulated_time.as_secs_f32();
        if window < 1.0 {
            return None;
        }

        self.current_fps = self.frame_count as f32 / window;
        self.frame_time_ms = window * 1000.0 / self.frame_count as f32;
        self.accumulated_time = Duration::ZERO;
        self.frame_count = 0;
        Some(self.current_fps)
    }
}
