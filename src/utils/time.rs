use std::time::{Duration, Instant};

/// Frame clock.
///
/// Deltas are clamped to [`max_delta`](Self::max_delta) so a stalled frame
/// (window drag, breakpoint) does not jump animations forward.
#[derive(Debug, Clone)]
pub struct Timer {
    last_update: Instant,
    /// Time since the last tick, after clamping.
    pub delta: Duration,
    /// Sum of all clamped deltas.
    pub elapsed: Duration,
    pub frame_count: u64,
    pub max_delta: Duration,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_update: Instant::now(),
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
            max_delta: Duration::from_millis(100),
        }
    }

    /// Measures wall time since the previous tick.
    pub fn tick(&mut self) {
        let now = Instant::now();
        let raw = now - self.last_update;
        self.last_update = now;
        self.advance(raw);
    }

    /// Advances by a given amount instead of measuring.
    pub fn advance(&mut self, raw: Duration) {
        self.delta = raw.min(self.max_delta);
        self.elapsed += self.delta;
        self.frame_count += 1;
    }

    #[must_use]
    pub fn dt_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }
}
