use std::sync::Arc;

use glam::{Quat, Vec3};

use crate::animation::binding::PropertyBinding;
use crate::animation::clip::{AnimationClip, TrackData};
use crate::animation::tracks::KeyframeCursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    /// Play to the end and hold the last pose.
    Once,
    /// Wrap around at the end.
    Loop,
    /// Alternate direction every pass.
    PingPong,
}

/// A linear weight ramp, advanced by the owning action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightFade {
    pub from: f32,
    pub to: f32,
    pub duration: f32,
    pub elapsed: f32,
}

impl WeightFade {
    #[must_use]
    pub fn new(from: f32, to: f32, duration: f32) -> Self {
        Self {
            from,
            to,
            duration: duration.max(0.0),
            elapsed: 0.0,
        }
    }

    #[must_use]
    pub fn value(&self) -> f32 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let t = (self.elapsed / self.duration).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * t
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Playback state of one clip inside a mixer.
///
/// The blended contribution of an action is `weight` scaled by the current
/// fade value, exposed as [`effective_weight`](Self::effective_weight).
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: Arc<AnimationClip>,

    /// Local clip time within the current loop pass.
    pub time: f32,
    pub time_scale: f32,
    pub weight: f32,
    pub loop_mode: LoopMode,
    /// Number of passes before the action stops; `None` loops forever.
    pub repetitions: Option<u32>,
    pub paused: bool,
    pub enabled: bool,

    pub bindings: Vec<PropertyBinding>,

    pub(crate) track_cursors: Vec<KeyframeCursor>,

    loop_count: u32,
    fade: Option<WeightFade>,
    effective_weight: f32,
}

impl AnimationAction {
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>, bindings: Vec<PropertyBinding>) -> Self {
        let track_count = clip.tracks.len();
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            weight: 1.0,
            loop_mode: LoopMode::Loop,
            repetitions: None,
            paused: false,
            enabled: true,
            bindings,
            track_cursors: vec![KeyframeCursor::default(); track_count],
            loop_count: 0,
            fade: None,
            effective_weight: 1.0,
        }
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    /// Rewinds to the start and re-enables the action. Cancels any fade.
    pub fn reset(&mut self) -> &mut Self {
        self.paused = false;
        self.enabled = true;
        self.time = 0.0;
        self.loop_count = 0;
        self.track_cursors.fill(KeyframeCursor::default());
        self.stop_fading()
    }

    /// Sets the base weight and cancels any fade.
    pub fn set_effective_weight(&mut self, weight: f32) -> &mut Self {
        self.weight = weight;
        self.effective_weight = if self.enabled { weight } else { 0.0 };
        self.stop_fading()
    }

    pub fn set_loop(&mut self, mode: LoopMode, repetitions: Option<u32>) -> &mut Self {
        self.loop_mode = mode;
        self.repetitions = repetitions;
        self
    }

    /// Ramps the weight multiplier from 0 to 1 over `duration` seconds.
    pub fn fade_in(&mut self, duration: f32) -> &mut Self {
        self.schedule_fade(duration, 0.0, 1.0)
    }

    /// Ramps the weight multiplier from 1 to 0 over `duration` seconds. The
    /// action disables itself when the ramp completes.
    pub fn fade_out(&mut self, duration: f32) -> &mut Self {
        self.schedule_fade(duration, 1.0, 0.0)
    }

    pub fn stop_fading(&mut self) -> &mut Self {
        self.fade = None;
        self
    }

    fn schedule_fade(&mut self, duration: f32, from: f32, to: f32) -> &mut Self {
        let fade = WeightFade::new(from, to, duration);
        self.effective_weight = if self.enabled {
            self.weight * fade.value()
        } else {
            0.0
        };
        self.fade = Some(fade);
        self
    }

    #[must_use]
    pub fn fade(&self) -> Option<&WeightFade> {
        self.fade.as_ref()
    }

    #[must_use]
    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// Weight this action contributes to the blend this frame.
    #[must_use]
    pub fn effective_weight(&self) -> f32 {
        self.effective_weight
    }

    #[must_use]
    pub fn loop_count(&self) -> u32 {
        self.loop_count
    }

    /// Whether time is advancing.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.enabled && !self.paused && self.time_scale != 0.0
    }

    /// Clip time used for sampling. Ping-pong mirrors every odd pass.
    #[must_use]
    pub fn sample_time(&self) -> f32 {
        if self.loop_mode == LoopMode::PingPong && self.loop_count % 2 == 1 {
            self.clip.duration - self.time
        } else {
            self.time
        }
    }

    /// Advances the fade and the clip time by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        if !self.enabled {
            self.effective_weight = 0.0;
            return;
        }

        self.update_weight(dt);

        if !self.paused {
            self.advance_time(dt * self.time_scale);
        }
    }

    fn update_weight(&mut self, dt: f32) {
        let mut weight = self.weight;

        if let Some(fade) = self.fade.as_mut() {
            fade.elapsed += dt;
            let value = fade.value();
            weight *= value;

            if fade.is_finished() {
                self.fade = None;
                if value <= 0.0 {
                    self.enabled = false;
                    weight = 0.0;
                }
            }
        }

        self.effective_weight = weight;
    }

    fn advance_time(&mut self, delta: f32) {
        let duration = self.clip.duration;
        if duration <= 0.0 || delta == 0.0 {
            return;
        }

        let mut time = self.time + delta;

        match self.loop_mode {
            LoopMode::Once => {
                if time >= duration {
                    time = duration;
                    self.paused = true;
                } else if time < 0.0 {
                    time = 0.0;
                    self.paused = true;
                }
            }
            LoopMode::Loop | LoopMode::PingPong => {
                if time >= duration || time < 0.0 {
                    let passes = (time / duration).floor();
                    time -= passes * duration;
                    self.loop_count = self.loop_count.saturating_add(passes.abs() as u32);

                    if let Some(limit) = self.repetitions
                        && self.loop_count >= limit
                    {
                        self.loop_count = limit;
                        time = if delta > 0.0 { duration } else { 0.0 };
                        self.paused = true;
                    }
                }
            }
        }

        self.time = time;
    }

    /// Samples the track behind `self.bindings[binding_index]`.
    pub fn sample_binding(&mut self, binding_index: usize) -> Option<TrackValue> {
        let binding = *self.bindings.get(binding_index)?;
        let time = self.sample_time();
        let track = self.clip.tracks.get(binding.track_index)?;
        let cursor = self.track_cursors.get_mut(binding.track_index)?;

        match &track.data {
            TrackData::Vector3(t) => t.sample_with_cursor(time, cursor).map(TrackValue::Vector3),
            TrackData::Quaternion(t) => {
                t.sample_with_cursor(time, cursor).map(TrackValue::Quaternion)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackValue {
    Vector3(Vec3),
    Quaternion(Quat),
}
