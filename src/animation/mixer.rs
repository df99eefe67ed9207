use std::sync::Arc;

use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};

use crate::animation::action::{AnimationAction, TrackValue};
use crate::animation::binder::Binder;
use crate::animation::binding::TargetPath;
use crate::animation::clip::AnimationClip;
use crate::scene::{Model, NodeHandle, RestValue};

new_key_type! {
    pub struct ActionHandle;
}

/// Running weighted accumulation for one bound property.
#[derive(Debug, Clone, Copy)]
struct Accumulator {
    value: TrackValue,
    weight: f32,
}

impl Accumulator {
    fn accumulate(&mut self, value: TrackValue, weight: f32) {
        self.weight += weight;
        let mix = weight / self.weight;
        self.value = match (self.value, value) {
            (TrackValue::Vector3(a), TrackValue::Vector3(b)) => TrackValue::Vector3(a.lerp(b, mix)),
            (TrackValue::Quaternion(a), TrackValue::Quaternion(b)) => {
                TrackValue::Quaternion(a.slerp(b, mix))
            }
            (current, _) => current,
        };
    }

    /// Fills the missing weight with the rest value.
    fn resolve(self, rest: RestValue) -> TrackValue {
        if self.weight >= 1.0 {
            return self.value;
        }
        let t = 1.0 - self.weight;
        match (self.value, rest) {
            (TrackValue::Vector3(v), RestValue::Vector3(r)) => TrackValue::Vector3(v.lerp(r, t)),
            (TrackValue::Quaternion(q), RestValue::Quaternion(r)) => {
                TrackValue::Quaternion(q.slerp(r, t))
            }
            (value, _) => value,
        }
    }
}

/// Owns the actions playing on one model and blends their output.
///
/// Actions are cached per clip name, so asking for the same clip twice yields
/// the same handle.
#[derive(Debug, Default)]
pub struct AnimationMixer {
    actions: SlotMap<ActionHandle, AnimationAction>,
    by_clip: FxHashMap<String, ActionHandle>,
    scheduled: Vec<ActionHandle>,

    time: f32,
    pub time_scale: f32,

    blend: FxHashMap<(NodeHandle, TargetPath), Accumulator>,
}

impl AnimationMixer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            time_scale: 1.0,
            ..Self::default()
        }
    }

    /// Returns the action for `clip`, creating and binding it on first use.
    ///
    /// If a different clip was registered under the same name since, the
    /// cached action is rebuilt around the new clip and keeps its handle.
    pub fn clip_action(&mut self, clip: &Arc<AnimationClip>, model: &Model) -> ActionHandle {
        if let Some(&handle) = self.by_clip.get(&clip.name)
            && let Some(action) = self.actions.get_mut(handle)
        {
            if !Arc::ptr_eq(action.clip(), clip) {
                *action = AnimationAction::new(Arc::clone(clip), Binder::bind(model, clip));
            }
            return handle;
        }

        let action = AnimationAction::new(Arc::clone(clip), Binder::bind(model, clip));
        let handle = self.actions.insert(action);
        self.by_clip.insert(clip.name.clone(), handle);
        handle
    }

    #[must_use]
    pub fn existing_action(&self, clip_name: &str) -> Option<ActionHandle> {
        self.by_clip.get(clip_name).copied()
    }

    #[must_use]
    pub fn action(&self, handle: ActionHandle) -> Option<&AnimationAction> {
        self.actions.get(handle)
    }

    pub fn action_mut(&mut self, handle: ActionHandle) -> Option<&mut AnimationAction> {
        self.actions.get_mut(handle)
    }

    /// Schedules an action for updates and blending.
    pub fn play(&mut self, handle: ActionHandle) {
        if self.actions.contains_key(handle) && !self.scheduled.contains(&handle) {
            self.scheduled.push(handle);
        }
    }

    /// Unschedules and resets an action.
    pub fn stop(&mut self, handle: ActionHandle) {
        self.scheduled.retain(|h| *h != handle);
        if let Some(action) = self.actions.get_mut(handle) {
            action.reset();
        }
    }

    pub fn stop_all(&mut self) {
        for handle in std::mem::take(&mut self.scheduled) {
            if let Some(action) = self.actions.get_mut(handle) {
                action.reset();
            }
        }
    }

    #[must_use]
    pub fn is_scheduled(&self, handle: ActionHandle) -> bool {
        self.scheduled.contains(&handle)
    }

    /// Handles of all scheduled actions, in play order.
    #[must_use]
    pub fn scheduled(&self) -> &[ActionHandle] {
        &self.scheduled
    }

    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Advances every scheduled action and writes the blended pose into
    /// `model`.
    ///
    /// Actions whose fade-out completed during this step are unscheduled.
    pub fn update(&mut self, dt: f32, model: &mut Model) {
        let dt = dt * self.time_scale;
        self.time += dt;

        for &handle in &self.scheduled {
            if let Some(action) = self.actions.get_mut(handle) {
                action.update(dt);
            }
        }

        self.blend.clear();
        for &handle in &self.scheduled {
            let Some(action) = self.actions.get_mut(handle) else {
                continue;
            };
            let weight = action.effective_weight();
            if weight <= 0.0 {
                continue;
            }

            for i in 0..action.bindings.len() {
                let binding = action.bindings[i];
                let Some(value) = action.sample_binding(i) else {
                    continue;
                };
                self.blend
                    .entry((binding.node, binding.target))
                    .and_modify(|acc| acc.accumulate(value, weight))
                    .or_insert(Accumulator { value, weight });
            }
        }

        for (&(node, target), acc) in &self.blend {
            let Some(rest) = model.rest_value(node, target) else {
                continue;
            };
            let Some(node) = model.get_node_mut(node) else {
                continue;
            };
            match (target, acc.resolve(rest)) {
                (TargetPath::Translation, TrackValue::Vector3(v)) => node.transform.position = v,
                (TargetPath::Scale, TrackValue::Vector3(v)) => node.transform.scale = v,
                (TargetPath::Rotation, TrackValue::Quaternion(q)) => node.transform.rotation = q,
                _ => {}
            }
        }

        let actions = &self.actions;
        self.scheduled
            .retain(|h| actions.get(*h).is_some_and(|a| a.enabled));
    }
}
