use std::sync::Arc;

use crate::animation::{ActionHandle, AnimationClip, AnimationMixer, LoopMode};
use crate::scene::Model;
use crate::viewer::registry::ClipRegistry;

/// The model together with the mixer driving it.
#[derive(Debug)]
struct Rig {
    model: Model,
    mixer: AnimationMixer,
}

/// Viewer playback state: the attached model, loaded clips, the current
/// action and the dropdown selection.
///
/// Switching clips never hard-cuts: the previous action fades out while the
/// new one fades in over the same duration.
#[derive(Debug)]
pub struct Playback {
    rig: Option<Rig>,
    registry: ClipRegistry,
    current: Option<ActionHandle>,
    selection: String,
    fade: f32,
}

impl Playback {
    #[must_use]
    pub fn new(initial_selection: impl Into<String>, fade_seconds: f32) -> Self {
        Self {
            rig: None,
            registry: ClipRegistry::new(),
            current: None,
            selection: initial_selection.into(),
            fade: fade_seconds.max(0.0),
        }
    }

    /// Attaches the model that clips will play on. Only the first model is
    /// kept; later calls return `false` and drop their argument.
    pub fn attach_model(&mut self, model: Model) -> bool {
        if self.rig.is_some() {
            return false;
        }
        log::info!("Attached model '{}' ({} nodes)", model.name, model.nodes.len());
        self.rig = Some(Rig {
            model,
            mixer: AnimationMixer::new(),
        });
        true
    }

    #[must_use]
    pub fn has_model(&self) -> bool {
        self.rig.is_some()
    }

    #[must_use]
    pub fn model(&self) -> Option<&Model> {
        self.rig.as_ref().map(|r| &r.model)
    }

    #[must_use]
    pub fn mixer(&self) -> Option<&AnimationMixer> {
        self.rig.as_ref().map(|r| &r.mixer)
    }

    #[must_use]
    pub fn registry(&self) -> &ClipRegistry {
        &self.registry
    }

    /// Stores a clip under its animation name.
    ///
    /// The clip is renamed to `name` when needed, since exporters often give
    /// every clip the same internal name and the mixer caches actions by name.
    pub fn register_clip(&mut self, name: &str, clip: Arc<AnimationClip>) -> bool {
        let clip = if clip.name == name {
            clip
        } else {
            Arc::new(AnimationClip {
                name: name.to_string(),
                ..(*clip).clone()
            })
        };
        self.registry.register(name, clip)
    }

    /// Sets the dropdown selection and plays it.
    pub fn select(&mut self, name: &str) -> bool {
        name.clone_into(&mut self.selection);
        self.play(name)
    }

    /// Cross-fades from the current action to the clip registered as `name`.
    ///
    /// Does nothing and returns `false` until both a model and that clip are
    /// loaded.
    pub fn play(&mut self, name: &str) -> bool {
        let Some(rig) = self.rig.as_mut() else {
            log::debug!("Ignoring '{name}': no model loaded yet");
            return false;
        };
        let Some(clip) = self.registry.get(name) else {
            log::debug!("Ignoring '{name}': clip not loaded");
            return false;
        };

        if let Some(previous) = self.current
            && let Some(action) = rig.mixer.action_mut(previous)
        {
            action.fade_out(self.fade);
        }

        let handle = rig.mixer.clip_action(clip, &rig.model);
        if let Some(action) = rig.mixer.action_mut(handle) {
            action
                .reset()
                .set_effective_weight(1.0)
                .set_loop(LoopMode::Loop, None)
                .fade_in(self.fade);
        }
        rig.mixer.play(handle);
        self.current = Some(handle);

        log::debug!("Playing '{name}'");
        true
    }

    #[must_use]
    pub fn selection(&self) -> &str {
        &self.selection
    }

    #[must_use]
    pub fn current(&self) -> Option<ActionHandle> {
        self.current
    }

    /// Name of the clip behind the current action.
    #[must_use]
    pub fn current_clip_name(&self) -> Option<&str> {
        let rig = self.rig.as_ref()?;
        let action = rig.mixer.action(self.current?)?;
        Some(action.clip().name.as_str())
    }

    #[must_use]
    pub fn fade_seconds(&self) -> f32 {
        self.fade
    }

    /// Advances the mixer and refreshes world and joint matrices.
    pub fn update(&mut self, dt: f32) {
        let Some(rig) = self.rig.as_mut() else {
            return;
        };
        rig.mixer.update(dt, &mut rig.model);
        rig.model.update_world_matrices();
        rig.model.update_skeletons();
    }
}
