use std::sync::Arc;

use crate::animation::AnimationClip;
use crate::assets::{LoadEvent, LoadedAsset};
use crate::viewer::catalog::{AnimationCatalog, LoadStrategy};
use crate::viewer::config::ViewerConfig;
use crate::viewer::playback::Playback;

/// Source of asynchronously loaded clip files.
///
/// Requests are fire-and-forget; completions are collected with
/// [`drain`](Self::drain) once per frame.
pub trait ClipLoader {
    fn request(&mut self, name: &str, uri: &str);

    fn drain(&mut self) -> Vec<LoadEvent>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing requested yet.
    Idle,
    /// Waiting for the base file before requesting the rest.
    AwaitingBase,
    /// All requests issued.
    Loading,
    /// The base file failed; nothing else will be requested.
    BaseFailed,
}

/// Drives clip loading for one viewer and applies each completion to the
/// playback state.
pub struct ViewerSession<L: ClipLoader> {
    loader: L,
    catalog: AnimationCatalog,
    playback: Playback,
    model_scale: f32,
    phase: SessionPhase,
    pending: usize,
}

impl<L: ClipLoader> ViewerSession<L> {
    #[must_use]
    pub fn new(loader: L, config: &ViewerConfig) -> Self {
        Self {
            loader,
            catalog: config.catalog.clone(),
            playback: Playback::new(config.catalog.initial.clone(), config.fade_seconds),
            model_scale: config.model_scale,
            phase: SessionPhase::Idle,
            pending: 0,
        }
    }

    /// Issues the initial load requests. Later calls do nothing.
    pub fn start(&mut self) {
        if self.phase != SessionPhase::Idle {
            return;
        }

        match self.catalog.strategy.clone() {
            LoadStrategy::Independent => {
                let names = self.catalog.clips.clone();
                for name in &names {
                    self.request(name);
                }
                self.phase = SessionPhase::Loading;
            }
            LoadStrategy::BaseFirst { base } => {
                self.request(&base);
                self.phase = SessionPhase::AwaitingBase;
            }
        }
    }

    /// Handles every completed load. Returns how many were handled.
    pub fn pump(&mut self) -> usize {
        let events = self.loader.drain();
        let count = events.len();
        for event in events {
            self.pending = self.pending.saturating_sub(1);
            self.handle(event);
        }
        count
    }

    /// Changes the dropdown selection. See [`Playback::select`].
    pub fn select(&mut self, name: &str) -> bool {
        self.playback.select(name)
    }

    pub fn update(&mut self, dt: f32) {
        self.playback.update(dt);
    }

    #[must_use]
    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut Playback {
        &mut self.playback
    }

    #[must_use]
    pub fn catalog(&self) -> &AnimationCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Requests issued but not yet completed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending
    }

    #[must_use]
    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut L {
        &mut self.loader
    }

    fn request(&mut self, name: &str) {
        let uri = self.catalog.uri_for(name);
        log::debug!("Requesting '{name}' from {uri}");
        self.loader.request(name, &uri);
        self.pending += 1;
    }

    fn handle(&mut self, event: LoadEvent) {
        let LoadEvent { name, result } = event;
        let is_base =
            self.phase == SessionPhase::AwaitingBase && self.catalog.base() == Some(name.as_str());

        let asset = match result {
            Ok(asset) => asset,
            Err(err) => {
                log::error!("Failed to load '{}': {err}", self.catalog.uri_for(&name));
                if is_base {
                    self.phase = SessionPhase::BaseFailed;
                }
                return;
            }
        };

        if is_base {
            self.handle_base(&name, asset);
            return;
        }

        let independent = matches!(self.catalog.strategy, LoadStrategy::Independent);
        let LoadedAsset { model, clips } = asset;

        if independent
            && !self.playback.has_model()
            && let Some(mut model) = model
        {
            model.set_root_scale(self.model_scale);
            self.playback.attach_model(model);
        }

        self.register_first_clip(&name, clips);

        if independent && name == self.playback.selection() {
            self.playback.play(&name);
        }
    }

    fn handle_base(&mut self, name: &str, asset: LoadedAsset) {
        let LoadedAsset { model, clips } = asset;

        match model {
            Some(mut model) => {
                model.set_root_scale(self.model_scale);
                self.playback.attach_model(model);
            }
            None => log::warn!("Base '{name}' contains no model"),
        }

        if self.register_first_clip(name, clips) {
            self.playback.play(name);
        }

        let dependents: Vec<String> = self
            .catalog
            .dependent_clips()
            .map(str::to_string)
            .collect();
        for dependent in &dependents {
            self.request(dependent);
        }
        self.phase = SessionPhase::Loading;
    }

    fn register_first_clip(&mut self, name: &str, clips: Vec<AnimationClip>) -> bool {
        let Some(clip) = clips.into_iter().next() else {
            log::warn!("No animation found in {}", self.catalog.uri_for(name));
            return false;
        };
        log::info!("Loaded '{name}' ({:.2}s, {} tracks)", clip.duration, clip.tracks.len());
        self.playback.register_clip(name, Arc::new(clip));
        true
    }
}
