//! Viewer Session Tests
//!
//! Tests for:
//! - Independent loading: first model attached, selection played on arrival
//! - Base-first loading: dependents requested only after the base succeeds
//! - Base failure stops further requests
//! - Files without animations are reported and skipped

use std::sync::Arc;

use glam::Vec3;

use marionette::animation::{
    AnimationClip, InterpolationMode, KeyframeTrack, TargetPath, Track, TrackData, TrackMeta,
};
use marionette::assets::{LoadEvent, LoadedAsset};
use marionette::errors::{AssetError, Error};
use marionette::scene::{Model, node_at};
use marionette::viewer::{
    AnimationCatalog, ClipLoader, LoadStrategy, SessionPhase, ViewerConfig, ViewerSession,
};

/// Records requests; completions are queued by the test.
#[derive(Default)]
struct FakeLoader {
    requests: Vec<(String, String)>,
    ready: Vec<LoadEvent>,
}

impl FakeLoader {
    fn requested_names(&self) -> Vec<&str> {
        self.requests.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl ClipLoader for FakeLoader {
    fn request(&mut self, name: &str, uri: &str) {
        self.requests.push((name.to_string(), uri.to_string()));
    }

    fn drain(&mut self) -> Vec<LoadEvent> {
        std::mem::take(&mut self.ready)
    }
}

fn one_bone_model(name: &str) -> Model {
    let mut model = Model::new(name);
    let root = model.add_node(node_at("root", Vec3::ZERO));
    let hips = model.add_node(node_at("hips", Vec3::ZERO));
    model.roots.push(root);
    model.attach(hips, root);
    model
}

fn clip(name: &str) -> AnimationClip {
    AnimationClip::new(
        name,
        vec![Track {
            meta: TrackMeta {
                node_name: "hips".to_string(),
                target: TargetPath::Translation,
            },
            data: TrackData::Vector3(KeyframeTrack::new(
                vec![0.0, 1.0],
                vec![Vec3::ZERO, Vec3::X],
                InterpolationMode::Linear,
            )),
        }],
    )
}

fn loaded(name: &str, model: &str) -> LoadEvent {
    LoadEvent {
        name: name.to_string(),
        result: Ok(LoadedAsset {
            model: Some(one_bone_model(model)),
            clips: vec![clip("mixamo.com")],
        }),
    }
}

fn clipless(name: &str) -> LoadEvent {
    LoadEvent {
        name: name.to_string(),
        result: Ok(LoadedAsset {
            model: Some(one_bone_model(name)),
            clips: Vec::new(),
        }),
    }
}

fn failed(name: &str) -> LoadEvent {
    LoadEvent {
        name: name.to_string(),
        result: Err(Error::Asset(AssetError::NotFound(format!("{name}.glb")))),
    }
}

fn session(config: &ViewerConfig) -> ViewerSession<FakeLoader> {
    let _ = env_logger::builder().is_test(true).try_init();
    ViewerSession::new(FakeLoader::default(), config)
}

fn complete(session: &mut ViewerSession<FakeLoader>, events: Vec<LoadEvent>) -> usize {
    session.loader_mut().ready.extend(events);
    session.pump()
}

// ============================================================================
// Independent
// ============================================================================

#[test]
fn independent_requests_every_clip_once() {
    let config = ViewerConfig::showcase();
    let mut session = session(&config);
    assert_eq!(session.phase(), SessionPhase::Idle);

    session.start();
    session.start();

    assert_eq!(session.phase(), SessionPhase::Loading);
    assert_eq!(
        session.loader().requested_names(),
        ["Praying", "Walking", "Running", "Jumping", "Waving", "Dancing"]
    );
    assert_eq!(session.loader().requests[1].1, "models/gltf/Walking.glb");
    assert_eq!(session.pending(), 6);
}

#[test]
fn independent_first_model_wins() {
    let config = ViewerConfig::showcase();
    let mut session = session(&config);
    session.start();

    complete(&mut session, vec![loaded("Walking", "first")]);
    complete(&mut session, vec![loaded("Running", "second")]);

    let playback = session.playback();
    assert_eq!(playback.model().unwrap().name, "first");
    assert_eq!(playback.registry().len(), 2);
    assert_eq!(session.pending(), 4);
}

#[test]
fn independent_plays_selection_on_arrival_only() {
    let config = ViewerConfig::showcase();
    let mut session = session(&config);
    session.start();

    // Not the selection ("Praying"), so nothing plays yet.
    complete(&mut session, vec![loaded("Walking", "m")]);
    assert!(session.playback().current().is_none());

    complete(&mut session, vec![loaded("Praying", "m")]);
    assert_eq!(session.playback().current_clip_name(), Some("Praying"));
}

#[test]
fn independent_selection_made_while_loading_plays_later() {
    let config = ViewerConfig::showcase();
    let mut session = session(&config);
    session.start();

    assert!(!session.select("Dancing"));
    complete(&mut session, vec![loaded("Dancing", "m")]);
    assert_eq!(session.playback().current_clip_name(), Some("Dancing"));
}

#[test]
fn independent_failure_keeps_loading_others() {
    let config = ViewerConfig::showcase();
    let mut session = session(&config);
    session.start();

    complete(&mut session, vec![failed("Praying"), loaded("Walking", "m")]);

    assert_eq!(session.phase(), SessionPhase::Loading);
    assert!(!session.playback().registry().contains("Praying"));
    assert!(session.playback().registry().contains("Walking"));
    assert_eq!(session.pending(), 4);
}

#[test]
fn clipless_file_is_skipped_but_supplies_model() {
    let config = ViewerConfig::showcase();
    let mut session = session(&config);
    session.start();

    complete(&mut session, vec![clipless("Praying")]);

    assert!(session.playback().has_model());
    assert!(session.playback().registry().is_empty());
    assert!(session.playback().current().is_none());
}

// ============================================================================
// Base-first
// ============================================================================

#[test]
fn base_first_waits_for_base() {
    let config = ViewerConfig::capoeira();
    let mut session = session(&config);
    session.start();

    assert_eq!(session.phase(), SessionPhase::AwaitingBase);
    assert_eq!(session.loader().requested_names(), ["Capoeira"]);
    assert_eq!(session.pending(), 1);
}

#[test]
fn base_success_attaches_plays_and_requests_dependents() {
    let config = ViewerConfig::capoeira();
    let mut session = session(&config);
    session.start();

    complete(&mut session, vec![loaded("Capoeira", "character")]);

    assert_eq!(session.phase(), SessionPhase::Loading);
    assert_eq!(session.playback().model().unwrap().name, "character");
    assert_eq!(session.playback().current_clip_name(), Some("Capoeira"));
    // Selection stays on the catalog's initial entry.
    assert_eq!(session.playback().selection(), "Dancing");
    assert_eq!(
        session.loader().requested_names(),
        ["Capoeira", "Dancing", "Punching", "Punching Bag", "Dying", "Jumping"]
    );
    assert_eq!(session.pending(), 5);
}

#[test]
fn base_first_dependents_do_not_autoplay() {
    let config = ViewerConfig::capoeira();
    let mut session = session(&config);
    session.start();
    complete(&mut session, vec![loaded("Capoeira", "character")]);

    complete(&mut session, vec![loaded("Dancing", "ignored")]);

    let playback = session.playback();
    assert_eq!(playback.current_clip_name(), Some("Capoeira"));
    assert_eq!(playback.model().unwrap().name, "character");
    assert!(playback.registry().contains("Dancing"));

    assert!(session.select("Dancing"));
    assert_eq!(session.playback().current_clip_name(), Some("Dancing"));
}

#[test]
fn base_failure_stops_requests() {
    let config = ViewerConfig::capoeira();
    let mut session = session(&config);
    session.start();

    complete(&mut session, vec![failed("Capoeira")]);

    assert_eq!(session.phase(), SessionPhase::BaseFailed);
    assert_eq!(session.loader().requests.len(), 1);
    assert_eq!(session.pending(), 0);
    assert!(!session.playback().has_model());

    session.start();
    assert_eq!(session.loader().requests.len(), 1);
}

#[test]
fn clipless_base_still_requests_dependents() {
    let config = ViewerConfig::capoeira();
    let mut session = session(&config);
    session.start();

    complete(&mut session, vec![clipless("Capoeira")]);

    assert_eq!(session.phase(), SessionPhase::Loading);
    assert!(session.playback().has_model());
    assert!(session.playback().current().is_none());
    assert_eq!(session.loader().requests.len(), 6);
}

#[test]
fn model_scale_applies_to_roots() {
    let config = ViewerConfig {
        model_scale: 0.01,
        catalog: AnimationCatalog {
            clips: vec!["Idle".to_string()],
            initial: "Idle".to_string(),
            path_template: "{name}.gltf".to_string(),
            strategy: LoadStrategy::Independent,
        },
        ..ViewerConfig::showcase()
    };
    let mut session = session(&config);
    session.start();
    assert_eq!(session.loader().requests[0].1, "Idle.gltf");

    complete(&mut session, vec![loaded("Idle", "m")]);

    let model = session.playback().model().unwrap();
    let root = model.get_node(model.roots[0]).unwrap();
    assert!(root.transform.scale.abs_diff_eq(Vec3::splat(0.01), 1e-6));
}

#[test]
fn update_without_model_is_harmless() {
    let config = ViewerConfig::showcase();
    let mut session = session(&config);
    session.update(0.016);
    assert_eq!(session.pump(), 0);
}

#[test]
fn clips_are_shared_not_copied_per_play() {
    let config = ViewerConfig::showcase();
    let mut session = session(&config);
    session.start();
    complete(&mut session, vec![loaded("Praying", "m")]);

    let registered = Arc::clone(session.playback().registry().get("Praying").unwrap());
    let mixer = session.playback().mixer().unwrap();
    let action = mixer.action(session.playback().current().unwrap()).unwrap();
    assert!(Arc::ptr_eq(action.clip(), &registered));
}
