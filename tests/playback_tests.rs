//! Playback Tests
//!
//! Tests for:
//! - Play requests ignored until both a model and the clip are loaded
//! - Cross-fading between clips
//! - Dropdown selection driving playback
//! - Clip renaming on registration

use std::sync::Arc;

use glam::Vec3;

use marionette::animation::{
    AnimationClip, InterpolationMode, KeyframeTrack, TargetPath, Track, TrackData, TrackMeta,
};
use marionette::scene::{Model, node_at};
use marionette::viewer::Playback;

const FADE: f32 = 0.3;

fn one_bone_model() -> Model {
    let mut model = Model::new("dummy");
    let root = model.add_node(node_at("root", Vec3::ZERO));
    let hips = model.add_node(node_at("hips", Vec3::ZERO));
    model.roots.push(root);
    model.attach(hips, root);
    model
}

fn constant_clip(name: &str, value: Vec3) -> Arc<AnimationClip> {
    Arc::new(AnimationClip::new(
        name,
        vec![Track {
            meta: TrackMeta {
                node_name: "hips".to_string(),
                target: TargetPath::Translation,
            },
            data: TrackData::Vector3(KeyframeTrack::new(
                vec![0.0, 1.0],
                vec![value, value],
                InterpolationMode::Linear,
            )),
        }],
    ))
}

fn hips_position(playback: &Playback) -> Vec3 {
    let model = playback.model().unwrap();
    let hips = model.find_node_by_name("hips").unwrap();
    model.get_node(hips).unwrap().transform.position
}

#[test]
fn play_without_model_is_ignored() {
    let mut playback = Playback::new("Walking", FADE);
    playback.register_clip("Walking", constant_clip("Walking", Vec3::X));

    assert!(!playback.play("Walking"));
    assert!(playback.current().is_none());
}

#[test]
fn play_without_clip_is_ignored() {
    let mut playback = Playback::new("Walking", FADE);
    playback.attach_model(one_bone_model());

    assert!(!playback.play("Walking"));
    assert!(playback.current().is_none());
    assert!(playback.mixer().unwrap().scheduled().is_empty());
}

#[test]
fn only_first_model_is_attached() {
    let mut playback = Playback::new("Walking", FADE);
    assert!(playback.attach_model(one_bone_model()));
    assert!(!playback.attach_model(Model::new("second")));
    assert_eq!(playback.model().unwrap().name, "dummy");
}

#[test]
fn play_fades_in_from_zero() {
    let mut playback = Playback::new("Walking", FADE);
    playback.attach_model(one_bone_model());
    playback.register_clip("Walking", constant_clip("Walking", Vec3::X));

    assert!(playback.play("Walking"));
    let mixer = playback.mixer().unwrap();
    let action = mixer.action(playback.current().unwrap()).unwrap();
    assert!(action.is_fading());
    assert_eq!(action.effective_weight(), 0.0);

    playback.update(1.0);
    assert!(hips_position(&playback).abs_diff_eq(Vec3::X, 1e-4));
}

#[test]
fn switching_clips_cross_fades() {
    let mut playback = Playback::new("Walking", FADE);
    playback.attach_model(one_bone_model());
    playback.register_clip("Walking", constant_clip("Walking", Vec3::X));
    playback.register_clip("Running", constant_clip("Running", Vec3::Y));

    playback.play("Walking");
    playback.update(1.0);
    let walking = playback.current().unwrap();

    playback.play("Running");
    let running = playback.current().unwrap();
    assert_ne!(walking, running);

    let mixer = playback.mixer().unwrap();
    let out = mixer.action(walking).unwrap().fade().unwrap();
    let into = mixer.action(running).unwrap().fade().unwrap();
    assert_eq!((out.from, out.to), (1.0, 0.0));
    assert_eq!((into.from, into.to), (0.0, 1.0));
    assert_eq!(out.duration, FADE);
    assert_eq!(into.duration, FADE);
    assert!(mixer.is_scheduled(walking));

    // Halfway through, both clips contribute.
    playback.update(FADE * 0.5);
    let mid = hips_position(&playback);
    assert!(mid.x > 0.0 && mid.y > 0.0, "expected a blend, got {mid}");

    playback.update(1.0);
    assert!(hips_position(&playback).abs_diff_eq(Vec3::Y, 1e-4));
    let mixer = playback.mixer().unwrap();
    assert!(!mixer.is_scheduled(walking));
    assert_eq!(playback.current_clip_name(), Some("Running"));
}

#[test]
fn replaying_current_clip_restarts_it() {
    let mut playback = Playback::new("Walking", FADE);
    playback.attach_model(one_bone_model());
    playback.register_clip("Walking", constant_clip("Walking", Vec3::X));

    playback.play("Walking");
    playback.update(0.7);
    let first = playback.current().unwrap();

    playback.play("Walking");
    let second = playback.current().unwrap();
    assert_eq!(first, second);

    let action = playback.mixer().unwrap().action(second).unwrap();
    assert_eq!(action.time, 0.0);
    assert!(action.enabled);
    assert_eq!(action.fade().unwrap().to, 1.0);
}

#[test]
fn unknown_name_is_a_noop() {
    let mut playback = Playback::new("Walking", FADE);
    playback.attach_model(one_bone_model());
    playback.register_clip("Walking", constant_clip("Walking", Vec3::X));
    playback.play("Walking");
    let current = playback.current();

    assert!(!playback.play("Moonwalk"));
    assert!(!playback.select(""));
    assert_eq!(playback.current(), current);
    assert_eq!(playback.current_clip_name(), Some("Walking"));
}

#[test]
fn select_updates_selection_even_when_not_loaded() {
    let mut playback = Playback::new("Praying", FADE);
    assert_eq!(playback.selection(), "Praying");

    assert!(!playback.select("Dancing"));
    assert_eq!(playback.selection(), "Dancing");

    playback.attach_model(one_bone_model());
    playback.register_clip("Dancing", constant_clip("Dancing", Vec3::Z));
    assert!(playback.select("Dancing"));
    assert_eq!(playback.current_clip_name(), Some("Dancing"));
}

#[test]
fn register_renames_clip_to_animation_name() {
    let mut playback = Playback::new("Walking", FADE);
    assert!(playback.register_clip("Walking", constant_clip("mixamo.com", Vec3::X)));
    assert!(playback.register_clip("Running", constant_clip("mixamo.com", Vec3::Y)));

    let registry = playback.registry();
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.get("Walking").unwrap().name, "Walking");
    assert_eq!(registry.get("Running").unwrap().name, "Running");

    // Distinct names keep the mixer from reusing one action for both.
    playback.attach_model(one_bone_model());
    playback.play("Walking");
    let walking = playback.current().unwrap();
    playback.play("Running");
    assert_ne!(playback.current().unwrap(), walking);
}

#[test]
fn reregistering_replaces_clip() {
    let mut playback = Playback::new("Walking", FADE);
    assert!(playback.register_clip("Walking", constant_clip("Walking", Vec3::X)));
    assert!(!playback.register_clip("Walking", constant_clip("Walking", Vec3::Y)));
    assert_eq!(playback.registry().len(), 1);
}

#[test]
fn negative_fade_is_clamped() {
    let playback = Playback::new("Walking", -1.0);
    assert_eq!(playback.fade_seconds(), 0.0);
}
