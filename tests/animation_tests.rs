//! Animation System Tests
//!
//! Tests for:
//! - KeyframeTrack linear/step/cubic interpolation and cursor sampling
//! - AnimationAction loop modes, repetitions and weight fades
//! - AnimationMixer action caching and weighted blending
//! - AnimationClip duration auto-computation

use std::f32::consts::PI;
use std::sync::Arc;

use glam::{Quat, Vec3};

use marionette::animation::action::{AnimationAction, LoopMode};
use marionette::animation::binding::TargetPath;
use marionette::animation::clip::{AnimationClip, Track, TrackData, TrackMeta};
use marionette::animation::mixer::AnimationMixer;
use marionette::animation::tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
use marionette::animation::values::Interpolatable;
use marionette::scene::{Model, node_at};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    a.abs_diff_eq(b, 1e-4)
}

// ============================================================================
// KeyframeTrack
// ============================================================================

#[test]
fn track_linear_f32_midpoint() {
    let track = KeyframeTrack::new(vec![0.0, 1.0], vec![0.0_f32, 10.0], InterpolationMode::Linear);

    let mut cursor = KeyframeCursor::default();
    let val = track.sample_with_cursor(0.5, &mut cursor).unwrap();
    assert!(approx(val, 5.0), "Expected 5.0, got {val}");
}

#[test]
fn track_linear_clamps_outside_range() {
    let track = KeyframeTrack::new(vec![1.0, 2.0], vec![10.0_f32, 20.0], InterpolationMode::Linear);

    let mut cursor = KeyframeCursor::default();
    assert!(approx(track.sample_with_cursor(0.5, &mut cursor).unwrap(), 10.0));
    assert!(approx(track.sample_with_cursor(5.0, &mut cursor).unwrap(), 20.0));
    assert!(approx(track.sample(0.0).unwrap(), 10.0));
    assert!(approx(track.sample(9.0).unwrap(), 20.0));
}

#[test]
fn track_step_holds_value() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0, 2.0],
        vec![0.0_f32, 100.0, 200.0],
        InterpolationMode::Step,
    );

    let mut cursor = KeyframeCursor::default();
    assert!(approx(track.sample_with_cursor(0.99, &mut cursor).unwrap(), 0.0));
    assert!(approx(track.sample_with_cursor(1.0, &mut cursor).unwrap(), 100.0));
    assert!(approx(track.sample_with_cursor(1.5, &mut cursor).unwrap(), 100.0));
    assert!(approx(track.sample(2.0).unwrap(), 200.0));
}

#[test]
fn track_linear_quat_is_slerp() {
    let q0 = Quat::IDENTITY;
    let q1 = Quat::from_rotation_y(PI * 0.5);
    let track = KeyframeTrack::new(vec![0.0, 1.0], vec![q0, q1], InterpolationMode::Linear);

    let val = track.sample(0.5).unwrap();
    let angle = val.angle_between(q0.slerp(q1, 0.5));
    assert!(angle < 0.01, "Quaternion slerp mismatch: angle={angle}");
}

#[test]
fn track_cubic_hits_keyframes_exactly() {
    // values = [in_tangent, value, out_tangent] per key
    let track = KeyframeTrack::new(
        vec![0.0, 1.0],
        vec![0.0_f32, 0.0, 1.0, 1.0, 10.0, 0.0],
        InterpolationMode::CubicSpline,
    );

    assert!(approx(track.sample(0.0).unwrap(), 0.0));
    assert!(approx(track.sample(1.0).unwrap(), 10.0));
}

#[test]
fn track_cubic_zero_tangents_is_symmetric() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0],
        vec![Vec3::ZERO, Vec3::ZERO, Vec3::ZERO, Vec3::ZERO, Vec3::splat(10.0), Vec3::ZERO],
        InterpolationMode::CubicSpline,
    );
    let mid = track.sample(0.5).unwrap();
    assert!(approx_vec3(mid, Vec3::splat(5.0)), "got {mid}");
}

#[test]
fn cursor_sequential_forward_matches_ramp() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0, 2.0, 3.0, 4.0],
        vec![0.0_f32, 10.0, 20.0, 30.0, 40.0],
        InterpolationMode::Linear,
    );

    let mut cursor = KeyframeCursor::default();
    for i in 0..=20 {
        let t = i as f32 * 0.2;
        let val = track.sample_with_cursor(t, &mut cursor).unwrap();
        assert!(approx(val, t * 10.0), "t={t}: got {val}");
    }
}

#[test]
fn cursor_jump_back_falls_back_to_search() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        vec![0.0_f32, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0],
        InterpolationMode::Linear,
    );

    let mut cursor = KeyframeCursor::default();
    assert!(approx(track.sample_with_cursor(5.5, &mut cursor).unwrap(), 55.0));
    assert!(approx(track.sample_with_cursor(0.5, &mut cursor).unwrap(), 5.0));
    assert_eq!(cursor.last_index, 0);
}

#[test]
fn single_keyframe_is_constant() {
    let track = KeyframeTrack::new(vec![0.0], vec![42.0_f32], InterpolationMode::Linear);
    let mut cursor = KeyframeCursor::default();
    assert!(approx(track.sample_with_cursor(5.0, &mut cursor).unwrap(), 42.0));
}

#[test]
fn interpolatable_f32_linear() {
    assert!(approx(f32::interpolate_linear(0.0, 10.0, 0.25), 2.5));
}

// ============================================================================
// AnimationAction: loop modes
// ============================================================================

fn ramp_clip(name: &str, duration: f32, to: Vec3) -> Arc<AnimationClip> {
    Arc::new(AnimationClip::new(
        name,
        vec![Track {
            meta: TrackMeta {
                node_name: "hips".to_string(),
                target: TargetPath::Translation,
            },
            data: TrackData::Vector3(KeyframeTrack::new(
                vec![0.0, duration],
                vec![Vec3::ZERO, to],
                InterpolationMode::Linear,
            )),
        }],
    ))
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

fn action_for(clip: Arc<AnimationClip>) -> AnimationAction {
    AnimationAction::new(clip, Vec::new())
}

#[test]
fn action_loop_mode_once_clamps_and_pauses() {
    let mut action = action_for(ramp_clip("a", 2.0, Vec3::X));
    action.set_loop(LoopMode::Once, None);

    action.update(3.0);
    assert!(approx(action.time, 2.0), "got {}", action.time);
    assert!(action.paused);
    assert!(!action.is_running());
}

#[test]
fn action_loop_mode_loop_wraps() {
    let mut action = action_for(ramp_clip("a", 2.0, Vec3::X));

    action.update(2.5);
    assert!(approx(action.time, 0.5), "got {}", action.time);
    assert_eq!(action.loop_count(), 1);
    assert!(!action.paused);
}

#[test]
fn action_loop_reverse_playback_wraps_from_end() {
    let mut action = action_for(ramp_clip("a", 2.0, Vec3::X));
    action.time_scale = -1.0;
    action.time = 0.5;

    action.update(1.0);
    assert!(approx(action.time, 1.5), "got {}", action.time);
}

#[test]
fn action_ping_pong_mirrors_odd_passes() {
    let mut action = action_for(ramp_clip("a", 2.0, Vec3::X));
    action.set_loop(LoopMode::PingPong, None);

    action.update(1.5);
    assert!(approx(action.sample_time(), 1.5));

    // 0.5 into the second pass, which runs backwards
    action.update(1.0);
    assert!(approx(action.sample_time(), 1.5), "got {}", action.sample_time());

    action.update(1.0);
    assert!(approx(action.sample_time(), 0.5), "got {}", action.sample_time());
}

#[test]
fn action_repetitions_stop_at_end() {
    let mut action = action_for(ramp_clip("a", 1.0, Vec3::X));
    action.set_loop(LoopMode::Loop, Some(2));

    action.update(1.5);
    assert!(!action.paused);
    action.update(1.0);
    assert!(action.paused);
    assert!(approx(action.time, 1.0));
}

#[test]
fn action_paused_or_disabled_does_not_advance() {
    let mut action = action_for(ramp_clip("a", 2.0, Vec3::X));
    action.paused = true;
    action.time = 0.5;
    action.update(1.0);
    assert!(approx(action.time, 0.5));

    action.paused = false;
    action.enabled = false;
    action.update(1.0);
    assert!(approx(action.time, 0.5));
    assert!(approx(action.effective_weight(), 0.0));
}

#[test]
fn action_time_scale() {
    let mut action = action_for(ramp_clip("a", 4.0, Vec3::X));
    action.time_scale = 2.0;
    action.update(1.0);
    assert!(approx(action.time, 2.0), "got {}", action.time);
}

// ============================================================================
// AnimationAction: fades
// ============================================================================

#[test]
fn fade_in_ramps_weight_up() {
    let mut action = action_for(ramp_clip("a", 2.0, Vec3::X));
    action.fade_in(0.3);
    assert!(approx(action.effective_weight(), 0.0));

    action.update(0.15);
    assert!(approx(action.effective_weight(), 0.5), "got {}", action.effective_weight());

    action.update(0.2);
    assert!(approx(action.effective_weight(), 1.0));
    assert!(!action.is_fading());
    assert!(action.enabled);
}

#[test]
fn fade_out_disables_when_done() {
    let mut action = action_for(ramp_clip("a", 2.0, Vec3::X));
    action.fade_out(0.3);

    action.update(0.1);
    assert!(action.enabled);
    assert!(action.effective_weight() > 0.0 && action.effective_weight() < 1.0);

    action.update(0.3);
    assert!(!action.enabled);
    assert!(approx(action.effective_weight(), 0.0));
}

#[test]
fn set_effective_weight_cancels_fade() {
    let mut action = action_for(ramp_clip("a", 2.0, Vec3::X));
    action.fade_out(1.0);
    action.set_effective_weight(0.7);
    assert!(!action.is_fading());

    action.update(2.0);
    assert!(action.enabled);
    assert!(approx(action.effective_weight(), 0.7));
}

#[test]
fn reset_rewinds_and_reenables() {
    let mut action = action_for(ramp_clip("a", 2.0, Vec3::X));
    action.fade_out(0.1);
    action.update(3.5);
    assert!(!action.enabled);

    action.reset();
    assert!(action.enabled);
    assert!(!action.paused);
    assert!(!action.is_fading());
    assert!(approx(action.time, 0.0));
    assert_eq!(action.loop_count(), 0);
}

// ============================================================================
// AnimationMixer
// ============================================================================

fn one_bone_model() -> Model {
    let mut model = Model::new("dummy");
    let root = model.add_node(node_at("root", Vec3::ZERO));
    let hips = model.add_node(node_at("hips", Vec3::ZERO));
    model.roots.push(root);
    model.attach(hips, root);
    model
}

fn hips_position(model: &Model) -> Vec3 {
    let hips = model.find_node_by_name("hips").unwrap();
    model.get_node(hips).unwrap().transform.position
}

#[test]
fn clip_action_is_cached_per_clip() {
    let model = one_bone_model();
    let clip = ramp_clip("walk", 1.0, Vec3::X);
    let mut mixer = AnimationMixer::new();

    let a = mixer.clip_action(&clip, &model);
    let b = mixer.clip_action(&clip, &model);
    assert_eq!(a, b);
    assert_eq!(mixer.action(a).unwrap().bindings.len(), 1);
}

#[test]
fn unbound_tracks_are_skipped() {
    let model = one_bone_model();
    let clip = Arc::new(AnimationClip::new(
        "ghost",
        vec![Track {
            meta: TrackMeta {
                node_name: "missing".to_string(),
                target: TargetPath::Translation,
            },
            data: TrackData::Vector3(KeyframeTrack::new(
                vec![0.0],
                vec![Vec3::ONE],
                InterpolationMode::Linear,
            )),
        }],
    ));
    let mut mixer = AnimationMixer::new();
    let handle = mixer.clip_action(&clip, &model);
    assert!(mixer.action(handle).unwrap().bindings.is_empty());
}

#[test]
fn single_action_writes_sampled_value() {
    let mut model = one_bone_model();
    let clip = ramp_clip("walk", 2.0, Vec3::new(2.0, 0.0, 0.0));
    let mut mixer = AnimationMixer::new();

    let handle = mixer.clip_action(&clip, &model);
    mixer.play(handle);
    mixer.update(1.0, &mut model);

    assert!(approx_vec3(hips_position(&model), Vec3::X), "got {}", hips_position(&model));
    assert!(approx(mixer.time(), 1.0));
}

#[test]
fn partial_weight_blends_toward_rest_pose() {
    let mut model = one_bone_model();
    let clip = constant_clip("lean", Vec3::new(1.0, 0.0, 0.0));
    let mut mixer = AnimationMixer::new();

    let handle = mixer.clip_action(&clip, &model);
    mixer.action_mut(handle).unwrap().set_effective_weight(0.5);
    mixer.play(handle);
    mixer.update(0.0, &mut model);

    assert!(approx_vec3(hips_position(&model), Vec3::new(0.5, 0.0, 0.0)));
}

#[test]
fn cross_fade_blends_both_actions() {
    let mut model = one_bone_model();
    let a = constant_clip("a", Vec3::X);
    let b = constant_clip("b", Vec3::Z);
    let mut mixer = AnimationMixer::new();

    let ha = mixer.clip_action(&a, &model);
    mixer.play(ha);
    mixer.update(0.0, &mut model);
    assert!(approx_vec3(hips_position(&model), Vec3::X));

    let hb = mixer.clip_action(&b, &model);
    mixer.action_mut(ha).unwrap().fade_out(1.0);
    mixer.action_mut(hb).unwrap().reset().fade_in(1.0);
    mixer.play(hb);

    mixer.update(0.5, &mut model);
    assert!(approx(mixer.action(ha).unwrap().effective_weight(), 0.5));
    assert!(approx(mixer.action(hb).unwrap().effective_weight(), 0.5));
    assert!(approx_vec3(hips_position(&model), Vec3::new(0.5, 0.0, 0.5)));

    mixer.update(0.6, &mut model);
    assert!(approx_vec3(hips_position(&model), Vec3::Z));
    assert!(!mixer.is_scheduled(ha));
    assert!(mixer.is_scheduled(hb));
}

#[test]
fn stop_unschedules_and_resets() {
    let mut model = one_bone_model();
    let clip = ramp_clip("walk", 2.0, Vec3::X);
    let mut mixer = AnimationMixer::new();

    let handle = mixer.clip_action(&clip, &model);
    mixer.play(handle);
    mixer.update(1.0, &mut model);
    mixer.stop(handle);

    assert!(!mixer.is_scheduled(handle));
    assert!(approx(mixer.action(handle).unwrap().time, 0.0));
}

// ============================================================================
// AnimationClip
// ============================================================================

#[test]
fn clip_duration_is_max_track_end() {
    let clip = AnimationClip::new(
        "test",
        vec![
            Track {
                meta: TrackMeta {
                    node_name: "a".to_string(),
                    target: TargetPath::Translation,
                },
                data: TrackData::Vector3(KeyframeTrack::new(
                    vec![0.0, 1.5],
                    vec![Vec3::ZERO, Vec3::X],
                    InterpolationMode::Linear,
                )),
            },
            Track {
                meta: TrackMeta {
                    node_name: "b".to_string(),
                    target: TargetPath::Rotation,
                },
                data: TrackData::Quaternion(KeyframeTrack::new(
                    vec![0.0, 3.0],
                    vec![Quat::IDENTITY, Quat::from_rotation_y(1.0)],
                    InterpolationMode::Linear,
                )),
            },
        ],
    );

    assert!(approx(clip.duration, 3.0), "got {}", clip.duration);
}

#[test]
fn clip_empty_tracks_zero_duration() {
    let clip = AnimationClip::new("empty", vec![]);
    assert!(approx(clip.duration, 0.0));
}
