use crate::animation::binding::{PropertyBinding, TargetPath};
use crate::animation::clip::{AnimationClip, TrackData};
use crate::scene::Model;

pub struct Binder;

impl Binder {
    /// Resolves clip tracks to model nodes by name.
    ///
    /// Tracks whose node is missing, or whose value type does not fit the
    /// target property, are skipped.
    #[must_use]
    pub fn bind(model: &Model, clip: &AnimationClip) -> Vec<PropertyBinding> {
        let mut bindings = Vec::with_capacity(clip.tracks.len());

        for (track_index, track) in clip.tracks.iter().enumerate() {
            let target = track.meta.target;
            let compatible = matches!(
                (&track.data, target),
                (TrackData::Vector3(_), TargetPath::Translation | TargetPath::Scale)
                    | (TrackData::Quaternion(_), TargetPath::Rotation)
            );
            if !compatible {
                continue;
            }

            if let Some(node) = model.find_node_by_name(&track.meta.node_name) {
                bindings.push(PropertyBinding {
                    track_index,
                    node,
                    target,
                });
            }
        }

        if bindings.len() < clip.tracks.len() {
            log::debug!(
                "Clip '{}': bound {} of {} tracks to '{}'",
                clip.name,
                bindings.len(),
                clip.tracks.len(),
                model.name
            );
        }

        bindings
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::animation::clip::{Track, TrackMeta};
    use crate::animation::tracks::{InterpolationMode, KeyframeTrack};
    use crate::scene::node_at;

    fn vec3_track(node: &str, target: TargetPath) -> Track {
        Track {
            meta: TrackMeta {
                node_name: node.to_string(),
                target,
            },
            data: TrackData::Vector3(KeyframeTrack::new(
                vec![0.0, 1.0],
                vec![Vec3::ZERO, Vec3::ONE],
                InterpolationMode::Linear,
            )),
        }
    }

    #[test]
    fn skips_unknown_nodes_and_mismatched_values() {
        let mut model = Model::new("rig");
        let hips = model.add_node(node_at("hips", Vec3::ZERO));
        model.roots.push(hips);

        let clip = AnimationClip::new(
            "Walking",
            vec![
                vec3_track("hips", TargetPath::Translation),
                vec3_track("hips", TargetPath::Rotation),
                vec3_track("tail", TargetPath::Scale),
                vec3_track("hips", TargetPath::Scale),
            ],
        );

        let bindings = Binder::bind(&model, &clip);
        let bound: Vec<(usize, TargetPath)> =
            bindings.iter().map(|b| (b.track_index, b.target)).collect();
        assert_eq!(bound, [(0, TargetPath::Translation), (3, TargetPath::Scale)]);
        assert!(bindings.iter().all(|b| b.node == hips));
    }
}
