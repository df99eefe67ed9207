use smallvec::SmallVec;

use crate::scene::NodeHandle;
use crate::scene::transform::Transform;

/// Rest (bind-time) local TRS of a node.
///
/// Captured once when the model is built; the mixer blends toward it when the
/// accumulated action weight for a property is below one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestPose {
    pub position: glam::Vec3,
    pub rotation: glam::Quat,
    pub scale: glam::Vec3,
}

impl RestPose {
    #[must_use]
    pub fn of(transform: &Transform) -> Self {
        Self {
            position: transform.position,
            rotation: transform.rotation,
            scale: transform.scale,
        }
    }
}

/// A node of a model hierarchy.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub rest: RestPose,

    pub parent: Option<NodeHandle>,
    pub children: SmallVec<[NodeHandle; 4]>,

    /// Index into [`Model::meshes`](crate::scene::Model::meshes).
    pub mesh: Option<usize>,
    /// Index into [`Model::skeletons`](crate::scene::Model::skeletons).
    pub skin: Option<usize>,
}

impl Node {
    #[must_use]
    pub fn new(name: impl Into<String>, transform: Transform) -> Self {
        let rest = RestPose::of(&transform);
        Self {
            name: name.into(),
            transform,
            rest,
            parent: None,
            children: SmallVec::new(),
            mesh: None,
            skin: None,
        }
    }
}
