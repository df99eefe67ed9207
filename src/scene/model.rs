use glam::{Affine3A, Quat, Vec3};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::animation::binding::TargetPath;
use crate::scene::mesh::MeshData;
use crate::scene::skeleton::{BoundingBox, Skeleton};
use crate::scene::transform::Transform;
use crate::scene::{Node, NodeHandle};

/// A loaded character: node hierarchy, meshes and skeletons.
///
/// Nodes are addressed by [`NodeHandle`]. Animation tracks target nodes by
/// name, so the model keeps a name index for binding.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub name: String,
    pub nodes: SlotMap<NodeHandle, Node>,
    pub roots: Vec<NodeHandle>,
    pub meshes: Vec<MeshData>,
    pub skeletons: Vec<Skeleton>,

    name_index: FxHashMap<String, NodeHandle>,
}

impl Model {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Inserts a detached node. The first node with a given name wins the
    /// name lookup.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let name = node.name.clone();
        let handle = self.nodes.insert(node);
        self.name_index.entry(name).or_insert(handle);
        handle
    }

    /// Makes `child` a child of `parent`, detaching it from any previous parent.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent || !self.nodes.contains_key(parent) {
            return;
        }
        let Some(old_parent) = self.nodes.get(child).map(|n| n.parent) else {
            return;
        };
        if let Some(old) = old_parent
            && let Some(old_node) = self.nodes.get_mut(old)
        {
            old_node.children.retain(|c| *c != child);
        }
        self.roots.retain(|r| *r != child);

        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(child);
        }
    }

    #[inline]
    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    #[inline]
    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[must_use]
    pub fn find_node_by_name(&self, name: &str) -> Option<NodeHandle> {
        self.name_index.get(name).copied()
    }

    /// Rest value of an animatable node property.
    #[must_use]
    pub fn rest_value(&self, handle: NodeHandle, target: TargetPath) -> Option<RestValue> {
        let rest = self.nodes.get(handle)?.rest;
        Some(match target {
            TargetPath::Translation => RestValue::Vector3(rest.position),
            TargetPath::Scale => RestValue::Vector3(rest.scale),
            TargetPath::Rotation => RestValue::Quaternion(rest.rotation),
        })
    }

    /// Sets the root scale applied to every top-level node.
    pub fn set_root_scale(&mut self, scale: f32) {
        for &root in &self.roots {
            if let Some(node) = self.nodes.get_mut(root) {
                node.transform.scale = node.rest.scale * scale;
                node.rest.scale = node.transform.scale;
            }
        }
    }

    /// Propagates local matrices down the hierarchy.
    pub fn update_world_matrices(&mut self) {
        let mut stack: Vec<(NodeHandle, Affine3A, bool)> = self
            .roots
            .iter()
            .rev()
            .map(|&r| (r, Affine3A::IDENTITY, false))
            .collect();

        while let Some((handle, parent_world, parent_changed)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(handle) else {
                continue;
            };
            let local_changed = node.transform.update_local_matrix();
            let changed = local_changed || parent_changed;
            if changed {
                node.transform.world_matrix = parent_world * node.transform.local_matrix;
            }
            let world = node.transform.world_matrix;
            for &child in node.children.iter().rev() {
                stack.push((child, world, changed));
            }
        }
    }

    /// Recomputes joint palettes of every skinned mesh node.
    ///
    /// World matrices must be current.
    pub fn update_skeletons(&mut self) {
        let skinned: Vec<(usize, Affine3A)> = self
            .nodes
            .values()
            .filter_map(|n| n.skin.map(|s| (s, n.transform.world_matrix.inverse())))
            .collect();

        for (skin_index, root_inv) in skinned {
            if let Some(skeleton) = self.skeletons.get_mut(skin_index) {
                skeleton.compute_joint_matrices(&self.nodes, root_inv);
            }
        }
    }

    /// World bounds of the current pose, from bones when available and node
    /// origins otherwise.
    #[must_use]
    pub fn compute_bounds(&self) -> Option<BoundingBox> {
        let from_bones = self
            .skeletons
            .iter()
            .filter_map(|s| s.compute_world_bounds(&self.nodes))
            .reduce(|a, b| BoundingBox {
                min: a.min.min(b.min),
                max: a.max.max(b.max),
            });
        if from_bones.is_some() {
            return from_bones;
        }

        let mut iter = self.nodes.values().map(|n| n.transform.world_position());
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(mn, mx), p| (mn.min(p), mx.max(p)));
        Some(BoundingBox { min, max })
    }
}

/// Rest value of a single property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RestValue {
    Vector3(Vec3),
    Quaternion(Quat),
}

/// Convenience for building nodes in code and tests.
#[must_use]
pub fn node_at(name: &str, position: Vec3) -> Node {
    Node::new(name, Transform::from_trs(position, Quat::IDENTITY, Vec3::ONE))
}
