use glam::{Affine3A, Mat4, Vec3};
use slotmap::SlotMap;

use crate::scene::{Node, NodeHandle};

/// Axis-aligned bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    #[inline]
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

#[derive(Debug, Clone)]
pub struct Skeleton {
    pub name: String,

    // bones[i] corresponds to joints[i] in the shader
    pub bones: Vec<NodeHandle>,

    // Transforms vertices from mesh space to bone local space
    pub(crate) inverse_bind_matrices: Vec<Affine3A>,

    pub(crate) root_bone_index: usize,

    // Recomputed every frame and uploaded as-is
    pub(crate) joint_matrices: Vec<Mat4>,
}

impl Skeleton {
    #[must_use]
    pub fn new(
        name: &str,
        bones: Vec<NodeHandle>,
        inverse_bind_matrices: Vec<Affine3A>,
        root_bone_index: usize,
    ) -> Self {
        let count = bones.len();
        Self {
            name: name.to_string(),
            bones,
            inverse_bind_matrices,
            root_bone_index,
            joint_matrices: vec![Mat4::IDENTITY; count],
        }
    }

    #[inline]
    #[must_use]
    pub fn root_bone(&self) -> Option<NodeHandle> {
        self.bones.get(self.root_bone_index).copied()
    }

    #[inline]
    #[must_use]
    pub fn joint_matrices(&self) -> &[Mat4] {
        &self.joint_matrices
    }

    /// Tight world bounds over current bone positions.
    #[must_use]
    pub fn compute_world_bounds(&self, nodes: &SlotMap<NodeHandle, Node>) -> Option<BoundingBox> {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        let mut valid = false;

        for &bone_handle in &self.bones {
            if let Some(bone_node) = nodes.get(bone_handle) {
                let pos = bone_node.transform.world_position();
                min = min.min(pos);
                max = max.max(pos);
                valid = true;
            }
        }

        valid.then_some(BoundingBox { min, max })
    }

    /// Updates joint matrices.
    ///
    /// `root_matrix_inv` is the inverse world matrix of the node carrying the
    /// skinned mesh, so joints end up in mesh-local space.
    pub fn compute_joint_matrices(
        &mut self,
        nodes: &SlotMap<NodeHandle, Node>,
        root_matrix_inv: Affine3A,
    ) {
        for (i, &bone_handle) in self.bones.iter().enumerate() {
            let Some(bone_node) = nodes.get(bone_handle) else {
                continue;
            };
            let ibm = self
                .inverse_bind_matrices
                .get(i)
                .copied()
                .unwrap_or(Affine3A::IDENTITY);

            self.joint_matrices[i] =
                (root_matrix_inv * bone_node.transform.world_matrix * ibm).into();
        }
    }
}
