//! Character model data.
//!
//! - Node: hierarchy entry with TRS transform and rest pose
//! - Transform: cached local/world matrices
//! - Skeleton: bone list and joint palette
//! - MeshData: CPU-side skinned geometry
//! - Model: the loaded character tying them together
//! - PerspectiveCamera: the viewer camera

pub mod camera;
pub mod mesh;
pub mod model;
pub mod node;
pub mod skeleton;
pub mod transform;

pub use camera::PerspectiveCamera;
pub use mesh::{MeshData, SkinnedVertex};
pub use model::{Model, RestValue, node_at};
pub use node::{Node, RestPose};
pub use skeleton::{BoundingBox, Skeleton};
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
}
