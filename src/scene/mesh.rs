use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Interleaved vertex consumed by the skinned mesh pipeline.
///
/// Unskinned geometry binds joint 0 with full weight against an identity
/// joint palette, so one pipeline covers both cases.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SkinnedVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub joints: [u32; 4],
    pub weights: [f32; 4],
}

impl SkinnedVertex {
    #[must_use]
    pub fn rigid(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self {
            position,
            normal,
            joints: [0; 4],
            weights: [1.0, 0.0, 0.0, 0.0],
        }
    }
}

/// CPU-side mesh data of one glTF primitive.
#[derive(Debug, Clone)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<SkinnedVertex>,
    pub indices: Vec<u32>,
    /// Linear RGBA base colour.
    pub base_color: [f32; 4],
    pub skinned: bool,
}

impl MeshData {
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Fills in flat normals when the source has none.
    pub fn compute_normals_if_missing(&mut self) {
        let missing = self
            .vertices
            .iter()
            .all(|v| v.normal == [0.0, 0.0, 0.0]);
        if !missing || self.indices.len() < 3 {
            return;
        }

        let mut accum = vec![Vec3::ZERO; self.vertices.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let (Some(va), Some(vb), Some(vc)) =
                (self.vertices.get(a), self.vertices.get(b), self.vertices.get(c))
            else {
                continue;
            };
            let pa = Vec3::from_array(va.position);
            let n = (Vec3::from_array(vb.position) - pa).cross(Vec3::from_array(vc.position) - pa);
            accum[a] += n;
            accum[b] += n;
            accum[c] += n;
        }

        for (vertex, n) in self.vertices.iter_mut().zip(accum) {
            vertex.normal = n.normalize_or(Vec3::Y).to_array();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_normals_point_up_for_ground_triangle() {
        let mut mesh = MeshData {
            name: "tri".into(),
            vertices: vec![
                SkinnedVertex::rigid([0.0, 0.0, 0.0], [0.0; 3]),
                SkinnedVertex::rigid([0.0, 0.0, 1.0], [0.0; 3]),
                SkinnedVertex::rigid([1.0, 0.0, 0.0], [0.0; 3]),
            ],
            indices: vec![0, 1, 2],
            base_color: [1.0; 4],
            skinned: false,
        };
        mesh.compute_normals_if_missing();
        for v in &mesh.vertices {
            assert!((v.normal[1] - 1.0).abs() < 1e-5, "got {:?}", v.normal);
        }
    }
}
