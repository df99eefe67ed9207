//! GPU uniform layouts.
//!
//! Every field is a full `vec4`/`mat4` so the Rust and WGSL layouts agree
//! without manual padding.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::renderer::shadow::light_view_projection;
use crate::scene::PerspectiveCamera;
use crate::viewer::{StageConfig, hex_to_linear};

/// Per-frame data shared by every pipeline (group 0).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GlobalUniforms {
    pub view_projection: Mat4,
    pub view: Mat4,
    pub camera_position: [f32; 4],
    /// Hemisphere sky colour premultiplied by intensity.
    pub sky_color: [f32; 4],
    pub ground_color: [f32; 4],
    /// Unit vector pointing toward the directional light.
    pub light_direction: [f32; 4],
    pub light_color: [f32; 4],
    pub fog_color: [f32; 4],
    /// x: near, y: far, z: 1 when enabled.
    pub fog_params: [f32; 4],
    pub light_view_projection: Mat4,
    /// x: 1 when enabled, y: depth bias, z: texel size.
    pub shadow_params: [f32; 4],
}

impl Default for GlobalUniforms {
    fn default() -> Self {
        Self {
            view_projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            camera_position: [0.0; 4],
            sky_color: [1.0, 1.0, 1.0, 0.0],
            ground_color: [0.0; 4],
            light_direction: [0.0, 1.0, 0.0, 0.0],
            light_color: [0.0; 4],
            fog_color: [0.0; 4],
            fog_params: [0.0; 4],
            light_view_projection: Mat4::IDENTITY,
            shadow_params: [0.0; 4],
        }
    }
}

fn scaled(hex: u32, intensity: f32) -> [f32; 4] {
    let [r, g, b] = hex_to_linear(hex);
    [r * intensity, g * intensity, b * intensity, 0.0]
}

impl GlobalUniforms {
    #[must_use]
    pub fn new(camera: &PerspectiveCamera, stage: &StageConfig) -> Self {
        let hemi = &stage.hemisphere;
        let dir = &stage.directional;
        let light_direction = Vec3::from_array(dir.position).normalize_or(Vec3::Y);

        let (fog_color, fog_params) = match &stage.fog {
            Some(fog) => (scaled(fog.color, 1.0), [fog.near, fog.far, 1.0, 0.0]),
            None => ([0.0; 4], [0.0; 4]),
        };

        let (light_view_projection, shadow_params) = match &dir.shadow {
            Some(shadow) => (
                light_view_projection(dir, shadow),
                [1.0, shadow.bias, 1.0 / shadow.map_size.max(1) as f32, 0.0],
            ),
            None => (Mat4::IDENTITY, [0.0; 4]),
        };

        Self {
            view_projection: camera.view_projection_matrix(),
            view: camera.view_matrix(),
            camera_position: camera.position.extend(1.0).to_array(),
            sky_color: scaled(hemi.sky_color, hemi.intensity),
            ground_color: scaled(hemi.ground_color, hemi.intensity),
            light_direction: light_direction.extend(0.0).to_array(),
            light_color: scaled(dir.color, dir.intensity),
            fog_color,
            fog_params,
            light_view_projection,
            shadow_params,
        }
    }
}

/// Per-draw data of a character mesh (group 1, binding 0).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MeshUniforms {
    pub model: Mat4,
    pub base_color: [f32; 4],
}

impl Default for MeshUniforms {
    fn default() -> Self {
        Self {
            model: Mat4::IDENTITY,
            base_color: [1.0; 4],
        }
    }
}

/// Per-draw data of the ground plane and grid (group 1).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct StageUniforms {
    /// Linear RGB plus opacity.
    pub color: [f32; 4],
    /// x: 1 for lit surfaces, 0 for unlit lines.
    pub params: [f32; 4],
}
