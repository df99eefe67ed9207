use glam::{Mat4, Vec3};

use crate::viewer::CameraConfig;

/// Perspective camera looking at a target point.
///
/// Projection uses reverse Z: the near plane maps to depth 1 and the far
/// plane to depth 0.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,

    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl PerspectiveCamera {
    /// `fov_degrees` is the vertical field of view.
    #[must_use]
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov: fov_degrees.to_radians(),
            aspect,
            near,
            far,
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
        }
    }

    #[must_use]
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            position: Vec3::from_array(config.position),
            target: Vec3::from_array(config.target),
            ..Self::new(config.fov, aspect, config.near, config.far)
        }
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    #[inline]
    #[must_use]
    pub fn fov_degrees(&self) -> f32 {
        self.fov.to_degrees()
    }

    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        // Swapping near and far yields reverse Z with a 0..1 depth range.
        Mat4::perspective_rh(self.fov, self.aspect, self.far, self.near)
    }

    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn near_plane_maps_to_depth_one() {
        let camera = PerspectiveCamera {
            position: Vec3::ZERO,
            target: Vec3::NEG_Z,
            ..PerspectiveCamera::new(45.0, 1.0, 1.0, 100.0)
        };
        let vp = camera.view_projection_matrix();

        let near = vp.project_point3(Vec3::new(0.0, 0.0, -1.0));
        let far = vp.project_point3(Vec3::new(0.0, 0.0, -100.0));
        assert!((near.z - 1.0).abs() < 1e-5, "near depth {}", near.z);
        assert!(far.z.abs() < 1e-5, "far depth {}", far.z);
    }

    #[test]
    fn aspect_ignores_zero_size() {
        let mut camera = PerspectiveCamera::new(45.0, 1.5, 1.0, 100.0);
        camera.set_aspect(0, 720);
        assert_eq!(camera.aspect, 1.5);
        camera.set_aspect(1280, 640);
        assert_eq!(camera.aspect, 2.0);
    }
}
