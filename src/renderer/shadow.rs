//! Directional Shadow Map
//!
//! One orthographic depth map rendered from the directional light before
//! the scene pass. The ground and the character sample it with a
//! comparison sampler (3x3 PCF in `common.wgsl`).
//!
//! The shadow pass uses standard depth (clear to 1.0, `LessEqual`), unlike
//! the reverse-Z scene pass.

use glam::{Mat4, Vec3};

use crate::viewer::{DirectionalLightConfig, ShadowConfig};

pub const SHADOW_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Light view-projection of `light`, looking from its position at the
/// origin.
#[must_use]
pub fn light_view_projection(light: &DirectionalLightConfig, shadow: &ShadowConfig) -> Mat4 {
    let position = Vec3::from_array(light.position);
    let distance = position.length();
    let direction = if distance > 1e-6 {
        -position / distance
    } else {
        -Vec3::Y
    };
    let eye = -direction * distance.max(1.0);

    let up = if direction.y.abs() > 0.99 {
        Vec3::X
    } else {
        Vec3::Y
    };
    let view = Mat4::look_at_rh(eye, Vec3::ZERO, up);

    let e = shadow.half_extent;
    let proj = Mat4::orthographic_rh(-e, e, -e, e, shadow.near, shadow.far);
    proj * view
}

/// Depth texture and comparison sampler of the shadow map.
pub struct ShadowMap {
    pub size: u32,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl ShadowMap {
    /// A 1x1 map stands in when shadows are disabled so the scene bind
    /// group layout stays the same.
    #[must_use]
    pub fn new(device: &wgpu::Device, config: Option<&ShadowConfig>) -> Self {
        let size = config.map_or(1, |c| c.map_size.max(1));
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shadow Map"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SHADOW_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        Self {
            size,
            view,
            sampler,
        }
    }

    /// Records the depth-only pass. `draw` issues the casters.
    pub fn record(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        draw: impl FnOnce(&mut wgpu::RenderPass<'_>),
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Depth Pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        draw(&mut pass);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(vp: Mat4, p: Vec3) -> Vec3 {
        vp.project_point3(p)
    }

    fn inside(ndc: Vec3) -> bool {
        ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0 && (0.0..=1.0).contains(&ndc.z)
    }

    #[test]
    fn origin_is_centred() {
        let vp = light_view_projection(
            &DirectionalLightConfig::default(),
            &ShadowConfig::default(),
        );
        let ndc = project(vp, Vec3::ZERO);
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5, "{ndc}");
        assert!(inside(ndc));
    }

    #[test]
    fn character_volume_fits_light_frustum() {
        let vp = light_view_projection(
            &DirectionalLightConfig::default(),
            &ShadowConfig::default(),
        );
        // A standing figure in centimetres around the origin.
        let (min, max) = (Vec3::new(-60.0, 0.0, -60.0), Vec3::new(60.0, 190.0, 60.0));
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { min.x } else { max.x },
                if i & 2 == 0 { min.y } else { max.y },
                if i & 4 == 0 { min.z } else { max.z },
            );
            let ndc = project(vp, corner);
            assert!(inside(ndc), "{corner} -> {ndc}");
        }
    }

    #[test]
    fn points_nearer_the_light_have_smaller_depth() {
        let vp = light_view_projection(
            &DirectionalLightConfig::default(),
            &ShadowConfig::default(),
        );
        let head = project(vp, Vec3::new(0.0, 180.0, 0.0));
        let feet = project(vp, Vec3::ZERO);
        assert!(head.z < feet.z);
    }

    #[test]
    fn overhead_light_does_not_degenerate() {
        let light = DirectionalLightConfig {
            position: [0.0, 300.0, 0.0],
            ..DirectionalLightConfig::default()
        };
        let vp = light_view_projection(&light, &ShadowConfig::default());
        assert!(vp.is_finite());
        assert!(inside(project(vp, Vec3::new(10.0, 50.0, -10.0))));

        let at_origin = DirectionalLightConfig {
            position: [0.0; 3],
            ..DirectionalLightConfig::default()
        };
        assert!(light_view_projection(&at_origin, &ShadowConfig::default()).is_finite());
    }
}
