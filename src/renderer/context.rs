//! wgpu Context
//!
//! The [`WgpuContext`] holds core GPU handles: device, queue, surface, and config.
//! It is responsible for window surface management and resize handling.

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::errors::{Error, Result};
use crate::renderer::settings::RenderSettings;

/// Highest count `<= requested`, halving down to 1, that `supported` accepts.
#[must_use]
pub fn pick_sample_count(requested: u32, supported: impl Fn(u32) -> bool) -> u32 {
    let mut count = requested.max(1).next_power_of_two();
    if count > requested.max(1) {
        count /= 2;
    }
    while count > 1 && !supported(count) {
        count /= 2;
    }
    count
}

/// Core wgpu context holding GPU handles.
///
/// Owns the depth buffer and, with MSAA, the multisampled colour target.
/// Both are recreated on resize.
pub struct WgpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,

    pub depth_format: wgpu::TextureFormat,
    pub depth_texture_view: wgpu::TextureView,
    pub msaa_samples: u32,
    msaa_color_view: Option<wgpu::TextureView>,
    pub clear_color: wgpu::Color,
}

impl WgpuContext {
    pub async fn new<W>(
        window: W,
        settings: &RenderSettings,
        width: u32,
        height: u32,
    ) -> Result<Self>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: settings.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| Error::AdapterRequestFailed(e.to_string()))?;

        log::info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Marionette Device"),
                required_features: settings.required_features,
                required_limits: settings.required_limits.clone(),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await?;

        let mut config = surface
            .get_default_config(&adapter, width.max(1), height.max(1))
            .ok_or_else(|| {
                Error::AdapterRequestFailed("Surface not supported by adapter".to_string())
            })?;

        config.present_mode = if settings.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        surface.configure(&device, &config);

        let color_flags = adapter.get_texture_format_features(config.format).flags;
        let depth_flags = adapter
            .get_texture_format_features(settings.depth_format)
            .flags;
        let msaa_samples = pick_sample_count(settings.msaa_samples, |count| {
            color_flags.sample_count_supported(count) && depth_flags.sample_count_supported(count)
        });
        if msaa_samples != settings.msaa_samples {
            log::warn!(
                "MSAA x{} unsupported for {:?}, using x{msaa_samples}",
                settings.msaa_samples,
                config.format
            );
        }

        let depth_texture_view =
            Self::create_depth_texture(&device, &config, settings.depth_format, msaa_samples);
        let msaa_color_view = Self::create_msaa_texture(&device, &config, msaa_samples);

        Ok(Self {
            device,
            queue,
            surface,
            config,
            depth_format: settings.depth_format,
            depth_texture_view,
            msaa_samples,
            msaa_color_view,
            clear_color: settings.clear_color,
        })
    }

    /// Zero sizes (minimized windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture_view = Self::create_depth_texture(
                &self.device,
                &self.config,
                self.depth_format,
                self.msaa_samples,
            );
            self.msaa_color_view =
                Self::create_msaa_texture(&self.device, &self.config, self.msaa_samples);
        }
    }

    /// Re-applies the current configuration after the surface was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> wgpu::TextureView {
        let size = wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// `None` when `sample_count` is 1.
    fn create_msaa_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        sample_count: u32,
    ) -> Option<wgpu::TextureView> {
        if sample_count <= 1 {
            return None;
        }
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("MSAA Color Texture"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        Some(texture.create_view(&wgpu::TextureViewDescriptor::default()))
    }

    /// Multisampled colour target that resolves into the surface.
    #[inline]
    #[must_use]
    pub fn msaa_view(&self) -> Option<&wgpu::TextureView> {
        self.msaa_color_view.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    #[inline]
    #[must_use]
    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_texture_view
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    #[inline]
    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.config.width.max(1) as f32 / self.config.height.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_count_falls_back_to_supported() {
        assert_eq!(pick_sample_count(4, |_| true), 4);
        assert_eq!(pick_sample_count(8, |c| c <= 4), 4);
        assert_eq!(pick_sample_count(4, |c| c == 1), 1);
        assert_eq!(pick_sample_count(1, |_| false), 1);
        assert_eq!(pick_sample_count(0, |_| true), 1);
        assert_eq!(pick_sample_count(6, |_| true), 4);
    }
}
