//! Renderer settings.
//!
//! ```rust,ignore
//! use marionette::renderer::RenderSettings;
//!
//! let settings = RenderSettings {
//!     vsync: false,
//!     ..Default::default()
//! };
//! ```

/// GPU and surface configuration used when the renderer is initialized.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Adapter selection hint.
    pub power_preference: wgpu::PowerPreference,
    /// Optional device features. Leave empty unless a custom pass needs them.
    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,
    /// `AutoVsync` when true, `AutoNoVsync` otherwise.
    pub vsync: bool,
    /// Depth buffer format. The scene is drawn with reverse Z.
    pub depth_format: wgpu::TextureFormat,
    /// Requested sample count of the scene pass. 1 disables MSAA.
    pub msaa_samples: u32,
    /// Clear colour used before a stage is configured.
    pub clear_color: wgpu::Color,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            vsync: true,
            depth_format: wgpu::TextureFormat::Depth32Float,
            msaa_samples: 4,
            clear_color: wgpu::Color::BLACK,
        }
    }
}

impl RenderSettings {
    /// Settings derived from a viewer's render section.
    #[must_use]
    pub fn from_config(config: &crate::viewer::RenderConfig) -> Self {
        Self {
            vsync: config.vsync,
            msaa_samples: config.msaa_samples,
            ..Self::default()
        }
    }
}
