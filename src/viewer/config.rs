//! Viewer configuration.
//!
//! Every field has a default, so a JSON file only needs to name what it
//! changes:
//!
//! ```json
//! {
//!   "asset_root": "https://example.com/assets/",
//!   "catalog": { "clips": ["Walking", "Running"], "initial": "Walking" },
//!   "stage": { "fog": null }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::viewer::catalog::{AnimationCatalog, NAME_PLACEHOLDER};

/// Converts a `0xRRGGBB` colour to linear RGB.
#[must_use]
pub fn hex_to_linear(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| {
        let c = ((hex >> shift) & 0xff) as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    [channel(16), channel(8), channel(0)]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    /// Orbit target.
    pub target: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 45.0,
            near: 1.0,
            far: 2000.0,
            position: [100.0, 200.0, 300.0],
            target: [0.0, 100.0, 0.0],
        }
    }
}

/// Linear distance fog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FogConfig {
    pub color: u32,
    pub near: f32,
    pub far: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HemisphereLightConfig {
    pub sky_color: u32,
    pub ground_color: u32,
    pub intensity: f32,
    pub position: [f32; 3],
}

impl Default for HemisphereLightConfig {
    fn default() -> Self {
        Self {
            sky_color: 0xffffff,
            ground_color: 0x444444,
            intensity: 5.0,
            position: [0.0, 200.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalLightConfig {
    pub color: u32,
    pub intensity: f32,
    /// The light shines from here toward the origin.
    pub position: [f32; 3],
    /// `None` disables the shadow map.
    pub shadow: Option<ShadowConfig>,
}

impl Default for DirectionalLightConfig {
    fn default() -> Self {
        Self {
            color: 0xffffff,
            intensity: 5.0,
            position: [0.0, 200.0, 100.0],
            shadow: Some(ShadowConfig::default()),
        }
    }
}

/// Orthographic shadow map of the directional light, centred on the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    /// Width and height of the depth texture in texels.
    pub map_size: u32,
    /// Half width and half height of the light's view volume.
    pub half_extent: f32,
    pub near: f32,
    pub far: f32,
    /// Depth offset in normalized light depth.
    pub bias: f32,
    /// Whether the character is drawn into the shadow map. The ground
    /// always receives.
    pub model_casts: bool,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            map_size: 2048,
            half_extent: 200.0,
            near: 1.0,
            far: 500.0,
            bias: 0.001,
            model_casts: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub background: u32,
    pub fog: Option<FogConfig>,
    pub hemisphere: HemisphereLightConfig,
    pub directional: DirectionalLightConfig,
    /// Edge length of the square ground plane.
    pub ground_size: f32,
    pub ground_color: u32,
    pub grid_divisions: u32,
    pub grid_color: u32,
    pub grid_opacity: f32,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            background: 0xa0a0a0,
            fog: Some(FogConfig {
                color: 0xa0a0a0,
                near: 200.0,
                far: 1000.0,
            }),
            hemisphere: HemisphereLightConfig::default(),
            directional: DirectionalLightConfig::default(),
            ground_size: 2000.0,
            ground_color: 0x999999,
            grid_divisions: 20,
            grid_color: 0x000000,
            grid_opacity: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub vsync: bool,
    /// 1 disables multisampling. Falls back to 1 when the adapter lacks
    /// the requested count.
    pub msaa_samples: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            vsync: true,
            msaa_samples: 4,
        }
    }
}

/// Top-level viewer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub title: String,
    /// Directory path or base URL that catalog paths are resolved against.
    pub asset_root: String,
    pub catalog: AnimationCatalog,
    /// Cross-fade duration when switching clips.
    pub fade_seconds: f32,
    /// Uniform scale applied to the attached model's root nodes.
    pub model_scale: f32,
    pub camera: CameraConfig,
    pub stage: StageConfig,
    pub render: RenderConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self::showcase()
    }
}

impl ViewerConfig {
    #[must_use]
    pub fn showcase() -> Self {
        Self {
            title: "Marionette - animation showcase".to_string(),
            asset_root: "assets".to_string(),
            catalog: AnimationCatalog::showcase(),
            fade_seconds: 0.3,
            model_scale: 1.0,
            camera: CameraConfig::default(),
            stage: StageConfig::default(),
            render: RenderConfig::default(),
        }
    }

    /// Base-first preset. Same stage without fog, with the character
    /// casting shadows.
    #[must_use]
    pub fn capoeira() -> Self {
        let stage = StageConfig::default();
        Self {
            title: "Marionette - capoeira".to_string(),
            catalog: AnimationCatalog::capoeira(),
            stage: StageConfig {
                fog: None,
                directional: DirectionalLightConfig {
                    shadow: Some(ShadowConfig {
                        model_casts: true,
                        ..ShadowConfig::default()
                    }),
                    ..stage.directional
                },
                ..stage
            },
            ..Self::showcase()
        }
    }

    #[must_use]
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "showcase" => Some(Self::showcase()),
            "capoeira" => Some(Self::capoeira()),
            _ => None,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        log::info!("Loaded viewer config from {}", path.display());
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(Error::InvalidConfig(msg));

        if self.catalog.clips.is_empty() {
            return fail("catalog has no clips".into());
        }
        if !self.catalog.path_template.contains(NAME_PLACEHOLDER) {
            return fail(format!(
                "path template '{}' lacks {NAME_PLACEHOLDER}",
                self.catalog.path_template
            ));
        }
        if !(self.fade_seconds >= 0.0 && self.fade_seconds.is_finite()) {
            return fail(format!("fade_seconds must be >= 0, got {}", self.fade_seconds));
        }
        if !(self.model_scale > 0.0) {
            return fail(format!("model_scale must be > 0, got {}", self.model_scale));
        }
        let cam = &self.camera;
        if !(cam.fov > 0.0 && cam.fov < 180.0) {
            return fail(format!("camera fov out of range: {}", cam.fov));
        }
        if !(cam.near > 0.0 && cam.far > cam.near) {
            return fail(format!("camera clip range invalid: {}..{}", cam.near, cam.far));
        }
        if let Some(fog) = &self.stage.fog
            && fog.far <= fog.near
        {
            return fail(format!("fog range invalid: {}..{}", fog.near, fog.far));
        }
        if self.stage.grid_divisions == 0 {
            return fail("grid_divisions must be > 0".into());
        }
        if let Some(shadow) = &self.stage.directional.shadow {
            if !(1..=8192).contains(&shadow.map_size) {
                return fail(format!("shadow map_size out of range: {}", shadow.map_size));
            }
            if !(shadow.half_extent > 0.0) {
                return fail(format!(
                    "shadow half_extent must be > 0, got {}",
                    shadow.half_extent
                ));
            }
            if !(shadow.near >= 0.0 && shadow.far > shadow.near) {
                return fail(format!(
                    "shadow depth range invalid: {}..{}",
                    shadow.near, shadow.far
                ));
            }
        }
        if !matches!(self.render.msaa_samples, 1 | 2 | 4 | 8) {
            return fail(format!(
                "msaa_samples must be 1, 2, 4 or 8, got {}",
                self.render.msaa_samples
            ));
        }
        Ok(())
    }
}
