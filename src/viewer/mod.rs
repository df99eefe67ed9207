//! The clip viewer: which files to load, how completions are applied and
//! how the dropdown selection drives playback.

pub mod catalog;
pub mod config;
pub mod playback;
pub mod registry;
pub mod session;

pub use catalog::{AnimationCatalog, LoadStrategy};
pub use config::{
    CameraConfig, DirectionalLightConfig, FogConfig, HemisphereLightConfig, RenderConfig,
    ShadowConfig, StageConfig, ViewerConfig, hex_to_linear,
};
pub use playback::Playback;
pub use registry::ClipRegistry;
pub use session::{ClipLoader, SessionPhase, ViewerSession};
