//! Marionette: a skeletal clip viewer.
//!
//! Loads a rigged character and a catalog of named animation clips from
//! glTF files, cross-fades between clips on request, and renders the posed
//! character on a lit stage.
//!
//! - [`animation`]: keyframe tracks, actions and the blending mixer
//! - [`scene`]: node hierarchy, skeletons and meshes of a loaded model
//! - [`assets`]: file/HTTP readers, the glTF loader and the background server
//! - [`viewer`]: clip catalog, playback state and load sequencing
//! - [`renderer`]: the wgpu forward renderer
//! - [`app`]: input state and the winit runner

pub mod animation;
pub mod app;
pub mod assets;
pub mod engine;
pub mod errors;
pub mod renderer;
pub mod scene;
pub mod utils;
pub mod viewer;

pub use animation::{AnimationAction, AnimationClip, AnimationMixer, Binder, LoopMode};
#[cfg(feature = "winit")]
pub use app::App;
pub use assets::{AssetServer, GltfLoader, LoadedAsset};
pub use engine::{Engine, FrameState};
pub use errors::{AssetError, Error, Result};
pub use renderer::{RenderSettings, Renderer, WgpuContext};
pub use scene::{Model, NodeHandle, PerspectiveCamera};
pub use utils::{FpsCounter, OrbitControls};
pub use viewer::{AnimationCatalog, LoadStrategy, Playback, ViewerConfig, ViewerSession};
