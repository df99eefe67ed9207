//! Application layer: input state and the winit window runner.

pub mod input;
#[cfg(feature = "winit")]
pub mod winit;

pub use input::{ButtonState, Input, MouseButton};
#[cfg(feature = "winit")]
pub use self::winit::{App, AppHandler};
