//! Utility Module
//!
//! - [`OrbitControls`]: camera orbit controller for interactive viewing
//! - [`FpsCounter`]: frame rate measurement
//! - [`Timer`]: clamped frame clock

pub mod fps_counter;
pub mod orbit_control;
pub mod time;

pub use fps_counter::FpsCounter;
pub use orbit_control::OrbitControls;
pub use time::Timer;
