//! Curve application: frame orchestration, the winit window, config
//! reloading and platform directories.

pub mod error;
pub mod platform;
pub mod reload;
pub mod runner;
pub mod window;

pub use error::AppError;
pub use platform::PlatformDirs;
pub use reload::{ConfigWatcher, RELOAD_INTERVAL};
pub use runner::{Runner, SPEED_OF_LIGHT, SolarSystem, far_plane, follow_settings};
pub use window::{CurveApp, VirtualCursor, WinitCursor, run, window_attributes_from_config};
