//! Configuration system for Curve.
//!
//! Settings persist to disk as `config.ron`, can be overridden from the
//! command line via clap, and can be re-read while running with
//! [`Config::reload`].

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{CameraConfig, Config, DebugConfig, LodConfig, SimulationConfig, WindowConfig};
pub use error::ConfigError;
