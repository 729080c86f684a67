//! Command-line overrides for `config.ron`.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Flags accepted by the `curve` binary. Anything left unset keeps the value
/// loaded from disk.
#[derive(Parser, Debug, Default)]
#[command(name = "curve", about = "Curve, a space flight sandbox", version)]
pub struct CliArgs {
    /// Window width in pixels.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height in pixels.
    #[arg(long)]
    pub height: Option<u32>,

    /// Physics tick interval in milliseconds.
    #[arg(long = "tick-ms", value_name = "MS")]
    pub tick_interval_ms: Option<u64>,

    /// World meters per render unit.
    #[arg(long, value_name = "FACTOR")]
    pub scale: Option<f64>,

    /// Initial vertical field of view in degrees.
    #[arg(long, value_name = "DEGREES")]
    pub fov: Option<f32>,

    /// Log filter, e.g. `debug` or `info,curve_lod=trace`.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Directory holding `config.ron` and the logs.
    #[arg(long, value_name = "DIR")]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Overwrite loaded settings with whatever was passed on the command
    /// line. Run [`Config::validate`] afterwards.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        let CliArgs {
            width,
            height,
            tick_interval_ms,
            scale,
            fov,
            log_level,
            config: _,
        } = args;

        self.window.width = width.unwrap_or(self.window.width);
        self.window.height = height.unwrap_or(self.window.height);
        self.simulation.tick_interval_ms =
            tick_interval_ms.unwrap_or(self.simulation.tick_interval_ms);
        self.simulation.position_scale = scale.unwrap_or(self.simulation.position_scale);
        self.camera.fov = fov.unwrap_or(self.camera.fov);
        if let Some(level) = log_level {
            self.debug.log_level.clone_from(level);
        }
    }
}
