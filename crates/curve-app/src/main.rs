//! Curve: a solar system at real scale, flown from a physics-driven
//! follow camera.
//!
//! Run with: `cargo run -p curve-app`

use clap::Parser;
use curve_app::{ConfigWatcher, PlatformDirs};
use curve_config::{CliArgs, Config};
use tracing::{error, info, warn};

fn main() {
    let args = CliArgs::parse();

    let dirs = match PlatformDirs::resolve(args.config.as_deref()) {
        Ok(dirs) => dirs,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    // Logging is not up yet, so a load failure is reported after init.
    let (mut config, watcher, load_error) = match Config::load_or_create(&dirs.config_dir) {
        Ok(config) => {
            let watcher = ConfigWatcher::new(dirs.config_dir.clone(), config.clone());
            (config, Some(watcher), None)
        }
        Err(e) => (Config::default(), None, Some(e)),
    };
    config.apply_cli_overrides(&args);

    curve_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));

    if let Some(e) = load_error {
        warn!("failed to load config, using defaults: {e}");
    }
    if let Err(e) = config.validate() {
        error!("{e}");
        std::process::exit(1);
    }

    info!("Curve v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Window: {}x{} | Tick: {}ms | Scale: {}",
        config.window.width,
        config.window.height,
        config.simulation.tick_interval_ms,
        config.simulation.position_scale,
    );
    info!("Config dir: {}", dirs.config_dir.display());

    if let Err(e) = curve_app::run(config, watcher) {
        error!("{e}");
        std::process::exit(1);
    }
}
