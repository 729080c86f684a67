//! Polling `config.ron` for edits made while the app runs.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use curve_config::Config;
use tracing::{info, warn};

/// How often the config file is re-read.
pub const RELOAD_INTERVAL: Duration = Duration::from_secs(2);

/// Re-reads the config file at a fixed interval and reports edits.
///
/// Compares against the last contents seen on disk, so command-line
/// overrides applied to the running config never count as changes.
#[derive(Debug)]
pub struct ConfigWatcher {
    dir: PathBuf,
    interval: Duration,
    on_disk: Config,
    last_check: Instant,
}

impl ConfigWatcher {
    /// Watch `dir/config.ron`, whose current contents are `on_disk`.
    pub fn new(dir: PathBuf, on_disk: Config) -> Self {
        Self::with_interval(dir, on_disk, RELOAD_INTERVAL)
    }

    pub fn with_interval(dir: PathBuf, on_disk: Config, interval: Duration) -> Self {
        Self {
            dir,
            interval,
            on_disk,
            last_check: Instant::now(),
        }
    }

    /// The new file contents if the interval has elapsed and the file
    /// changed. Unreadable or invalid files are logged and skipped.
    pub fn poll(&mut self, now: Instant) -> Option<Config> {
        if now.saturating_duration_since(self.last_check) < self.interval {
            return None;
        }
        self.last_check = now;

        match self.on_disk.reload(&self.dir) {
            Ok(Some(config)) => {
                info!(dir = %self.dir.display(), "config file changed");
                self.on_disk = config.clone();
                Some(config)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("ignoring config edit: {e}");
                None
            }
        }
    }
}
