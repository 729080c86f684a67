//! OS directory resolution for config and log files.

use std::path::{Path, PathBuf};

use curve_config::Config;

use crate::error::AppError;

const APP_NAME: &str = "curve";

/// Where Curve keeps its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformDirs {
    /// `config.ron` lives here.
    pub config_dir: PathBuf,
    /// Log files.
    pub log_dir: PathBuf,
}

impl PlatformDirs {
    /// Resolve directories without creating them on disk.
    ///
    /// An explicit `config_override` (from `--config`) replaces the OS
    /// config directory, and logs then go next to it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if there is no override and the OS does
    /// not expose a configuration directory.
    pub fn resolve(config_override: Option<&Path>) -> Result<Self, AppError> {
        if let Some(dir) = config_override {
            return Ok(Self::rooted_at(dir));
        }

        let app_config = Config::default_dir()?;
        let log_dir = dirs::data_local_dir()
            .map(|dir| dir.join(APP_NAME))
            .unwrap_or_else(|| app_config.clone())
            .join("logs");

        Ok(Self {
            config_dir: app_config,
            log_dir,
        })
    }

    /// Everything under one directory.
    pub fn rooted_at(dir: &Path) -> Self {
        Self {
            config_dir: dir.to_path_buf(),
            log_dir: dir.join("logs"),
        }
    }

    /// Create every directory that does not already exist.
    pub fn create_dirs(&self) -> Result<(), AppError> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_roots_everything() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = PlatformDirs::resolve(Some(tmp.path())).unwrap();
        assert_eq!(dirs.config_dir, tmp.path());
        assert_eq!(dirs.log_dir, tmp.path().join("logs"));
    }

    #[test]
    fn test_create_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = PlatformDirs::rooted_at(&tmp.path().join("nested"));
        dirs.create_dirs().unwrap();
        assert!(dirs.config_dir.is_dir());
        assert!(dirs.log_dir.is_dir());
        dirs.create_dirs().unwrap();
    }

    #[test]
    fn test_resolved_paths_are_namespaced() {
        if let Ok(dirs) = PlatformDirs::resolve(None) {
            assert!(dirs.config_dir.ends_with(APP_NAME));
            assert!(dirs.log_dir.ends_with("logs"));
        }
    }
}
