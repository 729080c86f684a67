//! Top-level application errors.

use curve_config::ConfigError;
use thiserror::Error;

/// Errors that stop the application before or while it runs.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_converts() {
        let err: AppError = std::io::Error::other("thread spawn failed").into();
        assert!(matches!(err, AppError::Io(_)));
        assert!(err.to_string().contains("thread spawn failed"));
    }

    #[test]
    fn test_config_error_converts() {
        let err: AppError = ConfigError::NoConfigDir.into();
        assert!(err.to_string().starts_with("configuration error"));
    }
}
