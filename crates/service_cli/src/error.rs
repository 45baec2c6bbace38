//! CLI error types.

use rng_core::RngError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Generator error: {0} [{status}]", status = .0.status())]
    Rng(#[from] RngError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV output error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result alias for CLI commands.
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_error_shows_status() {
        let err = CliError::from(RngError::OutOfRange("lambda".to_string()));
        let message = err.to_string();
        assert!(message.contains("lambda"));
        assert!(message.contains("OUT_OF_RANGE (104)"));
    }

    #[test]
    fn test_config_error_wraps() {
        let err = CliError::from(ConfigError::InvalidLogLevel("loud".to_string()));
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
