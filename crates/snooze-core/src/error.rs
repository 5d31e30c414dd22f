//! Error types for snoozd configuration.

use thiserror::Error;

/// Result type alias for configuration parsing.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while parsing startup configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid watch entry (expected namespace/name): {0}")]
    InvalidWatchRef(String),

    #[error("watch set is empty — at least one namespace/name pair is required")]
    EmptyWatchSet,
}
