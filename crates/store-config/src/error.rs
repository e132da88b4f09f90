//! Configuration loading errors.

use thiserror::Error;

/// Errors raised while assembling a [`crate::HiveConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `figment` failed to merge or deserialize a configuration layer.
    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
