//! Layered configuration for the row store and the `hive` CLI.
//!
//! [`HiveConfig`] is assembled with `figment`: compiled-in defaults, an
//! optional TOML file, then `HIVE_`-prefixed environment variables.

pub mod actor;
pub mod config;
pub mod error;

pub use actor::default_actor;
pub use config::HiveConfig;
pub use error::{ConfigError, Result};
