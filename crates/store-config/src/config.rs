//! The `HiveConfig` layered configuration surface.
//!
//! Precedence, lowest to highest: compiled-in defaults, an optional TOML
//! file (`hive.toml`, or the path named by `HIVE_CONFIG`), then environment
//! variables prefixed `HIVE_`.

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::actor::default_actor;
use crate::error::Result;

const DEFAULT_CONFIG_FILE: &str = "hive.toml";
const DEFAULT_DB_PATH: &str = "hive.db";
const DEFAULT_POOL_SIZE: usize = 4;

/// Configuration recognized by the row store and the `hive` CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiveConfig {
    /// Path to the row database file.
    pub path: PathBuf,

    /// Number of pooled SQLite connections.
    pub pool: usize,

    /// Whether schema migrations may run at startup.
    pub rev_storage: bool,

    /// Identity attributed to writes made through the CLI.
    pub actor: String,
}

impl Default for HiveConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_PATH),
            pool: DEFAULT_POOL_SIZE,
            rev_storage: false,
            actor: default_actor(),
        }
    }
}

impl HiveConfig {
    /// Loads configuration from compiled-in defaults, an optional TOML
    /// file, and `HIVE_`-prefixed environment variables.
    ///
    /// The TOML file path is `HIVE_CONFIG` if set, otherwise `hive.toml` in
    /// the current directory; a missing file is not an error.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("HIVE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(&config_path)
    }

    /// Like [`HiveConfig::load`] but with an explicit TOML file path,
    /// bypassing `HIVE_CONFIG`. Primarily useful for tests.
    pub fn load_from(toml_path: &Path) -> Result<Self> {
        let config = Figment::from(Serialized::defaults(HiveConfig::default()))
            .merge(Toml::file(toml_path))
            .merge(Env::prefixed("HIVE_").map(|k| k.as_str().to_ascii_lowercase().into()))
            .extract()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_when_no_file_and_no_env() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let cfg = HiveConfig::load_from(&missing).unwrap();
        assert_eq!(cfg.path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(cfg.pool, DEFAULT_POOL_SIZE);
        assert!(!cfg.rev_storage);
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("hive.toml");
        let mut f = std::fs::File::create(&toml_path).unwrap();
        writeln!(f, "path = \"custom.db\"\npool = 9\nrev_storage = true\nactor = \"svc\"").unwrap();

        let cfg = HiveConfig::load_from(&toml_path).unwrap();
        assert_eq!(cfg.path, PathBuf::from("custom.db"));
        assert_eq!(cfg.pool, 9);
        assert!(cfg.rev_storage);
        assert_eq!(cfg.actor, "svc");
    }

    #[test]
    fn env_overrides_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("hive.toml");
        std::fs::write(&toml_path, "pool = 9\n").unwrap();

        // SAFETY: test is single-threaded with respect to this env var;
        // std::env::set_var is process-global but no other test reads HIVE_POOL.
        unsafe {
            std::env::set_var("HIVE_POOL", "17");
        }
        let cfg = HiveConfig::load_from(&toml_path).unwrap();
        unsafe {
            std::env::remove_var("HIVE_POOL");
        }
        assert_eq!(cfg.pool, 17);
    }
}
