//! Runtime context for command execution.

use std::env;
use std::path::PathBuf;

use store_config::HiveConfig;

use crate::cli::GlobalArgs;

/// Runtime context passed to every command handler.
///
/// Constructed once in `main` after CLI parsing and config loading.
#[derive(Debug)]
pub struct RuntimeContext {
    /// Resolved row database path.
    pub db_path: PathBuf,

    /// Pool size for the row store's connection pool.
    pub pool: usize,

    /// Whether schema migrations may run automatically.
    pub rev_storage: bool,

    /// Actor name attributed to writes.
    pub actor: String,

    /// Whether to produce JSON output.
    pub json: bool,

    /// Verbose output.
    pub verbose: bool,
}

impl RuntimeContext {
    /// Builds a `RuntimeContext` by layering a loaded [`HiveConfig`] under
    /// the CLI's global flags, which take precedence.
    pub fn new(config: HiveConfig, global: &GlobalArgs) -> Self {
        let db_path = global.path.as_ref().map(PathBuf::from).unwrap_or(config.path);
        let actor = resolve_actor(global.actor.as_deref(), &config.actor);

        Self {
            db_path,
            pool: config.pool,
            rev_storage: config.rev_storage,
            actor,
            json: global.json,
            verbose: global.verbose,
        }
    }
}

/// Resolves the actor name: `--actor`/`HIVE_ACTOR` flag (clap already reads
/// the env var) > the config-layer default > `"unknown"`.
fn resolve_actor(flag_value: Option<&str>, config_actor: &str) -> String {
    if let Some(actor) = flag_value {
        if !actor.is_empty() {
            return actor.to_string();
        }
    }
    if !config_actor.is_empty() {
        return config_actor.to_string();
    }
    env::var("USER").or_else(|_| env::var("USERNAME")).unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_actor_prefers_flag() {
        assert_eq!(resolve_actor(Some("alice"), "bob"), "alice");
    }

    #[test]
    fn resolve_actor_falls_back_to_config() {
        assert_eq!(resolve_actor(None, "bob"), "bob");
    }

    #[test]
    fn resolve_actor_falls_back_to_unknown() {
        let result = resolve_actor(None, "");
        assert!(!result.is_empty());
    }
}
