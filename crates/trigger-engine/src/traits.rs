//! Seams to the external query engine and authentication subsystem.
//!
//! The trigger engine never depends on the graph/query crate directly (that
//! would create a dependency cycle); it only sees these two traits.

use std::fmt;

/// An error surfaced by the external query engine while checking or
/// executing a storm query. Only [`StormError::Cancelled`] is treated
/// specially by [`crate::rule::Rule::execute`]; every other variant is
/// logged and swallowed.
#[derive(Debug)]
pub enum StormError {
    /// The query was cancelled (e.g. task shutdown) mid-execution.
    Cancelled,
    /// The query failed to parse or execute for any other reason.
    Other(String),
}

impl fmt::Display for StormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StormError::Cancelled => write!(f, "cancelled"),
            StormError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for StormError {}

/// An authenticated identity resolved from a rule's stored username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthedUser {
    pub name: String,
}

/// Resolves rule-stored usernames to authenticated identities.
pub trait AuthResolver: Send + Sync {
    fn resolve(&self, user: &str) -> Option<AuthedUser>;
}

/// Persistence for encoded rule records, keyed by rule id. Kept as a trait
/// rather than a direct dependency on `row-store` so the trigger engine
/// never needs to know how or where rules are physically stored.
pub trait RuleStore: Send + Sync {
    fn put(&self, id: &str, record: &[u8]) -> std::io::Result<()>;
    fn delete(&self, id: &str) -> std::io::Result<()>;
    fn scan(&self) -> std::io::Result<Vec<(String, Vec<u8>)>>;
}

/// The external query engine a rule submits its `storm` text to.
pub trait StormEngine: Send + Sync {
    /// Parses `query` without executing it; used when a rule is added so
    /// malformed queries are rejected before being persisted.
    fn check(&self, query: &str) -> std::result::Result<(), StormError>;

    /// Executes `query` under `user`, with optional bound variables.
    fn execute(
        &self,
        query: &str,
        vars: Option<&std::collections::HashMap<String, String>>,
        user: &AuthedUser,
    ) -> std::result::Result<(), StormError>;
}
