//! Row store error types.

/// Errors that can occur during row store operations.
#[derive(Debug, thiserror::Error)]
pub enum RowStoreError {
    /// A blob key is absent.
    #[error("no such name: {0}")]
    NoSuchName(String),

    /// A blob key returned more than one row; indicates index corruption.
    #[error("bad core store ({backend}): {message}")]
    BadCoreStore {
        /// Backend identifier (`"sqlite"`).
        backend: String,
        /// Description of the inconsistency.
        message: String,
    },

    /// Pending migrations exist but `rev:storage` was not enabled.
    #[error("add rev:storage=1 to allow storage updates (pending migration to version {target})")]
    NoRevAllow {
        /// The migration version that is blocked.
        target: i64,
    },

    /// A schema migration step failed.
    #[error("migration to version {version} failed: {reason}")]
    Migration {
        /// Target version of the failed migration.
        version: i64,
        /// Underlying error description.
        reason: String,
    },

    /// Failed to establish or maintain a database connection.
    #[error("connection error: {0}")]
    Connection(String),

    /// A transaction operation failed.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// A raw SQLite query error.
    #[error("query error: {0}")]
    Query(#[from] rusqlite::Error),

    /// Catch-all for unexpected internal errors.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Convenience alias used throughout the row store crate.
pub type Result<T> = std::result::Result<T, RowStoreError>;

impl RowStoreError {
    /// Returns `true` if the error is transient and the operation may succeed
    /// on retry (pool exhaustion aside, which blocks rather than erroring).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Transaction(_))
    }

    /// Returns `true` if this is a [`RowStoreError::NoRevAllow`].
    pub fn is_no_rev_allow(&self) -> bool {
        matches!(self, Self::NoRevAllow { .. })
    }
}
