//! Trigger engine error types.

/// Errors raised while building, loading, or dispatching trigger rules.
#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
    /// A rule's fields violate the validation matrix for its condition.
    #[error("bad option value: {0}")]
    BadOptValu(String),

    /// Lookup, modification, or deletion of an unknown rule id.
    #[error("no such rule: {0}")]
    NoSuchIden(String),

    /// A persisted rule names a condition outside the known set.
    #[error("no such condition: {0}")]
    NoSuchCond(String),

    /// Dispatch recursion exceeded the bounded depth.
    #[error("hit trigger recursion limit")]
    RecursionLimitHit,

    /// A rule's query was cancelled mid-execution by the storm engine.
    #[error("trigger query cancelled")]
    Cancellation,

    /// Rule query failed `StormEngine::check` validation.
    #[error("storm query rejected: {0}")]
    InvalidQuery(String),

    /// Binary record encode/decode failure.
    #[error("rule encoding error: {0}")]
    Codec(#[from] bincode::Error),
}

/// Convenience alias used throughout the trigger engine crate.
pub type Result<T> = std::result::Result<T, TriggerError>;
