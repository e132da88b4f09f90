//! Scoped transaction context: acquire a pooled handle, `BEGIN`, run the
//! caller's closure, then `COMMIT` on success or an explicit `ROLLBACK` on
//! error before the handle returns to the pool.
//!
//! The original design released the handle "without commit" on error,
//! relying on autocommit-off semantics. Rust's pool reuses connections
//! across unrelated callers, so an abandoned open transaction would corrupt
//! whoever borrows the handle next; this context rolls back explicitly.

use std::sync::Arc;

use rusqlite::Connection;

use crate::error::{Result, RowStoreError};
use crate::pool::ConnectionPool;

/// Runs `f` inside a transaction on a connection borrowed from `pool`.
pub fn run_in_transaction<T>(
    pool: &Arc<ConnectionPool>,
    f: impl FnOnce(&Connection) -> Result<T>,
) -> Result<T> {
    let guard = pool.get()?;
    let tx = guard
        .unchecked_transaction()
        .map_err(|e| RowStoreError::Transaction(format!("failed to begin: {e}")))?;

    match f(&tx) {
        Ok(value) => {
            tx.commit()
                .map_err(|e| RowStoreError::Transaction(format!("failed to commit: {e}")))?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback() {
                tracing::warn!(error = %rollback_err, "rollback after failed transaction also failed");
            }
            Err(e)
        }
    }
}
