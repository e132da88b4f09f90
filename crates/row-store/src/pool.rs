//! A bounded FIFO pool of SQLite connections.
//!
//! Mirrors a classic producer/consumer connection pool: `size` handles are
//! eagerly created from a factory closure and handed out on `get`, which
//! blocks until one is available. There are no high/low water marks; the
//! pool never grows or shrinks after construction.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, bounded};
use rusqlite::Connection;

use crate::error::{Result, RowStoreError};

/// A fixed-size pool of [`Connection`] handles.
pub struct ConnectionPool {
    tx: Sender<Connection>,
    rx: Receiver<Connection>,
    size: usize,
}

impl ConnectionPool {
    /// Builds a pool of `size` connections using `factory` to create each one.
    pub fn new<F>(size: usize, mut factory: F) -> Result<Self>
    where
        F: FnMut() -> Result<Connection>,
    {
        let (tx, rx) = bounded(size);
        for _ in 0..size {
            let conn = factory()?;
            tx.send(conn)
                .map_err(|e| RowStoreError::Connection(format!("failed to seed pool: {e}")))?;
        }
        Ok(Self { tx, rx, size })
    }

    /// Number of connections owned by this pool.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Blocks until a connection is available, then hands out ownership via
    /// an RAII guard that returns the connection on drop.
    pub fn get(self: &Arc<Self>) -> Result<PooledConnection> {
        let conn = self
            .rx
            .recv()
            .map_err(|e| RowStoreError::Connection(format!("pool closed: {e}")))?;
        Ok(PooledConnection {
            conn: Some(conn),
            pool: Arc::clone(self),
        })
    }
}

/// A connection on loan from a [`ConnectionPool`]. Returned to the pool when
/// dropped, on every exit path including error paths.
pub struct PooledConnection {
    conn: Option<Connection>,
    pool: Arc<ConnectionPool>,
}

impl std::ops::Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.conn.as_ref().expect("connection taken twice")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            let _ = self.pool.tx.send(conn);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_pool(size: usize) -> Arc<ConnectionPool> {
        Arc::new(ConnectionPool::new(size, || Ok(Connection::open_in_memory()?)).unwrap())
    }

    #[test]
    fn pool_hands_out_and_reclaims_connections() {
        let pool = make_pool(2);
        assert_eq!(pool.size(), 2);
        {
            let _c1 = pool.get().unwrap();
            let _c2 = pool.get().unwrap();
        }
        // Both connections returned on drop; a third get should not block forever.
        let _c3 = pool.get().unwrap();
    }

    #[test]
    fn pool_blocks_until_a_connection_is_returned() {
        let pool = make_pool(1);
        let c1 = pool.get().unwrap();
        let pool2 = Arc::clone(&pool);
        let handle = std::thread::spawn(move || {
            let _c2 = pool2.get().unwrap();
        });
        std::thread::sleep(std::time::Duration::from_millis(20));
        drop(c1);
        handle.join().unwrap();
    }
}
