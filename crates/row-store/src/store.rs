//! The public façade: a pooled, schema-managed row store over one table.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{Connection, OpenFlags};

use crate::blob;
use crate::catalogue::Catalogue;
use crate::error::Result;
use crate::pool::ConnectionPool;
use crate::rows::{self, PropQuery};
use crate::schema;
use crate::transaction::run_in_transaction;
use crate::value::{Row, Value};

/// Tunables that affect how a [`RowStore`] opens and manages its backing
/// database, independent of the data model itself.
#[derive(Debug, Clone)]
pub struct RowStoreConfig {
    /// Number of pooled connections to keep open.
    pub pool_size: usize,
    /// Whether pending schema migrations are allowed to run automatically.
    pub rev_storage: bool,
}

impl Default for RowStoreConfig {
    fn default() -> Self {
        Self { pool_size: 4, rev_storage: false }
    }
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// A dual-typed row store backed by SQLite, with an attached blob namespace.
pub struct RowStore {
    pool: Arc<ConnectionPool>,
    cat: Catalogue,
    config: RowStoreConfig,
}

impl RowStore {
    /// Opens (creating if absent) a row store at `path`, using `table` as
    /// the base name for its row and blob tables.
    pub fn open(path: &Path, table: &str, config: RowStoreConfig) -> Result<Self> {
        let path = path.to_path_buf();
        let pool = ConnectionPool::new(config.pool_size, {
            let path = path.clone();
            move || Ok(Connection::open(&path)?)
        })?;
        Self::from_pool(pool, table, config)
    }

    /// Opens an in-memory row store, useful for tests and ephemeral scopes.
    ///
    /// All pooled connections are opened against the same named, shared-cache
    /// `:memory:` database, so every connection handed out by the pool sees
    /// the same schema and rows -- a bare `Connection::open_in_memory()` per
    /// connection would instead give each one its own private, empty database.
    pub fn open_in_memory(table: &str, config: RowStoreConfig) -> Result<Self> {
        static MEMORY_DB_COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = MEMORY_DB_COUNTER.fetch_add(1, Ordering::Relaxed);
        let uri = format!("file:row-store-mem-{id}?mode=memory&cache=shared");
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE | OpenFlags::SQLITE_OPEN_URI;
        let pool = ConnectionPool::new(config.pool_size, move || Ok(Connection::open_with_flags(&uri, flags)?))?;
        Self::from_pool(pool, table, config)
    }

    fn from_pool(pool: ConnectionPool, table: &str, config: RowStoreConfig) -> Result<Self> {
        let cat = Catalogue::new(table);
        let pool = Arc::new(pool);
        let conn = pool.get()?;
        schema::init_schema(&conn, &cat, now_ms(), config.rev_storage)?;
        drop(conn);
        Ok(Self { pool, cat, config })
    }

    pub fn config(&self) -> &RowStoreConfig {
        &self.config
    }

    // -- row operations ---------------------------------------------------

    pub fn add_rows(&self, rows: &[Row]) -> Result<()> {
        run_in_transaction(&self.pool, |conn| rows::add_rows(conn, &self.cat, rows))
    }

    pub fn get_rows_by_id(&self, iden: &str) -> Result<Vec<Row>> {
        let conn = self.pool.get()?;
        rows::get_rows_by_id(&conn, &self.cat, iden)
    }

    pub fn get_rows_by_id_prop(&self, iden: &str, prop: &str, value: Option<&Value>) -> Result<Vec<Row>> {
        let conn = self.pool.get()?;
        rows::get_rows_by_id_prop(&conn, &self.cat, iden, prop, value)
    }

    pub fn set_rows_by_id_prop(&self, iden: &str, prop: &str, value: &Value) -> Result<()> {
        let stamp = now_ms();
        run_in_transaction(&self.pool, |conn| rows::set_rows_by_id_prop(conn, &self.cat, iden, prop, value, stamp))
    }

    pub fn del_rows_by_id(&self, iden: &str) -> Result<usize> {
        run_in_transaction(&self.pool, |conn| rows::del_rows_by_id(conn, &self.cat, iden))
    }

    pub fn del_rows_by_id_prop(&self, iden: &str, prop: &str, value: Option<&Value>) -> Result<usize> {
        run_in_transaction(&self.pool, |conn| rows::del_rows_by_id_prop(conn, &self.cat, iden, prop, value))
    }

    pub fn get_rows_by_prop(&self, query: &PropQuery) -> Result<Vec<Row>> {
        let conn = self.pool.get()?;
        rows::get_rows_by_prop(&conn, &self.cat, query)
    }

    pub fn get_join_by_prop(&self, query: &PropQuery) -> Result<Vec<Row>> {
        let conn = self.pool.get()?;
        rows::get_join_by_prop(&conn, &self.cat, query)
    }

    pub fn get_size_by_prop(&self, query: &PropQuery) -> Result<i64> {
        let conn = self.pool.get()?;
        rows::get_size_by_prop(&conn, &self.cat, query)
    }

    pub fn del_rows_by_prop(&self, query: &PropQuery) -> Result<usize> {
        run_in_transaction(&self.pool, |conn| rows::del_rows_by_prop(conn, &self.cat, query))
    }

    pub fn del_join_by_prop(&self, query: &PropQuery) -> Result<usize> {
        run_in_transaction(&self.pool, |conn| rows::del_join_by_prop(conn, &self.cat, query))
    }

    pub fn rows_by_range(&self, prop: &str, lo: i64, hi: i64, limit: i64) -> Result<Vec<Row>> {
        let conn = self.pool.get()?;
        rows::rows_by_range(&conn, &self.cat, prop, lo, hi, limit)
    }

    pub fn rows_by_ge(&self, prop: &str, valu: i64, limit: i64) -> Result<Vec<Row>> {
        let conn = self.pool.get()?;
        rows::rows_by_ge(&conn, &self.cat, prop, valu, limit)
    }

    pub fn rows_by_le(&self, prop: &str, valu: i64, limit: i64) -> Result<Vec<Row>> {
        let conn = self.pool.get()?;
        rows::rows_by_le(&conn, &self.cat, prop, valu, limit)
    }

    pub fn size_by_range(&self, prop: &str, lo: i64, hi: i64, limit: i64) -> Result<i64> {
        let conn = self.pool.get()?;
        rows::size_by_range(&conn, &self.cat, prop, lo, hi, limit)
    }

    pub fn size_by_ge(&self, prop: &str, valu: i64, limit: i64) -> Result<i64> {
        let conn = self.pool.get()?;
        rows::size_by_ge(&conn, &self.cat, prop, valu, limit)
    }

    pub fn size_by_le(&self, prop: &str, valu: i64, limit: i64) -> Result<i64> {
        let conn = self.pool.get()?;
        rows::size_by_le(&conn, &self.cat, prop, valu, limit)
    }

    pub fn tufos_by_range(&self, prop: &str, lo: i64, hi: i64, limit: i64) -> Result<Vec<Row>> {
        let conn = self.pool.get()?;
        rows::tufos_by_range(&conn, &self.cat, prop, lo, hi, limit)
    }

    pub fn tufos_by_ge(&self, prop: &str, valu: i64, limit: i64) -> Result<Vec<Row>> {
        let conn = self.pool.get()?;
        rows::tufos_by_ge(&conn, &self.cat, prop, valu, limit)
    }

    pub fn tufos_by_le(&self, prop: &str, valu: i64, limit: i64) -> Result<Vec<Row>> {
        let conn = self.pool.get()?;
        rows::tufos_by_le(&conn, &self.cat, prop, valu, limit)
    }

    pub fn tufos_by_range_str(&self, prop: &str, lo: &str, hi: &str, limit: i64) -> Result<Vec<Row>> {
        let conn = self.pool.get()?;
        rows::tufos_by_range_str(&conn, &self.cat, prop, lo, hi, limit)
    }

    pub fn tufos_by_ge_str(&self, prop: &str, valu: &str, limit: i64) -> Result<Vec<Row>> {
        let conn = self.pool.get()?;
        rows::tufos_by_ge_str(&conn, &self.cat, prop, valu, limit)
    }

    pub fn tufos_by_le_str(&self, prop: &str, valu: &str, limit: i64) -> Result<Vec<Row>> {
        let conn = self.pool.get()?;
        rows::tufos_by_le_str(&conn, &self.cat, prop, valu, limit)
    }

    // -- blob operations ----------------------------------------------------

    pub fn set_blob(&self, key: &str, value: &[u8]) -> Result<()> {
        run_in_transaction(&self.pool, |conn| blob::set_blob(conn, &self.cat, key, value))
    }

    pub fn get_blob(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.pool.get()?;
        blob::get_blob(&conn, &self.cat, key)
    }

    pub fn has_blob(&self, key: &str) -> Result<bool> {
        let conn = self.pool.get()?;
        blob::has_blob(&conn, &self.cat, key)
    }

    pub fn del_blob(&self, key: &str) -> Result<Vec<u8>> {
        run_in_transaction(&self.pool, |conn| blob::del_blob(conn, &self.cat, key))
    }

    pub fn get_blob_keys(&self) -> Result<Vec<String>> {
        let conn = self.pool.get()?;
        blob::get_blob_keys(&conn, &self.cat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RowStore {
        RowStore::open_in_memory("rows", RowStoreConfig { pool_size: 2, rev_storage: false }).unwrap()
    }

    #[test]
    fn open_in_memory_creates_a_usable_store() {
        let store = store();
        store.add_rows(&[Row::new("A", "name", "alice", 1)]).unwrap();
        let rows = store.get_rows_by_id("A").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, Value::Str("alice".into()));
    }

    #[test]
    fn blob_roundtrip_through_facade() {
        let store = store();
        store.set_blob("k", b"v").unwrap();
        assert_eq!(store.get_blob("k").unwrap(), Some(b"v".to_vec()));
        assert_eq!(store.del_blob("k").unwrap(), b"v".to_vec());
        assert!(!store.has_blob("k").unwrap());
    }

    #[test]
    fn concurrent_callers_share_the_pool() {
        let store = Arc::new(store());
        let mut handles = vec![];
        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                store.add_rows(&[Row::new(format!("E{i}"), "seen", 1i64, i)]).unwrap();
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.get_size_by_prop(&PropQuery {
            prop: "seen", value: None, mintime: None, maxtime: None, limit: 1000,
        }).unwrap(), 8);
    }
}
