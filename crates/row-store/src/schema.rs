//! Table/index creation and version-tracked migrations.
//!
//! The version sentinel lives in the blob table under
//! `syn:core:sqlite:version`; `syn:core:created` records the epoch-ms
//! creation time. Migrations run outside any caller-visible transaction and
//! log a conspicuous warning before and after each step.

use rusqlite::Connection;

use crate::blob;
use crate::catalogue::Catalogue;
use crate::error::{Result, RowStoreError};

pub const VERSION_KEY: &str = "syn:core:sqlite:version";
pub const CREATED_KEY: &str = "syn:core:created";

/// A single migration step: a target version and the function that performs
/// it. The function may return `Some(version)` to jump further than its own
/// declared version.
pub type Migration = (i64, fn(&Connection) -> Result<Option<i64>>);

/// Migrations applied after the initial DDL, in ascending version order.
pub const MIGRATIONS: &[Migration] = &[];

/// Ensures the row table, its indexes, and the blob table all exist, then
/// applies any pending migrations (gated by `rev_storage`).
pub fn init_schema(conn: &Connection, cat: &Catalogue, now_ms: i64, rev_storage: bool) -> Result<()> {
    init_schema_with(conn, cat, now_ms, rev_storage, MIGRATIONS)
}

/// Same as [`init_schema`] but with an explicit migration list, for tests
/// that need to exercise the refusal/advance path without depending on
/// whatever migrations currently exist in [`MIGRATIONS`].
pub fn init_schema_with(
    conn: &Connection,
    cat: &Catalogue,
    now_ms: i64,
    rev_storage: bool,
    migrations: &[Migration],
) -> Result<()> {
    if !table_exists(conn, &cat.table)? {
        create_row_table(conn, cat)?;
        let max_rev = migrations.iter().map(|(v, _)| *v).max().unwrap_or(-1);
        blob::set_blob_i64(conn, cat, VERSION_KEY, max_rev)?;
        blob::set_blob_i64(conn, cat, CREATED_KEY, now_ms)?;
        return Ok(());
    }

    if !table_exists(conn, &cat.blob_table)? {
        conn.execute(&cat.init_blobtable, [])?;
        conn.execute(&cat.init_blobtable_idx, [])?;
    }

    run_migrations(conn, cat, rev_storage, migrations)
}

fn create_row_table(conn: &Connection, cat: &Catalogue) -> Result<()> {
    conn.execute(&cat.inittable, [])?;
    conn.execute(&cat.init_iden_idx, [])?;
    conn.execute(&cat.init_prop_idx, [])?;
    conn.execute(&cat.init_strval_idx, [])?;
    conn.execute(&cat.init_intval_idx, [])?;
    conn.execute(&cat.init_blobtable, [])?;
    conn.execute(&cat.init_blobtable_idx, [])?;
    Ok(())
}

fn run_migrations(conn: &Connection, cat: &Catalogue, rev_storage: bool, migrations: &[Migration]) -> Result<()> {
    if migrations.is_empty() {
        return Ok(());
    }

    let max_rev = migrations.iter().map(|(v, _)| *v).max().unwrap();
    let mut current = blob::get_blob_i64(conn, cat, VERSION_KEY, -1)?;
    if current == max_rev {
        return Ok(());
    }

    if !rev_storage {
        return Err(RowStoreError::NoRevAllow { target: max_rev });
    }

    let mut pending: Vec<&Migration> = migrations.iter().filter(|(v, _)| *v > current).collect();
    pending.sort_by_key(|(v, _)| *v);

    for (version, func) in pending {
        tracing::warn!(from = current, to = version, "storage layer update occurring, do not interrupt");
        let jumped = func(conn).map_err(|e| RowStoreError::Migration {
            version: *version,
            reason: e.to_string(),
        })?;
        tracing::warn!(version, "storage layer update completed");
        current = jumped.unwrap_or(*version);
        blob::set_blob_i64(conn, cat, VERSION_KEY, current)?;
    }

    Ok(())
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
        [name],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Connection, Catalogue) {
        let conn = Connection::open_in_memory().unwrap();
        let cat = Catalogue::new("rows");
        (conn, cat)
    }

    #[test]
    fn fresh_store_creates_tables_and_stamps_version() {
        let (conn, cat) = setup();
        init_schema(&conn, &cat, 1000, false).unwrap();
        assert!(table_exists(&conn, "rows").unwrap());
        assert!(table_exists(&conn, "rows_blob").unwrap());
        assert_eq!(blob::get_blob_i64(&conn, &cat, VERSION_KEY, -99).unwrap(), -1);
        assert_eq!(blob::get_blob_i64(&conn, &cat, CREATED_KEY, -1).unwrap(), 1000);
    }

    #[test]
    fn idempotent_reinit_does_not_error() {
        let (conn, cat) = setup();
        init_schema(&conn, &cat, 1, false).unwrap();
        init_schema(&conn, &cat, 2, false).unwrap();
    }

    #[test]
    fn migration_requires_rev_storage_flag() {
        fn bump(conn: &Connection) -> Result<Option<i64>> {
            conn.execute("ALTER TABLE rows ADD COLUMN extra TEXT", [])?;
            Ok(None)
        }
        let (conn, cat) = setup();
        init_schema_with(&conn, &cat, 0, false, &[]).unwrap();
        blob::set_blob_i64(&conn, &cat, VERSION_KEY, 0).unwrap();

        let migrations: &[Migration] = &[(1, bump)];
        let err = init_schema_with(&conn, &cat, 0, false, migrations).unwrap_err();
        assert!(err.is_no_rev_allow());

        init_schema_with(&conn, &cat, 0, true, migrations).unwrap();
        assert_eq!(blob::get_blob_i64(&conn, &cat, VERSION_KEY, -1).unwrap(), 1);
    }

    #[test]
    fn retrofits_missing_blob_table_on_existing_row_table() {
        let (conn, cat) = setup();
        conn.execute(&cat.inittable, []).unwrap();
        conn.execute(&cat.init_iden_idx, []).unwrap();
        conn.execute(&cat.init_prop_idx, []).unwrap();
        conn.execute(&cat.init_strval_idx, []).unwrap();
        conn.execute(&cat.init_intval_idx, []).unwrap();
        assert!(!table_exists(&conn, "rows_blob").unwrap());
        init_schema(&conn, &cat, 1, false).unwrap();
        assert!(table_exists(&conn, "rows_blob").unwrap());
    }
}
