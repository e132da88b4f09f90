//! The keyed opaque-bytes blob store, including the schema version sentinel
//! keys consumed by [`crate::schema`].

use rusqlite::Connection;
use rusqlite::params;

use crate::catalogue::Catalogue;
use crate::error::{Result, RowStoreError};

pub fn set_blob(conn: &Connection, cat: &Catalogue, key: &str, value: &[u8]) -> Result<()> {
    conn.execute(&cat.blob_set, params![key, value])?;
    Ok(())
}

pub fn get_blob(conn: &Connection, cat: &Catalogue, key: &str) -> Result<Option<Vec<u8>>> {
    let rows = get_blob_rows(conn, cat, key)?;
    if rows.len() > 1 {
        return Err(RowStoreError::BadCoreStore {
            backend: "sqlite".into(),
            message: format!("too many blob rows for key {key}"),
        });
    }
    Ok(rows.into_iter().next())
}

pub fn has_blob(conn: &Connection, cat: &Catalogue, key: &str) -> Result<bool> {
    let rows = get_blob_rows(conn, cat, key)?;
    if rows.len() > 1 {
        return Err(RowStoreError::BadCoreStore {
            backend: "sqlite".into(),
            message: format!("too many blob rows for key {key}"),
        });
    }
    Ok(!rows.is_empty())
}

pub fn del_blob(conn: &Connection, cat: &Catalogue, key: &str) -> Result<Vec<u8>> {
    let existing = get_blob(conn, cat, key)?
        .ok_or_else(|| RowStoreError::NoSuchName(key.to_string()))?;
    conn.execute(&cat.blob_del, params![key])?;
    Ok(existing)
}

pub fn get_blob_keys(conn: &Connection, cat: &Catalogue) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&cat.blob_get_keys)?;
    let keys = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(keys)
}

fn get_blob_rows(conn: &Connection, cat: &Catalogue, key: &str) -> Result<Vec<Vec<u8>>> {
    let mut stmt = conn.prepare(&cat.blob_get)?;
    let rows = stmt
        .query_map(params![key], |row| row.get::<_, Vec<u8>>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Reads an `i64` sentinel value, returning `default` when the key is absent.
pub fn get_blob_i64(conn: &Connection, cat: &Catalogue, key: &str, default: i64) -> Result<i64> {
    match get_blob(conn, cat, key)? {
        Some(bytes) if bytes.len() == 8 => {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(&bytes);
            Ok(i64::from_le_bytes(buf))
        }
        Some(_) => Err(RowStoreError::BadCoreStore {
            backend: "sqlite".into(),
            message: format!("sentinel {key} has unexpected width"),
        }),
        None => Ok(default),
    }
}

pub fn set_blob_i64(conn: &Connection, cat: &Catalogue, key: &str, value: i64) -> Result<()> {
    set_blob(conn, cat, key, &value.to_le_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Connection, Catalogue) {
        let conn = Connection::open_in_memory().unwrap();
        let cat = Catalogue::new("rows");
        conn.execute(&cat.init_blobtable, []).unwrap();
        conn.execute(&cat.init_blobtable_idx, []).unwrap();
        (conn, cat)
    }

    #[test]
    fn set_then_get_roundtrips() {
        let (conn, cat) = setup();
        set_blob(&conn, &cat, "k1", b"hello").unwrap();
        assert_eq!(get_blob(&conn, &cat, "k1").unwrap(), Some(b"hello".to_vec()));
    }

    #[test]
    fn del_requires_existing_key() {
        let (conn, cat) = setup();
        assert!(del_blob(&conn, &cat, "missing").is_err());
        set_blob(&conn, &cat, "k1", b"v").unwrap();
        del_blob(&conn, &cat, "k1").unwrap();
        assert!(!has_blob(&conn, &cat, "k1").unwrap());
    }

    #[test]
    fn get_keys_lists_everything() {
        let (conn, cat) = setup();
        set_blob(&conn, &cat, "a", b"1").unwrap();
        set_blob(&conn, &cat, "b", b"2").unwrap();
        let mut keys = get_blob_keys(&conn, &cat).unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn i64_sentinel_roundtrips() {
        let (conn, cat) = setup();
        assert_eq!(get_blob_i64(&conn, &cat, "v", -1).unwrap(), -1);
        set_blob_i64(&conn, &cat, "v", 7).unwrap();
        assert_eq!(get_blob_i64(&conn, &cat, "v", -1).unwrap(), 7);
    }
}
