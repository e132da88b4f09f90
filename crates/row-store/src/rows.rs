//! Dual-typed row operations: insert, query, update, delete, dispatched
//! through the three-axis [`Catalogue`] matrix.

use rusqlite::{Connection, Row as SqlRow, ToSql, named_params};

use crate::catalogue::{Catalogue, Family};
use crate::error::Result;
use crate::value::{Row, TypeAxis, Value};

/// Folds a raw 5-column result row `(iden, prop, intval, strval, tstamp)`
/// into the logical 4-tuple, selecting whichever typed column is non-null.
fn fold_row(sql_row: &SqlRow) -> rusqlite::Result<Row> {
    let iden: String = sql_row.get(0)?;
    let prop: String = sql_row.get(1)?;
    let intval: Option<i64> = sql_row.get(2)?;
    let strval: Option<String> = sql_row.get(3)?;
    let tstamp: i64 = sql_row.get(4)?;

    let value = match intval {
        Some(i) => Value::Int(i),
        None => Value::Str(strval.unwrap_or_default()),
    };

    Ok(Row { iden, prop, value, tstamp })
}

pub fn add_rows(conn: &Connection, cat: &Catalogue, rows: &[Row]) -> Result<()> {
    let mut stmt = conn.prepare(&cat.addrows)?;
    for row in rows {
        let (intval, strval): (Option<i64>, Option<String>) = match &row.value {
            Value::Int(i) => (Some(*i), None),
            Value::Str(s) => (None, Some(s.clone())),
        };
        stmt.execute(named_params! {
            ":iden": row.iden,
            ":prop": row.prop,
            ":strval": strval,
            ":intval": intval,
            ":tstamp": row.tstamp,
        })?;
    }
    Ok(())
}

pub fn get_rows_by_id(conn: &Connection, cat: &Catalogue, iden: &str) -> Result<Vec<Row>> {
    let mut stmt = conn.prepare(&cat.getrows_by_iden)?;
    let rows = stmt
        .query_map(named_params! { ":iden": iden }, fold_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get_rows_by_id_prop(
    conn: &Connection,
    cat: &Catalogue,
    iden: &str,
    prop: &str,
    value: Option<&Value>,
) -> Result<Vec<Row>> {
    let rows = match value {
        None => {
            let mut stmt = conn.prepare(&cat.getrows_by_iden_prop)?;
            stmt.query_map(named_params! { ":iden": iden, ":prop": prop }, fold_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
        Some(Value::Int(i)) => {
            let mut stmt = conn.prepare(&cat.getrows_by_iden_prop_intval)?;
            stmt.query_map(named_params! { ":iden": iden, ":prop": prop, ":valu": i }, fold_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
        Some(Value::Str(s)) => {
            let mut stmt = conn.prepare(&cat.getrows_by_iden_prop_strval)?;
            stmt.query_map(named_params! { ":iden": iden, ":prop": prop, ":valu": s }, fold_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };
    Ok(rows)
}

pub fn del_rows_by_id_prop(
    conn: &Connection,
    cat: &Catalogue,
    iden: &str,
    prop: &str,
    value: Option<&Value>,
) -> Result<usize> {
    let changed = match value {
        None => conn.execute(&cat.delrows_by_iden_prop, named_params! { ":iden": iden, ":prop": prop })?,
        Some(Value::Int(i)) => conn.execute(
            &cat.delrows_by_iden_prop_intval,
            named_params! { ":iden": iden, ":prop": prop, ":valu": i },
        )?,
        Some(Value::Str(s)) => conn.execute(
            &cat.delrows_by_iden_prop_strval,
            named_params! { ":iden": iden, ":prop": prop, ":valu": s },
        )?,
    };
    Ok(changed)
}

pub fn del_rows_by_id(conn: &Connection, cat: &Catalogue, iden: &str) -> Result<usize> {
    Ok(conn.execute(&cat.delrows_by_iden, named_params! { ":iden": iden })?)
}

pub fn set_rows_by_id_prop(conn: &Connection, cat: &Catalogue, iden: &str, prop: &str, value: &Value, now_ms: i64) -> Result<()> {
    let changed = match value {
        Value::Int(i) => conn.execute(&cat.uprows_by_iden_prop_int, named_params! { ":iden": iden, ":prop": prop, ":valu": i })?,
        Value::Str(s) => conn.execute(&cat.uprows_by_iden_prop_str, named_params! { ":iden": iden, ":prop": prop, ":valu": s })?,
    };
    if changed == 0 {
        add_rows(conn, cat, &[Row::new(iden, prop, value.clone(), now_ms)])?;
    }
    Ok(())
}

/// Parameters shared by every `*_by_prop` query family.
pub struct PropQuery<'a> {
    pub prop: &'a str,
    pub value: Option<&'a Value>,
    pub mintime: Option<i64>,
    pub maxtime: Option<i64>,
    pub limit: i64,
}

impl<'a> PropQuery<'a> {
    fn key(&self) -> (TypeAxis, TypeAxis, TypeAxis) {
        (
            TypeAxis::of_value(&self.value.cloned()),
            TypeAxis::of_time(&self.mintime),
            TypeAxis::of_time(&self.maxtime),
        )
    }
}

/// Builds the sparse named-parameter list a dispatch template actually
/// binds: unused names are simply absent rather than bound as null, since
/// each of the twelve templates only references the placeholders its own
/// `WHERE` clause needs.
fn prop_query_params<'a>(
    q: &'a PropQuery,
    prop: &'a String,
    value_int: &'a Option<i64>,
    value_str: &'a Option<String>,
    with_limit: bool,
) -> Vec<(&'static str, &'a dyn ToSql)> {
    let mut params: Vec<(&'static str, &'a dyn ToSql)> = vec![(":prop", prop)];
    if let Some(v) = value_int {
        params.push((":valu", v));
    }
    if let Some(v) = value_str {
        params.push((":valu", v));
    }
    if let Some(v) = &q.mintime {
        params.push((":mintime", v));
    }
    if let Some(v) = &q.maxtime {
        params.push((":maxtime", v));
    }
    if with_limit {
        params.push((":limit", &q.limit));
    }
    params
}

fn run_select<T>(
    conn: &Connection,
    sql: &str,
    q: &PropQuery,
    with_limit: bool,
    map: impl Fn(&SqlRow) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
    let prop = q.prop.to_string();
    let value_int = match q.value {
        Some(Value::Int(i)) => Some(*i),
        _ => None,
    };
    let value_str = match q.value {
        Some(Value::Str(s)) => Some(s.clone()),
        _ => None,
    };
    let params = prop_query_params(q, &prop, &value_int, &value_str, with_limit);

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params.as_slice(), |r| map(r))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn run_mutate(conn: &Connection, sql: &str, q: &PropQuery) -> Result<usize> {
    let prop = q.prop.to_string();
    let value_int = match q.value {
        Some(Value::Int(i)) => Some(*i),
        _ => None,
    };
    let value_str = match q.value {
        Some(Value::Str(s)) => Some(s.clone()),
        _ => None,
    };
    let params = prop_query_params(q, &prop, &value_int, &value_str, false);

    let mut stmt = conn.prepare(sql)?;
    Ok(stmt.execute(params.as_slice())?)
}

pub fn get_rows_by_prop(conn: &Connection, cat: &Catalogue, q: &PropQuery) -> Result<Vec<Row>> {
    run_select(conn, cat.lookup(Family::RowsByProp, q.key()), q, true, fold_row)
}

pub fn get_join_by_prop(conn: &Connection, cat: &Catalogue, q: &PropQuery) -> Result<Vec<Row>> {
    run_select(conn, cat.lookup(Family::JoinByProp, q.key()), q, true, fold_row)
}

pub fn get_size_by_prop(conn: &Connection, cat: &Catalogue, q: &PropQuery) -> Result<i64> {
    let rows = run_select(conn, cat.lookup(Family::SizeByProp, q.key()), q, true, |r| r.get::<_, i64>(0))?;
    Ok(rows.into_iter().next().unwrap_or(0))
}

pub fn del_rows_by_prop(conn: &Connection, cat: &Catalogue, q: &PropQuery) -> Result<usize> {
    run_mutate(conn, cat.lookup(Family::DelRowsByProp, q.key()), q)
}

pub fn del_join_by_prop(conn: &Connection, cat: &Catalogue, q: &PropQuery) -> Result<usize> {
    run_mutate(conn, cat.lookup(Family::DelJoinByProp, q.key()), q)
}

pub fn rows_by_range(conn: &Connection, cat: &Catalogue, prop: &str, lo: i64, hi: i64, limit: i64) -> Result<Vec<Row>> {
    let mut stmt = conn.prepare(&cat.getrows_by_range)?;
    let rows = stmt
        .query_map(named_params! { ":prop": prop, ":minvalu": lo, ":maxvalu": hi, ":limit": limit }, fold_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn rows_by_ge(conn: &Connection, cat: &Catalogue, prop: &str, valu: i64, limit: i64) -> Result<Vec<Row>> {
    let mut stmt = conn.prepare(&cat.getrows_by_ge)?;
    let rows = stmt
        .query_map(named_params! { ":prop": prop, ":valu": valu, ":limit": limit }, fold_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn rows_by_le(conn: &Connection, cat: &Catalogue, prop: &str, valu: i64, limit: i64) -> Result<Vec<Row>> {
    let mut stmt = conn.prepare(&cat.getrows_by_le)?;
    let rows = stmt
        .query_map(named_params! { ":prop": prop, ":valu": valu, ":limit": limit }, fold_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn size_by_range(conn: &Connection, cat: &Catalogue, prop: &str, lo: i64, hi: i64, limit: i64) -> Result<i64> {
    Ok(conn.query_row(
        &cat.getsize_by_range,
        named_params! { ":prop": prop, ":minvalu": lo, ":maxvalu": hi, ":limit": limit },
        |r| r.get(0),
    )?)
}

pub fn size_by_ge(conn: &Connection, cat: &Catalogue, prop: &str, valu: i64, limit: i64) -> Result<i64> {
    Ok(conn.query_row(&cat.getsize_by_ge, named_params! { ":prop": prop, ":valu": valu, ":limit": limit }, |r| r.get(0))?)
}

pub fn size_by_le(conn: &Connection, cat: &Catalogue, prop: &str, valu: i64, limit: i64) -> Result<i64> {
    Ok(conn.query_row(&cat.getsize_by_le, named_params! { ":prop": prop, ":valu": valu, ":limit": limit }, |r| r.get(0))?)
}

/// Entities sharing an `iden` with any row matching a range scan (a "tufo" join).
pub fn tufos_by_range(conn: &Connection, cat: &Catalogue, prop: &str, lo: i64, hi: i64, limit: i64) -> Result<Vec<Row>> {
    let mut stmt = conn.prepare(&cat.getjoin_by_range_int)?;
    let rows = stmt
        .query_map(named_params! { ":prop": prop, ":minvalu": lo, ":maxvalu": hi, ":limit": limit }, fold_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn tufos_by_ge(conn: &Connection, cat: &Catalogue, prop: &str, valu: i64, limit: i64) -> Result<Vec<Row>> {
    let mut stmt = conn.prepare(&cat.getjoin_by_ge_int)?;
    let rows = stmt
        .query_map(named_params! { ":prop": prop, ":valu": valu, ":limit": limit }, fold_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn tufos_by_le(conn: &Connection, cat: &Catalogue, prop: &str, valu: i64, limit: i64) -> Result<Vec<Row>> {
    let mut stmt = conn.prepare(&cat.getjoin_by_le_int)?;
    let rows = stmt
        .query_map(named_params! { ":prop": prop, ":valu": valu, ":limit": limit }, fold_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// String-typed counterpart of [`tufos_by_range`]. Only the join family
/// supports string ranges; the plain-rows family does not.
pub fn tufos_by_range_str(conn: &Connection, cat: &Catalogue, prop: &str, lo: &str, hi: &str, limit: i64) -> Result<Vec<Row>> {
    let mut stmt = conn.prepare(&cat.getjoin_by_range_str)?;
    let rows = stmt
        .query_map(named_params! { ":prop": prop, ":minvalu": lo, ":maxvalu": hi, ":limit": limit }, fold_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn tufos_by_ge_str(conn: &Connection, cat: &Catalogue, prop: &str, valu: &str, limit: i64) -> Result<Vec<Row>> {
    let mut stmt = conn.prepare(&cat.getjoin_by_ge_str)?;
    let rows = stmt
        .query_map(named_params! { ":prop": prop, ":valu": valu, ":limit": limit }, fold_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn tufos_by_le_str(conn: &Connection, cat: &Catalogue, prop: &str, valu: &str, limit: i64) -> Result<Vec<Row>> {
    let mut stmt = conn.prepare(&cat.getjoin_by_le_str)?;
    let rows = stmt
        .query_map(named_params! { ":prop": prop, ":valu": valu, ":limit": limit }, fold_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    fn setup() -> (Connection, Catalogue) {
        let conn = Connection::open_in_memory().unwrap();
        let cat = Catalogue::new("rows");
        schema::init_schema(&conn, &cat, 0, false).unwrap();
        (conn, cat)
    }

    #[test]
    fn dual_typed_rows_scenario() {
        let (conn, cat) = setup();
        add_rows(&conn, &cat, &[
            Row::new("A", "x", 7i64, 1),
            Row::new("A", "x", "s", 2),
        ]).unwrap();

        let all = get_rows_by_id(&conn, &cat, "A").unwrap();
        assert_eq!(all.len(), 2);

        let only_int = get_rows_by_id_prop(&conn, &cat, "A", "x", Some(&Value::Int(7))).unwrap();
        assert_eq!(only_int.len(), 1);
        assert_eq!(only_int[0].value, Value::Int(7));

        del_rows_by_id_prop(&conn, &cat, "A", "x", Some(&Value::Str("s".into()))).unwrap();
        let remaining = get_rows_by_id(&conn, &cat, "A").unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].value, Value::Int(7));
    }

    #[test]
    fn window_scenario() {
        let (conn, cat) = setup();
        add_rows(&conn, &cat, &[
            Row::new("A", "y", 1i64, 10),
            Row::new("A", "y", 2i64, 20),
            Row::new("A", "y", 3i64, 30),
        ]).unwrap();

        let q = PropQuery { prop: "y", value: None, mintime: Some(15), maxtime: Some(25), limit: 1000 };
        assert_eq!(get_size_by_prop(&conn, &cat, &q).unwrap(), 1);
        assert_eq!(get_rows_by_prop(&conn, &cat, &q).unwrap().len(), 1);
    }

    #[test]
    fn set_rows_by_id_prop_inserts_then_replaces_type() {
        let (conn, cat) = setup();
        set_rows_by_id_prop(&conn, &cat, "A", "z", &Value::Int(1), 100).unwrap();
        let rows = get_rows_by_id_prop(&conn, &cat, "A", "z", None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, Value::Int(1));

        set_rows_by_id_prop(&conn, &cat, "A", "z", &Value::Str("new".into()), 200).unwrap();
        let rows = get_rows_by_id_prop(&conn, &cat, "A", "z", None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, Value::Str("new".into()));
    }

    #[test]
    fn range_scan_normalizes_to_half_open_window() {
        let (conn, cat) = setup();
        add_rows(&conn, &cat, &[
            Row::new("A", "n", 5i64, 1),
            Row::new("A", "n", 10i64, 1),
            Row::new("A", "n", 15i64, 1),
        ]).unwrap();
        let rows = rows_by_range(&conn, &cat, "n", 5, 15, 1000).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn del_rows_by_id_drops_every_prop() {
        let (conn, cat) = setup();
        add_rows(&conn, &cat, &[Row::new("A", "a", 1i64, 1), Row::new("A", "b", 2i64, 1)]).unwrap();
        del_rows_by_id(&conn, &cat, "A").unwrap();
        assert!(get_rows_by_id(&conn, &cat, "A").unwrap().is_empty());
    }

    #[test]
    fn join_by_prop_returns_every_row_for_matching_identities() {
        let (conn, cat) = setup();
        add_rows(&conn, &cat, &[
            Row::new("A", "tag:foo", 1i64, 1),
            Row::new("A", "other", "bar", 1),
            Row::new("B", "other", "baz", 1),
        ]).unwrap();
        let q = PropQuery { prop: "tag:foo", value: None, mintime: None, maxtime: None, limit: 1000 };
        let joined = get_join_by_prop(&conn, &cat, &q).unwrap();
        assert_eq!(joined.len(), 2);
    }
}
