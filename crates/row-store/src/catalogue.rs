//! Query catalogue: named templates with `{{TABLE}}`/`{{BLOB_TABLE}}` and
//! `{{UPPERCASE}}` placeholder substitution, applied once at construction.
//!
//! Templates are `&'static str`; runtime values are always bound through
//! `rusqlite`'s named-parameter API, never concatenated into the SQL text.

use std::collections::HashMap;

use crate::value::TypeAxis;

/// The five query families that are keyed by the three-axis dispatch matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    RowsByProp,
    JoinByProp,
    SizeByProp,
    DelRowsByProp,
    DelJoinByProp,
}

type DispatchKey = (TypeAxis, TypeAxis, TypeAxis);

/// Prepared, table-bound query text plus the property-query dispatch matrix.
pub struct Catalogue {
    pub table: String,
    pub blob_table: String,

    pub inittable: String,
    pub init_blobtable: String,
    pub init_iden_idx: String,
    pub init_prop_idx: String,
    pub init_strval_idx: String,
    pub init_intval_idx: String,
    pub init_blobtable_idx: String,

    pub addrows: String,
    pub getrows_by_iden: String,
    pub getrows_by_iden_prop: String,
    pub getrows_by_iden_prop_intval: String,
    pub getrows_by_iden_prop_strval: String,
    pub delrows_by_iden: String,
    pub delrows_by_iden_prop: String,
    pub delrows_by_iden_prop_intval: String,
    pub delrows_by_iden_prop_strval: String,

    pub uprows_by_iden_prop_int: String,
    pub uprows_by_iden_prop_str: String,

    pub getrows_by_range: String,
    pub getrows_by_ge: String,
    pub getrows_by_le: String,
    pub getsize_by_range: String,
    pub getsize_by_ge: String,
    pub getsize_by_le: String,
    pub getjoin_by_range_int: String,
    pub getjoin_by_ge_int: String,
    pub getjoin_by_le_int: String,
    pub getjoin_by_range_str: String,
    pub getjoin_by_ge_str: String,
    pub getjoin_by_le_str: String,

    pub blob_set: String,
    pub blob_get: String,
    pub blob_del: String,
    pub blob_get_keys: String,

    dispatch: HashMap<(Family, DispatchKey), String>,
}

macro_rules! prep {
    ($table:expr, $tmpl:expr) => {
        prep_query($tmpl, $table)
    };
}

impl Catalogue {
    pub fn new(table: &str) -> Self {
        let blob_table = format!("{table}_blob");

        let mut dispatch = HashMap::new();
        for (family, variants) in [
            (Family::RowsByProp, ROWS_BY_PROP),
            (Family::JoinByProp, JOIN_BY_PROP),
            (Family::SizeByProp, SIZE_BY_PROP),
            (Family::DelRowsByProp, DELROWS_BY_PROP),
            (Family::DelJoinByProp, DELJOIN_BY_PROP),
        ] {
            for (key, tmpl) in variants {
                dispatch.insert((family, *key), prep!(table, tmpl));
            }
        }

        Self {
            table: table.to_string(),
            blob_table: blob_table.clone(),

            inittable: prep!(table, T_INITTABLE),
            init_blobtable: prep_blob_query(T_INIT_BLOBTABLE, &blob_table),
            init_iden_idx: prep!(table, T_INIT_IDEN_IDX),
            init_prop_idx: prep!(table, T_INIT_PROP_IDX),
            init_strval_idx: prep!(table, T_INIT_STRVAL_IDX),
            init_intval_idx: prep!(table, T_INIT_INTVAL_IDX),
            init_blobtable_idx: prep_blob_query(T_INIT_BLOBTABLE_IDX, &blob_table),

            addrows: prep!(table, T_ADDROWS),
            getrows_by_iden: prep!(table, T_GETROWS_BY_IDEN),
            getrows_by_iden_prop: prep!(table, T_GETROWS_BY_IDEN_PROP),
            getrows_by_iden_prop_intval: prep!(table, T_GETROWS_BY_IDEN_PROP_INTVAL),
            getrows_by_iden_prop_strval: prep!(table, T_GETROWS_BY_IDEN_PROP_STRVAL),
            delrows_by_iden: prep!(table, T_DELROWS_BY_IDEN),
            delrows_by_iden_prop: prep!(table, T_DELROWS_BY_IDEN_PROP),
            delrows_by_iden_prop_intval: prep!(table, T_DELROWS_BY_IDEN_PROP_INTVAL),
            delrows_by_iden_prop_strval: prep!(table, T_DELROWS_BY_IDEN_PROP_STRVAL),

            uprows_by_iden_prop_int: prep!(table, T_UPROWS_BY_IDEN_PROP_INT),
            uprows_by_iden_prop_str: prep!(table, T_UPROWS_BY_IDEN_PROP_STR),

            getrows_by_range: prep!(table, T_GETROWS_BY_RANGE),
            getrows_by_ge: prep!(table, T_GETROWS_BY_GE),
            getrows_by_le: prep!(table, T_GETROWS_BY_LE),
            getsize_by_range: prep!(table, T_GETSIZE_BY_RANGE),
            getsize_by_ge: prep!(table, T_GETSIZE_BY_GE),
            getsize_by_le: prep!(table, T_GETSIZE_BY_LE),
            getjoin_by_range_int: prep!(table, T_GETJOIN_BY_RANGE_INT),
            getjoin_by_ge_int: prep!(table, T_GETJOIN_BY_GE_INT),
            getjoin_by_le_int: prep!(table, T_GETJOIN_BY_LE_INT),
            getjoin_by_range_str: prep!(table, T_GETJOIN_BY_RANGE_STR),
            getjoin_by_ge_str: prep!(table, T_GETJOIN_BY_GE_STR),
            getjoin_by_le_str: prep!(table, T_GETJOIN_BY_LE_STR),

            blob_set: prep_blob_query(T_BLOB_SET, &blob_table),
            blob_get: prep_blob_query(T_BLOB_GET, &blob_table),
            blob_del: prep_blob_query(T_BLOB_DEL, &blob_table),
            blob_get_keys: prep_blob_query(T_BLOB_GET_KEYS, &blob_table),

            dispatch,
        }
    }

    /// Looks up the precompiled template for a property-query family given
    /// the three-axis dispatch key `(value, mintime, maxtime)`.
    pub fn lookup(&self, family: Family, key: DispatchKey) -> &str {
        self.dispatch
            .get(&(family, key))
            .unwrap_or_else(|| panic!("no query template for {family:?} {key:?}"))
    }
}

fn prep_query(template: &str, table: &str) -> String {
    substitute_params(&template.replace("{{TABLE}}", table))
}

fn prep_blob_query(template: &str, blob_table: &str) -> String {
    substitute_params(&template.replace("{{BLOB_TABLE}}", blob_table))
}

/// Replaces every `{{UPPERNAME}}` with a named bound-parameter token `:lowername`.
fn substitute_params(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    let bytes = query.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'{' && i + 1 < bytes.len() && bytes[i + 1] == b'{' {
            if let Some(end) = query[i..].find("}}") {
                let name = &query[i + 2..i + end];
                if !name.is_empty() && name.chars().all(|c| c.is_ascii_uppercase()) {
                    out.push(':');
                    out.push_str(&name.to_ascii_lowercase());
                    i += end + 2;
                    continue;
                }
            }
        }
        out.push(bytes[i] as char);
        i += 1;
    }
    out
}

const T_INITTABLE: &str = "CREATE TABLE {{TABLE}} (iden VARCHAR, prop VARCHAR, strval TEXT, intval BIGINT, tstamp BIGINT)";
const T_INIT_BLOBTABLE: &str = "CREATE TABLE {{BLOB_TABLE}} (k VARCHAR, v BLOB)";
const T_INIT_IDEN_IDX: &str = "CREATE INDEX {{TABLE}}_iden_idx ON {{TABLE}} (iden, prop)";
const T_INIT_PROP_IDX: &str = "CREATE INDEX {{TABLE}}_prop_time_idx ON {{TABLE}} (prop, tstamp)";
const T_INIT_STRVAL_IDX: &str = "CREATE INDEX {{TABLE}}_strval_idx ON {{TABLE}} (prop, strval, tstamp)";
const T_INIT_INTVAL_IDX: &str = "CREATE INDEX {{TABLE}}_intval_idx ON {{TABLE}} (prop, intval, tstamp)";
const T_INIT_BLOBTABLE_IDX: &str = "CREATE UNIQUE INDEX {{BLOB_TABLE}}_idx ON {{BLOB_TABLE}} (k)";

const T_ADDROWS: &str = "INSERT INTO {{TABLE}} (iden,prop,strval,intval,tstamp) VALUES ({{IDEN}},{{PROP}},{{STRVAL}},{{INTVAL}},{{TSTAMP}})";
const T_GETROWS_BY_IDEN: &str = "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE iden={{IDEN}}";
const T_GETROWS_BY_IDEN_PROP: &str = "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE iden={{IDEN}} AND prop={{PROP}}";
const T_GETROWS_BY_IDEN_PROP_INTVAL: &str = "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE iden={{IDEN}} AND prop={{PROP}} AND intval={{VALU}}";
const T_GETROWS_BY_IDEN_PROP_STRVAL: &str = "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE iden={{IDEN}} AND prop={{PROP}} AND strval={{VALU}}";
const T_DELROWS_BY_IDEN: &str = "DELETE FROM {{TABLE}} WHERE iden={{IDEN}}";
const T_DELROWS_BY_IDEN_PROP: &str = "DELETE FROM {{TABLE}} WHERE iden={{IDEN}} AND prop={{PROP}}";
const T_DELROWS_BY_IDEN_PROP_INTVAL: &str = "DELETE FROM {{TABLE}} WHERE iden={{IDEN}} AND prop={{PROP}} AND intval={{VALU}}";
const T_DELROWS_BY_IDEN_PROP_STRVAL: &str = "DELETE FROM {{TABLE}} WHERE iden={{IDEN}} AND prop={{PROP}} AND strval={{VALU}}";

const T_UPROWS_BY_IDEN_PROP_INT: &str = "UPDATE {{TABLE}} SET intval={{VALU}} WHERE iden={{IDEN}} AND prop={{PROP}}";
const T_UPROWS_BY_IDEN_PROP_STR: &str = "UPDATE {{TABLE}} SET strval={{VALU}} WHERE iden={{IDEN}} AND prop={{PROP}}";

const T_GETROWS_BY_RANGE: &str = "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE prop={{PROP}} AND intval >= {{MINVALU}} AND intval < {{MAXVALU}} LIMIT {{LIMIT}}";
const T_GETROWS_BY_GE: &str = "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE prop={{PROP}} AND intval >= {{VALU}} LIMIT {{LIMIT}}";
const T_GETROWS_BY_LE: &str = "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE prop={{PROP}} AND intval <= {{VALU}} LIMIT {{LIMIT}}";
const T_GETSIZE_BY_RANGE: &str = "SELECT COUNT(*) FROM {{TABLE}} WHERE prop={{PROP}} AND intval >= {{MINVALU}} AND intval < {{MAXVALU}} LIMIT {{LIMIT}}";
const T_GETSIZE_BY_GE: &str = "SELECT COUNT(*) FROM {{TABLE}} WHERE prop={{PROP}} AND intval >= {{VALU}} LIMIT {{LIMIT}}";
const T_GETSIZE_BY_LE: &str = "SELECT COUNT(*) FROM {{TABLE}} WHERE prop={{PROP}} AND intval <= {{VALU}} LIMIT {{LIMIT}}";
const T_GETJOIN_BY_RANGE_INT: &str = "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE iden IN (SELECT iden FROM {{TABLE}} WHERE prop={{PROP}} AND intval >= {{MINVALU}} AND intval < {{MAXVALU}} LIMIT {{LIMIT}})";
const T_GETJOIN_BY_GE_INT: &str = "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE iden IN (SELECT iden FROM {{TABLE}} WHERE prop={{PROP}} AND intval >= {{VALU}} LIMIT {{LIMIT}})";
const T_GETJOIN_BY_LE_INT: &str = "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE iden IN (SELECT iden FROM {{TABLE}} WHERE prop={{PROP}} AND intval <= {{VALU}} LIMIT {{LIMIT}})";

// The plain-rows family intentionally has no string-typed range scan; only
// the join family exposes one, mirroring the original design's asymmetry.
const T_GETJOIN_BY_RANGE_STR: &str = "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE iden IN (SELECT iden FROM {{TABLE}} WHERE prop={{PROP}} AND strval >= {{MINVALU}} AND strval < {{MAXVALU}} LIMIT {{LIMIT}})";
const T_GETJOIN_BY_GE_STR: &str = "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE iden IN (SELECT iden FROM {{TABLE}} WHERE prop={{PROP}} AND strval >= {{VALU}} LIMIT {{LIMIT}})";
const T_GETJOIN_BY_LE_STR: &str = "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE iden IN (SELECT iden FROM {{TABLE}} WHERE prop={{PROP}} AND strval <= {{VALU}} LIMIT {{LIMIT}})";

const T_BLOB_SET: &str = "INSERT OR REPLACE INTO {{BLOB_TABLE}} (k, v) VALUES ({{KEY}}, {{VALU}})";
const T_BLOB_GET: &str = "SELECT v FROM {{BLOB_TABLE}} WHERE k={{KEY}}";
const T_BLOB_DEL: &str = "DELETE FROM {{BLOB_TABLE}} WHERE k={{KEY}}";
const T_BLOB_GET_KEYS: &str = "SELECT k FROM {{BLOB_TABLE}}";

use TypeAxis::{Int as I, None as N, Str as S};

const ROWS_BY_PROP: &[(DispatchKey, &str)] = &[
    ((N, N, N), "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE prop={{PROP}} LIMIT {{LIMIT}}"),
    ((N, I, N), "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE prop={{PROP}} AND tstamp >= {{MINTIME}} LIMIT {{LIMIT}}"),
    ((N, N, I), "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE prop={{PROP}} AND tstamp < {{MAXTIME}} LIMIT {{LIMIT}}"),
    ((N, I, I), "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE prop={{PROP}} AND tstamp >= {{MINTIME}} AND tstamp < {{MAXTIME}} LIMIT {{LIMIT}}"),
    ((I, N, N), "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE prop={{PROP}} AND intval={{VALU}} LIMIT {{LIMIT}}"),
    ((I, I, N), "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE prop={{PROP}} AND intval={{VALU}} AND tstamp >= {{MINTIME}} LIMIT {{LIMIT}}"),
    ((I, N, I), "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE prop={{PROP}} AND intval={{VALU}} AND tstamp < {{MAXTIME}} LIMIT {{LIMIT}}"),
    ((I, I, I), "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE prop={{PROP}} AND intval={{VALU}} AND tstamp >= {{MINTIME}} AND tstamp < {{MAXTIME}} LIMIT {{LIMIT}}"),
    ((S, N, N), "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE prop={{PROP}} AND strval={{VALU}} LIMIT {{LIMIT}}"),
    ((S, I, N), "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE prop={{PROP}} AND strval={{VALU}} AND tstamp >= {{MINTIME}} LIMIT {{LIMIT}}"),
    ((S, N, I), "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE prop={{PROP}} AND strval={{VALU}} AND tstamp < {{MAXTIME}} LIMIT {{LIMIT}}"),
    ((S, I, I), "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE prop={{PROP}} AND strval={{VALU}} AND tstamp >= {{MINTIME}} AND tstamp < {{MAXTIME}} LIMIT {{LIMIT}}"),
];

const JOIN_BY_PROP: &[(DispatchKey, &str)] = &[
    ((N, N, N), "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE iden IN (SELECT iden FROM {{TABLE}} WHERE prop={{PROP}} LIMIT {{LIMIT}})"),
    ((N, I, N), "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE iden IN (SELECT iden FROM {{TABLE}} WHERE prop={{PROP}} AND tstamp >= {{MINTIME}} LIMIT {{LIMIT}})"),
    ((N, N, I), "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE iden IN (SELECT iden FROM {{TABLE}} WHERE prop={{PROP}} AND tstamp < {{MAXTIME}} LIMIT {{LIMIT}})"),
    ((N, I, I), "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE iden IN (SELECT iden FROM {{TABLE}} WHERE prop={{PROP}} AND tstamp >= {{MINTIME}} AND tstamp < {{MAXTIME}} LIMIT {{LIMIT}})"),
    ((I, N, N), "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE iden IN (SELECT iden FROM {{TABLE}} WHERE prop={{PROP}} AND intval={{VALU}} LIMIT {{LIMIT}})"),
    ((I, I, N), "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE iden IN (SELECT iden FROM {{TABLE}} WHERE prop={{PROP}} AND intval={{VALU}} AND tstamp >= {{MINTIME}} LIMIT {{LIMIT}})"),
    ((I, N, I), "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE iden IN (SELECT iden FROM {{TABLE}} WHERE prop={{PROP}} AND intval={{VALU}} AND tstamp < {{MAXTIME}} LIMIT {{LIMIT}})"),
    ((I, I, I), "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE iden IN (SELECT iden FROM {{TABLE}} WHERE prop={{PROP}} AND intval={{VALU}} AND tstamp >= {{MINTIME}} AND tstamp < {{MAXTIME}} LIMIT {{LIMIT}})"),
    ((S, N, N), "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE iden IN (SELECT iden FROM {{TABLE}} WHERE prop={{PROP}} AND strval={{VALU}} LIMIT {{LIMIT}})"),
    ((S, I, N), "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE iden IN (SELECT iden FROM {{TABLE}} WHERE prop={{PROP}} AND strval={{VALU}} AND tstamp >= {{MINTIME}} LIMIT {{LIMIT}})"),
    ((S, N, I), "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE iden IN (SELECT iden FROM {{TABLE}} WHERE prop={{PROP}} AND strval={{VALU}} AND tstamp < {{MAXTIME}} LIMIT {{LIMIT}})"),
    ((S, I, I), "SELECT iden,prop,intval,strval,tstamp FROM {{TABLE}} WHERE iden IN (SELECT iden FROM {{TABLE}} WHERE prop={{PROP}} AND strval={{VALU}} AND tstamp >= {{MINTIME}} AND tstamp < {{MAXTIME}} LIMIT {{LIMIT}})"),
];

const SIZE_BY_PROP: &[(DispatchKey, &str)] = &[
    ((N, N, N), "SELECT COUNT(*) FROM {{TABLE}} WHERE prop={{PROP}} LIMIT {{LIMIT}}"),
    ((N, I, N), "SELECT COUNT(*) FROM {{TABLE}} WHERE prop={{PROP}} AND tstamp >= {{MINTIME}} LIMIT {{LIMIT}}"),
    ((N, N, I), "SELECT COUNT(*) FROM {{TABLE}} WHERE prop={{PROP}} AND tstamp < {{MAXTIME}} LIMIT {{LIMIT}}"),
    ((N, I, I), "SELECT COUNT(*) FROM {{TABLE}} WHERE prop={{PROP}} AND tstamp >= {{MINTIME}} AND tstamp < {{MAXTIME}} LIMIT {{LIMIT}}"),
    ((I, N, N), "SELECT COUNT(*) FROM {{TABLE}} WHERE prop={{PROP}} AND intval={{VALU}} LIMIT {{LIMIT}}"),
    ((I, I, N), "SELECT COUNT(*) FROM {{TABLE}} WHERE prop={{PROP}} AND intval={{VALU}} AND tstamp >= {{MINTIME}} LIMIT {{LIMIT}}"),
    ((I, N, I), "SELECT COUNT(*) FROM {{TABLE}} WHERE prop={{PROP}} AND intval={{VALU}} AND tstamp < {{MAXTIME}} LIMIT {{LIMIT}}"),
    ((I, I, I), "SELECT COUNT(*) FROM {{TABLE}} WHERE prop={{PROP}} AND intval={{VALU}} AND tstamp >= {{MINTIME}} AND tstamp < {{MAXTIME}} LIMIT {{LIMIT}}"),
    ((S, N, N), "SELECT COUNT(*) FROM {{TABLE}} WHERE prop={{PROP}} AND strval={{VALU}} LIMIT {{LIMIT}}"),
    ((S, I, N), "SELECT COUNT(*) FROM {{TABLE}} WHERE prop={{PROP}} AND strval={{VALU}} AND tstamp >= {{MINTIME}} LIMIT {{LIMIT}}"),
    ((S, N, I), "SELECT COUNT(*) FROM {{TABLE}} WHERE prop={{PROP}} AND strval={{VALU}} AND tstamp < {{MAXTIME}} LIMIT {{LIMIT}}"),
    ((S, I, I), "SELECT COUNT(*) FROM {{TABLE}} WHERE prop={{PROP}} AND strval={{VALU}} AND tstamp >= {{MINTIME}} AND tstamp < {{MAXTIME}} LIMIT {{LIMIT}}"),
];

const DELROWS_BY_PROP: &[(DispatchKey, &str)] = &[
    ((N, N, N), "DELETE FROM {{TABLE}} WHERE prop={{PROP}}"),
    ((N, I, N), "DELETE FROM {{TABLE}} WHERE prop={{PROP}} AND tstamp >= {{MINTIME}}"),
    ((N, N, I), "DELETE FROM {{TABLE}} WHERE prop={{PROP}} AND tstamp < {{MAXTIME}}"),
    ((N, I, I), "DELETE FROM {{TABLE}} WHERE prop={{PROP}} AND tstamp >= {{MINTIME}} AND tstamp < {{MAXTIME}}"),
    ((I, N, N), "DELETE FROM {{TABLE}} WHERE prop={{PROP}} AND intval={{VALU}}"),
    ((I, I, N), "DELETE FROM {{TABLE}} WHERE prop={{PROP}} AND intval={{VALU}} AND tstamp >= {{MINTIME}}"),
    ((I, N, I), "DELETE FROM {{TABLE}} WHERE prop={{PROP}} AND intval={{VALU}} AND tstamp < {{MAXTIME}}"),
    ((I, I, I), "DELETE FROM {{TABLE}} WHERE prop={{PROP}} AND intval={{VALU}} AND tstamp >= {{MINTIME}} AND tstamp < {{MAXTIME}}"),
    ((S, N, N), "DELETE FROM {{TABLE}} WHERE prop={{PROP}} AND strval={{VALU}}"),
    ((S, I, N), "DELETE FROM {{TABLE}} WHERE prop={{PROP}} AND strval={{VALU}} AND tstamp >= {{MINTIME}}"),
    ((S, N, I), "DELETE FROM {{TABLE}} WHERE prop={{PROP}} AND strval={{VALU}} AND tstamp < {{MAXTIME}}"),
    ((S, I, I), "DELETE FROM {{TABLE}} WHERE prop={{PROP}} AND strval={{VALU}} AND tstamp >= {{MINTIME}} AND tstamp < {{MAXTIME}}"),
];

const DELJOIN_BY_PROP: &[(DispatchKey, &str)] = &[
    ((N, N, N), "DELETE FROM {{TABLE}} WHERE iden IN (SELECT iden FROM {{TABLE}} WHERE prop={{PROP}})"),
    ((N, I, N), "DELETE FROM {{TABLE}} WHERE iden IN (SELECT iden FROM {{TABLE}} WHERE prop={{PROP}} AND tstamp >= {{MINTIME}})"),
    ((N, N, I), "DELETE FROM {{TABLE}} WHERE iden IN (SELECT iden FROM {{TABLE}} WHERE prop={{PROP}} AND tstamp < {{MAXTIME}})"),
    ((N, I, I), "DELETE FROM {{TABLE}} WHERE iden IN (SELECT iden FROM {{TABLE}} WHERE prop={{PROP}} AND tstamp >= {{MINTIME}} AND tstamp < {{MAXTIME}})"),
    ((I, N, N), "DELETE FROM {{TABLE}} WHERE iden IN (SELECT iden FROM {{TABLE}} WHERE prop={{PROP}} AND intval={{VALU}})"),
    ((I, I, N), "DELETE FROM {{TABLE}} WHERE iden IN (SELECT iden FROM {{TABLE}} WHERE prop={{PROP}} AND intval={{VALU}} AND tstamp >= {{MINTIME}})"),
    ((I, N, I), "DELETE FROM {{TABLE}} WHERE iden IN (SELECT iden FROM {{TABLE}} WHERE prop={{PROP}} AND intval={{VALU}} AND tstamp < {{MAXTIME}})"),
    ((I, I, I), "DELETE FROM {{TABLE}} WHERE iden IN (SELECT iden FROM {{TABLE}} WHERE prop={{PROP}} AND intval={{VALU}} AND tstamp >= {{MINTIME}} AND tstamp < {{MAXTIME}})"),
    ((S, N, N), "DELETE FROM {{TABLE}} WHERE iden IN (SELECT iden FROM {{TABLE}} WHERE prop={{PROP}} AND strval={{VALU}})"),
    ((S, I, N), "DELETE FROM {{TABLE}} WHERE iden IN (SELECT iden FROM {{TABLE}} WHERE prop={{PROP}} AND strval={{VALU}} AND tstamp >= {{MINTIME}})"),
    ((S, N, I), "DELETE FROM {{TABLE}} WHERE iden IN (SELECT iden FROM {{TABLE}} WHERE prop={{PROP}} AND strval={{VALU}} AND tstamp < {{MAXTIME}})"),
    ((S, I, I), "DELETE FROM {{TABLE}} WHERE iden IN (SELECT iden FROM {{TABLE}} WHERE prop={{PROP}} AND strval={{VALU}} AND tstamp >= {{MINTIME}} AND tstamp < {{MAXTIME}})"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_substitution_lowercases_and_prefixes() {
        let q = substitute_params("SELECT * FROM t WHERE prop={{PROP}} AND x={{MINTIME}}");
        assert_eq!(q, "SELECT * FROM t WHERE prop=:prop AND x=:mintime");
    }

    #[test]
    fn table_and_blob_table_substitution() {
        let cat = Catalogue::new("rows");
        assert!(cat.inittable.contains("CREATE TABLE rows "));
        assert!(cat.init_blobtable.contains("CREATE TABLE rows_blob "));
    }

    #[test]
    fn dispatch_matrix_has_all_twelve_combinations_per_family() {
        let cat = Catalogue::new("rows");
        for family in [
            Family::RowsByProp,
            Family::JoinByProp,
            Family::SizeByProp,
            Family::DelRowsByProp,
            Family::DelJoinByProp,
        ] {
            for v in [N, I, S] {
                for mn in [N, I] {
                    for mx in [N, I] {
                        let _ = cat.lookup(family, (v, mn, mx));
                    }
                }
            }
        }
    }
}
