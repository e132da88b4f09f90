//! The dual-typed row value and the type axes used by the dispatch matrix.

/// A row value: exactly one of integer or string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Str(String),
}

impl Value {
    pub fn type_axis(&self) -> TypeAxis {
        match self {
            Value::Int(_) => TypeAxis::Int,
            Value::Str(_) => TypeAxis::Str,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

/// One axis of the three-axis dispatch key: the runtime type of a bound
/// value, or the absence of one. `mintime`/`maxtime` only ever take `None`
/// or `Int`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeAxis {
    None,
    Int,
    Str,
}

impl TypeAxis {
    pub fn of_value(value: &Option<Value>) -> Self {
        match value {
            None => TypeAxis::None,
            Some(v) => v.type_axis(),
        }
    }

    pub fn of_time(time: &Option<i64>) -> Self {
        match time {
            None => TypeAxis::None,
            Some(_) => TypeAxis::Int,
        }
    }
}

/// A logical row as returned to callers: `(iden, prop, value, tstamp)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub iden: String,
    pub prop: String,
    pub value: Value,
    pub tstamp: i64,
}

impl Row {
    pub fn new(iden: impl Into<String>, prop: impl Into<String>, value: impl Into<Value>, tstamp: i64) -> Self {
        Self {
            iden: iden.into(),
            prop: prop.into(),
            value: value.into(),
            tstamp,
        }
    }
}
