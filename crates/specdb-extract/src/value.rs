//! Typed values for database-agnostic row handling.
//!
//! Every mapped column resolves to exactly one [`ColumnType`]; row cells are
//! carried as [`Value`]s. The write path coerces textual values into the
//! column's declared type before binding.

use std::fmt;
use std::hash::{Hash, Hasher};

use bytes::BytesMut;
use chrono::NaiveDateTime;
use tokio_postgres::types::{to_sql_checked, IsNull, ToSql, Type};

use crate::error::{ExtractError, Result};

/// Timestamp pattern accepted by the textual coercion fallback,
/// interpreted as UTC wall time.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The closed set of supported value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Text,
    Integer,
    Boolean,
    Real,
    Timestamp,
}

impl ColumnType {
    /// Map a native column type name to a [`ColumnType`].
    ///
    /// The dictionary is fixed; anything else is a schema drift the caller
    /// must surface as [`ExtractError::UnexpectedType`].
    pub fn from_native(native: &str) -> Option<Self> {
        match native {
            "varchar" | "text" => Some(ColumnType::Text),
            "int4" | "int8" => Some(ColumnType::Integer),
            "bool" => Some(ColumnType::Boolean),
            "float8" => Some(ColumnType::Real),
            "timestamp" => Some(ColumnType::Timestamp),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Text => "text",
            ColumnType::Integer => "integer",
            ColumnType::Boolean => "boolean",
            ColumnType::Real => "real",
            ColumnType::Timestamp => "timestamp",
        };
        f.write_str(name)
    }
}

/// One typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Boolean(bool),
    Real(f64),
    Timestamp(NaiveDateTime),
}

impl Value {
    /// Coerce this value to the column's declared type.
    ///
    /// Typed values pass through unchanged; textual values get the parse
    /// fallback (integer, real, boolean, timestamp). A failed numeric or
    /// timestamp parse is fatal to the write.
    pub fn coerce(self, ty: ColumnType, column: &str) -> Result<Value> {
        match (ty, self) {
            (ColumnType::Integer, Value::Text(s)) => match s.trim().parse::<i64>() {
                Ok(n) => Ok(Value::Integer(n)),
                Err(_) => Err(coercion_error(column, ty, s)),
            },
            (ColumnType::Real, Value::Text(s)) => match s.trim().parse::<f64>() {
                Ok(x) => Ok(Value::Real(x)),
                Err(_) => Err(coercion_error(column, ty, s)),
            },
            // Java Boolean.parseBoolean semantics: "true" (any case) is
            // true, everything else is false, never an error.
            (ColumnType::Boolean, Value::Text(s)) => {
                Ok(Value::Boolean(s.trim().eq_ignore_ascii_case("true")))
            }
            (ColumnType::Timestamp, Value::Text(s)) => {
                match NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT) {
                    Ok(t) => Ok(Value::Timestamp(t)),
                    Err(_) => Err(coercion_error(column, ty, s)),
                }
            }
            (_, v) => Ok(v),
        }
    }
}

fn coercion_error(column: &str, ty: ColumnType, value: String) -> ExtractError {
    ExtractError::Coercion {
        column: column.to_string(),
        ty,
        value,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Real(x) => write!(f, "{}", x),
            Value::Timestamp(t) => write!(f, "{}", t.format(TIMESTAMP_FORMAT)),
        }
    }
}

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> std::result::Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self {
            Value::Text(s) => s.to_sql(ty, out),
            Value::Integer(n) => {
                if *ty == Type::INT4 {
                    (*n as i32).to_sql(ty, out)
                } else {
                    n.to_sql(ty, out)
                }
            }
            Value::Boolean(b) => b.to_sql(ty, out),
            Value::Real(x) => x.to_sql(ty, out),
            Value::Timestamp(t) => t.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Real(x)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(t: NaiveDateTime) -> Self {
        Value::Timestamp(t)
    }
}

/// A raw source key usable as a hash-map key.
///
/// Primary keys are carried exactly as the row returned them (integer or
/// text in practice). Reals are compared and hashed by bit pattern so the
/// wrapper can satisfy `Eq`.
#[derive(Debug, Clone)]
pub struct PkKey(pub Value);

impl PartialEq for PkKey {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Value::Real(a), Value::Real(b)) => a.to_bits() == b.to_bits(),
            (a, b) => a == b,
        }
    }
}

impl Eq for PkKey {}

impl Hash for PkKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(&self.0).hash(state);
        match &self.0 {
            Value::Text(s) => s.hash(state),
            Value::Integer(n) => n.hash(state),
            Value::Boolean(b) => b.hash(state),
            Value::Real(x) => x.to_bits().hash(state),
            Value::Timestamp(t) => t.hash(state),
        }
    }
}

impl fmt::Display for PkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
