use std::cmp::Ordering;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

/// A single cell read from a shard cursor or synthesized by a merge stage.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Null,
    Boolean(bool),
    Int64(i64),
    Float64(f64),
    /// Epoch-based instant; orders and sums like an integer.
    Timestamp(i64),
    Utf8(String),
    Binary(Vec<u8>),
}

impl ScalarValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ScalarValue::Int64(v) | ScalarValue::Timestamp(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScalarValue::Float64(v) => Some(*v),
            ScalarValue::Int64(v) | ScalarValue::Timestamp(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Rank used when two values of unrelated kinds meet in one column.
    fn kind_rank(&self) -> u8 {
        match self {
            ScalarValue::Null => 0,
            ScalarValue::Boolean(_) => 1,
            ScalarValue::Int64(_) | ScalarValue::Float64(_) | ScalarValue::Timestamp(_) => 2,
            ScalarValue::Utf8(_) => 3,
            ScalarValue::Binary(_) => 4,
        }
    }

    /// Total order over two values. Integers and floats compare numerically with each
    /// other; NULL placement is left to `OrderItem`.
    pub fn compare(&self, other: &Self) -> Ordering {
        use ScalarValue::*;
        match (self, other) {
            (Int64(a) | Timestamp(a), Int64(b) | Timestamp(b)) => a.cmp(b),
            (Float64(a), Float64(b)) => a.total_cmp(b),
            (Float64(a), Int64(b) | Timestamp(b)) => a.total_cmp(&(*b as f64)),
            (Int64(a) | Timestamp(a), Float64(b)) => (*a as f64).total_cmp(b),
            (Boolean(a), Boolean(b)) => a.cmp(b),
            (Utf8(a), Utf8(b)) => a.cmp(b),
            (Binary(a), Binary(b)) => a.cmp(b),
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }

    /// Group-key equality: NULL equals NULL, NULL never equals a non-NULL value,
    /// everything else defers to `compare`.
    pub fn group_eq(&self, other: &Self) -> bool {
        match (self.is_null(), other.is_null()) {
            (true, true) => true,
            (true, false) | (false, true) => false,
            (false, false) => self.compare(other) == Ordering::Equal,
        }
    }
}

impl From<JsonValue> for ScalarValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => ScalarValue::Null,
            JsonValue::Bool(b) => ScalarValue::Boolean(b),
            JsonValue::Number(num) => match (num.as_i64(), num.as_f64()) {
                (Some(i), _) => ScalarValue::Int64(i),
                (None, Some(f)) => ScalarValue::Float64(f),
                (None, None) => ScalarValue::Utf8(num.to_string()),
            },
            JsonValue::String(s) => ScalarValue::Utf8(s),
            nested @ (JsonValue::Array(_) | JsonValue::Object(_)) => {
                ScalarValue::Utf8(nested.to_string())
            }
        }
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Int64(value)
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Float64(value)
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::Utf8(value.to_string())
    }
}

/// Cells serialize as plain JSON scalars; binary cells as base64 text.
impl Serialize for ScalarValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ScalarValue::Null => serializer.serialize_unit(),
            ScalarValue::Boolean(b) => serializer.serialize_bool(*b),
            ScalarValue::Int64(v) | ScalarValue::Timestamp(v) => serializer.serialize_i64(*v),
            ScalarValue::Float64(v) => serializer.serialize_f64(*v),
            ScalarValue::Utf8(s) => serializer.serialize_str(s),
            ScalarValue::Binary(bytes) => serializer.serialize_str(&BASE64_STANDARD.encode(bytes)),
        }
    }
}

impl<'de> Deserialize<'de> for ScalarValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        JsonValue::deserialize(deserializer).map(ScalarValue::from)
    }
}
