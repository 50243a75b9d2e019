use super::ValueRange;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use std::{
    collections::BTreeMap,
    hash::{Hash, Hasher},
};
use uuid::Uuid;

/// A typed application value.
#[derive(Debug, Default, Clone)]
pub enum Value {
    /// Null value
    #[default]
    Null,

    /// Boolean value
    Bool(bool),

    /// Signed 16-bit integer
    I16(i16),

    /// Signed 32-bit integer
    I32(i32),

    /// Signed 64-bit integer
    I64(i64),

    /// 64-bit floating point
    F64(f64),

    /// Arbitrary precision decimal
    Decimal(Decimal),

    /// String value
    String(String),

    /// Binary value
    Bytes(Vec<u8>),

    Uuid(Uuid),

    Date(NaiveDate),

    Time(NaiveTime),

    /// Timestamp without time zone
    Timestamp(NaiveDateTime),

    /// Timestamp in UTC
    TimestampTz(DateTime<Utc>),

    /// JSON document
    Json(serde_json::Value),

    /// String to nullable-string map
    HStore(BTreeMap<String, Option<String>>),

    /// A range with optional bounds
    Range(ValueRange),

    /// A list of values of the same type
    List(Vec<Value>),
}

impl Value {
    pub const fn null() -> Value {
        Value::Null
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I16(v) => Some(v.into()),
            Value::I32(v) => Some(v.into()),
            Value::I64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// True for values whose "emptiness" makes them falsy: null, `false`,
    /// zero, and empty strings, lists and maps.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(v) => !v,
            Value::I16(v) => *v == 0,
            Value::I32(v) => *v == 0,
            Value::I64(v) => *v == 0,
            Value::F64(v) => *v == 0.0,
            Value::Decimal(v) => v.is_zero(),
            Value::String(v) => v.is_empty(),
            Value::Bytes(v) => v.is_empty(),
            Value::HStore(v) => v.is_empty(),
            Value::List(v) => v.is_empty(),
            Value::Json(serde_json::Value::Null) => true,
            Value::Json(serde_json::Value::Array(v)) => v.is_empty(),
            Value::Json(serde_json::Value::Object(v)) => v.is_empty(),
            _ => false,
        }
    }

    /// Short name of the value's variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::F64(_) => "f64",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Uuid(_) => "uuid",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::Timestamp(_) => "timestamp",
            Value::TimestampTz(_) => "timestamptz",
            Value::Json(_) => "json",
            Value::HStore(_) => "hstore",
            Value::Range(_) => "range",
            Value::List(_) => "list",
        }
    }
}

// Floats compare by bit pattern so values can key a hash map.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        use Value::*;

        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (I16(a), I16(b)) => a == b,
            (I32(a), I32(b)) => a == b,
            (I64(a), I64(b)) => a == b,
            (F64(a), F64(b)) => a.to_bits() == b.to_bits(),
            (Decimal(a), Decimal(b)) => a == b,
            (String(a), String(b)) => a == b,
            (Bytes(a), Bytes(b)) => a == b,
            (Uuid(a), Uuid(b)) => a == b,
            (Date(a), Date(b)) => a == b,
            (Time(a), Time(b)) => a == b,
            (Timestamp(a), Timestamp(b)) => a == b,
            (TimestampTz(a), TimestampTz(b)) => a == b,
            (Json(a), Json(b)) => a == b,
            (HStore(a), HStore(b)) => a == b,
            (Range(a), Range(b)) => a == b,
            (List(a), List(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        use Value::*;

        core::mem::discriminant(self).hash(state);

        match self {
            Null => {}
            Bool(v) => v.hash(state),
            I16(v) => v.hash(state),
            I32(v) => v.hash(state),
            I64(v) => v.hash(state),
            F64(v) => v.to_bits().hash(state),
            Decimal(v) => v.hash(state),
            String(v) => v.hash(state),
            Bytes(v) => v.hash(state),
            Uuid(v) => v.hash(state),
            Date(v) => v.hash(state),
            Time(v) => v.hash(state),
            Timestamp(v) => v.hash(state),
            TimestampTz(v) => v.hash(state),
            // serde_json's object map is ordered, so the text form is stable
            Json(v) => v.to_string().hash(state),
            HStore(v) => v.hash(state),
            Range(v) => v.hash(state),
            List(v) => v.hash(state),
        }
    }
}

impl From<bool> for Value {
    fn from(src: bool) -> Value {
        Value::Bool(src)
    }
}

impl From<i16> for Value {
    fn from(src: i16) -> Value {
        Value::I16(src)
    }
}

impl From<i32> for Value {
    fn from(src: i32) -> Value {
        Value::I32(src)
    }
}

impl From<i64> for Value {
    fn from(src: i64) -> Value {
        Value::I64(src)
    }
}

impl From<f64> for Value {
    fn from(src: f64) -> Value {
        Value::F64(src)
    }
}

impl From<Decimal> for Value {
    fn from(src: Decimal) -> Value {
        Value::Decimal(src)
    }
}

impl From<String> for Value {
    fn from(src: String) -> Value {
        Value::String(src)
    }
}

impl From<&String> for Value {
    fn from(src: &String) -> Value {
        Value::String(src.clone())
    }
}

impl From<&str> for Value {
    fn from(src: &str) -> Value {
        Value::String(src.to_string())
    }
}

impl From<Uuid> for Value {
    fn from(src: Uuid) -> Value {
        Value::Uuid(src)
    }
}

impl From<NaiveDate> for Value {
    fn from(src: NaiveDate) -> Value {
        Value::Date(src)
    }
}

impl From<NaiveTime> for Value {
    fn from(src: NaiveTime) -> Value {
        Value::Time(src)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(src: NaiveDateTime) -> Value {
        Value::Timestamp(src)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(src: DateTime<Utc>) -> Value {
        Value::TimestampTz(src)
    }
}

impl From<BTreeMap<String, Option<String>>> for Value {
    fn from(src: BTreeMap<String, Option<String>>) -> Value {
        Value::HStore(src)
    }
}

impl From<ValueRange> for Value {
    fn from(src: ValueRange) -> Value {
        Value::Range(src)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(src: Vec<T>) -> Value {
        Value::List(src.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(src: Option<T>) -> Value {
        match src {
            Some(value) => value.into(),
            None => Value::Null,
        }
    }
}
