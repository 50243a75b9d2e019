use super::Value;

use std::fmt;

/// A range value such as `[1,10)`.
///
/// A missing bound is unbounded on that side.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValueRange {
    pub lower: Option<Box<Value>>,
    pub upper: Option<Box<Value>>,
    pub lower_inclusive: bool,
    pub upper_inclusive: bool,
}

impl ValueRange {
    /// Creates a `[lower, upper)` range, the canonical form for discrete types.
    pub fn new(lower: impl Into<Value>, upper: impl Into<Value>) -> ValueRange {
        ValueRange::from_bounds(Some(lower.into()), Some(upper.into()))
    }

    /// Creates a `[lower, upper)` range; `None` or `Null` leaves a side open.
    pub fn from_bounds(lower: Option<Value>, upper: Option<Value>) -> ValueRange {
        let bound = |v: Option<Value>| v.filter(|v| !v.is_null()).map(Box::new);
        ValueRange {
            lower: bound(lower),
            upper: bound(upper),
            lower_inclusive: true,
            upper_inclusive: false,
        }
    }

    pub fn inclusive(mut self) -> ValueRange {
        self.upper_inclusive = true;
        self
    }
}

/// Writes a bound in the form the database parses in range literals.
fn fmt_bound(value: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value {
        Value::I16(v) => write!(f, "{v}"),
        Value::I32(v) => write!(f, "{v}"),
        Value::I64(v) => write!(f, "{v}"),
        Value::F64(v) => write!(f, "{v}"),
        Value::Decimal(v) => write!(f, "{v}"),
        Value::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
        Value::Timestamp(v) => write!(f, "\"{}\"", v.format("%Y-%m-%d %H:%M:%S%.f")),
        Value::TimestampTz(v) => write!(f, "\"{}\"", v.format("%Y-%m-%d %H:%M:%S%.f+00")),
        Value::String(v) => write!(f, "\"{}\"", v.replace('\\', "\\\\").replace('"', "\\\"")),
        other => write!(f, "{other:?}"),
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.lower_inclusive { "[" } else { "(" })?;
        if let Some(lower) = &self.lower {
            fmt_bound(lower, f)?;
        }
        f.write_str(",")?;
        if let Some(upper) = &self.upper {
            fmt_bound(upper, f)?;
        }
        f.write_str(if self.upper_inclusive { "]" } else { ")" })
    }
}
