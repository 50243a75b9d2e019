use super::{Value, ValueRange};
use crate::{schema::Type, Error, Result};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use std::str::FromStr;

const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

impl Value {
    /// Converts the value to the representation stored in a column of type
    /// `ty`.
    ///
    /// Null passes through unchanged. Integers widen or narrow with a range
    /// check, strings are parsed for numeric, uuid and temporal columns, and
    /// two-element lists become ranges.
    pub fn coerce(self, ty: &Type) -> Result<Value> {
        if self.is_null() {
            return Ok(self);
        }

        let to_type = || ty.to_string();

        match ty {
            Type::Boolean => match self {
                Value::Bool(_) => Ok(self),
                Value::String(ref s) => match s.as_str() {
                    "true" | "t" => Ok(Value::Bool(true)),
                    "false" | "f" => Ok(Value::Bool(false)),
                    _ => Err(Error::type_conversion(self, to_type())),
                },
                _ => Err(Error::type_conversion(self, to_type())),
            },
            Type::SmallInt => self
                .integer()
                .and_then(|v| i16::try_from(v).ok())
                .map(Value::I16)
                .ok_or_else(|| Error::type_conversion(self, to_type())),
            Type::Integer => self
                .integer()
                .and_then(|v| i32::try_from(v).ok())
                .map(Value::I32)
                .ok_or_else(|| Error::type_conversion(self, to_type())),
            Type::BigInt => self
                .integer()
                .map(Value::I64)
                .ok_or_else(|| Error::type_conversion(self, to_type())),
            Type::Real | Type::DoublePrecision => {
                let v = match &self {
                    Value::F64(v) => Some(*v),
                    Value::Decimal(v) => v.to_f64(),
                    Value::String(s) => s.trim().parse().ok(),
                    other => other.as_i64().map(|v| v as f64),
                };
                v.map(Value::F64)
                    .ok_or_else(|| Error::type_conversion(self, to_type()))
            }
            Type::Numeric(_) => {
                let v = match &self {
                    Value::Decimal(v) => Some(*v),
                    Value::F64(v) => Decimal::try_from(*v).ok(),
                    Value::String(s) => Decimal::from_str(s.trim()).ok(),
                    other => other.as_i64().map(Decimal::from),
                };
                v.map(Value::Decimal)
                    .ok_or_else(|| Error::type_conversion(self, to_type()))
            }
            Type::Text | Type::VarChar(_) => match self {
                Value::String(_) => Ok(self),
                Value::Uuid(v) => Ok(Value::String(v.to_string())),
                _ => Err(Error::type_conversion(self, to_type())),
            },
            Type::Bytea => match self {
                Value::Bytes(_) => Ok(self),
                Value::String(s) => Ok(Value::Bytes(s.into_bytes())),
                _ => Err(Error::type_conversion(self, to_type())),
            },
            Type::Uuid => match self {
                Value::Uuid(_) => Ok(self),
                Value::String(ref s) => match uuid::Uuid::parse_str(s) {
                    Ok(v) => Ok(Value::Uuid(v)),
                    Err(_) => Err(Error::type_conversion(self, to_type())),
                },
                _ => Err(Error::type_conversion(self, to_type())),
            },
            Type::Date => {
                let v = match &self {
                    Value::Date(v) => Some(*v),
                    Value::Timestamp(v) => Some(v.date()),
                    Value::TimestampTz(v) => Some(v.date_naive()),
                    Value::String(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").ok(),
                    _ => None,
                };
                v.map(Value::Date)
                    .ok_or_else(|| Error::type_conversion(self, to_type()))
            }
            Type::Time => {
                let v = match &self {
                    Value::Time(v) => Some(*v),
                    Value::String(s) => NaiveTime::parse_from_str(s, "%H:%M:%S%.f").ok(),
                    _ => None,
                };
                v.map(Value::Time)
                    .ok_or_else(|| Error::type_conversion(self, to_type()))
            }
            Type::Timestamp => {
                let v = match &self {
                    Value::Timestamp(v) => Some(*v),
                    Value::TimestampTz(v) => Some(v.naive_utc()),
                    Value::Date(v) => v.and_hms_opt(0, 0, 0),
                    Value::String(s) => parse_naive_timestamp(s),
                    _ => None,
                };
                v.map(Value::Timestamp)
                    .ok_or_else(|| Error::type_conversion(self, to_type()))
            }
            Type::Timestamptz => {
                let v = match &self {
                    Value::TimestampTz(v) => Some(*v),
                    Value::Timestamp(v) => Some(v.and_utc()),
                    Value::Date(v) => v.and_hms_opt(0, 0, 0).map(|v| v.and_utc()),
                    Value::String(s) => DateTime::parse_from_rfc3339(s)
                        .map(|v| v.with_timezone(&Utc))
                        .ok()
                        .or_else(|| parse_naive_timestamp(s).map(|v| v.and_utc())),
                    _ => None,
                };
                v.map(Value::TimestampTz)
                    .ok_or_else(|| Error::type_conversion(self, to_type()))
            }
            Type::Json | Type::Jsonb => match self {
                Value::Json(_) => Ok(self),
                other => Ok(Value::Json(other.to_json())),
            },
            Type::HStore => match self {
                Value::HStore(_) => Ok(self),
                Value::Json(serde_json::Value::Object(ref object)) => {
                    Ok(Value::HStore(Value::json_to_hstore(object)))
                }
                _ => Err(Error::type_conversion(self, to_type())),
            },
            Type::IntRange
            | Type::BigIntRange
            | Type::NumRange
            | Type::DateRange
            | Type::TsRange
            | Type::TstzRange => {
                // Checked by the match arm
                let Some(subtype) = ty.range_subtype() else {
                    return Err(Error::type_conversion(self, to_type()));
                };
                let coerce_bound = |bound: Option<Box<Value>>| -> Result<Option<Box<Value>>> {
                    bound
                        .map(|b| b.coerce(&subtype).map(Box::new))
                        .transpose()
                };

                match self {
                    Value::Range(range) => Ok(Value::Range(ValueRange {
                        lower: coerce_bound(range.lower)?,
                        upper: coerce_bound(range.upper)?,
                        ..range
                    })),
                    Value::List(items) if items.len() == 2 => {
                        let mut items = items.into_iter();
                        let lower = items.next().map(|v| v.coerce(&subtype)).transpose()?;
                        let upper = items.next().map(|v| v.coerce(&subtype)).transpose()?;
                        Ok(Value::Range(ValueRange::from_bounds(lower, upper)))
                    }
                    other => Err(Error::type_conversion(other, to_type())),
                }
            }
            Type::Array(elem) => match self {
                Value::List(items) => items
                    .into_iter()
                    .map(|item| item.coerce(elem))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::List),
                other => Err(Error::type_conversion(other, to_type())),
            },
        }
    }

    fn integer(&self) -> Option<i64> {
        match self {
            Value::String(s) => s.trim().parse().ok(),
            Value::F64(v) if v.fract() == 0.0 => Some(*v as i64),
            Value::Decimal(v) if v.fract().is_zero() => v.to_i64(),
            other => other.as_i64(),
        }
    }
}

fn parse_naive_timestamp(s: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
}
