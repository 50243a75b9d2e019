use postgres::types::{private::BytesMut, to_sql_checked, FromSql, IsNull, Kind, ToSql, Type};
use pgbulk_core::stmt::{Value as CoreValue, ValueRange};
use rust_decimal::Decimal;

use std::collections::HashMap;

type BoxError = Box<dyn std::error::Error + Sync + Send>;

/// A parameter bound to a statement.
///
/// Statements leave parameter types to the server, so the encoding follows
/// the type the server inferred for the placeholder.
#[derive(Debug)]
pub(crate) struct Param<'a>(pub(crate) &'a CoreValue);

impl ToSql for Param<'_> {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self.0 {
            CoreValue::Null => Ok(IsNull::Yes),
            CoreValue::Bool(value) => value.to_sql_checked(ty, out),
            CoreValue::I16(value) => int_to_sql(i64::from(*value), ty, out),
            CoreValue::I32(value) => int_to_sql(i64::from(*value), ty, out),
            CoreValue::I64(value) => int_to_sql(*value, ty, out),
            CoreValue::F64(value) => match *ty {
                Type::FLOAT4 => (*value as f32).to_sql(ty, out),
                Type::NUMERIC => Decimal::try_from(*value)?.to_sql(ty, out),
                _ => value.to_sql_checked(ty, out),
            },
            CoreValue::Decimal(value) => value.to_sql_checked(ty, out),
            CoreValue::String(value) => value.to_sql_checked(ty, out),
            CoreValue::Bytes(value) => value.to_sql_checked(ty, out),
            CoreValue::Uuid(value) => value.to_sql_checked(ty, out),
            CoreValue::Date(value) => value.to_sql_checked(ty, out),
            CoreValue::Time(value) => value.to_sql_checked(ty, out),
            CoreValue::Timestamp(value) => value.to_sql_checked(ty, out),
            CoreValue::TimestampTz(value) => match *ty {
                Type::TIMESTAMP => value.naive_utc().to_sql(ty, out),
                _ => value.to_sql_checked(ty, out),
            },
            CoreValue::Json(value) => match *ty {
                Type::TEXT | Type::VARCHAR => value.to_string().to_sql(ty, out),
                _ => value.to_sql_checked(ty, out),
            },
            CoreValue::HStore(value) => value
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect::<HashMap<_, _>>()
                .to_sql_checked(ty, out),
            // Ranges are sent as text literals and cast by the statement
            CoreValue::Range(value) => value.to_string().to_sql_checked(ty, out),
            CoreValue::List(values) => values
                .iter()
                .map(Param)
                .collect::<Vec<_>>()
                .to_sql_checked(ty, out),
        }
    }

    fn accepts(_: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn int_to_sql(value: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 => i16::try_from(value)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(value)?.to_sql(ty, out),
        Type::INT8 => value.to_sql(ty, out),
        Type::FLOAT4 => (value as f32).to_sql(ty, out),
        Type::FLOAT8 => (value as f64).to_sql(ty, out),
        Type::NUMERIC => Decimal::from(value).to_sql(ty, out),
        Type::TEXT | Type::VARCHAR => value.to_string().to_sql(ty, out),
        _ => Err(format!("can not bind integer {value} as {ty}").into()),
    }
}

/// A value read from a result row, decoded by its column type.
#[derive(Debug)]
pub(crate) struct Decoded(pub(crate) CoreValue);

impl<'a> FromSql<'a> for Decoded {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        let value = match *ty {
            Type::BOOL => CoreValue::Bool(bool::from_sql(ty, raw)?),
            Type::INT2 => CoreValue::I16(i16::from_sql(ty, raw)?),
            Type::INT4 => CoreValue::I32(i32::from_sql(ty, raw)?),
            Type::INT8 => CoreValue::I64(i64::from_sql(ty, raw)?),
            Type::FLOAT4 => CoreValue::F64(f64::from(f32::from_sql(ty, raw)?)),
            Type::FLOAT8 => CoreValue::F64(f64::from_sql(ty, raw)?),
            Type::NUMERIC => CoreValue::Decimal(Decimal::from_sql(ty, raw)?),
            Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
                CoreValue::String(String::from_sql(ty, raw)?)
            }
            Type::BYTEA => CoreValue::Bytes(Vec::<u8>::from_sql(ty, raw)?),
            Type::UUID => CoreValue::Uuid(FromSql::from_sql(ty, raw)?),
            Type::DATE => CoreValue::Date(FromSql::from_sql(ty, raw)?),
            Type::TIME => CoreValue::Time(FromSql::from_sql(ty, raw)?),
            Type::TIMESTAMP => CoreValue::Timestamp(FromSql::from_sql(ty, raw)?),
            Type::TIMESTAMPTZ => CoreValue::TimestampTz(FromSql::from_sql(ty, raw)?),
            Type::JSON | Type::JSONB => CoreValue::Json(FromSql::from_sql(ty, raw)?),
            _ => match ty.kind() {
                Kind::Array(_) => CoreValue::List(
                    Vec::<Decoded>::from_sql(ty, raw)?
                        .into_iter()
                        .map(|value| value.0)
                        .collect(),
                ),
                Kind::Range(elem) => match range_from_sql(elem, raw)? {
                    Some(range) => CoreValue::Range(range),
                    None => CoreValue::Null,
                },
                _ if ty.name() == "hstore" => CoreValue::HStore(
                    HashMap::<String, Option<String>>::from_sql(ty, raw)?
                        .into_iter()
                        .collect(),
                ),
                _ => return Err(format!("can not decode a value of type {ty}").into()),
            },
        };

        Ok(Decoded(value))
    }

    fn from_sql_null(_: &Type) -> Result<Self, BoxError> {
        Ok(Decoded(CoreValue::Null))
    }

    fn accepts(_: &Type) -> bool {
        true
    }
}

const RANGE_EMPTY: u8 = 0x01;
const RANGE_LB_INC: u8 = 0x02;
const RANGE_UB_INC: u8 = 0x04;
const RANGE_LB_INF: u8 = 0x08;
const RANGE_UB_INF: u8 = 0x10;

/// Decodes the binary range format. Empty ranges decode as `None`.
fn range_from_sql(elem: &Type, raw: &[u8]) -> Result<Option<ValueRange>, BoxError> {
    let (&flags, mut rest) = raw.split_first().ok_or("invalid range: no flags")?;

    if flags & RANGE_EMPTY != 0 {
        return Ok(None);
    }

    let lower = if flags & RANGE_LB_INF == 0 {
        Some(Box::new(read_bound(elem, &mut rest)?))
    } else {
        None
    };
    let upper = if flags & RANGE_UB_INF == 0 {
        Some(Box::new(read_bound(elem, &mut rest)?))
    } else {
        None
    };

    Ok(Some(ValueRange {
        lower,
        upper,
        lower_inclusive: flags & RANGE_LB_INC != 0,
        upper_inclusive: flags & RANGE_UB_INC != 0,
    }))
}

fn read_bound(elem: &Type, buf: &mut &[u8]) -> Result<CoreValue, BoxError> {
    let data = *buf;
    if data.len() < 4 {
        return Err("invalid range: truncated bound length".into());
    }
    let (len, rest) = data.split_at(4);
    let len = i32::from_be_bytes([len[0], len[1], len[2], len[3]]);
    let len = usize::try_from(len)?;

    if rest.len() < len {
        return Err("invalid range: truncated bound".into());
    }
    let (bound, rest) = rest.split_at(len);
    *buf = rest;

    Ok(Decoded::from_sql(elem, bound)?.0)
}
