use pgbulk_core::{
    schema::Type,
    stmt::{Value, ValueRange},
};

use chrono::{DateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// Values substituted for NULL when a function combines the incoming value
/// with the one already stored, e.g. `COALESCE("counter", 0) + 1`.
///
/// Every type has a builtin zero value. Entries can be replaced per type.
#[derive(Debug, Clone, Default)]
pub struct NullDefaults {
    overrides: HashMap<Type, Value>,
}

impl NullDefaults {
    pub fn new() -> NullDefaults {
        NullDefaults::default()
    }

    /// Replaces the value used for columns of type `ty`.
    pub fn set(&mut self, ty: Type, value: impl Into<Value>) -> &mut Self {
        self.overrides.insert(ty, value.into());
        self
    }

    pub fn get(&self, ty: &Type) -> Option<Value> {
        self.overrides
            .get(ty)
            .cloned()
            .or_else(|| builtin(ty))
    }
}

fn builtin(ty: &Type) -> Option<Value> {
    let epoch = DateTime::<Utc>::UNIX_EPOCH;

    Some(match ty {
        Type::Boolean => Value::Bool(false),
        Type::SmallInt => Value::I16(0),
        Type::Integer => Value::I32(0),
        Type::BigInt => Value::I64(0),
        Type::Real | Type::DoublePrecision => Value::F64(0.0),
        Type::Numeric(_) => Value::Decimal(Decimal::ZERO),
        Type::Text | Type::VarChar(_) => Value::String(String::new()),
        Type::Bytea => Value::Bytes(vec![]),
        Type::Date => Value::Date(epoch.date_naive()),
        Type::Time => Value::Time(NaiveTime::MIN),
        Type::Timestamp => Value::Timestamp(epoch.naive_utc()),
        Type::Timestamptz => Value::TimestampTz(epoch),
        Type::Json | Type::Jsonb => Value::Json(serde_json::json!({})),
        Type::HStore => Value::HStore(BTreeMap::new()),
        Type::Array(_) => Value::List(vec![]),
        Type::IntRange => Value::Range(ValueRange::new(0i32, 0i32)),
        Type::BigIntRange => Value::Range(ValueRange::new(0i64, 0i64)),
        Type::NumRange => Value::Range(ValueRange::new(Decimal::ZERO, Decimal::ZERO)),
        Type::DateRange => Value::Range(ValueRange::new(epoch.date_naive(), epoch.date_naive())),
        Type::TsRange => Value::Range(ValueRange::new(epoch.naive_utc(), epoch.naive_utc())),
        Type::TstzRange => Value::Range(ValueRange::new(epoch, epoch)),
        Type::Uuid => return None,
    })
}
