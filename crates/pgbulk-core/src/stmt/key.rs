use super::Value;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// The ordered tuple of key values identifying one input record.
///
/// Position `i` holds the value compared against the `i`-th key field. A
/// value may itself be a list when the key field's operator takes several
/// values (`in`, `between`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Key(pub Vec<Value>);

impl Key {
    pub fn new(values: Vec<Value>) -> Key {
        Key(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    pub fn into_values(self) -> Vec<Value> {
        self.0
    }
}

impl From<Value> for Key {
    fn from(value: Value) -> Key {
        Key(vec![value])
    }
}

impl From<Vec<Value>> for Key {
    fn from(values: Vec<Value>) -> Key {
        Key(values)
    }
}

macro_rules! impl_scalar_key {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Key {
                fn from(value: $ty) -> Key {
                    Key(vec![Value::from(value)])
                }
            }
        )*
    };
}

impl_scalar_key!(
    bool,
    i16,
    i32,
    i64,
    f64,
    Decimal,
    String,
    &str,
    Uuid,
    NaiveDate,
    NaiveDateTime,
    DateTime<Utc>
);

macro_rules! impl_tuple_key {
    ($($name:ident),+) => {
        impl<$($name: Into<Value>),+> From<($($name,)+)> for Key {
            #[allow(non_snake_case)]
            fn from(($($name,)+): ($($name,)+)) -> Key {
                Key(vec![$($name.into()),+])
            }
        }
    };
}

impl_tuple_key!(A, B);
impl_tuple_key!(A, B, C);
impl_tuple_key!(A, B, C, D);
