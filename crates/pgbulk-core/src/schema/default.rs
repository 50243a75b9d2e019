use crate::stmt::Value;

use std::{fmt, sync::Arc};

/// Application-side default of a column.
///
/// A `Static` default produces the same value for every row and is emitted
/// once per statement. A `Generated` default is evaluated again for each row,
/// e.g. a random identifier.
#[derive(Clone)]
pub enum ColumnDefault {
    Static(Value),
    Generated(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl ColumnDefault {
    pub fn generated(f: impl Fn() -> Value + Send + Sync + 'static) -> ColumnDefault {
        ColumnDefault::Generated(Arc::new(f))
    }

    /// Returns true when each evaluation may produce a different value.
    pub fn is_mutable(&self) -> bool {
        matches!(self, ColumnDefault::Generated(_))
    }

    pub fn eval(&self) -> Value {
        match self {
            ColumnDefault::Static(value) => value.clone(),
            ColumnDefault::Generated(f) => f(),
        }
    }
}

impl fmt::Debug for ColumnDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnDefault::Static(value) => f.debug_tuple("Static").field(value).finish(),
            ColumnDefault::Generated(_) => f.write_str("Generated(..)"),
        }
    }
}
