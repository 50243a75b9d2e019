use super::{ColumnDefault, Type};
use crate::stmt::Value;

/// A column of a [`Table`](super::Table).
///
/// `name` is the logical field name callers use in values, key fields and
/// returning lists. `column` is the name stored in the database; it defaults
/// to the field name.
#[derive(Debug, Clone)]
pub struct Column {
    /// Logical field name
    pub name: String,

    /// Storage column name
    pub column: String,

    /// Storage type
    pub ty: Type,

    /// True if the column may hold NULL
    pub nullable: bool,

    /// True if the column is part of the primary key
    pub primary_key: bool,

    /// True if the database assigns the value (`serial`, identity)
    pub auto_increment: bool,

    /// Set to the current time on every write
    pub auto_now: bool,

    /// Set to the current time when the row is first written
    pub auto_now_add: bool,

    /// False for columns that are not backed by storage
    pub concrete: bool,

    /// Application-side default
    pub default: Option<ColumnDefault>,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: Type) -> Column {
        let name = name.into();
        Column {
            column: name.clone(),
            name,
            ty,
            nullable: false,
            primary_key: false,
            auto_increment: false,
            auto_now: false,
            auto_now_add: false,
            concrete: true,
            default: None,
        }
    }

    pub fn db_column(mut self, column: impl Into<String>) -> Column {
        self.column = column.into();
        self
    }

    pub fn nullable(mut self) -> Column {
        self.nullable = true;
        self
    }

    pub fn primary_key(mut self) -> Column {
        self.primary_key = true;
        self
    }

    pub fn auto_increment(mut self) -> Column {
        self.auto_increment = true;
        self
    }

    pub fn auto_now(mut self) -> Column {
        self.auto_now = true;
        self
    }

    pub fn auto_now_add(mut self) -> Column {
        self.auto_now_add = true;
        self
    }

    pub fn virtual_column(mut self) -> Column {
        self.concrete = false;
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Column {
        self.default = Some(ColumnDefault::Static(value.into()));
        self
    }

    /// Sets a default that is evaluated once per written row.
    pub fn default_fn(mut self, f: impl Fn() -> Value + Send + Sync + 'static) -> Column {
        self.default = Some(ColumnDefault::generated(f));
        self
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Columns the compiler must always write, even if absent from input.
    pub fn is_auto_set(&self) -> bool {
        self.auto_now || self.auto_now_add
    }
}
