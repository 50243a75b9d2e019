use super::Operation;

use crate::{schema::Type, stmt::Value};

#[derive(Debug, Clone)]
pub struct QuerySql {
    /// The SQL statement, with `$n` placeholders
    pub sql: String,

    /// Bound parameters; `params[n - 1]` binds `$n`
    pub params: Vec<Value>,

    /// Column types of the returned rows. `None` when the statement returns a
    /// row count.
    pub ret: Option<Vec<Type>>,
}

impl From<QuerySql> for Operation {
    fn from(value: QuerySql) -> Self {
        Self::QuerySql(value)
    }
}
