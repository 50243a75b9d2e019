use super::Operation;

use crate::{schema::Table, stmt::Expr};

/// Inserts one row per entry of `rows`.
///
/// Every row holds one expression per entry of `columns` (field names of
/// `table`), in the same order.
#[derive(Debug, Clone)]
pub struct Insert {
    pub table: Table,

    pub columns: Vec<String>,

    pub rows: Vec<Vec<Expr>>,

    /// Field names to return for each inserted row
    pub returning: Option<Vec<String>>,
}

impl From<Insert> for Operation {
    fn from(value: Insert) -> Self {
        Self::Insert(value)
    }
}
