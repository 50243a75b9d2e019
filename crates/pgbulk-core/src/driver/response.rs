use crate::{stmt::Value, Error, Result};

#[derive(Debug, Clone)]
pub struct Response {
    pub rows: Rows,
}

#[derive(Debug, Clone)]
pub enum Rows {
    /// Number of rows impacted by the operation
    Count(u64),

    /// Rows produced by the operation, one `Vec` of column values per row
    Values(Vec<Vec<Value>>),
}

impl Response {
    pub fn count(count: u64) -> Self {
        Self {
            rows: Rows::Count(count),
        }
    }

    pub fn values(rows: Vec<Vec<Value>>) -> Self {
        Self {
            rows: Rows::Values(rows),
        }
    }

    pub fn empty_values() -> Self {
        Self::values(vec![])
    }
}

impl Rows {
    pub fn is_count(&self) -> bool {
        matches!(self, Self::Count(_))
    }

    pub fn is_values(&self) -> bool {
        matches!(self, Self::Values(_))
    }

    /// Number of rows affected: the count, or the number of returned rows.
    pub fn affected(&self) -> u64 {
        match self {
            Rows::Count(count) => *count,
            Rows::Values(rows) => rows.len() as u64,
        }
    }

    pub fn into_values(self) -> Result<Vec<Vec<Value>>> {
        match self {
            Rows::Values(rows) => Ok(rows),
            Rows::Count(_) => Err(Error::invalid_result(
                "expected rows, but the operation returned a count",
            )),
        }
    }
}
