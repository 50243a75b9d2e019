mod insert;
pub use insert::Insert;

mod query_sql;
pub use query_sql::QuerySql;

mod transaction;
pub use transaction::Transaction;

#[derive(Debug, Clone)]
pub enum Operation {
    /// Insert new rows. Drivers render the statement for their dialect.
    Insert(Insert),

    /// Execute a SQL statement
    QuerySql(QuerySql),

    /// Execute a transaction lifecycle op
    Transaction(Transaction),
}

impl Operation {
    pub fn as_query_sql(&self) -> Option<&QuerySql> {
        match self {
            Operation::QuerySql(op) => Some(op),
            _ => None,
        }
    }

    pub fn as_insert(&self) -> Option<&Insert> {
        match self {
            Operation::Insert(op) => Some(op),
            _ => None,
        }
    }

    pub fn as_transaction(&self) -> Option<&Transaction> {
        match self {
            Operation::Transaction(op) => Some(op),
            _ => None,
        }
    }
}
