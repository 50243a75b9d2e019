use std::collections::HashMap;

use postgres::{Error, Statement};
use tokio_postgres::Client;

/// Prepared statements by SQL text.
///
/// Batches of the same size compile to the same SQL, so a chunked bulk call
/// prepares its statement once. The cache is cleared when it reaches its
/// capacity.
#[derive(Debug, Clone)]
pub struct StatementCache {
    map: HashMap<String, Statement>,
    capacity: usize,
}

impl StatementCache {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            map: HashMap::new(),
            capacity,
        }
    }

    pub fn get(&self, query: &str) -> Option<Statement> {
        self.map.get(query).map(ToOwned::to_owned)
    }

    pub fn insert(&mut self, query: &str, statement: Statement) {
        if self.map.len() >= self.capacity {
            self.map.clear();
        }
        self.map.insert(query.to_string(), statement);
    }

    pub async fn prepare(&mut self, client: &Client, query: &str) -> Result<Statement, Error> {
        if let Some(statement) = self.get(query) {
            Ok(statement)
        } else {
            let stmt = client.prepare(query).await?;
            self.insert(query, stmt.clone());
            Ok(stmt)
        }
    }
}
