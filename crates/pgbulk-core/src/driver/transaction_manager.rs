use std::borrow::Cow;

/// Tracks transaction nesting depth and produces the statement for each
/// transaction lifecycle step.
///
/// The outermost level maps to `BEGIN` / `COMMIT` / `ROLLBACK`; nested levels
/// map to savepoints named `sp_{depth}`, so a bulk call running inside a
/// caller's transaction only rolls back its own work.
#[derive(Debug, Default)]
pub struct TransactionManager {
    depth: u32,
}

impl TransactionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Returns the SQL to begin a transaction or create a savepoint, and
    /// increments the nesting depth.
    pub fn start(&mut self) -> Cow<'static, str> {
        let sql = if self.depth == 0 {
            Cow::Borrowed("BEGIN")
        } else {
            Cow::Owned(format!("SAVEPOINT sp_{}", self.depth))
        };
        self.depth += 1;
        sql
    }

    /// Returns the SQL to commit the current transaction or release a
    /// savepoint, and decrements the nesting depth.
    pub fn commit(&mut self) -> Cow<'static, str> {
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 {
            Cow::Borrowed("COMMIT")
        } else {
            Cow::Owned(format!("RELEASE SAVEPOINT sp_{}", self.depth))
        }
    }

    /// Returns the SQL to roll back the current transaction or savepoint, and
    /// decrements the nesting depth.
    pub fn rollback(&mut self) -> Cow<'static, str> {
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 {
            Cow::Borrowed("ROLLBACK")
        } else {
            Cow::Owned(format!("ROLLBACK TO SAVEPOINT sp_{}", self.depth))
        }
    }
}
