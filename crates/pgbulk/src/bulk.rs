mod create;
pub use create::BulkCreate;

mod fallback;

mod update;
pub use update::BulkUpdate;

mod upsert;
pub use upsert::BulkUpsert;

use crate::{
    plan::{Args, Mode, Plan},
    Db, FieldNames, FuncSpec, Outcome, Returning, Values,
};

use pgbulk_core::{
    driver::{
        operation::{Insert, QuerySql, Transaction},
        Driver, Operation, Rows,
    },
    schema::Table,
    Error, Result,
};
use pgbulk_sql::{Batch, Compiler, Dialect, NullDefaults};

use std::{sync::Arc, time::Duration};
use tracing::debug;

/// Options shared by the three bulk builders.
#[derive(Debug)]
struct Common<'a> {
    db: &'a Db,
    table: &'a Table,
    values: Values,
    args: Args,

    /// Connection alias, the default connection when unset
    alias: Option<String>,

    /// Maximum number of records per statement, all of them when unset
    batch_size: Option<usize>,

    /// Pause between two consecutive batches
    batch_delay: Duration,
}

/// A validated call, ready to run.
struct Prepared<'a> {
    driver: &'a Arc<dyn Driver>,
    null_defaults: &'a NullDefaults,
    table: &'a Table,
    plan: Plan,
    batch_size: usize,
    batch_delay: Duration,
}

impl<'a> Common<'a> {
    fn new(db: &'a Db, table: &'a Table, values: Values) -> Common<'a> {
        Common {
            db,
            table,
            values,
            args: Args::default(),
            alias: None,
            batch_size: None,
            batch_delay: Duration::ZERO,
        }
    }

    fn key_fields(&mut self, key_fields: impl Into<FieldNames>) {
        self.args.key_fields = key_fields.into();
    }

    fn combine(&mut self, field: impl Into<String>, func: impl Into<FuncSpec>) {
        self.args.functions.insert(field.into(), func.into());
    }

    fn returning(&mut self, fields: impl Into<Returning>) {
        self.args.returning = Some(fields.into());
    }

    /// Checks every argument and canonicalizes the records. Nothing is sent
    /// to the database.
    fn prepare(self, mode: Mode) -> Result<Prepared<'a>> {
        let batch_size = match self.batch_size {
            Some(0) => return Err(Error::invalid_argument("batch size must be positive")),
            Some(size) => size,
            None => 0,
        };

        let driver = self.db.driver(self.alias.as_deref())?;

        if self.args.returning.is_some() && !driver.capability().returning {
            return Err(Error::precondition(
                "returning rows requires a database supporting RETURNING",
            ));
        }

        let plan = Plan::new(self.table, mode, self.values, &self.args)?;

        Ok(Prepared {
            driver,
            null_defaults: self.db.null_defaults(),
            table: self.table,
            plan,
            batch_size,
            batch_delay: self.batch_delay,
        })
    }
}

impl<'a> Prepared<'a> {
    /// Negotiates the dialect with the server. Called once per bulk call,
    /// only when there is something to write.
    async fn session(&self) -> Result<Session<'a>> {
        let version = self.driver.server_version().await?;
        let dialect = Dialect::new(self.driver.capability(), version);
        debug!(%version, on_conflict = dialect.insert_on_conflict, "negotiated dialect");

        Ok(Session {
            driver: &**self.driver,
            table: self.table,
            null_defaults: self.null_defaults,
            dialect,
        })
    }

    /// Takes the records out of the plan, split in batches.
    fn batches(&mut self) -> Vec<Batch> {
        std::mem::take(&mut self.plan.batch).chunks(self.batch_size)
    }
}

/// Runs the statements of one bulk call on one connection.
struct Session<'a> {
    driver: &'a dyn Driver,
    table: &'a Table,
    null_defaults: &'a NullDefaults,
    dialect: Dialect,
}

impl Session<'_> {
    fn compiler(&self) -> Compiler<'_> {
        Compiler::new(self.table, &self.dialect, self.null_defaults)
    }

    async fn query(&self, query: QuerySql) -> Result<Rows> {
        debug!(sql = %query.sql, params = ?query.params, "executing statement");
        self.exec(query).await
    }

    async fn insert(&self, insert: Insert) -> Result<Rows> {
        debug!(table = %insert.table.name, rows = insert.rows.len(), "inserting rows");
        self.exec(insert).await
    }

    async fn transaction(&self, op: Transaction) -> Result<()> {
        debug!(?op, "transaction");
        self.exec(op).await.map(|_| ())
    }

    async fn exec(&self, op: impl Into<Operation>) -> Result<Rows> {
        Ok(self.driver.exec(op.into()).await?.rows)
    }
}

/// Waits before every batch but the first.
async fn pace(index: usize, delay: Duration) {
    if index > 0 && !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// The outcome of a call that writes nothing.
fn nothing_written(plan: &Plan) -> Outcome {
    Outcome::empty(plan.returning())
}
