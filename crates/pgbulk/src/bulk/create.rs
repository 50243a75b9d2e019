use super::{nothing_written, pace, Common};
use crate::{plan::Mode, Db, FuncSpec, Outcome, Returning, Values};

use pgbulk_core::{schema::Table, Result};

use std::time::Duration;
use tracing::{debug, debug_span, Instrument};

/// Creates one row per record, one statement per batch.
///
/// Records carry no key; columns they don't write take their default.
///
/// Created by [`Db::bulk_create`].
#[derive(Debug)]
#[must_use = "a bulk create does nothing until `exec` is awaited"]
pub struct BulkCreate<'a> {
    common: Common<'a>,
}

impl<'a> BulkCreate<'a> {
    pub(crate) fn new(db: &'a Db, table: &'a Table, values: Values) -> BulkCreate<'a> {
        BulkCreate {
            common: Common::new(db, table, values),
        }
    }

    pub fn using(mut self, alias: impl Into<String>) -> Self {
        self.common.alias = Some(alias.into());
        self
    }

    /// How the written value of `field` is computed.
    pub fn combine(mut self, field: impl Into<String>, func: impl Into<FuncSpec>) -> Self {
        self.common.combine(field, func);
        self
    }

    /// Returns these fields of every created row instead of a count.
    pub fn returning(mut self, fields: impl Into<Returning>) -> Self {
        self.common.returning(fields);
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.common.batch_size = Some(size);
        self
    }

    pub fn batch_delay(mut self, delay: Duration) -> Self {
        self.common.batch_delay = delay;
        self
    }

    pub async fn exec(self) -> Result<Outcome> {
        let span = debug_span!(
            "bulk_create",
            table = %self.common.table.name,
            records = self.common.values.len()
        );
        self.run().instrument(span).await
    }

    async fn run(self) -> Result<Outcome> {
        let mut prepared = self.common.prepare(Mode::Create)?;
        let mut outcome = nothing_written(&prepared.plan);

        if prepared.plan.batch.is_empty() {
            return Ok(outcome);
        }

        let session = prepared.session().await?;
        let compiler = session.compiler();

        for (i, batch) in prepared.batches().into_iter().enumerate() {
            pace(i, prepared.batch_delay).await;
            debug!(batch = i, size = batch.len(), "creating batch");

            let query = compiler.insert(&prepared.plan.fields, &batch)?;
            outcome.merge(session.query(query).await?)?;
        }

        Ok(outcome)
    }
}
