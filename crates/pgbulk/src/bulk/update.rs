use super::{nothing_written, pace, Common};
use crate::{filter, plan::Mode, Db, FieldNames, FuncSpec, KeyOps, Outcome, Returning, Values};

use pgbulk_core::{schema::Table, stmt::Expr, Result};

use std::time::Duration;
use tracing::{debug, debug_span, Instrument};

/// Updates existing rows, one statement per batch.
///
/// Created by [`Db::bulk_update`].
#[derive(Debug)]
#[must_use = "a bulk update does nothing until `exec` is awaited"]
pub struct BulkUpdate<'a> {
    common: Common<'a>,
    filter: Option<Expr>,
}

impl<'a> BulkUpdate<'a> {
    pub(crate) fn new(db: &'a Db, table: &'a Table, values: Values) -> BulkUpdate<'a> {
        BulkUpdate {
            common: Common::new(db, table, values),
            filter: None,
        }
    }

    /// Fields locating the updated rows, `id` by default.
    pub fn key_fields(mut self, key_fields: impl Into<FieldNames>) -> Self {
        self.common.key_fields(key_fields);
        self
    }

    /// Operators comparing each key field with the record's key value.
    pub fn key_ops(mut self, key_ops: impl Into<KeyOps>) -> Self {
        self.common.args.key_ops = key_ops.into();
        self
    }

    /// Connection to run on.
    pub fn using(mut self, alias: impl Into<String>) -> Self {
        self.common.alias = Some(alias.into());
        self
    }

    /// How the new value of `field` combines with the stored one.
    pub fn combine(mut self, field: impl Into<String>, func: impl Into<FuncSpec>) -> Self {
        self.common.combine(field, func);
        self
    }

    /// Restricts the updated rows further. The expression may only read the
    /// updated table.
    pub fn filter(mut self, filter: Expr) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Returns these fields of every updated row instead of a count.
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
            "bulk_update",
            table = %self.common.table.name,
            records = self.common.values.len()
        );
        self.run().instrument(span).await
    }

    async fn run(self) -> Result<Outcome> {
        let table = self.common.table;
        let filter = self
            .filter
            .map(|filter| filter::validate(table, filter))
            .transpose()?;

        let mut prepared = self.common.prepare(Mode::Update)?;
        let mut outcome = nothing_written(&prepared.plan);

        if prepared.plan.batch.is_empty() {
            return Ok(outcome);
        }

        if prepared.plan.fields.update.is_empty() {
            debug!("no field to update");
            if let Outcome::Count(count) = &mut outcome {
                *count = prepared.plan.batch.len() as u64;
            }
            return Ok(outcome);
        }

        let session = prepared.session().await?;
        let compiler = session.compiler();

        for (i, batch) in prepared.batches().into_iter().enumerate() {
            pace(i, prepared.batch_delay).await;
            debug!(batch = i, size = batch.len(), "updating batch");

            let query = compiler.update(&prepared.plan.fields, &batch, filter.as_ref())?;
            outcome.merge(session.query(query).await?)?;
        }

        Ok(outcome)
    }
}
