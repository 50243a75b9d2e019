use super::{fallback, nothing_written, pace, Common};
use crate::{plan::Mode, Db, FieldNames, FuncSpec, Outcome, Returning, Values};

use pgbulk_core::{schema::Table, Result};

use std::time::Duration;
use tracing::{debug, debug_span, Instrument};

/// Updates the rows matched by each record's key and creates the others.
///
/// Runs as one `INSERT ... ON CONFLICT` statement per batch when the server
/// supports it and the key fields are covered by a unique constraint.
/// Otherwise each batch locks the matching rows, updates them and inserts
/// the rest inside one transaction.
///
/// Created by [`Db::bulk_upsert`].
#[derive(Debug)]
#[must_use = "a bulk upsert does nothing until `exec` is awaited"]
pub struct BulkUpsert<'a> {
    common: Common<'a>,
    update: bool,
    key_is_unique: bool,
}

impl<'a> BulkUpsert<'a> {
    pub(crate) fn new(db: &'a Db, table: &'a Table, values: Values) -> BulkUpsert<'a> {
        BulkUpsert {
            common: Common::new(db, table, values),
            update: true,
            key_is_unique: true,
        }
    }

    /// Fields locating existing rows, `id` by default.
    pub fn key_fields(mut self, key_fields: impl Into<FieldNames>) -> Self {
        self.common.key_fields(key_fields);
        self
    }

    pub fn using(mut self, alias: impl Into<String>) -> Self {
        self.common.alias = Some(alias.into());
        self
    }

    /// How the new value of `field` combines with the stored one.
    pub fn combine(mut self, field: impl Into<String>, func: impl Into<FuncSpec>) -> Self {
        self.common.combine(field, func);
        self
    }

    /// Whether existing rows are updated. When unset, records whose key
    /// already exists are skipped.
    pub fn update(mut self, update: bool) -> Self {
        self.update = update;
        self
    }

    /// Whether a unique constraint covers exactly the key fields. Without
    /// one, `ON CONFLICT` can't be used.
    pub fn key_is_unique(mut self, key_is_unique: bool) -> Self {
        self.key_is_unique = key_is_unique;
        self
    }

    /// Returns these fields of every written row instead of a count.
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
            "bulk_upsert",
            table = %self.common.table.name,
            records = self.common.values.len()
        );
        self.run().instrument(span).await
    }

    async fn run(self) -> Result<Outcome> {
        let mut prepared = self.common.prepare(Mode::Upsert)?;
        let mut outcome = nothing_written(&prepared.plan);

        if prepared.plan.batch.is_empty() {
            return Ok(outcome);
        }

        let session = prepared.session().await?;
        let on_conflict = session.dialect.insert_on_conflict && self.key_is_unique;
        debug!(
            on_conflict,
            key_is_unique = self.key_is_unique,
            "selected upsert strategy"
        );

        for (i, batch) in prepared.batches().into_iter().enumerate() {
            pace(i, prepared.batch_delay).await;
            debug!(batch = i, size = batch.len(), "upserting batch");

            if on_conflict {
                let query =
                    session
                        .compiler()
                        .insert_on_conflict(&prepared.plan.fields, &batch, self.update)?;
                outcome.merge(session.query(query).await?)?;
            } else {
                fallback::upsert(&session, &prepared.plan, batch, self.update, &mut outcome)
                    .await?;
            }
        }

        Ok(outcome)
    }
}
