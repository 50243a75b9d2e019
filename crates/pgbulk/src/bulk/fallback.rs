//! Upsert for servers or tables where `INSERT ... ON CONFLICT` is not an
//! option.
//!
//! Inside one transaction, the rows matching the batch keys are selected
//! and locked, records with an existing key update them through the bulk
//! UPDATE statement, and the remaining records are inserted as new rows.
//! Concurrent upserts of overlapping keys serialize on the row locks.

use super::Session;
use crate::{
    plan::Plan,
    predicate::{predicate, KeyEntry},
    Outcome,
};

use pgbulk_core::{
    driver::operation::{Insert, Transaction},
    stmt::{Expr, Key},
    Result,
};
use pgbulk_sql::{Batch, ClauseOperator, FieldDescriptor, FieldSet};

use std::collections::HashSet;
use tracing::{debug, warn};

pub(super) async fn upsert(
    session: &Session<'_>,
    plan: &Plan,
    batch: Batch,
    update: bool,
    outcome: &mut Outcome,
) -> Result<()> {
    session.transaction(Transaction::Start).await?;

    match run(session, plan, batch, update, outcome).await {
        Ok(()) => session.transaction(Transaction::Commit).await,
        Err(err) => {
            if let Err(rollback) = session.transaction(Transaction::Rollback).await {
                warn!(error = %rollback, "rollback after a failed upsert failed");
            }
            Err(err)
        }
    }
}

async fn run(
    session: &Session<'_>,
    plan: &Plan,
    batch: Batch,
    update: bool,
    outcome: &mut Outcome,
) -> Result<()> {
    let fields = &plan.fields;
    let compiler = session.compiler();

    let key_fields: Vec<String> = fields.key.iter().map(|fd| fd.name().to_string()).collect();
    let operators = vec![ClauseOperator::Eq; key_fields.len()];
    let existing = predicate(&key_fields, &operators, batch.keys().map(KeyEntry::from))?;

    let query = compiler.select_for_update(&existing, &fields.key)?;
    let existing: HashSet<Key> = session
        .query(query)
        .await?
        .into_values()?
        .into_iter()
        .map(Key::new)
        .collect();

    let (existing, missing) = batch.partition(|key| existing.contains(key));
    debug!(existing = existing.len(), missing = missing.len(), "partitioned batch");

    if update && !fields.update.is_empty() && !existing.is_empty() {
        let query = compiler.update(fields, &existing, None)?;
        outcome.merge(session.query(query).await?)?;
    }

    if !missing.is_empty() {
        let insert = create_rows(session, fields, missing, plan.returning())?;
        outcome.merge(session.insert(insert).await?)?;
    }

    Ok(())
}

/// Builds the rows created for records whose key doesn't exist yet. Key
/// values win over update values written to the same column, functions
/// contribute their value for a new row, and defaults are evaluated per row.
fn create_rows(
    session: &Session<'_>,
    fields: &FieldSet,
    missing: Batch,
    returning: Option<Vec<String>>,
) -> Result<Insert> {
    let update: Vec<&FieldDescriptor> = fields
        .update
        .iter()
        .filter(|fd| !fields.is_key(fd.name()))
        .collect();
    let default: Vec<&FieldDescriptor> = fields
        .default
        .iter()
        .filter(|fd| !fields.is_key(fd.name()) && !update.iter().any(|u| u.name() == fd.name()))
        .collect();

    let columns = fields
        .key
        .iter()
        .chain(update.iter().copied())
        .chain(default.iter().copied())
        .map(|fd| fd.name().to_string())
        .collect();

    let mut rows = Vec::with_capacity(missing.len());
    for (key, mut record) in missing {
        let mut row: Vec<Expr> = key.into_values().into_iter().map(Expr::Value).collect();

        for fd in &update {
            let value = record.shift_remove(fd.name()).unwrap_or_else(Expr::null);
            row.push(fd.function().create_value(fd.column(), value)?);
        }

        for fd in &default {
            let column = fd.column();
            let value = column.default.as_ref().map(|d| d.eval()).unwrap_or_default();
            row.push(Expr::Value(value.coerce(&column.ty)?));
        }

        rows.push(row);
    }

    Ok(Insert {
        table: session.table.clone(),
        columns,
        rows,
        returning,
    })
}
