//! Validates the arguments of a bulk call and brings the records to their
//! canonical form. Everything that can be wrong with the input is reported
//! here, before any statement is sent.

use crate::{FieldNames, FuncSpec, KeyOps, Returning, Values};

use pgbulk_core::{
    schema::{Column, Table},
    stmt::{Expr, Key, Value, ValueRecord},
    err, Error, Result,
};
use pgbulk_sql::{Batch, ClauseOperator, CombineFunction, FieldDescriptor, FieldSet};

use indexmap::IndexMap;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Update,
    Upsert,
    Create,
}

/// Arguments shared by every bulk call.
#[derive(Debug, Clone, Default)]
pub(crate) struct Args {
    pub(crate) key_fields: FieldNames,
    pub(crate) key_ops: KeyOps,
    pub(crate) functions: IndexMap<String, FuncSpec>,
    pub(crate) returning: Option<Returning>,
}

/// The validated input of a bulk call.
#[derive(Debug)]
pub(crate) struct Plan {
    pub(crate) fields: FieldSet,
    pub(crate) batch: Batch,
}

impl Plan {
    pub(crate) fn new(table: &Table, mode: Mode, values: Values, args: &Args) -> Result<Plan> {
        let key_columns = key_columns(table, mode, &args.key_fields)?;
        let operators = match mode {
            Mode::Update => args.key_ops.resolve(args.key_fields.as_slice())?,
            Mode::Upsert | Mode::Create => vec![ClauseOperator::Eq; key_columns.len()],
        };
        let functions = resolve_functions(&args.functions)?;

        let (entries, update_names) = canonicalize(values, &key_columns)?;

        let key: Vec<_> = key_columns
            .iter()
            .zip(&operators)
            .enumerate()
            .map(|(i, (column, op))| FieldDescriptor::key(column, i, *op))
            .collect();
        let update = update_fields(table, &update_names, &functions)?;
        let returning = match &args.returning {
            Some(names) => FieldSet::returning_fields(table, names.as_slice().iter().map(String::as_str))?,
            None => vec![],
        };

        let mut batch = Batch::new();
        for (key_values, record) in entries {
            let key_values = coerce_key(&key, key_values)?;
            let record = coerce_record(&update, record)?;
            batch.insert(key_values, record);
        }

        Ok(Plan {
            fields: FieldSet::new(table, key, update, returning),
            batch,
        })
    }

    /// Names of the returned fields, in order.
    pub(crate) fn returning(&self) -> Option<Vec<String>> {
        if self.fields.returning.is_empty() {
            None
        } else {
            Some(
                self.fields
                    .returning
                    .iter()
                    .map(|fd| fd.name().to_string())
                    .collect(),
            )
        }
    }
}

fn key_columns<'a>(table: &'a Table, mode: Mode, key_fields: &FieldNames) -> Result<Vec<&'a Column>> {
    if mode == Mode::Create {
        return Ok(vec![]);
    }

    if key_fields.is_empty() {
        return Err(Error::invalid_argument("at least one key field is required"));
    }

    key_fields
        .as_slice()
        .iter()
        .map(|name| {
            table.field(name).ok_or_else(|| {
                Error::invalid_argument(format!(
                    "key field '{name}' doesn't exist in table '{}'",
                    table.name
                ))
            })
        })
        .collect()
}

fn resolve_functions(functions: &IndexMap<String, FuncSpec>) -> Result<IndexMap<&str, CombineFunction>> {
    functions
        .iter()
        .map(|(name, spec)| Ok((name.as_str(), spec.resolve()?)))
        .collect()
}

/// Splits the records into key tuples and written fields, checking that
/// every record writes the same fields. Returns the written field names,
/// sorted.
fn canonicalize(values: Values, key_columns: &[&Column]) -> Result<(Vec<(Key, ValueRecord)>, Vec<String>)> {
    let mut update_names: Option<BTreeSet<String>> = None;
    let mut check_fields = |record: &ValueRecord| -> Result<()> {
        let names: BTreeSet<String> = record.keys().cloned().collect();
        match &update_names {
            None => update_names = Some(names),
            Some(expected) if *expected != names => {
                return Err(Error::invalid_argument(
                    "all records must write the same fields",
                ));
            }
            Some(_) => {}
        }
        Ok(())
    };

    let entries = match values {
        Values::Keyed(entries) => {
            if key_columns.is_empty() {
                return Err(Error::invalid_argument(
                    "values can not be keyed for a create-only operation",
                ));
            }

            for (key, record) in &entries {
                if key.len() != key_columns.len() {
                    return Err(Error::invalid_argument(format!(
                        "key has {} values for {} key fields",
                        key.len(),
                        key_columns.len()
                    )));
                }
                check_fields(record)?;
            }
            entries
        }
        Values::Records(records) => {
            let mut entries = Vec::with_capacity(records.len());

            for (i, mut record) in records.into_iter().enumerate() {
                let mut key = Vec::with_capacity(key_columns.len());
                for column in key_columns {
                    let value = record.shift_remove(&column.name).ok_or_else(|| {
                        Error::invalid_argument(format!(
                            "record {i} doesn't contain key field '{}'",
                            column.name
                        ))
                    })?;
                    key.push(key_value(&column.name, value)?);
                }

                if key.is_empty() {
                    key.push(Value::I64(i as i64));
                }

                check_fields(&record)?;
                entries.push((Key::new(key), record));
            }
            entries
        }
    };

    let update_names = update_names.unwrap_or_default().into_iter().collect();
    Ok((entries, update_names))
}

fn key_value(field: &str, value: Expr) -> Result<Value> {
    match value {
        Expr::Value(Value::Json(serde_json::Value::Object(_)) | Value::HStore(_)) => Err(
            Error::invalid_argument(format!("key field '{field}' can not hold a mapping")),
        ),
        Expr::Value(value) => Ok(value),
        _ => Err(Error::invalid_argument(format!(
            "key field '{field}' must hold a value, not an expression"
        ))),
    }
}

/// Builds the update fields: the written fields, then fields set
/// automatically on write, then functions needing no value that were named
/// for fields absent from the records.
fn update_fields(
    table: &Table,
    names: &[String],
    functions: &IndexMap<&str, CombineFunction>,
) -> Result<Vec<FieldDescriptor>> {
    let column = |name: &str| {
        table.field(name).ok_or_else(|| {
            Error::invalid_argument(format!(
                "field '{name}' doesn't exist in table '{}'",
                table.name
            ))
        })
    };

    let mut update = vec![];
    for name in names {
        let column = column(name.as_str())?;
        let func = functions
            .get(name.as_str())
            .copied()
            .or_else(|| CombineFunction::auto(column))
            .unwrap_or_default();
        update.push(FieldDescriptor::update(column, func)?);
    }

    for column in table.columns.iter().filter(|c| c.is_auto_set()) {
        if update.iter().any(|fd| fd.name() == column.name) {
            continue;
        }

        // Absent from the records, so only a function computing its own
        // value applies.
        let func = match functions.get(column.name.as_str()) {
            Some(func) if !func.needs_value() => *func,
            _ => CombineFunction::auto(column).unwrap_or_default(),
        };
        update.push(FieldDescriptor::update(column, func)?);
    }

    for (name, func) in functions {
        let column = column(*name)?;
        if !func.needs_value() && !update.iter().any(|fd| fd.name() == column.name) {
            update.push(FieldDescriptor::update(column, *func)?);
        }
    }

    Ok(update)
}

fn coerce_key(key: &[FieldDescriptor], values: Key) -> Result<Key> {
    if key.is_empty() {
        // Positional index of a created record
        return Ok(values);
    }

    key.iter()
        .zip(values.into_values())
        .map(|(fd, value)| {
            fd.operator()
                .coerce_operand(value, &fd.column().ty)
                .map_err(|err| err.context(key_context(fd)))
        })
        .collect::<Result<Vec<_>>>()
        .map(Key::new)
}

fn coerce_record(update: &[FieldDescriptor], mut record: ValueRecord) -> Result<ValueRecord> {
    for fd in update.iter().filter(|fd| fd.needs_value()) {
        let Some(expr) = record.get_mut(fd.name()) else {
            continue;
        };

        match expr {
            Expr::Value(value) => {
                let ty = fd.value_type();
                *value = std::mem::take(value)
                    .coerce(&ty)
                    .map_err(|err| err.context(field_context(fd)))?;
            }
            raw => check_raw_value(fd, raw)?,
        }
    }

    Ok(record)
}

/// Expressions written to a field are computed once per record, without
/// reading the table.
fn check_raw_value(fd: &FieldDescriptor, expr: &Expr) -> Result<()> {
    if !expr.columns().is_empty() {
        return Err(Error::invalid_argument(format!(
            "value of field '{}' can not reference columns",
            fd.name()
        )));
    }

    if expr.contains_aggregate() || expr.contains_window() {
        return Err(Error::invalid_argument(format!(
            "value of field '{}' can not be an aggregate or window function",
            fd.name()
        )));
    }

    Ok(())
}

fn key_context(fd: &FieldDescriptor) -> Error {
    err!("key field '{}'", fd.name())
}

fn field_context(fd: &FieldDescriptor) -> Error {
    err!("field '{}'", fd.name())
}
