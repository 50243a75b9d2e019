use super::{Compiler, DEFAULT_VALS, VALS};
use crate::{
    serializer::{Comma, Formatter, Ident, Params, ToSql, TypedExpr, TypedValue},
    Batch, FieldDescriptor, FieldSet, Prefix,
};

use pgbulk_core::{
    schema::Type,
    stmt::{Expr, Key, ValueRecord},
    Error, Result,
};

impl Compiler<'_> {
    /// Columns of the VALUES table: key fields, then update fields carrying
    /// a value, then defaults evaluated per row when `with_defaults` is set.
    pub(super) fn vals_columns<'f>(
        &self,
        fields: &'f FieldSet,
        with_defaults: bool,
    ) -> Vec<&'f FieldDescriptor> {
        let mut columns: Vec<_> = fields.key.iter().chain(fields.update_with_values()).collect();
        if with_defaults {
            columns.extend(fields.mutable_defaults());
        }
        columns
    }

    /// Writes `"vals"("c1", ...) AS (VALUES (...), ...)`.
    ///
    /// Only the first row casts its values, which is enough for the database
    /// to type each column, including columns holding only NULLs.
    pub(super) fn write_vals<P: Params>(
        &self,
        f: &mut Formatter<'_, P>,
        columns: &[&FieldDescriptor],
        batch: &Batch,
    ) -> Result<()> {
        if columns.is_empty() {
            return Err(Error::invalid_argument(
                "no field carries a value; the VALUES table would have no columns",
            ));
        }

        let types: Vec<Type> = columns.iter().map(|fd| fd.value_type()).collect();
        let names = columns.iter().map(|fd| Ident(fd.prefixed_name()));

        fmt!(f, Ident(VALS) "(" Comma(names) ") AS (VALUES ");

        for (i, (key, record)) in batch.iter().enumerate() {
            let row = columns
                .iter()
                .map(|fd| row_value(fd, key, record))
                .collect::<Result<Vec<_>>>()?;
            let cells = row.iter().zip(&types).map(|(expr, ty)| TypedExpr {
                expr,
                ty,
                cast: i == 0,
            });

            if i > 0 {
                fmt!(f, ", ");
            }
            fmt!(f, "(" Comma(cells) ")");
        }

        fmt!(f, ")");
        Ok(())
    }

    /// Writes `, "default_vals"("def__c1", ...) AS (VALUES (...))` when some
    /// default is the same for every row. Returns whether it was written.
    pub(super) fn write_default_vals<P: Params>(
        &self,
        f: &mut Formatter<'_, P>,
        fields: &FieldSet,
    ) -> Result<bool> {
        let defaults: Vec<_> = fields.immutable_defaults().collect();
        if defaults.is_empty() {
            return Ok(false);
        }

        let values = defaults
            .iter()
            .map(|fd| default_value(fd))
            .collect::<Result<Vec<_>>>()?;
        let names = defaults.iter().map(|fd| Ident(fd.prefixed_name()));
        let cells = values.iter().zip(&defaults).map(|(value, fd)| TypedValue {
            value,
            ty: &fd.column().ty,
            cast: true,
        });

        fmt!(f, ", " Ident(DEFAULT_VALS) "(" Comma(names) ") AS (VALUES (" Comma(cells) "))");
        Ok(true)
    }
}

fn row_value(fd: &FieldDescriptor, key: &Key, record: &ValueRecord) -> Result<Expr> {
    match fd.prefix() {
        Prefix::Key(i) => key.values().get(i).cloned().map(Expr::Value).ok_or_else(|| {
            Error::invalid_argument(format!(
                "key has {} values, but key field '{}' is number {}",
                key.len(),
                fd.name(),
                i + 1
            ))
        }),
        Prefix::Update => record.get(fd.name()).cloned().ok_or_else(|| {
            Error::invalid_argument(format!("record has no value for field '{}'", fd.name()))
        }),
        Prefix::Default => default_value(fd).map(Expr::Value),
        Prefix::Returning(_) => Err(Error::invalid_argument(format!(
            "returned field '{}' has no input value",
            fd.name()
        ))),
    }
}

fn default_value(fd: &FieldDescriptor) -> Result<pgbulk_core::stmt::Value> {
    let column = fd.column();
    match &column.default {
        Some(default) => default.eval().coerce(&column.ty),
        None => Ok(pgbulk_core::stmt::Value::Null),
    }
}
