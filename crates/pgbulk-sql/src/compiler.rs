mod insert;
mod select;
mod update;
mod upsert;
mod values;

use crate::{
    serializer::{qualified, Formatter},
    Dialect, FieldDescriptor, NullDefaults,
};

use pgbulk_core::{driver::operation::QuerySql, stmt::Value, Result, Table};

/// Name of the VALUES table holding one row per input record.
const VALS: &str = "vals";

/// Name of the single-row VALUES table holding static column defaults.
const DEFAULT_VALS: &str = "default_vals";

/// Alias of the target table in UPDATE and SELECT statements.
const ALIAS: &str = "t";

/// Compiles bulk operations on one table into single SQL statements.
///
/// Input records are shipped in a `WITH "vals"(...) AS (VALUES ...)` table
/// that the statement body joins against, so a whole batch costs one round
/// trip. Values are expected to be coerced to their column types already.
#[derive(Debug, Clone, Copy)]
pub struct Compiler<'a> {
    table: &'a Table,
    dialect: &'a Dialect,
    null_defaults: &'a NullDefaults,
}

impl<'a> Compiler<'a> {
    pub fn new(table: &'a Table, dialect: &'a Dialect, null_defaults: &'a NullDefaults) -> Self {
        Compiler {
            table,
            dialect,
            null_defaults,
        }
    }

    pub fn table(&self) -> &'a Table {
        self.table
    }

    pub fn dialect(&self) -> &'a Dialect {
        self.dialect
    }

    /// Serializes one statement. `returning` decides the row types the
    /// driver decodes the result into.
    ///
    /// Column references in expressions resolve against the target table
    /// under its [`ALIAS`].
    fn statement(
        &self,
        returning: &[FieldDescriptor],
        build: impl FnOnce(&mut Formatter<'_, Vec<Value>>) -> Result<()>,
    ) -> Result<QuerySql> {
        let mut sql = String::new();
        let mut params = vec![];

        build(&mut Formatter::new(self.dialect, &mut sql, &mut params).with_scope(self.table, ALIAS))?;

        let ret = if returning.is_empty() {
            None
        } else {
            Some(
                returning
                    .iter()
                    .map(|fd| fd.column().ty.clone())
                    .collect(),
            )
        };

        Ok(QuerySql { sql, params, ret })
    }

    /// `"vals"."<prefixed name>"`
    fn vals_ref(fd: &FieldDescriptor) -> String {
        qualified(VALS, fd.prefixed_name())
    }
}
