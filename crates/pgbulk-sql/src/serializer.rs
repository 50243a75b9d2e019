//! SQL text fragments.
//!
//! Every fragment implements [`ToSql`] and writes itself into a [`Formatter`],
//! pushing bound values into the formatter's [`Params`] as it goes. Statement
//! assembly in [`crate::compiler`] is a sequence of `fmt!` calls over these
//! fragments, so placeholder numbering always follows text order.

#[macro_use]
mod fmt;
pub(crate) use fmt::ToSql;

mod delim;
pub(crate) use delim::{Comma, Delimited};

mod expr;

mod ident;
pub(crate) use ident::{qualified, Ident, Qualified};

mod params;
pub use params::{Params, Placeholder};

mod value;
pub(crate) use value::{TypedExpr, TypedValue};

use crate::Dialect;
use pgbulk_core::{schema::Type, stmt::ExprColumn, Table};

/// Resolves column references inside expressions to a concrete table.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scope<'a> {
    pub(crate) table: &'a Table,

    /// Name the table is referred to by in the statement
    pub(crate) alias: &'a str,
}

pub(crate) struct Formatter<'a, P> {
    pub(crate) dialect: &'a Dialect,

    /// Where to write the serialized SQL
    pub(crate) dst: &'a mut String,

    /// Where to store parameters
    pub(crate) params: &'a mut P,

    pub(crate) scope: Option<Scope<'a>>,
}

impl<'a, P: Params> Formatter<'a, P> {
    pub(crate) fn new(dialect: &'a Dialect, dst: &'a mut String, params: &'a mut P) -> Self {
        Formatter {
            dialect,
            dst,
            params,
            scope: None,
        }
    }

    pub(crate) fn with_scope(mut self, table: &'a Table, alias: &'a str) -> Self {
        self.scope = Some(Scope { table, alias });
        self
    }

    /// Type of the column an expression column reference resolves to.
    pub(crate) fn column_type(&self, column: &ExprColumn) -> Option<&'a Type> {
        let scope = self.scope?;
        scope.table.resolve(&column.name).map(|c| &c.ty)
    }
}

impl ToSql for &Type {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        use std::fmt::Write;
        // Writing to a String is infallible
        let _ = write!(f.dst, "{self}");
    }
}

#[cfg(test)]
pub(crate) fn render(f: impl FnOnce(&mut Formatter<'_, Vec<pgbulk_core::stmt::Value>>)) -> (String, Vec<pgbulk_core::stmt::Value>) {
    let dialect = Dialect::default();
    let mut sql = String::new();
    let mut params = vec![];
    let mut fmt = Formatter::new(&dialect, &mut sql, &mut params);
    f(&mut fmt);
    (sql, params)
}
