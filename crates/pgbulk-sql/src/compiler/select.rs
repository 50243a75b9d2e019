use super::{Compiler, ALIAS};
use crate::{
    serializer::{Comma, Ident, Qualified, ToSql},
    FieldDescriptor,
};

use pgbulk_core::{driver::operation::QuerySql, stmt::Expr, Result};

impl Compiler<'_> {
    /// Selects the key columns of the rows matching `predicate`, locking them
    /// for the rest of the transaction when the database supports it.
    pub fn select_for_update(&self, predicate: &Expr, key: &[FieldDescriptor]) -> Result<QuerySql> {
        let returning: Vec<_> = key
            .iter()
            .enumerate()
            .map(|(i, fd)| FieldDescriptor::returning(fd.column(), i))
            .collect();

        self.statement(&returning, |f| {
            let columns = key
                .iter()
                .map(|fd| Qualified(ALIAS, fd.column().column.as_str()));
            fmt!(f, "SELECT " Comma(columns) " FROM " Ident(&self.table.name) " AS " Ident(ALIAS) " WHERE " predicate);

            if self.dialect.select_for_update {
                fmt!(f, " FOR UPDATE");
            }

            Ok(())
        })
    }
}
