use super::{Compiler, ALIAS, VALS};
use crate::{
    function::Target,
    serializer::{qualified, Comma, Ident, Qualified, ToSql},
    Batch, FieldSet,
};

use pgbulk_core::{driver::operation::QuerySql, stmt::Expr, Error, Result};

impl Compiler<'_> {
    /// Compiles a bulk update of the rows matching each record's key.
    ///
    /// ```sql
    /// WITH "vals"("key_0__id", "upd__name") AS (VALUES (CAST($1 AS integer), CAST($2 AS text)), ($3, $4))
    /// UPDATE "items" AS "t" SET "name" = "vals"."upd__name"
    /// FROM "vals" WHERE "t"."id" = "vals"."key_0__id"
    /// ```
    ///
    /// `filter` further restricts the updated rows; its columns refer to the
    /// target table.
    pub fn update(
        &self,
        fields: &FieldSet,
        batch: &Batch,
        filter: Option<&Expr>,
    ) -> Result<QuerySql> {
        if fields.update.is_empty() {
            return Err(Error::invalid_argument("bulk update has no field to update"));
        }

        let columns = self.vals_columns(fields, false);

        self.statement(&fields.returning, |f| {
            fmt!(f, "WITH ");
            self.write_vals(f, &columns, batch)?;
            fmt!(f, " UPDATE " Ident(&self.table.name) " AS " Ident(ALIAS) " SET ");

            for (i, fd) in fields.update.iter().enumerate() {
                let column = fd.column();
                let existing = qualified(ALIAS, &column.column);
                let operand = Self::vals_ref(fd);

                if i > 0 {
                    fmt!(f, ", ");
                }
                fmt!(f, Ident(&column.column) " = ");
                fd.function().render(
                    f,
                    Target {
                        column,
                        existing: &existing,
                        operand: &operand,
                    },
                    true,
                    self.null_defaults,
                )?;
            }

            fmt!(f, " FROM " Ident(VALS));

            let predicates: Vec<String> = fields
                .key
                .iter()
                .map(|fd| {
                    fd.operator().render_predicate(
                        &qualified(ALIAS, &fd.column().column),
                        &Self::vals_ref(fd),
                    )
                })
                .collect();

            match (predicates.is_empty(), filter) {
                (true, None) => {}
                (false, None) => fmt!(f, " WHERE " predicates.join(" AND ").as_str()),
                (true, Some(filter)) => fmt!(f, " WHERE " filter),
                (false, Some(filter)) => {
                    fmt!(f, " WHERE " predicates.join(" AND ").as_str() " AND (" filter ")");
                }
            }

            if !fields.returning.is_empty() {
                let returning = fields
                    .returning
                    .iter()
                    .map(|fd| Qualified(ALIAS, fd.column().column.as_str()));
                fmt!(f, " RETURNING " Comma(returning));
            }

            Ok(())
        })
    }
}
