use super::{Compiler, VALS};
use crate::{
    function::Target,
    serializer::{qualified, Comma, Ident, Qualified, ToSql},
    Batch, FieldSet,
};

use pgbulk_core::{driver::operation::QuerySql, Error, Result};

impl Compiler<'_> {
    /// Compiles a bulk upsert relying on the unique constraint covering the
    /// key fields.
    ///
    /// ```sql
    /// WITH "vals"("key_0__id", "upd__name") AS (VALUES (CAST($1 AS integer), CAST($2 AS text)))
    /// INSERT INTO "items" ("id", "name") SELECT "vals"."key_0__id", "vals"."upd__name" FROM "vals"
    /// ON CONFLICT ("id") DO UPDATE SET ("name") = (
    ///   SELECT "vals"."upd__name" FROM "vals" WHERE ("vals"."key_0__id") = (EXCLUDED."id")
    /// )
    /// ```
    ///
    /// Conflicting rows are left untouched when `update` is unset or no
    /// field is updated.
    pub fn insert_on_conflict(
        &self,
        fields: &FieldSet,
        batch: &Batch,
        update: bool,
    ) -> Result<QuerySql> {
        if fields.key.is_empty() {
            return Err(Error::invalid_argument("upsert requires at least one key field"));
        }

        if !self.dialect.insert_on_conflict {
            return Err(Error::unsupported_feature(format!(
                "INSERT ... ON CONFLICT is not available on server version {}",
                self.dialect.version
            )));
        }

        self.statement(&fields.returning, |f| {
            self.write_insert_select(f, fields, batch)?;

            let conflict = fields.key.iter().map(|fd| Ident(&fd.column().column));
            fmt!(f, " ON CONFLICT (" Comma(conflict) ")");

            if !update || fields.update.is_empty() {
                fmt!(f, " DO NOTHING");
            } else {
                let targets = fields.update.iter().map(|fd| Ident(&fd.column().column));
                fmt!(f, " DO UPDATE SET (" Comma(targets) ") = (SELECT ");

                for (i, fd) in fields.update.iter().enumerate() {
                    let column = fd.column();
                    let existing = qualified(&self.table.name, &column.column);
                    let operand = Self::vals_ref(fd);

                    if i > 0 {
                        fmt!(f, ", ");
                    }
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

                let keys = fields
                    .key
                    .iter()
                    .map(|fd| Qualified(VALS, fd.prefixed_name()));
                fmt!(f, " FROM " Ident(VALS) " WHERE (" Comma(keys) ") = (");
                for (i, fd) in fields.key.iter().enumerate() {
                    if i > 0 {
                        fmt!(f, ", ");
                    }
                    fmt!(f, "EXCLUDED." Ident(&fd.column().column));
                }
                fmt!(f, "))");
            }

            self.write_insert_returning(f, fields);
            Ok(())
        })
    }
}
