use super::{Compiler, DEFAULT_VALS, VALS};
use crate::{
    function::Target,
    serializer::{qualified, Comma, Formatter, Ident, Params, Qualified, ToSql, TypedExpr},
    Batch, FieldSet,
};

use pgbulk_core::{
    driver::operation::{Insert, QuerySql},
    Error, Result,
};

impl Compiler<'_> {
    /// Compiles a bulk insert of every record.
    ///
    /// ```sql
    /// WITH "vals"("upd__name") AS (VALUES (CAST($1 AS text)), ($2)),
    ///   "default_vals"("def__counter") AS (VALUES (CAST($3 AS integer)))
    /// INSERT INTO "items" ("name", "counter")
    /// SELECT "vals"."upd__name", "default_vals"."def__counter" FROM "vals" CROSS JOIN "default_vals"
    /// ```
    pub fn insert(&self, fields: &FieldSet, batch: &Batch) -> Result<QuerySql> {
        self.statement(&fields.returning, |f| {
            self.write_insert_select(f, fields, batch)?;
            self.write_insert_returning(f, fields);
            Ok(())
        })
    }

    /// Writes the part shared by both insert shapes, up to and including the
    /// `FROM` clause.
    pub(super) fn write_insert_select<P: Params>(
        &self,
        f: &mut Formatter<'_, P>,
        fields: &FieldSet,
        batch: &Batch,
    ) -> Result<()> {
        let columns = self.vals_columns(fields, true);

        fmt!(f, "WITH ");
        self.write_vals(f, &columns, batch)?;
        let with_default_vals = self.write_default_vals(f, fields)?;

        // Key fields first; a key also listed as update field keeps its key
        // value, as the row is created from its key.
        let mut names: Vec<&str> = vec![];
        let mut targets = vec![];
        for fd in &fields.key {
            if !names.contains(&fd.column().column.as_str()) {
                names.push(&fd.column().column);
                targets.push(fd);
            }
        }
        for fd in fields.update.iter().chain(&fields.default) {
            if !fields.is_key(fd.name()) && !names.contains(&fd.column().column.as_str()) {
                names.push(&fd.column().column);
                targets.push(fd);
            }
        }

        fmt!(f, " INSERT INTO " Ident(&self.table.name) " (" Comma(names.iter().map(Ident)) ") SELECT ");

        for (i, fd) in targets.iter().enumerate() {
            if i > 0 {
                fmt!(f, ", ");
            }

            match fd.prefix() {
                crate::Prefix::Update => {
                    let column = fd.column();
                    let existing = qualified(&self.table.name, &column.column);
                    let operand = Self::vals_ref(fd);
                    fd.function().render(
                        f,
                        Target {
                            column,
                            existing: &existing,
                            operand: &operand,
                        },
                        false,
                        self.null_defaults,
                    )?;
                }
                crate::Prefix::Default if !fd.is_mutable_default() => {
                    fmt!(f, Qualified(DEFAULT_VALS, fd.prefixed_name()));
                }
                _ => fmt!(f, Qualified(VALS, fd.prefixed_name())),
            }
        }

        fmt!(f, " FROM " Ident(VALS));
        if with_default_vals {
            fmt!(f, " CROSS JOIN " Ident(DEFAULT_VALS));
        }

        Ok(())
    }

    pub(super) fn write_insert_returning<P: Params>(&self, f: &mut Formatter<'_, P>, fields: &FieldSet) {
        if !fields.returning.is_empty() {
            let returning = fields
                .returning
                .iter()
                .map(|fd| Qualified(self.table.name.as_str(), fd.column().column.as_str()));
            fmt!(f, " RETURNING " Comma(returning));
        }
    }

    /// Compiles a plain multi-row insert.
    ///
    /// ```sql
    /// INSERT INTO "items" ("id", "name") VALUES (CAST($1 AS integer), CAST($2 AS text)), (NOW(), ...)
    /// ```
    pub fn insert_rows(&self, insert: &Insert) -> Result<QuerySql> {
        if insert.columns.is_empty() {
            return Err(Error::invalid_argument("insert has no column"));
        }

        let columns = insert
            .columns
            .iter()
            .map(|name| {
                insert.table.field(name).ok_or_else(|| {
                    Error::invalid_argument(format!(
                        "field '{name}' doesn't exist in table '{}'",
                        insert.table.name
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let returning = match &insert.returning {
            Some(names) => FieldSet::returning_fields(&insert.table, names.iter().map(String::as_str))?,
            None => vec![],
        };

        self.statement(&returning, |f| {
            let names = columns.iter().map(|column| Ident(&column.column));
            fmt!(f, "INSERT INTO " Ident(&insert.table.name) " (" Comma(names) ") VALUES ");

            for (i, row) in insert.rows.iter().enumerate() {
                if row.len() != columns.len() {
                    return Err(Error::invalid_argument(format!(
                        "insert row {i} has {} values for {} columns",
                        row.len(),
                        columns.len()
                    )));
                }

                let cells = row.iter().zip(&columns).map(|(expr, column)| TypedExpr {
                    expr,
                    ty: &column.ty,
                    cast: expr.is_value(),
                });

                if i > 0 {
                    fmt!(f, ", ");
                }
                fmt!(f, "(" Comma(cells) ")");
            }

            if !returning.is_empty() {
                let returning = returning
                    .iter()
                    .map(|fd| Ident(fd.column().column.as_str()));
                fmt!(f, " RETURNING " Comma(returning));
            }

            Ok(())
        })
    }
}
