use super::{Formatter, Params, ToSql};

use pgbulk_core::{
    schema::Type,
    stmt::{Expr, Value},
};

/// A value written where a column of type `ty` is expected.
///
/// With `cast` set the value pins its type: `CAST($1 AS integer)`. Ranges
/// travel as text and are always cast, as drivers have no native encoding for
/// them.
pub(crate) struct TypedValue<'a> {
    pub(crate) value: &'a Value,
    pub(crate) ty: &'a Type,
    pub(crate) cast: bool,
}

/// An expression written where a column of type `ty` is expected.
pub(crate) struct TypedExpr<'a> {
    pub(crate) expr: &'a Expr,
    pub(crate) ty: &'a Type,
    pub(crate) cast: bool,
}

impl ToSql for TypedValue<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self.value {
            Value::Null if self.cast => fmt!(f, "CAST(NULL AS " self.ty ")"),
            Value::Null => fmt!(f, "NULL"),
            Value::Range(range) => {
                let placeholder = f.params.push(&Value::String(range.to_string()));
                fmt!(f, "CAST(CAST(" placeholder " AS text) AS " self.ty ")");
            }
            value => {
                let placeholder = f.params.push(value);
                if self.cast {
                    fmt!(f, "CAST(" placeholder " AS " self.ty ")");
                } else {
                    fmt!(f, placeholder);
                }
            }
        }
    }
}

impl ToSql for TypedExpr<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self.expr {
            Expr::Value(value) => fmt!(
                f,
                TypedValue {
                    value,
                    ty: self.ty,
                    cast: self.cast,
                }
            ),
            expr if self.cast => fmt!(f, "CAST(" expr " AS " self.ty ")"),
            expr => fmt!(f, expr),
        }
    }
}
