use super::Expr;

/// A column reference.
///
/// Without a table the column belongs to the statement's target table. The
/// name may be either the logical field name or the storage column name.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprColumn {
    pub table: Option<String>,
    pub name: String,
}

impl Expr {
    pub fn col(name: impl Into<String>) -> Expr {
        ExprColumn {
            table: None,
            name: name.into(),
        }
        .into()
    }

    pub fn table_col(table: impl Into<String>, name: impl Into<String>) -> Expr {
        ExprColumn {
            table: Some(table.into()),
            name: name.into(),
        }
        .into()
    }
}

impl From<ExprColumn> for Expr {
    fn from(value: ExprColumn) -> Expr {
        Expr::Column(value)
    }
}
