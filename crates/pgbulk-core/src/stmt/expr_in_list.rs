use super::Expr;

/// Tests membership of `expr` in `list`.
///
/// `list` is usually a single list value, bound as one array parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprInList {
    pub expr: Box<Expr>,
    pub list: Box<Expr>,
}

impl Expr {
    pub fn in_list(expr: impl Into<Expr>, list: impl Into<Expr>) -> Expr {
        ExprInList {
            expr: Box::new(expr.into()),
            list: Box::new(list.into()),
        }
        .into()
    }
}

impl From<ExprInList> for Expr {
    fn from(value: ExprInList) -> Expr {
        Expr::InList(value)
    }
}
