use super::*;

/// A SQL expression.
///
/// Expressions appear as extra filters on bulk updates, as the predicate built
/// from key tuples, and as raw values written to a field (e.g. `NOW()`).
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// AND a set of expressions
    And(ExprAnd),

    /// `expr BETWEEN low AND high`
    Between(ExprBetween),

    /// Binary expression
    BinaryOp(ExprBinaryOp),

    /// References a column of a table
    Column(ExprColumn),

    /// Function call
    Func(ExprFunc),

    /// `expr = ANY(list)`
    InList(ExprInList),

    /// Whether an expression is (or is not) null. This is different from a
    /// binary expression because of how databases treat null comparisons.
    IsNull(ExprIsNull),

    /// Negates a boolean expression
    Not(ExprNot),

    /// OR a set of expressions
    Or(ExprOr),

    /// A constant value
    Value(Value),
}

impl Expr {
    pub fn null() -> Expr {
        Expr::Value(Value::Null)
    }

    /// An expression that matches no rows.
    pub fn false_() -> Expr {
        Expr::Value(Value::Bool(false))
    }

    pub fn true_() -> Expr {
        Expr::Value(Value::Bool(true))
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Expr::Value(_))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Expr::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_value_null(&self) -> bool {
        matches!(self, Expr::Value(Value::Null))
    }

    /// Calls `f` on this expression and every sub-expression, parents first.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Expr)) {
        f(self);

        match self {
            Expr::And(expr) => expr.operands.iter().for_each(|e| e.walk(f)),
            Expr::Or(expr) => expr.operands.iter().for_each(|e| e.walk(f)),
            Expr::Between(expr) => {
                expr.expr.walk(f);
                expr.low.walk(f);
                expr.high.walk(f);
            }
            Expr::BinaryOp(expr) => {
                expr.lhs.walk(f);
                expr.rhs.walk(f);
            }
            Expr::Func(func) => func.args().for_each(|e| e.walk(f)),
            Expr::InList(expr) => {
                expr.expr.walk(f);
                expr.list.walk(f);
            }
            Expr::IsNull(expr) => expr.expr.walk(f),
            Expr::Not(expr) => expr.expr.walk(f),
            Expr::Column(_) | Expr::Value(_) => {}
        }
    }

    /// Returns true if any sub-expression is an aggregate function.
    pub fn contains_aggregate(&self) -> bool {
        let mut found = false;
        self.walk(&mut |e| found |= matches!(e, Expr::Func(ExprFunc::Aggregate(_))));
        found
    }

    /// Returns true if any sub-expression is a window function.
    pub fn contains_window(&self) -> bool {
        let mut found = false;
        self.walk(&mut |e| found |= matches!(e, Expr::Func(ExprFunc::Window(_))));
        found
    }

    /// Returns every column referenced by the expression.
    pub fn columns(&self) -> Vec<&ExprColumn> {
        let mut columns = vec![];
        self.walk(&mut |e| {
            if let Expr::Column(column) = e {
                columns.push(column);
            }
        });
        columns
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Expr {
        Expr::Value(value)
    }
}

macro_rules! impl_value_expr {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Expr {
                fn from(value: $ty) -> Expr {
                    Expr::Value(Value::from(value))
                }
            }
        )*
    };
}

impl_value_expr!(
    bool,
    i16,
    i32,
    i64,
    f64,
    rust_decimal::Decimal,
    String,
    &String,
    &str,
    uuid::Uuid,
    chrono::NaiveDate,
    chrono::NaiveTime,
    chrono::NaiveDateTime,
    chrono::DateTime<chrono::Utc>,
    serde_json::Value,
    ValueRange
);

impl<T: Into<Value>> From<Option<T>> for Expr {
    fn from(value: Option<T>) -> Expr {
        Expr::Value(Value::from(value))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Expr {
    fn from(value: Vec<T>) -> Expr {
        Expr::Value(Value::from(value))
    }
}
