use pgbulk_core::{
    schema::{Table, Type},
    stmt::{Expr, ExprColumn, Value},
    Error, Result,
};

/// Alias the compiled UPDATE gives its target table.
const ALIAS: &str = "t";

/// Checks an extra filter of a bulk update and converts its values to the
/// types of the columns they are compared with.
///
/// The filter may only read the target table, referenced without a table
/// name, by its name or by its alias. Aggregates and window functions can
/// not be evaluated per row and are rejected.
pub(crate) fn validate(table: &Table, filter: Expr) -> Result<Expr> {
    if filter.contains_aggregate() {
        return Err(Error::invalid_filter("filter must not contain aggregates"));
    }

    if filter.contains_window() {
        return Err(Error::invalid_filter("filter must not contain window functions"));
    }

    for column in filter.columns() {
        if let Some(other) = &column.table {
            if *other != table.name && other != ALIAS {
                return Err(Error::invalid_filter(format!(
                    "filter references table '{other}'; only '{}' can be filtered",
                    table.name
                )));
            }
        }

        if table.resolve(&column.name).is_none() {
            return Err(Error::invalid_filter(format!(
                "filter references column '{}', which doesn't exist in table '{}'",
                column.name, table.name
            )));
        }
    }

    coerce(table, filter)
}

fn coerce(table: &Table, expr: Expr) -> Result<Expr> {
    Ok(match expr {
        Expr::And(mut expr) => {
            expr.operands = coerce_all(table, expr.operands)?;
            Expr::And(expr)
        }
        Expr::Or(mut expr) => {
            expr.operands = coerce_all(table, expr.operands)?;
            Expr::Or(expr)
        }
        Expr::Not(mut expr) => {
            *expr.expr = coerce(table, *expr.expr)?;
            Expr::Not(expr)
        }
        Expr::BinaryOp(mut expr) => {
            let ty = column_type(table, &expr.lhs).or_else(|| column_type(table, &expr.rhs));
            *expr.lhs = coerce_operand(table, *expr.lhs, ty.as_ref())?;
            *expr.rhs = coerce_operand(table, *expr.rhs, ty.as_ref())?;
            Expr::BinaryOp(expr)
        }
        Expr::Between(mut expr) => {
            let ty = column_type(table, &expr.expr);
            *expr.low = coerce_operand(table, *expr.low, ty.as_ref())?;
            *expr.high = coerce_operand(table, *expr.high, ty.as_ref())?;
            Expr::Between(expr)
        }
        Expr::InList(mut expr) => {
            let ty = column_type(table, &expr.expr).map(Type::array);
            *expr.list = coerce_operand(table, *expr.list, ty.as_ref())?;
            Expr::InList(expr)
        }
        other => other,
    })
}

fn coerce_all(table: &Table, exprs: Vec<Expr>) -> Result<Vec<Expr>> {
    exprs.into_iter().map(|expr| coerce(table, expr)).collect()
}

fn coerce_operand(table: &Table, expr: Expr, ty: Option<&Type>) -> Result<Expr> {
    match (expr, ty) {
        // Booleans render as literals
        (Expr::Value(value @ Value::Bool(_)), _) => Ok(Expr::Value(value)),
        (Expr::Value(value), Some(ty)) => value.coerce(ty).map(Expr::Value),
        (expr, _) => coerce(table, expr),
    }
}

fn column_type(table: &Table, expr: &Expr) -> Option<Type> {
    match expr {
        Expr::Column(ExprColumn { name, .. }) => table.resolve(name).map(|column| column.ty.clone()),
        _ => None,
    }
}
