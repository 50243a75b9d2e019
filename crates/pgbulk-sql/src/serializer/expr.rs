use super::{Comma, Delimited, Formatter, Ident, Params, Qualified, ToSql, TypedValue};

use pgbulk_core::{
    schema::Type,
    stmt::{self, Expr, ExprColumn, ExprFunc, Value},
};

impl ToSql for &Expr {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self {
            Expr::And(expr) => {
                fmt!(f, Delimited(expr.operands.iter().map(Nested), " AND "));
            }
            Expr::Between(expr) => {
                let ty = operand_type(f, &expr.expr);
                fmt!(f, &*expr.expr " BETWEEN " Operand(&expr.low, ty) " AND " Operand(&expr.high, ty));
            }
            Expr::BinaryOp(expr) => {
                let lhs_ty = operand_type(f, &expr.lhs);
                let rhs_ty = operand_type(f, &expr.rhs);
                fmt!(f, Operand(&expr.lhs, rhs_ty) " " expr.op " " Operand(&expr.rhs, lhs_ty));
            }
            Expr::Column(column) => column.to_sql(f),
            Expr::Func(func) => func.to_sql(f),
            Expr::InList(expr) => {
                let ty = operand_type(f, &expr.expr).map(|ty| Type::array(ty.clone()));
                fmt!(f, &*expr.expr " = ANY(" Operand(&expr.list, ty.as_ref()) ")");
            }
            Expr::IsNull(expr) => {
                if expr.negate {
                    fmt!(f, &*expr.expr " IS NOT NULL");
                } else {
                    fmt!(f, &*expr.expr " IS NULL");
                }
            }
            Expr::Not(expr) => {
                let inner: &Expr = &expr.expr;
                fmt!(f, "NOT (" inner ")");
            }
            Expr::Or(expr) => {
                fmt!(f, Delimited(expr.operands.iter().map(Nested), " OR "));
            }
            Expr::Value(value) => value.to_sql(f),
        }
    }
}

/// Parenthesizes nested boolean connectives.
struct Nested<'a>(&'a Expr);

impl ToSql for Nested<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self.0 {
            Expr::And(_) | Expr::Or(_) => fmt!(f, "(" self.0 ")"),
            expr => fmt!(f, expr),
        }
    }
}

/// An operand whose type is known from the other side of the comparison.
struct Operand<'a>(&'a Expr, Option<&'a Type>);

impl ToSql for Operand<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match (self.0, self.1) {
            (Expr::Value(value), Some(ty)) if !matches!(value, Value::Bool(_)) => fmt!(
                f,
                TypedValue {
                    value,
                    ty,
                    cast: false,
                }
            ),
            (expr @ (Expr::And(_) | Expr::Or(_)), _) => fmt!(f, "(" expr ")"),
            (expr, _) => fmt!(f, expr),
        }
    }
}

fn operand_type<'a, P: Params>(f: &Formatter<'a, P>, expr: &Expr) -> Option<&'a Type> {
    match expr {
        Expr::Column(column) => f.column_type(column),
        _ => None,
    }
}

impl ToSql for &ExprColumn {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match (&self.table, f.scope) {
            (Some(table), Some(scope)) if table != scope.alias && *table != scope.table.name => {
                fmt!(f, Qualified(table, &self.name));
            }
            (_, Some(scope)) => {
                let column = scope
                    .table
                    .resolve(&self.name)
                    .map(|c| c.column.as_str())
                    .unwrap_or(&self.name);
                fmt!(f, Qualified(scope.alias, column));
            }
            (Some(table), None) => fmt!(f, Qualified(table, &self.name)),
            (None, None) => fmt!(f, Ident(&self.name)),
        }
    }
}

impl ToSql for &ExprFunc {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self {
            ExprFunc::Now => fmt!(f, "NOW()"),
            ExprFunc::Coalesce(args) => fmt!(f, "COALESCE(" Comma(args) ")"),
            ExprFunc::Aggregate(func) => fmt!(f, &func.name "(" Comma(&func.args) ")"),
            ExprFunc::Window(func) => {
                fmt!(f, &func.name "(" Comma(&func.args) ") OVER (");
                if !func.partition_by.is_empty() {
                    fmt!(f, "PARTITION BY " Comma(&func.partition_by));
                }
                fmt!(f, ")");
            }
        }
    }
}

impl ToSql for &stmt::BinaryOp {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        use std::fmt::Write;
        let _ = write!(f.dst, "{self}");
    }
}

impl ToSql for &Value {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self {
            Value::Null => fmt!(f, "NULL"),
            Value::Bool(true) => fmt!(f, "TRUE"),
            Value::Bool(false) => fmt!(f, "FALSE"),
            Value::Range(range) => {
                let placeholder = f.params.push(&Value::String(range.to_string()));
                fmt!(f, "CAST(" placeholder " AS text)");
            }
            value => {
                let placeholder = f.params.push(value);
                fmt!(f, placeholder);
            }
        }
    }
}
