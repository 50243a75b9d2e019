use pgbulk_core::{
    schema::Type,
    stmt::{Expr, Value},
    Error, Result,
};

/// Compares a key field of the target table with the value supplied for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClauseOperator {
    #[default]
    Eq,
    NotEq,
    In,
    NotIn,
    Lt,
    Gt,
    Lte,
    Gte,
    Between,
    IsNull,
}

const NAMES: &[(&str, ClauseOperator)] = &[
    ("eq", ClauseOperator::Eq),
    ("=", ClauseOperator::Eq),
    ("==", ClauseOperator::Eq),
    ("!eq", ClauseOperator::NotEq),
    ("!=", ClauseOperator::NotEq),
    ("<>", ClauseOperator::NotEq),
    ("in", ClauseOperator::In),
    ("!in", ClauseOperator::NotIn),
    ("lt", ClauseOperator::Lt),
    ("<", ClauseOperator::Lt),
    ("gt", ClauseOperator::Gt),
    (">", ClauseOperator::Gt),
    ("lte", ClauseOperator::Lte),
    ("<=", ClauseOperator::Lte),
    ("gte", ClauseOperator::Gte),
    (">=", ClauseOperator::Gte),
    ("between", ClauseOperator::Between),
    ("is_null", ClauseOperator::IsNull),
    ("isnull", ClauseOperator::IsNull),
];

impl ClauseOperator {
    /// Looks up an operator by one of its names. Names are case-sensitive.
    pub fn from_name(name: &str) -> Result<ClauseOperator> {
        NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, op)| *op)
            .ok_or_else(|| Error::unknown_operator(name))
    }

    /// Every name resolving to this operator.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        NAMES
            .iter()
            .filter(move |(_, op)| *op == self)
            .map(|(name, _)| *name)
    }

    /// Whether the predicate is the negation of another operator's.
    pub fn inverse(self) -> bool {
        matches!(self, ClauseOperator::NotEq | ClauseOperator::NotIn)
    }

    /// `false` when the operand only selects a branch of the predicate
    /// rather than being compared with the column.
    pub fn requires_value(self) -> bool {
        !matches!(self, ClauseOperator::IsNull)
    }

    /// Type of the operand stored in the VALUES table for a column of type
    /// `ty`.
    pub fn operand_type(self, ty: &Type) -> Type {
        match self {
            ClauseOperator::In | ClauseOperator::NotIn | ClauseOperator::Between => {
                Type::array(ty.clone())
            }
            ClauseOperator::IsNull => Type::Boolean,
            _ => ty.clone(),
        }
    }

    /// Checks the shape of a key operand and converts it to
    /// [`operand_type`](Self::operand_type).
    pub fn coerce_operand(self, value: Value, ty: &Type) -> Result<Value> {
        match self {
            ClauseOperator::In | ClauseOperator::NotIn => match value {
                Value::List(items) => Ok(Value::List(
                    items
                        .into_iter()
                        .map(|item| item.coerce(ty))
                        .collect::<Result<_>>()?,
                )),
                other => Err(Error::invalid_argument(format!(
                    "'{}' operand must be a list, got {}",
                    self.name(),
                    other.kind_name()
                ))),
            },
            ClauseOperator::Between => match value {
                Value::List(items) if items.len() == 2 => Ok(Value::List(
                    items
                        .into_iter()
                        .map(|item| item.coerce(ty))
                        .collect::<Result<_>>()?,
                )),
                _ => Err(Error::invalid_argument(
                    "'between' operand must be a list of two bounds",
                )),
            },
            ClauseOperator::IsNull => match value {
                Value::Bool(_) => Ok(value),
                other => Err(Error::invalid_argument(format!(
                    "'is_null' operand must be a boolean, got {}",
                    other.kind_name()
                ))),
            },
            _ => value.coerce(ty),
        }
    }

    /// Renders the comparison between an already quoted table column and an
    /// already quoted operand.
    ///
    /// `BETWEEN` reads its bounds from a two element array. Arrays are
    /// 1-based, so the bounds are `[1]` and `[2]`.
    pub fn render_predicate(self, table_field: &str, value: &str) -> String {
        match self {
            ClauseOperator::Eq => format!("{table_field} = {value}"),
            ClauseOperator::NotEq => format!("{table_field} != {value}"),
            ClauseOperator::Lt => format!("{table_field} < {value}"),
            ClauseOperator::Gt => format!("{table_field} > {value}"),
            ClauseOperator::Lte => format!("{table_field} <= {value}"),
            ClauseOperator::Gte => format!("{table_field} >= {value}"),
            ClauseOperator::In => format!("{table_field} = ANY({value})"),
            ClauseOperator::NotIn => format!("NOT {table_field} = ANY({value})"),
            ClauseOperator::Between => {
                format!("{table_field} BETWEEN {value}[1] AND {value}[2]")
            }
            ClauseOperator::IsNull => format!(
                "((({table_field} IS NULL) AND {value}) OR (({table_field} IS NOT NULL) AND NOT {value}))"
            ),
        }
    }

    /// Builds the predicate as an expression over a column and a literal
    /// operand. Inverse operators negate the predicate of the operator they
    /// invert.
    pub fn predicate(self, column: Expr, value: Value) -> Result<Expr> {
        Ok(match self {
            ClauseOperator::Eq => Expr::eq(column, value),
            ClauseOperator::NotEq => Expr::not(Expr::eq(column, value)),
            ClauseOperator::Lt => Expr::lt(column, value),
            ClauseOperator::Gt => Expr::gt(column, value),
            ClauseOperator::Lte => Expr::le(column, value),
            ClauseOperator::Gte => Expr::ge(column, value),
            ClauseOperator::In => Expr::in_list(column, value),
            ClauseOperator::NotIn => Expr::not(Expr::in_list(column, value)),
            ClauseOperator::Between => match value {
                Value::List(mut bounds) if bounds.len() == 2 => {
                    let high = bounds.pop().unwrap_or_default();
                    let low = bounds.pop().unwrap_or_default();
                    Expr::between(column, low, high)
                }
                _ => {
                    return Err(Error::invalid_argument(
                        "'between' operand must be a list of two bounds",
                    ))
                }
            },
            ClauseOperator::IsNull => match value.as_bool() {
                Some(true) => Expr::is_null(column),
                Some(false) => Expr::is_not_null(column),
                None => {
                    return Err(Error::invalid_argument(
                        "'is_null' operand must be a boolean",
                    ))
                }
            },
        })
    }

    /// Canonical name
    pub fn name(self) -> &'static str {
        match self {
            ClauseOperator::Eq => "eq",
            ClauseOperator::NotEq => "!eq",
            ClauseOperator::In => "in",
            ClauseOperator::NotIn => "!in",
            ClauseOperator::Lt => "lt",
            ClauseOperator::Gt => "gt",
            ClauseOperator::Lte => "lte",
            ClauseOperator::Gte => "gte",
            ClauseOperator::Between => "between",
            ClauseOperator::IsNull => "is_null",
        }
    }
}

impl std::str::FromStr for ClauseOperator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ClauseOperator::from_name(s)
    }
}
