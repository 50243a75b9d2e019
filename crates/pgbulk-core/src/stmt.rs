mod coerce;

mod expr;
pub use expr::Expr;

mod expr_and;
pub use expr_and::ExprAnd;

mod expr_between;
pub use expr_between::ExprBetween;

mod expr_binary_op;
pub use expr_binary_op::ExprBinaryOp;

mod expr_column;
pub use expr_column::ExprColumn;

mod expr_func;
pub use expr_func::{ExprFunc, FuncAggregate, FuncWindow};

mod expr_in_list;
pub use expr_in_list::ExprInList;

mod expr_is_null;
pub use expr_is_null::ExprIsNull;

mod expr_not;
pub use expr_not::ExprNot;

mod expr_or;
pub use expr_or::ExprOr;

mod json;

mod key;
pub use key::Key;

mod op_binary;
pub use op_binary::BinaryOp;

mod value;
pub use value::Value;

mod value_range;
pub use value_range::ValueRange;

/// One input record: field name to the value written to that field.
pub type ValueRecord = indexmap::IndexMap<String, Expr>;
