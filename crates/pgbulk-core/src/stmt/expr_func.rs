use super::Expr;

/// A function call.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprFunc {
    /// The transaction's current timestamp
    Now,

    /// First non-null argument
    Coalesce(Vec<Expr>),

    /// An aggregate such as `COUNT`, `SUM` or `MAX`
    Aggregate(FuncAggregate),

    /// A function evaluated over a window (`... OVER (...)`)
    Window(FuncWindow),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncAggregate {
    pub name: String,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncWindow {
    pub name: String,
    pub args: Vec<Expr>,
    pub partition_by: Vec<Expr>,
}

impl ExprFunc {
    pub fn args(&self) -> impl Iterator<Item = &Expr> + '_ {
        let (args, partition_by): (&[Expr], &[Expr]) = match self {
            ExprFunc::Now => (&[], &[]),
            ExprFunc::Coalesce(args) => (args.as_slice(), &[]),
            ExprFunc::Aggregate(func) => (func.args.as_slice(), &[]),
            ExprFunc::Window(func) => (func.args.as_slice(), func.partition_by.as_slice()),
        };
        args.iter().chain(partition_by)
    }
}

impl Expr {
    pub fn now() -> Expr {
        Expr::Func(ExprFunc::Now)
    }

    pub fn coalesce(args: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::Func(ExprFunc::Coalesce(args.into_iter().collect()))
    }

    pub fn aggregate(name: impl Into<String>, args: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::Func(ExprFunc::Aggregate(FuncAggregate {
            name: name.into(),
            args: args.into_iter().collect(),
        }))
    }

    pub fn window(
        name: impl Into<String>,
        args: impl IntoIterator<Item = Expr>,
        partition_by: impl IntoIterator<Item = Expr>,
    ) -> Expr {
        Expr::Func(ExprFunc::Window(FuncWindow {
            name: name.into(),
            args: args.into_iter().collect(),
            partition_by: partition_by.into_iter().collect(),
        }))
    }
}

impl From<ExprFunc> for Expr {
    fn from(value: ExprFunc) -> Expr {
        Expr::Func(value)
    }
}
