use super::Expr;

#[derive(Debug, Clone, PartialEq)]
pub struct ExprOr {
    pub operands: Vec<Expr>,
}

impl Expr {
    pub fn or(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
        let mut lhs = lhs.into();
        let rhs = rhs.into();

        match (&mut lhs, rhs) {
            (Expr::Or(lhs_or), Expr::Or(rhs_or)) => {
                lhs_or.operands.extend(rhs_or.operands);
                lhs
            }
            (Expr::Or(lhs_or), rhs) => {
                lhs_or.operands.push(rhs);
                lhs
            }
            (_, rhs) => ExprOr {
                operands: vec![lhs, rhs],
            }
            .into(),
        }
    }

    /// ORs the operands together. No operands yields an expression that
    /// matches nothing rather than an empty disjunction.
    pub fn or_from_vec(mut operands: Vec<Expr>) -> Expr {
        match operands.len() {
            0 => Expr::false_(),
            1 => operands.remove(0),
            _ => ExprOr { operands }.into(),
        }
    }
}

impl From<ExprOr> for Expr {
    fn from(value: ExprOr) -> Expr {
        Expr::Or(value)
    }
}
