use super::{Expr, Shape};
use crate::value::SqlType;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// `IS NOT DISTINCT FROM`
    Is,
    /// `IS DISTINCT FROM`
    IsNot,
    And,
    Or,
    Like,
    NotLike,
    ILike,
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn as_sql(self) -> &'static str {
        match self {
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Is => "IS NOT DISTINCT FROM",
            BinaryOp::IsNot => "IS DISTINCT FROM",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Like => "LIKE",
            BinaryOp::NotLike => "NOT LIKE",
            BinaryOp::ILike => "ILIKE",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }

    /// The NULL-safe spelling of an equality operator.
    pub fn null_safe(self) -> Option<BinaryOp> {
        match self {
            BinaryOp::Eq | BinaryOp::Is => Some(BinaryOp::Is),
            BinaryOp::Ne | BinaryOp::IsNot => Some(BinaryOp::IsNot),
            _ => None,
        }
    }
}

/// Apply `op`, rewriting `=`/`<>` to their NULL-safe form when either side is
/// the NULL literal or a row value.
pub(crate) fn binary<L, R, O>(lhs: Expr<L>, op: BinaryOp, rhs: Expr<R>) -> Expr<O>
where
    L: SqlType,
    R: SqlType,
    O: SqlType,
{
    let op = match op.null_safe() {
        Some(safe)
            if lhs.is_null_literal() || rhs.is_null_literal() || lhs.is_row() || rhs.is_row() =>
        {
            safe
        }
        _ => op,
    };

    let fragment = lhs
        .operand()
        .push(" ")
        .push(op.as_sql())
        .push(" ")
        .concat(rhs.operand());
    Expr::with_shape(fragment, Shape::Compound)
}
