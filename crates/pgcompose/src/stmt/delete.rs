//! DELETE statement builder.

use super::{Statement, StatementKind, lines, returning_clause};
use crate::expr::{Expr, IntoExpr};
use crate::fragment::Fragment;
use crate::predicate::Where;
use crate::schema::TableRef;
use crate::value::SqlType;

/// DELETE statement.
///
/// There is no implicit guard against deleting every row: an empty default
/// scope renders only the table baseline (if any), and `none()` renders
/// `WHERE FALSE`.
#[must_use]
#[derive(Debug, Clone)]
pub struct Delete {
    table: TableRef,
    filter: Where,
    baseline: Vec<Expr<bool>>,
    returning: Vec<Fragment>,
}

impl Delete {
    pub fn from(table: &TableRef) -> Self {
        Self {
            table: table.clone(),
            filter: Where::new(),
            baseline: table.baseline().into_iter().collect(),
            returning: Vec::new(),
        }
    }

    pub fn filter(mut self, predicate: impl IntoExpr<bool>) -> Self {
        self.filter = self.filter.filter(predicate);
        self
    }

    pub fn and_where(mut self, other: Where) -> Self {
        self.filter = self.filter.and(other);
        self
    }

    pub fn or_where(mut self, other: Where) -> Self {
        self.filter = self.filter.or(other);
        self
    }

    pub fn unscoped(self) -> Self {
        self.and_where(Where::unscoped())
    }

    pub fn none(self) -> Self {
        self.and_where(Where::none())
    }

    pub fn returning<T: SqlType>(mut self, expr: impl IntoExpr<T>) -> Self {
        self.returning.push(expr.into_expr().term());
        self
    }

    pub fn returning_all(mut self) -> Self {
        self.returning.extend(self.table.all_columns());
        self
    }
}

impl Statement for Delete {
    fn to_fragment(&self) -> Fragment {
        lines([
            Fragment::literal("DELETE FROM ").concat(self.table.from_fragment()),
            self.filter.clause("WHERE", &self.baseline),
            returning_clause(&self.returning),
        ])
    }

    fn kind(&self) -> StatementKind {
        StatementKind::Delete
    }
}
