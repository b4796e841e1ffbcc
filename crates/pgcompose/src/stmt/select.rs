//! SELECT statement builder.

use super::clause::{ClauseSet, Distinct};
use super::compound::{Compound, SetOp};
use super::join::{Join, JoinKind};
use super::{Query, Statement, StatementKind, lines};
use crate::error::{BuildError, BuildResult};
use crate::expr::{Expr, IntoExpr, OrderTerm};
use crate::fragment::Fragment;
use crate::predicate::{Scope, Where};
use crate::schema::TableRef;
use crate::value::SqlType;

/// SELECT statement over one table and its joins.
///
/// With no explicit columns, every column of the FROM table is selected,
/// qualified, in declared order. The table's baseline predicate is applied
/// unless the statement is made [`unscoped`](Select::unscoped).
#[must_use]
#[derive(Debug, Clone)]
pub struct Select {
    from: TableRef,
    joins: Vec<Join>,
    columns: Vec<Fragment>,
    clauses: ClauseSet,
    build_error: Option<BuildError>,
}

impl Select {
    pub fn from(table: &TableRef) -> Self {
        Self {
            from: table.clone(),
            joins: Vec::new(),
            columns: Vec::new(),
            clauses: ClauseSet {
                baseline: table.baseline().into_iter().collect(),
                ..ClauseSet::new()
            },
            build_error: None,
        }
    }

    pub fn table(&self) -> &TableRef {
        &self.from
    }

    pub fn clauses(&self) -> &ClauseSet {
        &self.clauses
    }

    // ==================== SELECT columns ====================

    /// Append one output expression.
    pub fn column<T: SqlType>(mut self, expr: Expr<T>) -> Self {
        self.columns.push(expr.term());
        self
    }

    /// Append `expr AS "alias"`.
    pub fn column_as<T: SqlType>(mut self, expr: Expr<T>, alias: &str) -> Self {
        self.columns
            .push(expr.term().push(" AS ").concat(Fragment::ident(alias)));
        self
    }

    /// Append raw output fragments.
    pub fn columns(mut self, items: impl IntoIterator<Item = Fragment>) -> Self {
        self.columns.extend(items);
        self
    }

    /// Append every column of `table` (the FROM table or a joined one).
    pub fn all_of(mut self, table: &TableRef) -> Self {
        self.columns.extend(table.all_columns());
        self
    }

    pub fn distinct(mut self) -> Self {
        self.clauses.distinct = std::mem::take(&mut self.clauses.distinct).or_all();
        self
    }

    /// `DISTINCT ON (expr, ...)`; repeated calls extend the list.
    pub fn distinct_on<T: SqlType>(mut self, expr: Expr<T>) -> Self {
        let mut items = match std::mem::take(&mut self.clauses.distinct) {
            Distinct::On(items) => items,
            _ => Vec::new(),
        };
        items.push(expr.term());
        self.clauses.distinct = Distinct::On(items);
        self
    }

    // ==================== JOIN ====================

    /// Add a join. Re-using a table name or alias already in scope records a
    /// deferred [`BuildError::DuplicateTable`].
    ///
    /// The joined table's baseline is AND-ed into the join condition.
    pub fn join(mut self, kind: JoinKind, table: &TableRef, on: Expr<bool>) -> Self {
        let name = table.reference_name();
        let taken = self.from.reference_name() == name
            || self.joins.iter().any(|j| j.table.reference_name() == name);
        if taken && self.build_error.is_none() {
            self.build_error = Some(BuildError::DuplicateTable(name.to_string()));
        }
        self.joins.push(Join {
            kind,
            table: table.clone(),
            on,
            baseline: table.baseline(),
        });
        self
    }

    pub fn inner_join(self, table: &TableRef, on: Expr<bool>) -> Self {
        self.join(JoinKind::Inner, table, on)
    }

    pub fn left_join(self, table: &TableRef, on: Expr<bool>) -> Self {
        self.join(JoinKind::Left, table, on)
    }

    pub fn right_join(self, table: &TableRef, on: Expr<bool>) -> Self {
        self.join(JoinKind::Right, table, on)
    }

    pub fn full_join(self, table: &TableRef, on: Expr<bool>) -> Self {
        self.join(JoinKind::Full, table, on)
    }

    // ==================== WHERE ====================

    /// Add a predicate, AND-ed with the existing ones.
    pub fn filter(mut self, predicate: impl IntoExpr<bool>) -> Self {
        self.clauses.filter = self.clauses.filter.filter(predicate);
        self
    }

    pub fn and_where(mut self, other: Where) -> Self {
        self.clauses.filter = std::mem::take(&mut self.clauses.filter).and(other);
        self
    }

    pub fn or_where(mut self, other: Where) -> Self {
        self.clauses.filter = std::mem::take(&mut self.clauses.filter).or(other);
        self
    }

    /// Skip the tables' baseline predicates.
    pub fn unscoped(self) -> Self {
        self.and_where(Where::unscoped())
    }

    /// Match no rows (`WHERE FALSE`).
    pub fn none(self) -> Self {
        self.and_where(Where::none())
    }

    // ==================== GROUP BY / HAVING ====================

    pub fn group_by<T: SqlType>(mut self, expr: Expr<T>) -> Self {
        self.clauses.group_by.push(expr.term());
        self
    }

    pub fn having(mut self, predicate: impl IntoExpr<bool>) -> Self {
        self.clauses.having = std::mem::take(&mut self.clauses.having).filter(predicate);
        self
    }

    // ==================== ORDER / LIMIT ====================

    pub fn order_by(mut self, term: impl Into<OrderTerm>) -> Self {
        self.clauses.order_by.push(term.into());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.clauses.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.clauses.offset = Some(offset);
        self
    }

    /// Merge another clause set into this statement's clauses.
    pub fn merge(mut self, clauses: ClauseSet) -> Self {
        self.clauses = std::mem::take(&mut self.clauses).merge(clauses);
        self
    }

    // ==================== Set operations ====================

    pub fn union(self, other: &impl Query) -> Compound {
        Compound::new(&self).push(SetOp::Union, other)
    }

    pub fn union_all(self, other: &impl Query) -> Compound {
        Compound::new(&self).push(SetOp::UnionAll, other)
    }

    pub fn intersect(self, other: &impl Query) -> Compound {
        Compound::new(&self).push(SetOp::Intersect, other)
    }

    pub fn except(self, other: &impl Query) -> Compound {
        Compound::new(&self).push(SetOp::Except, other)
    }

    fn select_list(&self) -> Fragment {
        if !self.columns.is_empty() {
            return Fragment::join(self.columns.iter().cloned(), ", ");
        }
        let all = Fragment::join(self.from.all_columns(), ", ");
        if all.is_empty() {
            Fragment::literal("*")
        } else {
            all
        }
    }
}

impl Statement for Select {
    fn to_fragment(&self) -> Fragment {
        let head = Fragment::literal("SELECT ")
            .concat(self.clauses.distinct.to_fragment())
            .concat(self.select_list());
        let from = Fragment::literal("FROM ").concat(self.from.from_fragment());
        let scoped = self.clauses.filter.scope() == Scope::Default;

        lines(
            [head, from]
                .into_iter()
                .chain(self.joins.iter().map(|j| j.to_fragment(scoped)))
                .chain([self.clauses.render_tail()]),
        )
    }

    fn kind(&self) -> StatementKind {
        StatementKind::Select
    }

    fn validate(&self) -> BuildResult<()> {
        match &self.build_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl Query for Select {
    fn needs_parens(&self) -> bool {
        let c = &self.clauses;
        !c.order_by.is_empty() || c.limit.is_some() || c.offset.is_some()
    }
}
