//! UPDATE statement builder.

use super::{Statement, StatementKind, lines, returning_clause};
use crate::error::{BuildError, BuildResult};
use crate::expr::{Expr, IntoExpr};
use crate::fragment::Fragment;
use crate::predicate::Where;
use crate::schema::{ColumnKey, TableRef};
use crate::value::SqlType;

/// `"column" = value` in a SET list.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    column: String,
    value: Fragment,
    build_error: Option<BuildError>,
}

impl Assignment {
    /// Assign a typed value to the column `key` of `table`.
    ///
    /// A key that is out of range or whose type differs from the declared
    /// column kind is reported when the owning statement is validated.
    pub fn new<T: SqlType>(table: &TableRef, key: ColumnKey<T>, value: impl IntoExpr<T>) -> Self {
        let (column, build_error) = match table.schema().checked_column(key) {
            Ok(column) => (column.name.to_string(), None),
            Err(err) => (String::new(), Some(err)),
        };
        Self {
            column,
            value: value.into_expr().term(),
            build_error,
        }
    }

    pub fn raw(column: impl Into<String>, value: impl Into<Fragment>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
            build_error: None,
        }
    }

    /// `"column" = "excluded"."column"`, for upserts.
    pub fn excluded(column: impl Into<String>) -> Self {
        let column = column.into();
        let value = Fragment::ident("excluded")
            .push(".")
            .concat(Fragment::ident(&column));
        Self {
            column,
            value,
            build_error: None,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// The problem found while constructing this assignment, if any.
    pub fn error(&self) -> Option<&BuildError> {
        self.build_error.as_ref()
    }

    pub fn to_fragment(&self) -> Fragment {
        Fragment::ident(&self.column)
            .push(" = ")
            .concat(self.value.clone())
    }
}

/// UPDATE statement. Renders empty when there is nothing to assign.
#[must_use]
#[derive(Debug, Clone)]
pub struct Update {
    table: TableRef,
    assignments: Vec<Assignment>,
    filter: Where,
    baseline: Vec<Expr<bool>>,
    returning: Vec<Fragment>,
}

impl Update {
    pub fn table(table: &TableRef) -> Self {
        Self {
            table: table.clone(),
            assignments: Vec::new(),
            filter: Where::new(),
            baseline: table.baseline().into_iter().collect(),
            returning: Vec::new(),
        }
    }

    pub fn set<T: SqlType>(mut self, key: ColumnKey<T>, value: impl IntoExpr<T>) -> Self {
        let assignment = Assignment::new(&self.table, key, value);
        self.assignments.push(assignment);
        self
    }

    /// `"column" = <fragment>`, unchecked.
    pub fn set_raw(self, column: impl Into<String>, value: impl Into<Fragment>) -> Self {
        self.assign(Assignment::raw(column, value))
    }

    pub fn assign(mut self, assignment: Assignment) -> Self {
        self.assignments.push(assignment);
        self
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

impl Statement for Update {
    fn to_fragment(&self) -> Fragment {
        if self.assignments.is_empty() {
            return Fragment::empty();
        }
        let set = Fragment::literal("SET ").concat(Fragment::join(
            self.assignments.iter().map(Assignment::to_fragment),
            ", ",
        ));
        lines([
            Fragment::literal("UPDATE ").concat(self.table.from_fragment()),
            set,
            self.filter.clause("WHERE", &self.baseline),
            returning_clause(&self.returning),
        ])
    }

    fn kind(&self) -> StatementKind {
        StatementKind::Update
    }

    fn validate(&self) -> BuildResult<()> {
        match self.assignments.iter().find_map(Assignment::error) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}
