//! Common Table Expressions (`WITH` clauses).
//!
//! A [`With`] holds an ordered list of [`CteClause`]s and the statement they
//! prefix. `RECURSIVE` is emitted when the caller asks for it, or, failing an
//! explicit choice, when some clause's query looks self-referencing: its text
//! contains `UNION` and mentions the clause's own name right after `FROM` or
//! `JOIN`.
//!
//! # Example
//! ```ignore
//! use pgcompose::{CteClause, Fragment, Statement, With};
//!
//! let counter = Fragment::literal("SELECT 1 AS n UNION ALL SELECT n + 1 FROM counter WHERE n < 10");
//! let sql = With::new()
//!     .clause(CteClause::new("counter", &counter))
//!     .statement(&Fragment::literal("SELECT n FROM counter"))
//!     .to_sql();
//! assert!(sql.starts_with("WITH RECURSIVE"));
//! ```

use crate::error::{BuildError, BuildResult};
use crate::fragment::Fragment;
use crate::ident::{Ident, IntoIdent};
use crate::stmt::{Query, Statement, StatementKind};
use crate::trace;

/// `MATERIALIZED` / `NOT MATERIALIZED` hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Materialization {
    Materialized,
    NotMaterialized,
}

impl Materialization {
    pub fn as_sql(self) -> &'static str {
        match self {
            Materialization::Materialized => "MATERIALIZED",
            Materialization::NotMaterialized => "NOT MATERIALIZED",
        }
    }
}

/// One `"name"(columns) AS (query)` entry.
#[must_use]
#[derive(Debug, Clone)]
pub struct CteClause {
    name: Ident,
    columns: Vec<Ident>,
    query: Fragment,
    materialization: Option<Materialization>,
    recursive: Option<bool>,
    build_error: Option<BuildError>,
}

impl CteClause {
    pub fn new(name: impl IntoIdent, query: &impl Statement) -> Self {
        let mut build_error = query.validate().err();
        let name = match name.into_ident() {
            Ok(ident) if ident.parts().len() == 1 => ident,
            Ok(ident) => {
                build_error.get_or_insert_with(|| {
                    BuildError::validation(format!(
                        "CTE name must not be qualified: {}",
                        ident.to_sql()
                    ))
                });
                ident
            }
            Err(err) => {
                build_error.get_or_insert(err);
                Ident::new("")
            }
        };
        Self {
            name,
            columns: Vec::new(),
            query: query.to_fragment(),
            materialization: None,
            recursive: None,
            build_error,
        }
    }

    pub fn name(&self) -> &str {
        self.name.name()
    }

    /// Explicit output column names.
    pub fn columns<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoIdent,
    {
        for column in columns {
            match column.into_ident() {
                Ok(ident) => self.columns.push(ident),
                Err(err) => {
                    self.build_error.get_or_insert(err);
                }
            }
        }
        self
    }

    pub fn materialized(mut self) -> Self {
        self.materialization = Some(Materialization::Materialized);
        self
    }

    pub fn not_materialized(mut self) -> Self {
        self.materialization = Some(Materialization::NotMaterialized);
        self
    }

    /// Force (or suppress) `RECURSIVE` for this clause.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = Some(recursive);
        self
    }

    /// The explicit flag, else the text heuristic.
    pub fn is_recursive(&self) -> bool {
        match self.recursive {
            Some(recursive) => recursive,
            None => looks_recursive(&self.query.to_sql(), self.name()),
        }
    }

    fn to_fragment(&self) -> Fragment {
        let mut out = Fragment::ident_ref(&self.name);
        if !self.columns.is_empty() {
            let columns = self.columns.iter().map(Fragment::ident_ref);
            out = out.concat(Fragment::join(columns, ", ").parenthesized());
        }
        out = out.push(" AS ");
        if let Some(m) = self.materialization {
            out = out.push(m.as_sql()).push(" ");
        }
        out.push("(\n")
            .concat(self.query.clone().indent())
            .push("\n)")
    }
}

/// Whether `sql` combines with `UNION` and reads from `name`.
fn looks_recursive(sql: &str, name: &str) -> bool {
    let has_union = sql
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .any(|word| word.eq_ignore_ascii_case("UNION"));
    if !has_union {
        return false;
    }

    let quoted = crate::ident::quote_identifier(name);
    [quoted.as_str(), name].into_iter().any(|needle| {
        sql.match_indices(needle).any(|(at, _)| {
            let before = &sql[..at];
            let after = &sql[at + needle.len()..];
            ends_with_source_keyword(before)
                && after
                    .chars()
                    .next()
                    .is_none_or(|c| c.is_whitespace() || matches!(c, ',' | ')' | ';'))
        })
    })
}

/// Whether `before` ends in `FROM`/`JOIN` followed by whitespace.
fn ends_with_source_keyword(before: &str) -> bool {
    let trimmed = before.trim_end();
    if trimmed.len() == before.len() {
        return false;
    }
    ["FROM", "JOIN"].iter().any(|keyword| {
        let Some(split) = trimmed.len().checked_sub(keyword.len()) else {
            return false;
        };
        let (head, tail) = match (trimmed.get(..split), trimmed.get(split..)) {
            (Some(head), Some(tail)) => (head, tail),
            _ => return false,
        };
        tail.eq_ignore_ascii_case(keyword)
            && head
                .chars()
                .next_back()
                .is_none_or(|c| !(c.is_ascii_alphanumeric() || c == '_'))
    })
}

/// `WITH ... <statement>`.
///
/// With no clauses it renders the statement alone. If the statement or any
/// clause query renders empty, the whole thing renders empty.
#[must_use]
#[derive(Debug, Clone, Default)]
pub struct With {
    clauses: Vec<CteClause>,
    recursive: Option<bool>,
    statement: Fragment,
    build_error: Option<BuildError>,
}

impl With {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clause(mut self, clause: CteClause) -> Self {
        self.clauses.push(clause);
        self
    }

    /// Shorthand for `clause(CteClause::new(name, query))`.
    pub fn with(self, name: impl IntoIdent, query: &impl Statement) -> Self {
        self.clause(CteClause::new(name, query))
    }

    /// Statement-level override for `RECURSIVE`; wins over every clause.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = Some(recursive);
        self
    }

    /// The statement the clauses prefix.
    pub fn statement(mut self, statement: &impl Statement) -> Self {
        self.build_error = statement.validate().err();
        self.statement = statement.to_fragment();
        self
    }

    pub fn clauses(&self) -> &[CteClause] {
        &self.clauses
    }

    pub fn is_recursive(&self) -> bool {
        if let Some(recursive) = self.recursive {
            return recursive;
        }
        match self.clauses.iter().find(|c| c.is_recursive()) {
            Some(clause) => {
                trace::recursion_inferred(clause.name());
                true
            }
            None => false,
        }
    }
}

impl Statement for With {
    fn to_fragment(&self) -> Fragment {
        if self.statement.is_empty() || self.clauses.iter().any(|c| c.query.is_empty()) {
            return Fragment::empty();
        }
        if self.clauses.is_empty() {
            return self.statement.clone();
        }

        let keyword = if self.is_recursive() {
            "WITH RECURSIVE "
        } else {
            "WITH "
        };
        Fragment::literal(keyword)
            .concat(Fragment::join(
                self.clauses.iter().map(CteClause::to_fragment),
                ",\n",
            ))
            .push("\n")
            .concat(self.statement.clone())
    }

    fn kind(&self) -> StatementKind {
        StatementKind::With
    }

    fn validate(&self) -> BuildResult<()> {
        let clause_error = self.clauses.iter().find_map(|c| c.build_error.as_ref());
        match clause_error.or(self.build_error.as_ref()) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl Query for With {
    fn needs_parens(&self) -> bool {
        !self.clauses.is_empty()
    }
}
