//! Statement builders.
//!
//! Every builder is an immutable value: methods consume `self` and return the
//! modified statement, so a base statement can be cloned and specialized freely.
//! Rendering never fails; problems detected while composing (for example a
//! duplicate join alias) are deferred and reported by [`Statement::validate`].
//!
//! # Usage
//!
//! ```ignore
//! use pgcompose::{Select, Statement};
//!
//! let users = USERS.table();
//! let (sql, values) = Select::from(&users)
//!     .filter(users.col(NAME).eq("alice"))
//!     .order_by(users.col(ID).desc())
//!     .limit(20)
//!     .build()?;
//! ```

mod clause;
mod compound;
mod delete;
mod insert;
mod join;
mod select;
mod update;

#[cfg(test)]
mod tests;

pub use clause::{ClauseSet, Distinct};
pub use compound::{Compound, SetOp};
pub use delete::Delete;
pub use insert::{
    Cell, Conflict, ConflictAction, Insert, PrimaryKeyPlan, ResolvedRows, resolve_primary_key,
};
pub use join::{Join, JoinKind};
pub use select::Select;
pub use update::{Assignment, Update};

use crate::config::BuildConfig;
use crate::error::{BuildError, BuildResult};
use crate::fragment::Fragment;
use crate::trace;
use crate::value::Value;
use std::fmt;

/// The kind of statement being built, reported in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    /// `WITH ...` wrapper
    With,
    /// `UNION`/`INTERSECT`/`EXCEPT`
    Compound,
    /// Hand-written fragment
    Raw,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StatementKind::Select => "select",
            StatementKind::Insert => "insert",
            StatementKind::Update => "update",
            StatementKind::Delete => "delete",
            StatementKind::With => "with",
            StatementKind::Compound => "compound",
            StatementKind::Raw => "raw",
        })
    }
}

/// A renderable SQL statement.
pub trait Statement {
    /// Render to a fragment. Deterministic for the same statement value.
    fn to_fragment(&self) -> Fragment;

    fn kind(&self) -> StatementKind;

    /// Report problems deferred while composing.
    fn validate(&self) -> BuildResult<()> {
        Ok(())
    }

    /// Debug helper to get the SQL string.
    fn to_sql(&self) -> String {
        self.to_fragment().to_sql()
    }

    /// Validate and render into the `(sql, bindings)` pair.
    fn build(&self) -> BuildResult<(String, Vec<Value>)> {
        self.build_with(&BuildConfig::default())
    }

    fn build_with(&self, config: &BuildConfig) -> BuildResult<(String, Vec<Value>)> {
        if let Err(err) = self.validate() {
            trace::statement_rejected(self.kind(), &err);
            return Err(err);
        }

        let (sql, values) = self.to_fragment().into_parts();
        if values.len() > config.max_params {
            let err = BuildError::TooManyParams {
                count: values.len(),
                max: config.max_params,
            };
            trace::statement_rejected(self.kind(), &err);
            return Err(err);
        }

        trace::statement_built(config, self.kind(), &sql, values.len());
        Ok((sql, values))
    }
}

/// A statement that yields rows and can be an arm of a set operation.
pub trait Query: Statement {
    /// Whether the rendered text must be parenthesized to stand as one arm of
    /// `UNION`/`INTERSECT`/`EXCEPT` (trailing ORDER BY/LIMIT/OFFSET, nested
    /// set operations, WITH).
    fn needs_parens(&self) -> bool {
        false
    }
}

/// Raw fragments are used as written.
impl Query for Fragment {}

impl<Q: Query + ?Sized> Query for &Q {
    fn needs_parens(&self) -> bool {
        (**self).needs_parens()
    }
}

impl Statement for Fragment {
    fn to_fragment(&self) -> Fragment {
        self.clone()
    }

    fn kind(&self) -> StatementKind {
        StatementKind::Raw
    }
}

impl<S: Statement + ?Sized> Statement for &S {
    fn to_fragment(&self) -> Fragment {
        (**self).to_fragment()
    }

    fn kind(&self) -> StatementKind {
        (**self).kind()
    }

    fn validate(&self) -> BuildResult<()> {
        (**self).validate()
    }
}

/// `RETURNING a, b` or the empty fragment.
pub(crate) fn returning_clause(items: &[Fragment]) -> Fragment {
    if items.is_empty() {
        return Fragment::empty();
    }
    Fragment::literal("RETURNING ").concat(Fragment::join(items.iter().cloned(), ", "))
}

/// Join clause lines with newlines, skipping empty ones.
pub(crate) fn lines(parts: impl IntoIterator<Item = Fragment>) -> Fragment {
    Fragment::join(parts, "\n")
}
