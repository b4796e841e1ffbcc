//! # pgcompose
//!
//! Immutable, parameter-safe SQL statement composition for PostgreSQL.
//!
//! ## Features
//!
//! - **Placeholders travel with their values**: every [`Fragment`] is a list of
//!   text and bound values, so `$N` always matches the Nth binding
//! - **Typed expressions**: [`Expr<T>`] only compares with values of the same
//!   kind; `= NULL` and row comparisons become `IS [NOT] DISTINCT FROM`
//! - **Scoped predicates**: tables may declare a baseline predicate (soft
//!   delete, tenancy) applied to every statement unless made `unscoped()`
//! - **Batch inserts**: primary-key columns are omitted or filled with
//!   `DEFAULT` once per batch, depending on which rows carry a key
//! - **CTEs**: `WITH [RECURSIVE]`, inferred from self-referencing clauses
//! - No I/O: statements render to `(sql, bindings)` for `tokio-postgres`
//!
//! ## Statements
//!
//! ```ignore
//! use pgcompose::{Statement, select, insert_into, update, delete_from};
//!
//! let users = USERS.table();
//!
//! // SELECT
//! let (sql, params) = select(&users)
//!     .filter(users.col(NAME).eq("alice"))
//!     .order_by(users.col(ID).desc())
//!     .limit(10)
//!     .build()?;
//!
//! // INSERT (drafts without an id get DEFAULT / omitted key columns)
//! let (sql, params) = insert_into(&users).drafts(&new_users).build()?;
//!
//! // UPDATE
//! let (sql, params) = update(&users)
//!     .set(NAME, "bob")
//!     .filter(users.col(ID).eq(user_id))
//!     .build()?;
//!
//! // DELETE
//! let (sql, params) = delete_from(&users)
//!     .filter(users.col(ID).eq(user_id))
//!     .build()?;
//!
//! client.query(&sql, &pgcompose::params(&params)).await?;
//! ```

pub mod config;
pub mod cte;
pub mod error;
pub mod expr;
pub mod fragment;
pub mod ident;
pub mod predicate;
pub mod schema;
pub mod stmt;
pub mod value;

mod trace;

#[cfg(test)]
#[allow(dead_code)]
mod fixtures;

pub use config::{BuildConfig, MAX_BIND_PARAMS};
pub use cte::{CteClause, Materialization, With};
pub use error::{BuildError, BuildResult};
pub use expr::{
    BinaryOp, Direction, Expr, IntoExpr, Null, Nulls, Numeric, OrderTerm, Textual, exists, row,
};
pub use fragment::{Fragment, Segment};
pub use ident::{Ident, IntoIdent, quote_identifier};
pub use predicate::{Scope, Where};
pub use schema::{ColumnDef, ColumnKey, Draft, Table, TableRef, TableSchema};
pub use stmt::{
    Assignment, Cell, ClauseSet, Compound, Conflict, ConflictAction, Delete, Distinct, Insert,
    Join, JoinKind, PrimaryKeyPlan, Query, ResolvedRows, Select, SetOp, Statement, StatementKind,
    Update, resolve_primary_key,
};
pub use value::{SqlType, Value, ValueKind};

use tokio_postgres::types::ToSql;

/// Start a SELECT from `table`.
pub fn select(table: &TableRef) -> Select {
    Select::from(table)
}

/// Start an INSERT into `table`.
pub fn insert_into(table: &TableRef) -> Insert {
    Insert::into(table)
}

/// Start an UPDATE of `table`.
pub fn update(table: &TableRef) -> Update {
    Update::table(table)
}

/// Start a DELETE from `table`.
pub fn delete_from(table: &TableRef) -> Delete {
    Delete::from(table)
}

/// Start a `WITH` statement.
pub fn with() -> With {
    With::new()
}

/// Borrow built bindings as `tokio-postgres` parameters.
pub fn params(values: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    values.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}
