//! Error types for pgcompose

use crate::value::ValueKind;
use thiserror::Error;

/// Result type alias for statement construction
pub type BuildResult<T> = Result<T, BuildError>;

/// Errors raised while validating or building a statement.
///
/// Rendering a statement to text never fails; these are reported by
/// `validate()`/`build()` and by the runtime-checked column lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A column was requested with a Rust type whose kind differs from the
    /// declared column kind.
    #[error("Incompatible value kinds for column '{column}': expected {expected}, found {found}")]
    IncompatibleKinds {
        column: String,
        expected: ValueKind,
        found: ValueKind,
    },

    /// A column was looked up by a name the table does not declare.
    #[error("Unknown column '{column}' on table '{table}'")]
    UnknownColumn { table: String, column: String },

    /// INSERT row whose value count differs from the column list
    #[error("Column count mismatch: expected {expected} values, found {found}")]
    ColumnCount { expected: usize, found: usize },

    /// A join re-used a table name or alias already present in the FROM list
    #[error("Duplicate table reference: {0}")]
    DuplicateTable(String),

    /// Too many bind parameters for a single statement
    #[error("Statement binds {count} parameters, limit is {max}")]
    TooManyParams { count: usize, max: usize },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl BuildError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an incompatible-kinds error for a column
    pub fn incompatible_kinds(
        column: impl Into<String>,
        expected: ValueKind,
        found: ValueKind,
    ) -> Self {
        Self::IncompatibleKinds {
            column: column.into(),
            expected,
            found,
        }
    }

    /// Create an unknown-column error
    pub fn unknown_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Check if this is an incompatible-kinds error
    pub fn is_incompatible_kinds(&self) -> bool {
        matches!(self, Self::IncompatibleKinds { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
