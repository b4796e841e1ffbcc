//! Table and column descriptors.
//!
//! Descriptors are plain `const`/`static` data: a [`TableSchema`] lists its
//! [`ColumnDef`]s in declared order and may carry a baseline predicate that
//! every scoped statement against the table includes.
//!
//! # Example
//!
//! ```rust
//! use pgcompose::schema::{ColumnDef, ColumnKey, TableSchema};
//! use pgcompose::ValueKind;
//!
//! const USER_COLUMNS: &[ColumnDef] = &[
//!     ColumnDef::new("id", ValueKind::Int8).primary_key(),
//!     ColumnDef::new("name", ValueKind::Text),
//! ];
//! static USERS: TableSchema = TableSchema::new("users").with_columns(USER_COLUMNS);
//! const NAME: ColumnKey<String> = ColumnKey::new(1);
//!
//! let users = USERS.table();
//! assert_eq!(users.col(NAME).to_sql(), r#""users"."name""#);
//! ```

use crate::error::{BuildError, BuildResult};
use crate::expr::{Expr, Shape};
use crate::fragment::Fragment;
use crate::ident::Ident;
use crate::value::{SqlType, Value, ValueKind};
use std::fmt;
use std::marker::PhantomData;

/// A column of a [`TableSchema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub kind: ValueKind,
    pub primary_key: bool,
    /// Read-only (generated) columns are never emitted by INSERT.
    pub writable: bool,
    pub nullable: bool,
}

impl ColumnDef {
    pub const fn new(name: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            kind,
            primary_key: false,
            writable: true,
            nullable: false,
        }
    }

    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub const fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// Builds the predicate every default-scoped statement on a table includes.
pub type BaselineFn = fn(&TableRef) -> Expr<bool>;

/// Static description of a table.
#[derive(Clone, Copy)]
pub struct TableSchema {
    pub schema: Option<&'static str>,
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
    pub baseline: Option<BaselineFn>,
}

impl fmt::Debug for TableSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableSchema")
            .field("schema", &self.schema)
            .field("name", &self.name)
            .field("columns", &self.columns)
            .field("baseline", &self.baseline.is_some())
            .finish()
    }
}

impl TableSchema {
    pub const fn new(name: &'static str) -> Self {
        Self {
            schema: None,
            name,
            columns: &[],
            baseline: None,
        }
    }

    pub const fn in_schema(mut self, schema: &'static str) -> Self {
        self.schema = Some(schema);
        self
    }

    pub const fn with_columns(mut self, columns: &'static [ColumnDef]) -> Self {
        self.columns = columns;
        self
    }

    pub const fn with_baseline(mut self, baseline: BaselineFn) -> Self {
        self.baseline = Some(baseline);
        self
    }

    /// Reference this table under its own name.
    pub fn table(&'static self) -> TableRef {
        TableRef {
            schema: self,
            alias: None,
        }
    }

    /// Reference this table under an alias.
    pub fn alias(&'static self, alias: impl Into<String>) -> TableRef {
        TableRef {
            schema: self,
            alias: Some(alias.into()),
        }
    }

    pub fn ident(&self) -> Ident {
        match self.schema {
            Some(schema) => Ident::qualified(schema, self.name),
            None => Ident::new(self.name),
        }
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == column)
    }

    pub fn primary_key(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.primary_key)
    }

    pub fn has_primary_key(&self) -> bool {
        self.columns.iter().any(|c| c.primary_key)
    }

    /// A typed key for the column at `index`, checked against its declared kind.
    pub fn key<T: SqlType>(&self, index: usize) -> BuildResult<ColumnKey<T>> {
        let key = ColumnKey::new(index);
        self.checked_column(key)?;
        Ok(key)
    }

    /// The column `key` points at, if it exists and has the kind of `T`.
    pub fn checked_column<T: SqlType>(&self, key: ColumnKey<T>) -> BuildResult<&ColumnDef> {
        let column = self.columns.get(key.index).ok_or_else(|| {
            BuildError::validation(format!(
                "column index {} out of range for table '{}'",
                key.index, self.name
            ))
        })?;
        if column.kind != T::KIND {
            return Err(BuildError::incompatible_kinds(
                column.name,
                column.kind,
                T::KIND,
            ));
        }
        Ok(column)
    }
}

/// Typed handle to the column at `index` of some table.
pub struct ColumnKey<T> {
    index: usize,
    _kind: PhantomData<fn() -> T>,
}

impl<T> ColumnKey<T> {
    pub const fn new(index: usize) -> Self {
        Self {
            index,
            _kind: PhantomData,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl<T> Clone for ColumnKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ColumnKey<T> {}

impl<T> fmt::Debug for ColumnKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ColumnKey").field(&self.index).finish()
    }
}

/// A table as it appears in one statement, optionally aliased.
#[derive(Debug, Clone)]
pub struct TableRef {
    schema: &'static TableSchema,
    alias: Option<String>,
}

impl TableRef {
    pub fn schema(&self) -> &'static TableSchema {
        self.schema
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The name columns are qualified with: the alias, or the table name.
    pub fn reference_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(self.schema.name)
    }

    /// `"schema"."table" AS "alias"`, as used in FROM/JOIN/INTO.
    pub fn from_fragment(&self) -> Fragment {
        let table = Fragment::ident_ref(&self.schema.ident());
        match &self.alias {
            Some(alias) => table.push(" AS ").concat(Fragment::ident(alias)),
            None => table,
        }
    }

    /// Qualified column reference by position.
    pub(crate) fn column_fragment(&self, column: &ColumnDef) -> Fragment {
        Fragment::ident(self.reference_name())
            .push(".")
            .concat(Fragment::ident(column.name))
    }

    /// Typed column reference.
    ///
    /// # Panics
    ///
    /// If `key` is out of range for this table's columns or its type does not
    /// match the declared column kind. [`try_col`](Self::try_col) reports the
    /// same conditions as an error.
    pub fn col<T: SqlType>(&self, key: ColumnKey<T>) -> Expr<T> {
        match self.try_col(key) {
            Ok(expr) => expr,
            Err(err) => panic!("{err}"),
        }
    }

    /// Typed column reference, checked against the declared column kind.
    pub fn try_col<T: SqlType>(&self, key: ColumnKey<T>) -> BuildResult<Expr<T>> {
        let column = self.schema.checked_column(key)?;
        Ok(Expr::with_shape(self.column_fragment(column), Shape::Atom))
    }

    /// Column reference looked up by name and checked against `T`.
    pub fn column<T: SqlType>(&self, name: &str) -> BuildResult<Expr<T>> {
        let column = self
            .schema
            .columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| BuildError::unknown_column(self.schema.name, name))?;
        if column.kind != T::KIND {
            return Err(BuildError::incompatible_kinds(name, column.kind, T::KIND));
        }
        Ok(Expr::with_shape(self.column_fragment(column), Shape::Atom))
    }

    /// Every column, qualified, in declared order.
    pub fn all_columns(&self) -> Vec<Fragment> {
        self.schema
            .columns
            .iter()
            .map(|c| self.column_fragment(c))
            .collect()
    }

    /// The table's baseline predicate instantiated for this reference.
    pub fn baseline(&self) -> Option<Expr<bool>> {
        self.schema.baseline.map(|f| f(self))
    }
}

/// A persisted row type.
pub trait Table: Sized {
    fn schema() -> &'static TableSchema;

    /// Column values in declared order.
    fn values(&self) -> Vec<Value>;

    fn table() -> TableRef {
        Self::schema().table()
    }
}

/// A row that may not have its primary key assigned yet.
///
/// `values()` reports an unassigned key as [`Value::Null`].
pub trait Draft: Sized {
    type Row: Table;
    type Key;

    /// Column values in the row type's declared order.
    fn values(&self) -> Vec<Value>;

    fn into_row(self, key: Self::Key) -> Self::Row;

    fn from_row(row: Self::Row) -> Self;
}
