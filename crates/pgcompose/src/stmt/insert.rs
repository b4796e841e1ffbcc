//! INSERT / upsert builder and primary-key batch resolution.
//!
//! A multi-row `VALUES` list needs one column list for every row, so the
//! primary-key handling is decided once per batch by [`resolve_primary_key`]:
//!
//! | Batch                                   | Result                                  |
//! |-----------------------------------------|-----------------------------------------|
//! | every row binds its key                 | all columns, verbatim                   |
//! | no row binds its key, no conflict clause| key columns omitted                     |
//! | no row binds its key, conflict clause   | key columns kept, `DEFAULT` in each row |
//! | mixed                                   | key columns kept, `DEFAULT` where NULL  |

use super::update::Assignment;
use super::{Statement, StatementKind, lines, returning_clause};
use crate::error::{BuildError, BuildResult};
use crate::expr::{Expr, IntoExpr};
use crate::fragment::Fragment;
use crate::schema::{ColumnDef, Draft, Table, TableRef};
use crate::value::{SqlType, Value};

/// One cell of a `VALUES` row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Value(Value),
    /// The `DEFAULT` keyword.
    Default,
}

impl Cell {
    fn to_fragment(&self) -> Fragment {
        match self {
            Cell::Value(v) => Fragment::bind(v.clone()),
            Cell::Default => Fragment::literal("DEFAULT"),
        }
    }
}

/// How a batch's primary-key columns are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryKeyPlan {
    /// Every row binds its key; columns emitted as given.
    AllBound,
    /// No row binds its key and nothing targets it; key columns dropped.
    OmitKey,
    /// Key columns kept; unbound key cells become `DEFAULT`.
    KeepWithDefault,
}

/// Column list and rows after primary-key resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRows {
    pub plan: PrimaryKeyPlan,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
}

/// Classify a batch by its primary-key values and build the uniform column
/// list and cell rows.
///
/// A row's key is unbound when every key cell is NULL. `keep_key` is set when a
/// conflict clause needs the key columns present.
pub fn resolve_primary_key(
    columns: &[ColumnDef],
    rows: Vec<Vec<Value>>,
    keep_key: bool,
) -> ResolvedRows {
    let key: Vec<usize> = columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.primary_key)
        .map(|(i, _)| i)
        .collect();

    let is_bound = |row: &[Value]| {
        key.iter()
            .all(|&i| row.get(i).is_some_and(|v| !v.is_null()))
    };
    let is_unbound = |row: &[Value]| key.iter().all(|&i| row.get(i).is_none_or(Value::is_null));
    let all_bound = rows.iter().all(|r| is_bound(r.as_slice()));
    let all_unbound = rows.iter().all(|r| is_unbound(r.as_slice()));

    // Dropping every column would leave nothing to insert.
    let plan = if key.is_empty() || all_bound {
        PrimaryKeyPlan::AllBound
    } else if all_unbound && !keep_key && key.len() < columns.len() {
        PrimaryKeyPlan::OmitKey
    } else {
        PrimaryKeyPlan::KeepWithDefault
    };

    let keep = |i: usize| plan != PrimaryKeyPlan::OmitKey || !columns[i].primary_key;
    let names = columns
        .iter()
        .enumerate()
        .filter(|&(i, _)| keep(i))
        .map(|(_, c)| c.name)
        .collect();

    let rows = rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .enumerate()
                .filter(|&(i, _)| i < columns.len() && keep(i))
                .map(|(i, v)| {
                    let unbound = columns[i].primary_key && v.is_null();
                    if plan == PrimaryKeyPlan::KeepWithDefault && unbound {
                        Cell::Default
                    } else {
                        Cell::Value(v)
                    }
                })
                .collect()
        })
        .collect();

    ResolvedRows {
        plan,
        columns: names,
        rows,
    }
}

/// What an `ON CONFLICT` clause does.
#[derive(Debug, Clone, PartialEq)]
pub enum ConflictAction {
    DoNothing,
    /// `DO UPDATE SET "c" = "excluded"."c"` for every inserted non-key column.
    UpdateExcluded,
    DoUpdate(Vec<Assignment>),
}

/// `ON CONFLICT (target) [WHERE ...] DO ...`
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub target: Vec<&'static str>,
    pub target_filter: Option<Expr<bool>>,
    pub action: ConflictAction,
    pub action_filter: Option<Expr<bool>>,
}

impl Conflict {
    fn new(target: Vec<&'static str>) -> Self {
        Self {
            target,
            target_filter: None,
            action: ConflictAction::DoNothing,
            action_filter: None,
        }
    }

    fn to_fragment(&self, columns: &[&'static str], key: &[&'static str]) -> Fragment {
        let mut out = Fragment::literal("ON CONFLICT");
        if !self.target.is_empty() {
            out = out.push(" ").concat(column_list(&self.target));
        }
        if let Some(filter) = &self.target_filter {
            out = out.push(" WHERE ").concat(filter.fragment().clone());
        }

        let assignments = match &self.action {
            ConflictAction::DoNothing => Vec::new(),
            ConflictAction::UpdateExcluded => columns
                .iter()
                .filter(|c| !key.contains(*c))
                .map(|c| Assignment::excluded(*c))
                .collect(),
            ConflictAction::DoUpdate(assignments) => assignments.clone(),
        };
        if assignments.is_empty() {
            return out.push(" DO NOTHING");
        }

        out = out.push(" DO UPDATE SET ").concat(Fragment::join(
            assignments.iter().map(Assignment::to_fragment),
            ", ",
        ));
        if let Some(filter) = &self.action_filter {
            out = out.push(" WHERE ").concat(filter.fragment().clone());
        }
        out
    }
}

#[derive(Debug, Clone)]
enum Source {
    Rows(Vec<Vec<Value>>),
    Query(Fragment),
    DefaultValues,
}

/// INSERT statement.
///
/// Columns default to every column of the table in declared order; read-only
/// columns are never emitted. A row-based insert with no rows renders empty.
#[must_use]
#[derive(Debug, Clone)]
pub struct Insert {
    table: TableRef,
    columns: Vec<ColumnDef>,
    source: Source,
    conflict: Option<Conflict>,
    returning: Vec<Fragment>,
    build_error: Option<BuildError>,
}

impl Insert {
    pub fn into(table: &TableRef) -> Self {
        Self {
            table: table.clone(),
            columns: table.schema().columns.to_vec(),
            source: Source::Rows(Vec::new()),
            conflict: None,
            returning: Vec::new(),
            build_error: None,
        }
    }

    /// Insert-or-update a single draft, keyed on the primary key.
    pub fn upsert<D: Draft>(draft: &D) -> Self {
        Self::upsert_all([draft])
    }

    /// Insert-or-update a batch of drafts, keyed on the primary key.
    pub fn upsert_all<'a, D: Draft + 'a>(drafts: impl IntoIterator<Item = &'a D>) -> Self {
        Self::into(&D::Row::table())
            .drafts(drafts)
            .on_conflict_key()
            .do_update_excluded()
    }

    fn fail(&mut self, err: BuildError) {
        if self.build_error.is_none() {
            self.build_error = Some(err);
        }
    }

    // ==================== Columns & rows ====================

    /// Restrict the column list. Call before adding rows.
    pub fn columns(mut self, names: &[&str]) -> Self {
        let schema = self.table.schema();
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            match schema.columns.iter().find(|c| c.name == *name) {
                Some(c) => columns.push(*c),
                None => self.fail(BuildError::unknown_column(schema.name, *name)),
            }
        }
        self.columns = columns;
        self
    }

    /// Add one row of values matching the current column list.
    pub fn values(mut self, row: Vec<Value>) -> Self {
        if row.len() != self.columns.len() {
            self.fail(BuildError::ColumnCount {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.push_row(row);
        self
    }

    pub fn row<R: Table>(self, row: &R) -> Self {
        self.full_row(row.values())
    }

    pub fn rows<'a, R: Table + 'a>(self, rows: impl IntoIterator<Item = &'a R>) -> Self {
        rows.into_iter().fold(self, |insert, row| insert.row(row))
    }

    pub fn draft<D: Draft>(self, draft: &D) -> Self {
        self.full_row(draft.values())
    }

    pub fn drafts<'a, D: Draft + 'a>(self, drafts: impl IntoIterator<Item = &'a D>) -> Self {
        drafts.into_iter().fold(self, |insert, draft| insert.draft(draft))
    }

    /// `INSERT INTO ... SELECT ...`
    pub fn select(mut self, query: &impl Statement) -> Self {
        if let Err(err) = query.validate() {
            self.fail(err);
        }
        self.source = Source::Query(query.to_fragment());
        self
    }

    /// `INSERT INTO ... DEFAULT VALUES`
    pub fn default_values(mut self) -> Self {
        self.source = Source::DefaultValues;
        self
    }

    /// Values in the table's declared order, projected onto the column list.
    fn full_row(mut self, values: Vec<Value>) -> Self {
        let schema = self.table.schema();
        if values.len() != schema.columns.len() {
            self.fail(BuildError::ColumnCount {
                expected: schema.columns.len(),
                found: values.len(),
            });
        }
        let row = self
            .columns
            .iter()
            .map(|c| {
                schema
                    .position(c.name)
                    .and_then(|i| values.get(i).cloned())
                    .unwrap_or(Value::Null)
            })
            .collect();
        self.push_row(row);
        self
    }

    fn push_row(&mut self, row: Vec<Value>) {
        match &mut self.source {
            Source::Rows(rows) => rows.push(row),
            _ => self.source = Source::Rows(vec![row]),
        }
    }

    // ==================== ON CONFLICT ====================

    /// `ON CONFLICT (columns...) DO NOTHING`, refined by the `do_*` methods.
    pub fn on_conflict(mut self, columns: &[&str]) -> Self {
        let schema = self.table.schema();
        let mut target = Vec::with_capacity(columns.len());
        for name in columns {
            match schema.columns.iter().find(|c| c.name == *name) {
                Some(c) => target.push(c.name),
                None => self.fail(BuildError::unknown_column(schema.name, *name)),
            }
        }
        self.conflict = Some(Conflict::new(target));
        self
    }

    /// Conflict target = the primary key.
    pub fn on_conflict_key(mut self) -> Self {
        self.conflict = Some(Conflict::new(self.key_names()));
        self
    }

    /// Index predicate for a partial unique index: `ON CONFLICT (...) WHERE ...`.
    pub fn on_conflict_where(mut self, predicate: Expr<bool>) -> Self {
        self.conflict_mut().target_filter = Some(predicate);
        self
    }

    pub fn do_nothing(mut self) -> Self {
        self.conflict_mut().action = ConflictAction::DoNothing;
        self
    }

    /// `DO UPDATE SET` with explicit assignments.
    pub fn do_update(mut self, assignments: impl IntoIterator<Item = Assignment>) -> Self {
        self.conflict_mut().action = ConflictAction::DoUpdate(assignments.into_iter().collect());
        self
    }

    /// `DO UPDATE SET "c" = "excluded"."c"` for every inserted non-key column.
    pub fn do_update_excluded(mut self) -> Self {
        self.conflict_mut().action = ConflictAction::UpdateExcluded;
        self
    }

    /// `DO UPDATE ... WHERE predicate`
    pub fn do_update_where(mut self, predicate: Expr<bool>) -> Self {
        self.conflict_mut().action_filter = Some(predicate);
        self
    }

    fn conflict_mut(&mut self) -> &mut Conflict {
        let key = self.key_names();
        self.conflict.get_or_insert_with(|| Conflict::new(key))
    }

    fn key_names(&self) -> Vec<&'static str> {
        self.table.schema().primary_key().map(|c| c.name).collect()
    }

    // ==================== RETURNING ====================

    pub fn returning<T: SqlType>(mut self, expr: impl IntoExpr<T>) -> Self {
        self.returning.push(expr.into_expr().term());
        self
    }

    /// `RETURNING` every column of the table.
    pub fn returning_all(mut self) -> Self {
        self.returning.extend(self.table.all_columns());
        self
    }

    /// Resolve rows against the writable columns.
    pub fn resolve(&self) -> Option<ResolvedRows> {
        let Source::Rows(rows) = &self.source else {
            return None;
        };
        let writable: Vec<usize> = (0..self.columns.len())
            .filter(|&i| self.columns[i].writable)
            .collect();
        let columns: Vec<ColumnDef> = writable.iter().map(|&i| self.columns[i]).collect();
        let rows = rows
            .iter()
            .map(|row| {
                writable
                    .iter()
                    .map(|&i| row.get(i).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        Some(resolve_primary_key(&columns, rows, self.conflict.is_some()))
    }

    fn written_columns(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|c| c.writable)
            .map(|c| c.name)
            .collect()
    }
}

fn column_list(names: &[&'static str]) -> Fragment {
    Fragment::join(names.iter().map(|n| Fragment::ident(n)), ", ").parenthesized()
}

impl Statement for Insert {
    fn to_fragment(&self) -> Fragment {
        let head = Fragment::literal("INSERT INTO ").concat(self.table.from_fragment());

        let (columns, body) = match &self.source {
            Source::Rows(rows) if rows.is_empty() => return Fragment::empty(),
            Source::Rows(_) => {
                let Some(resolved) = self.resolve() else {
                    return Fragment::empty();
                };
                if resolved.columns.is_empty() {
                    // Nothing writable: `DEFAULT VALUES` inserts exactly one row.
                    match self.columns.first() {
                        Some(column) if resolved.rows.len() > 1 => {
                            let rows = vec![Fragment::literal("(DEFAULT)"); resolved.rows.len()];
                            let body =
                                Fragment::literal("VALUES ").concat(Fragment::join(rows, ", "));
                            (vec![column.name], body)
                        }
                        _ => (Vec::new(), Fragment::literal("DEFAULT VALUES")),
                    }
                } else {
                    let rows = resolved.rows.iter().map(|row| {
                        Fragment::join(row.iter().map(Cell::to_fragment), ", ").parenthesized()
                    });
                    let body = Fragment::literal("VALUES ").concat(Fragment::join(rows, ", "));
                    (resolved.columns, body)
                }
            }
            Source::Query(query) => {
                if query.is_empty() {
                    return Fragment::empty();
                }
                (self.written_columns(), query.clone())
            }
            Source::DefaultValues => (Vec::new(), Fragment::literal("DEFAULT VALUES")),
        };

        let head = if columns.is_empty() {
            head
        } else {
            head.push(" ").concat(column_list(&columns))
        };
        let conflict = self
            .conflict
            .as_ref()
            .map(|c| c.to_fragment(&columns, &self.key_names()))
            .unwrap_or_default();

        lines([head, body, conflict, returning_clause(&self.returning)])
    }

    fn kind(&self) -> StatementKind {
        StatementKind::Insert
    }

    fn validate(&self) -> BuildResult<()> {
        if let Some(err) = &self.build_error {
            return Err(err.clone());
        }
        if let Source::Rows(rows) = &self.source {
            if rows.len() > 1 && self.columns.is_empty() {
                return Err(BuildError::validation(
                    "multi-row INSERT needs at least one column",
                ));
            }
        }
        if let Some(conflict) = &self.conflict {
            if let ConflictAction::DoUpdate(assignments) = &conflict.action {
                if let Some(err) = assignments.iter().find_map(Assignment::error) {
                    return Err(err.clone());
                }
            }
            let updates = !matches!(conflict.action, ConflictAction::DoNothing);
            if updates && conflict.target.is_empty() {
                return Err(BuildError::validation(
                    "ON CONFLICT DO UPDATE requires a conflict target",
                ));
            }
        }
        Ok(())
    }
}
