//! Immutable SQL text + binding accumulator.
//!
//! A [`Fragment`] is an ordered list of segments, each either literal text or a
//! bound [`Value`]. Because every placeholder carries its own value, the Nth
//! `$N` in the rendered SQL always corresponds to the Nth binding: there is no
//! separate parameter list to drift out of sync, and concatenation never needs to
//! renumber anything.
//!
//! # Example
//!
//! ```
//! use pgcompose::{Fragment, Value};
//!
//! let q = Fragment::literal("SELECT * FROM ")
//!     + Fragment::ident("users")
//!     + Fragment::literal(" WHERE id = ")
//!     + Fragment::bind(42_i64);
//!
//! assert_eq!(q.to_sql(), r#"SELECT * FROM "users" WHERE id = $1"#);
//! assert_eq!(q.bindings(), vec![Value::Int8(42)]);
//! ```

use crate::ident::{Ident, write_quoted};
use crate::value::Value;
use std::fmt::Write;
use std::ops::Add;
use tokio_postgres::types::ToSql;


/// One piece of a [`Fragment`].
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal SQL text.
    Text(String),
    /// A placeholder bound to a value.
    Bind(Value),
}

/// An immutable SQL fragment with inline bindings.
///
/// All combinators consume their inputs and return a new fragment; nothing is
/// shared or mutated, so fragments can be built on any thread and rendered any
/// number of times with identical results.
#[must_use]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    segments: Vec<Segment>,
}

impl Fragment {
    /// The empty fragment (identity for concatenation).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Literal SQL text.
    pub fn literal(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return Self::empty();
        }
        Self {
            segments: vec![Segment::Text(text)],
        }
    }

    /// A single bound value.
    pub fn bind(value: impl Into<Value>) -> Self {
        Self {
            segments: vec![Segment::Bind(value.into())],
        }
    }

    /// A double-quoted identifier.
    pub fn ident(name: &str) -> Self {
        let mut s = String::new();
        write_quoted(name, &mut s);
        Self::literal(s)
    }

    /// A (possibly qualified) identifier.
    pub fn ident_ref(ident: &Ident) -> Self {
        let mut s = String::new();
        ident.write_sql(&mut s);
        Self::literal(s)
    }

    /// Append another fragment.
    pub fn concat(mut self, other: Fragment) -> Self {
        for seg in other.segments {
            self.push_segment(seg);
        }
        self
    }

    /// Append literal text.
    pub fn push(self, text: &str) -> Self {
        self.concat(Fragment::literal(text))
    }

    /// Append a bound value.
    pub fn push_bind(self, value: impl Into<Value>) -> Self {
        self.concat(Fragment::bind(value))
    }

    /// Join fragments with a literal separator.
    ///
    /// Empty fragments are skipped, so they never produce dangling separators.
    pub fn join(fragments: impl IntoIterator<Item = Fragment>, separator: &str) -> Self {
        let mut out = Fragment::empty();
        let mut first = true;
        for fragment in fragments {
            if fragment.is_empty() {
                continue;
            }
            if !first {
                out = out.push(separator);
            }
            first = false;
            out = out.concat(fragment);
        }
        out
    }

    /// Indent every line of text by two spaces.
    pub fn indent(self) -> Self {
        if self.is_empty() {
            return self;
        }
        let mut out = Fragment::literal("  ");
        for seg in self.segments {
            match seg {
                Segment::Text(text) => {
                    out.push_segment(Segment::Text(text.replace('\n', "\n  ")));
                }
                bind => out.push_segment(bind),
            }
        }
        out
    }

    /// Wrap in parentheses.
    pub fn parenthesized(self) -> Self {
        Fragment::literal("(").concat(self).push(")")
    }

    /// Whether this fragment renders to empty text with no bindings.
    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|seg| match seg {
            Segment::Text(text) => text.is_empty(),
            Segment::Bind(_) => false,
        })
    }

    /// The raw segments, in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of bind placeholders.
    pub fn placeholder_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|seg| matches!(seg, Segment::Bind(_)))
            .count()
    }

    /// Render SQL with `$1, $2, ...` placeholders, numbered left to right.
    pub fn to_sql(&self) -> String {
        let mut cap = 0;
        let mut idx: usize = 0;
        for seg in &self.segments {
            match seg {
                Segment::Text(text) => cap += text.len(),
                Segment::Bind(_) => {
                    idx += 1;
                    cap += 1 + (idx.ilog10() as usize) + 1;
                }
            }
        }

        let mut out = String::with_capacity(cap);
        idx = 0;
        for seg in &self.segments {
            match seg {
                Segment::Text(text) => out.push_str(text),
                Segment::Bind(_) => {
                    idx += 1;
                    let _ = write!(out, "${idx}");
                }
            }
        }
        out
    }

    /// Bound values in placeholder order.
    pub fn bindings(&self) -> Vec<Value> {
        self.bind_iter().cloned().collect()
    }

    /// Parameter refs compatible with `tokio-postgres`, in placeholder order.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.bind_iter()
            .map(|v| v as &(dyn ToSql + Sync))
            .collect()
    }

    /// Render into the `(sql, bindings)` pair handed to the driver.
    pub fn into_parts(self) -> (String, Vec<Value>) {
        let sql = self.to_sql();
        let values = self
            .segments
            .into_iter()
            .filter_map(|seg| match seg {
                Segment::Bind(v) => Some(v),
                Segment::Text(_) => None,
            })
            .collect();
        (sql, values)
    }

    fn bind_iter(&self) -> impl Iterator<Item = &Value> {
        self.segments.iter().filter_map(|seg| match seg {
            Segment::Bind(v) => Some(v),
            Segment::Text(_) => None,
        })
    }

    fn push_segment(&mut self, seg: Segment) {
        match seg {
            Segment::Text(text) => {
                if text.is_empty() {
                    return;
                }
                match self.segments.last_mut() {
                    Some(Segment::Text(last)) => last.push_str(&text),
                    _ => self.segments.push(Segment::Text(text)),
                }
            }
            bind => self.segments.push(bind),
        }
    }
}

impl Add for Fragment {
    type Output = Fragment;

    fn add(self, rhs: Fragment) -> Fragment {
        self.concat(rhs)
    }
}

impl From<&str> for Fragment {
    fn from(text: &str) -> Self {
        Fragment::literal(text)
    }
}

impl From<String> for Fragment {
    fn from(text: String) -> Self {
        Fragment::literal(text)
    }
}
