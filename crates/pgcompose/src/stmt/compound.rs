use super::{Query, Statement, StatementKind};
use crate::error::{BuildError, BuildResult};
use crate::fragment::Fragment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOp {
    Union,
    UnionAll,
    Intersect,
    Except,
}

impl SetOp {
    pub fn as_sql(self) -> &'static str {
        match self {
            SetOp::Union => "UNION",
            SetOp::UnionAll => "UNION ALL",
            SetOp::Intersect => "INTERSECT",
            SetOp::Except => "EXCEPT",
        }
    }
}

/// Queries combined with `UNION`/`INTERSECT`/`EXCEPT`, applied left to right.
///
/// An arm with its own ORDER BY/LIMIT/OFFSET (or a nested set operation) is
/// parenthesized so those clauses stay attached to it. An arm that renders
/// empty is treated as the empty set:
///
/// - `UNION [ALL]`: the empty side is dropped.
/// - `EXCEPT`: an empty right side is dropped; an empty left side stays empty.
/// - `INTERSECT`: either side empty makes the result empty.
#[must_use]
#[derive(Debug, Clone)]
pub struct Compound {
    first: Fragment,
    rest: Vec<(SetOp, Fragment)>,
    build_error: Option<BuildError>,
}

/// An arm's text, parenthesized when its clauses would otherwise leak.
fn arm(query: &impl Query) -> Fragment {
    let fragment = query.to_fragment();
    if fragment.is_empty() || !query.needs_parens() {
        return fragment;
    }
    Fragment::literal("(\n")
        .concat(fragment.indent())
        .push("\n)")
}

impl Compound {
    pub fn new(first: &impl Query) -> Self {
        Self {
            first: arm(first),
            rest: Vec::new(),
            build_error: first.validate().err(),
        }
    }

    pub fn push(mut self, op: SetOp, query: &impl Query) -> Self {
        if self.build_error.is_none() {
            self.build_error = query.validate().err();
        }
        self.rest.push((op, arm(query)));
        self
    }

    pub fn union(self, query: &impl Query) -> Self {
        self.push(SetOp::Union, query)
    }

    pub fn union_all(self, query: &impl Query) -> Self {
        self.push(SetOp::UnionAll, query)
    }

    pub fn intersect(self, query: &impl Query) -> Self {
        self.push(SetOp::Intersect, query)
    }

    pub fn except(self, query: &impl Query) -> Self {
        self.push(SetOp::Except, query)
    }
}

impl Statement for Compound {
    fn to_fragment(&self) -> Fragment {
        let mut out = self.first.clone();
        // Whether `out` ends in a top-level UNION/EXCEPT, which INTERSECT
        // would otherwise bind tighter than.
        let mut loose = false;
        for (op, arm) in &self.rest {
            let keep_left = match op {
                SetOp::Union | SetOp::UnionAll => {
                    if out.is_empty() {
                        out = arm.clone();
                        loose = false;
                        continue;
                    }
                    arm.is_empty()
                }
                SetOp::Except => out.is_empty() || arm.is_empty(),
                SetOp::Intersect => {
                    if out.is_empty() || arm.is_empty() {
                        out = Fragment::empty();
                        loose = false;
                        continue;
                    }
                    false
                }
            };
            if keep_left {
                continue;
            }
            if *op == SetOp::Intersect && loose {
                out = Fragment::literal("(\n").concat(out.indent()).push("\n)");
            }
            out = out
                .push("\n")
                .push(op.as_sql())
                .push("\n")
                .concat(arm.clone());
            loose = *op != SetOp::Intersect;
        }
        out
    }

    fn kind(&self) -> StatementKind {
        StatementKind::Compound
    }

    fn validate(&self) -> BuildResult<()> {
        match &self.build_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

impl Query for Compound {
    fn needs_parens(&self) -> bool {
        true
    }
}
