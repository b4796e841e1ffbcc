//! Predicate sets with scope.
//!
//! A [`Where`] is a list of boolean expressions conjoined when rendered, plus a
//! [`Scope`] that decides how the table's baseline predicate is applied:
//!
//! - [`Scope::Default`]: baseline AND local predicates.
//! - [`Scope::Empty`]: matches nothing; renders `FALSE`.
//! - [`Scope::Unscoped`]: local predicates only, baseline skipped.
//!
//! Combining with an empty set is the identity: `p.and(Where::new()) == p`.

use crate::expr::{Expr, IntoExpr};
use crate::fragment::Fragment;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Scope {
    #[default]
    Default,
    Unscoped,
    Empty,
}

impl Scope {
    /// The more restrictive of two scopes: `Empty` > `Unscoped` > `Default`.
    pub fn merge(self, other: Scope) -> Scope {
        self.max(other)
    }
}

/// A scoped predicate set.
#[must_use]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Where {
    predicates: Vec<Expr<bool>>,
    scope: Scope,
}

impl Where {
    /// Empty set in the default scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Matches no rows.
    pub fn none() -> Self {
        Self {
            predicates: Vec::new(),
            scope: Scope::Empty,
        }
    }

    /// Skips the table baseline.
    pub fn unscoped() -> Self {
        Self {
            predicates: Vec::new(),
            scope: Scope::Unscoped,
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Add a predicate, conjoined with the existing ones.
    pub fn filter(mut self, predicate: impl IntoExpr<bool>) -> Self {
        self.predicates.push(predicate.into_expr());
        self
    }

    pub fn predicates(&self) -> &[Expr<bool>] {
        &self.predicates
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// `(self) AND (other)`, collapsed into a single predicate.
    pub fn and(self, other: Where) -> Where {
        self.combine(other, |lhs, rhs| lhs.and(rhs))
    }

    /// `(self) OR (other)`, collapsed into a single predicate.
    pub fn or(self, other: Where) -> Where {
        self.combine(other, |lhs, rhs| lhs.or(rhs))
    }

    /// `NOT (self)`; negating the empty set yields `NOT (TRUE)`.
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Where {
        let inner = Expr::<bool>::all(self.predicates).unwrap_or_else(|| Expr::constant(true));
        Where {
            predicates: vec![inner.not()],
            scope: self.scope,
        }
    }

    fn combine(self, other: Where, op: fn(Expr<bool>, Expr<bool>) -> Expr<bool>) -> Where {
        let scope = self.scope.merge(other.scope);
        if other.predicates.is_empty() {
            return Where {
                predicates: self.predicates,
                scope,
            };
        }
        if self.predicates.is_empty() {
            return Where {
                predicates: other.predicates,
                scope,
            };
        }
        let lhs = Expr::<bool>::all(self.predicates);
        let rhs = Expr::<bool>::all(other.predicates);
        let predicates = match (lhs, rhs) {
            (Some(lhs), Some(rhs)) => vec![op(lhs, rhs)],
            _ => Vec::new(),
        };
        Where { predicates, scope }
    }

    /// Render the condition body (without the `WHERE` keyword).
    ///
    /// `baseline` is used only in the default scope. Returns `None` when there
    /// is nothing to filter on.
    pub fn render(&self, baseline: &[Expr<bool>]) -> Option<Fragment> {
        let predicates: Vec<Expr<bool>> = match self.scope {
            Scope::Empty => return Some(Fragment::literal("FALSE")),
            Scope::Unscoped => self.predicates.clone(),
            Scope::Default => baseline
                .iter()
                .chain(self.predicates.iter())
                .cloned()
                .collect(),
        };
        Expr::<bool>::all(predicates).map(Expr::into_fragment)
    }

    /// `WHERE ...` clause, or the empty fragment.
    pub(crate) fn clause(&self, keyword: &str, baseline: &[Expr<bool>]) -> Fragment {
        match self.render(baseline) {
            Some(body) => Fragment::literal(keyword).push(" ").concat(body),
            None => Fragment::empty(),
        }
    }
}

impl From<Expr<bool>> for Where {
    fn from(predicate: Expr<bool>) -> Self {
        Where::new().filter(predicate)
    }
}
