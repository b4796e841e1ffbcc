use crate::expr::{Expr, OrderTerm};
use crate::fragment::Fragment;
use crate::predicate::Where;

/// `DISTINCT` modifier of a SELECT.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Distinct {
    #[default]
    None,
    All,
    On(Vec<Fragment>),
}

impl Distinct {
    fn merge(self, other: Distinct) -> Distinct {
        match (self, other) {
            (Distinct::On(mut a), Distinct::On(b)) => {
                a.extend(b);
                Distinct::On(a)
            }
            (Distinct::On(a), _) | (_, Distinct::On(a)) => Distinct::On(a),
            (Distinct::All, _) | (_, Distinct::All) => Distinct::All,
            (Distinct::None, Distinct::None) => Distinct::None,
        }
    }

    pub(crate) fn or_all(self) -> Distinct {
        match self {
            Distinct::None => Distinct::All,
            other => other,
        }
    }

    pub(crate) fn to_fragment(&self) -> Fragment {
        match self {
            Distinct::None => Fragment::empty(),
            Distinct::All => Fragment::literal("DISTINCT "),
            Distinct::On(items) => Fragment::literal("DISTINCT ON ")
                .concat(Fragment::join(items.iter().cloned(), ", ").parenthesized())
                .push(" "),
        }
    }
}

/// The clauses shared by every SELECT: DISTINCT, WHERE (with the table
/// baseline), GROUP BY, HAVING, ORDER BY, LIMIT and OFFSET.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClauseSet {
    pub distinct: Distinct,
    pub filter: Where,
    pub baseline: Vec<Expr<bool>>,
    pub group_by: Vec<Fragment>,
    pub having: Where,
    pub order_by: Vec<OrderTerm>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ClauseSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Combine two clause sets.
    ///
    /// GROUP BY and ORDER BY concatenate, WHERE and HAVING are AND-ed,
    /// LIMIT/OFFSET from `other` win when set, DISTINCT keeps the stronger form.
    pub fn merge(self, other: ClauseSet) -> ClauseSet {
        let mut baseline = self.baseline;
        for expr in other.baseline {
            if !baseline.contains(&expr) {
                baseline.push(expr);
            }
        }
        let mut group_by = self.group_by;
        group_by.extend(other.group_by);
        let mut order_by = self.order_by;
        order_by.extend(other.order_by);

        ClauseSet {
            distinct: self.distinct.merge(other.distinct),
            filter: self.filter.and(other.filter),
            baseline,
            group_by,
            having: self.having.and(other.having),
            order_by,
            limit: other.limit.or(self.limit),
            offset: other.offset.or(self.offset),
        }
    }

    /// `WHERE ...` through `OFFSET ...`, one clause per line.
    pub fn render_tail(&self) -> Fragment {
        let group_by = if self.group_by.is_empty() {
            Fragment::empty()
        } else {
            Fragment::literal("GROUP BY ")
                .concat(Fragment::join(self.group_by.iter().cloned(), ", "))
        };
        let order_by = if self.order_by.is_empty() {
            Fragment::empty()
        } else {
            Fragment::literal("ORDER BY ").concat(Fragment::join(
                self.order_by.iter().map(OrderTerm::to_fragment),
                ", ",
            ))
        };
        let limit = self
            .limit
            .map(|n| Fragment::literal("LIMIT ").push_bind(n))
            .unwrap_or_default();
        let offset = self
            .offset
            .map(|n| Fragment::literal("OFFSET ").push_bind(n))
            .unwrap_or_default();

        super::lines([
            self.filter.clause("WHERE", &self.baseline),
            group_by,
            self.having.clause("HAVING", &[]),
            order_by,
            limit,
            offset,
        ])
    }
}
