use crate::expr::Expr;
use crate::fragment::Fragment;
use crate::schema::TableRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinKind {
    pub fn as_sql(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL JOIN",
        }
    }
}

/// One `JOIN table ON condition` entry.
#[derive(Debug, Clone)]
pub struct Join {
    pub kind: JoinKind,
    pub table: TableRef,
    pub on: Expr<bool>,
    /// The joined table's baseline, applied in default scope.
    pub baseline: Option<Expr<bool>>,
}

impl Join {
    pub fn to_fragment(&self, scoped: bool) -> Fragment {
        let on = match &self.baseline {
            Some(baseline) if scoped => self.on.clone().and(baseline.clone()),
            _ => self.on.clone(),
        };
        Fragment::literal(self.kind.as_sql())
            .push(" ")
            .concat(self.table.from_fragment())
            .push(" ON ")
            .concat(on.into_fragment())
    }
}
