use super::Expr;
use crate::fragment::Fragment;
use crate::value::SqlType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nulls {
    First,
    Last,
}

/// One `ORDER BY` item.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTerm {
    expr: Fragment,
    direction: Option<Direction>,
    nulls: Option<Nulls>,
}

impl OrderTerm {
    /// Order by `expr` with the server's default direction.
    pub fn new<T: SqlType>(expr: Expr<T>) -> Self {
        Self {
            expr: expr.term(),
            direction: None,
            nulls: None,
        }
    }

    pub fn asc(mut self) -> Self {
        self.direction = Some(Direction::Asc);
        self
    }

    pub fn desc(mut self) -> Self {
        self.direction = Some(Direction::Desc);
        self
    }

    pub fn nulls_first(mut self) -> Self {
        self.nulls = Some(Nulls::First);
        self
    }

    pub fn nulls_last(mut self) -> Self {
        self.nulls = Some(Nulls::Last);
        self
    }

    pub fn to_fragment(&self) -> Fragment {
        let mut out = self.expr.clone();
        match self.direction {
            Some(Direction::Asc) => out = out.push(" ASC"),
            Some(Direction::Desc) => out = out.push(" DESC"),
            None => {}
        }
        match self.nulls {
            Some(Nulls::First) => out = out.push(" NULLS FIRST"),
            Some(Nulls::Last) => out = out.push(" NULLS LAST"),
            None => {}
        }
        out
    }
}

impl<T: SqlType> From<Expr<T>> for OrderTerm {
    fn from(expr: Expr<T>) -> Self {
        OrderTerm::new(expr)
    }
}
