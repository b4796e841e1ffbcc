use super::{Expr, IntoExpr, Shape};
use crate::fragment::Fragment;
use crate::stmt::Statement;
use crate::value::SqlType;

impl<T: SqlType> Expr<T> {
    /// `(expr) IN (a, b, ...)`.
    ///
    /// An empty list renders `(expr) IN (NULL)`, which is never true.
    pub fn in_list<I>(self, values: I) -> Expr<bool>
    where
        I: IntoIterator,
        I::Item: IntoExpr<T>,
    {
        let items = list::<T, _>(values);
        let fragment = self
            .operand()
            .push(" IN ")
            .concat(items.unwrap_or_else(|| Fragment::literal("NULL")).parenthesized());
        Expr::with_shape(fragment, Shape::Compound)
    }

    /// `(expr) NOT IN (a, b, ...)`. An empty list yields `TRUE`.
    pub fn not_in<I>(self, values: I) -> Expr<bool>
    where
        I: IntoIterator,
        I::Item: IntoExpr<T>,
    {
        match list::<T, _>(values) {
            Some(items) => Expr::with_shape(
                self.operand().push(" NOT IN ").concat(items.parenthesized()),
                Shape::Compound,
            ),
            None => Expr::constant(true),
        }
    }

    /// `(expr) IN (subquery)`.
    pub fn in_select(self, query: &impl Statement) -> Expr<bool> {
        let query = query.to_fragment();
        if query.is_empty() {
            return self.in_list(std::iter::empty::<Expr<T>>());
        }
        let fragment = self
            .operand()
            .push(" IN (\n")
            .concat(query.indent())
            .push("\n)");
        Expr::with_shape(fragment, Shape::Compound)
    }
}

/// `EXISTS (subquery)`. An empty query yields `FALSE`.
pub fn exists(query: &impl Statement) -> Expr<bool> {
    let query = query.to_fragment();
    if query.is_empty() {
        return Expr::constant(false);
    }
    Expr::with_shape(
        Fragment::literal("EXISTS (\n")
            .concat(query.indent())
            .push("\n)"),
        Shape::Compound,
    )
}

fn list<T, I>(values: I) -> Option<Fragment>
where
    T: SqlType,
    I: IntoIterator,
    I::Item: IntoExpr<T>,
{
    let items = Fragment::join(values.into_iter().map(|v| v.into_expr().term()), ", ");
    (!items.is_empty()).then_some(items)
}
