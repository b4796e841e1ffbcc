//! Typed SQL expressions.
//!
//! An [`Expr<T>`] is a [`Fragment`] tagged with the [`SqlType`] it evaluates to.
//! Comparison operators only accept right-hand sides convertible into the same
//! `T`, so comparing an `int8` column with a `text` literal fails to compile.
//!
//! Binary operators render as `(lhs) OP (rhs)`; `=`/`<>` against a NULL literal
//! or between row values are rewritten to `IS [NOT] DISTINCT FROM`.

mod binary;
mod membership;
mod order;


pub use binary::BinaryOp;
pub use membership::exists;
pub use order::{Direction, Nulls, OrderTerm};

pub(crate) use binary::binary;

use crate::fragment::Fragment;
use crate::value::{SqlType, Value, ValueKind};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, BitAnd, BitOr, Div, Mul, Not, Sub};
use uuid::Uuid;

/// How an expression delimits itself when used as an operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape {
    /// Column, bind, literal or raw text.
    Atom,
    /// The NULL literal.
    Null,
    /// `(a, b, ...)` row constructor.
    Row,
    /// Already parenthesized, e.g. a scalar subquery.
    Grouped,
    /// Operator application.
    Compound,
}

/// A SQL expression evaluating to `T`.
#[must_use]
pub struct Expr<T> {
    fragment: Fragment,
    shape: Shape,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Clone for Expr<T> {
    fn clone(&self) -> Self {
        Self {
            fragment: self.fragment.clone(),
            shape: self.shape,
            _kind: PhantomData,
        }
    }
}

impl<T> PartialEq for Expr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.fragment == other.fragment
    }
}

impl<T: SqlType> fmt::Debug for Expr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expr")
            .field("kind", &T::KIND)
            .field("sql", &self.fragment.to_sql())
            .field("bindings", &self.fragment.bindings())
            .finish()
    }
}

#[allow(clippy::should_implement_trait)]
impl<T: SqlType> Expr<T> {
    pub(crate) fn with_shape(fragment: Fragment, shape: Shape) -> Self {
        Self {
            fragment,
            shape,
            _kind: PhantomData,
        }
    }

    /// Raw SQL trusted to evaluate to `T`.
    pub fn raw(fragment: impl Into<Fragment>) -> Self {
        Self::with_shape(fragment.into(), Shape::Atom)
    }

    /// A bound value.
    pub fn bind(value: impl Into<Value>) -> Self {
        Self::with_shape(Fragment::bind(value), Shape::Atom)
    }

    /// The `NULL` literal.
    pub fn null() -> Self {
        Self::with_shape(Fragment::literal("NULL"), Shape::Null)
    }

    /// A parenthesized scalar subquery.
    pub fn subquery(query: &impl crate::stmt::Statement) -> Self {
        Self::with_shape(
            Fragment::literal("(\n")
                .concat(query.to_fragment().indent())
                .push("\n)"),
            Shape::Grouped,
        )
    }

    /// The value kind this expression evaluates to.
    pub fn kind(&self) -> ValueKind {
        T::KIND
    }

    /// Whether this expression is the `NULL` literal.
    pub fn is_null_literal(&self) -> bool {
        self.shape == Shape::Null
    }

    /// Whether this expression is a row constructor.
    pub fn is_row(&self) -> bool {
        self.shape == Shape::Row || T::KIND == ValueKind::Row
    }

    /// The rendered SQL and its bindings.
    pub fn fragment(&self) -> &Fragment {
        &self.fragment
    }

    /// Consume into the underlying fragment, without outer parentheses.
    pub fn into_fragment(self) -> Fragment {
        self.fragment
    }

    /// Debug helper to get the SQL string.
    pub fn to_sql(&self) -> String {
        self.fragment.to_sql()
    }

    /// Render for use as an operator operand: `(expr)`.
    pub(crate) fn operand(self) -> Fragment {
        match self.shape {
            Shape::Row | Shape::Grouped => self.fragment,
            _ => self.fragment.parenthesized(),
        }
    }

    /// Render for use in a list (select list, ORDER BY, VALUES...).
    pub(crate) fn term(self) -> Fragment {
        match self.shape {
            Shape::Compound => self.fragment.parenthesized(),
            _ => self.fragment,
        }
    }

    pub(crate) fn retype<U: SqlType>(self) -> Expr<U> {
        Expr::with_shape(self.fragment, self.shape)
    }

    /// View a non-null expression as its nullable counterpart.
    pub fn nullable(self) -> Expr<Option<T>> {
        self.retype()
    }

    /// `(self) = (rhs)`, or `IS NOT DISTINCT FROM` against NULL or a row.
    ///
    /// ```ignore
    /// users.col(EMAIL).eq(Null);      // ("users"."email") IS NOT DISTINCT FROM (NULL)
    /// users.col(NAME).eq("alice");    // ("users"."name") = ($1)
    /// ```
    pub fn eq(self, rhs: impl IntoExpr<T>) -> Expr<bool> {
        binary(self, BinaryOp::Eq, rhs.into_expr())
    }

    /// `(self) <> (rhs)`, or `IS DISTINCT FROM` against NULL or a row.
    pub fn ne(self, rhs: impl IntoExpr<T>) -> Expr<bool> {
        binary(self, BinaryOp::Ne, rhs.into_expr())
    }

    /// `(self) < (rhs)`
    pub fn lt(self, rhs: impl IntoExpr<T>) -> Expr<bool> {
        binary(self, BinaryOp::Lt, rhs.into_expr())
    }

    /// `(self) <= (rhs)`
    pub fn le(self, rhs: impl IntoExpr<T>) -> Expr<bool> {
        binary(self, BinaryOp::Le, rhs.into_expr())
    }

    /// `(self) > (rhs)`
    pub fn gt(self, rhs: impl IntoExpr<T>) -> Expr<bool> {
        binary(self, BinaryOp::Gt, rhs.into_expr())
    }

    /// `(self) >= (rhs)`
    pub fn ge(self, rhs: impl IntoExpr<T>) -> Expr<bool> {
        binary(self, BinaryOp::Ge, rhs.into_expr())
    }

    /// NULL-safe equality: `IS NOT DISTINCT FROM`.
    pub fn is(self, rhs: impl IntoExpr<T>) -> Expr<bool> {
        binary(self, BinaryOp::Is, rhs.into_expr())
    }

    /// NULL-safe inequality: `IS DISTINCT FROM`.
    pub fn is_not(self, rhs: impl IntoExpr<T>) -> Expr<bool> {
        binary(self, BinaryOp::IsNot, rhs.into_expr())
    }

    /// `(self) IS NULL`
    pub fn is_null(self) -> Expr<bool> {
        Expr::with_shape(self.operand().push(" IS NULL"), Shape::Compound)
    }

    /// `(self) IS NOT NULL`
    pub fn is_not_null(self) -> Expr<bool> {
        Expr::with_shape(self.operand().push(" IS NOT NULL"), Shape::Compound)
    }

    /// `(expr) BETWEEN (low) AND (high)`
    pub fn between(self, low: impl IntoExpr<T>, high: impl IntoExpr<T>) -> Expr<bool> {
        let fragment = self
            .operand()
            .push(" BETWEEN ")
            .concat(low.into_expr().operand())
            .push(" AND ")
            .concat(high.into_expr().operand());
        Expr::with_shape(fragment, Shape::Compound)
    }

    /// Ascending order term.
    pub fn asc(self) -> OrderTerm {
        OrderTerm::new(self).asc()
    }

    /// Descending order term.
    pub fn desc(self) -> OrderTerm {
        OrderTerm::new(self).desc()
    }
}

impl Expr<bool> {
    /// `TRUE` or `FALSE`.
    pub fn constant(value: bool) -> Self {
        Self::raw(if value { "TRUE" } else { "FALSE" })
    }

    /// `(self) AND (rhs)`
    pub fn and(self, rhs: impl IntoExpr<bool>) -> Self {
        binary(self, BinaryOp::And, rhs.into_expr())
    }

    /// `(self) OR (rhs)`
    pub fn or(self, rhs: impl IntoExpr<bool>) -> Self {
        binary(self, BinaryOp::Or, rhs.into_expr())
    }

    /// `NOT (self)`
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::with_shape(Fragment::literal("NOT ").concat(self.operand()), Shape::Compound)
    }

    /// Flat conjunction `(a) AND (b) AND ...`; a single predicate is returned
    /// unchanged and an empty list yields `None`.
    pub fn all(exprs: impl IntoIterator<Item = Expr<bool>>) -> Option<Self> {
        Self::connect(exprs, " AND ")
    }

    /// Flat disjunction `(a) OR (b) OR ...`.
    pub fn any(exprs: impl IntoIterator<Item = Expr<bool>>) -> Option<Self> {
        Self::connect(exprs, " OR ")
    }

    fn connect(exprs: impl IntoIterator<Item = Expr<bool>>, separator: &str) -> Option<Self> {
        let mut exprs: Vec<Expr<bool>> = exprs.into_iter().collect();
        match exprs.len() {
            0 => None,
            1 => exprs.pop(),
            _ => Some(Self::with_shape(
                Fragment::join(exprs.into_iter().map(Expr::operand), separator),
                Shape::Compound,
            )),
        }
    }
}

impl Not for Expr<bool> {
    type Output = Expr<bool>;

    fn not(self) -> Expr<bool> {
        Expr::<bool>::not(self)
    }
}

impl<R: IntoExpr<bool>> BitAnd<R> for Expr<bool> {
    type Output = Expr<bool>;

    fn bitand(self, rhs: R) -> Expr<bool> {
        self.and(rhs)
    }
}

impl<R: IntoExpr<bool>> BitOr<R> for Expr<bool> {
    type Output = Expr<bool>;

    fn bitor(self, rhs: R) -> Expr<bool> {
        self.or(rhs)
    }
}

/// Types supporting SQL arithmetic.
pub trait Numeric: SqlType {}

impl Numeric for i16 {}
impl Numeric for i32 {}
impl Numeric for i64 {}
impl Numeric for f32 {}
impl Numeric for f64 {}
impl<T: Numeric> Numeric for Option<T> {}

macro_rules! impl_arithmetic {
    ($($trait:ident :: $method:ident => $op:ident),* $(,)?) => {
        $(
            impl<T: Numeric, R: IntoExpr<T>> $trait<R> for Expr<T> {
                type Output = Expr<T>;

                fn $method(self, rhs: R) -> Expr<T> {
                    binary(self, BinaryOp::$op, rhs.into_expr())
                }
            }
        )*
    };
}

impl_arithmetic! {
    Add::add => Add,
    Sub::sub => Sub,
    Mul::mul => Mul,
    Div::div => Div,
}

/// Text-valued types supporting pattern matching.
pub trait Textual: SqlType {}

impl Textual for String {}
impl Textual for Option<String> {}

impl<T: Textual> Expr<T> {
    /// `(self) LIKE (pattern)`
    pub fn like(self, pattern: impl IntoExpr<String>) -> Expr<bool> {
        binary(self, BinaryOp::Like, pattern.into_expr())
    }

    /// Case-insensitive `LIKE`.
    pub fn ilike(self, pattern: impl IntoExpr<String>) -> Expr<bool> {
        binary(self, BinaryOp::ILike, pattern.into_expr())
    }

    /// `(self) NOT LIKE (pattern)`
    pub fn not_like(self, pattern: impl IntoExpr<String>) -> Expr<bool> {
        binary(self, BinaryOp::NotLike, pattern.into_expr())
    }
}

/// The untyped `NULL` literal, usable wherever a nullable expression is
/// expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Null;

/// Conversion into an [`Expr<T>`].
///
/// Implemented for expressions of the same type, for plain values (bound as
/// parameters), for `Option<T>` (where `None` becomes the NULL literal) and for
/// tuples (row constructors).
pub trait IntoExpr<T: SqlType> {
    fn into_expr(self) -> Expr<T>;
}

impl<T: SqlType> IntoExpr<T> for Expr<T> {
    fn into_expr(self) -> Expr<T> {
        self
    }
}

impl<T: SqlType> IntoExpr<T> for &Expr<T> {
    fn into_expr(self) -> Expr<T> {
        self.clone()
    }
}

impl<T: SqlType> IntoExpr<Option<T>> for Null {
    fn into_expr(self) -> Expr<Option<T>> {
        Expr::null()
    }
}

impl<T: SqlType + Into<Value>> IntoExpr<Option<T>> for Option<T> {
    fn into_expr(self) -> Expr<Option<T>> {
        match self {
            Some(v) => Expr::bind(v),
            None => Expr::null(),
        }
    }
}

macro_rules! impl_into_expr {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoExpr<$ty> for $ty {
                fn into_expr(self) -> Expr<$ty> {
                    Expr::bind(self)
                }
            }

            impl IntoExpr<Option<$ty>> for $ty {
                fn into_expr(self) -> Expr<Option<$ty>> {
                    Expr::bind(self)
                }
            }
        )*
    };
}

impl_into_expr!(
    bool,
    i16,
    i32,
    i64,
    f32,
    f64,
    String,
    Vec<u8>,
    Uuid,
    NaiveDate,
    NaiveDateTime,
    DateTime<Utc>,
    serde_json::Value,
);

impl IntoExpr<String> for &str {
    fn into_expr(self) -> Expr<String> {
        Expr::bind(self)
    }
}

impl IntoExpr<Option<String>> for &str {
    fn into_expr(self) -> Expr<Option<String>> {
        Expr::bind(self)
    }
}

impl<A, B, RA, RB> IntoExpr<(A, B)> for (RA, RB)
where
    A: SqlType,
    B: SqlType,
    RA: IntoExpr<A>,
    RB: IntoExpr<B>,
{
    fn into_expr(self) -> Expr<(A, B)> {
        row_of([self.0.into_expr().term(), self.1.into_expr().term()])
    }
}

impl<A, B, C, RA, RB, RC> IntoExpr<(A, B, C)> for (RA, RB, RC)
where
    A: SqlType,
    B: SqlType,
    C: SqlType,
    RA: IntoExpr<A>,
    RB: IntoExpr<B>,
    RC: IntoExpr<C>,
{
    fn into_expr(self) -> Expr<(A, B, C)> {
        row_of([
            self.0.into_expr().term(),
            self.1.into_expr().term(),
            self.2.into_expr().term(),
        ])
    }
}

/// A two-column row constructor `(a, b)`.
pub fn row<A: SqlType, B: SqlType>(a: impl IntoExpr<A>, b: impl IntoExpr<B>) -> Expr<(A, B)> {
    (a, b).into_expr()
}

fn row_of<T: SqlType>(items: impl IntoIterator<Item = Fragment>) -> Expr<T> {
    Expr::with_shape(Fragment::join(items, ", ").parenthesized(), Shape::Row)
}
