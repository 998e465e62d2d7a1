//! Index arithmetic shared by concrete and symbolic queries.
//!
//! Every incidence query in this crate is written once, generically over
//! [`IndexValue`]. With `i64` indices the arithmetic is evaluated immediately;
//! with [`IndexExpr`] indices the same operations build an expression tree that
//! a code generator can emit (e.g. `(i0 + 1)` for the upper vertex of an edge).
//!
//! `IndexExpr` constructors fold constants and keep a trailing constant on
//! sums, so two composition paths that accumulate the same offset produce
//! structurally equal expressions and deduplicate.

use crate::mesh_error::MeshStructureError;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Integer arithmetic needed by flattening, offset accumulation and guards.
pub trait IndexValue:
    Clone + fmt::Debug + fmt::Display + Eq + std::hash::Hash + Send + Sync + 'static
{
    /// Lift an integer constant.
    fn constant(value: i64) -> Self;
    /// The value, when it is known.
    fn as_constant(&self) -> Option<i64>;
    /// `self + by`.
    fn shifted(&self, by: i64) -> Self;
    /// `self + other`.
    fn plus(&self, other: &Self) -> Self;
    /// `self - other`.
    fn minus(&self, other: &Self) -> Self;
    /// `self * other`.
    fn times(&self, other: &Self) -> Self;
    /// `self * by`.
    fn scaled(&self, by: i64) -> Self;
    /// `floor(self / by)`; `by` must be positive.
    fn floor_div(&self, by: i64) -> Self;
    /// Euclidean remainder modulo a positive `modulus`.
    fn wrap(&self, modulus: i64) -> Self;
    /// `table[at]`; `None` when `at` is known to fall outside the table.
    fn lookup(table: &Arc<[i64]>, at: &Self) -> Option<Self>;
    /// `(rest, c)` with `self == rest + c` and `c` the trailing constant.
    fn split_constant(&self) -> (Self, i64);

    #[inline]
    fn is_concrete(&self) -> bool {
        self.as_constant().is_some()
    }
}

impl IndexValue for i64 {
    #[inline]
    fn constant(value: i64) -> Self {
        value
    }
    #[inline]
    fn as_constant(&self) -> Option<i64> {
        Some(*self)
    }
    #[inline]
    fn shifted(&self, by: i64) -> Self {
        self + by
    }
    #[inline]
    fn plus(&self, other: &Self) -> Self {
        self + other
    }
    #[inline]
    fn minus(&self, other: &Self) -> Self {
        self - other
    }
    #[inline]
    fn times(&self, other: &Self) -> Self {
        self * other
    }
    #[inline]
    fn scaled(&self, by: i64) -> Self {
        self * by
    }
    #[inline]
    fn floor_div(&self, by: i64) -> Self {
        self.div_euclid(by)
    }
    #[inline]
    fn wrap(&self, modulus: i64) -> Self {
        self.rem_euclid(modulus)
    }
    #[inline]
    fn lookup(table: &Arc<[i64]>, at: &Self) -> Option<Self> {
        usize::try_from(*at).ok().and_then(|k| table.get(k)).copied()
    }
    #[inline]
    fn split_constant(&self) -> (Self, i64) {
        (0, *self)
    }
}

/// Symbolic integer expression over named loop variables.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexExpr {
    Const(i64),
    Var(Arc<str>),
    Sum(Box<IndexExpr>, Box<IndexExpr>),
    Product(Box<IndexExpr>, Box<IndexExpr>),
    /// Floor division by a positive constant.
    FloorDiv(Box<IndexExpr>, i64),
    /// Euclidean remainder by a positive constant.
    Rem(Box<IndexExpr>, i64),
    /// Constant table indexed by an expression.
    Lookup(Arc<[i64]>, Box<IndexExpr>),
}

impl IndexExpr {
    /// A free loop variable.
    pub fn var(name: &str) -> Self {
        IndexExpr::Var(Arc::from(name))
    }

    /// `a + b`, keeping constants folded and trailing.
    pub fn sum(a: IndexExpr, b: IndexExpr) -> Self {
        match (a, b) {
            (IndexExpr::Const(x), IndexExpr::Const(y)) => IndexExpr::Const(x + y),
            (IndexExpr::Const(0), e) | (e, IndexExpr::Const(0)) => e,
            (c @ IndexExpr::Const(_), e) => IndexExpr::sum(e, c),
            (IndexExpr::Sum(x, c1), IndexExpr::Const(c2)) => match *c1 {
                IndexExpr::Const(c1) => IndexExpr::sum(*x, IndexExpr::Const(c1 + c2)),
                c1 => IndexExpr::Sum(
                    Box::new(IndexExpr::Sum(x, Box::new(c1))),
                    Box::new(IndexExpr::Const(c2)),
                ),
            },
            (a, IndexExpr::Sum(y, c)) if matches!(*c, IndexExpr::Const(_)) => {
                IndexExpr::sum(IndexExpr::sum(a, *y), *c)
            }
            (a, b) => IndexExpr::Sum(Box::new(a), Box::new(b)),
        }
    }

    /// `a * b`, folding constants, zero and one.
    pub fn product(a: IndexExpr, b: IndexExpr) -> Self {
        match (a, b) {
            (IndexExpr::Const(x), IndexExpr::Const(y)) => IndexExpr::Const(x * y),
            (IndexExpr::Const(0), _) | (_, IndexExpr::Const(0)) => IndexExpr::Const(0),
            (IndexExpr::Const(1), e) | (e, IndexExpr::Const(1)) => e,
            (c @ IndexExpr::Const(_), e) => IndexExpr::Product(Box::new(e), Box::new(c)),
            (a, b) => IndexExpr::Product(Box::new(a), Box::new(b)),
        }
    }

    /// Evaluate with every variable bound.
    pub fn evaluate(&self, bindings: &Bindings) -> Result<i64, MeshStructureError> {
        Ok(match self {
            IndexExpr::Const(c) => *c,
            IndexExpr::Var(name) => bindings
                .get(name)
                .ok_or_else(|| MeshStructureError::UnboundVariable(name.to_string()))?,
            IndexExpr::Sum(a, b) => a.evaluate(bindings)? + b.evaluate(bindings)?,
            IndexExpr::Product(a, b) => a.evaluate(bindings)? * b.evaluate(bindings)?,
            IndexExpr::FloorDiv(a, d) => a.evaluate(bindings)?.div_euclid(*d),
            IndexExpr::Rem(a, m) => a.evaluate(bindings)?.rem_euclid(*m),
            IndexExpr::Lookup(table, at) => {
                let k = at.evaluate(bindings)?;
                i64::lookup(table, &k).ok_or_else(|| {
                    MeshStructureError::InvalidSet(format!(
                        "lookup index {k} outside table of length {}",
                        table.len()
                    ))
                })?
            }
        })
    }
}

impl From<i64> for IndexExpr {
    fn from(value: i64) -> Self {
        IndexExpr::Const(value)
    }
}

impl IndexValue for IndexExpr {
    fn constant(value: i64) -> Self {
        IndexExpr::Const(value)
    }
    fn as_constant(&self) -> Option<i64> {
        match self {
            IndexExpr::Const(c) => Some(*c),
            _ => None,
        }
    }
    fn shifted(&self, by: i64) -> Self {
        IndexExpr::sum(self.clone(), IndexExpr::Const(by))
    }
    fn plus(&self, other: &Self) -> Self {
        IndexExpr::sum(self.clone(), other.clone())
    }
    fn minus(&self, other: &Self) -> Self {
        IndexExpr::sum(self.clone(), other.scaled(-1))
    }
    fn times(&self, other: &Self) -> Self {
        IndexExpr::product(self.clone(), other.clone())
    }
    fn scaled(&self, by: i64) -> Self {
        IndexExpr::product(self.clone(), IndexExpr::Const(by))
    }
    fn floor_div(&self, by: i64) -> Self {
        match self {
            IndexExpr::Const(c) => IndexExpr::Const(c.div_euclid(by)),
            e if by == 1 => e.clone(),
            e => IndexExpr::FloorDiv(Box::new(e.clone()), by),
        }
    }
    fn wrap(&self, modulus: i64) -> Self {
        match self {
            IndexExpr::Const(c) => IndexExpr::Const(c.rem_euclid(modulus)),
            _ if modulus == 1 => IndexExpr::Const(0),
            e => IndexExpr::Rem(Box::new(e.clone()), modulus),
        }
    }
    fn lookup(table: &Arc<[i64]>, at: &Self) -> Option<Self> {
        match at {
            IndexExpr::Const(k) => i64::lookup(table, k).map(IndexExpr::Const),
            e => Some(IndexExpr::Lookup(table.clone(), Box::new(e.clone()))),
        }
    }
    fn split_constant(&self) -> (Self, i64) {
        match self {
            IndexExpr::Const(c) => (IndexExpr::Const(0), *c),
            IndexExpr::Sum(rest, c) => match c.as_ref() {
                IndexExpr::Const(c) => (rest.as_ref().clone(), *c),
                _ => (self.clone(), 0),
            },
            e => (e.clone(), 0),
        }
    }
}

/// Renders C-like code; `floord`/`mod` carry floor and euclidean semantics.
impl fmt::Display for IndexExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexExpr::Const(c) => write!(f, "{c}"),
            IndexExpr::Var(name) => write!(f, "{name}"),
            IndexExpr::Sum(a, b) => match b.as_ref() {
                IndexExpr::Const(c) if *c < 0 => write!(f, "({a} - {})", -c),
                b => write!(f, "({a} + {b})"),
            },
            IndexExpr::Product(a, b) => write!(f, "({a} * {b})"),
            IndexExpr::FloorDiv(a, d) => write!(f, "floord({a}, {d})"),
            IndexExpr::Rem(a, m) => write!(f, "mod({a}, {m})"),
            IndexExpr::Lookup(table, at) => {
                write!(f, "[")?;
                for (k, v) in table.iter().enumerate() {
                    if k > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "][{at}]")
            }
        }
    }
}

/// Values for the free variables of symbolic indices.
#[derive(Clone, Debug, Default)]
pub struct Bindings(HashMap<Arc<str>, i64>);

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style binding.
    pub fn with(mut self, name: &str, value: i64) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: i64) {
        self.0.insert(Arc::from(name), value);
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.0.get(name).copied()
    }
}

impl<'a> FromIterator<(&'a str, i64)> for Bindings {
    fn from_iter<T: IntoIterator<Item = (&'a str, i64)>>(iter: T) -> Self {
        let mut b = Bindings::new();
        for (name, value) in iter {
            b.set(name, value);
        }
        b
    }
}

/// A condition a symbolic query result depends on.
#[derive(Clone, Debug, PartialEq)]
pub enum Guard<I> {
    /// Holds when the expression is `>= 0`.
    NonNegative(I),
    /// Holds when the expression is `== 0`.
    Zero(I),
}

impl<I: IndexValue> Guard<I> {
    /// `Some(holds)` once the expression is known; `None` in symbolic mode.
    pub fn decide(&self) -> Option<bool> {
        match self {
            Guard::NonNegative(e) => e.as_constant().map(|v| v >= 0),
            Guard::Zero(e) => e.as_constant().map(|v| v == 0),
        }
    }
}

impl Guard<IndexExpr> {
    /// Whether the condition holds once every variable is bound.
    pub fn holds(&self, bindings: &Bindings) -> Result<bool, MeshStructureError> {
        Ok(match self {
            Guard::NonNegative(e) => e.evaluate(bindings)? >= 0,
            Guard::Zero(e) => e.evaluate(bindings)? == 0,
        })
    }
}

/// A query result with the guards that could not be decided.
#[derive(Clone, Debug, PartialEq)]
pub struct Guarded<T, I> {
    pub value: T,
    pub guards: Vec<Guard<I>>,
}

impl<T, I: IndexValue> Guarded<T, I> {
    /// Decide what can be decided: `None` if a guard is known to fail,
    /// otherwise the value with the undecided guards left attached.
    pub fn resolve(value: T, guards: Vec<Guard<I>>) -> Option<Self> {
        let mut open = Vec::new();
        for g in guards {
            match g.decide() {
                Some(false) => return None,
                Some(true) => {}
                None => open.push(g),
            }
        }
        Some(Guarded { value, guards: open })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_fold_and_trail() {
        let i = IndexExpr::var("i");
        let e = i.shifted(1).shifted(-3);
        assert_eq!(e, IndexExpr::sum(IndexExpr::var("i"), IndexExpr::Const(-2)));
        assert_eq!(e.to_string(), "(i - 2)");
        assert_eq!(IndexExpr::Const(2).shifted(3), IndexExpr::Const(5));
    }

    #[test]
    fn accumulated_offsets_are_structurally_equal() {
        let i = IndexExpr::var("i");
        let j = IndexExpr::var("j");
        let a = i.shifted(1).plus(&j.shifted(1));
        let b = i.plus(&j).shifted(2);
        assert_eq!(a, b);
    }

    #[test]
    fn evaluate_matches_concrete_arithmetic() {
        let n = 7i64;
        let i = IndexExpr::var("i");
        let sym = IndexExpr::constant(n)
            .minus(&i)
            .times(&IndexExpr::constant(n).minus(&i).shifted(-1))
            .floor_div(2);
        let bindings = Bindings::new().with("i", 3);
        let expected = ((n - 3) * (n - 3 - 1)).div_euclid(2);
        assert_eq!(sym.evaluate(&bindings).unwrap(), expected);
    }

    #[test]
    fn trailing_constant_splits_off() {
        let e = IndexExpr::var("i").plus(&IndexExpr::var("j")).shifted(3);
        let (rest, c) = e.split_constant();
        assert_eq!(c, 3);
        assert_eq!(rest.to_string(), "(i + j)");
        assert_eq!(IndexExpr::Const(4).split_constant(), (IndexExpr::Const(0), 4));
        assert_eq!(5i64.split_constant(), (0, 5));
    }

    #[test]
    fn unbound_variable_is_reported() {
        let e = IndexExpr::var("k").shifted(1);
        assert_eq!(
            e.evaluate(&Bindings::new()),
            Err(MeshStructureError::UnboundVariable("k".into()))
        );
    }

    #[test]
    fn lookup_folds_constant_arguments() {
        let table: Arc<[i64]> = Arc::from(vec![2, 0, 1]);
        assert_eq!(
            IndexExpr::lookup(&table, &IndexExpr::Const(1)),
            Some(IndexExpr::Const(0))
        );
        assert_eq!(IndexExpr::lookup(&table, &IndexExpr::Const(3)), None);
        let sym = IndexExpr::lookup(&table, &IndexExpr::var("j")).unwrap();
        assert_eq!(sym.to_string(), "[2, 0, 1][j]");
        assert_eq!(sym.evaluate(&Bindings::new().with("j", 2)).unwrap(), 1);
    }

    #[test]
    fn guards_decide_only_when_known() {
        assert_eq!(Guard::NonNegative(3i64).decide(), Some(true));
        assert_eq!(Guard::Zero(1i64).decide(), Some(false));
        assert_eq!(Guard::Zero(IndexExpr::var("i")).decide(), None);
        assert!(Guarded::resolve((), vec![Guard::NonNegative(-1i64)]).is_none());
    }
}
