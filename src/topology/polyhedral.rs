//! Polyhedral index domains of entity classes.
//!
//! A [`PolyhedralSet`] is a cartesian product of primitive [`Factor`]s:
//! half-open intervals, periodic intervals, discrete simplices
//! `{x >= 0, Σx < n}` (a point is the 0-dimensional simplex), and explicitly
//! constrained boxes. The factor list is the single source of truth; the
//! affine constraint list, the cardinality and the flattening map are derived
//! from it once, at construction.
//!
//! # Flattening
//! `linear_index_map` is row-major across factors (the last factor varies
//! fastest), the identity on intervals, and on a simplex factor the
//! hockey-stick offset
//!
//! ```text
//! offset(x1..xd; n) = C(n+d-1, d) - C(n-x1+d-1, d) + offset(x2..xd; n-x1)
//! ```
//!
//! which counts the points lexicographically smaller than `x`. In 2D this is
//! the triangular-number formula `n(n+1)/2 - (n-i)(n-i+1)/2 + j`. The order
//! agrees with [`PolyhedralSet::points`], so flattening, enumeration and the
//! Kuhn simplex numbering all use one order.

use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshStructureError;
use crate::topology::entity_set::Tag;
use crate::topology::index_expr::IndexValue;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// `Σ coefficients[k] * x[k] + constant >= 0`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AffineConstraint {
    pub coefficients: Vec<i64>,
    pub constant: i64,
}

impl AffineConstraint {
    pub fn new(coefficients: Vec<i64>, constant: i64) -> Self {
        Self {
            coefficients,
            constant,
        }
    }

    /// Value of the left-hand side; the constraint holds iff it is `>= 0`.
    pub fn evaluate<I: IndexValue>(&self, point: &[I]) -> I {
        self.coefficients
            .iter()
            .zip(point)
            .filter(|(c, _)| **c != 0)
            .fold(I::constant(self.constant), |acc, (&c, x)| {
                acc.plus(&x.scaled(c))
            })
    }

    #[inline]
    pub fn holds(&self, point: &[i64]) -> bool {
        self.evaluate(point) >= 0
    }

    /// The same constraint embedded at axis `offset` of a `total`-axis space.
    fn embedded(&self, offset: usize, total: usize) -> Self {
        let mut coefficients = vec![0; total];
        coefficients[offset..offset + self.coefficients.len()].copy_from_slice(&self.coefficients);
        Self::new(coefficients, self.constant)
    }
}

/// Box `[lo, hi)` per axis cut by extra affine constraints; the sorted point
/// list backs rank-based flattening.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstrainedBox {
    bounds: Vec<(i64, i64)>,
    constraints: Vec<AffineConstraint>,
    points: Arc<[Vec<i64>]>,
}

impl ConstrainedBox {
    pub fn new(
        bounds: Vec<(i64, i64)>,
        constraints: Vec<AffineConstraint>,
    ) -> Result<Self, MeshStructureError> {
        if let Some((lo, hi)) = bounds.iter().find(|(lo, hi)| lo > hi) {
            return Err(MeshStructureError::InvalidSet(format!(
                "empty bound [{lo}, {hi}) is reversed"
            )));
        }
        if let Some(c) = constraints
            .iter()
            .find(|c| c.coefficients.len() != bounds.len())
        {
            return Err(MeshStructureError::InvalidSet(format!(
                "constraint {c:?} does not have {} coefficients",
                bounds.len()
            )));
        }
        let points: Vec<Vec<i64>> = if bounds.is_empty() {
            vec![Vec::new()]
        } else {
            bounds
                .iter()
                .map(|&(lo, hi)| lo..hi)
                .multi_cartesian_product()
                .filter(|p| constraints.iter().all(|c| c.holds(p)))
                .collect()
        };
        Ok(Self {
            bounds,
            constraints,
            points: points.into(),
        })
    }

    pub fn bounds(&self) -> &[(i64, i64)] {
        &self.bounds
    }

    pub fn constraints(&self) -> &[AffineConstraint] {
        &self.constraints
    }
}

/// Primitive factor of a polyhedral set.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Factor {
    /// `0 <= x < extent`.
    Interval { extent: i64 },
    /// `0 <= x < extent`, indices wrap modulo `extent`.
    Periodic { extent: i64 },
    /// `x_k >= 0`, `Σ x_k < extent` over `dim` axes.
    Simplex { dim: usize, extent: i64 },
    Constrained(ConstrainedBox),
}

impl Factor {
    /// The single-point factor with no axes.
    pub const POINT: Factor = Factor::Simplex { dim: 0, extent: 1 };

    pub fn axes(&self) -> usize {
        match self {
            Factor::Interval { .. } | Factor::Periodic { .. } => 1,
            Factor::Simplex { dim, .. } => *dim,
            Factor::Constrained(b) => b.bounds.len(),
        }
    }

    pub fn size(&self) -> usize {
        match *self {
            Factor::Interval { extent } | Factor::Periodic { extent } => extent.max(0) as usize,
            Factor::Simplex { dim, extent } => binomial(extent + dim as i64 - 1, dim),
            Factor::Constrained(ref b) => b.points.len(),
        }
    }

    /// Constraints in local axis numbering.
    fn local_constraints(&self) -> Vec<AffineConstraint> {
        match self {
            Factor::Interval { extent } | Factor::Periodic { extent } => vec![
                AffineConstraint::new(vec![1], 0),
                AffineConstraint::new(vec![-1], extent - 1),
            ],
            Factor::Simplex { dim, extent } => (0..*dim)
                .map(|k| {
                    let mut c = vec![0; *dim];
                    c[k] = 1;
                    AffineConstraint::new(c, 0)
                })
                .chain(std::iter::once(AffineConstraint::new(
                    vec![-1; *dim],
                    extent - 1,
                )))
                .collect(),
            Factor::Constrained(b) => {
                let d = b.bounds.len();
                let mut out = Vec::with_capacity(2 * d + b.constraints.len());
                for (k, &(lo, hi)) in b.bounds.iter().enumerate() {
                    let mut c = vec![0; d];
                    c[k] = 1;
                    out.push(AffineConstraint::new(c.clone(), -lo));
                    c[k] = -1;
                    out.push(AffineConstraint::new(c, hi - 1));
                }
                out.extend(b.constraints.iter().cloned());
                out
            }
        }
    }

    /// Inclusive per-axis bounding box.
    fn bounds(&self) -> Vec<(i64, i64)> {
        match self {
            Factor::Interval { extent } | Factor::Periodic { extent } => vec![(0, extent - 1)],
            Factor::Simplex { dim, extent } => vec![(0, extent - 1); *dim],
            Factor::Constrained(b) => b.bounds.iter().map(|&(lo, hi)| (lo, hi - 1)).collect(),
        }
    }

    /// Points in flattening order.
    fn points(&self) -> Vec<Vec<i64>> {
        match self {
            Factor::Interval { extent } | Factor::Periodic { extent } => {
                (0..*extent).map(|x| vec![x]).collect()
            }
            Factor::Simplex { dim, extent } => simplex_points(*dim, *extent),
            Factor::Constrained(b) => b.points.to_vec(),
        }
    }

    /// Position of `x` among this factor's points.
    fn local_index<I: IndexValue>(&self, x: &[I]) -> Result<I, MeshStructureError> {
        match self {
            Factor::Interval { .. } | Factor::Periodic { .. } => Ok(x[0].clone()),
            Factor::Simplex { extent, .. } => simplex_offset(x, I::constant(*extent)),
            Factor::Constrained(b) => {
                let point: Option<Vec<i64>> = x.iter().map(|v| v.as_constant()).collect();
                let point = point.ok_or(MeshStructureError::SymbolicUnsupported(
                    "rank lookup in constrained sets",
                ))?;
                b.points
                    .binary_search(&point)
                    .map(|rank| I::constant(rank as i64))
                    .map_err(|_| out_of_domain(&point))
            }
        }
    }
}

/// Finite integer domain of one entity class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<Factor>", try_from = "Vec<Factor>")]
pub struct PolyhedralSet {
    factors: Vec<Factor>,
    axis_offsets: Vec<usize>,
    axes: usize,
    constraints: Vec<AffineConstraint>,
    size: usize,
}

impl PolyhedralSet {
    /// Checked construction from factors.
    pub fn new(factors: Vec<Factor>) -> Result<Self, MeshStructureError> {
        for f in &factors {
            match *f {
                Factor::Interval { extent } | Factor::Simplex { extent, .. } if extent < 0 => {
                    return Err(MeshStructureError::InvalidSet(format!(
                        "negative extent in {f:?}"
                    )));
                }
                Factor::Periodic { extent } if extent < 1 => {
                    return Err(MeshStructureError::InvalidSet(format!(
                        "periodic extent must be positive, got {extent}"
                    )));
                }
                _ => {}
            }
        }
        let size = factors
            .iter()
            .try_fold(1usize, |acc, f| acc.checked_mul(f.size()))
            .ok_or_else(|| MeshStructureError::InvalidSet("cardinality overflows usize".into()))?;
        Ok(Self::assemble(factors, size))
    }

    fn assemble(factors: Vec<Factor>, size: usize) -> Self {
        let mut axis_offsets = Vec::with_capacity(factors.len());
        let mut axes = 0;
        for f in &factors {
            axis_offsets.push(axes);
            axes += f.axes();
        }
        let constraints = factors
            .iter()
            .zip(&axis_offsets)
            .flat_map(|(f, &off)| {
                f.local_constraints()
                    .into_iter()
                    .map(move |c| c.embedded(off, axes))
            })
            .collect();
        let set = Self {
            factors,
            axis_offsets,
            axes,
            constraints,
            size,
        };
        crate::debug_invariants!(set.validate_invariants(), "PolyhedralSet::assemble");
        set
    }

    fn from_factors(factors: Vec<Factor>) -> Self {
        let size = factors
            .iter()
            .fold(1usize, |acc, f| acc.saturating_mul(f.size()));
        Self::assemble(factors, size)
    }

    /// `{0, ..., n-1}`.
    pub fn interval(n: usize) -> Self {
        Self::from_factors(vec![Factor::Interval { extent: n as i64 }])
    }

    /// `{0, ..., n-1}` with wrap-around; `n` must be positive.
    pub fn periodic(n: usize) -> Result<Self, MeshStructureError> {
        Self::new(vec![Factor::Periodic { extent: n as i64 }])
    }

    /// `{x in Z^d : x >= 0, Σx < n}`.
    pub fn simplex(d: usize, n: usize) -> Self {
        Self::from_factors(vec![Factor::Simplex {
            dim: d,
            extent: n as i64,
        }])
    }

    /// The single point with no axes.
    pub fn point() -> Self {
        Self::from_factors(vec![Factor::POINT])
    }

    /// Hyperrectangle `Π [0, extents[k])`.
    pub fn boxed(extents: &[usize]) -> Self {
        Self::from_factors(
            extents
                .iter()
                .map(|&n| Factor::Interval { extent: n as i64 })
                .collect(),
        )
    }

    /// Box `Π [lo_k, hi_k)` intersected with `constraints`.
    pub fn constrained(
        bounds: Vec<(i64, i64)>,
        constraints: Vec<AffineConstraint>,
    ) -> Result<Self, MeshStructureError> {
        Self::new(vec![Factor::Constrained(ConstrainedBox::new(
            bounds,
            constraints,
        )?)])
    }

    /// Cartesian product; `self` contributes the leading axes.
    pub fn product(&self, other: &PolyhedralSet) -> Self {
        let factors = self.factors.iter().chain(&other.factors).cloned().collect();
        Self::assemble(factors, self.size.saturating_mul(other.size))
    }

    pub fn factors(&self) -> &[Factor] {
        &self.factors
    }

    /// Ordered affine inequalities describing the domain.
    pub fn constraints(&self) -> &[AffineConstraint] {
        &self.constraints
    }

    #[inline]
    pub fn axes(&self) -> usize {
        self.axes
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Inclusive bounding box per axis; empty axes report `hi < lo`.
    pub fn axis_bounds(&self) -> Vec<(i64, i64)> {
        self.factors.iter().flat_map(|f| f.bounds()).collect()
    }

    /// Extent of `axis` when it is periodic.
    pub fn periodic_extent(&self, axis: usize) -> Option<i64> {
        self.factors
            .iter()
            .zip(&self.axis_offsets)
            .find_map(|(f, &off)| match f {
                Factor::Periodic { extent } if off == axis => Some(*extent),
                _ => None,
            })
    }

    pub fn contains(&self, point: &[i64]) -> bool {
        point.len() == self.axes && self.constraints.iter().all(|c| c.holds(point))
    }

    /// `Ok` iff `point` lies in the domain.
    pub fn require(&self, point: &[i64]) -> Result<(), MeshStructureError> {
        self.check_arity(point.len())?;
        if self.contains(point) {
            Ok(())
        } else {
            Err(out_of_domain(point))
        }
    }

    pub(crate) fn check_arity(&self, found: usize) -> Result<(), MeshStructureError> {
        if found == self.axes {
            Ok(())
        } else {
            Err(MeshStructureError::ArityMismatch {
                expected: self.axes,
                found,
            })
        }
    }

    /// Left-hand sides of all constraints at `point`; each must be `>= 0`
    /// for `point` to lie in the domain.
    pub fn guards<I: IndexValue>(&self, point: &[I]) -> Vec<I> {
        self.constraints.iter().map(|c| c.evaluate(point)).collect()
    }

    /// Reduce periodic axes into `[0, extent)`.
    pub fn wrap<I: IndexValue>(&self, point: &[I]) -> Vec<I> {
        let mut out = point.to_vec();
        for (f, &off) in self.factors.iter().zip(&self.axis_offsets) {
            if let (Factor::Periodic { extent }, Some(x)) = (f, out.get_mut(off)) {
                *x = x.wrap(*extent);
            }
        }
        out
    }

    /// Row-major flat index of `point` in `[0, size)`.
    pub fn linear_index_map<I: IndexValue>(&self, point: &[I]) -> Result<I, MeshStructureError> {
        let natural: Vec<usize> = (0..self.factors.len()).collect();
        self.linear_index_map_ordered(point, &natural)
    }

    /// Flat index with the factors nested in `factor_order` (outermost
    /// first). Concrete points are checked for membership; symbolic points
    /// are assumed in the domain.
    pub fn linear_index_map_ordered<I: IndexValue>(
        &self,
        point: &[I],
        factor_order: &[usize],
    ) -> Result<I, MeshStructureError> {
        self.check_arity(point.len())?;
        let mut seen = vec![false; self.factors.len()];
        if factor_order.len() != self.factors.len()
            || factor_order
                .iter()
                .any(|&f| f >= seen.len() || std::mem::replace(&mut seen[f], true))
        {
            return Err(MeshStructureError::InvalidSet(format!(
                "factor order {factor_order:?} is not a permutation of 0..{}",
                self.factors.len()
            )));
        }
        let concrete: Option<Vec<i64>> = point.iter().map(|x| x.as_constant()).collect();
        if let Some(p) = concrete {
            self.require(&p)?;
        }
        factor_order.iter().try_fold(I::constant(0), |acc, &f| {
            let factor = &self.factors[f];
            let off = self.axis_offsets[f];
            let local = factor.local_index(&point[off..off + factor.axes()])?;
            Ok(acc.scaled(factor.size() as i64).plus(&local))
        })
    }

    /// All points in flattening order.
    pub fn points(&self) -> Box<dyn Iterator<Item = Vec<i64>> + '_> {
        if self.factors.is_empty() {
            return Box::new(std::iter::once(Vec::new()));
        }
        Box::new(
            self.factors
                .iter()
                .map(|f| f.points())
                .multi_cartesian_product()
                .map(|parts| parts.concat()),
        )
    }
}

impl From<PolyhedralSet> for Vec<Factor> {
    fn from(set: PolyhedralSet) -> Self {
        set.factors
    }
}

impl TryFrom<Vec<Factor>> for PolyhedralSet {
    type Error = MeshStructureError;

    fn try_from(factors: Vec<Factor>) -> Result<Self, Self::Error> {
        PolyhedralSet::new(factors)
    }
}

impl DebugInvariants for PolyhedralSet {
    const DESCRIPTOR: &'static str = "PolyhedralSet";

    fn validate_invariants(&self) -> Result<(), MeshStructureError> {
        if let Some(c) = self.constraints.iter().find(|c| c.coefficients.len() != self.axes) {
            return Err(MeshStructureError::InvalidSet(format!(
                "constraint {c:?} has wrong arity for {} axes",
                self.axes
            )));
        }
        let expected = self
            .factors
            .iter()
            .fold(1usize, |acc, f| acc.saturating_mul(f.size()));
        if expected != self.size {
            return Err(MeshStructureError::InvalidSet(format!(
                "cached size {} disagrees with factor sizes ({expected})",
                self.size
            )));
        }
        Ok(())
    }
}

fn out_of_domain(point: &[i64]) -> MeshStructureError {
    MeshStructureError::OutOfDomain {
        tag: Tag::anonymous(),
        index: format!("{point:?}"),
    }
}

/// `C(n, k)`, zero when `n < k`.
pub(crate) fn binomial(n: i64, k: usize) -> usize {
    if n < k as i64 {
        return 0;
    }
    let mut acc: u128 = 1;
    for i in 0..k as u128 {
        acc = acc * (n as u128 - i) / (i + 1);
    }
    usize::try_from(acc).unwrap_or(usize::MAX)
}

/// `C(m, d)` as a product of `d` consecutive integers over `d!`. Constant
/// arguments are evaluated exactly; results outside `i64` are an error.
fn binomial_value<I: IndexValue>(m: &I, d: usize) -> Result<I, MeshStructureError> {
    if let Some(m) = m.as_constant() {
        return binomial_exact(m, d).map(I::constant);
    }
    let mut numerator = I::constant(1);
    let mut factorial = 1i64;
    for k in 0..d {
        numerator = numerator.times(&m.shifted(-(k as i64)));
        factorial = factorial
            .checked_mul(k as i64 + 1)
            .ok_or_else(|| rank_overflow(d))?;
    }
    Ok(numerator.floor_div(factorial))
}

/// Falling factorial `m (m-1) ... (m-d+1) / d!`, divided step by step so
/// every intermediate quotient is exact.
fn binomial_exact(m: i64, d: usize) -> Result<i64, MeshStructureError> {
    let mut acc: i128 = 1;
    for k in 0..d as i128 {
        acc = acc
            .checked_mul(m as i128 - k)
            .ok_or_else(|| rank_overflow(d))?
            / (k + 1);
    }
    i64::try_from(acc).map_err(|_| rank_overflow(d))
}

fn rank_overflow(d: usize) -> MeshStructureError {
    MeshStructureError::InvalidSet(format!("{d}-simplex rank overflows i64"))
}

/// Number of simplex points lexicographically smaller than `x`.
fn simplex_offset<I: IndexValue>(x: &[I], extent: I) -> Result<I, MeshStructureError> {
    let mut n = extent;
    let mut acc = I::constant(0);
    for (k, xk) in x.iter().enumerate() {
        let d = x.len() - k;
        let before = binomial_value(&n.shifted(d as i64 - 1), d)?;
        let rest = n.minus(xk);
        let after = binomial_value(&rest.shifted(d as i64 - 1), d)?;
        acc = acc.plus(&before.minus(&after));
        n = rest;
    }
    Ok(acc)
}

fn simplex_points(dim: usize, extent: i64) -> Vec<Vec<i64>> {
    if dim == 0 {
        return if extent >= 1 { vec![Vec::new()] } else { Vec::new() };
    }
    let mut out = Vec::new();
    for head in 0..extent.max(0) {
        for tail in simplex_points(dim - 1, extent - head) {
            let mut p = Vec::with_capacity(dim);
            p.push(head);
            p.extend(tail);
            out.push(p);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::index_expr::{Bindings, IndexExpr};

    #[test]
    fn simplex_sizes_are_binomial() {
        assert_eq!(PolyhedralSet::simplex(2, 4).size(), 10);
        assert_eq!(PolyhedralSet::simplex(3, 3).size(), 10);
        assert_eq!(PolyhedralSet::simplex(2, 0).size(), 0);
        assert_eq!(PolyhedralSet::point().size(), 1);
        assert_eq!(PolyhedralSet::point().axes(), 0);
    }

    #[test]
    fn triangular_offsets_follow_lexicographic_order() {
        let tri = PolyhedralSet::simplex(2, 4);
        for (k, p) in tri.points().enumerate() {
            assert_eq!(tri.linear_index_map(&p).unwrap(), k as i64);
            let (i, j) = (p[0], p[1]);
            let n = 4;
            assert_eq!(k as i64, n * (n + 1) / 2 - (n - i) * (n - i + 1) / 2 + j);
        }
    }

    #[test]
    fn symbolic_flattening_agrees_with_concrete() {
        let set = PolyhedralSet::simplex(2, 5).product(&PolyhedralSet::interval(3));
        let sym = [IndexExpr::var("i"), IndexExpr::var("j"), IndexExpr::var("k")];
        let expr = set.linear_index_map(&sym).unwrap();
        for p in set.points() {
            let b = Bindings::new()
                .with("i", p[0])
                .with("j", p[1])
                .with("k", p[2]);
            assert_eq!(expr.evaluate(&b).unwrap(), set.linear_index_map(&p).unwrap());
        }
    }

    #[test]
    fn ordered_flattening_permutes_factor_nesting() {
        let set = PolyhedralSet::boxed(&[2, 3]);
        assert_eq!(set.linear_index_map(&[1i64, 2]).unwrap(), 5);
        assert_eq!(set.linear_index_map_ordered(&[1i64, 2], &[1, 0]).unwrap(), 5);
        assert_eq!(set.linear_index_map_ordered(&[1i64, 0], &[1, 0]).unwrap(), 1);
        assert!(set.linear_index_map_ordered(&[1i64, 0], &[0, 0]).is_err());
    }

    #[test]
    fn membership_is_reported_not_clamped() {
        let set = PolyhedralSet::simplex(2, 3);
        assert!(set.contains(&[2, 0]));
        assert!(!set.contains(&[2, 1]));
        assert!(matches!(
            set.linear_index_map(&[2i64, 1]),
            Err(MeshStructureError::OutOfDomain { .. })
        ));
        assert!(matches!(
            set.require(&[0]),
            Err(MeshStructureError::ArityMismatch {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn periodic_axes_wrap() {
        let set = PolyhedralSet::periodic(4).unwrap();
        assert_eq!(set.wrap(&[5i64]), vec![1]);
        assert_eq!(set.wrap(&[-1i64]), vec![3]);
        assert_eq!(set.periodic_extent(0), Some(4));
        assert!(PolyhedralSet::periodic(0).is_err());
    }

    #[test]
    fn constrained_sets_flatten_by_rank() {
        let set = PolyhedralSet::constrained(
            vec![(0, 3), (0, 3)],
            vec![AffineConstraint::new(vec![1, -1], 0)],
        )
        .unwrap();
        assert_eq!(set.size(), 6);
        assert_eq!(set.linear_index_map(&[2i64, 1]).unwrap(), 4);
        assert!(!set.contains(&[0, 1]));
        assert_eq!(
            set.linear_index_map(&[IndexExpr::var("i"), IndexExpr::var("j")]),
            Err(MeshStructureError::SymbolicUnsupported(
                "rank lookup in constrained sets"
            ))
        );
    }

    #[test]
    fn guards_are_the_constraint_values() {
        let set = PolyhedralSet::simplex(2, 3);
        let g = set.guards(&[IndexExpr::var("i"), IndexExpr::Const(0)]);
        assert_eq!(g.len(), 3);
        assert_eq!(g[2].to_string(), "((i * -1) + 2)");
    }

    #[test]
    fn huge_simplex_rank_is_an_error() {
        let set = PolyhedralSet::simplex(2, 1 << 40);
        assert!(matches!(
            set.linear_index_map(&[0i64, 0]),
            Err(MeshStructureError::InvalidSet(_))
        ));
        let sym = [IndexExpr::var("i"), IndexExpr::var("j")];
        assert!(matches!(
            set.linear_index_map(&sym),
            Err(MeshStructureError::InvalidSet(_))
        ));
        // just inside i64
        let edge = PolyhedralSet::simplex(1, 1 << 40);
        assert_eq!(edge.linear_index_map(&[5i64]).unwrap(), 5);
    }
}
