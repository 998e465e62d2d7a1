//! Reference coordinates of symbolic entities.
//!
//! With symbolic indices a vertex's macro reference coordinates are affine
//! in the index expressions (`y = i / N`), and so is any blend of vertex
//! coordinates by numeric basis weights. The macro map itself is applied
//! only once the indices are bound, see
//! [`Geometry::evaluate`](crate::geometry::mapping::Geometry::evaluate).

use crate::mesh_error::MeshStructureError;
use crate::topology::index_expr::{Bindings, Guard, IndexExpr, IndexValue};
use crate::topology::multiindex::Multiindex;
use std::fmt;

/// `Σ_k weight_k · expr_k + constant`.
#[derive(Clone, Debug, PartialEq)]
pub struct AffineCoordinate<I> {
    terms: Vec<(f64, I)>,
    constant: f64,
}

impl<I: IndexValue> AffineCoordinate<I> {
    pub fn constant(value: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    /// `index / divisor`. Constant parts are divided, not multiplied by
    /// the reciprocal, so concrete coordinates are exact quotients.
    pub fn index_over(index: &I, divisor: f64) -> Self {
        let (rest, c) = index.split_constant();
        let mut out = Self::constant(c as f64 / divisor);
        if rest.as_constant() != Some(0) {
            out.terms.push((1.0 / divisor, rest));
        }
        out
    }

    /// `Σ_l weights_l · points_l[k]` for every coordinate `k < dim`.
    pub fn blend(points: &[Vec<Self>], weights: &[f64], dim: usize) -> Vec<Self> {
        (0..dim)
            .map(|k| {
                let mut out = Self::constant(0.0);
                for (p, &w) in points.iter().zip(weights) {
                    if let Some(c) = p.get(k) {
                        out.accumulate(c, w);
                    }
                }
                out.terms.retain(|(w, _)| *w != 0.0);
                out
            })
            .collect()
    }

    fn accumulate(&mut self, other: &Self, weight: f64) {
        self.constant += weight * other.constant;
        for (w, e) in &other.terms {
            match self.terms.iter_mut().find(|(_, x)| x == e) {
                Some((acc, _)) => *acc += weight * w,
                None => self.terms.push((weight * w, e.clone())),
            }
        }
    }

    pub fn terms(&self) -> &[(f64, I)] {
        &self.terms
    }

    pub fn constant_part(&self) -> f64 {
        self.constant
    }

    /// The value when no index expression remains.
    pub fn as_constant(&self) -> Option<f64> {
        self.terms.is_empty().then_some(self.constant)
    }
}

impl AffineCoordinate<i64> {
    pub fn value(&self) -> f64 {
        self.terms
            .iter()
            .fold(self.constant, |acc, (w, i)| acc + w * *i as f64)
    }
}

impl AffineCoordinate<IndexExpr> {
    /// Value with every index variable bound.
    pub fn evaluate(&self, bindings: &Bindings) -> Result<f64, MeshStructureError> {
        self.terms.iter().try_fold(self.constant, |acc, (w, e)| {
            Ok(acc + w * e.evaluate(bindings)? as f64)
        })
    }
}

impl<I: fmt::Display> fmt::Display for AffineCoordinate<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, (w, e)) in self.terms.iter().enumerate() {
            if k > 0 {
                write!(f, " + ")?;
            }
            write!(f, "{w}*{e}")?;
        }
        if self.terms.is_empty() {
            write!(f, "{}", self.constant)
        } else if self.constant != 0.0 {
            write!(f, " + {}", self.constant)
        } else {
            Ok(())
        }
    }
}

/// A point query on a symbolic entity: the macro reference point of
/// `entity`, valid where every guard holds.
#[derive(Clone, Debug, PartialEq)]
pub struct SymbolicPoint {
    pub entity: Multiindex<IndexExpr>,
    pub reference: Vec<AffineCoordinate<IndexExpr>>,
    pub guards: Vec<Guard<IndexExpr>>,
}

impl SymbolicPoint {
    /// Macro reference coordinates under `bindings`.
    pub fn reference_at(&self, bindings: &Bindings) -> Result<Vec<f64>, MeshStructureError> {
        self.reference.iter().map(|y| y.evaluate(bindings)).collect()
    }
}
