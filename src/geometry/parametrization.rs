//! Position of structured vertices inside the macro element.

use crate::geometry::symbolic::AffineCoordinate;
use crate::mesh_error::MeshStructureError;
use crate::topology::index_expr::IndexValue;
use serde::{Deserialize, Serialize};

/// Maps a vertex multiindex to macro-element reference coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Parametrization {
    /// `y_k = index_k / divisors_k`: block-structured refinement.
    Scaled { divisors: Vec<f64> },
    /// Axis 0 numbers the vertices of an unstructured reference cell.
    ReferenceVertices {
        dimension: usize,
        coords: Vec<Vec<f64>>,
    },
    /// Leading `split` index axes by `left`, the rest by `right`.
    Product {
        left: Box<Parametrization>,
        right: Box<Parametrization>,
        split: usize,
    },
}

impl Parametrization {
    /// Uniform `1/n` scaling of `axes` axes.
    pub fn uniform(axes: usize, n: usize) -> Self {
        Parametrization::Scaled {
            divisors: vec![n.max(1) as f64; axes],
        }
    }

    pub fn product(left: Parametrization, right: Parametrization) -> Self {
        let split = left.axes();
        Parametrization::Product {
            left: Box::new(left),
            right: Box::new(right),
            split,
        }
    }

    /// Index axes consumed.
    pub fn axes(&self) -> usize {
        match self {
            Parametrization::Scaled { divisors } => divisors.len(),
            Parametrization::ReferenceVertices { .. } => 1,
            Parametrization::Product { left, right, .. } => left.axes() + right.axes(),
        }
    }

    /// Reference coordinates produced.
    pub fn dimension(&self) -> usize {
        match self {
            Parametrization::Scaled { divisors } => divisors.len(),
            Parametrization::ReferenceVertices { dimension, .. } => *dimension,
            Parametrization::Product { left, right, .. } => left.dimension() + right.dimension(),
        }
    }

    pub fn evaluate(&self, index: &[i64]) -> Result<Vec<f64>, MeshStructureError> {
        Ok(self.affine(index)?.iter().map(AffineCoordinate::value).collect())
    }

    /// Reference coordinates as affine forms in the (possibly symbolic)
    /// indices. Unstructured reference-cell axes must be concrete.
    pub fn affine<I: IndexValue>(
        &self,
        index: &[I],
    ) -> Result<Vec<AffineCoordinate<I>>, MeshStructureError> {
        if index.len() != self.axes() {
            return Err(MeshStructureError::ArityMismatch {
                expected: self.axes(),
                found: index.len(),
            });
        }
        match self {
            Parametrization::Scaled { divisors } => Ok(index
                .iter()
                .zip(divisors)
                .map(|(i, &d)| AffineCoordinate::index_over(i, d))
                .collect()),
            Parametrization::ReferenceVertices { coords, .. } => {
                let v = index[0]
                    .as_constant()
                    .ok_or(MeshStructureError::SymbolicUnsupported(
                        "reference-cell vertex coordinates",
                    ))?;
                usize::try_from(v)
                    .ok()
                    .and_then(|v| coords.get(v))
                    .map(|c| c.iter().map(|&x| AffineCoordinate::constant(x)).collect())
                    .ok_or_else(|| {
                        MeshStructureError::InvalidGeometry(format!(
                            "reference vertex {v} outside 0..{}",
                            coords.len()
                        ))
                    })
            }
            Parametrization::Product { left, right, split } => {
                let mut y = left.affine(&index[..*split])?;
                y.extend(right.affine(&index[*split..])?);
                Ok(y)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::index_expr::IndexExpr;

    #[test]
    fn product_concatenates_coordinates() {
        let tri = Parametrization::ReferenceVertices {
            dimension: 2,
            coords: vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]],
        };
        let p = Parametrization::product(tri, Parametrization::uniform(1, 4));
        assert_eq!(p.axes(), 2);
        assert_eq!(p.dimension(), 3);
        assert_eq!(p.evaluate(&[2, 3]).unwrap(), vec![0.0, 1.0, 0.75]);
        assert!(p.evaluate(&[3, 0]).is_err());
        assert!(p.evaluate(&[0]).is_err());
    }

    #[test]
    fn symbolic_layer_axis_stays_affine() {
        let tri = Parametrization::ReferenceVertices {
            dimension: 2,
            coords: vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]],
        };
        let p = Parametrization::product(tri, Parametrization::uniform(1, 4));
        let l = IndexExpr::var("l");
        let y = p.affine(&[IndexExpr::Const(1), l.shifted(1)]).unwrap();
        assert_eq!(y[0].as_constant(), Some(1.0));
        assert_eq!(y[2].to_string(), "0.25*l + 0.25");
        assert_eq!(
            p.affine(&[l.clone(), l]),
            Err(MeshStructureError::SymbolicUnsupported(
                "reference-cell vertex coordinates"
            ))
        );
    }
}
