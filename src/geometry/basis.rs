//! Coordinate elements: the basis functions used to blend vertex positions.
//!
//! Basis function `l` belongs to local vertex `l` of the reference element:
//! - `LagrangeP1(d)`: vertex 0 at the origin, vertex `k` at `e_{k-1}`;
//! - `LagrangeQ1(d)`: vertices of `[0, 1]^d` in lexicographic order, last
//!   axis fastest;
//! - `TensorProductElement(a, b)`: vertex `(i, j)` at position
//!   `i * b.basis_count() + j`, so a prism is `P1(2) x P1(1)` with the
//!   vertical axis fastest.
//!
//! These orders agree with [`reference_vertices`](crate::topology::numbering::reference_vertices)
//! and with the closure-vertex order of structured cells.

use crate::mesh_error::MeshStructureError;
use crate::topology::cell_type::CellType;
use std::fmt::Debug;

/// A scalar basis evaluated at reference points.
pub trait CoordinateElement: Debug + Send + Sync {
    /// Dimension of the reference cell.
    fn reference_dimension(&self) -> usize;
    fn basis_count(&self) -> usize;
    /// `φ_l(point)` for every basis function.
    fn tabulate(&self, point: &[f64]) -> Result<Vec<f64>, MeshStructureError>;
    /// `∇φ_l(point)`, one row of `reference_dimension()` entries per basis
    /// function.
    fn tabulate_gradients(&self, point: &[f64]) -> Result<Vec<Vec<f64>>, MeshStructureError>;
}

/// Linear Lagrange element on the `d`-simplex.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LagrangeP1(pub usize);

/// Multilinear Lagrange element on the `d`-cube.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LagrangeQ1(pub usize);

/// The single constant function on a point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointElement;

/// Products `φ_i(x_a) ψ_j(x_b)` of two elements on the split coordinates.
#[derive(Debug)]
pub struct TensorProductElement {
    left: Box<dyn CoordinateElement>,
    right: Box<dyn CoordinateElement>,
}

impl TensorProductElement {
    pub fn new(left: Box<dyn CoordinateElement>, right: Box<dyn CoordinateElement>) -> Self {
        Self { left, right }
    }
}

fn check_point(element: &dyn CoordinateElement, point: &[f64]) -> Result<(), MeshStructureError> {
    let d = element.reference_dimension();
    if point.len() != d {
        return Err(MeshStructureError::InvalidGeometry(format!(
            "reference point has {} components, element is {d}D",
            point.len()
        )));
    }
    Ok(())
}

impl CoordinateElement for LagrangeP1 {
    fn reference_dimension(&self) -> usize {
        self.0
    }

    fn basis_count(&self) -> usize {
        self.0 + 1
    }

    fn tabulate(&self, point: &[f64]) -> Result<Vec<f64>, MeshStructureError> {
        check_point(self, point)?;
        let mut out = Vec::with_capacity(self.0 + 1);
        out.push(1.0 - point.iter().sum::<f64>());
        out.extend_from_slice(point);
        Ok(out)
    }

    fn tabulate_gradients(&self, point: &[f64]) -> Result<Vec<Vec<f64>>, MeshStructureError> {
        check_point(self, point)?;
        let d = self.0;
        let mut out = Vec::with_capacity(d + 1);
        out.push(vec![-1.0; d]);
        for k in 0..d {
            let mut g = vec![0.0; d];
            g[k] = 1.0;
            out.push(g);
        }
        Ok(out)
    }
}

impl LagrangeQ1 {
    /// Whether vertex `b` sits at 1 on axis `k`.
    fn high(&self, b: usize, k: usize) -> bool {
        (b >> (self.0 - 1 - k)) & 1 == 1
    }
}

impl CoordinateElement for LagrangeQ1 {
    fn reference_dimension(&self) -> usize {
        self.0
    }

    fn basis_count(&self) -> usize {
        1 << self.0
    }

    fn tabulate(&self, point: &[f64]) -> Result<Vec<f64>, MeshStructureError> {
        check_point(self, point)?;
        Ok((0..self.basis_count())
            .map(|b| {
                point
                    .iter()
                    .enumerate()
                    .map(|(k, &x)| if self.high(b, k) { x } else { 1.0 - x })
                    .product()
            })
            .collect())
    }

    fn tabulate_gradients(&self, point: &[f64]) -> Result<Vec<Vec<f64>>, MeshStructureError> {
        check_point(self, point)?;
        Ok((0..self.basis_count())
            .map(|b| {
                (0..self.0)
                    .map(|j| {
                        point
                            .iter()
                            .enumerate()
                            .map(|(k, &x)| match (k == j, self.high(b, k)) {
                                (true, true) => 1.0,
                                (true, false) => -1.0,
                                (false, true) => x,
                                (false, false) => 1.0 - x,
                            })
                            .product()
                    })
                    .collect()
            })
            .collect())
    }
}

impl CoordinateElement for PointElement {
    fn reference_dimension(&self) -> usize {
        0
    }

    fn basis_count(&self) -> usize {
        1
    }

    fn tabulate(&self, point: &[f64]) -> Result<Vec<f64>, MeshStructureError> {
        check_point(self, point)?;
        Ok(vec![1.0])
    }

    fn tabulate_gradients(&self, point: &[f64]) -> Result<Vec<Vec<f64>>, MeshStructureError> {
        check_point(self, point)?;
        Ok(vec![Vec::new()])
    }
}

impl CoordinateElement for TensorProductElement {
    fn reference_dimension(&self) -> usize {
        self.left.reference_dimension() + self.right.reference_dimension()
    }

    fn basis_count(&self) -> usize {
        self.left.basis_count() * self.right.basis_count()
    }

    fn tabulate(&self, point: &[f64]) -> Result<Vec<f64>, MeshStructureError> {
        check_point(self, point)?;
        let (a, b) = point.split_at(self.left.reference_dimension());
        let (fa, fb) = (self.left.tabulate(a)?, self.right.tabulate(b)?);
        Ok(fa
            .iter()
            .flat_map(|x| fb.iter().map(move |y| x * y))
            .collect())
    }

    fn tabulate_gradients(&self, point: &[f64]) -> Result<Vec<Vec<f64>>, MeshStructureError> {
        check_point(self, point)?;
        let (a, b) = point.split_at(self.left.reference_dimension());
        let (fa, fb) = (self.left.tabulate(a)?, self.right.tabulate(b)?);
        let (ga, gb) = (
            self.left.tabulate_gradients(a)?,
            self.right.tabulate_gradients(b)?,
        );
        let mut out = Vec::with_capacity(fa.len() * fb.len());
        for i in 0..fa.len() {
            for j in 0..fb.len() {
                let mut g: Vec<f64> = ga[i].iter().map(|d| d * fb[j]).collect();
                g.extend(gb[j].iter().map(|d| fa[i] * d));
                out.push(g);
            }
        }
        Ok(out)
    }
}

/// Vertex-interpolating element of a reference shape.
pub fn element_for(cell: CellType) -> Result<Box<dyn CoordinateElement>, MeshStructureError> {
    let d = cell.dimension() as usize;
    Ok(match cell {
        CellType::Vertex => Box::new(PointElement),
        CellType::Prism => Box::new(TensorProductElement::new(
            Box::new(LagrangeP1(2)),
            Box::new(LagrangeP1(1)),
        )),
        c if c.is_simplex() => Box::new(LagrangeP1(d)),
        c if c.is_hypercube() => Box::new(LagrangeQ1(d)),
        other => {
            return Err(MeshStructureError::InvalidGeometry(format!(
                "no coordinate element for {other:?}"
            )));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn p1_partition_of_unity() {
        let e = LagrangeP1(3);
        let phi = e.tabulate(&[0.2, 0.3, 0.1]).unwrap();
        assert_eq!(phi.len(), 4);
        assert_relative_eq!(phi.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(phi[0], 0.4, epsilon = 1e-12);
        let grads = e.tabulate_gradients(&[0.2, 0.3, 0.1]).unwrap();
        for k in 0..3 {
            assert_relative_eq!(grads.iter().map(|g| g[k]).sum::<f64>(), 0.0);
        }
    }

    #[test]
    fn q1_interpolates_vertices_last_axis_fastest() {
        let e = LagrangeQ1(2);
        // vertex 1 is (0, 1)
        assert_eq!(e.tabulate(&[0.0, 1.0]).unwrap(), vec![0.0, 1.0, 0.0, 0.0]);
        assert_eq!(e.tabulate(&[1.0, 0.0]).unwrap(), vec![0.0, 0.0, 1.0, 0.0]);
        let g = e.tabulate_gradients(&[0.5, 0.25]).unwrap();
        assert_relative_eq!(g[0][0], -0.75);
        assert_relative_eq!(g[0][1], -0.5);
        assert_relative_eq!(g[3][0], 0.25);
        assert_relative_eq!(g[3][1], 0.5);
    }

    #[test]
    fn prism_element_is_tensor_product() {
        let e = element_for(CellType::Prism).unwrap();
        assert_eq!(e.reference_dimension(), 3);
        assert_eq!(e.basis_count(), 6);
        let phi = e.tabulate(&[1.0, 0.0, 1.0]).unwrap();
        // reference vertex 1 * 2 + 1
        assert_eq!(phi, vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
        let g = e.tabulate_gradients(&[0.25, 0.25, 0.5]).unwrap();
        assert_relative_eq!(g[0][0], -0.5);
        assert_relative_eq!(g[0][2], -0.5);
    }

    #[test]
    fn arity_is_checked() {
        assert!(LagrangeQ1(2).tabulate(&[0.5]).is_err());
        assert_eq!(PointElement.tabulate(&[]).unwrap(), vec![1.0]);
        assert!(element_for(CellType::TensorProduct(4)).is_err());
    }
}
