//! Coordinates of structured entities.
//!
//! A [`Geometry`] places a topology in space. Vertex multiindices are first
//! taken to macro-element reference coordinates `y` by the topology's
//! [`Parametrization`](crate::geometry::parametrization::Parametrization),
//! then to physical coordinates by the macro map
//! `x = F(y) = Σ_c corners_c φ_c(y)` of the macro coordinate element.
//!
//! On an entity `mi` with closure vertices `y_l` and cell element `ψ`, the
//! local map is `F_mi(q) = F(Σ_l y_l ψ_l(q))`. Sampling the macro map at the
//! vertices gives the geometry dofs `F(y_l)`; interpolating those dofs,
//! `Σ_l F(y_l) ψ_l(q)`, reproduces `F_mi` exactly whenever `F` is affine
//! along the entity (always the case for straight-sided macro elements and
//! for multilinear maps on tensor-product sub-cells).
//!
//! Jacobians are returned row-major with shape
//! `(geometric_dimension, entity dimension)`.
//!
//! [`geometry_dofs`](Geometry::geometry_dofs) and
//! [`spatial_coordinate`](Geometry::spatial_coordinate) accept concrete or
//! symbolic multiindices. Concrete queries return coordinates; symbolic ones
//! return a [`SymbolicPoint`] (the reference point `y` as affine index
//! expressions, plus membership guards) that [`Geometry::evaluate`] maps to
//! coordinates once the indices are bound. Interpolated and jacobian queries
//! are numeric.

use crate::geometry::basis::{CoordinateElement, element_for};
use crate::geometry::symbolic::{AffineCoordinate, SymbolicPoint};
use crate::mesh_error::MeshStructureError;
use crate::topology::index_expr::{Bindings, Guard, Guarded, IndexExpr, IndexValue};
use crate::topology::multiindex::Multiindex;
use crate::topology::structure::Topology;
use std::fmt::Debug;
use std::sync::Arc;

/// Index types accepted by point queries, with what such a query returns.
pub trait GeometryIndex: IndexValue {
    type Point: Debug;

    /// Turn the macro reference point `reference` of `entity` into this
    /// index type's query result.
    fn realize(
        geometry: &Geometry,
        entity: &Multiindex<Self>,
        reference: Vec<AffineCoordinate<Self>>,
        guards: &[Guard<Self>],
    ) -> Result<Self::Point, MeshStructureError>;
}

impl GeometryIndex for i64 {
    type Point = Vec<f64>;

    fn realize(
        geometry: &Geometry,
        _entity: &Multiindex<i64>,
        reference: Vec<AffineCoordinate<i64>>,
        _guards: &[Guard<i64>],
    ) -> Result<Vec<f64>, MeshStructureError> {
        let y: Vec<f64> = reference.iter().map(AffineCoordinate::value).collect();
        geometry.macro_map(&y)
    }
}

impl GeometryIndex for IndexExpr {
    type Point = SymbolicPoint;

    fn realize(
        _geometry: &Geometry,
        entity: &Multiindex<IndexExpr>,
        reference: Vec<AffineCoordinate<IndexExpr>>,
        guards: &[Guard<IndexExpr>],
    ) -> Result<SymbolicPoint, MeshStructureError> {
        Ok(SymbolicPoint {
            entity: entity.clone(),
            reference,
            guards: guards.to_vec(),
        })
    }
}

/// A topology embedded in `geometric_dimension`-space by its macro element.
#[derive(Debug)]
pub struct Geometry {
    topology: Arc<Topology>,
    geometric_dimension: usize,
    element: Box<dyn CoordinateElement>,
    corners: Vec<Vec<f64>>,
}

static_assertions::assert_impl_all!(Geometry: Send, Sync);

impl Geometry {
    /// Geometry with the vertex-interpolating element of the macro cell;
    /// `corners` are listed in that element's vertex order.
    pub fn new(
        topology: Arc<Topology>,
        geometric_dimension: usize,
        corners: Vec<Vec<f64>>,
    ) -> Result<Self, MeshStructureError> {
        let element = element_for(topology.macro_cell())?;
        Self::with_element(topology, geometric_dimension, element, corners)
    }

    /// Geometry with an explicit macro coordinate element, one corner per
    /// basis function.
    pub fn with_element(
        topology: Arc<Topology>,
        geometric_dimension: usize,
        element: Box<dyn CoordinateElement>,
        corners: Vec<Vec<f64>>,
    ) -> Result<Self, MeshStructureError> {
        let parametrization = topology.parametrization().ok_or_else(|| {
            MeshStructureError::InvalidGeometry("topology has no vertex parametrization".into())
        })?;
        if geometric_dimension < topology.dimension() {
            return Err(MeshStructureError::InvalidGeometry(format!(
                "geometric dimension {geometric_dimension} below topological dimension {}",
                topology.dimension()
            )));
        }
        if parametrization.dimension() != element.reference_dimension() {
            return Err(MeshStructureError::InvalidGeometry(format!(
                "parametrization yields {}D points, element is {}D",
                parametrization.dimension(),
                element.reference_dimension()
            )));
        }
        if corners.len() != element.basis_count() {
            return Err(MeshStructureError::InvalidGeometry(format!(
                "corner count mismatch: expected {}, got {}",
                element.basis_count(),
                corners.len()
            )));
        }
        if let Some(c) = corners.iter().find(|c| c.len() != geometric_dimension) {
            return Err(MeshStructureError::InvalidGeometry(format!(
                "corner {c:?} is not {geometric_dimension}-dimensional"
            )));
        }
        Ok(Self {
            topology,
            geometric_dimension,
            element,
            corners,
        })
    }

    pub fn topology(&self) -> &Arc<Topology> {
        &self.topology
    }

    pub fn geometric_dimension(&self) -> usize {
        self.geometric_dimension
    }

    pub fn corners(&self) -> &[Vec<f64>] {
        &self.corners
    }

    /// Macro coordinate element.
    pub fn element(&self) -> &dyn CoordinateElement {
        self.element.as_ref()
    }

    /// Physical coordinates of the closure vertices of `mi`, in the local
    /// numbering of its class.
    pub fn geometry_dofs<I: GeometryIndex>(
        &self,
        mi: &Multiindex<I>,
    ) -> Result<Vec<I::Point>, MeshStructureError> {
        let ys = self.reference_vertices(mi)?;
        let guards = self.membership_guards(mi)?;
        ys.into_iter()
            .map(|y| I::realize(self, mi, y, &guards))
            .collect()
    }

    /// `F_mi(qp)`, evaluated through the macro map.
    pub fn spatial_coordinate<I: GeometryIndex>(
        &self,
        mi: &Multiindex<I>,
        qp: &[f64],
    ) -> Result<I::Point, MeshStructureError> {
        let ys = self.reference_vertices(mi)?;
        let psi = self.entity_element(mi, ys.len())?.tabulate(qp)?;
        let y = AffineCoordinate::blend(&ys, &psi, self.element.reference_dimension());
        let guards = self.membership_guards(mi)?;
        I::realize(self, mi, y, &guards)
    }

    /// Coordinates of a symbolic point query under `bindings`. Fails with
    /// `OutOfDomain` when a guard of the queried entity does not hold.
    pub fn evaluate(
        &self,
        point: &SymbolicPoint,
        bindings: &Bindings,
    ) -> Result<Vec<f64>, MeshStructureError> {
        for g in &point.guards {
            if !g.holds(bindings)? {
                let tag = self.topology.entity_set(point.entity.entity_set())?.tag().clone();
                return Err(MeshStructureError::OutOfDomain {
                    tag,
                    index: format!("{}", point.entity),
                });
            }
        }
        self.macro_map(&point.reference_at(bindings)?)
    }

    /// `Σ_l dofs_l ψ_l(qp)`.
    pub fn spatial_coordinate_from_dofs(
        &self,
        mi: &Multiindex<i64>,
        qp: &[f64],
    ) -> Result<Vec<f64>, MeshStructureError> {
        let dofs = self.geometry_dofs(mi)?;
        let psi = self.entity_element(mi, dofs.len())?.tabulate(qp)?;
        Ok(combine(&dofs, &psi, self.geometric_dimension))
    }

    /// `dF_mi/dq` at `qp` by the chain rule through the macro map.
    pub fn jacobian(
        &self,
        mi: &Multiindex<i64>,
        qp: &[f64],
    ) -> Result<Vec<f64>, MeshStructureError> {
        let ys = self.numeric_vertices(mi)?;
        let element = self.entity_element(mi, ys.len())?;
        let psi = element.tabulate(qp)?;
        let grads = element.tabulate_gradients(qp)?;
        let rdim = self.element.reference_dimension();
        let y = combine(&ys, &psi, rdim);
        let dy = outer_sum(&ys, &grads, rdim, element.reference_dimension());
        let dx = self.macro_gradient(&y)?;
        Ok(matmul(
            &dx,
            &dy,
            self.geometric_dimension,
            rdim,
            element.reference_dimension(),
        ))
    }

    /// `Σ_l dofs_l ⊗ ∇ψ_l(qp)`.
    pub fn jacobian_from_dofs(
        &self,
        mi: &Multiindex<i64>,
        qp: &[f64],
    ) -> Result<Vec<f64>, MeshStructureError> {
        let dofs = self.geometry_dofs(mi)?;
        let element = self.entity_element(mi, dofs.len())?;
        let grads = element.tabulate_gradients(qp)?;
        Ok(outer_sum(
            &dofs,
            &grads,
            self.geometric_dimension,
            element.reference_dimension(),
        ))
    }

    /// Macro reference coordinates of the closure vertices of `mi`.
    fn reference_vertices<I: IndexValue>(
        &self,
        mi: &Multiindex<I>,
    ) -> Result<Vec<Vec<AffineCoordinate<I>>>, MeshStructureError> {
        let parametrization = self.topology.parametrization().ok_or_else(|| {
            MeshStructureError::InvalidGeometry("topology has no vertex parametrization".into())
        })?;
        self.topology
            .closure_vertices(mi)?
            .iter()
            .map(|v| parametrization.affine(v.index()))
            .collect()
    }

    fn numeric_vertices(&self, mi: &Multiindex<i64>) -> Result<Vec<Vec<f64>>, MeshStructureError> {
        Ok(self
            .reference_vertices(mi)?
            .iter()
            .map(|y| y.iter().map(AffineCoordinate::value).collect())
            .collect())
    }

    /// Undecided membership conditions of `mi`; none for concrete indices.
    fn membership_guards<I: IndexValue>(
        &self,
        mi: &Multiindex<I>,
    ) -> Result<Vec<Guard<I>>, MeshStructureError> {
        let set = self.topology.entity_set(mi.entity_set())?;
        let guards = set
            .polyhedral_set()
            .guards(mi.index())
            .into_iter()
            .map(Guard::NonNegative)
            .collect();
        Guarded::resolve((), guards)
            .map(|g| g.guards)
            .ok_or_else(|| MeshStructureError::OutOfDomain {
                tag: set.tag().clone(),
                index: format!("{mi}"),
            })
    }

    /// Vertex-interpolating element of `mi`'s class, checked against its
    /// closure vertex count.
    fn entity_element<I: IndexValue>(
        &self,
        mi: &Multiindex<I>,
        vertices: usize,
    ) -> Result<Box<dyn CoordinateElement>, MeshStructureError> {
        let set = self.topology.entity_set(mi.entity_set())?;
        let element = element_for(set.cell_type())?;
        if element.basis_count() != vertices {
            return Err(MeshStructureError::InvalidGeometry(format!(
                "`{}` entity has {vertices} vertices, its {:?} element needs {}",
                set.tag(),
                set.cell_type(),
                element.basis_count()
            )));
        }
        Ok(element)
    }

    fn macro_map(&self, y: &[f64]) -> Result<Vec<f64>, MeshStructureError> {
        let phi = self.element.tabulate(y)?;
        Ok(combine(&self.corners, &phi, self.geometric_dimension))
    }

    fn macro_gradient(&self, y: &[f64]) -> Result<Vec<f64>, MeshStructureError> {
        let grads = self.element.tabulate_gradients(y)?;
        Ok(outer_sum(
            &self.corners,
            &grads,
            self.geometric_dimension,
            self.element.reference_dimension(),
        ))
    }
}

/// `Σ_l points_l w_l`.
fn combine(points: &[Vec<f64>], weights: &[f64], dim: usize) -> Vec<f64> {
    let mut out = vec![0.0; dim];
    for (p, w) in points.iter().zip(weights) {
        for (o, x) in out.iter_mut().zip(p) {
            *o += w * x;
        }
    }
    out
}

/// `Σ_l points_l ⊗ grads_l`, row-major `(dim, cols)`.
fn outer_sum(points: &[Vec<f64>], grads: &[Vec<f64>], dim: usize, cols: usize) -> Vec<f64> {
    let mut out = vec![0.0; dim * cols];
    for (p, g) in points.iter().zip(grads) {
        for (r, x) in p.iter().enumerate().take(dim) {
            for (c, d) in g.iter().enumerate().take(cols) {
                out[r * cols + c] += x * d;
            }
        }
    }
    out
}

fn matmul(a: &[f64], b: &[f64], rows: usize, inner: usize, cols: usize) -> Vec<f64> {
    let mut out = vec![0.0; rows * cols];
    for r in 0..rows {
        for k in 0..inner {
            let x = a[r * inner + k];
            for c in 0..cols {
                out[r * cols + c] += x * b[k * cols + c];
            }
        }
    }
    out
}
