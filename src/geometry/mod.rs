//! Geometry of structured topologies.
//!
//! - [`parametrization`]: vertex multiindices to macro reference coordinates
//! - [`basis`]: coordinate elements (`P1`, `Q1`, tensor products)
//! - [`mapping`]: [`Geometry`], the macro map and per-entity coordinates
//! - [`symbolic`]: affine reference coordinates of symbolic queries

pub mod basis;
pub mod mapping;
pub mod parametrization;
pub mod symbolic;

pub use basis::{
    CoordinateElement, LagrangeP1, LagrangeQ1, PointElement, TensorProductElement, element_for,
};
pub use mapping::{Geometry, GeometryIndex};
pub use parametrization::Parametrization;
pub use symbolic::{AffineCoordinate, SymbolicPoint};
