//! Structured refinement patterns.
//!
//! Each pattern assembles a [`Topology`](crate::topology::structure::Topology)
//! describing the uniform refinement of one macro element:
//!
//! - [`interval`] / [`periodic_interval`]: `n` cells on a segment, the
//!   latter with the last vertex identified with the first;
//! - [`hypercube`]: `n_0 x ... x n_{d-1}` cells on a `d`-cube, one entity
//!   class per direction set of each dimension;
//! - [`kuhn_triangle`]: `n^2` triangles on the reference triangle, split into
//!   low and high Kuhn classes.
//!
//! Cone labels follow the reference numbering in
//! [`numbering`](crate::topology::numbering), and every pattern carries the
//! [`Parametrization`](crate::geometry::parametrization::Parametrization)
//! placing its vertices in the macro element.

pub mod hypercube;
pub mod interval;
pub mod triangle;

pub use hypercube::hypercube;
pub use interval::{interval, periodic_interval};
pub use triangle::kuhn_triangle;

const AXIS_NAMES: [char; 4] = ['x', 'y', 'z', 'w'];

/// `x`, `y`, ... for the first four axes, `a<k>` beyond.
pub(crate) fn axis_name(axis: usize) -> String {
    AXIS_NAMES
        .get(axis)
        .map_or_else(|| format!("a{axis}"), |c| c.to_string())
}
