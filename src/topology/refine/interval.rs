//! Refinements of a segment.

use crate::mesh_error::MeshStructureError;
use crate::topology::builder::TopologyBuilder;
use crate::topology::cell_type::CellType;
use crate::topology::entity_set::EntitySet;
use crate::topology::polyhedral::PolyhedralSet;
use crate::topology::structure::{Base, Topology};

/// `n` cells and `n + 1` vertices; cell `i` has vertices `i` (label 0) and
/// `i + 1` (label 1).
pub fn interval(n: usize) -> Result<Topology, MeshStructureError> {
    super::hypercube(&[n])
}

/// `n` cells on a closed loop: vertex `n` is vertex `0`.
///
/// No parametrization is attached, since the wrapped vertex has two
/// positions in the macro segment.
pub fn periodic_interval(n: usize) -> Result<Topology, MeshStructureError> {
    let mut b = TopologyBuilder::new(1, Base::Shape(CellType::Segment));
    let cells = b.entity_set(EntitySet::new(
        PolyhedralSet::periodic(n)?,
        1,
        "cell",
        CellType::Segment,
    ));
    let vertices = b.entity_set(EntitySet::new(
        PolyhedralSet::periodic(n)?,
        0,
        "vertex",
        CellType::Vertex,
    ));
    b.offsets(cells, vertices, &[([0], 0), ([1], 1)]);
    b.build()
}
