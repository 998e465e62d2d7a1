//! Tensor-product refinement of a `d`-cube.
//!
//! A `k`-dimensional entity of the refined cube extends along a set `S` of
//! `k` axes. Its class indexes the lower corner: `n_a` values along the axes
//! in `S`, `n_a + 1` along the others. The facets of an `S`-entity drop one
//! axis `a = S[p]` and sit at offset `0` or `e_a`, with local labels `2p` and
//! `2p + 1`: lexicographic order on `(extent tuple, origin tuple)` of the
//! reference cube.

use crate::geometry::parametrization::Parametrization;
use crate::mesh_error::MeshStructureError;
use crate::topology::builder::TopologyBuilder;
use crate::topology::cell_type::CellType;
use crate::topology::entity_set::{EntitySet, EntitySetId, Tag};
use crate::topology::polyhedral::PolyhedralSet;
use crate::topology::structure::{Base, Topology};
use itertools::Itertools;

/// Refine the `cells.len()`-cube into `cells[a]` cells along axis `a`.
pub fn hypercube(cells: &[usize]) -> Result<Topology, MeshStructureError> {
    let d = cells.len();
    if d == 0 || d > u8::MAX as usize {
        return Err(MeshStructureError::InvalidSet(format!(
            "hypercube refinement of dimension {d}"
        )));
    }
    let mut b = TopologyBuilder::new(d, Base::Shape(CellType::hypercube(d as u8)));
    let mut classes: Vec<(Vec<usize>, EntitySetId)> = Vec::new();
    for k in (0..=d).rev() {
        for along in (0..d).combinations(k) {
            let extents: Vec<usize> = (0..d)
                .map(|a| cells[a] + usize::from(!along.contains(&a)))
                .collect();
            let set = EntitySet::new(
                PolyhedralSet::boxed(&extents),
                k,
                face_tag(d, &along),
                CellType::hypercube(k as u8),
            );
            classes.push((along, b.entity_set(set)));
        }
    }

    for (along, source) in &classes {
        for (p, &axis) in along.iter().enumerate() {
            let facet: Vec<usize> = along.iter().copied().filter(|&a| a != axis).collect();
            let Some(&(_, target)) = classes.iter().find(|(s, _)| *s == facet) else {
                continue;
            };
            let lower = vec![0i64; d];
            let mut upper = lower.clone();
            upper[axis] = 1;
            b.offsets(*source, target, &[(lower, 2 * p), (upper, 2 * p + 1)]);
        }
    }

    b.parametrization(Parametrization::Scaled {
        divisors: cells.iter().map(|&n| n.max(1) as f64).collect(),
    });
    let topology = b.build()?;
    log::debug!("hypercube refinement {cells:?}: {} classes", classes.len());
    Ok(topology)
}

/// `cell`, `vertex`, or `edge_x`, `face_xz`, ... naming the axes a face
/// extends along.
fn face_tag(d: usize, along: &[usize]) -> Tag {
    let k = along.len();
    if k == d {
        return Tag::new("cell");
    }
    let kind = match k {
        0 => return Tag::new("vertex"),
        1 => "edge".to_string(),
        2 => "face".to_string(),
        k => format!("{k}face"),
    };
    let axes: String = along.iter().map(|&a| super::axis_name(a)).collect();
    Tag::new(&format!("{kind}_{axes}"))
}
