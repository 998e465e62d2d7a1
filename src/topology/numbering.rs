//! Reference-element numbering conventions.
//!
//! Local labels in every incidence map are derived from the tables here, so
//! that position `k` of a cone is always local entity `k` of the reference
//! element used by the finite-element library:
//!
//! * simplices follow UFC: vertices `0..=d`; a `k`-subentity is a vertex
//!   subset listed in reverse lexicographic order, so facet `k` is opposite
//!   vertex `k` and the triangle edges are `[(1,2), (0,2), (0,1)]`;
//! * tensor-product shapes (hypercubes, prisms) list subentities by the
//!   dimension split `(k_a, k_b)` ascending in `k_a`, then lexicographically
//!   by factor entity; vertices are numbered lexicographically. For a
//!   hypercube this is lexicographic order on `(extent tuple, origin tuple)`;
//! * every subentity lists its vertices ascending, i.e. edges point from the
//!   lower to the higher vertex.
//!
//! Kuhn simplices of a refined hypercube fall into two classes.
//! [`kuhn_class`] compares the orientation of the lexicographically sorted
//! vertex simplex with `(-1)^(d(d-1)/2)`; *low* cells keep increasing
//! lexicographic vertex order and *high* cells use the reverse, which keeps
//! the reference-to-physical Jacobian sign uniform in 2D.

use crate::mesh_error::MeshStructureError;
use crate::topology::cell_type::CellType;
use crate::topology::entity_set::LocalNumbering;
use crate::topology::orientation::{Perm, Sign, accumulate_path, simplex_orientation};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Vertex lists of the `k`-dimensional subentities of `cell`, in reference
/// order.
pub fn subentities(cell: CellType, k: usize) -> Result<Vec<Vec<usize>>, MeshStructureError> {
    let d = cell.dimension() as usize;
    if k > d {
        return Ok(Vec::new());
    }
    match cell {
        CellType::Prism => product_subentities(CellType::Triangle, CellType::Segment, k),
        c if c.is_simplex() => Ok(simplex_subentities(d, k)),
        c if c.is_hypercube() => {
            product_subentities(CellType::hypercube(d as u8 - 1), CellType::Segment, k)
        }
        other => Err(unsupported(other)),
    }
}

/// Integer coordinates of the reference vertices.
pub fn reference_vertices(cell: CellType) -> Result<Vec<Vec<i64>>, MeshStructureError> {
    let d = cell.dimension() as usize;
    match cell {
        CellType::Prism => product_vertices(CellType::Triangle, CellType::Segment),
        c if c.is_simplex() => Ok(std::iter::once(vec![0; d])
            .chain((0..d).map(|a| {
                let mut v = vec![0; d];
                v[a] = 1;
                v
            }))
            .collect()),
        c if c.is_hypercube() => product_vertices(CellType::hypercube(d as u8 - 1), CellType::Segment),
        other => Err(unsupported(other)),
    }
}

fn unsupported(cell: CellType) -> MeshStructureError {
    MeshStructureError::InvalidSet(format!("no reference numbering for {cell:?}"))
}

fn simplex_subentities(d: usize, k: usize) -> Vec<Vec<usize>> {
    match k {
        0 => (0..=d).map(|v| vec![v]).collect(),
        k if k == d => vec![(0..=d).collect()],
        k => {
            let mut combos: Vec<Vec<usize>> = (0..=d).combinations(k + 1).collect();
            combos.reverse();
            combos
        }
    }
}

fn product_subentities(
    a: CellType,
    b: CellType,
    k: usize,
) -> Result<Vec<Vec<usize>>, MeshStructureError> {
    let (da, db) = (a.dimension() as usize, b.dimension() as usize);
    let nb = b.vertex_count().ok_or_else(|| unsupported(b))?;
    let mut out = Vec::new();
    for ka in 0..=k.min(da) {
        let kb = k - ka;
        if kb > db {
            continue;
        }
        let (ea, eb) = (subentities(a, ka)?, subentities(b, kb)?);
        for va in &ea {
            for vb in &eb {
                out.push(
                    va.iter()
                        .cartesian_product(vb)
                        .map(|(x, y)| x * nb + y)
                        .collect(),
                );
            }
        }
    }
    Ok(out)
}

fn product_vertices(a: CellType, b: CellType) -> Result<Vec<Vec<i64>>, MeshStructureError> {
    let (va, vb) = (reference_vertices(a)?, reference_vertices(b)?);
    Ok(va
        .iter()
        .cartesian_product(&vb)
        .map(|(x, y)| x.iter().chain(y).copied().collect())
        .collect())
}

/// Reference label of the subentity spanned by `vertices` (local vertex
/// numbers, any order) among `reference`.
pub fn label_of(reference: &[Vec<usize>], vertices: &[usize]) -> Option<usize> {
    let mut key = vertices.to_vec();
    key.sort_unstable();
    reference.iter().position(|e| *e == key)
}

/// Orientation class of a Kuhn simplex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KuhnClass {
    Low,
    High,
}

impl KuhnClass {
    /// Local vertex numbering of cells of this class.
    pub fn numbering(self, axes: usize) -> LocalNumbering {
        match self {
            KuhnClass::Low => LocalNumbering::lexicographic(axes),
            KuhnClass::High => LocalNumbering::reverse_lexicographic(axes),
        }
    }
}

/// Classify the simplex spanned by `vertices` (hypercube lattice points).
pub fn kuhn_class(vertices: &[Vec<i64>]) -> Result<KuhnClass, MeshStructureError> {
    let d = vertices.first().map_or(0, |v| v.len());
    let sorted: Vec<Vec<i64>> = vertices.iter().cloned().sorted().collect();
    let sign = simplex_orientation(&sorted).ok_or_else(|| {
        MeshStructureError::MalformedMap(format!("degenerate Kuhn simplex {vertices:?}"))
    })?;
    if sign == Sign::power(d * d.saturating_sub(1) / 2) {
        Ok(KuhnClass::Low)
    } else {
        Ok(KuhnClass::High)
    }
}

/// Sign of the simplex once its vertices are renumbered by `numbering`:
/// the sorted orientation composed with the parity of the reordering.
pub fn numbered_orientation(
    vertices: &[Vec<i64>],
    numbering: &LocalNumbering,
) -> Option<Sign> {
    let sorted = Perm::sorting(vertices);
    let numbered = numbering.order(vertices);
    let sorted_sign = simplex_orientation(&sorted.apply(vertices))?;
    let relabel = sorted.invert().compose(&numbered);
    Some(accumulate_path([sorted_sign, relabel.sign()]))
}
