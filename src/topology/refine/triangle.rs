//! Kuhn refinement of the reference triangle.
//!
//! Vertices are the lattice points `(i, j)` with `i + j <= n`. Each lattice
//! square `[i, i+1] x [j, j+1]` below the hypotenuse is cut along its
//! anti-diagonal into a *low* triangle `{(i,j), (i+1,j), (i,j+1)}` and, when
//! `i + j <= n - 2`, a *high* triangle `{(i+1,j), (i,j+1), (i+1,j+1)}`.
//! Edges come in three directions: `x`, `y` and the anti-diagonal `xy`.
//!
//! Cone labels are derived, not tabulated: the vertices of each cell class
//! are ordered by the local numbering of its Kuhn class, and edge `k` is the
//! UFC edge opposite local vertex `k`.

use crate::geometry::parametrization::Parametrization;
use crate::mesh_error::MeshStructureError;
use crate::topology::builder::TopologyBuilder;
use crate::topology::cell_type::CellType;
use crate::topology::entity_set::{EntitySet, EntitySetId};
use crate::topology::numbering::{kuhn_class, subentities};
use crate::topology::polyhedral::PolyhedralSet;
use crate::topology::reference_map::MapEntry;
use crate::topology::structure::{Base, Topology};

/// Vertex offsets of the two cell classes, relative to the cell index.
const LOW: [[i64; 2]; 3] = [[0, 0], [1, 0], [0, 1]];
const HIGH: [[i64; 2]; 3] = [[1, 0], [0, 1], [1, 1]];

/// Endpoint offsets of the edge classes, lexicographically ascending.
const EDGES: [(&str, [[i64; 2]; 2]); 3] = [
    ("edge_x", [[0, 0], [1, 0]]),
    ("edge_y", [[0, 0], [0, 1]]),
    ("edge_xy", [[0, 1], [1, 0]]),
];

/// Kuhn refinement with `n` cells along each leg.
pub fn kuhn_triangle(n: usize) -> Result<Topology, MeshStructureError> {
    if n == 0 {
        return Err(MeshStructureError::InvalidSet(
            "triangle refinement needs at least one cell per leg".into(),
        ));
    }
    let mut b = TopologyBuilder::new(2, Base::Shape(CellType::Triangle));
    let mut cells = Vec::with_capacity(2);
    for (tag, extent, offsets) in [("cell_low", n, LOW), ("cell_high", n - 1, HIGH)] {
        let vertices: Vec<Vec<i64>> = offsets.iter().map(|v| v.to_vec()).collect();
        let numbering = kuhn_class(&vertices)?.numbering(2);
        let id = b.entity_set(
            EntitySet::new(PolyhedralSet::simplex(2, extent), 2, tag, CellType::Triangle)
                .with_numbering(numbering.clone()),
        );
        let local = numbering.order(&vertices).apply(&vertices);
        cells.push((id, local));
    }
    let edges: Vec<EntitySetId> = EDGES
        .iter()
        .map(|(tag, _)| {
            b.entity_set(EntitySet::new(
                PolyhedralSet::simplex(2, n),
                1,
                *tag,
                CellType::Segment,
            ))
        })
        .collect();
    let vertices = b.entity_set(EntitySet::new(
        PolyhedralSet::simplex(2, n + 1),
        0,
        "vertex",
        CellType::Vertex,
    ));

    let reference = subentities(CellType::Triangle, 1)?;
    for (cell, local) in &cells {
        let mut per_edge: Vec<Vec<MapEntry>> = vec![Vec::new(); EDGES.len()];
        for (label, pair) in reference.iter().enumerate() {
            let (p, q) = (&local[pair[0]], &local[pair[1]]);
            let (lo, hi) = if p <= q { (p, q) } else { (q, p) };
            let (e, offset) = EDGES
                .iter()
                .enumerate()
                .find_map(|(e, (_, [a, z]))| {
                    let offset = [lo[0] - a[0], lo[1] - a[1]];
                    (hi[0] - z[0] == offset[0] && hi[1] - z[1] == offset[1]).then_some((e, offset))
                })
                .ok_or_else(|| {
                    MeshStructureError::MalformedMap(format!(
                        "no edge class joins {lo:?} and {hi:?}"
                    ))
                })?;
            per_edge[e].push(MapEntry::offset(&offset, label));
        }
        for (e, entries) in per_edge.into_iter().enumerate() {
            if !entries.is_empty() {
                b.map(*cell, edges[e], entries);
            }
        }
    }
    for (e, (_, [a, z])) in EDGES.iter().enumerate() {
        b.offsets(edges[e], vertices, &[(a, 0), (z, 1)]);
    }

    b.parametrization(Parametrization::uniform(2, n));
    b.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::multiindex::Multiindex;
    use crate::topology::numbering::{KuhnClass, numbered_orientation};

    fn class(t: &Topology, tag: &str) -> EntitySetId {
        t.entity_sets(0, Some(tag))[0]
    }

    #[test]
    fn low_cell_cone_is_opposite_vertex_order() {
        let t = kuhn_triangle(3).unwrap();
        let low = class(&t, "cell_low");
        let cone = t.labelled_cone(&Multiindex::new(low, vec![1i64, 1])).unwrap();
        let tags: Vec<&str> = cone
            .iter()
            .map(|(m, _)| t.entity_set(m.entity_set()).unwrap().tag().as_str())
            .collect();
        assert_eq!(tags, vec!["edge_xy", "edge_x", "edge_y"]);
        assert!(cone.iter().all(|(m, _)| m.index() == [1, 1]));
    }

    #[test]
    fn high_cell_edges_and_vertices() {
        let t = kuhn_triangle(3).unwrap();
        let high = class(&t, "cell_high");
        let mi = Multiindex::new(high, vec![0i64, 1]);
        let cone = t.cone(&mi).unwrap();
        assert_eq!(cone[0].index(), [0, 1]);
        assert_eq!(cone[1].index(), [0, 2]);
        assert_eq!(cone[2].index(), [1, 1]);
        let v: Vec<Vec<i64>> = t
            .closure_vertices(&mi)
            .unwrap()
            .into_iter()
            .map(|m| m.into_index())
            .collect();
        assert_eq!(v, vec![vec![1, 2], vec![1, 1], vec![0, 2]]);
    }

    #[test]
    fn class_sizes() {
        let t = kuhn_triangle(4).unwrap();
        let size = |id| t.entity_set(id).unwrap().size();
        assert_eq!(size(class(&t, "cell_low")), 10);
        assert_eq!(size(class(&t, "cell_high")), 6);
        assert_eq!(size(t.vertex_set().unwrap()), 15);
        for id in t.entity_sets(1, None) {
            assert_eq!(size(id), 10);
        }
    }

    #[test]
    fn both_classes_share_one_orientation() {
        let low: Vec<Vec<i64>> = LOW.iter().map(|v| v.to_vec()).collect();
        let high: Vec<Vec<i64>> = HIGH.iter().map(|v| v.to_vec()).collect();
        assert_eq!(kuhn_class(&low).unwrap(), KuhnClass::Low);
        assert_eq!(kuhn_class(&high).unwrap(), KuhnClass::High);
        assert_eq!(
            numbered_orientation(&low, &KuhnClass::Low.numbering(2)),
            numbered_orientation(&high, &KuhnClass::High.numbering(2))
        );
    }

    #[test]
    fn single_cell_has_no_high_triangles() {
        let t = kuhn_triangle(1).unwrap();
        assert_eq!(t.entity_set(class(&t, "cell_high")).unwrap().size(), 0);
        let e = t.entity_sets(1, Some("edge_xy"))[0];
        assert_eq!(t.support(&Multiindex::new(e, vec![0i64, 0])).unwrap().len(), 1);
    }
}
