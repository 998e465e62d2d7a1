//! Unstructured reference cells as topologies.
//!
//! The cell itself is a class with no axes; every lower-dimensional level is
//! indexed by its reference number (one class per subentity shape, so a
//! prism has separate triangle and quadrilateral face classes). Cone maps
//! out of the cell use `Fixed` components; all other maps are lookup tables
//! over the reference numbering, so that composing them with the structured
//! maps of an extrusion stays closed.

use crate::geometry::parametrization::Parametrization;
use crate::mesh_error::MeshStructureError;
use crate::topology::builder::TopologyBuilder;
use crate::topology::cell_type::CellType;
use crate::topology::entity_set::{EntitySet, EntitySetId, LocalNumbering, Tag};
use crate::topology::numbering::{label_of, reference_vertices, subentities};
use crate::topology::polyhedral::PolyhedralSet;
use crate::topology::reference_map::{Component, MapEntry};
use crate::topology::structure::{Base, Topology};
use std::sync::Arc;

/// One class of a reference-cell level: subentities of one shape.
struct Level {
    shape: CellType,
    id: EntitySetId,
    /// Reference numbers of the members, in class order.
    members: Vec<usize>,
}

/// Topology of the single reference `cell`.
pub fn reference_cell(cell: CellType) -> Result<Topology, MeshStructureError> {
    let d = cell.dimension() as usize;
    let subs: Vec<Vec<Vec<usize>>> = (0..=d)
        .map(|k| subentities(cell, k))
        .collect::<Result<_, _>>()?;

    let mut b = TopologyBuilder::new(d, Base::Shape(cell));
    // position of each reference subentity: (class in its level, index)
    let mut levels: Vec<Vec<Level>> = Vec::with_capacity(d + 1);
    let mut place: Vec<Vec<(usize, usize)>> = Vec::with_capacity(d + 1);
    // cells first, as in the structured patterns
    for k in (0..=d).rev() {
        let mut classes: Vec<(CellType, Vec<usize>)> = Vec::new();
        let mut where_: Vec<(usize, usize)> = Vec::with_capacity(subs[k].len());
        for (s, vertices) in subs[k].iter().enumerate() {
            let shape = if k == d { cell } else { shape_of(k, vertices.len())? };
            let c = match classes.iter().position(|(t, _)| *t == shape) {
                Some(c) => c,
                None => {
                    classes.push((shape, Vec::new()));
                    classes.len() - 1
                }
            };
            where_.push((c, classes[c].1.len()));
            classes[c].1.push(s);
        }
        let split = classes.len() > 1;
        let mut level = Vec::with_capacity(classes.len());
        for (shape, members) in classes {
            let set = if k == d && d > 0 {
                PolyhedralSet::point()
            } else {
                PolyhedralSet::interval(members.len())
            };
            let tag = level_tag(d, k, shape, split);
            let id = b.entity_set(
                EntitySet::new(set, k, tag, shape).with_numbering(LocalNumbering::lexicographic(1)),
            );
            level.push(Level { shape, id, members });
        }
        levels.push(level);
        place.push(where_);
    }
    levels.reverse();
    place.reverse();

    for k in 1..=d {
        for class in &levels[k] {
            let facets = subentities(class.shape, k - 1)?;
            // entries[(target class, label)] -> per-member facet index
            let mut tables: Vec<Vec<Vec<i64>>> = levels[k - 1]
                .iter()
                .map(|_| vec![Vec::new(); facets.len()])
                .collect();
            for &s in &class.members {
                let own = &subs[k][s];
                for (f, facet) in subs[k - 1].iter().enumerate() {
                    if !facet.iter().all(|v| own.contains(v)) {
                        continue;
                    }
                    let local: Vec<usize> = facet
                        .iter()
                        .filter_map(|v| own.iter().position(|w| w == v))
                        .collect();
                    let label = label_of(&facets, &local).ok_or_else(|| {
                        MeshStructureError::MalformedMap(format!(
                            "facet {facet:?} of {:?} {own:?} has no reference label",
                            class.shape
                        ))
                    })?;
                    let (c, index) = place[k - 1][f];
                    tables[c][label].push(index as i64);
                }
            }
            for (c, per_label) in tables.into_iter().enumerate() {
                let entries: Vec<MapEntry> = per_label
                    .into_iter()
                    .enumerate()
                    .filter(|(_, column)| column.len() == class.members.len())
                    .map(|(label, column)| {
                        let component = if k == d {
                            Component::Fixed(column[0])
                        } else {
                            Component::lookup(Arc::<[i64]>::from(column), 0)
                        };
                        MapEntry::new(vec![component], label)
                    })
                    .collect();
                if !entries.is_empty() {
                    b.map(class.id, levels[k - 1][c].id, entries);
                }
            }
        }
    }

    let coords = reference_vertices(cell)?
        .into_iter()
        .map(|v| v.into_iter().map(|x| x as f64).collect())
        .collect();
    b.parametrization(Parametrization::ReferenceVertices {
        dimension: d,
        coords,
    });
    b.build()
}

fn shape_of(k: usize, vertices: usize) -> Result<CellType, MeshStructureError> {
    let k8 = k as u8;
    if vertices == k + 1 {
        Ok(CellType::simplex(k8))
    } else if vertices == 1 << k {
        Ok(CellType::hypercube(k8))
    } else {
        Err(MeshStructureError::InvalidSet(format!(
            "{k}-dimensional subentity with {vertices} vertices"
        )))
    }
}

fn level_tag(d: usize, k: usize, shape: CellType, split: bool) -> Tag {
    let base = match k {
        _ if k == d => "cell",
        0 => "vertex",
        1 => "edge",
        2 => "face",
        _ => "ridge",
    };
    if split {
        Tag::new(&format!("{base}_{}", format!("{shape:?}").to_lowercase()))
    } else {
        Tag::new(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::multiindex::Multiindex;
    use crate::topology::validation::{ValidationOptions, validate_topology};

    #[test]
    fn triangle_follows_ufc() {
        let t = reference_cell(CellType::Triangle).unwrap();
        let cell = t.entity_set_by_codim(0, None).unwrap();
        let edge = t.entity_set_by_codim(1, None).unwrap();
        let mi = Multiindex::new(cell, Vec::<i64>::new());
        assert_eq!(
            t.cone(&mi).unwrap(),
            (0..3i64).map(|e| Multiindex::new(edge, vec![e])).collect::<Vec<_>>()
        );
        let verts: Vec<i64> = t
            .cone(&Multiindex::new(edge, vec![1i64]))
            .unwrap()
            .into_iter()
            .map(|m| m.index()[0])
            .collect();
        assert_eq!(verts, vec![0, 2]);
        let closure: Vec<i64> = t
            .closure_vertices(&mi)
            .unwrap()
            .into_iter()
            .map(|m| m.index()[0])
            .collect();
        assert_eq!(closure, vec![0, 1, 2]);
    }

    #[test]
    fn vertex_support_inverts_lookup_tables() {
        let t = reference_cell(CellType::Tetrahedron).unwrap();
        let v = t.vertex_set().unwrap();
        let edges = t.support(&Multiindex::new(v, vec![0i64])).unwrap();
        // UFC tetrahedron: edges 3, 4, 5 contain vertex 0 at local position 0
        let mut found: Vec<(i64, usize)> =
            edges.iter().map(|(m, l)| (m.index()[0], *l)).collect();
        found.sort_unstable();
        assert_eq!(found, vec![(3, 0), (4, 0), (5, 0)]);
        validate_topology(&t, &ValidationOptions::all()).unwrap();
    }

    #[test]
    fn prism_faces_split_by_shape() {
        let t = reference_cell(CellType::Prism).unwrap();
        let faces = t.entity_sets(1, None);
        let tags: Vec<&str> = faces
            .iter()
            .map(|&id| t.entity_set(id).unwrap().tag().as_str())
            .collect();
        assert_eq!(tags, vec!["face_quadrilateral", "face_triangle"]);
        let cell = t.entity_set_by_codim(0, None).unwrap();
        assert_eq!(t.cone_size(cell), 5);
        let quads = t.entity_set(faces[0]).unwrap();
        assert_eq!(quads.size(), 3);
        assert_eq!(t.cone_size(faces[0]), 4);
        assert_eq!(t.cone_size(faces[1]), 3);
    }

    #[test]
    fn quadrilateral_cell_vertices() {
        let t = reference_cell(CellType::Quadrilateral).unwrap();
        let cell = t.entity_set_by_codim(0, None).unwrap();
        let closure = t
            .closure_vertices(&Multiindex::new(cell, Vec::<i64>::new()))
            .unwrap();
        assert_eq!(closure.len(), 4);
        let coords: Vec<Vec<f64>> = closure
            .iter()
            .map(|m| t.parametrization().unwrap().evaluate(m.index()).unwrap())
            .collect();
        assert_eq!(
            coords,
            vec![
                vec![0.0, 0.0],
                vec![0.0, 1.0],
                vec![1.0, 0.0],
                vec![1.0, 1.0]
            ]
        );
    }
}
