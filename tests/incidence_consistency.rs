use mesh_structure::algs::extrude::extrude;
use mesh_structure::topology::refine::{hypercube, interval, kuhn_triangle, periodic_interval};
use mesh_structure::topology::validation::validate_topology;
use mesh_structure::DebugInvariants;
use mesh_structure::topology::{CellType, Multiindex, Topology, ValidationOptions, reference_cell};
use std::sync::Arc;

fn samples() -> Vec<(&'static str, Topology)> {
    vec![
        ("interval", interval(5).unwrap()),
        ("periodic", periodic_interval(4).unwrap()),
        ("quad", hypercube(&[3, 2]).unwrap()),
        ("hex", hypercube(&[2, 2, 2]).unwrap()),
        ("kuhn", kuhn_triangle(3).unwrap()),
        ("tet", reference_cell(CellType::Tetrahedron).unwrap()),
        ("prism", reference_cell(CellType::Prism).unwrap()),
        (
            "column",
            extrude(Arc::new(kuhn_triangle(2).unwrap()), 2).unwrap(),
        ),
    ]
}

#[test]
fn every_topology_passes_exhaustive_checks() {
    for (name, t) in samples() {
        if let Err(e) = validate_topology(&t, &ValidationOptions::all()) {
            panic!("{name}: {e}");
        }
        if let Err(e) = t.validate_invariants() {
            panic!("{name}: {e}");
        }
    }
}

#[test]
fn cone_and_support_are_mutually_inverse() {
    for (name, t) in samples() {
        for id in t.ids() {
            let set = t.entity_set(id).unwrap();
            for p in set.polyhedral_set().points() {
                let mi = Multiindex::new(id, p);
                for (b, l) in t.labelled_cone(&mi).unwrap() {
                    let up = t.support(&b).unwrap();
                    assert!(
                        up.contains(&(mi.clone(), l)),
                        "{name}: {mi:?} -> {b:?} (label {l}) missing from support {up:?}"
                    );
                }
                for (a, l) in t.support(&mi).unwrap() {
                    let cone = t.labelled_cone(&a).unwrap();
                    assert!(
                        cone.contains(&(mi.clone(), l)),
                        "{name}: support {a:?} of {mi:?} does not list it at {l}"
                    );
                }
            }
        }
    }
}

#[test]
fn interior_cones_are_full() {
    // every quad cell has 4 edges, every edge 2 vertices
    let t = hypercube(&[3, 3]).unwrap();
    for id in t.ids() {
        let set = t.entity_set(id).unwrap();
        for p in set.polyhedral_set().points() {
            let cone = t.cone(&Multiindex::new(id, p)).unwrap();
            assert_eq!(cone.len(), t.cone_size(id));
        }
    }
}

#[test]
fn cone_images_cover_each_target() {
    let t = kuhn_triangle(4).unwrap();
    let v = t.vertex_set().unwrap();
    let mut hit = std::collections::HashSet::new();
    for e in t.entity_sets(1, None) {
        for p in t.entity_set(e).unwrap().polyhedral_set().points() {
            hit.extend(t.cone(&Multiindex::new(e, p)).unwrap());
        }
    }
    assert_eq!(hit.len(), t.entity_set(v).unwrap().size());
}

#[test]
fn incidence_counts_match_adjacency_degrees() {
    for n in [1usize, 2, 4] {
        let t = hypercube(&[n, n]).unwrap();
        let cell = t.entity_set_by_codim(0, None).unwrap();
        let v = t.vertex_set().unwrap();
        let vertices: Vec<Multiindex<i64>> = t
            .entity_set(v)
            .unwrap()
            .polyhedral_set()
            .points()
            .map(|p| Multiindex::new(v, p))
            .collect();
        let edge_count: usize = t
            .entity_sets(1, None)
            .iter()
            .map(|&e| t.entity_set(e).unwrap().size())
            .sum();
        assert_eq!(edge_count, 2 * n * (n + 1));

        // each edge has two vertices, each cell four
        let vertex_edges: usize = vertices.iter().map(|m| t.support(m).unwrap().len()).sum();
        assert_eq!(vertex_edges, 2 * edge_count);
        let vertex_cells: usize = vertices
            .iter()
            .map(|m| t.index_relation(m, cell).unwrap().len())
            .sum();
        assert_eq!(vertex_cells, 4 * n * n);
    }
}

#[test]
fn cone_and_support_counts_agree_per_map() {
    for (name, t) in samples() {
        for map in t.maps() {
            let (a, b) = (map.source(), map.target());
            let down: usize = t
                .entity_set(a)
                .unwrap()
                .polyhedral_set()
                .points()
                .map(|p| {
                    let mi = Multiindex::new(a, p);
                    t.labelled_cone(&mi)
                        .unwrap()
                        .into_iter()
                        .filter(|(x, l)| x.entity_set() == b && map.labels().any(|m| m == *l))
                        .count()
                })
                .sum();
            let up: usize = t
                .entity_set(b)
                .unwrap()
                .polyhedral_set()
                .points()
                .map(|p| {
                    let mi = Multiindex::new(b, p);
                    t.support(&mi)
                        .unwrap()
                        .into_iter()
                        .filter(|(x, l)| x.entity_set() == a && map.labels().any(|m| m == *l))
                        .count()
                })
                .sum();
            assert_eq!(down, up, "{name}: map {a} -> {b}");
        }
    }
}
