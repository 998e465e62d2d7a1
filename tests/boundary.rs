use mesh_structure::mesh_error::MeshStructureError;
use mesh_structure::topology::Multiindex;
use mesh_structure::topology::refine::{hypercube, kuhn_triangle};

#[test]
fn corner_and_interior_neighbours() {
    let t = hypercube(&[4, 4]).unwrap();
    let cell = t.entity_set_by_codim(0, None).unwrap();
    let corner = t.face_neighbours(&Multiindex::new(cell, vec![0i64, 0])).unwrap();
    assert_eq!(corner.len(), 2);
    assert!(corner.contains(&Multiindex::new(cell, vec![1, 0])));
    assert!(corner.contains(&Multiindex::new(cell, vec![0, 1])));
    let interior = t.face_neighbours(&Multiindex::new(cell, vec![2i64, 2])).unwrap();
    assert_eq!(interior.len(), 4);
    let side = t.face_neighbours(&Multiindex::new(cell, vec![3i64, 1])).unwrap();
    assert_eq!(side.len(), 3);
}

#[test]
fn boundary_edges_have_one_cell() {
    let t = hypercube(&[4, 4]).unwrap();
    let cell = t.entity_set_by_codim(0, None).unwrap();
    let edge_y = t.entity_set_by_codim(1, Some("edge_y")).unwrap();
    assert_eq!(
        t.support(&Multiindex::new(edge_y, vec![0i64, 2])).unwrap(),
        vec![(Multiindex::new(cell, vec![0, 2]), 0)]
    );
    assert_eq!(
        t.support(&Multiindex::new(edge_y, vec![4i64, 2])).unwrap(),
        vec![(Multiindex::new(cell, vec![3, 2]), 1)]
    );
    assert_eq!(
        t.support(&Multiindex::new(edge_y, vec![2i64, 2])).unwrap().len(),
        2
    );
}

#[test]
fn corner_vertex_star() {
    let t = hypercube(&[4, 4]).unwrap();
    let v = t.vertex_set().unwrap();
    let star = t.star(&Multiindex::new(v, vec![0i64, 0])).unwrap();
    // the vertex, two edges, one cell
    assert_eq!(star.len(), 4);
    let inner = t.star(&Multiindex::new(v, vec![2i64, 2])).unwrap();
    assert_eq!(inner.len(), 1 + 4 + 4);
}

#[test]
fn out_of_domain_queries_fail() {
    let t = hypercube(&[4, 4]).unwrap();
    let cell = t.entity_set_by_codim(0, None).unwrap();
    match t.cone(&Multiindex::new(cell, vec![4i64, 0])) {
        Err(MeshStructureError::OutOfDomain { tag, .. }) => assert_eq!(tag.as_str(), "cell"),
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(
        t.cone(&Multiindex::new(cell, vec![0i64])),
        Err(MeshStructureError::ArityMismatch { expected: 2, found: 1 })
    ));
}

#[test]
fn unrelated_classes_report_no_relation() {
    let t = hypercube(&[2, 2]).unwrap();
    let edge_x = t.entity_set_by_codim(1, Some("edge_x")).unwrap();
    let edge_y = t.entity_set_by_codim(1, Some("edge_y")).unwrap();
    assert!(matches!(
        t.index_relation(&Multiindex::new(edge_x, vec![0i64, 0]), edge_y),
        Err(MeshStructureError::NoRelation { .. })
    ));
    assert!(matches!(
        t.entity_set_by_codim(1, None),
        Err(MeshStructureError::AmbiguousTag { count: 2, .. })
    ));
    assert!(matches!(
        t.entity_set_by_codim(1, Some("face")),
        Err(MeshStructureError::NoSuchEntitySet { codimension: 1, .. })
    ));
}

#[test]
fn kuhn_cells_neighbour_the_opposite_class() {
    let t = kuhn_triangle(3).unwrap();
    let low = t.entity_set_by_codim(0, Some("cell_low")).unwrap();
    let high = t.entity_set_by_codim(0, Some("cell_high")).unwrap();
    let mut total = 0;
    for (class, other) in [(low, high), (high, low)] {
        for p in t.entity_set(class).unwrap().polyhedral_set().points() {
            let neighbours = t.face_neighbours(&Multiindex::new(class, p)).unwrap();
            assert!(neighbours.iter().all(|m| m.entity_set() == other));
            if class == high {
                assert_eq!(neighbours.len(), 3);
            }
            total += neighbours.len();
        }
    }
    // two sides of each of the 9 interior edges
    assert_eq!(total, 18);
    assert_eq!(
        t.face_neighbours(&Multiindex::new(low, vec![0i64, 0])).unwrap(),
        vec![Multiindex::new(high, vec![0, 0])]
    );
    assert_eq!(
        t.face_neighbours(&Multiindex::new(low, vec![1i64, 1])).unwrap().len(),
        2
    );
}
