use mesh_structure::topology::refine::kuhn_triangle;
use mesh_structure::topology::{Multiindex, Sign, simplex_orientation};

fn cell_orientations(n: usize) -> Vec<(String, Vec<i64>, Sign)> {
    let t = kuhn_triangle(n).unwrap();
    let mut out = Vec::new();
    for cell in t.entity_sets(0, None) {
        let set = t.entity_set(cell).unwrap();
        for p in set.polyhedral_set().points() {
            let vertices: Vec<Vec<i64>> = t
                .closure_vertices(&Multiindex::new(cell, p.clone()))
                .unwrap()
                .into_iter()
                .map(|m| m.into_index())
                .collect();
            let sign = simplex_orientation(&vertices).expect("non-degenerate cell");
            out.push((set.tag().to_string(), p, sign));
        }
    }
    out
}

#[test]
fn all_cells_share_one_orientation() {
    for n in [1usize, 3] {
        let signs = cell_orientations(n);
        assert_eq!(signs.len(), n * n);
        let first = signs[0].2;
        for (tag, p, s) in &signs {
            assert_eq!(*s, first, "n = {n}: `{tag}`{p:?} flips orientation");
        }
    }
}

#[test]
fn edges_point_from_lower_to_higher_vertex() {
    let t = kuhn_triangle(3).unwrap();
    for e in t.entity_sets(1, None) {
        for p in t.entity_set(e).unwrap().polyhedral_set().points() {
            let ends: Vec<Vec<i64>> = t
                .cone(&Multiindex::new(e, p))
                .unwrap()
                .into_iter()
                .map(|m| m.into_index())
                .collect();
            assert_eq!(ends.len(), 2);
            assert!(ends[0] < ends[1], "{ends:?}");
        }
    }
}

#[test]
fn every_edge_has_one_or_two_cells() {
    let t = kuhn_triangle(3).unwrap();
    let mut boundary = 0;
    for e in t.entity_sets(1, None) {
        for p in t.entity_set(e).unwrap().polyhedral_set().points() {
            match t.support(&Multiindex::new(e, p)).unwrap().len() {
                1 => boundary += 1,
                2 => {}
                k => panic!("edge in {k} cells"),
            }
        }
    }
    assert_eq!(boundary, 9);
}
