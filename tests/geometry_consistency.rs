use approx::assert_relative_eq;
use mesh_structure::algs::extrude::extrude;
use mesh_structure::geometry::Geometry;
use mesh_structure::topology::refine::{hypercube, kuhn_triangle};
use mesh_structure::topology::{CellType, Multiindex, reference_cell};
use std::sync::Arc;

fn assert_close(a: &[f64], b: &[f64]) {
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b) {
        assert_relative_eq!(x, y, epsilon = 1e-12);
    }
}

#[test]
fn refined_quad_cell_center() {
    let t = Arc::new(hypercube(&[4, 4]).unwrap());
    // unit square, corners in Q1 vertex order (last axis fastest)
    let corners = vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]];
    let g = Geometry::new(t.clone(), 2, corners).unwrap();
    let cell = t.entity_set_by_codim(0, None).unwrap();
    let mi = Multiindex::new(cell, vec![2i64, 1]);
    let direct = g.spatial_coordinate(&mi, &[0.5, 0.5]).unwrap();
    let interpolated = g.spatial_coordinate_from_dofs(&mi, &[0.5, 0.5]).unwrap();
    assert_close(&direct, &[0.625, 0.375]);
    assert_close(&direct, &interpolated);
    let jacobian = g.jacobian(&mi, &[0.5, 0.5]).unwrap();
    assert_close(&jacobian, &[0.25, 0.0, 0.0, 0.25]);
    assert_close(&jacobian, &g.jacobian_from_dofs(&mi, &[0.5, 0.5]).unwrap());
}

#[test]
fn counterclockwise_corner_list_twists_the_quad() {
    // (0,0), (1,0), (1,1), (0,1) read in vertex order puts (1,0) at
    // reference vertex (0,1): a bilinear bow-tie
    let t = Arc::new(hypercube(&[4, 4]).unwrap());
    let corners = vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![1.0, 1.0], vec![0.0, 1.0]];
    let g = Geometry::new(t.clone(), 2, corners).unwrap();
    let cell = t.entity_set_by_codim(0, None).unwrap();
    let mi = Multiindex::new(cell, vec![2i64, 1]);
    let direct = g.spatial_coordinate(&mi, &[0.5, 0.5]).unwrap();
    assert_close(&direct, &[0.53125, 0.625]);
    assert_close(&direct, &g.spatial_coordinate_from_dofs(&mi, &[0.5, 0.5]).unwrap());
}

#[test]
fn both_paths_agree_on_every_kuhn_cell() {
    let t = Arc::new(kuhn_triangle(3).unwrap());
    let g = Geometry::new(
        t.clone(),
        3,
        vec![vec![0.0, 0.0, 1.0], vec![2.0, 0.5, 0.0], vec![0.5, 1.5, 2.0]],
    )
    .unwrap();
    let qps = [[0.2, 0.3], [1.0 / 3.0, 1.0 / 3.0], [0.0, 1.0]];
    for cell in t.entity_sets(0, None) {
        for p in t.entity_set(cell).unwrap().polyhedral_set().points() {
            let mi = Multiindex::new(cell, p);
            for qp in &qps {
                assert_close(
                    &g.spatial_coordinate(&mi, qp).unwrap(),
                    &g.spatial_coordinate_from_dofs(&mi, qp).unwrap(),
                );
                assert_close(
                    &g.jacobian(&mi, qp).unwrap(),
                    &g.jacobian_from_dofs(&mi, qp).unwrap(),
                );
            }
        }
    }
}

#[test]
fn kuhn_jacobians_share_a_sign() {
    let t = Arc::new(kuhn_triangle(3).unwrap());
    let g = Geometry::new(
        t.clone(),
        2,
        vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]],
    )
    .unwrap();
    let mut signs = Vec::new();
    for cell in t.entity_sets(0, None) {
        for p in t.entity_set(cell).unwrap().polyhedral_set().points() {
            let j = g.jacobian(&Multiindex::new(cell, p), &[0.25, 0.25]).unwrap();
            let det = j[0] * j[3] - j[1] * j[2];
            assert!(det.abs() > 1e-12);
            signs.push(det > 0.0);
        }
    }
    assert!(signs.iter().all(|&s| s == signs[0]));
}

#[test]
fn extruded_prism_geometry() {
    let column = Arc::new(extrude(Arc::new(reference_cell(CellType::Triangle).unwrap()), 2).unwrap());
    assert_eq!(column.macro_cell(), CellType::Prism);
    // unit prism: bottom triangle at z = 0, top at z = 1, vertical axis fastest
    let corners = vec![
        vec![0.0, 0.0, 0.0],
        vec![0.0, 0.0, 1.0],
        vec![1.0, 0.0, 0.0],
        vec![1.0, 0.0, 1.0],
        vec![0.0, 1.0, 0.0],
        vec![0.0, 1.0, 1.0],
    ];
    let g = Geometry::new(column.clone(), 3, corners).unwrap();
    let cell = column.entity_set_by_codim(0, None).unwrap();
    let mi = Multiindex::new(cell, vec![1i64]);
    let dofs = g.geometry_dofs(&mi).unwrap();
    assert_eq!(dofs.len(), 6);
    assert_close(&dofs[0], &[0.0, 0.0, 0.5]);
    assert_close(&dofs[5], &[0.0, 1.0, 1.0]);
    let x = g.spatial_coordinate(&mi, &[0.25, 0.25, 0.5]).unwrap();
    assert_close(&x, &[0.25, 0.25, 0.75]);
    assert_close(&x, &g.spatial_coordinate_from_dofs(&mi, &[0.25, 0.25, 0.5]).unwrap());
}
