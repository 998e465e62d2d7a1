use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use mesh_structure::algs::extrude::extrude;
use mesh_structure::topology::refine::{hypercube, kuhn_triangle};
use mesh_structure::topology::{IndexExpr, Multiindex};
use std::sync::Arc;

fn bench_incidence(c: &mut Criterion) {
    let mut group = c.benchmark_group("incidence");

    for &n in &[8usize, 32] {
        let hex = hypercube(&[n, n, n]).expect("hexahedral refinement");
        let cell = hex.entity_set_by_codim(0, None).expect("cell class");
        let vertices = hex.vertex_set().expect("vertex class");
        let mid = (n / 2) as i64;
        let mi = Multiindex::new(cell, vec![mid, mid, mid]);

        group.bench_with_input(BenchmarkId::new("hex_cone", n), &n, |b, _| {
            b.iter(|| black_box(hex.cone(&mi).expect("cone")));
        });
        group.bench_with_input(BenchmarkId::new("hex_cell_vertices", n), &n, |b, _| {
            b.iter(|| black_box(hex.index_relation(&mi, vertices).expect("relation")));
        });
        let v = Multiindex::new(vertices, vec![mid, mid, mid]);
        group.bench_with_input(BenchmarkId::new("hex_vertex_cells", n), &n, |b, _| {
            b.iter(|| black_box(hex.index_relation(&v, cell).expect("relation")));
        });
    }

    let column = extrude(Arc::new(kuhn_triangle(16).expect("triangle")), 16).expect("column");
    let cell = column.entity_sets(0, None)[0];
    let vertices = column.vertex_set().expect("vertex class");
    let symbolic = Multiindex::<IndexExpr>::variables(cell, &["i", "j", "k"]);
    group.bench_function("column_symbolic_closure", |b| {
        b.iter(|| {
            black_box(
                column
                    .index_relation_guarded(&symbolic, vertices)
                    .expect("relation"),
            )
        });
    });
    group.bench_function("topology_build_hex_16", |b| {
        b.iter(|| black_box(hypercube(&[16, 16, 16]).expect("hexahedral refinement")));
    });

    group.finish();
}

criterion_group!(benches, bench_incidence);
criterion_main!(benches);
