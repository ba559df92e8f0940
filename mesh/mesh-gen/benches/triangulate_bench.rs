//! Benchmarks for advancing-front mesh generation.
//!
//! Run with: cargo bench -p mesh-gen
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p mesh-gen -- --save-baseline main
//! 2. After changes: cargo bench -p mesh-gen -- --baseline main

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use geom2d::Point2;
use mesh_gen::{Domain, Mesher, MesherParams, QuadLayerOptions};

fn unit_square_domain(rho: f64) -> Domain {
    let mut domain = Domain::new(move |_: &Point2<f64>| rho);
    domain
        .add_exterior(
            &[
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(0.0, 1.0),
            ],
            1,
        )
        .unwrap();
    domain
}

fn bench_triangulate(c: &mut Criterion) {
    let mut group = c.benchmark_group("triangulate_unit_square");
    for rho in [0.2, 0.1, 0.05] {
        group.bench_with_input(BenchmarkId::from_parameter(rho), &rho, |b, &rho| {
            b.iter(|| {
                let domain = unit_square_domain(rho);
                let mut mesher = Mesher::new(&domain, MesherParams::default()).unwrap();
                mesher.triangulate().unwrap();
                black_box(mesher.into_mesh().triangle_count())
            });
        });
    }
    group.finish();
}

fn bench_quad_layers(c: &mut Criterion) {
    c.bench_function("quad_layers_channel", |b| {
        b.iter(|| {
            let mut domain = Domain::new(|_: &Point2<f64>| 0.2);
            domain
                .add_exterior(
                    &[
                        Point2::new(0.0, 0.0),
                        Point2::new(4.0, 0.0),
                        Point2::new(4.0, 1.0),
                        Point2::new(0.0, 1.0),
                    ],
                    1,
                )
                .unwrap();
            let mut mesher = Mesher::new(&domain, MesherParams::default()).unwrap();
            mesher
                .quad_layers(&QuadLayerOptions {
                    start: Point2::new(0.0, 0.0),
                    end: Point2::new(4.0, 0.0),
                    first_height: 0.05,
                    growth_rate: 1.3,
                    n_layers: 3,
                })
                .unwrap();
            mesher.triangulate().unwrap();
            black_box(mesher.into_mesh().quad_count())
        });
    });
}

criterion_group!(benches, bench_triangulate, bench_quad_layers);
criterion_main!(benches);
