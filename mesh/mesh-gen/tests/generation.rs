//! End-to-end generation scenarios.
//!
//! Each test drives the full pipeline (domain -> front -> elements) and
//! checks the structural invariants a conforming mesh must satisfy:
//!
//! - Euler characteristic: V - E + F = 1 for a simply connected region,
//!   0 for a region with one hole
//! - Every facet has positive signed area (counter-clockwise winding)
//! - Every boundary edge borders exactly one facet, every interior edge
//!   exactly two (no hanging nodes)

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::f64::consts::TAU;

use geom2d::Point2;
use mesh_gen::{
    Domain, Mesher, MesherParams, MeshingError, QuadLayerOptions, VertexId,
};
use mesh_store::Mesh2d;

fn side_key(a: VertexId, b: VertexId) -> (VertexId, VertexId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Facet-side incidence of every edge in the mesh.
fn side_counts(mesh: &Mesh2d) -> HashMap<(VertexId, VertexId), usize> {
    let mut counts: HashMap<(VertexId, VertexId), usize> = HashMap::new();
    for (_, tri) in mesh.triangles() {
        for (a, b) in tri.sides() {
            *counts.entry(side_key(a, b)).or_default() += 1;
        }
    }
    for (_, quad) in mesh.quads() {
        for (a, b) in quad.sides() {
            *counts.entry(side_key(a, b)).or_default() += 1;
        }
    }
    counts
}

/// Checks facet winding and the edge-facet incidence invariants.
fn assert_conforming(mesh: &Mesh2d) {
    for (_, tri) in mesh.triangles() {
        assert!(tri.area(mesh.vertices()) > 0.0, "inverted triangle");
    }
    for (_, quad) in mesh.quads() {
        assert!(quad.area(mesh.vertices()) > 0.0, "inverted quad");
    }

    let counts = side_counts(mesh);
    for (_, e) in mesh.boundary_edges().iter() {
        assert_eq!(
            counts.get(&side_key(e.v1(), e.v2())),
            Some(&1),
            "boundary edge must border exactly one facet"
        );
    }
    for (_, e) in mesh.interior_edges().iter() {
        assert_eq!(
            counts.get(&side_key(e.v1(), e.v2())),
            Some(&2),
            "interior edge must border exactly two facets"
        );
    }
    assert_eq!(
        counts.len(),
        mesh.boundary_edges().len() + mesh.interior_edges().len(),
        "every facet side must be a boundary or interior edge"
    );
}

#[allow(clippy::cast_possible_wrap)]
fn euler_characteristic(mesh: &Mesh2d) -> i64 {
    let v = mesh.vertex_count() as i64;
    let e = (mesh.boundary_edges().len() + mesh.interior_edges().len()) as i64;
    let f = mesh.facet_count() as i64;
    v - e + f
}

fn square(size: f64) -> [Point2<f64>; 4] {
    [
        Point2::new(0.0, 0.0),
        Point2::new(size, 0.0),
        Point2::new(size, size),
        Point2::new(0.0, size),
    ]
}

#[test]
fn unit_square_constant_size() {
    let mut domain = Domain::new(|_: &Point2<f64>| 0.25);
    domain.add_exterior(&square(1.0), 1).unwrap();

    let mut mesher = Mesher::new(&domain, MesherParams::default()).unwrap();

    // Front after initialization: 16 edges of length 0.25 (within 2 %)
    assert_eq!(mesher.front().len(), 16);
    for (_, e) in mesher.front().edges().iter() {
        assert!((e.length() - 0.25).abs() <= 0.25 * 0.02);
    }

    mesher.triangulate().unwrap();
    assert!(mesher.front().is_empty());

    let mesh = mesher.into_mesh();
    assert_eq!(mesh.quad_count(), 0);
    assert!(mesh.triangle_count() > 0);
    assert!(mesh.vertex_count() >= 25, "got {}", mesh.vertex_count());
    assert_eq!(euler_characteristic(&mesh), 1);
    assert_conforming(&mesh);
}

#[test]
fn unit_square_graded_size() {
    let mut domain = Domain::new(|p: &Point2<f64>| 0.05 + 0.2 * p.x);
    domain.add_exterior(&square(1.0), 1).unwrap();

    let mut mesher = Mesher::new(&domain, MesherParams::default()).unwrap();
    mesher.triangulate().unwrap();
    assert!(mesher.front().is_empty());

    let mesh = mesher.into_mesh();
    assert_eq!(euler_characteristic(&mesh), 1);
    assert_conforming(&mesh);

    // The mesh grades from fine near x = 0 to coarse near x = 1
    let mut min_near_zero = f64::MAX;
    let mut max_near_one = 0.0_f64;
    for (_, tri) in mesh.triangles() {
        let centroid = tri.centroid(mesh.vertices());
        let [a, b, c] = tri.vertices().map(|v| mesh.vertices().position(v));
        for (p, q) in [(a, b), (b, c), (c, a)] {
            let len = (q - p).norm();
            if centroid.x < 0.15 {
                min_near_zero = min_near_zero.min(len);
            }
            if centroid.x > 0.85 {
                max_near_one = max_near_one.max(len);
            }
        }
    }
    assert!(min_near_zero < 0.1, "finest edge near x=0: {min_near_zero}");
    assert!(max_near_one > 0.2, "coarsest edge near x=1: {max_near_one}");
}

#[test]
fn square_with_circular_hole() {
    let mut domain = Domain::new(|_: &Point2<f64>| 0.5);
    domain.add_exterior(&square(4.0), 1).unwrap();

    // Clockwise 16-gon hole of radius 1 at the center
    let hole: Vec<Point2<f64>> = (0..16)
        .map(|i| {
            let theta = -TAU * f64::from(i) / 16.0;
            Point2::new(2.0 + theta.cos(), 2.0 + theta.sin())
        })
        .collect();
    domain.add_hole(&hole, 2).unwrap();

    let mut mesher = Mesher::new(&domain, MesherParams::default()).unwrap();
    mesher.triangulate().unwrap();
    assert!(mesher.front().is_empty());

    let mesh = mesher.into_mesh();
    assert_eq!(mesh.quad_count(), 0);
    // Two boundary loops: Euler characteristic drops to 0
    assert_eq!(euler_characteristic(&mesh), 0);
    assert_conforming(&mesh);
}

#[test]
fn channel_with_inlet_quad_layers() {
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

    // 20 bases along the bottom, one quad each, three layers
    assert_eq!(mesher.mesh().quad_count(), 60);

    mesher.triangulate().unwrap();
    assert!(mesher.front().is_empty());

    let mesh = mesher.into_mesh();
    assert!(mesh.triangle_count() > 0);
    assert_eq!(euler_characteristic(&mesh), 1);
    assert_conforming(&mesh);

    // Layer interfaces sit at the accumulated heights 0.05, 0.115, 0.1995
    for expected_y in [0.05, 0.115, 0.1995] {
        let found = mesh.quads().any(|(_, q)| {
            q.vertices()
                .iter()
                .any(|&v| (mesh.vertices().position(v).y - expected_y).abs() < 1e-9)
        });
        assert!(found, "no quad vertex at layer height {expected_y}");
    }
    // All layer quads are flagged active
    assert!(mesh.quads().all(|(_, q)| q.is_active()));
}

#[test]
fn closed_quad_layers_around_hole() {
    let mut domain = Domain::new(|_: &Point2<f64>| 0.4);
    domain.add_exterior(&square(4.0), 1).unwrap();

    // Clockwise 24-gon hole of radius 0.5 at the center
    let n_hole = 24;
    let hole: Vec<Point2<f64>> = (0..n_hole)
        .map(|i| {
            let theta = -TAU * f64::from(i) / f64::from(n_hole);
            Point2::new(2.0 + 0.5 * theta.cos(), 2.0 + 0.5 * theta.sin())
        })
        .collect();
    domain.add_hole(&hole, 2).unwrap();

    let mut mesher = Mesher::new(&domain, MesherParams::default()).unwrap();
    let start = Point2::new(2.5, 2.0);
    mesher
        .quad_layers(&QuadLayerOptions {
            start,
            end: start,
            first_height: 0.05,
            growth_rate: 1.2,
            n_layers: 5,
        })
        .unwrap();

    // A closed layer produces one quad per hole edge, every layer
    assert_eq!(mesher.mesh().quad_count(), 5 * n_hole as usize);

    mesher.triangulate().unwrap();
    assert!(mesher.front().is_empty());

    let mesh = mesher.into_mesh();
    assert_eq!(euler_characteristic(&mesh), 0);
    assert_conforming(&mesh);
}

#[test]
fn undersized_domain_reports_no_progress() {
    // The whole domain is far smaller than one size-function cell; every
    // candidate triangle fails the size-scaled area tolerance
    let mut domain = Domain::new(|_: &Point2<f64>| 1.0);
    domain.add_exterior(&square(1e-3), 1).unwrap();

    let mut mesher = Mesher::new(&domain, MesherParams::default()).unwrap();
    let result = mesher.triangulate();
    assert!(matches!(result, Err(MeshingError::NoProgress { .. })));

    // The mesh still holds the initial front vertices, and nothing else
    assert_eq!(mesher.front().len(), 4);
    assert_eq!(mesher.mesh().vertex_count(), 4);
    assert_eq!(mesher.mesh().triangle_count(), 0);
    assert_eq!(mesher.mesh().quad_count(), 0);
}

#[test]
fn aborted_quad_layer_keeps_mesh_usable() {
    let mut domain = Domain::new(|_: &Point2<f64>| 0.25);
    domain.add_exterior(&square(1.0), 1).unwrap();

    let mut mesher = Mesher::new(&domain, MesherParams::default()).unwrap();
    // Zero layers is a configuration error, not an abort
    let bad = mesher.quad_layers(&QuadLayerOptions {
        start: Point2::new(0.0, 0.0),
        end: Point2::new(1.0, 0.0),
        first_height: 0.05,
        growth_rate: 1.2,
        n_layers: 0,
    });
    assert!(matches!(bad, Err(MeshingError::InvalidParameter { .. })));

    // The front is untouched and triangulation still succeeds
    mesher.triangulate().unwrap();
    let mesh = mesher.into_mesh();
    assert_eq!(euler_characteristic(&mesh), 1);
    assert_conforming(&mesh);
}
