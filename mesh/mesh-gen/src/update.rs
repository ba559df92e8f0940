//! The front-update primitive: growing one element off a base edge.

use geom2d::{orient2d, segments_cross, triangle_quality, Point2};
use mesh_store::{EdgeId, Mesh2d, TriangleId, VertexId};

use crate::domain::Domain;
use crate::front::Front;

/// Candidate triangles must enclose at least this fraction of the squared
/// local size. Keeps slivers out and stops the driver from eating domains
/// thinner than the size function can resolve.
const AREA_TOL_FACTOR: f64 = 1e-3;

/// Quality difference below which two candidates count as tied (and the one
/// closer to the ideal apex wins).
const QUALITY_TIE: f64 = 1e-12;

/// Mutable view tying the mesh, the front and the domain together for one
/// generation pass.
pub(crate) struct FrontUpdate<'a> {
    pub mesh: &'a mut Mesh2d,
    pub front: &'a mut Front,
    pub domain: &'a Domain,
}

impl FrontUpdate<'_> {
    /// Tries to grow a triangle from `base` toward the ideal apex position
    /// `target`.
    ///
    /// Existing front vertices within `radius` of `target` are tried in
    /// ascending distance, with "create a new vertex at `target`" as the
    /// final candidate. Every candidate is validated (counter-clockwise
    /// with positive area above the size-scaled tolerance, no front
    /// crossings, no duplicate edges, no swallowed front vertex); the
    /// best-quality valid candidate wins, ties broken by proximity to
    /// `target`. On success the triangle is committed and the front
    /// advanced; on failure the front is left untouched and `None` is
    /// returned.
    pub fn update_front(
        &mut self,
        base: EdgeId,
        target: Point2<f64>,
        radius: f64,
    ) -> Option<TriangleId> {
        let (b1, b2, midpoint) = {
            let b = self.front.edge(base)?;
            (b.v1(), b.v2(), b.midpoint())
        };
        let p1 = self.mesh.vertices().position(b1);
        let p2 = self.mesh.vertices().position(b2);
        let rho = self.domain.size_at(&midpoint);

        // (quality, distance to target, existing vertex or new)
        let mut best: Option<(f64, f64, Option<VertexId>)> = None;
        let mut consider = |quality: f64, dist: f64, vid: Option<VertexId>| {
            let better = match best {
                None => true,
                Some((bq, bd, _)) => {
                    quality > bq + QUALITY_TIE || ((quality - bq).abs() <= QUALITY_TIE && dist < bd)
                }
            };
            if better {
                best = Some((quality, dist, vid));
            }
        };

        for (vid, dist) in self.mesh.vertices().within(&target, radius) {
            if vid == b1 || vid == b2 {
                continue;
            }
            let Some(v) = self.mesh.vertices().get(vid) else {
                continue;
            };
            if !v.on_front() {
                continue;
            }
            let apex = v.position();
            if self.candidate_valid(base, b1, b2, &p1, &p2, &apex, Some(vid), rho) {
                consider(triangle_quality(&p1, &p2, &apex, rho), dist, Some(vid));
            }
        }
        if self.candidate_valid(base, b1, b2, &p1, &p2, &target, None, rho) {
            consider(triangle_quality(&p1, &p2, &target, rho), 0.0, None);
        }

        let (_, _, choice) = best?;
        let apex = match choice {
            Some(vid) => vid,
            None => self.mesh.add_vertex(target),
        };
        let tri = self.mesh.add_triangle(b1, b2, apex);
        self.advance_front(base, apex);
        Some(tri)
    }

    /// Commits a triangle over `base` with apex `apex`: the base leaves the
    /// front, and each of the two new sides either consumes the matching
    /// opposite front edge or becomes a new front edge.
    ///
    /// Consumed unmarked front edges surface as interior mesh edges; marked
    /// ones already exist in the boundary list.
    pub fn advance_front(&mut self, base: EdgeId, apex: VertexId) {
        let Some((b1, b2)) = self.front.edge(base).map(|e| (e.v1(), e.v2())) else {
            return;
        };
        // Side (b1 -> apex)
        if let Some(e1) = self.front.get_edge_directed(apex, b1) {
            self.consume_front_edge(e1);
        } else {
            self.front
                .insert_edge_before(self.mesh.vertices_mut(), base, b1, apex, None);
        }
        // Side (apex -> b2)
        if let Some(e2) = self.front.get_edge_directed(b2, apex) {
            self.consume_front_edge(e2);
        } else {
            self.front
                .insert_edge_before(self.mesh.vertices_mut(), base, apex, b2, None);
        }
        self.consume_front_edge(base);
    }

    /// Validates directly-built triangles; when any of them is invalid, all
    /// of them (and the optional freshly created vertex) are detached
    /// again.
    ///
    /// Returns `true` when the rollback happened.
    pub fn remove_if_invalid(
        &mut self,
        new_vertex: Option<VertexId>,
        tris: &[TriangleId],
    ) -> bool {
        let all_valid = tris.iter().all(|&tid| {
            self.mesh
                .triangle(tid)
                .map(mesh_store::Triangle::vertices)
                .is_some_and(|[a, b, c]| self.triangle_is_valid(a, b, c))
        });
        if all_valid {
            return false;
        }
        for &tid in tris {
            self.mesh.remove_triangle(tid);
        }
        if let Some(v) = new_vertex {
            self.mesh.remove_vertex(v);
        }
        true
    }

    fn consume_front_edge(&mut self, id: EdgeId) {
        if let Some(edge) = self.front.remove_edge(self.mesh.vertices_mut(), id) {
            if edge.marker().is_none() {
                self.mesh.add_interior_edge(edge.v1(), edge.v2());
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn candidate_valid(
        &self,
        base: EdgeId,
        b1: VertexId,
        b2: VertexId,
        p1: &Point2<f64>,
        p2: &Point2<f64>,
        apex: &Point2<f64>,
        apex_vid: Option<VertexId>,
        rho: f64,
    ) -> bool {
        // Counter-clockwise with area above the size-scaled tolerance
        if orient2d(p1, p2, apex) <= AREA_TOL_FACTOR * rho * rho {
            return false;
        }

        // Reusing a vertex must not duplicate committed edges, and may only
        // coincide with front edges of the opposite direction (which the
        // advance then consumes)
        if let Some(vid) = apex_vid {
            if self.front.get_edge_directed(b1, vid).is_some() {
                return false;
            }
            if self.front.get_edge_directed(vid, b1).is_none() && self.mesh_has_edge(b1, vid) {
                return false;
            }
            if self.front.get_edge_directed(vid, b2).is_some() {
                return false;
            }
            if self.front.get_edge_directed(b2, vid).is_none() && self.mesh_has_edge(vid, b2) {
                return false;
            }
        }

        // Neither new side may cross a front edge other than the base
        let sides = [(*p1, *apex, b1), (*apex, *p2, b2)];
        for (id, f) in self.front.edges().iter() {
            if id == base {
                continue;
            }
            let q1 = self.mesh.vertices().position(f.v1());
            let q2 = self.mesh.vertices().position(f.v2());
            for (sp, sq, sv) in sides {
                // The opposite-direction edge this side closes onto
                if apex_vid.is_some_and(|av| f.has_vertex(av) && f.has_vertex(sv)) {
                    continue;
                }
                if segments_cross(&sp, &sq, &q1, &q2) {
                    return false;
                }
            }
        }

        // No front vertex may end up strictly inside the triangle
        !self.front_vertex_inside(p1, p2, apex, &[Some(b1), Some(b2), apex_vid], rho)
    }

    fn triangle_is_valid(&self, va: VertexId, vb: VertexId, vc: VertexId) -> bool {
        let a = self.mesh.vertices().position(va);
        let b = self.mesh.vertices().position(vb);
        let c = self.mesh.vertices().position(vc);
        let centroid = Point2::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0);
        let rho = self.domain.size_at(&centroid);

        if orient2d(&a, &b, &c) <= AREA_TOL_FACTOR * rho * rho {
            return false;
        }

        let sides = [(a, b, va, vb), (b, c, vb, vc), (c, a, vc, va)];
        for (_, f) in self.front.edges().iter() {
            let q1 = self.mesh.vertices().position(f.v1());
            let q2 = self.mesh.vertices().position(f.v2());
            for (sp, sq, sv1, sv2) in sides {
                if f.has_vertex(sv1) && f.has_vertex(sv2) {
                    continue;
                }
                if segments_cross(&sp, &sq, &q1, &q2) {
                    return false;
                }
            }
        }

        !self.front_vertex_inside(&a, &b, &c, &[Some(va), Some(vb), Some(vc)], rho)
    }

    /// Checks whether any on-front vertex other than the listed corners
    /// lies strictly inside the triangle `(a, b, c)`.
    fn front_vertex_inside(
        &self,
        a: &Point2<f64>,
        b: &Point2<f64>,
        c: &Point2<f64>,
        corners: &[Option<VertexId>; 3],
        rho: f64,
    ) -> bool {
        let centroid = Point2::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0);
        let r = (a - centroid)
            .norm()
            .max((b - centroid).norm())
            .max((c - centroid).norm());
        let tol = 1e-12 * rho * rho;
        for (vid, _) in self.mesh.vertices().within(&centroid, r) {
            if corners.contains(&Some(vid)) {
                continue;
            }
            let Some(v) = self.mesh.vertices().get(vid) else {
                continue;
            };
            if !v.on_front() {
                continue;
            }
            let q = v.position();
            if orient2d(a, b, &q) > tol && orient2d(b, c, &q) > tol && orient2d(c, a, &q) > tol {
                return true;
            }
        }
        false
    }

    fn mesh_has_edge(&self, a: VertexId, b: VertexId) -> bool {
        self.mesh.interior_edges().get_edge(a, b).is_some()
            || self.mesh.boundary_edges().get_edge(a, b).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FrontSeeds;

    fn square_setup(rho: f64) -> (Domain, Mesh2d, Front) {
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
        let mut mesh = Mesh2d::new(0.5);
        let mut front = Front::new();
        front
            .init(&domain, &FrontSeeds::from_domain(&domain), mesh.vertices_mut())
            .unwrap();
        (domain, mesh, front)
    }

    fn bottom_edge(front: &Front) -> EdgeId {
        front
            .edges()
            .iter()
            .find(|(_, e)| {
                let m = e.midpoint();
                (m.y).abs() < 1e-9 && (m.x - 0.5).abs() < 1e-9
            })
            .map(|(id, _)| id)
            .unwrap()
    }

    #[test]
    fn corner_reuse_closes_onto_existing_edges() {
        let (domain, mut mesh, mut front) = square_setup(10.0);
        let base = bottom_edge(&front);
        let mut update = FrontUpdate {
            mesh: &mut mesh,
            front: &mut front,
            domain: &domain,
        };

        // Aim exactly at the corner (1, 1): the existing corner vertex wins
        // over a duplicate vertex at the same spot
        let tri = update.update_front(base, Point2::new(1.0, 1.0), 0.3);
        assert!(tri.is_some());

        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(front.len(), 3);
        // Both consumed edges carried markers, so no interior edge yet
        assert_eq!(mesh.interior_edges().len(), 0);
        // The new diagonal is an unmarked front edge
        let diag: Vec<_> = front
            .edges()
            .iter()
            .filter(|(_, e)| e.marker().is_none())
            .collect();
        assert_eq!(diag.len(), 1);
    }

    #[test]
    fn closing_the_last_triangle_empties_the_front() {
        let (domain, mut mesh, mut front) = square_setup(10.0);
        let base = bottom_edge(&front);
        let mut update = FrontUpdate {
            mesh: &mut mesh,
            front: &mut front,
            domain: &domain,
        };
        update.update_front(base, Point2::new(1.0, 1.0), 0.3).unwrap();

        // Second triangle off the top edge, closing onto corner (0, 0)
        let top = update
            .front
            .edges()
            .iter()
            .find(|(_, e)| (e.midpoint().y - 1.0).abs() < 1e-9)
            .map(|(id, _)| id)
            .unwrap();
        update.update_front(top, Point2::new(0.0, 0.0), 0.3).unwrap();

        assert!(front.is_empty());
        assert_eq!(mesh.triangle_count(), 2);
        // The consumed diagonal surfaced as the single interior edge
        assert_eq!(mesh.interior_edges().len(), 1);
        assert!(mesh.vertices().iter().all(|(_, v)| !v.on_front()));
    }

    #[test]
    fn inverted_apex_is_rejected() {
        let (domain, mut mesh, mut front) = square_setup(1.0);
        let base = bottom_edge(&front);
        let mut update = FrontUpdate {
            mesh: &mut mesh,
            front: &mut front,
            domain: &domain,
        };
        // Below the base: clockwise triangle, outside the domain
        assert!(update
            .update_front(base, Point2::new(0.5, -1.0), 0.1)
            .is_none());
        assert_eq!(front.len(), 4);
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn sliver_apex_is_rejected_by_area_tolerance() {
        let (domain, mut mesh, mut front) = square_setup(1.0);
        let base = bottom_edge(&front);
        let mut update = FrontUpdate {
            mesh: &mut mesh,
            front: &mut front,
            domain: &domain,
        };
        // Barely above the base: positive but far below the rho²-scaled bound
        assert!(update
            .update_front(base, Point2::new(0.5, 1e-9), 0.1)
            .is_none());
        assert_eq!(front.len(), 4);
    }

    #[test]
    fn new_vertex_apex_grows_the_front() {
        let (domain, mut mesh, mut front) = square_setup(1.0);
        let base = bottom_edge(&front);
        let mut update = FrontUpdate {
            mesh: &mut mesh,
            front: &mut front,
            domain: &domain,
        };
        // Ideal apex for rho = 1: clear of all corners with a small radius
        let target = Point2::new(0.5, 3.0_f64.sqrt() / 2.0);
        let tri = update.update_front(base, target, 0.2).unwrap();

        let apex = mesh.triangle(tri).unwrap().v3();
        assert!((mesh.vertices().position(apex) - target).norm() < 1e-12);
        assert!(mesh.vertices().get(apex).unwrap().on_front());
        assert_eq!(mesh.vertex_count(), 5);
        assert_eq!(front.len(), 5);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn rollback_detaches_invalid_triangles() {
        let (domain, mut mesh, mut front) = square_setup(1.0);
        let _ = bottom_edge(&front);

        // An inverted triangle built by hand fails validation
        let corners: Vec<VertexId> = mesh.vertices().iter().map(|(id, _)| id).collect();
        let bad = mesh.add_triangle(corners[0], corners[2], corners[1]);
        let v_extra = mesh.add_vertex(Point2::new(0.5, 0.5));
        let mut update = FrontUpdate {
            mesh: &mut mesh,
            front: &mut front,
            domain: &domain,
        };
        assert!(update.remove_if_invalid(Some(v_extra), &[bad]));
        assert_eq!(mesh.triangle_count(), 0);
        assert!(!mesh.vertices().contains(v_extra));
    }
}
