//! The advancing front.

use geom2d::Point2;
use mesh_store::{Edge, EdgeId, EdgeList, VertexId, VertexStore, Winding};
use tracing::debug;

use crate::domain::{Domain, FrontSeeds};
use crate::error::{MeshingError, MeshingResult};

/// Hard cap on samples per refined edge, against runaway size functions.
const MAX_EDGE_SAMPLES: usize = 10_000;

/// The advancing front: the cyclic chains of directed edges separating the
/// meshed from the not-yet-meshed region, plus a rotating base cursor.
///
/// Walking any front edge `v1 -> v2`, the unmeshed region lies to the left.
/// The front maintains the `on_front` vertex flags: a vertex carries the
/// flag exactly while at least one front edge is incident to it.
#[derive(Debug)]
pub struct Front {
    list: EdgeList,
    base: Option<EdgeId>,
}

impl Default for Front {
    fn default() -> Self {
        Self::new()
    }
}

impl Front {
    /// Creates an empty front.
    #[must_use]
    pub fn new() -> Self {
        Self {
            list: EdgeList::new(Winding::None),
            base: None,
        }
    }

    /// The underlying edge list.
    #[must_use]
    pub const fn edges(&self) -> &EdgeList {
        &self.list
    }

    /// Number of front edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Whether the front is empty (the domain is fully meshed).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// The current base edge.
    #[must_use]
    pub const fn base(&self) -> Option<EdgeId> {
        self.base
    }

    /// Points the base cursor at a specific edge.
    pub fn set_base(&mut self, id: EdgeId) {
        debug_assert!(self.list.contains(id));
        self.base = Some(id);
    }

    /// Points the base cursor at the first edge in list order.
    pub fn set_base_first(&mut self) {
        self.base = self.list.first();
    }

    /// Advances the base cursor to the next edge in list order (cyclic).
    pub fn set_base_next(&mut self) {
        match self.base.and_then(|b| self.list.next_in_list(b)) {
            Some(next) => self.base = Some(next),
            None => self.set_base_first(),
        }
    }

    /// Sorts the front edges by ascending length and resets the base cursor
    /// to the shortest edge. Short edges tend to close easily, so this is
    /// the driver's recovery move on stagnation.
    pub fn sort_edges(&mut self) {
        self.list.sort_by_length(true);
        self.set_base_first();
    }

    /// Appends a front edge and flags its endpoints as on-front.
    ///
    /// # Panics
    ///
    /// Panics if a vertex handle is dead.
    pub fn add_edge(
        &mut self,
        verts: &mut VertexStore,
        v1: VertexId,
        v2: VertexId,
        marker: Option<i32>,
    ) -> EdgeId {
        let id = self.list.add_edge(verts, v1, v2, marker);
        self.flag_on_front(verts, v1, v2);
        id
    }

    /// Inserts a front edge before `pos` and flags its endpoints.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is not a front edge or a vertex handle is dead.
    pub fn insert_edge_before(
        &mut self,
        verts: &mut VertexStore,
        pos: EdgeId,
        v1: VertexId,
        v2: VertexId,
        marker: Option<i32>,
    ) -> EdgeId {
        let id = self.list.insert_edge(verts, pos, v1, v2, marker);
        self.flag_on_front(verts, v1, v2);
        id
    }

    /// Removes a front edge.
    ///
    /// Endpoints with no remaining incident front edge lose their on-front
    /// flag. A base cursor pointing at the removed edge advances to the
    /// edge's list successor.
    pub fn remove_edge(&mut self, verts: &mut VertexStore, id: EdgeId) -> Option<Edge> {
        if !self.list.contains(id) {
            return None;
        }
        if self.base == Some(id) {
            self.base = self.list.next_in_list(id).filter(|&next| next != id);
        }
        let edge = self.list.remove(id)?;
        for v in [edge.v1(), edge.v2()] {
            if self.list.incidence(v) == 0 {
                if let Some(vert) = verts.get_mut(v) {
                    vert.set_on_front(false);
                }
            }
        }
        Some(edge)
    }

    /// The edge behind `id`, if it is on the front.
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.list.get(id)
    }

    /// Whether `id` is a live front edge.
    #[must_use]
    pub fn contains(&self, id: EdgeId) -> bool {
        self.list.contains(id)
    }

    /// The unique front edge connecting `va` and `vb` in either direction.
    #[must_use]
    pub fn get_edge(&self, va: VertexId, vb: VertexId) -> Option<EdgeId> {
        self.list.get_edge(va, vb)
    }

    /// The front edge running exactly `va -> vb`.
    #[must_use]
    pub fn get_edge_directed(&self, va: VertexId, vb: VertexId) -> Option<EdgeId> {
        self.list.get_edge_directed(va, vb)
    }

    /// The first front edge leaving `v`.
    #[must_use]
    pub fn edge_from(&self, v: VertexId) -> Option<EdgeId> {
        self.list.edge_from(v)
    }

    /// The first front edge arriving at `v`.
    #[must_use]
    pub fn edge_to(&self, v: VertexId) -> Option<EdgeId> {
        self.list.edge_to(v)
    }

    /// Ring walk: the front edge continuing from this edge's end vertex.
    #[must_use]
    pub fn next_edge(&self, id: EdgeId) -> Option<EdgeId> {
        self.list.next_edge(id)
    }

    /// Ring walk: the front edge arriving at this edge's start vertex.
    #[must_use]
    pub fn prev_edge(&self, id: EdgeId) -> Option<EdgeId> {
        self.list.prev_edge(id)
    }

    /// Whether walking ring-order next edges from `a` reaches `b`.
    #[must_use]
    pub fn is_traversable(&self, a: EdgeId, b: EdgeId) -> bool {
        self.list.is_traversable(a, b)
    }

    /// The remaining unmeshed area enclosed by the front.
    #[must_use]
    pub fn area(&self, verts: &VertexStore) -> f64 {
        self.list.area(verts)
    }

    /// The front vertex (an edge start) closest to `xy`.
    #[must_use]
    pub fn nearest_vertex(&self, verts: &VertexStore, xy: &Point2<f64>) -> Option<VertexId> {
        let mut best: Option<(VertexId, f64)> = None;
        for (_, e) in self.list.iter() {
            let v = e.v1();
            let d_sqr = (verts.position(v) - xy).norm_squared();
            if best.map_or(true, |(_, bd)| d_sqr < bd) {
                best = Some((v, d_sqr));
            }
        }
        best.map(|(v, _)| v)
    }

    /// Initializes the front from raw boundary seeds.
    ///
    /// Per loop: one new fixed, on-boundary, on-front mesh vertex per seed
    /// edge (the `a` endpoint, or `b` for twin-seeded edges, whose
    /// direction is the neighbor's); front edges connecting successive
    /// vertices with the seed markers; twin handles recorded on the new
    /// edges. Finally every non-twin edge is refined against the size
    /// function.
    ///
    /// Returns the `(front edge, foreign twin)` pairs that were linked, so
    /// the embedding driver can restore the symmetric link on the
    /// neighboring mesh.
    ///
    /// # Errors
    ///
    /// Returns [`MeshingError::DegenerateLoop`] for a seed loop with fewer
    /// than three edges.
    pub fn init(
        &mut self,
        domain: &Domain,
        seeds: &FrontSeeds,
        verts: &mut VertexStore,
    ) -> MeshingResult<Vec<(EdgeId, EdgeId)>> {
        let mut twin_links = Vec::new();
        for (index, loop_edges) in seeds.loops.iter().enumerate() {
            if loop_edges.len() < 3 {
                return Err(MeshingError::DegenerateLoop {
                    index,
                    points: loop_edges.len(),
                });
            }
            let vids: Vec<VertexId> = loop_edges
                .iter()
                .map(|seed| {
                    let p = if seed.twin.is_some() { seed.b } else { seed.a };
                    let vid = verts.insert(p);
                    if let Some(v) = verts.get_mut(vid) {
                        v.set_on_boundary(true);
                        v.set_fixed(true);
                    }
                    vid
                })
                .collect();
            for (i, seed) in loop_edges.iter().enumerate() {
                let id = self.add_edge(
                    verts,
                    vids[i],
                    vids[(i + 1) % vids.len()],
                    Some(seed.marker),
                );
                if let Some(twin) = seed.twin {
                    if let Some(e) = self.list.get_mut(id) {
                        e.set_twin(Some(twin));
                    }
                    twin_links.push((id, twin));
                }
            }
        }
        self.refine(domain, verts);
        self.set_base_first();
        Ok(twin_links)
    }

    /// Splits a front edge at parameter `t` from `v1`.
    ///
    /// The new vertex is fixed, inherits the edge's boundary status, and
    /// both halves keep the marker. Returns the two halves in walk order,
    /// or `None` when `t` does not fall strictly inside the edge.
    pub fn split_edge(
        &mut self,
        verts: &mut VertexStore,
        id: EdgeId,
        t: f64,
    ) -> Option<(EdgeId, EdgeId)> {
        if !(t > 0.0 && t < 1.0) {
            return None;
        }
        let (v1, v2, marker) = {
            let e = self.list.get(id)?;
            (e.v1(), e.v2(), e.marker())
        };
        let p1 = verts.position(v1);
        let p2 = verts.position(v2);
        let vm = verts.insert(p1 + t * (p2 - p1));
        if let Some(v) = verts.get_mut(vm) {
            v.set_fixed(true);
            v.set_on_boundary(marker.is_some());
        }
        let e1 = self.insert_edge_before(verts, id, v1, vm, marker);
        let e2 = self.insert_edge_before(verts, id, vm, v2, marker);
        self.remove_edge(verts, id);
        Some((e1, e2))
    }

    fn flag_on_front(&self, verts: &mut VertexStore, v1: VertexId, v2: VertexId) {
        for v in [v1, v2] {
            if let Some(vert) = verts.get_mut(v) {
                vert.set_on_front(true);
            }
        }
    }

    /// Refines all non-twin front edges against the size function. Edges
    /// whose length is already at or below the local size are left intact.
    fn refine(&mut self, domain: &Domain, verts: &mut VertexStore) {
        let candidates: Vec<EdgeId> = self
            .list
            .iter()
            .filter(|(_, e)| e.twin().is_none())
            .map(|(id, _)| id)
            .collect();
        let mut refined = 0_usize;
        for id in candidates {
            if let Some(coords) = self.sub_vertex_coords(domain, verts, id) {
                self.replace_with_chain(verts, id, &coords);
                refined += 1;
            } else {
                debug!("front edge left unrefined (shorter than local size)");
            }
        }
        debug!(
            refined,
            front_edges = self.list.len(),
            "refined front against size function"
        );
    }

    /// Computes the sample coordinates subdividing one edge, walking a
    /// predictor/corrector step from the coarse end (larger local size)
    /// toward the fine end. Returns `None` when fewer than three samples
    /// fit, in which case the edge stays as it is.
    fn sub_vertex_coords(
        &self,
        domain: &Domain,
        verts: &VertexStore,
        id: EdgeId,
    ) -> Option<Vec<Point2<f64>>> {
        let e = self.list.get(id)?;
        let len = e.length();
        let p1 = verts.position(e.v1());
        let p2 = verts.position(e.v2());
        let rho1 = domain.size_at(&p1);
        let rho2 = domain.size_at(&p2);

        let from_v1 = rho1 >= rho2;
        let (a, b, rho_fine) = if from_v1 { (p1, p2, rho2) } else { (p2, p1, rho1) };
        let tangent = (b - a) / len;

        // No samples are placed within half a fine cell of the far end
        let s_end = 1.0 - 0.5 * rho_fine / len;

        let mut coords = vec![a];
        let mut xy = a;
        let mut s_last = 0.0_f64;
        loop {
            let rho = domain.size_at(&xy);
            let predictor = xy + rho * tangent;
            let rho_p = domain.size_at(&predictor);
            let corrected = xy + 0.5 * (rho + rho_p) * tangent;
            let s = (corrected - a).norm() / len;
            if s <= s_last || coords.len() > MAX_EDGE_SAMPLES {
                return None;
            }
            coords.push(corrected);
            s_last = s;
            xy = corrected;
            if s > s_end {
                break;
            }
        }
        if coords.len() < 3 {
            return None;
        }

        // The last sample overshot the stop bound; it becomes the far end
        let m = coords.len();
        coords[m - 1] = b;

        // Distribute the cropped distance among the interior samples,
        // weighted by their local size so denser samples stay closer
        let cropped = (1.0 - s_last) * len * tangent;
        let mut weights = vec![0.0_f64; m];
        let mut total = 0.0;
        for i in 1..m - 1 {
            weights[i] = domain.size_at(&coords[i]);
            total += weights[i];
        }
        if total > 0.0 {
            for i in 1..m - 1 {
                coords[i] += (weights[i] / total) * cropped;
            }
        }

        #[cfg(debug_assertions)]
        {
            let origin = coords[0];
            let mut s_prev = 0.0;
            for c in &coords[1..] {
                let s = (c - origin).norm();
                debug_assert!(s > s_prev, "refinement samples must be strictly ascending");
                s_prev = s;
            }
        }

        if !from_v1 {
            coords.reverse();
        }
        Some(coords)
    }

    /// Replaces an edge by the chain of sub-edges through `coords`. The new
    /// interior vertices are fixed and on-boundary.
    fn replace_with_chain(
        &mut self,
        verts: &mut VertexStore,
        id: EdgeId,
        coords: &[Point2<f64>],
    ) {
        let Some((v1, v2, marker)) = self
            .list
            .get(id)
            .map(|e| (e.v1(), e.v2(), e.marker()))
        else {
            return;
        };
        let mut cur = v1;
        for p in &coords[1..coords.len() - 1] {
            let vnew = verts.insert(*p);
            if let Some(v) = verts.get_mut(vnew) {
                v.set_on_boundary(true);
                v.set_fixed(true);
            }
            self.insert_edge_before(verts, id, cur, vnew, marker);
            cur = vnew;
        }
        self.insert_edge_before(verts, id, cur, v2, marker);
        self.remove_edge(verts, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SeedEdge;
    use approx::assert_relative_eq;

    fn unit_square_domain(size: impl Fn(&Point2<f64>) -> f64 + 'static) -> Domain {
        let mut domain = Domain::new(size);
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

    fn init_front(domain: &Domain) -> (Front, VertexStore) {
        let mut verts = VertexStore::new(0.1);
        let mut front = Front::new();
        front
            .init(domain, &FrontSeeds::from_domain(domain), &mut verts)
            .unwrap();
        (front, verts)
    }

    #[test]
    fn constant_size_refinement_counts() {
        let domain = unit_square_domain(|_| 0.25);
        let (front, verts) = init_front(&domain);

        // 4 sub-edges per unit side
        assert_eq!(front.len(), 16);
        for (_, e) in front.edges().iter() {
            assert!((e.length() - 0.25).abs() < 0.25 * 0.02);
            assert_eq!(e.marker(), Some(1));
        }
        assert_relative_eq!(front.area(&verts), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn refinement_round_trip_exact_divisors() {
        for rho in [0.25, 0.2, 0.125] {
            let domain = unit_square_domain(move |_| rho);
            let (front, _) = init_front(&domain);
            #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
            let per_side = (1.0 / rho).ceil() as usize;
            assert_eq!(front.len(), 4 * per_side);
            let expected = 1.0 / per_side as f64;
            for (_, e) in front.edges().iter() {
                assert!((e.length() - expected).abs() <= expected * 0.05);
            }
        }
    }

    #[test]
    fn init_flags_vertices() {
        let domain = unit_square_domain(|_| 0.25);
        let (_, verts) = init_front(&domain);
        assert_eq!(verts.len(), 16);
        for (_, v) in verts.iter() {
            assert!(v.on_front());
            assert!(v.on_boundary());
            assert!(v.is_fixed());
        }
    }

    #[test]
    fn oversized_cells_leave_edges_unrefined() {
        let domain = unit_square_domain(|_| 10.0);
        let (front, _) = init_front(&domain);
        assert_eq!(front.len(), 4);
    }

    #[test]
    fn graded_size_grades_edge_counts() {
        // Size grows from 0.05 at x=0 to 0.25 at x=1
        let domain = unit_square_domain(|p: &Point2<f64>| 0.05 + 0.2 * p.x);
        let (front, verts) = init_front(&domain);

        let count_between = |y: f64| {
            front
                .edges()
                .iter()
                .filter(|(_, e)| (e.midpoint().y - y).abs() < 1e-9)
                .map(|(_, e)| (e.length(), verts.position(e.v1()).x))
                .collect::<Vec<_>>()
        };

        // Bottom side y = 0: graded, roughly ln(5)/0.2 ≈ 8 edges
        let bottom = count_between(0.0);
        assert!((7..=10).contains(&bottom.len()), "got {}", bottom.len());
        let min_len = bottom.iter().map(|(l, _)| *l).fold(f64::MAX, f64::min);
        let max_len = bottom.iter().map(|(l, _)| *l).fold(0.0, f64::max);
        assert!(min_len < 0.1);
        assert!(max_len > 0.2);

        // Left side x = 0: constant fine size, 20 edges
        let left: Vec<_> = front
            .edges()
            .iter()
            .filter(|(_, e)| e.midpoint().x.abs() < 1e-9)
            .collect();
        assert!((18..=21).contains(&left.len()));
    }

    #[test]
    fn twin_edges_are_not_refined() {
        let domain = unit_square_domain(|_| 0.25);
        // Hand-built seeds: bottom edge is twin-linked (direction of the
        // neighbor, so the new vertex comes from `b`)
        let mut verts = VertexStore::new(0.1);
        let mut alien = EdgeList::new(Winding::None);
        let x = verts.insert(Point2::new(1.0, 0.0));
        let y = verts.insert(Point2::new(0.0, 0.0));
        let foreign = alien.add_edge(&verts, x, y, Some(1));

        let square = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        let mut seeds = FrontSeeds::default();
        seeds.loops.push(
            (0..4)
                .map(|i| SeedEdge {
                    a: square[i],
                    b: square[(i + 1) % 4],
                    marker: 1,
                    twin: (i == 0).then_some(foreign),
                })
                .collect(),
        );
        // Twin seed edges are handed over in the neighbor's direction
        seeds.loops[0][0] = SeedEdge {
            a: square[1],
            b: square[0],
            marker: 1,
            twin: Some(foreign),
        };

        let mut front = Front::new();
        let links = front.init(&domain, &seeds, &mut verts).unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].1, foreign);

        let (twin_front_edge, _) = links[0];
        let e = front.edge(twin_front_edge).unwrap();
        // Unrefined: still the full unit edge
        assert!((e.length() - 1.0).abs() < 1e-12);
        assert_eq!(e.twin(), Some(foreign));
        // The other three sides were refined to 0.25
        assert_eq!(front.len(), 1 + 3 * 4);
    }

    #[test]
    fn split_edge_preserves_marker_and_front() {
        let domain = unit_square_domain(|_| 10.0);
        let (mut front, mut verts) = init_front(&domain);
        let first = front.edges().first().unwrap();
        let n_before = front.len();

        let (e1, e2) = front.split_edge(&mut verts, first, 0.25).unwrap();
        assert_eq!(front.len(), n_before + 1);
        assert!(!front.contains(first));

        let h1 = front.edge(e1).unwrap();
        let h2 = front.edge(e2).unwrap();
        assert_eq!(h1.v2(), h2.v1());
        assert_eq!(h1.marker(), Some(1));
        assert!((h1.length() - 0.25).abs() < 1e-12);
        assert!((h2.length() - 0.75).abs() < 1e-12);

        let mid = verts.get(h1.v2()).unwrap();
        assert!(mid.is_fixed() && mid.on_boundary() && mid.on_front());

        // Degenerate parameters are rejected
        assert!(front.split_edge(&mut verts, e2, 0.0).is_none());
    }

    #[test]
    fn removal_clears_on_front_flags() {
        let domain = unit_square_domain(|_| 10.0);
        let (mut front, mut verts) = init_front(&domain);
        let first = front.edges().first().unwrap();
        let (v1, v2) = {
            let e = front.edge(first).unwrap();
            (e.v1(), e.v2())
        };
        front.remove_edge(&mut verts, first);
        // Both endpoints still touch the neighboring front edges
        assert!(verts.get(v1).unwrap().on_front());
        assert!(verts.get(v2).unwrap().on_front());

        // Strip the remaining edges: flags drop as vertices leave the front
        let rest: Vec<EdgeId> = front.edges().iter().map(|(id, _)| id).collect();
        for id in rest {
            front.remove_edge(&mut verts, id);
        }
        assert!(front.is_empty());
        assert!(verts.iter().all(|(_, v)| !v.on_front()));
    }

    #[test]
    fn base_cursor_rotation_and_sort() {
        let domain = unit_square_domain(|_| 10.0);
        let (mut front, mut verts) = init_front(&domain);
        let first = front.base().unwrap();
        front.set_base_next();
        assert_ne!(front.base(), Some(first));

        // Removing the base advances it to the list successor
        let base = front.base().unwrap();
        let successor = front.edges().next_in_list(base).unwrap();
        front.remove_edge(&mut verts, base);
        assert_eq!(front.base(), Some(successor));

        front.sort_edges();
        assert_eq!(front.base(), front.edges().first());
    }

    #[test]
    fn nearest_vertex_scans_edge_starts() {
        let domain = unit_square_domain(|_| 10.0);
        let (front, verts) = init_front(&domain);
        let v = front
            .nearest_vertex(&verts, &Point2::new(0.1, -0.2))
            .unwrap();
        assert!((verts.position(v) - Point2::new(0.0, 0.0)).norm() < 1e-12);
    }
}
