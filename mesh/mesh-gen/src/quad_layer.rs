//! Per-layer bookkeeping for quad layer generation.

use geom2d::{angle, is_left, Point2};
use mesh_store::{EdgeId, Mesh2d, VertexId, VertexStore};
use tracing::debug;

use crate::domain::Domain;
use crate::front::Front;
use crate::layering::LayerAbort;
use crate::params::MesherParams;

/// Transient state for one quad layer pass.
///
/// For each base edge `i` of the run, the layer records the base vertices
/// `b1[i]`, `b2[i]`, the projected target coordinates `p1_xy[i]`,
/// `p2_xy[i]`, the realized projected vertices `p1[i]`, `p2[i]` (filled in
/// as elements are built) and the per-edge height, capped by the base
/// length to keep aspect ratios in check.
#[derive(Debug)]
pub(crate) struct QuadLayer {
    pub bases: Vec<EdgeId>,
    pub b1: Vec<VertexId>,
    pub b2: Vec<VertexId>,
    pub p1: Vec<Option<VertexId>>,
    pub p2: Vec<Option<VertexId>>,
    pub p1_xy: Vec<Point2<f64>>,
    pub p2_xy: Vec<Point2<f64>>,
    pub heights: Vec<f64>,
    pub is_closed: bool,
    height_request: f64,
    e_start: EdgeId,
    e_end: EdgeId,
}

impl QuadLayer {
    /// Collects the base run by walking ring-order next edges from
    /// `e_start` to `e_end` inclusive, with initial projections
    /// `v + n̂ · h` off every base edge.
    pub fn build(
        front: &Front,
        verts: &VertexStore,
        e_start: EdgeId,
        e_end: EdgeId,
        is_closed: bool,
        height: f64,
    ) -> Result<Self, LayerAbort> {
        let mut layer = Self {
            bases: Vec::new(),
            b1: Vec::new(),
            b2: Vec::new(),
            p1: Vec::new(),
            p2: Vec::new(),
            p1_xy: Vec::new(),
            p2_xy: Vec::new(),
            heights: Vec::new(),
            is_closed,
            height_request: height,
            e_start,
            e_end,
        };
        let mut cur = e_start;
        loop {
            layer.push_base(front, verts, cur)?;
            if cur == e_end {
                break;
            }
            if layer.bases.len() > front.len() {
                return Err(LayerAbort("layer walk does not reach its end edge"));
            }
            cur = front
                .next_edge(cur)
                .ok_or(LayerAbort("front chain broken during layer walk"))?;
        }
        Ok(layer)
    }

    fn push_base(
        &mut self,
        front: &Front,
        verts: &VertexStore,
        id: EdgeId,
    ) -> Result<(), LayerAbort> {
        let e = front
            .edge(id)
            .ok_or(LayerAbort("layer base edge left the front"))?;
        let h = self.height_request.min(e.length());
        let offset = e.normal() * h;
        self.bases.push(id);
        self.b1.push(e.v1());
        self.b2.push(e.v2());
        self.p1.push(None);
        self.p2.push(None);
        self.p1_xy.push(verts.position(e.v1()) + offset);
        self.p2_xy.push(verts.position(e.v2()) + offset);
        self.heights.push(h);
        Ok(())
    }

    /// Number of base edges.
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    /// Smooths the per-edge heights: each interior entry is capped by the
    /// local size and pulled toward the three-point average of its
    /// neighborhood.
    pub fn smooth_heights(&mut self, domain: &Domain, front: &Front) {
        if self.len() < 3 {
            return;
        }
        for i in 1..self.len() - 1 {
            let Some(edge) = front.edge(self.bases[i]) else {
                continue;
            };
            let rho = domain.size_at(&edge.midpoint());
            let avg = (self.heights[i - 1] + self.heights[i] + self.heights[i + 1]) / 3.0;
            self.heights[i] = rho.min(avg);
        }
    }

    /// Reconciles the projected coordinates of every adjacent base pair and
    /// handles the run's endpoints.
    ///
    /// Open layers may split the front edges adjacent to the run; splitting
    /// keeps any boundary-list edges and their markers in sync.
    pub fn setup_projection(
        &mut self,
        mesh: &mut Mesh2d,
        front: &mut Front,
        params: &MesherParams,
    ) -> Result<(), LayerAbort> {
        for j in 1..self.len() {
            self.adjust_pair(mesh, front, j - 1, j, params);
        }
        if self.is_closed {
            if self.len() > 1 {
                self.adjust_pair(mesh, front, self.len() - 1, 0, params);
            }
        } else {
            self.place_start(mesh, front)?;
            self.place_end(mesh, front)?;
        }
        Ok(())
    }

    /// Merges the projections of the adjacent bases `i` and `j` into a
    /// shared coordinate at `q + n̂ · l̄ / sin(α/2)`, unless the corner
    /// turns away sharply enough that a wedge (closed later by a bridging
    /// triangle) gives better elements.
    fn adjust_pair(
        &mut self,
        mesh: &Mesh2d,
        front: &Front,
        i: usize,
        j: usize,
        params: &MesherParams,
    ) {
        let verts = mesh.vertices();
        let p = verts.position(self.b1[i]);
        let q = verts.position(self.b1[j]);
        let r = verts.position(self.b2[j]);

        let alpha = angle(&(p - q), &(r - q));
        if is_left(&p, &r, &q) && alpha <= params.quad_layer_angle {
            // Keep the wedge: both separate projections stand
            return;
        }

        let (Some(ei), Some(ej)) = (front.edge(self.bases[i]), front.edge(self.bases[j])) else {
            return;
        };
        let normal = 0.5 * (ei.normal() + ej.normal());
        let l = 0.5 * (self.heights[i] + self.heights[j]);
        let norm = normal.norm();
        let sin_half = (0.5 * alpha).sin();
        if norm <= f64::EPSILON || sin_half <= f64::EPSILON {
            // Hairpin corner: merging would shoot the projection to
            // infinity, keep the wedge instead
            return;
        }
        let shared = q + (normal / norm) * (l / sin_half);
        self.p2_xy[i] = shared;
        self.p1_xy[j] = shared;
    }

    /// Endpoint handling for the first base of an open layer.
    ///
    /// When the preceding front edge leans over the run, the first
    /// projection is snapped to its far vertex or onto a split point at
    /// height-distance along it, so the layer tucks cleanly against the
    /// adjacent boundary.
    fn place_start(&mut self, mesh: &mut Mesh2d, front: &mut Front) -> Result<(), LayerAbort> {
        let e_prv = front
            .prev_edge(self.e_start)
            .ok_or(LayerAbort("no front edge precedes an open layer"))?;
        let (prev_v1, prev_v2, prev_len) = {
            let e = front
                .edge(e_prv)
                .ok_or(LayerAbort("front chain broken at layer start"))?;
            (e.v1(), e.v2(), e.length())
        };
        if prev_v2 != self.b1[0] {
            return Err(LayerAbort("front is not a connected chain at layer start"));
        }
        let v_prev = prev_v1;
        let vp = mesh.vertices().position(v_prev);
        let vb1 = mesh.vertices().position(self.b1[0]);
        let vb2 = mesh.vertices().position(self.b2[0]);

        // Preceding vertex on the right: the default projection stands
        if !is_left(&vb1, &vb2, &vp) {
            return Ok(());
        }

        let h = self.heights[0];
        if (vp - self.p1_xy[0]).norm() < h {
            // Close enough to merge with the preceding vertex
            self.p1[0] = Some(v_prev);
            self.p1_xy[0] = vp;
            return Ok(());
        }

        if h < prev_len {
            // Split the preceding edge so the new vertex sits at
            // height-distance from the shared base vertex
            let alpha = angle(&(vp - vb1), &(self.p1_xy[0] - vb1));
            let t = 1.0 - (h * alpha.cos()) / prev_len;
            let v_new = split_with_boundary(mesh, front, e_prv, t)?;
            self.p1[0] = Some(v_new);
            self.p1_xy[0] = mesh.vertices().position(v_new);
        } else {
            self.p1[0] = Some(v_prev);
            self.p1_xy[0] = vp;
        }
        Ok(())
    }

    /// Endpoint handling for the last base of an open layer (mirror of
    /// [`QuadLayer::place_start`]).
    fn place_end(&mut self, mesh: &mut Mesh2d, front: &mut Front) -> Result<(), LayerAbort> {
        let e_nxt = front
            .next_edge(self.e_end)
            .ok_or(LayerAbort("no front edge follows an open layer"))?;
        let (next_v1, next_v2, next_len) = {
            let e = front
                .edge(e_nxt)
                .ok_or(LayerAbort("front chain broken at layer end"))?;
            (e.v1(), e.v2(), e.length())
        };
        let last = self.len() - 1;
        if next_v1 != self.b2[last] {
            return Err(LayerAbort("front is not a connected chain at layer end"));
        }
        let v_next = next_v2;
        let vn = mesh.vertices().position(v_next);
        let vb1 = mesh.vertices().position(self.b1[last]);
        let vb2 = mesh.vertices().position(self.b2[last]);

        if !is_left(&vb1, &vb2, &vn) {
            return Ok(());
        }

        let h = self.heights[last];
        if (vn - self.p2_xy[last]).norm() < h {
            self.p2[last] = Some(v_next);
            self.p2_xy[last] = vn;
            return Ok(());
        }

        if h < next_len {
            let alpha = angle(&(vn - vb2), &(self.p2_xy[last] - vb2));
            let t = (h * alpha.cos()) / next_len;
            let v_new = split_with_boundary(mesh, front, e_nxt, t)?;
            self.p2[last] = Some(v_new);
            self.p2_xy[last] = mesh.vertices().position(v_new);
        } else {
            self.p2[last] = Some(v_next);
            self.p2_xy[last] = vn;
        }
        Ok(())
    }
}

/// Splits a front edge at parameter `t`, mirroring the split into the
/// mesh's boundary edge list when the edge is also a boundary edge.
///
/// Returns the new split vertex.
fn split_with_boundary(
    mesh: &mut Mesh2d,
    front: &mut Front,
    edge: EdgeId,
    t: f64,
) -> Result<VertexId, LayerAbort> {
    let (v1, v2) = {
        let e = front
            .edge(edge)
            .ok_or(LayerAbort("split target left the front"))?;
        (e.v1(), e.v2())
    };

    // Take the matching boundary edge out first, remembering where it sat
    let bdry = mesh.boundary_edges().get_edge(v1, v2);
    let bdry_follow = bdry.and_then(|b| mesh.boundary_edges().next_edge(b));
    if let Some(b) = bdry {
        mesh.remove_boundary_edge(b);
    }

    let (fe1, fe2) = front
        .split_edge(mesh.vertices_mut(), edge, t)
        .ok_or(LayerAbort("degenerate split parameter"))?;

    let halves = {
        let e1 = front
            .edge(fe1)
            .ok_or(LayerAbort("front chain broken after split"))?;
        let e2 = front
            .edge(fe2)
            .ok_or(LayerAbort("front chain broken after split"))?;
        [
            (e1.v1(), e1.v2(), e1.marker()),
            (e2.v1(), e2.v2(), e2.marker()),
        ]
    };

    if bdry.is_some() {
        match bdry_follow {
            Some(pos) => {
                for (a, b, marker) in halves {
                    mesh.insert_boundary_edge(pos, a, b, marker);
                }
            }
            None => {
                for (a, b, marker) in halves {
                    mesh.add_boundary_edge(a, b, marker.unwrap_or_default());
                }
            }
        }
        debug!("split boundary edge under quad layer endpoint");
    }

    Ok(halves[0].1)
}
