//! Structured quad layers along a run of front edges.

use geom2d::{angle, Point2};
use mesh_store::{Mesh2d, TriangleId, VertexId};
use tracing::{debug, info, warn};

use crate::domain::Domain;
use crate::error::{MeshingError, MeshingResult};
use crate::front::Front;
use crate::params::{MesherParams, QuadLayerOptions};
use crate::quad_layer::QuadLayer;
use crate::update::FrontUpdate;

/// Internal per-layer failure with a human-readable reason; surfaced to the
/// caller as [`MeshingError::QuadLayerAborted`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct LayerAbort(pub &'static str);

/// Grows the requested quad layers, one at a time.
///
/// A failing layer aborts the run; layers built so far stay in the mesh and
/// the remaining front is left valid for triangulation.
pub(crate) fn generate_quad_layers(
    mesh: &mut Mesh2d,
    front: &mut Front,
    domain: &Domain,
    params: &MesherParams,
    opts: &QuadLayerOptions,
) -> MeshingResult<()> {
    opts.validate()?;
    let mut height = opts.first_height;
    let mut xy_start = opts.start;
    let mut xy_end = opts.end;
    for layer in 0..opts.n_layers {
        match generate_layer(
            mesh,
            front,
            domain,
            params,
            &mut xy_start,
            &mut xy_end,
            height,
        ) {
            Ok(quads) => {
                info!(layer, quads, height, "quad layer complete");
            }
            Err(abort) => {
                warn!(layer, reason = abort.0, "quad layer aborted");
                return Err(MeshingError::QuadLayerAborted { layer });
            }
        }
        height *= opts.growth_rate;
    }
    Ok(())
}

/// Builds a single layer of quads at the given height. Returns the number
/// of quads created.
#[allow(clippy::too_many_lines)]
fn generate_layer(
    mesh: &mut Mesh2d,
    front: &mut Front,
    domain: &Domain,
    params: &MesherParams,
    xy_start: &mut Point2<f64>,
    xy_end: &mut Point2<f64>,
    height: f64,
) -> Result<usize, LayerAbort> {
    // Locate the run of base edges between the vertices nearest to the
    // running start/end coordinates
    let v_start = front
        .nearest_vertex(mesh.vertices(), xy_start)
        .ok_or(LayerAbort("front is empty"))?;
    let v_end = front
        .nearest_vertex(mesh.vertices(), xy_end)
        .ok_or(LayerAbort("front is empty"))?;
    let mut e_start = front
        .edge_from(v_start)
        .ok_or(LayerAbort("no front edge leaves the start vertex"))?;
    let mut e_end = front
        .edge_to(v_end)
        .ok_or(LayerAbort("no front edge arrives at the end vertex"))?;
    if !front.is_traversable(e_start, e_end) {
        return Err(LayerAbort("front is not traversable from start to end"));
    }
    let is_closed = v_start == v_end;

    // Closed layers should not begin at a sharp corner; rotate the start
    // forward by one edge when the corner between the surrounding edges is
    // tight (the angle is measured at the end edge's apex only)
    if is_closed {
        let apex_angle = {
            let ee = front
                .edge(e_end)
                .ok_or(LayerAbort("front chain broken at layer seam"))?;
            let es = front
                .edge(e_start)
                .ok_or(LayerAbort("front chain broken at layer seam"))?;
            let v1 = mesh.vertices().position(ee.v1());
            let v2 = mesh.vertices().position(ee.v2());
            let v3 = mesh.vertices().position(es.v2());
            angle(&(v1 - v2), &(v3 - v2))
        };
        if let Some(e_next) = front.next_edge(e_start) {
            if apex_angle <= params.quad_layer_angle {
                e_end = e_start;
                e_start = e_next;
                debug!("rotated closed quad layer start off a sharp corner");
            }
        }
    }

    let mut layer = QuadLayer::build(front, mesh.vertices(), e_start, e_end, is_closed, height)?;
    layer.smooth_heights(domain, front);
    layer.setup_projection(mesh, front, params)?;

    let quads = create_layer_elements(mesh, front, domain, params, &mut layer);
    close_layer_gaps(mesh, front, domain, params, &mut layer);
    mesh.clear_waste();

    // Walk the realized projections for the next layer's start and end
    let n = layer.len();
    let mut next_pair: Option<(VertexId, VertexId)> = None;
    for i in 0..n {
        let Some(vs) = layer.p1[i] else { continue };
        let ve = if is_closed {
            vs
        } else {
            match layer.p2[(i + n - 1) % n] {
                Some(v) => v,
                None => continue,
            }
        };
        let vs_on = mesh.vertices().get(vs).is_some_and(|v| v.on_front());
        let ve_on = mesh.vertices().get(ve).is_some_and(|v| v.on_front());
        if vs_on || ve_on {
            next_pair = Some((vs, ve));
            break;
        }
    }
    let (vs, ve) = next_pair.ok_or(LayerAbort("layer produced no on-front projection"))?;
    *xy_start = mesh.vertices().position(vs);
    *xy_end = mesh.vertices().position(ve);

    Ok(quads)
}

/// For each base edge, grows the two triangles `(b1, b2, p1)` and
/// `(p1, b2, p2)` toward the projected coordinates and merges them into the
/// quad `(b1, b2, p2, p1)`. Bases whose triangles fail are skipped; the gap
/// pass picks them up.
fn create_layer_elements(
    mesh: &mut Mesh2d,
    front: &mut Front,
    domain: &Domain,
    params: &MesherParams,
    layer: &mut QuadLayer,
) -> usize {
    let mut quads = 0_usize;
    let mut update = FrontUpdate {
        mesh,
        front,
        domain,
    };
    for i in 0..layer.len() {
        let radius = params.quad_layer_range * layer.heights[i];
        let base = layer.bases[i];
        if !update.front.contains(base) {
            continue;
        }

        // First triangle (b1, b2, p1)
        let Some(t1) = update.update_front(base, layer.p1_xy[i], radius) else {
            continue;
        };
        let Some(p1) = update.mesh.triangle(t1).map(mesh_store::Triangle::v3) else {
            continue;
        };
        layer.p1[i] = Some(p1);

        // Second triangle (p1, b2, p2) off the fresh edge (p1, b2)
        let Some(base2) = update.front.get_edge_directed(p1, layer.b2[i]) else {
            continue;
        };
        let Some(t2) = update.update_front(base2, layer.p2_xy[i], radius) else {
            continue;
        };
        let Some(p2) = update.mesh.triangle(t2).map(mesh_store::Triangle::v3) else {
            continue;
        };
        layer.p2[i] = Some(p2);

        // Merge: drop the shared interior edge and both triangles, then
        // take the quad
        let Some(shared) = update.mesh.interior_edges().get_edge(layer.b2[i], p1) else {
            continue;
        };
        update.mesh.remove_interior_edge(shared);
        update.mesh.remove_triangle(t1);
        update.mesh.remove_triangle(t2);
        let quad = update.mesh.add_quad(layer.b1[i], layer.b2[i], p2, p1);
        if let Some(q) = update.mesh.quad_mut(quad) {
            q.set_active(true);
        }
        quads += 1;
    }
    quads
}

/// Closes the gaps left between adjacent bases whose projections stayed
/// separate: a single bridging triangle across tight wedges, or a Steiner
/// vertex with two triangles across open ones.
fn close_layer_gaps(
    mesh: &mut Mesh2d,
    front: &mut Front,
    domain: &Domain,
    params: &MesherParams,
    layer: &mut QuadLayer,
) {
    let mut update = FrontUpdate {
        mesh,
        front,
        domain,
    };
    for i in 1..layer.len() {
        let (Some(a), Some(c)) = (layer.p2[i - 1], layer.p1[i]) else {
            continue;
        };
        if a == c {
            continue;
        }
        let b = layer.b1[i];
        let pa = update.mesh.vertices().position(a);
        let pb = update.mesh.vertices().position(b);
        let pc = update.mesh.vertices().position(c);
        let alpha = angle(&(pa - pb), &(pc - pb));

        if alpha <= params.quad_layer_angle {
            // Tight wedge: one bridging triangle
            let tri = update.mesh.add_triangle(a, b, c);
            if update.remove_if_invalid(None, &[tri]) {
                continue;
            }
            if let Some(base) = update.front.get_edge_directed(b, c) {
                update.advance_front(base, a);
            } else {
                update.mesh.remove_triangle(tri);
            }
        } else {
            // Open wedge: close with a Steiner vertex and two triangles
            let v_xy = pb + (pa - pb) + (pc - pb);
            let v_new = update.mesh.add_vertex(v_xy);
            let t1 = update.mesh.add_triangle(a, b, v_new);
            let t2 = update.mesh.add_triangle(b, c, v_new);
            if update.remove_if_invalid(Some(v_new), &[t1, t2]) {
                continue;
            }
            let bases = (
                update.front.get_edge_directed(a, b),
                update.front.get_edge_directed(b, c),
            );
            let (Some(base1), Some(base2)) = bases else {
                rollback_gap(&mut update, v_new, &[t1, t2]);
                continue;
            };
            update.advance_front(base1, v_new);
            update.advance_front(base2, v_new);
            if let Some(v) = update.mesh.vertices_mut().get_mut(v_new) {
                v.set_fixed(true);
            }
        }
    }
}

fn rollback_gap(update: &mut FrontUpdate<'_>, v_new: VertexId, tris: &[TriangleId]) {
    for &t in tris {
        update.mesh.remove_triangle(t);
    }
    update.mesh.remove_vertex(v_new);
}
