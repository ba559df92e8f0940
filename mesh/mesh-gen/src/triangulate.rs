//! The advancing-front triangulation driver.

use mesh_store::Mesh2d;
use tracing::{debug, info, warn};

use crate::domain::Domain;
use crate::error::{MeshingError, MeshingResult};
use crate::front::Front;
use crate::params::MesherParams;
use crate::update::FrontUpdate;

/// Ideal element height over base length: √3/2, the apex height of an
/// equilateral triangle with unit side.
const HEIGHT_FACTOR: f64 = 0.866_025_403_784_438_6;

/// Eats the front inward until it is empty, one triangle per step.
///
/// Each iteration rotates the base cursor, aims for the ideal apex at
/// `√3/2 · ρ(midpoint)` along the inward normal and applies the
/// front-update primitive. A full revolution without progress re-sorts the
/// front by ascending edge length; exceeding the iteration bound aborts
/// with [`MeshingError::NoProgress`], leaving the mesh as it stands.
pub(crate) fn triangulate(
    mesh: &mut Mesh2d,
    front: &mut Front,
    domain: &Domain,
    params: &MesherParams,
) -> MeshingResult<()> {
    if front.is_empty() {
        return Ok(());
    }
    let initial_edges = front.len();
    let max_iterations = params.max_iter_factor.saturating_mul(initial_edges);

    front.set_base_first();
    let mut update = FrontUpdate {
        mesh: &mut *mesh,
        front: &mut *front,
        domain,
    };
    let mut iterations = 0_usize;
    let mut stagnant = 0_usize;
    let mut triangles = 0_usize;

    while !update.front.is_empty() {
        iterations += 1;
        if iterations > max_iterations {
            let remaining = update.front.len();
            warn!(
                iterations = max_iterations,
                remaining, "triangulation stalled at its iteration bound"
            );
            return Err(MeshingError::NoProgress {
                iterations: max_iterations,
                remaining,
            });
        }

        let base = update
            .front
            .base()
            .ok_or(MeshingError::FrontCorruption("front has edges but no base"))?;
        let (midpoint, normal) = {
            let edge = update
                .front
                .edge(base)
                .ok_or(MeshingError::FrontCorruption("base edge left the front"))?;
            (edge.midpoint(), edge.normal())
        };

        let rho = update.domain.size_at(&midpoint);
        let height = HEIGHT_FACTOR * rho;
        let target = midpoint + height * normal;
        let radius = params.vertex_search_factor * height;

        if update.update_front(base, target, radius).is_some() {
            // The base was consumed; its removal advanced the cursor
            triangles += 1;
            stagnant = 0;
        } else {
            update.front.set_base_next();
            stagnant += 1;
            if stagnant >= update.front.len() {
                debug!(
                    remaining = update.front.len(),
                    "full revolution without progress; sorting front by length"
                );
                update.front.sort_edges();
                stagnant = 0;
            }
        }
    }

    mesh.clear_waste();
    mesh.setup_facet_connectivity();
    info!(
        iterations,
        triangles,
        vertices = mesh.vertex_count(),
        "advancing-front triangulation complete"
    );
    Ok(())
}
