//! The public meshing entry point.

use mesh_store::{EdgeId, Mesh2d};
use tracing::info;

use crate::domain::{Domain, FrontSeeds};
use crate::error::{MeshingError, MeshingResult};
use crate::front::Front;
use crate::layering::generate_quad_layers;
use crate::params::{MesherParams, QuadLayerOptions};
use crate::triangulate::triangulate;

/// Drives mesh generation over one domain.
///
/// Owns the mesh and the advancing front across calls, so quad layers and
/// triangulation compose: layers eat into the front first, triangulation
/// consumes what remains.
///
/// # Example
///
/// ```
/// use geom2d::Point2;
/// use mesh_gen::{Domain, Mesher, MesherParams};
///
/// let mut domain = Domain::new(|_p: &Point2<f64>| 0.25);
/// domain
///     .add_exterior(
///         &[
///             Point2::new(0.0, 0.0),
///             Point2::new(1.0, 0.0),
///             Point2::new(1.0, 1.0),
///             Point2::new(0.0, 1.0),
///         ],
///         1,
///     )
///     .unwrap();
///
/// let mut mesher = Mesher::new(&domain, MesherParams::default()).unwrap();
/// mesher.triangulate().unwrap();
///
/// let mesh = mesher.into_mesh();
/// assert!(mesh.triangle_count() > 0);
/// ```
#[derive(Debug)]
pub struct Mesher<'a> {
    domain: &'a Domain,
    params: MesherParams,
    mesh: Mesh2d,
    front: Front,
    twin_links: Vec<(EdgeId, EdgeId)>,
}

impl<'a> Mesher<'a> {
    /// Initializes the mesher: builds the mesh store, seeds and refines the
    /// advancing front from the domain boundaries, and mirrors the marked
    /// front edges into the mesh's boundary edge list.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidDomain`-family error for an empty or
    /// inconsistently wound domain, or
    /// [`MeshingError::InvalidParameter`] for out-of-range knobs.
    pub fn new(domain: &'a Domain, params: MesherParams) -> MeshingResult<Self> {
        let seeds = FrontSeeds::from_domain(domain);
        Self::with_seeds(domain, &seeds, params)
    }

    /// As [`Mesher::new`], but with caller-provided front seeds (the path
    /// for meshes sharing a boundary with an already-meshed neighbor via
    /// twin edges).
    ///
    /// # Errors
    ///
    /// As [`Mesher::new`].
    pub fn with_seeds(
        domain: &'a Domain,
        seeds: &FrontSeeds,
        params: MesherParams,
    ) -> MeshingResult<Self> {
        params.validate()?;
        if domain.loops().is_empty() || seeds.loops.is_empty() {
            return Err(MeshingError::EmptyDomain);
        }

        let bbox = domain.bounding_box();
        let extent = bbox.max_extent().max(f64::MIN_POSITIVE);
        let rho_center = domain.size_at(&bbox.center());
        let cell = rho_center.clamp(extent / 256.0, extent);

        let mut mesh = Mesh2d::new(cell);
        let mut front = Front::new();
        let twin_links = front.init(domain, seeds, mesh.vertices_mut())?;

        let area = front.area(mesh.vertices());
        if area <= 0.0 {
            return Err(MeshingError::NonPositiveArea { area });
        }

        // Marked front edges double as mesh boundary edges
        let marked: Vec<_> = front
            .edges()
            .iter()
            .filter_map(|(_, e)| e.marker().map(|m| (e.v1(), e.v2(), m)))
            .collect();
        for (v1, v2, m) in marked {
            mesh.add_boundary_edge(v1, v2, m);
        }
        mesh.setup_facet_connectivity();

        info!(
            front_edges = front.len(),
            boundary_edges = mesh.boundary_edges().len(),
            area,
            "advancing front initialized"
        );
        Ok(Self {
            domain,
            params,
            mesh,
            front,
            twin_links,
        })
    }

    /// Triangulates the remaining unmeshed region until the front is empty.
    ///
    /// # Errors
    ///
    /// Returns [`MeshingError::NoProgress`] when the driver exhausts its
    /// iteration bound; the mesh keeps everything built so far.
    pub fn triangulate(&mut self) -> MeshingResult<()> {
        triangulate(&mut self.mesh, &mut self.front, self.domain, &self.params)
    }

    /// Grows structured quad layers along the requested run of front edges.
    ///
    /// # Errors
    ///
    /// Returns [`MeshingError::QuadLayerAborted`] when a layer cannot be
    /// built; completed layers stay in the mesh and
    /// [`Mesher::triangulate`] remains valid for the rest of the domain.
    pub fn quad_layers(&mut self, opts: &QuadLayerOptions) -> MeshingResult<()> {
        generate_quad_layers(
            &mut self.mesh,
            &mut self.front,
            self.domain,
            &self.params,
            opts,
        )
    }

    /// The mesh built so far.
    #[must_use]
    pub const fn mesh(&self) -> &Mesh2d {
        &self.mesh
    }

    /// The current advancing front.
    #[must_use]
    pub const fn front(&self) -> &Front {
        &self.front
    }

    /// Twin links recorded during front initialization, as
    /// `(front edge, foreign twin)` pairs; the embedding driver restores
    /// the symmetric half on the neighboring mesh.
    #[must_use]
    pub fn twin_links(&self) -> &[(EdgeId, EdgeId)] {
        &self.twin_links
    }

    /// Consumes the mesher, returning the mesh.
    #[must_use]
    pub fn into_mesh(self) -> Mesh2d {
        self.mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geom2d::Point2;

    #[test]
    fn empty_domain_is_rejected() {
        let domain = Domain::new(|_: &Point2<f64>| 0.25);
        assert!(matches!(
            Mesher::new(&domain, MesherParams::default()),
            Err(MeshingError::EmptyDomain)
        ));
    }

    #[test]
    fn boundary_edges_mirror_the_front() {
        let mut domain = Domain::new(|_: &Point2<f64>| 0.25);
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
        let mesher = Mesher::new(&domain, MesherParams::default()).unwrap();
        assert_eq!(mesher.front().len(), 16);
        assert_eq!(mesher.mesh().boundary_edges().len(), 16);
        assert!(mesher.twin_links().is_empty());
    }

    #[test]
    fn hole_swallowing_the_exterior_is_rejected() {
        let mut domain = Domain::new(|_: &Point2<f64>| 0.25);
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
        // A (geometrically nonsensical) hole larger than the exterior
        domain
            .add_hole(
                &[
                    Point2::new(-1.0, -1.0),
                    Point2::new(-1.0, 3.0),
                    Point2::new(3.0, 3.0),
                    Point2::new(3.0, -1.0),
                ],
                2,
            )
            .unwrap();
        assert!(matches!(
            Mesher::new(&domain, MesherParams::default()),
            Err(MeshingError::NonPositiveArea { .. })
        ));
    }
}
