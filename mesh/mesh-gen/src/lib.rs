//! Advancing-front generation of triangle and mixed triangle/quad meshes on
//! planar domains.
//!
//! The mesher carries an active boundary (the advancing front) inward until
//! the domain is tessellated. Element sizes follow a user-supplied scalar
//! size function, and structured quadrilateral layers can be grown along
//! selected boundary runs before the remainder is triangulated.
//!
//! # Features
//!
//! - **Domains**: boundary loops (exterior counter-clockwise, holes
//!   clockwise) with per-edge markers, plus a black-box size function
//! - **Front refinement**: boundary edges subdivided against the size
//!   function with a predictor/corrector walk
//! - **Triangulation**: rotating-base advancing front with quality-ranked
//!   apex selection and robust stagnation recovery
//! - **Quad layers**: projected structured layers with height smoothing,
//!   endpoint snapping/splitting, quad merging and wedge gap closure
//! - **Twin edges**: boundaries shared with an already-meshed neighbor are
//!   seeded, linked and never re-refined
//!
//! # Example
//!
//! ```
//! use geom2d::Point2;
//! use mesh_gen::{Domain, Mesher, MesherParams};
//!
//! // Unit square with a constant target edge length
//! let mut domain = Domain::new(|_p: &Point2<f64>| 0.25);
//! domain
//!     .add_exterior(
//!         &[
//!             Point2::new(0.0, 0.0),
//!             Point2::new(1.0, 0.0),
//!             Point2::new(1.0, 1.0),
//!             Point2::new(0.0, 1.0),
//!         ],
//!         1,
//!     )
//!     .unwrap();
//!
//! let mut mesher = Mesher::new(&domain, MesherParams::default()).unwrap();
//! mesher.triangulate().unwrap();
//!
//! let mesh = mesher.into_mesh();
//! assert!(mesh.triangle_count() > 0);
//! assert_eq!(mesh.quad_count(), 0);
//! ```
//!
//! # Failure model
//!
//! Geometric rejections inside the front-update primitive are expected and
//! silent; the driver simply tries the next base edge. Structural damage to
//! the front is fatal ([`MeshingError::FrontCorruption`]), driver
//! stagnation bounds are fatal for the call but keep the partial mesh
//! ([`MeshingError::NoProgress`]), and quad layer failures are non-fatal
//! ([`MeshingError::QuadLayerAborted`]): completed layers stay, and the
//! remaining front still triangulates.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod domain;
mod error;
mod front;
mod layering;
mod mesher;
mod params;
mod quad_layer;
mod triangulate;
mod update;

pub use domain::{BoundaryLoop, Domain, FrontSeeds, SeedEdge, SizeFunction};
pub use error::{MeshingError, MeshingResult};
pub use front::Front;
pub use mesher::Mesher;
pub use params::{MesherParams, QuadLayerOptions};

// Re-export the store types that appear in this crate's public API
pub use mesh_store::{EdgeId, Mesh2d, QuadId, TriangleId, VertexId, VertexStore};
