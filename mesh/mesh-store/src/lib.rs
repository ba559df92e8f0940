//! Entity store for planar meshes.
//!
//! This crate owns the mutable state that mesh generation algorithms operate
//! on:
//!
//! - [`VertexStore`] - Vertex arena with a uniform spatial grid for
//!   radius queries
//! - [`EdgeList`] - Ordered cyclic list of directed edges with stable
//!   handles and O(1) removal
//! - [`Mesh2d`] - The mesh container: vertices, boundary and interior
//!   edges, triangles and quads, with deferred entity cleanup
//!
//! # Handles
//!
//! Every entity is addressed through a generational [`slotmap`] key
//! ([`VertexId`], [`EdgeId`], [`TriangleId`], [`QuadId`]). Handles stay
//! stable across arbitrary insertions and removals, and a handle to a
//! removed entity simply resolves to `None` instead of aliasing newer data.
//!
//! # Ownership and cleanup
//!
//! Edges are owned by their [`EdgeList`] and released immediately on
//! removal. Facets and vertices are detached by `remove_*` but reclaimed
//! only by [`Mesh2d::clear_waste`], so transient handles held by an
//! algorithm never dangle mid-operation.
//!
//! # Example
//!
//! ```
//! use geom2d::Point2;
//! use mesh_store::Mesh2d;
//!
//! let mut mesh = Mesh2d::new(0.5);
//! let a = mesh.add_vertex(Point2::new(0.0, 0.0));
//! let b = mesh.add_vertex(Point2::new(1.0, 0.0));
//! let c = mesh.add_vertex(Point2::new(0.0, 1.0));
//! let tri = mesh.add_triangle(a, b, c);
//!
//! assert_eq!(mesh.triangle_count(), 1);
//! assert!(mesh.triangle(tri).is_some());
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod edge;
mod edge_list;
mod facet;
mod grid;
mod mesh;
mod vertex;

pub use edge::{Edge, EdgeId};
pub use edge_list::{EdgeList, Winding};
pub use facet::{FacetId, Quad, QuadId, Triangle, TriangleId};
pub use mesh::Mesh2d;
pub use vertex::{Vertex, VertexId, VertexStore};
