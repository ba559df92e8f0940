//! The mesh container.

use geom2d::Point2;
use hashbrown::HashMap;
use slotmap::SlotMap;
use tracing::debug;

use crate::edge::EdgeId;
use crate::edge_list::{EdgeList, Winding};
use crate::facet::{FacetId, Quad, QuadId, Triangle, TriangleId};
use crate::vertex::{VertexId, VertexStore};

/// The mesh container: vertices, boundary and interior edges, triangles and
/// quads.
///
/// Facet and vertex removal detaches the entity (it leaves all views and
/// queries) but keeps its slot until [`Mesh2d::clear_waste`] reclaims it,
/// so handles held by an in-flight algorithm never alias recycled data.
/// Edges are owned by their lists and released immediately on removal.
#[derive(Debug)]
pub struct Mesh2d {
    vertices: VertexStore,
    boundary_edges: EdgeList,
    interior_edges: EdgeList,
    triangles: SlotMap<TriangleId, Triangle>,
    quads: SlotMap<QuadId, Quad>,
    waste_triangles: Vec<TriangleId>,
    waste_quads: Vec<QuadId>,
}

impl Mesh2d {
    /// Creates an empty mesh.
    ///
    /// `cell_size` sizes the vertex spatial grid; a value near the typical
    /// element size keeps radius queries cheap.
    ///
    /// # Panics
    ///
    /// Panics if `cell_size` is not strictly positive.
    #[must_use]
    pub fn new(cell_size: f64) -> Self {
        Self {
            vertices: VertexStore::new(cell_size),
            boundary_edges: EdgeList::new(Winding::None),
            interior_edges: EdgeList::new(Winding::None),
            triangles: SlotMap::with_key(),
            quads: SlotMap::with_key(),
            waste_triangles: Vec::new(),
            waste_quads: Vec::new(),
        }
    }

    /// The vertex store.
    #[must_use]
    pub const fn vertices(&self) -> &VertexStore {
        &self.vertices
    }

    /// Mutable access to the vertex store.
    pub fn vertices_mut(&mut self) -> &mut VertexStore {
        &mut self.vertices
    }

    /// Inserts a vertex.
    pub fn add_vertex(&mut self, position: Point2<f64>) -> VertexId {
        self.vertices.insert(position)
    }

    /// Detaches a vertex (reclaimed by [`Mesh2d::clear_waste`]).
    pub fn remove_vertex(&mut self, id: VertexId) -> bool {
        self.vertices.remove(id)
    }

    /// The boundary edge list.
    #[must_use]
    pub const fn boundary_edges(&self) -> &EdgeList {
        &self.boundary_edges
    }

    /// The interior edge list.
    #[must_use]
    pub const fn interior_edges(&self) -> &EdgeList {
        &self.interior_edges
    }

    /// Appends a boundary edge.
    ///
    /// # Panics
    ///
    /// Panics if a vertex handle is dead.
    pub fn add_boundary_edge(&mut self, v1: VertexId, v2: VertexId, marker: i32) -> EdgeId {
        self.boundary_edges
            .add_edge(&self.vertices, v1, v2, Some(marker))
    }

    /// Inserts a boundary edge before `pos` in the boundary list.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is not a boundary edge or a vertex handle is dead.
    pub fn insert_boundary_edge(
        &mut self,
        pos: EdgeId,
        v1: VertexId,
        v2: VertexId,
        marker: Option<i32>,
    ) -> EdgeId {
        self.boundary_edges
            .insert_edge(&self.vertices, pos, v1, v2, marker)
    }

    /// Removes a boundary edge.
    pub fn remove_boundary_edge(&mut self, id: EdgeId) -> bool {
        self.boundary_edges.remove(id).is_some()
    }

    /// Appends an interior edge.
    ///
    /// # Panics
    ///
    /// Panics if a vertex handle is dead.
    pub fn add_interior_edge(&mut self, v1: VertexId, v2: VertexId) -> EdgeId {
        self.interior_edges.add_edge(&self.vertices, v1, v2, None)
    }

    /// Removes an interior edge.
    pub fn remove_interior_edge(&mut self, id: EdgeId) -> bool {
        self.interior_edges.remove(id).is_some()
    }

    /// Adds a triangle with counter-clockwise vertex order.
    pub fn add_triangle(&mut self, v1: VertexId, v2: VertexId, v3: VertexId) -> TriangleId {
        self.triangles.insert(Triangle::new(v1, v2, v3))
    }

    /// Detaches a triangle (reclaimed by [`Mesh2d::clear_waste`]).
    pub fn remove_triangle(&mut self, id: TriangleId) -> bool {
        let Some(t) = self.triangles.get_mut(id) else {
            return false;
        };
        if t.waste {
            return false;
        }
        t.waste = true;
        self.waste_triangles.push(id);
        true
    }

    /// Adds a quad with counter-clockwise vertex order.
    pub fn add_quad(
        &mut self,
        v1: VertexId,
        v2: VertexId,
        v3: VertexId,
        v4: VertexId,
    ) -> QuadId {
        self.quads.insert(Quad::new(v1, v2, v3, v4))
    }

    /// Detaches a quad (reclaimed by [`Mesh2d::clear_waste`]).
    pub fn remove_quad(&mut self, id: QuadId) -> bool {
        let Some(q) = self.quads.get_mut(id) else {
            return false;
        };
        if q.waste {
            return false;
        }
        q.waste = true;
        self.waste_quads.push(id);
        true
    }

    /// The triangle behind `id`, if alive.
    #[must_use]
    pub fn triangle(&self, id: TriangleId) -> Option<&Triangle> {
        self.triangles.get(id).filter(|t| !t.waste)
    }

    /// Mutable access to the triangle behind `id`, if alive.
    pub fn triangle_mut(&mut self, id: TriangleId) -> Option<&mut Triangle> {
        self.triangles.get_mut(id).filter(|t| !t.waste)
    }

    /// The quad behind `id`, if alive.
    #[must_use]
    pub fn quad(&self, id: QuadId) -> Option<&Quad> {
        self.quads.get(id).filter(|q| !q.waste)
    }

    /// Mutable access to the quad behind `id`, if alive.
    pub fn quad_mut(&mut self, id: QuadId) -> Option<&mut Quad> {
        self.quads.get_mut(id).filter(|q| !q.waste)
    }

    /// Iterates over live triangles.
    pub fn triangles(&self) -> impl Iterator<Item = (TriangleId, &Triangle)> {
        self.triangles.iter().filter(|(_, t)| !t.waste)
    }

    /// Iterates over live quads.
    pub fn quads(&self) -> impl Iterator<Item = (QuadId, &Quad)> {
        self.quads.iter().filter(|(_, q)| !q.waste)
    }

    /// Number of live triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() - self.waste_triangles.len()
    }

    /// Number of live quads.
    #[must_use]
    pub fn quad_count(&self) -> usize {
        self.quads.len() - self.waste_quads.len()
    }

    /// Number of live vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of live facets of both kinds.
    #[must_use]
    pub fn facet_count(&self) -> usize {
        self.triangle_count() + self.quad_count()
    }

    /// Reclaims all detached vertices and facets. Returns how many entities
    /// were freed.
    pub fn clear_waste(&mut self) -> usize {
        let mut freed = self.vertices.clear_waste();
        freed += self.waste_triangles.len() + self.waste_quads.len();
        for id in self.waste_triangles.drain(..) {
            self.triangles.remove(id);
        }
        for id in self.waste_quads.drain(..) {
            self.quads.remove(id);
        }
        if freed > 0 {
            debug!(freed, "reclaimed detached mesh entities");
        }
        freed
    }

    /// Primes the facet neighbor pointers from shared sides.
    ///
    /// Two facets are neighbors when they share a side (an unordered vertex
    /// pair). Sides shared by more than two facets leave the neighbor
    /// pointers unset for the surplus facets.
    pub fn setup_facet_connectivity(&mut self) {
        let mut by_side: HashMap<(VertexId, VertexId), Vec<FacetId>> = HashMap::new();
        for (id, tri) in self.triangles.iter().filter(|(_, t)| !t.waste) {
            for (a, b) in tri.sides() {
                by_side
                    .entry(sorted_pair(a, b))
                    .or_default()
                    .push(FacetId::Triangle(id));
            }
        }
        for (id, quad) in self.quads.iter().filter(|(_, q)| !q.waste) {
            for (a, b) in quad.sides() {
                by_side
                    .entry(sorted_pair(a, b))
                    .or_default()
                    .push(FacetId::Quad(id));
            }
        }

        let neighbor_of = |facet: FacetId, a: VertexId, b: VertexId| -> Option<FacetId> {
            let facets = by_side.get(&sorted_pair(a, b))?;
            if facets.len() != 2 {
                return None;
            }
            facets.iter().copied().find(|&other| other != facet)
        };

        let tri_ids: Vec<TriangleId> = self
            .triangles
            .iter()
            .filter(|(_, t)| !t.waste)
            .map(|(id, _)| id)
            .collect();
        for id in tri_ids {
            let sides = self.triangles[id].sides();
            for (i, (a, b)) in sides.into_iter().enumerate() {
                let n = neighbor_of(FacetId::Triangle(id), a, b);
                self.triangles[id].set_neighbor(i, n);
            }
        }
        let quad_ids: Vec<QuadId> = self
            .quads
            .iter()
            .filter(|(_, q)| !q.waste)
            .map(|(id, _)| id)
            .collect();
        for id in quad_ids {
            let sides = self.quads[id].sides();
            for (i, (a, b)) in sides.into_iter().enumerate() {
                let n = neighbor_of(FacetId::Quad(id), a, b);
                self.quads[id].set_neighbor(i, n);
            }
        }
    }
}

fn sorted_pair(a: VertexId, b: VertexId) -> (VertexId, VertexId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
