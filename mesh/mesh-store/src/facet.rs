//! Triangle and quad facets.

use geom2d::Point2;

use crate::vertex::{VertexId, VertexStore};

slotmap::new_key_type! {
    /// Stable handle to a triangle in a [`Mesh2d`](crate::Mesh2d).
    pub struct TriangleId;
}

slotmap::new_key_type! {
    /// Stable handle to a quad in a [`Mesh2d`](crate::Mesh2d).
    pub struct QuadId;
}

/// Handle to a facet of either kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FacetId {
    /// A triangle facet.
    Triangle(TriangleId),
    /// A quad facet.
    Quad(QuadId),
}

/// A triangular facet with counter-clockwise vertex order.
#[derive(Debug, Clone)]
pub struct Triangle {
    vertices: [VertexId; 3],
    neighbors: [Option<FacetId>; 3],
    is_active: bool,
    pub(crate) waste: bool,
}

impl Triangle {
    pub(crate) fn new(v1: VertexId, v2: VertexId, v3: VertexId) -> Self {
        Self {
            vertices: [v1, v2, v3],
            neighbors: [None; 3],
            is_active: false,
            waste: false,
        }
    }

    /// The vertex handles in counter-clockwise order.
    #[must_use]
    pub const fn vertices(&self) -> [VertexId; 3] {
        self.vertices
    }

    /// First vertex.
    #[must_use]
    pub const fn v1(&self) -> VertexId {
        self.vertices[0]
    }

    /// Second vertex.
    #[must_use]
    pub const fn v2(&self) -> VertexId {
        self.vertices[1]
    }

    /// Third vertex.
    #[must_use]
    pub const fn v3(&self) -> VertexId {
        self.vertices[2]
    }

    /// The directed sides `(v1,v2), (v2,v3), (v3,v1)`.
    #[must_use]
    pub const fn sides(&self) -> [(VertexId, VertexId); 3] {
        [
            (self.vertices[0], self.vertices[1]),
            (self.vertices[1], self.vertices[2]),
            (self.vertices[2], self.vertices[0]),
        ]
    }

    /// Cached neighbor facets, side by side.
    #[must_use]
    pub const fn neighbors(&self) -> [Option<FacetId>; 3] {
        self.neighbors
    }

    pub(crate) fn set_neighbor(&mut self, side: usize, facet: Option<FacetId>) {
        self.neighbors[side] = facet;
    }

    /// Whether the facet is flagged active (used while merging into quads).
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Sets the active flag.
    pub fn set_active(&mut self, value: bool) {
        self.is_active = value;
    }

    /// Signed area against the vertex positions in `verts`.
    ///
    /// # Panics
    ///
    /// Panics if a vertex handle is dead.
    #[must_use]
    pub fn area(&self, verts: &VertexStore) -> f64 {
        let [a, b, c] = self.vertices.map(|v| verts.position(v));
        geom2d::triangle_area(&a, &b, &c)
    }

    /// Centroid against the vertex positions in `verts`.
    ///
    /// # Panics
    ///
    /// Panics if a vertex handle is dead.
    #[must_use]
    pub fn centroid(&self, verts: &VertexStore) -> Point2<f64> {
        let [a, b, c] = self.vertices.map(|v| verts.position(v));
        Point2::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0)
    }
}

/// A quadrilateral facet with counter-clockwise vertex order.
#[derive(Debug, Clone)]
pub struct Quad {
    vertices: [VertexId; 4],
    neighbors: [Option<FacetId>; 4],
    is_active: bool,
    pub(crate) waste: bool,
}

impl Quad {
    pub(crate) fn new(v1: VertexId, v2: VertexId, v3: VertexId, v4: VertexId) -> Self {
        Self {
            vertices: [v1, v2, v3, v4],
            neighbors: [None; 4],
            is_active: false,
            waste: false,
        }
    }

    /// The vertex handles in counter-clockwise order.
    #[must_use]
    pub const fn vertices(&self) -> [VertexId; 4] {
        self.vertices
    }

    /// The directed sides `(v1,v2), (v2,v3), (v3,v4), (v4,v1)`.
    #[must_use]
    pub const fn sides(&self) -> [(VertexId, VertexId); 4] {
        [
            (self.vertices[0], self.vertices[1]),
            (self.vertices[1], self.vertices[2]),
            (self.vertices[2], self.vertices[3]),
            (self.vertices[3], self.vertices[0]),
        ]
    }

    /// Cached neighbor facets, side by side.
    #[must_use]
    pub const fn neighbors(&self) -> [Option<FacetId>; 4] {
        self.neighbors
    }

    pub(crate) fn set_neighbor(&mut self, side: usize, facet: Option<FacetId>) {
        self.neighbors[side] = facet;
    }

    /// Whether the facet is flagged active.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Sets the active flag.
    pub fn set_active(&mut self, value: bool) {
        self.is_active = value;
    }

    /// Signed area against the vertex positions in `verts`.
    ///
    /// # Panics
    ///
    /// Panics if a vertex handle is dead.
    #[must_use]
    pub fn area(&self, verts: &VertexStore) -> f64 {
        let [a, b, c, d] = self.vertices.map(|v| verts.position(v));
        geom2d::quad_area(&a, &b, &c, &d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VertexStore;

    #[test]
    fn triangle_sides_and_area() {
        let mut verts = VertexStore::new(1.0);
        let a = verts.insert(Point2::new(0.0, 0.0));
        let b = verts.insert(Point2::new(2.0, 0.0));
        let c = verts.insert(Point2::new(0.0, 2.0));
        let tri = Triangle::new(a, b, c);
        assert_eq!(tri.sides()[1], (b, c));
        assert!((tri.area(&verts) - 2.0).abs() < 1e-12);
        let ctr = tri.centroid(&verts);
        assert!((ctr.x - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn quad_area_ccw() {
        let mut verts = VertexStore::new(1.0);
        let a = verts.insert(Point2::new(0.0, 0.0));
        let b = verts.insert(Point2::new(1.0, 0.0));
        let c = verts.insert(Point2::new(1.0, 1.0));
        let d = verts.insert(Point2::new(0.0, 1.0));
        let quad = Quad::new(a, b, c, d);
        assert!((quad.area(&verts) - 1.0).abs() < 1e-12);
        assert!(!quad.is_active());
    }
}
