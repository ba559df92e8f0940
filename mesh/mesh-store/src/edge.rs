//! Directed mesh edges.

use geom2d::{Point2, Vector2};

slotmap::new_key_type! {
    /// Stable handle to an edge within its owning [`EdgeList`].
    ///
    /// The key doubles as the edge's positional handle inside the list, so
    /// removal and insert-before-position are O(1).
    ///
    /// [`EdgeList`]: crate::EdgeList
    pub struct EdgeId;
}

/// A directed edge between two vertices.
///
/// Walking `v1 -> v2`, the region to the left is the interior (for boundary
/// edges) or the not-yet-meshed region (for front edges). Length, tangent,
/// left normal and midpoint are cached at creation; vertex positions never
/// change, so the caches never go stale.
#[derive(Debug, Clone)]
pub struct Edge {
    v1: crate::VertexId,
    v2: crate::VertexId,
    marker: Option<i32>,
    twin: Option<EdgeId>,
    length: f64,
    tangent: Vector2<f64>,
    normal: Vector2<f64>,
    midpoint: Point2<f64>,
    pub(crate) prev: EdgeId,
    pub(crate) next: EdgeId,
}

impl Edge {
    pub(crate) fn new(
        v1: crate::VertexId,
        v2: crate::VertexId,
        p1: &Point2<f64>,
        p2: &Point2<f64>,
        marker: Option<i32>,
    ) -> Self {
        let delta = p2 - p1;
        let length = delta.norm();
        let tangent = if length > 0.0 {
            delta / length
        } else {
            Vector2::zeros()
        };
        Self {
            v1,
            v2,
            marker,
            twin: None,
            length,
            tangent,
            normal: Vector2::new(-tangent.y, tangent.x),
            midpoint: nalgebra::center(p1, p2),
            prev: EdgeId::default(),
            next: EdgeId::default(),
        }
    }

    /// The start vertex.
    #[must_use]
    pub const fn v1(&self) -> crate::VertexId {
        self.v1
    }

    /// The end vertex.
    #[must_use]
    pub const fn v2(&self) -> crate::VertexId {
        self.v2
    }

    /// The boundary marker, or `None` for interior edges.
    #[must_use]
    pub const fn marker(&self) -> Option<i32> {
        self.marker
    }

    /// The twin edge on the neighboring mesh sharing this boundary, if any.
    #[must_use]
    pub const fn twin(&self) -> Option<EdgeId> {
        self.twin
    }

    /// Links this edge to its twin on a neighboring mesh.
    pub fn set_twin(&mut self, twin: Option<EdgeId>) {
        self.twin = twin;
    }

    /// Cached edge length.
    #[must_use]
    pub const fn length(&self) -> f64 {
        self.length
    }

    /// Cached unit tangent `v1 -> v2`.
    #[must_use]
    pub const fn tangent(&self) -> Vector2<f64> {
        self.tangent
    }

    /// Cached left unit normal (points into the interior / unmeshed side).
    #[must_use]
    pub const fn normal(&self) -> Vector2<f64> {
        self.normal
    }

    /// Cached midpoint.
    #[must_use]
    pub const fn midpoint(&self) -> Point2<f64> {
        self.midpoint
    }

    /// Whether `v` is one of the edge's endpoints.
    #[must_use]
    pub fn has_vertex(&self, v: crate::VertexId) -> bool {
        self.v1 == v || self.v2 == v
    }

    /// The endpoint opposite to `v`, if `v` is an endpoint.
    #[must_use]
    pub fn other_vertex(&self, v: crate::VertexId) -> Option<crate::VertexId> {
        if v == self.v1 {
            Some(self.v2)
        } else if v == self.v2 {
            Some(self.v1)
        } else {
            None
        }
    }
}
