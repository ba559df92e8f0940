//! Vertices and the spatially indexed vertex arena.

use geom2d::Point2;
use slotmap::SlotMap;

use crate::grid::VertexGrid;

slotmap::new_key_type! {
    /// Stable handle to a vertex in a [`VertexStore`].
    pub struct VertexId;
}

/// A mesh vertex: a position plus the flags the advancing front maintains.
///
/// The position is set at creation and never changes afterwards; handles to
/// a vertex therefore stay geometrically valid for the vertex's lifetime.
#[derive(Debug, Clone)]
pub struct Vertex {
    position: Point2<f64>,
    on_front: bool,
    on_boundary: bool,
    is_fixed: bool,
    waste: bool,
}

impl Vertex {
    fn new(position: Point2<f64>) -> Self {
        Self {
            position,
            on_front: false,
            on_boundary: false,
            is_fixed: false,
            waste: false,
        }
    }

    /// The vertex position.
    #[must_use]
    pub const fn position(&self) -> Point2<f64> {
        self.position
    }

    /// Whether the vertex currently lies on the advancing front.
    #[must_use]
    pub const fn on_front(&self) -> bool {
        self.on_front
    }

    /// Whether the vertex lies on a domain boundary.
    #[must_use]
    pub const fn on_boundary(&self) -> bool {
        self.on_boundary
    }

    /// Whether the vertex position is pinned against smoothing passes.
    #[must_use]
    pub const fn is_fixed(&self) -> bool {
        self.is_fixed
    }

    /// Sets the on-front flag.
    pub fn set_on_front(&mut self, value: bool) {
        self.on_front = value;
    }

    /// Sets the on-boundary flag.
    pub fn set_on_boundary(&mut self, value: bool) {
        self.on_boundary = value;
    }

    /// Pins or unpins the vertex position.
    pub fn set_fixed(&mut self, value: bool) {
        self.is_fixed = value;
    }
}

/// Vertex arena with a uniform spatial grid for radius queries.
///
/// Removal detaches the vertex from the spatial index at once but keeps its
/// slot occupied until [`VertexStore::clear_waste`], so stale handles held
/// elsewhere resolve to `None` rather than to recycled data.
#[derive(Debug)]
pub struct VertexStore {
    verts: SlotMap<VertexId, Vertex>,
    grid: VertexGrid,
    waste: Vec<VertexId>,
}

impl VertexStore {
    /// Creates an empty store.
    ///
    /// `cell_size` is the spatial grid resolution; radius queries are most
    /// efficient when it is on the order of the typical query radius.
    ///
    /// # Panics
    ///
    /// Panics if `cell_size` is not strictly positive.
    #[must_use]
    pub fn new(cell_size: f64) -> Self {
        assert!(
            cell_size > 0.0 && cell_size.is_finite(),
            "VertexStore requires a positive grid cell size"
        );
        Self {
            verts: SlotMap::with_key(),
            grid: VertexGrid::new(cell_size),
            waste: Vec::new(),
        }
    }

    /// Inserts a vertex at `position` and returns its handle.
    pub fn insert(&mut self, position: Point2<f64>) -> VertexId {
        let id = self.verts.insert(Vertex::new(position));
        self.grid.insert(id, &position);
        id
    }

    /// Detaches a vertex: it disappears from queries and iteration, but its
    /// slot is reclaimed only by [`VertexStore::clear_waste`].
    ///
    /// Returns `false` if the handle was already dead.
    pub fn remove(&mut self, id: VertexId) -> bool {
        let Some(v) = self.verts.get_mut(id) else {
            return false;
        };
        if v.waste {
            return false;
        }
        v.waste = true;
        let position = v.position;
        self.grid.remove(id, &position);
        self.waste.push(id);
        true
    }

    /// Returns the vertex behind `id`, if it is still alive.
    #[must_use]
    pub fn get(&self, id: VertexId) -> Option<&Vertex> {
        self.verts.get(id).filter(|v| !v.waste)
    }

    /// Mutable access to the vertex behind `id`, if it is still alive.
    pub fn get_mut(&mut self, id: VertexId) -> Option<&mut Vertex> {
        self.verts.get_mut(id).filter(|v| !v.waste)
    }

    /// Whether `id` refers to a live vertex.
    #[must_use]
    pub fn contains(&self, id: VertexId) -> bool {
        self.get(id).is_some()
    }

    /// The position of a live vertex.
    ///
    /// # Panics
    ///
    /// Panics if `id` is dead; passing a handle obtained from this store and
    /// not removed since is always safe.
    #[must_use]
    pub fn position(&self, id: VertexId) -> Point2<f64> {
        match self.get(id) {
            Some(v) => v.position,
            None => panic!("stale vertex handle"),
        }
    }

    /// Number of live vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.verts.len() - self.waste.len()
    }

    /// Whether the store holds no live vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over all live vertices.
    pub fn iter(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.verts.iter().filter(|(_, v)| !v.waste)
    }

    /// All live vertices within `radius` of `center`, sorted by ascending
    /// distance.
    ///
    /// # Example
    ///
    /// ```
    /// use geom2d::Point2;
    /// use mesh_store::VertexStore;
    ///
    /// let mut store = VertexStore::new(1.0);
    /// let near = store.insert(Point2::new(0.1, 0.0));
    /// let far = store.insert(Point2::new(0.8, 0.0));
    /// store.insert(Point2::new(5.0, 5.0));
    ///
    /// let hits = store.within(&Point2::new(0.0, 0.0), 1.0);
    /// assert_eq!(hits.len(), 2);
    /// assert_eq!(hits[0].0, near);
    /// assert_eq!(hits[1].0, far);
    /// ```
    #[must_use]
    pub fn within(&self, center: &Point2<f64>, radius: f64) -> Vec<(VertexId, f64)> {
        let mut hits: Vec<(VertexId, f64)> = Vec::new();
        let r_sqr = radius * radius;
        for id in self.grid.ids_in_envelope(center, radius) {
            if let Some(v) = self.get(id) {
                let d_sqr = (v.position - center).norm_squared();
                if d_sqr <= r_sqr {
                    hits.push((id, d_sqr.sqrt()));
                }
            }
        }
        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        hits
    }

    /// Reclaims the slots of detached vertices. Returns how many were freed.
    pub fn clear_waste(&mut self) -> usize {
        let n = self.waste.len();
        for id in self.waste.drain(..) {
            self.verts.remove(id);
        }
        n
    }
}
