//! Ordered cyclic edge container.

use std::cell::Cell;

use geom2d::Point2;
use hashbrown::HashMap;
use slotmap::SlotMap;

use crate::edge::{Edge, EdgeId};
use crate::vertex::{VertexId, VertexStore};

/// Winding tag of an edge list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Winding {
    /// Counter-clockwise loop.
    Ccw,
    /// Clockwise loop.
    Cw,
    /// No prescribed winding (e.g. the advancing front, mixed edge pools).
    None,
}

/// An ordered cyclic container of directed edges.
///
/// Edges live in a slotmap arena and are threaded into a circular
/// doubly-linked list; the [`EdgeId`] of an edge is its stable positional
/// handle, giving O(1) removal and insert-before-position. A vertex
/// adjacency map answers incidence queries in O(degree).
///
/// Two orders coexist:
/// - the **list order** (`iter`, [`EdgeList::next_in_list`]) - the order
///   edges were appended or sorted into;
/// - the **ring order** ([`EdgeList::next_edge`] /
///   [`EdgeList::prev_edge`]) - connectivity walks across shared endpoints,
///   independent of storage order.
///
/// # Example
///
/// ```
/// use geom2d::Point2;
/// use mesh_store::{EdgeList, VertexStore, Winding};
///
/// let mut verts = VertexStore::new(1.0);
/// let a = verts.insert(Point2::new(0.0, 0.0));
/// let b = verts.insert(Point2::new(1.0, 0.0));
/// let c = verts.insert(Point2::new(0.0, 1.0));
///
/// let mut list = EdgeList::new(Winding::Ccw);
/// let ab = list.add_edge(&verts, a, b, None);
/// let bc = list.add_edge(&verts, b, c, None);
/// let ca = list.add_edge(&verts, c, a, None);
///
/// assert_eq!(list.next_edge(ab), Some(bc));
/// assert!(list.is_traversable(ab, ca));
/// assert!((list.area(&verts) - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug)]
pub struct EdgeList {
    edges: SlotMap<EdgeId, Edge>,
    head: Option<EdgeId>,
    winding: Winding,
    adjacency: HashMap<VertexId, Vec<EdgeId>>,
    area: Cell<Option<f64>>,
}

impl EdgeList {
    /// Creates an empty list with the given winding tag.
    #[must_use]
    pub fn new(winding: Winding) -> Self {
        Self {
            edges: SlotMap::with_key(),
            head: None,
            winding,
            adjacency: HashMap::new(),
            area: Cell::new(None),
        }
    }

    /// The winding tag.
    #[must_use]
    pub const fn winding(&self) -> Winding {
        self.winding
    }

    /// Number of edges in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// The first edge in list order, if any.
    #[must_use]
    pub const fn first(&self) -> Option<EdgeId> {
        self.head
    }

    /// The edge behind `id`, if it is in the list.
    #[must_use]
    pub fn get(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// Mutable access to the edge behind `id` (twin linking).
    pub fn get_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(id)
    }

    /// Whether `id` refers to an edge currently in the list.
    #[must_use]
    pub fn contains(&self, id: EdgeId) -> bool {
        self.edges.contains_key(id)
    }

    /// Appends an edge `v1 -> v2` at the end of the list.
    ///
    /// # Panics
    ///
    /// Panics if either vertex handle is dead.
    pub fn add_edge(
        &mut self,
        verts: &VertexStore,
        v1: VertexId,
        v2: VertexId,
        marker: Option<i32>,
    ) -> EdgeId {
        let edge = Edge::new(v1, v2, &verts.position(v1), &verts.position(v2), marker);
        let id = self.edges.insert(edge);
        match self.head {
            // Appending at the tail is linking just before the head
            Some(head) => self.link_before(id, head),
            None => {
                if let Some(e) = self.edges.get_mut(id) {
                    e.prev = id;
                    e.next = id;
                }
                self.head = Some(id);
            }
        }
        self.register(id, v1, v2);
        id
    }

    /// Inserts an edge `v1 -> v2` before the edge at `pos`.
    ///
    /// If `pos` is the first edge, the new edge becomes the first.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is not in the list or a vertex handle is dead.
    pub fn insert_edge(
        &mut self,
        verts: &VertexStore,
        pos: EdgeId,
        v1: VertexId,
        v2: VertexId,
        marker: Option<i32>,
    ) -> EdgeId {
        assert!(self.contains(pos), "insert position is not in this list");
        let edge = Edge::new(v1, v2, &verts.position(v1), &verts.position(v2), marker);
        let id = self.edges.insert(edge);
        self.link_before(id, pos);
        if self.head == Some(pos) {
            self.head = Some(id);
        }
        self.register(id, v1, v2);
        id
    }

    /// Removes an edge in O(1) via its own handle.
    ///
    /// Returns the removed edge, or `None` if the handle was dead.
    pub fn remove(&mut self, id: EdgeId) -> Option<Edge> {
        if !self.edges.contains_key(id) {
            return None;
        }
        let (prev, next) = {
            let e = &self.edges[id];
            (e.prev, e.next)
        };
        if prev == id {
            // Last edge in the list
            self.head = None;
        } else {
            if let Some(p) = self.edges.get_mut(prev) {
                p.next = next;
            }
            if let Some(n) = self.edges.get_mut(next) {
                n.prev = prev;
            }
            if self.head == Some(id) {
                self.head = Some(next);
            }
        }
        let edge = self.edges.remove(id)?;
        self.unregister(id, edge.v1(), edge.v2());
        self.area.set(None);
        Some(edge)
    }

    /// Removes every edge.
    pub fn clear(&mut self) {
        self.edges.clear();
        self.adjacency.clear();
        self.head = None;
        self.area.set(None);
    }

    /// The unique edge connecting `va` and `vb` in either direction.
    #[must_use]
    pub fn get_edge(&self, va: VertexId, vb: VertexId) -> Option<EdgeId> {
        self.incident(va)
            .iter()
            .copied()
            .find(|&id| self.edges[id].other_vertex(va) == Some(vb))
    }

    /// The edge running exactly `va -> vb`.
    #[must_use]
    pub fn get_edge_directed(&self, va: VertexId, vb: VertexId) -> Option<EdgeId> {
        self.incident(va)
            .iter()
            .copied()
            .find(|&id| self.edges[id].v1() == va && self.edges[id].v2() == vb)
    }

    /// The first incident edge leaving `v` (`v1 == v`).
    #[must_use]
    pub fn edge_from(&self, v: VertexId) -> Option<EdgeId> {
        self.incident(v)
            .iter()
            .copied()
            .find(|&id| self.edges[id].v1() == v)
    }

    /// The first incident edge arriving at `v` (`v2 == v`).
    #[must_use]
    pub fn edge_to(&self, v: VertexId) -> Option<EdgeId> {
        self.incident(v)
            .iter()
            .copied()
            .find(|&id| self.edges[id].v2() == v)
    }

    /// Number of edges incident to `v` in this list.
    #[must_use]
    pub fn incidence(&self, v: VertexId) -> usize {
        self.incident(v).len()
    }

    /// Ring walk: the edge whose start is this edge's end.
    #[must_use]
    pub fn next_edge(&self, id: EdgeId) -> Option<EdgeId> {
        self.edge_from(self.get(id)?.v2())
    }

    /// Ring walk: the edge whose end is this edge's start.
    #[must_use]
    pub fn prev_edge(&self, id: EdgeId) -> Option<EdgeId> {
        self.edge_to(self.get(id)?.v1())
    }

    /// List order: the edge stored after `id` (cyclic).
    #[must_use]
    pub fn next_in_list(&self, id: EdgeId) -> Option<EdgeId> {
        self.get(id).map(|e| e.next)
    }

    /// Whether walking ring-order next edges from `a` reaches `b` without
    /// leaving the list.
    #[must_use]
    pub fn is_traversable(&self, a: EdgeId, b: EdgeId) -> bool {
        if !self.contains(a) || !self.contains(b) {
            return false;
        }
        let mut cur = a;
        for _ in 0..=self.len() {
            if cur == b {
                return true;
            }
            match self.next_edge(cur) {
                Some(next) => cur = next,
                None => return false,
            }
        }
        false
    }

    /// Iterates over the edges in list order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            cur: self.head,
            remaining: self.len(),
        }
    }

    /// The signed area enclosed by the edges (shoelace over directed
    /// segments), recomputed lazily after structural changes.
    ///
    /// For a front covering one or more counter-clockwise loops this is the
    /// remaining unmeshed area and must stay positive.
    #[must_use]
    pub fn area(&self, verts: &VertexStore) -> f64 {
        if let Some(cached) = self.area.get() {
            return cached;
        }
        let mut twice_area = 0.0;
        for (_, e) in self.iter() {
            let p: Point2<f64> = verts.position(e.v1());
            let q: Point2<f64> = verts.position(e.v2());
            twice_area += p.x * q.y - q.x * p.y;
        }
        let area = 0.5 * twice_area;
        self.area.set(Some(area));
        area
    }

    /// Re-threads the list in order of ascending (or descending) edge
    /// length.
    pub fn sort_by_length(&mut self, ascending: bool) {
        if self.len() < 2 {
            return;
        }
        let mut ids: Vec<EdgeId> = self.iter().map(|(id, _)| id).collect();
        ids.sort_by(|&a, &b| {
            let la = self.edges[a].length();
            let lb = self.edges[b].length();
            if ascending {
                la.total_cmp(&lb)
            } else {
                lb.total_cmp(&la)
            }
        });
        let n = ids.len();
        for (i, &id) in ids.iter().enumerate() {
            let prev = ids[(i + n - 1) % n];
            let next = ids[(i + 1) % n];
            if let Some(e) = self.edges.get_mut(id) {
                e.prev = prev;
                e.next = next;
            }
        }
        self.head = Some(ids[0]);
    }

    fn incident(&self, v: VertexId) -> &[EdgeId] {
        self.adjacency.get(&v).map(Vec::as_slice).unwrap_or_default()
    }

    fn link_before(&mut self, id: EdgeId, anchor: EdgeId) {
        let prev = self.edges[anchor].prev;
        if let Some(e) = self.edges.get_mut(id) {
            e.prev = prev;
            e.next = anchor;
        }
        if let Some(p) = self.edges.get_mut(prev) {
            p.next = id;
        }
        if let Some(a) = self.edges.get_mut(anchor) {
            a.prev = id;
        }
    }

    fn register(&mut self, id: EdgeId, v1: VertexId, v2: VertexId) {
        self.adjacency.entry(v1).or_default().push(id);
        self.adjacency.entry(v2).or_default().push(id);
        self.area.set(None);
    }

    fn unregister(&mut self, id: EdgeId, v1: VertexId, v2: VertexId) {
        for v in [v1, v2] {
            if let Some(ids) = self.adjacency.get_mut(&v) {
                ids.retain(|&other| other != id);
                if ids.is_empty() {
                    self.adjacency.remove(&v);
                }
            }
        }
    }
}

/// List-order iterator over an [`EdgeList`].
pub struct Iter<'a> {
    list: &'a EdgeList,
    cur: Option<EdgeId>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (EdgeId, &'a Edge);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.cur?;
        let edge = self.list.get(id)?;
        self.remaining -= 1;
        self.cur = Some(edge.next);
        Some((id, edge))
    }
}
