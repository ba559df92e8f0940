//! Uniform spatial hash grid over vertex positions.

use geom2d::Point2;
use hashbrown::HashMap;

use crate::vertex::VertexId;

/// A discrete 2D cell coordinate in grid space.
///
/// `i64` coordinates let the grid origin sit anywhere in world space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CellCoord {
    pub x: i64,
    pub y: i64,
}

/// Sparse uniform grid mapping cells to the vertices inside them.
///
/// Cells are allocated on demand, so the grid has no bounds and costs
/// nothing for empty regions.
#[derive(Debug)]
pub(crate) struct VertexGrid {
    cell_size: f64,
    cells: HashMap<CellCoord, Vec<VertexId>>,
    /// Bounds of all cells ever occupied; queries clamp to this range so an
    /// oversized radius cannot trigger a scan of empty space.
    occupied: Option<(CellCoord, CellCoord)>,
}

impl VertexGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            occupied: None,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cell_of(&self, p: &Point2<f64>) -> CellCoord {
        CellCoord {
            x: (p.x / self.cell_size).floor() as i64,
            y: (p.y / self.cell_size).floor() as i64,
        }
    }

    pub fn insert(&mut self, id: VertexId, p: &Point2<f64>) {
        let coord = self.cell_of(p);
        self.occupied = Some(match self.occupied {
            None => (coord, coord),
            Some((lo, hi)) => (
                CellCoord {
                    x: lo.x.min(coord.x),
                    y: lo.y.min(coord.y),
                },
                CellCoord {
                    x: hi.x.max(coord.x),
                    y: hi.y.max(coord.y),
                },
            ),
        });
        self.cells.entry(coord).or_default().push(id);
    }

    pub fn remove(&mut self, id: VertexId, p: &Point2<f64>) {
        let coord = self.cell_of(p);
        if let Some(ids) = self.cells.get_mut(&coord) {
            ids.retain(|&other| other != id);
            if ids.is_empty() {
                self.cells.remove(&coord);
            }
        }
    }

    /// All ids stored in cells overlapping the square envelope of the query
    /// circle. Callers filter by exact distance.
    pub fn ids_in_envelope(
        &self,
        center: &Point2<f64>,
        radius: f64,
    ) -> impl Iterator<Item = VertexId> + '_ {
        let mut lo = self.cell_of(&Point2::new(center.x - radius, center.y - radius));
        let mut hi = self.cell_of(&Point2::new(center.x + radius, center.y + radius));
        if let Some((occ_lo, occ_hi)) = self.occupied {
            lo = CellCoord {
                x: lo.x.max(occ_lo.x),
                y: lo.y.max(occ_lo.y),
            };
            hi = CellCoord {
                x: hi.x.min(occ_hi.x),
                y: hi.y.min(occ_hi.y),
            };
        } else {
            hi = lo;
        }
        (lo.x..=hi.x).flat_map(move |x| {
            (lo.y..=hi.y).flat_map(move |y| {
                self.cells
                    .get(&CellCoord { x, y })
                    .map(Vec::as_slice)
                    .unwrap_or_default()
                    .iter()
                    .copied()
            })
        })
    }
}
