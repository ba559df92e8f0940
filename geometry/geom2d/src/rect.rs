//! Axis-aligned bounding rectangle.

use nalgebra::{Point2, Vector2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding rectangle in the plane.
///
/// # Example
///
/// ```
/// use geom2d::{Point2, Rect};
///
/// let rect = Rect::new(Point2::new(0.0, 0.0), Point2::new(2.0, 1.0));
/// assert!(rect.contains(&Point2::new(1.0, 0.5)));
/// assert!((rect.max_extent() - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    /// Minimum corner (inclusive).
    pub min: Point2<f64>,
    /// Maximum corner (inclusive).
    pub max: Point2<f64>,
}

impl Rect {
    /// Creates a rectangle from two corners.
    ///
    /// The corners are reordered so that `min` ≤ `max` on each axis.
    #[must_use]
    pub fn new(a: Point2<f64>, b: Point2<f64>) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Computes the bounding rectangle of a point set.
    ///
    /// Returns `None` for an empty iterator.
    ///
    /// # Example
    ///
    /// ```
    /// use geom2d::{Point2, Rect};
    ///
    /// let points = [Point2::new(1.0, 2.0), Point2::new(-1.0, 0.5)];
    /// let rect = Rect::from_points(points.iter().copied()).unwrap();
    /// assert!((rect.min.x + 1.0).abs() < 1e-12);
    /// assert!((rect.max.y - 2.0).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = Point2<f64>>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut rect = Self::new(first, first);
        for p in iter {
            rect.grow(&p);
        }
        Some(rect)
    }

    /// Expands the rectangle to contain a point.
    pub fn grow(&mut self, p: &Point2<f64>) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Returns the union of two rectangles.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Checks whether a point lies inside the rectangle (bounds inclusive).
    #[must_use]
    pub fn contains(&self, p: &Point2<f64>) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Returns the extents along both axes.
    #[must_use]
    pub fn extents(&self) -> Vector2<f64> {
        self.max - self.min
    }

    /// Returns the larger of the two extents.
    #[must_use]
    pub fn max_extent(&self) -> f64 {
        let e = self.extents();
        e.x.max(e.y)
    }

    /// Returns the center point.
    #[must_use]
    pub fn center(&self) -> Point2<f64> {
        nalgebra::center(&self.min, &self.max)
    }
}
