//! 2D geometric primitives and predicates for planar meshing.
//!
//! This crate provides the low-level geometry that mesh generation is built
//! on:
//!
//! - [`Rect`] - Axis-aligned bounding rectangle
//! - [`orient2d`] / [`orientation`] - Signed-area orientation predicate
//! - [`is_left`] / [`angle`] - Half-plane and angle queries
//! - [`segments_cross`] - Segment interior intersection test
//! - Triangle and quad quality metrics for element ranking
//!
//! # Coordinate System
//!
//! All coordinates are `f64` in a right-handed plane: positive orientation
//! is counter-clockwise, and the left normal of a direction `(x, y)` is
//! `(-y, x)`.
//!
//! # Example
//!
//! ```
//! use geom2d::{orient2d, triangle_area, Point2};
//!
//! let a = Point2::new(0.0, 0.0);
//! let b = Point2::new(1.0, 0.0);
//! let c = Point2::new(0.0, 1.0);
//!
//! // Counter-clockwise triple: positive orientation and area.
//! assert!(orient2d(&a, &b, &c) > 0.0);
//! assert!((triangle_area(&a, &b, &c) - 0.5).abs() < 1e-12);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod metrics;
mod predicates;
mod rect;

pub use metrics::{
    polygon_signed_area, quad_area, triangle_area, triangle_min_angle, triangle_quality,
    triangle_shape_quality,
};
pub use predicates::{
    angle, is_left, is_left_on, orient2d, orientation, segments_cross, Orientation,
};
pub use rect::Rect;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Vector2};
