//! Element area and quality metrics.

use nalgebra::Point2;

use crate::predicates::orient2d;

/// Signed area of the triangle `(a, b, c)`.
///
/// Positive for counter-clockwise winding.
#[must_use]
pub fn triangle_area(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    0.5 * orient2d(a, b, c)
}

/// Signed area of the quadrilateral `(a, b, c, d)` by the shoelace formula.
///
/// Positive for counter-clockwise winding; valid for any simple quad.
#[must_use]
pub fn quad_area(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>, d: &Point2<f64>) -> f64 {
    polygon_signed_area(&[*a, *b, *c, *d])
}

/// Signed area of a simple closed polygon (shoelace formula).
///
/// The polygon is implicitly closed from the last point back to the first.
#[must_use]
pub fn polygon_signed_area(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0;
    for i in 0..n {
        let p = &points[i];
        let q = &points[(i + 1) % n];
        twice_area += p.x * q.y - q.x * p.y;
    }
    0.5 * twice_area
}

/// Shape quality of a triangle, in `[0, 1]`.
///
/// Defined as `4√3·A / (l₁² + l₂² + l₃²)`: exactly 1 for an equilateral
/// triangle, approaching 0 for degenerate slivers, negative for inverted
/// (clockwise) triangles.
///
/// # Example
///
/// ```
/// use geom2d::{triangle_shape_quality, Point2};
///
/// let a = Point2::new(0.0, 0.0);
/// let b = Point2::new(1.0, 0.0);
/// let c = Point2::new(0.5, 3.0_f64.sqrt() / 2.0);
/// assert!((triangle_shape_quality(&a, &b, &c) - 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn triangle_shape_quality(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    let l_sqr = (b - a).norm_squared() + (c - b).norm_squared() + (a - c).norm_squared();
    if l_sqr == 0.0 {
        return 0.0;
    }
    4.0 * 3.0_f64.sqrt() * triangle_area(a, b, c) / l_sqr
}

/// Size-matched quality of a triangle against a target edge length `rho`.
///
/// The shape quality is damped by `min(1, ρ/l_max)·min(1, l_min/ρ)`, so a
/// perfectly shaped triangle still ranks poorly when its edges deviate from
/// the requested local size. Used to rank competing apex candidates.
#[must_use]
pub fn triangle_quality(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>, rho: f64) -> f64 {
    let l1 = (b - a).norm();
    let l2 = (c - b).norm();
    let l3 = (a - c).norm();
    let l_max = l1.max(l2).max(l3);
    let l_min = l1.min(l2).min(l3);
    if l_max == 0.0 || rho <= 0.0 {
        return 0.0;
    }
    let size = (rho / l_max).min(1.0) * (l_min / rho).min(1.0);
    triangle_shape_quality(a, b, c) * size
}

/// The smallest interior angle of the triangle `(a, b, c)`, in radians.
#[must_use]
pub fn triangle_min_angle(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    let ang_a = crate::angle(&(b - a), &(c - a));
    let ang_b = crate::angle(&(c - b), &(a - b));
    let ang_c = crate::angle(&(a - c), &(b - c));
    ang_a.min(ang_b).min(ang_c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_4;

    fn p(x: f64, y: f64) -> Point2<f64> {
        Point2::new(x, y)
    }

    #[test]
    fn signed_areas() {
        let a = p(0.0, 0.0);
        let b = p(1.0, 0.0);
        let c = p(1.0, 1.0);
        let d = p(0.0, 1.0);
        assert_relative_eq!(triangle_area(&a, &b, &c), 0.5);
        assert_relative_eq!(triangle_area(&a, &c, &b), -0.5);
        assert_relative_eq!(quad_area(&a, &b, &c, &d), 1.0);
        assert_relative_eq!(quad_area(&d, &c, &b, &a), -1.0);
    }

    #[test]
    fn polygon_area_matches_shoelace() {
        // L-shaped hexagon of area 3
        let pts = [
            p(0.0, 0.0),
            p(2.0, 0.0),
            p(2.0, 1.0),
            p(1.0, 1.0),
            p(1.0, 2.0),
            p(0.0, 2.0),
        ];
        assert_relative_eq!(polygon_signed_area(&pts), 3.0);
    }

    #[test]
    fn degenerate_polygon_is_zero() {
        assert_relative_eq!(polygon_signed_area(&[p(0.0, 0.0), p(1.0, 0.0)]), 0.0);
    }

    #[test]
    fn sliver_has_low_quality() {
        let q = triangle_shape_quality(&p(0.0, 0.0), &p(1.0, 0.0), &p(0.5, 1e-6));
        assert!(q > 0.0 && q < 1e-4);
    }

    #[test]
    fn size_match_penalizes_scale() {
        let a = p(0.0, 0.0);
        let b = p(1.0, 0.0);
        let c = p(0.5, 3.0_f64.sqrt() / 2.0);
        // Edges of length 1 match rho = 1 perfectly
        assert_relative_eq!(triangle_quality(&a, &b, &c, 1.0), 1.0);
        // Same shape, but twice too large for rho = 0.5
        let q = triangle_quality(&a, &b, &c, 0.5);
        assert!(q < 0.6);
    }

    #[test]
    fn min_angle_right_isoceles() {
        let ang = triangle_min_angle(&p(0.0, 0.0), &p(1.0, 0.0), &p(0.0, 1.0));
        assert_relative_eq!(ang, FRAC_PI_4, epsilon = 1e-12);
    }
}
