//! Orientation, angle and intersection predicates.

use nalgebra::{Point2, Vector2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Orientation of an ordered vertex triple in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Orientation {
    /// Counter-clockwise (positive signed area).
    Ccw,
    /// Clockwise (negative signed area).
    Cw,
    /// Collinear within tolerance.
    Collinear,
}

/// Twice the signed area of the triangle `(a, b, c)`.
///
/// Positive for a counter-clockwise triple, negative for clockwise.
///
/// # Example
///
/// ```
/// use geom2d::{orient2d, Point2};
///
/// let a = Point2::new(0.0, 0.0);
/// let b = Point2::new(1.0, 0.0);
/// let c = Point2::new(1.0, 1.0);
/// assert!(orient2d(&a, &b, &c) > 0.0);
/// assert!(orient2d(&a, &c, &b) < 0.0);
/// ```
#[must_use]
pub fn orient2d(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b - a).perp(&(c - a))
}

/// Classifies the orientation of `(a, b, c)` against an area tolerance.
///
/// `tol` is compared against twice the signed area, so callers working at a
/// local length scale `rho` should pass a tolerance proportional to `rho²`.
#[must_use]
pub fn orientation(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>, tol: f64) -> Orientation {
    let det = orient2d(a, b, c);
    if det > tol {
        Orientation::Ccw
    } else if det < -tol {
        Orientation::Cw
    } else {
        Orientation::Collinear
    }
}

/// Checks whether `p` lies strictly left of the directed line `a -> b`.
#[must_use]
pub fn is_left(a: &Point2<f64>, b: &Point2<f64>, p: &Point2<f64>) -> bool {
    orient2d(a, b, p) > 0.0
}

/// Checks whether `p` lies left of or on the directed line `a -> b`.
#[must_use]
pub fn is_left_on(a: &Point2<f64>, b: &Point2<f64>, p: &Point2<f64>) -> bool {
    orient2d(a, b, p) >= 0.0
}

/// The unsigned angle between two vectors, in `[0, π]`.
///
/// Computed via `atan2` of the cross and dot products, which stays
/// well-conditioned for nearly parallel and nearly opposite vectors where
/// an `acos` formulation loses precision.
///
/// # Example
///
/// ```
/// use geom2d::{angle, Vector2};
///
/// let u = Vector2::new(1.0, 0.0);
/// let v = Vector2::new(0.0, 2.0);
/// assert!((angle(&u, &v) - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
/// ```
#[must_use]
pub fn angle(u: &Vector2<f64>, v: &Vector2<f64>) -> f64 {
    u.perp(v).abs().atan2(u.dot(v))
}

fn sign(x: f64, tol: f64) -> i8 {
    if x > tol {
        1
    } else if x < -tol {
        -1
    } else {
        0
    }
}

/// Parameter of `x` along the segment `p -> q`, assuming collinearity.
fn collinear_param(p: &Point2<f64>, q: &Point2<f64>, x: &Point2<f64>) -> f64 {
    let d = q - p;
    let len_sqr = d.norm_squared();
    if len_sqr == 0.0 {
        return 0.0;
    }
    (x - p).dot(&d) / len_sqr
}

/// Checks whether two segments intersect in their interiors.
///
/// Segments that merely touch at shared endpoints do not cross; an endpoint
/// of one segment lying in the interior of the other does, as does a
/// collinear overlap of positive length.
///
/// # Example
///
/// ```
/// use geom2d::{segments_cross, Point2};
///
/// let p = |x, y| Point2::new(x, y);
///
/// // Proper crossing
/// assert!(segments_cross(&p(0.0, 0.0), &p(1.0, 1.0), &p(0.0, 1.0), &p(1.0, 0.0)));
/// // Shared endpoint only
/// assert!(!segments_cross(&p(0.0, 0.0), &p(1.0, 0.0), &p(1.0, 0.0), &p(1.0, 1.0)));
/// ```
#[must_use]
pub fn segments_cross(
    a1: &Point2<f64>,
    a2: &Point2<f64>,
    b1: &Point2<f64>,
    b2: &Point2<f64>,
) -> bool {
    let la = (a2 - a1).norm();
    let lb = (b2 - b1).norm();
    let tol = 1e-12 * la * lb;

    let d1 = sign(orient2d(b1, b2, a1), tol);
    let d2 = sign(orient2d(b1, b2, a2), tol);
    let d3 = sign(orient2d(a1, a2, b1), tol);
    let d4 = sign(orient2d(a1, a2, b2), tol);

    // Proper crossing: each segment separates the other's endpoints
    if d1 * d2 < 0 && d3 * d4 < 0 {
        return true;
    }

    // Collinear configuration: test for overlap of positive length
    if d1 == 0 && d2 == 0 && d3 == 0 && d4 == 0 {
        let t1 = collinear_param(a1, a2, b1);
        let t2 = collinear_param(a1, a2, b2);
        let (lo, hi) = if t1 < t2 { (t1, t2) } else { (t2, t1) };
        let eps = 1e-9;
        return hi > eps && lo < 1.0 - eps && (hi.min(1.0) - lo.max(0.0)) > eps;
    }

    // An endpoint lying strictly inside the other segment
    let eps = 1e-9;
    let interior = |t: f64| t > eps && t < 1.0 - eps;
    (d1 == 0 && interior(collinear_param(b1, b2, a1)))
        || (d2 == 0 && interior(collinear_param(b1, b2, a2)))
        || (d3 == 0 && interior(collinear_param(a1, a2, b1)))
        || (d4 == 0 && interior(collinear_param(a1, a2, b2)))
}
