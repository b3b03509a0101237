//! Point-to-segment queries.

use crate::geom::EPS;
use crate::{Point, Vector};

/// Returns the segment parameter `t` in [0, 1] of the point on `a->b` closest to `p`.
///
/// A zero-length segment yields `t = 0`.
pub fn closest_parameter(p: Point, a: Point, b: Point) -> f64 {
    let d: Vector = b - a;
    let len_sq = d.dot(&d);
    if len_sq < EPS * EPS {
        return 0.0;
    }
    ((p - a).dot(&d) / len_sq).clamp(0.0, 1.0)
}

/// Projects `p` onto the segment `a->b` (clamped to the end points).
pub fn project_point_onto_segment(p: Point, a: Point, b: Point) -> Point {
    let t = closest_parameter(p, a, b);
    Point::new_between_2_points(a, b, t)
}

/// Shortest distance between `p` and the segment `a->b`.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    p.distance(&project_point_onto_segment(p, a, b))
}
