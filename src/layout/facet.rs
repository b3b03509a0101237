use crate::Point;
use crate::Vector;
use crate::geom::EPS;
use crate::geom::projection::PlaneBasis;
use crate::geom::segment::distance_to_segment;
use crate::roof::{FacetId, ShapeKind};
use serde::Serialize;

/// Points this close to a facet edge count as lying on the facet, meters.
pub const EDGE_TOLERANCE: f64 = 0.05;

/// One planar roof surface that can host panels.
///
/// Facets are values: when the roof changes a new facet replaces the old one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Facet {
    pub id: FacetId,
    pub shape: ShapeKind,
    points: Vec<Point>,
    #[serde(skip)]
    frame: Option<PlaneBasis>,
}

impl Facet {
    /// Creates a facet from its corner points in world meters.
    ///
    /// Point order depends on the shape, see [`ShapeKind`]. The surface frame
    /// is derived here; it is `None` for degenerate input.
    pub fn new(id: impl Into<FacetId>, shape: ShapeKind, points: Vec<Point>) -> Self {
        let frame = derive_frame(shape, &points);
        Self {
            id: id.into(),
            shape,
            points,
            frame,
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Surface frame: `u` along the eave, `v` up the slope, upward normal.
    pub fn frame(&self) -> Option<&PlaneBasis> {
        self.frame.as_ref()
    }

    pub fn normal(&self) -> Option<Vector> {
        self.frame.map(|f| f.normal)
    }

    pub fn is_degenerate(&self) -> bool {
        self.frame.is_none()
    }

    /// Inclination from horizontal in degrees.
    pub fn slope_degrees(&self) -> Option<f64> {
        self.frame.map(|f| f.slope_degrees())
    }

    /// Compass direction the facet faces; `None` for horizontal or degenerate facets.
    pub fn facing_azimuth(&self) -> Option<f64> {
        self.frame.and_then(|f| f.facing_azimuth())
    }

    /// Surface area of the polygon spanned by the points.
    pub fn area(&self) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }
        let mut sum = Vector::zero();
        for (i, p) in self.points.iter().enumerate() {
            let q = self.points[(i + 1) % self.points.len()];
            sum = sum + Vector::from_a_point(*p).cross(&Vector::from_a_point(q));
        }
        sum.length() / 2.0
    }

    /// Returns true if `p`, projected along the facet normal, falls inside the facet
    /// or within [`EDGE_TOLERANCE`] of its outline.
    ///
    /// Facets are convex, so an inside point lies on the same side of every edge.
    pub fn covers(&self, p: Point) -> bool {
        let Some(frame) = self.frame else {
            return false;
        };
        let local: Vec<(f64, f64)> = self.points.iter().map(|q| frame.project(*q)).collect();
        let (px, py) = frame.project(p);
        let mut sign = 0.0;
        for (i, a) in local.iter().enumerate() {
            let b = local[(i + 1) % local.len()];
            let cross = (b.0 - a.0) * (py - a.1) - (b.1 - a.1) * (px - a.0);
            if cross.abs() < EPS {
                continue;
            }
            if sign == 0.0 {
                sign = cross.signum();
            } else if cross.signum() != sign {
                return self.edge_distance(p).is_some_and(|d| d <= EDGE_TOLERANCE);
            }
        }
        true
    }

    /// Distance of `p` from the facet plane, along the normal.
    pub fn plane_distance(&self, p: Point) -> Option<f64> {
        self.frame.map(|frame| frame.elevation(p).abs())
    }

    /// In-plane distance from `p` (projected along the normal) to the nearest facet edge.
    pub fn edge_distance(&self, p: Point) -> Option<f64> {
        let frame = self.frame?;
        let (x, y) = frame.project(p);
        let on_plane = frame.unproject(x, y);
        let n = self.points.len();
        self.points
            .iter()
            .enumerate()
            .map(|(i, a)| distance_to_segment(on_plane, *a, self.points[(i + 1) % n]))
            .min_by(f64::total_cmp)
    }
}

fn derive_frame(shape: ShapeKind, pts: &[Point]) -> Option<PlaneBasis> {
    if pts.len() < shape.corner_count() || pts.iter().any(|p| !p.is_finite()) {
        return None;
    }
    let origin = pts[0];
    let width_edge = pts[1] - pts[0];
    let height_edge = match shape {
        ShapeKind::Triangle => pts[2] - Point::midpoint(pts[0], pts[1]),
        ShapeKind::Rectangle => pts[3] - pts[0],
        ShapeKind::Trapezoid => Point::midpoint(pts[2], pts[3]) - Point::midpoint(pts[0], pts[1]),
    };
    PlaneBasis::from_edges(origin, width_edge, height_edge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::vector::check::is_orthonormal_frame;

    #[test]
    fn test_rectangle_frame() {
        let facet = Facet::new(
            "center",
            ShapeKind::Rectangle,
            vec![
                Point::new(0., 0., 3.),
                Point::new(10., 0., 3.),
                Point::new(10., 8., 3.),
                Point::new(0., 8., 3.),
            ],
        );
        let f = facet.frame().unwrap();
        assert!(f.normal.is_close(&Vector::up()));
        assert!(is_orthonormal_frame(&f.u, &f.v, &f.normal, 1e-9));
        assert!((facet.area() - 80.0).abs() < 1e-9);
        assert!(facet.slope_degrees().unwrap().abs() < 1e-9);
        assert!(facet.facing_azimuth().is_none());
    }

    #[test]
    fn test_triangle_frame_points_up() {
        // Listed clockwise from above, normal still ends up pointing up
        let facet = Facet::new(
            "front",
            ShapeKind::Triangle,
            vec![Point::new(10., 0., 0.), Point::new(0., 0., 0.), Point::new(5., 3., 2.)],
        );
        let f = facet.frame().unwrap();
        assert!(f.normal.dz > 0.0);
        // Faces south (-Y)
        let az = facet.facing_azimuth().unwrap();
        assert!((az - 180.0).abs() < 1e-6, "azimuth {az}");
    }

    #[test]
    fn test_covers() {
        let facet = Facet::new(
            "front",
            ShapeKind::Triangle,
            vec![Point::new(0., 0., 0.), Point::new(10., 0., 0.), Point::new(5., 5., 5.)],
        );
        // Distance along the normal does not matter
        let on_surface = Point::new(5., 2., 2.);
        assert!(facet.covers(on_surface));
        assert!(facet.covers(on_surface + facet.normal().unwrap() * 3.0));
        assert!(facet.covers(Point::new(5., 0., 0.)));
        assert!(!facet.covers(Point::new(1., 4., 4.)));
        assert!(!facet.covers(Point::new(5., -1., 0.)));
        // Just outside the eave still counts
        assert!(facet.covers(Point::new(5., -0.02, 0.)));
        assert!((facet.edge_distance(Point::new(5., 1., 1.)).unwrap() - 2_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate() {
        let collinear = Facet::new(
            "x",
            ShapeKind::Triangle,
            vec![Point::new(0., 0., 0.), Point::new(1., 0., 0.), Point::new(2., 0., 0.)],
        );
        assert!(collinear.is_degenerate());
        let short = Facet::new("y", ShapeKind::Rectangle, vec![Point::origin(); 2]);
        assert!(short.is_degenerate());
        assert_eq!(short.area(), 0.0);
    }
}
