//! Inset placement boundaries for roof facets.
//!
//! Each facet is shrunk away from its edges before panels are tiled. The
//! horizontal inset is `max(edge_offset, h_fraction * base)` and the vertical
//! inset is `max(edge_offset, v_fraction * height)`. When that leaves no room
//! for a single panel the inset is relaxed to fit exactly one, but never below
//! [`MIN_INSET`].

use super::config::PanelConfig;
use super::facet::Facet;
use crate::Point;
use crate::Vector;
use crate::geom::projection::PlaneBasis;
use crate::roof::{FacetId, ShapeKind};
use anyhow::{Result, bail};
use serde::Serialize;
use tracing::{debug, warn};

/// Smallest inset ever applied when relaxing offsets, meters.
pub const MIN_INSET: f64 = 0.1;

/// Fractions of the facet size used as inset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsetRule {
    pub horizontal_fraction: f64,
    pub vertical_fraction: f64,
}

impl InsetRule {
    pub fn for_shape(shape: ShapeKind) -> Self {
        match shape {
            ShapeKind::Rectangle => Self {
                horizontal_fraction: 0.0,
                vertical_fraction: 0.0,
            },
            ShapeKind::Triangle => Self {
                horizontal_fraction: 0.15,
                vertical_fraction: 0.20,
            },
            ShapeKind::Trapezoid => Self {
                horizontal_fraction: 0.10,
                vertical_fraction: 0.10,
            },
        }
    }
}

/// Placement region of a facet, lifted above the roof surface.
///
/// Corner order: rectangles and trapezoids `[bottom_left, bottom_right,
/// top_right, top_left]`, triangles `[bottom_left, bottom_right, top]`.
/// A degenerate boundary has no corners and no frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Boundary {
    pub facet: FacetId,
    pub shape: ShapeKind,
    corners: Vec<Point>,
    #[serde(skip)]
    frame: Option<PlaneBasis>,
}

impl Boundary {
    fn new(facet: FacetId, shape: ShapeKind, corners: Vec<Point>, frame: PlaneBasis) -> Self {
        let origin = corners.first().copied().unwrap_or(frame.origin);
        Self {
            facet,
            shape,
            corners,
            frame: Some(PlaneBasis { origin, ..frame }),
        }
    }

    pub fn degenerate(facet: FacetId, shape: ShapeKind) -> Self {
        Self {
            facet,
            shape,
            corners: Vec::new(),
            frame: None,
        }
    }

    /// Rectangle spanned from `origin` along `frame.u` and `frame.v`.
    pub fn rectangle(facet: FacetId, frame: &PlaneBasis, origin: Point, width: f64, height: f64) -> Self {
        let (w, h) = (width.max(0.0), height.max(0.0));
        let corners = vec![
            origin,
            origin + frame.u * w,
            origin + frame.u * w + frame.v * h,
            origin + frame.v * h,
        ];
        Self::new(facet, ShapeKind::Rectangle, corners, *frame)
    }

    pub fn corners(&self) -> &[Point] {
        &self.corners
    }

    /// Frame with `origin` at the first corner.
    pub fn frame(&self) -> Option<&PlaneBasis> {
        self.frame.as_ref()
    }

    pub fn is_degenerate(&self) -> bool {
        self.frame.is_none() || self.corners.len() < self.shape.corner_count()
    }

    /// Extent along `u` at the bottom edge, meters.
    pub fn base_width(&self) -> f64 {
        match self.corners.as_slice() {
            [bl, br, ..] => bl.distance(br),
            _ => 0.0,
        }
    }

    /// Perpendicular extent along `v`, meters.
    pub fn height(&self) -> f64 {
        let Some(frame) = self.frame else {
            return 0.0;
        };
        self.corners
            .iter()
            .map(|p| frame.project(*p).1)
            .fold(0.0, f64::max)
    }

    /// Returns true if every corner moved less than `tol` compared to `other`.
    pub fn is_close_to(&self, other: &Self, tol: f64) -> bool {
        self.shape == other.shape
            && self.corners.len() == other.corners.len()
            && self
                .corners
                .iter()
                .zip(&other.corners)
                .all(|(a, b)| a.is_within(b, tol))
    }
}

/// Computes the inset placement boundary of a facet.
///
/// Fails when the facet has fewer points than its shape needs (at least 3).
/// Degenerate geometry yields a degenerate boundary instead of an error.
pub fn resolve_boundary(facet: &Facet, config: &PanelConfig) -> Result<Boundary> {
    let n = facet.points().len();
    if n < 3 {
        bail!("Facet '{}' needs at least 3 corner points, got {n}", facet.id);
    }
    if n < facet.shape.corner_count() {
        bail!(
            "Facet '{}' is a {:?} and needs {} corner points, got {n}",
            facet.id,
            facet.shape,
            facet.shape.corner_count()
        );
    }
    let Some(frame) = facet.frame() else {
        warn!(facet = %facet.id, "degenerate facet geometry, no placement possible");
        return Ok(Boundary::degenerate(facet.id.clone(), facet.shape));
    };

    let rule = InsetRule::for_shape(facet.shape);
    let boundary = match facet.shape {
        ShapeKind::Rectangle => resolve_rectangle(facet, frame, config, rule),
        ShapeKind::Triangle => resolve_triangle(facet, frame, config, rule),
        ShapeKind::Trapezoid => resolve_trapezoid(facet, frame, config, rule),
    };
    debug!(
        facet = %facet.id,
        shape = ?facet.shape,
        width = boundary.base_width(),
        height = boundary.height(),
        "resolved boundary"
    );
    Ok(boundary)
}

/// Largest share of the smaller flat-roof dimension used as edge offset.
pub const FLAT_EDGE_SHARE: f64 = 0.2;

/// Boundary of a flat-roof zone: `center` or one half of the roof.
///
/// North is the `+v` half of the facet frame and east the `+u` half. The
/// edge offset is capped at [`FLAT_EDGE_SHARE`] of the smaller roof dimension.
pub fn flat_zone_boundary(facet: &Facet, zone: &FacetId, config: &PanelConfig) -> Result<Boundary> {
    let n = facet.points().len();
    if n < 4 {
        bail!("Flat facet '{}' needs 4 corner points, got {n}", facet.id);
    }
    let Some(frame) = facet.frame() else {
        warn!(facet = %facet.id, zone = %zone, "degenerate flat roof, no placement possible");
        return Ok(Boundary::degenerate(zone.clone(), ShapeKind::Rectangle));
    };
    let pts = facet.points();
    let width = pts[0].distance(&pts[1]);
    let length = frame.project(pts[3]).1;
    let edge = config.edge_offset_m().min(FLAT_EDGE_SHARE * width.min(length));

    let (x0, y0, w, h) = match zone.as_str() {
        "center" => (0.0, 0.0, width, length),
        "north" => (0.0, length / 2.0, width, length / 2.0),
        "south" => (0.0, 0.0, width, length / 2.0),
        "east" => (width / 2.0, 0.0, width / 2.0, length),
        "west" => (0.0, 0.0, width / 2.0, length),
        other => bail!("Unknown flat roof zone '{other}'"),
    };
    let origin = frame.unproject(x0 + edge, y0 + edge) + lift(frame, config);
    Ok(Boundary::rectangle(zone.clone(), frame, origin, w - 2.0 * edge, h - 2.0 * edge))
}

/// Inset that leaves room for exactly one panel plus gaps on both sides.
fn relax_inset(inset: f64, extent: f64, panel: f64, gap: f64, insets_per_axis: f64) -> f64 {
    if extent - insets_per_axis * inset < panel + 2.0 * gap {
        MIN_INSET.max((extent - panel - 2.0 * gap) / insets_per_axis)
    } else {
        inset
    }
}

fn lift(frame: &PlaneBasis, config: &PanelConfig) -> Vector {
    frame.normal * config.height_above_surface_m()
}

fn resolve_rectangle(facet: &Facet, frame: &PlaneBasis, config: &PanelConfig, rule: InsetRule) -> Boundary {
    let pts = facet.points();
    let width = pts[0].distance(&pts[1]);
    let height = frame.project(pts[3]).1;
    let edge = config.edge_offset_m();
    let gap = config.gap_m();

    let h_off = edge.max(rule.horizontal_fraction * width);
    let v_off = edge.max(rule.vertical_fraction * height);
    let h_off = relax_inset(h_off, width, config.width_m(), gap, 2.0);
    let v_off = relax_inset(v_off, height, config.length_m(), gap, 2.0);

    let origin = pts[0] + frame.u * h_off + frame.v * v_off + lift(frame, config);
    Boundary::rectangle(facet.id.clone(), frame, origin, width - 2.0 * h_off, height - 2.0 * v_off)
}

fn resolve_triangle(facet: &Facet, frame: &PlaneBasis, config: &PanelConfig, rule: InsetRule) -> Boundary {
    let pts = facet.points();
    let (eave_left, eave_right, apex) = (pts[0], pts[1], pts[2]);
    let base = eave_left.distance(&eave_right);
    let height_vec = apex - Point::midpoint(eave_left, eave_right);
    let height = height_vec.dot(&frame.v);
    let Ok(height_dir) = height_vec.normalize() else {
        return Boundary::degenerate(facet.id.clone(), facet.shape);
    };
    let edge = config.edge_offset_m();
    let gap = config.gap_m();

    let mut h_off = edge.max(rule.horizontal_fraction * base);
    let mut v_off = edge.max(rule.vertical_fraction * height);
    if base - 2.0 * h_off < config.width_m() + 2.0 * gap {
        h_off = MIN_INSET.max((base - config.width_m() - 2.0 * gap) / 2.0);
    }
    if height - v_off - edge < config.length_m() + 2.0 * gap {
        v_off = MIN_INSET.max(height - config.length_m() - 2.0 * gap);
    }

    let up = lift(frame, config);
    let corners = vec![
        eave_left + frame.u * h_off + frame.v * edge + up,
        eave_right - frame.u * h_off + frame.v * edge + up,
        apex - height_dir * v_off + up,
    ];
    Boundary::new(facet.id.clone(), facet.shape, corners, *frame)
}

fn resolve_trapezoid(facet: &Facet, frame: &PlaneBasis, config: &PanelConfig, rule: InsetRule) -> Boundary {
    let pts = facet.points();
    let (eave_front, eave_back, ridge_back, ridge_front) = (pts[0], pts[1], pts[2], pts[3]);
    let eave_len = eave_front.distance(&eave_back);
    let ridge_len = ridge_front.distance(&ridge_back);
    let height = (Point::midpoint(ridge_back, ridge_front) - Point::midpoint(eave_front, eave_back)).dot(&frame.v);
    let ridge_dir = (ridge_back - ridge_front).normalize().unwrap_or(frame.u);
    let edge = config.edge_offset_m();
    let gap = config.gap_m();

    let eave_off = edge.max(rule.horizontal_fraction * eave_len);
    let eave_off = relax_inset(eave_off, eave_len, config.width_m(), gap, 2.0);
    let ridge_off = edge
        .max(rule.horizontal_fraction * ridge_len)
        .min(ridge_len / 2.0);
    let mut v_off = edge.max(rule.vertical_fraction * height);
    if height - v_off - edge < config.length_m() + 2.0 * gap {
        v_off = MIN_INSET.max(height - config.length_m() - 2.0 * gap);
    }

    let up = lift(frame, config);
    let corners = vec![
        eave_front + frame.u * eave_off + frame.v * edge + up,
        eave_back - frame.u * eave_off + frame.v * edge + up,
        ridge_back - ridge_dir * ridge_off - frame.v * v_off + up,
        ridge_front + ridge_dir * ridge_off - frame.v * v_off + up,
    ];
    Boundary::new(facet.id.clone(), facet.shape, corners, *frame)
}
