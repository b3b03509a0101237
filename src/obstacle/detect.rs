//! Panel-versus-obstacle intersection tests.
//!
//! Every test errs on the side of blocking: obstacles with missing or
//! non-finite geometry always intersect.

use super::{Dimensions, Obstacle};
use crate::Point;
use crate::Vector;
use crate::geom::bboxes::BoundingBox;
use crate::geom::projection::PlaneBasis;
use tracing::trace;

/// Clearance beside a roof window.
pub const WINDOW_SIDE_MARGIN: f64 = 0.10;
/// Clearance above (up-slope of) a roof window.
pub const WINDOW_TOP_MARGIN: f64 = 0.05;
/// Clearance below (down-slope of) a roof window.
pub const WINDOW_BOTTOM_MARGIN: f64 = 0.25;
/// Minimum length of the zone below a window kept free for its shadow.
pub const WINDOW_BASE_SHADOW: f64 = 0.3;
/// Extra clearance around chimneys and vents.
pub const ROUND_SAFETY_MARGIN: f64 = 0.15;
/// Panel thickness along its normal, meters.
pub const PANEL_THICKNESS: f64 = 0.04;
/// Extra vertical clearance when a panel is tested against a bounding box.
pub const PANEL_VERTICAL_TOLERANCE: f64 = 0.02;

/// Rectangle a candidate panel occupies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelFootprint {
    pub center: Point,
    pub width: f64,
    pub length: f64,
    /// Unit vector along the panel width.
    pub width_dir: Vector,
    /// Unit vector along the panel length.
    pub length_dir: Vector,
}

impl PanelFootprint {
    /// Footprint aligned with the world X (width) and Y (length) axes.
    pub fn new(center: Point, width: f64, length: f64) -> Self {
        Self {
            center,
            width,
            length,
            width_dir: Vector::new(1.0, 0.0, 0.0),
            length_dir: Vector::new(0.0, 1.0, 0.0),
        }
    }

    pub fn with_axes(mut self, width_dir: Vector, length_dir: Vector) -> Self {
        self.width_dir = width_dir;
        self.length_dir = length_dir;
        self
    }

    pub fn is_valid(&self) -> bool {
        self.center.is_finite()
            && self.width.is_finite()
            && self.length.is_finite()
            && self.width > 0.0
            && self.length > 0.0
    }

    /// Radius of the circle circumscribing the panel.
    pub fn radius(&self) -> f64 {
        self.width.hypot(self.length) / 2.0
    }

    /// Unit normal of the panel plane, pointing up.
    pub fn normal(&self) -> Vector {
        let n = self
            .width_dir
            .cross(&self.length_dir)
            .normalize()
            .unwrap_or(Vector::up());
        if n.dz < 0.0 { -n } else { n }
    }

    /// Axis-aligned box around the panel slab, grown by [`PANEL_VERTICAL_TOLERANCE`].
    ///
    /// On a pitched facet the box spans the full height difference between the
    /// lower and upper panel edge.
    pub fn bounds(&self) -> BoundingBox {
        let hw = self.width_dir * (self.width / 2.0);
        let hl = self.length_dir * (self.length / 2.0);
        let ht = self.normal() * (PANEL_THICKNESS / 2.0);
        let mut corners = Vec::with_capacity(8);
        for side in [-ht, ht] {
            corners.push(self.center - hw - hl + side);
            corners.push(self.center + hw - hl + side);
            corners.push(self.center + hw + hl + side);
            corners.push(self.center - hw + hl + side);
        }
        BoundingBox::from_points(&corners)
            .unwrap_or(BoundingBox::new(self.center, self.center))
            .with_vertical_tolerance(PANEL_VERTICAL_TOLERANCE)
    }
}

/// Returns true if the panel overlaps the obstacle or its clearance zone.
pub fn intersects(panel: &PanelFootprint, obstacle: &Obstacle) -> bool {
    if !panel.is_valid() || !obstacle.position().is_finite() {
        return true;
    }
    match obstacle {
        Obstacle::Window {
            position,
            normal,
            dimensions,
        } => window_intersects(panel, *position, *normal, dimensions),
        Obstacle::Chimney {
            position,
            dimensions,
        }
        | Obstacle::Vent {
            position,
            dimensions,
        } => round_intersects(panel, *position, dimensions),
        Obstacle::Generic { bounds, .. } => match bounds {
            Some(b) if b.is_valid() => panel.bounds().overlaps(b),
            _ => true,
        },
    }
}

/// Index of the first obstacle blocking the panel, if any.
pub fn first_blocking(panel: &PanelFootprint, obstacles: &[Obstacle]) -> Option<usize> {
    let hit = obstacles.iter().position(|o| intersects(panel, o));
    if let Some(i) = hit {
        trace!(
            obstacle = obstacles[i].kind_name(),
            x = panel.center.x,
            y = panel.center.y,
            "panel blocked"
        );
    }
    hit
}

/// Local frame of a window: `normal` out of the roof, `u` horizontal, `v` up the slope.
fn window_frame(normal: Vector) -> PlaneBasis {
    let n = if normal.is_finite() && normal.length() >= 1e-3 {
        normal
    } else {
        Vector::up()
    };
    PlaneBasis::from_normal(Point::origin(), n).unwrap_or(PlaneBasis {
        origin: Point::origin(),
        u: Vector::new(1.0, 0.0, 0.0),
        v: Vector::new(0.0, 1.0, 0.0),
        normal: Vector::up(),
    })
}

fn window_intersects(panel: &PanelFootprint, position: Point, normal: Vector, dims: &Dimensions) -> bool {
    if !dims.is_valid() {
        return true;
    }
    let frame = window_frame(normal);
    let rel = panel.center - position;
    let local_x = rel.dot(&frame.u);
    let local_y = rel.dot(&frame.v);

    let half_panel_w = panel.width / 2.0;
    let half_panel_l = panel.length / 2.0;

    // Steeper roofs throw a longer shadow from the window frame
    let roof_slope = frame.normal.dot(&Vector::up()).abs().clamp(0.0, 1.0).acos();
    let mut shadow_length = WINDOW_BASE_SHADOW;
    if roof_slope > 1e-3 {
        shadow_length = shadow_length.max(roof_slope.tan() * dims.height * 0.7);
        if roof_slope > 45_f64.to_radians() {
            shadow_length += 0.15;
        }
    }

    if local_y < 0.0 {
        let shadow_width = dims.width / 2.0 + WINDOW_SIDE_MARGIN * 0.7;
        if local_x.abs() <= shadow_width + half_panel_w && local_y.abs() <= shadow_length + half_panel_l {
            return true;
        }
    }

    let half_width = dims.width / 2.0 + WINDOW_SIDE_MARGIN;
    if local_x.abs() > half_width + half_panel_w {
        return false;
    }
    if local_y >= 0.0 {
        local_y <= dims.length / 2.0 + WINDOW_TOP_MARGIN + half_panel_l
    } else {
        local_y >= -(dims.length / 2.0 + WINDOW_BOTTOM_MARGIN) - half_panel_l
    }
}

fn round_intersects(panel: &PanelFootprint, position: Point, dims: &Dimensions) -> bool {
    if !dims.is_valid() {
        return true;
    }
    let distance = panel.center.horizontal_distance(&position);
    distance < panel.radius() + dims.radius() + ROUND_SAFETY_MARGIN
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel_at(x: f64, y: f64, z: f64) -> PanelFootprint {
        PanelFootprint::new(Point::new(x, y, z), 1.0, 1.6)
    }

    #[test]
    fn test_chimney_distance() {
        let chimney = Obstacle::chimney(Point::new(0.0, 0.0, 5.0));
        // panel radius ~0.943, chimney radius ~0.424, margin 0.15 -> ~1.517
        assert!(intersects(&panel_at(1.4, 0.0, 4.0), &chimney));
        assert!(!intersects(&panel_at(1.6, 0.0, 4.0), &chimney));
        // Height difference is ignored
        assert!(intersects(&panel_at(0.0, 0.0, -10.0), &chimney));
    }

    #[test]
    fn test_vent_uses_round_test() {
        let vent = Obstacle::vent(Point::origin());
        let reach = 1.0_f64.hypot(1.6) / 2.0 + 0.4_f64.hypot(0.4) / 2.0 + ROUND_SAFETY_MARGIN;
        assert!(intersects(&panel_at(reach - 0.01, 0.0, 0.0), &vent));
        assert!(!intersects(&panel_at(reach + 0.01, 0.0, 0.0), &vent));
    }

    #[test]
    fn test_generic_bbox() {
        let bbox = BoundingBox::from_center(Point::new(0.0, 0.0, 0.0), 0.2, 0.2, 0.2);
        let obstacle = Obstacle::generic(bbox);
        assert!(intersects(&panel_at(0.0, 0.0, 0.0), &obstacle));
        assert!(intersects(&panel_at(0.55, 0.0, 0.0), &obstacle));
        assert!(!intersects(&panel_at(0.65, 0.0, 0.0), &obstacle));
        // Flat panel 0.1 m above the box top: slab reaches down to 0.16
        assert!(!intersects(&panel_at(0.0, 0.0, 0.2), &obstacle));
        assert!(intersects(&panel_at(0.0, 0.0, 0.13), &obstacle));
    }

    #[test]
    fn test_generic_box_under_sloped_panel() {
        // Panel on a 36.87 degree slope rising toward +X, 5 cm above the roof
        let up_slope = Vector::new(0.8, 0.0, 0.6);
        let normal = Vector::new(-0.6, 0.0, 0.8);
        let surface = Point::new(2.0, 6.0, 1.5);
        let panel = PanelFootprint::new(surface + normal * 0.05, 1.0, 1.6)
            .with_axes(Vector::new(0.0, 1.0, 0.0), up_slope);
        assert!(panel.normal().is_close(&normal));

        let b = panel.bounds();
        assert!(b.max.z - b.min.z > 0.9, "panel spans {} m vertically", b.max.z - b.min.z);

        // 0.3 m tall box standing on the roof 0.6 m up-slope, under the upper half
        let base = surface + up_slope * 0.6;
        let under = BoundingBox::from_center(base + Vector::up() * 0.15, 0.2, 0.2, 0.3);
        assert!(intersects(&panel, &Obstacle::generic(under)));

        // Beyond the upper edge
        let base = surface + up_slope * 1.0;
        let beyond = BoundingBox::from_center(base + Vector::up() * 0.15, 0.2, 0.2, 0.3);
        assert!(!intersects(&panel, &Obstacle::generic(beyond)));
    }

    #[test]
    fn test_generic_rotated_panel() {
        let bbox = BoundingBox::from_center(Point::new(0.75, 0.0, 0.0), 0.1, 0.1, 0.1);
        let obstacle = Obstacle::generic(bbox);
        let aligned = panel_at(0.0, 0.0, 0.0);
        assert!(!intersects(&aligned, &obstacle));
        // Swap axes: the long side now runs along X
        let rotated = aligned.with_axes(Vector::new(0.0, 1.0, 0.0), Vector::new(1.0, 0.0, 0.0));
        assert!(intersects(&rotated, &obstacle));
    }

    #[test]
    fn test_malformed_is_blocking() {
        let unknown = Obstacle::Generic {
            position: Point::new(100.0, 100.0, 0.0),
            bounds: None,
        };
        assert!(intersects(&panel_at(0.0, 0.0, 0.0), &unknown));

        let nan_chimney = Obstacle::chimney(Point::new(f64::NAN, 0.0, 0.0));
        assert!(intersects(&panel_at(50.0, 0.0, 0.0), &nan_chimney));

        let bad_dims = Obstacle::chimney(Point::new(50.0, 50.0, 0.0)).with_dimensions(Dimensions::new(-1.0, 0.5, 1.0));
        assert!(intersects(&panel_at(0.0, 0.0, 0.0), &bad_dims));
    }

    #[test]
    fn test_window_on_flat_roof() {
        let window = Obstacle::window(Point::origin(), Vector::up());
        // Directly on the window
        assert!(intersects(&panel_at(0.0, 0.0, 0.0), &window));
        // Far to the side
        assert!(!intersects(&panel_at(2.0, 0.0, 0.0), &window));
        // Above: 0.9 + 0.05 + 0.8 = 1.75
        assert!(intersects(&panel_at(0.0, 1.7, 0.0), &window));
        assert!(!intersects(&panel_at(0.0, 1.8, 0.0), &window));
        // Below: 0.9 + 0.25 + 0.8 = 1.95
        assert!(intersects(&panel_at(0.0, -1.9, 0.0), &window));
        assert!(!intersects(&panel_at(0.0, -2.0, 0.0), &window));
    }

    #[test]
    fn test_window_shadow_grows_with_slope() {
        let slope = 60_f64.to_radians();
        // South-facing slope, up-slope runs toward +Y
        let normal = Vector::new(0.0, -slope.sin(), slope.cos());
        let window = Obstacle::window(Point::origin(), normal).with_dimensions(Dimensions::new(1.0, 1.0, 2.0));
        let y_axis = window_frame(normal).v;
        assert!(y_axis.dy > 0.0 && y_axis.dz > 0.0);

        // Shadow: tan(60) * 2 * 0.7 + 0.15 ~ 2.57, plus half panel 0.8
        let far_below = Point::origin() + y_axis * -3.2;
        assert!(intersects(&PanelFootprint::new(far_below, 1.0, 1.6), &window));
        let beyond = Point::origin() + y_axis * -3.5;
        assert!(!intersects(&PanelFootprint::new(beyond, 1.0, 1.6), &window));
    }

    #[test]
    fn test_first_blocking() {
        let obstacles = vec![
            Obstacle::chimney(Point::new(10.0, 10.0, 0.0)),
            Obstacle::chimney(Point::new(0.0, 0.0, 0.0)),
        ];
        assert_eq!(first_blocking(&panel_at(0.0, 0.0, 0.0), &obstacles), Some(1));
        assert_eq!(first_blocking(&panel_at(5.0, -5.0, 0.0), &obstacles), None);
        assert_eq!(first_blocking(&panel_at(5.0, -5.0, 0.0), &[]), None);
    }
}
