//! Fills placement boundaries with panels.
//!
//! Rectangles get a centered grid. Triangles and trapezoids are filled row by
//! row from the eave upward, each row limited by the slanted side edges.

use super::boundary::Boundary;
use super::config::PanelConfig;
use crate::Point;
use crate::Vector;
use crate::geom::projection::PlaneBasis;
use crate::geom::rotation::rotate_vector;
use crate::geom::vector::check::is_orthonormal_frame;
use crate::obstacle::{Obstacle, PanelFootprint, first_blocking};
use crate::roof::ShapeKind;
use anyhow::{Result, ensure};
use serde::Serialize;
use tracing::{debug, warn};

/// Boundaries flatter than this (degrees) count as flat roofs and accept panel tilt.
pub const FLAT_SLOPE_LIMIT: f64 = 1.0;
/// Tilt below this (degrees) is ignored.
pub const MIN_TILT: f64 = 0.1;

/// Pose of one rectangular panel.
///
/// `width_dir`, `length_dir` and `normal` are mutually orthogonal unit vectors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PanelPlacement {
    pub center: Point,
    pub width_dir: Vector,
    pub length_dir: Vector,
    pub normal: Vector,
    /// Panel width in meters.
    pub width: f64,
    /// Panel length in meters.
    pub length: f64,
}

impl PanelPlacement {
    /// Corners in the order bottom-left, bottom-right, top-right, top-left.
    pub fn corners(&self) -> [Point; 4] {
        let hw = self.width_dir * (self.width / 2.0);
        let hl = self.length_dir * (self.length / 2.0);
        [
            self.center - hw - hl,
            self.center + hw - hl,
            self.center + hw + hl,
            self.center - hw + hl,
        ]
    }

    pub fn footprint(&self) -> PanelFootprint {
        PanelFootprint::new(self.center, self.width, self.length).with_axes(self.width_dir, self.length_dir)
    }
}

/// Accepted placements and the number of candidates rejected by obstacles.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TilingResult {
    pub placements: Vec<PanelPlacement>,
    pub skipped: u32,
}

impl TilingResult {
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

/// Row pitch multiplier for tilted panels on flat roofs.
pub fn row_spacing_factor(tilt_deg: f64) -> f64 {
    if tilt_deg <= 5.0 {
        1.0
    } else if tilt_deg <= 10.0 {
        1.2
    } else if tilt_deg <= 20.0 {
        1.5
    } else if tilt_deg <= 30.0 {
        2.0
    } else {
        2.5
    }
}

/// Number of panels of size `panel` that fit in `avail` with center distance `pitch`.
fn fit_count(avail: f64, panel: f64, pitch: f64) -> usize {
    if avail + 1e-9 < panel || pitch <= 0.0 {
        return 0;
    }
    ((avail - panel) / pitch + 1e-9).floor() as usize + 1
}

/// Offset of the first panel center so that `n` panels are centered in `avail`.
fn centered_start(avail: f64, panel: f64, pitch: f64, n: usize) -> f64 {
    let span = (n.saturating_sub(1)) as f64 * pitch + panel;
    (avail - span) / 2.0 + panel / 2.0
}

/// Tilt applied to every panel on a flat roof.
#[derive(Debug, Clone, Copy)]
struct Tilt {
    /// Unit rotation axis in the roof plane.
    axis: Vector,
    /// Signed rotation angle, radians.
    angle: f64,
    /// True when panels tilt about the width axis (rows run along `u`).
    about_width: bool,
}

impl Tilt {
    /// Tilt that turns the panel normal toward the configured compass orientation.
    fn for_frame(frame: &PlaneBasis, config: &PanelConfig) -> Option<Self> {
        let tilt = config.tilt();
        if tilt < MIN_TILT || frame.slope_degrees() > FLAT_SLOPE_LIMIT {
            return None;
        }
        let az = config.orientation_deg.to_radians();
        let facing = Vector::new(az.sin(), az.cos(), 0.0);
        let along_u = facing.dot(&frame.u);
        let along_v = facing.dot(&frame.v);

        let about_width = along_v.abs() >= along_u.abs();
        let axis = if about_width { frame.u } else { frame.v };
        // Rotating the normal about `axis` by +angle moves it toward `axis x normal`
        let swing = axis.cross(&frame.normal);
        let sign = if swing.dot(&facing) >= 0.0 { 1.0 } else { -1.0 };
        Some(Self {
            axis,
            angle: sign * tilt.to_radians(),
            about_width,
        })
    }

    fn row_factor(&self) -> f64 {
        row_spacing_factor(self.angle.abs().to_degrees())
    }

    /// Rotates the panel axes and raises the center so the low edge stays on the mount.
    fn apply(&self, placement: &mut PanelPlacement) -> Result<()> {
        let width_dir = rotate_vector(&placement.width_dir, &self.axis, self.angle)?;
        let length_dir = rotate_vector(&placement.length_dir, &self.axis, self.angle)?;
        let normal = rotate_vector(&placement.normal, &self.axis, self.angle)?;
        ensure!(
            is_orthonormal_frame(&width_dir, &length_dir, &normal, 1e-6),
            "tilted panel axes are not orthonormal"
        );
        let lift_extent = if self.about_width {
            placement.length
        } else {
            placement.width
        };
        placement.center = placement.center + placement.normal * (lift_extent * self.angle.abs().sin() / 2.0);
        placement.width_dir = width_dir;
        placement.length_dir = length_dir;
        placement.normal = normal;
        Ok(())
    }
}

/// Fills a boundary with panels, skipping candidates that hit an obstacle.
///
/// Never fails: degenerate or too small boundaries yield an empty result.
pub fn tile(boundary: &Boundary, config: &PanelConfig, obstacles: &[Obstacle]) -> TilingResult {
    let frame = match boundary.frame() {
        Some(frame) if !boundary.is_degenerate() => *frame,
        _ => {
            warn!(facet = %boundary.facet, "degenerate boundary, no panels placed");
            return TilingResult::default();
        }
    };

    let mut tiler = Tiler {
        frame,
        config,
        obstacles,
        tilt: Tilt::for_frame(&frame, config),
        result: TilingResult::default(),
    };
    match boundary.shape {
        ShapeKind::Rectangle => tiler.fill_rectangle(boundary),
        ShapeKind::Triangle => tiler.fill_rows(boundary, RowRule::triangle()),
        ShapeKind::Trapezoid => tiler.fill_rows(boundary, RowRule::trapezoid()),
    }

    let result = tiler.result;
    debug!(
        facet = %boundary.facet,
        shape = ?boundary.shape,
        placed = result.placements.len(),
        skipped = result.skipped,
        "tiled facet"
    );
    result
}

/// Row layout parameters for the slanted shapes.
#[derive(Debug, Clone, Copy)]
struct RowRule {
    /// Distance of the first row from the bottom edge, in gaps.
    first_row_gaps: f64,
    /// Side inset in gaps, before any growth.
    side_inset_gaps: f64,
    /// Side inset grows by one gap from the first to the last row.
    growing_inset: bool,
}

impl RowRule {
    fn triangle() -> Self {
        Self {
            first_row_gaps: 0.5,
            side_inset_gaps: 1.0,
            growing_inset: true,
        }
    }

    fn trapezoid() -> Self {
        Self {
            first_row_gaps: 1.0,
            side_inset_gaps: 1.5,
            growing_inset: false,
        }
    }

    fn side_inset(&self, gap: f64, row: usize, rows: usize) -> f64 {
        if self.growing_inset {
            gap * (self.side_inset_gaps + row as f64 / rows.saturating_sub(1).max(1) as f64)
        } else {
            gap * self.side_inset_gaps
        }
    }
}

struct Tiler<'a> {
    frame: PlaneBasis,
    config: &'a PanelConfig,
    obstacles: &'a [Obstacle],
    tilt: Option<Tilt>,
    result: TilingResult,
}

impl Tiler<'_> {
    /// Tests a candidate at local (x, y) and stores it unless blocked.
    fn try_place(&mut self, x: f64, y: f64) {
        let mut placement = PanelPlacement {
            center: self.frame.unproject(x, y),
            width_dir: self.frame.u,
            length_dir: self.frame.v,
            normal: self.frame.normal,
            width: self.config.width_m(),
            length: self.config.length_m(),
        };
        if first_blocking(&placement.footprint(), self.obstacles).is_some() {
            self.result.skipped += 1;
            return;
        }
        if let Some(tilt) = self.tilt {
            if let Err(e) = tilt.apply(&mut placement) {
                warn!(error = %e, "panel tilt failed, keeping panel flat");
            }
        }
        self.result.placements.push(placement);
    }

    fn pitches(&self) -> (f64, f64) {
        let gap = self.config.gap_m();
        let mut pitch_u = self.config.width_m() + gap;
        let mut pitch_v = self.config.length_m() + gap;
        if let Some(tilt) = self.tilt {
            if tilt.about_width {
                pitch_v *= tilt.row_factor();
            } else {
                pitch_u *= tilt.row_factor();
            }
        }
        (pitch_u, pitch_v)
    }

    fn fill_rectangle(&mut self, boundary: &Boundary) {
        let (pw, pl) = (self.config.width_m(), self.config.length_m());
        let avail_w = boundary.base_width();
        let avail_h = boundary.height();
        let (pitch_u, pitch_v) = self.pitches();

        let n_u = fit_count(avail_w, pw, pitch_u);
        let n_v = fit_count(avail_h, pl, pitch_v);
        if n_u == 0 || n_v == 0 {
            return;
        }
        let x0 = centered_start(avail_w, pw, pitch_u, n_u);
        let y0 = centered_start(avail_h, pl, pitch_v, n_v);
        for j in 0..n_v {
            for i in 0..n_u {
                self.try_place(x0 + i as f64 * pitch_u, y0 + j as f64 * pitch_v);
            }
        }
    }

    fn fill_rows(&mut self, boundary: &Boundary, rule: RowRule) {
        let (pw, pl) = (self.config.width_m(), self.config.length_m());
        let gap = self.config.gap_m();
        let (pitch_u, pitch_v) = self.pitches();

        let local: Vec<(f64, f64)> = boundary.corners().iter().map(|p| self.frame.project(*p)).collect();
        let (left, right) = match local.as_slice() {
            [bl, br, top] => (Edge::new(*bl, *top), Edge::new(*br, *top)),
            [bl, br, tr, tl] => (Edge::new(*bl, *tl), Edge::new(*br, *tr)),
            _ => return,
        };
        let bottom = left.start.1.max(right.start.1);
        let top = left.end.1.min(right.end.1);
        let height = top - bottom;
        if height <= 0.0 {
            return;
        }

        let first = rule.first_row_gaps * gap;
        let rows = fit_count(height - first, pl, pitch_v).max(1);
        for row in 0..rows {
            let y_low = bottom + first + row as f64 * pitch_v;
            let y_high = y_low + pl;
            if y_high > top + 1e-9 {
                break;
            }
            let x_min = left.x_at(y_low).max(left.x_at(y_high));
            let x_max = right.x_at(y_low).min(right.x_at(y_high));
            let inset = rule.side_inset(gap, row, rows);
            let usable = (x_max - x_min - 2.0 * inset).max(0.0);
            let n = fit_count(usable, pw, pitch_u);
            let x0 = x_min + inset + centered_start(usable, pw, pitch_u, n);
            for col in 0..n {
                self.try_place(x0 + col as f64 * pitch_u, y_low + pl / 2.0);
            }
        }
    }
}

/// Boundary side in local (u, v) coordinates, from bottom to top.
#[derive(Debug, Clone, Copy)]
struct Edge {
    start: (f64, f64),
    end: (f64, f64),
}

impl Edge {
    fn new(start: (f64, f64), end: (f64, f64)) -> Self {
        Self { start, end }
    }

    /// Horizontal coordinate of the edge at height `y`.
    fn x_at(&self, y: f64) -> f64 {
        let dy = self.end.1 - self.start.1;
        if dy.abs() < 1e-12 {
            return self.start.0;
        }
        let t = ((y - self.start.1) / dy).clamp(0.0, 1.0);
        self.start.0 + t * (self.end.0 - self.start.0)
    }
}
