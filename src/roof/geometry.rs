use super::{RoofKind, RoofPolicy, ShapeKind};
use crate::Point;
use crate::layout::facet::Facet;
use anyhow::{Result, ensure};

/// Hip ridge ends sit at these fractions of the building length.
pub const HIP_RIDGE_START: f64 = 0.25;
pub const HIP_RIDGE_END: f64 = 0.75;

/// Reference roof built from a rectangular footprint.
///
/// The footprint spans `x` in `[0, width]` and `y` in `[0, length]` with the
/// eaves at `eave_height`. North is +Y, so the "front" side faces south.
#[derive(Debug, Clone)]
pub struct RoofGeometry {
    pub kind: RoofKind,
    pub width: f64,
    pub length: f64,
    /// Ridge (or apex) height above the eaves. Ignored for flat roofs.
    pub ridge_height: f64,
    pub eave_height: f64,
    facets: Vec<Facet>,
}

impl RoofGeometry {
    pub fn new(kind: RoofKind, width: f64, length: f64, ridge_height: f64) -> Result<Self> {
        Self::with_eave_height(kind, width, length, ridge_height, 0.0)
    }

    pub fn with_eave_height(
        kind: RoofKind,
        width: f64,
        length: f64,
        ridge_height: f64,
        eave_height: f64,
    ) -> Result<Self> {
        ensure!(
            width.is_finite() && width > 0.0 && length.is_finite() && length > 0.0,
            "Footprint must be positive, got {width} x {length}"
        );
        ensure!(
            ridge_height.is_finite() && ridge_height >= 0.0 && eave_height.is_finite(),
            "Invalid roof heights: ridge {ridge_height}, eave {eave_height}"
        );
        let mut roof = Self {
            kind,
            width,
            length,
            ridge_height: if kind == RoofKind::Flat { 0.0 } else { ridge_height },
            eave_height,
            facets: Vec::new(),
        };
        roof.facets = roof.build_facets();
        Ok(roof)
    }

    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    pub fn facet(&self, id: &str) -> Option<&Facet> {
        let id = id.to_lowercase();
        self.facets.iter().find(|f| f.id.as_str() == id)
    }

    /// Pitch of the long sides, degrees.
    pub fn slope_degrees(&self) -> f64 {
        if self.kind == RoofKind::Flat {
            return 0.0;
        }
        self.ridge_height.atan2(self.width / 2.0).to_degrees()
    }

    /// Horizontal footprint area.
    pub fn footprint_area(&self) -> f64 {
        self.width * self.length
    }

    fn corner(&self, x: f64, y: f64) -> Point {
        Point::new(x, y, self.eave_height)
    }

    fn build_facets(&self) -> Vec<Facet> {
        let (w, l) = (self.width, self.length);
        let top = self.eave_height + self.ridge_height;
        let front_left = self.corner(0.0, 0.0);
        let front_right = self.corner(w, 0.0);
        let back_right = self.corner(w, l);
        let back_left = self.corner(0.0, l);

        let shape = |side: &str| self.kind.boundary_shape(&side.into()).unwrap_or(ShapeKind::Rectangle);

        match self.kind {
            RoofKind::Flat => vec![Facet::new(
                "center",
                shape("center"),
                vec![front_left, front_right, back_right, back_left],
            )],
            RoofKind::Gable => {
                let ridge_front = Point::new(w / 2.0, 0.0, top);
                let ridge_back = Point::new(w / 2.0, l, top);
                vec![
                    Facet::new(
                        "left",
                        shape("left"),
                        vec![front_left, back_left, ridge_back, ridge_front],
                    ),
                    Facet::new(
                        "right",
                        shape("right"),
                        vec![front_right, back_right, ridge_back, ridge_front],
                    ),
                ]
            }
            RoofKind::Hip => {
                let ridge_front = Point::new(w / 2.0, HIP_RIDGE_START * l, top);
                let ridge_back = Point::new(w / 2.0, HIP_RIDGE_END * l, top);
                vec![
                    Facet::new("front", shape("front"), vec![front_left, front_right, ridge_front]),
                    Facet::new(
                        "right",
                        shape("right"),
                        vec![front_right, back_right, ridge_back, ridge_front],
                    ),
                    Facet::new("back", shape("back"), vec![back_right, back_left, ridge_back]),
                    Facet::new(
                        "left",
                        shape("left"),
                        vec![front_left, back_left, ridge_back, ridge_front],
                    ),
                ]
            }
            RoofKind::Pyramid => {
                let apex = Point::new(w / 2.0, l / 2.0, top);
                vec![
                    Facet::new("front", shape("front"), vec![front_left, front_right, apex]),
                    Facet::new("right", shape("right"), vec![front_right, back_right, apex]),
                    Facet::new("back", shape("back"), vec![back_right, back_left, apex]),
                    Facet::new("left", shape("left"), vec![back_left, front_left, apex]),
                ]
            }
        }
    }
}
