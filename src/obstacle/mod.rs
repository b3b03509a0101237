//! Roof obstacles (windows, chimneys, vents and arbitrary boxes).

pub mod detect;

use crate::Point;
use crate::Vector;
use crate::geom::bboxes::BoundingBox;
use serde::{Deserialize, Serialize};

pub use detect::{PanelFootprint, first_blocking, intersects};

/// Width, length and height of an obstacle in meters.
///
/// For windows `length` runs up the slope and `height` is how far the
/// frame protrudes above the roof.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub length: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(width: f64, length: f64, height: f64) -> Self {
        Self {
            width,
            length,
            height,
        }
    }

    /// Returns true if all values are finite and non-negative.
    pub fn is_valid(&self) -> bool {
        [self.width, self.length, self.height]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }

    /// Horizontal footprint area.
    pub fn footprint(&self) -> f64 {
        self.width * self.length
    }

    /// Radius of the circle circumscribing the footprint.
    pub fn radius(&self) -> f64 {
        self.width.hypot(self.length) / 2.0
    }
}

/// Obstacle placed on a roof. Read-only input to the layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Obstacle {
    /// Roof window lying in the roof plane.
    Window {
        position: Point,
        normal: Vector,
        dimensions: Dimensions,
    },
    Chimney {
        position: Point,
        dimensions: Dimensions,
    },
    /// Ventilation pipe, treated like a small round chimney.
    Vent {
        position: Point,
        dimensions: Dimensions,
    },
    /// Anything else, described by its bounding box if known.
    Generic {
        position: Point,
        bounds: Option<BoundingBox>,
    },
}

impl Obstacle {
    pub const CHIMNEY_DIMENSIONS: Dimensions = Dimensions {
        width: 0.6,
        length: 0.6,
        height: 1.2,
    };
    pub const WINDOW_DIMENSIONS: Dimensions = Dimensions {
        width: 1.0,
        length: 1.8,
        height: 0.15,
    };
    pub const VENT_DIMENSIONS: Dimensions = Dimensions {
        width: 0.4,
        length: 0.4,
        height: 0.5,
    };

    /// Window with default dimensions lying in a roof plane with the given normal.
    pub fn window(position: Point, normal: Vector) -> Self {
        Self::Window {
            position,
            normal,
            dimensions: Self::WINDOW_DIMENSIONS,
        }
    }

    /// Chimney with default dimensions.
    pub fn chimney(position: Point) -> Self {
        Self::Chimney {
            position,
            dimensions: Self::CHIMNEY_DIMENSIONS,
        }
    }

    /// Vent with default dimensions.
    pub fn vent(position: Point) -> Self {
        Self::Vent {
            position,
            dimensions: Self::VENT_DIMENSIONS,
        }
    }

    pub fn generic(bounds: BoundingBox) -> Self {
        Self::Generic {
            position: bounds.center(),
            bounds: Some(bounds),
        }
    }

    /// Replaces the dimensions of sized obstacles. Generic obstacles are returned unchanged.
    pub fn with_dimensions(self, dims: Dimensions) -> Self {
        match self {
            Self::Window {
                position, normal, ..
            } => Self::Window {
                position,
                normal,
                dimensions: dims,
            },
            Self::Chimney { position, .. } => Self::Chimney {
                position,
                dimensions: dims,
            },
            Self::Vent { position, .. } => Self::Vent {
                position,
                dimensions: dims,
            },
            generic @ Self::Generic { .. } => generic,
        }
    }

    pub fn position(&self) -> Point {
        match self {
            Self::Window { position, .. }
            | Self::Chimney { position, .. }
            | Self::Vent { position, .. }
            | Self::Generic { position, .. } => *position,
        }
    }

    pub fn dimensions(&self) -> Option<Dimensions> {
        match self {
            Self::Window { dimensions, .. }
            | Self::Chimney { dimensions, .. }
            | Self::Vent { dimensions, .. } => Some(*dimensions),
            Self::Generic { bounds, .. } => bounds.map(|b| {
                Dimensions::new(b.max.x - b.min.x, b.max.y - b.min.y, b.max.z - b.min.z)
            }),
        }
    }

    /// Chimneys and vents stand up from the roof and shade nearby panels.
    pub fn casts_shade(&self) -> bool {
        matches!(self, Self::Chimney { .. } | Self::Vent { .. })
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Window { .. } => "window",
            Self::Chimney { .. } => "chimney",
            Self::Vent { .. } => "vent",
            Self::Generic { .. } => "generic",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dimensions() {
        let c = Obstacle::chimney(Point::origin());
        assert_eq!(c.dimensions(), Some(Obstacle::CHIMNEY_DIMENSIONS));
        assert!(c.casts_shade());
        let w = Obstacle::window(Point::origin(), Vector::up());
        assert!(!w.casts_shade());
        assert_eq!(w.kind_name(), "window");
    }

    #[test]
    fn test_with_dimensions() {
        let v = Obstacle::vent(Point::new(1., 2., 3.)).with_dimensions(Dimensions::new(0.2, 0.2, 1.0));
        assert_eq!(v.dimensions(), Some(Dimensions::new(0.2, 0.2, 1.0)));
        assert!(v.position().is_close(&Point::new(1., 2., 3.)));
    }

    #[test]
    fn test_generic_dimensions_from_bounds() {
        let g = Obstacle::generic(BoundingBox::new(Point::origin(), Point::new(2., 1., 0.5)));
        let d = g.dimensions().unwrap();
        assert!((d.footprint() - 2.0).abs() < 1e-12);
        assert!(g.position().is_close(&Point::new(1., 0.5, 0.25)));
        let unknown = Obstacle::Generic {
            position: Point::origin(),
            bounds: None,
        };
        assert!(unknown.dimensions().is_none());
    }

    #[test]
    fn test_serde_tagged() {
        let c = Obstacle::chimney(Point::new(1., 1., 5.));
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("\"kind\":\"chimney\""));
        let back: Obstacle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
