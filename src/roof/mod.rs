//! Roof types and the per-type rules for placing panels on them.

pub mod facet_id;
pub mod geometry;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use facet_id::FacetId;
pub use geometry::RoofGeometry;

/// Shape of the placement region on a facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    /// Four corners: eave start, eave end, top end, top start.
    Rectangle,
    /// Four points: eave front, eave back, ridge back, ridge front.
    Trapezoid,
    /// Three points: left eave, right eave, apex.
    Triangle,
}

impl ShapeKind {
    /// Number of corner points the shape is described by.
    pub fn corner_count(&self) -> usize {
        match self {
            Self::Triangle => 3,
            Self::Rectangle | Self::Trapezoid => 4,
        }
    }
}

/// How facets of a roof compete for panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZonePolicy {
    /// At most `activation_capacity` facets show panels; the oldest is evicted.
    Exclusive,
    /// Zones are recomputed independently and never evict each other.
    Independent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoofKind {
    Flat,
    Gable,
    Hip,
    Pyramid,
}

/// Per-roof-type rules used by the layout.
pub trait RoofPolicy {
    /// Facet (or zone) names this roof exposes.
    fn sides(&self) -> &'static [&'static str];
    /// Shape of the placement region for a side, `None` for unknown sides.
    fn boundary_shape(&self, side: &FacetId) -> Option<ShapeKind>;
    /// How many facets may show panels at the same time.
    fn activation_capacity(&self) -> usize;
    fn zone_policy(&self) -> ZonePolicy;
}

pub const FLAT_ZONES: [&str; 5] = ["center", "north", "south", "east", "west"];
const GABLE_SIDES: [&str; 2] = ["left", "right"];
const HIP_SIDES: [&str; 4] = ["front", "right", "back", "left"];

impl RoofPolicy for RoofKind {
    fn sides(&self) -> &'static [&'static str] {
        match self {
            Self::Flat => &FLAT_ZONES,
            Self::Gable => &GABLE_SIDES,
            Self::Hip | Self::Pyramid => &HIP_SIDES,
        }
    }

    fn boundary_shape(&self, side: &FacetId) -> Option<ShapeKind> {
        if !self.sides().iter().any(|s| *s == side.as_str()) {
            return None;
        }
        let shape = match (self, side.as_str()) {
            (Self::Flat, _) | (Self::Gable, _) => ShapeKind::Rectangle,
            (Self::Hip, "left" | "right") => ShapeKind::Trapezoid,
            (Self::Hip, _) | (Self::Pyramid, _) => ShapeKind::Triangle,
        };
        Some(shape)
    }

    fn activation_capacity(&self) -> usize {
        match self {
            Self::Flat | Self::Gable => 1,
            Self::Hip | Self::Pyramid => 2,
        }
    }

    fn zone_policy(&self) -> ZonePolicy {
        match self {
            Self::Flat => ZonePolicy::Independent,
            _ => ZonePolicy::Exclusive,
        }
    }
}

impl fmt::Display for RoofKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Flat => "flat",
            Self::Gable => "gable",
            Self::Hip => "hip",
            Self::Pyramid => "pyramid",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity() {
        assert_eq!(RoofKind::Flat.activation_capacity(), 1);
        assert_eq!(RoofKind::Gable.activation_capacity(), 1);
        assert_eq!(RoofKind::Hip.activation_capacity(), 2);
        assert_eq!(RoofKind::Pyramid.activation_capacity(), 2);
    }

    #[test]
    fn test_boundary_shapes() {
        let hip = RoofKind::Hip;
        assert_eq!(hip.boundary_shape(&"front".into()), Some(ShapeKind::Triangle));
        assert_eq!(hip.boundary_shape(&"Left".into()), Some(ShapeKind::Trapezoid));
        assert_eq!(RoofKind::Pyramid.boundary_shape(&"left".into()), Some(ShapeKind::Triangle));
        assert_eq!(RoofKind::Gable.boundary_shape(&"right".into()), Some(ShapeKind::Rectangle));
        assert_eq!(RoofKind::Gable.boundary_shape(&"front".into()), None);
        assert_eq!(RoofKind::Flat.boundary_shape(&"north".into()), Some(ShapeKind::Rectangle));
    }

    #[test]
    fn test_zone_policy() {
        assert_eq!(RoofKind::Flat.zone_policy(), ZonePolicy::Independent);
        assert_eq!(RoofKind::Hip.zone_policy(), ZonePolicy::Exclusive);
        assert_eq!(RoofKind::Flat.sides().len(), 5);
        assert_eq!(RoofKind::Hip.to_string(), "hip");
    }
}
