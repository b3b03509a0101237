use super::position::SunPosition;
use crate::Vector;
use serde::{Deserialize, Serialize};

/// Shortest shadow reported, in meters.
pub const MIN_SHADOW_LENGTH: f64 = 8.0;
/// Below this elevation the shadow length is exaggerated instead of computed.
pub const LOW_SUN_ELEVATION: f64 = 5.0;
/// Multiplier applied to the building height for near-horizon sun.
pub const LOW_SUN_EXAGGERATION: f64 = 20.0;

/// Building footprint and heights casting a shadow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildingEnvelope {
    pub width: f64,
    pub length: f64,
    /// Wall height.
    pub height: f64,
    /// Extra height of the roof above the walls.
    pub roof_height: f64,
}

impl BuildingEnvelope {
    pub fn new(width: f64, length: f64, height: f64, roof_height: f64) -> Self {
        Self {
            width: width.max(0.0),
            length: length.max(0.0),
            height: height.max(0.0),
            roof_height: roof_height.max(0.0),
        }
    }

    pub fn total_height(&self) -> f64 {
        self.height + self.roof_height
    }

    pub fn diagonal(&self) -> f64 {
        self.width.hypot(self.length)
    }
}

/// Advisory shadow geometry for a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowDescriptor {
    pub length: f64,
    pub width: f64,
    /// Horizontal unit vector pointing away from the sun.
    pub direction: Vector,
    /// Opacity in [0.7, 0.98].
    pub opacity: f64,
}

/// Computes the shadow cast by a building for a sun position and weather factor (0-1).
pub fn shadow(building: &BuildingEnvelope, sun: &SunPosition, weather_factor: f64) -> ShadowDescriptor {
    let weather = if weather_factor.is_finite() {
        weather_factor.clamp(0.0, 1.0)
    } else {
        1.0
    };
    let elevation = sun.elevation.clamp(0.0, 90.0);

    ShadowDescriptor {
        length: shadow_length(building.total_height(), elevation),
        width: building.diagonal() * width_factor(elevation),
        direction: shadow_direction(sun),
        opacity: shadow_opacity(elevation, weather),
    }
}

fn shadow_length(total_height: f64, elevation: f64) -> f64 {
    let length = if elevation < LOW_SUN_ELEVATION {
        total_height * LOW_SUN_EXAGGERATION
    } else {
        total_height / elevation.to_radians().tan()
    };
    length.max(MIN_SHADOW_LENGTH)
}

fn width_factor(elevation: f64) -> f64 {
    if elevation < 20.0 {
        1.5
    } else if elevation < 45.0 {
        1.2
    } else {
        1.0
    }
}

fn shadow_direction(sun: &SunPosition) -> Vector {
    let horizontal = sun.to_direction().horizontal();
    match (-horizontal).normalize() {
        Ok(dir) if horizontal.length() > 1e-6 => dir,
        _ => {
            // Sun overhead
            let azi = sun.azimuth.to_radians();
            Vector::new(-azi.sin(), -azi.cos(), 0.0)
        }
    }
}

fn shadow_opacity(elevation: f64, weather: f64) -> f64 {
    let elevation_term = 0.15 * (elevation / 90.0);
    let weather_term = 0.2 * (weather - 0.5);
    (0.8 + elevation_term + weather_term).clamp(0.7, 0.98)
}
