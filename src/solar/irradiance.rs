use super::position::SunPosition;
use crate::Vector;
use serde::Serialize;

/// Extraterrestrial-ish beam irradiance used as reference (W/m^2).
pub const SOLAR_CONSTANT: f64 = 1000.0;
/// Diffuse sky irradiance at full transmission (W/m^2).
pub const DIFFUSE_BASE: f64 = 100.0;
/// Atmospheric transmission per air mass.
pub const ATMOSPHERIC_TRANSMISSION: f64 = 0.75;

/// Plane-of-array irradiance split into beam and sky components, W/m^2.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Irradiance {
    pub direct: f64,
    pub diffuse: f64,
}

impl Irradiance {
    pub fn total(&self) -> f64 {
        self.direct + self.diffuse
    }
}

/// Relative optical path length through the atmosphere.
pub fn air_mass(elevation: f64) -> f64 {
    1.0 / elevation.max(1.0).to_radians().sin()
}

/// Irradiance on a panel with the given surface normal.
///
/// Returns zero when the sun is absent (below the horizon) or the normal is degenerate.
pub fn panel_irradiance(normal: &Vector, sun: Option<&SunPosition>, weather_factor: f64) -> Irradiance {
    let Some(sun) = sun else {
        return Irradiance::default();
    };
    if sun.elevation <= 0.0 {
        return Irradiance::default();
    }
    let Ok(n) = normal.normalize() else {
        return Irradiance::default();
    };
    let weather = if weather_factor.is_finite() {
        weather_factor.clamp(0.0, 1.0)
    } else {
        0.0
    };

    let transmission = ATMOSPHERIC_TRANSMISSION.powf(air_mass(sun.elevation));
    let incidence = n.dot(&sun.to_direction()).max(0.0);

    Irradiance {
        direct: SOLAR_CONSTANT * transmission * incidence * weather,
        diffuse: DIFFUSE_BASE * transmission * weather,
    }
}
