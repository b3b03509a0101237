use crate::Vector;
use serde::{Deserialize, Serialize};

/// Sun position (azimuth and elevation angles).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SunPosition {
    /// Solar elevation angle in degrees (0 = horizon, 90 = zenith).
    pub elevation: f64,
    /// Solar azimuth angle in degrees from north, clockwise (0=N, 90=E, 180=S, 270=W).
    pub azimuth: f64,
}

/// Sunrise and sunset in decimal solar hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DaylightWindow {
    pub sunrise: f64,
    pub sunset: f64,
}

/// Civil twilight bounds around the daylight window, decimal hours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Twilight {
    pub civil_dawn: f64,
    pub sunrise: f64,
    pub sunset: f64,
    pub civil_dusk: f64,
}

/// Solar declination in degrees (Cooper's equation).
pub fn declination(day_of_year: f64) -> f64 {
    let day = clamp_day(day_of_year);
    23.45 * (360.0 * (284.0 + day) / 365.0).to_radians().sin()
}

/// Hour angle in degrees, 15 degrees per hour from solar noon.
pub fn hour_angle(hour: f64) -> f64 {
    15.0 * (clamp_hour(hour) - 12.0)
}

fn clamp_hour(hour: f64) -> f64 {
    hour.clamp(0.0, 24.0)
}

fn clamp_day(day: f64) -> f64 {
    day.clamp(1.0, 365.0)
}

fn clamp_latitude(latitude: f64) -> f64 {
    latitude.clamp(-90.0, 90.0)
}

impl SunPosition {
    /// Calculates the sun position for a decimal solar hour, day of year and latitude.
    ///
    /// Out-of-range inputs are clamped (hour to 0-24, day to 1-365, latitude to
    /// +-90). The returned elevation may be negative (sun below horizon).
    pub fn calculate(hour: f64, day_of_year: f64, latitude: f64) -> Self {
        let lat = clamp_latitude(latitude).to_radians();
        let decl = declination(day_of_year).to_radians();
        let ha_deg = hour_angle(hour);
        let ha = ha_deg.to_radians();

        let sin_elev = (decl.sin() * lat.sin() + decl.cos() * lat.cos() * ha.cos()).clamp(-1.0, 1.0);
        let elev = sin_elev.asin();

        let denom = elev.cos() * lat.cos();
        let mut azimuth = if denom.abs() < 1e-12 {
            // Zenith or pole: azimuth is undefined, report due south
            180.0
        } else {
            ((decl.sin() - elev.sin() * lat.sin()) / denom)
                .clamp(-1.0, 1.0)
                .acos()
                .to_degrees()
        };
        if ha_deg > 0.0 {
            azimuth = 360.0 - azimuth;
        }

        Self {
            elevation: elev.to_degrees(),
            azimuth: azimuth.rem_euclid(360.0),
        }
    }

    /// Returns true if the sun is above the horizon.
    pub fn is_above_horizon(&self) -> bool {
        self.elevation >= 0.0
    }

    /// Unit vector pointing toward the sun.
    pub fn to_direction(&self) -> Vector {
        let alt = self.elevation.to_radians();
        let azi = self.azimuth.to_radians();

        // North = +Y, East = +X
        Vector::new(alt.cos() * azi.sin(), alt.cos() * azi.cos(), alt.sin())
    }

    /// Direction light travels (from the sun toward the scene).
    pub fn light_direction(&self) -> Vector {
        -self.to_direction()
    }
}

/// Sun position for a decimal hour, or `None` when the sun is below the horizon.
///
/// Hours outside the daylight window from [`get_time_range`] are also reported
/// as `None`. Non-finite inputs yield `None`.
pub fn sun_position(hour: f64, day_of_year: f64, latitude: f64) -> Option<SunPosition> {
    if !(hour.is_finite() && day_of_year.is_finite() && latitude.is_finite()) {
        return None;
    }
    let window = get_time_range(latitude, day_of_year);
    let hour = clamp_hour(hour);
    if hour < window.sunrise || hour > window.sunset {
        return None;
    }
    let pos = SunPosition::calculate(hour, day_of_year, latitude);
    if pos.is_above_horizon() {
        Some(pos)
    } else {
        None
    }
}

/// Sunrise and sunset for a latitude and day of year.
///
/// Polar day yields `[0, 24]`, polar night `[12, 12]`.
pub fn get_time_range(latitude: f64, day_of_year: f64) -> DaylightWindow {
    let lat = clamp_latitude(latitude).to_radians();
    let decl = declination(day_of_year).to_radians();
    let cos_hour_angle = -lat.tan() * decl.tan();

    if cos_hour_angle.is_nan() {
        return DaylightWindow {
            sunrise: 6.0,
            sunset: 18.0,
        };
    }
    if cos_hour_angle < -1.0 {
        return DaylightWindow {
            sunrise: 0.0,
            sunset: 24.0,
        };
    }
    if cos_hour_angle > 1.0 {
        return DaylightWindow {
            sunrise: 12.0,
            sunset: 12.0,
        };
    }

    let hours = cos_hour_angle.acos().to_degrees() / 15.0;
    DaylightWindow {
        sunrise: 12.0 - hours,
        sunset: 12.0 + hours,
    }
}

/// Length of the day in hours.
pub fn day_length(latitude: f64, day_of_year: f64) -> f64 {
    let window = get_time_range(latitude, day_of_year);
    window.sunset - window.sunrise
}

/// Civil twilight approximated as a latitude-dependent margin around the daylight window.
pub fn twilight_window(latitude: f64, day_of_year: f64) -> Twilight {
    let window = get_time_range(latitude, day_of_year);
    let margin = 0.5 + 0.1 * clamp_latitude(latitude).abs() / 90.0;
    Twilight {
        civil_dawn: (window.sunrise - margin).max(0.0),
        sunrise: window.sunrise,
        sunset: window.sunset,
        civil_dusk: (window.sunset + margin).min(24.0),
    }
}

/// Relative sun intensity (0-1) from elevation and a weather factor.
pub fn sun_intensity(elevation: f64, weather_factor: f64) -> f64 {
    let intensity = if elevation <= 0.0 {
        0.0
    } else if elevation < 10.0 {
        0.3 * (elevation / 10.0)
    } else if elevation < 30.0 {
        0.3 + 0.5 * ((elevation - 10.0) / 20.0)
    } else {
        0.8 + 0.2 * ((elevation - 30.0) / 30.0).min(1.0)
    };
    (intensity * weather_factor.clamp(0.0, 1.0)).clamp(0.0, 1.0)
}

/// Formats a decimal hour as `HH:MM`.
pub fn format_time(decimal_hour: f64) -> String {
    let total_minutes = (decimal_hour.clamp(0.0, 24.0) * 60.0).floor() as u32;
    format!("{:02}:{:02}", total_minutes / 60, total_minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summer_solstice_noon() {
        let pos = SunPosition::calculate(12.0, 172.0, 48.3);
        let expected = 90.0 - (48.3_f64 - 23.45).abs();
        assert!(
            (pos.elevation - expected).abs() < 1.0,
            "elevation {} expected ~{expected}",
            pos.elevation
        );
        assert!((pos.azimuth - 180.0).abs() < 1e-6 || pos.azimuth.abs() < 1e-6);
    }

    #[test]
    fn test_morning_east_afternoon_west() {
        let morning = SunPosition::calculate(9.0, 172.0, 48.3);
        let afternoon = SunPosition::calculate(15.0, 172.0, 48.3);
        assert!(morning.azimuth > 0.0 && morning.azimuth < 180.0);
        assert!(afternoon.azimuth > 180.0 && afternoon.azimuth < 360.0);
        // Symmetric around solar noon
        assert!((morning.elevation - afternoon.elevation).abs() < 1e-9);
        assert!((morning.azimuth + afternoon.azimuth - 360.0).abs() < 1e-9);
    }

    #[test]
    fn test_night_is_none() {
        assert!(sun_position(0.0, 355.0, 45.0).is_none());
        assert!(sun_position(23.0, 172.0, 10.0).is_none());
        assert!(sun_position(12.0, 172.0, 45.0).is_some());
    }

    #[test]
    fn test_non_finite_inputs() {
        assert!(sun_position(f64::NAN, 172.0, 45.0).is_none());
        assert!(sun_position(12.0, 172.0, f64::INFINITY).is_none());
    }

    #[test]
    fn test_out_of_range_inputs_are_clamped() {
        let a = SunPosition::calculate(30.0, 500.0, 120.0);
        let b = SunPosition::calculate(24.0, 365.0, 90.0);
        assert_eq!(a, b);
        assert!(a.elevation.is_finite() && a.azimuth.is_finite());
    }

    #[test]
    fn test_time_range_equinox_equator() {
        let w = get_time_range(0.0, 80.0);
        assert!((w.sunrise - 6.0).abs() < 0.05);
        assert!((w.sunset - 18.0).abs() < 0.05);
    }

    #[test]
    fn test_time_range_polar() {
        let summer = get_time_range(80.0, 172.0);
        assert_eq!((summer.sunrise, summer.sunset), (0.0, 24.0));
        let winter = get_time_range(80.0, 355.0);
        assert_eq!((winter.sunrise, winter.sunset), (12.0, 12.0));
        assert_eq!(day_length(80.0, 355.0), 0.0);
        // Poles do not panic and return a defined window
        let pole = get_time_range(90.0, 172.0);
        assert!(pole.sunrise <= pole.sunset);
    }

    #[test]
    fn test_twilight_wraps_window() {
        let t = twilight_window(48.0, 100.0);
        assert!(t.civil_dawn < t.sunrise);
        assert!(t.civil_dusk > t.sunset);
    }

    #[test]
    fn test_sun_intensity() {
        assert_eq!(sun_intensity(-5.0, 1.0), 0.0);
        assert!((sun_intensity(5.0, 1.0) - 0.15).abs() < 1e-12);
        assert!((sun_intensity(20.0, 1.0) - 0.55).abs() < 1e-12);
        assert!((sun_intensity(75.0, 1.0) - 1.0).abs() < 1e-12);
        assert!((sun_intensity(75.0, 0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(6.5), "06:30");
        assert_eq!(format_time(13.25), "13:15");
        assert_eq!(format_time(0.0), "00:00");
    }

    #[test]
    fn test_direction_vector() {
        let pos = SunPosition {
            elevation: 90.0,
            azimuth: 0.0,
        };
        let dir = pos.to_direction();
        assert!((dir.dz - 1.0).abs() < 1e-6);
        assert!(dir.dx.abs() < 1e-6);

        let south = SunPosition {
            elevation: 0.0,
            azimuth: 180.0,
        };
        let dir = south.to_direction();
        assert!((dir.dy + 1.0).abs() < 1e-9);
        assert!(south.light_direction().is_close(&-dir));
    }
}
