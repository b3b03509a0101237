use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

const MM_PER_M: f64 = 1000.0;

/// Panel dimensions and rating supplied with a layout request.
///
/// Linear values are stored in millimeters. Use the `*_m()` accessors to get
/// meters, which is what the rest of the crate works with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Panel width in mm (along the eave).
    pub width_mm: f64,
    /// Panel length in mm (up the slope).
    pub length_mm: f64,
    /// Gap between neighbouring panels in mm.
    pub gap_mm: f64,
    /// Rated power per panel in W.
    pub power_w: f64,
    /// Minimum distance kept from the facet edges in mm.
    pub edge_offset_mm: f64,
    /// Mounting height above the roof surface in mm.
    pub height_above_surface_mm: f64,
    /// Panel tilt from horizontal in degrees (flat roofs only).
    pub tilt_deg: Option<f64>,
    /// Compass azimuth the panels face, degrees clockwise from north.
    pub orientation_deg: f64,
}

impl PanelConfig {
    pub fn new() -> Self {
        Self {
            width_mm: 1000.0,
            length_mm: 1600.0,
            gap_mm: 50.0,
            power_w: 400.0,
            edge_offset_mm: 300.0,
            height_above_surface_mm: 50.0,
            tilt_deg: None,
            orientation_deg: 180.0,
        }
    }

    /// Parses a TOML document, filling missing keys with defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(s).context("Invalid panel configuration (TOML)")?;
        cfg.validated()
    }

    /// Parses a JSON document, filling missing keys with defaults.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s).context("Invalid panel configuration (JSON)")?;
        cfg.validated()
    }

    /// Checks dimensions and normalizes angles.
    ///
    /// Tilt is clamped to 0-90 degrees and orientation wrapped into 0-360.
    pub fn validated(mut self) -> Result<Self> {
        for (name, value) in [
            ("width_mm", self.width_mm),
            ("length_mm", self.length_mm),
            ("power_w", self.power_w),
        ] {
            ensure!(
                value.is_finite() && value > 0.0,
                "{name} must be positive and finite, got {value}"
            );
        }
        for (name, value) in [
            ("gap_mm", self.gap_mm),
            ("edge_offset_mm", self.edge_offset_mm),
            ("height_above_surface_mm", self.height_above_surface_mm),
        ] {
            ensure!(
                value.is_finite() && value >= 0.0,
                "{name} must be non-negative and finite, got {value}"
            );
        }
        self.tilt_deg = match self.tilt_deg {
            Some(t) if t.is_finite() => Some(t.clamp(0.0, 90.0)),
            _ => None,
        };
        self.orientation_deg = if self.orientation_deg.is_finite() {
            self.orientation_deg.rem_euclid(360.0)
        } else {
            180.0
        };
        Ok(self)
    }

    pub fn width_m(&self) -> f64 {
        self.width_mm / MM_PER_M
    }

    pub fn length_m(&self) -> f64 {
        self.length_mm / MM_PER_M
    }

    pub fn gap_m(&self) -> f64 {
        self.gap_mm / MM_PER_M
    }

    pub fn edge_offset_m(&self) -> f64 {
        self.edge_offset_mm / MM_PER_M
    }

    pub fn height_above_surface_m(&self) -> f64 {
        self.height_above_surface_mm / MM_PER_M
    }

    /// Tilt in degrees, 0 when unset.
    pub fn tilt(&self) -> f64 {
        self.tilt_deg.unwrap_or(0.0).clamp(0.0, 90.0)
    }

    /// Panel area in square meters.
    pub fn area_m2(&self) -> f64 {
        self.width_m() * self.length_m()
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Location, date and weather for sun and yield calculations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Longitude in degrees, positive east. Informational only.
    pub longitude: f64,
    pub day_of_year: f64,
    /// Decimal solar hour.
    pub hour: f64,
    /// 0 (overcast) to 1 (clear sky).
    pub weather_factor: f64,
}

impl SiteConfig {
    pub fn new() -> Self {
        Self {
            latitude: 48.3,
            longitude: 18.1,
            day_of_year: 172.0,
            hour: 12.0,
            weather_factor: 1.0,
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(s).context("Invalid site configuration (TOML)")?;
        cfg.clamped()
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s).context("Invalid site configuration (JSON)")?;
        cfg.clamped()
    }

    /// Clamps every value into its valid range. Fails only on non-finite input.
    pub fn clamped(self) -> Result<Self> {
        for (name, value) in [
            ("latitude", self.latitude),
            ("longitude", self.longitude),
            ("day_of_year", self.day_of_year),
            ("hour", self.hour),
            ("weather_factor", self.weather_factor),
        ] {
            ensure!(value.is_finite(), "{name} must be finite, got {value}");
        }
        Ok(Self {
            latitude: self.latitude.clamp(-90.0, 90.0),
            longitude: self.longitude.clamp(-180.0, 180.0),
            day_of_year: self.day_of_year.clamp(1.0, 365.0),
            hour: self.hour.clamp(0.0, 24.0),
            weather_factor: self.weather_factor.clamp(0.0, 1.0),
        })
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self::new()
    }
}
