//! Energy yield estimate from panel count, tilt, orientation and shading obstacles.

use crate::layout::config::PanelConfig;
use crate::obstacle::Obstacle;
use crate::roof::FacetId;
use serde::Serialize;

/// Expected annual yield per installed kWp, kWh.
pub const SPECIFIC_YIELD: f64 = 1200.0;
/// System losses (inverter, wiring, soiling).
pub const PERFORMANCE_RATIO: f64 = 0.8;
/// Roof area assumed when the footprint is unknown, m^2.
pub const DEFAULT_ROOF_AREA: f64 = 25.0;
/// Upper bound on the yield loss caused by obstacles.
pub const MAX_OBSTRUCTION_LOSS: f64 = 0.25;

/// Tilt efficiency relative to the optimum (30-40 degrees).
pub fn tilt_factor(tilt_deg: f64) -> f64 {
    if tilt_deg < 5.0 {
        0.85
    } else if tilt_deg < 10.0 {
        0.88
    } else if tilt_deg < 20.0 {
        0.94
    } else if tilt_deg < 30.0 {
        0.98
    } else if tilt_deg < 40.0 {
        1.0
    } else if tilt_deg < 50.0 {
        0.97
    } else if tilt_deg < 60.0 {
        0.91
    } else {
        0.84
    }
}

/// Orientation efficiency; due south (180) is best, due north worst.
pub fn orientation_factor(azimuth_deg: f64) -> f64 {
    let az = azimuth_deg.rem_euclid(360.0);
    // Angular distance from due south, symmetric for east and west
    let off_south = (az - 180.0).abs();
    if off_south <= 22.5 {
        1.0
    } else if off_south <= 45.0 {
        0.94
    } else if off_south <= 67.5 {
        0.88
    } else if off_south <= 90.0 {
        0.82
    } else if off_south <= 112.5 {
        0.76
    } else if off_south <= 135.0 {
        0.70
    } else if off_south <= 157.5 {
        0.63
    } else {
        0.55
    }
}

/// Roof area over which obstacle shading is spread.
pub fn estimated_roof_area(footprint: Option<(f64, f64)>, active_facets: usize) -> f64 {
    match footprint {
        Some((w, l)) if w > 0.0 && l > 0.0 => {
            if active_facets > 0 {
                w * l / 4.0 * active_facets as f64
            } else {
                w * l
            }
        }
        _ => DEFAULT_ROOF_AREA,
    }
}

/// Yield factor after shading by chimneys and vents.
pub fn obstruction_factor(obstacles: &[Obstacle], roof_area: f64) -> f64 {
    let mut count = 0;
    let mut weighted_size = 0.0;
    for o in obstacles.iter().filter(|o| o.casts_shade()) {
        count += 1;
        let dims = o.dimensions().unwrap_or(Obstacle::CHIMNEY_DIMENSIONS);
        let height_factor = dims.height.clamp(1.0, 1.5);
        weighted_size += dims.footprint() * height_factor;
    }
    if count == 0 || roof_area <= 0.0 {
        return 1.0;
    }
    let loss = 0.02 * count as f64 + 2.0 * weighted_size / roof_area;
    1.0 - loss.min(MAX_OBSTRUCTION_LOSS)
}

/// Estimated output of a panel layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformanceReport {
    pub panel_count: usize,
    pub panel_power_w: f64,
    pub system_power_w: f64,
    pub system_power_kw: f64,
    pub tilt_deg: Option<f64>,
    pub orientation_deg: Option<f64>,
    pub tilt_factor: f64,
    pub orientation_factor: f64,
    pub obstruction_factor: f64,
    pub combined_factor: f64,
    pub annual_energy_kwh: f64,
    pub daily_energy_kwh: f64,
    /// Candidates rejected because of obstacles.
    pub skipped_panels: u32,
}

impl PerformanceReport {
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builder collecting everything the yield estimate depends on.
#[derive(Debug, Clone)]
pub struct YieldCalculator {
    pub panel_power_w: f64,
    pub tilt_deg: Option<f64>,
    pub orientation_deg: Option<f64>,
    pub footprint: Option<(f64, f64)>,
    pub skipped: u32,
}

impl YieldCalculator {
    /// Takes power, tilt and orientation from the panel configuration.
    pub fn new(config: &PanelConfig) -> Self {
        Self {
            panel_power_w: config.power_w,
            tilt_deg: config.tilt_deg,
            orientation_deg: Some(config.orientation_deg),
            footprint: None,
            skipped: 0,
        }
    }

    pub fn with_tilt(mut self, tilt_deg: Option<f64>) -> Self {
        self.tilt_deg = tilt_deg.map(|t| t.clamp(0.0, 90.0));
        self
    }

    pub fn with_orientation(mut self, orientation_deg: Option<f64>) -> Self {
        self.orientation_deg = orientation_deg;
        self
    }

    pub fn with_footprint(mut self, width: f64, length: f64) -> Self {
        self.footprint = Some((width, length));
        self
    }

    pub fn with_skipped(mut self, skipped: u32) -> Self {
        self.skipped = skipped;
        self
    }

    pub fn report(&self, panel_count: usize, obstacles: &[Obstacle], active_facets: &[FacetId]) -> PerformanceReport {
        if panel_count == 0 {
            return PerformanceReport {
                skipped_panels: self.skipped,
                ..PerformanceReport::default()
            };
        }
        let system_power_w = panel_count as f64 * self.panel_power_w;
        let system_power_kw = system_power_w / 1000.0;

        let tilt = self.tilt_deg.map_or(1.0, tilt_factor);
        let orientation = self.orientation_deg.map_or(1.0, orientation_factor);
        let area = estimated_roof_area(self.footprint, active_facets.len());
        let obstruction = obstruction_factor(obstacles, area);
        let combined = tilt * orientation * obstruction;

        let annual = system_power_kw * SPECIFIC_YIELD * PERFORMANCE_RATIO * combined;
        PerformanceReport {
            panel_count,
            panel_power_w: self.panel_power_w,
            system_power_w,
            system_power_kw,
            tilt_deg: self.tilt_deg,
            orientation_deg: self.orientation_deg,
            tilt_factor: tilt,
            orientation_factor: orientation,
            obstruction_factor: obstruction,
            combined_factor: combined,
            annual_energy_kwh: annual,
            daily_energy_kwh: annual / 365.0,
            skipped_panels: self.skipped,
        }
    }
}

/// Performance estimate using the tilt and orientation of `config`.
pub fn performance(
    panel_count: usize,
    config: &PanelConfig,
    obstacles: &[Obstacle],
    active_facets: &[FacetId],
) -> PerformanceReport {
    YieldCalculator::new(config).report(panel_count, obstacles, active_facets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point;
    use crate::Vector;

    #[test]
    fn test_tilt_table() {
        assert_eq!(tilt_factor(0.0), 0.85);
        assert_eq!(tilt_factor(35.0), 1.0);
        assert_eq!(tilt_factor(40.0), 0.97);
        assert_eq!(tilt_factor(75.0), 0.84);
    }

    #[test]
    fn test_orientation_table() {
        assert_eq!(orientation_factor(180.0), 1.0);
        assert_eq!(orientation_factor(0.0), 0.55);
        assert_eq!(orientation_factor(360.0), 0.55);
        assert_eq!(orientation_factor(90.0), 0.82);
        assert_eq!(orientation_factor(270.0), 0.82);
        assert_eq!(orientation_factor(-90.0), 0.82);
        assert_eq!(orientation_factor(135.0), 0.94);
        assert_eq!(orientation_factor(30.0), 0.63);
        // Symmetric about south
        for d in [10.0, 33.0, 60.0, 100.0, 150.0, 170.0] {
            assert_eq!(orientation_factor(180.0 - d), orientation_factor(180.0 + d));
        }
    }

    #[test]
    fn test_tables_have_no_large_jumps() {
        let mut x = 0.0;
        while x < 360.0 {
            let step = (orientation_factor(x + 0.01) - orientation_factor(x)).abs();
            assert!(step <= 0.08 + 1e-12, "orientation jump {step} at {x}");
            if x < 90.0 {
                let step = (tilt_factor(x + 0.01) - tilt_factor(x)).abs();
                assert!(step <= 0.07 + 1e-12, "tilt jump {step} at {x}");
            }
            x += 0.01;
        }
    }

    #[test]
    fn test_obstruction_factor() {
        assert_eq!(obstruction_factor(&[], 100.0), 1.0);
        let chimney = Obstacle::chimney(Point::origin());
        // 0.02 + 2 * 0.36 * 1.2 / 100
        let f = obstruction_factor(&[chimney.clone()], 100.0);
        assert!((f - (1.0 - 0.02 - 0.00864)).abs() < 1e-12, "factor {f}");
        // Windows do not shade
        let window = Obstacle::window(Point::origin(), Vector::up());
        assert_eq!(obstruction_factor(&[window], 100.0), 1.0);
        // Capped at 25 % loss
        let many = vec![chimney; 50];
        assert!((obstruction_factor(&many, 10.0) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_roof_area() {
        assert_eq!(estimated_roof_area(None, 2), DEFAULT_ROOF_AREA);
        assert_eq!(estimated_roof_area(Some((10.0, 8.0)), 0), 80.0);
        assert_eq!(estimated_roof_area(Some((10.0, 8.0)), 2), 40.0);
    }

    #[test]
    fn test_report() {
        let cfg = PanelConfig {
            tilt_deg: Some(35.0),
            ..PanelConfig::new()
        };
        let report = performance(10, &cfg, &[], &[]);
        assert_eq!(report.panel_count, 10);
        assert!((report.system_power_kw - 4.0).abs() < 1e-12);
        assert!((report.combined_factor - 1.0).abs() < 1e-12);
        assert!((report.annual_energy_kwh - 4.0 * 1200.0 * 0.8).abs() < 1e-9);
        assert!((report.daily_energy_kwh * 365.0 - report.annual_energy_kwh).abs() < 1e-9);
        let json = report.to_json().unwrap();
        assert!(json.contains("annual_energy_kwh"));
    }

    #[test]
    fn test_zero_panels() {
        let report = YieldCalculator::new(&PanelConfig::new())
            .with_skipped(3)
            .report(0, &[], &[]);
        assert_eq!(report.annual_energy_kwh, 0.0);
        assert_eq!(report.system_power_w, 0.0);
        assert_eq!(report.skipped_panels, 3);
    }

    #[test]
    fn test_unknown_tilt_is_neutral() {
        let report = YieldCalculator::new(&PanelConfig::new())
            .with_tilt(None)
            .with_orientation(None)
            .report(1, &[], &[]);
        assert_eq!(report.combined_factor, 1.0);
    }
}
