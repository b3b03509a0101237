use anyhow::Result;
use pvroof::layout::SiteConfig;
use pvroof::solar::{BuildingEnvelope, format_time, get_time_range, panel_irradiance, shadow};
use pvroof::{ActivationManager, Obstacle, PanelConfig, Point, RoofGeometry, RoofKind, sun_position};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Hip roof panel layout (10 m x 16 m, ridge 4 m).");

    let site = SiteConfig::from_toml_str(
        r#"
        latitude = 48.3
        day_of_year = 172
        hour = 10.5
        weather_factor = 0.9
        "#,
    )?;
    let panel = PanelConfig::from_json_str(r#"{ "width_mm": 1000, "length_mm": 1700, "power_w": 420 }"#)?;

    let roof = RoofGeometry::new(RoofKind::Hip, 10.0, 16.0, 4.0)?;
    println!("Roof slope: {:.1} deg", roof.slope_degrees());

    let mut manager = ActivationManager::from_roof(&roof, panel);
    manager.add_obstacle(Obstacle::chimney(Point::new(8.0, 9.0, 2.0)))?;
    for side in ["front", "right", "back"] {
        let state = manager.toggle_facet(side)?;
        println!(
            "Activated {:<5}: {:>3} panels, {} skipped",
            state.id,
            state.placements.len(),
            state.skipped
        );
    }
    let active: Vec<String> = manager.active_facets().iter().map(|f| f.to_string()).collect();
    println!("Active facets: {}", active.join(", "));

    // Sun and shadow at the configured hour
    let window = get_time_range(site.latitude, site.day_of_year);
    println!(
        "Daylight {} - {}",
        format_time(window.sunrise),
        format_time(window.sunset)
    );
    match sun_position(site.hour, site.day_of_year, site.latitude) {
        Some(sun) => {
            println!(
                "Sun at {}: elevation {:.1} deg, azimuth {:.1} deg",
                format_time(site.hour),
                sun.elevation,
                sun.azimuth
            );
            let building = BuildingEnvelope::new(roof.width, roof.length, 6.0, roof.ridge_height);
            let s = shadow(&building, &sun, site.weather_factor);
            println!("Shadow: {:.1} m long, opacity {:.2}", s.length, s.opacity);
            for id in manager.active_facets() {
                if let Some(normal) = manager.facet(&id).and_then(|f| f.normal()) {
                    let irr = panel_irradiance(&normal, Some(&sun), site.weather_factor);
                    println!("Irradiance on {id}: {:.0} W/m2", irr.total());
                }
            }
        }
        None => println!("Sun is below the horizon at {}", format_time(site.hour)),
    }

    let report = manager.performance();
    println!("{}", report.to_json()?);
    Ok(())
}
