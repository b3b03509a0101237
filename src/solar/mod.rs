//! Sun position, daylight window, shadow geometry and panel irradiance.
//!
//! Conventions used throughout:
//! - Solar azimuth: degrees from north, clockwise (0=N, 90=E, 180=S, 270=W).
//! - Solar elevation: degrees above horizon (0=horizon, 90=zenith).
//! - World axes: North = +Y, East = +X, Up = +Z.

pub mod irradiance;
pub mod position;
pub mod shadow;

pub use irradiance::{Irradiance, panel_irradiance};
pub use position::{DaylightWindow, SunPosition, Twilight, format_time, get_time_range, sun_position};
pub use shadow::{BuildingEnvelope, ShadowDescriptor, shadow};
