pub mod geom;
pub mod layout;
pub mod obstacle;
pub mod performance;
pub mod roof;
pub mod solar;

// Prelude
pub use geom::point::Point;
pub use geom::vector::Vector;
pub use layout::{ActivationManager, Facet, PanelConfig, PanelPlacement, SiteConfig};
pub use obstacle::Obstacle;
pub use performance::{PerformanceReport, YieldCalculator};
pub use roof::{FacetId, RoofGeometry, RoofKind, ShapeKind};
pub use solar::{SunPosition, sun_position};
