//! Panel layout on roof facets: configuration, placement boundaries,
//! tiling and facet activation.

pub mod activation;
pub mod batch;
pub mod boundary;
pub mod config;
pub mod facet;
pub mod tiling;

pub use activation::{ActivationManager, FacetState, PlacementArena, PlacementKey, ZoneUpdate};
pub use batch::PanelBatch;
pub use boundary::{Boundary, InsetRule, flat_zone_boundary, resolve_boundary};
pub use config::{PanelConfig, SiteConfig};
pub use facet::Facet;
pub use tiling::{PanelPlacement, TilingResult, row_spacing_factor, tile};
