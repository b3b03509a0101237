//! Which facets currently carry panels.
//!
//! Pitched roofs allow a limited number of active facets; activating one more
//! evicts the facet activated first. Flat roofs can additionally recompute
//! single zones without touching the others.

use super::batch::PanelBatch;
use super::boundary::{Boundary, flat_zone_boundary, resolve_boundary};
use super::config::PanelConfig;
use super::facet::Facet;
use super::tiling::{PanelPlacement, TilingResult, tile};
use crate::Point;
use crate::obstacle::Obstacle;
use crate::performance::{PerformanceReport, YieldCalculator};
use crate::roof::{FacetId, RoofGeometry, RoofKind, RoofPolicy, ZonePolicy};
use anyhow::{Result, bail};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use tracing::{debug, warn};

/// Zone boundaries moving less than this are not recomputed, meters.
pub const ZONE_CHANGE_TOLERANCE: f64 = 0.01;
/// Facets whose planes are this close to an obstacle's nearest plane share it, meters.
pub const SHARED_OBSTACLE_TOLERANCE: f64 = 0.01;

/// Handle to one generation of a facet's placements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PlacementKey {
    pub facet: FacetId,
    pub generation: u64,
}

#[derive(Debug, Clone)]
struct ArenaEntry {
    generation: u64,
    /// Revision of config and obstacles the entry was computed with.
    inputs_revision: u64,
    boundary: Boundary,
    result: TilingResult,
}

/// Placement lists keyed by facet and generation.
///
/// Storing a new list for a facet supersedes the previous generation; keys
/// to older generations stop resolving.
#[derive(Debug, Clone, Default)]
pub struct PlacementArena {
    entries: BTreeMap<FacetId, ArenaEntry>,
    last_generation: u64,
}

impl PlacementArena {
    fn insert(&mut self, facet: FacetId, boundary: Boundary, result: TilingResult, inputs_revision: u64) -> PlacementKey {
        self.last_generation += 1;
        let generation = self.last_generation;
        self.entries.insert(
            facet.clone(),
            ArenaEntry {
                generation,
                inputs_revision,
                boundary,
                result,
            },
        );
        PlacementKey { facet, generation }
    }

    fn remove(&mut self, facet: &FacetId) -> bool {
        self.entries.remove(facet).is_some()
    }

    /// Placements for `key`, or `None` if the key is stale.
    pub fn get(&self, key: &PlacementKey) -> Option<&TilingResult> {
        self.entries
            .get(&key.facet)
            .filter(|e| e.generation == key.generation)
            .map(|e| &e.result)
    }

    /// Key of the current generation of a facet.
    pub fn current_key(&self, facet: &FacetId) -> Option<PlacementKey> {
        self.entries.get(facet).map(|e| PlacementKey {
            facet: facet.clone(),
            generation: e.generation,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Snapshot of one facet's activation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetState {
    pub id: FacetId,
    pub active: bool,
    pub generation: Option<u64>,
    pub boundary: Option<Boundary>,
    pub placements: Vec<PanelPlacement>,
    pub skipped: u32,
}

impl FacetState {
    fn inactive(id: FacetId) -> Self {
        Self {
            id,
            active: false,
            generation: None,
            boundary: None,
            placements: Vec::new(),
            skipped: 0,
        }
    }
}

/// Outcome of a flat-roof zone recomputation.
#[derive(Debug, Clone, PartialEq)]
pub enum ZoneUpdate {
    /// The zone was (re)tiled.
    Updated(FacetState),
    /// Boundary and inputs did not change; the cached placements were kept.
    Unchanged,
}

/// Tracks active facets and their placements for one roof.
#[derive(Debug, Clone)]
pub struct ActivationManager {
    roof: RoofKind,
    facets: Vec<Facet>,
    footprint: Option<(f64, f64)>,
    config: PanelConfig,
    obstacles: Vec<Obstacle>,
    /// Active facets in activation order, oldest first.
    active: VecDeque<FacetId>,
    arena: PlacementArena,
    inputs_revision: u64,
}

impl ActivationManager {
    pub fn new(roof: RoofKind, facets: Vec<Facet>, config: PanelConfig) -> Self {
        Self {
            roof,
            facets,
            footprint: None,
            config,
            obstacles: Vec::new(),
            active: VecDeque::new(),
            arena: PlacementArena::default(),
            inputs_revision: 0,
        }
    }

    /// Manager for a generated roof; the footprint is used for yield estimates.
    pub fn from_roof(roof: &RoofGeometry, config: PanelConfig) -> Self {
        let mut manager = Self::new(roof.kind, roof.facets().to_vec(), config);
        manager.footprint = Some((roof.width, roof.length));
        manager
    }

    pub fn roof(&self) -> RoofKind {
        self.roof
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn arena(&self) -> &PlacementArena {
        &self.arena
    }

    pub fn facet(&self, id: &FacetId) -> Option<&Facet> {
        self.facets.iter().find(|f| &f.id == id)
    }

    /// Replaces the panel configuration and retiles active facets.
    pub fn set_config(&mut self, config: PanelConfig) -> Result<()> {
        self.config = config;
        self.inputs_revision += 1;
        self.refresh()
    }

    /// Replaces the obstacle list and retiles active facets.
    pub fn set_obstacles(&mut self, obstacles: Vec<Obstacle>) -> Result<()> {
        self.obstacles = obstacles;
        self.inputs_revision += 1;
        self.refresh()
    }

    pub fn add_obstacle(&mut self, obstacle: Obstacle) -> Result<()> {
        self.obstacles.push(obstacle);
        self.inputs_revision += 1;
        self.refresh()
    }

    pub fn is_active(&self, id: &FacetId) -> bool {
        self.active.contains(id)
    }

    /// Active facets, oldest activation first.
    pub fn active_facets(&self) -> Vec<FacetId> {
        self.active.iter().cloned().collect()
    }

    /// Activates an inactive facet or deactivates an active one.
    ///
    /// When the roof's capacity is reached the facet activated first is
    /// evicted. A facet stays active even if no panel fits on it.
    pub fn toggle_facet(&mut self, id: impl Into<FacetId>) -> Result<FacetState> {
        let id = id.into();
        self.ensure_known(&id)?;

        if self.is_active(&id) {
            self.active.retain(|a| a != &id);
            self.arena.remove(&id);
            debug!(facet = %id, "facet deactivated");
            return Ok(FacetState::inactive(id));
        }

        let boundary = self.boundary_for(&id)?;
        let capacity = self.roof.activation_capacity();
        while self.active.len() >= capacity {
            let Some(oldest) = self.active.pop_front() else {
                break;
            };
            self.arena.remove(&oldest);
            debug!(facet = %oldest, by = %id, "facet evicted");
        }
        self.store(&id, boundary);
        Ok(self.state(&id))
    }

    /// Recomputes one flat-roof zone without evicting other zones.
    ///
    /// Skips the work if the zone boundary moved less than
    /// [`ZONE_CHANGE_TOLERANCE`] and neither config nor obstacles changed.
    pub fn update_zone(&mut self, zone: impl Into<FacetId>) -> Result<ZoneUpdate> {
        let zone = zone.into();
        if self.roof.zone_policy() != ZonePolicy::Independent {
            bail!("Zones are only supported on flat roofs, this is a {} roof", self.roof);
        }
        self.ensure_known(&zone)?;

        let boundary = self.boundary_for(&zone)?;
        if let Some(entry) = self.arena.entries.get(&zone) {
            if entry.inputs_revision == self.inputs_revision
                && entry.boundary.is_close_to(&boundary, ZONE_CHANGE_TOLERANCE)
            {
                debug!(zone = %zone, "zone unchanged, keeping placements");
                return Ok(ZoneUpdate::Unchanged);
            }
        }
        self.store(&zone, boundary);
        Ok(ZoneUpdate::Updated(self.state(&zone)))
    }

    /// Retiles every active facet with the current config and obstacles.
    pub fn refresh(&mut self) -> Result<()> {
        for id in self.active_facets() {
            let boundary = self.boundary_for(&id)?;
            self.store(&id, boundary);
        }
        Ok(())
    }

    /// Deactivates all facets.
    pub fn clear(&mut self) {
        self.active.clear();
        self.arena = PlacementArena {
            entries: BTreeMap::new(),
            last_generation: self.arena.last_generation,
        };
    }

    pub fn state(&self, id: &FacetId) -> FacetState {
        match self.arena.entries.get(id) {
            Some(entry) if self.is_active(id) => FacetState {
                id: id.clone(),
                active: true,
                generation: Some(entry.generation),
                boundary: Some(entry.boundary.clone()),
                placements: entry.result.placements.clone(),
                skipped: entry.result.skipped,
            },
            _ => FacetState::inactive(id.clone()),
        }
    }

    /// Placements of an active facet (empty if inactive).
    pub fn placements(&self, id: &FacetId) -> &[PanelPlacement] {
        self.arena
            .entries
            .get(id)
            .map(|e| e.result.placements.as_slice())
            .unwrap_or_default()
    }

    /// Placements of all active facets in activation order.
    pub fn all_placements(&self) -> Vec<PanelPlacement> {
        self.active.iter().flat_map(|id| self.placements(id).iter().copied()).collect()
    }

    pub fn panel_count(&self) -> usize {
        self.active.iter().map(|id| self.placements(id).len()).sum()
    }

    pub fn skipped_count(&self) -> u32 {
        self.active
            .iter()
            .filter_map(|id| self.arena.entries.get(id))
            .map(|e| e.result.skipped)
            .sum()
    }

    /// Combined render geometry of one facet.
    pub fn batch(&self, id: &FacetId) -> PanelBatch {
        PanelBatch::from_placements(self.placements(id))
    }

    /// Yield estimate for the panels currently placed.
    ///
    /// Pitched roofs use the slope and facing of the first active facet;
    /// flat roofs use the configured tilt and orientation. Only obstacles
    /// on active facets count.
    pub fn performance(&self) -> PerformanceReport {
        let active = self.active_facets();
        let mut calc = YieldCalculator::new(&self.config).with_skipped(self.skipped_count());
        if self.roof == RoofKind::Flat {
            calc = calc.with_tilt(Some(self.config.tilt()));
        } else if let Some(facet) = active.iter().find_map(|id| self.facet(id)) {
            calc = calc
                .with_tilt(facet.slope_degrees())
                .with_orientation(facet.facing_azimuth().or(Some(self.config.orientation_deg)));
        }
        if let Some((w, l)) = self.footprint {
            calc = calc.with_footprint(w, l);
        }

        let relevant: Vec<Obstacle> = if active.is_empty() {
            self.obstacles.clone()
        } else if self.roof == RoofKind::Flat {
            self.obstacles
                .iter()
                .filter(|o| self.facets.first().is_some_and(|f| f.covers(o.position())))
                .cloned()
                .collect()
        } else {
            self.obstacles
                .iter()
                .filter(|o| self.owners(o.position()).iter().any(|owner| active.contains(owner)))
                .cloned()
                .collect()
        };
        calc.report(self.panel_count(), &relevant, &active)
    }

    /// Obstacles tested against the panels of one facet.
    ///
    /// On pitched roofs an obstacle belongs to the covering facet whose plane
    /// is nearest; obstacles off every facet are kept for all of them. Flat
    /// roof zones share every obstacle.
    pub fn obstacles_on(&self, id: &FacetId) -> Vec<Obstacle> {
        if self.roof == RoofKind::Flat {
            return self.obstacles.clone();
        }
        self.obstacles
            .iter()
            .filter(|o| {
                let owners = self.owners(o.position());
                owners.is_empty() || owners.contains(id)
            })
            .cloned()
            .collect()
    }

    /// Covering facets nearest to `p`.
    fn owners(&self, p: Point) -> Vec<FacetId> {
        let covering: Vec<(&Facet, f64)> = self
            .facets
            .iter()
            .filter(|f| f.covers(p))
            .filter_map(|f| f.plane_distance(p).map(|d| (f, d)))
            .collect();
        let Some(nearest) = covering.iter().map(|(_, d)| *d).min_by(f64::total_cmp) else {
            return Vec::new();
        };
        covering
            .into_iter()
            .filter(|(_, d)| *d <= nearest + SHARED_OBSTACLE_TOLERANCE)
            .map(|(f, _)| f.id.clone())
            .collect()
    }

    fn ensure_known(&self, id: &FacetId) -> Result<()> {
        if self.roof.boundary_shape(id).is_none() {
            bail!("Unknown facet '{id}' for a {} roof", self.roof);
        }
        if self.roof != RoofKind::Flat && self.facet(id).is_none() {
            bail!("Facet '{id}' has no geometry");
        }
        Ok(())
    }

    fn boundary_for(&self, id: &FacetId) -> Result<Boundary> {
        if self.roof == RoofKind::Flat {
            let Some(flat) = self.facets.first() else {
                bail!("Flat roof has no geometry");
            };
            return flat_zone_boundary(flat, id, &self.config);
        }
        match self.facet(id) {
            Some(facet) => resolve_boundary(facet, &self.config),
            None => bail!("Facet '{id}' has no geometry"),
        }
    }

    /// Tiles a boundary, stores the result as a new generation and marks the facet active.
    fn store(&mut self, id: &FacetId, boundary: Boundary) {
        let obstacles = self.obstacles_on(id);
        let result = tile(&boundary, &self.config, &obstacles);
        if result.is_empty() {
            warn!(facet = %id, skipped = result.skipped, "no panels fit on facet");
        }
        let key = self.arena.insert(id.clone(), boundary, result, self.inputs_revision);
        if !self.is_active(id) {
            self.active.push_back(id.clone());
        }
        debug!(facet = %id, generation = key.generation, "facet tiled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point;

    fn hip_manager() -> ActivationManager {
        let roof = RoofGeometry::new(RoofKind::Hip, 10.0, 16.0, 4.0).unwrap();
        ActivationManager::from_roof(&roof, PanelConfig::new())
    }

    #[test]
    fn test_hip_fifo_eviction() {
        let mut m = hip_manager();
        m.toggle_facet("front").unwrap();
        m.toggle_facet("right").unwrap();
        m.toggle_facet("back").unwrap();
        assert_eq!(m.active_facets(), vec![FacetId::from("right"), FacetId::from("back")]);
        assert!(m.placements(&"front".into()).is_empty());
    }

    #[test]
    fn test_fifo_not_lru() {
        let mut m = hip_manager();
        m.toggle_facet("front").unwrap();
        m.toggle_facet("right").unwrap();
        // Re-reading "front" does not refresh its position
        let _ = m.state(&"front".into());
        m.toggle_facet("left").unwrap();
        assert_eq!(m.active_facets(), vec![FacetId::from("right"), FacetId::from("left")]);
    }

    #[test]
    fn test_double_toggle_restores() {
        let mut m = hip_manager();
        let before = m.state(&"left".into());
        let on = m.toggle_facet("left").unwrap();
        assert!(on.active);
        assert!(!on.placements.is_empty());
        let off = m.toggle_facet("left").unwrap();
        assert_eq!(off, before);
        assert!(m.active_facets().is_empty());
        assert!(m.arena().is_empty());
    }

    #[test]
    fn test_gable_capacity_one() {
        let roof = RoofGeometry::new(RoofKind::Gable, 8.0, 12.0, 3.0).unwrap();
        let mut m = ActivationManager::from_roof(&roof, PanelConfig::new());
        m.toggle_facet("left").unwrap();
        m.toggle_facet("right").unwrap();
        assert_eq!(m.active_facets(), vec![FacetId::from("right")]);
    }

    #[test]
    fn test_unknown_facet() {
        let mut m = hip_manager();
        assert!(m.toggle_facet("attic").is_err());
        assert!(m.update_zone("north").is_err());
    }

    #[test]
    fn test_generations_supersede() {
        let mut m = hip_manager();
        m.toggle_facet("right").unwrap();
        let old = m.arena().current_key(&"right".into()).unwrap();
        assert!(m.arena().get(&old).is_some());
        m.add_obstacle(Obstacle::chimney(Point::new(9.0, 8.0, 2.0))).unwrap();
        let new = m.arena().current_key(&"right".into()).unwrap();
        assert!(new.generation > old.generation);
        assert!(m.arena().get(&old).is_none());
        assert!(m.arena().get(&new).is_some());
    }

    #[test]
    fn test_obstacle_reduces_count() {
        let mut m = hip_manager();
        let clear = m.toggle_facet("right").unwrap();
        let target = clear.placements[clear.placements.len() / 2].center;
        m.add_obstacle(Obstacle::chimney(target)).unwrap();
        let blocked = m.state(&"right".into());
        assert!(blocked.placements.len() < clear.placements.len());
        assert!(blocked.skipped > 0);
        assert_eq!(m.skipped_count(), blocked.skipped);
    }

    #[test]
    fn test_obstacle_stays_on_its_facet() {
        let clean = hip_manager();
        let mut m = hip_manager();
        let front_normal = m.facet(&"front".into()).unwrap().normal().unwrap();
        m.add_obstacle(Obstacle::window(Point::new(5.5, 3.18, 3.18), front_normal)).unwrap();
        assert_eq!(m.obstacles_on(&"front".into()).len(), 1);
        assert!(m.obstacles_on(&"right".into()).is_empty());

        let mut reference = clean.clone();
        let expected = reference.toggle_facet("right").unwrap();
        let state = m.toggle_facet("right").unwrap();
        assert_eq!(state.placements.len(), expected.placements.len());
        assert_eq!(state.skipped, 0);
    }

    #[test]
    fn test_steep_gable_obstacle_not_shared() {
        // 63 degree slopes: a point on the left slope projects inside the right one
        let roof = RoofGeometry::new(RoofKind::Gable, 6.0, 12.0, 6.0).unwrap();
        let mut m = ActivationManager::from_roof(&roof, PanelConfig::new());
        let p = Point::new(2.5, 6.0, 5.0);
        assert!(m.facet(&"right".into()).unwrap().covers(p));
        m.add_obstacle(Obstacle::vent(p)).unwrap();
        assert_eq!(m.obstacles_on(&"left".into()).len(), 1);
        assert!(m.obstacles_on(&"right".into()).is_empty());

        // Off the roof: kept for every facet
        m.add_obstacle(Obstacle::chimney(Point::new(-5.0, -5.0, 0.0))).unwrap();
        assert_eq!(m.obstacles_on(&"left".into()).len(), 2);
        assert_eq!(m.obstacles_on(&"right".into()).len(), 1);
    }

    #[test]
    fn test_flat_zones_independent() {
        let roof = RoofGeometry::new(RoofKind::Flat, 12.0, 10.0, 0.0).unwrap();
        let mut m = ActivationManager::from_roof(&roof, PanelConfig::new());
        assert!(matches!(m.update_zone("north").unwrap(), ZoneUpdate::Updated(_)));
        assert!(matches!(m.update_zone("south").unwrap(), ZoneUpdate::Updated(_)));
        assert_eq!(m.active_facets().len(), 2);
        // Nothing changed, no recomputation
        assert_eq!(m.update_zone("north").unwrap(), ZoneUpdate::Unchanged);
        // New obstacles retile active zones right away
        let before = m.state(&"north".into());
        m.set_obstacles(vec![Obstacle::vent(Point::new(6.0, 7.5, 0.0))]).unwrap();
        let after = m.state(&"north".into());
        assert!(after.generation > before.generation);
        assert!(after.placements.len() < before.placements.len());
        assert_eq!(m.update_zone("north").unwrap(), ZoneUpdate::Unchanged);
        // An inactive zone is tiled without evicting the others
        assert!(matches!(m.update_zone("center").unwrap(), ZoneUpdate::Updated(_)));
        assert_eq!(m.active_facets().len(), 3);
    }

    #[test]
    fn test_flat_toggle_is_exclusive() {
        let roof = RoofGeometry::new(RoofKind::Flat, 12.0, 10.0, 0.0).unwrap();
        let mut m = ActivationManager::from_roof(&roof, PanelConfig::new());
        m.toggle_facet("center").unwrap();
        m.toggle_facet("east").unwrap();
        assert_eq!(m.active_facets(), vec![FacetId::from("east")]);
        assert!(m.batch(&"east".into()).panel_count() > 0);
    }

    #[test]
    fn test_zero_panels_still_active() {
        let roof = RoofGeometry::new(RoofKind::Pyramid, 2.0, 2.0, 1.0).unwrap();
        let mut m = ActivationManager::from_roof(&roof, PanelConfig::new());
        let state = m.toggle_facet("front").unwrap();
        assert!(state.active);
        assert!(state.placements.is_empty());
        assert_eq!(m.performance().annual_energy_kwh, 0.0);
    }

    #[test]
    fn test_performance_uses_facet_orientation() {
        let mut m = hip_manager();
        m.toggle_facet("right").unwrap();
        let report = m.performance();
        assert_eq!(report.panel_count, m.panel_count());
        // Right slope faces east
        assert_eq!(report.orientation_factor, 0.82);
        assert!(report.annual_energy_kwh > 0.0);
        m.clear();
        assert_eq!(m.panel_count(), 0);
    }
}
