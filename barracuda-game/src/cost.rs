//! Per-tile traversal cost for one hazard snapshot.
//!
//! A tile is blocked when the vessel's footprint, centred on it, would
//! overlap an obstacle, or when the tile lies outside the loaded scene or the
//! trial area. Everything else gets a finite positive cost.

use std::collections::BTreeSet;

use crate::config::RouteOptimization;
use crate::constants::{
    COST_BASELINE, COST_HINT, COST_SLOW_HAZARD, COST_SPEED_BOOST_EFFICIENT,
    COST_SPEED_BOOST_RELAXED, SECONDARY_BIAS_RADIUS,
};
use crate::geometry::{Tile, TileRect};
use crate::hazards::HazardSnapshot;

/// Traversal cost of entering a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cost {
    Blocked,
    Finite(u32),
}

impl Cost {
    #[must_use]
    pub const fn is_blocked(self) -> bool {
        matches!(self, Self::Blocked)
    }

    #[must_use]
    pub const fn finite(self) -> Option<u32> {
        match self {
            Self::Blocked => None,
            Self::Finite(value) => Some(value),
        }
    }
}

/// Seam between the search and whatever prices the grid.
pub trait CostModel {
    /// Cost of entering `tile`.
    fn cost(&self, tile: Tile) -> Cost;

    /// Lower bound on any finite step cost; scales the search heuristic.
    fn min_step_cost(&self) -> u32;

    /// Ordering among equally priced tiles; lower is preferred.
    fn preference(&self, _tile: Tile) -> u32 {
        0
    }
}

/// Cost model over a [`HazardSnapshot`], optionally biased by hint tiles and
/// the trial's secondary objective.
#[derive(Debug, Clone)]
pub struct TileCostCalculator<'a> {
    snapshot: &'a HazardSnapshot,
    hints: BTreeSet<Tile>,
    secondary: Option<Tile>,
    optimization: RouteOptimization,
    half_extents: (i32, i32),
}

impl<'a> TileCostCalculator<'a> {
    #[must_use]
    pub fn new(snapshot: &'a HazardSnapshot, optimization: RouteOptimization) -> Self {
        Self {
            snapshot,
            hints: BTreeSet::new(),
            secondary: None,
            optimization,
            half_extents: snapshot.footprint.half_extents(),
        }
    }

    /// Tiles the route author marked as preferred lines.
    #[must_use]
    pub fn with_hints(mut self, hints: impl IntoIterator<Item = Tile>) -> Self {
        self.hints = hints.into_iter().collect();
        self
    }

    #[must_use]
    pub const fn with_secondary_objective(mut self, secondary: Option<Tile>) -> Self {
        self.secondary = secondary;
        self
    }

    const fn boost_cost(&self) -> u32 {
        match self.optimization {
            RouteOptimization::Relaxed => COST_SPEED_BOOST_RELAXED,
            RouteOptimization::Efficient => COST_SPEED_BOOST_EFFICIENT,
        }
    }

    /// True when the vessel footprint centred on `tile` overlaps an obstacle.
    #[must_use]
    pub fn footprint_collides(&self, tile: Tile) -> bool {
        let (half_w, half_h) = self.half_extents;
        TileRect::around(tile, half_w, half_h)
            .tiles()
            .any(|t| self.snapshot.is_obstacle(t))
    }
}

impl CostModel for TileCostCalculator<'_> {
    fn cost(&self, tile: Tile) -> Cost {
        if !self.snapshot.is_in_play(tile) || self.footprint_collides(tile) {
            return Cost::Blocked;
        }
        if self.snapshot.speed_boosts.contains(&tile) {
            return Cost::Finite(self.boost_cost());
        }
        if self.snapshot.slow_hazards.contains(&tile) {
            return Cost::Finite(COST_SLOW_HAZARD);
        }
        if self.hints.contains(&tile) {
            return Cost::Finite(COST_HINT);
        }
        Cost::Finite(COST_BASELINE)
    }

    /// Only discounts this snapshot can actually produce lower the bound.
    fn min_step_cost(&self) -> u32 {
        let mut floor = COST_BASELINE;
        if !self.hints.is_empty() {
            floor = floor.min(COST_HINT);
        }
        if !self.snapshot.speed_boosts.is_empty() {
            floor = floor.min(self.boost_cost());
        }
        floor
    }

    /// Closer to the secondary objective wins ties, within a fixed radius.
    fn preference(&self, tile: Tile) -> u32 {
        self.secondary
            .map_or(0, |anchor| anchor.chebyshev(tile).min(SECONDARY_BIAS_RADIUS))
    }
}
