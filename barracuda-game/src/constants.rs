//! Centralized tuning constants for the navigation core.
//!
//! Costs are fixed-point integers (100 = one ordinary open-water tile) so the
//! search stays exact and deterministic across platforms.

// Tile costs ---------------------------------------------------------------
pub const COST_BASELINE: u32 = 100;
pub const COST_SPEED_BOOST_RELAXED: u32 = 40;
pub const COST_SPEED_BOOST_EFFICIENT: u32 = 25;
pub const COST_HINT: u32 = 60;
pub const COST_SLOW_HAZARD: u32 = 400;
/// Beyond this distance the secondary objective no longer orders ties.
pub const SECONDARY_BIAS_RADIUS: u32 = 8;
/// Boost objects grant a halo of this radius around their anchor tile.
pub const SPEED_BOOST_HALO: u32 = 1;

// Search budget ------------------------------------------------------------
pub const SEARCH_MIN_EXPANSIONS: usize = 35;
pub const SEARCH_MAX_EXPANSIONS: usize = 80;
pub const SEARCH_EXPANSIONS_PER_TILE: usize = 8;

// Stabilizer ---------------------------------------------------------------
/// Largest gap (Chebyshev) between the vessel and the cached path that still
/// allows the cached suffix to be reused.
pub const REJOIN_DISTANCE: u32 = 1;

// Planner ------------------------------------------------------------------
/// Tolerance used when approaching the first wind catcher of a run.
pub const WIND_CATCHER_APPROACH_TOLERANCE: u32 = 1;

// Navigator defaults -------------------------------------------------------
pub const DEFAULT_LOOKAHEAD: usize = 3;
pub const MAX_LOOKAHEAD: usize = 16;
pub const DEFAULT_RECALC_INTERVAL_TICKS: u32 = 2;
