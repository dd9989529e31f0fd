//! Barracuda Trials navigation core
//!
//! Platform-agnostic route tracking and path planning for the sailing trials.
//! This crate performs no I/O and keeps no global state; the host feeds it
//! vessel poses, hazard snapshots and objective events, and reads back a
//! composite path plus progress.

pub mod config;
pub mod constants;
pub mod cost;
pub mod events;
pub mod geometry;
pub mod hazards;
pub mod navigator;
pub mod planner;
pub mod progress;
pub mod route;
pub mod search;
pub mod signals;
pub mod stabilizer;

// Re-export commonly used types
pub use config::{ConfigError, NavigatorConfig, RouteOptimization};
pub use cost::{Cost, CostModel, TileCostCalculator};
pub use events::{CompletedIndices, ObjectiveEvent, ProgressChange, TextSignal};
pub use geometry::{Heading, Tile, TileRect, tiles_with_tolerance};
pub use hazards::HazardSnapshot;
pub use navigator::{NavigationView, RecomputeReason, TickInput, TrialNavigator};
pub use planner::{PathPlanner, PlanOutcome, VesselPose, resolve_target};
pub use progress::{CompletionSet, RouteProgressTracker, TrackerState, TrialContext};
pub use route::{
    Difficulty, FallbackTiles, ObjectIds, Route, RouteCatalog, RouteDataError, RouteSource,
    TrialKind, VesselFootprint, Waypoint, WaypointKind,
};
pub use search::{BoundedAStarSearch, PathResult, SearchRequest, expansion_budget};
pub use signals::CollectibleWatcher;
pub use stabilizer::{ActivePathState, PathStabilizer};
