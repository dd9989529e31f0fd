//! Route data: waypoint kinds, per-trial constants, and the cyclic route itself.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::geometry::Tile;

pub mod catalog;
pub use catalog::{RouteCatalog, RouteDataError, RouteSource};

/// Alternate locations tried in order when the primary location is off-scene.
pub type FallbackTiles = SmallVec<[Tile; 4]>;

/// Object ids a waypoint accepts for identity-based completion.
pub type ObjectIds = SmallVec<[u32; 4]>;

/// Trial difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Swordfish,
    Shark,
    Marlin,
}

impl Difficulty {
    /// Number of laps (deliveries) needed to finish the trial at this tier.
    #[must_use]
    pub const fn laps_required(self) -> u32 {
        match self {
            Self::Swordfish => 1,
            Self::Shark => 2,
            Self::Marlin => 3,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Swordfish => "swordfish",
            Self::Shark => "shark",
            Self::Marlin => "marlin",
        }
    }
}

/// Vessel footprint in tiles, used to inflate obstacles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VesselFootprint {
    pub width: u32,
    pub height: u32,
}

impl VesselFootprint {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Half extents of the footprint, rounded outward.
    #[must_use]
    pub fn half_extents(self) -> (i32, i32) {
        let half = |v: u32| i32::try_from(v / 2).unwrap_or(i32::MAX / 4);
        (half(self.width), half(self.height))
    }
}

impl Default for VesselFootprint {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// Trial variant. Each variant carries its own constant data; the route
/// tables themselves live in the [`RouteCatalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialKind {
    /// Rum runs between a pickup and a drop-off while lightning clouds drift.
    TemporTantrum,
    /// Toad collection and toad pillars; fetid pools slow the vessel.
    JubblyJive,
    /// Crystal motes and portal pairs.
    GwenithGlide,
}

impl TrialKind {
    pub const ALL: [Self; 3] = [Self::TemporTantrum, Self::JubblyJive, Self::GwenithGlide];

    /// Obstacle inflation footprint for the vessels used in this trial.
    #[must_use]
    pub const fn footprint(self) -> VesselFootprint {
        match self {
            Self::TemporTantrum | Self::GwenithGlide => VesselFootprint::new(3, 2),
            Self::JubblyJive => VesselFootprint::new(3, 3),
        }
    }

    /// Waypoint kind whose first uncompleted instance biases cost ties.
    #[must_use]
    pub const fn secondary_objective(self) -> Option<WaypointKind> {
        match self {
            Self::TemporTantrum => Some(WaypointKind::RumDropoff),
            Self::JubblyJive => Some(WaypointKind::ToadPillar),
            Self::GwenithGlide => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TemporTantrum => "tempor_tantrum",
            Self::JubblyJive => "jubbly_jive",
            Self::GwenithGlide => "gwenith_glide",
        }
    }
}

/// Semantic kind of a waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaypointKind {
    Shipment,
    RumPickup,
    RumDropoff,
    ToadPickup,
    ToadPillar,
    CrystalMote,
    PortalEntry,
    PortalExit,
    PathfindingHint,
    WindCatcher,
}

impl WaypointKind {
    /// Default "reached" radius in tiles.
    #[must_use]
    pub const fn default_tolerance(self) -> u32 {
        match self {
            Self::Shipment => 2,
            Self::RumPickup | Self::RumDropoff | Self::PortalEntry => 7,
            Self::ToadPickup => 9,
            Self::ToadPillar | Self::PortalExit => 10,
            Self::CrystalMote => 5,
            Self::PathfindingHint | Self::WindCatcher => 0,
        }
    }

    /// Helper kinds bias or branch a path but are never routed to directly.
    #[must_use]
    pub const fn is_helper(self) -> bool {
        matches!(self, Self::PathfindingHint | Self::WindCatcher)
    }

    #[must_use]
    pub const fn is_navigable(self) -> bool {
        !self.is_helper()
    }

    /// Kinds completed through an object-identity match.
    #[must_use]
    pub const fn takes_object_ids(self) -> bool {
        matches!(self, Self::ToadPillar | Self::PortalEntry | Self::PortalExit)
    }
}

/// One targetable location on a route. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waypoint {
    pub kind: WaypointKind,
    #[serde(default = "Waypoint::default_lap")]
    pub lap: u32,
    pub location: Tile,
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub fallbacks: FallbackTiles,
    /// Overrides the kind's default tolerance when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<u32>,
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub object_ids: ObjectIds,
}

impl Waypoint {
    const fn default_lap() -> u32 {
        1
    }

    #[must_use]
    pub fn new(kind: WaypointKind, lap: u32, location: Tile) -> Self {
        Self {
            kind,
            lap,
            location,
            fallbacks: FallbackTiles::new(),
            tolerance: None,
            object_ids: ObjectIds::new(),
        }
    }

    #[must_use]
    pub fn with_fallbacks(mut self, fallbacks: impl IntoIterator<Item = Tile>) -> Self {
        self.fallbacks = fallbacks.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_object_ids(mut self, ids: impl IntoIterator<Item = u32>) -> Self {
        self.object_ids = ids.into_iter().collect();
        self
    }

    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: u32) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    /// Effective "reached" radius.
    #[must_use]
    pub fn tolerance(&self) -> u32 {
        self.tolerance.unwrap_or_else(|| self.kind.default_tolerance())
    }

    #[must_use]
    pub fn matches_object(&self, object_id: u32) -> bool {
        self.object_ids.contains(&object_id)
    }
}

impl std::fmt::Display for Waypoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} (lap {}) at {}", self.kind, self.lap, self.location)
    }
}

/// Fixed-length, logically cyclic waypoint sequence for one trial attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    kind: TrialKind,
    difficulty: Difficulty,
    waypoints: Vec<Waypoint>,
}

impl Route {
    #[must_use]
    pub const fn new(kind: TrialKind, difficulty: Difficulty, waypoints: Vec<Waypoint>) -> Self {
        Self {
            kind,
            difficulty,
            waypoints,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> TrialKind {
        self.kind
    }

    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Waypoint at `index`, taken modulo the route length.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Waypoint> {
        if self.waypoints.is_empty() {
            return None;
        }
        self.waypoints.get(index % self.waypoints.len())
    }

    #[must_use]
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// `index + offset` wrapped into `[0, len)`.
    #[must_use]
    pub fn wrap(&self, index: usize, offset: usize) -> usize {
        if self.waypoints.is_empty() {
            return 0;
        }
        (index % self.waypoints.len() + offset % self.waypoints.len()) % self.waypoints.len()
    }

    /// `index - back` wrapped into `[0, len)`.
    #[must_use]
    pub fn wrap_back(&self, index: usize, back: usize) -> usize {
        let len = self.waypoints.len();
        if len == 0 {
            return 0;
        }
        (index % len + len - back % len) % len
    }

    /// Indices in cyclic order starting at `start`, visiting each index once.
    pub fn cyclic_indices(&self, start: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.waypoints.len()).map(move |offset| self.wrap(start, offset))
    }
}
