//! Simulated sea and vessel that stand in for the live game client.
//!
//! The world knows the true route and plays it back in order: when the vessel
//! sails within a waypoint's tolerance it produces the signal the client
//! would have produced for that objective.

use barracuda_game::{
    HazardSnapshot, Heading, ObjectiveEvent, Route, TextSignal, Tile, TileRect, VesselFootprint,
    VesselPose, WaypointKind,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::collections::BTreeSet;
use std::mem;

/// Static layout of a scenario's sea.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeaMap {
    pub bounds: TileRect,
    pub vessel_start: Tile,
    pub rocks: Vec<Tile>,
    pub boost_anchors: Vec<Tile>,
    pub slow_pools: Vec<Tile>,
    /// Starting tiles of the drifting storm clouds.
    pub clouds: Vec<Tile>,
}

impl SeaMap {
    #[must_use]
    pub fn new(width: i32, height: i32, vessel_start: Tile) -> Self {
        Self {
            bounds: TileRect::new(Tile::new(0, 0), Tile::new(width, height)),
            vessel_start,
            rocks: Vec::new(),
            boost_anchors: Vec::new(),
            slow_pools: Vec::new(),
            clouds: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_rocks(mut self, rect: TileRect) -> Self {
        self.rocks.extend(rect.tiles());
        self
    }

    /// Rock column spanning the whole sea at `x`.
    #[must_use]
    pub fn with_wall(self, x: i32) -> Self {
        let (min_y, max_y) = (self.bounds.min.y, self.bounds.max.y);
        self.with_rocks(TileRect::new(Tile::new(x, min_y), Tile::new(x, max_y)))
    }

    #[must_use]
    pub fn with_boosts(mut self, anchors: impl IntoIterator<Item = Tile>) -> Self {
        self.boost_anchors.extend(anchors);
        self
    }

    #[must_use]
    pub fn with_slow_pools(mut self, rect: TileRect) -> Self {
        self.slow_pools.extend(rect.tiles());
        self
    }

    #[must_use]
    pub fn with_clouds(mut self, clouds: impl IntoIterator<Item = Tile>) -> Self {
        self.clouds.extend(clouds);
        self
    }
}

/// Counters describing what the world did during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorldStats {
    pub tiles_sailed: u32,
    pub deliveries: u32,
    pub pillar_activations: u32,
    pub teleports: u32,
    pub wind_launches: u32,
    pub collectibles_picked: u32,
}

#[derive(Debug, Clone, Copy)]
struct Vessel {
    center: Tile,
    heading: Heading,
}

/// One simulated trial attempt.
#[derive(Debug, Clone)]
pub struct SimulatedWorld {
    map: SeaMap,
    route: Route,
    footprint: VesselFootprint,
    vessel: Vessel,
    cursor: usize,
    clouds: Vec<Tile>,
    collectibles: BTreeSet<Tile>,
    collected: u32,
    /// First tile of each wind-catcher run and the tile it launches to.
    wind_runs: Vec<(Tile, Tile)>,
    activated_pillars: BTreeSet<Tile>,
    pending: Vec<ObjectiveEvent>,
    visited: Vec<Tile>,
    stats: WorldStats,
    rng: ChaCha8Rng,
}

impl SimulatedWorld {
    #[must_use]
    pub fn new(map: SeaMap, route: Route, seed: u64) -> Self {
        let collectibles = route
            .waypoints()
            .iter()
            .filter(|wp| matches!(wp.kind, WaypointKind::Shipment | WaypointKind::CrystalMote))
            .map(|wp| wp.location)
            .collect();
        let wind_runs = wind_runs(&route);
        let vessel = Vessel {
            center: map.vessel_start,
            heading: Heading::NONE,
        };
        Self {
            footprint: route.kind().footprint(),
            clouds: map.clouds.clone(),
            visited: vec![map.vessel_start],
            map,
            route,
            vessel,
            cursor: 0,
            collectibles,
            collected: 0,
            wind_runs,
            activated_pillars: BTreeSet::new(),
            pending: Vec::new(),
            stats: WorldStats::default(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    #[must_use]
    pub const fn stats(&self) -> WorldStats {
        self.stats
    }

    #[must_use]
    pub fn visited(&self) -> &[Tile] {
        &self.visited
    }

    #[must_use]
    pub const fn vessel_tile(&self) -> Tile {
        self.vessel.center
    }

    /// Every route objective has been played back.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.route.len()
    }

    /// Pose as the client would report it; the bow is one tile ahead along
    /// the last move while that tile is in play.
    #[must_use]
    pub fn pose(&self) -> VesselPose {
        let Vessel { center, heading } = self.vessel;
        let pose = VesselPose::at(center);
        if heading.is_none() {
            return pose;
        }
        let front = center.offset(heading.dx.signum(), heading.dy.signum());
        if self.map.bounds.contains(front) {
            pose.with_front(front)
        } else {
            pose
        }
    }

    /// Hazard snapshot for the current tick.
    #[must_use]
    pub fn hazards(&self) -> HazardSnapshot {
        let mut snapshot = HazardSnapshot::open_water(self.map.bounds, self.footprint)
            .with_rocks(self.map.rocks.iter().copied())
            .with_slow_hazards(self.map.slow_pools.iter().copied())
            .with_dangerous(self.clouds.iter().copied());
        for &anchor in &self.map.boost_anchors {
            snapshot.add_speed_boost_object(anchor);
        }
        for wp in self.route.waypoints() {
            if wp.kind == WaypointKind::ToadPillar {
                let interacted = self.activated_pillars.contains(&wp.location);
                snapshot.set_structure(wp.location, interacted);
            }
        }
        snapshot
    }

    /// Signals the client emits on entering the trial: every pillar is seen
    /// once in its dormant state.
    #[must_use]
    pub fn initial_events(&self) -> Vec<ObjectiveEvent> {
        let ids: BTreeSet<u32> = self
            .route
            .waypoints()
            .iter()
            .flat_map(|wp| wp.object_ids.iter().copied())
            .collect();
        ids.into_iter()
            .map(|object_id| ObjectiveEvent::IdentityToggle {
                object_id,
                now_active: false,
            })
            .collect()
    }

    pub fn visible_collectibles(&self) -> impl Iterator<Item = Tile> + '_ {
        self.collectibles.iter().copied()
    }

    #[must_use]
    pub const fn collected(&self) -> u32 {
        self.collected
    }

    /// Move every storm cloud one random step, staying inside the sea.
    pub fn drift(&mut self) {
        let bounds = self.map.bounds;
        for cloud in &mut self.clouds {
            let dx = self.rng.gen_range(-1..=1);
            let dy = self.rng.gen_range(-1..=1);
            let moved = cloud.offset(dx, dy);
            if bounds.contains(moved) {
                *cloud = moved;
            }
        }
    }

    /// Sail up to `speed` tiles along `path`, stopping early once the next
    /// objective is in reach. The vessel only follows a path that starts where
    /// it is (or at its bow); wind catchers carry it to the end of their run
    /// at once.
    pub fn sail(&mut self, path: &[Tile], speed: usize) {
        let center = self.vessel.center;
        let ahead: &[Tile] = match path.iter().position(|&tile| tile == center) {
            Some(index) => &path[index + 1..],
            None if path.first().is_some_and(|first| first.chebyshev(center) <= 1) => path,
            None => &[],
        };
        for &tile in ahead.iter().take(speed) {
            self.step_to(tile);
            if let Some(&(_, landing)) = self.wind_runs.iter().find(|(first, _)| *first == tile) {
                log::debug!("wind catcher at {tile} launches the vessel to {landing}");
                self.step_to(landing);
                self.stats.wind_launches += 1;
                break;
            }
            if self.objective_in_reach() {
                break;
            }
        }
    }

    fn objective_in_reach(&self) -> bool {
        self.route
            .waypoints()
            .iter()
            .skip(self.cursor)
            .find(|wp| wp.kind.is_navigable())
            .is_some_and(|wp| wp.location.chebyshev(self.vessel.center) <= wp.tolerance())
    }

    fn step_to(&mut self, tile: Tile) {
        let from = self.vessel.center;
        if from == tile {
            return;
        }
        let heading = from.heading_to(tile);
        self.vessel = Vessel {
            center: tile,
            heading: Heading::new(heading.dx.signum(), heading.dy.signum()),
        };
        self.visited.push(tile);
        self.stats.tiles_sailed += from.chebyshev(tile);
    }

    /// Play back every objective the vessel is now close enough to, in route
    /// order, and report the resulting client signals. Proximity is reported
    /// every tick.
    pub fn observe(&mut self) -> Vec<ObjectiveEvent> {
        let mut events = mem::take(&mut self.pending);
        while let Some(waypoint) = self.route.waypoints().get(self.cursor).cloned() {
            if waypoint.kind.is_helper() {
                self.cursor += 1;
                continue;
            }
            if waypoint.location.chebyshev(self.vessel.center) > waypoint.tolerance() {
                break;
            }
            self.cursor += 1;
            match waypoint.kind {
                WaypointKind::Shipment | WaypointKind::CrystalMote => {
                    if self.collectibles.remove(&waypoint.location) {
                        self.collected += 1;
                        self.stats.collectibles_picked += 1;
                    }
                }
                WaypointKind::RumPickup => events.push(text(TextSignal::RumCollected)),
                WaypointKind::RumDropoff => {
                    events.push(text(TextSignal::RumDelivered));
                    self.stats.deliveries += 1;
                }
                WaypointKind::ToadPickup => events.push(text(TextSignal::ToadsCollected)),
                WaypointKind::ToadPillar => {
                    if let Some(&object_id) = waypoint.object_ids.first() {
                        events.push(ObjectiveEvent::IdentityToggle {
                            object_id,
                            now_active: true,
                        });
                        // The pillar falls dormant again on the next tick.
                        self.pending.push(ObjectiveEvent::IdentityToggle {
                            object_id,
                            now_active: false,
                        });
                    }
                    self.activated_pillars.insert(waypoint.location);
                    self.stats.pillar_activations += 1;
                }
                WaypointKind::PortalEntry => events.push(self.traverse_portal()),
                WaypointKind::PortalExit => {}
                WaypointKind::PathfindingHint | WaypointKind::WindCatcher => {}
            }
        }
        events.push(ObjectiveEvent::Proximity {
            location: self.vessel.center,
        });
        events
    }

    /// Teleport to the paired exit. The client moves the vessel before the
    /// traversal message appears.
    fn traverse_portal(&mut self) -> ObjectiveEvent {
        let exit = self
            .route
            .waypoints()
            .get(self.cursor)
            .filter(|wp| wp.kind == WaypointKind::PortalExit)
            .map(|wp| wp.location);
        if let Some(exit) = exit {
            log::debug!("portal carries the vessel from {} to {exit}", self.vessel.center);
            self.vessel = Vessel {
                center: exit,
                heading: Heading::NONE,
            };
            self.visited.push(exit);
            self.cursor += 1;
        }
        self.stats.teleports += 1;
        text(TextSignal::PortalTraversed)
    }
}

const fn text(signal: TextSignal) -> ObjectiveEvent {
    ObjectiveEvent::Text { signal }
}

fn wind_runs(route: &Route) -> Vec<(Tile, Tile)> {
    let mut runs = Vec::new();
    let mut current: Option<(Tile, Tile)> = None;
    for wp in route.waypoints() {
        if wp.kind == WaypointKind::WindCatcher {
            current = Some(current.map_or((wp.location, wp.location), |(first, _)| {
                (first, wp.location)
            }));
        } else if let Some(run) = current.take() {
            runs.push(run);
        }
    }
    runs.extend(current);
    runs
}
