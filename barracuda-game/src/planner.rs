//! Composite path construction over the next few uncompleted waypoints.
//!
//! The planner walks the tracker's upcoming indices in route order and chains
//! one bounded search per navigable waypoint. Helper waypoints never become
//! search targets: hints bias the next search and wind-catcher runs open a
//! branch that competes with the direct route.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::mem;

use crate::config::{NavigatorConfig, RouteOptimization};
use crate::constants::{DEFAULT_LOOKAHEAD, WIND_CATCHER_APPROACH_TOLERANCE};
use crate::cost::TileCostCalculator;
use crate::geometry::{Heading, Tile, point_along};
use crate::hazards::HazardSnapshot;
use crate::progress::TrialContext;
use crate::route::{Route, Waypoint, WaypointKind};
use crate::search::{PathResult, SearchRequest};
use crate::stabilizer::PathStabilizer;

/// Where the vessel is. Paths start from the bow when it is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VesselPose {
    pub center: Tile,
    #[serde(default)]
    pub front: Option<Tile>,
}

impl VesselPose {
    #[must_use]
    pub const fn at(center: Tile) -> Self {
        Self {
            center,
            front: None,
        }
    }

    #[must_use]
    pub const fn with_front(mut self, front: Tile) -> Self {
        self.front = Some(front);
        self
    }

    #[must_use]
    pub fn path_start(&self) -> Tile {
        self.front.unwrap_or(self.center)
    }

    #[must_use]
    pub fn heading(&self) -> Heading {
        self.front
            .map_or(Heading::NONE, |front| self.center.heading_to(front))
    }
}

/// Result of one planning pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanOutcome {
    pub path: Vec<Tile>,
    /// Whether the most recent search reached its goal.
    pub reached_goal: bool,
    pub segments: usize,
}

/// Builds composite paths; owns the stabilizer for the active segment.
#[derive(Debug, Clone)]
pub struct PathPlanner {
    stabilizer: PathStabilizer,
    lookahead: usize,
    optimization: RouteOptimization,
}

impl Default for PathPlanner {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKAHEAD, RouteOptimization::default())
    }
}

impl PathPlanner {
    #[must_use]
    pub fn new(lookahead: usize, optimization: RouteOptimization) -> Self {
        Self {
            stabilizer: PathStabilizer::default(),
            lookahead,
            optimization,
        }
    }

    pub const fn configure(&mut self, config: &NavigatorConfig) {
        self.lookahead = config.lookahead;
        self.optimization = config.route_optimization;
    }

    #[must_use]
    pub const fn stabilizer(&self) -> &PathStabilizer {
        &self.stabilizer
    }

    pub fn clear_active_path(&mut self) {
        self.stabilizer.clear_active_path();
    }

    /// Compose a path over the next `lookahead` uncompleted waypoints.
    pub fn plan(
        &mut self,
        trial: &TrialContext,
        pose: VesselPose,
        hazards: &HazardSnapshot,
    ) -> PlanOutcome {
        let indices = trial.upcoming_waypoints(self.lookahead);
        if indices.is_empty() {
            return PlanOutcome::default();
        }
        let route = trial.route();
        let mut composer = Composer {
            stabilizer: &mut self.stabilizer,
            hazards,
            fingerprint: hazards.fingerprint(),
            secondary: trial.secondary_objective(),
            optimization: self.optimization,
            initial_heading: pose.heading(),
            position: pose.path_start(),
            path: Vec::new(),
            hints: BTreeSet::new(),
            reached_goal: false,
            segments: 0,
        };

        let mut cursor = 0;
        while let Some(waypoint) = indices.get(cursor).and_then(|&i| route.get(i)) {
            match waypoint.kind {
                WaypointKind::PathfindingHint => {
                    composer.hints.insert(waypoint.location);
                    cursor += 1;
                }
                WaypointKind::PortalExit => cursor += 1,
                WaypointKind::WindCatcher => {
                    let run = WindCatcherRun::collect(route, &indices, cursor);
                    let reached = composer.branch(&run);
                    cursor = run.resume_at;
                    let consumed_entry = run
                        .next_normal
                        .is_some_and(|wp| wp.kind == WaypointKind::PortalEntry);
                    if !reached || consumed_entry {
                        break;
                    }
                }
                WaypointKind::PortalEntry => {
                    composer.segment_to(waypoint);
                    break;
                }
                _ => {
                    if !composer.segment_to(waypoint) {
                        break;
                    }
                    cursor += 1;
                }
            }
        }

        if composer.path.is_empty() {
            composer.path.push(composer.position);
        }
        PlanOutcome {
            path: composer.path,
            reached_goal: composer.reached_goal,
            segments: composer.segments,
        }
    }
}

/// Consecutive wind catchers plus the hints and normal waypoint after them.
struct WindCatcherRun<'r> {
    first: Option<&'r Waypoint>,
    catchers: Vec<Tile>,
    trailing_hints: BTreeSet<Tile>,
    next_normal: Option<&'r Waypoint>,
    resume_at: usize,
}

impl<'r> WindCatcherRun<'r> {
    fn collect(route: &'r Route, indices: &[usize], start: usize) -> Self {
        let kind_at = |cursor: usize| indices.get(cursor).and_then(|&i| route.get(i));
        let mut cursor = start;
        let first = kind_at(cursor).filter(|wp| wp.kind == WaypointKind::WindCatcher);
        let mut catchers = Vec::new();
        while let Some(wp) = kind_at(cursor).filter(|wp| wp.kind == WaypointKind::WindCatcher) {
            catchers.push(wp.location);
            cursor += 1;
        }
        let mut trailing_hints = BTreeSet::new();
        while let Some(wp) = kind_at(cursor).filter(|wp| wp.kind == WaypointKind::PathfindingHint) {
            trailing_hints.insert(wp.location);
            cursor += 1;
        }
        let next_normal = kind_at(cursor)
            .filter(|wp| wp.kind.is_navigable() && wp.kind != WaypointKind::PortalExit);
        if next_normal.is_some() {
            cursor += 1;
        }
        Self {
            first,
            catchers,
            trailing_hints,
            next_normal,
            resume_at: cursor,
        }
    }
}

struct Composer<'a> {
    stabilizer: &'a mut PathStabilizer,
    hazards: &'a HazardSnapshot,
    fingerprint: u64,
    secondary: Option<Tile>,
    optimization: RouteOptimization,
    initial_heading: Heading,
    position: Tile,
    path: Vec<Tile>,
    hints: BTreeSet<Tile>,
    reached_goal: bool,
    segments: usize,
}

impl Composer<'_> {
    /// Heading of the composed path so far, or the vessel's own heading.
    fn heading_of(path: &[Tile], fallback: Heading) -> Heading {
        match path {
            [.., a, b] => a.heading_to(*b),
            _ => fallback,
        }
    }

    fn search(
        &mut self,
        start: Tile,
        goal: Tile,
        tolerance: u32,
        heading: Heading,
        hints: &BTreeSet<Tile>,
        on_active_segment: bool,
    ) -> PathResult {
        let costs = TileCostCalculator::new(self.hazards, self.optimization)
            .with_hints(hints.iter().copied())
            .with_secondary_objective(self.secondary);
        let request = SearchRequest::new(start, goal, tolerance).with_heading(heading);
        self.stabilizer
            .find_path(&costs, self.fingerprint, &request, on_active_segment)
    }

    fn append(&mut self, segment: &[Tile]) {
        let skip = usize::from(!self.path.is_empty());
        self.path.extend(segment.iter().skip(skip).copied());
        if let Some(&last) = self.path.last() {
            self.position = last;
        }
        self.segments += 1;
    }

    /// Path to one navigable waypoint. Returns whether it was reached.
    fn segment_to(&mut self, waypoint: &Waypoint) -> bool {
        let Some(target) = resolve_target(self.position, waypoint, self.hazards) else {
            debug!("no reachable target for {waypoint}; holding position");
            let hold = PathResult::stationary(self.position, false);
            self.append(&hold.path);
            self.reached_goal = hold.reached_goal;
            return false;
        };
        let hints = mem::take(&mut self.hints);
        let heading = Self::heading_of(&self.path, self.initial_heading);
        let on_active = self.path.is_empty();
        let result = self.search(
            self.position,
            target,
            waypoint.tolerance(),
            heading,
            &hints,
            on_active,
        );
        self.append(&result.path);
        self.reached_goal = result.reached_goal;
        result.reached_goal
    }

    /// Compare going through the wind-catcher run with going straight to the
    /// next normal waypoint, and append the better one.
    fn branch(&mut self, run: &WindCatcherRun<'_>) -> bool {
        let Some(first_catcher) = run.first else {
            return true;
        };
        let approach_hints = mem::take(&mut self.hints);
        let heading = Self::heading_of(&self.path, self.initial_heading);
        let on_active = self.path.is_empty();
        let entry = resolve_target(self.position, first_catcher, self.hazards);
        let target = run.next_normal.and_then(|wp| {
            resolve_target(entry.unwrap_or(self.position), wp, self.hazards)
                .map(|t| (t, wp.tolerance()))
        });

        let approach = match entry {
            Some(entry) => self.search(
                self.position,
                entry,
                WIND_CATCHER_APPROACH_TOLERANCE,
                heading,
                &approach_hints,
                on_active,
            ),
            None => {
                debug!("wind catcher {first_catcher} is out of the scene");
                PathResult::stationary(self.position, false)
            }
        };
        let mut via = approach.path;
        let mut via_cost = approach.cost;
        let mut via_reached = approach.reached_goal;
        if let Some(entry) = entry.filter(|_| via_reached) {
            if via.last() != Some(&entry) {
                via.push(entry);
            }
            let mut hop_from = entry;
            for &catcher in run.catchers.iter().skip(1) {
                via.extend(straight_hop(hop_from, catcher));
                hop_from = catcher;
            }
            if let Some((goal, tolerance)) = target {
                let from = via.last().copied().unwrap_or(entry);
                let post = self.search(
                    from,
                    goal,
                    tolerance,
                    Self::heading_of(&via, heading),
                    &run.trailing_hints,
                    false,
                );
                via.extend(post.path.iter().skip(1).copied());
                via_cost += post.cost;
                via_reached = post.reached_goal;
            }
        }

        let direct = target.map(|(goal, tolerance)| {
            self.search(
                self.position,
                goal,
                tolerance,
                heading,
                &run.trailing_hints,
                false,
            )
        });

        let take_branch = match &direct {
            None => true,
            Some(direct) => match (via_reached, direct.reached_goal) {
                (true, false) => true,
                (false, true) => false,
                _ => via_cost <= direct.cost,
            },
        };
        debug!(
            "wind catcher run of {}: via cost {via_cost} (reached {via_reached}), direct {:?}; taking {}",
            run.catchers.len(),
            direct.as_ref().map(|d| (d.cost, d.reached_goal)),
            if take_branch { "branch" } else { "direct" }
        );

        match direct {
            Some(direct) if !take_branch => {
                self.append(&direct.path);
                self.reached_goal = direct.reached_goal;
            }
            _ => {
                self.append(&via);
                self.reached_goal = via_reached;
            }
        }
        self.reached_goal
    }
}

/// Tiles after `from` up to and including `to` along a straight line.
fn straight_hop(from: Tile, to: Tile) -> impl Iterator<Item = Tile> {
    let steps = i32::try_from(from.chebyshev(to)).unwrap_or(i32::MAX);
    (1..=steps).map(move |step| point_along(from, to, step, steps))
}

/// In-scene target for `waypoint`: its location, else the first usable
/// fallback, else the furthest usable tile on the line from `start` toward it.
#[must_use]
pub fn resolve_target(start: Tile, waypoint: &Waypoint, hazards: &HazardSnapshot) -> Option<Tile> {
    std::iter::once(waypoint.location)
        .chain(waypoint.fallbacks.iter().copied())
        .find(|&tile| hazards.is_in_play(tile))
        .or_else(|| nearest_along_line(start, waypoint.location, hazards))
}

fn nearest_along_line(start: Tile, target: Tile, hazards: &HazardSnapshot) -> Option<Tile> {
    let steps = i32::try_from(start.chebyshev(target)).unwrap_or(i32::MAX);
    let (mut low, mut high) = (0, steps);
    let mut best = None;
    while low <= high {
        let mid = low + (high - low) / 2;
        let candidate = point_along(start, target, mid, steps);
        if hazards.is_in_play(candidate) {
            best = Some(candidate);
            low = mid + 1;
        } else {
            high = mid - 1;
        }
    }
    best
}
