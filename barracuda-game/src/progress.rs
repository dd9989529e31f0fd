//! Waypoint and lap state machine for one trial attempt.
//!
//! The tracker is independent of pathfinding: it consumes objective events and
//! reports what changed through [`ProgressChange`].

use log::{debug, info, warn};
use std::collections::HashMap;

use crate::events::{ObjectiveEvent, ProgressChange, TextSignal};
use crate::geometry::Tile;
use crate::route::{Difficulty, Route, RouteCatalog, TrialKind, WaypointKind};

/// Bitset of completed waypoint indices, sized to the route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionSet {
    words: Vec<u64>,
    len: usize,
}

impl CompletionSet {
    #[must_use]
    pub fn with_len(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(64)],
            len,
        }
    }

    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        index < self.len && self.words[index / 64] & (1 << (index % 64)) != 0
    }

    /// Marks `index`; returns false when it was already set or out of range.
    pub fn insert(&mut self, index: usize) -> bool {
        if index >= self.len || self.contains(index) {
            return false;
        }
        self.words[index / 64] |= 1 << (index % 64);
        true
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(|&i| self.contains(i))
    }
}

/// Everything that belongs to one attempt; dropped on exit.
#[derive(Debug, Clone)]
pub struct TrialContext {
    route: Route,
    completed: CompletionSet,
    current_lap: u32,
    next_navigable: Option<usize>,
    /// Last observed active flag per identity-swapping object.
    identity_states: HashMap<u32, bool>,
}

impl TrialContext {
    fn new(route: Route) -> Self {
        let mut ctx = Self {
            completed: CompletionSet::with_len(route.len()),
            route,
            current_lap: 1,
            next_navigable: None,
            identity_states: HashMap::new(),
        };
        ctx.next_navigable = ctx.scan_navigable(0);
        ctx
    }

    #[must_use]
    pub const fn route(&self) -> &Route {
        &self.route
    }

    #[must_use]
    pub const fn completed(&self) -> &CompletionSet {
        &self.completed
    }

    #[must_use]
    pub const fn current_lap(&self) -> u32 {
        self.current_lap
    }

    #[must_use]
    pub const fn next_navigable_index(&self) -> Option<usize> {
        self.next_navigable
    }

    fn scan_navigable(&self, from: usize) -> Option<usize> {
        self.route.cyclic_indices(from).find(|&i| {
            !self.completed.contains(i)
                && self
                    .route
                    .get(i)
                    .is_some_and(|wp| wp.kind.is_navigable())
        })
    }

    fn is_open(&self, index: usize) -> bool {
        !self.completed.contains(index)
    }

    /// Earliest uncompleted waypoint of `kind`, scanning from index 0.
    fn earliest_open(&self, kind: WaypointKind) -> Option<usize> {
        self.route
            .waypoints()
            .iter()
            .enumerate()
            .find(|(i, wp)| wp.kind == kind && self.is_open(*i))
            .map(|(i, _)| i)
    }

    fn complete(&mut self, index: usize, change: &mut ProgressChange) {
        if !self.completed.insert(index) {
            return;
        }
        if let Some(wp) = self.route.get(index) {
            debug!("completed waypoint {index}: {wp}");
        }
        change.completed.push(index);
        let cursor = self.next_navigable.unwrap_or(index);
        self.next_navigable = self.scan_navigable(cursor);
    }

    /// Raise the lap to the completed waypoint's lap; never lowers it.
    fn sync_lap(&mut self, index: usize, change: &mut ProgressChange) {
        let Some(waypoint_lap) = self.route.get(index).map(|wp| wp.lap) else {
            return;
        };
        if waypoint_lap > self.current_lap {
            info!("lap {} -> {waypoint_lap} (waypoint {index})", self.current_lap);
            self.current_lap = waypoint_lap;
            change.lap = Some(waypoint_lap);
        }
    }

    fn advance_lap(&mut self, change: &mut ProgressChange) {
        let required = self.route.difficulty().laps_required();
        if self.current_lap < required {
            self.current_lap += 1;
            info!("lap advanced to {}/{required}", self.current_lap);
            change.lap = Some(self.current_lap);
        }
    }

    fn on_text(&mut self, signal: TextSignal) -> ProgressChange {
        let mut change = ProgressChange::default();
        let Some(index) = self.earliest_open(signal.waypoint_kind()) else {
            return change;
        };
        self.complete(index, &mut change);
        if signal.is_delivery() {
            self.sync_lap(index, &mut change);
            self.advance_lap(&mut change);
        } else if signal == TextSignal::PortalTraversed {
            // The vessel was relocated; whatever path it was on is stale.
            self.sync_lap(index, &mut change);
            change.reset_path = true;
        }
        change
    }

    fn on_identity_toggle(&mut self, object_id: u32, now_active: bool) -> ProgressChange {
        let mut change = ProgressChange::default();
        let previous = self.identity_states.insert(object_id, now_active);
        if previous != Some(false) || !now_active {
            return change;
        }
        let matched = self
            .route
            .waypoints()
            .iter()
            .enumerate()
            .find(|(i, wp)| wp.matches_object(object_id) && self.is_open(*i))
            .map(|(i, _)| i);
        match matched {
            Some(index) => {
                self.complete(index, &mut change);
                self.sync_lap(index, &mut change);
            }
            None => warn!("identity toggle for object {object_id} matched no open waypoint"),
        }
        change
    }

    fn on_proximity(&mut self, location: Tile) -> ProgressChange {
        let mut change = ProgressChange::default();
        let nearest = self
            .route
            .waypoints()
            .iter()
            .enumerate()
            .filter(|(i, wp)| {
                wp.kind == WaypointKind::PortalExit
                    && self.is_open(*i)
                    && wp.location.chebyshev(location) <= wp.tolerance()
                    && self.entry_completed_before(*i)
            })
            .min_by_key(|(i, wp)| (wp.location.chebyshev(location), *i))
            .map(|(i, _)| i);
        if let Some(index) = nearest {
            self.complete(index, &mut change);
            self.sync_lap(index, &mut change);
        }
        change
    }

    fn entry_completed_before(&self, index: usize) -> bool {
        let previous = self.route.wrap_back(index, 1);
        self.route
            .get(previous)
            .is_some_and(|wp| wp.kind == WaypointKind::PortalEntry)
            && self.completed.contains(previous)
    }

    fn on_disappearance(&mut self, location: Tile) -> ProgressChange {
        let mut change = ProgressChange::default();
        let matched = self
            .route
            .waypoints()
            .iter()
            .enumerate()
            .find(|(i, wp)| wp.location == location && self.is_open(*i))
            .map(|(i, _)| i);
        if let Some(index) = matched {
            self.complete(index, &mut change);
        }
        change
    }

    /// Indices the planner should compose, in route order: any uncompleted
    /// helpers immediately before the next navigable waypoint, then up to
    /// `count` uncompleted navigable waypoints with the uncompleted helpers
    /// between them.
    #[must_use]
    pub fn upcoming_waypoints(&self, count: usize) -> Vec<usize> {
        let Some(next) = self.next_navigable else {
            return Vec::new();
        };
        let len = self.route.len();
        let mut upcoming = Vec::new();

        let mut back = 1;
        while back < len {
            let index = self.route.wrap_back(next, back);
            let helper = self.route.get(index).is_some_and(|wp| wp.kind.is_helper());
            if !helper || !self.is_open(index) {
                break;
            }
            upcoming.push(index);
            back += 1;
        }
        upcoming.reverse();

        let mut navigable = 0;
        for index in self.route.cyclic_indices(next) {
            if navigable == count {
                break;
            }
            if !self.is_open(index) || upcoming.contains(&index) {
                continue;
            }
            let Some(wp) = self.route.get(index) else {
                continue;
            };
            if wp.kind.is_navigable() {
                navigable += 1;
            }
            upcoming.push(index);
        }
        // Trailing helpers have nothing to lead into yet.
        while upcoming
            .last()
            .and_then(|&i| self.route.get(i))
            .is_some_and(|wp| wp.kind.is_helper())
        {
            upcoming.pop();
        }
        upcoming
    }

    /// First uncompleted waypoint of the trial's secondary objective kind.
    #[must_use]
    pub fn secondary_objective(&self) -> Option<Tile> {
        let kind = self.route.kind().secondary_objective()?;
        self.earliest_open(kind)
            .and_then(|i| self.route.get(i))
            .map(|wp| wp.location)
    }
}

/// Tracker states. Events while idle are ignored.
#[derive(Debug, Clone, Default)]
pub enum TrackerState {
    #[default]
    Idle,
    Active(TrialContext),
}

/// Consumes objective events and owns completion and lap state.
#[derive(Debug, Clone, Default)]
pub struct RouteProgressTracker {
    catalog: RouteCatalog,
    state: TrackerState,
}

impl RouteProgressTracker {
    #[must_use]
    pub fn new(catalog: RouteCatalog) -> Self {
        Self {
            catalog,
            state: TrackerState::Idle,
        }
    }

    /// Load the route for the pair and start a fresh attempt at lap 1.
    ///
    /// A missing route leaves the tracker active on an empty route.
    pub fn on_trial_entered(&mut self, kind: TrialKind, difficulty: Difficulty) -> ProgressChange {
        let route = self.catalog.route(kind, difficulty).unwrap_or_else(|| {
            warn!(
                "no route data for {}/{}; navigating without a route",
                kind.label(),
                difficulty.label()
            );
            Route::new(kind, difficulty, Vec::new())
        });
        info!(
            "entered {} ({}) with {} waypoints",
            kind.label(),
            difficulty.label(),
            route.len()
        );
        self.state = TrackerState::Active(TrialContext::new(route));
        ProgressChange {
            lap: Some(1),
            reset_path: true,
            ..ProgressChange::default()
        }
    }

    pub fn on_trial_exited(&mut self) {
        if matches!(self.state, TrackerState::Active(_)) {
            info!("left trial");
        }
        self.state = TrackerState::Idle;
    }

    /// Single ingestion point for every completion signal.
    pub fn on_objective_event(&mut self, event: ObjectiveEvent) -> ProgressChange {
        let TrackerState::Active(ctx) = &mut self.state else {
            return ProgressChange::default();
        };
        match event {
            ObjectiveEvent::Text { signal } => ctx.on_text(signal),
            ObjectiveEvent::IdentityToggle {
                object_id,
                now_active,
            } => ctx.on_identity_toggle(object_id, now_active),
            ObjectiveEvent::Proximity { location } => ctx.on_proximity(location),
            ObjectiveEvent::Disappearance { location } => ctx.on_disappearance(location),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &TrackerState {
        &self.state
    }

    #[must_use]
    pub const fn context(&self) -> Option<&TrialContext> {
        match &self.state {
            TrackerState::Active(ctx) => Some(ctx),
            TrackerState::Idle => None,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.context().is_some()
    }

    #[must_use]
    pub fn next_navigable_index(&self) -> Option<usize> {
        self.context().and_then(TrialContext::next_navigable_index)
    }

    #[must_use]
    pub fn is_completed(&self, index: usize) -> bool {
        self.context().is_some_and(|ctx| ctx.completed.contains(index))
    }

    /// Current lap, or `None` while idle.
    #[must_use]
    pub fn current_lap(&self) -> Option<u32> {
        self.context().map(TrialContext::current_lap)
    }

    #[must_use]
    pub fn route(&self) -> Option<&Route> {
        self.context().map(TrialContext::route)
    }

    #[must_use]
    pub fn completed_indices(&self) -> Vec<usize> {
        self.context()
            .map(|ctx| ctx.completed.iter().collect())
            .unwrap_or_default()
    }
}
