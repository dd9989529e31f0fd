//! Top-level facade tying the tracker, the planner and the latest inputs together.
//!
//! Every trigger performs a full recompute from stored state, so callers can
//! drive the navigator from a fixed-rate tick and from discrete events in any
//! order.

use log::debug;
use serde::Serialize;
use std::fmt;

use crate::config::{ConfigError, NavigatorConfig};
use crate::events::{ObjectiveEvent, ProgressChange};
use crate::geometry::Tile;
use crate::hazards::HazardSnapshot;
use crate::planner::{PathPlanner, VesselPose};
use crate::progress::RouteProgressTracker;
use crate::route::{Difficulty, RouteCatalog, TrialKind};
use crate::signals::CollectibleWatcher;

/// Why the last composite path was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecomputeReason {
    TrialEntered,
    Progress,
    ConfigChanged,
    Periodic,
}

impl fmt::Display for RecomputeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::TrialEntered => "trial entered",
            Self::Progress => "progress",
            Self::ConfigChanged => "config changed",
            Self::Periodic => "periodic",
        };
        f.write_str(label)
    }
}

/// Per-tick environment inputs. `None` keeps the previous value.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub pose: Option<VesselPose>,
    pub hazards: Option<HazardSnapshot>,
}

/// Everything the rendering layer needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NavigationView {
    pub path: Vec<Tile>,
    pub completed: Vec<usize>,
    pub current_lap: Option<u32>,
    pub next_navigable_index: Option<usize>,
    pub reached_goal: bool,
    pub last_recompute_reason: Option<RecomputeReason>,
}

/// Navigation session for the trials. Idle until [`TrialNavigator::enter_trial`].
#[derive(Debug, Clone)]
pub struct TrialNavigator {
    config: NavigatorConfig,
    tracker: RouteProgressTracker,
    planner: PathPlanner,
    collectibles: CollectibleWatcher,
    pose: Option<VesselPose>,
    hazards: Option<HazardSnapshot>,
    ticks: u64,
    path: Vec<Tile>,
    reached_goal: bool,
    last_reason: Option<RecomputeReason>,
}

impl TrialNavigator {
    /// Build a navigator over a parsed route catalog.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when `config` fails validation.
    pub fn new(catalog: RouteCatalog, config: NavigatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut planner = PathPlanner::default();
        planner.configure(&config);
        Ok(Self {
            config,
            tracker: RouteProgressTracker::new(catalog),
            planner,
            collectibles: CollectibleWatcher::new(),
            pose: None,
            hazards: None,
            ticks: 0,
            path: Vec::new(),
            reached_goal: false,
            last_reason: None,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    #[must_use]
    pub const fn tracker(&self) -> &RouteProgressTracker {
        &self.tracker
    }

    #[must_use]
    pub const fn planner(&self) -> &PathPlanner {
        &self.planner
    }

    /// Start a new attempt. Resets laps, completions and any cached path.
    pub fn enter_trial(&mut self, kind: TrialKind, difficulty: Difficulty) -> ProgressChange {
        let change = self.tracker.on_trial_entered(kind, difficulty);
        self.drop_path();
        self.collectibles.reset();
        self.ticks = 0;
        self.recompute(RecomputeReason::TrialEntered);
        change
    }

    pub fn exit_trial(&mut self) {
        self.tracker.on_trial_exited();
        self.drop_path();
        self.collectibles.reset();
        self.hazards = None;
        self.last_reason = None;
    }

    /// Feed one objective event; recomputes when it changed anything.
    pub fn ingest(&mut self, event: ObjectiveEvent) -> ProgressChange {
        let change = self.tracker.on_objective_event(event);
        self.apply(&change);
        change
    }

    /// Feed the currently visible collectibles and the collected counter.
    pub fn observe_collectibles(
        &mut self,
        visible: impl IntoIterator<Item = Tile>,
        collected_count: u32,
    ) -> ProgressChange {
        let mut change = ProgressChange::default();
        for event in self.collectibles.observe(visible, collected_count) {
            change.merge(self.tracker.on_objective_event(event));
        }
        self.apply(&change);
        change
    }

    /// Store fresh inputs and run the periodic recompute when due.
    pub fn tick(&mut self, input: TickInput) {
        if let Some(pose) = input.pose {
            self.pose = Some(pose);
        }
        if let Some(hazards) = input.hazards {
            self.hazards = Some(hazards);
        }
        if !self.tracker.is_active() {
            return;
        }
        self.ticks += 1;
        if self.ticks % u64::from(self.config.recalc_interval_ticks) == 0 {
            self.recompute(RecomputeReason::Periodic);
        }
    }

    /// Replace the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` and keeps the current configuration when
    /// `config` fails validation.
    pub fn set_config(&mut self, config: NavigatorConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.planner.configure(&config);
        self.config = config;
        self.recompute(RecomputeReason::ConfigChanged);
        Ok(())
    }

    #[must_use]
    pub fn view(&self) -> NavigationView {
        NavigationView {
            path: self.path.clone(),
            completed: self.tracker.completed_indices(),
            current_lap: self.tracker.current_lap(),
            next_navigable_index: self.tracker.next_navigable_index(),
            reached_goal: self.reached_goal,
            last_recompute_reason: self.last_reason,
        }
    }

    fn apply(&mut self, change: &ProgressChange) {
        if change.reset_path {
            self.drop_path();
        }
        if !change.is_empty() {
            self.recompute(RecomputeReason::Progress);
        }
    }

    fn drop_path(&mut self) {
        self.planner.clear_active_path();
        self.path.clear();
        self.reached_goal = false;
    }

    fn recompute(&mut self, reason: RecomputeReason) {
        let Some(trial) = self.tracker.context() else {
            return;
        };
        let (Some(pose), Some(hazards)) = (self.pose, self.hazards.as_ref()) else {
            debug!("skipping recompute ({reason}): vessel pose or hazards unknown");
            return;
        };
        let outcome = self.planner.plan(trial, pose, hazards);
        debug!(
            "recompute ({reason}): {} tiles over {} segments, reached {}",
            outcome.path.len(),
            outcome.segments,
            outcome.reached_goal
        );
        self.path = outcome.path;
        self.reached_goal = outcome.reached_goal;
        self.last_reason = Some(reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TextSignal;
    use crate::geometry::TileRect;
    use crate::route::{VesselFootprint, Waypoint, WaypointKind};

    fn catalog() -> RouteCatalog {
        RouteCatalog::empty().with_route(
            TrialKind::TemporTantrum,
            Difficulty::Swordfish,
            vec![
                Waypoint::new(WaypointKind::RumPickup, 1, Tile::new(10, 2)),
                Waypoint::new(WaypointKind::Shipment, 1, Tile::new(14, 14)),
                Waypoint::new(WaypointKind::RumDropoff, 1, Tile::new(2, 14)),
            ],
        )
    }

    fn inputs() -> TickInput {
        TickInput {
            pose: Some(VesselPose::at(Tile::new(2, 2)).with_front(Tile::new(3, 2))),
            hazards: Some(HazardSnapshot::open_water(
                TileRect::new(Tile::new(0, 0), Tile::new(20, 20)),
                VesselFootprint::new(3, 2),
            )),
        }
    }

    fn navigator() -> TrialNavigator {
        TrialNavigator::new(catalog(), NavigatorConfig::default()).unwrap()
    }

    #[test]
    fn missing_inputs_skip_recompute() {
        let mut nav = navigator();
        nav.enter_trial(TrialKind::TemporTantrum, Difficulty::Swordfish);
        let view = nav.view();
        assert!(view.path.is_empty());
        assert_eq!(view.last_recompute_reason, None);
        assert_eq!(view.current_lap, Some(1));
    }

    #[test]
    fn periodic_recompute_follows_interval() {
        let mut nav = navigator();
        nav.enter_trial(TrialKind::TemporTantrum, Difficulty::Swordfish);
        nav.tick(inputs());
        assert!(nav.view().path.is_empty());
        nav.tick(TickInput::default());
        let view = nav.view();
        assert_eq!(view.last_recompute_reason, Some(RecomputeReason::Periodic));
        assert_eq!(view.path.first(), Some(&Tile::new(3, 2)));
    }

    #[test]
    fn events_trigger_recompute_and_move_the_cursor() {
        let mut nav = navigator();
        nav.tick(inputs());
        nav.enter_trial(TrialKind::TemporTantrum, Difficulty::Swordfish);
        assert_eq!(
            nav.view().last_recompute_reason,
            Some(RecomputeReason::TrialEntered)
        );

        let change = nav.ingest(ObjectiveEvent::Text {
            signal: TextSignal::RumCollected,
        });
        assert_eq!(change.completed.as_slice(), &[0]);
        let view = nav.view();
        assert_eq!(view.last_recompute_reason, Some(RecomputeReason::Progress));
        assert_eq!(view.next_navigable_index, Some(1));
        assert_eq!(view.completed, vec![0]);

        // No match: nothing changes and no recompute is recorded.
        nav.set_config(NavigatorConfig::default()).unwrap();
        let change = nav.ingest(ObjectiveEvent::Text {
            signal: TextSignal::ToadsCollected,
        });
        assert!(change.is_empty());
        assert_eq!(
            nav.view().last_recompute_reason,
            Some(RecomputeReason::ConfigChanged)
        );
    }

    #[test]
    fn collectible_disappearance_completes_shipment() {
        let mut nav = navigator();
        nav.tick(inputs());
        nav.enter_trial(TrialKind::TemporTantrum, Difficulty::Swordfish);
        nav.observe_collectibles([Tile::new(14, 14), Tile::new(18, 18)], 4);
        let change = nav.observe_collectibles([Tile::new(18, 18)], 5);
        assert_eq!(change.completed.as_slice(), &[1]);
        assert!(nav.tracker().is_completed(1));
    }

    #[test]
    fn invalid_config_is_rejected_and_kept() {
        let mut nav = navigator();
        let bad = NavigatorConfig {
            recalc_interval_ticks: 0,
            ..NavigatorConfig::default()
        };
        assert!(nav.set_config(bad).is_err());
        assert_eq!(nav.config().recalc_interval_ticks, 2);
        assert!(TrialNavigator::new(RouteCatalog::empty(), NavigatorConfig {
            lookahead: 17,
            ..NavigatorConfig::default()
        })
        .is_err());
    }

    #[test]
    fn exit_returns_to_idle() {
        let mut nav = navigator();
        nav.tick(inputs());
        nav.enter_trial(TrialKind::TemporTantrum, Difficulty::Swordfish);
        assert!(!nav.view().path.is_empty());
        nav.exit_trial();
        assert_eq!(nav.view(), NavigationView::default());
    }
}
