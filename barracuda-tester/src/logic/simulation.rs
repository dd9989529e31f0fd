use anyhow::{Context, Result};
use barracuda_game::{
    Difficulty, NavigationView, NavigatorConfig, TickInput, Tile, TrialKind, TrialNavigator,
};
use std::sync::Arc;

use crate::logic::assets::TesterAssets;
use crate::logic::world::{SeaMap, SimulatedWorld, WorldStats};

pub const DEFAULT_MAX_TICKS: u32 = 400;
pub const DEFAULT_VESSEL_SPEED: usize = 2;

/// Declarative plan for one simulated trial attempt.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub trial: TrialKind,
    pub difficulty: Difficulty,
    pub map: SeaMap,
    pub config: NavigatorConfig,
    /// Tiles sailed per tick.
    pub speed: usize,
    pub max_ticks: Option<u32>,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub fn new(trial: TrialKind, difficulty: Difficulty, map: SeaMap) -> Self {
        Self {
            trial,
            difficulty,
            map,
            config: NavigatorConfig::default(),
            speed: DEFAULT_VESSEL_SPEED,
            max_ticks: None,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_max_ticks(mut self, max_ticks: u32) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: NavigatorConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// Complete record of a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub trial: TrialKind,
    pub difficulty: Difficulty,
    pub ticks: u32,
    /// The world played back every objective before the tick limit.
    pub finished: bool,
    pub view: NavigationView,
    pub navigable_waypoints: usize,
    /// Highest lap number any waypoint on the route carries.
    pub route_laps: u32,
    pub stats: WorldStats,
    pub path_resets: u32,
    pub longest_path: usize,
    pub final_tile: Tile,
    pub visited: Vec<Tile>,
}

impl SimulationSummary {
    #[must_use]
    pub fn visited_tile(&self, tile: Tile) -> bool {
        self.visited.contains(&tile)
    }
}

/// Drives a [`TrialNavigator`] against a [`SimulatedWorld`].
#[derive(Debug, Clone)]
pub struct Simulator {
    assets: Arc<TesterAssets>,
    verbose: bool,
}

impl Simulator {
    pub const fn new(assets: Arc<TesterAssets>, verbose: bool) -> Self {
        Self { assets, verbose }
    }

    /// Run `plan` once with `seed`. `max_ticks` applies when the plan has no
    /// limit of its own.
    pub fn run_plan(
        &self,
        plan: &SimulationPlan,
        seed: u64,
        max_ticks: u32,
    ) -> Result<SimulationSummary> {
        let catalog = self.assets.catalog();
        let route = catalog
            .route(plan.trial, plan.difficulty)
            .with_context(|| {
                format!(
                    "no route for {}/{}",
                    plan.trial.label(),
                    plan.difficulty.label()
                )
            })?;
        let navigable_waypoints = route
            .waypoints()
            .iter()
            .filter(|wp| wp.kind.is_navigable())
            .count();
        let route_laps = route.waypoints().iter().map(|wp| wp.lap).max().unwrap_or(1);
        let limit = plan.max_ticks.unwrap_or(max_ticks);

        let mut world = SimulatedWorld::new(plan.map.clone(), route, seed);
        let mut nav = TrialNavigator::new(catalog.clone(), plan.config.clone())
            .context("navigator rejected the scenario config")?;

        nav.tick(TickInput {
            pose: Some(world.pose()),
            hazards: Some(world.hazards()),
        });
        nav.enter_trial(plan.trial, plan.difficulty);
        for event in world.initial_events() {
            nav.ingest(event);
        }
        nav.observe_collectibles(world.visible_collectibles(), world.collected());

        let mut ticks = 0;
        let mut path_resets = 0;
        let mut longest_path = nav.view().path.len();
        while ticks < limit && !world.is_finished() {
            ticks += 1;
            world.drift();
            let path = nav.view().path;
            world.sail(&path, plan.speed);
            let events = world.observe();

            nav.tick(TickInput {
                pose: Some(world.pose()),
                hazards: Some(world.hazards()),
            });
            for event in events {
                if nav.ingest(event).reset_path {
                    path_resets += 1;
                }
            }
            nav.observe_collectibles(world.visible_collectibles(), world.collected());

            let view = nav.view();
            longest_path = longest_path.max(view.path.len());
            log::trace!(
                "tick {ticks}: vessel at {}, {} path tiles, next waypoint {:?}",
                world.vessel_tile(),
                view.path.len(),
                view.next_navigable_index
            );
        }

        let finished = world.is_finished();
        if self.verbose {
            println!(
                "     ↳ {} ticks, {} tiles sailed, finished: {finished}",
                ticks,
                world.stats().tiles_sailed
            );
        }

        Ok(SimulationSummary {
            seed,
            trial: plan.trial,
            difficulty: plan.difficulty,
            ticks,
            finished,
            view: nav.view(),
            navigable_waypoints,
            route_laps,
            stats: world.stats(),
            path_resets,
            longest_path,
            final_tile: world.vessel_tile(),
            visited: world.visited().to_vec(),
        })
    }
}

/// Shared expectation: the whole route was completed on the final lap.
pub fn route_completed(summary: &SimulationSummary) -> Result<()> {
    anyhow::ensure!(
        summary.finished,
        "route not finished after {} ticks (vessel at {})",
        summary.ticks,
        summary.final_tile
    );
    anyhow::ensure!(
        summary.view.completed.len() == summary.navigable_waypoints,
        "tracker completed {} of {} navigable waypoints",
        summary.view.completed.len(),
        summary.navigable_waypoints
    );
    anyhow::ensure!(
        summary.view.next_navigable_index.is_none(),
        "tracker still points at waypoint {:?}",
        summary.view.next_navigable_index
    );
    anyhow::ensure!(
        summary.view.current_lap == Some(summary.route_laps),
        "expected to finish on lap {}, got {:?}",
        summary.route_laps,
        summary.view.current_lap
    );
    Ok(())
}
