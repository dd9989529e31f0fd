//! One scenario per trial mechanic.

use anyhow::Result;
use barracuda_game::{Difficulty, NavigatorConfig, RouteOptimization, Tile, TileRect, TrialKind};

use super::TestScenario;
use crate::logic::simulation::{SimulationPlan, SimulationSummary, route_completed};
use crate::logic::world::SeaMap;

pub fn rum_laps_scenario() -> TestScenario {
    let map = SeaMap::new(60, 40, Tile::new(4, 20))
        .with_rocks(TileRect::new(Tile::new(30, 32), Tile::new(31, 33)))
        .with_clouds([Tile::new(20, 20), Tile::new(30, 14), Tile::new(34, 26)]);
    let plan = SimulationPlan::new(TrialKind::TemporTantrum, Difficulty::Shark, map)
        .with_expectation(route_completed)
        .with_expectation(two_deliveries);
    TestScenario::simulation("Rum Laps Test", plan)
}

fn two_deliveries(summary: &SimulationSummary) -> Result<()> {
    anyhow::ensure!(
        summary.stats.deliveries == 2,
        "expected 2 rum deliveries, got {}",
        summary.stats.deliveries
    );
    anyhow::ensure!(
        summary.view.current_lap == Some(summary.difficulty.laps_required()),
        "lap {:?} does not match the {} laps {} requires",
        summary.view.current_lap,
        summary.difficulty.laps_required(),
        summary.difficulty.label()
    );
    Ok(())
}

pub fn toad_pillars_scenario() -> TestScenario {
    let map = SeaMap::new(60, 40, Tile::new(4, 4))
        .with_slow_pools(TileRect::new(Tile::new(16, 14), Tile::new(20, 18)))
        .with_rocks(TileRect::new(Tile::new(34, 22), Tile::new(35, 23)));
    let plan = SimulationPlan::new(TrialKind::JubblyJive, Difficulty::Shark, map)
        .with_expectation(route_completed)
        .with_expectation(every_pillar_fed);
    TestScenario::simulation("Toad Pillars Test", plan)
}

fn every_pillar_fed(summary: &SimulationSummary) -> Result<()> {
    anyhow::ensure!(
        summary.stats.pillar_activations == 3,
        "expected 3 pillar activations, got {}",
        summary.stats.pillar_activations
    );
    Ok(())
}

pub fn portals_scenario() -> TestScenario {
    let map = SeaMap::new(60, 40, Tile::new(2, 10))
        .with_wall(30)
        .with_boosts([Tile::new(48, 26)]);
    let config = NavigatorConfig {
        route_optimization: RouteOptimization::Efficient,
        ..NavigatorConfig::default()
    };
    let plan = SimulationPlan::new(TrialKind::GwenithGlide, Difficulty::Shark, map)
        .with_config(config)
        .with_expectation(route_completed)
        .with_expectation(crossed_by_portal);
    TestScenario::simulation("Portals Test", plan)
}

fn crossed_by_portal(summary: &SimulationSummary) -> Result<()> {
    anyhow::ensure!(
        summary.stats.teleports == 1,
        "expected exactly one teleport, got {}",
        summary.stats.teleports
    );
    anyhow::ensure!(
        summary.path_resets >= 1,
        "portal traversal never reset the path"
    );
    anyhow::ensure!(
        !summary.visited.iter().any(|tile| (29..=31).contains(&tile.x)),
        "vessel sailed through the rock wall"
    );
    Ok(())
}

pub fn wind_catcher_scenario() -> TestScenario {
    let map = SeaMap::new(60, 40, Tile::new(2, 20)).with_wall(23);
    let plan = SimulationPlan::new(TrialKind::GwenithGlide, Difficulty::Marlin, map)
        .with_expectation(route_completed)
        .with_expectation(rode_the_wind);
    TestScenario::simulation("Wind Catcher Test", plan)
}

fn rode_the_wind(summary: &SimulationSummary) -> Result<()> {
    anyhow::ensure!(
        summary.stats.wind_launches == 1,
        "expected one wind-catcher launch, got {}",
        summary.stats.wind_launches
    );
    anyhow::ensure!(
        summary.visited_tile(Tile::new(20, 20)) && summary.visited_tile(Tile::new(26, 20)),
        "vessel did not enter and leave the catcher run"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::assets::TesterAssets;
    use crate::logic::simulation::{DEFAULT_MAX_TICKS, Simulator};
    use std::sync::Arc;

    fn run(scenario: &TestScenario, seed: u64) -> SimulationSummary {
        Simulator::new(Arc::new(TesterAssets::load_default()), false)
            .run_plan(&scenario.plan, seed, DEFAULT_MAX_TICKS)
            .expect("simulation runs")
    }

    fn assert_passes(scenario: &TestScenario, seed: u64) {
        let summary = run(scenario, seed);
        for expectation in &scenario.plan.expectations {
            if let Err(err) = expectation.evaluate(&summary) {
                panic!("{} seed {seed}: {err}", scenario.name);
            }
        }
    }

    #[test]
    fn rum_laps_finish_both_deliveries() {
        let scenario = rum_laps_scenario();
        for seed in [1, 1337, 90_210] {
            assert_passes(&scenario, seed);
        }
    }

    #[test]
    fn toad_pillars_reach_lap_two() {
        assert_passes(&toad_pillars_scenario(), 7);
    }

    #[test]
    fn portals_cross_the_wall_once() {
        let summary = run(&portals_scenario(), 3);
        assert_eq!(summary.view.current_lap, Some(2));
        assert_passes(&portals_scenario(), 3);
    }

    #[test]
    fn wind_catcher_branch_is_taken() {
        assert_passes(&wind_catcher_scenario(), 11);
    }

    #[test]
    fn expectations_reject_a_starved_run() {
        let scenario = wind_catcher_scenario();
        let plan = scenario.plan.clone().with_max_ticks(3);
        let summary = Simulator::new(Arc::new(TesterAssets::load_default()), false)
            .run_plan(&plan, 1, DEFAULT_MAX_TICKS)
            .expect("runs");
        assert!(rode_the_wind(&summary).is_err());
        assert!(route_completed(&summary).is_err());
    }
}
