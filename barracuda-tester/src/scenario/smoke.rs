use anyhow::Result;
use barracuda_game::{Difficulty, Tile, TileRect, TrialKind};

use super::TestScenario;
use crate::logic::simulation::{SimulationPlan, SimulationSummary, route_completed};
use crate::logic::world::SeaMap;

fn smoke_map() -> SeaMap {
    SeaMap::new(60, 40, Tile::new(4, 4))
        .with_rocks(TileRect::new(Tile::new(30, 20), Tile::new(31, 21)))
        .with_boosts([Tile::new(40, 16)])
}

pub fn smoke_scenario() -> TestScenario {
    let plan = SimulationPlan::new(TrialKind::GwenithGlide, Difficulty::Swordfish, smoke_map())
        .with_expectation(route_completed)
        .with_expectation(smoke_expectation);
    TestScenario::simulation("Smoke Test", plan)
}

fn smoke_expectation(summary: &SimulationSummary) -> Result<()> {
    anyhow::ensure!(
        summary.stats.collectibles_picked == 5,
        "expected 5 collectibles picked up, got {}",
        summary.stats.collectibles_picked
    );
    anyhow::ensure!(
        summary.stats.teleports == 0 && summary.path_resets == 0,
        "smoke route has no portals but saw {} teleports",
        summary.stats.teleports
    );
    anyhow::ensure!(
        summary.view.path.is_empty(),
        "a finished route should leave nothing to draw, got {} tiles",
        summary.view.path.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke_plan_targets_single_lap_glide() {
        let scenario = smoke_scenario();
        assert_eq!(scenario.name, "Smoke Test");
        assert_eq!(scenario.plan.trial, TrialKind::GwenithGlide);
        assert_eq!(scenario.plan.difficulty, Difficulty::Swordfish);
        assert_eq!(scenario.plan.expectations.len(), 2);
        assert!(scenario.plan.map.rocks.contains(&Tile::new(31, 21)));
    }
}
