use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::logic::simulation::{SimulationPlan, SimulationSummary, Simulator};
use crate::scenario::TestScenario;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub ticks: u32,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

pub struct LogicTester {
    simulator: Simulator,
    max_ticks: u32,
    verbose: bool,
}

impl LogicTester {
    pub const fn new(simulator: Simulator, max_ticks: u32, verbose: bool) -> Self {
        Self {
            simulator,
            max_ticks,
            verbose,
        }
    }

    pub fn run_scenario(&self, scenario: &TestScenario, seeds: &[u64]) -> Vec<ScenarioResult> {
        seeds
            .iter()
            .map(|&seed| {
                if self.verbose {
                    println!(
                        "🧪 Testing scenario: {} ({} {} seed: {seed})",
                        scenario.name.bright_white(),
                        scenario.plan.trial.label(),
                        scenario.plan.difficulty.label()
                    );
                }
                self.run_single(scenario, seed)
            })
            .collect()
    }

    fn run_single(&self, scenario: &TestScenario, seed: u64) -> ScenarioResult {
        let start_time = Instant::now();
        let (ticks, failures) = match self.simulator.run_plan(&scenario.plan, seed, self.max_ticks)
        {
            Ok(summary) => (summary.ticks, evaluate_expectations(&scenario.plan, &summary)),
            Err(err) => (0, vec![format!("simulation failed: {err:#}")]),
        };
        let duration = start_time.elapsed();

        if self.verbose {
            if failures.is_empty() {
                println!("  ✅ seed {seed} passed in {ticks} ticks ({duration:?})");
            } else {
                for failure in &failures {
                    println!("  ❌ seed {seed}: {}", failure.red());
                }
            }
        }

        ScenarioResult {
            scenario_name: scenario.name.clone(),
            seed,
            passed: failures.is_empty(),
            ticks,
            failures,
            duration,
        }
    }
}

fn evaluate_expectations(plan: &SimulationPlan, summary: &SimulationSummary) -> Vec<String> {
    plan.expectations
        .iter()
        .filter_map(|expectation| expectation.evaluate(summary).err())
        .map(|err| {
            format!(
                "{err} (seed {}, {} ticks, lap {:?}, completed {:?})",
                summary.seed, summary.ticks, summary.view.current_lap, summary.view.completed
            )
        })
        .collect()
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::assets::TesterAssets;
    use crate::logic::simulation::DEFAULT_MAX_TICKS;
    use crate::scenario::get_scenario;
    use std::sync::Arc;

    fn tester(max_ticks: u32) -> LogicTester {
        let simulator = Simulator::new(Arc::new(TesterAssets::load_default()), false);
        LogicTester::new(simulator, max_ticks, false)
    }

    #[test]
    fn smoke_passes_for_several_seeds() {
        let scenario = get_scenario("smoke").expect("smoke exists");
        let results = tester(DEFAULT_MAX_TICKS).run_scenario(&scenario, &[1, 2, 3]);
        assert_eq!(results.len(), 3);
        for result in &results {
            assert!(result.passed, "{:?}", result.failures);
            assert!(result.ticks > 0);
        }
    }

    #[test]
    fn tick_starvation_is_reported_as_failure() {
        let scenario = get_scenario("smoke").expect("smoke exists");
        let results = tester(2).run_scenario(&scenario, &[5]);
        assert!(!results[0].passed);
        assert!(results[0].failures[0].contains("not finished"));
    }

    #[test]
    fn results_serialize_durations_as_millis() {
        let result = ScenarioResult {
            scenario_name: "Smoke".to_string(),
            seed: 1,
            passed: true,
            ticks: 12,
            failures: Vec::new(),
            duration: Duration::from_millis(250),
        };
        let json = serde_json::to_value(&result).expect("serialize");
        assert_eq!(json["duration"], 250);
        let back: ScenarioResult = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back.duration, Duration::from_millis(250));
    }
}
