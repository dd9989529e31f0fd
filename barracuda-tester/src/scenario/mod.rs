use crate::logic::simulation::SimulationPlan;

pub mod smoke;
pub mod trials;

/// Named simulation run.
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: SimulationPlan,
}

impl TestScenario {
    #[must_use]
    pub fn simulation(name: impl Into<String>, plan: SimulationPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    match name.to_lowercase().as_str() {
        "smoke" => Some(smoke::smoke_scenario()),
        "rum-laps" | "rum" => Some(trials::rum_laps_scenario()),
        "toad-pillars" | "toads" => Some(trials::toad_pillars_scenario()),
        "portals" | "portal" => Some(trials::portals_scenario()),
        "wind-catcher" | "wind" => Some(trials::wind_catcher_scenario()),
        _ => None,
    }
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    vec![
        ("smoke", "Smoke Test - single-lap shipments and motes"),
        ("rum-laps", "Tempor Tantrum - two rum laps under drifting clouds"),
        ("toad-pillars", "Jubbly Jive - toad pillars and fetid pools"),
        ("portals", "Gwenith Glide - portal pair across a rock wall"),
        ("wind-catcher", "Gwenith Glide - wind-catcher run over a rock wall"),
    ]
}

/// Every scenario key, in listing order.
pub fn all_scenario_keys() -> Vec<String> {
    list_scenarios()
        .into_iter()
        .map(|(key, _)| key.to_string())
        .collect()
}
