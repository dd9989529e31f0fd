mod logic;
mod scenario;
mod util;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use logic::{FileRoutes, LogicTester, ScenarioResult, Simulator, TesterAssets};
use scenario::{all_scenario_keys, get_scenario, list_scenarios};
use util::{parse_seeds, split_csv};

#[derive(Debug, Parser)]
#[command(name = "barracuda-tester", version = "0.1.0")]
#[command(about = "Headless navigation tests for the Barracuda Trials route planner")]
struct Args {
    /// Scenarios to run (comma-separated, or "all")
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated, decimal or 0x hex)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Tick limit for scenarios that do not set their own
    #[arg(long, default_value_t = logic::simulation::DEFAULT_MAX_TICKS)]
    max_ticks: u32,

    /// Route table JSON to use instead of the embedded one
    #[arg(long)]
    routes: Option<PathBuf>,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let scenarios = expand_scenarios(&args.scenarios);
    let seeds = parse_seeds(&args.seeds)?;
    let assets = Arc::new(load_assets(args.routes.as_ref())?);
    let simulator = Simulator::new(assets, args.verbose);
    let tester = LogicTester::new(simulator, args.max_ticks, args.verbose);

    let results = run_scenarios(&scenarios, &seeds, &tester);
    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:15} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "⛵ Barracuda Trials Navigation Tester".bright_cyan().bold());
    println!("{}", "=====================================".cyan());
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s == "all") {
        scenarios.retain(|s| s != "all");
        for key in all_scenario_keys() {
            if !scenarios.contains(&key) {
                scenarios.push(key);
            }
        }
    }
    scenarios
}

fn load_assets(routes: Option<&PathBuf>) -> Result<TesterAssets> {
    match routes {
        Some(path) => TesterAssets::from_source(&FileRoutes::new(path))
            .with_context(|| format!("failed to load routes from {}", path.display())),
        None => Ok(TesterAssets::load_default()),
    }
}

fn run_scenarios(
    scenarios: &[String],
    seeds: &[u64],
    tester: &LogicTester,
) -> Vec<ScenarioResult> {
    let mut results = Vec::new();
    for name in scenarios {
        match get_scenario(name) {
            Some(scenario) => results.extend(tester.run_scenario(&scenario, seeds)),
            None => {
                eprintln!("{} Unknown scenario: {name}", "⚠️".yellow());
                results.push(ScenarioResult {
                    scenario_name: name.clone(),
                    seed: 0,
                    passed: false,
                    ticks: 0,
                    failures: vec![format!("unknown scenario '{name}'")],
                    duration: std::time::Duration::ZERO,
                });
            }
        }
    }
    results
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    if args.report.as_str() == "json" {
        logic::reports::generate_json_report(output_target.writer(), results)?;
    } else if results.is_empty() {
        writeln!(&mut output_target, "No scenarios executed.")?;
    } else {
        logic::reports::generate_console_report(
            output_target.writer(),
            results,
            start_time.elapsed(),
        )?;
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            scenarios: "smoke".to_string(),
            list_scenarios: false,
            seeds: "1337".to_string(),
            max_ticks: logic::simulation::DEFAULT_MAX_TICKS,
            routes: None,
            report: "json".to_string(),
            verbose: false,
            output: None,
        }
    }

    fn temp_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "barracuda-main-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    #[test]
    fn all_expands_to_every_scenario_once() {
        let scenarios = expand_scenarios("smoke, all");
        assert_eq!(scenarios, all_scenario_keys());
    }

    #[test]
    fn unknown_scenarios_fail_without_running() {
        let tester = LogicTester::new(
            Simulator::new(Arc::new(TesterAssets::load_default()), false),
            10,
            false,
        );
        let results = run_scenarios(&["kraken".to_string()], &[1], &tester);
        assert_eq!(results.len(), 1);
        assert!(!results[0].passed);
        assert!(results[0].failures[0].contains("kraken"));
    }

    #[test]
    fn missing_routes_file_is_an_error() {
        let path = temp_path("missing-routes");
        let err = load_assets(Some(&path)).expect_err("file does not exist");
        assert!(format!("{err:#}").contains("failed to load routes"));
    }

    #[test]
    fn json_report_is_written_to_output_file() {
        let path = temp_path("report");
        let mut args = base_args();
        args.output = Some(path.clone());
        let results = vec![ScenarioResult {
            scenario_name: "Smoke Test".to_string(),
            seed: 1337,
            passed: true,
            ticks: 50,
            failures: Vec::new(),
            duration: std::time::Duration::from_millis(4),
        }];
        write_reports(&args, &results, Instant::now()).expect("report");
        let content = std::fs::read_to_string(&path).expect("read report");
        assert!(content.contains("\"scenario_name\": \"Smoke Test\""));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn list_scenarios_writes_every_key() {
        let path = temp_path("list");
        let mut args = base_args();
        args.list_scenarios = true;
        args.output = Some(path.clone());
        assert!(maybe_list_scenarios(&args).expect("listed"));
        let content = std::fs::read_to_string(&path).expect("read list");
        for key in all_scenario_keys() {
            assert!(content.contains(&key), "{key} missing from listing");
        }
        let _ = std::fs::remove_file(path);
    }
}
