use log::info;
use mmc_sim::experiment::run_scenarios;
use mmc_sim::scenario::Scenario;

const HORIZON: f64 = 3000.0;
const SEED: u64 = 42;

/// Runs the baseline call-center scenarios and prints a summary table.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let scenarios = Scenario::baseline_set();
    info!(
        "Running {} scenarios to t={HORIZON} with seed {SEED}",
        scenarios.len()
    );
    let results = run_scenarios(&scenarios, HORIZON, SEED)?;

    println!(
        "{:<18} {:>6} {:>6} {:>4} {:>12} {:>12} {:>11}",
        "scenario", "lambda", "mu", "c", "avg_wait", "utilization", "throughput"
    );
    for result in &results {
        let s = &result.scenario;
        println!(
            "{:<18} {:>6.2} {:>6.2} {:>4} {:>12.4} {:>12.4} {:>11.4}",
            s.label,
            s.arrival_rate,
            s.service_rate,
            s.server_count,
            result.summary.avg_wait,
            result.summary.utilization,
            result.summary.throughput
        );
    }

    Ok(())
}
