use crate::error::SimulationError;
use crate::metrics::Summary;
use crate::scenario::Scenario;
use crate::{SimTime, Simulation, SimulationParameters};
use log::{debug, info};

/// The outcome of running one [`Scenario`].
#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioResult {
    pub scenario: Scenario,
    pub summary: Summary,
    /// Every recorded wait, in service-start order.
    pub wait_times: Vec<f64>,
}

/// Means over a set of independent replications of one configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct ReplicationSummary {
    pub replications: Vec<Summary>,
    pub mean_avg_wait: f64,
    pub mean_utilization: f64,
    pub mean_throughput: f64,
}

/// Runs every scenario once, each in a fresh Simulation seeded with `seed`.
pub fn run_scenarios(
    scenarios: &[Scenario],
    horizon: SimTime,
    seed: u64,
) -> Result<Vec<ScenarioResult>, SimulationError> {
    scenarios
        .iter()
        .map(|scenario| {
            let mut simulation = Simulation::new(scenario.parameters(horizon, seed))?;
            let summary = simulation.run()?;
            info!(
                "{}: avg_wait={:.4} utilization={:.4} throughput={:.4}",
                scenario.label, summary.avg_wait, summary.utilization, summary.throughput
            );
            Ok(ScenarioResult {
                scenario: scenario.clone(),
                summary,
                wait_times: simulation.metrics().wait_times().to_vec(),
            })
        })
        .collect()
}

/// Runs `replications` independent copies of `parameters`, seeded
/// `seed, seed + 1, ...`, and averages their summaries.
pub fn replicate(
    parameters: &SimulationParameters,
    replications: u32,
) -> Result<ReplicationSummary, SimulationError> {
    if replications == 0 {
        return Err(SimulationError::at_least_one("replications"));
    }

    let summaries = (0..replications)
        .map(|i| {
            let mut simulation = Simulation::new(SimulationParameters {
                seed: parameters.seed.wrapping_add(u64::from(i)),
                ..parameters.clone()
            })?;
            simulation.run()
        })
        .collect::<Result<Vec<_>, _>>()?;

    let n = f64::from(replications);
    let mean = |f: fn(&Summary) -> f64| summaries.iter().map(f).sum::<f64>() / n;
    Ok(ReplicationSummary {
        mean_avg_wait: mean(|s| s.avg_wait),
        mean_utilization: mean(|s| s.utilization),
        mean_throughput: mean(|s| s.throughput),
        replications: summaries,
    })
}

/// Finds the fewest servers, up to `max_servers`, whose simulated average
/// wait is at most `target_avg_wait`. Every candidate uses the same seed, so
/// candidates differ only in staffing.
///
/// Returns `None` if even `max_servers` misses the target.
pub fn minimum_servers_for_wait(
    parameters: &SimulationParameters,
    max_servers: u32,
    target_avg_wait: f64,
) -> Result<Option<u32>, SimulationError> {
    for server_count in 1..=max_servers {
        let mut simulation = Simulation::new(SimulationParameters {
            server_count,
            ..parameters.clone()
        })?;
        let avg_wait = simulation.run()?.avg_wait;
        debug!("{server_count} servers: avg_wait={avg_wait:.4}");

        if avg_wait <= target_avg_wait {
            return Ok(Some(server_count));
        }
    }

    Ok(None)
}
