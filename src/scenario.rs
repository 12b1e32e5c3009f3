//! Named queue configurations to compare against each other.

use crate::{SimTime, SimulationParameters};
use log::warn;

/// One M/M/c configuration: arrival rate λ, service rate μ, and c servers.
#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    pub label: String,
    pub arrival_rate: f64,
    pub service_rate: f64,
    pub server_count: u32,
}

impl Scenario {
    pub fn new<S>(label: S, arrival_rate: f64, service_rate: f64, server_count: u32) -> Self
    where
        S: Into<String>,
    {
        Self {
            label: label.into(),
            arrival_rate,
            service_rate,
            server_count,
        }
    }

    /// The call-center study: a base system at three staffing levels, then
    /// heavier traffic and faster service at four servers.
    pub fn baseline_set() -> Vec<Self> {
        vec![
            Self::new("BaseSystem_C2", 4.0, 1.0, 2),
            Self::new("BaseSystem_C4", 4.0, 1.0, 4),
            Self::new("BaseSystem_C8", 4.0, 1.0, 8),
            Self::new("HigherLoad_C4", 6.0, 1.0, 4),
            Self::new("FasterService_C4", 4.0, 1.25, 4),
        ]
    }

    /// Traffic intensity per server, `λ / (c * μ)`. The queue is only stable
    /// below 1.
    pub fn offered_load(&self) -> f64 {
        self.arrival_rate / (f64::from(self.server_count) * self.service_rate)
    }

    pub fn is_stable(&self) -> bool {
        self.offered_load() < 1.0
    }

    pub fn parameters(&self, horizon: SimTime, seed: u64) -> SimulationParameters {
        if !self.is_stable() {
            warn!(
                "Scenario {} is unstable (offered load {:.2}); waits grow with the horizon.",
                self.label,
                self.offered_load()
            );
        }

        SimulationParameters {
            arrival_rate: self.arrival_rate,
            service_rate: self.service_rate,
            server_count: self.server_count,
            horizon,
            seed,
            ..Default::default()
        }
    }
}
