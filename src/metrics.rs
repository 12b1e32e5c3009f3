//! Append-only record of what happened to customers during a run.

use crate::SimTime;

/// Raw observations collected by the engine.
///
/// `wait_times` and `service_starts` are parallel: entry `i` of each belongs
/// to the `i`-th customer to begin service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metrics {
    wait_times: Vec<f64>,
    service_starts: Vec<SimTime>,
    service_time_sum: f64,
    customers_arrived: u64,
    customers_served: u64,
    customers_completed: u64,
}

/// Derived performance figures for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    /// Mean wait before service; zero if nobody was served.
    pub avg_wait: f64,
    pub max_wait: f64,
    /// Booked service time over total server time, `sum / (c * horizon)`.
    pub utilization: f64,
    /// Service starts per unit time.
    pub throughput: f64,
    pub customers_served: u64,
}

impl Metrics {
    pub fn record_arrival(&mut self) {
        self.customers_arrived += 1;
    }

    /// Books a customer entering service at `now` after waiting `wait`, for
    /// a service lasting `service`.
    pub fn record_service_start(&mut self, now: SimTime, wait: f64, service: f64) {
        self.wait_times.push(wait);
        self.service_starts.push(now);
        self.service_time_sum += service;
        self.customers_served += 1;
    }

    pub fn record_departure(&mut self) {
        self.customers_completed += 1;
    }

    pub fn wait_times(&self) -> &[f64] {
        &self.wait_times
    }

    pub fn service_starts(&self) -> &[SimTime] {
        &self.service_starts
    }

    pub const fn service_time_sum(&self) -> f64 {
        self.service_time_sum
    }

    pub const fn customers_arrived(&self) -> u64 {
        self.customers_arrived
    }

    pub const fn customers_served(&self) -> u64 {
        self.customers_served
    }

    pub const fn customers_completed(&self) -> u64 {
        self.customers_completed
    }

    pub fn summarize(&self, server_count: u32, horizon: SimTime) -> Summary {
        let avg_wait = if self.wait_times.is_empty() {
            0.0
        } else {
            self.wait_times.iter().sum::<f64>() / self.wait_times.len() as f64
        };
        let max_wait = self.wait_times.iter().copied().fold(0.0, f64::max);

        Summary {
            avg_wait,
            max_wait,
            utilization: self.service_time_sum / (f64::from(server_count) * horizon),
            throughput: self.customers_served as f64 / horizon,
            customers_served: self.customers_served,
        }
    }
}
