pub mod error;
pub mod event;
pub mod experiment;
pub mod metrics;
pub mod process;
pub mod random;
pub mod resource;
pub mod scenario;

use error::SimulationError;
use event::EventQueue;
use log::{debug, trace};
use metrics::{Metrics, Summary};
use process::{ProcessContext, ProcessId, ProcessKind, ProcessState, ProcessTable, Rates};
use random::RandomStream;
use resource::Resource;

/// Simulated time. Starts at zero and never decreases during a run.
pub type SimTime = f64;

/// The current state of a Simulation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum SimulationState {
    /// The Simulation has only been constructed.
    Constructed,
    /// The Simulation is actively simulating.
    Running,
    /// The Simulation reached its horizon or ran out of events.
    Completed,
    /// The Simulation aborted on an error.
    Failed,
}

/// The parameters to create a Simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationParameters {
    /// Mean customer arrivals per unit time (λ).
    pub arrival_rate: f64,
    /// Mean service completions per unit time for one server (μ).
    pub service_rate: f64,
    /// Number of interchangeable servers (c).
    pub server_count: u32,
    /// Events scheduled after this time are never processed.
    pub horizon: SimTime,
    /// Seed for the run's single random stream.
    pub seed: u64,
    /// Whether to record occupancy and queue length after every event.
    /// Takes space proportional to the number of events.
    pub enable_occupancy_trace: bool,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            arrival_rate: 4.0,
            service_rate: 1.0,
            server_count: 2,
            horizon: 3000.0,
            seed: 42,
            enable_occupancy_trace: false,
        }
    }
}

impl SimulationParameters {
    /// Checks that every rate and the horizon are positive and that there is
    /// at least one server.
    pub fn validate(&self) -> Result<(), SimulationError> {
        let positive = |name, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(SimulationError::not_positive(name, value))
            }
        };

        positive("arrival_rate", self.arrival_rate)?;
        positive("service_rate", self.service_rate)?;
        positive("horizon", self.horizon)?;
        if self.server_count == 0 {
            return Err(SimulationError::at_least_one("server_count"));
        }
        Ok(())
    }
}

/// Occupancy of the resource right after an event was dispatched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OccupancySample {
    /// Clock reading of the dispatched event.
    pub time: SimTime,
    /// Servers held after the event.
    pub occupancy: u32,
    /// Customers waiting for a server after the event.
    pub queue_len: usize,
}

/// A Simulation struct holds all the state for one run of an M/M/c queue.
///
/// The engine advances a clock from event to event. Each event resumes one
/// process: the arrival generator, which spawns customers at exponential
/// intervals, or a customer, which waits for a server, holds it for an
/// exponential service time and releases it.
///
/// Everything is single-threaded and driven by one seeded random stream, so
/// two runs with equal parameters produce identical metrics.
#[derive(Clone, Debug)]
pub struct Simulation {
    parameters: SimulationParameters,
    state: SimulationState,
    clock: SimTime,
    events: EventQueue,
    resource: Resource,
    processes: ProcessTable,
    rng: RandomStream,
    metrics: Metrics,
    occupancy_trace: Vec<OccupancySample>,
}

impl Simulation {
    /// Validates the parameters and registers the arrival generator.
    pub fn new(parameters: SimulationParameters) -> Result<Self, SimulationError> {
        parameters.validate()?;

        let mut simulation = Self {
            state: SimulationState::Constructed,
            clock: 0.0,
            events: EventQueue::new(),
            resource: Resource::new(parameters.server_count)?,
            processes: ProcessTable::new(),
            rng: RandomStream::new(parameters.seed),
            metrics: Metrics::default(),
            occupancy_trace: vec![],
            parameters,
        };

        let generator = simulation.processes.insert(ProcessKind::ArrivalGenerator);
        simulation.events.schedule(0.0, 0.0, generator)?;
        Ok(simulation)
    }

    /// Adds a customer arriving at `at`, in addition to the generated ones.
    ///
    /// Only valid before the run starts.
    pub fn inject_customer(&mut self, at: SimTime) -> Result<ProcessId, SimulationError> {
        if self.state != SimulationState::Constructed {
            return Err(SimulationError::NotRunnable(self.state));
        }

        let customer = self.processes.insert(ProcessKind::customer());
        self.events.schedule(self.clock, at, customer)?;
        Ok(customer)
    }

    /// Runs the simulation to its horizon. Can only be called once.
    pub fn run(&mut self) -> Result<Summary, SimulationError> {
        if self.state != SimulationState::Constructed {
            return Err(SimulationError::NotRunnable(self.state));
        }

        self.state = SimulationState::Running;
        if let Err(e) = self.drive() {
            self.state = SimulationState::Failed;
            return Err(e);
        }

        self.state = SimulationState::Completed;
        self.emit_completed_simulation_debug_logging();
        Ok(self.summary())
    }

    fn drive(&mut self) -> Result<(), SimulationError> {
        let horizon = self.parameters.horizon;

        while let Some(next) = self.events.peek_time() {
            if next > horizon {
                debug!(
                    "Horizon {horizon} reached; abandoning {} pending events.",
                    self.events.len()
                );
                break;
            }

            let Some(event) = self.events.pop_earliest() else {
                break;
            };
            debug_assert!(event.time >= self.clock, "clock moved backwards");
            self.clock = event.time;
            trace!(
                "t={:.6} dispatching {} (seq {})",
                event.time,
                event.process,
                event.sequence
            );
            self.dispatch(event.process)?;

            if self.parameters.enable_occupancy_trace {
                self.occupancy_trace.push(OccupancySample {
                    time: self.clock,
                    occupancy: self.resource.occupancy(),
                    queue_len: self.resource.queue_len(),
                });
            }
        }

        Ok(())
    }

    fn dispatch(&mut self, id: ProcessId) -> Result<(), SimulationError> {
        let mut process = self.processes.get(id)?;
        let mut ctx = ProcessContext {
            now: self.clock,
            rates: Rates {
                arrival_rate: self.parameters.arrival_rate,
                service_rate: self.parameters.service_rate,
            },
            events: &mut self.events,
            resource: &mut self.resource,
            rng: &mut self.rng,
            metrics: &mut self.metrics,
            processes: &mut self.processes,
        };
        process.resume(id, &mut ctx)?;
        self.processes.set(id, process)
    }

    /// Where the Simulation is in its lifecycle.
    pub const fn state(&self) -> SimulationState {
        self.state
    }

    /// The parameters the Simulation was built from.
    pub const fn parameters(&self) -> &SimulationParameters {
        &self.parameters
    }

    /// Time of the last dispatched event.
    pub const fn time(&self) -> SimTime {
        self.clock
    }

    /// Raw observations recorded so far.
    pub const fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// The server pool, as left by the last dispatched event.
    pub const fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Per-event occupancy samples; empty unless the trace was enabled.
    pub fn occupancy_trace(&self) -> &[OccupancySample] {
        &self.occupancy_trace
    }

    /// Wake-ups still queued; after a run these are the abandoned ones.
    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Number of live processes currently in `state`, or for `Terminated`
    /// the number that have finished.
    pub fn processes_in(&self, state: ProcessState) -> usize {
        self.processes.count_in(state)
    }

    /// Process slots allocated; finished customers give theirs back.
    pub fn process_slots(&self) -> usize {
        self.processes.slot_count()
    }

    /// Derived wait, utilization and throughput figures for the run.
    pub fn summary(&self) -> Summary {
        self.metrics
            .summarize(self.parameters.server_count, self.parameters.horizon)
    }

    fn emit_completed_simulation_debug_logging(&self) {
        let summary = self.summary();
        debug!(
            "Arrived: {}, served: {}, completed: {}",
            self.metrics.customers_arrived(),
            self.metrics.customers_served(),
            self.metrics.customers_completed()
        );
        debug!(
            "Still queued for a server: {}, in service: {}",
            self.resource.queue_len(),
            self.resource.occupancy()
        );
        debug!(
            "Average wait: {:.4}, utilization: {:.4}, throughput: {:.4}",
            summary.avg_wait, summary.utilization, summary.throughput
        );
        debug!("Random draws: {}", self.rng.draws());
    }
}
