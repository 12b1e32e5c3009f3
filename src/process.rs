//! Process lifecycle: the arrival generator and the customers it spawns.
//!
//! Processes are plain state machines rather than coroutines. A process's
//! continuation is its [`ProcessState`] plus whatever local data its
//! [`ProcessKind`] carries; the engine holds only its [`ProcessId`], either in
//! the event queue or in the resource's waiting line, never both.

use crate::error::SimulationError;
use crate::event::EventQueue;
use crate::metrics::Metrics;
use crate::random::RandomStream;
use crate::resource::{Acquisition, Resource};
use crate::SimTime;
use log::{debug, trace};
use std::fmt;

/// Index of a process in its [`ProcessTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcessId(usize);

impl ProcessId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "process#{}", self.0)
    }
}

/// Where a process is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessState {
    /// Spawned; its start event is in the event queue.
    NotStarted,
    /// Currently being resumed by the driver loop.
    Running,
    /// Waiting in the event queue for a timed delay to elapse.
    SuspendedOnTimer,
    /// Waiting in the resource's line for a server.
    SuspendedOnResource,
    /// Done; nothing refers to it any more.
    Terminated,
}

/// The two kinds of process, with their process-local data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProcessKind {
    /// Spawns customers at exponential intervals, forever.
    ArrivalGenerator,
    /// Acquires a server, holds it for a service duration, releases it.
    Customer {
        /// Clock reading when the customer started; `None` before that.
        arrival_time: Option<SimTime>,
    },
}

impl ProcessKind {
    pub const fn customer() -> Self {
        Self::Customer { arrival_time: None }
    }
}

/// A process: what it is, and where it is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Process {
    pub kind: ProcessKind,
    pub state: ProcessState,
}

/// The live processes of a run, indexed by [`ProcessId`].
///
/// A process is dropped as soon as it is stored back in the `Terminated`
/// state, and its slot is reused by the next insert. A terminated process is
/// referenced by no event and no waiting line, so reusing its id is safe.
#[derive(Debug, Clone, Default)]
pub struct ProcessTable {
    slots: Vec<Option<Process>>,
    free: Vec<usize>,
    terminated: usize,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new process in the `NotStarted` state.
    pub fn insert(&mut self, kind: ProcessKind) -> ProcessId {
        let process = Some(Process {
            kind,
            state: ProcessState::NotStarted,
        });

        if let Some(index) = self.free.pop() {
            self.slots[index] = process;
            ProcessId(index)
        } else {
            self.slots.push(process);
            ProcessId(self.slots.len() - 1)
        }
    }

    pub fn get(&self, id: ProcessId) -> Result<Process, SimulationError> {
        self.slots
            .get(id.0)
            .copied()
            .flatten()
            .ok_or(SimulationError::UnknownProcess(id))
    }

    /// Stores `process` back under `id`, releasing the slot if it terminated.
    pub fn set(&mut self, id: ProcessId, process: Process) -> Result<(), SimulationError> {
        let slot = self
            .slots
            .get_mut(id.0)
            .filter(|slot| slot.is_some())
            .ok_or(SimulationError::UnknownProcess(id))?;

        if process.state == ProcessState::Terminated {
            *slot = None;
            self.free.push(id.0);
            self.terminated += 1;
        } else {
            *slot = Some(process);
        }
        Ok(())
    }

    /// Number of live processes.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slots allocated so far; bounded by the peak number of live processes.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of processes currently in `state`. For `Terminated`, the
    /// number of processes that have finished so far.
    pub fn count_in(&self, state: ProcessState) -> usize {
        if state == ProcessState::Terminated {
            return self.terminated;
        }

        self.slots
            .iter()
            .flatten()
            .filter(|p| p.state == state)
            .count()
    }
}

/// Rates a process needs to draw its durations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rates {
    pub arrival_rate: f64,
    pub service_rate: f64,
}

/// The engine state a process may touch while it runs.
pub struct ProcessContext<'a> {
    pub now: SimTime,
    pub rates: Rates,
    pub events: &'a mut EventQueue,
    pub resource: &'a mut Resource,
    pub rng: &'a mut RandomStream,
    pub metrics: &'a mut Metrics,
    pub processes: &'a mut ProcessTable,
}

impl ProcessContext<'_> {
    /// Registers a new process, runnable from the next event cycle.
    pub fn spawn(&mut self, kind: ProcessKind) -> Result<ProcessId, SimulationError> {
        let id = self.processes.insert(kind);
        self.events.schedule(self.now, 0.0, id)?;
        Ok(id)
    }
}

impl Process {
    /// Runs the process from its current suspension point to the next one.
    pub fn resume(
        &mut self,
        id: ProcessId,
        ctx: &mut ProcessContext<'_>,
    ) -> Result<(), SimulationError> {
        let resumed_from = self.state;
        self.state = ProcessState::Running;

        match (self.kind, resumed_from) {
            (ProcessKind::ArrivalGenerator, ProcessState::NotStarted) => {
                self.schedule_next_arrival(id, ctx)
            }
            (ProcessKind::ArrivalGenerator, ProcessState::SuspendedOnTimer) => {
                let customer = ctx.spawn(ProcessKind::customer())?;
                trace!("t={:.6} {id} spawned {customer}", ctx.now);
                self.schedule_next_arrival(id, ctx)
            }
            (ProcessKind::Customer { .. }, ProcessState::NotStarted) => {
                self.kind = ProcessKind::Customer {
                    arrival_time: Some(ctx.now),
                };
                ctx.metrics.record_arrival();
                match ctx.resource.acquire(id) {
                    Acquisition::Granted => self.begin_service(id, ctx),
                    Acquisition::Queued => {
                        self.state = ProcessState::SuspendedOnResource;
                        Ok(())
                    }
                }
            }
            (ProcessKind::Customer { .. }, ProcessState::SuspendedOnResource) => {
                self.begin_service(id, ctx)
            }
            (ProcessKind::Customer { .. }, ProcessState::SuspendedOnTimer) => {
                if let Some(next) = ctx.resource.release()? {
                    ctx.events.schedule(ctx.now, 0.0, next)?;
                }
                ctx.metrics.record_departure();
                self.state = ProcessState::Terminated;
                Ok(())
            }
            (_, state) => Err(SimulationError::InvalidResume { id, state }),
        }
    }

    fn schedule_next_arrival(
        &mut self,
        id: ProcessId,
        ctx: &mut ProcessContext<'_>,
    ) -> Result<(), SimulationError> {
        let delay = ctx.rng.exponential(ctx.rates.arrival_rate)?;
        ctx.events.schedule(ctx.now, delay, id)?;
        self.state = ProcessState::SuspendedOnTimer;
        Ok(())
    }

    // The service duration is booked when service begins, not when it ends,
    // so a service still running at the horizon counts in full.
    fn begin_service(
        &mut self,
        id: ProcessId,
        ctx: &mut ProcessContext<'_>,
    ) -> Result<(), SimulationError> {
        let ProcessKind::Customer {
            arrival_time: Some(arrival_time),
        } = self.kind
        else {
            return Err(SimulationError::InvalidResume {
                id,
                state: self.state,
            });
        };

        let wait = ctx.now - arrival_time;
        let service = ctx.rng.exponential(ctx.rates.service_rate)?;
        ctx.metrics.record_service_start(ctx.now, wait, service);
        debug!(
            "t={:.6} {id} in service after waiting {wait:.6}, for {service:.6}",
            ctx.now
        );

        ctx.events.schedule(ctx.now, service, id)?;
        self.state = ProcessState::SuspendedOnTimer;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        events: EventQueue,
        resource: Resource,
        rng: RandomStream,
        metrics: Metrics,
        processes: ProcessTable,
    }

    impl Fixture {
        fn new(servers: u32) -> Self {
            Self {
                events: EventQueue::new(),
                resource: Resource::new(servers).unwrap(),
                rng: RandomStream::new(3),
                metrics: Metrics::default(),
                processes: ProcessTable::new(),
            }
        }

        fn resume(&mut self, id: ProcessId, now: SimTime) -> Result<Process, SimulationError> {
            let mut process = self.processes.get(id)?;
            let mut ctx = ProcessContext {
                now,
                rates: Rates {
                    arrival_rate: 2.0,
                    service_rate: 1.0,
                },
                events: &mut self.events,
                resource: &mut self.resource,
                rng: &mut self.rng,
                metrics: &mut self.metrics,
                processes: &mut self.processes,
            };
            process.resume(id, &mut ctx)?;
            self.processes.set(id, process)?;
            Ok(process)
        }
    }

    #[test]
    fn generator_start_only_schedules_its_first_arrival() {
        let mut fx = Fixture::new(1);
        let generator = fx.processes.insert(ProcessKind::ArrivalGenerator);

        let process = fx.resume(generator, 0.0).unwrap();

        assert_eq!(process.state, ProcessState::SuspendedOnTimer);
        assert_eq!(fx.processes.len(), 1);
        assert_eq!(fx.events.len(), 1);
        assert_eq!(fx.rng.draws(), 1);
    }

    #[test]
    fn generator_wake_spawns_customer_before_rescheduling() {
        let mut fx = Fixture::new(1);
        let generator = fx.processes.insert(ProcessKind::ArrivalGenerator);
        fx.resume(generator, 0.0).unwrap();
        let first = fx.events.pop_earliest().unwrap();

        fx.resume(generator, first.time).unwrap();

        assert_eq!(fx.processes.len(), 2);
        assert_eq!(fx.metrics.customers_arrived(), 0);
        let start = fx.events.pop_earliest().unwrap();
        assert_eq!(start.process, ProcessId::new(1));
        assert_eq!(start.time, first.time);
        let next_arrival = fx.events.pop_earliest().unwrap();
        assert_eq!(next_arrival.process, generator);
        assert!(start.sequence < next_arrival.sequence);
    }

    #[test]
    fn customer_with_free_server_starts_service_immediately() {
        let mut fx = Fixture::new(1);
        let customer = fx.processes.insert(ProcessKind::customer());

        let process = fx.resume(customer, 5.0).unwrap();

        assert_eq!(process.state, ProcessState::SuspendedOnTimer);
        assert_eq!(
            process.kind,
            ProcessKind::Customer {
                arrival_time: Some(5.0)
            }
        );
        assert_eq!(fx.metrics.wait_times(), &[0.0]);
        assert_eq!(fx.metrics.customers_served(), 1);
        assert_eq!(fx.resource.occupancy(), 1);
        let done = fx.events.pop_earliest().unwrap();
        assert!((done.time - 5.0 - fx.metrics.service_time_sum()).abs() < 1e-12);
    }

    #[test]
    fn queued_customer_records_wait_when_handed_the_server() {
        let mut fx = Fixture::new(1);
        let first = fx.processes.insert(ProcessKind::customer());
        let second = fx.processes.insert(ProcessKind::customer());
        fx.resume(first, 1.0).unwrap();

        let waiting = fx.resume(second, 1.0).unwrap();
        assert_eq!(waiting.state, ProcessState::SuspendedOnResource);
        assert_eq!(fx.resource.queue_len(), 1);

        let done = fx.events.pop_earliest().unwrap();
        let finished = fx.resume(first, done.time).unwrap();
        assert_eq!(finished.state, ProcessState::Terminated);
        assert_eq!(fx.metrics.customers_completed(), 1);
        assert_eq!(fx.resource.occupancy(), 1);

        let wake = fx.events.pop_earliest().unwrap();
        assert_eq!(wake.process, second);
        assert_eq!(wake.time, done.time);
        fx.resume(second, wake.time).unwrap();
        let waits = fx.metrics.wait_times();
        assert_eq!(waits.len(), 2);
        assert!((waits[1] - (done.time - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn last_customer_out_frees_the_server() {
        let mut fx = Fixture::new(2);
        let customer = fx.processes.insert(ProcessKind::customer());
        fx.resume(customer, 0.0).unwrap();
        let done = fx.events.pop_earliest().unwrap();
        fx.resume(customer, done.time).unwrap();

        assert_eq!(fx.resource.occupancy(), 0);
        assert!(fx.events.is_empty());
        assert_eq!(fx.processes.count_in(ProcessState::Terminated), 1);
    }

    #[test]
    fn terminated_process_is_dropped_from_the_table() {
        let mut fx = Fixture::new(1);
        let customer = fx.processes.insert(ProcessKind::customer());
        fx.resume(customer, 0.0).unwrap();
        fx.resume(customer, 1.0).unwrap();

        assert!(fx.processes.is_empty());
        assert_eq!(
            fx.resume(customer, 2.0),
            Err(SimulationError::UnknownProcess(customer))
        );
    }

    #[test]
    fn finished_slots_are_reused() {
        let mut fx = Fixture::new(4);
        let first = fx.processes.insert(ProcessKind::customer());
        let second = fx.processes.insert(ProcessKind::customer());
        fx.resume(first, 0.0).unwrap();
        fx.resume(second, 0.0).unwrap();
        fx.resume(first, 1.0).unwrap();

        let third = fx.processes.insert(ProcessKind::customer());
        assert_eq!(third, first);
        assert_eq!(fx.processes.get(third).unwrap().state, ProcessState::NotStarted);
        assert_eq!(fx.processes.slot_count(), 2);
        assert_eq!(fx.processes.len(), 2);
        assert_eq!(fx.processes.count_in(ProcessState::Terminated), 1);
        assert_eq!(fx.processes.count_in(ProcessState::SuspendedOnTimer), 1);
    }

    #[test]
    fn resumed_process_in_impossible_state_is_rejected() {
        let mut fx = Fixture::new(1);
        let generator = fx.processes.insert(ProcessKind::ArrivalGenerator);
        fx.processes
            .set(
                generator,
                Process {
                    kind: ProcessKind::ArrivalGenerator,
                    state: ProcessState::SuspendedOnResource,
                },
            )
            .unwrap();

        assert_eq!(
            fx.resume(generator, 0.0),
            Err(SimulationError::InvalidResume {
                id: generator,
                state: ProcessState::SuspendedOnResource
            })
        );
    }

    #[test]
    fn unknown_process_is_an_error() {
        let mut fx = Fixture::new(1);
        assert_eq!(
            fx.resume(ProcessId::new(7), 0.0),
            Err(SimulationError::UnknownProcess(ProcessId::new(7)))
        );
    }
}
