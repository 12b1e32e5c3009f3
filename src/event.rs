//! The pending wake-ups of a simulation, ordered by time then schedule order.

use crate::error::SimulationError;
use crate::process::ProcessId;
use crate::SimTime;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A scheduled wake-up of one process.
#[derive(Debug, Clone, Copy)]
pub struct Event {
    /// When the process resumes.
    pub time: SimTime,
    /// Schedule order; breaks ties between events at the same `time`.
    pub sequence: u64,
    /// The process to resume.
    pub process: ProcessId,
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Event {}

impl Ord for Event {
    // Reversed so the max-heap pops the earliest (time, sequence) first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A min-heap of [`Event`]s keyed by `(time, sequence)`.
///
/// Events at the same instant are dispatched in the order they were
/// scheduled, which keeps random-stream consumption reproducible.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Event>,
    next_sequence: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wakes `process` at `now + delay`.
    pub fn schedule(
        &mut self,
        now: SimTime,
        delay: SimTime,
        process: ProcessId,
    ) -> Result<(), SimulationError> {
        // Negated comparison so a NaN delay is rejected too.
        if !(delay >= 0.0) {
            return Err(SimulationError::NegativeDelay { delay });
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Event {
            time: now + delay,
            sequence,
            process,
        });
        Ok(())
    }

    pub fn pop_earliest(&mut self) -> Option<Event> {
        self.heap.pop()
    }

    pub fn peek_time(&self) -> Option<SimTime> {
        self.heap.peek().map(|event| event.time)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Total number of events ever scheduled on this queue.
    pub const fn scheduled(&self) -> u64 {
        self.next_sequence
    }
}
