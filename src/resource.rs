//! A pool of interchangeable servers with a FIFO waiting line.

use crate::error::SimulationError;
use crate::process::ProcessId;
use log::debug;
use std::collections::VecDeque;

/// Outcome of asking a [`Resource`] for a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquisition {
    /// A server was free and is now held by the requester.
    Granted,
    /// Every server is busy; the requester joined the back of the line.
    Queued,
}

/// A resource with `capacity` servers.
///
/// Invariants: `occupancy <= capacity`, and the waiting line is only
/// non-empty while every server is occupied.
#[derive(Debug, Clone)]
pub struct Resource {
    capacity: u32,
    occupancy: u32,
    peak_occupancy: u32,
    waiters: VecDeque<ProcessId>,
}

impl Resource {
    pub fn new(capacity: u32) -> Result<Self, SimulationError> {
        if capacity == 0 {
            return Err(SimulationError::at_least_one("server_count"));
        }

        Ok(Self {
            capacity,
            occupancy: 0,
            peak_occupancy: 0,
            waiters: VecDeque::new(),
        })
    }

    pub fn acquire(&mut self, requester: ProcessId) -> Acquisition {
        if self.occupancy < self.capacity {
            self.occupancy += 1;
            self.peak_occupancy = self.peak_occupancy.max(self.occupancy);
            Acquisition::Granted
        } else {
            self.waiters.push_back(requester);
            debug!(
                "{requester} queued for a server ({} waiting)",
                self.waiters.len()
            );
            Acquisition::Queued
        }
    }

    /// Frees one server.
    ///
    /// If anyone is waiting, the server passes straight to the head of the
    /// line and that process is returned so the caller can wake it;
    /// occupancy is unchanged in that case.
    pub fn release(&mut self) -> Result<Option<ProcessId>, SimulationError> {
        if self.occupancy == 0 {
            return Err(SimulationError::ReleaseWithoutAcquire);
        }

        match self.waiters.pop_front() {
            Some(next) => {
                debug!("server handed over to {next}");
                Ok(Some(next))
            }
            None => {
                self.occupancy -= 1;
                Ok(None)
            }
        }
    }

    /// Number of servers.
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Servers currently held.
    pub const fn occupancy(&self) -> u32 {
        self.occupancy
    }

    /// Highest occupancy seen since construction.
    pub const fn peak_occupancy(&self) -> u32 {
        self.peak_occupancy
    }

    /// Customers waiting for a server.
    pub fn queue_len(&self) -> usize {
        self.waiters.len()
    }
}
