//! Error types for the simulation engine.

use crate::process::{ProcessId, ProcessState};
use crate::SimulationState;
use thiserror::Error;

/// Everything that can abort a simulation.
///
/// None of these are recoverable mid-run: they indicate a misconfigured
/// scenario or a broken engine invariant, and the run stops at the first one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("invalid parameter `{name}` = {value}: must be {requirement}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        requirement: &'static str,
    },

    #[error("cannot schedule an event with negative delay {delay}")]
    NegativeDelay { delay: f64 },

    #[error("released a resource with no occupied servers")]
    ReleaseWithoutAcquire,

    #[error("process {0} does not exist")]
    UnknownProcess(ProcessId),

    #[error("process {id} cannot be resumed from state {state:?}")]
    InvalidResume { id: ProcessId, state: ProcessState },

    #[error("simulation is {0:?}; only a freshly constructed simulation can run")]
    NotRunnable(SimulationState),
}

impl SimulationError {
    /// Shorthand for a positive-number requirement on a named parameter.
    pub(crate) const fn not_positive(name: &'static str, value: f64) -> Self {
        Self::InvalidParameter {
            name,
            value,
            requirement: "finite and greater than zero",
        }
    }

    /// Shorthand for a count that must be at least one.
    pub(crate) const fn at_least_one(name: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value: 0.0,
            requirement: "at least 1",
        }
    }
}
