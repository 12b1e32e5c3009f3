//! The single seeded random stream shared by every process in a run.
//!
//! Draw order matters: arrival and service durations are pulled from one
//! stream in the order the processes ask for them, so the whole run replays
//! bit-for-bit for a given seed.

use crate::error::SimulationError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Distribution;

/// Exponential distribution sampled by inverse transform: `-ln(1 - u) / rate`.
///
/// Exactly one uniform is consumed per sample, which keeps the stream position
/// a pure function of how many durations have been drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exponential {
    rate: f64,
}

impl Exponential {
    pub fn new(rate: f64) -> Result<Self, SimulationError> {
        if rate.is_finite() && rate > 0.0 {
            Ok(Self { rate })
        } else {
            Err(SimulationError::not_positive("rate", rate))
        }
    }

    pub const fn rate(&self) -> f64 {
        self.rate
    }

    pub fn mean(&self) -> f64 {
        self.rate.recip()
    }

    /// Maps a uniform `u` in `[0, 1)` to the duration with that quantile.
    pub fn inverse_cdf(&self, u: f64) -> f64 {
        -(1.0 - u).ln() / self.rate
    }
}

impl Distribution<f64> for Exponential {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.inverse_cdf(rng.random())
    }
}

/// A seeded uniform source plus a count of how many draws it has served.
#[derive(Debug, Clone)]
pub struct RandomStream {
    rng: StdRng,
    draws: u64,
}

impl RandomStream {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            draws: 0,
        }
    }

    /// A uniform draw in `[0, 1)`.
    pub fn next_uniform(&mut self) -> f64 {
        self.draws += 1;
        self.rng.random()
    }

    /// An exponentially distributed duration with the given rate.
    pub fn exponential(&mut self, rate: f64) -> Result<f64, SimulationError> {
        let distribution = Exponential::new(rate)?;
        Ok(distribution.inverse_cdf(self.next_uniform()))
    }

    /// Number of uniforms consumed so far.
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}
