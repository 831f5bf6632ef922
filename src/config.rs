//! Configuration structs.
//!
//! Every tunable is an explicit field with a default, resolved once when a
//! space or simulation is built and then carried by value.

use serde::{Deserialize, Serialize};

use crate::numeric::{self, Value};

/// Default number of decimal places used for validation and reporting.
pub const DEFAULT_SIGFIGS: u32 = 5;

/// Default number of draws for density estimates.
pub const DEFAULT_ITERATIONS: usize = 1000;

/// Numerical tolerance of a probability space.
///
/// `sigfigs` is the number of decimal places the total law is checked at,
/// zero weights are pruned at, and moments and probabilities are reported
/// at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Precision {
    #[serde(default = "default_sigfigs")]
    pub sigfigs: u32,
}

fn default_sigfigs() -> u32 {
    DEFAULT_SIGFIGS
}

impl Default for Precision {
    fn default() -> Self {
        Self {
            sigfigs: default_sigfigs(),
        }
    }
}

impl Precision {
    pub fn new(sigfigs: u32) -> Self {
        Self { sigfigs }
    }

    /// Rounds `x` to this precision.
    pub fn round(&self, x: &Value) -> Value {
        numeric::round_to(x, self.sigfigs)
    }

    /// The finer of two precisions; used when two spaces are combined.
    pub fn finer(self, other: Self) -> Self {
        Self::new(self.sigfigs.max(other.sigfigs))
    }
}

/// Settings for sampling-based simulations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Draws per density estimate.
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    /// Seed for [`crate::random::create_rng`]; `None` means the caller
    /// supplies its own generator.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_iterations() -> usize {
    DEFAULT_ITERATIONS
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
