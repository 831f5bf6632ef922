//! Random number generation and weighted sampling of outcomes.
//!
//! Provides seeded RNG construction and a weighted sampler built from the
//! exact weights of a probability space. This is the only place random
//! numbers enter the crate; all calculus elsewhere is deterministic.
//!
//! # Reproducibility
//!
//! For reproducible draws, use [`create_rng`] with a fixed seed.
//! The underlying algorithm (SmallRng) is deterministic for a given seed
//! on the same platform.

use rand::Rng;

use crate::numeric::{self, Value};

/// Creates a fast, seeded random number generator.
///
/// # Examples
/// ```
/// use u_discrete::random::create_rng;
/// use rand::Rng;
/// let mut rng = create_rng(42);
/// let x: f64 = rng.random();
/// assert!(x >= 0.0 && x < 1.0);
/// ```
pub fn create_rng(seed: u64) -> rand::rngs::SmallRng {
    use rand::SeedableRng;
    rand::rngs::SmallRng::seed_from_u64(seed)
}

/// Pre-computed sampler over a finite set of outcomes.
///
/// Builds a cumulative table from the weights, then uses binary search for
/// each draw. Weights are converted from exact rationals to `f64` once at
/// construction; draws are with replacement.
///
/// # Complexity
/// - Construction: O(n)
/// - Sampling: O(log n)
///
/// # Examples
/// ```
/// use u_discrete::numeric::{int, ratio};
/// use u_discrete::random::{create_rng, WeightedSampler};
/// let sampler = WeightedSampler::new(vec![
///     (int(-1), ratio(1, 4).unwrap()),
///     (int(1), ratio(3, 4).unwrap()),
/// ])
/// .unwrap();
/// let mut rng = create_rng(42);
/// let draw = sampler.sample(&mut rng);
/// assert!(*draw == int(-1) || *draw == int(1));
/// ```
#[derive(Debug, Clone)]
pub struct WeightedSampler {
    outcomes: Vec<Value>,
    cumulative: Vec<f64>,
    total: f64,
}

impl WeightedSampler {
    /// Creates a sampler from `(outcome, weight)` pairs.
    ///
    /// # Returns
    /// - `None` if there are no pairs or all weights are zero/negative.
    pub fn new<I>(pairs: I) -> Option<Self>
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        let mut outcomes = Vec::new();
        let mut cumulative = Vec::new();
        let mut total = 0.0;
        for (outcome, weight) in pairs {
            let w = numeric::to_f64(&weight);
            if w > 0.0 {
                total += w;
            }
            outcomes.push(outcome);
            cumulative.push(total);
        }

        if outcomes.is_empty() || total <= 0.0 {
            return None;
        }

        Some(Self {
            outcomes,
            cumulative,
            total,
        })
    }

    /// Draws one outcome according to the weights.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> &Value {
        let threshold = rng.random_range(0.0..self.total);
        // First index whose cumulative weight exceeds the threshold.
        let i = self.cumulative.partition_point(|&c| c <= threshold);
        &self.outcomes[i.min(self.outcomes.len() - 1)]
    }

    /// Draws `n` outcomes with replacement.
    pub fn sample_n<R: Rng>(&self, n: usize, rng: &mut R) -> Vec<Value> {
        (0..n).map(|_| self.sample(rng).clone()).collect()
    }

    /// Returns the number of outcomes.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns true if there are no outcomes.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Returns the total weight.
    pub fn total_weight(&self) -> f64 {
        self.total
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::{int, ratio};

    fn pairs(weights: &[(i64, i64, i64)]) -> Vec<(Value, Value)> {
        weights
            .iter()
            .map(|&(v, n, d)| (int(v), ratio(n, d).unwrap()))
            .collect()
    }

    #[test]
    fn test_create_rng_deterministic() {
        let mut rng1 = create_rng(42);
        let mut rng2 = create_rng(42);
        let vals1: Vec<f64> = (0..10).map(|_| rng1.random()).collect();
        let vals2: Vec<f64> = (0..10).map(|_| rng2.random()).collect();
        assert_eq!(vals1, vals2);
    }

    #[test]
    fn test_sampler_basic() {
        let sampler = WeightedSampler::new(pairs(&[(0, 1, 6), (1, 2, 6), (2, 3, 6)])).unwrap();
        assert_eq!(sampler.len(), 3);
        assert!(!sampler.is_empty());
        assert!((sampler.total_weight() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sampler_deterministic_weight() {
        let sampler = WeightedSampler::new(pairs(&[(0, 0, 1), (1, 0, 1), (2, 1, 1)])).unwrap();
        let mut rng = create_rng(42);
        for _ in 0..100 {
            assert_eq!(sampler.sample(&mut rng), &int(2));
        }
    }

    #[test]
    fn test_sampler_distribution() {
        let sampler = WeightedSampler::new(pairs(&[(0, 1, 4), (1, 3, 4)])).unwrap();
        let mut rng = create_rng(42);
        let draws = sampler.sample_n(10000, &mut rng);
        let ones = draws.iter().filter(|v| **v == int(1)).count();
        let zeros = draws.len() - ones;
        let ratio = ones as f64 / zeros as f64;
        assert!(
            (ratio - 3.0).abs() < 0.5,
            "expected ratio ~3.0, got {ratio}"
        );
    }

    #[test]
    fn test_sampler_empty() {
        assert!(WeightedSampler::new(Vec::new()).is_none());
        assert!(WeightedSampler::new(pairs(&[(0, 0, 1)])).is_none());
    }
}
