//! Discrete stochastic processes.
//!
//! A [`RandomWalk`] moves by `-1` with probability `p` and by `+1` with
//! probability `q` at every time step, starting from 0. Step `i` is the
//! random variable `X_i`; the position after `t` steps is
//! `X_0 + … + X_{t-1}`, whose exact distribution is built by convolution
//! since the steps are independent.
//!
//! ```
//! use u_discrete::numeric::{int, ratio};
//! use u_discrete::process::RandomWalk;
//!
//! let walk = RandomWalk::symmetric(10);
//! let after_two = walk.position(2).unwrap();
//! assert_eq!(after_two.prob(&"== 0".parse().unwrap()), ratio(1, 2).unwrap());
//! assert_eq!(after_two.expectation(), int(0));
//! ```

use std::collections::BTreeMap;

use num_traits::{One, Zero};
use rand::Rng;
use tracing::debug;

use crate::config::Precision;
use crate::error::Result;
use crate::numeric::{self, int, IntoValue, Value};
use crate::randvar::RandVar;
use crate::space::check_weights;
use crate::symbol::Name;

/// Simple random walk on the integers.
#[derive(Debug, Clone)]
pub struct RandomWalk {
    steps: usize,
    p: Value,
    q: Value,
    precision: Precision,
}

impl RandomWalk {
    /// Walk of `steps` time steps with `P(-1) = p` and `P(+1) = q`.
    ///
    /// # Errors
    /// A value error unless `p` and `q` are probabilities with
    /// `p + q == 1` at the default precision.
    pub fn new(steps: usize, p: impl IntoValue, q: impl IntoValue) -> Result<Self> {
        Self::with_precision(steps, p, q, Precision::default())
    }

    /// # Errors
    /// As [`RandomWalk::new`].
    pub fn with_precision(
        steps: usize,
        p: impl IntoValue,
        q: impl IntoValue,
        precision: Precision,
    ) -> Result<Self> {
        let p = p.into_value()?;
        let q = q.into_value()?;
        let weights = BTreeMap::from([(int(-1), p.clone()), (int(1), q.clone())]);
        check_weights(&weights, precision)?;
        debug!(steps, p = %numeric::format_exact(&p), q = %numeric::format_exact(&q), "built random walk");
        Ok(Self {
            steps,
            p,
            q,
            precision,
        })
    }

    /// Walk with `p = q = 1/2`.
    pub fn symmetric(steps: usize) -> Self {
        let half = int(1) / int(2);
        Self {
            steps,
            p: half.clone(),
            q: half,
            precision: Precision::default(),
        }
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Probability of a down step.
    pub fn p(&self) -> &Value {
        &self.p
    }

    /// Probability of an up step.
    pub fn q(&self) -> &Value {
        &self.q
    }

    /// Name `X_i` of step `i`.
    pub fn step_name(i: usize) -> Result<Name> {
        Name::symbol(&format!("X_{i}"))
    }

    /// Step `i` as a random variable.
    ///
    /// # Errors
    /// Propagates construction errors; none occur for a validated walk.
    pub fn step(&self, i: usize) -> Result<RandVar> {
        RandVar::from_values(
            Self::step_name(i)?,
            [(int(-1), self.p.clone()), (int(1), self.q.clone())],
            self.precision,
        )
    }

    /// Exact distribution of the position after `t` steps.
    ///
    /// `t = 0` is the constant 0.
    ///
    /// # Errors
    /// As [`RandomWalk::step`].
    pub fn position(&self, t: usize) -> Result<RandVar> {
        let mut position = RandVar::constant(Value::zero());
        for i in 0..t {
            position = if i == 0 {
                self.step(0)?
            } else {
                position.add(&self.step(i)?)?
            };
        }
        Ok(position)
    }

    /// One sampled path: `steps` positions, the first of which is 0.
    pub fn trajectory<R: Rng>(&self, rng: &mut R) -> Vec<Value> {
        let up = numeric::to_f64(&self.q).clamp(0.0, 1.0);
        let mut positions = Vec::with_capacity(self.steps);
        let mut current = Value::zero();
        for t in 0..self.steps {
            if t > 0 {
                if rng.random_bool(up) {
                    current += Value::one();
                } else {
                    current -= Value::one();
                }
            }
            positions.push(current.clone());
        }
        positions
    }

    /// `n` independent sampled paths.
    pub fn trajectories<R: Rng>(&self, n: usize, rng: &mut R) -> Vec<Vec<Value>> {
        (0..n).map(|_| self.trajectory(rng)).collect()
    }

    /// Mean of the position after `t` steps, `t·(q − p)`.
    pub fn drift(&self, t: usize) -> Value {
        Value::from_integer(t.into()) * (&self.q - &self.p)
    }

    /// Variance of the position after `t` steps, `4·t·p·q`.
    pub fn spread(&self, t: usize) -> Value {
        Value::from_integer((4 * t).into()) * &self.p * &self.q
    }

    /// True when up and down steps are equally likely.
    pub fn is_symmetric(&self) -> bool {
        self.p == self.q && (&self.p + &self.q).is_one()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, ProbError};
    use crate::numeric::{from_f64, ratio};
    use crate::random::create_rng;

    #[test]
    fn test_validation() {
        assert!(RandomWalk::new(5, 0.3, 0.7).is_ok());
        let err = RandomWalk::new(5, 0.3, 0.6).unwrap_err();
        assert!(matches!(err, ProbError::TotalLawViolated { .. }));
        let err = RandomWalk::new(5, 1.5, -0.5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
        assert!(RandomWalk::new(5, 0, 1).is_ok());
    }

    #[test]
    fn test_step() {
        let walk = RandomWalk::new(5, 0.3, 0.7).unwrap();
        let x3 = walk.step(3).unwrap();
        assert_eq!(x3.name().to_string(), "X_3");
        assert_eq!(x3.prob(&"== -1".parse().unwrap()), from_f64(0.3).unwrap());
        assert_eq!(x3.expectation(), from_f64(0.4).unwrap());
    }

    #[test]
    fn test_position_zero_is_constant() {
        let walk = RandomWalk::symmetric(5);
        assert_eq!(walk.position(0).unwrap(), RandVar::constant(int(0)));
    }

    #[test]
    fn test_position_binomial() {
        let walk = RandomWalk::symmetric(10);
        let pos = walk.position(4).unwrap();
        assert_eq!(pos.values(), vec![int(-4), int(-2), int(0), int(2), int(4)]);
        assert_eq!(pos.prob(&"== 0".parse().unwrap()), ratio(6, 16).unwrap());
        assert_eq!(pos.prob(&"== 4".parse().unwrap()), ratio(1, 16).unwrap());
        let expected_name = (0..4)
            .map(|i| RandomWalk::step_name(i).unwrap())
            .fold(Name::zero(), |acc, n| acc + n);
        assert_eq!(pos.name(), &expected_name);
    }

    #[test]
    fn test_position_moments() {
        let walk = RandomWalk::new(10, 0.25, 0.75).unwrap();
        for t in 0..6 {
            let pos = walk.position(t).unwrap();
            assert_eq!(pos.exact_expectation(), &walk.drift(t));
            assert_eq!(pos.exact_variance(), &walk.spread(t));
        }
    }

    #[test]
    fn test_skewed_position_keeps_rare_outcomes() {
        let walk = RandomWalk::new(40, ratio(19, 20).unwrap(), ratio(1, 20).unwrap()).unwrap();
        let pos = walk.position(5).unwrap();
        assert_eq!(pos.len(), 6);
        assert_eq!(pos.exact_expectation(), &ratio(-9, 2).unwrap());
        let far = walk.position(30).unwrap();
        assert_eq!(far.len(), 31);
        assert_eq!(far.exact_expectation(), &walk.drift(30));
        assert_eq!(far.exact_variance(), &walk.spread(30));
    }

    #[test]
    fn test_trajectory() {
        let walk = RandomWalk::symmetric(18);
        let mut rng = create_rng(42);
        let path = walk.trajectory(&mut rng);
        assert_eq!(path.len(), 18);
        assert_eq!(path[0], int(0));
        for pair in path.windows(2) {
            let step = &pair[1] - &pair[0];
            assert!(step == int(1) || step == int(-1));
        }
    }

    #[test]
    fn test_trajectory_deterministic_walk() {
        let walk = RandomWalk::new(6, 0, 1).unwrap();
        let path = walk.trajectory(&mut create_rng(0));
        assert_eq!(path, (0..6).map(int).collect::<Vec<_>>());
    }

    #[test]
    fn test_trajectories() {
        let walk = RandomWalk::symmetric(10);
        let paths = walk.trajectories(100, &mut create_rng(9));
        assert_eq!(paths.len(), 100);
        assert!(paths.iter().all(|p| p.len() == 10));
        assert!(RandomWalk::symmetric(0).trajectory(&mut create_rng(1)).is_empty());
    }

    #[test]
    fn test_symmetric() {
        assert!(RandomWalk::symmetric(3).is_symmetric());
        assert!(!RandomWalk::new(3, 0.4, 0.6).unwrap().is_symmetric());
        assert_eq!(RandomWalk::new(3, 0.5, 0.5).unwrap().p(), RandomWalk::symmetric(3).p());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::numeric::ratio;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn position_moments_match_closed_form(down in 0_i64..=20, t in 0_usize..8) {
            let p = ratio(down, 20).unwrap();
            let q = Value::one() - &p;
            let walk = RandomWalk::new(8, p, q).unwrap();
            let pos = walk.position(t).unwrap();
            prop_assert_eq!(pos.exact_expectation(), &walk.drift(t));
            prop_assert_eq!(pos.exact_variance(), &walk.spread(t));
        }
    }
}
