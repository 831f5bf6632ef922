//! Discrete random variables.
//!
//! A [`RandVar`] is a validated [`ProbabilitySpace`] with algebra, moments
//! and probability queries.
//!
//! # Independence
//!
//! Combining two variables (`add`, `sub`, `mul`) **assumes they are
//! statistically independent**: the result is the convolution (or product
//! combination) of the two value→weight maps. That is wrong whenever both
//! operands are functions of a common variable (`X + X`, `X + (X + 1)`,
//! `X * (X + Y)`), so operands whose names share a symbol are rejected with
//! [`ProbError::SelfCombination`]. Results keep exact weights; the total law
//! holds by construction. Dependent variables belong in a
//! [`crate::RandVec`], whose operations work on the joint distribution.
//!
//! Scalar operations (`shift`, `scale`, `powi`) act pointwise on every
//! outcome and leave weights unchanged.
//!
//! # Moments
//!
//! Expectation and variance are accumulated exactly and cached on first
//! use. The plain accessors report them rounded to the variable's
//! precision; `exact_*` return the unrounded values.

use std::cell::OnceCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul, Neg, Sub};

use num_traits::{One, Zero};
use rand::Rng;
use tracing::debug;

use crate::combine::{self, accumulate, WeightMap};
use crate::config::Precision;
use crate::error::{ProbError, Result};
use crate::numeric::{self, IntoValue, Value};
use crate::predicate::Predicate;
use crate::random::WeightedSampler;
use crate::sample::Sample;
use crate::space::ProbabilitySpace;
use crate::symbol::Name;

/// A finite discrete random variable.
///
/// # Examples
/// ```
/// use u_discrete::numeric::int;
/// use u_discrete::RandVar;
/// let x = RandVar::from_pairs("X", [(-1, 0.5), (1, 0.5)]).unwrap();
/// let y = RandVar::from_pairs("Y", [(-1, 0.5), (1, 0.5)]).unwrap();
/// let sum = x.add(&y).unwrap();
/// assert_eq!(sum.expectation(), int(0));
/// assert_eq!(sum.variance(), int(2));
/// assert!(x.add(&x).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct RandVar {
    space: ProbabilitySpace,
    expectation: OnceCell<Value>,
    variance: OnceCell<Value>,
}

impl RandVar {
    /// Wraps an already validated space.
    pub fn from_space(space: ProbabilitySpace) -> Self {
        Self {
            space,
            expectation: OnceCell::new(),
            variance: OnceCell::new(),
        }
    }

    /// Builds a variable from samples at the default precision.
    ///
    /// # Errors
    /// See [`ProbabilitySpace::with_precision`].
    pub fn new<I>(name: Name, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Sample, Value)>,
    {
        ProbabilitySpace::new(name, entries).map(Self::from_space)
    }

    /// # Errors
    /// See [`ProbabilitySpace::with_precision`].
    pub fn with_precision<I>(name: Name, entries: I, precision: Precision) -> Result<Self>
    where
        I: IntoIterator<Item = (Sample, Value)>,
    {
        ProbabilitySpace::with_precision(name, entries, precision).map(Self::from_space)
    }

    /// # Errors
    /// See [`ProbabilitySpace::from_values`].
    pub fn from_values<I, V, P>(name: Name, pairs: I, precision: Precision) -> Result<Self>
    where
        I: IntoIterator<Item = (V, P)>,
        V: IntoValue,
        P: IntoValue,
    {
        ProbabilitySpace::from_values(name, pairs, precision).map(Self::from_space)
    }

    /// Shorthand for a variable named by a single symbol, at the default
    /// precision.
    ///
    /// # Errors
    /// [`ProbError::InvalidLabel`] for a bad label, otherwise as
    /// [`ProbabilitySpace::from_values`].
    pub fn from_pairs<I, V, P>(label: &str, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (V, P)>,
        V: IntoValue,
        P: IntoValue,
    {
        Self::from_values(Name::symbol(label)?, pairs, Precision::default())
    }

    /// The degenerate variable that equals `c` with probability 1, named by
    /// the constant `c`.
    pub fn constant(c: Value) -> Self {
        let weights = WeightMap::from([(c.clone(), Value::one())]);
        Self::from_space(ProbabilitySpace::from_grouped(
            Name::constant(c),
            weights,
            Precision::default(),
        ))
    }

    pub fn name(&self) -> &Name {
        self.space.name()
    }

    pub fn space(&self) -> &ProbabilitySpace {
        &self.space
    }

    pub fn into_space(self) -> ProbabilitySpace {
        self.space
    }

    pub fn precision(&self) -> Precision {
        self.space.precision()
    }

    /// Number of outcomes with non-zero weight.
    pub fn len(&self) -> usize {
        self.space.len()
    }

    pub fn is_empty(&self) -> bool {
        self.space.is_empty()
    }

    /// Outcome values in ascending order.
    pub fn values(&self) -> Vec<Value> {
        self.space.values()
    }

    pub fn weight_map(&self) -> WeightMap {
        self.space.weight_map()
    }

    // ========================================================================
    // Scalar algebra
    // ========================================================================

    /// Applies `f` to every value under a new name; collisions accumulate.
    fn map_values<F>(&self, name: Name, f: F) -> Self
    where
        F: Fn(&Value) -> Value,
    {
        let mut weights = WeightMap::new();
        for (sample, weight) in self.space.iter() {
            accumulate(&mut weights, f(sample.value()), weight.clone());
        }
        Self::from_space(ProbabilitySpace::from_grouped(name, weights, self.precision()))
    }

    /// `self + c`.
    pub fn shift(&self, c: &Value) -> Self {
        self.map_values(self.name().shift(c), |v| v + c)
    }

    /// `c * self`.
    pub fn scale(&self, c: &Value) -> Self {
        self.map_values(self.name().scale(c), |v| v * c)
    }

    pub fn neg(&self) -> Self {
        self.scale(&-Value::one())
    }

    /// `self ** exp`. Outcomes that coincide after raising (such as `-1`
    /// and `1` squared) are merged.
    pub fn powi(&self, exp: u32) -> Self {
        if exp == 1 {
            return self.clone();
        }
        self.map_values(self.name().powi(exp), |v| {
            num_traits::pow(v.clone(), exp as usize)
        })
    }

    // ========================================================================
    // Independent algebra
    // ========================================================================

    fn check_independent(&self, other: &Self) -> Result<()> {
        if self.name().shares_symbol(other.name()) {
            return Err(ProbError::SelfCombination(self.name().to_string()));
        }
        Ok(())
    }

    fn combine_with<F>(&self, other: &Self, name: Name, op: F) -> Result<Self>
    where
        F: Fn(&WeightMap, &WeightMap) -> WeightMap,
    {
        self.check_independent(other)?;
        let weights = op(&self.weight_map(), &other.weight_map());
        let precision = self.precision().finer(other.precision());
        debug!(name = %name, outcomes = weights.len(), "combined independent variables");
        Ok(Self::from_space(ProbabilitySpace::from_grouped(name, weights, precision)))
    }

    /// Sum of two independent variables (convolution).
    ///
    /// # Errors
    /// [`ProbError::SelfCombination`] if the names share a symbol.
    pub fn add(&self, other: &Self) -> Result<Self> {
        let name = self.name().plus(other.name());
        self.combine_with(other, name, combine::convolve)
    }

    /// Difference of two independent variables.
    ///
    /// # Errors
    /// As [`RandVar::add`].
    pub fn sub(&self, other: &Self) -> Result<Self> {
        self.add(&other.neg())
    }

    /// Product of two independent variables.
    ///
    /// # Errors
    /// As [`RandVar::add`].
    pub fn mul(&self, other: &Self) -> Result<Self> {
        let name = self.name().times(other.name());
        self.combine_with(other, name, combine::multiply)
    }

    // ========================================================================
    // Moments
    // ========================================================================

    /// `E[X^k]`, exact.
    pub fn compute_moment(&self, k: u32) -> Value {
        self.space
            .iter()
            .map(|(s, p)| num_traits::pow(s.value().clone(), k as usize) * p)
            .sum()
    }

    /// `E[X]`, exact, not cached.
    pub fn compute_expectation(&self) -> Value {
        self.compute_moment(1)
    }

    /// `E[X²] − E[X]²`, exact, not cached.
    pub fn compute_variance(&self) -> Value {
        let mean = self.exact_expectation();
        self.compute_moment(2) - mean * mean
    }

    /// Cached exact expectation.
    pub fn exact_expectation(&self) -> &Value {
        self.expectation.get_or_init(|| self.compute_expectation())
    }

    /// Cached exact variance.
    pub fn exact_variance(&self) -> &Value {
        self.variance.get_or_init(|| self.compute_variance())
    }

    /// `E[X]` rounded to this variable's precision.
    pub fn expectation(&self) -> Value {
        self.precision().round(self.exact_expectation())
    }

    /// `V[X]` rounded to this variable's precision.
    pub fn variance(&self) -> Value {
        self.precision().round(self.exact_variance())
    }

    /// `E[X^k]` rounded.
    pub fn moment(&self, k: u32) -> Value {
        self.precision().round(&self.compute_moment(k))
    }

    /// `E[(X − E[X])^k]` rounded.
    pub fn central_moment(&self, k: u32) -> Value {
        let mean = self.exact_expectation();
        let exact: Value = self
            .space
            .iter()
            .map(|(s, p)| num_traits::pow(s.value() - mean, k as usize) * p)
            .sum();
        self.precision().round(&exact)
    }

    /// Standard deviation as `f64`.
    pub fn std_dev(&self) -> f64 {
        numeric::to_f64(self.exact_variance()).sqrt()
    }

    // ========================================================================
    // Probability queries and sampling
    // ========================================================================

    /// Total weight of outcomes satisfying `predicate`, rounded.
    pub fn prob(&self, predicate: &Predicate) -> Value {
        let total: Value = self
            .space
            .iter()
            .filter(|(s, _)| predicate.holds(s.value()))
            .map(|(_, p)| p.clone())
            .sum();
        self.precision().round(&total)
    }

    /// `P(X <= x)`.
    pub fn cdf(&self, x: &Value) -> Value {
        self.prob(&Predicate::le(x.clone()))
    }

    /// Sampler over this variable's outcomes.
    pub fn sampler(&self) -> Option<WeightedSampler> {
        WeightedSampler::new(self.space.iter().map(|(s, p)| (s.value().clone(), p.clone())))
    }

    /// Draws `iterations` values with replacement, weighted by probability.
    pub fn generate<R: Rng>(&self, iterations: usize, rng: &mut R) -> Vec<Value> {
        match self.sampler() {
            Some(sampler) => sampler.sample_n(iterations, rng),
            None => Vec::new(),
        }
    }

    /// True if the variable takes a single value with probability 1.
    pub fn is_degenerate(&self) -> bool {
        self.len() == 1 && self.space.iter().all(|(_, p)| self.precision().round(p) == Value::one())
    }

    /// The single value of a degenerate variable.
    pub fn degenerate_value(&self) -> Option<Value> {
        if !self.is_degenerate() {
            return None;
        }
        self.space.iter().next().map(|(s, _)| s.value().clone())
    }

    /// Zero variance at this precision.
    pub fn is_almost_constant(&self) -> bool {
        self.variance().is_zero()
    }
}

impl AsRef<ProbabilitySpace> for RandVar {
    fn as_ref(&self) -> &ProbabilitySpace {
        &self.space
    }
}

impl PartialEq for RandVar {
    fn eq(&self, other: &Self) -> bool {
        self.space == other.space
    }
}

impl Eq for RandVar {}

impl Hash for RandVar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.space.hash(state);
    }
}

impl fmt::Display for RandVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.space, f)
    }
}

impl Add<&Value> for &RandVar {
    type Output = RandVar;
    fn add(self, rhs: &Value) -> RandVar {
        self.shift(rhs)
    }
}

impl Sub<&Value> for &RandVar {
    type Output = RandVar;
    fn sub(self, rhs: &Value) -> RandVar {
        self.shift(&-rhs)
    }
}

impl Mul<&Value> for &RandVar {
    type Output = RandVar;
    fn mul(self, rhs: &Value) -> RandVar {
        self.scale(rhs)
    }
}

impl Neg for &RandVar {
    type Output = RandVar;
    fn neg(self) -> RandVar {
        RandVar::neg(self)
    }
}

impl Add<&RandVar> for &Value {
    type Output = RandVar;
    fn add(self, rhs: &RandVar) -> RandVar {
        rhs.shift(self)
    }
}

impl Sub<&RandVar> for &Value {
    type Output = RandVar;
    fn sub(self, rhs: &RandVar) -> RandVar {
        rhs.neg().shift(self)
    }
}

impl Mul<&RandVar> for &Value {
    type Output = RandVar;
    fn mul(self, rhs: &RandVar) -> RandVar {
        rhs.scale(self)
    }
}

impl Add<&RandVar> for &RandVar {
    type Output = Result<RandVar>;
    fn add(self, rhs: &RandVar) -> Result<RandVar> {
        RandVar::add(self, rhs)
    }
}

impl Sub<&RandVar> for &RandVar {
    type Output = Result<RandVar>;
    fn sub(self, rhs: &RandVar) -> Result<RandVar> {
        RandVar::sub(self, rhs)
    }
}

impl Mul<&RandVar> for &RandVar {
    type Output = Result<RandVar>;
    fn mul(self, rhs: &RandVar) -> Result<RandVar> {
        RandVar::mul(self, rhs)
    }
}

// ============================================================================
// Tests
// ============================================================================


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::numeric::{int, ratio};
    use num_traits::Signed;
    use proptest::prelude::*;

    fn var(label: &'static str) -> impl Strategy<Value = RandVar> {
        proptest::collection::btree_map(-20_i64..20, 1_i64..50, 1..6).prop_map(move |raw| {
            let total: i64 = raw.values().sum();
            let pairs: Vec<(Value, Value)> = raw
                .iter()
                .map(|(&v, &w)| (int(v), ratio(w, total).unwrap()))
                .collect();
            RandVar::from_values(Name::symbol(label).unwrap(), pairs, Precision::default()).unwrap()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(150))]

        #[test]
        fn linearity_of_expectation(x in var("X"), y in var("Y"), a in -5_i64..5, b in -5_i64..5, c in -5_i64..5) {
            prop_assume!(a != 0 && b != 0);
            let combo = x.scale(&int(a)).add(&y.scale(&int(b))).unwrap().shift(&int(c));
            let expected = int(a) * x.exact_expectation() + int(b) * y.exact_expectation() + int(c);
            prop_assert_eq!(combo.exact_expectation(), &expected);
        }

        #[test]
        fn variance_adds_under_independence(x in var("X"), y in var("Y")) {
            let sum = x.add(&y).unwrap();
            prop_assert_eq!(sum.exact_variance(), &(x.exact_variance() + y.exact_variance()));
        }

        #[test]
        fn sum_weights_are_the_convolution(x in var("X"), y in var("Y")) {
            let sum = x.add(&y).unwrap();
            prop_assert_eq!(sum.weight_map(), combine::convolve(&x.weight_map(), &y.weight_map()));
        }

        #[test]
        fn variance_is_non_negative(x in var("X")) {
            prop_assert!(*x.exact_variance() >= Value::zero());
        }

        #[test]
        fn probabilities_partition(x in var("X"), t in -20_i64..20) {
            let below = x.prob(&Predicate::le(int(t)));
            let above = x.prob(&Predicate::gt(int(t)));
            // Each side is rounded separately, so allow one unit in the last place.
            let gap = (below + above - Value::one()).abs();
            prop_assert!(gap <= ratio(1, 100_000).unwrap());
        }
    }
}
