//! Random vectors over a joint distribution.
//!
//! A [`RandVec`] owns a [`JointDistribution`] and materializes its
//! marginals and secondaries as [`RandVar`]s, so each component carries
//! the full variable algebra while dependency between components is kept
//! in the joint.
//!
//! # Which operations assume independence
//!
//! | Operation | Assumption |
//! |---|---|
//! | [`RandVec::shift`], [`RandVec::scale`] | none, applied per outcome |
//! | [`RandVec::dot_values`], [`RandVec::dot`], [`RandVec::sum`] | none within a vector; two vectors are paired outcome by outcome |
//! | [`RandVec::add`], [`RandVec::sub`] | the two vectors are independent of each other |
//! | [`RandVec::mul_var`] | the multiplier is independent of the vector |
//!
//! # Covariance
//!
//! `Cov(X_i, X_j) = E[X_i X_j] − E[X_i] E[X_j]`, where `E[X_i X_j]` is the
//! expectation of the secondary for `(i, j)`, taken over the joint.

use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::fmt;

use num_traits::{One, Zero};
use tracing::debug;

use crate::combine::{accumulate, WeightMap};
use crate::config::Precision;
use crate::error::{ProbError, Result};
use crate::joint::{describe_tuple, JointDistribution};
use crate::numeric::{self, IntoValue, Value};
use crate::predicate::Predicate;
use crate::randvar::RandVar;
use crate::sample::Sample;
use crate::space::ProbabilitySpace;
use crate::symbol::Name;

/// A finite discrete random vector.
#[derive(Debug, Clone)]
pub struct RandVec {
    joint: JointDistribution,
    components: Vec<RandVar>,
    secondaries: Vec<RandVar>,
    secondary_pairs: Vec<(usize, usize)>,
    expectation: OnceCell<Vec<Value>>,
    covariance: OnceCell<Vec<Vec<Value>>>,
}

fn check_dimension(expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(ProbError::DimensionMismatch { expected, found });
    }
    Ok(())
}

impl RandVec {
    /// Wraps a joint distribution, deriving components and secondaries.
    pub fn new(joint: JointDistribution) -> Self {
        let components: Vec<RandVar> = joint
            .marginals()
            .iter()
            .cloned()
            .map(RandVar::from_space)
            .collect();
        let secondary_pairs = joint.secondaries().iter().map(|s| s.pair()).collect();
        let secondaries = joint
            .secondaries()
            .iter()
            .map(|s| RandVar::from_space(s.space().clone()))
            .collect();
        debug!(
            dimension = joint.dimension(),
            outcomes = joint.len(),
            "built random vector"
        );
        Self {
            joint,
            components,
            secondaries,
            secondary_pairs,
            expectation: OnceCell::new(),
            covariance: OnceCell::new(),
        }
    }

    /// # Errors
    /// See [`JointDistribution::with_precision`].
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Vec<Sample>, Value)>,
    {
        JointDistribution::new(entries).map(Self::new)
    }

    /// # Errors
    /// See [`JointDistribution::with_precision`].
    pub fn with_precision<I>(entries: I, precision: Precision) -> Result<Self>
    where
        I: IntoIterator<Item = (Vec<Sample>, Value)>,
    {
        JointDistribution::with_precision(entries, precision).map(Self::new)
    }

    /// # Errors
    /// See [`JointDistribution::from_values`].
    pub fn from_values<I, V, P>(names: &[Name], rows: I, precision: Precision) -> Result<Self>
    where
        I: IntoIterator<Item = (Vec<V>, P)>,
        V: IntoValue,
        P: IntoValue,
    {
        JointDistribution::from_values(names, rows, precision).map(Self::new)
    }

    /// Vector of mutually independent variables.
    ///
    /// # Errors
    /// See [`JointDistribution::independent`].
    pub fn from_independent<S: AsRef<ProbabilitySpace>>(vars: &[S]) -> Result<Self> {
        JointDistribution::independent(vars).map(Self::new)
    }

    pub fn joint(&self) -> &JointDistribution {
        &self.joint
    }

    pub fn into_joint(self) -> JointDistribution {
        self.joint
    }

    pub fn names(&self) -> &[Name] {
        self.joint.names()
    }

    pub fn dimension(&self) -> usize {
        self.joint.dimension()
    }

    pub fn precision(&self) -> Precision {
        self.joint.precision()
    }

    /// Marginal variables, one per coordinate. They may be dependent on
    /// each other; combine them through this vector, not through
    /// [`RandVar::add`].
    pub fn components(&self) -> &[RandVar] {
        &self.components
    }

    pub fn component(&self, index: usize) -> Option<&RandVar> {
        self.components.get(index)
    }

    pub fn secondaries(&self) -> &[RandVar] {
        &self.secondaries
    }

    /// Secondary `X_i * X_j` in either index order.
    pub fn secondary(&self, i: usize, j: usize) -> Option<&RandVar> {
        let pair = (i.min(j), i.max(j));
        self.secondary_pairs
            .iter()
            .position(|p| *p == pair)
            .map(|k| &self.secondaries[k])
    }

    /// First secondary whose name equals `name`.
    pub fn secondary_named(&self, name: &Name) -> Option<&RandVar> {
        self.secondaries.iter().find(|s| s.name() == name)
    }

    // ========================================================================
    // Algebra on the joint
    // ========================================================================

    /// Maps every outcome tuple; colliding tuples accumulate.
    fn map_tuples<F>(&self, names: Vec<Name>, f: F) -> Self
    where
        F: Fn(&[Sample]) -> Vec<Sample>,
    {
        let mut pspace = BTreeMap::new();
        for (key, weight) in self.joint.iter() {
            accumulate(&mut pspace, f(key), weight.clone());
        }
        Self::new(JointDistribution::from_grouped(names, pspace, self.precision()))
    }

    /// Adds a literal vector coordinate-wise.
    ///
    /// # Errors
    /// [`ProbError::DimensionMismatch`] if `offsets.len() != dimension`.
    pub fn shift(&self, offsets: &[Value]) -> Result<Self> {
        check_dimension(self.dimension(), offsets.len())?;
        let names = self
            .names()
            .iter()
            .zip(offsets)
            .map(|(n, c)| n.shift(c))
            .collect();
        Ok(self.map_tuples(names, |key| {
            key.iter().zip(offsets).map(|(s, c)| s.shift(c)).collect()
        }))
    }

    /// Subtracts a literal vector coordinate-wise.
    ///
    /// # Errors
    /// As [`RandVec::shift`].
    pub fn unshift(&self, offsets: &[Value]) -> Result<Self> {
        let negated: Vec<Value> = offsets.iter().map(|c| -c).collect();
        self.shift(&negated)
    }

    /// Multiplies every coordinate by `c`.
    pub fn scale(&self, c: &Value) -> Self {
        let names = self.names().iter().map(|n| n.scale(c)).collect();
        self.map_tuples(names, |key| key.iter().map(|s| s.scale(c)).collect())
    }

    pub fn neg(&self) -> Self {
        self.scale(&-Value::one())
    }

    /// Sum of two vectors assumed independent of each other.
    ///
    /// Coordinate `i` of the result is the convolution of the operands'
    /// `i`-th components, and the result's joint is the independent product
    /// of those sums.
    ///
    /// # Errors
    /// [`ProbError::DimensionMismatch`] for vectors of different length;
    /// [`ProbError::SelfCombination`] if a coordinate pair shares a
    /// symbol.
    pub fn add(&self, other: &Self) -> Result<Self> {
        check_dimension(self.dimension(), other.dimension())?;
        let sums = self
            .components
            .iter()
            .zip(&other.components)
            .map(|(a, b)| a.add(b))
            .collect::<Result<Vec<_>>>()?;
        Self::from_independent(&sums)
    }

    /// Difference of two vectors assumed independent of each other.
    ///
    /// # Errors
    /// As [`RandVec::add`].
    pub fn sub(&self, other: &Self) -> Result<Self> {
        self.add(&other.neg())
    }

    /// Multiplies by an independent random variable.
    ///
    /// The multiplier becomes a new leading coordinate: every tuple `t` is
    /// extended to `(m, t...)` with weight `P(m)·P(t)`, so the result has
    /// dimension `dimension + 1` and keeps the full joint.
    ///
    /// # Errors
    /// [`ProbError::SelfCombination`] if the multiplier shares a symbol with
    /// a coordinate.
    pub fn mul_var(&self, multiplier: &RandVar) -> Result<Self> {
        self.check_disjoint(std::slice::from_ref(multiplier.name()))?;
        let mut rows = BTreeMap::new();
        for (m, pm) in multiplier.space().iter() {
            for (key, p) in self.joint.iter() {
                let mut extended = Vec::with_capacity(key.len() + 1);
                extended.push(m.clone());
                extended.extend(key.iter().cloned());
                rows.insert(extended, pm * p);
            }
        }
        let mut names = Vec::with_capacity(self.dimension() + 1);
        names.push(multiplier.name().clone());
        names.extend(self.names().iter().cloned());
        let precision = self.precision().finer(multiplier.precision());
        Ok(Self::new(JointDistribution::from_grouped(names, rows, precision)))
    }

    /// Rejects operands that are functions of a variable of this vector.
    fn check_disjoint(&self, others: &[Name]) -> Result<()> {
        for name in self.names() {
            if let Some(shared) = others.iter().find(|o| o.shares_symbol(name)) {
                return Err(ProbError::SelfCombination(shared.to_string()));
            }
        }
        Ok(())
    }

    // ========================================================================
    // Reductions to a variable
    // ========================================================================

    fn inner_with(&self, coefficients: &[Value]) -> RandVar {
        let name = self
            .names()
            .iter()
            .zip(coefficients)
            .fold(Name::zero(), |acc, (n, c)| acc.plus(&n.scale(c)));
        let mut weights = WeightMap::new();
        for (key, weight) in self.joint.iter() {
            let value: Value = key
                .iter()
                .zip(coefficients)
                .map(|(s, c)| s.value() * c)
                .sum();
            accumulate(&mut weights, value, weight.clone());
        }
        RandVar::from_space(ProbabilitySpace::from_grouped(name, weights, self.precision()))
    }

    /// `Σ c_i X_i` evaluated per joint outcome, so dependency between the
    /// coordinates is fully accounted for.
    ///
    /// # Errors
    /// [`ProbError::DimensionMismatch`] if the lengths differ.
    pub fn dot_values(&self, coefficients: &[Value]) -> Result<RandVar> {
        check_dimension(self.dimension(), coefficients.len())?;
        Ok(self.inner_with(coefficients))
    }

    /// Inner product with an independent vector, pairing every outcome of
    /// `self` with every outcome of `other` at weight `P(s)·P(o)`.
    ///
    /// # Errors
    /// [`ProbError::DimensionMismatch`] if the dimensions differ;
    /// [`ProbError::SelfCombination`] if the vectors share a symbol.
    pub fn dot(&self, other: &Self) -> Result<RandVar> {
        check_dimension(self.dimension(), other.dimension())?;
        self.check_disjoint(other.names())?;
        let name = self
            .names()
            .iter()
            .zip(other.names())
            .fold(Name::zero(), |acc, (a, b)| acc.plus(&a.times(b)));
        let mut weights = WeightMap::new();
        for (key, p) in self.joint.iter() {
            for (other_key, q) in other.joint.iter() {
                let value: Value = key
                    .iter()
                    .zip(other_key)
                    .map(|(a, b)| a.value() * b.value())
                    .sum();
                accumulate(&mut weights, value, p * q);
            }
        }
        let precision = self.precision().finer(other.precision());
        Ok(RandVar::from_space(ProbabilitySpace::from_grouped(name, weights, precision)))
    }

    /// Alias of [`RandVec::dot`].
    ///
    /// # Errors
    /// As [`RandVec::dot`].
    pub fn matmul(&self, other: &Self) -> Result<RandVar> {
        self.dot(other)
    }

    /// Sum of all coordinates.
    pub fn sum(&self) -> RandVar {
        let ones = vec![Value::one(); self.dimension()];
        self.inner_with(&ones)
    }

    // ========================================================================
    // Moments
    // ========================================================================

    /// Exact expectation vector, not cached.
    pub fn compute_expectation(&self) -> Vec<Value> {
        self.components
            .iter()
            .map(|c| c.exact_expectation().clone())
            .collect()
    }

    /// Exact covariance matrix, not cached.
    pub fn compute_covariance(&self) -> Vec<Vec<Value>> {
        let n = self.dimension();
        let means = self.exact_expectation();
        let mut matrix = vec![vec![Value::zero(); n]; n];
        for i in 0..n {
            matrix[i][i] = self.components[i].exact_variance().clone();
            for j in i + 1..n {
                if let Some(secondary) = self.secondary(i, j) {
                    let cov = secondary.exact_expectation() - &means[i] * &means[j];
                    matrix[j][i] = cov.clone();
                    matrix[i][j] = cov;
                }
            }
        }
        matrix
    }

    /// Cached exact expectation vector.
    pub fn exact_expectation(&self) -> &[Value] {
        self.expectation.get_or_init(|| self.compute_expectation())
    }

    /// Cached exact covariance matrix.
    pub fn exact_covariance(&self) -> &[Vec<Value>] {
        self.covariance.get_or_init(|| self.compute_covariance())
    }

    /// Expectation vector, shape `(dimension,)`, rounded.
    pub fn expectation(&self) -> Vec<Value> {
        let precision = self.precision();
        self.exact_expectation()
            .iter()
            .map(|m| precision.round(m))
            .collect()
    }

    /// Covariance matrix, shape `(dimension, dimension)`, rounded.
    pub fn covariance(&self) -> Vec<Vec<Value>> {
        let precision = self.precision();
        self.exact_covariance()
            .iter()
            .map(|row| row.iter().map(|c| precision.round(c)).collect())
            .collect()
    }

    /// Expectation vector as `f64`, for numeric consumers.
    pub fn expectation_f64(&self) -> Vec<f64> {
        self.exact_expectation().iter().map(numeric::to_f64).collect()
    }

    /// Covariance matrix as `f64`, for numeric consumers.
    pub fn covariance_f64(&self) -> Vec<Vec<f64>> {
        self.exact_covariance()
            .iter()
            .map(|row| row.iter().map(numeric::to_f64).collect())
            .collect()
    }

    // ========================================================================
    // Joint probability
    // ========================================================================

    /// `P(X_1 op t, …, X_n op t)` with the same comparator for every
    /// coordinate.
    pub fn prob(&self, predicate: &Predicate) -> Value {
        self.joint_prob(|_| predicate)
    }

    /// `P(X_1 op_1 t_1, …, X_n op_n t_n)`.
    ///
    /// # Errors
    /// [`ProbError::DimensionMismatch`] unless there is one predicate per
    /// coordinate.
    pub fn prob_each(&self, predicates: &[Predicate]) -> Result<Value> {
        check_dimension(self.dimension(), predicates.len())?;
        Ok(self.joint_prob(|i| &predicates[i]))
    }

    fn joint_prob<'a, F>(&self, predicate_at: F) -> Value
    where
        F: Fn(usize) -> &'a Predicate,
    {
        let total: Value = self
            .joint
            .iter()
            .filter(|(key, _)| {
                key.iter()
                    .enumerate()
                    .all(|(i, s)| predicate_at(i).holds(s.value()))
            })
            .map(|(_, p)| p.clone())
            .sum();
        self.precision().round(&total)
    }
}

impl PartialEq for RandVec {
    fn eq(&self, other: &Self) -> bool {
        self.joint == other.joint
    }
}

impl Eq for RandVec {}

impl fmt::Display for RandVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.names().iter().map(Name::to_string).collect();
        write!(f, "Random vector ({})", names.join(", "))?;
        for (key, weight) in self.joint.iter() {
            write!(
                f,
                "\n{}\tprobability = {}",
                describe_tuple(key),
                numeric::format_fixed(weight, self.precision().sigfigs)
            )?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::numeric::{int, ratio};
    use proptest::prelude::*;

    /// Random three-dimensional joints over a small grid with arbitrary
    /// (generally dependent) weights.
    fn random_vec() -> impl Strategy<Value = RandVec> {
        proptest::collection::btree_map(
            (-3_i64..3, -3_i64..3, -3_i64..3),
            1_i64..30,
            1..12,
        )
        .prop_map(|raw| {
            let total: i64 = raw.values().sum();
            let rows: Vec<(Vec<Value>, Value)> = raw
                .iter()
                .map(|(&(a, b, c), &w)| (vec![int(a), int(b), int(c)], ratio(w, total).unwrap()))
                .collect();
            let names: Vec<Name> = ["A", "B", "C"]
                .iter()
                .map(|l| Name::symbol(l).unwrap())
                .collect();
            RandVec::from_values(&names, rows, Precision::default()).unwrap()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn covariance_is_symmetric_with_non_negative_diagonal(rv in random_vec()) {
            let cov = rv.covariance();
            prop_assert_eq!(cov.len(), rv.dimension());
            for i in 0..cov.len() {
                prop_assert_eq!(cov[i].len(), rv.dimension());
                prop_assert!(cov[i][i] >= Value::zero());
                for j in 0..cov.len() {
                    prop_assert_eq!(&cov[i][j], &cov[j][i]);
                }
            }
        }

        #[test]
        fn covariance_matches_joint_definition(rv in random_vec()) {
            let means = rv.exact_expectation();
            let cov = rv.exact_covariance();
            for i in 0..3 {
                for j in 0..3 {
                    let direct: Value = rv
                        .joint()
                        .iter()
                        .map(|(key, p)| {
                            (key[i].value() - &means[i]) * (key[j].value() - &means[j]) * p
                        })
                        .sum();
                    prop_assert_eq!(&cov[i][j], &direct);
                }
            }
        }

        #[test]
        fn sum_variance_is_total_of_covariance(rv in random_vec()) {
            let cov = rv.exact_covariance();
            let total: Value = cov.iter().flat_map(|row| row.iter()).sum();
            let sum = rv.sum();
            prop_assert_eq!(sum.exact_variance(), &total);
        }

        #[test]
        fn restricting_the_event_never_increases_probability(rv in random_vec(), t in -3_i64..3) {
            let loose = rv.prob(&Predicate::le(int(t)));
            let tight = rv.prob_each(&[
                Predicate::le(int(t)),
                Predicate::le(int(t)),
                Predicate::le(int(t - 1)),
            ]).unwrap();
            prop_assert!(loose >= tight);
        }
    }
}
