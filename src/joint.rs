//! Joint distributions over tuples of samples.
//!
//! A [`JointDistribution`] is a validated probability space whose outcomes
//! are fixed-length tuples of [`Sample`]s, one per dimension. Besides the
//! checks of a one-dimensional space it requires every tuple to have the
//! same length and every position to carry the same variable name across
//! all tuples.
//!
//! Two families of one-dimensional spaces are derived from it:
//!
//! - **marginals**: for each index, the joint weight summed over all other
//!   indices;
//! - **secondaries**: for each index pair `i < j`, the distribution of the
//!   product `X_i * X_j` taken over the joint weights. These carry
//!   `E[X_i X_j]` without assuming independence, which is what covariance
//!   needs. A one-dimensional joint has a single secondary equal to its
//!   marginal.
//!
//! Both are computed on first request and cached.

use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::fmt;

use num_traits::{One, Zero};
use tracing::debug;

use crate::combine::{accumulate, WeightMap};
use crate::config::Precision;
use crate::error::{ProbError, Result};
use crate::numeric::{self, IntoValue, Value};
use crate::sample::Sample;
use crate::space::{check_weights, collect_unique, drop_zeros, prune, ProbabilitySpace};
use crate::symbol::Name;

/// Renders a sample tuple as `((X, 1), (Y, 0))`.
pub(crate) fn describe_tuple(samples: &[Sample]) -> String {
    let parts: Vec<String> = samples.iter().map(Sample::to_string).collect();
    format!("({})", parts.join(", "))
}

/// Product-of-components distribution derived from a joint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Secondary {
    pair: (usize, usize),
    space: ProbabilitySpace,
}

impl Secondary {
    /// Component indices `(i, j)` this secondary was derived from.
    pub fn pair(&self) -> (usize, usize) {
        self.pair
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
}

/// Validated probability space over sample tuples.
#[derive(Debug, Clone)]
pub struct JointDistribution {
    names: Vec<Name>,
    pspace: BTreeMap<Vec<Sample>, Value>,
    precision: Precision,
    marginals: OnceCell<Vec<ProbabilitySpace>>,
    secondaries: OnceCell<Vec<Secondary>>,
}

impl JointDistribution {
    /// Builds a joint distribution at the default precision.
    ///
    /// # Errors
    /// See [`JointDistribution::with_precision`].
    pub fn new<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Vec<Sample>, Value)>,
    {
        Self::with_precision(entries, Precision::default())
    }

    /// Builds and validates a joint distribution.
    ///
    /// # Errors
    /// - [`ProbError::DuplicateOutcome`] if a tuple is listed twice.
    /// - [`ProbError::EmptyDimension`] for zero-length tuples.
    /// - [`ProbError::DimensionMismatch`] if tuple lengths differ.
    /// - [`ProbError::IndexNameMismatch`] if a position mixes variables.
    /// - [`ProbError::ProbabilityOutOfRange`] / [`ProbError::TotalLawViolated`]
    ///   for invalid weights, including no entries at all.
    pub fn with_precision<I>(entries: I, precision: Precision) -> Result<Self>
    where
        I: IntoIterator<Item = (Vec<Sample>, Value)>,
    {
        let pspace = collect_unique(entries, |key: &Vec<Sample>| describe_tuple(key))?;

        let names: Vec<Name> = match pspace.keys().next() {
            Some(first) => first.iter().map(|s| s.name().clone()).collect(),
            None => Vec::new(),
        };
        if names.is_empty() && !pspace.is_empty() {
            return Err(ProbError::EmptyDimension);
        }
        for key in pspace.keys() {
            if key.len() != names.len() {
                return Err(ProbError::DimensionMismatch {
                    expected: names.len(),
                    found: key.len(),
                });
            }
            for (index, (sample, name)) in key.iter().zip(&names).enumerate() {
                if sample.name() != name {
                    return Err(ProbError::IndexNameMismatch {
                        index,
                        expected: name.to_string(),
                        found: sample.name().to_string(),
                    });
                }
            }
        }

        check_weights(&pspace, precision)?;
        let pspace = prune(pspace, precision);
        debug!(
            dimension = names.len(),
            outcomes = pspace.len(),
            sigfigs = precision.sigfigs,
            "validated joint distribution"
        );
        Ok(Self {
            names,
            pspace,
            precision,
            marginals: OnceCell::new(),
            secondaries: OnceCell::new(),
        })
    }

    /// Builds a joint from rows of plain values, attaching `names[i]` to the
    /// `i`-th value of every row.
    ///
    /// # Errors
    /// [`ProbError::DimensionMismatch`] if a row length differs from
    /// `names.len()`, [`ProbError::InvalidNumber`] for unreadable numbers,
    /// and everything [`JointDistribution::with_precision`] reports.
    pub fn from_values<I, V, P>(names: &[Name], rows: I, precision: Precision) -> Result<Self>
    where
        I: IntoIterator<Item = (Vec<V>, P)>,
        V: IntoValue,
        P: IntoValue,
    {
        let mut entries = Vec::new();
        for (row, weight) in rows {
            if row.len() != names.len() {
                return Err(ProbError::DimensionMismatch {
                    expected: names.len(),
                    found: row.len(),
                });
            }
            let key = names
                .iter()
                .zip(row)
                .map(|(name, v)| Sample::of(name, v))
                .collect::<Result<Vec<_>>>()?;
            entries.push((key, weight.into_value()?));
        }
        Self::with_precision(entries, precision)
    }

    /// Product distribution of spaces assumed mutually independent.
    ///
    /// The joint weight of a tuple is the product of its components'
    /// weights, so the marginals of the result reproduce the inputs. The
    /// result uses the finest precision among the inputs.
    ///
    /// Inputs are validated spaces, so the product is not re-validated:
    /// its weights stay exact.
    ///
    /// # Errors
    /// [`ProbError::EmptyDimension`] for no inputs.
    pub fn independent<S: AsRef<ProbabilitySpace>>(marginals: &[S]) -> Result<Self> {
        let Some(first) = marginals.first() else {
            return Err(ProbError::EmptyDimension);
        };
        let precision = marginals
            .iter()
            .fold(first.as_ref().precision(), |p, m| p.finer(m.as_ref().precision()));

        let mut rows: Vec<(Vec<Sample>, Value)> = vec![(Vec::new(), Value::one())];
        for marginal in marginals {
            let marginal = marginal.as_ref();
            let mut extended = Vec::with_capacity(rows.len() * marginal.len());
            for (key, weight) in &rows {
                for (sample, p) in marginal.iter() {
                    let mut next = key.clone();
                    next.push(sample.clone());
                    extended.push((next, weight * p));
                }
            }
            rows = extended;
        }
        let names = marginals.iter().map(|m| m.as_ref().name().clone()).collect();
        let pspace = rows.into_iter().collect();
        debug!(
            dimension = marginals.len(),
            sigfigs = precision.sigfigs,
            "built independent joint distribution"
        );
        Ok(Self::from_grouped(names, pspace, precision))
    }

    /// Assembles a joint whose weights are a distribution by construction:
    /// a value-preserving map of a validated joint, or a product of
    /// validated independent parts. One name per index; weights stay exact
    /// and only exact zeros are dropped.
    pub(crate) fn from_grouped(
        names: Vec<Name>,
        pspace: BTreeMap<Vec<Sample>, Value>,
        precision: Precision,
    ) -> Self {
        Self {
            names,
            pspace: drop_zeros(pspace),
            precision,
            marginals: OnceCell::new(),
            secondaries: OnceCell::new(),
        }
    }

    pub fn names(&self) -> &[Name] {
        &self.names
    }

    pub fn dimension(&self) -> usize {
        self.names.len()
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn pspace(&self) -> &BTreeMap<Vec<Sample>, Value> {
        &self.pspace
    }

    pub fn len(&self) -> usize {
        self.pspace.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pspace.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Vec<Sample>, &Value)> {
        self.pspace.iter()
    }

    /// Groups the joint weight by `key_of(tuple)`.
    fn group_by<F>(&self, key_of: F) -> WeightMap
    where
        F: Fn(&[Sample]) -> Value,
    {
        let mut grouped = WeightMap::new();
        for (key, weight) in &self.pspace {
            accumulate(&mut grouped, key_of(key), weight.clone());
        }
        grouped
    }

    /// Computes the marginal of every index. Not cached; see
    /// [`JointDistribution::marginals`].
    pub fn derive_marginals(&self) -> Vec<ProbabilitySpace> {
        (0..self.dimension())
            .map(|i| {
                let weights = self.group_by(|key| key[i].value().clone());
                ProbabilitySpace::from_grouped(self.names[i].clone(), weights, self.precision)
            })
            .collect()
    }

    /// Computes the secondaries in `(0,1), (0,2), …, (1,2), …` order. Not
    /// cached; see [`JointDistribution::secondaries`].
    pub fn derive_secondaries(&self) -> Vec<Secondary> {
        if self.dimension() == 1 {
            let weights = self.group_by(|key| key[0].value().clone());
            let space = ProbabilitySpace::from_grouped(self.names[0].clone(), weights, self.precision);
            return vec![Secondary {
                pair: (0, 0),
                space,
            }];
        }

        let mut secondaries = Vec::new();
        for i in 0..self.dimension() {
            for j in i + 1..self.dimension() {
                let weights = self.group_by(|key| key[i].value() * key[j].value());
                let name = self.names[i].times(&self.names[j]);
                secondaries.push(Secondary {
                    pair: (i, j),
                    space: ProbabilitySpace::from_grouped(name, weights, self.precision),
                });
            }
        }
        secondaries
    }

    /// Cached marginals, one per index.
    pub fn marginals(&self) -> &[ProbabilitySpace] {
        self.marginals.get_or_init(|| self.derive_marginals())
    }

    /// Cached secondaries.
    pub fn secondaries(&self) -> &[Secondary] {
        self.secondaries.get_or_init(|| self.derive_secondaries())
    }

    pub fn marginal(&self, index: usize) -> Option<&ProbabilitySpace> {
        self.marginals().get(index)
    }

    /// Secondary for indices `i` and `j` in either order. For a
    /// one-dimensional joint only `(0, 0)` exists.
    pub fn secondary(&self, i: usize, j: usize) -> Option<&Secondary> {
        let pair = (i.min(j), i.max(j));
        self.secondaries().iter().find(|s| s.pair == pair)
    }

    /// First secondary whose name equals `name`.
    pub fn secondary_named(&self, name: &Name) -> Option<&Secondary> {
        self.secondaries().iter().find(|s| s.name() == name)
    }

    /// `(tuple, rounded weight)` pairs sorted by tuple.
    pub fn to_rounded(&self) -> Vec<(Vec<Sample>, Value)> {
        self.pspace
            .iter()
            .map(|(k, p)| (k.clone(), self.precision.round(p)))
            .filter(|(_, p)| !p.is_zero())
            .collect()
    }
}

impl PartialEq for JointDistribution {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names && self.to_rounded() == other.to_rounded()
    }
}

impl Eq for JointDistribution {}

impl fmt::Display for JointDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.names.iter().map(Name::to_string).collect();
        write!(f, "Joint distribution ({})", names.join(", "))?;
        for (key, weight) in &self.pspace {
            write!(
                f,
                "\n{}\tprobability = {}",
                describe_tuple(key),
                numeric::format_fixed(weight, self.precision.sigfigs)
            )?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::numeric::{from_f64, int};

    fn xy() -> [Name; 2] {
        [Name::symbol("X").unwrap(), Name::symbol("Y").unwrap()]
    }

    fn sample_joint() -> JointDistribution {
        JointDistribution::from_values(
            &xy(),
            [
                (vec![1.5, 0.0], 0.14),
                (vec![1.5, 1.0], 0.35),
                (vec![-1.0, 0.0], 0.19),
                (vec![-1.0, 1.0], 0.32),
            ],
            Precision::default(),
        )
        .unwrap()
    }

    fn weights(space: &ProbabilitySpace) -> Vec<(Value, Value)> {
        space.weight_map().into_iter().collect()
    }

    fn v(x: f64) -> Value {
        from_f64(x).unwrap()
    }

    #[test]
    fn test_init() {
        let jd = sample_joint();
        assert_eq!(jd.dimension(), 2);
        assert_eq!(jd.len(), 4);
        assert_eq!(jd.names(), &xy());
    }

    #[test]
    fn test_marginals() {
        let jd = sample_joint();
        let marginals = jd.marginals();
        assert_eq!(marginals.len(), jd.dimension());
        assert_eq!(marginals[0].name(), &xy()[0]);
        assert_eq!(
            weights(&marginals[0]),
            vec![(v(-1.0), v(0.51)), (v(1.5), v(0.49))]
        );
        assert_eq!(
            weights(&marginals[1]),
            vec![(v(0.0), v(0.33)), (v(1.0), v(0.67))]
        );
    }

    #[test]
    fn test_secondaries() {
        let jd = sample_joint();
        let secondaries = jd.secondaries();
        assert_eq!(secondaries.len(), 1);
        let s = &secondaries[0];
        assert_eq!(s.pair(), (0, 1));
        assert_eq!(s.name(), &(&xy()[0] * &xy()[1]));
        assert_eq!(
            weights(s.space()),
            vec![(v(-1.0), v(0.32)), (v(0.0), v(0.33)), (v(1.5), v(0.35))]
        );
        assert!(jd.secondary(1, 0).is_some());
        assert!(jd.secondary_named(s.name()).is_some());
    }

    #[test]
    fn test_secondary_count_grows_quadratically() {
        let names: Vec<Name> = ["A", "B", "C", "D"]
            .iter()
            .map(|l| Name::symbol(l).unwrap())
            .collect();
        let jd = JointDistribution::from_values(&names, [(vec![1, 2, 3, 4], 1)], Precision::default())
            .unwrap();
        let pairs: Vec<(usize, usize)> = jd.secondaries().iter().map(Secondary::pair).collect();
        assert_eq!(pairs, vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
        assert_eq!(jd.secondary(2, 3).unwrap().space().values(), vec![int(12)]);
    }

    #[test]
    fn test_one_dimensional_secondary_is_marginal() {
        let x = Name::symbol("X").unwrap();
        let jd = JointDistribution::from_values(
            &[x],
            [(vec![-1], 0.5), (vec![1], 0.5)],
            Precision::default(),
        )
        .unwrap();
        assert_eq!(jd.secondaries().len(), 1);
        assert_eq!(jd.secondaries()[0].space(), &jd.marginals()[0]);
        assert_eq!(jd.secondaries()[0].pair(), (0, 0));
    }

    #[test]
    fn test_cached_matches_derived() {
        let jd = sample_joint();
        assert_eq!(jd.marginals(), jd.derive_marginals().as_slice());
        assert_eq!(jd.secondaries(), jd.derive_secondaries().as_slice());
    }

    #[test]
    fn test_dimension_mismatch() {
        let [x, y] = xy();
        let entries = vec![
            (vec![Sample::of(&x, 0).unwrap()], v(0.5)),
            (vec![Sample::of(&x, 1).unwrap(), Sample::of(&y, 1).unwrap()], v(0.5)),
        ];
        let err = JointDistribution::new(entries).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Dimension);
    }

    #[test]
    fn test_index_name_mismatch() {
        let [x, y] = xy();
        let entries = vec![
            (vec![Sample::of(&x, 0).unwrap(), Sample::of(&y, 0).unwrap()], v(0.5)),
            (vec![Sample::of(&y, 1).unwrap(), Sample::of(&x, 1).unwrap()], v(0.5)),
        ];
        let err = JointDistribution::new(entries).unwrap_err();
        assert!(matches!(err, ProbError::IndexNameMismatch { .. }));
    }

    #[test]
    fn test_row_length_mismatch() {
        let err = JointDistribution::from_values(&xy(), [(vec![1, 2, 3], 1)], Precision::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ProbError::DimensionMismatch {
                expected: 2,
                found: 3
            }
        ));
    }

    #[test]
    fn test_total_law() {
        let err = JointDistribution::from_values(
            &xy(),
            [(vec![0, 0], 0.5), (vec![1, 1], 0.4)],
            Precision::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ProbError::TotalLawViolated { .. }));

        let empty: Vec<(Vec<Sample>, Value)> = Vec::new();
        assert!(matches!(
            JointDistribution::new(empty).unwrap_err(),
            ProbError::TotalLawViolated { .. }
        ));
    }

    #[test]
    fn test_zero_dimension() {
        let err = JointDistribution::new(vec![(Vec::new(), Value::one())]).unwrap_err();
        assert_eq!(err, ProbError::EmptyDimension);
    }

    #[test]
    fn test_zero_weights_pruned() {
        let x = Name::symbol("X").unwrap();
        let jd = JointDistribution::from_values(
            &[x.clone(), x],
            [
                (vec![-1, 1], 0.0),
                (vec![1, 1], 0.5),
                (vec![-1, -1], 0.5),
                (vec![1, -1], 0.0),
            ],
            Precision::default(),
        )
        .unwrap();
        assert_eq!(jd.len(), 2);
    }

    #[test]
    fn test_independent_product() {
        let [x, y] = xy();
        let a = ProbabilitySpace::from_values(x, [(0, 0.25), (1, 0.75)], Precision::default()).unwrap();
        let b = ProbabilitySpace::from_values(y, [(-1, 0.5), (2, 0.5)], Precision::new(8)).unwrap();
        let jd = JointDistribution::independent(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(jd.dimension(), 2);
        assert_eq!(jd.len(), 4);
        assert_eq!(jd.precision(), Precision::new(8));
        assert_eq!(weights(&jd.marginals()[0]), weights(&a));
        assert_eq!(weights(&jd.marginals()[1]), weights(&b));
    }

    #[test]
    fn test_independent_keeps_exact_weights() {
        let [x, y] = xy();
        let a = ProbabilitySpace::from_values(x, [(0, 0.499996), (1, 0.5)], Precision::default())
            .unwrap();
        let b = ProbabilitySpace::from_values(y, [(0, 0.99999), (1, 0.000006)], Precision::default())
            .unwrap();
        let jd = JointDistribution::independent(&[a.clone(), b.clone()]).unwrap();
        // 0.5 * 0.000006 rounds to zero but is still part of the product.
        assert_eq!(jd.len(), 4);
        let total: Value = jd.iter().map(|(_, p)| p.clone()).sum();
        assert_eq!(total, a.iter().map(|(_, p)| p.clone()).sum::<Value>() * b.iter().map(|(_, p)| p.clone()).sum::<Value>());
        assert_eq!(jd.marginals()[0].weight_map(), a.weight_map());
        assert_eq!(jd.marginals()[1].weight_map(), b.weight_map());
    }

    #[test]
    fn test_independent_requires_input() {
        let none: [ProbabilitySpace; 0] = [];
        assert_eq!(
            JointDistribution::independent(&none).unwrap_err(),
            ProbError::EmptyDimension
        );
    }

    #[test]
    fn test_display() {
        let text = sample_joint().to_string();
        assert!(text.starts_with("Joint distribution (X, Y)"));
        assert!(text.contains("((X, 1.5), (Y, 1))\tprobability = 0.35000"));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::numeric::{int, ratio};
    use proptest::prelude::*;

    fn space(label: &'static str) -> impl Strategy<Value = ProbabilitySpace> {
        proptest::collection::btree_map(-20_i64..20, 1_i64..50, 1..5).prop_map(move |raw| {
            let total: i64 = raw.values().sum();
            let pairs: Vec<(Value, Value)> = raw
                .iter()
                .map(|(&v, &w)| (int(v), ratio(w, total).unwrap()))
                .collect();
            ProbabilitySpace::from_values(Name::symbol(label).unwrap(), pairs, Precision::default())
                .unwrap()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn independent_marginals_round_trip(a in space("X"), b in space("Y"), c in space("Z")) {
            let jd = JointDistribution::independent(&[a.clone(), b.clone(), c.clone()]).unwrap();
            prop_assert_eq!(jd.marginals()[0].weight_map(), a.weight_map());
            prop_assert_eq!(jd.marginals()[1].weight_map(), b.weight_map());
            prop_assert_eq!(jd.marginals()[2].weight_map(), c.weight_map());
        }

        #[test]
        fn marginals_satisfy_total_law(a in space("X"), b in space("Y")) {
            let jd = JointDistribution::independent(&[a, b]).unwrap();
            for marginal in jd.marginals() {
                let total: Value = marginal.iter().map(|(_, p)| p.clone()).sum();
                prop_assert_eq!(total, Value::one());
            }
            for secondary in jd.secondaries() {
                let total: Value = secondary.space().iter().map(|(_, p)| p.clone()).sum();
                prop_assert_eq!(total, Value::one());
            }
        }
    }
}
