//! Validated one-dimensional probability spaces.
//!
//! A [`ProbabilitySpace`] is a variable name plus a map from [`Sample`]s of
//! that variable to probability weights. Construction enforces, at the
//! space's [`Precision`]:
//!
//! 1. every sample carries the space's name,
//! 2. no outcome is listed twice,
//! 3. every rounded weight lies in `[0, 1]`,
//! 4. the rounded total is exactly 1 (law of total probability).
//!
//! Entries whose rounded weight is 0 are dropped. A space that fails any
//! check is never returned.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use num_traits::{One, Zero};
use tracing::debug;

use crate::combine::WeightMap;
use crate::config::Precision;
use crate::error::{ProbError, Result};
use crate::numeric::{self, IntoValue, Value};
use crate::sample::Sample;
use crate::symbol::Name;

// ============================================================================
// Shared validation
// ============================================================================

/// Collects entries into a map, rejecting repeated keys.
pub(crate) fn collect_unique<K, I>(entries: I, describe: impl Fn(&K) -> String) -> Result<BTreeMap<K, Value>>
where
    K: Ord,
    I: IntoIterator<Item = (K, Value)>,
{
    let mut pspace = BTreeMap::new();
    for (key, weight) in entries {
        if pspace.contains_key(&key) {
            return Err(ProbError::DuplicateOutcome(describe(&key)));
        }
        pspace.insert(key, weight);
    }
    Ok(pspace)
}

/// Range check of each weight and the total law, both on rounded values.
pub(crate) fn check_weights<K>(pspace: &BTreeMap<K, Value>, precision: Precision) -> Result<()> {
    let places = precision.sigfigs;
    for weight in pspace.values() {
        let rounded = precision.round(weight);
        if rounded < Value::zero() || rounded > Value::one() {
            return Err(ProbError::ProbabilityOutOfRange {
                probability: numeric::format_exact(weight),
            });
        }
    }
    let total: Value = pspace.values().sum();
    if precision.round(&total) != Value::one() {
        return Err(ProbError::TotalLawViolated {
            total: numeric::format_fixed(&total, places),
        });
    }
    Ok(())
}

/// Drops entries that round to zero.
pub(crate) fn prune<K: Ord>(pspace: BTreeMap<K, Value>, precision: Precision) -> BTreeMap<K, Value> {
    pspace
        .into_iter()
        .filter(|(_, weight)| !precision.round(weight).is_zero())
        .collect()
}

/// Drops entries whose weight is exactly zero.
pub(crate) fn drop_zeros<K: Ord>(pspace: BTreeMap<K, Value>) -> BTreeMap<K, Value> {
    pspace
        .into_iter()
        .filter(|(_, weight)| !weight.is_zero())
        .collect()
}

// ============================================================================
// ProbabilitySpace
// ============================================================================

/// Name plus validated `Sample → weight` map.
#[derive(Debug, Clone)]
pub struct ProbabilitySpace {
    name: Name,
    pspace: BTreeMap<Sample, Value>,
    precision: Precision,
}

impl ProbabilitySpace {
    /// Builds a space at the default precision.
    ///
    /// # Errors
    /// See [`ProbabilitySpace::with_precision`].
    pub fn new<I>(name: Name, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Sample, Value)>,
    {
        Self::with_precision(name, entries, Precision::default())
    }

    /// Builds and validates a space.
    ///
    /// # Errors
    /// - [`ProbError::NameMismatch`] if a sample belongs to another name.
    /// - [`ProbError::DuplicateOutcome`] if a sample is listed twice.
    /// - [`ProbError::ProbabilityOutOfRange`] / [`ProbError::TotalLawViolated`]
    ///   if the weights are not a probability distribution.
    pub fn with_precision<I>(name: Name, entries: I, precision: Precision) -> Result<Self>
    where
        I: IntoIterator<Item = (Sample, Value)>,
    {
        let pspace = collect_unique(entries, Sample::to_string)?;
        if let Some(stray) = pspace.keys().find(|s| *s.name() != name) {
            return Err(ProbError::NameMismatch {
                sample: stray.to_string(),
                owner: name.to_string(),
            });
        }
        check_weights(&pspace, precision)?;
        let pspace = prune(pspace, precision);
        debug!(name = %name, outcomes = pspace.len(), sigfigs = precision.sigfigs, "validated probability space");
        Ok(Self {
            name,
            pspace,
            precision,
        })
    }

    /// Builds a space from `(value, weight)` pairs, attaching `name` to
    /// every value.
    ///
    /// # Errors
    /// As [`ProbabilitySpace::with_precision`], plus
    /// [`ProbError::InvalidNumber`] for unreadable numbers.
    pub fn from_values<I, V, P>(name: Name, pairs: I, precision: Precision) -> Result<Self>
    where
        I: IntoIterator<Item = (V, P)>,
        V: IntoValue,
        P: IntoValue,
    {
        let entries = pairs
            .into_iter()
            .map(|(v, p)| Ok((Sample::new(name.clone(), v.into_value()?), p.into_value()?)))
            .collect::<Result<Vec<_>>>()?;
        Self::with_precision(name, entries, precision)
    }

    /// Assembles a space from weights derived from validated spaces: a
    /// marginal or secondary of a joint, a value map of one space, or the
    /// combination of independent spaces. Such weights are a distribution
    /// by construction, so they are kept exact and only exact zeros are
    /// dropped.
    pub(crate) fn from_grouped(name: Name, weights: WeightMap, precision: Precision) -> Self {
        let pspace = weights
            .into_iter()
            .map(|(value, weight)| (Sample::new(name.clone(), value), weight))
            .collect();
        Self {
            name,
            pspace: drop_zeros(pspace),
            precision,
        }
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn pspace(&self) -> &BTreeMap<Sample, Value> {
        &self.pspace
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Number of outcomes with non-zero weight.
    pub fn len(&self) -> usize {
        self.pspace.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pspace.is_empty()
    }

    /// Iterates `(sample, weight)` in ascending value order.
    pub fn iter(&self) -> impl Iterator<Item = (&Sample, &Value)> {
        self.pspace.iter()
    }

    /// Weight of one sample; `None` if it is not an outcome.
    pub fn weight(&self, sample: &Sample) -> Option<&Value> {
        self.pspace.get(sample)
    }

    /// Outcome values in ascending order.
    pub fn values(&self) -> Vec<Value> {
        self.pspace.keys().map(|s| s.value().clone()).collect()
    }

    /// `value → weight` view with the name dropped.
    pub fn weight_map(&self) -> WeightMap {
        self.pspace
            .iter()
            .map(|(s, p)| (s.value().clone(), p.clone()))
            .collect()
    }

    /// `(sample, rounded weight)` pairs sorted by sample.
    pub fn to_rounded(&self) -> Vec<(Sample, Value)> {
        self.pspace
            .iter()
            .map(|(s, p)| (s.clone(), self.precision.round(p)))
            .filter(|(_, p)| !p.is_zero())
            .collect()
    }
}

impl AsRef<ProbabilitySpace> for ProbabilitySpace {
    fn as_ref(&self) -> &ProbabilitySpace {
        self
    }
}

impl PartialEq for ProbabilitySpace {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.to_rounded() == other.to_rounded()
    }
}

impl Eq for ProbabilitySpace {}

impl Hash for ProbabilitySpace {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.to_rounded().hash(state);
    }
}

impl fmt::Display for ProbabilitySpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Random variable {}", self.name)?;
        for (sample, weight) in &self.pspace {
            write!(
                f,
                "\n{sample}\tprobability = {}",
                numeric::format_fixed(weight, self.precision.sigfigs)
            )?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
