//! Combination of weighted value maps.
//!
//! A weight map sends each outcome value to its probability. Combining two
//! maps under a binary operator pairs every entry of the first with every
//! entry of the second, applies the operator to the values and multiplies
//! the weights; pairs landing on the same value accumulate.
//!
//! With `+` this is the discrete convolution (the distribution of the sum
//! of two independent variables); with `*` it gives the distribution of
//! their product.
//!
//! # Complexity
//! One combination is O(|a|·|b|) operator applications.

use std::collections::BTreeMap;

use num_traits::{One, Zero};
use tracing::trace;

use crate::numeric::Value;

/// Outcome value → probability weight.
pub type WeightMap = BTreeMap<Value, Value>;

/// Adds `weight` to `key`, inserting it if absent.
pub fn accumulate<K: Ord>(map: &mut BTreeMap<K, Value>, key: K, weight: Value) {
    *map.entry(key).or_insert_with(Value::zero) += weight;
}

/// Pairwise combination of two weight maps under `op`.
pub fn combine<F>(first: &WeightMap, second: &WeightMap, op: F) -> WeightMap
where
    F: Fn(&Value, &Value) -> Value,
{
    let mut combined = WeightMap::new();
    for (v1, p1) in first {
        for (v2, p2) in second {
            accumulate(&mut combined, op(v1, v2), p1 * p2);
        }
    }
    trace!(
        left = first.len(),
        right = second.len(),
        outcomes = combined.len(),
        "combined weight maps"
    );
    combined
}

/// Distribution of the sum of two independent variables.
///
/// # Examples
/// ```
/// use u_discrete::combine::{convolve, WeightMap};
/// use u_discrete::numeric::{int, ratio};
/// let half = ratio(1, 2).unwrap();
/// let coin: WeightMap = [(int(0), half.clone()), (int(1), half)].into_iter().collect();
/// let two = convolve(&coin, &coin);
/// assert_eq!(two[&int(1)], ratio(1, 2).unwrap());
/// assert_eq!(two[&int(2)], ratio(1, 4).unwrap());
/// ```
pub fn convolve(first: &WeightMap, second: &WeightMap) -> WeightMap {
    combine(first, second, |a, b| a + b)
}

/// Distribution of the product of two independent variables.
pub fn multiply(first: &WeightMap, second: &WeightMap) -> WeightMap {
    combine(first, second, |a, b| a * b)
}

/// Folds any number of maps under an associative `op` whose neutral value
/// is `identity`. The empty fold is the point mass at `identity`.
pub fn combine_many<'a, I, F>(maps: I, identity: Value, op: F) -> WeightMap
where
    I: IntoIterator<Item = &'a WeightMap>,
    F: Fn(&Value, &Value) -> Value,
{
    let mut acc: WeightMap = BTreeMap::from([(identity, Value::one())]);
    for map in maps {
        acc = combine(&acc, map, &op);
    }
    acc
}

/// Convolution of several independent variables.
pub fn convolve_many<'a, I>(maps: I) -> WeightMap
where
    I: IntoIterator<Item = &'a WeightMap>,
{
    combine_many(maps, Value::zero(), |a, b| a + b)
}

/// Product distribution of several independent variables.
pub fn multiply_many<'a, I>(maps: I) -> WeightMap
where
    I: IntoIterator<Item = &'a WeightMap>,
{
    combine_many(maps, Value::one(), |a, b| a * b)
}

// ============================================================================
// Tests
// ============================================================================
