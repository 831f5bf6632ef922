//! Atomic outcomes.
//!
//! A [`Sample`] pairs the [`Name`] of the variable it belongs to with an
//! exact [`Value`]. Samples compose the same way their variables do: adding
//! two samples adds both the names and the values.

use std::fmt;

use crate::error::Result;
use crate::numeric::{self, IntoValue, Value};
use crate::symbol::Name;

/// A `(name, value)` outcome of a random variable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Sample {
    name: Name,
    value: Value,
}

impl Sample {
    pub fn new(name: Name, value: Value) -> Self {
        Self { name, value }
    }

    /// Builds a sample from any numeric input accepted by [`IntoValue`].
    ///
    /// # Errors
    /// Returns [`crate::ProbError::InvalidNumber`] if `value` is not a
    /// finite number.
    pub fn of(name: &Name, value: impl IntoValue) -> Result<Self> {
        Ok(Self::new(name.clone(), value.into_value()?))
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// `self + c`: both name and value shifted.
    pub fn shift(&self, c: &Value) -> Self {
        Self::new(self.name.shift(c), &self.value + c)
    }

    /// `c * self`.
    pub fn scale(&self, c: &Value) -> Self {
        Self::new(self.name.scale(c), &self.value * c)
    }

    /// `self + other`.
    pub fn plus(&self, other: &Self) -> Self {
        Self::new(self.name.plus(&other.name), &self.value + &other.value)
    }

    /// `self * other`.
    pub fn times(&self, other: &Self) -> Self {
        Self::new(self.name.times(&other.name), &self.value * &other.value)
    }

    /// `self ** exp`.
    pub fn powi(&self, exp: u32) -> Self {
        Self::new(
            self.name.powi(exp),
            num_traits::pow(self.value.clone(), exp as usize),
        )
    }

    /// The same value relabelled.
    pub(crate) fn renamed(&self, name: &Name) -> Self {
        Self::new(name.clone(), self.value.clone())
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.name, numeric::format_exact(&self.value))
    }
}
