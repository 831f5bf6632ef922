//! Threshold predicates for probability queries.
//!
//! A [`Predicate`] is one of five comparators against a fixed threshold.
//! Text such as `"<= 1.0"` is parsed into this closed type; it is never
//! evaluated as an expression.

use std::fmt;
use std::str::FromStr;

use crate::error::{ProbError, Result};
use crate::numeric::{self, IntoValue, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Le,
    Ge,
    Eq,
    Lt,
    Gt,
}

impl Comparator {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Lt => "<",
            Self::Gt => ">",
        }
    }
}

/// `value <op> threshold`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Predicate {
    comparator: Comparator,
    threshold: Value,
}

impl Predicate {
    pub fn new(comparator: Comparator, threshold: Value) -> Self {
        Self {
            comparator,
            threshold,
        }
    }

    /// Builds a predicate from any numeric threshold.
    ///
    /// # Errors
    /// Returns [`ProbError::InvalidNumber`] for a non-finite threshold.
    pub fn with(comparator: Comparator, threshold: impl IntoValue) -> Result<Self> {
        Ok(Self::new(comparator, threshold.into_value()?))
    }

    pub fn le(threshold: Value) -> Self {
        Self::new(Comparator::Le, threshold)
    }

    pub fn ge(threshold: Value) -> Self {
        Self::new(Comparator::Ge, threshold)
    }

    pub fn equals(threshold: Value) -> Self {
        Self::new(Comparator::Eq, threshold)
    }

    pub fn lt(threshold: Value) -> Self {
        Self::new(Comparator::Lt, threshold)
    }

    pub fn gt(threshold: Value) -> Self {
        Self::new(Comparator::Gt, threshold)
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    pub fn threshold(&self) -> &Value {
        &self.threshold
    }

    /// Whether `value` satisfies the comparison.
    pub fn holds(&self, value: &Value) -> bool {
        match self.comparator {
            Comparator::Le => *value <= self.threshold,
            Comparator::Ge => *value >= self.threshold,
            Comparator::Eq => *value == self.threshold,
            Comparator::Lt => *value < self.threshold,
            Comparator::Gt => *value > self.threshold,
        }
    }
}

impl FromStr for Predicate {
    type Err = ProbError;

    /// Accepts `<=`, `>=`, `==` (or `=`), `<`, `>` followed by a number,
    /// with optional whitespace: `"<= 1.0"`, `">=-2"`, `"== 1/3"`.
    fn from_str(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        // Two-character operators must be tried before their prefixes.
        let operators = [
            ("<=", Comparator::Le),
            (">=", Comparator::Ge),
            ("==", Comparator::Eq),
            ("<", Comparator::Lt),
            (">", Comparator::Gt),
            ("=", Comparator::Eq),
        ];
        let (comparator, rest) = operators
            .iter()
            .find_map(|(op, cmp)| trimmed.strip_prefix(op).map(|rest| (*cmp, rest)))
            .ok_or_else(|| ProbError::InvalidPredicate(text.to_string()))?;
        let threshold = numeric::parse_decimal(rest)
            .map_err(|_| ProbError::InvalidPredicate(text.to_string()))?;
        Ok(Self::new(comparator, threshold))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.comparator.symbol(),
            numeric::format_exact(&self.threshold)
        )
    }
}
