//! Symbolic variable names.
//!
//! A [`Name`] labels a random variable and composes alongside it: the sum
//! of `X` and `Y` is named `X + Y`, the product `X*Y`, the square `X**2`.
//! Names are polynomials with exact rational coefficients over named
//! symbols, always held in canonical form, so structurally different
//! spellings of the same expression compare (and hash) equal:
//!
//! - `X*Y == Y*X`
//! - `X - X == 0`
//! - `2*(X + 1) == 2*X + 2`
//!
//! Only equality, hashing and composition are relied upon elsewhere in the
//! crate; nothing inspects the polynomial structure directly.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num_traits::{One, Signed, Zero};

use crate::error::{ProbError, Result};
use crate::numeric::{self, Value};

/// Product of symbols raised to positive powers. The empty product is 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Monomial(BTreeMap<String, u32>);

impl Monomial {
    fn symbol(label: &str) -> Self {
        Self(BTreeMap::from([(label.to_string(), 1)]))
    }

    fn is_unit(&self) -> bool {
        self.0.is_empty()
    }

    fn times(&self, other: &Self) -> Self {
        let mut powers = self.0.clone();
        for (label, exp) in &other.0 {
            *powers.entry(label.clone()).or_insert(0) += exp;
        }
        Self(powers)
    }
}

impl fmt::Display for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (label, exp) in &self.0 {
            if !first {
                write!(f, "*")?;
            }
            first = false;
            if *exp == 1 {
                write!(f, "{label}")?;
            } else {
                write!(f, "{label}**{exp}")?;
            }
        }
        Ok(())
    }
}

/// Canonical polynomial label of a random variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name {
    /// Non-zero coefficients only.
    terms: BTreeMap<Monomial, Value>,
}

impl Name {
    /// A single symbol such as `X` or `x_1`.
    ///
    /// # Errors
    /// Returns [`ProbError::InvalidLabel`] unless `label` starts with a
    /// letter or `_` and continues with letters, digits or `_`.
    pub fn symbol(label: &str) -> Result<Self> {
        let mut chars = label.chars();
        let valid_head = chars
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_');
        if !valid_head || !chars.all(|c| c.is_alphanumeric() || c == '_') {
            return Err(ProbError::InvalidLabel(label.to_string()));
        }
        Ok(Self {
            terms: BTreeMap::from([(Monomial::symbol(label), Value::one())]),
        })
    }

    /// The constant polynomial `c`.
    pub fn constant(c: Value) -> Self {
        let mut name = Self::zero();
        name.insert(Monomial::default(), c);
        name
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// True when no symbol occurs (including the zero name).
    pub fn is_constant(&self) -> bool {
        self.terms.keys().all(Monomial::is_unit)
    }

    /// The constant value, if this name has no symbols.
    pub fn as_constant(&self) -> Option<Value> {
        if !self.is_constant() {
            return None;
        }
        Some(
            self.terms
                .get(&Monomial::default())
                .cloned()
                .unwrap_or_else(Value::zero),
        )
    }

    /// Distinct symbols occurring in this name.
    pub fn symbols(&self) -> BTreeSet<&str> {
        self.terms
            .keys()
            .flat_map(|m| m.0.keys().map(String::as_str))
            .collect()
    }

    fn insert(&mut self, monomial: Monomial, coefficient: Value) {
        let slot = self.terms.entry(monomial).or_insert_with(Value::zero);
        *slot += coefficient;
        if slot.is_zero() {
            self.terms.retain(|_, c| !c.is_zero());
        }
    }

    /// `self + other`.
    pub fn plus(&self, other: &Self) -> Self {
        let mut sum = self.clone();
        for (monomial, coefficient) in &other.terms {
            sum.insert(monomial.clone(), coefficient.clone());
        }
        sum
    }

    /// `self * other`, expanded.
    pub fn times(&self, other: &Self) -> Self {
        let mut product = Self::zero();
        for (m1, c1) in &self.terms {
            for (m2, c2) in &other.terms {
                product.insert(m1.times(m2), c1 * c2);
            }
        }
        product
    }

    /// `self ** exp`; `exp = 0` gives the constant 1.
    pub fn powi(&self, exp: u32) -> Self {
        let mut result = Self::constant(Value::one());
        for _ in 0..exp {
            result = result.times(self);
        }
        result
    }

    /// `self + c`.
    pub fn shift(&self, c: &Value) -> Self {
        self.plus(&Self::constant(c.clone()))
    }

    /// `c * self`.
    pub fn scale(&self, c: &Value) -> Self {
        self.times(&Self::constant(c.clone()))
    }

    pub fn negated(&self) -> Self {
        self.scale(&-Value::one())
    }

    /// True if a symbol occurs in both names. `X`, `2*X + 1`, `X**2` and
    /// `X*Y` all share `X`; constants share nothing.
    pub fn shares_symbol(&self, other: &Self) -> bool {
        let mine = self.symbols();
        other.symbols().iter().any(|s| mine.contains(s))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        // Symbolic terms first, constant last.
        let ordered = self
            .terms
            .iter()
            .filter(|(m, _)| !m.is_unit())
            .chain(self.terms.iter().filter(|(m, _)| m.is_unit()));

        for (i, (monomial, coefficient)) in ordered.enumerate() {
            let magnitude = coefficient.abs();
            if i == 0 {
                if coefficient.is_negative() {
                    write!(f, "-")?;
                }
            } else if coefficient.is_negative() {
                write!(f, " - ")?;
            } else {
                write!(f, " + ")?;
            }
            if monomial.is_unit() {
                write!(f, "{}", numeric::format_exact(&magnitude))?;
            } else if magnitude.is_one() {
                write!(f, "{monomial}")?;
            } else {
                write!(f, "{}*{monomial}", numeric::format_exact(&magnitude))?;
            }
        }
        Ok(())
    }
}

macro_rules! forward_name_binop {
    ($trait:ident, $method:ident, $inner:ident) => {
        impl $trait<&Name> for &Name {
            type Output = Name;
            fn $method(self, rhs: &Name) -> Name {
                self.$inner(rhs)
            }
        }

        impl $trait for Name {
            type Output = Name;
            fn $method(self, rhs: Name) -> Name {
                (&self).$inner(&rhs)
            }
        }
    };
}

forward_name_binop!(Add, add, plus);
forward_name_binop!(Mul, mul, times);

impl Sub<&Name> for &Name {
    type Output = Name;
    fn sub(self, rhs: &Name) -> Name {
        self.plus(&rhs.negated())
    }
}

impl Sub for Name {
    type Output = Name;
    fn sub(self, rhs: Name) -> Name {
        &self - &rhs
    }
}

impl Neg for &Name {
    type Output = Name;
    fn neg(self) -> Name {
        self.negated()
    }
}

impl Neg for Name {
    type Output = Name;
    fn neg(self) -> Name {
        self.negated()
    }
}

// ============================================================================
// Tests
// ============================================================================
