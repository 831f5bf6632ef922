//! Exact numeric representation.
//!
//! Every sample value, probability weight and moment in this crate is a
//! [`Value`], an arbitrary-precision rational. Floating-point inputs are
//! captured from their shortest round-trip decimal text, so `0.14_f64`
//! becomes exactly `7/50` rather than the nearest binary fraction.
//!
//! Rounding to a number of decimal places (the `SIGFIGS` of a space) is
//! applied only when validating the total law and when reporting results.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::error::{ProbError, Result};

/// Exact numeric type used uniformly for values, weights and moments.
pub type Value = BigRational;

/// Largest number of decimal places tried before falling back to `p/q`
/// notation in [`format_exact`].
const MAX_EXACT_PLACES: u32 = 30;

/// Builds a [`Value`] from an integer.
pub fn int(n: i64) -> Value {
    BigRational::from_integer(BigInt::from(n))
}

/// Builds the exact fraction `numer / denom`.
///
/// # Errors
/// Returns [`ProbError::InvalidNumber`] if `denom` is zero.
pub fn ratio(numer: i64, denom: i64) -> Result<Value> {
    if denom == 0 {
        return Err(ProbError::InvalidNumber(format!("{numer}/{denom}")));
    }
    Ok(BigRational::new(BigInt::from(numer), BigInt::from(denom)))
}

/// `10^places` as a big integer.
pub fn pow10(places: u32) -> BigInt {
    num_traits::pow(BigInt::from(10u32), places as usize)
}

/// Parses decimal text such as `"-1.25"`, `"3"`, `"1e-3"` or a fraction
/// `"1/3"` into an exact [`Value`].
///
/// # Errors
/// Returns [`ProbError::InvalidNumber`] for anything else.
///
/// # Examples
/// ```
/// use u_discrete::numeric::{parse_decimal, ratio};
/// assert_eq!(parse_decimal("0.25").unwrap(), ratio(1, 4).unwrap());
/// assert_eq!(parse_decimal("1/3").unwrap(), ratio(1, 3).unwrap());
/// assert!(parse_decimal("abc").is_err());
/// ```
pub fn parse_decimal(text: &str) -> Result<Value> {
    let invalid = || ProbError::InvalidNumber(text.to_string());
    let trimmed = text.trim();

    if let Some((numer, denom)) = trimmed.split_once('/') {
        let numer = parse_decimal(numer)?;
        let denom = parse_decimal(denom)?;
        if denom.is_zero() {
            return Err(invalid());
        }
        return Ok(numer / denom);
    }

    let (mantissa, exponent) = match trimmed.find(['e', 'E']) {
        Some(i) => {
            let exp: i64 = trimmed[i + 1..].parse().map_err(|_| invalid())?;
            (&trimmed[..i], exp)
        }
        None => (trimmed, 0),
    };

    let (negative, unsigned) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa.strip_prefix('+').unwrap_or(mantissa)),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    if !int_part
        .chars()
        .chain(frac_part.chars())
        .all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }

    let digits = format!("{int_part}{frac_part}");
    let mut numer: BigInt = digits.parse().map_err(|_| invalid())?;
    if negative {
        numer = -numer;
    }

    let scale = frac_part.len() as i64 - exponent;
    let magnitude = u32::try_from(scale.unsigned_abs()).map_err(|_| invalid())?;
    if scale >= 0 {
        Ok(BigRational::new(numer, pow10(magnitude)))
    } else {
        Ok(BigRational::from_integer(numer * pow10(magnitude)))
    }
}

/// Captures a finite `f64` through its shortest round-trip decimal text.
///
/// # Errors
/// Returns [`ProbError::InvalidNumber`] for NaN or infinities.
pub fn from_f64(x: f64) -> Result<Value> {
    if !x.is_finite() {
        return Err(ProbError::InvalidNumber(x.to_string()));
    }
    parse_decimal(&x.to_string())
}

/// Rounds to `places` decimal places, halves away from zero.
pub fn round_to(x: &Value, places: u32) -> Value {
    let scale = BigRational::from_integer(pow10(places));
    (x * &scale).round() / scale
}

/// Nearest `f64`; NaN if the value is out of range.
pub fn to_f64(x: &Value) -> f64 {
    x.to_f64().unwrap_or(f64::NAN)
}

/// Formats with exactly `places` decimal places after rounding.
pub fn format_fixed(x: &Value, places: u32) -> String {
    let scaled = (x * BigRational::from_integer(pow10(places)))
        .round()
        .to_integer();
    let negative = scaled.is_negative();
    let mut digits = scaled.abs().to_string();
    let places = places as usize;
    if places == 0 {
        return if negative { format!("-{digits}") } else { digits };
    }
    if digits.len() <= places {
        digits = format!("{}{digits}", "0".repeat(places + 1 - digits.len()));
    }
    let (whole, frac) = digits.split_at(digits.len() - places);
    let sign = if negative { "-" } else { "" };
    format!("{sign}{whole}.{frac}")
}

/// Formats without loss: terminating decimals as decimals, anything else as
/// `p/q`.
pub fn format_exact(x: &Value) -> String {
    for places in 0..=MAX_EXACT_PLACES {
        let scaled = x * BigRational::from_integer(pow10(places));
        if scaled.is_integer() {
            return format_fixed(x, places);
        }
    }
    x.to_string()
}

/// Conversion into an exact [`Value`].
///
/// Implemented for the numeric inputs callers typically have at hand so
/// constructors can take plain literals.
pub trait IntoValue {
    fn into_value(self) -> Result<Value>;
}

impl IntoValue for Value {
    fn into_value(self) -> Result<Value> {
        Ok(self)
    }
}

impl IntoValue for &Value {
    fn into_value(self) -> Result<Value> {
        Ok(self.clone())
    }
}

impl IntoValue for i32 {
    fn into_value(self) -> Result<Value> {
        Ok(int(i64::from(self)))
    }
}

impl IntoValue for i64 {
    fn into_value(self) -> Result<Value> {
        Ok(int(self))
    }
}

impl IntoValue for u32 {
    fn into_value(self) -> Result<Value> {
        Ok(int(i64::from(self)))
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Result<Value> {
        from_f64(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Result<Value> {
        parse_decimal(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
