//! Numbers.
//!
//! A number keeps the literal it was written as (`2Ki`, `1.5k`, `0x1F`) and is
//! converted to an integer or float only when an operation needs one. Results
//! of arithmetic are stored back as plain decimal literals.

use std::cmp::Ordering;
use std::fmt;

use super::heap::Heap;
use crate::errors::{integer_overflow, invalid_number, EvalResult};

/// Decimal magnitude suffixes (powers of 1000).
const DECIMAL_SUFFIXES: [(&str, i64); 5] = [
    ("k", 1_000),
    ("M", 1_000_000),
    ("G", 1_000_000_000),
    ("T", 1_000_000_000_000),
    ("P", 1_000_000_000_000_000),
];

/// Binary magnitude suffixes (powers of 1024). Checked before the decimal ones.
const BINARY_SUFFIXES: [(&str, i64); 6] = [
    ("Ki", 1 << 10),
    ("ki", 1 << 10),
    ("Mi", 1 << 20),
    ("Gi", 1 << 30),
    ("Ti", 1 << 40),
    ("Pi", 1 << 50),
];

/// Numeric value of a literal.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum NumberRepr {
    Int(i64),
    Float(f64),
}

impl NumberRepr {
    #[allow(clippy::cast_precision_loss, reason = "float arithmetic on mixed operands")]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }
}

/// A number value.
#[derive(Clone)]
pub struct Number(Heap<str>);

impl Number {
    /// Parse and validate a literal.
    pub fn parse(literal: &str) -> EvalResult<Number> {
        parse_literal(literal)?;
        Ok(Number(Heap::from_ref(literal)))
    }

    pub fn from_i64(value: i64) -> Number {
        Number(Heap::from_ref(&value.to_string()))
    }

    /// Integral floats collapse to integers.
    pub fn from_f64(value: f64) -> EvalResult<Number> {
        if !value.is_finite() {
            return Err(integer_overflow("float arithmetic"));
        }
        Ok(Number(Heap::from_ref(&value.to_string())))
    }

    pub fn from_repr(repr: NumberRepr) -> EvalResult<Number> {
        match repr {
            NumberRepr::Int(i) => Ok(Self::from_i64(i)),
            NumberRepr::Float(f) => Self::from_f64(f),
        }
    }

    /// The literal as written.
    #[inline]
    pub fn literal(&self) -> &str {
        &self.0
    }

    pub fn repr(&self) -> EvalResult<NumberRepr> {
        parse_literal(&self.0)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self.repr(), Ok(NumberRepr::Int(_)))
    }

    pub fn to_i64(&self) -> EvalResult<i64> {
        match self.repr()? {
            NumberRepr::Int(i) => Ok(i),
            NumberRepr::Float(_) => Err(invalid_number(self.literal(), "not an integer")),
        }
    }

    pub fn to_f64(&self) -> EvalResult<f64> {
        Ok(self.repr()?.as_f64())
    }

    /// Numeric ordering; integers compare exactly.
    pub fn compare(&self, other: &Number) -> EvalResult<Option<Ordering>> {
        Ok(match (self.repr()?, other.repr()?) {
            (NumberRepr::Int(a), NumberRepr::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        })
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.literal() == other.literal()
            || matches!(self.compare(other), Ok(Some(Ordering::Equal)))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.literal())
    }
}

impl fmt::Debug for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Number({})", self.literal())
    }
}

fn parse_literal(literal: &str) -> EvalResult<NumberRepr> {
    let cleaned: String = literal.chars().filter(|c| *c != '_').collect();
    let (negative, unsigned) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.strip_prefix('+').unwrap_or(&cleaned)),
    };
    if unsigned.is_empty() {
        return Err(invalid_number(literal, "empty literal"));
    }

    let (mantissa, multiplier) = split_suffix(unsigned);
    let repr = parse_mantissa(literal, mantissa)?;
    let repr = match repr {
        NumberRepr::Int(i) => i
            .checked_mul(multiplier)
            .map(NumberRepr::Int)
            .ok_or_else(|| integer_overflow("number literal"))?,
        NumberRepr::Float(f) => scale_float(f, multiplier),
    };
    Ok(match (negative, repr) {
        (false, repr) => repr,
        (true, NumberRepr::Int(i)) => NumberRepr::Int(-i),
        (true, NumberRepr::Float(f)) => NumberRepr::Float(-f),
    })
}

fn split_suffix(unsigned: &str) -> (&str, i64) {
    if unsigned.starts_with("0x") || unsigned.starts_with("0X") {
        return (unsigned, 1);
    }
    for (suffix, multiplier) in BINARY_SUFFIXES.iter().chain(DECIMAL_SUFFIXES.iter()) {
        if let Some(mantissa) = unsigned.strip_suffix(suffix) {
            return (mantissa, *multiplier);
        }
    }
    (unsigned, 1)
}

fn parse_mantissa(literal: &str, mantissa: &str) -> EvalResult<NumberRepr> {
    let radix = match mantissa.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return i64::from_str_radix(&mantissa[2..], radix)
            .map(NumberRepr::Int)
            .map_err(|e| invalid_number(literal, e.to_string()));
    }

    if mantissa.is_empty()
        || !mantissa
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return Err(invalid_number(literal, "unexpected character"));
    }
    let is_float = mantissa.contains(['.', 'e', 'E']);
    if !is_float {
        if let Ok(i) = mantissa.parse::<i64>() {
            return Ok(NumberRepr::Int(i));
        }
    }
    mantissa
        .parse::<f64>()
        .map(NumberRepr::Float)
        .map_err(|e| invalid_number(literal, e.to_string()))
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::float_cmp,
    reason = "exactness is checked before narrowing"
)]
fn scale_float(value: f64, multiplier: i64) -> NumberRepr {
    let scaled = value * multiplier as f64;
    if multiplier != 1 && scaled.fract() == 0.0 && scaled.abs() < 9.0e15 {
        NumberRepr::Int(scaled as i64)
    } else {
        NumberRepr::Float(scaled)
    }
}

#[cfg(test)]
mod tests;
