//! Numeric payload of a primitive and its cross-representation equality.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use num_traits::ToPrimitive;

use crate::error::{CsonError, Result};

/// A JSON number.
///
/// Numbers read by the parser are kept as [`Number::Lazy`] text and only
/// validated when a numeric view is requested.
#[derive(Debug, Clone)]
pub enum Number {
    Integer(i64),
    BigInteger(BigInt),
    Float(f64),
    Decimal(BigDecimal),
    Lazy(String),
}

impl Number {
    pub fn lazy(text: impl Into<String>) -> Self {
        Number::Lazy(text.into())
    }

    /// `true` for numbers stored as integers of any width.
    pub fn is_integral(&self) -> bool {
        matches!(self, Number::Integer(_) | Number::BigInteger(_))
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self, Number::Lazy(_))
    }

    /// `true` for NaN and the infinities, whether stored or written out.
    pub fn is_non_finite(&self) -> bool {
        match self {
            Number::Float(value) => !value.is_finite(),
            Number::Lazy(text) => matches!(text.as_str(), "NaN" | "Infinity" | "-Infinity"),
            _ => false,
        }
    }

    pub fn as_f64(&self) -> Result<f64> {
        match self {
            Number::Integer(value) => Ok(*value as f64),
            Number::BigInteger(value) => Ok(big_to_f64(value)),
            Number::Float(value) => Ok(*value),
            Number::Decimal(value) => value
                .to_f64()
                .ok_or_else(|| CsonError::conversion("f64", value.to_string())),
            Number::Lazy(text) => {
                f64::from_str(text).map_err(|_| CsonError::conversion("f64", text.as_str()))
            }
        }
    }

    pub fn as_f32(&self) -> Result<f32> {
        match self {
            Number::Float(value) => Ok(*value as f32),
            other => Ok(other.as_f64()? as f32),
        }
    }

    /// Narrows to `i64`, keeping the low 64 bits of wider integers and
    /// truncating fractions. Floats saturate.
    pub fn as_i64(&self) -> Result<i64> {
        match self {
            Number::Integer(value) => Ok(*value),
            Number::BigInteger(value) => Ok(low_i64(value)),
            Number::Float(value) => Ok(*value as i64),
            Number::Decimal(value) => Ok(decimal_to_i64(value)),
            Number::Lazy(text) => match i64::from_str(text) {
                Ok(value) => Ok(value),
                Err(_) => BigDecimal::from_str(text)
                    .map(|value| decimal_to_i64(&value))
                    .map_err(|_| CsonError::conversion("i64", text.as_str())),
            },
        }
    }

    pub fn as_i32(&self) -> Result<i32> {
        match self {
            Number::Float(value) => Ok(*value as i32),
            other => Ok(other.as_i64()? as i32),
        }
    }

    pub fn as_i16(&self) -> Result<i16> {
        Ok(self.as_i32()? as i16)
    }

    pub fn as_i8(&self) -> Result<i8> {
        Ok(self.as_i32()? as i8)
    }

    /// Every representation hashes through its `f64` value, the one view
    /// all cross-representation comparisons share.
    fn hash_key(&self) -> i64 {
        self.as_f64().map(float_key).unwrap_or(0)
    }

    /// The form this number takes in formats with fixed-width integers.
    ///
    /// Integral values, whatever their storage, map to the narrowest exact
    /// integer; ones past 128 bits are [`Wire::Oversized`]. Everything else
    /// is an `f64`.
    pub(crate) fn wire(&self) -> Result<Wire> {
        match self {
            Number::Integer(value) => Ok(Wire::Signed(*value)),
            Number::BigInteger(value) => Ok(Wire::integer(value)),
            Number::Float(value) => Ok(Wire::Float(*value)),
            Number::Decimal(value) if value.is_integer() => {
                let (integer, _) = value.with_scale(0).into_bigint_and_exponent();
                Ok(Wire::integer(&integer))
            }
            Number::Lazy(text) => match BigInt::from_str(text) {
                Ok(integer) => Ok(Wire::integer(&integer)),
                Err(_) => self.as_f64().map(Wire::Float),
            },
            Number::Decimal(_) => self.as_f64().map(Wire::Float),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Wire {
    Signed(i64),
    Unsigned(u64),
    WideSigned(i128),
    WideUnsigned(u128),
    Oversized,
    Float(f64),
}

impl Wire {
    fn integer(value: &BigInt) -> Self {
        if let Some(small) = value.to_i64() {
            Wire::Signed(small)
        } else if let Some(unsigned) = value.to_u64() {
            Wire::Unsigned(unsigned)
        } else if let Some(wide) = value.to_i128() {
            Wire::WideSigned(wide)
        } else if let Some(wide) = value.to_u128() {
            Wire::WideUnsigned(wide)
        } else {
            Wire::Oversized
        }
    }
}

fn big_to_f64(value: &BigInt) -> f64 {
    value.to_f64().unwrap_or(match value.sign() {
        Sign::Minus => f64::NEG_INFINITY,
        _ => f64::INFINITY,
    })
}

/// Two's complement low 64 bits.
fn low_i64(value: &BigInt) -> i64 {
    let (sign, digits) = value.to_u64_digits();
    let low = digits.first().copied().unwrap_or(0) as i64;
    match sign {
        Sign::Minus => low.wrapping_neg(),
        _ => low,
    }
}

fn decimal_to_i64(value: &BigDecimal) -> i64 {
    let (integer, _) = value.with_scale(0).into_bigint_and_exponent();
    low_i64(&integer)
}

fn float_key(value: f64) -> i64 {
    if value.is_nan() {
        f64::NAN.to_bits() as i64
    } else if value == 0.0 {
        0
    } else if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
        value as i64
    } else {
        value.to_bits() as i64
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => a == b,
            (Number::BigInteger(a), Number::BigInteger(b)) => a == b,
            (Number::Integer(a), Number::BigInteger(b))
            | (Number::BigInteger(b), Number::Integer(a)) => BigInt::from(*a) == *b,
            (Number::Decimal(a), Number::Decimal(b)) => a.cmp(b) == Ordering::Equal,
            _ => match (self.as_f64(), other.as_f64()) {
                (Ok(a), Ok(b)) => a == b || (a.is_nan() && b.is_nan()),
                _ => matches!((self, other), (Number::Lazy(a), Number::Lazy(b)) if a == b),
            },
        }
    }
}

impl Eq for Number {}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_i64(self.hash_key());
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(value) => write!(f, "{value}"),
            Number::BigInteger(value) => write!(f, "{value}"),
            Number::Float(value) if value.is_nan() => f.write_str("NaN"),
            Number::Float(value) if value.is_infinite() => {
                f.write_str(if *value > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Number::Float(value) => write!(f, "{value:?}"),
            Number::Decimal(value) => write!(f, "{value}"),
            Number::Lazy(text) => f.write_str(text),
        }
    }
}

macro_rules! from_small_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Number::Integer(i64::from(value))
                }
            }
        )*
    };
}

macro_rules! from_wide_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    match i64::try_from(value) {
                        Ok(value) => Number::Integer(value),
                        Err(_) => Number::BigInteger(BigInt::from(value)),
                    }
                }
            }
        )*
    };
}

from_small_int!(i8, i16, i32, i64, u8, u16, u32);
from_wide_int!(u64, i128, u128, isize, usize);

impl From<f32> for Number {
    fn from(value: f32) -> Self {
        Number::Float(f64::from(value))
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

impl From<BigInt> for Number {
    fn from(value: BigInt) -> Self {
        Number::BigInteger(value)
    }
}

impl From<BigDecimal> for Number {
    fn from(value: BigDecimal) -> Self {
        Number::Decimal(value)
    }
}
