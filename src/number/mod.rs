//! # Number
//!
//! [`Number`] is a closed tagged union over the six numeric kinds the crate
//! understands. Values are immutable; arithmetic picks a shared
//! representation for its operands and may return a different kind than
//! either of them, so that no operation silently loses precision.
//!
//! ```rust
//! use numtower::{Number, NumberKind};
//!
//! let a = Number::from(i64::MAX);
//! let sum = &a + &Number::from(1);
//! assert_eq!(sum.kind(), NumberKind::Integer);
//! assert_eq!(sum.to_string(), "9223372036854775808");
//!
//! let third = &Number::from(1) / &Number::from(3);
//! assert_eq!(third.kind(), NumberKind::Rational);
//! assert_eq!(third.to_string(), "1/3");
//! ```

use std::fmt::{self, Display};

use num_bigint::{BigInt, BigUint};
use num_traits::Signed;

use crate::bigfloat::{BinaryFloat, Decimal};
use crate::context::Context;
use crate::rational::Rational;

pub mod adapter;
pub mod arithmetic;
pub mod cmp;

/// Exponent magnitude above which a binary float is written to JSON through
/// its nearest `f64` instead of its exact decimal expansion.
const JSON_EXPONENT_LIMIT: u32 = 2500;

#[derive(Debug, Clone)]
pub enum Number {
    Int64(i64),
    Float64(f64),
    Integer(BigInt),
    Decimal(Decimal),
    BinaryFloat(BinaryFloat),
    Rational(Rational),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
    Int64,
    Float64,
    Integer,
    Decimal,
    BinaryFloat,
    Rational,
}

/// Sign of a [`Number`], with NaN as a value of its own that sorts above the
/// others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Signum {
    Negative = -1,
    Zero = 0,
    Positive = 1,
    NaN = 2,
}

impl Signum {
    fn of(sign: i32) -> Self {
        match sign {
            s if s < 0 => Signum::Negative,
            0 => Signum::Zero,
            _ => Signum::Positive,
        }
    }
}

impl Number {
    pub fn kind(&self) -> NumberKind {
        match self {
            Number::Int64(_) => NumberKind::Int64,
            Number::Float64(_) => NumberKind::Float64,
            Number::Integer(_) => NumberKind::Integer,
            Number::Decimal(_) => NumberKind::Decimal,
            Number::BinaryFloat(_) => NumberKind::BinaryFloat,
            Number::Rational(_) => NumberKind::Rational,
        }
    }

    /// An integer as [`Number::Int64`] when it fits, otherwise as
    /// [`Number::Integer`].
    pub fn from_integer(value: BigInt) -> Self {
        match i64::try_from(&value) {
            Ok(small) => Number::Int64(small),
            Err(_) => Number::Integer(value),
        }
    }

    /// The value as JSON text: infinity and NaN become `null`, binary floats
    /// with a huge exponent are written through their nearest `f64`, and a
    /// rational is written as its decimal expansion, rounded to 34 digits
    /// when it does not terminate.
    ///
    /// ```rust
    /// use numtower::Number;
    ///
    /// assert_eq!(Number::from(f64::NAN).to_json_string(), "null");
    /// assert_eq!(Number::from(2.5).to_json_string(), "2.5");
    /// assert_eq!((&Number::from(1) / &Number::from(4)).to_json_string(), "0.25");
    /// ```
    pub fn to_json_string(&self) -> String {
        match self {
            Number::Int64(value) => value.to_string(),
            Number::Integer(value) => value.to_string(),
            Number::Float64(value) => json_f64(*value),
            Number::Decimal(value) if value.is_finite() => value.to_string(),
            Number::BinaryFloat(value) if value.is_finite() => {
                if value.exponent().abs() > BigInt::from(JSON_EXPONENT_LIMIT) {
                    json_f64(value.to_f64())
                } else {
                    value.to_string()
                }
            }
            Number::Rational(value) => {
                let ctx = Context::decimal128().with_unlimited_exponents();
                let decimal = value.to_decimal_exact_if_possible(&ctx).into_value();
                if decimal.is_finite() {
                    decimal.to_string()
                } else {
                    "null".to_string()
                }
            }
            Number::Decimal(_) | Number::BinaryFloat(_) => "null".to_string(),
        }
    }
}

fn json_f64(value: f64) -> String {
    if value.is_finite() {
        BinaryFloat::from_f64(value).to_shortest_string(&Context::binary64())
    } else {
        "null".to_string()
    }
}

impl Default for Number {
    fn default() -> Self {
        Number::Int64(0)
    }
}

impl Display for Number {
    /// Integers in base ten, `f64` values in their shortest round-trip form,
    /// decimals and binary floats in scientific notation, rationals as `n/d`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int64(value) => write!(f, "{value}"),
            Number::Float64(value) => f.write_str(
                &BinaryFloat::from_f64(*value).to_shortest_string(&Context::binary64()),
            ),
            Number::Integer(value) => write!(f, "{value}"),
            Number::Decimal(value) => write!(f, "{value}"),
            Number::BinaryFloat(value) => write!(f, "{value}"),
            Number::Rational(value) => write!(f, "{value}"),
        }
    }
}

macro_rules! from_small_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Number {
                fn from(value: $t) -> Self {
                    Number::Int64(i64::from(value))
                }
            }
        )*
    };
}

from_small_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(small) => Number::Int64(small),
            Err(_) => Number::Integer(BigInt::from(value)),
        }
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float64(value)
    }
}

impl From<f32> for Number {
    fn from(value: f32) -> Self {
        Number::Float64(f64::from(value))
    }
}

impl From<BigInt> for Number {
    fn from(value: BigInt) -> Self {
        Number::Integer(value)
    }
}

impl From<BigUint> for Number {
    fn from(value: BigUint) -> Self {
        Number::Integer(BigInt::from(value))
    }
}

impl From<Decimal> for Number {
    fn from(value: Decimal) -> Self {
        Number::Decimal(value)
    }
}

impl From<BinaryFloat> for Number {
    fn from(value: BinaryFloat) -> Self {
        Number::BinaryFloat(value)
    }
}

impl From<Rational> for Number {
    fn from(value: Rational) -> Self {
        Number::Rational(value)
    }
}
