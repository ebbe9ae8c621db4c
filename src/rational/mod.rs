//! # Rational
//!
//! Arbitrary-precision fractions with the same special values as
//! [`BigFloat`](crate::bigfloat::BigFloat): signed zero, infinities and NaNs
//! carrying a diagnostic payload. Finite values are always kept in lowest
//! terms with a positive denominator; the sign lives in the flags.

use std::fmt::{self, Debug, Display};
use std::str::FromStr;

use num_bigint::{BigInt, BigUint, Sign};
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::bigfloat::{Decimal, Flags};
use crate::error::{NumberError, Result};

pub mod arithmetic;
pub mod cmp;
pub mod converter;

#[derive(Clone)]
pub struct Rational {
    magnitude: BigRational,
    flags: Flags,
}

impl Rational {
    fn from_magnitude(negative: bool, magnitude: BigRational) -> Self {
        Self {
            magnitude,
            flags: if negative {
                Flags::NEGATIVE
            } else {
                Flags::empty()
            },
        }
    }

    /// A signed exact value; zero keeps `negative_zero` as its sign.
    pub(crate) fn from_signed(value: BigRational, negative_zero: bool) -> Self {
        let negative = if value.is_zero() {
            negative_zero
        } else {
            value.is_negative()
        };
        Self::from_magnitude(negative, value.abs())
    }

    pub(crate) fn special(flags: Flags, payload: BigUint) -> Self {
        Self {
            magnitude: BigRational::from_integer(BigInt::from(payload)),
            flags,
        }
    }

    /// `numerator / denominator` in lowest terms.
    ///
    /// ```rust
    /// use numtower::Rational;
    /// use num_bigint::BigInt;
    ///
    /// let half = Rational::new(BigInt::from(-4), BigInt::from(-8)).unwrap();
    /// assert_eq!(half.to_string(), "1/2");
    /// assert!(Rational::new(BigInt::from(1), BigInt::from(0)).is_err());
    /// ```
    pub fn new(numerator: BigInt, denominator: BigInt) -> Result<Self> {
        if denominator.is_zero() {
            return Err(NumberError::ZeroDenominator);
        }
        Ok(Self::from_signed(BigRational::new(numerator, denominator), false))
    }

    pub fn from_integer(value: BigInt) -> Self {
        Self::from_signed(BigRational::from_integer(value), false)
    }

    pub fn zero() -> Self {
        Self::from_magnitude(false, BigRational::zero())
    }

    pub fn negative_zero() -> Self {
        Self::from_magnitude(true, BigRational::zero())
    }

    pub fn one() -> Self {
        Self::from_magnitude(false, BigRational::one())
    }

    pub fn infinity(negative: bool) -> Self {
        let sign = if negative {
            Flags::NEGATIVE
        } else {
            Flags::empty()
        };
        Self::special(sign | Flags::INFINITY, BigUint::zero())
    }

    pub fn pos_infinity() -> Self {
        Self::infinity(false)
    }

    pub fn neg_infinity() -> Self {
        Self::infinity(true)
    }

    pub fn nan() -> Self {
        Self::special(Flags::QUIET_NAN, BigUint::zero())
    }

    pub fn signaling_nan() -> Self {
        Self::special(Flags::SIGNALING_NAN, BigUint::zero())
    }

    /// A NaN carrying `diagnostic`, which must not be negative.
    pub fn nan_with_payload(diagnostic: BigInt, signaling: bool, negative: bool) -> Result<Self> {
        let payload = match diagnostic.into_parts() {
            (Sign::Minus, _) => return Err(NumberError::NegativeDiagnostic),
            (_, payload) => payload,
        };
        let mut flags = if signaling {
            Flags::SIGNALING_NAN
        } else {
            Flags::QUIET_NAN
        };
        if negative {
            flags |= Flags::NEGATIVE;
        }
        Ok(Self::special(flags, payload))
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// The signed numerator. For a NaN this is the diagnostic payload.
    pub fn numerator(&self) -> BigInt {
        if self.is_negative() {
            -self.magnitude.numer()
        } else {
            self.magnitude.numer().clone()
        }
    }

    pub fn unsigned_numerator(&self) -> &BigInt {
        self.magnitude.numer()
    }

    pub fn denominator(&self) -> &BigInt {
        self.magnitude.denom()
    }

    pub fn is_negative(&self) -> bool {
        self.flags.contains(Flags::NEGATIVE)
    }

    pub fn is_nan(&self) -> bool {
        self.flags.intersects(Flags::NAN)
    }

    pub fn is_quiet_nan(&self) -> bool {
        self.flags.contains(Flags::QUIET_NAN)
    }

    pub fn is_signaling_nan(&self) -> bool {
        self.flags.contains(Flags::SIGNALING_NAN)
    }

    pub fn is_infinity(&self) -> bool {
        self.flags.contains(Flags::INFINITY)
    }

    pub fn is_pos_infinity(&self) -> bool {
        self.is_infinity() && !self.is_negative()
    }

    pub fn is_neg_infinity(&self) -> bool {
        self.is_infinity() && self.is_negative()
    }

    pub fn is_finite(&self) -> bool {
        !self.flags.intersects(Flags::SPECIAL)
    }

    pub fn is_zero(&self) -> bool {
        self.is_finite() && self.magnitude.is_zero()
    }

    pub fn is_integer(&self) -> bool {
        self.is_finite() && self.magnitude.is_integer()
    }

    /// `-1`, `0` or `1`; NaN reports `0`.
    pub fn signum(&self) -> i32 {
        if self.is_nan() || self.is_zero() {
            0
        } else if self.is_negative() {
            -1
        } else {
            1
        }
    }

    fn with_sign(mut self, negative: bool) -> Self {
        self.flags.set(Flags::NEGATIVE, negative);
        self
    }

    /// The value as a signed fraction. Only meaningful for finite values.
    pub(crate) fn signed(&self) -> BigRational {
        if self.is_negative() {
            -&self.magnitude
        } else {
            self.magnitude.clone()
        }
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::zero()
    }
}

impl Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rational")
            .field("sign", if self.is_negative() { &'-' } else { &'+' })
            .field("numerator", self.magnitude.numer())
            .field("denominator", self.magnitude.denom())
            .field("flags", &self.flags)
            .finish()
    }
}

impl Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negative() {
            f.write_str("-")?;
        }
        if self.is_infinity() {
            return f.write_str("Infinity");
        }
        if self.is_nan() {
            f.write_str(if self.is_signaling_nan() { "sNaN" } else { "NaN" })?;
            if !self.magnitude.is_zero() {
                write!(f, "{}", self.magnitude.numer())?;
            }
            return Ok(());
        }
        write!(f, "{}/{}", self.magnitude.numer(), self.magnitude.denom())
    }
}

impl FromStr for Rational {
    type Err = NumberError;

    /// Parses `n/d`, a bare integer `n`, or one of the special values
    /// accepted by [`Decimal`], each with an optional sign.
    fn from_str(text: &str) -> Result<Self> {
        let error = || NumberError::Parse(text.to_string());
        let (negative, body) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
        let (numerator, denominator) = match body.split_once('/') {
            Some((numerator, denominator)) => (numerator, denominator),
            None if digits(body) => (body, "1"),
            None => {
                let special: Decimal = text.parse()?;
                if special.is_finite() {
                    return Err(error());
                }
                return Ok(Self::from_decimal(&special));
            }
        };
        if !digits(numerator) || !digits(denominator) {
            return Err(error());
        }
        let numerator: BigInt = numerator.parse().map_err(|_| error())?;
        let denominator: BigInt = denominator.parse().map_err(|_| error())?;
        if denominator.is_zero() {
            return Err(NumberError::ZeroDenominator);
        }
        Ok(Self::from_signed(BigRational::new(numerator, denominator), false).with_sign(negative))
    }
}
