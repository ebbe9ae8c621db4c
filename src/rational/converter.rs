//! Conversions between [`Rational`] and the float and integer types.

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{Signed, Zero};

use crate::bigfloat::{BigFloat, BinaryFloat, Decimal, shift_amount};
use crate::context::{Context, Flagged, Signals};
use crate::error::{NumberError, Result};
use crate::radix::Radix;
use crate::rational::Rational;

/// Digits kept when a non-terminating fraction is converted without a context.
const DEFAULT_DECIMAL_DIGITS: u64 = 34;
const DEFAULT_BINARY_BITS: u64 = 113;

impl Rational {
    /// The exact value of a decimal or binary float. Special values keep
    /// their sign and NaN payload.
    pub fn from_float<R: Radix>(value: &BigFloat<R>) -> Self {
        if value.is_nan() {
            return Self::special(value.flags(), value.unsigned_mantissa().clone());
        }
        if value.is_infinity() {
            return Self::infinity(value.is_negative());
        }
        let mantissa = BigInt::from(value.unsigned_mantissa().clone());
        let exponent = value.exponent();
        let magnitude = if exponent.is_negative() {
            let denominator = R::power(shift_amount(&-exponent));
            BigRational::new(mantissa, BigInt::from(denominator))
        } else {
            let scaled = R::scale_up(value.unsigned_mantissa(), shift_amount(exponent));
            BigRational::from_integer(BigInt::from(scaled))
        };
        Self::from_magnitude(value.is_negative(), magnitude)
    }

    pub fn from_decimal(value: &Decimal) -> Self {
        Self::from_float(value)
    }

    pub fn from_binary(value: &BinaryFloat) -> Self {
        Self::from_float(value)
    }

    fn to_float_raw<R: Radix>(&self, ctx: &Context) -> (BigFloat<R>, Signals) {
        if self.is_nan() {
            let payload = self.magnitude.numer().magnitude().clone();
            return (BigFloat::with_flags(payload, BigInt::zero(), self.flags), Signals::empty());
        }
        if self.is_infinity() {
            return (BigFloat::infinity(self.is_negative()), Signals::empty());
        }
        let numerator = BigFloat::<R>::from_parts(
            self.is_negative(),
            self.magnitude.numer().magnitude().clone(),
            BigInt::zero(),
        );
        let denominator = BigFloat::<R>::from_parts(
            false,
            self.magnitude.denom().magnitude().clone(),
            BigInt::zero(),
        );
        numerator.div_raw(&denominator, ctx)
    }

    /// The exact value when it terminates in radix `R`, otherwise the value
    /// rounded to `ctx`.
    fn to_float_exact_if_possible<R: Radix>(&self, ctx: &Context) -> (BigFloat<R>, Signals) {
        let (exact, signals) = self.to_float_raw::<R>(&Context::unlimited());
        if !signals.contains(Signals::INVALID) {
            return (exact, signals);
        }
        self.to_float_raw(ctx)
    }

    /// `numerator / denominator` rounded to `ctx`. Without a precision the
    /// quotient must terminate, otherwise the result is NaN with
    /// [`Signals::INVALID`].
    pub fn to_decimal_in(&self, ctx: &Context) -> Flagged<Decimal> {
        let (value, signals) = self.to_float_raw(ctx);
        ctx.outcome(value, signals)
    }

    /// The exact decimal value if it terminates, otherwise the value rounded to `ctx`.
    ///
    /// ```rust
    /// use numtower::{Context, Rational};
    ///
    /// let ctx = Context::for_precision(5);
    /// let quarter: Rational = "1/4".parse().unwrap();
    /// let third: Rational = "1/3".parse().unwrap();
    /// assert_eq!(quarter.to_decimal_exact_if_possible(&ctx).into_value().to_string(), "0.25");
    /// assert_eq!(third.to_decimal_exact_if_possible(&ctx).into_value().to_string(), "0.33333");
    /// ```
    pub fn to_decimal_exact_if_possible(&self, ctx: &Context) -> Flagged<Decimal> {
        let (value, signals) = self.to_float_exact_if_possible(ctx);
        ctx.outcome(value, signals)
    }

    /// Exact when the expansion terminates, otherwise rounded half to even
    /// to 34 digits.
    pub fn to_decimal(&self) -> Decimal {
        self.to_float_exact_if_possible(&Context::for_precision(DEFAULT_DECIMAL_DIGITS))
            .0
    }

    pub fn to_binary_float_in(&self, ctx: &Context) -> Flagged<BinaryFloat> {
        let (value, signals) = self.to_float_raw(ctx);
        ctx.outcome(value, signals)
    }

    pub fn to_binary_float_exact_if_possible(&self, ctx: &Context) -> Flagged<BinaryFloat> {
        let (value, signals) = self.to_float_exact_if_possible(ctx);
        ctx.outcome(value, signals)
    }

    /// Exact when the expansion terminates, otherwise rounded half to even
    /// to at least 113 bits.
    pub fn to_binary_float(&self) -> BinaryFloat {
        let bits = self.magnitude.numer().bits() + self.magnitude.denom().bits();
        let ctx = Context::for_precision(bits.max(DEFAULT_BINARY_BITS));
        self.to_float_exact_if_possible(&ctx).0
    }

    /// The closest `f64`.
    pub fn to_f64(&self) -> f64 {
        self.to_float_raw::<crate::radix::Base2>(&Context::binary64())
            .0
            .to_f64()
    }

    /// The integer part, truncated toward zero.
    pub fn to_integer(&self) -> Result<BigInt> {
        if !self.is_finite() {
            return Err(NumberError::NotFinite);
        }
        let (quotient, _) = self.magnitude.numer().div_rem(self.magnitude.denom());
        Ok(if self.is_negative() { -quotient } else { quotient })
    }

    pub fn to_integer_if_exact(&self) -> Result<BigInt> {
        if self.is_finite() && !self.is_integer() {
            return Err(NumberError::NotExact);
        }
        self.to_integer()
    }
}

impl From<BigInt> for Rational {
    fn from(value: BigInt) -> Self {
        Self::from_integer(value)
    }
}

impl From<&BigInt> for Rational {
    fn from(value: &BigInt) -> Self {
        Self::from_integer(value.clone())
    }
}

impl From<BigUint> for Rational {
    fn from(value: BigUint) -> Self {
        Self::from_integer(BigInt::from(value))
    }
}

impl From<i64> for Rational {
    fn from(value: i64) -> Self {
        Self::from_integer(BigInt::from(value))
    }
}

impl<R: Radix> From<&BigFloat<R>> for Rational {
    fn from(value: &BigFloat<R>) -> Self {
        Self::from_float(value)
    }
}
