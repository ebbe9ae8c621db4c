//! # Arbitrary-Precision Floats
//!
//! [`BigFloat`] stores a value as `unsigned mantissa × RADIX^exponent` plus a
//! set of [`Flags`] for the sign and the special values. The radix is a type
//! parameter, so the same engine backs both [`BinaryFloat`] (base two) and
//! [`Decimal`] (base ten).
//!
//! Values are immutable. Operations without a context are exact; operations
//! taking a [`Context`](crate::Context) round their result and report the
//! raised [`Signals`](crate::Signals) in a [`Flagged`](crate::Flagged).
//!
//! ```rust
//! use numtower::{BinaryFloat, Context, Decimal};
//!
//! let x = BinaryFloat::from_f64(0.1);
//! let y = &x + &x;
//! assert_eq!(y.to_f64(), 0.2);
//!
//! let third = Decimal::one().div_in(&Decimal::from(3), &Context::decimal32());
//! assert_eq!(third.into_value().to_string(), "0.3333333");
//! ```

use std::fmt::{self, Debug};
use std::marker::PhantomData;

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::context::{Context, Signals};
use crate::error::{NumberError, Result};
use crate::radix::{Base2, Base10, Radix};

pub mod arithmetic;
pub mod cmp;
pub mod converter;
pub mod math;
pub mod round;
pub mod string;

bitflags::bitflags! {
    /// Sign and special-value flags of a [`BigFloat`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Flags: u8 {
        const NEGATIVE = 1;
        const INFINITY = 1 << 1;
        const QUIET_NAN = 1 << 2;
        const SIGNALING_NAN = 1 << 3;

        const NAN = Self::QUIET_NAN.bits() | Self::SIGNALING_NAN.bits();
        const SPECIAL = Self::INFINITY.bits() | Self::NAN.bits();
    }
}

#[derive(Clone)]
pub struct BigFloat<R> {
    mantissa: BigUint,
    exponent: BigInt,
    flags: Flags,
    radix: PhantomData<R>,
}

pub type BinaryFloat = BigFloat<Base2>;
pub type Decimal = BigFloat<Base10>;

impl<R: Radix> BigFloat<R> {
    pub(crate) fn from_parts(negative: bool, mantissa: BigUint, exponent: BigInt) -> Self {
        Self {
            mantissa,
            exponent,
            flags: if negative {
                Flags::NEGATIVE
            } else {
                Flags::empty()
            },
            radix: PhantomData,
        }
    }

    /// `mantissa × RADIX^exponent`; the sign is taken from `mantissa`.
    pub fn new(mantissa: BigInt, exponent: BigInt) -> Self {
        let negative = mantissa.is_negative();
        Self::from_parts(negative, mantissa.into_parts().1, exponent)
    }

    /// Builds a value from raw parts.
    ///
    /// Infinity ignores `mantissa` and `exponent`. NaN keeps `mantissa` as its
    /// diagnostic payload; a value with both NaN flags is a signaling NaN.
    pub fn with_flags(mantissa: BigUint, exponent: BigInt, flags: Flags) -> Self {
        let negative = flags & Flags::NEGATIVE;
        if flags.contains(Flags::SIGNALING_NAN) {
            Self::special(negative | Flags::SIGNALING_NAN, mantissa)
        } else if flags.contains(Flags::QUIET_NAN) {
            Self::special(negative | Flags::QUIET_NAN, mantissa)
        } else if flags.contains(Flags::INFINITY) {
            Self::special(negative | Flags::INFINITY, BigUint::zero())
        } else {
            Self::from_parts(!negative.is_empty(), mantissa, exponent)
        }
    }

    fn special(flags: Flags, payload: BigUint) -> Self {
        Self {
            mantissa: payload,
            exponent: BigInt::zero(),
            flags,
            radix: PhantomData,
        }
    }

    pub fn zero() -> Self {
        Self::from_parts(false, BigUint::zero(), BigInt::zero())
    }

    pub fn negative_zero() -> Self {
        Self::from_parts(true, BigUint::zero(), BigInt::zero())
    }

    pub fn one() -> Self {
        Self::from_parts(false, BigUint::one(), BigInt::zero())
    }

    pub fn ten() -> Self {
        Self::from(10u8)
    }

    pub fn pos_infinity() -> Self {
        Self::special(Flags::INFINITY, BigUint::zero())
    }

    pub fn neg_infinity() -> Self {
        Self::special(Flags::INFINITY | Flags::NEGATIVE, BigUint::zero())
    }

    pub fn infinity(negative: bool) -> Self {
        if negative {
            Self::neg_infinity()
        } else {
            Self::pos_infinity()
        }
    }

    pub fn nan() -> Self {
        Self::special(Flags::QUIET_NAN, BigUint::zero())
    }

    pub fn signaling_nan() -> Self {
        Self::special(Flags::SIGNALING_NAN, BigUint::zero())
    }

    /// A NaN carrying diagnostic information.
    ///
    /// With a context that has a precision, the payload keeps only its
    /// `precision` lowest digits.
    pub fn nan_with_payload(
        diagnostic: BigInt,
        signaling: bool,
        negative: bool,
        ctx: Option<&Context>,
    ) -> Result<Self> {
        if diagnostic.is_negative() {
            return Err(NumberError::NegativeDiagnostic);
        }
        let mut flags = if signaling {
            Flags::SIGNALING_NAN
        } else {
            Flags::QUIET_NAN
        };
        if negative {
            flags |= Flags::NEGATIVE;
        }
        let payload = diagnostic.into_parts().1;
        let payload = match ctx {
            Some(ctx) => truncate_payload::<R>(payload, ctx),
            None => payload,
        };
        Ok(Self::special(flags, payload))
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// Magnitude of the significand, or the diagnostic payload of a NaN.
    pub fn unsigned_mantissa(&self) -> &BigUint {
        &self.mantissa
    }

    /// Signed significand; zero for infinity and NaN.
    pub fn mantissa(&self) -> BigInt {
        if self.is_special() {
            return BigInt::zero();
        }
        let sign = if self.is_negative() {
            Sign::Minus
        } else {
            Sign::Plus
        };
        BigInt::from_biguint(sign, self.mantissa.clone())
    }

    pub fn exponent(&self) -> &BigInt {
        &self.exponent
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
        !self.is_special()
    }

    pub(crate) fn is_special(&self) -> bool {
        self.flags.intersects(Flags::SPECIAL)
    }

    pub fn is_zero(&self) -> bool {
        self.is_finite() && self.mantissa.is_zero()
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

    /// Whether the value is finite and has no fractional part.
    pub fn is_integer(&self) -> bool {
        if !self.is_finite() {
            return false;
        }
        if self.mantissa.is_zero() || !self.exponent.is_negative() {
            return true;
        }
        let fraction_digits = shift_amount(&-&self.exponent);
        R::trailing_zeros(&self.mantissa) >= fraction_digits
    }

    /// Number of digits in the significand: one for zero, zero for infinity and NaN.
    pub fn precision(&self) -> u64 {
        if self.is_special() {
            0
        } else {
            R::digit_length(&self.mantissa).max(1)
        }
    }

    /// Exponent of the most significant digit.
    pub(crate) fn adjusted_exponent(&self) -> BigInt {
        let digits = R::digit_length(&self.mantissa);
        if digits == 0 {
            self.exponent.clone()
        } else {
            &self.exponent + BigInt::from(digits - 1)
        }
    }

    /// The same NaN made quiet, with its payload fitted to `ctx`.
    pub(crate) fn to_quiet_nan(&self, ctx: &Context) -> Self {
        let flags = (self.flags & Flags::NEGATIVE) | Flags::QUIET_NAN;
        Self::special(flags, truncate_payload::<R>(self.mantissa.clone(), ctx))
    }

    /// NaN result of an operation: the first signaling NaN wins (quieted, with
    /// [`Signals::INVALID`]), then the first quiet NaN.
    pub(crate) fn propagate_nan(&self, other: Option<&Self>, ctx: &Context) -> Option<(Self, Signals)> {
        let operands = std::iter::once(self).chain(other);
        if let Some(nan) = operands.clone().find(|x| x.is_signaling_nan()) {
            return Some((nan.to_quiet_nan(ctx), Signals::INVALID));
        }
        operands
            .clone()
            .find(|x| x.is_quiet_nan())
            .map(|nan| (nan.to_quiet_nan(ctx), Signals::empty()))
    }

    pub(crate) fn invalid() -> (Self, Signals) {
        (Self::nan(), Signals::INVALID)
    }
}

impl<R: Radix> Default for BigFloat<R> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<R: Radix> Debug for BigFloat<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BigFloat")
            .field("radix", &R::RADIX)
            .field("sign", if self.is_negative() { &'-' } else { &'+' })
            .field("mantissa", &self.mantissa)
            .field("exponent", &self.exponent)
            .field("flags", &self.flags)
            .finish()
    }
}

fn truncate_payload<R: Radix>(payload: BigUint, ctx: &Context) -> BigUint {
    if !ctx.has_precision() || R::digit_length(&payload) <= ctx.precision() {
        return payload;
    }
    payload % R::power(ctx.precision())
}

/// Clamps a digit count held in a `BigInt` to `u64`; negatives become zero.
pub(crate) fn shift_amount(value: &BigInt) -> u64 {
    if value.is_negative() {
        0
    } else {
        value.to_u64().unwrap_or(u64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_constants() {
        assert!(BinaryFloat::zero().is_zero());
        assert!(!BinaryFloat::zero().is_negative());
        assert!(BinaryFloat::negative_zero().is_zero());
        assert!(BinaryFloat::negative_zero().is_negative());
        assert!(BinaryFloat::pos_infinity().is_pos_infinity());
        assert!(BinaryFloat::neg_infinity().is_neg_infinity());
        assert!(!Decimal::nan().is_finite());
        assert!(Decimal::nan().is_quiet_nan());
        assert!(Decimal::signaling_nan().is_signaling_nan());
        assert_eq!(Decimal::ten().mantissa(), BigInt::from(10));
    }

    #[rstest]
    fn test_new_takes_sign_from_mantissa() {
        let x = Decimal::new(BigInt::from(-125), BigInt::from(-2));
        assert!(x.is_negative());
        assert_eq!(x.unsigned_mantissa(), &BigUint::from(125u8));
        assert_eq!(x.mantissa(), BigInt::from(-125));
        assert_eq!(x.signum(), -1);
        assert_eq!(x.adjusted_exponent(), BigInt::from(0));
    }

    #[rstest]
    fn test_with_flags() {
        let inf = BinaryFloat::with_flags(
            BigUint::from(9u8),
            BigInt::from(3),
            Flags::INFINITY | Flags::NEGATIVE,
        );
        assert!(inf.is_neg_infinity());
        assert!(inf.unsigned_mantissa().is_zero());

        let nan = BinaryFloat::with_flags(BigUint::from(9u8), BigInt::from(3), Flags::NAN);
        assert!(nan.is_signaling_nan());
        assert_eq!(nan.unsigned_mantissa(), &BigUint::from(9u8));
        assert!(nan.exponent().is_zero());
    }

    #[rstest]
    fn test_nan_with_payload() {
        let nan = Decimal::nan_with_payload(BigInt::from(123_456), true, true, None).unwrap();
        assert!(nan.is_signaling_nan());
        assert!(nan.is_negative());
        assert_eq!(nan.unsigned_mantissa(), &BigUint::from(123_456u32));

        let ctx = Context::for_precision(3);
        let nan = Decimal::nan_with_payload(BigInt::from(123_456), false, false, Some(&ctx)).unwrap();
        assert_eq!(nan.unsigned_mantissa(), &BigUint::from(456u32));

        assert_eq!(
            Decimal::nan_with_payload(BigInt::from(-1), false, false, None).unwrap_err(),
            NumberError::NegativeDiagnostic
        );
    }

    #[rstest]
    fn test_is_integer() {
        assert!(Decimal::new(BigInt::from(1200), BigInt::from(-2)).is_integer());
        assert!(!Decimal::new(BigInt::from(1201), BigInt::from(-2)).is_integer());
        assert!(BinaryFloat::new(BigInt::from(3), BigInt::from(5)).is_integer());
        assert!(!BinaryFloat::new(BigInt::from(3), BigInt::from(-1)).is_integer());
        assert!(BinaryFloat::negative_zero().is_integer());
        assert!(!BinaryFloat::pos_infinity().is_integer());
    }

    #[rstest]
    fn test_precision() {
        assert_eq!(Decimal::zero().precision(), 1);
        assert_eq!(Decimal::from(12_345).precision(), 5);
        assert_eq!(BinaryFloat::from(8).precision(), 4);
        assert_eq!(BinaryFloat::nan().precision(), 0);
    }

    #[rstest]
    fn test_propagate_nan() {
        let ctx = Context::unlimited();
        let one = Decimal::one();
        let quiet = Decimal::nan_with_payload(BigInt::from(1), false, false, None).unwrap();
        let signaling = Decimal::nan_with_payload(BigInt::from(2), true, true, None).unwrap();

        assert!(one.propagate_nan(Some(&one), &ctx).is_none());

        let (nan, signals) = quiet.propagate_nan(Some(&signaling), &ctx).unwrap();
        assert!(nan.is_quiet_nan());
        assert!(nan.is_negative());
        assert_eq!(nan.unsigned_mantissa(), &BigUint::from(2u8));
        assert_eq!(signals, Signals::INVALID);

        let (nan, signals) = one.propagate_nan(Some(&quiet), &ctx).unwrap();
        assert_eq!(nan.unsigned_mantissa(), &BigUint::from(1u8));
        assert!(signals.is_empty());
    }
}
