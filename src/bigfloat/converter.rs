//! # Conversion Utilities
//!
//! Conversions between [`BigFloat`] and machine numbers, arbitrary-precision
//! integers, and between the binary and decimal radices.
//!
//! ## IEEE 754 Layout
//!
//! `f64` and `f32` are decomposed bit by bit, never through text:
//! ```text
//! f64: [Sign: 1 bit][Exponent: 11 bits][Fraction: 52 bits]
//! f32: [Sign: 1 bit][Exponent:  8 bits][Fraction: 23 bits]
//! ```
//! Subnormals have no implicit leading bit. For NaN the top fraction bit is
//! the quiet bit and the remaining fraction bits carry the diagnostic payload.
//!
//! ## Examples
//!
//! ```rust
//! use numtower::{BinaryFloat, Decimal};
//!
//! let x = BinaryFloat::from_f64(0.1);
//! assert_eq!(x.to_f64(), 0.1);
//!
//! // every binary float has an exact decimal expansion
//! let exact = Decimal::from_binary(&BinaryFloat::from_f64(0.5));
//! assert_eq!(exact.to_string(), "0.5");
//!
//! // the reverse generally needs rounding
//! let tenth: Decimal = "0.1".parse().unwrap();
//! assert_eq!(tenth.to_f64(), 0.1);
//! ```

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{Signed, ToPrimitive, Zero};

use crate::bigfloat::round::round_finite;
use crate::bigfloat::{BigFloat, BinaryFloat, Decimal, Flags, shift_amount};
use crate::context::{Context, Flagged, Signals};
use crate::error::{NumberError, Result};
use crate::radix::{Base2, Base10, Radix, ShiftAccumulator};

/// Field widths of an IEEE 754 binary interchange format.
struct Layout {
    fraction_bits: u32,
    exponent_bits: u32,
}

const BINARY64: Layout = Layout {
    fraction_bits: 52,
    exponent_bits: 11,
};

const BINARY32: Layout = Layout {
    fraction_bits: 23,
    exponent_bits: 8,
};

impl Layout {
    fn max_biased(&self) -> u64 {
        (1 << self.exponent_bits) - 1
    }

    /// Difference between the biased exponent field and the exponent of the
    /// integer significand: 1075 for `f64`, 150 for `f32`.
    fn bias(&self) -> i64 {
        (1i64 << (self.exponent_bits - 1)) - 1 + i64::from(self.fraction_bits)
    }

    fn etiny(&self) -> i64 {
        1 - self.bias()
    }

    fn quiet_bit(&self) -> u64 {
        1 << (self.fraction_bits - 1)
    }
}

fn signed(negative: bool, magnitude: BigUint) -> BigInt {
    let sign = if negative { Sign::Minus } else { Sign::Plus };
    BigInt::from_biguint(sign, magnitude)
}

impl<R: Radix> BigFloat<R> {
    /// Converts to an integer by discarding the fractional part.
    ///
    /// # Errors
    ///
    /// [`NumberError::NotFinite`] for infinity and NaN.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use num_bigint::BigInt;
    /// use numtower::Decimal;
    ///
    /// let x: Decimal = "-12.75".parse().unwrap();
    /// assert_eq!(x.to_integer().unwrap(), BigInt::from(-12));
    /// ```
    pub fn to_integer(&self) -> Result<BigInt> {
        if !self.is_finite() {
            return Err(NumberError::NotFinite);
        }
        let magnitude = if self.exponent.is_negative() {
            let mut acc = R::Accumulator::new(self.mantissa.clone());
            acc.shift_right(shift_amount(&-&self.exponent));
            acc.shifted()
        } else {
            R::scale_up(&self.mantissa, shift_amount(&self.exponent))
        };
        Ok(signed(self.is_negative(), magnitude))
    }

    /// Converts to an integer only when there is no fractional part.
    ///
    /// # Errors
    ///
    /// [`NumberError::NotFinite`] for infinity and NaN, and
    /// [`NumberError::NotExact`] when a nonzero digit would be discarded.
    pub fn to_integer_if_exact(&self) -> Result<BigInt> {
        if !self.is_finite() {
            return Err(NumberError::NotFinite);
        }
        if self.exponent.is_negative() && !self.mantissa.is_zero() {
            // an odd significand cannot lose a negative power of an even radix
            if self.mantissa.bit(0) && R::RADIX % 2 == 0 {
                return Err(NumberError::NotExact);
            }
            if R::trailing_zeros(&self.mantissa) < shift_amount(&-&self.exponent) {
                return Err(NumberError::NotExact);
            }
        }
        self.to_integer()
    }

    /// Whether the value is too large for any 64-bit integer even before
    /// truncation, without materializing it.
    fn exceeds_word(&self) -> bool {
        !self.mantissa.is_zero() && self.adjusted_exponent() > BigInt::from(64)
    }

    /// Converts to `i64`, discarding the fractional part.
    ///
    /// # Errors
    ///
    /// [`NumberError::NotFinite`] for infinity and NaN, and
    /// [`NumberError::Overflow`] when the truncated value does not fit.
    pub fn to_i64_checked(&self) -> Result<i64> {
        if self.is_finite() && self.exceeds_word() {
            return Err(NumberError::Overflow);
        }
        self.to_integer()?.to_i64().ok_or(NumberError::Overflow)
    }

    /// Converts to `i64` only when the value is an integer that fits.
    pub fn to_i64_if_exact(&self) -> Result<i64> {
        if self.is_finite() && self.exceeds_word() {
            return Err(NumberError::Overflow);
        }
        self.to_integer_if_exact()?
            .to_i64()
            .ok_or(NumberError::Overflow)
    }

    pub fn to_i32_checked(&self) -> Result<i32> {
        let value = self.to_i64_checked()?;
        i32::try_from(value).map_err(|_| NumberError::Overflow)
    }

    pub fn to_i32_if_exact(&self) -> Result<i32> {
        let value = self.to_i64_if_exact()?;
        i32::try_from(value).map_err(|_| NumberError::Overflow)
    }

    /// Whether the value, with its fractional part discarded, fits in an `i64`.
    pub fn can_fit_in_i64(&self) -> bool {
        self.to_i64_checked().is_ok()
    }

    /// Whether the value, with its fractional part discarded, fits in an `i32`.
    pub fn can_fit_in_i32(&self) -> bool {
        self.to_i32_checked().is_ok()
    }
}

macro_rules! from_primitive {
    ($($t:ty),*) => {
        $(
            impl<R: Radix> From<$t> for BigFloat<R> {
                fn from(value: $t) -> Self {
                    Self::new(BigInt::from(value), BigInt::zero())
                }
            }
        )*
    };
}

from_primitive!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128);

impl<R: Radix> From<BigInt> for BigFloat<R> {
    fn from(value: BigInt) -> Self {
        Self::new(value, BigInt::zero())
    }
}

impl<R: Radix> From<&BigInt> for BigFloat<R> {
    fn from(value: &BigInt) -> Self {
        Self::new(value.clone(), BigInt::zero())
    }
}

impl<R: Radix> From<BigUint> for BigFloat<R> {
    fn from(value: BigUint) -> Self {
        Self::from_parts(false, value, BigInt::zero())
    }
}

impl BigFloat<Base2> {
    fn from_ieee_bits(bits: u64, layout: &Layout) -> Self {
        let negative = (bits >> (layout.fraction_bits + layout.exponent_bits)) & 1 == 1;
        let biased = (bits >> layout.fraction_bits) & layout.max_biased();
        let fraction = bits & ((1 << layout.fraction_bits) - 1);

        if biased == layout.max_biased() {
            if fraction == 0 {
                return Self::infinity(negative);
            }
            let quiet = fraction & layout.quiet_bit() != 0;
            let payload = fraction & (layout.quiet_bit() - 1);
            let mut flags = if quiet {
                Flags::QUIET_NAN
            } else {
                Flags::SIGNALING_NAN
            };
            if negative {
                flags |= Flags::NEGATIVE;
            }
            return Self::special(flags, BigUint::from(payload));
        }

        let (mantissa, exponent) = if biased == 0 {
            (fraction, layout.etiny())
        } else {
            (fraction | (1 << layout.fraction_bits), biased as i64 - layout.bias())
        };
        if mantissa == 0 {
            return Self::from_parts(negative, BigUint::zero(), BigInt::zero());
        }
        let zeros = mantissa.trailing_zeros();
        Self::from_parts(
            negative,
            BigUint::from(mantissa >> zeros),
            BigInt::from(exponent + i64::from(zeros)),
        )
    }

    fn to_ieee_bits(&self, layout: &Layout, ctx: &Context) -> u64 {
        let sign = u64::from(self.is_negative()) << (layout.fraction_bits + layout.exponent_bits);
        let special = layout.max_biased() << layout.fraction_bits;
        if self.is_infinity() {
            return sign | special;
        }
        if self.is_nan() {
            let mut bits = sign | special;
            let payload_mask = layout.quiet_bit() - 1;
            let payload = (&self.mantissa & BigUint::from(payload_mask))
                .to_u64()
                .unwrap_or(0);
            bits |= payload;
            if self.is_quiet_nan() {
                bits |= layout.quiet_bit();
            } else if payload == 0 {
                // keep the fraction nonzero so the value stays a NaN
                bits |= layout.quiet_bit() >> 1;
            }
            return bits;
        }

        let (rounded, _) = self.round_raw(ctx);
        if rounded.is_infinity() {
            return sign | special;
        }
        let Some(mut mantissa) = rounded.mantissa.to_u64() else {
            return sign | special;
        };
        if mantissa == 0 {
            return sign;
        }
        let Some(mut exponent) = rounded.exponent.to_i64() else {
            return sign | special;
        };
        let precision = layout.fraction_bits + 1;
        let length = 64 - mantissa.leading_zeros();
        let mut subnormal = false;
        if length < precision {
            let mut diff = i64::from(precision - length);
            exponent -= diff;
            if exponent < layout.etiny() {
                diff -= layout.etiny() - exponent;
                exponent = layout.etiny();
                subnormal = true;
            }
            mantissa <<= diff;
        }
        let fraction = mantissa & ((1 << layout.fraction_bits) - 1);
        if subnormal {
            sign | fraction
        } else {
            let biased = (exponent + layout.bias()) as u64;
            sign | (biased << layout.fraction_bits) | fraction
        }
    }

    /// Creates a binary float holding exactly the value of an `f64`.
    ///
    /// Finite values have trailing zero bits removed from the significand.
    /// NaN keeps its sign, quiet/signaling kind and payload.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use num_bigint::BigInt;
    /// use numtower::BinaryFloat;
    ///
    /// let x = BinaryFloat::from_f64(-0.75);
    /// assert_eq!(x.mantissa(), BigInt::from(-3));
    /// assert_eq!(x.exponent(), &BigInt::from(-2));
    ///
    /// let tiny = BinaryFloat::from_f64(f64::from_bits(1));
    /// assert_eq!(tiny.exponent(), &BigInt::from(-1074));
    /// ```
    pub fn from_f64(value: f64) -> Self {
        Self::from_ieee_bits(value.to_bits(), &BINARY64)
    }

    /// Creates a binary float holding exactly the value of an `f32`.
    pub fn from_f32(value: f32) -> Self {
        Self::from_ieee_bits(u64::from(value.to_bits()), &BINARY32)
    }

    /// Converts to the closest `f64`, rounding half to even.
    ///
    /// Values beyond the `f64` range become infinities and values below
    /// half the smallest subnormal become zeros. NaN keeps its sign, its
    /// quiet/signaling kind and the low 51 bits of its payload.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use num_bigint::BigInt;
    /// use numtower::BinaryFloat;
    ///
    /// // 2^53 + 1 is a tie between 2^53 and 2^53 + 2
    /// let x = BinaryFloat::from((1u64 << 53) + 1);
    /// assert_eq!(x.to_f64(), 9007199254740992.0);
    ///
    /// let huge = BinaryFloat::new(BigInt::from(1), BigInt::from(5000));
    /// assert_eq!(huge.to_f64(), f64::INFINITY);
    /// ```
    pub fn to_f64(&self) -> f64 {
        f64::from_bits(self.to_ieee_bits(&BINARY64, &Context::binary64()))
    }

    /// Converts to the closest `f32`, rounding half to even.
    pub fn to_f32(&self) -> f32 {
        let bits = self.to_ieee_bits(&BINARY32, &Context::binary32());
        f32::from_bits(bits as u32)
    }

    /// The exact decimal value of this binary float.
    pub fn to_decimal(&self) -> Decimal {
        Decimal::from_binary(self)
    }
}

impl From<f64> for BinaryFloat {
    fn from(value: f64) -> Self {
        Self::from_f64(value)
    }
}

impl From<f32> for BinaryFloat {
    fn from(value: f32) -> Self {
        Self::from_f32(value)
    }
}

impl From<&BinaryFloat> for Decimal {
    fn from(value: &BinaryFloat) -> Self {
        Decimal::from_binary(value)
    }
}

impl Decimal {
    /// The exact decimal value of a binary float: `m × 2^-k = m·5^k × 10^-k`.
    pub fn from_binary(value: &BinaryFloat) -> Self {
        if value.is_nan() {
            return Self::special(value.flags, value.mantissa.clone());
        }
        if value.is_infinity() {
            return Self::infinity(value.is_negative());
        }
        let negative = value.is_negative();
        if value.exponent.is_negative() {
            let k = shift_amount(&-&value.exponent);
            let mantissa = &value.mantissa * num_traits::pow(BigUint::from(5u8), k as usize);
            Self::from_parts(negative, mantissa, value.exponent.clone())
        } else {
            let mantissa = &value.mantissa << shift_amount(&value.exponent);
            Self::from_parts(negative, mantissa, BigInt::zero())
        }
    }

    /// The exact decimal value of an `f64`.
    pub fn from_f64(value: f64) -> Self {
        Self::from_binary(&BinaryFloat::from_f64(value))
    }

    pub(crate) fn to_binary_raw(&self, ctx: &Context) -> (BinaryFloat, Signals) {
        if self.is_nan() {
            return (BinaryFloat::special(self.flags, self.mantissa.clone()), Signals::empty());
        }
        if self.is_infinity() {
            return (BinaryFloat::infinity(self.is_negative()), Signals::empty());
        }
        let negative = self.is_negative();
        if self.exponent.is_negative() {
            let numerator = BinaryFloat::from_parts(negative, self.mantissa.clone(), BigInt::zero());
            let denominator = BinaryFloat::from(Base10::power(shift_amount(&-&self.exponent)));
            numerator.div_raw(&denominator, ctx)
        } else {
            let mantissa = Base10::scale_up(&self.mantissa, shift_amount(&self.exponent));
            round_finite(negative, mantissa, BigInt::zero(), false, ctx)
        }
    }

    /// Converts to a binary float rounded to `ctx` with a single rounding.
    ///
    /// With an unlimited context the conversion must be exact; a decimal
    /// such as `0.1` then yields NaN with [`Signals::INVALID`].
    pub fn to_binary_float_in(&self, ctx: &Context) -> Flagged<BinaryFloat> {
        let (value, signals) = self.to_binary_raw(ctx);
        ctx.outcome(value, signals)
    }

    /// Converts to a binary float, exactly when the value has a terminating
    /// binary expansion and otherwise rounded half to even to at least 113
    /// bits (64 bits more than the decimal significand).
    pub fn to_binary_float(&self) -> BinaryFloat {
        let (exact, signals) = self.to_binary_raw(&Context::unlimited());
        if !signals.contains(Signals::INVALID) {
            return exact;
        }
        let bits = (self.mantissa.bits() + 64).max(113);
        self.to_binary_raw(&Context::for_precision(bits)).0
    }

    /// Converts to the closest `f64`.
    pub fn to_f64(&self) -> f64 {
        self.to_binary_raw(&Context::binary64()).0.to_f64()
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;
    use rand::Rng;
    use rstest::rstest;

    use super::*;
    use crate::tests::*;

    #[rstest]
    fn test_to_integer() {
        let x: Decimal = "-12.75".parse().unwrap();
        assert_eq!(x.to_integer().unwrap(), BigInt::from(-12));
        assert_eq!(x.to_integer_if_exact().unwrap_err(), NumberError::NotExact);

        let x: Decimal = "1.2E+3".parse().unwrap();
        assert_eq!(x.to_integer_if_exact().unwrap(), BigInt::from(1200));

        let x = BinaryFloat::new(BigInt::from(12), BigInt::from(-2));
        assert_eq!(x.to_integer_if_exact().unwrap(), BigInt::from(3));
        let x = BinaryFloat::new(BigInt::from(13), BigInt::from(-2));
        assert_eq!(x.to_integer_if_exact().unwrap_err(), NumberError::NotExact);

        assert_eq!(
            Decimal::pos_infinity().to_integer().unwrap_err(),
            NumberError::NotFinite
        );
        assert_eq!(Decimal::nan().to_integer_if_exact().unwrap_err(), NumberError::NotFinite);
    }

    #[rstest]
    fn test_machine_integers() {
        let max = BinaryFloat::from(i64::MAX);
        assert_eq!(max.to_i64_checked(), Ok(i64::MAX));
        assert!(max.can_fit_in_i64());
        assert!(!max.can_fit_in_i32());
        assert_eq!(max.to_i32_checked(), Err(NumberError::Overflow));

        let above = BinaryFloat::new(BigInt::from(1), BigInt::from(63));
        assert!(!above.can_fit_in_i64());
        assert!(BinaryFloat::new(BigInt::from(-1), BigInt::from(63)).can_fit_in_i64());

        let huge = Decimal::new(BigInt::from(1), BigInt::from(1_000_000_000));
        assert_eq!(huge.to_i64_checked(), Err(NumberError::Overflow));
        assert!(!Decimal::nan().can_fit_in_i64());

        let half: Decimal = "-0.5".parse().unwrap();
        assert_eq!(half.to_i32_checked(), Ok(0));
        assert_eq!(half.to_i32_if_exact(), Err(NumberError::NotExact));
    }

    #[rstest]
    fn test_f64_round_trip(mut rng: impl Rng, n_experiments: usize) {
        for _ in 0..n_experiments {
            let value = f64::from_bits(rng.random());
            let converted = BinaryFloat::from_f64(value).to_f64();
            assert_eq!(converted.to_bits(), value.to_bits(), "{value:e}");
        }
    }

    #[rstest]
    fn test_f32_round_trip(mut rng: impl Rng, n_experiments: usize) {
        for _ in 0..n_experiments {
            let value = f32::from_bits(rng.random());
            let converted = BinaryFloat::from_f32(value).to_f32();
            assert_eq!(converted.to_bits(), value.to_bits(), "{value:e}");
            if !value.is_nan() {
                assert_eq!(
                    BinaryFloat::from_f32(value).to_f64().to_bits(),
                    f64::from(value).to_bits(),
                    "{value:e}"
                );
            }
        }
    }

    #[rstest]
    fn test_to_f32_rounds(mut rng: impl Rng, n_experiments: usize) {
        for _ in 0..n_experiments {
            let value = random_f64(&mut rng);
            let expected = value as f32;
            assert_eq!(BinaryFloat::from_f64(value).to_f32().to_bits(), expected.to_bits(), "{value:e}");
        }
    }

    #[rstest]
    fn test_nan_payloads() {
        let nan = BinaryFloat::from_f64(f64::from_bits(0x7ff8_0000_0000_002a));
        assert!(nan.is_quiet_nan());
        assert_eq!(nan.unsigned_mantissa(), &BigUint::from(42u8));

        let signaling = BinaryFloat::from_f64(f64::from_bits(0xfff0_0000_0000_0007));
        assert!(signaling.is_signaling_nan());
        assert!(signaling.is_negative());
        assert_eq!(signaling.to_f64().to_bits(), 0xfff0_0000_0000_0007);

        let bare = BinaryFloat::signaling_nan().to_f64().to_bits();
        assert_eq!(bare, 0x7ff4_0000_0000_0000);
        let bare = BinaryFloat::signaling_nan().to_f32().to_bits();
        assert_eq!(bare, 0x7fa0_0000);
        assert_eq!(BinaryFloat::nan().to_f64().to_bits(), f64::NAN.to_bits());
    }

    #[rstest]
    fn test_subnormals() {
        let smallest = BinaryFloat::from_f64(f64::from_bits(1));
        assert_eq!(smallest.unsigned_mantissa(), &BigUint::from(1u8));
        assert_eq!(smallest.exponent(), &BigInt::from(-1074));

        // half the smallest subnormal ties to even zero, a hair more rounds up
        let half = BinaryFloat::new(BigInt::from(1), BigInt::from(-1075));
        assert_eq!(half.to_f64().to_bits(), 0);
        let more = BinaryFloat::new(BigInt::from(3), BigInt::from(-1076));
        assert_eq!(more.to_f64().to_bits(), 1);
        assert_eq!(half.negate().to_f64().to_bits(), (-0.0f64).to_bits());
    }

    #[rstest]
    fn test_decimal_binary_conversion(mut rng: impl Rng, n_experiments: usize) {
        for _ in 0..n_experiments {
            let value = random_f64(&mut rng);
            let decimal = Decimal::from_f64(value);
            assert_eq!(decimal.to_f64(), value, "{value:e}");
            assert_eq!(decimal.to_binary_float(), BinaryFloat::from_f64(value));

            let text = format!("{value:e}");
            let parsed: Decimal = text.parse().unwrap();
            assert_eq!(parsed.to_f64(), value, "{text}");
        }
    }

    #[rstest]
    fn test_to_binary_float_inexact() {
        let tenth: Decimal = "0.1".parse().unwrap();
        let (nan, signals) = tenth
            .to_binary_float_in(&Context::unlimited().with_flags())
            .into_parts();
        assert!(nan.is_nan());
        assert_eq!(signals, Signals::INVALID);

        let approx = tenth.to_binary_float();
        assert_eq!(approx.precision(), 113);
        assert_eq!(approx.to_f64(), 0.1);

        let single = tenth.to_binary_float_in(&Context::binary32()).into_value();
        assert_eq!(single.to_f32(), 0.1f32);
    }
}
