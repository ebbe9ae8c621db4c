use std::cmp::Ordering;
use std::ops::{Add, Div, Mul, Neg, Rem, Sub};

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{ToPrimitive, Zero};

use crate::bigfloat::round::round_finite;
use crate::bigfloat::{BigFloat, Flags, shift_amount};
use crate::context::{Context, Flagged, Rounding, Signals};
use crate::radix::Radix;

/// Product of two significands, in machine words when both fit.
fn multiply_mantissas(a: &BigUint, b: &BigUint) -> BigUint {
    match (a.to_u64(), b.to_u64()) {
        (Some(a), Some(b)) => BigUint::from(u128::from(a) * u128::from(b)),
        _ => a * b,
    }
}

/// Both significands scaled to the smaller of the two exponents.
fn align<R: Radix>(
    a: &BigUint,
    a_exponent: &BigInt,
    b: &BigUint,
    b_exponent: &BigInt,
) -> (BigUint, BigUint, BigInt) {
    match a_exponent.cmp(b_exponent) {
        Ordering::Equal => (a.clone(), b.clone(), a_exponent.clone()),
        Ordering::Greater => {
            let a = R::scale_up(a, shift_amount(&(a_exponent - b_exponent)));
            (a, b.clone(), b_exponent.clone())
        }
        Ordering::Less => {
            let b = R::scale_up(b, shift_amount(&(b_exponent - a_exponent)));
            (a.clone(), b, a_exponent.clone())
        }
    }
}

impl<R: Radix> BigFloat<R> {
    pub fn negate(&self) -> Self {
        let mut negated = self.clone();
        negated.flags.toggle(Flags::NEGATIVE);
        negated
    }

    pub fn abs(&self) -> Self {
        let mut abs = self.clone();
        abs.flags.remove(Flags::NEGATIVE);
        abs
    }

    /// `self` with the sign of `other`.
    pub fn copy_sign(&self, other: &Self) -> Self {
        let mut copy = self.clone();
        copy.flags.set(Flags::NEGATIVE, other.is_negative());
        copy
    }

    /// For a finite operand pair whose adjusted exponents are far apart, the
    /// smaller one only matters as a sticky digit well below the rounding
    /// position, so it can be replaced by a single unit there.
    fn shrink_far_operand(big: &Self, small: &Self, precision: u64) -> Option<Self> {
        let big_adjusted = big.adjusted_exponent();
        let target = big_adjusted - BigInt::from(precision) - 1u8;
        let target = target.min(big.exponent.clone()) - 2u8;
        if small.adjusted_exponent() > target {
            return None;
        }
        Some(Self::from_parts(small.is_negative(), BigUint::from(1u8), target))
    }

    pub(crate) fn add_raw(&self, other: &Self, ctx: &Context) -> (Self, Signals) {
        if let Some(nan) = self.propagate_nan(Some(other), ctx) {
            return nan;
        }
        match (self.is_infinity(), other.is_infinity()) {
            (true, true) if self.is_negative() != other.is_negative() => return Self::invalid(),
            (true, _) => return (self.clone(), Signals::empty()),
            (_, true) => return (other.clone(), Signals::empty()),
            _ => {}
        }

        let mut a = self;
        let mut b = other;
        let shrunk;
        if ctx.has_precision() && !a.mantissa.is_zero() && !b.mantissa.is_zero() {
            let (big, small) = if a.adjusted_exponent() >= b.adjusted_exponent() {
                (a, b)
            } else {
                (b, a)
            };
            if let Some(replacement) = Self::shrink_far_operand(big, small, ctx.precision()) {
                shrunk = replacement;
                a = big;
                b = &shrunk;
            }
        }

        let (a_mantissa, b_mantissa, exponent) =
            align::<R>(&a.mantissa, &a.exponent, &b.mantissa, &b.exponent);
        let (negative, mantissa) = if a.is_negative() == b.is_negative() {
            (a.is_negative(), a_mantissa + b_mantissa)
        } else {
            match a_mantissa.cmp(&b_mantissa) {
                Ordering::Greater => (a.is_negative(), a_mantissa - b_mantissa),
                Ordering::Less => (b.is_negative(), b_mantissa - a_mantissa),
                Ordering::Equal => (ctx.rounding() == Rounding::Floor, BigUint::zero()),
            }
        };
        round_finite(negative, mantissa, exponent, false, ctx)
    }

    pub(crate) fn mul_raw(&self, other: &Self, ctx: &Context) -> (Self, Signals) {
        if let Some(nan) = self.propagate_nan(Some(other), ctx) {
            return nan;
        }
        let negative = self.is_negative() != other.is_negative();
        if self.is_infinity() || other.is_infinity() {
            if self.is_zero() || other.is_zero() {
                return Self::invalid();
            }
            return (Self::infinity(negative), Signals::empty());
        }
        let mantissa = multiply_mantissas(&self.mantissa, &other.mantissa);
        let exponent = &self.exponent + &other.exponent;
        round_finite(negative, mantissa, exponent, false, ctx)
    }

    pub(crate) fn div_raw(&self, other: &Self, ctx: &Context) -> (Self, Signals) {
        if let Some(nan) = self.propagate_nan(Some(other), ctx) {
            return nan;
        }
        let negative = self.is_negative() != other.is_negative();
        match (self.is_infinity(), other.is_infinity()) {
            (true, true) => return Self::invalid(),
            (true, false) => return (Self::infinity(negative), Signals::empty()),
            (false, true) => {
                let etiny = ctx.etiny().unwrap_or_default();
                return round_finite(negative, BigUint::zero(), etiny, false, ctx);
            }
            _ => {}
        }
        if other.mantissa.is_zero() {
            if self.mantissa.is_zero() {
                return Self::invalid();
            }
            return (Self::infinity(negative), Signals::DIVIDE_BY_ZERO);
        }
        let ideal = &self.exponent - &other.exponent;
        if self.mantissa.is_zero() {
            return round_finite(negative, BigUint::zero(), ideal, false, ctx);
        }

        if !ctx.has_precision() {
            let gcd = self.mantissa.gcd(&other.mantissa);
            let numerator = &self.mantissa / &gcd;
            let denominator = &other.mantissa / &gcd;
            let Some((factor, digits)) = R::exact_reciprocal(&denominator) else {
                return Self::invalid();
            };
            let (mantissa, stripped) = R::strip_trailing_zeros(&(numerator * factor), digits);
            let exponent = ideal - BigInt::from(digits - stripped);
            return round_finite(negative, mantissa, exponent, false, ctx);
        }

        let precision = ctx.precision();
        let dividend_digits = R::digit_length(&self.mantissa);
        let divisor_digits = R::digit_length(&other.mantissa);
        let scale = (precision + 2 + divisor_digits).saturating_sub(dividend_digits);
        let dividend = R::scale_up(&self.mantissa, scale);
        let (quotient, remainder) = dividend.div_rem(&other.mantissa);
        let exponent = ideal - BigInt::from(scale);
        if remainder.is_zero() {
            let (quotient, stripped) = R::strip_trailing_zeros(&quotient, scale);
            let exponent = exponent + BigInt::from(stripped);
            return round_finite(negative, quotient, exponent, false, ctx);
        }
        round_finite(negative, quotient, exponent, true, ctx)
    }

    pub(crate) fn rem_raw(&self, other: &Self, ctx: &Context) -> (Self, Signals) {
        if let Some(nan) = self.propagate_nan(Some(other), ctx) {
            return nan;
        }
        if self.is_infinity() || other.is_zero() {
            return Self::invalid();
        }
        if other.is_infinity() {
            return self.round_raw(ctx);
        }
        let (dividend, divisor, exponent) =
            align::<R>(&self.mantissa, &self.exponent, &other.mantissa, &other.exponent);
        let (quotient, remainder) = dividend.div_rem(&divisor);
        if ctx.has_precision() && R::digit_length(&quotient) > ctx.precision() {
            return Self::invalid();
        }
        round_finite(self.is_negative(), remainder, exponent, false, ctx)
    }

    pub fn add_in(&self, other: &Self, ctx: &Context) -> Flagged<Self> {
        let (value, signals) = self.add_raw(other, ctx);
        ctx.outcome(value, signals)
    }

    pub fn sub_in(&self, other: &Self, ctx: &Context) -> Flagged<Self> {
        self.add_in(&other.negate(), ctx)
    }

    pub fn mul_in(&self, other: &Self, ctx: &Context) -> Flagged<Self> {
        let (value, signals) = self.mul_raw(other, ctx);
        ctx.outcome(value, signals)
    }

    /// Divides, rounding to `ctx`.
    ///
    /// Without a precision the quotient must terminate in this radix;
    /// otherwise the result is NaN with [`Signals::INVALID`].
    pub fn div_in(&self, other: &Self, ctx: &Context) -> Flagged<Self> {
        let (value, signals) = self.div_raw(other, ctx);
        ctx.outcome(value, signals)
    }

    /// Remainder of truncating division; the result has the sign of `self`.
    pub fn rem_in(&self, other: &Self, ctx: &Context) -> Flagged<Self> {
        let (value, signals) = self.rem_raw(other, ctx);
        ctx.outcome(value, signals)
    }

    /// `self × multiplicand + augend` with a single rounding.
    pub fn multiply_and_add_in(&self, multiplicand: &Self, augend: &Self, ctx: &Context) -> Flagged<Self> {
        let operands = [self, multiplicand, augend];
        let nan = operands
            .iter()
            .find(|x| x.is_signaling_nan())
            .map(|x| (x.to_quiet_nan(ctx), Signals::INVALID))
            .or_else(|| {
                operands
                    .iter()
                    .find(|x| x.is_quiet_nan())
                    .map(|x| (x.to_quiet_nan(ctx), Signals::empty()))
            });
        if let Some((nan, signals)) = nan {
            return ctx.outcome(nan, signals);
        }
        let (product, signals) = self.mul_raw(multiplicand, &Context::unlimited());
        if product.is_nan() {
            return ctx.outcome(product, signals);
        }
        let (value, signals) = product.add_raw(augend, ctx);
        ctx.outcome(value, signals)
    }

    pub fn multiply_and_add(&self, multiplicand: &Self, augend: &Self) -> Self {
        self.multiply_and_add_in(multiplicand, augend, &Context::unlimited())
            .into_value()
    }
}

impl<R: Radix> Neg for BigFloat<R> {
    type Output = Self;

    fn neg(mut self) -> Self::Output {
        self.flags.toggle(Flags::NEGATIVE);
        self
    }
}

impl<R: Radix> Neg for &BigFloat<R> {
    type Output = BigFloat<R>;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

macro_rules! exact_binary_op {
    ($trait:ident, $method:ident, $raw:ident) => {
        impl<R: Radix> $trait<&BigFloat<R>> for &BigFloat<R> {
            type Output = BigFloat<R>;

            fn $method(self, other: &BigFloat<R>) -> Self::Output {
                self.$raw(other, &Context::unlimited()).0
            }
        }

        impl<R: Radix> $trait for BigFloat<R> {
            type Output = BigFloat<R>;

            fn $method(self, other: BigFloat<R>) -> Self::Output {
                (&self).$method(&other)
            }
        }

        impl<R: Radix> $trait<&BigFloat<R>> for BigFloat<R> {
            type Output = BigFloat<R>;

            fn $method(self, other: &BigFloat<R>) -> Self::Output {
                (&self).$method(other)
            }
        }
    };
}

exact_binary_op!(Add, add, add_raw);
exact_binary_op!(Mul, mul, mul_raw);
exact_binary_op!(Div, div, div_raw);
exact_binary_op!(Rem, rem, rem_raw);

impl<R: Radix> Sub<&BigFloat<R>> for &BigFloat<R> {
    type Output = BigFloat<R>;

    fn sub(self, other: &BigFloat<R>) -> Self::Output {
        self.add_raw(&other.negate(), &Context::unlimited()).0
    }
}

impl<R: Radix> Sub for BigFloat<R> {
    type Output = BigFloat<R>;

    fn sub(self, other: BigFloat<R>) -> Self::Output {
        &self - &other
    }
}

impl<R: Radix> Sub<&BigFloat<R>> for BigFloat<R> {
    type Output = BigFloat<R>;

    fn sub(self, other: &BigFloat<R>) -> Self::Output {
        &self - other
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;
    use rand::Rng;
    use rstest::rstest;

    use super::*;
    use crate::bigfloat::{BinaryFloat, Decimal};
    use crate::tests::*;

    fn dec(text: &str) -> Decimal {
        text.parse().unwrap()
    }

    #[rstest]
    fn test_neg_abs_copy_sign() {
        let x = dec("-1.5");
        assert_eq!((-&x).to_string(), "1.5");
        assert_eq!(x.abs().to_string(), "1.5");
        assert_eq!(dec("2").copy_sign(&x).to_string(), "-2");
        assert!((-Decimal::zero()).is_negative());
        assert!((-Decimal::nan()).is_nan());
    }

    #[rstest]
    fn test_exact_add_sub() {
        assert_eq!((dec("1.25") + dec("0.075")).to_string(), "1.325");
        assert_eq!((dec("1.25") - dec("1.25")).to_string(), "0.00");
        assert!(!(dec("1.25") - dec("1.25")).is_negative());
        assert!((dec("-0") + dec("-0")).is_negative());
        assert!((Decimal::pos_infinity() + dec("5")).is_pos_infinity());
        assert!((Decimal::pos_infinity() - Decimal::pos_infinity()).is_nan());
    }

    #[rstest]
    fn test_exact_matches_f64(mut rng: impl Rng, n_experiments: usize) {
        for _ in 0..n_experiments {
            let a: i32 = rng.random_range(-1_000_000..1_000_000);
            let b: i32 = rng.random_range(-1_000_000..1_000_000);
            let shift: i32 = rng.random_range(-20..20);
            let x = BinaryFloat::from(a).scale_by_power_of_radix(&BigInt::from(shift));
            let y = BinaryFloat::from(b);
            let fx = f64::from(a) * 2f64.powi(shift);
            let fy = f64::from(b);

            assert_eq!((&x + &y).to_f64(), fx + fy);
            assert_eq!((&x - &y).to_f64(), fx - fy);
            assert_eq!((&x * &y).to_f64(), fx * fy);
        }
    }

    #[rstest]
    fn test_add_in_rounds_like_f64(mut rng: impl Rng, n_experiments: usize) {
        let ctx = Context::binary64();
        for _ in 0..n_experiments {
            let a = random_f64(&mut rng);
            let b = random_f64(&mut rng) * if rng.random_bool(0.5) { 1e-20 } else { 1.0 };
            let x = BinaryFloat::from_f64(a);
            let y = BinaryFloat::from_f64(b);

            let sum = x.add_in(&y, &ctx).into_value();
            let product = x.mul_in(&y, &ctx).into_value();
            let quotient = x.div_in(&y, &ctx).into_value();
            assert_eq!(sum.to_f64(), a + b, "{a:e} + {b:e}");
            assert_eq!(product.to_f64(), a * b, "{a:e} * {b:e}");
            assert_eq!(quotient.to_f64(), a / b, "{a:e} / {b:e}");
        }
    }

    #[rstest]
    fn test_add_far_apart_operands() {
        let ctx = Context::for_precision(5).with_flags();
        let big = dec("12345");
        let tiny = Decimal::new(BigInt::from(1), BigInt::from(-1_000_000));

        let (sum, signals) = big.add_in(&tiny, &ctx).into_parts();
        assert_eq!(sum.to_string(), "12345");
        assert_eq!(signals, Signals::INEXACT | Signals::ROUNDED);

        let up = ctx.clone().with_rounding(Rounding::Up);
        assert_eq!(big.add_in(&tiny, &up).into_value().to_string(), "12346");
        let down = ctx.with_rounding(Rounding::Down);
        assert_eq!(big.sub_in(&tiny, &down).into_value().to_string(), "12344");
    }

    #[rstest]
    fn test_zero_sum_sign_under_floor() {
        let floor = Context::unlimited().with_rounding(Rounding::Floor);
        let zero = dec("1").sub_in(&dec("1"), &floor).into_value();
        assert!(zero.is_zero());
        assert!(zero.is_negative());
    }

    #[rstest]
    fn test_multiply_fast_path() {
        let a = BigUint::from(u64::MAX);
        let expected = &a * &a;
        assert_eq!(multiply_mantissas(&a, &a), expected);
        let product = BinaryFloat::from(u64::MAX) * BinaryFloat::from(u64::MAX);
        assert_eq!(product.to_integer().unwrap(), BigInt::from(expected));
    }

    #[rstest]
    fn test_divide() {
        let ctx = Context::unlimited().with_flags();
        assert_eq!(dec("1").div_in(&dec("8"), &ctx).into_value().to_string(), "0.125");
        assert_eq!(dec("12").div_in(&dec("4"), &ctx).into_value().to_string(), "3");
        assert_eq!(dec("1.20").div_in(&dec("2"), &ctx).into_value().to_string(), "0.60");

        let (third, signals) = dec("1").div_in(&dec("3"), &ctx).into_parts();
        assert!(third.is_nan());
        assert_eq!(signals, Signals::INVALID);

        let (inf, signals) = dec("-1").div_in(&dec("0"), &ctx).into_parts();
        assert!(inf.is_neg_infinity());
        assert_eq!(signals, Signals::DIVIDE_BY_ZERO);

        let (nan, signals) = dec("0").div_in(&dec("0"), &ctx).into_parts();
        assert!(nan.is_nan());
        assert_eq!(signals, Signals::INVALID);

        let ctx = Context::for_precision(9).with_flags();
        let (value, signals) = dec("2").div_in(&dec("3"), &ctx).into_parts();
        assert_eq!(value.to_string(), "0.666666667");
        assert_eq!(signals, Signals::INEXACT | Signals::ROUNDED);
        assert_eq!(dec("1000").div_in(&dec("8"), &ctx).into_value().to_string(), "125");
    }

    #[rstest]
    fn test_binary_divide_exact() {
        let x = BinaryFloat::from(3) / BinaryFloat::from(16);
        assert_eq!(x.to_f64(), 0.1875);
        assert!((BinaryFloat::from(1) / BinaryFloat::from(10)).is_nan());
    }

    #[rstest]
    fn test_remainder() {
        assert_eq!((dec("2.1") % dec("3")).to_string(), "2.1");
        assert_eq!((dec("10") % dec("3")).to_string(), "1");
        assert_eq!((dec("-10") % dec("3")).to_string(), "-1");
        assert_eq!((dec("3.6") % dec("1.3")).to_string(), "1.0");
        assert!((dec("1") % dec("0")).is_nan());
        assert!((Decimal::pos_infinity() % dec("1")).is_nan());
        assert_eq!((dec("5") % Decimal::pos_infinity()).to_string(), "5");

        let ctx = Context::for_precision(2).with_flags();
        let (value, signals) = dec("1000").rem_in(&dec("3"), &ctx).into_parts();
        assert!(value.is_nan());
        assert_eq!(signals, Signals::INVALID);
    }

    #[rstest]
    fn test_multiply_and_add_rounds_once() {
        let ctx = Context::for_precision(3);
        // 1.01 * 1.01 = 1.0201, then - 1.02: a rounded product would lose the 0.0001
        let x = dec("1.01");
        let fused = x.multiply_and_add_in(&x, &dec("-1.02"), &ctx).into_value();
        assert_eq!(fused.to_string(), "0.0001");
        assert_eq!(x.multiply_and_add(&x, &dec("1")).to_string(), "2.0201");

        let (nan, signals) = Decimal::pos_infinity()
            .multiply_and_add_in(&Decimal::zero(), &dec("1"), &ctx.with_flags())
            .into_parts();
        assert!(nan.is_nan());
        assert_eq!(signals, Signals::INVALID);
    }

    #[rstest]
    fn test_signaling_nan_poisons() {
        let ctx = Context::binary64().with_flags();
        let (value, signals) = BinaryFloat::one()
            .add_in(&BinaryFloat::signaling_nan(), &ctx)
            .into_parts();
        assert!(value.is_quiet_nan());
        assert_eq!(signals, Signals::INVALID);

        let (value, signals) = BinaryFloat::nan().mul_in(&BinaryFloat::one(), &ctx).into_parts();
        assert!(value.is_quiet_nan());
        assert!(signals.is_empty());
    }
}
