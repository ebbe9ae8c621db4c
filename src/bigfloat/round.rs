//! # Rounding
//!
//! Every context-taking operation funnels its exact (or sticky) intermediate
//! result through [`round_finite`], which fits the significand to the context
//! precision and exponent range in a single pass over a
//! [`ShiftAccumulator`](crate::radix::ShiftAccumulator).

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Signed, Zero};

use crate::bigfloat::{BigFloat, shift_amount};
use crate::context::{Context, Flagged, Rounding, Signals};
use crate::radix::{Radix, ShiftAccumulator};

/// Whether discarding digits `last, older...` from a value whose kept part has
/// parity `odd` moves the kept part one unit away from zero.
pub(crate) fn rounds_up(
    rounding: Rounding,
    half: u32,
    last: u32,
    older: bool,
    negative: bool,
    odd: bool,
) -> bool {
    let inexact = last != 0 || older;
    match rounding {
        Rounding::HalfEven => last > half || (last == half && (older || odd)),
        Rounding::HalfUp => last >= half,
        Rounding::HalfDown => last > half || (last == half && older),
        Rounding::Up => inexact,
        Rounding::Down | Rounding::None => false,
        Rounding::Ceiling => !negative && inexact,
        Rounding::Floor => negative && inexact,
        Rounding::Odd => inexact && !odd,
    }
}

/// Fits `±mantissa × RADIX^exponent` to `ctx`.
///
/// With `sticky`, the value is treated as lying strictly between `mantissa`
/// and `mantissa + 1` units, as left by an inexact division or square root.
pub(crate) fn round_finite<R: Radix>(
    negative: bool,
    mut mantissa: BigUint,
    mut exponent: BigInt,
    sticky: bool,
    ctx: &Context,
) -> (BigFloat<R>, Signals) {
    let mut signals = Signals::empty();
    if sticky {
        // two extra digits `01` sit strictly below half a unit in any radix
        mantissa = R::scale_up(&mantissa, 2) + 1u8;
        exponent -= 2;
    }
    if mantissa.is_zero() {
        let exponent = clamp_zero_exponent(exponent, ctx, &mut signals);
        return (BigFloat::from_parts(negative, mantissa, exponent), signals);
    }

    let precision = ctx.precision();
    let digits = R::digit_length(&mantissa);
    let adjusted = &exponent + BigInt::from(digits - 1);

    let mut shift = BigInt::zero();
    if precision > 0 && digits > precision {
        shift = BigInt::from(digits - precision);
    }
    if let Some(etiny) = ctx.etiny() {
        let below_tiny = etiny - &exponent;
        if below_tiny > shift {
            shift = below_tiny;
        }
    }
    if sticky && shift < BigInt::from(2) {
        shift = BigInt::from(2);
    }

    if shift.is_positive() {
        let mut acc = R::Accumulator::new(mantissa);
        acc.shift_right(shift_amount(&shift));
        let mut kept = acc.shifted();
        exponent += &shift;
        signals |= Signals::ROUNDED;
        if acc.is_inexact() {
            if ctx.rounding() == Rounding::None {
                return BigFloat::invalid();
            }
            signals |= Signals::INEXACT;
            let up = rounds_up(
                ctx.rounding(),
                R::RADIX / 2,
                acc.last_discarded(),
                acc.older_discarded(),
                negative,
                kept.bit(0),
            );
            if up {
                kept += 1u8;
                if precision > 0 && R::digit_length(&kept) > precision {
                    kept = R::power(precision - 1);
                    exponent += 1;
                }
            }
        }
        mantissa = kept;
    }

    if !mantissa.is_zero() {
        if let Some(emax) = ctx.emax() {
            let adjusted = &exponent + BigInt::from(R::digit_length(&mantissa) - 1);
            if adjusted > *emax {
                if ctx.rounding() == Rounding::None {
                    return BigFloat::invalid();
                }
                let overflow = Signals::OVERFLOW | Signals::INEXACT | Signals::ROUNDED;
                return (overflow_value(negative, ctx), signals | overflow);
            }
        }
    }

    if ctx.emin().is_some_and(|emin| adjusted < *emin) {
        signals |= Signals::SUBNORMAL;
        if signals.contains(Signals::INEXACT) {
            signals |= Signals::UNDERFLOW;
        }
    }

    if mantissa.is_zero() {
        let exponent = clamp_zero_exponent(exponent, ctx, &mut signals);
        return (BigFloat::from_parts(negative, mantissa, exponent), signals);
    }

    if ctx.clamp() && precision > 0 {
        if let Some(emax) = ctx.emax() {
            let top = emax - BigInt::from(precision - 1);
            if exponent > top {
                mantissa = R::scale_up(&mantissa, shift_amount(&(&exponent - &top)));
                exponent = top;
                signals |= Signals::CLAMPED;
            }
        }
    }
    (BigFloat::from_parts(negative, mantissa, exponent), signals)
}

fn clamp_zero_exponent(exponent: BigInt, ctx: &Context, signals: &mut Signals) -> BigInt {
    let mut clamped = exponent;
    if let Some(etiny) = ctx.etiny() {
        if clamped < etiny {
            clamped = etiny;
            *signals |= Signals::CLAMPED;
        }
    }
    if let Some(emax) = ctx.emax() {
        let top = if ctx.clamp() && ctx.has_precision() {
            emax - BigInt::from(ctx.precision() - 1)
        } else {
            emax.clone()
        };
        if clamped > top {
            clamped = top;
            *signals |= Signals::CLAMPED;
        }
    }
    clamped
}

fn overflow_value<R: Radix>(negative: bool, ctx: &Context) -> BigFloat<R> {
    let to_infinity = match ctx.rounding() {
        Rounding::HalfEven | Rounding::HalfUp | Rounding::HalfDown | Rounding::Up => true,
        Rounding::Ceiling => !negative,
        Rounding::Floor => negative,
        Rounding::Down | Rounding::Odd | Rounding::None => false,
    };
    match largest_finite(negative, ctx) {
        Some(largest) if !to_infinity => largest,
        _ => BigFloat::infinity(negative),
    }
}

/// `±(RADIX^precision - 1) × RADIX^(emax - precision + 1)`
pub(crate) fn largest_finite<R: Radix>(negative: bool, ctx: &Context) -> Option<BigFloat<R>> {
    let emax = ctx.emax()?;
    if !ctx.has_precision() {
        return None;
    }
    let precision = ctx.precision();
    Some(BigFloat::from_parts(
        negative,
        R::power(precision) - 1u8,
        emax - BigInt::from(precision - 1),
    ))
}

/// Moves `mantissa × RADIX^exponent` to `target`, rounding with `rounding`
/// when digits are discarded. `None` means an inexact result was not allowed.
fn rescale<R: Radix>(
    negative: bool,
    mantissa: &BigUint,
    exponent: &BigInt,
    target: &BigInt,
    rounding: Rounding,
) -> Option<(BigUint, Signals)> {
    if target <= exponent {
        let digits = shift_amount(&(exponent - target));
        return Some((R::scale_up(mantissa, digits), Signals::empty()));
    }
    let mut acc = R::Accumulator::new(mantissa.clone());
    acc.shift_right(shift_amount(&(target - exponent)));
    let mut kept = acc.shifted();
    let mut signals = Signals::ROUNDED;
    if acc.is_inexact() {
        if rounding == Rounding::None {
            return None;
        }
        signals |= Signals::INEXACT;
        let odd = kept.bit(0);
        if rounds_up(
            rounding,
            R::RADIX / 2,
            acc.last_discarded(),
            acc.older_discarded(),
            negative,
            odd,
        ) {
            kept += 1u8;
        }
    }
    Some((kept, signals))
}

impl<R: Radix> BigFloat<R> {
    pub(crate) fn round_raw(&self, ctx: &Context) -> (Self, Signals) {
        if let Some(nan) = self.propagate_nan(None, ctx) {
            return nan;
        }
        if self.is_infinity() {
            return (self.clone(), Signals::empty());
        }
        round_finite(
            self.is_negative(),
            self.mantissa.clone(),
            self.exponent.clone(),
            false,
            ctx,
        )
    }

    /// Rounds to the precision and exponent range of `ctx`.
    pub fn round_to_precision(&self, ctx: &Context) -> Flagged<Self> {
        let (value, signals) = self.round_raw(ctx);
        ctx.outcome(value, signals)
    }

    /// Rounds to exactly `exponent`.
    ///
    /// Fails with NaN and [`Signals::INVALID`] when the result would need more
    /// digits than the context allows, when `exponent` lies outside the
    /// context's exponent range, or when `self` is infinite.
    pub fn quantize(&self, exponent: &BigInt, ctx: &Context) -> Flagged<Self> {
        let (value, signals) = self.quantize_raw(exponent, ctx);
        ctx.outcome(value, signals)
    }

    /// Rounds to the exponent of `other`.
    pub fn quantize_to(&self, other: &Self, ctx: &Context) -> Flagged<Self> {
        if let Some((nan, signals)) = self.propagate_nan(Some(other), ctx) {
            return ctx.outcome(nan, signals);
        }
        match (self.is_infinity(), other.is_infinity()) {
            (true, true) => ctx.outcome(self.clone(), Signals::empty()),
            (false, false) => self.quantize(&other.exponent, ctx),
            _ => {
                let (nan, signals) = Self::invalid();
                ctx.outcome(nan, signals)
            }
        }
    }

    fn quantize_raw(&self, exponent: &BigInt, ctx: &Context) -> (Self, Signals) {
        if let Some(nan) = self.propagate_nan(None, ctx) {
            return nan;
        }
        if self.is_infinity() {
            return Self::invalid();
        }
        if ctx.etiny().is_some_and(|etiny| *exponent < etiny) {
            return Self::invalid();
        }
        if let Some(emax) = ctx.emax() {
            let top = if ctx.clamp() && ctx.has_precision() {
                emax - BigInt::from(ctx.precision() - 1)
            } else {
                emax.clone()
            };
            if *exponent > top {
                return Self::invalid();
            }
        }
        let negative = self.is_negative();
        let Some((mantissa, signals)) =
            rescale::<R>(negative, &self.mantissa, &self.exponent, exponent, ctx.rounding())
        else {
            return Self::invalid();
        };
        if ctx.has_precision() && R::digit_length(&mantissa) > ctx.precision() {
            return Self::invalid();
        }
        (Self::from_parts(negative, mantissa, exponent.clone()), signals)
    }

    fn round_to_exponent_raw(&self, exponent: &BigInt, ctx: &Context) -> (Self, Signals) {
        if let Some(nan) = self.propagate_nan(None, ctx) {
            return nan;
        }
        if self.is_infinity() {
            return (self.clone(), Signals::empty());
        }
        let negative = self.is_negative();
        if *exponent <= self.exponent {
            return self.round_raw(ctx);
        }
        let Some((mantissa, signals)) =
            rescale::<R>(negative, &self.mantissa, &self.exponent, exponent, ctx.rounding())
        else {
            return Self::invalid();
        };
        let (value, more) = round_finite(negative, mantissa, exponent.clone(), false, ctx);
        (value, signals | more)
    }

    /// Discards digits below `exponent` using the context's rounding mode.
    /// A value whose exponent is already at or above `exponent` keeps it.
    pub fn round_to_exponent(&self, exponent: &BigInt, ctx: &Context) -> Flagged<Self> {
        let (value, signals) = self.round_to_exponent_raw(exponent, ctx);
        ctx.outcome(value, signals)
    }

    /// Like [`round_to_exponent`](Self::round_to_exponent), but any discarded
    /// nonzero digit makes the result NaN with [`Signals::INVALID`].
    pub fn round_to_exponent_exact(&self, exponent: &BigInt, ctx: &Context) -> Flagged<Self> {
        let (value, signals) = self.round_to_exponent_raw(exponent, ctx);
        if signals.contains(Signals::INEXACT) {
            let (nan, signals) = Self::invalid();
            return ctx.outcome(nan, signals);
        }
        ctx.outcome(value, signals)
    }

    pub fn round_to_integer(&self, ctx: &Context) -> Flagged<Self> {
        self.round_to_exponent(&BigInt::zero(), ctx)
    }

    pub fn round_to_integer_exact(&self, ctx: &Context) -> Flagged<Self> {
        self.round_to_exponent_exact(&BigInt::zero(), ctx)
    }

    /// Rounds, then removes trailing zero digits from the significand.
    pub fn reduce(&self, ctx: &Context) -> Flagged<Self> {
        let (value, signals) = self.round_raw(ctx);
        if !value.is_finite() {
            return ctx.outcome(value, signals);
        }
        if value.mantissa.is_zero() {
            let zero = Self::from_parts(value.is_negative(), BigUint::zero(), BigInt::zero());
            return ctx.outcome(zero, signals);
        }
        let (mantissa, count) = R::strip_trailing_zeros(&value.mantissa, u64::MAX);
        let exponent = &value.exponent + BigInt::from(count);
        ctx.outcome(Self::from_parts(value.is_negative(), mantissa, exponent), signals)
    }

    /// One unit in the last place of this value's significand, `RADIX^exponent`.
    pub fn ulp(&self) -> Self {
        if self.is_nan() {
            return self.clone();
        }
        if self.is_infinity() {
            return Self::pos_infinity();
        }
        Self::from_parts(false, BigUint::one(), self.exponent.clone())
    }

    /// Multiplies by `RADIX^power` without rounding.
    pub fn scale_by_power_of_radix(&self, power: &BigInt) -> Self {
        if self.is_special() {
            return self.clone();
        }
        Self::from_parts(self.is_negative(), self.mantissa.clone(), &self.exponent + power)
    }

    pub fn scale_by_power_of_radix_in(&self, power: &BigInt, ctx: &Context) -> Flagged<Self> {
        self.scale_by_power_of_radix(power).round_to_precision(ctx)
    }

    /// Smallest representable value greater than `self` under `ctx`.
    ///
    /// Needs a context with a precision; stepping up from zero or from
    /// negative infinity also needs an exponent range.
    pub fn next_plus(&self, ctx: &Context) -> Flagged<Self> {
        self.next_toward_infinity(false, ctx)
    }

    /// Largest representable value less than `self` under `ctx`.
    pub fn next_minus(&self, ctx: &Context) -> Flagged<Self> {
        self.next_toward_infinity(true, ctx)
    }

    fn next_toward_infinity(&self, toward_negative: bool, ctx: &Context) -> Flagged<Self> {
        if let Some((nan, signals)) = self.propagate_nan(None, ctx) {
            return ctx.outcome(nan, signals);
        }
        if !ctx.has_precision() {
            let (nan, signals) = Self::invalid();
            return ctx.outcome(nan, signals);
        }
        if self.is_infinity() {
            if self.is_negative() == toward_negative {
                return ctx.outcome(self.clone(), Signals::empty());
            }
            return match largest_finite(self.is_negative(), ctx) {
                Some(largest) => ctx.outcome(largest, Signals::empty()),
                None => {
                    let (nan, signals) = Self::invalid();
                    ctx.outcome(nan, signals)
                }
            };
        }

        let etiny = ctx.etiny();
        let unit_exponent = if self.mantissa.is_zero() {
            match etiny {
                Some(etiny) => etiny,
                None => {
                    let (nan, signals) = Self::invalid();
                    return ctx.outcome(nan, signals);
                }
            }
        } else {
            let normal = self.adjusted_exponent() - BigInt::from(ctx.precision() - 1);
            match etiny {
                Some(etiny) if etiny > normal => etiny,
                _ => normal,
            }
        };
        // nudge by less than the narrowest spacing next to `self`, then round away from it
        let nudge = Self::from_parts(toward_negative, BigUint::one(), unit_exponent - 2);
        let nudged = self + &nudge;
        let rounding = if toward_negative {
            Rounding::Floor
        } else {
            Rounding::Ceiling
        };
        let directed = ctx.clone().with_rounding(rounding);
        let (value, _) = nudged.round_raw(&directed);
        ctx.outcome(value, Signals::empty())
    }
}
