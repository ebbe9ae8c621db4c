//! # Transcendental Functions
//!
//! Binary-only functions evaluated in fixed point: an argument is scaled to
//! an integer `X ≈ x · 2^w` with `w` comfortably above the context precision,
//! series are summed on those integers, and the result goes through a single
//! sticky rounding. Results are faithful; exact cases (`sqrt` of a square,
//! `ln 1`, `log10` of a power of ten, integer powers) are rounded correctly.

use std::cmp::Ordering;

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::bigfloat::round::round_finite;
use crate::bigfloat::{BinaryFloat, shift_amount};
use crate::context::{Context, Flagged, Rounding, Signals};
use crate::radix::{Base2, Radix};

const GUARD_BITS: u64 = 32;

/// Extra bits carried inside the series so truncation of each term stays
/// below the last working bit.
const SERIES_BITS: u64 = 16;

/// `ln 2 · 2^w`, from `ln 2 = Σ 1 / (n · 2^n)`.
fn ln2_fixed(w: u64) -> BigInt {
    let unit = BigUint::one() << (w + SERIES_BITS);
    let mut sum = BigUint::zero();
    for n in 1u64.. {
        let term = (&unit >> n) / n;
        if term.is_zero() {
            break;
        }
        sum += term;
    }
    BigInt::from(sum >> SERIES_BITS)
}

/// `atan(1/k) · 2^w`.
fn atan_inverse_fixed(k: u64, w: u64) -> BigInt {
    let k_squared = k * k;
    let mut power = (BigInt::one() << (w + SERIES_BITS)) / k;
    let mut sum = power.clone();
    for n in 1u64.. {
        power /= k_squared;
        let term = &power / (2 * n + 1);
        if term.is_zero() {
            break;
        }
        if n.is_odd() {
            sum -= term;
        } else {
            sum += term;
        }
    }
    sum >> SERIES_BITS
}

/// `exp(r) · 2^w` for a small fixed-point `r`.
fn exp_series(r: &BigInt, w: u64) -> BigInt {
    let mut sum = BigInt::one() << w;
    let mut term = sum.clone();
    for n in 1u64.. {
        term = ((term * r) >> w) / n;
        if term.is_zero() {
            break;
        }
        sum += &term;
    }
    sum
}

/// `2 · atanh(t) · 2^w`, which is `ln((1 + t) / (1 - t))`.
fn atanh_series(t: &BigInt, w: u64) -> BigInt {
    let magnitude = BigInt::from(t.magnitude().clone());
    let t_squared = (&magnitude * &magnitude) >> w;
    let mut power = magnitude.clone();
    let mut sum = magnitude;
    for k in 1u64.. {
        power = (power * &t_squared) >> w;
        let term = &power / (2 * k + 1);
        if term.is_zero() {
            break;
        }
        sum += term;
    }
    if t.is_negative() { -(sum << 1u32) } else { sum << 1u32 }
}

/// `|x| · 2^w`, truncated. `x` must be finite.
fn to_fixed(x: &BinaryFloat, w: u64) -> BigInt {
    let shift = &x.exponent + BigInt::from(w);
    let magnitude = if shift.is_negative() {
        &x.mantissa >> shift_amount(&-shift)
    } else {
        &x.mantissa << shift_amount(&shift)
    };
    BigInt::from_biguint(Sign::Plus, magnitude)
}

/// `ln x · 2^w` for a finite positive `x`, with an absolute error of a few
/// units of `2^-w`.
fn ln_fixed(x: &BinaryFloat, w: u64) -> BigInt {
    // x = f · 2^k with 1/2 <= f < 1
    let bits = x.mantissa.bits();
    let k = &x.exponent + BigInt::from(bits);
    let f = if w >= bits {
        BigInt::from(&x.mantissa << (w - bits))
    } else {
        BigInt::from(&x.mantissa >> (bits - w))
    };
    let unit = BigInt::one() << w;
    let t = ((&f - &unit) << w) / (&f + &unit);
    atanh_series(&t, w) + k * ln2_fixed(w)
}

/// `ln x` to at least `bits` significant bits, returned with its scale.
/// `x` must be finite, positive and not one.
fn ln_relative(x: &BinaryFloat, bits: u64) -> (BigInt, u64) {
    let scale = (&x.exponent + BigInt::from(x.mantissa.bits())).bits();
    let mut w = bits + GUARD_BITS + scale;
    loop {
        let ln = ln_fixed(x, w);
        // near x = 1 the two halves of ln_fixed cancel
        if ln.bits() >= bits + GUARD_BITS / 2 {
            return (ln, w);
        }
        w *= 2;
    }
}

/// `±exp(z / 2^w)` rounded to `ctx`.
fn exp_fixed_rounded(z: &BigInt, w: u64, negative: bool, ctx: &Context) -> (BinaryFloat, Signals) {
    let ln2 = ln2_fixed(w);
    let k = (z + (&ln2 >> 1u8)).div_floor(&ln2);
    let r = z - &k * &ln2;
    let value = exp_series(&r, w);
    round_finite(negative, value.magnitude().clone(), k - BigInt::from(w), true, ctx)
}

/// Overflow or underflow of `exp(z)` decided from the size of `z` alone.
/// `int_bits` bounds the bit length of `|z|`'s integer part from below.
fn exp_out_of_range(
    negative_z: bool,
    int_bits: u64,
    negative: bool,
    ctx: &Context,
) -> Option<(BinaryFloat, Signals)> {
    let emax = ctx.emax()?;
    let etiny = ctx.etiny()?;
    let limit = emax.bits().max(etiny.bits()) + 2;
    if int_bits <= limit {
        return None;
    }
    let exponent = if negative_z {
        etiny - BigInt::from(4)
    } else {
        emax + BigInt::from(2)
    };
    Some(round_finite(negative, BigUint::one(), exponent, true, ctx))
}

fn one_in(ctx: &Context) -> (BinaryFloat, Signals) {
    round_finite(false, BigUint::one(), BigInt::zero(), false, ctx)
}

impl BinaryFloat {
    /// Multiplies by `2^power` without rounding.
    pub fn scale_by_power_of_two(&self, power: &BigInt) -> Self {
        self.scale_by_power_of_radix(power)
    }

    /// `π` to the precision of `ctx`.
    ///
    /// Returns NaN with [`Signals::INVALID`] when `ctx` has no precision.
    pub fn pi(ctx: &Context) -> Flagged<Self> {
        if !ctx.has_precision() {
            let (nan, signals) = Self::invalid();
            return ctx.outcome(nan, signals);
        }
        let w = ctx.precision() + GUARD_BITS;
        // Machin: π = 16·atan(1/5) − 4·atan(1/239)
        let pi = (atan_inverse_fixed(5, w) << 4u8) - (atan_inverse_fixed(239, w) << 2u8);
        let (value, signals) =
            round_finite(false, pi.magnitude().clone(), -BigInt::from(w), true, ctx);
        ctx.outcome(value, signals)
    }

    /// Square root, correctly rounded.
    ///
    /// ```rust
    /// use numtower::{BinaryFloat, Context};
    ///
    /// let root = BinaryFloat::from_f64(2.0).sqrt(&Context::binary64()).into_value();
    /// assert_eq!(root.to_f64(), 2f64.sqrt());
    /// ```
    pub fn sqrt(&self, ctx: &Context) -> Flagged<Self> {
        let (value, signals) = self.sqrt_raw(ctx);
        ctx.outcome(value, signals)
    }

    fn sqrt_raw(&self, ctx: &Context) -> (Self, Signals) {
        if let Some(nan) = self.propagate_nan(None, ctx) {
            return nan;
        }
        if !ctx.has_precision() {
            return Self::invalid();
        }
        if self.is_zero() {
            let exponent = self.exponent.div_floor(&BigInt::from(2));
            return round_finite(self.is_negative(), BigUint::zero(), exponent, false, ctx);
        }
        if self.is_negative() {
            return Self::invalid();
        }
        if self.is_infinity() {
            return (Self::pos_infinity(), Signals::empty());
        }

        let mut mantissa = self.mantissa.clone();
        let mut exponent = self.exponent.clone();
        if exponent.is_odd() {
            mantissa <<= 1u8;
            exponent -= 1u8;
        }
        let target = 2 * (ctx.precision() + 2);
        let shift = target.saturating_sub(mantissa.bits()).div_ceil(2) * 2;
        mantissa <<= shift;
        exponent -= BigInt::from(shift);

        let root = mantissa.sqrt();
        let exact = &root * &root == mantissa;
        let mut exponent = exponent / 2u8;
        let root = if exact {
            let (root, stripped) = Base2::strip_trailing_zeros(&root, shift / 2);
            exponent += BigInt::from(stripped);
            root
        } else {
            root
        };
        round_finite(false, root, exponent, !exact, ctx)
    }

    /// `e` raised to this value.
    ///
    /// Needs a context with a precision; without one the result is NaN with
    /// [`Signals::INVALID`]. Arguments far outside the context's exponent
    /// range overflow or underflow without evaluating the series.
    pub fn exp(&self, ctx: &Context) -> Flagged<Self> {
        let (value, signals) = self.exp_raw(ctx);
        ctx.outcome(value, signals)
    }

    fn exp_raw(&self, ctx: &Context) -> (Self, Signals) {
        if let Some(nan) = self.propagate_nan(None, ctx) {
            return nan;
        }
        if !ctx.has_precision() {
            return Self::invalid();
        }
        if self.is_infinity() {
            let value = if self.is_negative() {
                Self::zero()
            } else {
                Self::pos_infinity()
            };
            return (value, Signals::empty());
        }
        if self.is_zero() {
            return one_in(ctx);
        }
        let int_bits = shift_amount(&(self.adjusted_exponent() + 1u8));
        if let Some(out) = exp_out_of_range(self.is_negative(), int_bits, false, ctx) {
            return out;
        }
        let w = ctx.precision() + GUARD_BITS + int_bits + 2;
        let mut z = to_fixed(self, w);
        if self.is_negative() {
            z = -z;
        }
        exp_fixed_rounded(&z, w, false, ctx)
    }

    /// Natural logarithm.
    ///
    /// Zero gives negative infinity without signals; negative values give
    /// NaN with [`Signals::INVALID`].
    pub fn ln(&self, ctx: &Context) -> Flagged<Self> {
        let (value, signals) = self.log_raw(ctx, false);
        ctx.outcome(value, signals)
    }

    /// Base-10 logarithm. Exact powers of ten give exact results.
    pub fn log10(&self, ctx: &Context) -> Flagged<Self> {
        let (value, signals) = self.log_raw(ctx, true);
        ctx.outcome(value, signals)
    }

    fn log_raw(&self, ctx: &Context, base10: bool) -> (Self, Signals) {
        if let Some(nan) = self.propagate_nan(None, ctx) {
            return nan;
        }
        if !ctx.has_precision() {
            return Self::invalid();
        }
        if self.is_zero() {
            return (Self::neg_infinity(), Signals::empty());
        }
        if self.is_negative() {
            return Self::invalid();
        }
        if self.is_infinity() {
            return (Self::pos_infinity(), Signals::empty());
        }
        if self.compare_to(&Self::one()) == Ordering::Equal {
            return round_finite(false, BigUint::zero(), BigInt::zero(), false, ctx);
        }
        if base10 {
            if let Some(power) = self.power_of_ten() {
                let negative = power.is_negative();
                return round_finite(negative, power.magnitude().clone(), BigInt::zero(), false, ctx);
            }
        }

        let (ln, w) = ln_relative(self, ctx.precision());
        let value = if base10 {
            let ln10 = ln_fixed(&Self::from(10u8), w);
            (ln << w) / ln10
        } else {
            ln
        };
        round_finite(value.is_negative(), value.magnitude().clone(), -BigInt::from(w), true, ctx)
    }

    /// `n` when this value is exactly `10^n`.
    fn power_of_ten(&self) -> Option<BigInt> {
        let zeros = self.mantissa.trailing_zeros()?;
        let odd = &self.mantissa >> zeros;
        let exponent = &self.exponent + BigInt::from(zeros);
        let n = exponent.to_u32()?;
        // 5^n has more than 2n bits
        if u64::from(n) > odd.bits() {
            return None;
        }
        (odd == BigUint::from(5u8).pow(n)).then(|| BigInt::from(n))
    }

    /// This value raised to `exponent`.
    ///
    /// Integer exponents are computed by repeated squaring and work without a
    /// precision (exactly, or NaN if a negative power does not terminate in
    /// binary). Other exponents need a context with a precision. `0^0`, and
    /// a negative base with a fractional or infinite exponent, give NaN with
    /// [`Signals::INVALID`].
    ///
    /// ```rust
    /// use numtower::{BinaryFloat, Context};
    ///
    /// let ctx = Context::binary64();
    /// let x = BinaryFloat::from_f64(2.0);
    /// let half = BinaryFloat::from_f64(0.5);
    /// assert_eq!(x.pow(&half, &ctx).into_value().to_f64(), 2f64.sqrt());
    /// assert_eq!(x.powi(-2, &ctx).into_value().to_f64(), 0.25);
    /// ```
    pub fn pow(&self, exponent: &Self, ctx: &Context) -> Flagged<Self> {
        let (value, signals) = self.pow_raw(exponent, ctx);
        ctx.outcome(value, signals)
    }

    pub fn powi(&self, exponent: i64, ctx: &Context) -> Flagged<Self> {
        let (value, signals) = self.pow_integer(&BigInt::from(exponent), ctx);
        ctx.outcome(value, signals)
    }

    fn pow_raw(&self, y: &Self, ctx: &Context) -> (Self, Signals) {
        if let Some(nan) = self.propagate_nan(Some(y), ctx) {
            return nan;
        }
        if y.is_finite() && y.is_integer() {
            if let Ok(n) = y.to_integer() {
                return self.pow_integer(&n, ctx);
            }
        }
        if self.is_negative() && !self.is_zero() {
            return Self::invalid();
        }
        if !ctx.has_precision() {
            return Self::invalid();
        }
        if y.is_infinity() {
            let grows = match self.compare_to(&Self::one()) {
                Ordering::Equal => return one_in(ctx),
                Ordering::Greater => !y.is_negative(),
                Ordering::Less => y.is_negative(),
            };
            let value = if grows {
                Self::pos_infinity()
            } else {
                Self::zero()
            };
            return (value, Signals::empty());
        }
        if self.is_zero() {
            return if y.is_negative() {
                (Self::pos_infinity(), Signals::DIVIDE_BY_ZERO)
            } else {
                (Self::zero(), Signals::empty())
            };
        }
        if self.is_infinity() {
            let value = if y.is_negative() {
                Self::zero()
            } else {
                Self::pos_infinity()
            };
            return (value, Signals::empty());
        }
        self.pow_via_ln(y, false, ctx)
    }

    /// `±exp(y · ln |self|)` for finite nonzero operands.
    fn pow_via_ln(&self, y: &Self, negative: bool, ctx: &Context) -> (Self, Signals) {
        let base = self.abs();
        let towards_zero = match base.compare_to(&Self::one()) {
            Ordering::Equal => {
                let (one, signals) = one_in(ctx);
                return (if negative { one.negate() } else { one }, signals);
            }
            Ordering::Less => !y.is_negative(),
            Ordering::Greater => y.is_negative(),
        };
        // |ln x| is at least |adjusted| / 8 once x is outside [1/4, 4)
        let y_bits = shift_amount(&(y.adjusted_exponent() + 1u8));
        let scale_bits = base.adjusted_exponent().magnitude().bits();
        if scale_bits >= 2 {
            let lower = (y_bits + scale_bits).saturating_sub(3);
            if let Some(out) = exp_out_of_range(towards_zero, lower, negative, ctx) {
                return out;
            }
        }
        let int_bits = y_bits + scale_bits + 1;

        let (ln, w) = ln_relative(&base, ctx.precision() + int_bits + 2);
        let product = ln * BigInt::from(y.mantissa.clone());
        let mut z = if y.exponent.is_negative() {
            product >> shift_amount(&-&y.exponent)
        } else {
            product << shift_amount(&y.exponent)
        };
        if y.is_negative() {
            z = -z;
        }
        exp_fixed_rounded(&z, w, negative, ctx)
    }

    fn pow_integer(&self, n: &BigInt, ctx: &Context) -> (Self, Signals) {
        if let Some(nan) = self.propagate_nan(None, ctx) {
            return nan;
        }
        let negative = self.is_negative() && n.is_odd();
        if n.is_zero() {
            if self.is_zero() {
                return Self::invalid();
            }
            return one_in(ctx);
        }
        if self.is_infinity() {
            let value = if n.is_negative() {
                Self::from_parts(negative, BigUint::zero(), BigInt::zero())
            } else {
                Self::infinity(negative)
            };
            return (value, Signals::empty());
        }
        if self.is_zero() {
            return if n.is_negative() {
                (Self::infinity(negative), Signals::DIVIDE_BY_ZERO)
            } else {
                (Self::from_parts(negative, BigUint::zero(), BigInt::zero()), Signals::empty())
            };
        }

        let Some(count) = n.magnitude().to_u64() else {
            if !ctx.has_precision() {
                return Self::invalid();
            }
            let y = Self::from(n);
            return self.pow_via_ln(&y, negative, ctx);
        };

        // square and multiply, rounding to odd so the final rounding stays faithful
        let work = if ctx.has_precision() {
            Context::for_precision(ctx.precision() + 2 * n.bits() + GUARD_BITS)
                .with_rounding(Rounding::Odd)
        } else {
            Context::unlimited()
        };
        let mut square = self.abs();
        let mut power = Self::one();
        let mut remaining = count;
        loop {
            if remaining & 1 == 1 {
                power = power.mul_raw(&square, &work).0;
            }
            remaining >>= 1;
            if remaining == 0 {
                break;
            }
            square = square.mul_raw(&square, &work).0;
        }
        if negative {
            power = power.negate();
        }

        if n.is_negative() {
            return Self::one().div_raw(&power, ctx);
        }
        power.round_raw(ctx)
    }
}
