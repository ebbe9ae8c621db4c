//! # Radix Support
//!
//! Digit-level helpers shared by the binary and decimal flavours of
//! [`BigFloat`](crate::bigfloat::BigFloat).
//!
//! A [`Radix`] knows how to count, strip and scale digits of an unsigned
//! significand, and names the [`ShiftAccumulator`] used when digits are
//! discarded during rounding. The accumulators keep a machine-word fast path
//! and fall back to `BigUint` once the significand outgrows 64 bits.

use std::fmt::Debug;
use std::hash::Hash;

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};

pub mod bits;
pub mod digits;

pub use bits::BitShiftAccumulator;
pub use digits::DigitShiftAccumulator;

/// Discards low-order digits of a non-negative integer while remembering
/// enough about them to round the result.
pub trait ShiftAccumulator: Sized {
    fn new(value: BigUint) -> Self;

    /// The value left after all shifts so far.
    fn shifted(&self) -> BigUint;

    /// The most significant of the digits discarded by the last shift.
    fn last_discarded(&self) -> u32;

    /// Whether any digit below [`last_discarded`](Self::last_discarded) was nonzero.
    fn older_discarded(&self) -> bool;

    /// Total number of digits discarded.
    fn discarded(&self) -> u64;

    /// Number of digits in the shifted value; zero has no digits.
    fn digit_length(&self) -> u64;

    fn shift_right(&mut self, digits: u64);

    fn shift_to_digits(&mut self, digits: u64) {
        let length = self.digit_length();
        if length > digits {
            self.shift_right(length - digits);
        }
    }

    fn is_inexact(&self) -> bool {
        self.last_discarded() != 0 || self.older_discarded()
    }
}

/// A positional base for significands.
pub trait Radix: Copy + Clone + Debug + Default + PartialEq + Eq + Hash + Send + Sync + 'static {
    const RADIX: u32;

    type Accumulator: ShiftAccumulator;

    /// Number of digits of `value` in this radix (zero for zero).
    fn digit_length(value: &BigUint) -> u64;

    /// `RADIX^exponent`
    fn power(exponent: u64) -> BigUint;

    /// `value * RADIX^digits`
    fn scale_up(value: &BigUint, digits: u64) -> BigUint {
        if digits == 0 || value.is_zero() {
            return value.clone();
        }
        value * Self::power(digits)
    }

    /// Number of trailing zero digits (zero for zero).
    fn trailing_zeros(value: &BigUint) -> u64;

    /// Writes `1/den` as `factor / RADIX^digits` when `den` has no prime
    /// factors other than those of the radix.
    fn exact_reciprocal(den: &BigUint) -> Option<(BigUint, u64)>;

    /// Removes up to `max` trailing zero digits, returning the shorter value
    /// and how many digits were removed.
    fn strip_trailing_zeros(value: &BigUint, max: u64) -> (BigUint, u64) {
        let count = Self::trailing_zeros(value).min(max);
        if count == 0 {
            return (value.clone(), 0);
        }
        let mut acc = Self::Accumulator::new(value.clone());
        acc.shift_right(count);
        (acc.shifted(), count)
    }
}

/// Base two: significands are shifted with bit operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Base2;

/// Base ten: significands are shifted by powers of ten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Base10;

impl Radix for Base2 {
    const RADIX: u32 = 2;

    type Accumulator = BitShiftAccumulator;

    fn digit_length(value: &BigUint) -> u64 {
        value.bits()
    }

    fn power(exponent: u64) -> BigUint {
        BigUint::one() << exponent
    }

    fn scale_up(value: &BigUint, digits: u64) -> BigUint {
        value << digits
    }

    fn trailing_zeros(value: &BigUint) -> u64 {
        value.trailing_zeros().unwrap_or(0)
    }

    fn exact_reciprocal(den: &BigUint) -> Option<(BigUint, u64)> {
        let twos = Self::trailing_zeros(den);
        if (den >> twos).is_one() {
            Some((BigUint::one(), twos))
        } else {
            None
        }
    }
}

impl Radix for Base10 {
    const RADIX: u32 = 10;

    type Accumulator = DigitShiftAccumulator;

    fn digit_length(value: &BigUint) -> u64 {
        decimal_digits(value)
    }

    fn power(exponent: u64) -> BigUint {
        num_traits::pow(BigUint::from(10u8), exponent as usize)
    }

    fn trailing_zeros(value: &BigUint) -> u64 {
        if value.is_zero() {
            return 0;
        }
        let ten = BigUint::from(10u8);
        let mut count = 0;
        let mut rest = value.clone();
        loop {
            let (quotient, remainder) = rest.div_rem(&ten);
            if !remainder.is_zero() {
                return count;
            }
            rest = quotient;
            count += 1;
        }
    }

    fn exact_reciprocal(den: &BigUint) -> Option<(BigUint, u64)> {
        let twos = den.trailing_zeros().unwrap_or(0);
        let mut rest = den >> twos;
        let five = BigUint::from(5u8);
        let mut fives = 0u64;
        loop {
            let (quotient, remainder) = rest.div_rem(&five);
            if !remainder.is_zero() {
                break;
            }
            rest = quotient;
            fives += 1;
        }
        if !rest.is_one() {
            return None;
        }
        // 1 / (2^a 5^b) = 2^(k-a) 5^(k-b) / 10^k
        let digits = twos.max(fives);
        let factor = (BigUint::one() << (digits - twos))
            * num_traits::pow(five, (digits - fives) as usize);
        Some((factor, digits))
    }
}

/// Decimal digit count without formatting the number.
pub(crate) fn decimal_digits(value: &BigUint) -> u64 {
    if let Some(word) = value.to_u64() {
        return word_decimal_digits(word);
    }
    // value lies in [2^(bits-1), 2^bits), so the estimate is at most one short
    let estimate = ((value.bits() - 1) as f64 * std::f64::consts::LOG10_2) as u64 + 1;
    if *value >= Base10::power(estimate) {
        estimate + 1
    } else {
        estimate
    }
}

pub(crate) fn word_decimal_digits(word: u64) -> u64 {
    if word == 0 {
        0
    } else {
        u64::from(word.ilog10()) + 1
    }
}
