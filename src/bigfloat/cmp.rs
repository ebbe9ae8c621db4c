use std::cmp::Ordering;

use num_traits::{ToPrimitive, Zero};

use crate::bigfloat::{BigFloat, BinaryFloat, Decimal};
use crate::radix::{Radix, ShiftAccumulator};

impl<R: Radix> BigFloat<R> {
    /// Numeric comparison in which NaN is greater than every other value and
    /// equal to any NaN, and both zeros are equal.
    pub fn compare_to(&self, other: &Self) -> Ordering {
        match (self.is_nan(), other.is_nan()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            _ => {}
        }
        let sign = self.signum().cmp(&other.signum());
        if sign != Ordering::Equal || self.signum() == 0 {
            return sign;
        }
        let magnitude = self.compare_magnitude(other);
        if self.is_negative() {
            magnitude.reverse()
        } else {
            magnitude
        }
    }

    /// Compares absolute values of two non-NaN values.
    pub(crate) fn compare_magnitude(&self, other: &Self) -> Ordering {
        match (self.is_infinity(), other.is_infinity()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            _ => {}
        }
        match (self.mantissa.is_zero(), other.mantissa.is_zero()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
        let adjusted = self.adjusted_exponent().cmp(&other.adjusted_exponent());
        if adjusted != Ordering::Equal {
            return adjusted;
        }
        // same leading position: drop the longer significand's extra digits
        let (longer, shorter, flip) = if self.exponent < other.exponent {
            (self, other, false)
        } else {
            (other, self, true)
        };
        let mut acc = R::Accumulator::new(longer.mantissa.clone());
        acc.shift_right(super::shift_amount(&(&shorter.exponent - &longer.exponent)));
        let ordering = acc
            .shifted()
            .cmp(&shorter.mantissa)
            .then(if acc.is_inexact() {
                Ordering::Greater
            } else {
                Ordering::Equal
            });
        if flip { ordering.reverse() } else { ordering }
    }

    /// IEEE 754 total order: `-NaN < -sNaN < -∞ < … < -0 < +0 < … < +∞ < +sNaN < +NaN`.
    ///
    /// Equal values with different exponents order by exponent, so `1.00 < 1.0`.
    pub fn compare_to_total(&self, other: &Self) -> Ordering {
        match (self.is_negative(), other.is_negative()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (true, true) => self.compare_to_total_magnitude(other).reverse(),
            (false, false) => self.compare_to_total_magnitude(other),
        }
    }

    /// [`compare_to_total`](Self::compare_to_total) on absolute values.
    pub fn compare_to_total_magnitude(&self, other: &Self) -> Ordering {
        fn class<R: Radix>(x: &BigFloat<R>) -> u8 {
            if x.is_quiet_nan() {
                3
            } else if x.is_signaling_nan() {
                2
            } else if x.is_infinity() {
                1
            } else {
                0
            }
        }
        let ordering = class(self).cmp(&class(other));
        if ordering != Ordering::Equal {
            return ordering;
        }
        if self.is_nan() {
            return self.mantissa.cmp(&other.mantissa);
        }
        self.compare_magnitude(other)
            .then_with(|| self.exponent.cmp(&other.exponent))
    }

    pub fn max(&self, other: &Self) -> Self {
        self.pick(other, Ordering::Greater, Self::compare_to)
    }

    pub fn min(&self, other: &Self) -> Self {
        self.pick(other, Ordering::Less, Self::compare_to)
    }

    /// The operand with the greater absolute value.
    pub fn max_magnitude(&self, other: &Self) -> Self {
        self.pick(other, Ordering::Greater, Self::compare_magnitude)
    }

    pub fn min_magnitude(&self, other: &Self) -> Self {
        self.pick(other, Ordering::Less, Self::compare_magnitude)
    }

    /// A NaN operand loses to a number; ties fall back to the total order.
    fn pick(&self, other: &Self, wanted: Ordering, compare: fn(&Self, &Self) -> Ordering) -> Self {
        match (self.is_nan(), other.is_nan()) {
            (true, false) => return other.clone(),
            (_, true) => return self.clone(),
            _ => {}
        }
        let ordering = compare(self, other).then_with(|| self.compare_to_total(other));
        if ordering == wanted || ordering == Ordering::Equal {
            self.clone()
        } else {
            other.clone()
        }
    }
}

impl Decimal {
    /// Compares against a binary float without rounding either side.
    ///
    /// ```rust
    /// use std::cmp::Ordering;
    /// use numtower::{BinaryFloat, Decimal};
    ///
    /// let tenth: Decimal = "0.1".parse().unwrap();
    /// assert_eq!(tenth.compare_to_binary(&BinaryFloat::from_f64(0.1)), Ordering::Less);
    /// ```
    pub fn compare_to_binary(&self, other: &BinaryFloat) -> Ordering {
        match (self.is_nan(), other.is_nan()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            _ => {}
        }
        let sign = self.signum().cmp(&other.signum());
        if sign != Ordering::Equal || self.signum() == 0 {
            return sign;
        }
        let magnitude = match (self.is_infinity(), other.is_infinity()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self
                .estimate_binary_magnitude(other)
                .unwrap_or_else(|| self.compare_magnitude(&Decimal::from_binary(&other.abs()))),
        };
        if self.is_negative() {
            magnitude.reverse()
        } else {
            magnitude
        }
    }

    /// Orders two nonzero finite magnitudes from their leading positions
    /// alone when they are clearly apart.
    fn estimate_binary_magnitude(&self, other: &BinaryFloat) -> Option<Ordering> {
        let decimal = self.adjusted_exponent().to_f64()?;
        let binary = other.adjusted_exponent().to_f64()?;
        // self in [10^decimal, 10^(decimal + 1)), other in [2^binary, 2^(binary + 1))
        let slack = 2.0 + binary.abs() * 1e-12;
        let low = decimal * std::f64::consts::LOG2_10;
        let high = (decimal + 1.0) * std::f64::consts::LOG2_10;
        if low > binary + slack {
            Some(Ordering::Greater)
        } else if high < binary - slack {
            Some(Ordering::Less)
        } else {
            None
        }
    }
}

impl<R: Radix> PartialEq for BigFloat<R> {
    fn eq(&self, other: &Self) -> bool {
        !self.is_nan() && !other.is_nan() && self.compare_to(other) == Ordering::Equal
    }
}

impl<R: Radix> PartialOrd for BigFloat<R> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.is_nan() || other.is_nan() {
            return None;
        }
        Some(self.compare_to(other))
    }
}
