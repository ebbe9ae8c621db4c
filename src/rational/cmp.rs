use std::cmp::Ordering;

use num_traits::{Signed, ToPrimitive};

use crate::bigfloat::{BigFloat, BinaryFloat, Decimal};
use crate::radix::Radix;
use crate::rational::Rational;

/// Orders NaN above everything else; `None` when neither side is NaN.
fn compare_nan(a: bool, b: bool) -> Option<Ordering> {
    match (a, b) {
        (true, true) => Some(Ordering::Equal),
        (true, false) => Some(Ordering::Greater),
        (false, true) => Some(Ordering::Less),
        (false, false) => None,
    }
}

impl Rational {
    /// Numeric comparison in which NaN is greater than every other value and
    /// equal to any NaN, and both zeros are equal.
    pub fn compare_to(&self, other: &Self) -> Ordering {
        if let Some(ordering) = compare_nan(self.is_nan(), other.is_nan()) {
            return ordering;
        }
        let sign = self.signum().cmp(&other.signum());
        if sign != Ordering::Equal || self.signum() == 0 {
            return sign;
        }
        let magnitude = match (self.is_infinity(), other.is_infinity()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.magnitude.cmp(&other.magnitude),
        };
        if self.is_negative() {
            magnitude.reverse()
        } else {
            magnitude
        }
    }

    /// Compares against a decimal or binary float without rounding either side.
    pub fn compare_to_float<R: Radix>(&self, other: &BigFloat<R>) -> Ordering {
        if let Some(ordering) = compare_nan(self.is_nan(), other.is_nan()) {
            return ordering;
        }
        let sign = self.signum().cmp(&other.signum());
        if sign != Ordering::Equal || self.signum() == 0 {
            return sign;
        }
        let magnitude = match (self.is_infinity(), other.is_infinity()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.estimate_magnitude(other).unwrap_or_else(|| {
                self.magnitude.cmp(&Rational::from_float(&other.abs()).magnitude)
            }),
        };
        if self.is_negative() {
            magnitude.reverse()
        } else {
            magnitude
        }
    }

    pub fn compare_to_decimal(&self, other: &Decimal) -> Ordering {
        self.compare_to_float(other)
    }

    pub fn compare_to_binary(&self, other: &BinaryFloat) -> Ordering {
        self.compare_to_float(other)
    }

    /// Decides the magnitude order from bit lengths alone when the two
    /// values are far apart, so a float with a huge exponent is never
    /// expanded into an integer.
    fn estimate_magnitude<R: Radix>(&self, other: &BigFloat<R>) -> Option<Ordering> {
        let adjusted = other.adjusted_exponent();
        let Some(adjusted) = adjusted.to_i64() else {
            return Some(if adjusted.is_positive() {
                Ordering::Less
            } else {
                Ordering::Greater
            });
        };
        let log2_radix = f64::from(R::RADIX).log2();
        // other lies in [R^adjusted, R^(adjusted + 1)), self in (2^(bits - 1), 2^(bits + 1))
        let low = adjusted as f64 * log2_radix;
        let high = (adjusted as f64 + 1.0) * log2_radix;
        let bits = self.magnitude.numer().bits() as f64 - self.magnitude.denom().bits() as f64;
        if low > bits + 2.0 {
            Some(Ordering::Less)
        } else if high < bits - 2.0 {
            Some(Ordering::Greater)
        } else {
            None
        }
    }
}

impl PartialEq for Rational {
    fn eq(&self, other: &Self) -> bool {
        !self.is_nan() && !other.is_nan() && self.compare_to(other) == Ordering::Equal
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.is_nan() || other.is_nan() {
            return None;
        }
        Some(self.compare_to(other))
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;
    use rstest::rstest;

    use super::*;
    use crate::tests::*;

    fn q(text: &str) -> Rational {
        text.parse().unwrap()
    }

    fn dec(text: &str) -> Decimal {
        text.parse().unwrap()
    }

    #[rstest]
    fn test_compare_to() {
        assert_eq!(q("1/3").compare_to(&q("1/2")), Ordering::Less);
        assert_eq!(q("-1/3").compare_to(&q("-1/2")), Ordering::Greater);
        assert_eq!(q("-0/1").compare_to(&q("0/1")), Ordering::Equal);
        assert_eq!(Rational::nan().compare_to(&Rational::pos_infinity()), Ordering::Greater);
        assert_eq!(Rational::nan().compare_to(&Rational::signaling_nan()), Ordering::Equal);
        assert_eq!(Rational::neg_infinity().compare_to(&q("-1000/1")), Ordering::Less);
        assert!(Rational::nan() != Rational::nan());
        assert_eq!(q("2/4"), q("1/2"));
        assert!(q("1/3") < q("1/2"));
    }

    #[rstest]
    #[case("3/4", "0.75", Ordering::Equal)]
    #[case("1/3", "0.3333", Ordering::Greater)]
    #[case("-1/3", "-0.3334", Ordering::Greater)]
    #[case("5/1", "1E+1000000", Ordering::Less)]
    #[case("-1/2", "-1E-1000000", Ordering::Less)]
    #[case("1/2", "-Infinity", Ordering::Greater)]
    #[case("1/2", "NaN", Ordering::Less)]
    #[case("0/1", "-0.000", Ordering::Equal)]
    fn test_compare_to_decimal(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
        assert_eq!(q(a).compare_to_decimal(&dec(b)), expected);
    }

    #[rstest]
    fn test_compare_to_binary(mut rng: impl Rng, n_experiments: usize) {
        for _ in 0..n_experiments {
            let a = random_f64(&mut rng);
            let b = random_f64(&mut rng);
            let rational = Rational::from_binary(&BinaryFloat::from_f64(a));
            let ordering = rational.compare_to_binary(&BinaryFloat::from_f64(b));
            assert_eq!(Some(ordering), a.partial_cmp(&b), "{a:e} vs {b:e}");
        }
    }
}
