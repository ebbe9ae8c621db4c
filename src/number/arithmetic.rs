//! Mixed-kind arithmetic on [`Number`].
//!
//! Two `Int64` operands are computed in machine words and widen to
//! [`Number::Integer`] on overflow. Otherwise both operands are promoted to
//! the most general kind among them, in the order rational, decimal, binary
//! float (including `f64`), integer, and the operation runs exactly in that
//! representation. A division that does not terminate in the shared
//! representation falls back to an exact [`Rational`].

use std::ops::{Add, Div, Mul, Neg, Rem, Sub};

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{Signed, Zero};

use crate::bigfloat::{BinaryFloat, Decimal};
use crate::number::Number;
use crate::rational::Rational;

/// Both operands in the representation an operation runs in.
enum Promoted {
    Rational(Rational, Rational),
    Decimal(Decimal, Decimal),
    BinaryFloat(BinaryFloat, BinaryFloat),
    Integer(BigInt, BigInt),
}

impl Promoted {
    fn of(a: &Number, b: &Number) -> Self {
        let either = |f: fn(&Number) -> bool| f(a) || f(b);
        if either(|x| matches!(x, Number::Rational(_))) {
            return Promoted::Rational(a.to_rational(), b.to_rational());
        }
        if either(|x| matches!(x, Number::Decimal(_))) {
            return Promoted::Decimal(a.to_decimal(), b.to_decimal());
        }
        match (a.as_integer(), b.as_integer()) {
            (Some(x), Some(y)) => Promoted::Integer(x, y),
            _ => Promoted::BinaryFloat(a.to_binary_float(), b.to_binary_float()),
        }
    }
}

/// Quotient of an integer divided by zero, given the sign of the dividend.
fn divided_by_zero(dividend_sign: i32) -> Number {
    Number::Decimal(match dividend_sign {
        0 => Decimal::nan(),
        s if s < 0 => Decimal::neg_infinity(),
        _ => Decimal::pos_infinity(),
    })
}

fn exact_ratio(numerator: BigInt, denominator: BigInt) -> Number {
    Number::Rational(Rational::from_signed(BigRational::new(numerator, denominator), false))
}

impl Number {
    pub fn sum(&self, other: &Number) -> Number {
        if let (Number::Int64(a), Number::Int64(b)) = (self, other) {
            return a
                .checked_add(*b)
                .map_or_else(|| Number::Integer(BigInt::from(*a) + *b), Number::Int64);
        }
        match Promoted::of(self, other) {
            Promoted::Rational(a, b) => Number::Rational(a + b),
            Promoted::Decimal(a, b) => Number::Decimal(a + b),
            Promoted::BinaryFloat(a, b) => Number::BinaryFloat(a + b),
            Promoted::Integer(a, b) => Number::Integer(a + b),
        }
    }

    pub fn difference(&self, other: &Number) -> Number {
        if let (Number::Int64(a), Number::Int64(b)) = (self, other) {
            return a
                .checked_sub(*b)
                .map_or_else(|| Number::Integer(BigInt::from(*a) - *b), Number::Int64);
        }
        match Promoted::of(self, other) {
            Promoted::Rational(a, b) => Number::Rational(a - b),
            Promoted::Decimal(a, b) => Number::Decimal(a - b),
            Promoted::BinaryFloat(a, b) => Number::BinaryFloat(a - b),
            Promoted::Integer(a, b) => Number::Integer(a - b),
        }
    }

    pub fn product(&self, other: &Number) -> Number {
        if let (Number::Int64(a), Number::Int64(b)) = (self, other) {
            return a
                .checked_mul(*b)
                .map_or_else(|| Number::Integer(BigInt::from(*a) * *b), Number::Int64);
        }
        match Promoted::of(self, other) {
            Promoted::Rational(a, b) => Number::Rational(a * b),
            Promoted::Decimal(a, b) => Number::Decimal(a * b),
            Promoted::BinaryFloat(a, b) => Number::BinaryFloat(a * b),
            Promoted::Integer(a, b) => Number::Integer(a * b),
        }
    }

    /// Exact quotient.
    ///
    /// Integer division by zero gives a decimal NaN or signed infinity. A
    /// quotient of integers with a remainder, or of finite decimals or
    /// binary floats with no terminating expansion, becomes a [`Rational`].
    ///
    /// ```rust
    /// use numtower::{Number, NumberKind};
    ///
    /// let a: Number = "0.1".parse::<numtower::Decimal>().unwrap().into();
    /// let q = a.quotient(&Number::from(3));
    /// assert_eq!(q.kind(), NumberKind::Rational);
    /// assert_eq!(q.to_string(), "1/30");
    /// ```
    pub fn quotient(&self, other: &Number) -> Number {
        if let (Number::Int64(a), Number::Int64(b)) = (self, other) {
            let (a, b) = (*a, *b);
            if b == 0 {
                return divided_by_zero(a.signum() as i32);
            }
            if a == i64::MIN && b == -1 {
                return Number::Int64(a).negate();
            }
            return if a % b == 0 {
                Number::Int64(a / b)
            } else {
                exact_ratio(BigInt::from(a), BigInt::from(b))
            };
        }
        match Promoted::of(self, other) {
            Promoted::Rational(a, b) => Number::Rational(a / b),
            Promoted::Decimal(a, b) => {
                if a.is_zero() && b.is_zero() {
                    return Number::Decimal(Decimal::nan());
                }
                let quotient = &a / &b;
                if !a.is_finite() || !b.is_finite() || quotient.is_finite() {
                    return Number::Decimal(quotient);
                }
                Number::Rational(self.to_rational() / other.to_rational())
            }
            Promoted::BinaryFloat(a, b) => {
                if a.is_zero() && b.is_zero() {
                    return Number::Decimal(Decimal::nan());
                }
                let quotient = &a / &b;
                if !a.is_finite() || !b.is_finite() || quotient.is_finite() {
                    return Number::BinaryFloat(quotient);
                }
                Number::Rational(self.to_rational() / other.to_rational())
            }
            Promoted::Integer(a, b) => {
                if b.is_zero() {
                    return divided_by_zero(if a.is_zero() { 0 } else if a.is_negative() { -1 } else { 1 });
                }
                let (quotient, remainder) = a.div_rem(&b);
                if remainder.is_zero() {
                    Number::Integer(quotient)
                } else {
                    exact_ratio(a, b)
                }
            }
        }
    }

    /// Remainder of truncating division, with the sign of the dividend.
    /// An integer remainder by zero is a decimal NaN.
    pub fn remainder(&self, other: &Number) -> Number {
        if let (Number::Int64(a), Number::Int64(b)) = (self, other) {
            if *b == 0 {
                return Number::Decimal(Decimal::nan());
            }
            // only i64::MIN % -1 overflows, and its remainder is zero
            return Number::Int64(a.checked_rem(*b).unwrap_or(0));
        }
        match Promoted::of(self, other) {
            Promoted::Rational(a, b) => Number::Rational(a % b),
            Promoted::Decimal(a, b) => Number::Decimal(a % b),
            Promoted::BinaryFloat(a, b) => Number::BinaryFloat(a % b),
            Promoted::Integer(_, b) if b.is_zero() => Number::Decimal(Decimal::nan()),
            Promoted::Integer(a, b) => Number::Integer(a % b),
        }
    }
}

impl Neg for Number {
    type Output = Number;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

impl Neg for &Number {
    type Output = Number;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

macro_rules! number_binary_op {
    ($trait:ident, $method:ident, $exact:ident) => {
        impl $trait<&Number> for &Number {
            type Output = Number;

            fn $method(self, other: &Number) -> Self::Output {
                self.$exact(other)
            }
        }

        impl $trait for Number {
            type Output = Number;

            fn $method(self, other: Number) -> Self::Output {
                self.$exact(&other)
            }
        }

        impl $trait<&Number> for Number {
            type Output = Number;

            fn $method(self, other: &Number) -> Self::Output {
                self.$exact(other)
            }
        }
    };
}

number_binary_op!(Add, add, sum);
number_binary_op!(Sub, sub, difference);
number_binary_op!(Mul, mul, product);
number_binary_op!(Div, div, quotient);
number_binary_op!(Rem, rem, remainder);

#[cfg(test)]
mod tests {
    use rand::Rng;
    use rstest::rstest;

    use super::*;
    use crate::number::NumberKind;
    use crate::tests::*;

    fn dec(text: &str) -> Number {
        Number::Decimal(text.parse().unwrap())
    }

    fn ratio(text: &str) -> Number {
        Number::Rational(text.parse().unwrap())
    }

    fn big(value: i128) -> Number {
        Number::Integer(BigInt::from(value))
    }

    #[rstest]
    fn test_int64_overflow_widens(mut rng: impl Rng, n_experiments: usize) {
        for _ in 0..n_experiments {
            let a: i64 = rng.random();
            let b: i64 = rng.random();
            let (x, y) = (Number::from(a), Number::from(b));
            let (wide_a, wide_b) = (BigInt::from(a), BigInt::from(b));
            assert_eq!((&x + &y).to_integer().unwrap(), &wide_a + &wide_b);
            assert_eq!((&x - &y).to_integer().unwrap(), &wide_a - &wide_b);
            assert_eq!((&x * &y).to_integer().unwrap(), &wide_a * &wide_b);
            let kind = (&x + &y).kind();
            let expected = if a.checked_add(b).is_some() {
                NumberKind::Int64
            } else {
                NumberKind::Integer
            };
            assert_eq!(kind, expected);
        }
    }

    #[rstest]
    fn test_division_exactness(mut rng: impl Rng, n_experiments: usize) {
        for _ in 0..n_experiments {
            let a: i64 = if rng.random_bool(0.5) {
                rng.random()
            } else {
                rng.random_range(-1000..1000)
            }
            .max(i64::MIN + 1);
            let b: i64 = rng.random_range(-50i64..50).max(1) * if rng.random_bool(0.5) { 1 } else { -1 };
            let quotient = &Number::from(a) / &Number::from(b);
            if a % b == 0 {
                assert_eq!(quotient.kind(), NumberKind::Int64, "{a} / {b}");
                assert_eq!(quotient.to_i64().unwrap(), a / b);
            } else {
                assert_eq!(quotient.kind(), NumberKind::Rational, "{a} / {b}");
                let expected = Rational::new(BigInt::from(a), BigInt::from(b)).unwrap();
                assert_eq!(quotient.to_rational(), expected);
            }
        }
    }

    #[rstest]
    fn test_int64_division_edges() {
        let min = Number::from(i64::MIN);
        let quotient = &min / &Number::from(-1);
        assert_eq!(quotient.kind(), NumberKind::Integer);
        assert_eq!(quotient.to_string(), "9223372036854775808");
        assert_eq!((&min % &Number::from(-1)).to_string(), "0");

        let zero = Number::from(0);
        assert_eq!((&Number::from(5) / &zero).to_string(), "Infinity");
        assert_eq!((&Number::from(-5) / &zero).to_string(), "-Infinity");
        assert_eq!((&zero / &zero).to_string(), "NaN");
        assert_eq!((&zero / &zero).kind(), NumberKind::Decimal);
        assert_eq!((&Number::from(5) % &zero).to_string(), "NaN");
        assert_eq!((&Number::from(-7) % &Number::from(2)).to_string(), "-1");
    }

    #[rstest]
    #[case(Number::from(1), ratio("1/2"), "3/2", NumberKind::Rational)]
    #[case(dec("0.5"), ratio("1/3"), "5/6", NumberKind::Rational)]
    #[case(dec("1.5"), Number::from(2.25), "3.75", NumberKind::Decimal)]
    #[case(dec("1.5"), big(1 << 70), "1180591620717411303425.5", NumberKind::Decimal)]
    #[case(Number::from(0.5), Number::from(2), "2.5", NumberKind::BinaryFloat)]
    #[case(Number::from(0.5), Number::from(BinaryFloat::from_f64(0.25)), "0.75", NumberKind::BinaryFloat)]
    #[case(big(1 << 70), Number::from(1), "1180591620717411303425", NumberKind::Integer)]
    #[case(Number::from(i64::MAX), Number::from(i64::MAX), "18446744073709551614", NumberKind::Integer)]
    fn test_sum_promotion(
        #[case] a: Number,
        #[case] b: Number,
        #[case] expected: &str,
        #[case] kind: NumberKind,
    ) {
        let sum = &a + &b;
        assert_eq!(sum.to_string(), expected);
        assert_eq!(sum.kind(), kind);
        let reversed = &b + &a;
        assert_eq!(reversed.to_string(), expected);
    }

    #[rstest]
    fn test_product_and_difference() {
        assert_eq!((&Number::from(i64::MIN) * &Number::from(-1)).kind(), NumberKind::Integer);
        assert_eq!((&Number::from(-3) * &Number::from(4)).to_string(), "-12");
        assert_eq!((&Number::from(i64::MIN) - &Number::from(1)).to_string(), "-9223372036854775809");
        assert_eq!((&dec("1.25") * &Number::from(4)).to_string(), "5.00");
        assert_eq!((&dec("1.25") - &ratio("1/4")).to_string(), "1/1");
        assert_eq!((&Number::from(0.1) * &Number::from(10)).kind(), NumberKind::BinaryFloat);
        assert_eq!((&big(10) - &big(15)).to_string(), "-5");
    }

    #[rstest]
    fn test_float_division_falls_back_to_rational() {
        let third = &Number::from(1.0) / &Number::from(3);
        assert_eq!(third.kind(), NumberKind::Rational);
        assert_eq!(third.to_string(), "1/3");

        let half = &Number::from(1.0) / &Number::from(2);
        assert_eq!(half.kind(), NumberKind::BinaryFloat);
        assert_eq!(half.to_string(), "0.5");

        let tenth = &dec("1") / &Number::from(8);
        assert_eq!(tenth.kind(), NumberKind::Decimal);
        assert_eq!(tenth.to_string(), "0.125");

        let seventh = &dec("2.5") / &dec("7");
        assert_eq!(seventh.to_string(), "5/14");

        assert_eq!((&dec("0") / &Number::from(0.0)).to_string(), "NaN");
        assert_eq!((&Number::from(0.0) / &Number::from(0)).kind(), NumberKind::Decimal);
        assert!((&dec("Infinity") / &dec("3")).is_pos_infinity());
        assert!((&dec("NaN") / &dec("3")).is_nan());

        // a finite nonzero dividend over zero takes the exact route
        let infinite = &dec("-2") / &dec("0");
        assert_eq!(infinite.kind(), NumberKind::Rational);
        assert!(infinite.is_neg_infinity());
    }

    #[rstest]
    fn test_big_integer_division() {
        let a = big(3 << 80);
        assert_eq!((&a / &big(3)).kind(), NumberKind::Integer);
        assert_eq!((&a / &big(3)).to_string(), (BigInt::from(1) << 80u32).to_string());
        let ratio = &a / &big(9);
        assert_eq!(ratio.kind(), NumberKind::Rational);
        assert!((&a / &big(0)).is_pos_infinity());
        assert!((&big(0) / &big(0)).is_nan());
        assert!((&a % &big(0)).is_nan());
        assert_eq!((&big(-7) % &Number::from(2)).to_string(), "-1");
    }

    #[rstest]
    fn test_remainder() {
        assert_eq!((&dec("7.5") % &Number::from(2)).to_string(), "1.5");
        assert_eq!((&ratio("7/2") % &Number::from(1)).to_string(), "1/2");
        assert_eq!((&Number::from(-7.5) % &Number::from(2.0)).to_string(), "-1.5");
        assert!((&dec("1") % &dec("0")).is_nan());
    }
}
