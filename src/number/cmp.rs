use std::cmp::Ordering;

use crate::number::{Number, Signum};

impl Number {
    /// Total order across all kinds: NaN is greater than every other value
    /// and equal to any NaN, both zeros are equal, and any value is greater
    /// than `None`.
    ///
    /// ```rust
    /// use std::cmp::Ordering;
    /// use numtower::{Decimal, Number};
    ///
    /// let half = Number::from("0.5".parse::<Decimal>().unwrap());
    /// assert_eq!(half.compare_to(Some(&Number::from(0.5))), Ordering::Equal);
    /// assert_eq!(Number::from(f64::NAN).compare_to(Some(&half)), Ordering::Greater);
    /// assert_eq!(half.compare_to(None), Ordering::Greater);
    /// ```
    pub fn compare_to(&self, other: Option<&Number>) -> Ordering {
        let Some(other) = other else {
            return Ordering::Greater;
        };
        match (self, other) {
            (Number::Int64(a), Number::Int64(b)) => return a.cmp(b),
            (Number::Float64(a), Number::Float64(b)) => {
                return match (a.is_nan(), b.is_nan()) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Greater,
                    (false, true) => Ordering::Less,
                    (false, false) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
                };
            }
            (Number::Integer(a), Number::Integer(b)) => return a.cmp(b),
            (Number::Decimal(a), Number::Decimal(b)) => return a.compare_to(b),
            (Number::BinaryFloat(a), Number::BinaryFloat(b)) => return a.compare_to(b),
            (Number::Rational(a), Number::Rational(b)) => return a.compare_to(b),
            _ => {}
        }

        let (sign, other_sign) = (self.signum(), other.signum());
        match (sign, other_sign) {
            (Signum::NaN, Signum::NaN) => return Ordering::Equal,
            (Signum::NaN, _) => return Ordering::Greater,
            (_, Signum::NaN) => return Ordering::Less,
            _ if sign != other_sign => return sign.cmp(&other_sign),
            _ => {}
        }
        self.compare_promoted(other)
    }

    /// Compares two non-NaN values of different kinds with the same sign in
    /// the most specific representation holding both exactly.
    fn compare_promoted(&self, other: &Number) -> Ordering {
        match (self, other) {
            (Number::Rational(a), Number::Decimal(b)) => a.compare_to_decimal(b),
            (Number::Rational(a), _) => a.compare_to_binary(&other.to_binary_float()),
            (Number::Decimal(a), Number::Rational(b)) => b.compare_to_decimal(a).reverse(),
            (_, Number::Rational(b)) => b.compare_to_binary(&self.to_binary_float()).reverse(),
            (Number::Decimal(a), Number::Float64(_) | Number::BinaryFloat(_)) => {
                a.compare_to_binary(&other.to_binary_float())
            }
            (Number::Float64(_) | Number::BinaryFloat(_), Number::Decimal(b)) => {
                b.compare_to_binary(&self.to_binary_float()).reverse()
            }
            (Number::Decimal(a), _) => a.compare_to(&other.to_decimal()),
            (_, Number::Decimal(b)) => self.to_decimal().compare_to(b),
            _ => match (self.as_integer(), other.as_integer()) {
                (Some(a), Some(b)) => a.cmp(&b),
                _ => self.to_binary_float().compare_to(&other.to_binary_float()),
            },
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.compare_to(Some(other)) == Ordering::Equal
    }
}

impl Eq for Number {}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare_to(Some(other))
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;
    use rand::Rng;
    use rstest::rstest;

    use super::*;
    use crate::bigfloat::{BinaryFloat, Decimal};
    use crate::rational::Rational;
    use crate::tests::*;

    fn dec(text: &str) -> Number {
        Number::Decimal(text.parse().unwrap())
    }

    fn ratio(text: &str) -> Number {
        Number::Rational(text.parse().unwrap())
    }

    /// The same value in every kind that can hold it.
    fn all_kinds(value: f64) -> Vec<Number> {
        let binary = BinaryFloat::from_f64(value);
        let mut kinds = vec![
            Number::from(value),
            Number::from(binary.clone()),
            Number::from(Decimal::from_binary(&binary)),
            Number::from(Rational::from_binary(&binary)),
        ];
        if value.is_finite() && value.fract() == 0.0 && value.abs() < 9e18 {
            kinds.push(Number::from(value as i64));
            kinds.push(Number::from(BigInt::from(value as i64)));
        }
        kinds
    }

    #[rstest]
    fn test_mixed_kind_equality() {
        for value in [0.0, -0.0, 1.0, -2.5, 0.1, 1e300, -7.0, f64::INFINITY, f64::NEG_INFINITY] {
            let kinds = all_kinds(value);
            for a in &kinds {
                for b in &kinds {
                    assert_eq!(a.compare_to(Some(b)), Ordering::Equal, "{a:?} vs {b:?}");
                }
            }
        }
        let nan = [
            Number::from(f64::NAN),
            dec("NaN"),
            Number::from(BinaryFloat::signaling_nan()),
            Number::Rational(Rational::nan()),
        ];
        for a in &nan {
            for b in &nan {
                assert_eq!(a, b);
            }
            assert!(a > &Number::from(f64::INFINITY));
            assert!(a > &dec("1E+1000000"));
        }
    }

    #[rstest]
    #[case(Number::from(1), dec("1.5"), Ordering::Less)]
    #[case(Number::from(-1), Number::from(0.5), Ordering::Less)]
    #[case(dec("0.1"), Number::from(0.1), Ordering::Less)]
    #[case(ratio("1/3"), dec("0.3333"), Ordering::Greater)]
    #[case(ratio("1/3"), Number::from(1.0 / 3.0), Ordering::Greater)]
    #[case(Number::from(BigInt::from(1) << 70u32), Number::from(1e21), Ordering::Greater)]
    #[case(Number::from(BigInt::from(1) << 70u32), Number::from(i64::MAX), Ordering::Greater)]
    #[case(dec("-1E+1000000"), Number::from(f64::MIN), Ordering::Less)]
    #[case(dec("1E+1000000"), Number::from(BigInt::from(1) << 200u32), Ordering::Greater)]
    #[case(Number::from(f64::NEG_INFINITY), ratio("-1000000/1"), Ordering::Less)]
    #[case(Number::from(0), dec("-0"), Ordering::Equal)]
    fn test_compare_to(#[case] a: Number, #[case] b: Number, #[case] expected: Ordering) {
        assert_eq!(a.compare_to(Some(&b)), expected, "{a} vs {b}");
        assert_eq!(b.compare_to(Some(&a)), expected.reverse(), "{b} vs {a}");
    }

    #[rstest]
    fn test_total_order_laws(mut rng: impl Rng, n_experiments: usize) {
        let mut values = vec![
            Number::from(f64::NAN),
            dec("sNaN"),
            Number::from(i64::MIN),
            Number::from(i64::MAX),
            dec("-0"),
        ];
        for _ in 0..12 {
            let value = if rng.random_bool(0.5) {
                (rng.random_range(-1000i64..1000) as f64) / 8.0
            } else {
                random_f64(&mut rng)
            };
            values.extend(all_kinds(value));
        }
        values.push(ratio("1/3"));
        values.push(ratio("-2/7"));
        for a in &values {
            for b in &values {
                assert_eq!(a.cmp(b), b.cmp(a).reverse(), "{a:?} vs {b:?}");
            }
        }
        for _ in 0..n_experiments {
            let a = &values[rng.random_range(0..values.len())];
            let b = &values[rng.random_range(0..values.len())];
            let c = &values[rng.random_range(0..values.len())];
            if a <= b && b <= c {
                assert!(a <= c, "{a:?} <= {b:?} <= {c:?}");
            }
        }
        let mut sorted = values.clone();
        sorted.sort();
        assert!(sorted.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(sorted.last().is_some_and(Number::is_nan));
    }
}
