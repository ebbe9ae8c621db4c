//! Per-kind capabilities of a [`Number`]: classification, narrowing and the
//! conversions used to promote operands to a shared representation.

use num_bigint::{BigInt, Sign};
use num_traits::{Signed, ToPrimitive, Zero};

use crate::bigfloat::{BinaryFloat, Decimal};
use crate::error::{NumberError, Result};
use crate::number::{Number, Signum};
use crate::rational::Rational;

impl Number {
    pub fn signum(&self) -> Signum {
        match self {
            Number::Int64(value) => Signum::of(value.signum() as i32),
            Number::Float64(value) if value.is_nan() => Signum::NaN,
            Number::Float64(value) if *value == 0.0 => Signum::Zero,
            Number::Float64(value) => Signum::of(if *value < 0.0 { -1 } else { 1 }),
            Number::Integer(value) => match value.sign() {
                Sign::Minus => Signum::Negative,
                Sign::NoSign => Signum::Zero,
                Sign::Plus => Signum::Positive,
            },
            Number::Decimal(value) if value.is_nan() => Signum::NaN,
            Number::Decimal(value) => Signum::of(value.signum()),
            Number::BinaryFloat(value) if value.is_nan() => Signum::NaN,
            Number::BinaryFloat(value) => Signum::of(value.signum()),
            Number::Rational(value) if value.is_nan() => Signum::NaN,
            Number::Rational(value) => Signum::of(value.signum()),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.signum() == Signum::Zero
    }

    /// Whether the value carries a negative sign, including negative zero and
    /// NaNs with the sign bit set.
    pub fn is_negative(&self) -> bool {
        match self {
            Number::Int64(value) => *value < 0,
            Number::Float64(value) => value.is_sign_negative(),
            Number::Integer(value) => value.is_negative(),
            Number::Decimal(value) => value.is_negative(),
            Number::BinaryFloat(value) => value.is_negative(),
            Number::Rational(value) => value.is_negative(),
        }
    }

    pub fn is_infinity(&self) -> bool {
        match self {
            Number::Int64(_) | Number::Integer(_) => false,
            Number::Float64(value) => value.is_infinite(),
            Number::Decimal(value) => value.is_infinity(),
            Number::BinaryFloat(value) => value.is_infinity(),
            Number::Rational(value) => value.is_infinity(),
        }
    }

    pub fn is_pos_infinity(&self) -> bool {
        self.is_infinity() && !self.is_negative()
    }

    pub fn is_neg_infinity(&self) -> bool {
        self.is_infinity() && self.is_negative()
    }

    pub fn is_nan(&self) -> bool {
        self.signum() == Signum::NaN
    }

    pub fn is_finite(&self) -> bool {
        !self.is_infinity() && !self.is_nan()
    }

    /// Whether the value is finite and has no fractional part.
    pub fn is_integer(&self) -> bool {
        match self {
            Number::Int64(_) | Number::Integer(_) => true,
            Number::Float64(value) => value.is_finite() && value.fract() == 0.0,
            Number::Decimal(value) => value.is_integer(),
            Number::BinaryFloat(value) => value.is_integer(),
            Number::Rational(value) => value.is_integer(),
        }
    }

    /// Whether the value is an integer in `[-2^63, 2^63)`.
    pub fn can_fit_in_i64(&self) -> bool {
        self.to_i64_if_exact().is_ok()
    }

    /// Whether the value is an integer in `[-2^31, 2^31)`.
    pub fn can_fit_in_i32(&self) -> bool {
        self.to_i64_if_exact()
            .is_ok_and(|value| i32::try_from(value).is_ok())
    }

    /// Converts to `i64`, discarding the fractional part.
    ///
    /// # Errors
    ///
    /// [`NumberError::NotFinite`] for infinity and NaN, and
    /// [`NumberError::Overflow`] when the truncated value does not fit.
    pub fn to_i64(&self) -> Result<i64> {
        match self {
            Number::Int64(value) => Ok(*value),
            Number::Float64(value) => BinaryFloat::from_f64(*value).to_i64_checked(),
            Number::Integer(value) => value.to_i64().ok_or(NumberError::Overflow),
            Number::Decimal(value) => value.to_i64_checked(),
            Number::BinaryFloat(value) => value.to_i64_checked(),
            Number::Rational(value) => value.to_integer()?.to_i64().ok_or(NumberError::Overflow),
        }
    }

    /// Converts to `i64` only when the value is an integer that fits.
    pub fn to_i64_if_exact(&self) -> Result<i64> {
        match self {
            Number::Int64(value) => Ok(*value),
            Number::Float64(value) => BinaryFloat::from_f64(*value).to_i64_if_exact(),
            Number::Integer(value) => value.to_i64().ok_or(NumberError::Overflow),
            Number::Decimal(value) => value.to_i64_if_exact(),
            Number::BinaryFloat(value) => value.to_i64_if_exact(),
            Number::Rational(value) => value
                .to_integer_if_exact()?
                .to_i64()
                .ok_or(NumberError::Overflow),
        }
    }

    pub fn to_i32(&self) -> Result<i32> {
        i32::try_from(self.to_i64()?).map_err(|_| NumberError::Overflow)
    }

    /// The integer part, truncated toward zero.
    ///
    /// # Errors
    ///
    /// [`NumberError::NotFinite`] for infinity and NaN.
    pub fn to_integer(&self) -> Result<BigInt> {
        match self {
            Number::Int64(value) => Ok(BigInt::from(*value)),
            Number::Float64(value) => BinaryFloat::from_f64(*value).to_integer(),
            Number::Integer(value) => Ok(value.clone()),
            Number::Decimal(value) => value.to_integer(),
            Number::BinaryFloat(value) => value.to_integer(),
            Number::Rational(value) => value.to_integer(),
        }
    }

    /// The value as an integer when it has no fractional part.
    ///
    /// # Errors
    ///
    /// [`NumberError::NotFinite`] for infinity and NaN, and
    /// [`NumberError::NotExact`] when the value has a fractional part.
    pub fn to_integer_if_exact(&self) -> Result<BigInt> {
        match self {
            Number::Int64(value) => Ok(BigInt::from(*value)),
            Number::Float64(value) => BinaryFloat::from_f64(*value).to_integer_if_exact(),
            Number::Integer(value) => Ok(value.clone()),
            Number::Decimal(value) => value.to_integer_if_exact(),
            Number::BinaryFloat(value) => value.to_integer_if_exact(),
            Number::Rational(value) => value.to_integer_if_exact(),
        }
    }

    /// The exact value for the two integer kinds, `None` for the others.
    pub(crate) fn as_integer(&self) -> Option<BigInt> {
        match self {
            Number::Int64(value) => Some(BigInt::from(*value)),
            Number::Integer(value) => Some(value.clone()),
            _ => None,
        }
    }

    /// The value as a decimal. Exact for every kind except a rational whose
    /// expansion does not terminate, which keeps 34 significant digits.
    pub fn to_decimal(&self) -> Decimal {
        match self {
            Number::Int64(value) => Decimal::from(*value),
            Number::Float64(value) => Decimal::from_f64(*value),
            Number::Integer(value) => Decimal::from(value),
            Number::Decimal(value) => value.clone(),
            Number::BinaryFloat(value) => value.to_decimal(),
            Number::Rational(value) => value.to_decimal(),
        }
    }

    /// The value as a binary float. Exact unless a decimal or rational has
    /// no terminating binary expansion.
    pub fn to_binary_float(&self) -> BinaryFloat {
        match self {
            Number::Int64(value) => BinaryFloat::from(*value),
            Number::Float64(value) => BinaryFloat::from_f64(*value),
            Number::Integer(value) => BinaryFloat::from(value),
            Number::Decimal(value) => value.to_binary_float(),
            Number::BinaryFloat(value) => value.clone(),
            Number::Rational(value) => value.to_binary_float(),
        }
    }

    /// The exact value as a rational.
    pub fn to_rational(&self) -> Rational {
        match self {
            Number::Int64(value) => Rational::from(*value),
            Number::Float64(value) => Rational::from_binary(&BinaryFloat::from_f64(*value)),
            Number::Integer(value) => Rational::from(value),
            Number::Decimal(value) => Rational::from_decimal(value),
            Number::BinaryFloat(value) => Rational::from_binary(value),
            Number::Rational(value) => value.clone(),
        }
    }

    /// The closest `f64`.
    pub fn to_f64(&self) -> f64 {
        match self {
            Number::Int64(value) => *value as f64,
            Number::Float64(value) => *value,
            Number::Integer(value) => BinaryFloat::from(value).to_f64(),
            Number::Decimal(value) => value.to_f64(),
            Number::BinaryFloat(value) => value.to_f64(),
            Number::Rational(value) => value.to_f64(),
        }
    }

    /// Flips the sign without changing the magnitude.
    ///
    /// Negating `i64::MIN` widens to [`Number::Integer`], and negating an
    /// integer zero gives a decimal negative zero, since the integer kinds
    /// cannot carry a signed zero.
    pub fn negate(&self) -> Self {
        match self {
            Number::Int64(0) => Number::Decimal(Decimal::negative_zero()),
            Number::Int64(i64::MIN) => Number::Integer(-BigInt::from(i64::MIN)),
            Number::Int64(value) => Number::Int64(-value),
            Number::Float64(value) => Number::Float64(-value),
            Number::Integer(value) if value.is_zero() => Number::Decimal(Decimal::negative_zero()),
            Number::Integer(value) => Number::Integer(-value),
            Number::Decimal(value) => Number::Decimal(value.negate()),
            Number::BinaryFloat(value) => Number::BinaryFloat(value.negate()),
            Number::Rational(value) => Number::Rational(value.negate()),
        }
    }

    pub fn abs(&self) -> Self {
        match self {
            Number::Int64(i64::MIN) => Number::Integer(-BigInt::from(i64::MIN)),
            Number::Int64(value) => Number::Int64(value.abs()),
            Number::Float64(value) => Number::Float64(value.abs()),
            Number::Integer(value) => Number::Integer(value.abs()),
            Number::Decimal(value) => Number::Decimal(value.abs()),
            Number::BinaryFloat(value) => Number::BinaryFloat(value.abs()),
            Number::Rational(value) => Number::Rational(value.abs()),
        }
    }
}

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

    #[rstest]
    #[case(Number::from(-3), Signum::Negative)]
    #[case(Number::from(0), Signum::Zero)]
    #[case(Number::from(-0.0), Signum::Zero)]
    #[case(Number::from(f64::NAN), Signum::NaN)]
    #[case(Number::from(f64::NEG_INFINITY), Signum::Negative)]
    #[case(Number::from(BigInt::from(-1) << 100u32), Signum::Negative)]
    #[case(dec("-0.00"), Signum::Zero)]
    #[case(dec("sNaN"), Signum::NaN)]
    #[case(Number::from(BinaryFloat::from_f64(2.5)), Signum::Positive)]
    #[case(ratio("-1/3"), Signum::Negative)]
    #[case(Number::Rational(Rational::nan()), Signum::NaN)]
    fn test_signum(#[case] value: Number, #[case] expected: Signum) {
        assert_eq!(value.signum(), expected);
    }

    #[rstest]
    fn test_classification() {
        assert!(Number::from(f64::INFINITY).is_pos_infinity());
        assert!(dec("-Infinity").is_neg_infinity());
        assert!(Number::Rational(Rational::pos_infinity()).is_infinity());
        assert!(!Number::from(i64::MAX).is_infinity());
        assert!(dec("NaN").is_nan());
        assert!(!dec("NaN").is_finite());
        assert!(Number::from(-0.0).is_negative());
        assert!(dec("12.000").is_integer());
        assert!(!ratio("1/2").is_integer());
    }

    #[rstest]
    #[case(Number::from(i64::MIN), true, false)]
    #[case(Number::from(3.0), true, true)]
    #[case(Number::from(3.5), false, false)]
    #[case(Number::from(9.3e18), false, false)]
    #[case(Number::from(-9.223372036854775808e18), true, false)]
    #[case(Number::from(f64::NAN), false, false)]
    #[case(Number::from(BigInt::from(1) << 63u32), false, false)]
    #[case(dec("2147483647.000"), true, true)]
    #[case(dec("2147483648"), true, false)]
    #[case(dec("1E+400"), false, false)]
    #[case(ratio("10/2"), true, true)]
    #[case(ratio("10/3"), false, false)]
    fn test_can_fit(#[case] value: Number, #[case] in_i64: bool, #[case] in_i32: bool) {
        assert_eq!(value.can_fit_in_i64(), in_i64, "{value}");
        assert_eq!(value.can_fit_in_i32(), in_i32, "{value}");
    }

    #[rstest]
    fn test_narrowing() {
        assert_eq!(Number::from(-7.9).to_i64().unwrap(), -7);
        assert_eq!(ratio("-7/2").to_i64().unwrap(), -3);
        assert_eq!(ratio("-7/2").to_i64_if_exact().unwrap_err(), NumberError::NotExact);
        assert_eq!(Number::from(f64::INFINITY).to_i64().unwrap_err(), NumberError::NotFinite);
        assert_eq!(dec("1E+30").to_i64().unwrap_err(), NumberError::Overflow);
        assert_eq!(Number::from(i64::MAX).to_i32().unwrap_err(), NumberError::Overflow);
        assert_eq!(dec("-12.5").to_integer().unwrap(), BigInt::from(-12));
        assert_eq!(dec("-12.5").to_integer_if_exact().unwrap_err(), NumberError::NotExact);
        assert_eq!(dec("NaN").to_integer().unwrap_err(), NumberError::NotFinite);
    }

    #[rstest]
    fn test_conversions_are_exact(mut rng: impl Rng, n_experiments: usize) {
        for _ in 0..n_experiments {
            let value = random_f64(&mut rng);
            let number = Number::from(value);
            assert_eq!(number.to_decimal().to_f64().to_bits(), value.to_bits());
            assert_eq!(number.to_binary_float().to_f64().to_bits(), value.to_bits());
            assert_eq!(number.to_rational().to_f64().to_bits(), value.to_bits());
            assert_eq!(number.to_f64().to_bits(), value.to_bits());
        }
        assert_eq!(ratio("1/3").to_decimal().to_string(), "0.3333333333333333333333333333333333");
        assert_eq!(dec("0.1").to_rational().to_string(), "1/10");
        assert_eq!(Number::from(i64::MIN).to_binary_float().to_f64(), i64::MIN as f64);
    }

    #[rstest]
    fn test_negate() {
        let negated = Number::from(i64::MIN).negate();
        assert_eq!(negated.kind(), NumberKind::Integer);
        assert_eq!(negated.to_integer().unwrap(), BigInt::from(1) << 63u32);

        let zero = Number::from(0).negate();
        assert_eq!(zero.kind(), NumberKind::Decimal);
        assert!(zero.is_negative() && zero.is_zero());
        let zero = Number::from(BigInt::zero()).negate();
        assert_eq!(zero.kind(), NumberKind::Decimal);
        assert!(zero.is_negative());

        assert_eq!(Number::from(5).negate().to_string(), "-5");
        assert_eq!(dec("1.50").negate().to_string(), "-1.50");
        assert_eq!(ratio("1/2").negate().to_string(), "-1/2");
        assert!(Number::from(0.0).negate().is_negative());
    }

    #[rstest]
    fn test_sign_laws(mut rng: impl Rng, n_experiments: usize) {
        for _ in 0..n_experiments {
            let values = [
                Number::from(rng.random::<i64>()),
                Number::from(random_f64(&mut rng)),
                Number::from(random_bigint(&mut rng, 100)),
                Number::from(Decimal::new(random_bigint(&mut rng, 60), BigInt::from(rng.random_range(-20i64..20)))),
                Number::from(BinaryFloat::from_f64(random_f64(&mut rng))),
                Number::from(Rational::new(random_bigint(&mut rng, 60), BigInt::from(rng.random_range(1i64..1000))).unwrap()),
            ];
            for value in values {
                let twice = value.negate().negate();
                assert_eq!(twice.compare_to(Some(&value)), std::cmp::Ordering::Equal, "{value}");
                assert!(matches!(value.abs().signum(), Signum::Zero | Signum::Positive), "{value}");
            }
        }
        let min = Number::from(i64::MIN).abs();
        assert_eq!(min.kind(), NumberKind::Integer);
        assert_eq!(min.to_string(), "9223372036854775808");
    }
}
