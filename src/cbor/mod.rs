//! # CBOR numbers
//!
//! Recognizes the CBOR items that carry a number: plain integers and floats,
//! bignums (tags 2 and 3), decimal fractions and bigfloats (tags 4 and 5,
//! 264 and 265 with a bignum exponent, 268 and 269 with an options item) and
//! rationals (tags 30 and 270).
//!
//! One validation pass serves both [`Number::is_cbor_number`] and
//! [`Number::from_cbor`], so the predicate accepts exactly the items the
//! constructor builds. A malformed item is not a number; it never raises an
//! error.
//!
//! ```rust
//! use numtower::Number;
//! use serde_cbor::Value;
//!
//! let item = Value::Tag(3, Box::new(Value::Bytes(vec![0x01, 0x00])));
//! assert_eq!(Number::from_cbor(&item).unwrap().to_string(), "-257");
//!
//! let item = Value::Tag(30, Box::new(Value::Array(vec![Value::Integer(3), Value::Integer(4)])));
//! assert!(Number::is_cbor_number(&item));
//! assert_eq!(Number::from_cbor(&item).unwrap().to_string(), "3/4");
//!
//! let nested = Value::Tag(4, Box::new(item));
//! assert!(!Number::is_cbor_number(&nested));
//! assert!(Number::from_cbor(&nested).is_none());
//! ```

use num_bigint::{BigInt, BigUint};
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use serde_cbor::Value;
use tracing::trace;

use crate::bigfloat::{BigFloat, Flags};
use crate::number::Number;
use crate::radix::{Base2, Base10, Radix};
use crate::rational::Rational;

pub mod encode;

pub const TAG_POSITIVE_BIGNUM: u64 = 2;
pub const TAG_NEGATIVE_BIGNUM: u64 = 3;
pub const TAG_DECIMAL_FRACTION: u64 = 4;
pub const TAG_BIGFLOAT: u64 = 5;
pub const TAG_RATIONAL: u64 = 30;
pub const TAG_DECIMAL_FRACTION_BIG_EXPONENT: u64 = 264;
pub const TAG_BIGFLOAT_BIG_EXPONENT: u64 = 265;
pub const TAG_EXTENDED_DECIMAL_FRACTION: u64 = 268;
pub const TAG_EXTENDED_BIGFLOAT: u64 = 269;
pub const TAG_EXTENDED_RATIONAL: u64 = 270;

/// A number item that passed validation, not yet built.
enum Parts {
    Integer(BigInt),
    Float(f64),
    Fraction {
        decimal: bool,
        exponent: BigInt,
        mantissa: BigInt,
        options: Option<Flags>,
    },
    Rational {
        numerator: BigInt,
        denominator: BigInt,
        options: Option<Flags>,
    },
}

impl Number {
    /// Whether `value` is a well-formed number item.
    pub fn is_cbor_number(value: &Value) -> bool {
        validate(value).is_some()
    }

    /// The number carried by `value`, or `None` when it is not a
    /// well-formed number item.
    pub fn from_cbor(value: &Value) -> Option<Number> {
        validate(value).map(Parts::into_number)
    }
}

impl Parts {
    fn into_number(self) -> Number {
        match self {
            Parts::Integer(value) => Number::from_integer(value),
            Parts::Float(value) => Number::Float64(value),
            Parts::Fraction {
                decimal: true,
                exponent,
                mantissa,
                options,
            } => Number::Decimal(fraction::<Base10>(exponent, mantissa, options)),
            Parts::Fraction {
                decimal: false,
                exponent,
                mantissa,
                options,
            } => Number::BinaryFloat(fraction::<Base2>(exponent, mantissa, options)),
            Parts::Rational {
                numerator,
                denominator,
                options,
            } => Number::Rational(rational(numerator, denominator, options)),
        }
    }
}

fn fraction<R: Radix>(exponent: BigInt, mantissa: BigInt, options: Option<Flags>) -> BigFloat<R> {
    match options {
        None => BigFloat::new(mantissa, exponent),
        Some(flags) => BigFloat::with_flags(mantissa.into_parts().1, exponent, flags),
    }
}

fn rational(numerator: BigInt, denominator: BigInt, options: Option<Flags>) -> Rational {
    let flags = options.unwrap_or_else(Flags::empty);
    if flags.contains(Flags::INFINITY) {
        return Rational::infinity(flags.contains(Flags::NEGATIVE));
    }
    if flags.intersects(Flags::NAN) {
        return Rational::special(flags, numerator.into_parts().1);
    }
    let value = Rational::from_signed(BigRational::new(numerator, denominator), false);
    if flags.contains(Flags::NEGATIVE) {
        value.negate()
    } else {
        value
    }
}

/// Sign and special-value flags for the options item of an extended tag:
/// bit 0 is the sign, and the upper bits select finite, infinity, quiet NaN
/// or signaling NaN.
fn options_to_flags(code: u8) -> Option<Flags> {
    let sign = if code & 1 == 1 {
        Flags::NEGATIVE
    } else {
        Flags::empty()
    };
    let class = match code >> 1 {
        0 => Flags::empty(),
        1 => Flags::INFINITY,
        2 => Flags::QUIET_NAN,
        3 => Flags::SIGNALING_NAN,
        _ => return None,
    };
    Some(sign | class)
}

fn flags_to_options(flags: Flags) -> u8 {
    let class = if flags.contains(Flags::SIGNALING_NAN) {
        3
    } else if flags.contains(Flags::QUIET_NAN) {
        2
    } else if flags.contains(Flags::INFINITY) {
        1
    } else {
        0
    };
    class << 1 | u8::from(flags.contains(Flags::NEGATIVE))
}

fn validate(value: &Value) -> Option<Parts> {
    match value {
        Value::Integer(value) => Some(Parts::Integer(BigInt::from(*value))),
        Value::Float(value) => Some(Parts::Float(*value)),
        Value::Tag(tag, inner) => validate_tagged(*tag, inner),
        _ => {
            trace!("untagged item is neither an integer nor a float");
            None
        }
    }
}

fn validate_tagged(tag: u64, inner: &Value) -> Option<Parts> {
    if let Value::Tag(..) = inner {
        trace!(tag, "number item carries more than one tag");
        return None;
    }
    match tag {
        TAG_POSITIVE_BIGNUM | TAG_NEGATIVE_BIGNUM => bignum(tag, inner).map(Parts::Integer),
        TAG_DECIMAL_FRACTION
        | TAG_BIGFLOAT
        | TAG_DECIMAL_FRACTION_BIG_EXPONENT
        | TAG_BIGFLOAT_BIG_EXPONENT
        | TAG_EXTENDED_DECIMAL_FRACTION
        | TAG_EXTENDED_BIGFLOAT => validate_fraction(tag, inner),
        TAG_RATIONAL | TAG_EXTENDED_RATIONAL => validate_rational(tag, inner),
        _ => {
            trace!(tag, "tag does not denote a number");
            None
        }
    }
}

/// Decodes a bignum byte string. The negative tag stores `-1 - n`.
fn bignum(tag: u64, inner: &Value) -> Option<BigInt> {
    let Value::Bytes(bytes) = inner else {
        trace!(tag, "bignum is not a byte string");
        return None;
    };
    let negative = tag == TAG_NEGATIVE_BIGNUM;
    if bytes.len() <= 7 {
        let magnitude = bytes
            .iter()
            .fold(0i64, |acc, &byte| acc << 8 | i64::from(byte));
        return Some(BigInt::from(if negative { -magnitude - 1 } else { magnitude }));
    }
    let magnitude = BigInt::from(BigUint::from_bytes_be(bytes));
    Some(if negative { -magnitude - 1 } else { magnitude })
}

fn integer_or_bignum(value: &Value) -> Option<BigInt> {
    match value {
        Value::Integer(value) => Some(BigInt::from(*value)),
        Value::Tag(tag @ (TAG_POSITIVE_BIGNUM | TAG_NEGATIVE_BIGNUM), inner) => bignum(*tag, inner),
        _ => None,
    }
}

fn untagged_integer(value: &Value) -> Option<BigInt> {
    match value {
        Value::Integer(value) => Some(BigInt::from(*value)),
        _ => None,
    }
}

fn options(tag: u64, value: &Value) -> Option<Flags> {
    let Value::Integer(code) = value else {
        trace!(tag, "options item is not an integer");
        return None;
    };
    let flags = u8::try_from(*code).ok().and_then(options_to_flags);
    if flags.is_none() {
        trace!(tag, code = *code as i64, "options item is out of range");
    }
    flags
}

/// Splits an array into its two required items plus the options item of an
/// extended tag.
fn items(tag: u64, inner: &Value, extended: bool) -> Option<(&Value, &Value, Option<&Value>)> {
    let Value::Array(items) = inner else {
        trace!(tag, "number item is not an array");
        return None;
    };
    match (items.as_slice(), extended) {
        ([first, second], false) => Some((first, second, None)),
        ([first, second, third], true) => Some((first, second, Some(third))),
        _ => {
            trace!(tag, len = items.len(), "number array has the wrong length");
            None
        }
    }
}

fn validate_fraction(tag: u64, inner: &Value) -> Option<Parts> {
    let extended = matches!(tag, TAG_EXTENDED_DECIMAL_FRACTION | TAG_EXTENDED_BIGFLOAT);
    let (exponent, mantissa, options_item) = items(tag, inner, extended)?;
    let exponent = if matches!(tag, TAG_DECIMAL_FRACTION | TAG_BIGFLOAT) {
        untagged_integer(exponent)
    } else {
        integer_or_bignum(exponent)
    };
    let Some(exponent) = exponent else {
        trace!(tag, "exponent is not an integer");
        return None;
    };
    let Some(mantissa) = integer_or_bignum(mantissa) else {
        trace!(tag, "mantissa is not an integer");
        return None;
    };
    let options = match options_item {
        Some(item) => {
            let flags = options(tag, item)?;
            if mantissa.is_negative() {
                trace!(tag, "extended mantissa is negative");
                return None;
            }
            let valid = if flags.contains(Flags::INFINITY) {
                exponent.is_zero() && mantissa.is_zero()
            } else if flags.intersects(Flags::NAN) {
                exponent.is_zero()
            } else {
                true
            };
            if !valid {
                trace!(tag, "special value carries a nonzero exponent or mantissa");
                return None;
            }
            Some(flags)
        }
        None => None,
    };
    Some(Parts::Fraction {
        decimal: matches!(
            tag,
            TAG_DECIMAL_FRACTION | TAG_DECIMAL_FRACTION_BIG_EXPONENT | TAG_EXTENDED_DECIMAL_FRACTION
        ),
        exponent,
        mantissa,
        options,
    })
}

fn validate_rational(tag: u64, inner: &Value) -> Option<Parts> {
    let (numerator, denominator, options_item) = items(tag, inner, tag == TAG_EXTENDED_RATIONAL)?;
    let Some(numerator) = integer_or_bignum(numerator) else {
        trace!(tag, "numerator is not an integer");
        return None;
    };
    let Some(denominator) = integer_or_bignum(denominator) else {
        trace!(tag, "denominator is not an integer");
        return None;
    };
    if !denominator.is_positive() {
        trace!(tag, "denominator is zero or negative");
        return None;
    }
    let options = match options_item {
        Some(item) => {
            let flags = options(tag, item)?;
            if numerator.is_negative() {
                trace!(tag, "extended numerator is negative");
                return None;
            }
            let valid = if flags.contains(Flags::INFINITY) {
                numerator.is_zero() && denominator.is_one()
            } else if flags.intersects(Flags::NAN) {
                denominator.is_one()
            } else {
                true
            };
            if !valid {
                trace!(tag, "special value carries a fraction");
                return None;
            }
            Some(flags)
        }
        None => None,
    };
    Some(Parts::Rational {
        numerator,
        denominator,
        options,
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::bigfloat::{BinaryFloat, Decimal};
    use crate::number::NumberKind;

    fn int(value: i128) -> Value {
        Value::Integer(value)
    }

    fn tagged(tag: u64, value: Value) -> Value {
        Value::Tag(tag, Box::new(value))
    }

    fn array(items: Vec<Value>) -> Value {
        Value::Array(items)
    }

    fn decode(value: &Value) -> Option<Number> {
        let number = Number::from_cbor(value);
        assert_eq!(Number::is_cbor_number(value), number.is_some(), "{value:?}");
        number
    }

    #[rstest]
    #[case(int(5), "5", NumberKind::Int64)]
    #[case(int(-1 - (1 << 64) + 1), "-18446744073709551616", NumberKind::Integer)]
    #[case(Value::Float(1.5), "1.5", NumberKind::Float64)]
    #[case(tagged(3, Value::Bytes(vec![0x01, 0x00])), "-257", NumberKind::Int64)]
    #[case(tagged(2, Value::Bytes(vec![])), "0", NumberKind::Int64)]
    #[case(tagged(3, Value::Bytes(vec![])), "-1", NumberKind::Int64)]
    #[case(tagged(2, Value::Bytes(vec![0xff; 7])), "72057594037927935", NumberKind::Int64)]
    #[case(tagged(2, Value::Bytes(vec![0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff])), "9223372036854775807", NumberKind::Int64)]
    #[case(tagged(2, Value::Bytes(vec![0x80, 0, 0, 0, 0, 0, 0, 0])), "9223372036854775808", NumberKind::Integer)]
    #[case(tagged(3, Value::Bytes(vec![0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff])), "-9223372036854775808", NumberKind::Int64)]
    #[case(tagged(3, Value::Bytes(vec![0xff; 9])), "-4722366482869645213696", NumberKind::Integer)]
    fn test_integers(#[case] item: Value, #[case] expected: &str, #[case] kind: NumberKind) {
        let number = decode(&item).unwrap();
        assert_eq!(number.to_string(), expected);
        assert_eq!(number.kind(), kind);
    }

    #[rstest]
    #[case(tagged(4, array(vec![int(-2), int(27315)])), "273.15", NumberKind::Decimal)]
    #[case(tagged(5, array(vec![int(-1), int(3)])), "1.5", NumberKind::BinaryFloat)]
    #[case(tagged(264, array(vec![tagged(3, Value::Bytes(vec![0x02])), int(15)])), "0.015", NumberKind::Decimal)]
    #[case(tagged(265, array(vec![int(2), tagged(2, Value::Bytes(vec![0x01, 0x00]))])), "1024", NumberKind::BinaryFloat)]
    #[case(tagged(30, array(vec![int(3), int(4)])), "3/4", NumberKind::Rational)]
    #[case(tagged(30, array(vec![int(-6), int(4)])), "-3/2", NumberKind::Rational)]
    #[case(tagged(268, array(vec![int(0), int(0), int(2)])), "Infinity", NumberKind::Decimal)]
    #[case(tagged(269, array(vec![int(0), int(0), int(3)])), "-Infinity", NumberKind::BinaryFloat)]
    #[case(tagged(268, array(vec![int(-1), int(15), int(1)])), "-1.5", NumberKind::Decimal)]
    #[case(tagged(268, array(vec![int(0), int(0), int(1)])), "-0", NumberKind::Decimal)]
    #[case(tagged(268, array(vec![int(0), int(9), int(6)])), "sNaN9", NumberKind::Decimal)]
    #[case(tagged(270, array(vec![int(1), int(3), int(1)])), "-1/3", NumberKind::Rational)]
    #[case(tagged(270, array(vec![int(0), int(1), int(3)])), "-Infinity", NumberKind::Rational)]
    fn test_fractions(#[case] item: Value, #[case] expected: &str, #[case] kind: NumberKind) {
        let number = decode(&item).unwrap();
        assert_eq!(number.to_string(), expected);
        assert_eq!(number.kind(), kind);
    }

    #[rstest]
    fn test_extended_rational_nan() {
        let item = tagged(270, array(vec![int(5), int(1), int(5)]));
        let Some(Number::Rational(nan)) = decode(&item) else {
            panic!("expected a rational NaN");
        };
        assert!(nan.is_nan());
        assert!(nan.is_negative());
        assert!(nan.is_quiet_nan());
        assert_eq!(nan.unsigned_numerator(), &BigInt::from(5));

        let item = tagged(270, array(vec![int(5), int(1), int(7)]));
        let Some(Number::Rational(nan)) = decode(&item) else {
            panic!("expected a rational NaN");
        };
        assert!(nan.is_signaling_nan() && nan.is_negative());
    }

    #[rstest]
    #[case(tagged(4, array(vec![int(1), int(2), int(3), int(4)])))]
    #[case(tagged(30, array(vec![int(1), int(2), int(3), int(4)])))]
    #[case(tagged(4, array(vec![int(1)])))]
    #[case(tagged(4, array(vec![int(1), int(2), int(0)])))]
    #[case(tagged(268, array(vec![int(1), int(2)])))]
    #[case(tagged(4, array(vec![tagged(2, Value::Bytes(vec![1])), int(2)])))]
    #[case(tagged(4, array(vec![int(1), Value::Float(2.0)])))]
    #[case(tagged(4, int(1)))]
    #[case(tagged(2, int(1)))]
    #[case(tagged(2, tagged(2, Value::Bytes(vec![1]))))]
    #[case(tagged(30, array(vec![int(1), int(0)])))]
    #[case(tagged(30, array(vec![int(1), int(-2)])))]
    #[case(tagged(268, array(vec![int(0), int(-5), int(0)])))]
    #[case(tagged(268, array(vec![int(0), int(1), int(2)])))]
    #[case(tagged(268, array(vec![int(1), int(0), int(3)])))]
    #[case(tagged(268, array(vec![int(1), int(5), int(4)])))]
    #[case(tagged(268, array(vec![int(0), int(0), int(8)])))]
    #[case(tagged(268, array(vec![int(0), int(0), int(-1)])))]
    #[case(tagged(268, array(vec![int(0), int(0), Value::Float(1.0)])))]
    #[case(tagged(270, array(vec![int(-1), int(2), int(0)])))]
    #[case(tagged(270, array(vec![int(1), int(2), int(2)])))]
    #[case(tagged(270, array(vec![int(3), int(2), int(4)])))]
    #[case(tagged(31, array(vec![int(3), int(4)])))]
    #[case(Value::Text("12".to_string()))]
    #[case(Value::Null)]
    fn test_rejects_malformed(#[case] item: Value) {
        assert!(decode(&item).is_none(), "{item:?}");
    }

    #[rstest]
    fn test_options_round_trip() {
        for code in 0..8u8 {
            let flags = options_to_flags(code).unwrap();
            assert_eq!(flags_to_options(flags), code);
        }
        assert!(options_to_flags(8).is_none());
    }

    #[rstest]
    fn test_plain_fraction_keeps_exponent() {
        let item = tagged(4, array(vec![int(3), int(-12)]));
        let Some(Number::Decimal(value)) = decode(&item) else {
            panic!("expected a decimal");
        };
        assert_eq!(value.exponent(), &BigInt::from(3));
        assert_eq!(value.mantissa(), BigInt::from(-12));
        let item = tagged(5, array(vec![int(-1074), int(1)]));
        let Some(Number::BinaryFloat(value)) = decode(&item) else {
            panic!("expected a binary float");
        };
        assert_eq!(value.to_f64(), 5e-324);
        assert_eq!(Decimal::from_binary(&value).to_f64(), 5e-324);
        assert!(BinaryFloat::from_f64(5e-324) == value);
    }
}
