use num_bigint::{BigInt, BigUint};
use num_traits::Signed;
use serde_cbor::Value;

use crate::bigfloat::BigFloat;
use crate::cbor::{
    TAG_BIGFLOAT, TAG_BIGFLOAT_BIG_EXPONENT, TAG_DECIMAL_FRACTION,
    TAG_DECIMAL_FRACTION_BIG_EXPONENT, TAG_EXTENDED_BIGFLOAT, TAG_EXTENDED_DECIMAL_FRACTION,
    TAG_EXTENDED_RATIONAL, TAG_NEGATIVE_BIGNUM, TAG_POSITIVE_BIGNUM, TAG_RATIONAL,
    flags_to_options,
};
use crate::number::Number;
use crate::radix::Radix;
use crate::rational::Rational;

/// Tags used for one radix: plain, bignum exponent, extended.
struct FractionTags {
    plain: u64,
    big_exponent: u64,
    extended: u64,
}

const DECIMAL_TAGS: FractionTags = FractionTags {
    plain: TAG_DECIMAL_FRACTION,
    big_exponent: TAG_DECIMAL_FRACTION_BIG_EXPONENT,
    extended: TAG_EXTENDED_DECIMAL_FRACTION,
};

const BINARY_TAGS: FractionTags = FractionTags {
    plain: TAG_BIGFLOAT,
    big_exponent: TAG_BIGFLOAT_BIG_EXPONENT,
    extended: TAG_EXTENDED_BIGFLOAT,
};

impl Number {
    /// Encodes the value as a CBOR item that [`Number::from_cbor`] reads
    /// back to an equal value of the same kind.
    ///
    /// Finite values use the plain tags; negative zero, infinities and NaNs
    /// need the extended tags 268, 269 and 270.
    ///
    /// ```rust
    /// use numtower::{Decimal, Number};
    /// use serde_cbor::Value;
    ///
    /// let value = Number::from("-1.5".parse::<Decimal>().unwrap());
    /// let Value::Tag(tag, _) = value.to_cbor() else { panic!() };
    /// assert_eq!(tag, 4);
    ///
    /// let infinity = Number::from(Decimal::pos_infinity());
    /// let Value::Tag(tag, _) = infinity.to_cbor() else { panic!() };
    /// assert_eq!(tag, 268);
    /// ```
    pub fn to_cbor(&self) -> Value {
        match self {
            Number::Int64(value) => Value::Integer(i128::from(*value)),
            Number::Float64(value) => Value::Float(*value),
            Number::Integer(value) => integer(value),
            Number::Decimal(value) => fraction(value, &DECIMAL_TAGS),
            Number::BinaryFloat(value) => fraction(value, &BINARY_TAGS),
            Number::Rational(value) => rational(value),
        }
    }
}

/// Whether `value` fits the major types 0 and 1, `-2^64..2^64`.
fn fits_major_type(value: &BigInt) -> bool {
    value.bits() <= 64 || (value.is_negative() && (-value - 1u8).bits() <= 64)
}

fn integer(value: &BigInt) -> Value {
    if fits_major_type(value) {
        if let Ok(small) = i128::try_from(value) {
            return Value::Integer(small);
        }
    }
    let (tag, magnitude) = if value.is_negative() {
        (TAG_NEGATIVE_BIGNUM, (-value - 1u8).magnitude().clone())
    } else {
        (TAG_POSITIVE_BIGNUM, value.magnitude().clone())
    };
    Value::Tag(tag, Box::new(Value::Bytes(magnitude.to_bytes_be())))
}

fn unsigned(value: &BigUint) -> Value {
    integer(&BigInt::from(value.clone()))
}

fn fraction<R: Radix>(value: &BigFloat<R>, tags: &FractionTags) -> Value {
    let plain = value.is_finite() && !(value.is_zero() && value.is_negative());
    let exponent = value.exponent();
    if plain {
        let tag = if fits_major_type(exponent) {
            tags.plain
        } else {
            tags.big_exponent
        };
        let items = vec![integer(exponent), integer(&value.mantissa())];
        return Value::Tag(tag, Box::new(Value::Array(items)));
    }
    let items = vec![
        integer(exponent),
        unsigned(value.unsigned_mantissa()),
        Value::Integer(i128::from(flags_to_options(value.flags()))),
    ];
    Value::Tag(tags.extended, Box::new(Value::Array(items)))
}

fn rational(value: &Rational) -> Value {
    let plain = value.is_finite() && !(value.is_zero() && value.is_negative());
    if plain {
        let items = vec![integer(&value.numerator()), integer(value.denominator())];
        return Value::Tag(TAG_RATIONAL, Box::new(Value::Array(items)));
    }
    let items = vec![
        integer(value.unsigned_numerator()),
        integer(value.denominator()),
        Value::Integer(i128::from(flags_to_options(value.flags()))),
    ];
    Value::Tag(TAG_EXTENDED_RATIONAL, Box::new(Value::Array(items)))
}
