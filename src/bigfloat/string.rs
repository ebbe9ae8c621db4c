//! # Text Conversion
//!
//! Decimal values print in scientific notation when the exponent is positive
//! or the value is very small, and in plain notation otherwise:
//! `123.45`, `1.2E+3`, `1E-7`, `-Infinity`, `NaN12`, `sNaN`. Binary floats
//! print their exact decimal expansion the same way, or the shortest decimal
//! that rounds back to them under a context.

use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::str::FromStr;

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::bigfloat::{BigFloat, Decimal, Flags, truncate_payload};
use crate::context::{Context, Flagged, Signals};
use crate::error::{NumberError, Result};
use crate::radix::{Base2, Base10, DigitShiftAccumulator, ShiftAccumulator};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Notation {
    Scientific,
    Engineering,
    Plain,
}

fn write_special(out: &mut String, flags: Flags, payload: &BigUint) {
    if flags.contains(Flags::INFINITY) {
        out.push_str("Infinity");
        return;
    }
    out.push_str(if flags.contains(Flags::SIGNALING_NAN) {
        "sNaN"
    } else {
        "NaN"
    });
    if !payload.is_zero() {
        out.push_str(&payload.to_string());
    }
}

/// Places a decimal point `fraction` digits from the right of `digits`.
fn with_point(digits: &str, fraction: usize) -> String {
    if fraction == 0 {
        return digits.to_string();
    }
    if digits.len() > fraction {
        let (integer, rest) = digits.split_at(digits.len() - fraction);
        format!("{integer}.{rest}")
    } else {
        format!("0.{}{digits}", "0".repeat(fraction - digits.len()))
    }
}

fn push_exponent(out: &mut String, exponent: &BigInt) {
    out.push('E');
    if !exponent.is_negative() {
        out.push('+');
    }
    out.push_str(&exponent.to_string());
}

fn format_decimal(value: &Decimal, notation: Notation) -> String {
    let mut out = String::new();
    if value.is_negative() {
        out.push('-');
    }
    if value.is_special() {
        write_special(&mut out, value.flags, &value.mantissa);
        return out;
    }

    let digits = value.mantissa.to_string();
    let exponent = &value.exponent;
    if notation == Notation::Plain {
        if !exponent.is_negative() {
            out.push_str(&digits);
            if !value.mantissa.is_zero() {
                let zeros = exponent.to_usize().unwrap_or(0);
                out.push_str(&"0".repeat(zeros));
            }
        } else {
            let fraction = (-exponent).to_usize().unwrap_or(usize::MAX);
            out.push_str(&with_point(&digits, fraction));
        }
        return out;
    }

    let adjusted = exponent + BigInt::from(digits.len() - 1);
    if !exponent.is_positive() && adjusted >= BigInt::from(-6) {
        let fraction = (-exponent).to_usize().unwrap_or(0);
        out.push_str(&with_point(&digits, fraction));
        return out;
    }

    if notation == Notation::Scientific {
        let (lead, rest) = digits.split_at(1);
        out.push_str(lead);
        if !rest.is_empty() {
            out.push('.');
            out.push_str(rest);
        }
        push_exponent(&mut out, &adjusted);
        return out;
    }

    // engineering: shift the point so the exponent is a multiple of three
    let offset = adjusted.mod_floor(&BigInt::from(3)).to_usize().unwrap_or(0);
    if value.mantissa.is_zero() {
        let (exponent, zeros) = if offset == 0 {
            (adjusted, 0)
        } else {
            (adjusted + BigInt::from(3 - offset), 3 - offset)
        };
        out.push('0');
        if zeros > 0 {
            out.push('.');
            out.push_str(&"0".repeat(zeros));
        }
        if !exponent.is_zero() {
            push_exponent(&mut out, &exponent);
        }
        return out;
    }
    let mut digits = digits;
    let integer_digits = offset + 1;
    if digits.len() < integer_digits {
        digits.push_str(&"0".repeat(integer_digits - digits.len()));
    }
    let (integer, rest) = digits.split_at(integer_digits);
    out.push_str(integer);
    if !rest.is_empty() {
        out.push('.');
        out.push_str(rest);
    }
    let exponent = adjusted - BigInt::from(offset);
    if !exponent.is_zero() {
        push_exponent(&mut out, &exponent);
    }
    out
}

impl Decimal {
    /// Like `to_string`, but exponents are kept multiples of three.
    pub fn to_engineering_string(&self) -> String {
        format_decimal(self, Notation::Engineering)
    }

    /// The value written out in full, without an exponent.
    pub fn to_plain_string(&self) -> String {
        format_decimal(self, Notation::Plain)
    }

    /// Parses `text` and rounds it to `ctx`. NaN payloads are fitted to the
    /// context precision, and a signaling NaN stays signaling.
    pub fn from_str_in(text: &str, ctx: &Context) -> Result<Flagged<Self>> {
        let parsed: Self = text.parse()?;
        if parsed.is_nan() {
            let payload = truncate_payload::<Base10>(parsed.mantissa.clone(), ctx);
            return Ok(ctx.outcome(Self::special(parsed.flags, payload), Signals::empty()));
        }
        Ok(parsed.round_to_precision(ctx))
    }
}

impl Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_decimal(self, Notation::Scientific))
    }
}

impl FromStr for Decimal {
    type Err = NumberError;

    fn from_str(text: &str) -> Result<Self> {
        let error = || NumberError::Parse(text.to_string());
        let (negative, body) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        let lower = body.to_ascii_lowercase();
        let sign = if negative {
            Flags::NEGATIVE
        } else {
            Flags::empty()
        };
        if lower == "infinity" || lower == "inf" {
            return Ok(Self::infinity(negative));
        }
        for (prefix, kind) in [("snan", Flags::SIGNALING_NAN), ("nan", Flags::QUIET_NAN)] {
            if let Some(payload) = lower.strip_prefix(prefix) {
                if !payload.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(error());
                }
                let payload = if payload.is_empty() {
                    BigUint::zero()
                } else {
                    payload.parse().map_err(|_| error())?
                };
                return Ok(Self::special(sign | kind, payload));
            }
        }

        let (significand, exponent) = match body.find(['e', 'E']) {
            Some(at) => {
                let exponent = &body[at + 1..];
                let digits = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(error());
                }
                let exponent: BigInt = exponent.parse().map_err(|_| error())?;
                (&body[..at], exponent)
            }
            None => (body, BigInt::zero()),
        };
        let (integer, fraction) = match significand.split_once('.') {
            Some((integer, fraction)) => (integer, fraction),
            None => (significand, ""),
        };
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if integer.len() + fraction.len() == 0 || !all_digits(integer) || !all_digits(fraction) {
            return Err(error());
        }
        let digits = format!("{integer}{fraction}");
        let mantissa: BigUint = digits.parse().map_err(|_| error())?;
        let exponent = exponent - BigInt::from(fraction.len());
        Ok(Self::from_parts(negative, mantissa, exponent))
    }
}

impl BigFloat<Base2> {
    /// The exact value in plain notation.
    pub fn to_plain_string(&self) -> String {
        self.to_decimal().to_plain_string()
    }

    pub fn to_engineering_string(&self) -> String {
        self.to_decimal().to_engineering_string()
    }

    /// Parses decimal text and converts it to binary with a single rounding to `ctx`.
    pub fn from_str_in(text: &str, ctx: &Context) -> Result<Flagged<Self>> {
        let parsed: Decimal = text.parse()?;
        Ok(parsed.to_binary_float_in(ctx))
    }

    /// The shortest decimal string that converts back to this value rounded
    /// to `ctx`.
    ///
    /// Without a precision this is the exact decimal expansion. The result
    /// uses plain notation for integers below ten million and
    /// [`Display`] notation otherwise.
    ///
    /// ```rust
    /// use numtower::{BinaryFloat, Context};
    ///
    /// let binary64 = Context::binary64();
    /// assert_eq!(BinaryFloat::from_f64(0.1).to_shortest_string(&binary64), "0.1");
    /// assert_eq!(BinaryFloat::from_f64(1e23).to_shortest_string(&binary64), "1E+23");
    /// assert_eq!(BinaryFloat::from_f64(1200.0).to_shortest_string(&binary64), "1200");
    /// ```
    pub fn to_shortest_string(&self, ctx: &Context) -> String {
        if !ctx.has_precision() {
            return self.to_string();
        }
        if self.is_nan() {
            let payload = truncate_payload::<Base2>(self.mantissa.clone(), ctx);
            return Self::special(self.flags, payload).to_string();
        }
        let quiet_ctx = ctx.clone().with_no_flags();
        let (rounded, _) = self.round_raw(&quiet_ctx);
        if self.is_infinity() || rounded.is_infinity() || self.is_zero() {
            return rounded.to_string();
        }

        // convert the unrounded value so the search sees no double rounding
        let mut exact = Decimal::from_binary(self);
        if ctx.precision() >= 10 {
            let mut acc = DigitShiftAccumulator::new(exact.mantissa.clone());
            acc.shift_to_digits(ctx.precision() / 2 + 3);
            let mut mantissa = acc.shifted();
            if acc.is_inexact() && (&mantissa % 10u8) != BigUint::from(9u8) {
                mantissa += 1u8;
            }
            let exponent = &exact.exponent + BigInt::from(acc.discarded());
            exact = Decimal::from_parts(exact.is_negative(), mantissa, exponent);
        }

        let power_of_two = self.mantissa.count_ones() == 1;
        let round_trips = |candidate: &Decimal| {
            let (back, _) = candidate.to_binary_raw(&quiet_ctx);
            back.compare_to(&rounded) == Ordering::Equal
        };
        // trials keep the caller's rounding mode
        let trial_ctx = |digits: u64| {
            quiet_ctx
                .clone()
                .with_precision(digits)
                .with_unlimited_exponents()
        };
        let limit = exact.precision();
        for digits in 1..=limit {
            let (candidate, _) = exact.round_raw(&trial_ctx(digits));
            if !round_trips(&candidate) {
                continue;
            }
            let mut chosen = candidate;
            if power_of_two && digits > 1 {
                let shorter_ctx = trial_ctx(digits - 1);
                let (shorter, _) = exact.round_raw(&shorter_ctx);
                let next = shorter.next_plus(&shorter_ctx).into_value();
                if round_trips(&next) {
                    chosen = next;
                }
            }
            let plain = chosen.exponent.is_positive()
                && chosen.abs().compare_to(&Decimal::from(10_000_000)) == Ordering::Less;
            return if plain {
                chosen.to_plain_string()
            } else {
                chosen.to_string()
            };
        }
        rounded.to_string()
    }
}

impl Display for BigFloat<Base2> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.to_decimal(), f)
    }
}

impl FromStr for BigFloat<Base2> {
    type Err = NumberError;

    /// Parses decimal text. Values without a terminating binary expansion
    /// are rounded as by [`Decimal::to_binary_float`].
    fn from_str(text: &str) -> Result<Self> {
        let parsed: Decimal = text.parse()?;
        Ok(parsed.to_binary_float())
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;
    use rstest::rstest;

    use super::*;
    use crate::bigfloat::BinaryFloat;
    use crate::context::Rounding;
    use crate::tests::*;

    fn dec(text: &str) -> Decimal {
        text.parse().unwrap()
    }

    #[rstest]
    #[case("123", "123")]
    #[case("-123", "-123")]
    #[case("1.23E+3", "1.23E+3")]
    #[case("12.3e5", "1.23E+6")]
    #[case("0.00", "0.00")]
    #[case("0.000001", "0.000001")]
    #[case("0.0000001", "1E-7")]
    #[case("-1.5e-10", "-1.5E-10")]
    #[case("5E+0", "5")]
    #[case("0E+2", "0E+2")]
    #[case(".5", "0.5")]
    #[case("+7.", "7")]
    #[case("inf", "Infinity")]
    #[case("-Infinity", "-Infinity")]
    #[case("nan", "NaN")]
    #[case("-sNaN42", "-sNaN42")]
    fn test_scientific_round_trip(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(dec(input).to_string(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("-")]
    #[case(".")]
    #[case("1.2.3")]
    #[case("1e")]
    #[case("1e+")]
    #[case("12a")]
    #[case("NaNx")]
    #[case(" 1")]
    fn test_parse_errors(#[case] input: &str) {
        assert_eq!(
            input.parse::<Decimal>().unwrap_err(),
            NumberError::Parse(input.to_string())
        );
    }

    #[rstest]
    #[case("1.23E+3", "1230")]
    #[case("1.5E-3", "0.0015")]
    #[case("-0E+5", "-0")]
    #[case("123", "123")]
    fn test_plain(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(dec(input).to_plain_string(), expected);
    }

    #[rstest]
    #[case("1.23E+3", "1.23E+3")]
    #[case("1.23E+4", "12.3E+3")]
    #[case("1.23E+5", "123E+3")]
    #[case("1E-7", "100E-9")]
    #[case("0E+2", "0.0E+3")]
    #[case("0E-7", "0.0E-6")]
    #[case("12E+1", "120")]
    fn test_engineering(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(dec(input).to_engineering_string(), expected);
    }

    #[rstest]
    fn test_from_str_in() {
        let ctx = Context::for_precision(3).with_flags();
        let (value, signals) = Decimal::from_str_in("3.14159", &ctx).unwrap().into_parts();
        assert_eq!(value.to_string(), "3.14");
        assert_eq!(signals, Signals::INEXACT | Signals::ROUNDED);

        let nan = Decimal::from_str_in("sNaN123456", &ctx).unwrap().into_value();
        assert!(nan.is_signaling_nan());
        assert_eq!(nan.to_string(), "sNaN456");

        let third = BinaryFloat::from_str_in("0.3", &Context::binary32()).unwrap().into_value();
        assert_eq!(third.to_f32(), 0.3f32);
        assert!(BinaryFloat::from_str_in("x", &ctx).is_err());
    }

    #[rstest]
    fn test_binary_display() {
        assert_eq!(BinaryFloat::from_f64(0.375).to_string(), "0.375");
        assert_eq!(BinaryFloat::from_f64(-1024.0).to_string(), "-1024");
        assert_eq!(BinaryFloat::from_f64(0.1).to_string().len(), 57);
        assert_eq!(BinaryFloat::from_f64(1e20).to_plain_string(), "100000000000000000000");
        assert_eq!(BinaryFloat::from_f64(f64::NEG_INFINITY).to_string(), "-Infinity");
        let parsed: BinaryFloat = "0.25".parse().unwrap();
        assert_eq!(parsed.to_f64(), 0.25);
    }

    fn significant_digits(text: &str) -> usize {
        let mantissa = text.split(['e', 'E']).next().unwrap_or("");
        let digits: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();
        digits.trim_start_matches('0').trim_end_matches('0').len()
    }

    #[rstest]
    fn test_shortest_string_round_trips(mut rng: impl Rng, n_experiments: usize) {
        let ctx = Context::binary64();
        for _ in 0..n_experiments {
            let value = random_f64(&mut rng);
            let shortest = BinaryFloat::from_f64(value).to_shortest_string(&ctx);
            let parsed: f64 = shortest.parse().unwrap();
            assert_eq!(parsed.to_bits(), value.to_bits(), "{value:e} -> {shortest}");

            let reference = format!("{value:e}");
            assert!(
                significant_digits(&shortest) <= significant_digits(&reference),
                "{shortest} vs {reference}"
            );
        }
    }

    #[rstest]
    #[case(1.0, "1")]
    #[case(0.3, "0.3")]
    #[case(-2.5e-8, "-2.5E-8")]
    #[case(123456.0, "123456")]
    #[case(1e7, "1E+7")]
    #[case(5e-324, "5E-324")]
    #[case(f64::MAX, "1.7976931348623157E+308")]
    fn test_shortest_string_cases(#[case] value: f64, #[case] expected: &str) {
        let shortest = BinaryFloat::from_f64(value).to_shortest_string(&Context::binary64());
        assert_eq!(shortest, expected);
    }

    #[rstest]
    fn test_shortest_string_specials() {
        let ctx = Context::binary32();
        assert_eq!(BinaryFloat::from_f64(0.1).to_shortest_string(&ctx), "0.1");
        assert_eq!(BinaryFloat::from_f64(1e300).to_shortest_string(&ctx), "Infinity");
        assert_eq!(BinaryFloat::negative_zero().to_shortest_string(&ctx), "-0");
        assert_eq!(BinaryFloat::nan().to_shortest_string(&ctx), "NaN");
        assert_eq!(
            BinaryFloat::from_f64(0.5).to_shortest_string(&Context::unlimited()),
            "0.5"
        );
    }

    #[rstest]
    fn test_shortest_string_follows_rounding(mut rng: impl Rng, n_experiments: usize) {
        let ctx = Context::binary64().with_rounding(Rounding::Ceiling);
        // 0.2 is stored slightly above 0.2, so "0.2" would round up past it
        assert_ne!(BinaryFloat::from_f64(0.2).to_shortest_string(&ctx), "0.2");

        for _ in 0..n_experiments / 10 {
            let value = random_f64(&mut rng).abs();
            if value == 0.0 {
                continue;
            }
            let shortest = BinaryFloat::from_f64(value).to_shortest_string(&ctx);
            let parsed = dec(&shortest);
            assert_ne!(
                parsed.compare_to(&Decimal::from_f64(value)),
                Ordering::Less,
                "{value:e} -> {shortest}"
            );
            let back = parsed.to_binary_float_in(&ctx).into_value();
            assert_eq!(back.to_f64().to_bits(), value.to_bits(), "{value:e} -> {shortest}");
        }
    }
}
