//! # Rounding Contexts
//!
//! A [`Context`] bundles the precision, [`Rounding`] mode and exponent range an
//! operation rounds its result to. Operations that take a context return a
//! [`Flagged`] value carrying the [`Signals`] raised while computing it, so the
//! caller decides whether to accumulate, inspect or trap on them.
//!
//! ```rust
//! use numtower::{BinaryFloat, Context, Signals};
//!
//! let ctx = Context::binary32().with_flags();
//! let third = BinaryFloat::one().div_in(&BinaryFloat::from(3), &ctx);
//! assert!(third.signals().contains(Signals::INEXACT));
//! ```

use num_bigint::BigInt;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{NumberError, Result};

/// How a result with discarded nonzero digits is rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Rounding {
    /// To nearest, ties to the even significand.
    #[default]
    HalfEven,
    /// Toward zero.
    Down,
    /// Away from zero.
    Up,
    /// Toward positive infinity.
    Ceiling,
    /// Toward negative infinity.
    Floor,
    /// To nearest, ties away from zero.
    HalfUp,
    /// To nearest, ties toward zero.
    HalfDown,
    /// Toward zero, then set the last digit odd if anything was discarded.
    Odd,
    /// No rounding allowed: an inexact result is invalid.
    None,
}

bitflags::bitflags! {
    /// Exceptional conditions raised by an operation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct Signals: u32 {
        const INEXACT = 1;
        const ROUNDED = 1 << 1;
        const SUBNORMAL = 1 << 2;
        const UNDERFLOW = 1 << 3;
        const OVERFLOW = 1 << 4;
        const CLAMPED = 1 << 5;
        const INVALID = 1 << 6;
        const DIVIDE_BY_ZERO = 1 << 7;
        const LOST_DIGITS = 1 << 8;
    }
}

/// Precision, rounding and exponent limits for an operation.
///
/// `precision` counts digits in the radix of the value being rounded (bits for
/// [`BinaryFloat`](crate::BinaryFloat), decimal digits for
/// [`Decimal`](crate::Decimal)); zero means unlimited. The exponent range is
/// expressed in adjusted exponents, i.e. the exponent of the most significant
/// digit.
///
/// A context is plain data. It is never mutated by an operation, so a single
/// instance may be shared freely between threads.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Context {
    precision: u64,
    rounding: Rounding,
    exponent_range: Option<(BigInt, BigInt)>,
    clamp: bool,
    has_flags: bool,
    traps: Signals,
}

impl Default for Context {
    fn default() -> Self {
        Self::unlimited()
    }
}

impl Context {
    /// Unlimited precision and exponent range: operations are exact.
    pub fn unlimited() -> Self {
        Self {
            precision: 0,
            rounding: Rounding::HalfEven,
            exponent_range: None,
            clamp: false,
            has_flags: false,
            traps: Signals::empty(),
        }
    }

    pub fn for_precision(precision: u64) -> Self {
        Self::unlimited().with_precision(precision)
    }

    pub fn for_precision_and_rounding(precision: u64, rounding: Rounding) -> Self {
        Self::for_precision(precision).with_rounding(rounding)
    }

    fn interchange(precision: u64, emin: i64, emax: i64) -> Self {
        Self::for_precision(precision)
            .with_exponent_range(BigInt::from(emin), BigInt::from(emax))
            .with_clamp(true)
    }

    /// IEEE 754 binary16.
    pub fn binary16() -> Self {
        Self::interchange(11, -14, 15)
    }

    /// IEEE 754 binary32, the format of `f32`.
    pub fn binary32() -> Self {
        Self::interchange(24, -126, 127)
    }

    /// IEEE 754 binary64, the format of `f64`.
    pub fn binary64() -> Self {
        Self::interchange(53, -1022, 1023)
    }

    /// IEEE 754 binary128.
    pub fn binary128() -> Self {
        Self::interchange(113, -16382, 16383)
    }

    /// IEEE 754 decimal32.
    pub fn decimal32() -> Self {
        Self::interchange(7, -95, 96)
    }

    /// IEEE 754 decimal64.
    pub fn decimal64() -> Self {
        Self::interchange(16, -383, 384)
    }

    /// IEEE 754 decimal128.
    pub fn decimal128() -> Self {
        Self::interchange(34, -6143, 6144)
    }

    pub fn with_precision(mut self, precision: u64) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_rounding(mut self, rounding: Rounding) -> Self {
        self.rounding = rounding;
        self
    }

    /// Limits adjusted exponents to `emin..=emax`.
    pub fn with_exponent_range(mut self, emin: BigInt, emax: BigInt) -> Self {
        self.exponent_range = Some((emin, emax));
        self
    }

    pub fn with_unlimited_exponents(mut self) -> Self {
        self.exponent_range = None;
        self.clamp = false;
        self
    }

    /// With `clamp`, results are kept at or below `emax - precision + 1`
    /// by padding the significand with zeros, as interchange formats do.
    pub fn with_clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }

    /// Report raised signals in [`Flagged::signals`].
    pub fn with_flags(mut self) -> Self {
        self.has_flags = true;
        self
    }

    pub fn with_no_flags(mut self) -> Self {
        self.has_flags = false;
        self
    }

    /// Make [`Flagged::into_result`] fail when any of `traps` is raised.
    pub fn with_traps(mut self, traps: Signals) -> Self {
        self.traps = traps;
        self
    }

    pub fn precision(&self) -> u64 {
        self.precision
    }

    pub fn has_precision(&self) -> bool {
        self.precision > 0
    }

    pub fn rounding(&self) -> Rounding {
        self.rounding
    }

    pub fn has_exponent_range(&self) -> bool {
        self.exponent_range.is_some()
    }

    pub fn emin(&self) -> Option<&BigInt> {
        self.exponent_range.as_ref().map(|(emin, _)| emin)
    }

    pub fn emax(&self) -> Option<&BigInt> {
        self.exponent_range.as_ref().map(|(_, emax)| emax)
    }

    /// Smallest exponent a subnormal result may have, `emin - (precision - 1)`.
    pub fn etiny(&self) -> Option<BigInt> {
        let emin = self.emin()?;
        Some(emin - BigInt::from(self.precision.saturating_sub(1)))
    }

    pub fn clamp(&self) -> bool {
        self.clamp
    }

    pub fn has_flags(&self) -> bool {
        self.has_flags
    }

    pub fn traps(&self) -> Signals {
        self.traps
    }

    /// Pairs a result with the signals raised while producing it.
    pub fn outcome<T>(&self, value: T, signals: Signals) -> Flagged<T> {
        Flagged {
            value,
            signals: if self.has_flags {
                signals
            } else {
                Signals::empty()
            },
            trapped: signals & self.traps,
        }
    }
}

/// The result of a context-taking operation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Flagged<T> {
    value: T,
    signals: Signals,
    trapped: Signals,
}

impl<T> Flagged<T> {
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    /// Signals raised by the operation; always empty unless the context has
    /// flags enabled.
    pub fn signals(&self) -> Signals {
        self.signals
    }

    pub fn into_parts(self) -> (T, Signals) {
        (self.value, self.signals)
    }

    /// Adds the raised signals to a caller-owned accumulator and returns the value.
    pub fn merge_into(self, accumulator: &mut Signals) -> T {
        *accumulator |= self.signals;
        self.value
    }

    /// Fails with [`NumberError::Trapped`] if a raised signal is trapped by the context.
    pub fn into_result(self) -> Result<T> {
        if self.trapped.is_empty() {
            Ok(self.value)
        } else {
            Err(NumberError::Trapped(self.trapped))
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Flagged<U> {
        Flagged {
            value: f(self.value),
            signals: self.signals,
            trapped: self.trapped,
        }
    }
}
