//! # numtower
//!
//! An extended numeric tower: one value type, [`Number`], over six numeric
//! representations, backed by arbitrary-precision engines that never lose
//! precision silently.
//!
//! ## Overview
//!
//! numtower provides:
//! - **[`BigFloat`]**: arbitrary-precision floats in radix 2 ([`BinaryFloat`])
//!   or radix 10 ([`Decimal`]) with signed zero, infinities and NaN payloads
//! - **[`Context`]**: precision, rounding mode and exponent range for every
//!   inexact operation, reporting [`Signals`] through [`Flagged`] results
//! - **[`Rational`]**: exact fractions kept in lowest terms
//! - **[`Number`]**: a tagged union over `i64`, `f64`, big integers, decimals,
//!   binary floats and rationals, with promoting arithmetic and a total order
//! - **CBOR**: decoding and encoding of bignums, decimal fractions, bigfloats
//!   and rationals as [`serde_cbor::Value`] items
//!
//! ## Architecture
//!
//! ### Radix
//! Digit counting, scaling and shift accumulators shared by both float flavours.
//!
//! ### BigFloat
//! Sign, unsigned significand and unbounded exponent. Operations ending in
//! `_in` round to a [`Context`]; the plain operator traits are exact.
//!
//! ### Number
//! Mixed-kind arithmetic promotes to the most specific representation that
//! holds both operands exactly: rational, then decimal, then big integer,
//! then binary float.
//!
//! ## Quick Start
//!
//! ```rust
//! use numtower::{BinaryFloat, Context, Decimal, Number};
//!
//! let ctx = Context::binary64();
//! let tenth: Decimal = "0.1".parse().unwrap();
//! let nearest = tenth.to_binary_float_in(&ctx).into_value();
//! assert_eq!(nearest.to_f64(), 0.1);
//! assert_eq!(nearest.to_shortest_string(&ctx), "0.1");
//!
//! let sum = &Number::from(tenth) + &Number::from(1);
//! assert_eq!(sum.to_string(), "1.1");
//! assert!(Number::from(BinaryFloat::nan()) > sum);
//! ```

pub mod bigfloat;
pub mod cbor;
pub mod context;
pub mod error;
pub mod number;
pub mod radix;
pub mod rational;

pub use bigfloat::{BigFloat, BinaryFloat, Decimal, Flags};
pub use context::{Context, Flagged, Rounding, Signals};
pub use error::{NumberError, Result};
pub use number::{Number, NumberKind, Signum};
pub use rational::Rational;

pub mod prelude {
    //! Prelude module for numtower.
    //!
    //! Re-exports the value types and the rounding context, so a single
    //! glob import covers everyday use.

    pub use crate::bigfloat::{BigFloat, BinaryFloat, Decimal};
    pub use crate::context::{Context, Flagged, Rounding, Signals};
    pub use crate::number::{Number, NumberKind};
    pub use crate::rational::Rational;
}
