//! Exact arithmetic on [`Rational`]. Results never round; special values
//! follow the same rules as the float engine: a signaling NaN operand comes
//! back as a quiet NaN, and undefined forms such as `∞ − ∞` or `0 / 0` give
//! NaN.

use std::ops::{Add, Div, Mul, Neg, Rem, Sub};

use num_traits::Zero;

use crate::bigfloat::Flags;
use crate::rational::Rational;

impl Rational {
    pub fn negate(&self) -> Self {
        let mut negated = self.clone();
        negated.flags.toggle(Flags::NEGATIVE);
        negated
    }

    pub fn abs(&self) -> Self {
        let mut abs = self.clone();
        abs.flags.remove(Flags::NEGATIVE);
        abs
    }

    pub fn copy_sign(&self, other: &Self) -> Self {
        let mut copy = self.clone();
        copy.flags.set(Flags::NEGATIVE, other.is_negative());
        copy
    }

    fn to_quiet_nan(&self) -> Self {
        let mut quiet = self.clone();
        quiet.flags.remove(Flags::SIGNALING_NAN);
        quiet.flags.insert(Flags::QUIET_NAN);
        quiet
    }

    fn propagate_nan(&self, other: &Self) -> Option<Self> {
        [self, other]
            .into_iter()
            .find(|x| x.is_signaling_nan())
            .or_else(|| [self, other].into_iter().find(|x| x.is_quiet_nan()))
            .map(Self::to_quiet_nan)
    }

    fn sum(&self, other: &Self) -> Self {
        if let Some(nan) = self.propagate_nan(other) {
            return nan;
        }
        match (self.is_infinity(), other.is_infinity()) {
            (true, true) if self.is_negative() != other.is_negative() => return Self::nan(),
            (true, _) => return self.clone(),
            (false, true) => return other.clone(),
            _ => {}
        }
        let negative_zero = self.is_negative() && other.is_negative();
        Self::from_signed(self.signed() + other.signed(), negative_zero)
    }

    fn difference(&self, other: &Self) -> Self {
        self.sum(&other.negate())
    }

    fn product(&self, other: &Self) -> Self {
        if let Some(nan) = self.propagate_nan(other) {
            return nan;
        }
        let negative = self.is_negative() != other.is_negative();
        if self.is_infinity() || other.is_infinity() {
            if self.is_zero() || other.is_zero() {
                return Self::nan();
            }
            return Self::infinity(negative);
        }
        Self::from_magnitude(negative, &self.magnitude * &other.magnitude)
    }

    fn quotient(&self, other: &Self) -> Self {
        if let Some(nan) = self.propagate_nan(other) {
            return nan;
        }
        let negative = self.is_negative() != other.is_negative();
        match (self.is_infinity(), other.is_infinity()) {
            (true, true) => return Self::nan(),
            (true, false) => return Self::infinity(negative),
            (false, true) => return Self::from_magnitude(negative, Zero::zero()),
            _ => {}
        }
        if other.is_zero() {
            if self.is_zero() {
                return Self::nan();
            }
            return Self::infinity(negative);
        }
        Self::from_magnitude(negative, &self.magnitude / &other.magnitude)
    }

    /// Remainder of truncating division, with the sign of the dividend.
    fn remainder(&self, other: &Self) -> Self {
        if let Some(nan) = self.propagate_nan(other) {
            return nan;
        }
        if self.is_infinity() || other.is_zero() {
            return Self::nan();
        }
        if other.is_infinity() {
            return self.clone();
        }
        let quotient = (&self.magnitude / &other.magnitude).trunc();
        let remainder = &self.magnitude - quotient * &other.magnitude;
        Self::from_magnitude(self.is_negative(), remainder)
    }
}

impl Neg for Rational {
    type Output = Self;

    fn neg(mut self) -> Self::Output {
        self.flags.toggle(Flags::NEGATIVE);
        self
    }
}

impl Neg for &Rational {
    type Output = Rational;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

macro_rules! rational_binary_op {
    ($trait:ident, $method:ident, $exact:ident) => {
        impl $trait<&Rational> for &Rational {
            type Output = Rational;

            fn $method(self, other: &Rational) -> Self::Output {
                self.$exact(other)
            }
        }

        impl $trait for Rational {
            type Output = Rational;

            fn $method(self, other: Rational) -> Self::Output {
                self.$exact(&other)
            }
        }

        impl $trait<&Rational> for Rational {
            type Output = Rational;

            fn $method(self, other: &Rational) -> Self::Output {
                self.$exact(other)
            }
        }
    };
}

rational_binary_op!(Add, add, sum);
rational_binary_op!(Sub, sub, difference);
rational_binary_op!(Mul, mul, product);
rational_binary_op!(Div, div, quotient);
rational_binary_op!(Rem, rem, remainder);
