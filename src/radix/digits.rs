use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{ToPrimitive, Zero};

use crate::radix::{Base10, Radix, ShiftAccumulator, decimal_digits, word_decimal_digits};

/// Largest power of ten that fits in a `u64`.
const MAX_WORD_POWER: u32 = 19;

#[derive(Debug, Clone)]
enum Repr {
    Word(u64),
    Big(BigUint),
}

/// Decimal shift accumulator.
#[derive(Debug, Clone)]
pub struct DigitShiftAccumulator {
    repr: Repr,
    last: u32,
    older: bool,
    discarded: u64,
}

impl DigitShiftAccumulator {
    fn set_big(&mut self, value: BigUint) {
        self.repr = match value.to_u64() {
            Some(word) => Repr::Word(word),
            None => Repr::Big(value),
        };
    }

    fn shift_word(&mut self, value: u64, digits: u64) -> u64 {
        if digits > u64::from(MAX_WORD_POWER) + 1 {
            self.last = 0;
            self.older |= value != 0;
            0
        } else if digits == u64::from(MAX_WORD_POWER) + 1 {
            let power = 10u64.pow(MAX_WORD_POWER);
            self.last = (value / power) as u32;
            self.older |= value % power != 0;
            0
        } else {
            let below = 10u64.pow(digits as u32 - 1);
            self.last = ((value / below) % 10) as u32;
            self.older |= value % below != 0;
            value / (below * 10)
        }
    }
}

impl ShiftAccumulator for DigitShiftAccumulator {
    fn new(value: BigUint) -> Self {
        let mut acc = Self {
            repr: Repr::Word(0),
            last: 0,
            older: false,
            discarded: 0,
        };
        acc.set_big(value);
        acc
    }

    fn shifted(&self) -> BigUint {
        match &self.repr {
            Repr::Word(word) => BigUint::from(*word),
            Repr::Big(big) => big.clone(),
        }
    }

    fn last_discarded(&self) -> u32 {
        self.last
    }

    fn older_discarded(&self) -> bool {
        self.older
    }

    fn discarded(&self) -> u64 {
        self.discarded
    }

    fn digit_length(&self) -> u64 {
        match &self.repr {
            Repr::Word(word) => word_decimal_digits(*word),
            Repr::Big(big) => decimal_digits(big),
        }
    }

    fn shift_right(&mut self, digits: u64) {
        if digits == 0 {
            return;
        }
        self.older |= self.last != 0;
        self.discarded = self.discarded.saturating_add(digits);
        let big = match &self.repr {
            Repr::Word(word) => {
                let word = *word;
                let rest = self.shift_word(word, digits);
                self.repr = Repr::Word(rest);
                return;
            }
            Repr::Big(big) => big.clone(),
        };
        if digits > decimal_digits(&big) {
            self.last = 0;
            self.older |= !big.is_zero();
            self.repr = Repr::Word(0);
            return;
        }
        let (upper, lower) = big.div_rem(&Base10::power(digits - 1));
        self.older |= !lower.is_zero();
        let (rest, last) = upper.div_rem(&BigUint::from(10u8));
        self.last = last.to_u32().unwrap_or(0);
        self.set_big(rest);
    }
}
