use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use crate::radix::ShiftAccumulator;

#[derive(Debug, Clone)]
enum Repr {
    Word(u64),
    Big(BigUint),
}

/// Binary shift accumulator.
///
/// Values that fit in a `u64` are shifted with plain machine operations; the
/// `BigUint` path is taken only while the value is wider than a word.
#[derive(Debug, Clone)]
pub struct BitShiftAccumulator {
    repr: Repr,
    last: u32,
    older: bool,
    discarded: u64,
}

impl BitShiftAccumulator {
    fn set_big(&mut self, value: BigUint) {
        self.repr = match value.to_u64() {
            Some(word) => Repr::Word(word),
            None => Repr::Big(value),
        };
    }
}

impl ShiftAccumulator for BitShiftAccumulator {
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
            Repr::Word(word) => u64::from(64 - word.leading_zeros()),
            Repr::Big(big) => big.bits(),
        }
    }

    fn shift_right(&mut self, digits: u64) {
        if digits == 0 {
            return;
        }
        self.older |= self.last != 0;
        self.discarded = self.discarded.saturating_add(digits);
        match &mut self.repr {
            Repr::Word(word) => {
                let value = *word;
                if digits > 64 {
                    self.last = 0;
                    self.older |= value != 0;
                    *word = 0;
                } else if digits == 64 {
                    self.last = (value >> 63) as u32;
                    self.older |= value & (u64::MAX >> 1) != 0;
                    *word = 0;
                } else {
                    self.last = ((value >> (digits - 1)) & 1) as u32;
                    self.older |= value & ((1u64 << (digits - 1)) - 1) != 0;
                    *word = value >> digits;
                }
            }
            Repr::Big(big) => {
                if digits > big.bits() {
                    self.last = 0;
                    self.older |= !big.is_zero();
                    self.repr = Repr::Word(0);
                    return;
                }
                self.last = u32::from(big.bit(digits - 1));
                self.older |= big
                    .trailing_zeros()
                    .is_some_and(|zeros| zeros < digits - 1);
                let rest = &*big >> digits;
                self.set_big(rest);
            }
        }
    }
}
