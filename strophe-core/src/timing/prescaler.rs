//! Timer clock divider selection
//!
//! The compare register is 16 bits wide, so low speeds (large tick
//! counts) need a coarser clock. The divider set is the closed list the
//! timer hardware offers; selection always prefers the finest divider
//! that still fits, maximizing timing resolution.

use crate::timing::convert::COMPARE_MAX;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Timer clock divider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Prescaler {
    /// Undivided clock
    Div1,
    /// Clock / 8
    Div8,
    /// Clock / 64
    Div64,
    /// Clock / 256
    Div256,
    /// Clock / 1024
    Div1024,
}

impl Prescaler {
    /// All dividers, finest resolution first
    pub const ALL: [Prescaler; 5] = [
        Prescaler::Div1,
        Prescaler::Div8,
        Prescaler::Div64,
        Prescaler::Div256,
        Prescaler::Div1024,
    ];

    /// The integer clock divisor
    pub const fn divisor(self) -> u16 {
        1 << self.shift()
    }

    /// log2 of the divisor, for shift-based division
    pub const fn shift(self) -> u8 {
        match self {
            Prescaler::Div1 => 0,
            Prescaler::Div8 => 3,
            Prescaler::Div64 => 6,
            Prescaler::Div256 => 8,
            Prescaler::Div1024 => 10,
        }
    }

    /// Pick the finest divider that keeps `raw_ticks` representable
    ///
    /// If even the coarsest divider does not fit, returns it anyway; the
    /// caller clamps the resulting compare value to the register maximum.
    pub fn select(raw_ticks: u32) -> Self {
        for prescaler in Self::ALL {
            if raw_ticks >> prescaler.shift() <= COMPARE_MAX {
                return prescaler;
            }
        }
        Prescaler::Div1024
    }
}
