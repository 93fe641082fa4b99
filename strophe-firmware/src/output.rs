//! GPIO-backed edge output
//!
//! Implements the core's output timer over two GPIO pins. The RP2040 has
//! no AVR-style compare timer, so the divider and compare value are held
//! here and turned into an async delay: the edge task plays an edge, asks
//! for the interval, and sleeps it off.

use embassy_rp::gpio::{Level, Output};
use embassy_time::Duration;

use strophe_core::timing::Prescaler;
use strophe_core::traits::OutputTimer;

/// Nanoseconds per undivided timing tick (8 MHz timing clock)
const NANOS_PER_TICK: u64 = 125;

/// Crank and cam output pins plus the emulated compare timer state
pub struct EdgeOutput<'d> {
    crank: Output<'d>,
    cam: Output<'d>,
    divisor: u16,
    compare: u16,
}

impl<'d> EdgeOutput<'d> {
    pub fn new(crank: Output<'d>, cam: Output<'d>) -> Self {
        Self {
            crank,
            cam,
            divisor: 1,
            compare: 1,
        }
    }

    /// Delay until the next edge under the current divider and compare
    pub fn interval(&self) -> Duration {
        let nanos = self.compare as u64 * self.divisor as u64 * NANOS_PER_TICK;
        Duration::from_micros(nanos / 1_000)
    }
}

impl OutputTimer for EdgeOutput<'_> {
    fn write_output(&mut self, bits: u8) {
        // Bit 0 is the crank channel; the cam channel arrives already
        // shifted to its configured bit, default bit 1.
        self.crank.set_level(Level::from(bits & 0x01 != 0));
        self.cam.set_level(Level::from(bits & 0x02 != 0));
    }

    fn apply_divider(&mut self, prescaler: Prescaler) {
        self.divisor = prescaler.divisor();
    }

    fn set_compare(&mut self, compare: u16) {
        self.compare = compare;
    }
}
