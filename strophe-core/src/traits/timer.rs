//! Output compare timer trait
//!
//! This trait abstracts the one piece of hardware the edge player touches:
//! a compare timer that fires the next edge interrupt, plus the output
//! port the wheel pattern is written to. The core never encodes register
//! bit layouts itself; each target board implements this once.

use crate::timing::Prescaler;

/// Trait for the edge output port and its pacing timer
///
/// Implementations are expected to be cheap: all three methods are called
/// from the highest-priority execution context and must complete in
/// bounded time without blocking.
pub trait OutputTimer {
    /// Drive the output pins with the given edge bit pattern
    ///
    /// Bit 0 is the primary (crank) channel; higher bits carry the
    /// secondary (cam) channel, already shifted and polarity-corrected.
    fn write_output(&mut self, bits: u8);

    /// Reprogram the timer clock divider
    ///
    /// Only ever called at an edge boundary, where reclocking cannot
    /// corrupt an in-flight compare interval.
    fn apply_divider(&mut self, prescaler: Prescaler);

    /// Load the compare register with the delay until the next edge
    ///
    /// Smaller values mean a higher output frequency. The value is in
    /// divided clock ticks under the currently applied divider.
    fn set_compare(&mut self, compare: u16);
}
