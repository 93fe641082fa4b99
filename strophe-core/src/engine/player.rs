//! Edge player: the output-producing interrupt routine
//!
//! Runs once per edge, at whatever cadence the compare timer is set to;
//! it is the highest-priority context and every path through it is
//! bounded. It pumps the pattern to the port, advances the wheel
//! position, applies a staged divider change, and reloads the compare
//! register - which is the sole mechanism by which "RPM" becomes an
//! output toggle rate.

use super::{Engine, OperatingMode};
use crate::traits::OutputTimer;

impl Engine {
    /// Play one edge and arm the timer for the next
    pub fn play_edge<T: OutputTimer>(&mut self, timer: &mut T) {
        let raw = self.wheel.edges[self.selection.position_index as usize];
        timer.write_output(self.output_bits(raw));

        self.advance_position();

        // An edge boundary is the only point where reclocking cannot
        // corrupt an in-flight compare interval.
        if let Some(prescaler) = self.pending_prescaler.take() {
            timer.apply_divider(prescaler);
        }

        let compare = match self.mode {
            OperatingMode::FixedSpeed => self.fixed.compare,
            OperatingMode::Sweeping => self.cursor.live_compare,
        };
        timer.set_compare(compare);
    }

    /// Map a raw edge state to output port bits
    ///
    /// Bit 0 is the primary channel; the remaining bits are the secondary
    /// channel, polarity-corrected and shifted to the configured port
    /// position.
    fn output_bits(&self, raw: u8) -> u8 {
        let primary = (raw & 0x01) ^ self.selection.invert_primary as u8;
        let mut secondary = raw & 0xFE;
        if self.selection.invert_secondary {
            secondary ^= 0x02;
        }
        let offset = self.selection.cam_bit_offset;
        let placed = if offset >= 0 {
            secondary << offset as u32
        } else {
            secondary >> (-offset) as u32
        };
        primary | placed
    }

    /// Step `position_index`, wrapping exactly at the pattern ends
    fn advance_position(&mut self) {
        let edge_count = self.wheel.edge_count();
        match self.selection.direction {
            super::Direction::Forward => {
                self.selection.position_index += 1;
                if self.selection.position_index == edge_count {
                    self.selection.position_index = 0;
                }
            }
            super::Direction::Reverse => {
                if self.selection.position_index == 0 {
                    self.selection.position_index = edge_count;
                }
                self.selection.position_index -= 1;
            }
        }
    }
}
