//! Typed command surface
//!
//! The interactive transport (serial console, test harness, whatever the
//! board offers) produces these requests; the engine consumes them. This
//! keeps UI plumbing entirely out of the timing core: a command either
//! commits or reports why it did not.

use crate::engine::{Direction, Engine};
use crate::error::EngineError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A discrete request from the command surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Command {
    /// Select a wheel pattern by catalog id
    SelectWheel(u8),
    /// Select the next wheel, wrapping at the end of the catalog
    NextWheel,
    /// Select the previous wheel, wrapping at the start
    PreviousWheel,
    /// Set the pattern playback direction
    SetDirection(Direction),
    /// Set output polarity per channel
    SetInvert {
        /// Invert the primary (crank) signal
        primary: bool,
        /// Invert the secondary (cam) signal
        secondary: bool,
    },
    /// Move the secondary channel to a different output bit
    ShiftCam(i8),
    /// Hold a fixed speed
    SetFixedSpeed(u32),
    /// Ramp between two speeds at a rate in RPM/sec
    StartSweep {
        /// Lower speed endpoint
        low_rpm: u32,
        /// Upper speed endpoint
        high_rpm: u32,
        /// Ramp rate
        rate: u32,
    },
}

impl Command {
    /// Apply this command to the engine
    pub fn apply(self, engine: &mut Engine) -> Result<(), EngineError> {
        match self {
            Command::SelectWheel(id) => engine.select_wheel(id),
            Command::NextWheel => engine.next_wheel(),
            Command::PreviousWheel => engine.previous_wheel(),
            Command::SetDirection(direction) => {
                engine.set_direction(direction);
                Ok(())
            }
            Command::SetInvert { primary, secondary } => {
                engine.set_invert(primary, secondary);
                Ok(())
            }
            Command::ShiftCam(offset) => engine.shift_cam(offset),
            Command::SetFixedSpeed(rpm) => engine.set_fixed_speed(rpm),
            Command::StartSweep {
                low_rpm,
                high_rpm,
                rate,
            } => engine.start_sweep(low_rpm, high_rpm, rate),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::OperatingMode;

    #[test]
    fn test_commands_route_to_engine() {
        let mut engine = Engine::new();
        Command::SelectWheel(0).apply(&mut engine).unwrap();
        assert_eq!(engine.selection().wheel_id, 0);

        Command::SetDirection(Direction::Reverse)
            .apply(&mut engine)
            .unwrap();
        assert_eq!(engine.selection().direction, Direction::Reverse);

        Command::StartSweep {
            low_rpm: 1000,
            high_rpm: 4000,
            rate: 500,
        }
        .apply(&mut engine)
        .unwrap();
        assert_eq!(engine.mode(), OperatingMode::Sweeping);
    }

    #[test]
    fn test_rejection_surfaces_to_caller() {
        let mut engine = Engine::new();
        assert_eq!(
            Command::SetFixedSpeed(5).apply(&mut engine),
            Err(EngineError::InvalidRange)
        );
        assert_eq!(
            Command::SelectWheel(200).apply(&mut engine),
            Err(EngineError::OutOfRange)
        );
    }
}
