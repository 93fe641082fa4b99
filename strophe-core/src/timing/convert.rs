//! RPM <-> compare-value conversion
//!
//! The output frequency is set by an output compare timer: the wheel
//! advances one edge every `compare * divisor` clock ticks. RPM therefore
//! maps to a tick count through the wheel's speed scale:
//!
//! `raw_ticks = CLOCK_HZ * scale.den / (rpm * scale.num)`
//!
//! and back. All divisions round to nearest so the round trip stays
//! within one tick of the chosen divider's resolution.

use crate::error::EngineError;
use crate::timing::prescaler::Prescaler;
use crate::wheel::SpeedScale;

/// Timer input clock in Hz (before the prescaler)
pub const CLOCK_HZ: u32 = 8_000_000;

/// Largest value the compare register can hold
pub const COMPARE_MAX: u32 = u16::MAX as u32;

/// Convert a requested RPM to undivided clock ticks per edge
///
/// Fails with `InvalidRange` for rpm = 0; everything else is representable
/// as a raw tick count (the caller picks a divider to fit it into the
/// compare register).
pub fn ticks_for_rpm(rpm: u32, scale: SpeedScale) -> Result<u32, EngineError> {
    if rpm == 0 {
        return Err(EngineError::InvalidRange);
    }
    let num = CLOCK_HZ as u64 * scale.den as u64;
    let den = rpm as u64 * scale.num as u64;
    Ok(((num + den / 2) / den) as u32)
}

/// Divide raw ticks down to a compare register value
///
/// Total function: values that do not fit are clamped to the register
/// range, per the coarsest-divider fallback rule.
pub fn compare_for_ticks(raw_ticks: u32, prescaler: Prescaler) -> u16 {
    (raw_ticks >> prescaler.shift()).clamp(1, COMPARE_MAX) as u16
}

/// Recover the RPM a compare value produces under the given divider
///
/// Inverse of [`ticks_for_rpm`] + [`compare_for_ticks`]; compare = 0 is
/// invalid (the timer would never fire).
pub fn rpm_for_compare(
    compare: u16,
    prescaler: Prescaler,
    scale: SpeedScale,
) -> Result<u32, EngineError> {
    if compare == 0 {
        return Err(EngineError::InvalidRange);
    }
    let num = (CLOCK_HZ >> prescaler.shift()) as u64 * scale.den as u64;
    let den = compare as u64 * scale.num as u64;
    Ok(((num + den / 2) / den) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const UNITY: SpeedScale = SpeedScale::new(1, 1);

    #[test]
    fn test_reference_wheel_3000_rpm() {
        // 8 MHz / 3000 = 2666.7, nearest tick is 2667
        let raw = ticks_for_rpm(3000, UNITY).unwrap();
        assert_eq!(raw, 2667);
        assert_eq!(Prescaler::select(raw), Prescaler::Div1);
        assert_eq!(compare_for_ticks(raw, Prescaler::Div1), 2667);
        // Edge rate comes back as ~2999 Hz, i.e. 3000 RPM within one tick
        assert_eq!(rpm_for_compare(2667, Prescaler::Div1, UNITY).unwrap(), 3000);
    }

    #[test]
    fn test_scaled_wheel() {
        // A 4-edge distributor wheel: scale 1/30 of the reference
        let scale = SpeedScale::new(1, 30);
        let raw = ticks_for_rpm(3000, scale).unwrap();
        assert_eq!(raw, 80_000);
        // Does not fit in 16 bits undivided
        assert_eq!(Prescaler::select(raw), Prescaler::Div8);
        assert_eq!(compare_for_ticks(raw, Prescaler::Div8), 10_000);
    }

    #[test]
    fn test_zero_rpm_rejected() {
        assert_eq!(ticks_for_rpm(0, UNITY), Err(EngineError::InvalidRange));
    }

    #[test]
    fn test_zero_compare_rejected() {
        assert_eq!(
            rpm_for_compare(0, Prescaler::Div1, UNITY),
            Err(EngineError::InvalidRange)
        );
    }

    #[test]
    fn test_compare_clamps_to_register_range() {
        // 10 RPM needs 800k ticks; forcing Div1 overflows the register
        // and clamps to the maximum
        let raw = ticks_for_rpm(10, UNITY).unwrap();
        assert_eq!(raw, 800_000);
        assert_eq!(compare_for_ticks(raw, Prescaler::Div1), u16::MAX);
        // And anything that rounds to zero clamps up to 1
        assert_eq!(compare_for_ticks(0, Prescaler::Div1024), 1);
    }

    proptest! {
        /// Round trip recovers the RPM within one compare tick of the
        /// divider the selector picks for it.
        #[test]
        fn prop_round_trip_within_one_tick(rpm in 10u32..51_200) {
            let raw = ticks_for_rpm(rpm, UNITY).unwrap();
            let prescaler = Prescaler::select(raw);
            let compare = compare_for_ticks(raw, prescaler);
            let back = rpm_for_compare(compare, prescaler, UNITY).unwrap();
            // One compare tick of slack at this operating point
            let neighbor = rpm_for_compare(compare.saturating_add(1), prescaler, UNITY).unwrap();
            let tolerance = back.abs_diff(neighbor) + 1;
            prop_assert!(
                back.abs_diff(rpm) <= tolerance,
                "rpm {} -> compare {} -> rpm {} (tolerance {})",
                rpm, compare, back, tolerance
            );
        }
    }
}
