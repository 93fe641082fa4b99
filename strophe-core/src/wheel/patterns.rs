//! Edge state tables
//!
//! Each table lists output pin states in playback order. More edges per
//! revolution buys angular accuracy at the cost of top speed: the edge
//! clock runs `edge_count / 120` times faster than the reference wheel
//! for the same RPM, which is exactly what each wheel's speed scale
//! compensates for.

/// Simple 4-cylinder distributor, one vane per cylinder
pub static DIZZY_FOUR_CYLINDER: [u8; 4] = [1, 0, 1, 0];

/// Simple 6-cylinder distributor
pub static DIZZY_SIX_CYLINDER: [u8; 6] = [1, 0, 1, 0, 1, 0];

/// Simple 8-cylinder distributor
pub static DIZZY_EIGHT_CYLINDER: [u8; 8] = [1, 0, 1, 0, 1, 0, 1, 0];

/// 36-1 missing tooth crank wheel: 35 teeth then one tooth gap
pub static THIRTY_SIX_MINUS_ONE: [u8; 72] = [
    1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0,
    1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0,
    1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0,
    1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 0, 0,
];

/// 60-2 missing tooth crank wheel, the reference pattern: 58 teeth then
/// a two tooth gap
pub static SIXTY_MINUS_TWO: [u8; 120] = [
    1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0,
    1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0,
    1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0,
    1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0,
    1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0,
    1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 0, 0, 0, 0,
];

/// Subaru 36-2-2-2 crank wheel: tooth groups of 10, 4 and 16 separated
/// by three two-tooth gaps
pub static THIRTY_SIX_MINUS_TWO_TWO_TWO: [u8; 72] = [
    0, 0, 0, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0,
    1, 0, 1, 0, 0, 0, 0, 0, 1, 0, 1, 0, 1, 0, 1, 0, 0, 0, 0, 0,
    1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0,
    1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0,
];

/// GM 60-2 crank with a 4X cam on bit 1, spanning two crank revolutions
pub static SIXTY_MINUS_TWO_WITH_4X_CAM: [u8; 240] = [
    3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 0, 1, 0, 1, 0,
    1, 0, 1, 0, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2,
    3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2,
    3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 0, 1, 0, 1, 0,
    1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0,
    1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 0, 0, 0, 0,
    1, 0, 1, 0, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 0, 1, 0, 1, 0,
    1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0,
    1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 1, 0, 3, 2, 3, 2,
    3, 2, 3, 2, 3, 2, 3, 0, 1, 0, 1, 0, 1, 0, 1, 0, 3, 2, 3, 2,
    3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2,
    3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 3, 2, 2, 2, 2, 2,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tooth_gaps() {
        // 36-1: exactly 35 rising edges per pass
        let teeth = THIRTY_SIX_MINUS_ONE.iter().filter(|&&e| e & 1 == 1).count();
        assert_eq!(teeth, 35);
        // 60-2: exactly 58
        let teeth = SIXTY_MINUS_TWO.iter().filter(|&&e| e & 1 == 1).count();
        assert_eq!(teeth, 58);
        // 36-2-2-2: three double gaps leave 30
        let teeth = THIRTY_SIX_MINUS_TWO_TWO_TWO
            .iter()
            .filter(|&&e| e & 1 == 1)
            .count();
        assert_eq!(teeth, 30);
    }

    #[test]
    fn test_cam_wheel_crank_track_repeats() {
        // Masking the cam bit away, both crank revolutions of the 4X cam
        // pattern must be the plain 60-2 track.
        for (i, &edge) in SIXTY_MINUS_TWO_WITH_4X_CAM.iter().enumerate() {
            assert_eq!(
                edge & 1,
                SIXTY_MINUS_TWO[i % 120] & 1,
                "crank track diverges at edge {}",
                i
            );
        }
    }
}
