//! Sweep planning: octave stage decomposition
//!
//! RPM and compare value are inversely related, so a linear RPM ramp is
//! not a linear compare ramp. The planner splits the requested range into
//! frequency-doubling octave stages and ramps the compare value linearly
//! inside each one: the error stays small within an octave, and a single
//! clock divider is guaranteed to cover the whole stage.
//!
//! The per-correction compare delta is pre-split into an integer part and
//! a scaled fractional remainder here, outside interrupt context, so the
//! periodic stepper never needs fractional arithmetic.

use heapless::Vec;

use crate::error::EngineError;
use crate::timing::convert::{compare_for_ticks, rpm_for_compare, ticks_for_rpm};
use crate::timing::prescaler::Prescaler;
use crate::wheel::SpeedScale;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fixed cadence of the sweep correction tick, in Hz
pub const SWEEP_TICK_HZ: u32 = 1_000;

/// Scale for the fractional per-correction remainder
///
/// The stepper accumulates remainders in this scale and carries a whole
/// compare tick every time the accumulator crosses it.
pub const FRACTION_SCALE: u32 = 1_000_000;

/// Maximum stages a plan can hold
///
/// The admissible RPM range spans fewer than 14 octaves, so this never
/// limits a valid request.
pub const MAX_SWEEP_STAGES: usize = 16;

/// Lowest admissible RPM for sweep endpoints (and fixed speed)
pub const RPM_MIN: u32 = 10;

/// Exclusive upper bound for sweep endpoints and ramp rate
pub const RPM_LIMIT: u32 = 51_200;

/// A validated sweep request: ramp between two speeds at rate RPM/sec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SweepRequest {
    /// Lower speed endpoint
    pub low_rpm: u32,
    /// Upper speed endpoint
    pub high_rpm: u32,
    /// Ramp rate in RPM per second
    pub rate: u32,
}

impl SweepRequest {
    /// Check the request against the admissible ranges
    ///
    /// Pure: touches no shared state, so a rejection commits nothing.
    pub fn validate(&self) -> Result<(), EngineError> {
        let rpm_ok = |rpm: u32| (RPM_MIN..RPM_LIMIT).contains(&rpm);
        if !rpm_ok(self.low_rpm)
            || !rpm_ok(self.high_rpm)
            || !(1..RPM_LIMIT).contains(&self.rate)
            || self.low_rpm >= self.high_rpm
        {
            return Err(EngineError::InvalidRange);
        }
        Ok(())
    }
}

/// One octave stage of a sweep
///
/// Compare values are in the stage's own divider units. `start_compare`
/// is the low-RPM (larger) end, `end_compare` the high-RPM (smaller) end;
/// accelerating means walking from start to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SweepStage {
    /// Compare value at the low-RPM stage boundary
    pub start_compare: u16,
    /// Compare value at the high-RPM stage boundary
    pub end_compare: u16,
    /// Clock divider valid across the whole stage
    pub prescaler: Prescaler,
    /// Whole compare ticks the target moves per correction tick
    pub ticks_per_correction: u16,
    /// Sub-tick movement per correction, scaled by [`FRACTION_SCALE`]
    pub remainder_per_correction: u32,
}

/// An ordered set of octave stages plus the request that produced it
///
/// Plans are built outside interrupt context and replaced wholesale;
/// nothing ever mutates a published plan in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepPlan {
    /// Stages from the low endpoint up to the high endpoint
    pub stages: Vec<SweepStage, MAX_SWEEP_STAGES>,
    /// The request this plan realizes
    pub request: SweepRequest,
}

/// Number of frequency-doubling octaves needed to span `low..high`
///
/// Integer form of `ceil(log2(high / low))`.
pub fn total_stages(low_rpm: u32, high_rpm: u32) -> usize {
    let mut stages = 0;
    let mut reach = low_rpm;
    while reach < high_rpm {
        reach = reach.saturating_mul(2);
        stages += 1;
    }
    stages
}

/// Partition the raw tick range into contiguous octave boundaries
///
/// `bounds[0]` is the low-RPM (largest) tick count; each following
/// boundary halves the previous one, and the last is forced onto the
/// high-RPM tick count so the stages cover exactly the requested range.
fn octave_boundaries(
    low_ticks: u32,
    high_ticks: u32,
    stages: usize,
) -> Result<Vec<u32, { MAX_SWEEP_STAGES + 1 }>, EngineError> {
    let mut bounds: Vec<u32, { MAX_SWEEP_STAGES + 1 }> = Vec::new();
    bounds.push(low_ticks).map_err(|_| EngineError::PlanCapacity)?;
    for _ in 1..stages {
        let prev = bounds[bounds.len() - 1];
        bounds
            .push((prev / 2).max(high_ticks))
            .map_err(|_| EngineError::PlanCapacity)?;
    }
    bounds.push(high_ticks).map_err(|_| EngineError::PlanCapacity)?;
    Ok(bounds)
}

/// Build a sweep plan for the given request and wheel scale
///
/// Validates first; on any `Err` no shared state anywhere has changed,
/// the caller simply keeps its previous plan.
pub fn build_plan(request: SweepRequest, scale: SpeedScale) -> Result<SweepPlan, EngineError> {
    request.validate()?;

    let low_ticks = ticks_for_rpm(request.low_rpm, scale)?;
    let high_ticks = ticks_for_rpm(request.high_rpm, scale)?;
    let stages = total_stages(request.low_rpm, request.high_rpm);
    let bounds = octave_boundaries(low_ticks, high_ticks, stages)?;

    let mut plan_stages: Vec<SweepStage, MAX_SWEEP_STAGES> = Vec::new();
    for pair in bounds.windows(2) {
        let (start_raw, end_raw) = (pair[0], pair[1]);
        // The low-RPM end has the larger tick count; a divider that fits
        // it fits the whole octave.
        let prescaler = Prescaler::select(start_raw);
        let start_compare = compare_for_ticks(start_raw, prescaler);
        let end_compare = compare_for_ticks(end_raw, prescaler);

        let low_rpm_here = rpm_for_compare(start_compare, prescaler, scale)?;
        let high_rpm_here = rpm_for_compare(end_compare, prescaler, scale)?;
        let rpm_span = high_rpm_here.saturating_sub(low_rpm_here);

        // Corrections it takes to cross this stage at the requested rate
        let steps = (SWEEP_TICK_HZ * rpm_span / request.rate).max(1);
        let delta = (start_compare - end_compare) as u32;
        let ticks_per_correction = (delta / steps) as u16;
        let remainder_per_correction =
            ((delta % steps) as u64 * FRACTION_SCALE as u64 / steps as u64) as u32;

        plan_stages
            .push(SweepStage {
                start_compare,
                end_compare,
                prescaler,
                ticks_per_correction,
                remainder_per_correction,
            })
            .map_err(|_| EngineError::PlanCapacity)?;
    }

    Ok(SweepPlan {
        stages: plan_stages,
        request,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const UNITY: SpeedScale = SpeedScale::new(1, 1);

    #[test]
    fn test_two_octave_request_yields_two_stages() {
        let plan = build_plan(
            SweepRequest {
                low_rpm: 1000,
                high_rpm: 4000,
                rate: 500,
            },
            UNITY,
        )
        .unwrap();
        assert_eq!(plan.stages.len(), 2);
        // 8 MHz reference wheel: 1000 RPM = 8000 ticks, 4000 RPM = 2000
        assert_eq!(plan.stages[0].start_compare, 8000);
        assert_eq!(plan.stages[0].end_compare, 4000);
        assert_eq!(plan.stages[1].start_compare, 4000);
        assert_eq!(plan.stages[1].end_compare, 2000);
    }

    #[test]
    fn test_stage_count_matches_ceil_log2() {
        assert_eq!(total_stages(1000, 2000), 1);
        assert_eq!(total_stages(1000, 2001), 2);
        assert_eq!(total_stages(1000, 4000), 2);
        assert_eq!(total_stages(100, 12_800), 7);
        assert_eq!(total_stages(10, 51_199), 13);
    }

    #[test]
    fn test_rejects_malformed_requests() {
        let cases = [
            (5, 4000, 500),       // low below minimum
            (1000, 60_000, 500),  // high above limit
            (1000, 4000, 0),      // zero rate
            (4000, 1000, 500),    // inverted range
            (1000, 1000, 500),    // empty range
        ];
        for (low_rpm, high_rpm, rate) in cases {
            let request = SweepRequest {
                low_rpm,
                high_rpm,
                rate,
            };
            assert_eq!(
                build_plan(request, UNITY),
                Err(EngineError::InvalidRange),
                "{:?} should be rejected",
                request
            );
        }
    }

    #[test]
    fn test_per_correction_split() {
        // One-octave sweep: 1000..2000 RPM at 100 RPM/s on the reference
        // wheel is 8000 -> 4000 compare over 10000 corrections, i.e.
        // 0.4 ticks per correction: all fractional.
        let plan = build_plan(
            SweepRequest {
                low_rpm: 1000,
                high_rpm: 2000,
                rate: 100,
            },
            UNITY,
        )
        .unwrap();
        assert_eq!(plan.stages.len(), 1);
        let stage = &plan.stages[0];
        assert_eq!(stage.ticks_per_correction, 0);
        assert_eq!(stage.remainder_per_correction, 400_000);
    }

    proptest! {
        /// Octave boundaries are contiguous, monotonic, and cover exactly
        /// the requested range; the stage count is ceil(log2(high/low)).
        #[test]
        fn prop_stage_partition(
            low_rpm in 10u32..25_000,
            span in 1u32..26_000,
            rate in 1u32..51_200,
        ) {
            let high_rpm = (low_rpm + span).min(51_199);
            prop_assume!(low_rpm < high_rpm);
            let request = SweepRequest { low_rpm, high_rpm, rate };
            let plan = build_plan(request, UNITY).unwrap();

            prop_assert_eq!(plan.stages.len(), total_stages(low_rpm, high_rpm));

            let low_ticks = ticks_for_rpm(low_rpm, UNITY).unwrap();
            let high_ticks = ticks_for_rpm(high_rpm, UNITY).unwrap();
            let first = &plan.stages[0];
            let last = &plan.stages[plan.stages.len() - 1];
            prop_assert_eq!(
                first.start_compare,
                compare_for_ticks(low_ticks, first.prescaler)
            );
            prop_assert_eq!(
                last.end_compare,
                compare_for_ticks(high_ticks, last.prescaler)
            );

            for pair in plan.stages.windows(2) {
                // Within a stage the target moves monotonically downward
                prop_assert!(pair[0].start_compare >= pair[0].end_compare);
                // Adjacent stages share their boundary tick count, modulo
                // the divider each stage expresses it in
                let end_raw = (pair[0].end_compare as u32) << pair[0].prescaler.shift();
                let next_raw = (pair[1].start_compare as u32) << pair[1].prescaler.shift();
                let slack = 1u32 << pair[0].prescaler.shift().max(pair[1].prescaler.shift());
                prop_assert!(end_raw.abs_diff(next_raw) < slack.max(1) * 2);
            }
        }
    }
}
