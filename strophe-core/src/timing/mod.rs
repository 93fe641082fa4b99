//! Speed/timer math and sweep planning
//!
//! Everything in here is pure integer arithmetic. The hardware clock and
//! the compare register limit what an RPM can be represented as; the
//! sweep planner decomposes a speed range into octave stages so that one
//! clock divider suffices per stage.

pub mod convert;
pub mod prescaler;
pub mod sweep;

pub use convert::{compare_for_ticks, rpm_for_compare, ticks_for_rpm, CLOCK_HZ, COMPARE_MAX};
pub use prescaler::Prescaler;
pub use sweep::{
    SweepPlan, SweepRequest, SweepStage, FRACTION_SCALE, MAX_SWEEP_STAGES, RPM_LIMIT, RPM_MIN,
    SWEEP_TICK_HZ,
};
