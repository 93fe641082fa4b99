//! The timing engine: shared state aggregate and command surface
//!
//! Three execution contexts share this state: the edge player (highest
//! priority, paced by the compare timer), the sweep stepper (fixed 1 kHz
//! cadence), and the command path (mainline, lowest). It all lives in one
//! aggregate with explicit single-writer rules:
//!
//! - the stepper is the sole writer of [`SweepCursor`]
//! - the edge player only reads the live compare target and consumes the
//!   pending prescaler change
//! - the command path never touches cursor fields; it replaces the whole
//!   [`SweepPlan`] under the advisory plan guard, so the stepper always
//!   observes a fully-old or fully-new plan
//!
//! Neither interrupt routine ever blocks: the stepper skips its tick when
//! the guard is held, and every branch in both routines is a total
//! function over the state (clamping, wraparound, no-ops).

mod player;
mod stepper;

use crate::error::EngineError;
use crate::timing::{
    compare_for_ticks, sweep, ticks_for_rpm, Prescaler, SweepPlan, SweepRequest, RPM_MIN,
};
use crate::wheel::{self, WheelDefinition};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Wheel rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Pattern played front to back
    #[default]
    Forward,
    /// Pattern played back to front
    Reverse,
}

/// Operating mode of the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OperatingMode {
    /// Hold one requested RPM
    FixedSpeed,
    /// Ramp linearly between two RPMs, bouncing at the endpoints
    Sweeping,
}

/// Ramp direction while sweeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Ramp {
    /// RPM rising, compare target falling
    Accelerating,
    /// RPM falling, compare target rising
    Decelerating,
}

/// Allowed range for the secondary-channel bit offset
pub const CAM_OFFSET_MIN: i8 = -1;
/// See [`CAM_OFFSET_MIN`]; bit 1 + 6 still fits in the output byte
pub const CAM_OFFSET_MAX: i8 = 6;

/// Mutable per-run selection state
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RuntimeSelection {
    /// Catalog id of the selected wheel
    pub wheel_id: u8,
    /// Playback direction
    pub direction: Direction,
    /// Current index into the edge array, always within `[0, edge_count)`
    pub position_index: u16,
    /// Invert the primary (crank) channel polarity
    pub invert_primary: bool,
    /// Invert the secondary (cam) channel polarity
    pub invert_secondary: bool,
    /// Bit positions the secondary channel is shifted by on the port
    pub cam_bit_offset: i8,
}

/// Fixed-speed output target, derived once per command
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
struct FixedTarget {
    /// Requested RPM
    rpm: u32,
    /// Compare value realizing it on the selected wheel
    compare: u16,
    /// Divider the compare value is expressed in
    prescaler: Prescaler,
}

/// Live sweep position, exclusively written by the stepper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SweepCursor {
    /// Index of the active stage
    pub stage_index: usize,
    /// Current ramp direction
    pub ramp: Ramp,
    /// Scaled sub-tick accumulator (see `FRACTION_SCALE`)
    pub remainder_accumulator: u32,
    /// Whole ticks carried out of the accumulator, not yet applied
    pub fraction_owed: u16,
    /// Compare value the edge player will load next
    pub live_compare: u16,
    /// Divider last handed to the edge player
    last_prescaler: Prescaler,
    /// Stage transition wants a divider reload on the next correction
    reload_prescaler: bool,
}

impl SweepCursor {
    fn reset(plan: &SweepPlan) -> Self {
        let first = plan.stages[0];
        Self {
            stage_index: 0,
            ramp: Ramp::Accelerating,
            remainder_accumulator: 0,
            fraction_owed: 0,
            live_compare: first.start_compare,
            last_prescaler: first.prescaler,
            reload_prescaler: true,
        }
    }
}

/// Read-only status snapshot for the command/telemetry layer
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    /// Selected wheel id
    pub wheel_id: u8,
    /// Selected wheel display name
    pub wheel_name: &'static str,
    /// Current operating mode
    pub mode: OperatingMode,
    /// Fixed-speed target RPM (last one commanded)
    pub fixed_rpm: u32,
    /// Active sweep request, if sweeping
    pub sweep: Option<SweepRequest>,
    /// Playback direction
    pub direction: Direction,
}

/// The timing engine state aggregate
#[derive(Debug)]
pub struct Engine {
    selection: RuntimeSelection,
    /// Cached definition for `selection.wheel_id`; avoids a fallible
    /// catalog lookup inside the edge player
    wheel: &'static WheelDefinition,
    mode: OperatingMode,
    fixed: FixedTarget,
    plan: Option<SweepPlan>,
    cursor: SweepCursor,
    /// Divider change staged for the edge player, applied only at an
    /// edge boundary
    pending_prescaler: Option<Prescaler>,
    /// Advisory guard: held by the command path while it replaces the
    /// plan; the stepper skips its tick entirely while it is set
    plan_guard: bool,
}

/// Startup RPM before any command arrives
pub const DEFAULT_RPM: u32 = 3000;

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Create an engine at safe defaults: reference wheel, fixed speed
    pub fn new() -> Self {
        let wheel_id = wheel::DEFAULT_WHEEL;
        let wheel = &wheel::WHEELS[wheel_id as usize];
        let fixed = Self::fixed_target(DEFAULT_RPM, wheel);
        Self {
            selection: RuntimeSelection {
                wheel_id,
                direction: Direction::Forward,
                position_index: 0,
                invert_primary: false,
                invert_secondary: false,
                cam_bit_offset: 0,
            },
            wheel,
            mode: OperatingMode::FixedSpeed,
            fixed,
            plan: None,
            cursor: SweepCursor {
                stage_index: 0,
                ramp: Ramp::Accelerating,
                remainder_accumulator: 0,
                fraction_owed: 0,
                live_compare: fixed.compare,
                last_prescaler: fixed.prescaler,
                reload_prescaler: false,
            },
            pending_prescaler: Some(fixed.prescaler),
            plan_guard: false,
        }
    }

    /// Current selection state
    pub fn selection(&self) -> &RuntimeSelection {
        &self.selection
    }

    /// Current operating mode
    pub fn mode(&self) -> OperatingMode {
        self.mode
    }

    /// The active sweep cursor (meaningful while sweeping)
    pub fn cursor(&self) -> &SweepCursor {
        &self.cursor
    }

    /// The published plan, if any
    pub fn plan(&self) -> Option<&SweepPlan> {
        self.plan.as_ref()
    }

    /// Snapshot for reporting
    pub fn status(&self) -> Status {
        Status {
            wheel_id: self.selection.wheel_id,
            wheel_name: self.wheel.name,
            mode: self.mode,
            fixed_rpm: self.fixed.rpm,
            sweep: match self.mode {
                OperatingMode::Sweeping => self.plan.as_ref().map(|p| p.request),
                OperatingMode::FixedSpeed => None,
            },
            direction: self.selection.direction,
        }
    }

    /// Select a wheel by catalog id
    ///
    /// Retargets the output for the new wheel's speed scale: the fixed
    /// compare value is recomputed, or the active sweep plan rebuilt for
    /// the same (low, high, rate) request. Playback restarts at edge 0.
    pub fn select_wheel(&mut self, id: u8) -> Result<(), EngineError> {
        let new_wheel = wheel::lookup(id)?;
        // Build everything that can fail before touching shared state
        match self.mode {
            OperatingMode::FixedSpeed => {
                let fixed = Self::fixed_target(self.fixed.rpm, new_wheel);
                self.lock_plan();
                self.fixed = fixed;
                self.pending_prescaler = Some(fixed.prescaler);
                self.commit_wheel(id, new_wheel);
                self.unlock_plan();
            }
            OperatingMode::Sweeping => {
                let request = match self.plan.as_ref() {
                    Some(plan) => plan.request,
                    None => return Err(EngineError::InvalidRange),
                };
                let plan = sweep::build_plan(request, new_wheel.speed_scale)?;
                self.lock_plan();
                self.cursor = SweepCursor::reset(&plan);
                self.plan = Some(plan);
                self.commit_wheel(id, new_wheel);
                self.unlock_plan();
            }
        }
        Ok(())
    }

    fn commit_wheel(&mut self, id: u8, new_wheel: &'static WheelDefinition) {
        self.selection.wheel_id = id;
        self.wheel = new_wheel;
        self.selection.position_index = 0;
    }

    /// Select the next wheel, wrapping at the end of the catalog
    pub fn next_wheel(&mut self) -> Result<(), EngineError> {
        let id = (self.selection.wheel_id + 1) % wheel::wheel_count();
        self.select_wheel(id)
    }

    /// Select the previous wheel, wrapping at the start of the catalog
    pub fn previous_wheel(&mut self) -> Result<(), EngineError> {
        let count = wheel::wheel_count();
        let id = (self.selection.wheel_id + count - 1) % count;
        self.select_wheel(id)
    }

    /// Set the playback direction
    pub fn set_direction(&mut self, direction: Direction) {
        self.selection.direction = direction;
    }

    /// Set the per-channel output polarity
    pub fn set_invert(&mut self, primary: bool, secondary: bool) {
        self.selection.invert_primary = primary;
        self.selection.invert_secondary = secondary;
    }

    /// Move the secondary channel to a different output bit
    ///
    /// Offset is relative to the pattern's own bit 1; `-1` folds the cam
    /// onto bit 0's neighbor slot below, positive values shift it up.
    pub fn shift_cam(&mut self, offset: i8) -> Result<(), EngineError> {
        if !(CAM_OFFSET_MIN..=CAM_OFFSET_MAX).contains(&offset) {
            return Err(EngineError::InvalidRange);
        }
        self.selection.cam_bit_offset = offset;
        Ok(())
    }

    /// Switch to fixed-speed mode at the given RPM
    ///
    /// Discards any active sweep plan. The divider change rides the
    /// pending-prescaler handshake and takes effect at the next edge.
    pub fn set_fixed_speed(&mut self, rpm: u32) -> Result<(), EngineError> {
        if rpm < RPM_MIN {
            return Err(EngineError::InvalidRange);
        }
        let fixed = Self::fixed_target(rpm, self.wheel);
        self.lock_plan();
        self.plan = None;
        self.mode = OperatingMode::FixedSpeed;
        self.fixed = fixed;
        self.pending_prescaler = Some(fixed.prescaler);
        self.unlock_plan();
        Ok(())
    }

    /// Build and publish a sweep plan for (low, high, rate)
    ///
    /// Validates and builds the whole plan before taking the guard; a
    /// rejected or failed request leaves the previous mode and plan
    /// untouched.
    pub fn start_sweep(&mut self, low_rpm: u32, high_rpm: u32, rate: u32) -> Result<(), EngineError> {
        let request = SweepRequest {
            low_rpm,
            high_rpm,
            rate,
        };
        let plan = sweep::build_plan(request, self.wheel.speed_scale)?;
        self.lock_plan();
        self.cursor = SweepCursor::reset(&plan);
        self.plan = Some(plan);
        self.mode = OperatingMode::Sweeping;
        self.unlock_plan();
        Ok(())
    }

    /// Derive the fixed-speed target for an RPM on a given wheel
    fn fixed_target(rpm: u32, wheel: &WheelDefinition) -> FixedTarget {
        // rpm >= RPM_MIN is guaranteed by the callers, so the conversion
        // cannot fail; fall back to the slowest representable speed if
        // that invariant is ever broken.
        let raw = ticks_for_rpm(rpm, wheel.speed_scale).unwrap_or(u32::MAX);
        let prescaler = Prescaler::select(raw);
        FixedTarget {
            rpm,
            compare: compare_for_ticks(raw, prescaler),
            prescaler,
        }
    }

    fn lock_plan(&mut self) {
        self.plan_guard = true;
    }

    fn unlock_plan(&mut self) {
        self.plan_guard = false;
    }

    /// Hold the plan guard, as the command path does mid-publication
    #[cfg(test)]
    pub(crate) fn hold_guard(&mut self, held: bool) {
        self.plan_guard = held;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::sweep::RPM_LIMIT;

    #[test]
    fn test_defaults_are_safe() {
        let engine = Engine::new();
        assert_eq!(engine.mode(), OperatingMode::FixedSpeed);
        assert_eq!(engine.selection().wheel_id, wheel::DEFAULT_WHEEL);
        assert_eq!(engine.selection().position_index, 0);
        assert_eq!(engine.status().fixed_rpm, DEFAULT_RPM);
    }

    #[test]
    fn test_fixed_speed_scenario_3000_rpm() {
        // Reference wheel, 8 MHz clock: 8e6 / 3000 = 2666.7 -> 2667
        let mut engine = Engine::new();
        engine.set_fixed_speed(3000).unwrap();
        assert_eq!(engine.fixed.compare, 2667);
        assert_eq!(engine.fixed.prescaler, Prescaler::Div1);
    }

    #[test]
    fn test_fixed_speed_below_minimum_rejected() {
        let mut engine = Engine::new();
        engine.start_sweep(1000, 4000, 500).unwrap();
        assert_eq!(engine.set_fixed_speed(9), Err(EngineError::InvalidRange));
        // Rejection committed nothing: still sweeping
        assert_eq!(engine.mode(), OperatingMode::Sweeping);
    }

    #[test]
    fn test_select_wheel_out_of_range() {
        let mut engine = Engine::new();
        let before = *engine.selection();
        assert_eq!(
            engine.select_wheel(wheel::wheel_count()),
            Err(EngineError::OutOfRange)
        );
        assert_eq!(engine.selection().wheel_id, before.wheel_id);
        assert_eq!(engine.selection().position_index, before.position_index);
    }

    #[test]
    fn test_select_wheel_resets_position_and_retargets() {
        let mut engine = Engine::new();
        engine.selection.position_index = 57;
        let compare_before = engine.fixed.compare;
        engine.select_wheel(0).unwrap();
        assert_eq!(engine.selection().position_index, 0);
        // 4-edge dizzy runs its edge clock 30x slower at the same RPM
        assert_ne!(engine.fixed.compare, compare_before);
    }

    #[test]
    fn test_wheel_change_while_sweeping_rebuilds_plan() {
        let mut engine = Engine::new();
        engine.start_sweep(1000, 4000, 500).unwrap();
        let stage0_before = engine.plan().unwrap().stages[0];
        engine.select_wheel(3).unwrap(); // 36-1, scale 3/5
        assert_eq!(engine.mode(), OperatingMode::Sweeping);
        let plan = engine.plan().unwrap();
        assert_eq!(plan.request.low_rpm, 1000);
        assert_eq!(plan.request.high_rpm, 4000);
        assert_ne!(plan.stages[0], stage0_before);
        // Cursor restarted at stage 0
        assert_eq!(engine.cursor().stage_index, 0);
        assert_eq!(engine.cursor().ramp, Ramp::Accelerating);
        assert_eq!(engine.cursor().live_compare, plan.stages[0].start_compare);
    }

    #[test]
    fn test_next_previous_wheel_wraps() {
        let mut engine = Engine::new();
        engine.select_wheel(wheel::wheel_count() - 1).unwrap();
        engine.next_wheel().unwrap();
        assert_eq!(engine.selection().wheel_id, 0);
        engine.previous_wheel().unwrap();
        assert_eq!(engine.selection().wheel_id, wheel::wheel_count() - 1);
    }

    #[test]
    fn test_start_sweep_two_stages() {
        let mut engine = Engine::new();
        engine.start_sweep(1000, 4000, 500).unwrap();
        assert_eq!(engine.plan().unwrap().stages.len(), 2);
        assert_eq!(engine.mode(), OperatingMode::Sweeping);
    }

    #[test]
    fn test_start_sweep_invalid_keeps_mode() {
        let mut engine = Engine::new();
        assert_eq!(
            engine.start_sweep(4000, 1000, 500),
            Err(EngineError::InvalidRange)
        );
        assert_eq!(
            engine.start_sweep(10, RPM_LIMIT, 500),
            Err(EngineError::InvalidRange)
        );
        assert_eq!(engine.mode(), OperatingMode::FixedSpeed);
        assert!(engine.plan().is_none());
    }

    #[test]
    fn test_shift_cam_range() {
        let mut engine = Engine::new();
        engine.shift_cam(2).unwrap();
        assert_eq!(engine.selection().cam_bit_offset, 2);
        assert_eq!(engine.shift_cam(7), Err(EngineError::InvalidRange));
        assert_eq!(engine.selection().cam_bit_offset, 2);
    }
}
