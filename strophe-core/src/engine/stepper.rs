//! Sweep stepper: the fixed-cadence correction routine
//!
//! Runs at `SWEEP_TICK_HZ` and nudges the live compare target along the
//! active stage, carrying sub-tick remainders in fixed point so the RPM
//! ramp stays linear even when the per-correction change is less than
//! one compare tick. This is the only place ramp direction and stage
//! transitions are decided.
//!
//! The routine never waits: if the command path holds the plan guard,
//! the whole correction tick is skipped and nothing is mutated.

use super::{Engine, OperatingMode, Ramp};
use crate::timing::sweep::FRACTION_SCALE;

impl Engine {
    /// Advance the sweep by one correction tick
    pub fn correction_tick(&mut self) {
        if self.mode != OperatingMode::Sweeping {
            return;
        }
        if self.plan_guard {
            return;
        }
        let Some(plan) = self.plan.as_ref() else {
            return;
        };

        // A stage transition on the previous tick may have asked for a
        // divider change; stage it for the edge player, which applies it
        // at an edge boundary.
        if self.cursor.reload_prescaler {
            self.cursor.reload_prescaler = false;
            let prescaler = plan.stages[self.cursor.stage_index].prescaler;
            self.pending_prescaler = Some(prescaler);
            self.cursor.last_prescaler = prescaler;
        }

        let stage = plan.stages[self.cursor.stage_index];

        // Fixed-point accumulation of the sub-tick movement; each carry
        // is one whole compare tick owed to the target.
        self.cursor.remainder_accumulator += stage.remainder_per_correction;
        while self.cursor.remainder_accumulator > FRACTION_SCALE {
            self.cursor.fraction_owed += 1;
            self.cursor.remainder_accumulator -= FRACTION_SCALE;
        }

        match self.cursor.ramp {
            Ramp::Accelerating => {
                if self.cursor.live_compare > stage.end_compare {
                    let delta =
                        stage.ticks_per_correction as u32 + self.cursor.fraction_owed as u32;
                    self.cursor.fraction_owed = 0;
                    self.cursor.live_compare = (self.cursor.live_compare as u32)
                        .saturating_sub(delta)
                        .max(stage.end_compare as u32)
                        as u16;
                } else {
                    // Stage end reached: hop to the next stage, or bounce
                    // into deceleration at the top of the sweep.
                    self.cursor.remainder_accumulator = 0;
                    self.cursor.fraction_owed = 0;
                    if self.cursor.stage_index + 1 < plan.stages.len() {
                        self.cursor.stage_index += 1;
                        let next = plan.stages[self.cursor.stage_index];
                        self.cursor.live_compare = next.start_compare;
                        if next.prescaler != self.cursor.last_prescaler {
                            self.cursor.reload_prescaler = true;
                        }
                    } else {
                        self.cursor.ramp = Ramp::Decelerating;
                        self.cursor.live_compare = stage.end_compare;
                    }
                }
            }
            Ramp::Decelerating => {
                if self.cursor.live_compare < stage.start_compare {
                    let delta =
                        stage.ticks_per_correction as u32 + self.cursor.fraction_owed as u32;
                    self.cursor.fraction_owed = 0;
                    self.cursor.live_compare = ((self.cursor.live_compare as u32) + delta)
                        .min(stage.start_compare as u32)
                        as u16;
                } else {
                    self.cursor.remainder_accumulator = 0;
                    self.cursor.fraction_owed = 0;
                    if self.cursor.stage_index > 0 {
                        self.cursor.stage_index -= 1;
                        let next = plan.stages[self.cursor.stage_index];
                        self.cursor.live_compare = next.end_compare;
                        if next.prescaler != self.cursor.last_prescaler {
                            self.cursor.reload_prescaler = true;
                        }
                    } else {
                        self.cursor.ramp = Ramp::Accelerating;
                        self.cursor.live_compare = stage.start_compare;
                    }
                }
            }
        }
    }
}
