//! Error taxonomy for the command surface
//!
//! Every command validates before it commits: an `Err` means no shared
//! state was touched. The interrupt-context routines never return errors;
//! they are total over their state.

/// Errors surfaced to the command layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineError {
    /// Speed or sweep parameters outside the admissible bounds
    InvalidRange,
    /// Unknown wheel id
    OutOfRange,
    /// Sweep plan would exceed the stage vector capacity
    ///
    /// The previous mode and plan are retained unchanged.
    PlanCapacity,
}
