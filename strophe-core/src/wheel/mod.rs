//! Wheel pattern catalog
//!
//! A wheel is a flat, restartable array of edge states: the edge player
//! walks the array at the current tick cadence and wraps at the end, so
//! one pass over the array is one revolution of the simulated wheel
//! (two, for patterns that carry a cam channel across a full cycle).
//!
//! Bit 0 of an edge state is the primary (crank) channel; bit 1 carries
//! the secondary (cam) channel for wheels that define one.

use crate::error::EngineError;

pub mod patterns;

/// Speed scaling factor relative to the reference wheel
///
/// The reference is the 60-2 with 120 edges per revolution; a wheel that
/// needs fewer edges per revolution runs its edge clock proportionally
/// slower for the same RPM. Kept as an exact rational so the conversion
/// math stays in integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeedScale {
    /// Numerator of the ratio
    pub num: u32,
    /// Denominator of the ratio
    pub den: u32,
}

impl SpeedScale {
    /// Exact ratio `num / den` to the reference wheel
    pub const fn new(num: u32, den: u32) -> Self {
        Self { num, den }
    }
}

/// An immutable wheel pattern definition
///
/// Externally supplied, process-lifetime constant, looked up by id
/// (its index in [`WHEELS`]).
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WheelDefinition {
    /// Display name
    pub name: &'static str,
    /// Ordered edge states, wrapped cyclically by the edge player
    pub edges: &'static [u8],
    /// RPM scaling ratio to the reference wheel
    pub speed_scale: SpeedScale,
}

impl WheelDefinition {
    /// Number of edges in the pattern
    pub fn edge_count(&self) -> u16 {
        self.edges.len() as u16
    }
}

/// The static wheel catalog
pub const WHEELS: &[WheelDefinition] = &[
    WheelDefinition {
        name: "4 cylinder dizzy",
        edges: &patterns::DIZZY_FOUR_CYLINDER,
        speed_scale: SpeedScale::new(1, 30),
    },
    WheelDefinition {
        name: "6 cylinder dizzy",
        edges: &patterns::DIZZY_SIX_CYLINDER,
        speed_scale: SpeedScale::new(1, 20),
    },
    WheelDefinition {
        name: "8 cylinder dizzy",
        edges: &patterns::DIZZY_EIGHT_CYLINDER,
        speed_scale: SpeedScale::new(1, 15),
    },
    WheelDefinition {
        name: "36-1 crank",
        edges: &patterns::THIRTY_SIX_MINUS_ONE,
        speed_scale: SpeedScale::new(3, 5),
    },
    WheelDefinition {
        name: "60-2 crank",
        edges: &patterns::SIXTY_MINUS_TWO,
        speed_scale: SpeedScale::new(1, 1),
    },
    WheelDefinition {
        name: "GM 60-2 with 4X cam",
        edges: &patterns::SIXTY_MINUS_TWO_WITH_4X_CAM,
        speed_scale: SpeedScale::new(1, 1),
    },
    WheelDefinition {
        name: "36-2-2-2 crank",
        edges: &patterns::THIRTY_SIX_MINUS_TWO_TWO_TWO,
        speed_scale: SpeedScale::new(3, 5),
    },
];

/// Catalog id of the reference wheel (60-2), the startup default
pub const DEFAULT_WHEEL: u8 = 4;

/// Number of wheels in the catalog
pub fn wheel_count() -> u8 {
    WHEELS.len() as u8
}

/// Look a wheel up by id
pub fn lookup(id: u8) -> Result<&'static WheelDefinition, EngineError> {
    WHEELS.get(id as usize).ok_or(EngineError::OutOfRange)
}
