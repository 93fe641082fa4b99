//! Board-agnostic core logic for the trigger wheel simulator
//!
//! This crate contains everything that does not depend on a specific
//! hardware target:
//!
//! - Wheel pattern catalog (edge tables + speed scaling)
//! - RPM <-> compare-value conversion and prescaler selection
//! - Sweep planning (octave stage decomposition)
//! - The two interrupt-context routines: sweep stepper and edge player
//! - Hardware capability trait for the output compare timer
//!
//! The firmware crate wires these to real pins and tickers; on the host
//! the whole engine runs under `cargo test` against a fake timer.

#![no_std]
#![deny(unsafe_code)]

pub mod command;
pub mod engine;
pub mod error;
pub mod timing;
pub mod traits;
pub mod wheel;

pub use command::Command;
pub use engine::Engine;
pub use error::EngineError;
