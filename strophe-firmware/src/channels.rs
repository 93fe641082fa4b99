//! Inter-task communication primitives
//!
//! The engine is shared between the edge player, the sweep stepper and the
//! command dispatcher. All three run on the same executor, so a blocking
//! critical-section mutex around a `RefCell` is enough; no task ever holds
//! it across an await point.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;

use strophe_core::{Command, Engine};

/// The simulation engine, shared between all tasks
pub type SharedEngine = Mutex<CriticalSectionRawMutex, RefCell<Engine>>;

/// Commands from the transport to the engine (depth 8)
pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, Command, 8> = Channel::new();
