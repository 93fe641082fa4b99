//! Async tasks
//!
//! One task per execution context of the engine: the edge player (highest
//! cadence, paced by the compare interval), the sweep stepper (fixed 1 kHz
//! correction tick) and the command dispatcher (event driven).

mod command;
mod edge;
mod sweep;

pub use command::command_task;
pub use edge::edge_task;
pub use sweep::sweep_task;
