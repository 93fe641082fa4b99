//! Hardware abstraction traits

mod timer;

pub use timer::OutputTimer;
