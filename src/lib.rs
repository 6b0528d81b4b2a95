//! An interpreter for the 64x32 monochrome 8-bit VM used by early hobbyist
//! games: 4K of memory, sixteen byte registers, a 16-deep call stack and two
//! countdown timers, driven one two-byte instruction at a time.
//!
//! The machine talks to the outside world only through [`InputSource`] (which
//! key is held) and [`OutputSink`] (frames and beeps); windows, terminals and
//! audio are left to whoever implements those.

pub mod consts;
pub mod core;
pub mod error;
pub mod external;
pub mod utils;

pub use crate::core::driver::{Driver, DriverConfig, RunSummary, StopHandle};
pub use crate::core::instruction::Instruction;
pub use crate::core::processor::{CycleStatus, Processor};
pub use crate::core::rom::Rom;
pub use crate::error::{MachineError, Result};
pub use crate::external::{FrameSink, InputSource, Keypad, NullSink, OutputSink};
