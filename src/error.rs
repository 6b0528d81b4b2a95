use std::io;

use thiserror::Error;

/// Everything that can stop the machine. All of these are fatal: once one is
/// returned the processor should not be stepped again.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error("ROM is too large ({size} bytes), max size is {max} bytes")]
    RomTooLarge { size: usize, max: usize },

    #[error("could not read ROM: {0}")]
    RomUnreadable(#[from] io::Error),

    #[error("unknown instruction {word:#06X} at {pc:#05X}")]
    UnknownOpcode { word: u16, pc: u16 },

    #[error("program counter {pc:#06X} is outside addressable memory")]
    PcOutOfRange { pc: u16 },

    #[error("call stack overflow at {pc:#05X}")]
    StackOverflow { pc: u16 },

    #[error("return with empty call stack at {pc:#05X}")]
    StackUnderflow { pc: u16 },

    #[error("memory access out of bounds at address {address:#06X}")]
    MemoryOutOfBounds { address: usize },

    #[error("could not read key input: {0}")]
    InputUnreadable(#[source] io::Error),

    #[error("key {0:#04X} is not on the hex keypad")]
    InvalidKey(u8),
}

pub type Result<T> = std::result::Result<T, MachineError>;
