use thiserror::Error;

/// A fault that corrupts machine invariants and ends the current run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("stack overflow: call at {pc:#05X} with every return slot in use")]
    StackOverflow { pc: u16 },

    #[error("stack underflow: return at {pc:#05X} with an empty call stack")]
    StackUnderflow { pc: u16 },

    #[error("memory access out of bounds at {address:#06X}")]
    MemoryOutOfBounds { address: usize },
}

/// Errors surfaced to callers of the control surface.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error("ROM is too large ({size} bytes), max size is {max} bytes")]
    RomTooLarge { size: usize, max: usize },

    #[error("run stopped by fault: {0}")]
    Fault(#[from] Fault),

    #[error("state file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("state can only be restored while paused or stopped")]
    Busy,

    #[error("interpreter thread exited before answering")]
    Disconnected,
}

pub type Result<T> = std::result::Result<T, MachineError>;
