pub use config::Config;
pub use error::{Fault, MachineError, Result};
pub use host::{Headless, Host};
pub use machine::Machine;
pub use shared::RunState;
pub use snapshot::Snapshot;
pub use state::{FrameBuffer, State};

mod clock;
pub mod config;
pub mod constants;
mod cpu;
pub mod error;
mod font;
pub mod host;
mod instruction;
mod machine;
mod opcode;
mod operations;
mod shared;
pub mod snapshot;
pub mod state;
