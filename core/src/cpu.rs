use std::sync::Arc;

use log::{trace, warn};

use crate::constants::{KEY_COUNT, OPCODE_SIZE};
use crate::error::Fault;
use crate::host::Host;
use crate::instruction;
use crate::opcode::Opcode;
use crate::shared::Shared;
use crate::state::State;

/// What the instruction clock should do after an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// FX0A found no key; the same instruction runs again once the clock has waited.
    AwaitingKey,
}

/// # CPU
/// Binds the interpreter-owned `State` to the shared fields and the host hooks for the
/// duration of a run. Lives on the interpreter thread.
pub struct Cpu {
    pub state: State,
    pub shared: Arc<Shared>,
    host: Arc<dyn Host>,
}

impl Cpu {
    pub fn new(state: State, shared: Arc<Shared>, host: Arc<dyn Host>) -> Self {
        Cpu {
            state,
            shared,
            host,
        }
    }

    /// Gives the state back once the run is over.
    pub fn into_state(self) -> State {
        self.state
    }

    /// Fetches, decodes and executes a single instruction.
    pub fn step(&mut self) -> Result<Flow, Fault> {
        let op = self.fetch()?;
        trace!(
            "{} v{:02X?} i{:04X} pc{:04X}",
            op,
            self.state.v,
            self.state.i,
            self.state.pc
        );
        self.execute(op)
    }

    /// Executes `op` as if it had just been fetched.
    pub fn execute(&mut self, op: Opcode) -> Result<Flow, Fault> {
        match instruction::decode(op) {
            Some(operation) => operation(self, op),
            None => {
                warn!(
                    "skipping unimplemented instruction {} at {:#05X}",
                    op,
                    self.state.pc.wrapping_sub(OPCODE_SIZE)
                );
                Ok(Flow::Continue)
            }
        }
    }

    /// Reads the big-endian word at the pc and moves the pc past it.
    fn fetch(&mut self) -> Result<Opcode, Fault> {
        let word = self.state.bytes(usize::from(self.state.pc), 2)?;
        let op = Opcode::from_bytes(word[0], word[1]);
        self.state.pc = self.state.pc.wrapping_add(OPCODE_SIZE);
        Ok(op)
    }

    /// Asks the host for the held key, discarding anything off the keypad.
    pub fn key(&self) -> Option<u8> {
        self.host.key().filter(|&key| key < KEY_COUNT)
    }

    pub fn start_tone(&self) {
        self.host.start_tone();
    }
}
