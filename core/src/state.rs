use crate::constants::{
    DISPLAY_SIZE, MAX_ROM_SIZE, MEMORY_SIZE, REGISTER_COUNT, ROM_OFFSET, STACK_SIZE,
};
use crate::error::{Fault, MachineError};
use crate::font::load_font;

/// The FrameBuffer is row-major: pixel (x, y) lives at `y * DISPLAY_WIDTH + x`.
pub type FrameBuffer = [u8; DISPLAY_SIZE];

/// The part of the machine only the interpreter thread touches.
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) is the carry/collision flag
/// - (i) a memory address register; only its low 12 bits address memory
///
/// Counter
/// - (pc) the address of the next instruction
///
/// Pointer
/// - (sp) the number of return addresses on the stack
///
/// ## Memory
/// - 16 slot stack of return addresses
/// - 4096 bytes of addressable memory
///     - 0x000..0x050 hold the font, the rest of 0x000..0x200 is reserved
///     - ROMs are loaded at 0x200
///
/// Timers and the frame buffer are shared with other threads and live in `Shared`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
    pub v: [u8; REGISTER_COUNT],
    pub i: u16,
    pub pc: u16,
    pub sp: u8,
    pub stack: [u16; STACK_SIZE],
    pub memory: [u8; MEMORY_SIZE],
}

impl State {
    /// Powered-on state: font loaded, nothing else in memory.
    pub fn new() -> Self {
        let mut memory = [0; MEMORY_SIZE];
        load_font(&mut memory);

        State {
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: ROM_OFFSET as u16,
            sp: 0,
            stack: [0; STACK_SIZE],
            memory,
        }
    }

    /// Powered-on state with `rom` copied to 0x200.
    pub fn with_rom(rom: &[u8]) -> Result<Self, MachineError> {
        if rom.len() > MAX_ROM_SIZE {
            return Err(MachineError::RomTooLarge {
                size: rom.len(),
                max: MAX_ROM_SIZE,
            });
        }
        let mut state = State::new();
        state.memory[ROM_OFFSET..ROM_OFFSET + rom.len()].copy_from_slice(rom);
        Ok(state)
    }

    /// The address I points at, reduced to 12 bits.
    pub fn index(&self) -> usize {
        usize::from(self.i & 0x0FFF)
    }

    /// Borrows `len` bytes starting at `address`, faulting instead of running off the end.
    pub fn bytes(&self, address: usize, len: usize) -> Result<&[u8], Fault> {
        match address.checked_add(len) {
            Some(end) if end <= MEMORY_SIZE => Ok(&self.memory[address..end]),
            _ => Err(Fault::MemoryOutOfBounds {
                address: address + len.saturating_sub(1),
            }),
        }
    }

    /// Mutable counterpart of `bytes`.
    pub fn bytes_mut(&mut self, address: usize, len: usize) -> Result<&mut [u8], Fault> {
        match address.checked_add(len) {
            Some(end) if end <= MEMORY_SIZE => Ok(&mut self.memory[address..end]),
            _ => Err(Fault::MemoryOutOfBounds {
                address: address + len.saturating_sub(1),
            }),
        }
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}
