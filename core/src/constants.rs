/// Bytes of addressable memory.
pub const MEMORY_SIZE: usize = 0x1000;

/// Where ROMs are loaded and execution starts.
pub const ROM_OFFSET: usize = 0x200;

/// Largest ROM that fits between `ROM_OFFSET` and the end of memory.
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - ROM_OFFSET;

pub const REGISTER_COUNT: usize = 16;
pub const STACK_SIZE: usize = 16;
pub const KEY_COUNT: u8 = 16;

/// Every instruction is two bytes wide.
pub const OPCODE_SIZE: u16 = 0x2;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;
pub const DISPLAY_SIZE: usize = DISPLAY_WIDTH * DISPLAY_HEIGHT;

/// Rate of the delay and sound timers, independent of the instruction rate.
pub const TIMER_FREQUENCY: u32 = 60;

/// Default number of instructions executed per second.
pub const CYCLE_FREQUENCY: u32 = 700;

/// How many times per second the instruction clock re-syncs with wall time.
pub const BATCH_FREQUENCY: u32 = 50;

/// Where `save_state` / `load_state` put the snapshot unless configured otherwise.
pub const STATE_FILE: &str = "chip8.state";
