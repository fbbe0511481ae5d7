use std::io::{Read, Write};

use crate::constants::{DISPLAY_SIZE, MEMORY_SIZE, REGISTER_COUNT, STACK_SIZE};
use crate::error::{MachineError, Result};
use crate::shared::Shared;
use crate::state::{FrameBuffer, State};

const MAGIC: &[u8; 4] = b"C8SS";
const VERSION: u8 = 1;

/// Bytes in an encoded snapshot, header included.
pub const SNAPSHOT_SIZE: usize = MAGIC.len()
    + 1
    + MEMORY_SIZE
    + 2
    + REGISTER_COUNT
    + 2
    + STACK_SIZE * 2
    + 3
    + DISPLAY_SIZE;

/// Every field that makes up a machine's observable state at one instant.
///
/// The encoding is the magic `C8SS`, a version byte, then memory, pc, v, i, stack, sp,
/// delay timer, sound timer and frame buffer in that order, words little-endian.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub state: State,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub frame_buffer: FrameBuffer,
}

impl Snapshot {
    /// Copies the interpreter state and the shared fields; the shared fields are read under one lock.
    pub fn capture(state: &State, shared: &Shared) -> Self {
        let shared = shared.snapshot();
        Snapshot {
            state: state.clone(),
            delay_timer: shared.delay_timer,
            sound_timer: shared.sound_timer,
            frame_buffer: shared.frame_buffer,
        }
    }

    /// Overwrites `state` and the shared machine fields with this snapshot.
    pub fn apply(&self, state: &mut State, shared: &Shared) {
        *state = self.state.clone();
        shared.restore(self.delay_timer, self.sound_timer, &self.frame_buffer);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let state = &self.state;
        let mut bytes = Vec::with_capacity(SNAPSHOT_SIZE);
        bytes.extend_from_slice(MAGIC);
        bytes.push(VERSION);
        bytes.extend_from_slice(&state.memory);
        bytes.extend_from_slice(&state.pc.to_le_bytes());
        bytes.extend_from_slice(&state.v);
        bytes.extend_from_slice(&state.i.to_le_bytes());
        for address in state.stack.iter() {
            bytes.extend_from_slice(&address.to_le_bytes());
        }
        bytes.push(state.sp);
        bytes.push(self.delay_timer);
        bytes.push(self.sound_timer);
        bytes.extend_from_slice(&self.frame_buffer);
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < SNAPSHOT_SIZE {
            return Err(invalid(format!(
                "truncated: {} of {} bytes",
                bytes.len(),
                SNAPSHOT_SIZE
            )));
        }
        if bytes.len() > SNAPSHOT_SIZE {
            return Err(invalid(format!(
                "{} trailing bytes",
                bytes.len() - SNAPSHOT_SIZE
            )));
        }

        let mut reader = Reader { bytes };
        if reader.take(MAGIC.len()) != MAGIC {
            return Err(invalid("bad magic".to_string()));
        }
        let version = reader.byte();
        if version != VERSION {
            return Err(invalid(format!("unsupported version {}", version)));
        }

        let mut state = State::new();
        state.memory.copy_from_slice(reader.take(MEMORY_SIZE));
        state.pc = reader.word();
        state.v.copy_from_slice(reader.take(REGISTER_COUNT));
        state.i = reader.word();
        for address in state.stack.iter_mut() {
            *address = reader.word();
        }
        state.sp = reader.byte();
        if usize::from(state.sp) > STACK_SIZE {
            return Err(invalid(format!("stack pointer {} out of range", state.sp)));
        }
        let delay_timer = reader.byte();
        let sound_timer = reader.byte();
        let mut frame_buffer = [0; DISPLAY_SIZE];
        frame_buffer.copy_from_slice(reader.take(DISPLAY_SIZE));
        if let Some(pixel) = frame_buffer.iter().find(|&&p| p > 1) {
            return Err(invalid(format!("pixel value {} is not 0 or 1", pixel)));
        }

        Ok(Snapshot {
            state,
            delay_timer,
            sound_timer,
            frame_buffer,
        })
    }

    pub fn write_to(&self, writer: &mut impl Write) -> Result<()> {
        writer.write_all(&self.to_bytes())?;
        Ok(())
    }

    pub fn read_from(reader: &mut impl Read) -> Result<Self> {
        let mut bytes = Vec::with_capacity(SNAPSHOT_SIZE);
        reader.read_to_end(&mut bytes)?;
        Snapshot::from_bytes(&bytes)
    }
}

fn invalid(reason: String) -> MachineError {
    MachineError::InvalidSnapshot(reason)
}

/// Cursor over a buffer already checked to be exactly `SNAPSHOT_SIZE` long.
struct Reader<'a> {
    bytes: &'a [u8],
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> &'a [u8] {
        let (head, tail) = self.bytes.split_at(len);
        self.bytes = tail;
        head
    }

    fn byte(&mut self) -> u8 {
        self.take(1)[0]
    }

    fn word(&mut self) -> u16 {
        let bytes = self.take(2);
        u16::from_le_bytes([bytes[0], bytes[1]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn busy_snapshot() -> Snapshot {
        let mut state = State::with_rom(&[0x60, 0x05, 0x12, 0x02]).unwrap();
        state.pc = 0x0ABC;
        state.i = 0x0123;
        state.sp = 2;
        state.stack[0] = 0x0202;
        state.stack[1] = 0x0456;
        for (r, value) in state.v.iter_mut().enumerate() {
            *value = r as u8 * 3;
        }
        let mut frame_buffer = [0; DISPLAY_SIZE];
        frame_buffer[0] = 1;
        frame_buffer[DISPLAY_SIZE - 1] = 1;
        Snapshot {
            state,
            delay_timer: 9,
            sound_timer: 4,
            frame_buffer,
        }
    }

    #[test]
    fn test_round_trip_is_exact() {
        let snapshot = busy_snapshot();
        let bytes = snapshot.to_bytes();
        assert_eq!(bytes.len(), SNAPSHOT_SIZE);
        assert_eq!(Snapshot::from_bytes(&bytes).unwrap(), snapshot);
    }

    #[test]
    fn test_layout() {
        let bytes = busy_snapshot().to_bytes();
        assert_eq!(&bytes[0..5], b"C8SS\x01");
        // rom at 0x200 inside the memory block
        assert_eq!(bytes[5 + 0x200..5 + 0x202], [0x60, 0x05]);
        let pc = 5 + MEMORY_SIZE;
        assert_eq!(bytes[pc..pc + 2], [0xBC, 0x0A]);
        assert_eq!(bytes[pc + 2 + 1], 3);
        let sp = pc + 2 + REGISTER_COUNT + 2 + STACK_SIZE * 2;
        assert_eq!(bytes[sp..sp + 3], [2, 9, 4]);
    }

    #[test]
    fn test_capture_and_apply_through_shared() {
        let shared = Shared::default();
        shared.set_delay_timer(30);
        shared.with_frame_buffer(|frame| frame[100] = 1);
        let mut state = State::new();
        state.v[0x3] = 0x33;

        let snapshot = Snapshot::capture(&state, &shared);
        shared.reset();
        let mut restored = State::new();
        snapshot.apply(&mut restored, &shared);

        assert_eq!(restored, state);
        assert_eq!(shared.delay_timer(), 30);
        assert_eq!(shared.frame_buffer()[100], 1);
    }

    #[test]
    fn test_write_then_read() {
        let snapshot = busy_snapshot();
        let mut file = Vec::new();
        snapshot.write_to(&mut file).unwrap();
        let loaded = Snapshot::read_from(&mut file.as_slice()).unwrap();
        assert_eq!(loaded, snapshot);
    }

    fn rejection(bytes: &[u8]) -> String {
        match Snapshot::from_bytes(bytes) {
            Err(MachineError::InvalidSnapshot(reason)) => reason,
            other => panic!("expected InvalidSnapshot, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut bytes = busy_snapshot().to_bytes();
        bytes[0] = b'X';
        assert_eq!(rejection(&bytes), "bad magic");
    }

    #[test]
    fn test_rejects_unknown_version() {
        let mut bytes = busy_snapshot().to_bytes();
        bytes[4] = 2;
        assert_eq!(rejection(&bytes), "unsupported version 2");
    }

    #[test]
    fn test_rejects_truncated() {
        let bytes = busy_snapshot().to_bytes();
        assert!(rejection(&bytes[..SNAPSHOT_SIZE - 1]).starts_with("truncated"));
        assert!(rejection(&[]).starts_with("truncated"));
    }

    #[test]
    fn test_rejects_trailing_bytes() {
        let mut bytes = busy_snapshot().to_bytes();
        bytes.push(0);
        assert_eq!(rejection(&bytes), "1 trailing bytes");
    }

    #[test]
    fn test_rejects_stack_pointer_past_stack() {
        let mut bytes = busy_snapshot().to_bytes();
        let sp = 5 + MEMORY_SIZE + 2 + REGISTER_COUNT + 2 + STACK_SIZE * 2;
        bytes[sp] = 16;
        assert!(Snapshot::from_bytes(&bytes).is_ok());
        bytes[sp] = 17;
        assert_eq!(rejection(&bytes), "stack pointer 17 out of range");
    }

    #[test]
    fn test_rejects_non_binary_pixels() {
        let mut bytes = busy_snapshot().to_bytes();
        bytes[SNAPSHOT_SIZE - 1] = 2;
        assert_eq!(rejection(&bytes), "pixel value 2 is not 0 or 1");
    }
}
