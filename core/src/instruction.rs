use crate::cpu::{Cpu, Flow};
use crate::error::Fault;
use crate::opcode::Opcode;
use crate::operations::*;

/// A handler for one instruction.
pub type Operation = fn(&mut Cpu, Opcode) -> Result<Flow, Fault>;

/// Selects the Operation for a given Opcode, or None when it isn't part of the instruction set.
///
/// The family nibble picks the operation directly except for `0x0`, `0x8`, `0xE` and `0xF`,
/// which are narrowed further by their low byte or low nibble. Nibbles that select nothing
/// are ignored, so `5XY1` runs as `5XY0` and `01E0` as `00E0`.
pub fn decode(op: Opcode) -> Option<Operation> {
    match op.family() {
        0x0 => decode_0nnn(op),
        0x1 => Some(jump),
        0x2 => Some(call),
        0x3 => Some(ske),
        0x4 => Some(skne),
        0x5 => Some(skre),
        0x6 => Some(load),
        0x7 => Some(add),
        0x8 => decode_8xyn(op),
        0x9 => Some(skrne),
        0xA => Some(loadi),
        0xB => Some(jumpi),
        0xC => Some(rand),
        0xD => Some(draw),
        0xE => decode_exkk(op),
        0xF => decode_fxkk(op),
        _ => None,
    }
}

fn decode_0nnn(op: Opcode) -> Option<Operation> {
    match op.kk() {
        0xE0 => Some(clr),
        0xEE => Some(rts),
        _ => None,
    }
}

fn decode_8xyn(op: Opcode) -> Option<Operation> {
    match op.n() {
        0x0 => Some(mv),
        0x1 => Some(or),
        0x2 => Some(and),
        0x3 => Some(xor),
        0x4 => Some(addr),
        0x5 => Some(sub),
        0x6 => Some(shr),
        0x7 => Some(subn),
        0xE => Some(shl),
        _ => None,
    }
}

fn decode_exkk(op: Opcode) -> Option<Operation> {
    match op.kk() {
        0x9E => Some(skpr),
        0xA1 => Some(skup),
        _ => None,
    }
}

fn decode_fxkk(op: Opcode) -> Option<Operation> {
    match op.kk() {
        0x07 => Some(moved),
        0x0A => Some(keyd),
        0x15 => Some(loads),
        0x18 => Some(ld),
        0x1E => Some(addi),
        0x29 => Some(ldspr),
        0x33 => Some(bcd),
        0x55 => Some(stor),
        0x65 => Some(read),
        _ => None,
    }
}
