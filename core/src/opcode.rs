use std::fmt;

/// # Opcodes
///
/// Chip-8 instructions are 16 bits wide, stored big-endian. Their behavior is cased on:
/// - `(n, _, _, _)` the family; applies to all opcodes
/// - `(_, _, _, n)` the operation within family `0x8`
/// - `(_, _, n, n)` the operation within families `0x0`, `0xE` and `0xF`
///
/// Nibbles not used to select the operation carry its operands.
/// - `(_, n, n, n)` a 12-bit address
/// - `(_, _, n, n)` an immediate byte assigned to and/or compared with Vx
/// - `(_, n, _, _)` the register Vx, or the range V0..=Vx
/// - `(_, _, n, _)` the register Vy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Opcode(pub u16);

impl Opcode {
    /// Joins the two bytes of an instruction as they sit in memory.
    pub fn from_bytes(high: u8, low: u8) -> Self {
        Opcode(u16::from_be_bytes([high, low]))
    }

    /// `[f___]`
    pub fn family(self) -> u8 {
        ((self.0 & 0xF000) >> 12) as u8
    }

    /// `[_x__]`
    pub fn x(self) -> usize {
        usize::from((self.0 & 0x0F00) >> 8)
    }

    /// `[__y_]`
    pub fn y(self) -> usize {
        usize::from((self.0 & 0x00F0) >> 4)
    }

    /// `[___n]`
    pub fn n(self) -> u8 {
        (self.0 & 0x000F) as u8
    }

    /// `[__kk]`
    pub fn kk(self) -> u8 {
        (self.0 & 0x00FF) as u8
    }

    /// `[_adr]`
    pub fn addr(self) -> u16 {
        self.0 & 0x0FFF
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}
