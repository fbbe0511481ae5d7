/// Bytes per glyph; glyph `n` lives at address `n * FONT_CHARACTER_SIZE`.
pub const FONT_CHARACTER_SIZE: u8 = 5;

/// # Font
/// Sixteen 4x5 hexadecimal glyphs (0..F), one byte per row with the glyph in the high nibble.
///
/// ```text
/// 0xF0  ####
/// 0x90  #  #
/// 0x90  #  #
/// 0x90  #  #
/// 0xF0  ####
/// ```
pub const FONT: [[u8; FONT_CHARACTER_SIZE as usize]; 16] = [
    [0xF0, 0x90, 0x90, 0x90, 0xF0], // 0
    [0x20, 0x60, 0x20, 0x20, 0x70], // 1
    [0xF0, 0x10, 0xF0, 0x80, 0xF0], // 2
    [0xF0, 0x10, 0xF0, 0x10, 0xF0], // 3
    [0x90, 0x90, 0xF0, 0x10, 0x10], // 4
    [0xF0, 0x80, 0xF0, 0x10, 0xF0], // 5
    [0xF0, 0x80, 0xF0, 0x90, 0xF0], // 6
    [0xF0, 0x10, 0x20, 0x40, 0x40], // 7
    [0xF0, 0x90, 0xF0, 0x90, 0xF0], // 8
    [0xF0, 0x90, 0xF0, 0x10, 0xF0], // 9
    [0xF0, 0x90, 0xF0, 0x90, 0x90], // A
    [0xE0, 0x90, 0xE0, 0x90, 0xE0], // B
    [0xF0, 0x80, 0x80, 0x80, 0xF0], // C
    [0xE0, 0x90, 0x90, 0x90, 0xE0], // D
    [0xF0, 0x80, 0xF0, 0x80, 0xF0], // E
    [0xF0, 0x80, 0xF0, 0x80, 0x80], // F
];

/// Copies every glyph into the start of `memory`.
pub fn load_font(memory: &mut [u8]) {
    for (glyph, rows) in FONT.iter().enumerate() {
        let start = glyph * FONT_CHARACTER_SIZE as usize;
        memory[start..start + rows.len()].copy_from_slice(rows);
    }
}
