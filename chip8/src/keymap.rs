use sdl2::keyboard::Keycode;

/// # Keymap
/// Chip-8 input is generated with a hexadecimal keypad.
///
/// This original layout is mapped to the left 4 alphanumeric columns.
/// ```text
/// |1|2|3|C|      |1|2|3|4|
/// |4|5|6|D|  ->  |Q|W|E|R|
/// |7|8|9|E|  ->  |A|S|D|F|
/// |A|0|B|F|      |Z|X|C|V|
/// ```
pub fn keymap(key: Keycode) -> Option<u8> {
    match key {
        Keycode::X => Some(0x0),
        Keycode::Num1 => Some(0x1),
        Keycode::Num2 => Some(0x2),
        Keycode::Num3 => Some(0x3),
        Keycode::Q => Some(0x4),
        Keycode::W => Some(0x5),
        Keycode::E => Some(0x6),
        Keycode::A => Some(0x7),
        Keycode::S => Some(0x8),
        Keycode::D => Some(0x9),
        Keycode::Z => Some(0xA),
        Keycode::C => Some(0xB),
        Keycode::Num4 => Some(0xC),
        Keycode::R => Some(0xD),
        Keycode::F => Some(0xE),
        Keycode::V => Some(0xF),
        _ => None,
    }
}

/// Emulator controls, kept off the keypad columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    TogglePause,
    Save,
    Load,
    Reset,
    Faster,
    Slower,
    Quit,
}

pub fn control(key: Keycode) -> Option<Control> {
    match key {
        Keycode::P => Some(Control::TogglePause),
        Keycode::F5 => Some(Control::Save),
        Keycode::F9 => Some(Control::Load),
        Keycode::Backspace => Some(Control::Reset),
        Keycode::Plus | Keycode::Equals | Keycode::KpPlus => Some(Control::Faster),
        Keycode::Minus | Keycode::KpMinus => Some(Control::Slower),
        Keycode::Escape => Some(Control::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypad_is_a_bijection() {
        let mut seen = [false; 16];
        for key in [
            Keycode::Num1, Keycode::Num2, Keycode::Num3, Keycode::Num4,
            Keycode::Q, Keycode::W, Keycode::E, Keycode::R,
            Keycode::A, Keycode::S, Keycode::D, Keycode::F,
            Keycode::Z, Keycode::X, Keycode::C, Keycode::V,
        ] {
            let value = keymap(key).unwrap();
            assert!(!seen[usize::from(value)]);
            seen[usize::from(value)] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_controls_stay_off_the_keypad() {
        for key in [Keycode::P, Keycode::F5, Keycode::F9, Keycode::Backspace, Keycode::Escape] {
            assert!(control(key).is_some());
            assert!(keymap(key).is_none());
        }
    }
}
