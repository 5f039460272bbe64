//! Key code definitions and the US layout classifier
//!
//! Key codes use Linux evdev scancode numbering regardless of the input
//! backend, so the control-key configuration and the recorded `vk` column mean
//! the same thing on every platform.

use super::Modifiers;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Represents a physical key code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(pub u16);

impl KeyCode {
    pub const ESCAPE: KeyCode = KeyCode(1);
    pub const BACKSPACE: KeyCode = KeyCode(14);
    pub const ENTER: KeyCode = KeyCode(28);
    pub const LEFT_SHIFT: KeyCode = KeyCode(42);
    pub const RIGHT_SHIFT: KeyCode = KeyCode(54);
    pub const CAPS_LOCK: KeyCode = KeyCode(58);

    const UNMAPPED_BASE: u16 = 0x1000;

    pub fn new(code: u16) -> Self {
        Self(code)
    }

    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Stable code for a backend key with no scancode mapping.
    ///
    /// Codes land above the evdev range, so they never collide with a mapped
    /// key or with the empty-slot code 0.
    fn unmapped(name: &str) -> Self {
        let hash = name
            .bytes()
            .fold(0x811c_9dc5u32, |h, b| (h ^ u32::from(b)).wrapping_mul(0x0100_0193));
        Self(Self::UNMAPPED_BASE + (hash % u32::from(u16::MAX - Self::UNMAPPED_BASE)) as u16)
    }
}

impl From<u16> for KeyCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

impl From<device_query::Keycode> for KeyCode {
    fn from(keycode: device_query::Keycode) -> Self {
        use device_query::Keycode as DK;
        let code = match keycode {
            DK::Escape => 1,
            DK::Key1 => 2,
            DK::Key2 => 3,
            DK::Key3 => 4,
            DK::Key4 => 5,
            DK::Key5 => 6,
            DK::Key6 => 7,
            DK::Key7 => 8,
            DK::Key8 => 9,
            DK::Key9 => 10,
            DK::Key0 => 11,
            DK::Minus => 12,
            DK::Equal => 13,
            DK::Backspace => 14,
            DK::Tab => 15,
            DK::Q => 16,
            DK::W => 17,
            DK::E => 18,
            DK::R => 19,
            DK::T => 20,
            DK::Y => 21,
            DK::U => 22,
            DK::I => 23,
            DK::O => 24,
            DK::P => 25,
            DK::LeftBracket => 26,
            DK::RightBracket => 27,
            DK::Enter => 28,
            DK::LControl => 29,
            DK::A => 30,
            DK::S => 31,
            DK::D => 32,
            DK::F => 33,
            DK::G => 34,
            DK::H => 35,
            DK::J => 36,
            DK::K => 37,
            DK::L => 38,
            DK::Semicolon => 39,
            DK::Apostrophe => 40,
            DK::Grave => 41,
            DK::LShift => 42,
            DK::BackSlash => 43,
            DK::Z => 44,
            DK::X => 45,
            DK::C => 46,
            DK::V => 47,
            DK::B => 48,
            DK::N => 49,
            DK::M => 50,
            DK::Comma => 51,
            DK::Dot => 52,
            DK::Slash => 53,
            DK::RShift => 54,
            DK::LAlt => 56,
            DK::Space => 57,
            DK::CapsLock => 58,
            DK::F1 => 59,
            DK::F2 => 60,
            DK::F3 => 61,
            DK::F4 => 62,
            DK::F5 => 63,
            DK::F6 => 64,
            DK::F7 => 65,
            DK::F8 => 66,
            DK::F9 => 67,
            DK::F10 => 68,
            DK::F11 => 87,
            DK::F12 => 88,
            DK::RControl => 97,
            DK::RAlt => 100,
            DK::Home => 102,
            DK::Up => 103,
            DK::PageUp => 104,
            DK::Left => 105,
            DK::Right => 106,
            DK::End => 107,
            DK::Down => 108,
            DK::PageDown => 109,
            DK::Insert => 110,
            DK::Delete => 111,
            DK::LMeta => 125,
            DK::RMeta => 126,
            // Numpad
            DK::Numpad0 => 82,
            DK::Numpad1 => 79,
            DK::Numpad2 => 80,
            DK::Numpad3 => 81,
            DK::Numpad4 => 75,
            DK::Numpad5 => 76,
            DK::Numpad6 => 77,
            DK::Numpad7 => 71,
            DK::Numpad8 => 72,
            DK::Numpad9 => 73,
            DK::NumpadSubtract => 74,
            DK::NumpadAdd => 78,
            DK::NumpadDivide => 98,
            DK::NumpadMultiply => 55,
            other => return Self::unmapped(&format!("{:?}", other)),
        };
        Self(code)
    }
}

/// Static description of a key on the US layout
#[derive(Debug, Clone, Copy)]
pub struct KeyInfo {
    /// Label written to the `key` column when the key has no character
    pub label: &'static str,
    /// Character produced without shift
    pub base: Option<char>,
    /// Character produced with shift
    pub shifted: Option<char>,
}

impl KeyInfo {
    const fn named(label: &'static str) -> Self {
        Self {
            label,
            base: None,
            shifted: None,
        }
    }

    const fn printable(label: &'static str, base: char, shifted: char) -> Self {
        Self {
            label,
            base: Some(base),
            shifted: Some(shifted),
        }
    }

    /// Letters honour caps lock, everything else only shift
    fn is_letter(&self) -> bool {
        self.base.is_some_and(|c| c.is_ascii_lowercase())
    }
}

/// Static keymap for standard US keyboard layout
pub static KEYMAP: LazyLock<HashMap<KeyCode, KeyInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Control and modifier keys
    map.insert(KeyCode(1), KeyInfo::named("ESC"));
    map.insert(KeyCode(14), KeyInfo::named("BACKSPACE"));
    map.insert(KeyCode(15), KeyInfo::named("TAB"));
    map.insert(KeyCode(28), KeyInfo::named("ENTER"));
    map.insert(KeyCode(29), KeyInfo::named("CTRL_L"));
    map.insert(KeyCode(42), KeyInfo::named("SHIFT_L"));
    map.insert(KeyCode(54), KeyInfo::named("SHIFT_R"));
    map.insert(KeyCode(56), KeyInfo::named("ALT_L"));
    map.insert(KeyCode(58), KeyInfo::named("CAPS"));
    map.insert(KeyCode(97), KeyInfo::named("CTRL_R"));
    map.insert(KeyCode(100), KeyInfo::named("ALT_R"));
    map.insert(KeyCode(125), KeyInfo::named("META_L"));
    map.insert(KeyCode(126), KeyInfo::named("META_R"));

    // Navigation
    map.insert(KeyCode(102), KeyInfo::named("HOME"));
    map.insert(KeyCode(103), KeyInfo::named("UP"));
    map.insert(KeyCode(104), KeyInfo::named("PAGE_UP"));
    map.insert(KeyCode(105), KeyInfo::named("LEFT"));
    map.insert(KeyCode(106), KeyInfo::named("RIGHT"));
    map.insert(KeyCode(107), KeyInfo::named("END"));
    map.insert(KeyCode(108), KeyInfo::named("DOWN"));
    map.insert(KeyCode(109), KeyInfo::named("PAGE_DOWN"));
    map.insert(KeyCode(110), KeyInfo::named("INSERT"));
    map.insert(KeyCode(111), KeyInfo::named("DELETE"));

    // Number row
    map.insert(KeyCode(2), KeyInfo::printable("1", '1', '!'));
    map.insert(KeyCode(3), KeyInfo::printable("2", '2', '@'));
    map.insert(KeyCode(4), KeyInfo::printable("3", '3', '#'));
    map.insert(KeyCode(5), KeyInfo::printable("4", '4', '$'));
    map.insert(KeyCode(6), KeyInfo::printable("5", '5', '%'));
    map.insert(KeyCode(7), KeyInfo::printable("6", '6', '^'));
    map.insert(KeyCode(8), KeyInfo::printable("7", '7', '&'));
    map.insert(KeyCode(9), KeyInfo::printable("8", '8', '*'));
    map.insert(KeyCode(10), KeyInfo::printable("9", '9', '('));
    map.insert(KeyCode(11), KeyInfo::printable("0", '0', ')'));

    // Letter rows, scancodes are contiguous within each row
    const LETTER_LABELS: [&str; 26] = [
        "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R",
        "S", "T", "U", "V", "W", "X", "Y", "Z",
    ];
    for (start, row) in [(16u16, "qwertyuiop"), (30, "asdfghjkl"), (44, "zxcvbnm")] {
        for (offset, base) in row.chars().enumerate() {
            let label = LETTER_LABELS[(base as u8 - b'a') as usize];
            map.insert(
                KeyCode(start + offset as u16),
                KeyInfo::printable(label, base, base.to_ascii_uppercase()),
            );
        }
    }

    // Punctuation
    map.insert(KeyCode(12), KeyInfo::printable("MINUS", '-', '_'));
    map.insert(KeyCode(13), KeyInfo::printable("EQUAL", '=', '+'));
    map.insert(KeyCode(26), KeyInfo::printable("LBRACKET", '[', '{'));
    map.insert(KeyCode(27), KeyInfo::printable("RBRACKET", ']', '}'));
    map.insert(KeyCode(39), KeyInfo::printable("SEMICOLON", ';', ':'));
    map.insert(KeyCode(40), KeyInfo::printable("APOSTROPHE", '\'', '"'));
    map.insert(KeyCode(41), KeyInfo::printable("GRAVE", '`', '~'));
    map.insert(KeyCode(43), KeyInfo::printable("BACKSLASH", '\\', '|'));
    map.insert(KeyCode(51), KeyInfo::printable("COMMA", ',', '<'));
    map.insert(KeyCode(52), KeyInfo::printable("PERIOD", '.', '>'));
    map.insert(KeyCode(53), KeyInfo::printable("SLASH", '/', '?'));
    map.insert(KeyCode(57), KeyInfo::printable("SPACE", ' ', ' '));

    // Function keys
    for (i, label) in ["F1", "F2", "F3", "F4", "F5", "F6", "F7", "F8", "F9", "F10"]
        .into_iter()
        .enumerate()
    {
        map.insert(KeyCode(59 + i as u16), KeyInfo::named(label));
    }
    map.insert(KeyCode(87), KeyInfo::named("F11"));
    map.insert(KeyCode(88), KeyInfo::named("F12"));

    // Numpad, read with num lock on
    map.insert(KeyCode(71), KeyInfo::printable("KP_7", '7', '7'));
    map.insert(KeyCode(72), KeyInfo::printable("KP_8", '8', '8'));
    map.insert(KeyCode(73), KeyInfo::printable("KP_9", '9', '9'));
    map.insert(KeyCode(74), KeyInfo::printable("KP_SUBTRACT", '-', '-'));
    map.insert(KeyCode(75), KeyInfo::printable("KP_4", '4', '4'));
    map.insert(KeyCode(76), KeyInfo::printable("KP_5", '5', '5'));
    map.insert(KeyCode(77), KeyInfo::printable("KP_6", '6', '6'));
    map.insert(KeyCode(78), KeyInfo::printable("KP_ADD", '+', '+'));
    map.insert(KeyCode(79), KeyInfo::printable("KP_1", '1', '1'));
    map.insert(KeyCode(80), KeyInfo::printable("KP_2", '2', '2'));
    map.insert(KeyCode(81), KeyInfo::printable("KP_3", '3', '3'));
    map.insert(KeyCode(82), KeyInfo::printable("KP_0", '0', '0'));
    map.insert(KeyCode(55), KeyInfo::printable("KP_MULTIPLY", '*', '*'));
    map.insert(KeyCode(98), KeyInfo::printable("KP_DIVIDE", '/', '/'));

    map
});

/// Result of classifying a key under the current modifier state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyClass {
    /// Printable character, if the key produces one
    pub character: Option<char>,
    /// Human-readable key name
    pub label: String,
}

/// Maps a key code plus modifier state to a character and label.
///
/// The session only ever talks to this trait, keeping layout knowledge out of
/// the phrase matching and timing logic.
pub trait KeyClassifier {
    fn classify(&self, key: KeyCode, modifiers: Modifiers) -> KeyClass;
}

/// Classifier for the standard US layout backed by [`KEYMAP`]
#[derive(Debug, Clone, Copy, Default)]
pub struct UsLayout;

impl KeyClassifier for UsLayout {
    fn classify(&self, key: KeyCode, modifiers: Modifiers) -> KeyClass {
        match KEYMAP.get(&key) {
            Some(info) => {
                let upper = if info.is_letter() {
                    modifiers.shift ^ modifiers.caps_lock
                } else {
                    modifiers.shift
                };
                let character = if upper { info.shifted } else { info.base };
                KeyClass {
                    character,
                    label: info.label.to_string(),
                }
            }
            None => KeyClass {
                character: None,
                label: fallback_label(key),
            },
        }
    }
}

/// Label for keys missing from the keymap
pub fn fallback_label(key: KeyCode) -> String {
    format!("VK_{:02X}", key.as_u16())
}

/// Find the first key code producing `ch` on the US layout, and whether shift
/// is needed for it. Used to script synthetic typing.
pub fn key_for_char(ch: char) -> Option<(KeyCode, bool)> {
    let mut codes: Vec<_> = KEYMAP.iter().collect();
    codes.sort_by_key(|(code, _)| **code);
    codes.into_iter().find_map(|(code, info)| {
        if info.base == Some(ch) {
            Some((*code, false))
        } else if info.shifted == Some(ch) {
            Some((*code, true))
        } else {
            None
        }
    })
}
