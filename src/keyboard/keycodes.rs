//! HID keyboard usage codes and character mapping.
//!
//! Provides the character-to-key table used when typing an expansion and
//! the reverse lookup the input tracker uses to turn key events back into
//! short-code characters.

use std::fmt;

/// A keyboard usage ID from the HID Keyboard/Keypad usage page (0x07)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Keycode(pub u16);

impl Keycode {
    pub const A: Keycode = Keycode(0x04);
    pub const Z: Keycode = Keycode(0x1D);
    /// `1` and `!`
    pub const N1: Keycode = Keycode(0x1E);
    pub const N2: Keycode = Keycode(0x1F);
    pub const N3: Keycode = Keycode(0x20);
    pub const N4: Keycode = Keycode(0x21);
    pub const N5: Keycode = Keycode(0x22);
    pub const N6: Keycode = Keycode(0x23);
    pub const N7: Keycode = Keycode(0x24);
    pub const N8: Keycode = Keycode(0x25);
    /// `9` and `(`
    pub const N9: Keycode = Keycode(0x26);
    /// `0` and `)`
    pub const N0: Keycode = Keycode(0x27);
    pub const ENTER: Keycode = Keycode(0x28);
    pub const ESCAPE: Keycode = Keycode(0x29);
    pub const BACKSPACE: Keycode = Keycode(0x2A);
    pub const TAB: Keycode = Keycode(0x2B);
    pub const SPACE: Keycode = Keycode(0x2C);
    pub const MINUS: Keycode = Keycode(0x2D);
    pub const EQUAL: Keycode = Keycode(0x2E);
    pub const LEFT_BRACKET: Keycode = Keycode(0x2F);
    pub const RIGHT_BRACKET: Keycode = Keycode(0x30);
    pub const BACKSLASH: Keycode = Keycode(0x31);
    pub const SEMICOLON: Keycode = Keycode(0x33);
    pub const APOSTROPHE: Keycode = Keycode(0x34);
    pub const GRAVE: Keycode = Keycode(0x35);
    pub const COMMA: Keycode = Keycode(0x36);
    pub const PERIOD: Keycode = Keycode(0x37);
    pub const SLASH: Keycode = Keycode(0x38);
    pub const CAPS_LOCK: Keycode = Keycode(0x39);
    pub const LEFT_CONTROL: Keycode = Keycode(0xE0);
    pub const LEFT_SHIFT: Keycode = Keycode(0xE1);
    pub const LEFT_ALT: Keycode = Keycode(0xE2);
    pub const LEFT_GUI: Keycode = Keycode(0xE3);
    pub const RIGHT_CONTROL: Keycode = Keycode(0xE4);
    pub const RIGHT_SHIFT: Keycode = Keycode(0xE5);
    pub const RIGHT_ALT: Keycode = Keycode(0xE6);
    pub const RIGHT_GUI: Keycode = Keycode(0xE7);

    /// Letter key for `a`-`z` (either case is accepted)
    fn letter(c: char) -> Keycode {
        Keycode(Self::A.0 + (c.to_ascii_lowercase() as u16 - 'a' as u16))
    }

    /// Top-row digit key for `0`-`9`
    fn digit(c: char) -> Keycode {
        if c == '0' {
            Self::N0
        } else {
            Keycode(Self::N1.0 + (c as u16 - '1' as u16))
        }
    }

    /// Whether this is one of the eight modifier keys
    pub fn is_modifier(self) -> bool {
        (Self::LEFT_CONTROL.0..=Self::RIGHT_GUI.0).contains(&self.0)
    }

    /// Human-readable key name for logs
    pub fn name(self) -> String {
        if let Some(c) = alphanumeric_char(self) {
            return c.to_ascii_uppercase().to_string();
        }
        let name = match self {
            Self::ENTER => "Enter",
            Self::ESCAPE => "Escape",
            Self::BACKSPACE => "Backspace",
            Self::TAB => "Tab",
            Self::SPACE => "Space",
            Self::MINUS => "-",
            Self::EQUAL => "=",
            Self::LEFT_BRACKET => "[",
            Self::RIGHT_BRACKET => "]",
            Self::BACKSLASH => "\\",
            Self::SEMICOLON => ";",
            Self::APOSTROPHE => "'",
            Self::GRAVE => "`",
            Self::COMMA => ",",
            Self::PERIOD => ".",
            Self::SLASH => "/",
            Self::CAPS_LOCK => "CapsLock",
            Self::LEFT_CONTROL | Self::RIGHT_CONTROL => "Control",
            Self::LEFT_SHIFT | Self::RIGHT_SHIFT => "Shift",
            Self::LEFT_ALT | Self::RIGHT_ALT => "Alt",
            Self::LEFT_GUI | Self::RIGHT_GUI => "Gui",
            other => return format!("Key(0x{:02X})", other.0),
        };
        name.to_string()
    }
}

impl fmt::Display for Keycode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A key to press, and whether Shift must be held while pressing it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub keycode: Keycode,
    pub shift: bool,
}

impl KeyPress {
    fn plain(keycode: Keycode) -> Self {
        Self {
            keycode,
            shift: false,
        }
    }

    fn shifted(keycode: Keycode) -> Self {
        Self {
            keycode,
            shift: true,
        }
    }
}

/// Resolve the key (and Shift requirement) that types `c` on a US layout.
///
/// Returns `None` for characters with no key, which the executor skips.
pub fn char_to_keycode(c: char) -> Option<KeyPress> {
    let press = match c {
        'a'..='z' => KeyPress::plain(Keycode::letter(c)),
        'A'..='Z' => KeyPress::shifted(Keycode::letter(c)),
        '0'..='9' => KeyPress::plain(Keycode::digit(c)),
        ' ' => KeyPress::plain(Keycode::SPACE),
        '\n' => KeyPress::plain(Keycode::ENTER),
        '\t' => KeyPress::plain(Keycode::TAB),
        '.' => KeyPress::plain(Keycode::PERIOD),
        '>' => KeyPress::shifted(Keycode::PERIOD),
        ',' => KeyPress::plain(Keycode::COMMA),
        '<' => KeyPress::shifted(Keycode::COMMA),
        ';' => KeyPress::plain(Keycode::SEMICOLON),
        ':' => KeyPress::shifted(Keycode::SEMICOLON),
        '!' => KeyPress::shifted(Keycode::N1),
        '@' => KeyPress::shifted(Keycode::N2),
        '#' => KeyPress::shifted(Keycode::N3),
        '$' => KeyPress::shifted(Keycode::N4),
        '%' => KeyPress::shifted(Keycode::N5),
        '^' => KeyPress::shifted(Keycode::N6),
        '&' => KeyPress::shifted(Keycode::N7),
        '*' => KeyPress::shifted(Keycode::N8),
        '(' => KeyPress::shifted(Keycode::N9),
        ')' => KeyPress::shifted(Keycode::N0),
        '-' => KeyPress::plain(Keycode::MINUS),
        '_' => KeyPress::shifted(Keycode::MINUS),
        '=' => KeyPress::plain(Keycode::EQUAL),
        '+' => KeyPress::shifted(Keycode::EQUAL),
        '[' => KeyPress::plain(Keycode::LEFT_BRACKET),
        '{' => KeyPress::shifted(Keycode::LEFT_BRACKET),
        ']' => KeyPress::plain(Keycode::RIGHT_BRACKET),
        '}' => KeyPress::shifted(Keycode::RIGHT_BRACKET),
        '\\' => KeyPress::plain(Keycode::BACKSLASH),
        '|' => KeyPress::shifted(Keycode::BACKSLASH),
        '\'' => KeyPress::plain(Keycode::APOSTROPHE),
        '"' => KeyPress::shifted(Keycode::APOSTROPHE),
        '`' => KeyPress::plain(Keycode::GRAVE),
        '~' => KeyPress::shifted(Keycode::GRAVE),
        '/' => KeyPress::plain(Keycode::SLASH),
        '?' => KeyPress::shifted(Keycode::SLASH),
        _ => return None,
    };
    Some(press)
}

/// Short-code character produced by a letter or top-row digit key.
///
/// Letters map to lowercase; every other key returns `None`.
pub fn alphanumeric_char(keycode: Keycode) -> Option<char> {
    let code = keycode.0;
    if (Keycode::A.0..=Keycode::Z.0).contains(&code) {
        return Some((b'a' + (code - Keycode::A.0) as u8) as char);
    }
    if (Keycode::N1.0..=Keycode::N9.0).contains(&code) {
        return Some((b'1' + (code - Keycode::N1.0) as u8) as char);
    }
    if keycode == Keycode::N0 {
        return Some('0');
    }
    None
}

#[cfg(test)]
#[path = "keycodes_test.rs"]
mod tests;
