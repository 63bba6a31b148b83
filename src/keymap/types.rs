//! Keystroke, modifier and key code types

use std::fmt;

/// Modifier keys held during a keystroke
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    /// Cmd on macOS, Win on Windows
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
        meta: false,
    };

    pub fn is_empty(self) -> bool {
        self == Self::NONE
    }
}

/// A key code, named after the host's `KeyboardEvent.code` where one exists
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Space,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
}

impl KeyCode {
    fn name(self) -> Option<&'static str> {
        Some(match self {
            KeyCode::Char(_) => return None,
            KeyCode::Enter => "Enter",
            KeyCode::Escape => "Escape",
            KeyCode::Tab => "Tab",
            KeyCode::Backspace => "Backspace",
            KeyCode::Delete => "Delete",
            KeyCode::Space => "Space",
            KeyCode::Up => "ArrowUp",
            KeyCode::Down => "ArrowDown",
            KeyCode::Left => "ArrowLeft",
            KeyCode::Right => "ArrowRight",
            KeyCode::Home => "Home",
            KeyCode::End => "End",
        })
    }
}

/// A key plus the modifiers held with it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Keystroke {
    pub key: KeyCode,
    pub mods: Modifiers,
}

impl Keystroke {
    pub const fn new(key: KeyCode, mods: Modifiers) -> Self {
        Self { key, mods }
    }

    /// Unmodified keystroke
    pub const fn key(key: KeyCode) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    pub const fn char(c: char) -> Self {
        Self::key(KeyCode::Char(c))
    }

    /// Whether the key was pressed without any modifier
    pub fn is_plain(&self) -> bool {
        self.mods.is_empty()
    }
}

impl fmt::Display for Keystroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let held = [
            (self.mods.ctrl, "Ctrl+"),
            (self.mods.shift, "Shift+"),
            (self.mods.alt, "Alt+"),
            (self.mods.meta, "Meta+"),
        ];
        for (_, prefix) in held.iter().filter(|(on, _)| *on) {
            f.write_str(prefix)?;
        }
        match (self.key, self.key.name()) {
            (KeyCode::Char(c), _) => write!(f, "{}", c),
            (_, Some(name)) => f.write_str(name),
            (_, None) => Ok(()),
        }
    }
}
