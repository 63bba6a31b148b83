//! Parsing of key strings such as `"shift+enter"` or `"ArrowDown"`.

use thiserror::Error;

use super::types::{KeyCode, Keystroke, Modifiers};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    #[error("invalid key: {0}")]
    InvalidKey(String),
}

/// Parse a key string like "ctrl+shift+k" or "ArrowUp" into a Keystroke
pub fn parse_key_string(key_str: &str) -> Result<Keystroke, KeyParseError> {
    let mut mods = Modifiers::NONE;
    let mut key_part = None;

    for part in key_str.split('+') {
        let part_lower = part.trim().to_lowercase();
        match part_lower.as_str() {
            "ctrl" | "control" => mods.ctrl = true,
            "shift" => mods.shift = true,
            "alt" | "option" | "opt" => mods.alt = true,
            "meta" | "cmd" | "super" | "win" => mods.meta = true,
            _ => {
                if key_part.is_some() {
                    return Err(KeyParseError::InvalidKey(format!(
                        "Multiple keys in binding: {}",
                        key_str
                    )));
                }
                key_part = Some(parse_key_code(part.trim())?);
            }
        }
    }

    let key = key_part
        .ok_or_else(|| KeyParseError::InvalidKey(format!("No key found in: {}", key_str)))?;

    Ok(Keystroke::new(key, mods))
}

/// Parse a key code, accepting both short names and `KeyboardEvent.code` names
fn parse_key_code(key: &str) -> Result<KeyCode, KeyParseError> {
    let mut chars = key.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c));
    }

    match key.to_lowercase().as_str() {
        "enter" | "return" | "numpadenter" => Ok(KeyCode::Enter),
        "escape" | "esc" => Ok(KeyCode::Escape),
        "tab" => Ok(KeyCode::Tab),
        "backspace" | "back" => Ok(KeyCode::Backspace),
        "delete" | "del" => Ok(KeyCode::Delete),
        "space" => Ok(KeyCode::Space),

        "up" | "arrowup" => Ok(KeyCode::Up),
        "down" | "arrowdown" => Ok(KeyCode::Down),
        "left" | "arrowleft" => Ok(KeyCode::Left),
        "right" | "arrowright" => Ok(KeyCode::Right),

        "home" => Ok(KeyCode::Home),
        "end" => Ok(KeyCode::End),

        _ => Err(KeyParseError::InvalidKey(key.to_string())),
    }
}
