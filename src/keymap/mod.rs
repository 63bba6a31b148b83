//! Keystrokes delivered by the host surface
//!
//! The host translates its native key events into [`Keystroke`]s before
//! forwarding them to the signal engine, which offers them to the active
//! operator first.
//!
//! ```text
//! host key event → Keystroke → SignalOperator::on_signal_key_stroke → handled?
//! ```

mod parse;
mod types;

pub use parse::{parse_key_string, KeyParseError};
pub use types::{KeyCode, Keystroke, Modifiers};
