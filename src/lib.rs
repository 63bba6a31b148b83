//! Sigil - trigger-character signals for editable surfaces
//!
//! This crate detects trigger characters (`@`, `#`, ...) typed into an
//! editable rich-text surface, runs a completion session for the registered
//! operator and replaces the typed text with a non-editable token on
//! confirmation. Side effects are returned to the host as [`Cmd`] values.

pub mod cli;
pub mod commands;
pub mod config;
pub mod config_paths;
pub mod editable;
pub mod events;
pub mod keymap;
pub mod replay;
pub mod signal;
pub mod tracing;

// Re-export commonly used types
pub use commands::Cmd;
pub use config::SurfaceConfig;
pub use editable::{EditableContent, MemorySurface, SurfaceAccess};
pub use events::{InputEvent, SurfaceEvent};
pub use signal::{SignalData, SignalEngine, SignalOperator, SignalOperatorDefinition};
