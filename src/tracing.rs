//! Debug tracing infrastructure for development diagnostics
//!
//! Provides structured logging with scoped filtering for debugging signal
//! sessions and range bookkeeping.
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=signal=debug` - session transitions only
//! - `RUST_LOG=sigil::signal::engine=trace` - per-keystroke detail
//!
//! # Log Files
//!
//! Logs are written to `~/.config/sigil/logs/sigil.log` with daily rotation.
//! File logging uses debug level by default for more verbose troubleshooting.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config_paths::LOG_FILE_PREFIX;
use crate::editable::SurfaceAccess;
use crate::signal::{SessionState, SignalEngine};

/// Initialize tracing subscriber with console and file logging
///
/// Console output respects RUST_LOG (default `warn`). File logging writes to
/// `~/.config/sigil/logs/sigil.log` with daily rotation.
pub fn init() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // Console layer - respects RUST_LOG
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    // File layer - always debug level for troubleshooting
    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {}", e);
            None
        }
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}

/// Lightweight snapshot of engine state for diffing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub composing: bool,
    pub focused: bool,
    /// Linear caret offset, if the surface has a selection
    pub caret: Option<usize>,
}

impl SessionSnapshot {
    pub fn from_engine<S: SurfaceAccess>(engine: &SignalEngine<S>) -> Self {
        Self {
            state: engine.session_state(),
            composing: engine.is_composing(),
            focused: engine.is_focused(),
            caret: engine.surface().and_then(|s| s.content().caret_offset()),
        }
    }

    /// Generate a diff description between two snapshots
    pub fn diff(&self, other: &SessionSnapshot) -> Option<String> {
        let mut changes = Vec::new();

        match (&self.state, &other.state) {
            (SessionState::Idle, SessionState::Active { id, signal, kind, .. }) => {
                changes.push(format!("session #{} opened ({} {})", id, signal, kind));
            }
            (SessionState::Active { id, .. }, SessionState::Idle) => {
                changes.push(format!("session #{} closed", id));
            }
            (
                SessionState::Active { id: a, .. },
                SessionState::Active {
                    id: b, signal, kind, ..
                },
            ) if a != b => {
                changes.push(format!("session #{} replaced by #{} ({} {})", a, b, signal, kind));
            }
            (
                SessionState::Active { live: before, .. },
                SessionState::Active { live: after, .. },
            ) if before != after => {
                changes.push(format!("live offset: {} → {}", before, after));
            }
            _ => {}
        }

        if self.composing != other.composing {
            let status = if other.composing { "started" } else { "ended" };
            changes.push(format!("composition {}", status));
        }
        if self.focused != other.focused {
            let status = if other.focused { "gained" } else { "lost" };
            changes.push(format!("focus {}", status));
        }
        if self.caret != other.caret {
            changes.push(format!("caret: {:?} → {:?}", self.caret, other.caret));
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes.join("; "))
        }
    }
}
