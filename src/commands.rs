//! Command types for the Elm-style architecture
//!
//! Commands represent side effects that the host surface should perform after
//! the engine has handled an event. The engine never blocks; anything that
//! must happen "on the next tick" is returned as a command.

use crate::editable::Position;

/// Side effects returned by the signal engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Cmd {
    /// No command - do nothing
    #[default]
    None,
    /// Content changed, the host should repaint the surface
    Redraw,
    /// Suppress the host's default handling of the current event
    PreventDefault,
    /// Focus the surface, optionally collapsing the selection to the end
    Focus { collapse_to_end: bool },
    /// Focus the surface with the caret at `position`.
    ///
    /// Issued after a token insertion; must run once the insertion has been
    /// committed and before the next user event is dispatched.
    FocusAt {
        position: Position,
        scroll_into_view: bool,
    },
    /// Execute multiple commands
    Batch(Vec<Cmd>),
}

impl Cmd {
    /// Create a batch of commands
    pub fn batch(cmds: Vec<Cmd>) -> Self {
        Cmd::Batch(cmds)
    }

    /// Fold a list of commands into one, dropping no-ops.
    ///
    /// Returns `None` when nothing is left, the single command when there is
    /// exactly one, and a batch otherwise.
    pub fn collect(cmds: Vec<Cmd>) -> Option<Cmd> {
        let mut cmds: Vec<Cmd> = cmds.into_iter().filter(|c| *c != Cmd::None).collect();
        match cmds.len() {
            0 => None,
            1 => cmds.pop(),
            _ => Some(Cmd::Batch(cmds)),
        }
    }

    /// Check if this command requires a redraw
    pub fn needs_redraw(&self) -> bool {
        match self {
            Cmd::None => false,
            Cmd::Redraw => true,
            Cmd::PreventDefault => false,
            Cmd::Focus { .. } => true,
            Cmd::FocusAt { .. } => true,
            Cmd::Batch(cmds) => cmds.iter().any(|c| c.needs_redraw()),
        }
    }

    /// Check if the host's default action must be suppressed
    pub fn prevents_default(&self) -> bool {
        match self {
            Cmd::PreventDefault => true,
            Cmd::Batch(cmds) => cmds.iter().any(|c| c.prevents_default()),
            _ => false,
        }
    }

    /// The deferred caret relocation carried by this command, if any
    pub fn focus_target(&self) -> Option<Position> {
        match self {
            Cmd::FocusAt { position, .. } => Some(*position),
            Cmd::Batch(cmds) => cmds.iter().find_map(|c| c.focus_target()),
            _ => None,
        }
    }

    /// Convert Option<Cmd> with None to Cmd::None
    pub fn from_option(opt: Option<Cmd>) -> Self {
        opt.unwrap_or(Cmd::None)
    }
}

// Allow converting Option<Cmd> to Cmd
impl From<Option<Cmd>> for Cmd {
    fn from(opt: Option<Cmd>) -> Self {
        opt.unwrap_or(Cmd::None)
    }
}
