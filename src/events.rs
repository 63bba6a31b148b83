//! Events forwarded by the host editable surface
//!
//! `Input` and `CompositionEnd` follow the semantics of the DOM `input`
//! event: the edit has already been committed to the surface content when
//! the engine sees it. [`InputEvent::apply_default`] performs that default
//! edit for hosts (and tests) that have no native editing of their own.

use crate::editable::{range, CursorSpan, EditableContent, Node, Position};
use crate::keymap::Keystroke;

/// What kind of edit an input event describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Plain text typed at the caret
    InsertText,
    /// Text committed by an input method
    InsertComposition,
    /// Text inserted by the engine's paste handling
    InsertFromPaste,
    InsertLineBreak,
    DeleteBackward,
    DeleteForward,
    /// Anything else the host reports (formatting shortcuts, drag and drop)
    Other,
}

/// An edit that has been applied to the surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent {
    pub kind: InputKind,
    /// Inserted text, when the edit inserted any
    pub data: Option<String>,
}

impl InputEvent {
    pub fn new(kind: InputKind, data: Option<String>) -> Self {
        Self { kind, data }
    }

    pub fn insert_text(text: impl Into<String>) -> Self {
        Self::new(InputKind::InsertText, Some(text.into()))
    }

    pub fn composition(text: impl Into<String>) -> Self {
        Self::new(InputKind::InsertComposition, Some(text.into()))
    }

    /// Input produced by a paste. Paste never opens a signal session, so the
    /// pasted text is not carried as trigger data.
    pub fn paste() -> Self {
        Self::new(InputKind::InsertFromPaste, None)
    }

    pub fn line_break() -> Self {
        Self::new(InputKind::InsertLineBreak, None)
    }

    pub fn delete_backward() -> Self {
        Self::new(InputKind::DeleteBackward, None)
    }

    pub fn delete_forward() -> Self {
        Self::new(InputKind::DeleteForward, None)
    }

    /// The inserted text when this event can open a signal session
    pub fn trigger_char(&self) -> Option<char> {
        if !matches!(
            self.kind,
            InputKind::InsertText | InputKind::InsertComposition
        ) {
            return None;
        }
        let data = self.data.as_deref()?;
        let mut chars = data.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }

    /// Perform the host's default edit for this event.
    ///
    /// Returns the caret after the edit, or `None` when nothing changed.
    pub fn apply_default(&self, content: &mut EditableContent) -> Option<Position> {
        let changed = match self.kind {
            InputKind::InsertText | InputKind::InsertComposition | InputKind::InsertFromPaste => {
                let text = self.data.as_deref().filter(|t| !t.is_empty())?;
                content.type_text(text);
                true
            }
            InputKind::InsertLineBreak => {
                let span = content
                    .selection()
                    .unwrap_or_else(|| CursorSpan::collapsed(Position::root(content.nodes().len())));
                range::insert_nodes(content, vec![Node::LineBreak], &span);
                true
            }
            InputKind::DeleteBackward => content.delete_backward(),
            InputKind::DeleteForward => content.delete_forward(),
            InputKind::Other => false,
        };
        if changed {
            content.selection().map(|span| span.end)
        } else {
            None
        }
    }
}

/// Raw events the host surface forwards to the signal engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// An edit was committed
    Input(InputEvent),
    /// An input method started a multi-keystroke composition
    CompositionStart,
    /// The composition finished, committing `InputEvent`
    CompositionEnd(InputEvent),
    /// Pointer click inside the surface
    Click,
    Focus,
    /// Pointer interaction outside the surface. `ignored` is set when the
    /// target (or one of its ancestors) carries the ignore attribute.
    BlurOutside { ignored: bool },
    /// Key pressed while the surface has focus, before default handling
    KeyStroke(Keystroke),
    /// Clipboard paste of plain text, before default handling
    Paste(String),
}

impl SurfaceEvent {
    /// Build a blur event from the attribute names along the target's
    /// ancestor chain (target first).
    pub fn blur_outside<S: AsRef<str>>(path: &[Vec<S>], ignore_attribute: &str) -> Self {
        SurfaceEvent::BlurOutside {
            ignored: is_ignored_target(path, ignore_attribute),
        }
    }

    /// Whether the surface has already applied this event's edit
    pub fn is_post_edit(&self) -> bool {
        matches!(
            self,
            SurfaceEvent::Input(_) | SurfaceEvent::CompositionEnd(_)
        )
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            SurfaceEvent::Input(_) => "input",
            SurfaceEvent::CompositionStart => "compositionstart",
            SurfaceEvent::CompositionEnd(_) => "compositionend",
            SurfaceEvent::Click => "click",
            SurfaceEvent::Focus => "focus",
            SurfaceEvent::BlurOutside { .. } => "blur-outside",
            SurfaceEvent::KeyStroke(_) => "keystroke",
            SurfaceEvent::Paste(_) => "paste",
        }
    }
}

/// Whether any element on the target's ancestor chain carries `ignore_attribute`
pub fn is_ignored_target<S: AsRef<str>>(path: &[Vec<S>], ignore_attribute: &str) -> bool {
    path.iter()
        .any(|attrs| attrs.iter().any(|name| name.as_ref() == ignore_attribute))
}
