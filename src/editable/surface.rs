//! Surface access capability.
//!
//! The engine never holds a back-reference to the host component. It is given
//! a [`SurfaceAccess`] implementation that exposes the content, the live
//! selection and a few host services (focus, geometry, scrolling).

use ropey::Rope;

use super::content::EditableContent;
use super::cursor::Position;

/// Caret geometry relative to the surface, plus the surface size.
///
/// Handed to completion UIs so they can position themselves next to the
/// trigger character.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SignalGeometry {
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub height: f32,
}

/// What the signal engine needs from the host editable surface
pub trait SurfaceAccess {
    /// Current content and live selection
    fn content(&self) -> &EditableContent;

    /// Mutable content and live selection
    fn content_mut(&mut self) -> &mut EditableContent;

    /// Move keyboard focus to the surface
    fn request_focus(&mut self);

    /// Caret offset relative to the surface and the surface dimensions
    fn caret_geometry(&self) -> SignalGeometry;

    /// Scroll so that `position` is visible
    fn scroll_into_view(&mut self, _position: Position) {}
}

/// In-memory surface with a fixed-size character grid.
///
/// Backs tests and the replay binary. Geometry assumes a monospace layout
/// without wrapping.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    pub content: EditableContent,
    pub focused: bool,
    pub width: f32,
    pub height: f32,
    pub line_height: f32,
    pub char_width: f32,
    /// Number of focus requests received (for assertions)
    pub focus_requests: usize,
    /// Positions passed to `scroll_into_view`, most recent last
    pub scrolled_to: Vec<Position>,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new(400.0, 120.0)
    }
}

impl MemorySurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            content: EditableContent::new(),
            focused: false,
            width,
            height,
            line_height: 20.0,
            char_width: 10.0,
            focus_requests: 0,
            scrolled_to: Vec::new(),
        }
    }

    /// Line and column (both 0-indexed) of the caret in the plain text
    pub fn caret_line_column(&self) -> (usize, usize) {
        let Some(offset) = self.content.caret_offset() else {
            return (0, 0);
        };
        let rope = Rope::from_str(&self.content.plain_text());
        let offset = offset.min(rope.len_chars());
        let line = rope.char_to_line(offset);
        (line, offset - rope.line_to_char(line))
    }
}

impl SurfaceAccess for MemorySurface {
    fn content(&self) -> &EditableContent {
        &self.content
    }

    fn content_mut(&mut self) -> &mut EditableContent {
        &mut self.content
    }

    fn request_focus(&mut self) {
        self.focused = true;
        self.focus_requests += 1;
    }

    fn caret_geometry(&self) -> SignalGeometry {
        let (line, column) = self.caret_line_column();
        SignalGeometry {
            top: line as f32 * self.line_height,
            left: column as f32 * self.char_width,
            width: self.width,
            height: self.height,
        }
    }

    fn scroll_into_view(&mut self, position: Position) {
        self.scrolled_to.push(position);
    }
}
