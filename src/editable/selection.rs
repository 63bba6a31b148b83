//! Cursor span type (the live selection or a cached snapshot of it).

use super::cursor::Position;

/// An ordered pair of positions in the content tree.
///
/// Range algebra expects `start` to be at or before `end` in document order.
/// Like [`Position`], a span is a snapshot and must be re-read from the
/// surface after every mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorSpan {
    pub start: Position,
    pub end: Position,
}

impl CursorSpan {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Create a collapsed span (caret with no selected range)
    pub fn collapsed(pos: Position) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Check if both ends are the same position
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Collapse span to its start position
    pub fn collapse_to_start(&mut self) {
        self.end = self.start;
    }

    /// Collapse span to its end position
    pub fn collapse_to_end(&mut self) {
        self.start = self.end;
    }
}
