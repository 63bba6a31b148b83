//! EditableContent - the node list of a surface together with its live selection.
//!
//! Offsets come in two flavours:
//! - tree positions ([`Position`]): node reference + offset inside that node,
//!   the way a host selection reports them
//! - linear offsets: character offsets into the plain text of the whole
//!   surface, where each atomic node counts as its display text
//!
//! Linear offsets are stable across node splits, so all range arithmetic is
//! done on them and converted back to tree positions at the end.

use std::ops::Range;

use super::cursor::{NodeRef, Position};
use super::node::Node;
use super::selection::CursorSpan;

/// Node list plus live selection of one editable surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditableContent {
    nodes: Vec<Node>,
    selection: Option<CursorSpan>,
}

impl EditableContent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create content from nodes, with no selection
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self {
            nodes,
            selection: None,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Total length in characters
    pub fn len_chars(&self) -> usize {
        self.nodes.iter().map(Node::char_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len_chars() == 0
    }

    /// Plain text of the whole surface
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            node.push_plain(&mut out);
        }
        out
    }

    /// Plain text between two linear offsets
    pub fn slice_plain(&self, range: Range<usize>) -> String {
        if range.start >= range.end {
            return String::new();
        }
        self.plain_text()
            .chars()
            .skip(range.start)
            .take(range.end - range.start)
            .collect()
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn selection(&self) -> Option<CursorSpan> {
        self.selection
    }

    pub fn set_selection(&mut self, span: CursorSpan) {
        self.selection = Some(span);
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Collapse the selection to a single caret position
    pub fn collapse_to(&mut self, pos: Position) {
        self.selection = Some(CursorSpan::collapsed(pos));
    }

    /// Select everything and collapse to the end
    pub fn collapse_to_end(&mut self) {
        let end = self.position_at(self.len_chars());
        self.collapse_to(end);
    }

    /// Linear offset of the caret (selection end), if there is a selection
    pub fn caret_offset(&self) -> Option<usize> {
        self.selection.map(|span| self.linear_offset(&span.end))
    }

    // =========================================================================
    // Offset mapping
    // =========================================================================

    /// Convert a tree position to a linear character offset.
    ///
    /// Out-of-range node references clamp to the end of the content.
    pub fn linear_offset(&self, pos: &Position) -> usize {
        match pos.node {
            NodeRef::Root => self.nodes.iter().take(pos.offset).map(Node::char_len).sum(),
            NodeRef::Child(index) => {
                let Some(node) = self.nodes.get(index) else {
                    return self.len_chars();
                };
                let base: usize = self.nodes[..index].iter().map(Node::char_len).sum();
                let local = match node {
                    Node::Text(_) => pos.offset.min(node.char_len()),
                    _ if pos.offset == 0 => 0,
                    _ => node.char_len(),
                };
                base + local
            }
        }
    }

    /// Convert a linear offset back to a tree position.
    ///
    /// Prefers a text node that contains (or ends at) the offset. Offsets that
    /// fall inside an atomic node snap to just after it.
    pub fn position_at(&self, offset: usize) -> Position {
        let mut acc = 0;
        for (i, node) in self.nodes.iter().enumerate() {
            let len = node.char_len();
            match node {
                Node::Text(_) if offset <= acc + len => {
                    return Position::in_node(i, offset - acc);
                }
                Node::Text(_) => {}
                _ if offset <= acc => return Position::root(i),
                _ if offset < acc + len => return Position::root(i + 1),
                _ => {}
            }
            acc += len;
        }
        Position::root(self.nodes.len())
    }

    // =========================================================================
    // Structural edits
    // =========================================================================

    /// Make sure a node boundary exists at `offset`, splitting a text node if
    /// needed. Returns the child index at which new nodes should be inserted.
    pub fn split_at(&mut self, offset: usize) -> usize {
        let mut acc = 0;
        for i in 0..self.nodes.len() {
            if offset <= acc {
                return i;
            }
            let len = self.nodes[i].char_len();
            if offset < acc + len {
                if let Node::Text(s) = &mut self.nodes[i] {
                    let at = char_to_byte(s, offset - acc);
                    let tail = s.split_off(at);
                    self.nodes.insert(i + 1, Node::Text(tail));
                }
                return i + 1;
            }
            acc += len;
        }
        self.nodes.len()
    }

    /// Remove the characters in a linear range.
    ///
    /// Text nodes are trimmed in place (and kept, even when emptied). Atomic
    /// nodes overlapping the range are removed whole. Returns the linear
    /// offset where the removal effectively started.
    pub fn remove_range(&mut self, range: Range<usize>) -> usize {
        if range.start >= range.end {
            return range.start;
        }
        let mut effective_start = range.start;
        let mut acc = 0;
        let nodes = std::mem::take(&mut self.nodes);
        let mut kept = Vec::with_capacity(nodes.len());
        for node in nodes {
            let node_start = acc;
            let node_end = acc + node.char_len();
            acc = node_end;

            let from = range.start.max(node_start);
            let to = range.end.min(node_end);
            if from >= to {
                kept.push(node);
                continue;
            }
            match node {
                Node::Text(mut s) => {
                    let a = char_to_byte(&s, from - node_start);
                    let b = char_to_byte(&s, to - node_start);
                    s.replace_range(a..b, "");
                    kept.push(Node::Text(s));
                }
                _ => effective_start = effective_start.min(node_start),
            }
        }
        self.nodes = kept;
        effective_start
    }

    /// Insert nodes before the child at `index`
    pub fn insert_nodes(&mut self, index: usize, nodes: Vec<Node>) {
        let index = index.min(self.nodes.len());
        self.nodes.splice(index..index, nodes);
    }

    /// Replace all nodes. The selection is dropped.
    pub fn set_nodes(&mut self, nodes: Vec<Node>) {
        self.nodes = nodes;
        self.selection = None;
    }

    /// Clear all content
    pub fn clear(&mut self) {
        self.set_nodes(Vec::new());
    }

    // =========================================================================
    // Host default editing
    // =========================================================================

    /// Insert text at a tree position, returning the caret after it.
    ///
    /// Text lands in the referenced text node when there is one, otherwise in
    /// the text node right before a container position, otherwise in a new
    /// text node.
    pub fn insert_text_at(&mut self, pos: Position, text: &str) -> Position {
        let inserted = text.chars().count();

        if let NodeRef::Child(i) = pos.node {
            if let Some(Node::Text(s)) = self.nodes.get_mut(i) {
                let local = pos.offset.min(s.chars().count());
                let at = char_to_byte(s, local);
                s.insert_str(at, text);
                return Position::in_node(i, local + inserted);
            }
        }

        if pos.is_root() {
            let k = pos.offset.min(self.nodes.len());
            if k > 0 {
                if let Some(Node::Text(s)) = self.nodes.get_mut(k - 1) {
                    let local = s.chars().count();
                    s.push_str(text);
                    return Position::in_node(k - 1, local + inserted);
                }
            }
        }

        let offset = self.linear_offset(&pos);
        let index = self.split_at(offset);
        self.nodes.insert(index, Node::text(text));
        Position::in_node(index, inserted)
    }

    /// Type text at the caret the way a host surface does by default:
    /// replace the selected range, insert, collapse the caret after the text.
    pub fn type_text(&mut self, text: &str) -> Position {
        let span = self
            .selection
            .unwrap_or_else(|| CursorSpan::collapsed(Position::root(self.nodes.len())));

        let pos = if span.is_collapsed() {
            span.end
        } else {
            let (from, to) = self.ordered(&span);
            let from = self.remove_range(from..to);
            self.position_at(from)
        };

        let caret = self.insert_text_at(pos, text);
        self.collapse_to(caret);
        caret
    }

    /// Delete the selected range, or the character (or atom) before the caret
    pub fn delete_backward(&mut self) -> bool {
        let Some(span) = self.selection else {
            return false;
        };
        let (from, to) = self.ordered(&span);
        let (from, to) = if from != to {
            (from, to)
        } else if to == 0 {
            return false;
        } else {
            (to - 1, to)
        };

        let from = self.remove_range(from..to);
        let caret = self.position_at(from);
        self.collapse_to(caret);
        true
    }

    /// Delete the selected range, or the character (or atom) after the caret
    pub fn delete_forward(&mut self) -> bool {
        let Some(span) = self.selection else {
            return false;
        };
        let (from, to) = self.ordered(&span);
        let (from, to) = if from != to {
            (from, to)
        } else if from >= self.len_chars() {
            return false;
        } else {
            (from, from + 1)
        };

        let from = self.remove_range(from..to);
        let caret = self.position_at(from);
        self.collapse_to(caret);
        true
    }

    /// Linear offsets of a span's ends, in document order
    pub fn ordered(&self, span: &CursorSpan) -> (usize, usize) {
        let a = self.linear_offset(&span.start);
        let b = self.linear_offset(&span.end);
        (a.min(b), a.max(b))
    }
}

/// Convert char offset to byte offset
fn char_to_byte(s: &str, char_offset: usize) -> usize {
    s.char_indices()
        .nth(char_offset)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}
