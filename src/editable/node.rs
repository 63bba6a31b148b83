//! Content nodes of an editable surface.
//!
//! The surface is a single inline container (no block structure), so the
//! content is a flat list of nodes: editable text runs, non-editable inline
//! elements (signal tokens), and line breaks.

/// Attribute that marks an element as non-editable
pub const ATTR_CONTENTEDITABLE: &str = "contenteditable";

/// A child node of the surface container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Editable text run (may be empty, which acts as a caret placeholder)
    Text(String),
    /// Non-editable inline element, treated as a single atom
    Inline(InlineElement),
    /// Hard line break (`<br>`)
    LineBreak,
}

impl Node {
    /// Create a text node
    pub fn text(s: impl Into<String>) -> Self {
        Node::Text(s.into())
    }

    /// Length in characters as seen by plain-text extraction
    pub fn char_len(&self) -> usize {
        match self {
            Node::Text(s) => s.chars().count(),
            Node::Inline(el) => el.text.chars().count(),
            Node::LineBreak => 1,
        }
    }

    /// Append this node's plain text to `out`
    pub fn push_plain(&self, out: &mut String) {
        match self {
            Node::Text(s) => out.push_str(s),
            Node::Inline(el) => out.push_str(&el.text),
            Node::LineBreak => out.push('\n'),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    /// Atomic nodes can't hold a caret inside them
    pub fn is_atomic(&self) -> bool {
        !self.is_text()
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_inline(&self) -> Option<&InlineElement> {
        match self {
            Node::Inline(el) => Some(el),
            _ => None,
        }
    }
}

/// A non-editable inline element, e.g. a confirmed signal token.
///
/// Only its tag, attributes (in source order) and flattened display text
/// are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineElement {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub text: String,
}

impl InlineElement {
    pub fn new(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            text: text.into(),
        }
    }

    /// Add an attribute (builder pattern)
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Look up an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(k, _)| k == name)
    }
}

/// Check whether an element with these attributes is kept as an atom
pub fn is_atomic_element(attrs: &[(String, String)]) -> bool {
    attrs.iter().any(|(k, v)| {
        (k == ATTR_CONTENTEDITABLE && v.eq_ignore_ascii_case("false"))
            || k == crate::signal::ATTR_SIGNAL
    })
}
