//! Position types for the editable content tree.

/// The node a [`Position`] is anchored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    /// The surface container itself. The offset counts child nodes.
    Root,
    /// A child node of the container, by index.
    ///
    /// For text nodes the offset counts characters. For atomic nodes
    /// (inline tokens, line breaks) offset 0 is before the node and any
    /// other offset is after it.
    Child(usize),
}

/// A position in the content tree (node reference + offset within that node).
///
/// Positions are snapshots: any mutation of the content that touches the
/// referenced node (or shifts sibling indices) invalidates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub node: NodeRef,
    pub offset: usize,
}

impl Position {
    pub const fn new(node: NodeRef, offset: usize) -> Self {
        Self { node, offset }
    }

    /// Position between the container's children (`offset` = child index)
    pub const fn root(offset: usize) -> Self {
        Self::new(NodeRef::Root, offset)
    }

    /// Position inside the child at `index`
    pub const fn in_node(index: usize, offset: usize) -> Self {
        Self::new(NodeRef::Child(index), offset)
    }

    pub const fn zero() -> Self {
        Self::root(0)
    }

    /// Check if this position is anchored on the container rather than a child
    pub const fn is_root(&self) -> bool {
        matches!(self.node, NodeRef::Root)
    }

    /// Index of the anchoring child, if any
    pub const fn child_index(&self) -> Option<usize> {
        match self.node {
            NodeRef::Root => None,
            NodeRef::Child(index) => Some(index),
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_constructors() {
        let root = Position::root(3);
        assert!(root.is_root());
        assert_eq!(root.child_index(), None);

        let inner = Position::in_node(2, 5);
        assert!(!inner.is_root());
        assert_eq!(inner.child_index(), Some(2));
        assert_eq!(inner.offset, 5);
    }

    #[test]
    fn test_position_default_is_container_start() {
        assert_eq!(Position::default(), Position::new(NodeRef::Root, 0));
    }
}
