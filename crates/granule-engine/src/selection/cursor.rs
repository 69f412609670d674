use crate::tree::{ContentTree, NodeId};

/// A point in the content tree.
///
/// `text` is the node's text captured when the cursor was created, so a
/// cursor keeps describing what it pointed at even if the node changes later.
/// Equality looks at node identity and offset only.
#[derive(Debug, Clone, Eq)]
pub struct Cursor {
    pub node: NodeId,
    /// Offset in chars of `text`
    pub index: usize,
    pub text: String,
}

impl PartialEq for Cursor {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node && self.index == other.index
    }
}

impl Cursor {
    pub fn new(node: NodeId, index: usize, text: String) -> Self {
        Self { node, index, text }
    }

    /// Cursor at `index` in `node`, capturing the node's current text.
    pub fn at(tree: &dyn ContentTree, node: NodeId, index: usize) -> Self {
        Self::new(node, index, tree.node_text(node))
    }

    pub fn copy_from(&mut self, other: &Cursor) {
        self.node = other.node;
        self.index = other.index;
        self.text.clone_from(&other.text);
    }
}
