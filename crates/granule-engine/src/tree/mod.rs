/*!
 * # Content Tree
 *
 * The navigation engine never owns the content it walks. It consumes any
 * structure implementing [`ContentTree`]: a rooted tree with a stable
 * parent/child/sibling order, per-node text extraction and the canonical end
 * offset used when a range wraps a whole node.
 *
 * - **`traverse`**: step-budgeted walking helpers (document order, pre-order
 *   stepping, attachment checks, text point resolution)
 * - **`document`**: [`Document`], the in-crate arena implementation
 * - **`markdown`**: builds a [`Document`] from Markdown via pulldown-cmark
 *
 * Hosts that render the content also implement [`LiveSelection`] so the
 * dispatcher can move the native cursor for fine granularities.
 */

pub mod document;
pub mod markdown;
pub mod traverse;

use std::fmt;

use crate::selection::Range;

pub use document::Document;
pub use traverse::{TextPoint, Traversal};

/// Identity of a node within one content tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn new(raw: usize) -> Self {
        Self(raw)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Structural role of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Body,
    Heading(u8),
    Paragraph,
    BlockQuote,
    List { ordered: bool },
    ListItem,
    CodeBlock,
    Table,
    TableRow,
    TableCell,
    Emphasis,
    Strong,
    Link,
    Code,
    Image,
    Rule,
    Input,
    Text,
}

impl NodeKind {
    /// Block kinds delimit text runs: words, sentences and lines never cross them.
    pub fn is_block(self) -> bool {
        matches!(
            self,
            NodeKind::Body
                | NodeKind::Heading(_)
                | NodeKind::Paragraph
                | NodeKind::BlockQuote
                | NodeKind::List { .. }
                | NodeKind::ListItem
                | NodeKind::CodeBlock
                | NodeKind::Table
                | NodeKind::TableRow
                | NodeKind::TableCell
                | NodeKind::Rule
        )
    }

    /// Void kinds never have children.
    pub fn is_void(self) -> bool {
        matches!(self, NodeKind::Image | NodeKind::Rule | NodeKind::Input)
    }

    /// Containers announced as context when navigation enters them.
    pub fn is_context(self) -> bool {
        matches!(
            self,
            NodeKind::BlockQuote | NodeKind::List { .. } | NodeKind::Table | NodeKind::CodeBlock
        )
    }

    pub fn is_text(self) -> bool {
        self == NodeKind::Text
    }

    /// Spoken role name, empty for kinds that are announced by content alone.
    pub fn role(self) -> String {
        match self {
            NodeKind::Body | NodeKind::Paragraph | NodeKind::Text => String::new(),
            NodeKind::Heading(level) => format!("heading {level}"),
            NodeKind::BlockQuote => "quote".to_string(),
            NodeKind::List { ordered: true } => "ordered list".to_string(),
            NodeKind::List { ordered: false } => "list".to_string(),
            NodeKind::ListItem => "list item".to_string(),
            NodeKind::CodeBlock => "code block".to_string(),
            NodeKind::Table => "table".to_string(),
            NodeKind::TableRow => "row".to_string(),
            NodeKind::TableCell => "cell".to_string(),
            NodeKind::Emphasis => "emphasis".to_string(),
            NodeKind::Strong => "strong".to_string(),
            NodeKind::Link => "link".to_string(),
            NodeKind::Code => "code".to_string(),
            NodeKind::Image => "image".to_string(),
            NodeKind::Rule => "separator".to_string(),
            NodeKind::Input => "check box".to_string(),
        }
    }
}

/// Read access to a structured content tree.
///
/// Node identities must stay stable for as long as the node is attached.
/// Offsets used by cursors are counted in chars of [`ContentTree::node_text`].
pub trait ContentTree {
    fn root(&self) -> NodeId;
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn first_child(&self, node: NodeId) -> Option<NodeId>;
    fn last_child(&self, node: NodeId) -> Option<NodeId>;
    fn next_sibling(&self, node: NodeId) -> Option<NodeId>;
    fn previous_sibling(&self, node: NodeId) -> Option<NodeId>;

    /// `None` for ids this tree does not know about.
    fn kind(&self, node: NodeId) -> Option<NodeKind>;

    /// Text of a node: its own text for text nodes, the label of void nodes,
    /// the concatenated text descendants otherwise.
    fn node_text(&self, node: NodeId) -> String;

    /// The end offset of a range that exactly surrounds the node's content.
    fn content_end_offset(&self, node: NodeId) -> usize;

    /// Number of nodes the tree holds, when known. Sizes the step budget of
    /// a [`Traversal`].
    fn node_count(&self) -> Option<usize> {
        None
    }
}

/// The host's native selection, moved by the dispatcher after fine-grained steps.
pub trait LiveSelection {
    fn sync_to(&mut self, range: &Range);
    fn update_display(&mut self);
}
