use super::{ContentTree, LiveSelection, NodeId, NodeKind};
use crate::error::TreeError;
use crate::selection::Range;

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    /// Own text for text nodes, label for void nodes.
    text: String,
    parent: Option<NodeId>,
    /// Index within the parent's `children`
    position: usize,
    children: Vec<NodeId>,
}

/// Arena-backed content tree with a host-side live selection.
///
/// The root is always a [`NodeKind::Body`]. Detached nodes keep their ids but
/// are unreachable from the root; cursors into them stop resolving.
///
/// ```rust
/// # use granule_engine::{Document, ContentTree, NodeKind};
/// let doc = Document::from_markdown("# Title\n\nSome text.");
/// let heading = doc.first_child(doc.root()).unwrap();
/// assert_eq!(doc.kind(heading), Some(NodeKind::Heading(1)));
/// assert_eq!(doc.node_text(doc.root()), "TitleSome text.");
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    /// Last range pushed by the dispatcher (the host's native selection)
    live_selection: Option<Range>,
    /// Incremented on every display refresh request
    display_updates: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document: a body with no children.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Body,
                text: String::new(),
                parent: None,
                position: 0,
                children: Vec::new(),
            }],
            live_selection: None,
            display_updates: 0,
        }
    }

    /// Build a document from Markdown source.
    pub fn from_markdown(source: &str) -> Self {
        let mut doc = Self::new();
        super::markdown::build(&mut doc, source);
        doc
    }

    fn node(&self, id: NodeId) -> Result<&Node, TreeError> {
        self.nodes
            .get(id.index())
            .ok_or(TreeError::UnknownNode(id))
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind, text: String) -> Result<NodeId, TreeError> {
        let parent_kind = self.node(parent)?.kind;
        if parent_kind.is_text() || parent_kind.is_void() {
            return Err(TreeError::NotAContainer(parent));
        }
        let id = NodeId::new(self.nodes.len());
        let position = self.nodes[parent.index()].children.len();
        self.nodes.push(Node {
            kind,
            text,
            parent: Some(parent),
            position,
            children: Vec::new(),
        });
        self.nodes[parent.index()].children.push(id);
        Ok(id)
    }

    /// Append an element (non-text, non-void) child.
    pub fn append_element(&mut self, parent: NodeId, kind: NodeKind) -> Result<NodeId, TreeError> {
        if kind.is_text() || kind.is_void() {
            return Err(TreeError::WrongKind(kind));
        }
        self.push(parent, kind, String::new())
    }

    /// Append a text child.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId, TreeError> {
        self.push(parent, NodeKind::Text, text.to_string())
    }

    /// Append a childless void node (image, rule, input) carrying a label.
    pub fn append_void(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        label: &str,
    ) -> Result<NodeId, TreeError> {
        if !kind.is_void() {
            return Err(TreeError::WrongKind(kind));
        }
        self.push(parent, kind, label.to_string())
    }

    /// Replace the text of a text node, or the label of a void node.
    pub fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), TreeError> {
        let kind = self.node(node)?.kind;
        if !kind.is_text() && !kind.is_void() {
            return Err(TreeError::NotText(node));
        }
        self.nodes[node.index()].text = text.to_string();
        Ok(())
    }

    /// Unlink a subtree from its parent.
    pub fn detach(&mut self, node: NodeId) -> Result<(), TreeError> {
        let parent = self.node(node)?.parent;
        let Some(parent) = parent else {
            return Err(TreeError::DetachRoot);
        };
        let position = self.nodes[node.index()].position;
        let siblings = &mut self.nodes[parent.index()].children;
        if siblings.get(position) == Some(&node) {
            siblings.remove(position);
            let shifted = siblings[position..].to_vec();
            for sibling in shifted {
                self.nodes[sibling.index()].position -= 1;
            }
        }
        self.nodes[node.index()].parent = None;
        Ok(())
    }

    /// Last range synced into the live selection.
    pub fn live_selection(&self) -> Option<&Range> {
        self.live_selection.as_ref()
    }

    /// How many display refreshes were requested.
    pub fn display_updates(&self) -> u64 {
        self.display_updates
    }

    /// Text node that can absorb more text when appended to `parent`.
    pub(crate) fn trailing_text(&self, parent: NodeId) -> Option<NodeId> {
        let last = *self.node(parent).ok()?.children.last()?;
        (self.nodes[last.index()].kind == NodeKind::Text).then_some(last)
    }

    pub(crate) fn extend_text(&mut self, node: NodeId, text: &str) {
        if let Some(n) = self.nodes.get_mut(node.index()) {
            n.text.push_str(text);
        }
    }

    fn sibling(&self, node: NodeId, delta: isize) -> Option<NodeId> {
        let n = self.nodes.get(node.index())?;
        let siblings = &self.nodes[n.parent?.index()].children;
        siblings.get(n.position.checked_add_signed(delta)?).copied()
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(n) = self.nodes.get(node.index()) else {
            return;
        };
        match n.kind {
            NodeKind::Text => out.push_str(&n.text),
            _ => {
                for &child in &n.children {
                    self.collect_text(child, out);
                }
            }
        }
    }
}

impl ContentTree for Document {
    fn root(&self) -> NodeId {
        NodeId::new(0)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.index())?.parent
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.index())?.children.first().copied()
    }

    fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.index())?.children.last().copied()
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.sibling(node, 1)
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.sibling(node, -1)
    }

    fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.nodes.get(node.index()).map(|n| n.kind)
    }

    fn node_text(&self, node: NodeId) -> String {
        match self.nodes.get(node.index()) {
            Some(n) if n.kind.is_text() || n.kind.is_void() => n.text.clone(),
            Some(_) => {
                let mut text = String::new();
                self.collect_text(node, &mut text);
                text
            }
            None => String::new(),
        }
    }

    fn content_end_offset(&self, node: NodeId) -> usize {
        match self.nodes.get(node.index()) {
            Some(n) if n.kind.is_text() => n.text.chars().count(),
            Some(n) if n.children.is_empty() => 0,
            Some(_) => self.node_text(node).chars().count(),
            None => 0,
        }
    }

    fn node_count(&self) -> Option<usize> {
        Some(self.nodes.len())
    }
}

impl LiveSelection for Document {
    fn sync_to(&mut self, range: &Range) {
        log::debug!(
            "live selection moved to {}:{}..{}:{}",
            range.start().node,
            range.start().index,
            range.end().node,
            range.end().index
        );
        self.live_selection = Some(range.clone());
    }

    fn update_display(&mut self) {
        self.display_updates += 1;
    }
}
