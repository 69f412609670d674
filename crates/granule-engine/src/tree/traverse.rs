use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::collections::HashMap;

use super::{ContentTree, NodeId, NodeKind};
use crate::selection::Cursor;

/// Step budget of a navigation call over a tree of unknown or small size.
pub const MIN_TRAVERSAL_STEPS: usize = 200_000;

/// Steps allowed per node of a tree that reports its size. A call walks its
/// run or the whole tree a handful of times, each pass a few steps per node.
pub const STEPS_PER_NODE: usize = 64;

/// A resolved position inside a text node, offset in chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPoint {
    pub node: NodeId,
    pub offset: usize,
}

/// Step-budgeted walker over a [`ContentTree`].
///
/// Every primitive move spends one step. Once the budget is gone all moves
/// report "no such node", so loops over cyclic or otherwise broken trees end.
/// The budget grows with [`ContentTree::node_count`], so a well-formed tree
/// of any size is walked to the end.
/// Callers pass their result through [`Traversal::finish`] so partial answers
/// computed after exhaustion are discarded.
pub struct Traversal<'t> {
    tree: &'t dyn ContentTree,
    remaining: Cell<usize>,
    exhausted: Cell<bool>,
    /// Nearest block of inline nodes already looked up in this call
    blocks: RefCell<HashMap<NodeId, Option<NodeId>>>,
}

impl<'t> Traversal<'t> {
    pub fn new(tree: &'t dyn ContentTree) -> Self {
        Self::with_budget(tree, Self::budget_for(tree))
    }

    pub fn with_budget(tree: &'t dyn ContentTree, steps: usize) -> Self {
        Self {
            tree,
            remaining: Cell::new(steps),
            exhausted: Cell::new(false),
            blocks: RefCell::new(HashMap::new()),
        }
    }

    pub fn budget_for(tree: &dyn ContentTree) -> usize {
        tree.node_count()
            .map_or(MIN_TRAVERSAL_STEPS, |count| {
                count.saturating_mul(STEPS_PER_NODE).max(MIN_TRAVERSAL_STEPS)
            })
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted.get()
    }

    /// Drops `value` if the budget ran out while computing it.
    pub fn finish<T>(&self, value: Option<T>) -> Option<T> {
        if self.is_exhausted() { None } else { value }
    }

    fn step(&self) -> bool {
        let remaining = self.remaining.get();
        if remaining == 0 {
            if !self.exhausted.replace(true) {
                log::warn!("content tree traversal ran out of steps; giving up on this call");
            }
            return false;
        }
        self.remaining.set(remaining - 1);
        true
    }

    pub fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.tree.kind(node)
    }

    pub fn text(&self, node: NodeId) -> String {
        self.tree.node_text(node)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        if !self.step() {
            return None;
        }
        self.tree.parent(node)
    }

    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        if !self.step() {
            return None;
        }
        self.tree.first_child(node)
    }

    pub fn last_child(&self, node: NodeId) -> Option<NodeId> {
        if !self.step() {
            return None;
        }
        self.tree.last_child(node)
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        if !self.step() {
            return None;
        }
        self.tree.next_sibling(node)
    }

    pub fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        if !self.step() {
            return None;
        }
        self.tree.previous_sibling(node)
    }

    /// Next node in pre-order (document order).
    pub fn next_in_order(&self, node: NodeId) -> Option<NodeId> {
        match self.first_child(node) {
            Some(child) => Some(child),
            None => self.next_after_subtree(node),
        }
    }

    /// First node in pre-order that is not a descendant of `node`.
    pub fn next_after_subtree(&self, node: NodeId) -> Option<NodeId> {
        let mut current = node;
        loop {
            if let Some(sibling) = self.next_sibling(current) {
                return Some(sibling);
            }
            current = self.parent(current)?;
        }
    }

    /// Previous node in pre-order. Ancestors precede their descendants.
    pub fn previous_in_order(&self, node: NodeId) -> Option<NodeId> {
        match self.previous_sibling(node) {
            Some(sibling) => Some(self.last_descendant(sibling)),
            None => self.parent(node),
        }
    }

    /// Next pre-order node that stays inside `scope`.
    pub fn next_in_subtree(&self, node: NodeId, scope: NodeId) -> Option<NodeId> {
        if let Some(child) = self.first_child(node) {
            return Some(child);
        }
        let mut current = node;
        loop {
            if current == scope {
                return None;
            }
            if let Some(sibling) = self.next_sibling(current) {
                return Some(sibling);
            }
            current = self.parent(current)?;
        }
    }

    pub fn last_descendant(&self, node: NodeId) -> NodeId {
        let mut current = node;
        while let Some(child) = self.last_child(current) {
            current = child;
        }
        current
    }

    /// `node` first, the outermost ancestor last.
    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut chain = vec![node];
        let mut current = node;
        while let Some(parent) = self.parent(current) {
            chain.push(parent);
            current = parent;
        }
        chain
    }

    pub fn is_attached(&self, node: NodeId) -> bool {
        if self.kind(node).is_none() {
            return false;
        }
        let top = self.ancestors(node).last().copied();
        !self.is_exhausted() && top == Some(self.tree.root())
    }

    pub fn is_within(&self, node: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(node).contains(&ancestor)
    }

    /// Nearest ancestor-or-self satisfying `predicate`.
    pub fn nearest(&self, node: NodeId, predicate: impl Fn(NodeId) -> bool) -> Option<NodeId> {
        let mut current = node;
        loop {
            if predicate(current) {
                return Some(current);
            }
            current = self.parent(current)?;
        }
    }

    /// Nearest block ancestor-or-self.
    ///
    /// Answers are remembered for every inline node on the way up, so the
    /// siblings of a run each cost one parent step.
    pub fn block_of(&self, node: NodeId) -> Option<NodeId> {
        let mut inline = Vec::new();
        let mut current = node;
        let block = loop {
            if let Some(&known) = self.blocks.borrow().get(&current) {
                break known;
            }
            if self.kind(current).is_some_and(NodeKind::is_block) {
                break Some(current);
            }
            inline.push(current);
            match self.parent(current) {
                Some(parent) => current = parent,
                None => break None,
            }
        };
        if !self.is_exhausted() {
            self.blocks
                .borrow_mut()
                .extend(inline.into_iter().map(|n| (n, block)));
        }
        block
    }

    /// Number of preceding siblings.
    pub fn child_position(&self, node: NodeId) -> usize {
        let mut position = 0;
        let mut current = node;
        while let Some(sibling) = self.previous_sibling(current) {
            position += 1;
            current = sibling;
        }
        position
    }

    /// Document order of two nodes, `None` when they share no root.
    pub fn compare(&self, a: NodeId, b: NodeId) -> Option<Ordering> {
        if a == b {
            return Some(Ordering::Equal);
        }
        let mut path_a = self.ancestors(a);
        let mut path_b = self.ancestors(b);
        path_a.reverse();
        path_b.reverse();
        if path_a.first() != path_b.first() {
            return None;
        }
        let shared = path_a
            .iter()
            .zip(path_b.iter())
            .take_while(|(x, y)| x == y)
            .count();
        let order = match (path_a.get(shared), path_b.get(shared)) {
            (None, _) => Ordering::Less,
            (_, None) => Ordering::Greater,
            (Some(&x), Some(&y)) => self.child_position(x).cmp(&self.child_position(y)),
        };
        self.finish(Some(order))
    }

    /// Document order of two cursors: node order, then offset.
    pub fn compare_cursors(&self, a: &Cursor, b: &Cursor) -> Option<Ordering> {
        match self.compare(a.node, b.node)? {
            Ordering::Equal => Some(a.index.cmp(&b.index)),
            order => Some(order),
        }
    }

    /// Text nodes inside `node` (itself included) in document order.
    pub fn text_nodes_within(&self, node: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut current = Some(node);
        while let Some(n) = current {
            if self.kind(n) == Some(NodeKind::Text) {
                found.push(n);
            }
            current = self.next_in_subtree(n, node);
        }
        found
    }

    /// Maps a cursor to a point inside a text node.
    ///
    /// Element cursors index the element's text content; `None` when the
    /// element has no text descendants.
    pub fn resolve(&self, cursor: &Cursor) -> Option<TextPoint> {
        match self.kind(cursor.node)? {
            NodeKind::Text => {
                let len = char_len(&self.text(cursor.node));
                Some(TextPoint {
                    node: cursor.node,
                    offset: cursor.index.min(len),
                })
            }
            _ => {
                let mut consumed = 0;
                let mut last = None;
                for text in self.text_nodes_within(cursor.node) {
                    let len = char_len(&self.text(text));
                    if cursor.index < consumed + len {
                        return self.finish(Some(TextPoint {
                            node: text,
                            offset: cursor.index - consumed,
                        }));
                    }
                    consumed += len;
                    last = Some(TextPoint {
                        node: text,
                        offset: len,
                    });
                }
                self.finish(last)
            }
        }
    }
}

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Chars `start..end` of `text`, clamped to its length.
pub(crate) fn char_slice(text: &str, start: usize, end: usize) -> String {
    text.chars()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect()
}
