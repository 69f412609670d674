//! Walkers that select whole nodes: objects and groups.

use std::fmt;

use super::output::{Braille, Description, entered_context, inline_role};
use super::table::target_cell;
use super::{Action, Granularity, Walker};
use crate::selection::Range;
use crate::tree::{ContentTree, NodeId, NodeKind, Traversal};

/// Which nodes a [`NodeWalker`] stops on.
pub trait NodeClass: fmt::Debug {
    fn granularity(&self) -> Granularity;
    fn accepts(&self, walk: &Traversal, node: NodeId) -> bool;
}

/// Leaf objects: text nodes with visible content, and void elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct Objects;

impl NodeClass for Objects {
    fn granularity(&self) -> Granularity {
        Granularity::Object
    }

    fn accepts(&self, walk: &Traversal, node: NodeId) -> bool {
        match walk.kind(node) {
            Some(NodeKind::Text) => !walk.text(node).trim().is_empty(),
            Some(kind) => kind.is_void(),
            None => false,
        }
    }
}

/// Blocks holding content of their own (not only nested blocks), and rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct Groups;

impl NodeClass for Groups {
    fn granularity(&self) -> Granularity {
        Granularity::Group
    }

    fn accepts(&self, walk: &Traversal, node: NodeId) -> bool {
        match walk.kind(node) {
            Some(NodeKind::Rule) => true,
            Some(kind) if kind.is_block() => has_direct_content(walk, node),
            _ => false,
        }
    }
}

/// Whether visible text or a void element is reachable from `node` without
/// entering a nested block.
fn has_direct_content(walk: &Traversal, node: NodeId) -> bool {
    let mut pending: Vec<NodeId> = walk.first_child(node).into_iter().collect();
    while let Some(current) = pending.pop() {
        pending.extend(walk.next_sibling(current));
        match walk.kind(current) {
            Some(NodeKind::Text) => {
                if !walk.text(current).trim().is_empty() {
                    return true;
                }
            }
            Some(kind) if kind.is_block() => {}
            Some(kind) if kind.is_void() => return true,
            Some(_) => pending.extend(walk.first_child(current)),
            None => {}
        }
    }
    false
}

#[derive(Debug, Clone, Default)]
pub struct NodeWalker<C> {
    class: C,
}

pub type ObjectWalker = NodeWalker<Objects>;
pub type GroupWalker = NodeWalker<Groups>;

impl<C: NodeClass> NodeWalker<C> {
    pub fn new(class: C) -> Self {
        Self { class }
    }

    fn matches(&self, walk: &Traversal, node: NodeId) -> bool {
        self.class.accepts(walk, node)
    }

    /// First match strictly inside `node`, in the given direction.
    fn first_within(&self, walk: &Traversal, node: NodeId, reversed: bool) -> Option<NodeId> {
        if reversed {
            let mut current = walk.last_descendant(node);
            while current != node {
                if self.matches(walk, current) {
                    return Some(current);
                }
                current = walk.previous_in_order(current)?;
            }
            None
        } else {
            let mut current = walk.next_in_subtree(node, node)?;
            loop {
                if self.matches(walk, current) {
                    return Some(current);
                }
                current = walk.next_in_subtree(current, node)?;
            }
        }
    }

    /// First match after `node` in pre-order (before it when reversed).
    fn beyond(&self, walk: &Traversal, node: NodeId, reversed: bool) -> Option<NodeId> {
        let mut current = node;
        loop {
            current = if reversed {
                walk.previous_in_order(current)?
            } else {
                walk.next_in_order(current)?
            };
            if self.matches(walk, current) {
                return Some(current);
            }
        }
    }

    fn select(tree: &dyn ContentTree, walk: &Traversal, found: Option<NodeId>, reversed: bool) -> Option<Range> {
        walk.finish(found)
            .and_then(|node| Range::from_node(tree, node))
            .map(|range| range.directed(reversed))
    }

    fn annotation(walk: &Traversal, node: NodeId) -> String {
        match walk.kind(node) {
            Some(NodeKind::Text) => inline_role(walk, node),
            Some(kind) => kind.role(),
            None => String::new(),
        }
    }
}

impl<C: NodeClass> Walker for NodeWalker<C> {
    fn granularity(&self) -> Granularity {
        self.class.granularity()
    }

    fn sync(&self, tree: &dyn ContentTree, range: &Range) -> Option<Range> {
        let walk = Traversal::new(tree);
        let reversed = range.is_reversed();
        let anchor = if range.is_node_selection() {
            range.start().node
        } else if reversed {
            range.abs_end().node
        } else {
            range.abs_start().node
        };
        if !walk.is_attached(anchor) {
            return None;
        }

        let found = if self.matches(&walk, anchor) {
            Some(anchor)
        } else {
            let inside = if range.is_node_selection() {
                self.first_within(&walk, anchor, reversed)
            } else {
                None
            };
            inside
                .or_else(|| {
                    let parent = walk.parent(anchor)?;
                    walk.nearest(parent, |n| self.matches(&walk, n))
                })
                .or_else(|| self.beyond(&walk, anchor, reversed))
                .or_else(|| self.beyond(&walk, anchor, !reversed))
        };
        log::trace!("{} sync found {:?}", self.granularity(), found);
        Self::select(tree, &walk, found, reversed)
    }

    fn next(&self, tree: &dyn ContentTree, range: &Range) -> Option<Range> {
        let walk = Traversal::new(tree);
        let reversed = range.is_reversed();
        let anchor = if range.is_node_selection() {
            range.start().node
        } else if reversed {
            range.abs_start().node
        } else {
            range.abs_end().node
        };
        if !walk.is_attached(anchor) {
            return None;
        }
        let found = self.beyond(&walk, anchor, reversed);
        Self::select(tree, &walk, found, reversed)
    }

    fn describe(&self, tree: &dyn ContentTree, prev: Option<&Range>, range: &Range) -> Description {
        let walk = Traversal::new(tree);
        let node = range.start().node;
        Description {
            context: entered_context(&walk, prev, node).join(" "),
            text: range.text(tree),
            annotation: Self::annotation(&walk, node),
        }
    }

    fn braille(&self, tree: &dyn ContentTree, _prev: Option<&Range>, range: &Range) -> Braille {
        let walk = Traversal::new(tree);
        let parts = [range.text(tree), Self::annotation(&walk, range.start().node)];
        let text = parts
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Braille {
            text,
            start: 0,
            end: 0,
        }
    }

    fn has_action(&self, _action: Action) -> bool {
        true
    }

    /// Moves to the neighbouring table cell, landing on the first unit of
    /// this granularity inside it (or the cell itself when it has none).
    fn perform_action(&self, tree: &dyn ContentTree, action: Action, range: &Range) -> Option<Range> {
        let walk = Traversal::new(tree);
        let cell = walk.finish(target_cell(&walk, range.start().node, action))?;
        let wrapped = Range::from_node(tree, cell)?.directed(range.is_reversed());
        match self.sync(tree, &wrapped) {
            Some(synced) if walk.is_within(synced.start().node, cell) => Some(synced),
            _ => Some(wrapped),
        }
    }
}
