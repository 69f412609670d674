//! Text runs: the flat text that word, sentence, line and character units
//! are cut from.
//!
//! A run is a maximal pre-order-contiguous sequence of text nodes that share
//! a block ancestor. Inline elements (emphasis, links, images) do not break
//! a run; any block element or a text node belonging to another block does.

use super::segment::Span;
use crate::selection::{Cursor, Range};
use crate::tree::traverse::char_len;
use crate::tree::{ContentTree, NodeId, NodeKind, TextPoint, Traversal};

/// One text node's share of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Piece {
    pub node: NodeId,
    /// Char offset of the node's first char within the run text
    pub start: usize,
    pub len: usize,
}

impl Piece {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Run {
    pub pieces: Vec<Piece>,
    pub text: String,
}

impl Run {
    /// The run containing text node `node`.
    pub fn around(walk: &Traversal, node: NodeId) -> Run {
        let block = walk.block_of(node);
        let continues = |candidate: NodeId| -> Option<bool> {
            match walk.kind(candidate)? {
                NodeKind::Text => (walk.block_of(candidate) == block).then_some(true),
                kind if kind.is_block() => None,
                _ => Some(false),
            }
        };

        let mut nodes = vec![node];
        let mut current = node;
        while let Some(previous) = walk.previous_in_order(current) {
            match continues(previous) {
                Some(true) => nodes.push(previous),
                Some(false) => {}
                None => break,
            }
            current = previous;
        }
        nodes.reverse();

        current = node;
        while let Some(next) = walk.next_in_order(current) {
            match continues(next) {
                Some(true) => nodes.push(next),
                Some(false) => {}
                None => break,
            }
            current = next;
        }

        let mut pieces = Vec::with_capacity(nodes.len());
        let mut text = String::new();
        let mut offset = 0;
        for node in nodes {
            let content = walk.text(node);
            let len = char_len(&content);
            pieces.push(Piece {
                node,
                start: offset,
                len,
            });
            text.push_str(&content);
            offset += len;
        }
        Run { pieces, text }
    }

    /// The run holding the first text node at or after `node` in pre-order.
    pub fn at_or_after(walk: &Traversal, node: NodeId) -> Option<(Run, Piece)> {
        let mut current = node;
        while walk.kind(current)? != NodeKind::Text {
            current = walk.next_in_order(current)?;
        }
        let run = Run::around(walk, current);
        let piece = run.piece(current)?;
        Some((run, piece))
    }

    /// The run holding the last text node inside or before `node`.
    pub fn at_or_before(walk: &Traversal, node: NodeId) -> Option<(Run, Piece)> {
        let mut current = walk.last_descendant(node);
        while walk.kind(current)? != NodeKind::Text {
            current = walk.previous_in_order(current)?;
        }
        let run = Run::around(walk, current);
        let piece = run.piece(current)?;
        Some((run, piece))
    }

    /// Next run in document order.
    pub fn following(&self, walk: &Traversal) -> Option<Run> {
        let last = self.pieces.last()?.node;
        Run::at_or_after(walk, walk.next_in_order(last)?).map(|(run, _)| run)
    }

    /// Previous run in document order.
    pub fn preceding(&self, walk: &Traversal) -> Option<Run> {
        let first = self.pieces.first()?.node;
        let mut current = walk.previous_in_order(first)?;
        while walk.kind(current)? != NodeKind::Text {
            current = walk.previous_in_order(current)?;
        }
        Some(Run::around(walk, current))
    }

    pub fn piece(&self, node: NodeId) -> Option<Piece> {
        self.pieces.iter().find(|p| p.node == node).copied()
    }

    pub fn len(&self) -> usize {
        self.pieces.last().map_or(0, Piece::end)
    }

    /// Run offset of a point inside one of the run's text nodes.
    pub fn position(&self, point: TextPoint) -> Option<usize> {
        self.piece(point.node)
            .map(|piece| piece.start + point.offset.min(piece.len))
    }

    /// Cursors bounding `span`: the start in the piece holding its first
    /// char, the end in the piece holding its last char.
    pub fn cursors(&self, tree: &dyn ContentTree, span: Span) -> Option<(Cursor, Cursor)> {
        if span.end <= span.start {
            return None;
        }
        let first = self.pieces.iter().find(|p| p.start <= span.start && span.start < p.end())?;
        let last = self
            .pieces
            .iter()
            .find(|p| p.start < span.end && span.end <= p.end())?;
        Some((
            Cursor::at(tree, first.node, span.start - first.start),
            Cursor::at(tree, last.node, span.end - last.start),
        ))
    }

    pub fn range(&self, tree: &dyn ContentTree, span: Span, reversed: bool) -> Option<Range> {
        let (first, last) = self.cursors(tree, span)?;
        Some(Range::ordered(first, last, reversed))
    }
}
