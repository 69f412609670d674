use std::cmp::Ordering;

use super::Cursor;
use crate::tree::traverse::{char_len, char_slice};
use crate::tree::{ContentTree, NodeId, NodeKind, Traversal};

/// A directed selection between two cursors.
///
/// Unless `reversed`, `start` never comes after `end` in document order; when
/// reversed the same holds with the ends swapped. `abs_start`/`abs_end` give the
/// document-order ends regardless of direction.
///
/// A range whose ends are equal is a *node selection*: it stands for the whole
/// node `start.node`, not for an empty span. Use [`Range::is_node_selection`]
/// to tell the two apart.
///
/// `set_reversed`, `collapse` and `normalize` mutate in place and return
/// `&mut Self` for chaining; `clone` is an independent deep copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    start: Cursor,
    end: Cursor,
    reversed: bool,
}

impl Range {
    /// Build a range, swapping the cursors if they are out of order for the
    /// requested direction.
    pub fn new(tree: &dyn ContentTree, start: Cursor, end: Cursor, reversed: bool) -> Self {
        let order = Traversal::new(tree).compare_cursors(&start, &end);
        let misordered = match order {
            Some(Ordering::Greater) => !reversed,
            Some(Ordering::Less) => reversed,
            _ => false,
        };
        if misordered {
            Self {
                start: end,
                end: start,
                reversed,
            }
        } else {
            Self {
                start,
                end,
                reversed,
            }
        }
    }

    /// Build from cursors already in document order.
    pub(crate) fn ordered(first: Cursor, last: Cursor, reversed: bool) -> Self {
        if reversed {
            Self {
                start: last,
                end: first,
                reversed,
            }
        } else {
            Self {
                start: first,
                end: last,
                reversed,
            }
        }
    }

    /// Node selection of `node`, `None` if the tree does not know it.
    pub fn from_node(tree: &dyn ContentTree, node: NodeId) -> Option<Self> {
        tree.kind(node)?;
        let cursor = Cursor::at(tree, node, 0);
        Some(Self {
            start: cursor.clone(),
            end: cursor,
            reversed: false,
        })
    }

    /// Node selection of the whole document.
    pub fn from_body(tree: &dyn ContentTree) -> Self {
        let cursor = Cursor::at(tree, tree.root(), 0);
        Self {
            start: cursor.clone(),
            end: cursor,
            reversed: false,
        }
    }

    pub fn start(&self) -> &Cursor {
        &self.start
    }

    pub fn end(&self) -> &Cursor {
        &self.end
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// The end that comes first in document order.
    pub fn abs_start(&self) -> &Cursor {
        if self.reversed { &self.end } else { &self.start }
    }

    /// The end that comes last in document order.
    pub fn abs_end(&self) -> &Cursor {
        if self.reversed { &self.start } else { &self.end }
    }

    fn abs_end_mut(&mut self) -> &mut Cursor {
        if self.reversed {
            &mut self.start
        } else {
            &mut self.end
        }
    }

    pub fn is_node_selection(&self) -> bool {
        self.start == self.end
    }

    /// Both ends point at nodes reachable from the tree's root.
    pub fn is_attached(&self, tree: &dyn ContentTree) -> bool {
        let walk = Traversal::new(tree);
        walk.is_attached(self.start.node) && walk.is_attached(self.end.node)
    }

    /// Set the direction, swapping the ends if it changes.
    pub fn set_reversed(&mut self, reversed: bool) -> &mut Self {
        if reversed != self.reversed {
            std::mem::swap(&mut self.start, &mut self.end);
            self.reversed = reversed;
        }
        self
    }

    /// By-value form of [`Range::set_reversed`].
    pub fn directed(mut self, reversed: bool) -> Self {
        self.set_reversed(reversed);
        self
    }

    /// Shrink to the single char just after the directed start (just before
    /// it when reversed), clamped to the start node's text. Node selections
    /// are left alone.
    pub fn collapse(&mut self) -> &mut Self {
        if self.is_node_selection() {
            return self;
        }
        self.end.copy_from(&self.start);
        let len = char_len(&self.start.text);
        if len == 0 {
            return self;
        }
        if self.reversed {
            self.end.index = self.end.index.saturating_sub(1);
        } else if self.end.index < len {
            self.end.index += 1;
        }
        self
    }

    /// For a range built by wrapping a node (absolute end at offset 0), move
    /// the absolute end to the offset that surrounds the node's content.
    pub fn normalize(&mut self, tree: &dyn ContentTree) -> &mut Self {
        if self.abs_end().index == 0 {
            let node = self.abs_end().node;
            self.abs_end_mut().index = tree.content_end_offset(node);
        }
        self
    }

    /// Text covered by the range; the whole node's text for node selections.
    pub fn text(&self, tree: &dyn ContentTree) -> String {
        if self.is_node_selection() {
            return self.start.text.clone();
        }
        let (first, last) = (self.abs_start(), self.abs_end());
        if first.node == last.node {
            return char_slice(&first.text, first.index, last.index);
        }

        let walk = Traversal::new(tree);
        let (Some(from), Some(to)) = (walk.resolve(first), walk.resolve(last)) else {
            return String::new();
        };
        let mut text = String::new();
        let mut block = walk.block_of(from.node);
        let mut current = Some(from.node);
        while let Some(node) = current {
            if walk.kind(node) == Some(NodeKind::Text) {
                let content = walk.text(node);
                let start = if node == from.node { from.offset } else { 0 };
                let end = if node == to.node {
                    to.offset
                } else {
                    char_len(&content)
                };
                // Separate text taken from different blocks
                let node_block = walk.block_of(node);
                if node_block != block && !text.is_empty() {
                    text.push('\n');
                }
                block = node_block;
                text.push_str(&char_slice(&content, start, end));
            }
            if node == to.node {
                break;
            }
            current = walk.next_in_order(node);
        }
        walk.finish(Some(text)).unwrap_or_default()
    }

    /// Whether this range comes before `other` in this range's own direction.
    ///
    /// Only start nodes are compared. Ranges starting in the same node count
    /// as "before" each other, so the ordering is not strict.
    pub fn directed_before(&self, tree: &dyn ContentTree, other: &Range) -> bool {
        if self.start.node == other.start.node {
            return true;
        }
        let wanted = if self.reversed {
            Ordering::Greater
        } else {
            Ordering::Less
        };
        Traversal::new(tree).compare(self.start.node, other.start.node) == Some(wanted)
    }

    /// Endpoint equality ignoring direction.
    pub fn abs_equals(&self, other: &Range) -> bool {
        (self.start == other.start && self.end == other.end)
            || (self.start == other.end && self.end == other.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Document;
    use pretty_assertions::assert_eq;

    /// Body > Paragraph > Text("a b c"), Paragraph > Text("second")
    fn two_paragraphs() -> (Document, NodeId, NodeId) {
        let doc = Document::from_markdown("a b c\n\nsecond");
        let first_para = doc.first_child(doc.root()).unwrap();
        let first = doc.first_child(first_para).unwrap();
        let second_para = doc.next_sibling(first_para).unwrap();
        let second = doc.first_child(second_para).unwrap();
        (doc, first, second)
    }

    #[test]
    fn construction_swaps_out_of_order_cursors() {
        let (doc, first, second) = two_paragraphs();
        let early = Cursor::at(&doc, first, 1);
        let late = Cursor::at(&doc, second, 2);

        let forward = Range::new(&doc, late.clone(), early.clone(), false);
        assert_eq!(forward.start(), &early);
        assert_eq!(forward.end(), &late);

        let backward = Range::new(&doc, early.clone(), late.clone(), true);
        assert_eq!(backward.start(), &late);
        assert_eq!(backward.end(), &early);
        assert_eq!(backward.abs_start(), &early);
        assert_eq!(backward.abs_end(), &late);
    }

    #[test]
    fn construction_orders_offsets_within_one_node() {
        let (doc, first, _) = two_paragraphs();
        let range = Range::new(
            &doc,
            Cursor::at(&doc, first, 4),
            Cursor::at(&doc, first, 2),
            false,
        );
        assert_eq!(range.start().index, 2);
        assert_eq!(range.end().index, 4);
    }

    #[test]
    fn set_reversed_swaps_only_on_change() {
        let (doc, first, _) = two_paragraphs();
        let mut range = Range::new(
            &doc,
            Cursor::at(&doc, first, 2),
            Cursor::at(&doc, first, 3),
            false,
        );

        range.set_reversed(false);
        assert_eq!(range.start().index, 2);

        range.set_reversed(true);
        assert!(range.is_reversed());
        assert_eq!(range.start().index, 3);
        assert_eq!(range.end().index, 2);
        assert_eq!(range.abs_start().index, 2);

        range.set_reversed(false).set_reversed(false);
        assert_eq!(range.start().index, 2);
    }

    #[test]
    fn clone_is_independent() {
        let (doc, first, _) = two_paragraphs();
        let original = Range::new(
            &doc,
            Cursor::at(&doc, first, 0),
            Cursor::at(&doc, first, 1),
            false,
        );
        let mut copy = original.clone();
        copy.set_reversed(true);

        assert!(!original.is_reversed());
        assert_eq!(original.start().index, 0);
    }

    #[test]
    fn collapse_takes_one_char_after_directed_start() {
        let (doc, first, _) = two_paragraphs();
        let mut forward = Range::new(
            &doc,
            Cursor::at(&doc, first, 2),
            Cursor::at(&doc, first, 5),
            false,
        );
        forward.collapse();
        assert_eq!((forward.start().index, forward.end().index), (2, 3));
        assert_eq!(forward.text(&doc), "b");

        let mut backward = Range::new(
            &doc,
            Cursor::at(&doc, first, 0),
            Cursor::at(&doc, first, 3),
            true,
        );
        backward.collapse();
        assert_eq!((backward.start().index, backward.end().index), (3, 2));
        assert_eq!(backward.text(&doc), "b");
    }

    #[test]
    fn collapse_clamps_at_text_boundaries() {
        let (doc, first, second) = two_paragraphs();
        let mut at_end = Range::new(
            &doc,
            Cursor::at(&doc, first, 5),
            Cursor::at(&doc, second, 2),
            false,
        );
        at_end.collapse();
        assert_eq!((at_end.start().index, at_end.end().index), (5, 5));
        assert_eq!(at_end.end().node, first);

        let mut at_start = Range::new(
            &doc,
            Cursor::at(&doc, first, 2),
            Cursor::at(&doc, second, 0),
            true,
        );
        at_start.collapse();
        assert_eq!(at_start.start().node, second);
        assert_eq!((at_start.start().index, at_start.end().index), (0, 0));
    }

    #[test]
    fn collapse_leaves_node_selections_alone() {
        let (doc, _, _) = two_paragraphs();
        let mut body = Range::from_body(&doc);
        body.collapse();
        assert_eq!(body, Range::from_body(&doc));
    }

    #[test]
    fn normalize_surrounds_block_content() {
        let (doc, first, _) = two_paragraphs();
        let para = doc.parent(first).unwrap();
        let mut range = Range::from_node(&doc, para).unwrap();

        range.normalize(&doc);

        assert_eq!(range.start().index, 0);
        assert_eq!(range.end().index, 5);
        assert!(!range.is_node_selection());
        assert_eq!(range.text(&doc), "a b c");
    }

    #[test]
    fn normalize_leaves_childless_leaf_at_zero() {
        let mut doc = Document::new();
        let input = doc
            .append_void(doc.root(), NodeKind::Input, "not checked")
            .unwrap();
        let mut range = Range::from_node(&doc, input).unwrap();

        range.normalize(&doc);

        assert_eq!(range.end().index, 0);
        assert!(range.is_node_selection());
    }

    #[test]
    fn normalize_moves_the_absolute_end_of_reversed_ranges() {
        let (doc, first, _) = two_paragraphs();
        let mut range = Range::from_node(&doc, first).unwrap().directed(true);

        range.normalize(&doc);

        assert_eq!(range.abs_end().index, 5);
        assert_eq!(range.start().index, 5);
        assert_eq!(range.end().index, 0);
    }

    #[test]
    fn text_of_node_selection_is_whole_node() {
        let (doc, first, _) = two_paragraphs();
        let range = Range::from_node(&doc, first).unwrap();
        assert_eq!(range.text(&doc), "a b c");
        // Reading text does not change the range
        assert!(range.is_node_selection());
    }

    #[test]
    fn text_across_blocks_joins_with_newline() {
        let (doc, first, second) = two_paragraphs();
        let range = Range::new(
            &doc,
            Cursor::at(&doc, first, 2),
            Cursor::at(&doc, second, 3),
            false,
        );
        assert_eq!(range.text(&doc), "b c\nsec");
    }

    #[test]
    fn directed_before_follows_own_direction() {
        let (doc, first, second) = two_paragraphs();
        let early = Range::from_node(&doc, first).unwrap();
        let late = Range::from_node(&doc, second).unwrap();

        assert!(early.directed_before(&doc, &late));
        assert!(!late.directed_before(&doc, &early));

        let early_reversed = early.clone().directed(true);
        let late_reversed = late.clone().directed(true);
        assert!(late_reversed.directed_before(&doc, &early));
        assert!(!early_reversed.directed_before(&doc, &late));
    }

    #[test]
    fn directed_before_ties_on_same_start_node() {
        let (doc, first, _) = two_paragraphs();
        let a = Range::new(
            &doc,
            Cursor::at(&doc, first, 0),
            Cursor::at(&doc, first, 1),
            false,
        );
        let b = Range::new(
            &doc,
            Cursor::at(&doc, first, 4),
            Cursor::at(&doc, first, 5),
            false,
        );

        // Non-strict: both orders report "before"
        assert!(a.directed_before(&doc, &b));
        assert!(b.directed_before(&doc, &a));
    }

    #[test]
    fn equality_is_direction_sensitive_abs_equality_is_not() {
        let (doc, first, _) = two_paragraphs();
        let forward = Range::new(
            &doc,
            Cursor::at(&doc, first, 0),
            Cursor::at(&doc, first, 1),
            false,
        );
        let backward = forward.clone().directed(true);

        assert_ne!(forward, backward);
        assert!(forward.abs_equals(&backward));
        assert!(forward.abs_equals(&forward.clone()));
    }

    #[test]
    fn from_node_rejects_unknown_nodes() {
        let doc = Document::new();
        assert_eq!(Range::from_node(&doc, NodeId::new(42)), None);
    }

    #[test]
    fn attachment_tracks_detached_nodes() {
        let (mut doc, first, _) = two_paragraphs();
        let range = Range::from_node(&doc, first).unwrap();
        assert!(range.is_attached(&doc));

        let para = doc.parent(first).unwrap();
        doc.detach(para).unwrap();
        assert!(!range.is_attached(&doc));
    }
}
