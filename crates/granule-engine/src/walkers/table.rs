//! Row and column movement inside tables.

use super::Action;
use crate::tree::{NodeId, NodeKind, Traversal};

/// Cell reached from the cell holding `node` by `action`, `None` outside a
/// table or past its edge.
pub(crate) fn target_cell(walk: &Traversal, node: NodeId, action: Action) -> Option<NodeId> {
    let cell = walk.nearest(node, |n| walk.kind(n) == Some(NodeKind::TableCell))?;
    let target = match action {
        Action::NextColumn => walk.next_sibling(cell),
        Action::PreviousColumn => walk.previous_sibling(cell),
        Action::NextRow | Action::PreviousRow => {
            let row = walk.parent(cell)?;
            let column = walk.child_position(cell);
            let target_row = if action == Action::NextRow {
                walk.next_sibling(row)?
            } else {
                walk.previous_sibling(row)?
            };
            nth_child(walk, target_row, column)
        }
    };
    target.filter(|target| walk.kind(*target) == Some(NodeKind::TableCell))
}

fn nth_child(walk: &Traversal, parent: NodeId, n: usize) -> Option<NodeId> {
    let mut child = walk.first_child(parent)?;
    for _ in 0..n {
        child = walk.next_sibling(child)?;
    }
    Some(child)
}
