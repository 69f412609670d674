//! Speech and braille output for a navigation step.

use std::fmt;

use crate::selection::Range;
use crate::tree::{NodeId, NodeKind, Traversal};

/// What to announce after moving from one range to another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Description {
    /// Containers newly entered relative to the previous range
    pub context: String,
    pub text: String,
    /// Role of the selected object, if it has one
    pub annotation: String,
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = [&self.context, &self.text, &self.annotation]
            .into_iter()
            .map(String::as_str)
            .filter(|part| !part.is_empty())
            .collect();
        f.write_str(&parts.join(", "))
    }
}

/// One braille line with the selected region marked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Braille {
    pub text: String,
    /// Selection bounds in chars of `text`; equal when nothing is marked
    pub start: usize,
    pub end: usize,
}

/// Roles of context containers (lists, tables, quotes, code blocks) holding
/// `node` that `prev` was not already inside, outermost first.
pub(crate) fn entered_context(walk: &Traversal, prev: Option<&Range>, node: NodeId) -> Vec<String> {
    let previous_chain = prev.map(|p| walk.ancestors(p.start().node)).unwrap_or_default();
    let mut roles: Vec<String> = walk
        .ancestors(node)
        .into_iter()
        .skip(1)
        .filter(|ancestor| !previous_chain.contains(ancestor))
        .filter_map(|ancestor| walk.kind(ancestor))
        .filter(|kind| kind.is_context())
        .map(NodeKind::role)
        .collect();
    roles.reverse();
    roles
}

/// Role of the inline element directly wrapping a text node (link, code...).
pub(crate) fn inline_role(walk: &Traversal, node: NodeId) -> String {
    if walk.kind(node) != Some(NodeKind::Text) {
        return String::new();
    }
    walk.parent(node)
        .and_then(|parent| walk.kind(parent))
        .filter(|kind| !kind.is_block())
        .map(NodeKind::role)
        .unwrap_or_default()
}

/// Spoken form of a single character.
pub(crate) fn spoken_char(text: &str) -> String {
    match text {
        " " | "\u{a0}" => "space".to_string(),
        "\n" => "new line".to_string(),
        "\t" => "tab".to_string(),
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{ContentTree, Document};
    use pretty_assertions::assert_eq;

    #[test]
    fn display_skips_empty_parts() {
        let description = Description {
            context: "list".to_string(),
            text: "milk".to_string(),
            annotation: String::new(),
        };
        assert_eq!(description.to_string(), "list, milk");
        assert_eq!(Description::default().to_string(), "");
    }

    #[test]
    fn context_reports_only_newly_entered_containers() {
        let doc = Document::from_markdown("intro\n\n> - quoted item\n> - another\n");
        let walk = Traversal::new(&doc);
        let texts = walk.text_nodes_within(doc.root());
        let intro = Range::from_node(&doc, texts[0]).unwrap();
        let first_item = Range::from_node(&doc, texts[1]).unwrap();

        assert_eq!(
            entered_context(&walk, Some(&intro), texts[1]),
            vec!["quote".to_string(), "list".to_string()]
        );
        assert!(entered_context(&walk, Some(&first_item), texts[2]).is_empty());
        assert_eq!(entered_context(&walk, None, texts[0]), Vec::<String>::new());
    }

    #[test]
    fn inline_role_names_the_wrapping_element() {
        let doc = Document::from_markdown("see [docs](x) now");
        let walk = Traversal::new(&doc);
        let texts = walk.text_nodes_within(doc.root());

        assert_eq!(inline_role(&walk, texts[0]), "");
        assert_eq!(inline_role(&walk, texts[1]), "link");
        assert_eq!(inline_role(&walk, doc.root()), "");
    }

    #[test]
    fn whitespace_characters_are_named() {
        assert_eq!(spoken_char(" "), "space");
        assert_eq!(spoken_char("\n"), "new line");
        assert_eq!(spoken_char("x"), "x");
    }
}
