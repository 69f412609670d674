//! Builds a [`Document`] content tree from Markdown source.
//!
//! pulldown-cmark emits a flat event stream; nesting is reconstructed with a
//! stack of open nodes. Tags without a structural counterpart (footnotes,
//! HTML blocks, metadata) still push a stack entry so every `End` pops the
//! entry its `Start` pushed, but they add no node.

use pulldown_cmark::{Event, Options, Parser, Tag};

use super::{ContentTree, Document, NodeId, NodeKind};

pub(crate) fn build(doc: &mut Document, source: &str) {
    let options = Options::ENABLE_TABLES | Options::ENABLE_TASKLISTS | Options::ENABLE_STRIKETHROUGH;
    let mut builder = TreeBuilder::new(doc);
    for event in Parser::new_ext(source, options) {
        builder.process_event(event);
    }
}

/// One open tag.
enum Open {
    /// The tag produced this node; content goes below it.
    Node(NodeId),
    /// The tag produced no node; content goes to the enclosing node.
    Transparent,
    /// An image whose alt text is being collected into its label.
    Image { node: NodeId, alt: String },
}

struct TreeBuilder<'d> {
    doc: &'d mut Document,
    stack: Vec<Open>,
}

impl<'d> TreeBuilder<'d> {
    fn new(doc: &'d mut Document) -> Self {
        Self {
            doc,
            stack: Vec::new(),
        }
    }

    /// Node that receives new children.
    fn current(&self) -> NodeId {
        self.stack
            .iter()
            .rev()
            .find_map(|open| match open {
                Open::Node(id) => Some(*id),
                _ => None,
            })
            .unwrap_or_else(|| self.doc.root())
    }

    /// Alt text buffer of the innermost open image, if any.
    fn collecting_alt(&mut self) -> Option<&mut String> {
        self.stack.iter_mut().rev().find_map(|open| match open {
            Open::Image { alt, .. } => Some(alt),
            _ => None,
        })
    }

    fn process_event(&mut self, event: Event) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(_) => self.end(),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                if let Some(alt) = self.collecting_alt() {
                    alt.push_str(&code);
                    return;
                }
                let parent = self.current();
                if let Ok(span) = self.doc.append_element(parent, NodeKind::Code) {
                    let _ = self.doc.append_text(span, &code);
                }
            }
            // Soft breaks (regular newlines) read as spaces
            Event::SoftBreak => self.text(" "),
            Event::HardBreak => self.text("\n"),
            Event::Rule => {
                let parent = self.current();
                let _ = self.doc.append_void(parent, NodeKind::Rule, "");
            }
            Event::TaskListMarker(checked) => {
                let parent = self.current();
                let label = if checked { "checked" } else { "not checked" };
                let _ = self.doc.append_void(parent, NodeKind::Input, label);
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag) {
        let kind = match tag {
            Tag::Paragraph => Some(NodeKind::Paragraph),
            Tag::Heading { level, .. } => Some(NodeKind::Heading(level as u8)),
            Tag::BlockQuote(_) => Some(NodeKind::BlockQuote),
            Tag::CodeBlock(_) => Some(NodeKind::CodeBlock),
            Tag::List(first_number) => Some(NodeKind::List {
                ordered: first_number.is_some(),
            }),
            Tag::Item => Some(NodeKind::ListItem),
            Tag::Table(_) => Some(NodeKind::Table),
            Tag::TableHead | Tag::TableRow => Some(NodeKind::TableRow),
            Tag::TableCell => Some(NodeKind::TableCell),
            Tag::Emphasis | Tag::Strikethrough => Some(NodeKind::Emphasis),
            Tag::Strong => Some(NodeKind::Strong),
            Tag::Link { .. } => Some(NodeKind::Link),
            Tag::Image { .. } => {
                let parent = self.current();
                match self.doc.append_void(parent, NodeKind::Image, "") {
                    Ok(node) => self.stack.push(Open::Image {
                        node,
                        alt: String::new(),
                    }),
                    Err(_) => self.stack.push(Open::Transparent),
                }
                return;
            }
            _ => None,
        };

        // Content inside an image is alt text, never structure
        if self.collecting_alt().is_some() {
            self.stack.push(Open::Transparent);
            return;
        }

        let open = match kind {
            Some(kind) => {
                let parent = self.current();
                self.doc
                    .append_element(parent, kind)
                    .map_or(Open::Transparent, Open::Node)
            }
            None => Open::Transparent,
        };
        self.stack.push(open);
    }

    fn end(&mut self) {
        if let Some(Open::Image { node, alt }) = self.stack.pop() {
            let _ = self.doc.set_text(node, alt.trim());
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(alt) = self.collecting_alt() {
            alt.push_str(text);
            return;
        }
        // pulldown-cmark splits text at escapes and entities; keep one node per run
        let parent = self.current();
        match self.doc.trailing_text(parent) {
            Some(node) => self.doc.extend_text(node, text),
            None => {
                let _ = self.doc.append_text(parent, text);
            }
        }
    }
}
