//! Walkers over spans of text: characters, words, lines and sentences.
//!
//! All four share one algorithm and differ only in how a run is cut into
//! units, so they are a single generic [`TextWalker`] over a [`Segmenter`].

use super::output::{Braille, Description, entered_context, inline_role, spoken_char};
use super::run::Run;
use super::segment::{Characters, Lines, Segmenter, Sentences, Span, Words};
use super::{Granularity, Walker};
use crate::selection::{Cursor, Range};
use crate::tree::{ContentTree, NodeId, Traversal};

#[derive(Debug, Clone, Default)]
pub struct TextWalker<S> {
    segmenter: S,
}

pub type CharacterWalker = TextWalker<Characters>;
pub type WordWalker = TextWalker<Words>;
pub type LineWalker = TextWalker<Lines>;
pub type SentenceWalker = TextWalker<Sentences>;

impl<S: Segmenter> TextWalker<S> {
    pub fn new(segmenter: S) -> Self {
        Self { segmenter }
    }

    fn units(&self, run: &Run) -> Vec<Span> {
        self.segmenter.segment(&run.text)
    }

    /// First unit of `run` that `accept` takes, else the first unit of any
    /// later run.
    fn scan_forward(
        &self,
        walk: &Traversal,
        run: Run,
        accept: impl Fn(&Span) -> bool,
    ) -> Option<(Run, Span)> {
        if let Some(span) = self.units(&run).into_iter().find(|s| accept(s)) {
            return Some((run, span));
        }
        let mut current = run;
        loop {
            current = current.following(walk)?;
            if let Some(span) = self.units(&current).first().copied() {
                return Some((current, span));
            }
        }
    }

    /// Last unit of `run` that `accept` takes, else the last unit of any
    /// earlier run.
    fn scan_backward(
        &self,
        walk: &Traversal,
        run: Run,
        accept: impl Fn(&Span) -> bool,
    ) -> Option<(Run, Span)> {
        if let Some(span) = self.units(&run).into_iter().rev().find(|s| accept(s)) {
            return Some((run, span));
        }
        let mut current = run;
        loop {
            current = current.preceding(walk)?;
            if let Some(span) = self.units(&current).last().copied() {
                return Some((current, span));
            }
        }
    }

    /// First unit reaching into `node` (or after it) in the given direction.
    fn from_node(&self, walk: &Traversal, node: NodeId, reversed: bool) -> Option<(Run, Span)> {
        if reversed {
            let (run, piece) = Run::at_or_before(walk, node)?;
            self.scan_backward(walk, run, |s| s.start < piece.end())
        } else {
            let (run, piece) = Run::at_or_after(walk, node)?;
            self.scan_forward(walk, run, |s| s.end > piece.start)
        }
    }

    /// Unit holding the directed start of a span, else the nearest unit
    /// ahead, else the nearest behind.
    fn around(&self, walk: &Traversal, cursor: &Cursor, reversed: bool) -> Option<(Run, Span)> {
        let Some(point) = walk.resolve(cursor) else {
            return self
                .from_node(walk, cursor.node, reversed)
                .or_else(|| self.from_node(walk, cursor.node, !reversed));
        };
        let run = Run::around(walk, point.node);
        let at = run.position(point)?;
        let units = self.units(&run);

        if reversed {
            if let Some(span) = units.iter().find(|s| s.start < at && at <= s.end) {
                return Some((run, *span));
            }
            self.scan_backward(walk, run.clone(), |s| s.end <= at)
                .or_else(|| self.scan_forward(walk, run, |s| s.start >= at))
        } else {
            if let Some(span) = units.iter().find(|s| s.contains(at)) {
                return Some((run, *span));
            }
            self.scan_forward(walk, run.clone(), |s| s.start >= at)
                .or_else(|| self.scan_backward(walk, run, |s| s.end <= at))
        }
    }

    fn build(tree: &dyn ContentTree, walk: &Traversal, found: Option<(Run, Span)>, reversed: bool) -> Option<Range> {
        walk.finish(found)
            .and_then(|(run, span)| run.range(tree, span, reversed))
    }
}

impl<S: Segmenter> Walker for TextWalker<S> {
    fn granularity(&self) -> Granularity {
        self.segmenter.granularity()
    }

    fn sync(&self, tree: &dyn ContentTree, range: &Range) -> Option<Range> {
        let walk = Traversal::new(tree);
        let reversed = range.is_reversed();
        let found = if range.is_node_selection() {
            let node = range.start().node;
            if !walk.is_attached(node) {
                return None;
            }
            self.from_node(&walk, node, reversed)
                .or_else(|| self.from_node(&walk, node, !reversed))
        } else {
            let anchor = if reversed {
                range.abs_end()
            } else {
                range.abs_start()
            };
            if !walk.is_attached(anchor.node) {
                return None;
            }
            self.around(&walk, anchor, reversed)
        };
        log::trace!("{} sync found {}", self.granularity(), found.is_some());
        Self::build(tree, &walk, found, reversed)
    }

    fn next(&self, tree: &dyn ContentTree, range: &Range) -> Option<Range> {
        let walk = Traversal::new(tree);
        let reversed = range.is_reversed();
        let found = if range.is_node_selection() {
            let node = range.start().node;
            if !walk.is_attached(node) {
                return None;
            }
            self.from_node(&walk, node, reversed)
        } else {
            let anchor = if reversed {
                range.abs_start()
            } else {
                range.abs_end()
            };
            if !walk.is_attached(anchor.node) {
                return None;
            }
            match walk.resolve(anchor) {
                Some(point) => {
                    let run = Run::around(&walk, point.node);
                    let at = run.position(point);
                    at.and_then(|at| {
                        if reversed {
                            self.scan_backward(&walk, run, |s| s.end <= at)
                        } else {
                            self.scan_forward(&walk, run, |s| s.start >= at)
                        }
                    })
                }
                None => self.from_node(&walk, anchor.node, reversed),
            }
        };
        Self::build(tree, &walk, found, reversed)
    }

    fn describe(&self, tree: &dyn ContentTree, prev: Option<&Range>, range: &Range) -> Description {
        let walk = Traversal::new(tree);
        let node = range.abs_start().node;
        let mut context = entered_context(&walk, prev, node);

        let block = walk.block_of(node);
        let previous_block = prev.and_then(|p| walk.block_of(p.abs_start().node));
        if block != previous_block {
            let role = block
                .and_then(|b| walk.kind(b))
                .map(|kind| kind.role())
                .unwrap_or_default();
            if !role.is_empty() {
                context.push(role);
            }
        }

        let text = range.text(tree);
        let text = if self.granularity() == Granularity::Character {
            spoken_char(&text)
        } else {
            text
        };
        Description {
            context: context.join(" "),
            text,
            annotation: inline_role(&walk, node),
        }
    }

    fn braille(&self, tree: &dyn ContentTree, _prev: Option<&Range>, range: &Range) -> Braille {
        let walk = Traversal::new(tree);
        let resolved = walk.resolve(range.abs_start()).map(|point| {
            let run = Run::around(&walk, point.node);
            let start = run.position(point).unwrap_or(0);
            let end = walk
                .resolve(range.abs_end())
                .and_then(|end| run.position(end))
                .unwrap_or_else(|| run.len())
                .max(start);
            (run.text, start, end)
        });
        match walk.finish(resolved) {
            Some((text, start, end)) if !range.is_node_selection() => Braille { text, start, end },
            _ => Braille {
                text: range.text(tree),
                start: 0,
                end: 0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Document;
    use pretty_assertions::assert_eq;

    fn first_text(doc: &Document) -> NodeId {
        Traversal::new(doc).text_nodes_within(doc.root())[0]
    }

    fn span(doc: &Document, node: NodeId, start: usize, end: usize) -> Range {
        Range::new(doc, Cursor::at(doc, node, start), Cursor::at(doc, node, end), false)
    }

    #[test]
    fn character_sync_then_next_steps_over_the_space() {
        let doc = Document::from_markdown("a b c");
        let text = first_text(&doc);
        let walker = CharacterWalker::default();

        let space = walker.sync(&doc, &span(&doc, text, 1, 2)).unwrap();
        assert_eq!(space, span(&doc, text, 1, 2));
        assert_eq!(walker.describe(&doc, None, &space).text, "space");

        let b = walker.next(&doc, &space).unwrap();
        assert_eq!(b.text(&doc), "b");
    }

    #[test]
    fn word_next_twice_then_back() {
        let doc = Document::from_markdown("a b c");
        let walker = WordWalker::default();

        let a = walker.begin(&doc, false).unwrap();
        assert_eq!(a.text(&doc), "a");
        let b = walker.next(&doc, &a).unwrap();
        let c = walker.next(&doc, &b).unwrap();
        assert_eq!(c.text(&doc), "c");
        assert!(walker.next(&doc, &c).is_none());

        let back = walker.next(&doc, &c.clone().directed(true)).unwrap();
        assert_eq!(back.text(&doc), "b");
        assert!(back.is_reversed());
        assert_eq!(back, b.directed(true));
    }

    #[test]
    fn sync_snaps_a_sub_word_offset_to_its_word() {
        let doc = Document::from_markdown("hello world");
        let text = first_text(&doc);
        let walker = WordWalker::default();

        let synced = walker.sync(&doc, &span(&doc, text, 8, 9)).unwrap();
        assert_eq!(synced.text(&doc), "world");

        let reversed = walker
            .sync(&doc, &span(&doc, text, 2, 3).directed(true))
            .unwrap();
        assert_eq!(reversed.text(&doc), "hello");
        assert!(reversed.is_reversed());
    }

    #[test]
    fn sync_from_whitespace_moves_ahead_then_behind() {
        let doc = Document::from_markdown("one  two");
        let text = first_text(&doc);
        let walker = WordWalker::default();

        let ahead = walker.sync(&doc, &span(&doc, text, 3, 4)).unwrap();
        assert_eq!(ahead.text(&doc), "two");

        let behind = walker
            .sync(&doc, &span(&doc, text, 4, 5).directed(true))
            .unwrap();
        assert_eq!(behind.text(&doc), "one");
    }

    #[test]
    fn words_span_inline_markup() {
        let doc = Document::from_markdown("un*believ*able day");
        let walker = WordWalker::default();

        let word = walker.begin(&doc, false).unwrap();
        assert_eq!(word.text(&doc), "unbelievable");
        assert_ne!(word.start().node, word.end().node);
        assert_eq!(walker.sync(&doc, &word), Some(word.clone()));
    }

    #[test]
    fn next_crosses_blocks_and_skips_empty_runs() {
        let doc = Document::from_markdown("first\n\n`   `\n\n> last");
        let walker = WordWalker::default();

        let first = walker.begin(&doc, false).unwrap();
        let last = walker.next(&doc, &first).unwrap();
        assert_eq!(last.text(&doc), "last");

        let back = walker.next(&doc, &last.directed(true)).unwrap();
        assert_eq!(back.text(&doc), "first");
    }

    #[test]
    fn begin_reversed_starts_at_the_end() {
        let doc = Document::from_markdown("Alpha. Beta!\n\nGamma?");
        let walker = SentenceWalker::default();

        let last = walker.begin(&doc, true).unwrap();
        assert_eq!(last.text(&doc), "Gamma?");
        let previous = walker.next(&doc, &last).unwrap();
        assert_eq!(previous.text(&doc), "Beta!");
    }

    #[test]
    fn lines_wrap_at_configured_width() {
        let doc = Document::from_markdown("the quick brown fox");
        let walker = LineWalker::new(Lines::new(10));

        let first = walker.begin(&doc, false).unwrap();
        assert_eq!(first.text(&doc), "the quick");
        let second = walker.next(&doc, &first).unwrap();
        assert_eq!(second.text(&doc), "brown fox");
        assert_eq!(walker.granularity(), Granularity::Line);
    }

    #[test]
    fn empty_document_has_no_units() {
        let doc = Document::new();
        let walker = CharacterWalker::default();

        assert_eq!(walker.begin(&doc, false), None);
        assert_eq!(walker.next(&doc, &Range::from_body(&doc)), None);
    }

    #[test]
    fn detached_ranges_do_not_navigate() {
        let mut doc = Document::from_markdown("gone\n\nstays");
        let walker = WordWalker::default();
        let gone = walker.begin(&doc, false).unwrap();
        let para = doc.first_child(doc.root()).unwrap();

        doc.detach(para).unwrap();

        assert_eq!(walker.sync(&doc, &gone), None);
        assert_eq!(walker.next(&doc, &gone), None);
    }

    #[test]
    fn describe_announces_new_blocks() {
        let doc = Document::from_markdown("# Title\n\n- [docs](x)");
        let walker = WordWalker::default();
        let title = walker.begin(&doc, false).unwrap();
        let docs = walker.next(&doc, &title).unwrap();

        insta::assert_snapshot!(walker.describe(&doc, None, &title).to_string(), @"heading 1, Title");
        insta::assert_snapshot!(walker.describe(&doc, Some(&title), &docs).to_string(), @"list list item, docs, link");
    }

    #[test]
    fn braille_marks_the_unit_within_its_run() {
        let doc = Document::from_markdown("a b c");
        let walker = WordWalker::default();
        let a = walker.begin(&doc, false).unwrap();
        let b = walker.next(&doc, &a).unwrap();

        assert_eq!(
            walker.braille(&doc, Some(&a), &b),
            Braille {
                text: "a b c".to_string(),
                start: 2,
                end: 3,
            }
        );
    }
}
