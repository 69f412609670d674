//! Splitting a run of text into the units of one granularity.
//!
//! Spans are char offsets into the run text, non-empty, sorted and
//! non-overlapping.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use super::Granularity;

/// Half-open char span `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

pub trait Segmenter: fmt::Debug {
    fn granularity(&self) -> Granularity;
    fn segment(&self, text: &str) -> Vec<Span>;
}

fn word_regex() -> &'static Regex {
    static WORD_REGEX: OnceLock<Regex> = OnceLock::new();
    WORD_REGEX.get_or_init(|| Regex::new(r"\S+").expect("Invalid word regex"))
}

fn sentence_regex() -> &'static Regex {
    static SENTENCE_REGEX: OnceLock<Regex> = OnceLock::new();
    SENTENCE_REGEX
        .get_or_init(|| Regex::new(r"[^\s][^.!?\n]*[.!?]*").expect("Invalid sentence regex"))
}

/// Char spans of every match of `regex`, with trailing whitespace trimmed.
fn match_spans(regex: &Regex, text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    // Byte offsets advance monotonically, so count chars incrementally
    let mut byte_pos = 0;
    let mut char_pos = 0;
    for found in regex.find_iter(text) {
        char_pos += text[byte_pos..found.start()].chars().count();
        let trimmed = found.as_str().trim_end();
        let start = char_pos;
        let end = start + trimmed.chars().count();
        char_pos += found.as_str().chars().count();
        byte_pos = found.end();
        if end > start {
            spans.push(Span::new(start, end));
        }
    }
    spans
}

/// Every char, whitespace included.
#[derive(Debug, Clone, Copy, Default)]
pub struct Characters;

impl Segmenter for Characters {
    fn granularity(&self) -> Granularity {
        Granularity::Character
    }

    fn segment(&self, text: &str) -> Vec<Span> {
        (0..text.chars().count())
            .map(|i| Span::new(i, i + 1))
            .collect()
    }
}

/// Maximal runs of non-whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct Words;

impl Segmenter for Words {
    fn granularity(&self) -> Granularity {
        Granularity::Word
    }

    fn segment(&self, text: &str) -> Vec<Span> {
        match_spans(word_regex(), text)
    }
}

/// Text up to a `.`, `!` or `?` terminator or the end of a line.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sentences;

impl Segmenter for Sentences {
    fn granularity(&self) -> Granularity {
        Granularity::Sentence
    }

    fn segment(&self, text: &str) -> Vec<Span> {
        match_spans(sentence_regex(), text)
    }
}

/// Hard lines word-wrapped at `width` chars.
#[derive(Debug, Clone, Copy)]
pub struct Lines {
    width: usize,
}

impl Lines {
    pub const DEFAULT_WIDTH: usize = 80;

    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

impl Default for Lines {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WIDTH)
    }
}

impl Segmenter for Lines {
    fn granularity(&self) -> Granularity {
        Granularity::Line
    }

    fn segment(&self, text: &str) -> Vec<Span> {
        let breaks: Vec<usize> = text
            .chars()
            .enumerate()
            .filter_map(|(i, c)| (c == '\n').then_some(i))
            .collect();
        let mut pending_breaks = breaks.iter().peekable();
        let mut lines = Vec::new();
        let mut current: Option<Span> = None;
        for word in Words.segment(text) {
            // Words never contain '\n', so any break before this word lies
            // between it and the previous one
            let mut hard_break = false;
            while pending_breaks.next_if(|&&at| at < word.start).is_some() {
                hard_break = true;
            }
            current = match current {
                Some(line) if !hard_break && word.end - line.start <= self.width => {
                    Some(Span::new(line.start, word.end))
                }
                Some(line) => {
                    lines.push(line);
                    Some(word)
                }
                None => Some(word),
            };
        }
        lines.extend(current);
        lines
    }
}
