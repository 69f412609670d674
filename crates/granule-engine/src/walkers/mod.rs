/*!
 * # Traversal Strategies
 *
 * One stateless walker per granularity. Each maps arbitrary ranges onto the
 * ranges that are valid at its level of detail and steps between them:
 *
 * - `sync(sync(r)) == sync(r)`, and a valid range syncs to itself
 * - `sync` and `next` keep the direction of their input
 * - `next` is a bidirectional iterator: stepping forward, flipping the
 *   direction and stepping again returns to the starting unit
 * - every call terminates, even on empty or cyclic trees
 *
 * Text walkers ([`CharacterWalker`], [`WordWalker`], [`LineWalker`],
 * [`SentenceWalker`]) select spans of text runs. Node walkers
 * ([`ObjectWalker`], [`GroupWalker`]) select whole nodes.
 */

pub mod node;
pub mod output;
pub mod run;
pub mod segment;
pub mod table;
pub mod text;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ParseActionError, ParseGranularityError};
use crate::selection::Range;
use crate::tree::ContentTree;

pub use node::{GroupWalker, Groups, NodeClass, NodeWalker, ObjectWalker, Objects};
pub use output::{Braille, Description};
pub use segment::{Characters, Lines, Segmenter, Sentences, Span, Words};
pub use text::{CharacterWalker, LineWalker, SentenceWalker, TextWalker, WordWalker};

/// Levels of detail, finest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Character,
    Word,
    Line,
    Sentence,
    Object,
    Group,
}

impl Granularity {
    pub const ALL: [Granularity; 6] = [
        Granularity::Character,
        Granularity::Word,
        Granularity::Line,
        Granularity::Sentence,
        Granularity::Object,
        Granularity::Group,
    ];

    /// Position in [`Granularity::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Granularity> {
        Granularity::ALL.get(index).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Granularity::Character => "character",
            Granularity::Word => "word",
            Granularity::Line => "line",
            Granularity::Sentence => "sentence",
            Granularity::Object => "object",
            Granularity::Group => "group",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Granularity {
    type Err = ParseGranularityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Granularity::ALL
            .into_iter()
            .find(|g| g.label() == wanted)
            .ok_or_else(|| ParseGranularityError(s.to_string()))
    }
}

/// Named operations some walkers offer beyond `sync`/`next`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    NextRow,
    PreviousRow,
    NextColumn,
    PreviousColumn,
}

impl Action {
    pub const ALL: [Action; 4] = [
        Action::NextRow,
        Action::PreviousRow,
        Action::NextColumn,
        Action::PreviousColumn,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Action::NextRow => "nextRow",
            Action::PreviousRow => "previousRow",
            Action::NextColumn => "nextCol",
            Action::PreviousColumn => "previousCol",
        }
    }
}

impl FromStr for Action {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseActionError(s.to_string()))
    }
}

/// A traversal strategy for one granularity.
///
/// Implementations are stateless: identical arguments against an unchanged
/// tree give identical results. `None` means "nothing further in this
/// direction" (or the input is detached); callers stop rather than retry.
pub trait Walker: fmt::Debug {
    fn granularity(&self) -> Granularity;

    /// Nearest range valid at this granularity, in the input's direction.
    fn sync(&self, tree: &dyn ContentTree, range: &Range) -> Option<Range>;

    /// The valid range after `range` in its own direction.
    fn next(&self, tree: &dyn ContentTree, range: &Range) -> Option<Range>;

    /// Spoken summary of moving from `prev` to `range`.
    fn describe(&self, tree: &dyn ContentTree, prev: Option<&Range>, range: &Range) -> Description;

    /// Braille line for `range`.
    fn braille(&self, tree: &dyn ContentTree, prev: Option<&Range>, range: &Range) -> Braille;

    /// First valid range of the document in the given direction.
    fn begin(&self, tree: &dyn ContentTree, reversed: bool) -> Option<Range> {
        self.sync(tree, &Range::from_body(tree).directed(reversed))
    }

    fn has_action(&self, _action: Action) -> bool {
        false
    }

    /// Unsupported actions are a no-op returning `None`.
    fn perform_action(&self, _tree: &dyn ContentTree, _action: Action, _range: &Range) -> Option<Range> {
        None
    }
}
