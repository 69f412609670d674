/*!
 * # Granularity Dispatcher
 *
 * [`Navigator`] owns one walker per granularity, ordered finest to coarsest,
 * and forwards every navigation request to the active one. It is the only
 * stateful part of the engine, and that state is just an index: which walker
 * is active, plus the index to return to when sub-navigation ends.
 *
 * The calling layer decides when to change granularity or enter and leave
 * sub-navigation; the navigator only applies those requests.
 */

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::selection::Range;
use crate::tree::{ContentTree, LiveSelection};
use crate::walkers::{
    Action, Braille, CharacterWalker, Description, Granularity, GroupWalker, LineWalker, Lines,
    ObjectWalker, SentenceWalker, Walker, WordWalker,
};

const GRANULARITY_KEY: &str = "granularity";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigatorOptions {
    /// When false, granularity stepping skips [`Granularity::Sentence`]
    pub sentence_navigation: bool,
    /// Wrap width for line navigation, in chars
    pub line_width: usize,
    pub initial_granularity: Granularity,
}

impl Default for NavigatorOptions {
    fn default() -> Self {
        Self {
            sentence_navigation: false,
            line_width: Lines::DEFAULT_WIDTH,
            initial_granularity: Granularity::Group,
        }
    }
}

/// Persisted session values: a flat map of integers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionStore(BTreeMap<String, i64>);

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<i64> {
        self.0.get(key).copied()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: i64) {
        self.0.insert(key.into(), value);
    }
}

#[derive(Debug)]
pub struct Navigator {
    walkers: Vec<Box<dyn Walker>>,
    current: usize,
    /// Index to restore when sub-navigation ends; `Some` while sub-navigating
    saved: Option<usize>,
    sentence_navigation: bool,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(NavigatorOptions::default())
    }
}

impl Navigator {
    pub fn new(options: NavigatorOptions) -> Self {
        let walkers: Vec<Box<dyn Walker>> = vec![
            Box::new(CharacterWalker::default()),
            Box::new(WordWalker::default()),
            Box::new(LineWalker::new(Lines::new(options.line_width))),
            Box::new(SentenceWalker::default()),
            Box::new(ObjectWalker::default()),
            Box::new(GroupWalker::default()),
        ];
        Self {
            walkers,
            current: options.initial_granularity.index(),
            saved: None,
            sentence_navigation: options.sentence_navigation,
        }
    }

    fn walker(&self) -> &dyn Walker {
        self.walkers[self.current].as_ref()
    }

    /// Granularity of the walker requests currently go to.
    pub fn active_granularity(&self) -> Granularity {
        self.walker().granularity()
    }

    pub fn granularity_label(&self) -> &'static str {
        self.active_granularity().label()
    }

    /// Step in the active granularity. For character, word and line steps the
    /// host's live selection follows the result.
    pub fn next<T>(&self, tree: &mut T, range: &Range) -> Option<Range>
    where
        T: ContentTree + LiveSelection,
    {
        let result = self.walker().next(&*tree, range);
        log::trace!("{} next -> {:?}", self.granularity_label(), result.is_some());
        if let Some(found) = &result
            && self.active_granularity() <= Granularity::Line
        {
            let mut visible = found.clone();
            visible.set_reversed(false).normalize(&*tree);
            tree.sync_to(&visible);
            tree.update_display();
        }
        result
    }

    pub fn sync(&self, tree: &dyn ContentTree, range: &Range) -> Option<Range> {
        let result = self.walker().sync(tree, range);
        log::trace!("{} sync -> {:?}", self.granularity_label(), result.is_some());
        result
    }

    pub fn begin(&self, tree: &dyn ContentTree, reversed: bool) -> Option<Range> {
        self.walker().begin(tree, reversed)
    }

    pub fn describe(&self, tree: &dyn ContentTree, prev: Option<&Range>, range: &Range) -> Description {
        self.walker().describe(tree, prev, range)
    }

    pub fn braille(&self, tree: &dyn ContentTree, prev: Option<&Range>, range: &Range) -> Braille {
        self.walker().braille(tree, prev, range)
    }

    pub fn has_action(&self, action: Action) -> bool {
        self.walker().has_action(action)
    }

    /// `None` when the active walker lacks `action` or it leads nowhere.
    pub fn perform_action(&self, tree: &dyn ContentTree, action: Action, range: &Range) -> Option<Range> {
        if !self.has_action(action) {
            return None;
        }
        self.walker().perform_action(tree, action, range)
    }

    fn skips(&self, index: usize) -> bool {
        !self.sentence_navigation && self.walkers[index].granularity() == Granularity::Sentence
    }

    pub fn make_more_granular(&mut self) {
        if self.current == 0 {
            return;
        }
        self.current -= 1;
        if self.skips(self.current) && self.current > 0 {
            self.current -= 1;
        }
        log::debug!("granularity is now {}", self.granularity_label());
    }

    pub fn make_less_granular(&mut self) {
        let last = self.walkers.len() - 1;
        if self.current == last {
            return;
        }
        self.current += 1;
        if self.skips(self.current) && self.current < last {
            self.current += 1;
        }
        log::debug!("granularity is now {}", self.granularity_label());
    }

    /// Jump straight to `granularity`, ending any sub-navigation first.
    pub fn set_granularity(&mut self, granularity: Granularity) {
        self.ensure_not_subnavigating();
        if let Some(index) = self
            .walkers
            .iter()
            .position(|w| w.granularity() == granularity)
        {
            self.current = index;
            log::debug!("granularity set to {granularity}");
        }
    }

    /// The chosen granularity, ignoring sub-navigation: while sub-navigating
    /// this is the granularity that ending it returns to.
    pub fn granularity(&self) -> Granularity {
        let index = self.saved.unwrap_or(self.current);
        self.walkers[index].granularity()
    }

    pub fn is_subnavigating(&self) -> bool {
        self.saved.is_some()
    }

    /// Enter sub-navigation: remember the current granularity and move one
    /// step finer.
    pub fn ensure_subnavigating(&mut self) {
        if self.saved.is_none() {
            self.saved = Some(self.current);
            self.make_more_granular();
            log::debug!("sub-navigating at {}", self.granularity_label());
        }
    }

    /// Leave sub-navigation, restoring the remembered granularity.
    pub fn ensure_not_subnavigating(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.current = saved;
            log::debug!("left sub-navigation, back to {}", self.granularity_label());
        }
    }

    pub fn store_on(&self, store: &mut SessionStore) {
        let index = self.saved.unwrap_or(self.current);
        store.insert(GRANULARITY_KEY, index as i64);
    }

    pub fn read_from(&mut self, store: &SessionStore) {
        let Some(value) = store.get(GRANULARITY_KEY) else {
            return;
        };
        let granularity = usize::try_from(value)
            .ok()
            .filter(|&index| index < self.walkers.len())
            .map(|index| self.walkers[index].granularity());
        match granularity {
            Some(granularity) => {
                self.set_granularity(granularity);
                log::debug!("restored granularity {granularity} from session");
            }
            None => log::warn!("ignoring stored granularity index {value}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Document;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn navigator(sentences: bool, initial: Granularity) -> Navigator {
        Navigator::new(NavigatorOptions {
            sentence_navigation: sentences,
            initial_granularity: initial,
            ..NavigatorOptions::default()
        })
    }

    #[test]
    fn more_granular_clamps_at_finest() {
        let mut nav = navigator(true, Granularity::Group);
        for _ in 0..10 {
            nav.make_more_granular();
        }
        assert_eq!(nav.granularity(), Granularity::Character);

        for _ in 0..10 {
            nav.make_less_granular();
        }
        assert_eq!(nav.granularity(), Granularity::Group);
    }

    #[rstest]
    #[case(false, Granularity::Object, Granularity::Line)]
    #[case(true, Granularity::Object, Granularity::Sentence)]
    #[case(false, Granularity::Line, Granularity::Word)]
    fn more_granular_skips_disabled_sentence(
        #[case] sentences: bool,
        #[case] from: Granularity,
        #[case] expected: Granularity,
    ) {
        let mut nav = navigator(sentences, from);
        nav.make_more_granular();
        assert_eq!(nav.granularity(), expected);
    }

    #[test]
    fn less_granular_skips_disabled_sentence() {
        let mut nav = navigator(false, Granularity::Line);
        nav.make_less_granular();
        assert_eq!(nav.granularity(), Granularity::Object);
    }

    #[rstest]
    fn more_then_less_returns(
        #[values(false, true)] sentences: bool,
        #[values(Granularity::Word, Granularity::Line, Granularity::Object, Granularity::Group)]
        from: Granularity,
    ) {
        let mut nav = navigator(sentences, from);
        nav.make_more_granular();
        nav.make_less_granular();
        assert_eq!(nav.granularity(), from);
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut nav = Navigator::default();
        for granularity in Granularity::ALL {
            nav.set_granularity(granularity);
            assert_eq!(nav.granularity(), granularity);
            assert_eq!(nav.active_granularity(), granularity);
        }
    }

    #[test]
    fn set_granularity_ends_subnavigation() {
        let mut nav = navigator(false, Granularity::Group);
        nav.ensure_subnavigating();
        assert!(nav.is_subnavigating());

        nav.set_granularity(Granularity::Word);

        assert!(!nav.is_subnavigating());
        assert_eq!(nav.granularity(), Granularity::Word);
    }

    #[test]
    fn subnavigation_restores_the_exact_index() {
        let mut nav = navigator(false, Granularity::Group);
        nav.ensure_subnavigating();
        assert_eq!(nav.active_granularity(), Granularity::Object);
        // Reads report the granularity sub-navigation will return to
        assert_eq!(nav.granularity(), Granularity::Group);
        assert!(nav.is_subnavigating());

        nav.make_more_granular();
        nav.ensure_subnavigating();
        assert_eq!(nav.active_granularity(), Granularity::Line);

        nav.ensure_not_subnavigating();
        assert_eq!(nav.active_granularity(), Granularity::Group);
        nav.ensure_not_subnavigating();
        assert_eq!(nav.active_granularity(), Granularity::Group);
    }

    #[test]
    fn session_store_round_trip() {
        let mut store = SessionStore::new();
        let mut nav = navigator(true, Granularity::Sentence);
        nav.store_on(&mut store);
        assert_eq!(store.get("granularity"), Some(3));

        let mut restored = Navigator::default();
        restored.read_from(&store);
        assert_eq!(restored.granularity(), Granularity::Sentence);

        nav.ensure_subnavigating();
        nav.store_on(&mut store);
        assert_eq!(store.get("granularity"), Some(3));
    }

    #[rstest]
    #[case(-1)]
    #[case(6)]
    fn invalid_stored_index_is_ignored(#[case] value: i64) {
        let mut store = SessionStore::new();
        store.insert("granularity", value);
        let mut nav = navigator(false, Granularity::Word);

        nav.read_from(&store);

        assert_eq!(nav.granularity(), Granularity::Word);
    }

    #[test]
    fn fine_steps_move_the_live_selection() {
        let mut doc = Document::from_markdown("one two\n\nthree");
        let nav = navigator(false, Granularity::Word);
        let first = nav.begin(&doc, false).unwrap();

        let second = nav.next(&mut doc, &first).unwrap();
        assert_eq!(doc.live_selection(), Some(&second));
        assert_eq!(doc.display_updates(), 1);

        let back = nav.next(&mut doc, &second.directed(true)).unwrap();
        assert!(back.is_reversed());
        assert_eq!(doc.live_selection(), Some(&back.clone().directed(false)));
        assert_eq!(doc.display_updates(), 2);
    }

    #[test]
    fn coarse_steps_leave_the_live_selection_alone() {
        let mut doc = Document::from_markdown("one\n\ntwo");
        let nav = navigator(false, Granularity::Group);
        let first = nav.begin(&doc, false).unwrap();

        let second = nav.next(&mut doc, &first).unwrap();

        assert_eq!(second.text(&doc), "two");
        assert_eq!(doc.live_selection(), None);
        assert_eq!(doc.display_updates(), 0);
    }

    #[test]
    fn forwards_to_the_active_walker() {
        let doc = Document::from_markdown("| a | b |\n|---|---|\n| 1 | 2 |\n");
        let mut nav = navigator(false, Granularity::Object);
        let a = nav.begin(&doc, false).unwrap();

        assert_eq!(nav.granularity_label(), "object");
        assert!(nav.has_action(Action::NextColumn));
        let b = nav.perform_action(&doc, Action::NextColumn, &a).unwrap();
        assert_eq!(nav.describe(&doc, Some(&a), &b).text, "b");

        nav.set_granularity(Granularity::Word);
        assert!(!nav.has_action(Action::NextColumn));
        assert_eq!(nav.perform_action(&doc, Action::NextColumn, &a), None);
        assert_eq!(nav.sync(&doc, &b).map(|r| r.text(&doc)), Some("b".to_string()));
    }
}
