use anyhow::{Context, Result, bail};
use granule_config::{Config, load_session, save_session};
use granule_engine::{
    Action, Braille, Document, Granularity, Navigator, NavigatorOptions, Range, SessionStore,
};
use std::io::{BufRead, Write};
use std::str::FromStr;
use std::{env, fs, io};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Next,
    Previous,
    LessGranular,
    MoreGranular,
    Granularity(Granularity),
    Subnavigate,
    EndSubnavigation,
    Action(Action),
    Sync,
    Where,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            bail!("empty command");
        };
        let argument = words.next();
        let command = match (name, argument) {
            ("n" | "next", None) => Command::Next,
            ("p" | "prev", None) => Command::Previous,
            ("+" | "less", None) => Command::LessGranular,
            ("-" | "more", None) => Command::MoreGranular,
            ("g", Some(granularity)) => Command::Granularity(granularity.parse()?),
            ("sub", None) => Command::Subnavigate,
            ("unsub", None) => Command::EndSubnavigation,
            ("a", Some(action)) => Command::Action(action.parse()?),
            ("sync", None) => Command::Sync,
            ("where", None) => Command::Where,
            ("q" | "quit", None) => Command::Quit,
            _ => bail!("unknown command: {line}"),
        };
        Ok(command)
    }
}

struct App {
    document: Document,
    navigator: Navigator,
    current: Option<Range>,
}

impl App {
    fn new(document: Document, navigator: Navigator) -> Self {
        let current = navigator.begin(&document, false);
        Self {
            document,
            navigator,
            current,
        }
    }

    /// Run one command, returning what to print.
    fn execute(&mut self, command: Command) -> String {
        match command {
            Command::Next => self.step(false),
            Command::Previous => self.step(true),
            Command::LessGranular => {
                self.navigator.make_less_granular();
                self.resync()
            }
            Command::MoreGranular => {
                self.navigator.make_more_granular();
                self.resync()
            }
            Command::Granularity(granularity) => {
                self.navigator.set_granularity(granularity);
                self.resync()
            }
            Command::Subnavigate => {
                self.navigator.ensure_subnavigating();
                self.resync()
            }
            Command::EndSubnavigation => {
                self.navigator.ensure_not_subnavigating();
                self.resync()
            }
            Command::Action(action) => self.perform(action),
            Command::Sync => self.resync(),
            Command::Where => match &self.current {
                Some(range) => format!(
                    "[{}] {}",
                    self.navigator.granularity_label(),
                    self.render(None, range)
                ),
                None => format!("[{}] nothing here", self.navigator.granularity_label()),
            },
            Command::Quit => String::new(),
        }
    }

    fn step(&mut self, reversed: bool) -> String {
        let Some(current) = &self.current else {
            return self.begin(reversed);
        };
        let from = current.clone().directed(reversed);
        match self.navigator.next(&mut self.document, &from) {
            Some(next) => self.moved_to(next),
            None if reversed => "start of document".to_string(),
            None => "end of document".to_string(),
        }
    }

    fn begin(&mut self, reversed: bool) -> String {
        match self.navigator.begin(&self.document, reversed) {
            Some(range) => self.moved_to(range),
            None => "document is empty".to_string(),
        }
    }

    fn resync(&mut self) -> String {
        let Some(current) = &self.current else {
            return self.begin(false);
        };
        match self.navigator.sync(&self.document, current) {
            Some(range) => self.moved_to(range),
            None => "nothing to select".to_string(),
        }
    }

    fn perform(&mut self, action: Action) -> String {
        if !self.navigator.has_action(action) {
            return format!("{} is not available here", action.name());
        }
        let Some(current) = &self.current else {
            return "nothing selected".to_string();
        };
        match self
            .navigator
            .perform_action(&self.document, action, current)
        {
            Some(range) => self.moved_to(range),
            None => format!("cannot {} from here", action.name()),
        }
    }

    fn moved_to(&mut self, range: Range) -> String {
        let output = self.render(self.current.as_ref(), &range);
        self.current = Some(range);
        output
    }

    fn render(&self, prev: Option<&Range>, range: &Range) -> String {
        let description = self.navigator.describe(&self.document, prev, range);
        let braille = self.navigator.braille(&self.document, prev, range);
        format!("{description}\n  {}", mark_selection(&braille))
    }
}

/// Braille line with the selected chars wrapped in brackets.
fn mark_selection(braille: &Braille) -> String {
    if braille.start >= braille.end {
        return braille.text.clone();
    }
    let mut marked = String::with_capacity(braille.text.len() + 2);
    for (i, c) in braille.text.chars().enumerate() {
        if i == braille.start {
            marked.push('[');
        }
        marked.push(c);
        if i + 1 == braille.end {
            marked.push(']');
        }
    }
    marked
}

fn navigator_options(config: &Config) -> NavigatorOptions {
    let initial_granularity = config
        .navigation
        .granularity
        .parse()
        .unwrap_or_else(|err| {
            log::warn!("{err}, starting at group");
            Granularity::Group
        });
    NavigatorOptions {
        sentence_navigation: config.navigation.sentence_navigation,
        line_width: config.navigation.line_width,
        initial_granularity,
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let Some(file) = env::args().nth(1) else {
        bail!("usage: granule-cli <file.md>");
    };

    log::info!("Config path: {}", Config::config_path().display());
    let config = Config::load_or_default().context("Failed to load config")?;

    let source = fs::read_to_string(&file).with_context(|| format!("Failed to read {file}"))?;
    let document = Document::from_markdown(&source);

    let mut navigator = Navigator::new(navigator_options(&config));
    let mut session: SessionStore = match load_session(&config.session_path) {
        Ok(session) => session.unwrap_or_default(),
        Err(err) => {
            log::warn!("{err}");
            SessionStore::default()
        }
    };
    navigator.read_from(&session);

    let mut app = App::new(document, navigator);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", app.execute(Command::Where))?;

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read command")?;
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(command) => writeln!(out, "{}", app.execute(command))?,
            Err(err) => writeln!(out, "{err}")?,
        }
    }

    app.navigator.store_on(&mut session);
    save_session(&config.session_path, &session)
        .with_context(|| format!("Failed to save session to {}", config.session_path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn app(markdown: &str, granularity: Granularity) -> App {
        App::new(
            Document::from_markdown(markdown),
            Navigator::new(NavigatorOptions {
                initial_granularity: granularity,
                ..NavigatorOptions::default()
            }),
        )
    }

    #[test]
    fn parses_commands() {
        assert_eq!("n".parse::<Command>().unwrap(), Command::Next);
        assert_eq!("prev".parse::<Command>().unwrap(), Command::Previous);
        assert_eq!("+".parse::<Command>().unwrap(), Command::LessGranular);
        assert_eq!(
            "g word".parse::<Command>().unwrap(),
            Command::Granularity(Granularity::Word)
        );
        assert_eq!(
            "a nextRow".parse::<Command>().unwrap(),
            Command::Action(Action::NextRow)
        );
        assert_eq!("  quit ".parse::<Command>().unwrap(), Command::Quit);
    }

    #[test]
    fn rejects_bad_commands() {
        assert!("".parse::<Command>().is_err());
        assert!("g paragraph".parse::<Command>().is_err());
        assert!("n extra".parse::<Command>().is_err());
        assert!("jump".parse::<Command>().is_err());
    }

    #[test]
    fn steps_forward_and_back() {
        let mut app = app("one two three", Granularity::Word);

        assert_eq!(app.execute(Command::Next), "two\n  one [two] three");
        assert_eq!(app.execute(Command::Next), "three\n  one two [three]");
        assert_eq!(app.execute(Command::Next), "end of document");
        assert_eq!(app.execute(Command::Previous), "two\n  one [two] three");
    }

    #[test]
    fn changing_granularity_resyncs_current_position() {
        let mut app = app("# Title\n\nBody text.", Granularity::Group);
        app.execute(Command::Next);

        assert_eq!(
            app.execute(Command::Granularity(Granularity::Word)),
            "Body\n  [Body] text."
        );
        assert_eq!(
            app.execute(Command::Granularity(Granularity::Group)),
            "Body text.\n  Body text."
        );
    }

    #[test]
    fn where_reports_granularity() {
        let mut app = app("hello", Granularity::Character);
        assert_eq!(app.execute(Command::Where), "[character] h\n  [h]ello");
    }

    #[test]
    fn unavailable_actions_are_reported() {
        let mut app = app("hello", Granularity::Word);
        assert_eq!(
            app.execute(Command::Action(Action::NextRow)),
            "nextRow is not available here"
        );
    }

    #[test]
    fn empty_documents_say_so() {
        let mut app = app("", Granularity::Word);
        assert_eq!(app.execute(Command::Next), "document is empty");
    }

    #[test]
    fn mark_selection_brackets_the_span() {
        let braille = Braille {
            text: "a b c".to_string(),
            start: 2,
            end: 3,
        };
        assert_eq!(mark_selection(&braille), "a [b] c");
    }
}
