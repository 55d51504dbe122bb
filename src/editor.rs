//! The command dispatcher: pulls commands, applies them to the document,
//! and keeps the session history.

use std::path::{Path, PathBuf};

use dedlin_core::{
    parse, Command, CommandKind, Document, EditError, Input, LineInput, LineRange, NoInput, Phrases,
    Speller, Transform,
};
use tracing::{debug, info, warn};

use crate::collab::{HistorySink, NoHistory, Output, PageFetcher, Store, Suggester};
use crate::error::{EditorError, Result};
use crate::help;
use crate::sources::CommandSource;

pub const PROMPT: &str = " * ";

const DEFAULT_INDENT: &str = "    ";

/// Commands an untrusted user may not run.
pub const HIGH_TRUST_COMMANDS: [CommandKind; 6] = [
    CommandKind::Browse,
    CommandKind::Export,
    CommandKind::Transfer,
    CommandKind::Macro,
    CommandKind::Crash,
    CommandKind::Print,
];

/// Session behavior switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// No interactive input at all.
    pub headless: bool,
    /// Unknown commands stop the session.
    pub halt_on_error: bool,
    /// Save a modified document on QUIT.
    pub quit_safety: bool,
    /// Write the canonical form of each command back to the output.
    pub echo: bool,
    /// Suppress feedback; document output still shows.
    pub quiet: bool,
    /// Concise status lines for screen readers.
    pub blind_mode: bool,
    /// Disables the high-trust commands and save redirection.
    pub untrusted: bool,
    pub page_size: usize,
    pub line_break: String,
    pub search_case_sensitive: bool,
    pub replace_case_sensitive: bool,
    pub disabled_commands: Vec<CommandKind>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            headless: false,
            halt_on_error: false,
            quit_safety: true,
            echo: false,
            quiet: false,
            blind_mode: false,
            untrusted: false,
            page_size: 5,
            line_break: "\n".to_string(),
            search_case_sensitive: false,
            replace_case_sensitive: true,
            disabled_commands: Vec::new(),
        }
    }
}

impl Options {
    pub fn headless() -> Self {
        Self {
            headless: true,
            halt_on_error: true,
            ..Self::default()
        }
    }

    fn is_disabled(&self, kind: CommandKind) -> bool {
        self.disabled_commands.contains(&kind)
            || (self.untrusted && HIGH_TRUST_COMMANDS.contains(&kind))
    }
}

/// Everything the editor talks to.
pub struct Collaborators {
    pub output: Box<dyn Output>,
    pub line_input: Box<dyn LineInput>,
    pub store: Box<dyn Store>,
    pub history: Box<dyn HistorySink>,
    pub speller: Option<Box<dyn Speller>>,
    pub fetcher: Option<Box<dyn PageFetcher>>,
    pub suggester: Option<Box<dyn Suggester>>,
}

impl Collaborators {
    pub fn new(output: impl Output + 'static, store: impl Store + 'static) -> Self {
        Self {
            output: Box::new(output),
            line_input: Box::new(NoInput),
            store: Box::new(store),
            history: Box::new(NoHistory),
            speller: None,
            fetcher: None,
            suggester: None,
        }
    }

    pub fn with_line_input(mut self, input: impl LineInput + 'static) -> Self {
        self.line_input = Box::new(input);
        self
    }

    pub fn with_history(mut self, history: impl HistorySink + 'static) -> Self {
        self.history = Box::new(history);
        self
    }

    pub fn with_speller(mut self, speller: impl Speller + 'static) -> Self {
        self.speller = Some(Box::new(speller));
        self
    }

    pub fn with_fetcher(mut self, fetcher: impl PageFetcher + 'static) -> Self {
        self.fetcher = Some(Box::new(fetcher));
        self
    }

    pub fn with_suggester(mut self, suggester: impl Suggester + 'static) -> Self {
        self.suggester = Some(Box::new(suggester));
        self
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Quit,
    Exit,
    EndOfInput,
    Interrupted,
}

pub struct Editor {
    doc: Document,
    options: Options,
    io: Collaborators,
    file_path: Option<PathBuf>,
    history: Vec<Command>,
    in_macro: bool,
}

impl Editor {
    pub fn new(options: Options, io: Collaborators) -> Self {
        Self {
            doc: Document::default(),
            options,
            io,
            file_path: None,
            history: Vec::new(),
            in_macro: false,
        }
    }

    /// Start editing `path`, creating it if needed. `None` edits a scratch buffer.
    pub fn open(&mut self, path: Option<&Path>) -> Result<()> {
        let lines = match path {
            Some(p) => {
                self.feedback(&format!("Editing {}", p.display()));
                self.io.store.read_or_create(p)?
            }
            None => Vec::new(),
        };
        info!(target: "editor", path = ?path, lines = lines.len(), "opened");
        self.file_path = path.map(Path::to_path_buf);
        self.doc = Document::new(lines);
        Ok(())
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Commands run so far, in order. Feedback comments are not included.
    pub fn history(&self) -> &[Command] {
        &self.history
    }

    /// Read commands from `source` until a terminal command or end of input.
    pub fn run(&mut self, source: &mut dyn CommandSource) -> Result<Outcome> {
        loop {
            let text = match source.next_command(PROMPT) {
                Input::Line(text) => text,
                Input::Done => return Ok(Outcome::EndOfInput),
                Input::Interrupted => {
                    info!(target: "editor", "interrupted");
                    return Ok(Outcome::Interrupted);
                }
            };
            if let Some(outcome) = self.execute_text(&text)? {
                return Ok(outcome);
            }
        }
    }

    /// Parse and run one line of command text.
    pub fn execute_text(&mut self, text: &str) -> Result<Option<Outcome>> {
        let headless = self.options.headless || self.in_macro;
        let command = parse(text, self.doc.current_line(), self.doc.len(), headless);
        self.execute(command)
    }

    /// Run one parsed command. `Some` means the session is over.
    pub fn execute(&mut self, command: Command) -> Result<Option<Outcome>> {
        let kind = command.kind;
        if self.options.is_disabled(kind) {
            self.feedback(&format!("Command {kind} is disabled"));
            if self.options.headless {
                return Err(EditorError::Halt(format!("Command {kind} is disabled")));
            }
            return Ok(None);
        }
        if !command.validate() {
            warn!(target: "editor", command = %command, "invalid command not applied");
            self.feedback(&format!("Invalid command {command}"));
            self.suggest(&command);
            return Ok(None);
        }

        if !self.rewrites_history(&command) {
            self.log_history(command.clone());
        }
        self.echo(&command.format());

        let command = if kind == CommandKind::Redo {
            match self.history.len().checked_sub(2).map(|i| &self.history[i]) {
                Some(previous) if previous.kind != CommandKind::Redo => {
                    let previous = previous.clone();
                    self.log_history(previous.clone());
                    self.echo(previous.original_text.as_deref().unwrap_or(""));
                    previous
                }
                _ => {
                    self.feedback("Nothing to redo, not enough history");
                    return Ok(None);
                }
            }
        } else {
            command
        };

        debug!(target: "editor", command = %command, "dispatch");
        let outcome = self.apply(&command)?;
        if outcome.is_none() {
            self.status();
        }
        Ok(outcome)
    }

    /// Interactive INSERT and EDIT log what was typed instead of the command itself.
    fn rewrites_history(&self, command: &Command) -> bool {
        matches!(command.kind, CommandKind::Insert | CommandKind::Edit)
            && command.phrases.is_none()
            && !self.options.headless
            && !self.in_macro
    }

    fn apply(&mut self, command: &Command) -> Result<Option<Outcome>> {
        let range = command.line_range;
        match command.kind {
            CommandKind::Empty | CommandKind::Noop | CommandKind::Comment | CommandKind::Redo => {}
            CommandKind::Unknown => {
                self.feedback("Unknown command, type HELP for help");
                if self.options.halt_on_error {
                    return Err(EditorError::Halt(format!(
                        "Unknown command {}",
                        command.original_text.as_deref().unwrap_or("").trim()
                    )));
                }
                self.suggest(command);
            }

            CommandKind::List => {
                let lines = self.doc.list(range);
                self.show_all(&lines);
            }
            CommandKind::Page => {
                let lines = self.doc.page(self.options.page_size);
                self.show_all(&lines);
            }
            CommandKind::Print => {
                let lines = self.doc.print(range);
                self.show_all(&lines);
            }
            CommandKind::Search => match command.first_phrase() {
                Some(value) => {
                    let lines = self
                        .doc
                        .search(range, value, self.options.search_case_sensitive);
                    if lines.is_empty() {
                        self.feedback(&format!("{value} not found"));
                    }
                    self.show_all(&lines);
                }
                None => self.feedback("Nothing to search for"),
            },
            CommandKind::Spell => {
                let lines = match &self.io.speller {
                    Some(speller) => Some(self.doc.spell(range, speller.as_ref())),
                    None => None,
                };
                match lines {
                    Some(lines) => self.show_all(&lines),
                    None => self.feedback("No spell checker available"),
                }
            }
            CommandKind::Current => {
                if let Some(r) = range {
                    self.doc.set_current_line(r.start);
                }
            }
            CommandKind::Info => {
                let name = self
                    .file_path
                    .as_ref()
                    .map_or_else(|| "(no file)".to_string(), |p| p.display().to_string());
                let info = self.doc.info();
                self.show(&format!("File: {name}"));
                self.show(&info.to_string());
            }

            CommandKind::Insert => self.insert(command),
            CommandKind::Edit => self.edit(command)?,
            CommandKind::Push => match &command.phrases {
                Some(phrases) => {
                    let target = range.map_or(self.doc.len() + 1, |r| r.start);
                    let pushed = self.doc.push(target, phrases.as_slice());
                    self.feedback(&format!("Pushed {} lines", pushed.len()));
                }
                None => self.feedback("Nothing to push"),
            },
            CommandKind::Lorem => {
                let count = self.doc.lorem(range);
                self.feedback(&format!("Added {count} lines"));
            }
            CommandKind::Delete => {
                if self.doc.delete(range) {
                    let r = range.unwrap_or_else(|| LineRange::whole(self.doc.len()));
                    self.feedback(&format!("Deleted lines {} to {}", r.start, r.end()));
                } else {
                    self.feedback("Could not delete");
                }
            }
            CommandKind::Replace => match (command.first_phrase(), command.second_phrase()) {
                (Some(target), Some(replacement)) => {
                    self.feedback("Replacing");
                    let lines = self.doc.replace(
                        range,
                        target,
                        replacement,
                        self.options.replace_case_sensitive,
                    );
                    self.show_all(&lines);
                }
                _ => self.feedback("Replace needs a target and a replacement"),
            },

            CommandKind::Write | CommandKind::Save => self.save_document(None)?,
            CommandKind::Quit => {
                if self.doc.is_dirty() && self.options.quit_safety {
                    self.save_document(None)?;
                }
                return Ok(Some(Outcome::Quit));
            }
            CommandKind::Exit => {
                self.save_document(command.phrases.as_ref())?;
                return Ok(Some(Outcome::Exit));
            }
            CommandKind::Transfer => match command.first_phrase() {
                Some(name) => {
                    let lines = self.io.store.read(Path::new(name))?;
                    let target = range.map_or(self.doc.current_line(), |r| r.start);
                    let inserted = self.doc.push(target, &lines);
                    self.feedback(&format!("Transferred {} lines from {name}", inserted.len()));
                }
                None => self.feedback("Transfer needs a file name"),
            },
            CommandKind::Export => {
                let path = command
                    .first_phrase()
                    .map(PathBuf::from)
                    .or_else(|| self.file_path.clone());
                match path {
                    Some(path) => {
                        self.io.store.overwrite(&path, self.doc.lines(), "\n")?;
                        self.feedback(&format!("Exported to {}", path.display()));
                    }
                    None => self.feedback("Export needs a file name"),
                }
            }
            CommandKind::Browse => self.browse(command)?,

            CommandKind::Move => self.move_lines(command)?,
            CommandKind::Copy => match command.first_phrase().map(str::parse::<usize>) {
                Some(Ok(target)) => {
                    let result = self.doc.copy(range, target);
                    if self.settle(result)?.is_some() {
                        self.feedback("Copied");
                    }
                }
                _ => self.feedback("Copy needs a target line number"),
            },
            CommandKind::Shuffle => {
                self.doc.shuffle();
                self.feedback("Shuffled");
            }
            CommandKind::Sort => {
                self.doc.sort();
                self.feedback("Sorted");
            }
            CommandKind::Reverse => {
                self.doc.reverse();
                self.feedback("Reversed");
            }

            CommandKind::History => {
                let lines: Vec<String> = self.history.iter().map(Command::format).collect();
                for line in &lines {
                    self.say(line);
                }
            }
            CommandKind::Macro => {
                if let Some(outcome) = self.run_macro(command)? {
                    return Ok(Some(outcome));
                }
            }
            CommandKind::Help => self.help(command.first_phrase()),
            CommandKind::Undo => {
                self.doc.undo();
                self.feedback("Undone");
            }
            CommandKind::Crash => return Err(EditorError::Halt("Crashing".to_string())),

            CommandKind::Indent => {
                let prefix = command.first_phrase().unwrap_or(DEFAULT_INDENT);
                let changed = self.doc.indent(range, prefix);
                self.feedback(&format!("Indented {changed} lines"));
            }
            CommandKind::Dedent => {
                let changed = self.doc.dedent(range);
                self.feedback(&format!("Dedented {changed} lines"));
            }
            kind if kind.is_line_transform() => {
                let transform = Transform::from_command(kind, command.first_phrase());
                if let Some(transform) = self.settle(transform)? {
                    let changed = self.doc.transform(range, transform);
                    self.feedback(&format!("{kind}: changed {changed} lines"));
                }
            }
            kind => self.feedback(&format!("Command {kind} not implemented")),
        }
        Ok(None)
    }

    fn insert(&mut self, command: &Command) {
        let target = command.line_range.map_or(1, |r| r.start);
        if command.phrases.is_some() {
            self.doc
                .insert(Some(target), command.phrases.as_ref(), &mut NoInput);
            return;
        }
        if self.options.headless || self.in_macro {
            self.doc.fill(LineRange::line(target), "");
            return;
        }

        self.feedback("Enter . on its own line to exit insert mode");
        let inserted = self
            .doc
            .insert(Some(target), None, self.io.line_input.as_mut());
        let first = self.doc.current_line() + 1 - inserted.len();
        for (i, text) in inserted.into_iter().enumerate() {
            self.log_history(
                Command::new(CommandKind::Insert)
                    .with_range(LineRange::line(first + i))
                    .with_phrases(Phrases::new([text])),
            );
        }
    }

    fn edit(&mut self, command: &Command) -> Result<()> {
        let mut line = command.line_range.map_or(1, |r| r.start);
        if let Some(phrases) = &command.phrases {
            if self.doc.spread(LineRange::line(line), phrases.as_slice()) == 0 {
                self.feedback("Nothing to edit");
            }
            return Ok(());
        }
        if self.options.headless || self.in_macro {
            self.feedback("Edit needs text in headless mode");
            return Ok(());
        }

        self.feedback("Enter . on its own line to exit edit mode");
        loop {
            let result = self.doc.edit(line, self.io.line_input.as_mut());
            let Some(status) = self.settle(result)? else {
                break;
            };
            if let Some(text) = status.text {
                self.log_history(
                    Command::new(CommandKind::Edit)
                        .with_range(LineRange::line(line))
                        .with_phrases(Phrases::new([text])),
                );
            }
            if !(status.can_continue && status.line_edited) {
                break;
            }
            line += 1;
        }
        Ok(())
    }

    fn move_lines(&mut self, command: &Command) -> Result<()> {
        let Some(range) = command.line_range else {
            self.feedback("Must specify a line range to move");
            return Ok(());
        };
        let target = match command.first_phrase().map(str::parse::<usize>) {
            Some(Ok(target)) => target,
            _ => {
                self.feedback("Move needs a target line number");
                return Ok(());
            }
        };
        let result = self.doc.move_range(range, target);
        if self.settle(result)?.is_some() {
            self.feedback("Moved");
        }
        Ok(())
    }

    /// Report an engine error as feedback. With halt-on-error it ends the
    /// session as [`EditorError::Edit`].
    fn settle<T>(&mut self, result: Result<T, EditError>) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!(target: "editor", %err, "edit rejected");
                self.feedback(&err.to_string());
                if self.options.halt_on_error {
                    Err(err.into())
                } else {
                    Ok(None)
                }
            }
        }
    }

    fn browse(&mut self, command: &Command) -> Result<()> {
        let Some(url) = command.first_phrase() else {
            self.feedback("No URL, can't browse");
            return Ok(());
        };
        let Some(fetcher) = self.io.fetcher.as_mut() else {
            self.feedback("Browsing is not available");
            return Ok(());
        };
        let rows = fetcher.fetch(url)?;
        let target = self.doc.current_line();
        let inserted = self.doc.push(target, &rows);
        self.feedback(&format!("Inserted {} lines from {url}", inserted.len()));
        Ok(())
    }

    fn run_macro(&mut self, command: &Command) -> Result<Option<Outcome>> {
        let Some(name) = command.first_phrase() else {
            self.feedback("Macro needs a file name");
            return Ok(None);
        };
        if self.in_macro {
            self.feedback("Macros cannot run other macros");
            return Ok(None);
        }
        let script = self.io.store.read(Path::new(name))?;
        info!(target: "editor", name, commands = script.len(), "running macro");

        self.in_macro = true;
        let result = self.run_script(&script);
        self.in_macro = false;
        result
    }

    fn run_script(&mut self, script: &[String]) -> Result<Option<Outcome>> {
        for line in script {
            if let Some(outcome) = self.execute_text(line)? {
                return Ok(Some(outcome));
            }
        }
        Ok(None)
    }

    fn help(&mut self, topic: Option<&str>) {
        match topic {
            None => self.feedback(help::HELP_TEXT),
            Some(t) if t.eq_ignore_ascii_case("ALL") => {
                for text in help::all_topics() {
                    self.feedback("");
                    self.feedback(text);
                }
            }
            Some(t) => match help::topic(t) {
                Some(text) => self.feedback(text),
                None => self.feedback("Don't have help for that category"),
            },
        }
    }

    fn save_document(&mut self, phrases: Option<&Phrases>) -> Result<()> {
        if let Some(name) = phrases.and_then(Phrases::first) {
            if self.options.untrusted {
                self.feedback("Untrusted users cannot save to a new file name");
            } else {
                self.file_path = Some(PathBuf::from(name));
            }
        }
        if self.file_path.is_none() && !self.options.headless && !self.options.untrusted {
            if let Input::Line(name) = self.io.line_input.ask("Please specify file name: ") {
                let name = name.trim();
                if !name.is_empty() {
                    self.file_path = Some(PathBuf::from(name));
                }
            }
        }
        let Some(path) = self.file_path.clone() else {
            let reason = if self.options.untrusted {
                "Can't save, no initial file name specified and user is untrusted"
            } else if self.options.headless {
                "Can't save in headless mode without an initial file name"
            } else {
                "Need file path before saving, can't save"
            };
            self.feedback(reason);
            return Ok(());
        };
        self.io
            .store
            .overwrite(&path, self.doc.lines(), &self.options.line_break)?;
        self.doc.mark_clean();
        info!(target: "editor", path = %path.display(), lines = self.doc.len(), "saved");
        self.feedback(&format!("Saved to {}", path.display()));
        Ok(())
    }

    /// Save to the session's file without asking anything. Returns false when
    /// there is no file to save to.
    pub fn emergency_save(&mut self) -> Result<bool> {
        let Some(path) = self.file_path.clone() else {
            return Ok(false);
        };
        self.io
            .store
            .overwrite(&path, self.doc.lines(), &self.options.line_break)?;
        self.doc.mark_clean();
        warn!(target: "editor", path = %path.display(), "emergency save");
        Ok(true)
    }

    /// Closing message with the history log location, if there is one.
    pub fn final_report(&mut self) {
        if let Some(path) = self.io.history.location() {
            self.feedback(&format!("History saved to {}", path.display()));
        }
    }

    fn log_history(&mut self, command: Command) {
        self.record(&command.format());
        self.history.push(command);
    }

    fn record(&mut self, line: &str) {
        if let Err(err) = self.io.history.record(line) {
            warn!(target: "editor", %err, "history log write failed");
        }
    }

    fn suggest(&mut self, command: &Command) {
        let text = command.original_text.as_deref().unwrap_or("");
        let suggestion = self.io.suggester.as_mut().and_then(|s| s.suggest(text));
        if let Some(suggestion) = suggestion {
            self.feedback(&suggestion);
        }
    }

    fn status(&mut self) {
        let (current, total) = (self.doc.current_line(), self.doc.len());
        let status = if self.options.blind_mode || self.options.headless {
            format!("Current line {current} of {total}")
        } else {
            format!("--- Current line is {current}, {total} lines total ---")
        };
        self.feedback(&status);
    }

    /// Message to the user; also logged to history as comments, one per line.
    fn feedback(&mut self, text: &str) {
        for line in text.split('\n') {
            self.record(&Command::comment(line.trim_end_matches('\r')).format());
        }
        self.say(text);
    }

    /// Message to the user that is not logged.
    fn say(&mut self, text: &str) {
        if !self.options.quiet {
            self.io.output.emit(text, "\n");
        }
    }

    fn echo(&mut self, text: &str) {
        if self.options.echo && !self.options.quiet {
            self.io.output.emit(text, "\n");
        }
    }

    /// Document content; shown even when quiet.
    fn show(&mut self, text: &str) {
        self.io.output.emit(text, "\n");
    }

    fn show_all(&mut self, lines: &[String]) {
        for line in lines {
            self.show(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::{CaptureOutput, MemoryHistory, MemoryStore};
    use dedlin_core::QueuedInput;

    fn editor(options: Options, lines: &[&str]) -> (Editor, CaptureOutput, MemoryStore) {
        let out = CaptureOutput::new();
        let store = MemoryStore::new();
        store.insert("doc.txt", lines);
        let mut ed = Editor::new(options, Collaborators::new(out.clone(), store.clone()));
        ed.open(Some(Path::new("doc.txt"))).unwrap();
        (ed, out, store)
    }

    #[test]
    fn disabled_commands_halt_only_headless() {
        let opts = Options {
            untrusted: true,
            ..Options::default()
        };
        let (mut ed, out, _) = editor(opts, &["a"]);
        assert_eq!(ed.execute_text("PRINT").unwrap(), None);
        assert!(out.contains("Command PRINT is disabled"));

        let opts = Options {
            untrusted: true,
            ..Options::headless()
        };
        let (mut ed, _, _) = editor(opts, &["a"]);
        assert!(ed.execute_text("CRASH").unwrap_err().is_halt());
    }

    #[test]
    fn invalid_commands_are_not_applied() {
        let (mut ed, out, _) = editor(Options::default(), &["a", "b"]);
        let bad = Command::new(CommandKind::Delete).with_range(LineRange::line(0));
        assert_eq!(ed.execute(bad).unwrap(), None);
        assert_eq!(ed.document().len(), 2);
        assert!(out.contains("Invalid command"));
        assert!(ed.history().is_empty());
    }

    #[test]
    fn redo_repeats_previous_command() {
        let (mut ed, out, _) = editor(Options::default(), &["a"]);
        ed.execute_text("REDO").unwrap();
        assert!(out.contains("Nothing to redo"));

        ed.execute_text("PUSH x").unwrap();
        ed.execute_text("REDO").unwrap();
        assert_eq!(ed.document().lines(), ["a", "x", "x"]);
        let kinds: Vec<CommandKind> = ed.history().iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            [
                CommandKind::Redo,
                CommandKind::Push,
                CommandKind::Redo,
                CommandKind::Push
            ]
        );
    }

    #[test]
    fn quit_saves_only_dirty_with_safety() {
        let (mut ed, _, store) = editor(Options::default(), &["a"]);
        ed.execute_text("PUSH b").unwrap();
        assert_eq!(ed.execute_text("QUIT").unwrap(), Some(Outcome::Quit));
        assert_eq!(store.get("doc.txt").unwrap(), vec!["a", "b"]);

        let opts = Options {
            quit_safety: false,
            ..Options::default()
        };
        let (mut ed, _, store) = editor(opts, &["a"]);
        ed.execute_text("PUSH b").unwrap();
        assert_eq!(ed.execute_text("Q").unwrap(), Some(Outcome::Quit));
        assert_eq!(store.get("doc.txt").unwrap(), vec!["a"]);
    }

    #[test]
    fn exit_redirects_unless_untrusted() {
        let (mut ed, _, store) = editor(Options::default(), &["a"]);
        assert_eq!(ed.execute_text("EXIT other.txt").unwrap(), Some(Outcome::Exit));
        assert_eq!(store.get("other.txt").unwrap(), vec!["a"]);

        let opts = Options {
            untrusted: true,
            ..Options::default()
        };
        let (mut ed, out, store) = editor(opts, &["a"]);
        ed.execute_text("EXIT other.txt").unwrap();
        assert!(store.get("other.txt").is_none());
        assert!(out.contains("Untrusted users cannot save"));
    }

    #[test]
    fn unknown_halts_when_asked() {
        let (mut ed, _, _) = editor(Options::default(), &[]);
        assert_eq!(ed.execute_text("FROB").unwrap(), None);

        let (mut ed, _, _) = editor(Options::headless(), &[]);
        let err = ed.execute_text("FROB").unwrap_err();
        assert!(err.is_halt());
        assert_eq!(err.to_string(), "halted: Unknown command FROB");
    }

    #[test]
    fn interactive_insert_rewrites_history() {
        let out = CaptureOutput::new();
        let history = MemoryHistory::new();
        let io = Collaborators::new(out, MemoryStore::new())
            .with_line_input(QueuedInput::lines(["one", "two"]))
            .with_history(history.clone());
        let mut ed = Editor::new(Options::default(), io);
        ed.open(None).unwrap();
        ed.execute_text("INSERT").unwrap();
        assert_eq!(ed.document().lines(), ["one", "two"]);

        let formatted: Vec<String> = ed.history().iter().map(Command::format).collect();
        assert_eq!(formatted, ["1 INSERT one", "2 INSERT two"]);
        let log = history.lines();
        assert!(log.contains(&"1 INSERT one".to_string()));
        assert!(!log.contains(&"1 INSERT".to_string()));
    }

    #[test]
    fn headless_insert_without_text_adds_blank_line() {
        let (mut ed, _, _) = editor(Options::headless(), &["a"]);
        ed.execute_text("INSERT").unwrap();
        assert_eq!(ed.document().lines(), ["a", ""]);
    }

    #[test]
    fn macro_runs_but_does_not_nest() {
        let (mut ed, out, store) = editor(Options::default(), &["b", "a"]);
        store.insert("m.ed", &["SORT", "MACRO m.ed", "PUSH c"]);
        ed.execute_text("MACRO m.ed").unwrap();
        assert_eq!(ed.document().lines(), ["a", "b", "c"]);
        assert!(out.contains("Macros cannot run other macros"));
    }

    #[test]
    fn move_into_range_halts_headless() {
        let (mut ed, _, _) = editor(Options::headless(), &["a", "b", "c", "d"]);
        let err = ed.execute_text("1,3 MOVE 2").unwrap_err();
        assert!(matches!(
            err,
            EditorError::Edit(EditError::MoveIntoRange {
                start: 1,
                end: 3,
                target: 2
            })
        ));
        assert!(!err.is_halt());
        assert_eq!(ed.document().lines(), ["a", "b", "c", "d"]);
    }

    #[test]
    fn move_into_range_is_reported_interactively() {
        let (mut ed, out, _) = editor(Options::default(), &["a", "b", "c", "d"]);
        assert_eq!(ed.execute_text("1,3 MOVE 2").unwrap(), None);
        assert!(out.contains("inside the range"));
        ed.execute_text("1,2 MOVE 5").unwrap();
        assert_eq!(ed.document().lines(), ["c", "d", "a", "b"]);
    }

    #[test]
    fn copy_errors_follow_halt_on_error() {
        let (mut ed, out, _) = editor(Options::default(), &["a", "b"]);
        assert_eq!(ed.execute_text("1,2 COPY 9").unwrap(), None);
        assert!(out.contains("out of bounds"));

        let (mut ed, _, _) = editor(Options::headless(), &["a", "b"]);
        let err = ed.execute_text("1,1,18446744073709551615 COPY 1").unwrap_err();
        assert!(matches!(err, EditorError::Edit(EditError::InvalidArgument(_))));
        assert_eq!(ed.document().lines(), ["a", "b"]);
    }

    #[test]
    fn huge_width_is_rejected_not_allocated() {
        let (mut ed, out, _) = editor(Options::default(), &["a"]);
        assert_eq!(ed.execute_text("RJUST 18446744073709551615").unwrap(), None);
        assert!(out.contains("larger than"));
        assert_eq!(ed.document().lines(), ["a"]);

        let (mut ed, _, _) = editor(Options::headless(), &["a"]);
        let err = ed.execute_text("CENTER 18446744073709551615").unwrap_err();
        assert!(matches!(err, EditorError::Edit(EditError::InvalidArgument(_))));
    }

    #[test]
    fn interactive_edit_past_end_follows_halt_on_error() {
        let io = Collaborators::new(CaptureOutput::new(), MemoryStore::new())
            .with_line_input(QueuedInput::lines(["x"]));
        let mut ed = Editor::new(Options::default(), io);
        ed.open(None).unwrap();
        assert_eq!(ed.execute_text("EDIT").unwrap(), None);
        assert!(ed.document().is_empty());

        let opts = Options {
            halt_on_error: true,
            ..Options::default()
        };
        let io = Collaborators::new(CaptureOutput::new(), MemoryStore::new())
            .with_line_input(QueuedInput::lines(["x"]));
        let mut ed = Editor::new(opts, io);
        ed.open(None).unwrap();
        let err = ed.execute_text("EDIT").unwrap_err();
        assert!(matches!(
            err,
            EditorError::Edit(EditError::OutOfBounds { line: 1, len: 0 })
        ));
    }

    #[test]
    fn status_line_forms() {
        let (mut ed, out, _) = editor(Options::default(), &["a"]);
        ed.execute_text("1 LIST").unwrap();
        assert!(out.contains("--- Current line is 1, 1 lines total ---"));

        let (mut ed, out, _) = editor(Options::headless(), &["a"]);
        ed.execute_text("1 LIST").unwrap();
        assert!(out.contains("Current line 1 of 1"));
    }

    #[test]
    fn quiet_still_shows_document() {
        let opts = Options {
            quiet: true,
            ..Options::default()
        };
        let (mut ed, out, _) = editor(opts, &["a"]);
        ed.execute_text("LIST").unwrap();
        assert_eq!(out.lines(), ["   1 : a"]);
    }
}
