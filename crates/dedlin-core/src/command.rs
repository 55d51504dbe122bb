use std::fmt;

use crate::range::{LineRange, Phrases};

/// Every operation the command language can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Comment,
    Empty,
    /// `.` on its own, kept for ed compatibility.
    Noop,

    // display
    List,
    Page,
    Search,
    Spell,
    Current,
    Print,

    // edit
    Insert,
    Push,
    Edit,
    Lorem,
    Delete,
    Replace,

    // file and exit
    Write,
    Save,
    Quit,
    Exit,
    Transfer,
    Export,

    // data ingestion
    Browse,

    // reorder
    Move,
    Copy,
    Shuffle,
    Sort,
    Reverse,

    // meta
    History,
    Redo,
    Macro,

    // diagnostic
    Help,
    Undo,
    Unknown,
    Info,
    Crash,

    // block string transforms
    Indent,
    Dedent,

    // line string transforms
    Title,
    SwapCase,
    CaseFold,
    Capitalize,
    Upper,
    Lower,
    ExpandTabs,
    Rjust,
    Ljust,
    Center,
    Rstrip,
    Lstrip,
    Strip,
}

impl CommandKind {
    /// Canonical long form, as written in history and macro files.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Comment => "COMMENT",
            Self::Empty => "EMPTY",
            Self::Noop => "NOOP",
            Self::List => "LIST",
            Self::Page => "PAGE",
            Self::Search => "SEARCH",
            Self::Spell => "SPELL",
            Self::Current => "CURRENT",
            Self::Print => "PRINT",
            Self::Insert => "INSERT",
            Self::Push => "PUSH",
            Self::Edit => "EDIT",
            Self::Lorem => "LOREM",
            Self::Delete => "DELETE",
            Self::Replace => "REPLACE",
            Self::Write => "WRITE",
            Self::Save => "SAVE",
            Self::Quit => "QUIT",
            Self::Exit => "EXIT",
            Self::Transfer => "TRANSFER",
            Self::Export => "EXPORT",
            Self::Browse => "BROWSE",
            Self::Move => "MOVE",
            Self::Copy => "COPY",
            Self::Shuffle => "SHUFFLE",
            Self::Sort => "SORT",
            Self::Reverse => "REVERSE",
            Self::History => "HISTORY",
            Self::Redo => "REDO",
            Self::Macro => "MACRO",
            Self::Help => "HELP",
            Self::Undo => "UNDO",
            Self::Unknown => "UNKNOWN",
            Self::Info => "INFO",
            Self::Crash => "CRASH",
            Self::Indent => "INDENT",
            Self::Dedent => "DEDENT",
            Self::Title => "TITLE",
            Self::SwapCase => "SWAPCASE",
            Self::CaseFold => "CASEFOLD",
            Self::Capitalize => "CAPITALIZE",
            Self::Upper => "UPPER",
            Self::Lower => "LOWER",
            Self::ExpandTabs => "EXPANDTABS",
            Self::Rjust => "RJUST",
            Self::Ljust => "LJUST",
            Self::Center => "CENTER",
            Self::Rstrip => "RSTRIP",
            Self::Lstrip => "LSTRIP",
            Self::Strip => "STRIP",
        }
    }

    /// Look a kind up by its canonical name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.trim().to_ascii_uppercase();
        Self::ALL.iter().copied().find(|k| k.name() == upper)
    }

    pub const fn is_line_transform(self) -> bool {
        matches!(
            self,
            Self::Title
                | Self::SwapCase
                | Self::CaseFold
                | Self::Capitalize
                | Self::Upper
                | Self::Lower
                | Self::ExpandTabs
                | Self::Rjust
                | Self::Ljust
                | Self::Center
                | Self::Rstrip
                | Self::Lstrip
                | Self::Strip
        )
    }

    pub const ALL: [CommandKind; 50] = [
        Self::Comment,
        Self::Empty,
        Self::Noop,
        Self::List,
        Self::Page,
        Self::Search,
        Self::Spell,
        Self::Current,
        Self::Print,
        Self::Insert,
        Self::Push,
        Self::Edit,
        Self::Lorem,
        Self::Delete,
        Self::Replace,
        Self::Write,
        Self::Save,
        Self::Quit,
        Self::Exit,
        Self::Transfer,
        Self::Export,
        Self::Browse,
        Self::Move,
        Self::Copy,
        Self::Shuffle,
        Self::Sort,
        Self::Reverse,
        Self::History,
        Self::Redo,
        Self::Macro,
        Self::Help,
        Self::Undo,
        Self::Unknown,
        Self::Info,
        Self::Crash,
        Self::Indent,
        Self::Dedent,
        Self::Title,
        Self::SwapCase,
        Self::CaseFold,
        Self::Capitalize,
        Self::Upper,
        Self::Lower,
        Self::ExpandTabs,
        Self::Rjust,
        Self::Ljust,
        Self::Center,
        Self::Rstrip,
        Self::Lstrip,
        Self::Strip,
    ];
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One parsed instruction. A single record shape fits every kind; fields a kind
/// does not use stay `None`.
#[derive(Debug, Clone)]
pub struct Command {
    pub kind: CommandKind,
    pub line_range: Option<LineRange>,
    pub phrases: Option<Phrases>,
    /// Raw input, kept for history and diagnostics. Ignored by `==`.
    pub original_text: Option<String>,
    pub comment: Option<String>,
}

impl PartialEq for Command {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.line_range == other.line_range
            && self.phrases == other.phrases
            && self.comment == other.comment
    }
}

impl Eq for Command {}

impl Command {
    pub fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            line_range: None,
            phrases: None,
            original_text: None,
            comment: None,
        }
    }

    pub fn with_range(mut self, range: LineRange) -> Self {
        self.line_range = Some(range);
        self
    }

    pub fn with_phrases(mut self, phrases: Phrases) -> Self {
        self.phrases = Some(phrases);
        self
    }

    pub fn with_original(mut self, text: impl Into<String>) -> Self {
        self.original_text = Some(text.into());
        self
    }

    pub fn comment(text: impl Into<String>) -> Self {
        let mut c = Self::new(CommandKind::Comment);
        c.comment = Some(text.into());
        c
    }

    /// The first phrase, if any.
    pub fn first_phrase(&self) -> Option<&str> {
        self.phrases.as_ref().and_then(Phrases::first)
    }

    /// The second phrase, if any.
    pub fn second_phrase(&self) -> Option<&str> {
        self.phrases.as_ref().and_then(Phrases::second)
    }

    pub fn validate(&self) -> bool {
        self.line_range.map_or(true, |r| r.validate())
            && self.phrases.as_ref().map_or(true, Phrases::validate)
    }

    /// Canonical text form, suitable for history and macro files.
    pub fn format(&self) -> String {
        match self.kind {
            CommandKind::Comment => format!("# {}", self.comment.as_deref().unwrap_or("")),
            CommandKind::Unknown => {
                format!("# Unknown: {}", self.original_text.as_deref().unwrap_or(""))
            }
            CommandKind::Empty => match self.original_text.as_deref() {
                Some(text) if text.trim_start().starts_with('#') => {
                    text.trim_end_matches(['\n', '\r']).to_string()
                }
                _ => String::new(),
            },
            CommandKind::Noop => ".".to_string(),
            kind => {
                let range_part = self.line_range.map(|r| r.format()).unwrap_or_default();
                let phrase_part = match (&self.phrases, kind) {
                    // INSERT/EDIT take their tail literally, so a single literal is not quoted.
                    (Some(p), CommandKind::Insert | CommandKind::Edit) if p.len() == 1 => {
                        p.parts[0].clone()
                    }
                    (Some(p), _) => p.format(),
                    (None, _) => String::new(),
                };
                [range_part.as_str(), kind.name(), phrase_part.as_str()]
                    .iter()
                    .filter(|s| !s.is_empty())
                    .copied()
                    .collect::<Vec<_>>()
                    .join(" ")
            }
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}
