//! dedlin: a line editor driven by an edlin-style command language.
//!
//! This crate wires the pure engine in `dedlin-core` to the outside world: the
//! command dispatcher, file persistence, the history log, configuration and the
//! `dedlin` CLI.

mod collab;
mod config;
mod editor;
mod error;
mod help;
mod sources;

pub use collab::{
    join_lines, split_lines, write_atomic, CaptureOutput, FileHistory, FileStore, HistorySink,
    MemoryHistory, MemoryStore, NoHistory, Output, PageFetcher, StdoutOutput, Store, Suggester,
};
pub use config::{discover, load_from, Config, ConfigFile, CONFIG_FILE_NAME};
pub use editor::{Collaborators, Editor, Options, Outcome, HIGH_TRUST_COMMANDS, PROMPT};
pub use error::{EditorError, Result};
pub use help::HELP_TEXT;
pub use sources::{CommandSource, Console, ScriptSource};

pub use dedlin_core::{
    Command, CommandKind, Document, EditError, Input, LineInput, LineRange, Phrases, QueuedInput,
};
