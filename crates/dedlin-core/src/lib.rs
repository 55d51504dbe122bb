//! dedlin-core: the command language engine behind the `dedlin` line editor.
//!
//! This crate holds the pieces that do no I/O: the range/phrase model, the
//! command parser, and the [`Document`] engine that applies edits to an
//! in-memory line buffer with single-level undo.

mod command;
mod document;
mod input;
mod lorem;
mod parse;
mod range;
mod strings;

use thiserror::Error;

pub use command::{Command, CommandKind};
pub use document::{Document, DocumentInfo, EditStatus, MAX_COPY_LINES};
pub use input::{Input, LineInput, NoInput, QueuedInput, Speller};
pub use lorem::LOREM_IPSUM;
pub use parse::{extract_phrases, extract_range, parse, parse_script};
pub use range::{LineRange, Phrases};
pub use strings::{dedent, indent, Transform, MAX_WIDTH};

/// Structural errors raised by the [`Document`] engine.
///
/// These indicate a caller asked for something the buffer cannot do. They are
/// not user-input noise and should be reported, not hidden.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("line {line} is out of bounds (document has {len} lines)")]
    OutOfBounds { line: usize, len: usize },

    #[error("cannot move lines {start}..{end} to {target}: target is inside the range")]
    MoveIntoRange {
        start: usize,
        end: usize,
        target: usize,
    },

    #[error("range {range} does not fit a document of {len} lines")]
    RangeMismatch { range: LineRange, len: usize },

    #[error("{0}")]
    InvalidArgument(String),
}
