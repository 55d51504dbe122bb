use dedlin_core::EditError;
use thiserror::Error;

/// Errors that end or interrupt an editing session.
#[derive(Debug, Error)]
pub enum EditorError {
    /// Deliberate stop: CRASH, an unknown command while halting on errors, or
    /// a disabled command in headless mode.
    #[error("halted: {0}")]
    Halt(String),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EditorError {
    /// True for the halt class, which callers answer with an emergency save.
    pub fn is_halt(&self) -> bool {
        matches!(self, EditorError::Halt(_))
    }
}

pub type Result<T, E = EditorError> = std::result::Result<T, E>;
