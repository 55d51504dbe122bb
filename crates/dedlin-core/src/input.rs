use std::collections::VecDeque;

/// One pull from an input collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Line(String),
    /// The source has no more lines for this operation.
    Done,
    /// The user interrupted the operation.
    Interrupted,
}

/// Supplies literal lines to INSERT and EDIT, one at a time.
pub trait LineInput {
    /// Next line to insert at `line_number`.
    fn next_line(&mut self, line_number: usize) -> Input;

    /// Replacement for line `line_number`, whose text is `current`.
    fn edit_line(&mut self, line_number: usize, current: &str) -> Input;

    /// Free-form question (e.g. a file name before saving).
    fn ask(&mut self, _prompt: &str) -> Input {
        Input::Done
    }
}

/// Annotates lines for SPELL.
pub trait Speller {
    /// Annotation for `line`, or `None` when nothing is misspelled.
    fn annotate(&self, line: &str) -> Option<String>;
}

/// Line input with nothing to offer.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInput;

impl LineInput for NoInput {
    fn next_line(&mut self, _line_number: usize) -> Input {
        Input::Done
    }

    fn edit_line(&mut self, _line_number: usize, _current: &str) -> Input {
        Input::Done
    }
}

/// Pre-recorded answers, consumed front to back. Runs dry as `Done`.
#[derive(Debug, Default, Clone)]
pub struct QueuedInput {
    queue: VecDeque<Input>,
}

impl QueuedInput {
    pub fn new<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Input>,
    {
        Self {
            queue: items.into_iter().collect(),
        }
    }

    /// Answers that are all plain lines.
    pub fn lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(lines.into_iter().map(|s| Input::Line(s.into())))
    }

    pub fn push(&mut self, item: Input) {
        self.queue.push_back(item);
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    fn pop(&mut self) -> Input {
        self.queue.pop_front().unwrap_or(Input::Done)
    }
}

impl LineInput for QueuedInput {
    fn next_line(&mut self, _line_number: usize) -> Input {
        self.pop()
    }

    fn edit_line(&mut self, _line_number: usize, _current: &str) -> Input {
        self.pop()
    }

    fn ask(&mut self, _prompt: &str) -> Input {
        self.pop()
    }
}
