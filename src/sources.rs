//! Where commands and literal lines come from.

use std::collections::VecDeque;
use std::io::{self, Write};

use dedlin_core::{Input, LineInput};
use tracing::debug;

/// Pulls raw command text, one line at a time.
pub trait CommandSource {
    fn next_command(&mut self, prompt: &str) -> Input;
}

/// A fixed script of commands, such as a macro file.
#[derive(Debug, Default, Clone)]
pub struct ScriptSource {
    lines: VecDeque<String>,
}

impl ScriptSource {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_script(script: &str) -> Self {
        Self::new(script.lines())
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl CommandSource for ScriptSource {
    fn next_command(&mut self, _prompt: &str) -> Input {
        match self.lines.pop_front() {
            Some(line) => Input::Line(line),
            None => Input::Done,
        }
    }
}

/// Terminal input on stdin. Several consoles may coexist; each read takes the
/// stdin lock only for one line.
///
/// End of input (Ctrl-D) ends INSERT or EDIT the same way a lone `.` does.
/// SIGINT is left to the terminal: no handler is installed, so Ctrl-C ends the
/// process. [`Input::Interrupted`] is only produced when a read is cut short
/// with [`io::ErrorKind::Interrupted`].
#[derive(Debug, Clone)]
pub struct Console {
    show_prompts: bool,
}

impl Console {
    /// Prompting console for interactive sessions.
    pub fn interactive() -> Self {
        Self { show_prompts: true }
    }

    /// Reads stdin without prompting, for piped headless sessions.
    pub fn piped() -> Self {
        Self {
            show_prompts: false,
        }
    }

    fn prompt(&self, text: &str) {
        if self.show_prompts {
            let mut out = io::stdout().lock();
            let _ = write!(out, "{text}").and_then(|_| out.flush());
        }
    }

    fn read(&self) -> Input {
        let mut buf = String::new();
        match io::stdin().read_line(&mut buf) {
            Ok(0) => Input::Done,
            Ok(_) => {
                let trimmed = buf.trim_end_matches(['\n', '\r']).len();
                buf.truncate(trimmed);
                Input::Line(buf)
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Input::Interrupted,
            Err(e) => {
                debug!(target: "editor", error = %e, "stdin read failed");
                Input::Done
            }
        }
    }
}

impl CommandSource for Console {
    fn next_command(&mut self, prompt: &str) -> Input {
        self.prompt(prompt);
        self.read()
    }
}

impl LineInput for Console {
    /// A lone `.` ends insert mode, as in ed.
    fn next_line(&mut self, line_number: usize) -> Input {
        self.prompt(&format!("   {line_number} : "));
        match self.read() {
            Input::Line(l) if l == "." => Input::Done,
            other => other,
        }
    }

    /// Shows the current text; an empty answer keeps it, a lone `.` stops editing.
    fn edit_line(&mut self, line_number: usize, current: &str) -> Input {
        if self.show_prompts {
            println!("   {line_number} : {current}");
        }
        self.prompt(&format!("   {line_number} : "));
        match self.read() {
            Input::Line(l) if l == "." => Input::Done,
            Input::Line(l) if l.is_empty() => Input::Line(current.to_string()),
            other => other,
        }
    }

    fn ask(&mut self, prompt: &str) -> Input {
        self.prompt(prompt);
        self.read()
    }
}
