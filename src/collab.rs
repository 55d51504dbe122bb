//! Capabilities the dispatcher is wired to: output, persistence, history log,
//! and the optional web/suggestion providers.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::rc::Rc;

use tracing::{debug, info};

/// Accepts rendered text plus its terminator.
pub trait Output {
    fn emit(&mut self, text: &str, end: &str);
}

#[derive(Debug, Default)]
pub struct StdoutOutput;

impl Output for StdoutOutput {
    fn emit(&mut self, text: &str, end: &str) {
        let mut out = io::stdout().lock();
        // A closed stdout is not worth aborting the session over.
        let _ = write!(out, "{text}{end}").and_then(|_| out.flush());
    }
}

/// Collects emitted text, one entry per call. Clones share the buffer.
#[derive(Debug, Default, Clone)]
pub struct CaptureOutput {
    lines: Rc<RefCell<Vec<String>>>,
}

impl CaptureOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.borrow().iter().any(|l| l.contains(needle))
    }
}

impl Output for CaptureOutput {
    fn emit(&mut self, text: &str, _end: &str) {
        self.lines.borrow_mut().push(text.to_string());
    }
}

/// Reads and writes documents as line sequences.
pub trait Store {
    /// Lines of `path`, creating an empty file first when it does not exist.
    fn read_or_create(&mut self, path: &Path) -> io::Result<Vec<String>>;

    fn read(&mut self, path: &Path) -> io::Result<Vec<String>>;

    /// Replace the contents of `path`, terminating every line with `line_break`.
    fn overwrite(&mut self, path: &Path, lines: &[String], line_break: &str) -> io::Result<()>;
}

fn is_binary(bytes: &[u8]) -> bool {
    bytes.iter().any(|&b| b == 0)
}

/// Split file text into lines, accepting `\n` and `\r\n` terminators.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

pub fn join_lines(lines: &[String], line_break: &str) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(line);
        out.push_str(line_break);
    }
    out
}

/// Write through a sibling temp file and rename, so readers never see a torn file.
pub fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "file".to_string());

    let perms = fs::metadata(path).map(|m| m.permissions()).ok();

    let pid = process::id();
    let mut attempt: u64 = 0;
    let tmp_path = loop {
        let candidate = dir.join(format!(".{file_name}.dedlin.tmp.{pid}.{attempt}"));
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(mut f) => {
                f.write_all(content.as_bytes())?;
                f.sync_all()?;
                if let Some(p) = perms.clone() {
                    let _ = fs::set_permissions(&candidate, p);
                }
                break candidate;
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    };

    fs::rename(&tmp_path, path)
}

/// The real file system.
#[derive(Debug, Default)]
pub struct FileStore;

impl Store for FileStore {
    fn read_or_create(&mut self, path: &Path) -> io::Result<Vec<String>> {
        if !path.exists() {
            info!(target: "store", path = %path.display(), "creating new file");
            fs::File::create(path)?;
        }
        self.read(path)
    }

    fn read(&mut self, path: &Path) -> io::Result<Vec<String>> {
        let bytes = fs::read(path)?;
        if is_binary(&bytes) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{}: binary file rejected (NUL byte found)", path.display()),
            ));
        }
        let text = String::from_utf8(bytes).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{}: non-UTF8 file rejected", path.display()),
            )
        })?;
        let lines = split_lines(&text);
        debug!(target: "store", path = %path.display(), lines = lines.len(), "read");
        Ok(lines)
    }

    fn overwrite(&mut self, path: &Path, lines: &[String], line_break: &str) -> io::Result<()> {
        write_atomic(path, &join_lines(lines, line_break))?;
        debug!(target: "store", path = %path.display(), lines = lines.len(), "wrote");
        Ok(())
    }
}

/// In-memory files keyed by path. Clones share storage.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    files: Rc<RefCell<HashMap<PathBuf, Vec<String>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, lines: &[&str]) {
        self.files
            .borrow_mut()
            .insert(path.into(), lines.iter().map(|l| l.to_string()).collect());
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<Vec<String>> {
        self.files.borrow().get(path.as_ref()).cloned()
    }
}

impl Store for MemoryStore {
    fn read_or_create(&mut self, path: &Path) -> io::Result<Vec<String>> {
        Ok(self
            .files
            .borrow_mut()
            .entry(path.to_path_buf())
            .or_default()
            .clone())
    }

    fn read(&mut self, path: &Path) -> io::Result<Vec<String>> {
        self.get(path).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{}: no such file", path.display()))
        })
    }

    fn overwrite(&mut self, path: &Path, lines: &[String], _line_break: &str) -> io::Result<()> {
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), lines.to_vec());
        Ok(())
    }
}

/// Append-only log of executed commands and feedback, in macro syntax.
pub trait HistorySink {
    fn record(&mut self, line: &str) -> io::Result<()>;

    /// Where the log lives, for the final report.
    fn location(&self) -> Option<PathBuf> {
        None
    }
}

#[derive(Debug, Default)]
pub struct NoHistory;

impl HistorySink for NoHistory {
    fn record(&mut self, _line: &str) -> io::Result<()> {
        Ok(())
    }
}

/// Keeps recorded lines in memory. Clones share the buffer.
#[derive(Debug, Default, Clone)]
pub struct MemoryHistory {
    lines: Rc<RefCell<Vec<String>>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }
}

impl HistorySink for MemoryHistory {
    fn record(&mut self, line: &str) -> io::Result<()> {
        self.lines.borrow_mut().push(line.to_string());
        Ok(())
    }
}

/// A fresh `historyN.ed` file in a history directory.
#[derive(Debug)]
pub struct FileHistory {
    path: PathBuf,
    line_break: String,
}

impl FileHistory {
    /// Pick the next free sequential name under `dir`, creating `dir` if needed.
    pub fn create(dir: &Path, line_break: &str) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let existing = fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|x| x == "ed"))
            .count();
        let mut n = existing + 1;
        let mut path = dir.join(format!("history{n}.ed"));
        while path.exists() {
            n += 1;
            path = dir.join(format!("history{n}.ed"));
        }
        info!(target: "store", path = %path.display(), "history log");
        Ok(Self {
            path,
            line_break: line_break.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistorySink for FileHistory {
    fn record(&mut self, line: &str) -> io::Result<()> {
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        write!(f, "{line}{}", self.line_break)
    }

    fn location(&self) -> Option<PathBuf> {
        Some(self.path.clone())
    }
}

/// Turns a web page into document lines for BROWSE.
pub trait PageFetcher {
    fn fetch(&mut self, url: &str) -> io::Result<Vec<String>>;
}

/// Offers help text for a command the parser did not understand.
pub trait Suggester {
    fn suggest(&mut self, text: &str) -> Option<String>;
}
