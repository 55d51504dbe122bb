use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use regex::{NoExpand, RegexBuilder};
use tracing::{debug, info};

use crate::input::{Input, LineInput, Speller};
use crate::lorem::LOREM_IPSUM;
use crate::range::{LineRange, Phrases};
use crate::strings::{self, Transform};
use crate::EditError;

/// Upper bound on the lines a single COPY may add.
pub const MAX_COPY_LINES: usize = 1_000_000;

/// Outcome of one [`Document::edit`] round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditStatus {
    /// There is a following line the caller may edit next.
    pub can_continue: bool,
    pub line_edited: bool,
    pub text: Option<String>,
}

/// Summary counts reported by INFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentInfo {
    pub lines: usize,
    pub current_line: usize,
    pub dirty: bool,
    pub words: usize,
    pub chars: usize,
}

impl fmt::Display for DocumentInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} lines, {} words, {} characters, current line {}{}",
            self.lines,
            self.words,
            self.chars,
            self.current_line,
            if self.dirty { ", modified" } else { "" }
        )
    }
}

/// In-memory line buffer with a cursor, a dirty flag and one undo snapshot.
///
/// Every mutating operation takes a snapshot first, so [`Document::undo`]
/// always restores the state before the most recent change.
#[derive(Debug, Clone, Default)]
pub struct Document {
    lines: Vec<String>,
    current_line: usize,
    dirty: bool,
    previous_lines: Vec<String>,
    previous_current_line: usize,
}

fn numbered(line_number: usize, text: &str) -> String {
    format!("   {line_number} : {text}")
}

/// Strip a trailing line terminator handed back by an input collaborator.
fn clean_line(mut text: String) -> String {
    while text.ends_with(['\n', '\r']) {
        text.pop();
    }
    text
}

impl Document {
    pub fn new(lines: Vec<String>) -> Self {
        let previous_lines = lines.clone();
        Self {
            lines,
            current_line: 1,
            dirty: false,
            previous_lines,
            previous_current_line: 1,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn current_line(&self) -> usize {
        self.current_line
    }

    /// Move the cursor, clamped into the document.
    pub fn set_current_line(&mut self, line: usize) {
        self.current_line = line.clamp(1, self.lines.len().max(1));
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Call after the buffer has been persisted.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn backup(&mut self) {
        self.previous_lines = self.lines.clone();
        self.previous_current_line = self.current_line;
    }

    fn touched(&mut self) {
        self.dirty = true;
        self.clamp_cursor();
    }

    fn clamp_cursor(&mut self) {
        self.current_line = if self.lines.is_empty() {
            self.current_line.min(1)
        } else {
            self.current_line.clamp(1, self.lines.len())
        };
    }

    fn range_or_whole(&self, range: Option<LineRange>) -> LineRange {
        match range {
            Some(r) if r.start >= 1 => r,
            _ => LineRange::whole(self.lines.len()),
        }
    }

    /// Numbered lines of `range`, or the whole document. Lines past the end are skipped.
    pub fn list(&self, range: Option<LineRange>) -> Vec<String> {
        let range = self.range_or_whole(range);
        let slice = range.clamp_slice(self.lines.len());
        let first = slice.start + 1;
        self.lines[slice]
            .iter()
            .enumerate()
            .map(|(i, l)| numbered(first + i, l))
            .collect()
    }

    /// Raw text of `range`, without numbering.
    pub fn print(&self, range: Option<LineRange>) -> Vec<String> {
        let range = self.range_or_whole(range);
        self.lines[range.clamp_slice(self.lines.len())].to_vec()
    }

    /// Show `page_size` lines from the cursor and advance it.
    pub fn page(&mut self, page_size: usize) -> Vec<String> {
        if self.lines.is_empty() {
            return Vec::new();
        }
        let from = self.current_line.clamp(1, self.lines.len());
        let range = LineRange::new(from, page_size.max(1) - 1);
        let shown = self.list(Some(range));
        let last = (from + shown.len()).saturating_sub(1);
        self.current_line = (last + 1).min(self.lines.len());
        shown
    }

    /// Numbered lines of `range` containing `value`.
    pub fn search(&self, range: Option<LineRange>, value: &str, case_sensitive: bool) -> Vec<String> {
        let range = self.range_or_whole(range);
        let slice = range.clamp_slice(self.lines.len());
        let first = slice.start + 1;
        let needle = if case_sensitive {
            value.to_string()
        } else {
            value.to_uppercase()
        };
        self.lines[slice]
            .iter()
            .enumerate()
            .filter(|(_, l)| {
                if case_sensitive {
                    l.contains(&needle)
                } else {
                    l.to_uppercase().contains(&needle)
                }
            })
            .map(|(i, l)| numbered(first + i, l))
            .collect()
    }

    /// Annotations for the lines of `range` that `speller` objects to.
    pub fn spell(&self, range: Option<LineRange>, speller: &dyn Speller) -> Vec<String> {
        let range = self.range_or_whole(range);
        let slice = range.clamp_slice(self.lines.len());
        let first = slice.start + 1;
        self.lines[slice]
            .iter()
            .enumerate()
            .filter_map(|(i, l)| speller.annotate(l).map(|a| numbered(first + i, &a)))
            .collect()
    }

    /// Substring replace over `range`. Returns the changed lines, numbered.
    pub fn replace(
        &mut self,
        range: Option<LineRange>,
        target: &str,
        replacement: &str,
        case_sensitive: bool,
    ) -> Vec<String> {
        if target.is_empty() {
            return Vec::new();
        }
        let range = self.range_or_whole(range);
        let slice = range.clamp_slice(self.lines.len());
        let re = match RegexBuilder::new(&regex::escape(target))
            .case_insensitive(!case_sensitive)
            .build()
        {
            Ok(re) => re,
            Err(err) => {
                debug!(target: "document", %err, "replace pattern rejected");
                return Vec::new();
            }
        };
        if !self.lines[slice.clone()].iter().any(|l| re.is_match(l)) {
            return Vec::new();
        }

        self.backup();
        let mut changed = Vec::new();
        for idx in slice {
            if !re.is_match(&self.lines[idx]) {
                continue;
            }
            let new = re.replace_all(&self.lines[idx], NoExpand(replacement)).into_owned();
            changed.push(numbered(idx + 1, &new));
            self.lines[idx] = new;
            self.current_line = idx + 1;
        }
        self.touched();
        debug!(target: "document", count = changed.len(), "replaced");
        changed
    }

    /// Overwrite the lines of `range` in place with `parts`, one per line.
    ///
    /// Stops at the end of `parts`, the end of the range, or the end of the
    /// document, whichever comes first. Returns the number of lines written.
    pub fn spread(&mut self, range: LineRange, parts: &[String]) -> usize {
        let slice = range.clamp_slice(self.lines.len());
        let count = slice.len().min(parts.len());
        if count == 0 {
            return 0;
        }
        self.backup();
        for (offset, part) in parts.iter().take(count).enumerate() {
            self.lines[slice.start + offset] = clean_line(part.clone());
        }
        self.current_line = slice.start + count;
        self.touched();
        count
    }

    /// Duplicate `range` before line `target` (`len + 1` appends).
    ///
    /// A range repeat greater than one splices that many copies. At most
    /// [`MAX_COPY_LINES`] lines are added by one call.
    pub fn copy(&mut self, range: Option<LineRange>, target: usize) -> Result<(), EditError> {
        let range = self.range_or_whole(range);
        let len = self.lines.len();
        if range.end() > len {
            return Err(EditError::RangeMismatch { range, len });
        }
        if target == 0 || target > len + 1 {
            return Err(EditError::OutOfBounds { line: target, len });
        }
        let block = self.lines[range.to_slice()].to_vec();
        let times = range.repeat.max(1);
        match times.checked_mul(block.len()) {
            Some(total) if total <= MAX_COPY_LINES => {}
            _ => {
                return Err(EditError::InvalidArgument(format!(
                    "copy of {range} would add more than {MAX_COPY_LINES} lines"
                )))
            }
        }

        self.backup();
        let at = target - 1;
        let copies: Vec<String> = std::iter::repeat(block).take(times).flatten().collect();
        self.lines.splice(at..at, copies);
        self.current_line = target;
        self.touched();
        debug!(target: "document", %range, target, "copied");
        Ok(())
    }

    /// Relocate `range` to sit before line `target`.
    ///
    /// `target` strictly inside the range is an error. Targets equal to the
    /// range's first or last line leave the document unchanged.
    pub fn move_range(&mut self, range: LineRange, target: usize) -> Result<(), EditError> {
        let len = self.lines.len();
        if range.start < target && target < range.end() {
            return Err(EditError::MoveIntoRange {
                start: range.start,
                end: range.end(),
                target,
            });
        }
        if target == 0 || target > len + 1 {
            return Err(EditError::OutOfBounds { line: target, len });
        }
        let slice = range.clamp_slice(len);
        if range.start == 0 || slice.len() != range.count() {
            return Err(EditError::RangeMismatch { range, len });
        }

        self.backup();
        let block: Vec<String> = self.lines.drain(slice).collect();
        let at = if target <= range.start {
            target - 1
        } else if target == range.end() {
            range.start - 1
        } else {
            target - 1 - range.count()
        };
        self.lines.splice(at..at, block);
        self.current_line = at + 1;
        self.touched();
        debug!(target: "document", %range, target, "moved");
        Ok(())
    }

    /// Remove `range` (whole document when absent). False when nothing was removed.
    pub fn delete(&mut self, range: Option<LineRange>) -> bool {
        if self.lines.is_empty() {
            info!(target: "document", "delete on empty document ignored");
            return false;
        }
        let range = self.range_or_whole(range);
        let slice = range.clamp_slice(self.lines.len());
        if slice.is_empty() {
            debug!(target: "document", %range, "delete range past end of document");
            return false;
        }

        self.backup();
        self.lines.drain(slice);
        self.current_line = range.start.saturating_sub(1).max(1).min(self.lines.len());
        self.dirty = true;
        debug!(target: "document", %range, "deleted");
        true
    }

    /// Insert `range.count()` copies of `value` before `range.start`.
    pub fn fill(&mut self, range: LineRange, value: &str) {
        let at = range.start.clamp(1, self.lines.len() + 1) - 1;
        let count = range.count();
        self.backup();
        self.lines
            .splice(at..at, std::iter::repeat(value.to_string()).take(count));
        self.current_line = at + count;
        self.touched();
    }

    /// Replace line `line` with one answer from `input`.
    pub fn edit(&mut self, line: usize, input: &mut dyn LineInput) -> Result<EditStatus, EditError> {
        let len = self.lines.len();
        if line == 0 || line > len {
            return Err(EditError::OutOfBounds { line, len });
        }
        match input.edit_line(line, &self.lines[line - 1]) {
            Input::Line(text) => {
                let text = clean_line(text);
                self.backup();
                self.lines[line - 1] = text.clone();
                self.current_line = line;
                self.touched();
                debug!(target: "document", line, "edited");
                Ok(EditStatus {
                    can_continue: line < len,
                    line_edited: true,
                    text: Some(text),
                })
            }
            Input::Done | Input::Interrupted => Ok(EditStatus {
                can_continue: false,
                line_edited: false,
                text: None,
            }),
        }
    }

    /// Insert before `target`: the literal `phrases` if given, otherwise lines
    /// pulled from `input` until it is done.
    ///
    /// `target` is clamped to `1..=len + 1`. Returns the inserted lines.
    pub fn insert(
        &mut self,
        target: Option<usize>,
        phrases: Option<&Phrases>,
        input: &mut dyn LineInput,
    ) -> Vec<String> {
        let mut line_number = target.unwrap_or(1).clamp(1, self.lines.len() + 1);

        if let Some(phrases) = phrases {
            return self.push(line_number, phrases.as_slice());
        }

        let mut inserted = Vec::new();
        loop {
            let text = match input.next_line(line_number) {
                Input::Line(text) => clean_line(text),
                Input::Done | Input::Interrupted => break,
            };
            if inserted.is_empty() {
                self.backup();
            }
            self.lines.insert(line_number - 1, text.clone());
            self.current_line = line_number;
            inserted.push(text);
            line_number += 1;
        }
        if !inserted.is_empty() {
            self.touched();
            debug!(target: "document", count = inserted.len(), "inserted");
        }
        inserted
    }

    /// Insert `lines` before `target` without asking for input.
    pub fn push(&mut self, target: usize, lines: &[String]) -> Vec<String> {
        if lines.is_empty() {
            return Vec::new();
        }
        let at = target.clamp(1, self.lines.len() + 1) - 1;
        let block: Vec<String> = lines.iter().cloned().map(clean_line).collect();
        self.backup();
        self.lines.splice(at..at, block.iter().cloned());
        self.current_line = at + block.len();
        self.touched();
        block
    }

    /// Append filler text: `range.start` lines, or the whole corpus.
    pub fn lorem(&mut self, range: Option<LineRange>) -> usize {
        let count = match range {
            Some(r) if r.start > 0 => r.start.min(LOREM_IPSUM.len()),
            _ => LOREM_IPSUM.len(),
        };
        self.backup();
        self.lines
            .extend(LOREM_IPSUM.iter().take(count).map(|l| l.to_string()));
        self.touched();
        debug!(target: "document", count, "generated lorem");
        count
    }

    /// Swap the lines with the snapshot taken before the last change.
    ///
    /// The cursor is not restored from the snapshot; it is only clamped into
    /// the restored lines.
    pub fn undo(&mut self) {
        std::mem::swap(&mut self.lines, &mut self.previous_lines);
        self.previous_current_line = self.current_line;
        self.touched();
        debug!(target: "document", "undid last step");
    }

    pub fn sort(&mut self) {
        self.backup();
        self.lines.sort();
        self.touched();
    }

    pub fn reverse(&mut self) {
        self.backup();
        self.lines.reverse();
        self.touched();
    }

    pub fn shuffle(&mut self) {
        self.shuffle_with(&mut rand::thread_rng());
    }

    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.backup();
        self.lines.shuffle(rng);
        self.touched();
    }

    /// Apply a per-line string transform over `range`. Returns lines changed.
    pub fn transform(&mut self, range: Option<LineRange>, transform: Transform) -> usize {
        let slice = self.range_or_whole(range).clamp_slice(self.lines.len());
        let updated: Vec<String> = self.lines[slice.clone()]
            .iter()
            .map(|l| transform.apply(l))
            .collect();
        self.replace_block(slice, updated)
    }

    pub fn indent(&mut self, range: Option<LineRange>, prefix: &str) -> usize {
        let slice = self.range_or_whole(range).clamp_slice(self.lines.len());
        let updated = strings::indent(&self.lines[slice.clone()], prefix);
        self.replace_block(slice, updated)
    }

    pub fn dedent(&mut self, range: Option<LineRange>) -> usize {
        let slice = self.range_or_whole(range).clamp_slice(self.lines.len());
        let updated = strings::dedent(&self.lines[slice.clone()]);
        self.replace_block(slice, updated)
    }

    fn replace_block(&mut self, slice: std::ops::Range<usize>, updated: Vec<String>) -> usize {
        let changed = self.lines[slice.clone()]
            .iter()
            .zip(&updated)
            .filter(|(old, new)| old != new)
            .count();
        if changed == 0 {
            return 0;
        }
        self.backup();
        self.lines.splice(slice, updated);
        self.touched();
        changed
    }

    pub fn info(&self) -> DocumentInfo {
        DocumentInfo {
            lines: self.lines.len(),
            current_line: self.current_line,
            dirty: self.dirty,
            words: self.lines.iter().map(|l| l.split_whitespace().count()).sum(),
            chars: self.lines.iter().map(|l| l.chars().count()).sum(),
        }
    }
}
