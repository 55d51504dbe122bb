use std::fmt;
use std::ops::Range;

use tracing::warn;

/// A 1-based, inclusive span of lines: `start ..= start + offset`.
///
/// Construction does not validate. Call [`LineRange::validate`] before applying a
/// range to a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineRange {
    pub start: usize,
    pub offset: usize,
    /// Iteration count for commands that repeat (COPY).
    pub repeat: usize,
}

impl LineRange {
    pub const fn new(start: usize, offset: usize) -> Self {
        Self {
            start,
            offset,
            repeat: 1,
        }
    }

    /// A single-line range.
    pub const fn line(line: usize) -> Self {
        Self::new(line, 0)
    }

    /// Range from inclusive `start` and `end`. `None` when `end < start`.
    pub fn span(start: usize, end: usize) -> Option<Self> {
        end.checked_sub(start).map(|offset| Self::new(start, offset))
    }

    /// Every line of a document of `len` lines (`1..=1` when empty).
    pub fn whole(len: usize) -> Self {
        Self::new(1, len.saturating_sub(1))
    }

    pub const fn with_repeat(mut self, repeat: usize) -> Self {
        self.repeat = repeat;
        self
    }

    pub const fn end(&self) -> usize {
        self.start + self.offset
    }

    pub const fn count(&self) -> usize {
        self.end() - self.start + 1
    }

    pub fn validate(&self) -> bool {
        let ok = self.start >= 1 && self.start <= self.end();
        if !ok {
            warn!(target: "range", range = ?self, "invalid line range");
        }
        ok
    }

    /// Zero-based half-open index span.
    pub fn to_slice(&self) -> Range<usize> {
        self.start.saturating_sub(1)..self.end()
    }

    /// Index span clamped to a sequence of `len` elements.
    pub fn clamp_slice(&self, len: usize) -> Range<usize> {
        let r = self.to_slice();
        r.start.min(len)..r.end.min(len)
    }

    pub fn format(&self) -> String {
        let mut out = if self.offset == 0 && self.repeat == 1 {
            self.start.to_string()
        } else {
            format!("{},{}", self.start, self.end())
        };
        if self.repeat != 1 {
            out.push_str(&format!(",{}", self.repeat));
        }
        out
    }
}

impl fmt::Display for LineRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

/// Ordered textual arguments of a command (search text, replacement, file name...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Phrases {
    pub parts: Vec<String>,
}

impl Phrases {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.parts.get(index).map(String::as_str)
    }

    pub fn first(&self) -> Option<&str> {
        self.get(0)
    }
    pub fn second(&self) -> Option<&str> {
        self.get(1)
    }
    pub fn third(&self) -> Option<&str> {
        self.get(2)
    }
    pub fn fourth(&self) -> Option<&str> {
        self.get(3)
    }
    pub fn fifth(&self) -> Option<&str> {
        self.get(4)
    }
    pub fn sixth(&self) -> Option<&str> {
        self.get(5)
    }
    pub fn seventh(&self) -> Option<&str> {
        self.get(6)
    }
    pub fn eighth(&self) -> Option<&str> {
        self.get(7)
    }
    pub fn ninth(&self) -> Option<&str> {
        self.get(8)
    }
    pub fn tenth(&self) -> Option<&str> {
        self.get(9)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.parts
    }

    /// Phrases end up as document lines, so none may carry a line terminator.
    pub fn validate(&self) -> bool {
        let ok = !self.parts.iter().any(|p| p.contains(['\n', '\r']));
        if !ok {
            warn!(target: "range", "phrase contains a line terminator");
        }
        ok
    }

    /// Round-trippable form. Rendering stops at the first empty part.
    pub fn format(&self) -> String {
        self.parts
            .iter()
            .take_while(|p| !p.is_empty())
            .map(|p| quote(p))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn quote(value: &str) -> String {
    if !value.contains(|c: char| c.is_whitespace() || c == '"') {
        return value.to_string();
    }
    format!("\"{}\"", value.replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_count_and_slice() {
        let r = LineRange::new(2, 3);
        assert_eq!(r.end(), 5);
        assert_eq!(r.count(), 4);
        assert_eq!(r.to_slice(), 1..5);
        let v = ["a", "b", "c", "d", "e", "f"];
        assert_eq!(v[r.to_slice()].len(), r.count());
    }

    #[test]
    fn span_rejects_backwards() {
        assert_eq!(LineRange::span(3, 5), Some(LineRange::new(3, 2)));
        assert_eq!(LineRange::span(5, 3), None);
    }

    #[test]
    fn zero_start_is_invalid() {
        assert!(!LineRange::line(0).validate());
        assert!(LineRange::line(1).validate());
        assert!(LineRange::new(1, 4).with_repeat(0).validate());
    }

    #[test]
    fn whole_document() {
        assert_eq!(LineRange::whole(0), LineRange::new(1, 0));
        assert_eq!(LineRange::whole(7), LineRange::new(1, 6));
    }

    #[test]
    fn format_forms() {
        assert_eq!(LineRange::line(4).format(), "4");
        assert_eq!(LineRange::new(2, 2).format(), "2,4");
        assert_eq!(LineRange::new(2, 2).with_repeat(3).format(), "2,4,3");
        assert_eq!(LineRange::line(2).with_repeat(0).format(), "2,2,0");
    }

    #[test]
    fn clamp_slice_stays_in_bounds() {
        assert_eq!(LineRange::new(2, 20).clamp_slice(4), 1..4);
        assert_eq!(LineRange::new(9, 1).clamp_slice(4), 4..4);
    }

    #[test]
    fn positional_accessors() {
        let p = Phrases::new(["a", "b", "c"]);
        assert_eq!(p.first(), Some("a"));
        assert_eq!(p.third(), Some("c"));
        assert_eq!(p.fourth(), None);
        assert_eq!(p.tenth(), None);
    }

    #[test]
    fn phrases_format_quotes_spaces() {
        assert_eq!(Phrases::new(["cat frog", "log dog"]).format(), "\"cat frog\" \"log dog\"");
        assert_eq!(Phrases::new(["cat", "log"]).format(), "cat log");
        assert_eq!(Phrases::new(["say \"hi\" now"]).format(), r#""say \"hi\" now""#);
        assert_eq!(Phrases::new(["a\tb", "c"]).format(), "\"a\tb\" c");
    }

    #[test]
    fn phrases_format_truncates_at_empty() {
        assert_eq!(Phrases::new(["a", "", "c"]).format(), "a");
    }

    #[test]
    fn phrases_reject_line_terminators() {
        assert!(Phrases::new(["ok"]).validate());
        assert!(!Phrases::new(["bad\nline"]).validate());
    }
}
