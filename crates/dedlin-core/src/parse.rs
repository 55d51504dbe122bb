//! Text to [`Command`] conversion.
//!
//! The parser is total: malformed input never errors, it comes back as
//! `UNKNOWN` (raw text preserved) or `EMPTY`. Document position and length are
//! explicit inputs to every call.

use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, trace};

use crate::command::{Command, CommandKind};
use crate::range::{LineRange, Phrases};

/// Commands that take a range (default: whole document) and optional phrases.
const RANGE_COMMANDS: &[(CommandKind, &[&str])] = &[
    (CommandKind::Lorem, &["LOREM"]),
    (CommandKind::Delete, &["D", "DELETE"]),
    (CommandKind::Edit, &["EDIT"]),
    (CommandKind::Insert, &["I", "INSERT"]),
    (CommandKind::List, &["L", "LIST"]),
    (CommandKind::Page, &["P", "PAGE"]),
    (CommandKind::Spell, &["SPELL"]),
    (CommandKind::Search, &["S", "SEARCH"]),
    (CommandKind::Replace, &["R", "REPLACE"]),
    (CommandKind::Exit, &["X", "EXIT"]),
    (CommandKind::Transfer, &["T", "TRANSFER"]),
    (CommandKind::History, &["HISTORY"]),
    (CommandKind::Macro, &["MACRO"]),
    (CommandKind::Browse, &["BROWSE"]),
    (CommandKind::Current, &["CURRENT"]),
    (CommandKind::Shuffle, &["SHUFFLE"]),
    (CommandKind::Sort, &["SORT"]),
    (CommandKind::Reverse, &["REVERSE"]),
    (CommandKind::Print, &["PRINT"]),
    (CommandKind::Indent, &["INDENT"]),
    (CommandKind::Dedent, &["DEDENT"]),
    (CommandKind::Title, &["TITLE"]),
    (CommandKind::SwapCase, &["SWAPCASE"]),
    (CommandKind::CaseFold, &["CASEFOLD"]),
    (CommandKind::Capitalize, &["CAPITALIZE"]),
    (CommandKind::Upper, &["UPPER"]),
    (CommandKind::Lower, &["LOWER"]),
    (CommandKind::ExpandTabs, &["EXPANDTABS"]),
    (CommandKind::Rjust, &["RJUST"]),
    (CommandKind::Ljust, &["LJUST"]),
    (CommandKind::Center, &["CENTER"]),
    (CommandKind::Rstrip, &["RSTRIP"]),
    (CommandKind::Lstrip, &["LSTRIP"]),
    (CommandKind::Strip, &["STRIP"]),
];

/// Commands whose tail is a list of phrases; the range is optional.
const PHRASE_COMMANDS: &[(CommandKind, &[&str])] = &[
    (CommandKind::Copy, &["C", "COPY"]),
    (CommandKind::Move, &["M", "MOVE"]),
    (CommandKind::Search, &["S", "SEARCH"]),
    (CommandKind::Replace, &["R", "REPLACE"]),
    (CommandKind::Help, &["HELP"]),
    (CommandKind::Push, &["PUSH"]),
    (CommandKind::Crash, &["CRASH"]),
    (CommandKind::Export, &["EXPORT"]),
];

/// Commands that accept neither range nor phrases.
const BARE_COMMANDS: &[(CommandKind, &[&str])] = &[
    (CommandKind::History, &["H", "HISTORY"]),
    (CommandKind::Redo, &["REDO"]),
    (CommandKind::Undo, &["UNDO"]),
    (CommandKind::Write, &["W", "WRITE"]),
    (CommandKind::Save, &["SAVE"]),
    (CommandKind::Quit, &["Q", "QUIT"]),
    (CommandKind::Exit, &["E", "EXIT"]),
    (CommandKind::Info, &["INFO"]),
];

fn front_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Range prefix, then the first run of letters.
    RE.get_or_init(|| Regex::new(r"^([^A-Za-z]*)([A-Za-z]+)").expect("static regex"))
}

fn lookup(table: &[(CommandKind, &[&str])], token: &str) -> Option<CommandKind> {
    table
        .iter()
        .find(|(_, forms)| forms.contains(&token))
        .map(|(kind, _)| *kind)
}

/// Parse one line of the command language.
///
/// `headless` disables the interactive-only bare-number shorthand.
pub fn parse(text: &str, current_line: usize, document_length: usize, headless: bool) -> Command {
    let cmd = parse_inner(text, current_line, document_length, headless);
    trace!(target: "parse", input = text, kind = %cmd.kind, "parsed");
    cmd
}

fn parse_inner(text: &str, current_line: usize, document_length: usize, headless: bool) -> Command {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Command::new(CommandKind::Empty).with_original(text);
    }
    if trimmed == "." {
        return Command::new(CommandKind::Noop).with_original(text);
    }
    if trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return parse_bare_number(trimmed, document_length, headless, text);
    }

    let Some(caps) = front_regex().captures(trimmed) else {
        return unknown(text);
    };
    let prefix = caps.get(1).map_or("", |m| m.as_str());
    let token_match = caps.get(2).map_or(0..0, |m| m.range());
    let token = trimmed[token_match.clone()].to_ascii_uppercase();
    // Tail keeps the caller's casing.
    let tail = &trimmed[token_match.end..];

    if let Some(kind) = lookup(RANGE_COMMANDS, &token) {
        if let Some(cmd) = parse_range_command(kind, prefix, tail, current_line, document_length) {
            return cmd.with_original(text);
        }
    }
    if let Some(kind) = lookup(PHRASE_COMMANDS, &token) {
        if let Some(cmd) = parse_phrase_command(kind, prefix, tail, current_line, document_length) {
            return cmd.with_original(text);
        }
    }
    if prefix.is_empty() && tail.trim().is_empty() {
        if let Some(kind) = lookup(BARE_COMMANDS, &token) {
            return Command::new(kind).with_original(text);
        }
    }
    unknown(text)
}

fn unknown(text: &str) -> Command {
    debug!(target: "parse", input = text, "unknown command");
    Command::new(CommandKind::Unknown).with_original(text)
}

fn parse_bare_number(token: &str, document_length: usize, headless: bool, text: &str) -> Command {
    if headless {
        debug!(target: "parse", input = text, "bare line number rejected in headless mode");
        return unknown(text);
    }
    match token.parse::<usize>() {
        Ok(target) if target >= 1 && target <= document_length => {
            Command::new(CommandKind::Edit)
                .with_range(LineRange::line(target.min(document_length)))
                .with_original(text)
        }
        _ => {
            debug!(target: "parse", input = text, document_length, "bare line number outside document");
            unknown(text)
        }
    }
}

fn parse_range_command(
    kind: CommandKind,
    prefix: &str,
    tail: &str,
    current_line: usize,
    document_length: usize,
) -> Option<Command> {
    // INSERT and EDIT always target the cursor, whatever prefix was typed.
    match kind {
        CommandKind::Insert => {
            return Some(literal_command(kind, current_line + 1, tail));
        }
        CommandKind::Edit => {
            return Some(literal_command(kind, current_line, tail));
        }
        _ => {}
    }

    let range = if prefix.trim().is_empty() {
        LineRange::whole(document_length)
    } else {
        extract_range(prefix, current_line, document_length)?
    };
    let mut cmd = Command::new(kind).with_range(range);
    cmd.phrases = extract_phrases(tail);
    Some(cmd)
}

fn literal_command(kind: CommandKind, target: usize, tail: &str) -> Command {
    let cmd = Command::new(kind).with_range(LineRange::line(target));
    let literal = tail.strip_prefix(' ').unwrap_or(tail);
    if literal.is_empty() {
        cmd
    } else {
        cmd.with_phrases(Phrases::new([literal]))
    }
}

fn parse_phrase_command(
    kind: CommandKind,
    prefix: &str,
    tail: &str,
    current_line: usize,
    document_length: usize,
) -> Option<Command> {
    let mut cmd = Command::new(kind);
    if !prefix.trim().is_empty() {
        cmd.line_range = Some(extract_range(prefix, current_line, document_length)?);
    }
    cmd.phrases = extract_phrases(tail);
    Some(cmd)
}

/// Parse `N`, `N,M` or `N,M,R`, where `.` is the current line and `$` the last line.
///
/// Returns `None` (logged) when the text does not form a valid range.
pub fn extract_range(value: &str, current_line: usize, document_length: usize) -> Option<LineRange> {
    let value = value.trim();
    let fields: Vec<&str> = value.split(',').map(str::trim).collect();
    if fields.len() > 3 || fields.iter().any(|f| f.is_empty()) {
        debug!(target: "parse", range = value, "range invalid");
        return None;
    }

    let field = |s: &str| -> Option<usize> {
        match s {
            "." => Some(current_line),
            "$" => Some(document_length.max(1)),
            digits => digits.parse().ok(),
        }
    };

    let start = field(fields[0]);
    let mut end = match fields.get(1) {
        Some(f) => field(f),
        None => start,
    };
    let repeat = match fields.get(2) {
        Some(f) => f.parse::<usize>().ok(),
        None => Some(1),
    };

    // 1,0 is an old way of spelling "the whole document".
    if fields.len() > 1 && start == Some(1) && end == Some(0) {
        end = Some(document_length.max(1));
    }

    let (Some(start), Some(end), Some(repeat)) = (start, end, repeat) else {
        debug!(target: "parse", range = value, "range invalid");
        return None;
    };
    let candidate = LineRange::span(start, end)?.with_repeat(repeat);
    if !candidate.validate() {
        debug!(target: "parse", range = value, "range candidate invalid");
        return None;
    }
    Some(candidate)
}

/// Split the tail of a command into phrases.
///
/// Double quotes group words; `\"` inside quotes is a literal quote. Without
/// quotes the tail is split on whitespace.
pub fn extract_phrases(value: &str) -> Option<Phrases> {
    if value.trim().is_empty() {
        return None;
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut chars = value.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' if in_quotes => {
                in_quotes = false;
                parts.push(std::mem::take(&mut current));
                quoted = false;
            }
            '"' => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
                in_quotes = true;
                quoted = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    // Unterminated quote keeps what was collected.
    if !current.is_empty() || quoted {
        parts.push(current);
    }

    if parts.is_empty() {
        None
    } else {
        Some(Phrases { parts })
    }
}

/// Parse every line of a macro script. Headless rules apply.
pub fn parse_script(script: &str) -> Vec<Command> {
    script
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .map(|l| parse(l, 1, 0, true))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(text: &str, current: usize, len: usize) -> Command {
        parse(text, current, len, false)
    }

    #[test]
    fn bare_number_edits_line() {
        let c = p("5", 1, 10);
        assert_eq!(c.kind, CommandKind::Edit);
        assert_eq!(c.line_range, Some(LineRange::new(5, 0)));
    }

    #[test]
    fn bare_number_rejections() {
        assert_eq!(parse("5", 1, 10, true).kind, CommandKind::Unknown);
        assert_eq!(p("1", 1, 0).kind, CommandKind::Unknown);
        assert_eq!(p("11", 1, 10).kind, CommandKind::Unknown);
        assert_eq!(p("0", 1, 10).kind, CommandKind::Unknown);
    }

    #[test]
    fn delete_range_forms() {
        for text in ["2,4D", "2,4 D", "2,4 delete", "2,4DELETE", " 2 , 4 d"] {
            let c = p(text, 1, 10);
            assert_eq!(c.kind, CommandKind::Delete, "{text}");
            assert_eq!(c.line_range, Some(LineRange::new(2, 2)), "{text}");
        }
        let c = p("1d", 1, 3);
        assert_eq!(c.line_range, Some(LineRange::line(1)));
    }

    #[test]
    fn range_defaults_to_whole_document() {
        assert_eq!(p("D", 1, 3).line_range, Some(LineRange::new(1, 2)));
        assert_eq!(p("list", 1, 0).line_range, Some(LineRange::new(1, 0)));
    }

    #[test]
    fn replace_whole_document() {
        let c = p("REPLACE cat dog", 1, 7);
        assert_eq!(c.kind, CommandKind::Replace);
        assert_eq!(c.line_range, Some(LineRange::whole(7)));
        assert_eq!(c.phrases, Some(Phrases::new(["cat", "dog"])));
    }

    #[test]
    fn tail_keeps_case() {
        let c = p("s Cat", 1, 3);
        assert_eq!(c.kind, CommandKind::Search);
        assert_eq!(c.first_phrase(), Some("Cat"));
    }

    #[test]
    fn empty_and_comments() {
        assert_eq!(p("", 1, 3).kind, CommandKind::Empty);
        assert_eq!(p("   ", 1, 3).kind, CommandKind::Empty);
        let c = p("# hi", 1, 3);
        assert_eq!(c.kind, CommandKind::Empty);
        assert_eq!(c.original_text.as_deref(), Some("# hi"));
        assert_eq!(p("   #  hi ", 1, 3).format(), "   #  hi ");
    }

    #[test]
    fn dot_is_noop() {
        assert_eq!(p(".", 1, 3).kind, CommandKind::Noop);
    }

    #[test]
    fn symbolic_range_fields() {
        assert_eq!(p(".,$L", 2, 9).line_range, Some(LineRange::new(2, 7)));
        assert_eq!(p("$D", 2, 9).line_range, Some(LineRange::line(9)));
        assert_eq!(p("$D", 1, 0).line_range, Some(LineRange::line(1)));
    }

    #[test]
    fn repeat_field() {
        let c = p("1,2,3 copy 5", 1, 9);
        assert_eq!(c.kind, CommandKind::Copy);
        assert_eq!(c.line_range, Some(LineRange::new(1, 1).with_repeat(3)));
        assert_eq!(c.first_phrase(), Some("5"));
    }

    #[test]
    fn legacy_one_zero_is_whole_document() {
        assert_eq!(p("1,0L", 1, 6).line_range, Some(LineRange::new(1, 5)));
    }

    #[test]
    fn backwards_range_is_unknown() {
        assert_eq!(p("4,2D", 1, 9).kind, CommandKind::Unknown);
        assert_eq!(p("?,2D", 1, 9).kind, CommandKind::Unknown);
    }

    #[test]
    fn insert_targets_after_cursor() {
        for text in ["I", "insert", "2I", "7 INSERT"] {
            let c = p(text, 3, 9);
            assert_eq!(c.kind, CommandKind::Insert, "{text}");
            assert_eq!(c.line_range, Some(LineRange::line(4)), "{text}");
            assert_eq!(c.phrases, None, "{text}");
        }
    }

    #[test]
    fn insert_tail_is_one_literal() {
        let c = p("3INSERT hello \"big\" world", 1, 3);
        assert_eq!(c.phrases, Some(Phrases::new(["hello \"big\" world"])));
    }

    #[test]
    fn edit_targets_cursor() {
        let c = p("9 edit new text", 2, 9);
        assert_eq!(c.kind, CommandKind::Edit);
        assert_eq!(c.line_range, Some(LineRange::line(2)));
        assert_eq!(c.first_phrase(), Some("new text"));
    }

    #[test]
    fn copy_and_move_with_targets() {
        let c = p("2,3 copy 1", 1, 5);
        assert_eq!(c.kind, CommandKind::Copy);
        assert_eq!(c.line_range, Some(LineRange::new(2, 1)));
        let m = p("2,3 move 1", 1, 5);
        assert_eq!(m.kind, CommandKind::Move);
        assert_eq!(m.first_phrase(), Some("1"));
        assert_eq!(p("M 1", 1, 5).line_range, None);
    }

    #[test]
    fn string_transforms_with_and_without_space() {
        assert_eq!(p("1,2 upper", 1, 20).kind, CommandKind::Upper);
        assert_eq!(p("1,2upper", 1, 20).kind, CommandKind::Upper);
        let c = p("center 40", 1, 20);
        assert_eq!(c.kind, CommandKind::Center);
        assert_eq!(c.first_phrase(), Some("40"));
    }

    #[test]
    fn bare_commands() {
        assert_eq!(p("undo", 1, 3).kind, CommandKind::Undo);
        assert_eq!(p("Q", 1, 3).kind, CommandKind::Quit);
        assert_eq!(p("E", 1, 3).kind, CommandKind::Exit);
        assert_eq!(p("H", 1, 3).kind, CommandKind::History);
        assert_eq!(p("redo", 1, 3).kind, CommandKind::Redo);
        assert_eq!(p("info", 1, 3).kind, CommandKind::Info);
        assert_eq!(p("q now", 1, 3).kind, CommandKind::Unknown);
        assert_eq!(p("2 undo", 1, 3).kind, CommandKind::Unknown);
    }

    #[test]
    fn exit_takes_file_name() {
        let c = p("EXIT out.txt", 1, 3);
        assert_eq!(c.kind, CommandKind::Exit);
        assert_eq!(c.first_phrase(), Some("out.txt"));
    }

    #[test]
    fn unknown_keeps_text() {
        let c = p("frobnicate", 1, 3);
        assert_eq!(c.kind, CommandKind::Unknown);
        assert_eq!(c.original_text.as_deref(), Some("frobnicate"));
        assert_eq!(p("1,2", 1, 3).kind, CommandKind::Unknown);
    }

    #[test]
    fn phrases_space_delimited() {
        assert_eq!(extract_phrases("cat dog"), Some(Phrases::new(["cat", "dog"])));
        assert_eq!(extract_phrases("cat"), Some(Phrases::new(["cat"])));
        assert_eq!(extract_phrases("  "), None);
    }

    #[test]
    fn phrases_quoted() {
        assert_eq!(
            extract_phrases("\"cat frog\" \"log dog\""),
            Some(Phrases::new(["cat frog", "log dog"]))
        );
        assert_eq!(
            extract_phrases(r#""say \"hi\"" there"#),
            Some(Phrases::new(["say \"hi\"", "there"]))
        );
        assert_eq!(extract_phrases("cat \"\""), Some(Phrases::new(["cat", ""])));
    }

    #[test]
    fn phrases_many_parts() {
        let p = extract_phrases("a b c d e f g h i j k").unwrap();
        assert_eq!(p.len(), 11);
        assert_eq!(p.tenth(), Some("j"));
    }

    #[test]
    fn extract_range_directly() {
        assert_eq!(extract_range("1", 1, 1), Some(LineRange::new(1, 0)));
        assert_eq!(extract_range("2,2", 1, 2), Some(LineRange::new(2, 0)));
        assert_eq!(extract_range("1,2", 1, 2), Some(LineRange::new(1, 1)));
        assert_eq!(extract_range(".", 0, 2), None);
        assert_eq!(extract_range("1,2,3,4", 1, 9), None);
    }

    #[test]
    fn script_lines_are_headless() {
        let cmds = parse_script("1,2D\n3\n# note\r\nLIST");
        let kinds: Vec<_> = cmds.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![CommandKind::Delete, CommandKind::Unknown, CommandKind::Empty, CommandKind::List]
        );
    }
}
