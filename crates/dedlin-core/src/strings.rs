//! Per-line and block string transforms (UPPER, CENTER, INDENT, ...).

use crate::command::CommandKind;
use crate::EditError;

const DEFAULT_TAB_SIZE: usize = 8;

/// Largest width accepted by EXPANDTABS, RJUST, LJUST and CENTER.
pub const MAX_WIDTH: usize = 10_000;

/// A string operation applied to each line of a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    Title,
    SwapCase,
    CaseFold,
    Capitalize,
    Upper,
    Lower,
    ExpandTabs(usize),
    Rjust(usize),
    Ljust(usize),
    Center(usize),
    Rstrip,
    Lstrip,
    Strip,
}

impl Transform {
    /// Build the transform for `kind`, reading a width from `arg` where one is needed.
    pub fn from_command(kind: CommandKind, arg: Option<&str>) -> Result<Self, EditError> {
        let width = |required: bool| -> Result<Option<usize>, EditError> {
            match arg {
                Some(a) => match a.trim().parse::<usize>() {
                    Ok(w) if w <= MAX_WIDTH => Ok(Some(w)),
                    Ok(w) => Err(EditError::InvalidArgument(format!(
                        "{kind} width {w} is larger than {MAX_WIDTH}"
                    ))),
                    Err(_) => Err(EditError::InvalidArgument(format!(
                        "{kind} needs a numeric width, got {a:?}"
                    ))),
                },
                None if required => Err(EditError::InvalidArgument(format!("{kind} needs a width"))),
                None => Ok(None),
            }
        };
        Ok(match kind {
            CommandKind::Title => Self::Title,
            CommandKind::SwapCase => Self::SwapCase,
            CommandKind::CaseFold => Self::CaseFold,
            CommandKind::Capitalize => Self::Capitalize,
            CommandKind::Upper => Self::Upper,
            CommandKind::Lower => Self::Lower,
            CommandKind::ExpandTabs => Self::ExpandTabs(width(false)?.unwrap_or(DEFAULT_TAB_SIZE)),
            CommandKind::Rjust => Self::Rjust(width(true)?.unwrap_or_default()),
            CommandKind::Ljust => Self::Ljust(width(true)?.unwrap_or_default()),
            CommandKind::Center => Self::Center(width(true)?.unwrap_or_default()),
            CommandKind::Rstrip => Self::Rstrip,
            CommandKind::Lstrip => Self::Lstrip,
            CommandKind::Strip => Self::Strip,
            other => {
                return Err(EditError::InvalidArgument(format!(
                    "{other} is not a string transform"
                )))
            }
        })
    }

    pub fn apply(&self, line: &str) -> String {
        match *self {
            Self::Title => title_case(line),
            Self::SwapCase => swap_case(line),
            Self::CaseFold | Self::Lower => line.to_lowercase(),
            Self::Capitalize => {
                let mut chars = line.chars();
                match chars.next() {
                    Some(first) => {
                        let rest = chars.as_str().to_lowercase();
                        first.to_uppercase().chain(rest.chars()).collect()
                    }
                    None => String::new(),
                }
            }
            Self::Upper => line.to_uppercase(),
            Self::ExpandTabs(size) => expand_tabs(line, size),
            Self::Rjust(width) => {
                let pad = width.saturating_sub(line.chars().count());
                format!("{}{line}", " ".repeat(pad))
            }
            Self::Ljust(width) => {
                let pad = width.saturating_sub(line.chars().count());
                format!("{line}{}", " ".repeat(pad))
            }
            Self::Center(width) => {
                let pad = width.saturating_sub(line.chars().count());
                let left = pad / 2;
                format!("{}{line}{}", " ".repeat(left), " ".repeat(pad - left))
            }
            Self::Rstrip => line.trim_end().to_string(),
            Self::Lstrip => line.trim_start().to_string(),
            Self::Strip => line.trim().to_string(),
        }
    }
}

fn title_case(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut prev_cased = false;
    for c in line.chars() {
        if c.is_alphabetic() {
            if prev_cased {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_cased = true;
        } else {
            out.push(c);
            prev_cased = false;
        }
    }
    out
}

fn swap_case(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    for c in line.chars() {
        if c.is_uppercase() {
            out.extend(c.to_lowercase());
        } else if c.is_lowercase() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn expand_tabs(line: &str, size: usize) -> String {
    let mut out = String::with_capacity(line.len());
    let mut column = 0usize;
    for c in line.chars() {
        if c == '\t' {
            if size > 0 {
                let fill = size - column % size;
                out.push_str(&" ".repeat(fill));
                column += fill;
            }
        } else {
            out.push(c);
            column += 1;
        }
    }
    out
}

/// Prefix every line with `prefix`, leaving blank lines alone.
pub fn indent(lines: &[String], prefix: &str) -> Vec<String> {
    lines
        .iter()
        .map(|l| {
            if l.trim().is_empty() {
                l.clone()
            } else {
                format!("{prefix}{l}")
            }
        })
        .collect()
}

/// Remove leading whitespace shared by every non-blank line.
pub fn dedent(lines: &[String]) -> Vec<String> {
    let mut common: Option<&str> = None;
    for line in lines.iter().filter(|l| !l.trim().is_empty()) {
        let ws = &line[..line.len() - line.trim_start().len()];
        common = Some(match common {
            None => ws,
            Some(c) => common_prefix(c, ws),
        });
    }
    let common = common.unwrap_or("");
    lines
        .iter()
        .map(|l| {
            if l.trim().is_empty() {
                String::new()
            } else {
                l[common.len()..].to_string()
            }
        })
        .collect()
}

fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let n = a
        .char_indices()
        .zip(b.chars())
        .take_while(|((_, x), y)| x == y)
        .last()
        .map_or(0, |((i, x), _)| i + x.len_utf8());
    &a[..n]
}
