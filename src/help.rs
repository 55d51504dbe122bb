pub const HELP_TEXT: &str = r#"Command format: [start],[end],[repeat] [command] "[search]" "[replace]"
[start],[end] is abbreviated to [range]

1,10 LIST   - Lists lines 1 to 10
1 CURRENT  - Reset current line to first line
1,20 SEARCH cat - Search for cat

1  - Edit line 1
INSERT - Insert after the current line
INSERT hello - Insert "hello" after the current line
2,4DELETE - Delete lines 2 to 4
REPLACE cat dog - Replace cat with dog

For more help, type
HELP display|edit|files|data|tools|reorder|meta|strings|all"#;

const DISPLAY: &str = "Display Commands
[range] List - display lines
Page - repeat to flip through entire document
[range] Print - display lines without numbers
[range] Spell - show spelling mistakes
[range] Search [text]
[line] Current - set current line to [line]
Info - document statistics";

const EDIT: &str = "Edit Commands
[line] - Bare number edits that line. Not available in headless mode.
Insert [text] - insert after the current line, interactively without text
Edit [text] - edit the current line
[line] Push [lines] - insert each phrase as a line
[range] Delete - delete range
[range] Replace [text] [text] - replace text in range";

const DATA: &str = "Data Source Commands
[count] Lorem - append lorem ipsum text
[line] Transfer [file name] - insert file contents at line";

const TOOLS: &str = "Tool Commands
Browse [URL] - fetch web page as text, insert at current line
Export [file name] - save a plain text copy";

const META: &str = "Meta Commands
History - list all commands run
Macro [file] - run macro
Redo - repeat last command
Undo - undo last command that changed state
Help [topic] - display this";

const REORDER: &str = "Reorder Commands
[range] Move [target line number] - move range to target
[range] Copy [target line number] - copy range to target
Sort - sort lines alphabetically
Reverse - reverse line order
Shuffle - shuffle lines randomly";

const FILES: &str = "File System Commands
Write / Save - save file
Quit - exit, saving first when there are unsaved changes and quit safety is on
Exit [file name] - save file and exit";

const STRINGS: &str = "String Commands
[range] TITLE - title case the range
[range] SWAPCASE - toggle current casing
[range] CASEFOLD - lowercase for caseless matching
[range] CAPITALIZE - capitalize first character
[range] UPPER - uppercase text
[range] LOWER - lowercase text
[range] EXPANDTABS [width] - turn tabs into spaces
[range] RJUST [width] - right justify in span of width
[range] LJUST [width] - left justify in span of width
[range] CENTER [width] - center text in span of width
[range] RSTRIP - strip trailing whitespace
[range] LSTRIP - strip leading whitespace
[range] STRIP - strip leading and trailing whitespace
[range] INDENT [prefix] - indent lines, four spaces by default
[range] DEDENT - remove common leading whitespace";

const TOPICS: &[(&str, &str)] = &[
    ("DISPLAY", DISPLAY),
    ("EDIT", EDIT),
    ("DATA", DATA),
    ("TOOLS", TOOLS),
    ("META", META),
    ("REORDER", REORDER),
    ("FILE", FILES),
    ("FILES", FILES),
    ("STRINGS", STRINGS),
];

/// Text for one topic, matched case-insensitively.
pub fn topic(name: &str) -> Option<&'static str> {
    let upper = name.trim().to_ascii_uppercase();
    TOPICS
        .iter()
        .find(|(key, _)| *key == upper)
        .map(|(_, text)| *text)
}

/// Every topic once, in display order.
pub fn all_topics() -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::new();
    for (_, text) in TOPICS {
        if !out.contains(text) {
            out.push(*text);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topics_case_insensitive() {
        assert!(topic("reorder").unwrap().contains("Move"));
        assert_eq!(topic("file"), topic("FILES"));
        assert!(topic("nope").is_none());
    }

    #[test]
    fn all_topics_skips_aliases() {
        assert_eq!(all_topics().len(), TOPICS.len() - 1);
    }
}
