//! Property-based tests for ranges, the parser and the document engine.

use dedlin_core::{parse, Command, CommandKind, Document, EditError, LineRange, Phrases};
use proptest::prelude::*;

fn lines_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{0,6}", 1..24)
}

/// A document plus a valid range inside it.
fn doc_and_range() -> impl Strategy<Value = (Vec<String>, LineRange)> {
    lines_strategy().prop_flat_map(|lines| {
        let len = lines.len();
        (Just(lines), 1..=len).prop_flat_map(move |(lines, start)| {
            (Just(lines), Just(start), start..=len)
        })
    })
    .prop_map(|(lines, start, end)| {
        let range = LineRange::span(start, end).expect("end >= start");
        (lines, range)
    })
}

proptest! {
    #[test]
    fn count_matches_slice(start in 1usize..200, offset in 0usize..50, extra in 0usize..10) {
        let r = LineRange::new(start, offset);
        prop_assert_eq!(r.count(), offset + 1);
        let seq: Vec<usize> = (0..r.end() + extra).collect();
        prop_assert_eq!(seq[r.to_slice()].len(), r.count());
    }

    #[test]
    fn bare_number_edits_that_line(len in 1usize..100, pick in 0usize..100) {
        let n = pick % len + 1;
        let cmd = parse(&n.to_string(), 1, len, false);
        prop_assert_eq!(cmd.kind, CommandKind::Edit);
        prop_assert_eq!(cmd.line_range, Some(LineRange::line(n)));
    }

    #[test]
    fn move_preserves_length((lines, range) in doc_and_range(), target in 1usize..26) {
        let mut doc = Document::new(lines.clone());
        let result = doc.move_range(range, target);
        if range.start < target && target < range.end() {
            let is_into_range = matches!(result, Err(EditError::MoveIntoRange { .. }));
            prop_assert!(is_into_range);
            prop_assert_eq!(doc.lines(), lines.as_slice());
        } else if target <= lines.len() + 1 {
            prop_assert!(result.is_ok());
            prop_assert_eq!(doc.len(), lines.len());
            let mut before = lines.clone();
            let mut after = doc.lines().to_vec();
            before.sort();
            after.sort();
            prop_assert_eq!(before, after);
        } else {
            prop_assert!(result.is_err());
        }
    }

    #[test]
    fn copy_grows_by_count((lines, range) in doc_and_range(), pick in 0usize..30) {
        let target = pick % (lines.len() + 1) + 1;
        let mut doc = Document::new(lines.clone());
        doc.copy(Some(range), target).unwrap();
        prop_assert_eq!(doc.len(), lines.len() + range.count());

        let at = target - 1;
        let block = &lines[range.to_slice()];
        prop_assert_eq!(&doc.lines()[..at], &lines[..at]);
        prop_assert_eq!(&doc.lines()[at..at + block.len()], block);
        prop_assert_eq!(&doc.lines()[at + block.len()..], &lines[at..]);
    }

    #[test]
    fn delete_shrinks_and_keeps_cursor_valid((lines, range) in doc_and_range()) {
        let mut doc = Document::new(lines.clone());
        doc.delete(Some(range));
        prop_assert!(doc.len() <= lines.len());
        prop_assert_eq!(doc.len(), lines.len() - range.count());
        if doc.is_empty() {
            prop_assert!(doc.current_line() <= 1);
        } else {
            prop_assert!(doc.current_line() >= 1 && doc.current_line() <= doc.len());
        }
    }

    #[test]
    fn undo_restores_previous_lines((lines, range) in doc_and_range(), op in 0u8..8) {
        let mut doc = Document::new(lines.clone());
        match op {
            0 => { doc.delete(Some(range)); }
            1 => { doc.copy(Some(range), 1).unwrap(); }
            2 => { let _ = doc.move_range(range, lines.len() + 1); }
            3 => doc.fill(range, "x"),
            4 => doc.sort(),
            5 => doc.reverse(),
            6 => { doc.lorem(Some(range)); }
            _ => { doc.replace(Some(range), "a", "Z", true); }
        }
        doc.undo();
        prop_assert_eq!(doc.lines(), lines.as_slice());
    }

    #[test]
    fn canonical_text_round_trips(
        (lines, range) in doc_and_range(),
        target in "[a-z][a-z \t]{0,6}",
        replacement in "[a-z][a-z\" ]{0,6}",
    ) {
        let len = lines.len();
        let delete = Command::new(CommandKind::Delete).with_range(range);
        prop_assert_eq!(parse(&delete.format(), 1, len, false), delete);

        let replace = Command::new(CommandKind::Replace)
            .with_range(range)
            .with_phrases(Phrases::new([target, replacement]));
        prop_assert_eq!(parse(&replace.format(), 1, len, false), replace);
    }
}
