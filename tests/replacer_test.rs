use eregex::error::ReplaceError;
use eregex::utils::Location;
use eregex::{Edit, Replacer};

const TEXT: &str = "
2234567890
3234567890
4234567890
5234567890
6234567890
7234567890
8234567890
9234567890
";

#[test]
fn test_line_col() {
    let replacer = Replacer::whole(TEXT);
    let at = |pos| {
        let Location { line, column, .. } = replacer.line_col(pos);
        (line, column)
    };
    assert_eq!(at(0), (1, 1));
    assert_eq!(at(1), (2, 1));
    assert_eq!(at(3), (2, 3));
    assert_eq!(at(11), (2, 11));
    assert_eq!(at(88), (9, 11));
}

#[test]
fn test_update_digest() {
    let mut replacer = Replacer::whole(TEXT);

    assert!(replacer.update(12, 22, "Line 3"));
    assert!(!replacer.update(21, 22, "Line 3"));
    assert_eq!(replacer.edits().len(), 1);
    assert_eq!(
        replacer.digest(),
        "
2234567890
Line 3
4234567890
5234567890
6234567890
7234567890
8234567890
9234567890
"
    );

    assert!(replacer.update(12, 12, "Start of Line 3:"));
    assert_eq!(replacer.edits().len(), 2);
    let expected = "
2234567890
Start of Line 3:Line 3
4234567890
5234567890
6234567890
7234567890
8234567890
9234567890
";
    assert_eq!(replacer.digest(), expected);

    assert!(!replacer.update(88, 90, "End of Text"));
    assert_eq!(replacer.edits().len(), 2);
    assert_eq!(replacer.digest(), expected);

    assert!(replacer.update(89, 89, "End of Text"));
    assert_eq!(replacer.edits().len(), 3);
    let expected = format!("{expected}End of Text");
    assert_eq!(replacer.digest(), expected);

    assert!(!replacer.update(13, 13, "Part of line 3"));
    assert_eq!(replacer.edits().len(), 3);
    assert_eq!(replacer.digest(), expected);

    let kinds: Vec<_> = replacer
        .diagnostics()
        .iter()
        .map(|diagnostic| match diagnostic {
            ReplaceError::Conflict { .. } => "conflict",
            ReplaceError::OutOfScope { .. } => "out of scope",
            ReplaceError::NotCharBoundary { .. } => "char boundary",
        })
        .collect();
    assert_eq!(kinds, ["conflict", "out of scope", "conflict"]);
}

#[test]
fn test_digest_ignores_submission_order() {
    let edits = [
        Edit::new(1, 3, "a"),
        Edit::new(45, 50, "b"),
        Edit::new(23, 23, "c"),
        Edit::new(88, 89, "d"),
    ];

    let mut forward = Replacer::whole(TEXT);
    let mut backward = Replacer::whole(TEXT);
    for edit in &edits {
        assert!(forward.submit(edit.clone()));
    }
    for edit in edits.iter().rev() {
        assert!(backward.submit(edit.clone()));
    }
    assert_eq!(forward.digest(), backward.digest());
}

#[test]
fn test_conflict_diagnostic_points_at_both_edits() {
    let mut replacer = Replacer::whole(TEXT);
    replacer.update(12, 22, "x");
    replacer.update(20, 30, "y");

    let diagnostic = &replacer.diagnostics()[0];
    assert_eq!(
        diagnostic.to_string(),
        "edit (line 3, col 9)-(line 4, col 8) conflicts with accepted edit (line 3, col 1)-(line 3, col 11)"
    );
    assert_eq!(
        diagnostic.context(),
        "rejected lines 3-4\n      3: 3234567890\n      4: 4234567890\naccepted line 3\n      3: 3234567890\n"
    );
}

#[test]
fn test_sub_window() {
    let mut replacer = Replacer::new(TEXT, 12, 23);
    assert_eq!(replacer.digest(), "3234567890\n");
    assert!(!replacer.update(1, 2, "nope"));
    assert!(replacer.update(12, 13, "Three"));
    assert_eq!(replacer.digest(), "Three234567890\n");
    assert_eq!(
        replacer.into_diagnostics()[0].location(),
        Location {
            offset: 1,
            line: 2,
            column: 1
        }
    );
}
