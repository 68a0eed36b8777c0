use eregex::error::{ReplaceError, RewriteError};
use eregex::{rewrite, BlockLocator, Join, Parser, Replacer, Symbol, Word};

const SOURCE: &str = "class Foo {\n  int x;\n}\n";

fn classes() -> BlockLocator {
    BlockLocator::new(Join::new(vec![
        Symbol::new("class").into_rule(),
        Word.into_rule(),
    ]))
}

#[test]
fn test_rewrite_whole_block() {
    let result = rewrite(SOURCE, 0, SOURCE.len(), &classes(), |block, _| {
        assert_eq!(block.header()?.content(), Some("class Foo"));
        assert_eq!(block.interior_content(), Some("\n  int x;\n"));
        Some(format!("struct Foo {{{}}}\n", block.interior_content()?))
    });
    assert!(!result.has_diagnostics());
    assert_eq!(result.output, "struct Foo {\n  int x;\n}\n");
    assert_eq!(result.into_output().unwrap(), "struct Foo {\n  int x;\n}\n");
}

#[test]
fn test_untouched_blocks_stay() {
    let result = rewrite(SOURCE, 0, SOURCE.len(), &classes(), |_, _| None);
    assert_eq!(result.output, SOURCE);
}

#[test]
fn test_window_is_rewritten_alone() {
    let source = "class A {\n}\nclass B {\n}\n";
    let result = rewrite(source, 12, source.len(), &classes(), |block, _| {
        Some(block.content().replace("class", "struct"))
    });
    assert_eq!(result.output, "struct B {\n}\n");
}

#[test]
fn test_nested_diagnostics_are_forwarded() {
    let result = rewrite(SOURCE, 0, SOURCE.len(), &classes(), |block, sink| {
        let interior = block.interior()?;
        let mut inner = Replacer::new(block.text(), interior.start, interior.end);
        inner.update(0, 5, "struct");
        inner.update(interior.start, interior.start, "\n  // fields");
        let body = inner.digest();
        sink.extend(inner.into_diagnostics());
        Some(format!("class Foo {{{body}}}\n"))
    });

    assert_eq!(result.output, "class Foo {\n  // fields\n  int x;\n}\n");
    assert_eq!(result.diagnostics.len(), 1);
    assert!(matches!(
        result.diagnostics[0],
        ReplaceError::OutOfScope { .. }
    ));

    let records = result.records();
    assert_eq!(records[0].code, "replacer::out_of_scope");
    assert_eq!((records[0].line, records[0].column), (1, 1));
    assert_eq!(records[0].length, 5);

    let rendered = result.render("foo.dart", SOURCE).unwrap();
    assert!(rendered.contains("replacer::out_of_scope"));
    assert!(rendered.contains("foo.dart"));

    let err = result.into_output().unwrap_err();
    assert!(matches!(err, RewriteError::Replace(_)));
}

#[test]
fn test_result_to_json() {
    let mut replacer = Replacer::whole(SOURCE);
    replacer.update(0, 5, "struct");
    replacer.update(4, 9, "x");
    let result = eregex::RewriteResult {
        output: replacer.digest(),
        diagnostics: replacer.into_diagnostics(),
    };

    let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
    assert_eq!(json["output"], "struct Foo {\n  int x;\n}\n");
    assert_eq!(json["diagnostics"][0]["code"], "replacer::conflict");
    assert_eq!(json["diagnostics"][0]["offset"], 4);
    assert_eq!(json["diagnostics"][0]["length"], 5);
    assert_eq!(json["diagnostics"][0]["line"], 1);
    assert_eq!(json["diagnostics"][0]["column"], 5);
}
