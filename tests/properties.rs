//! Property-based tests for elements, combinators, locators and the replacer.

use eregex::element::BasicElement;
use eregex::{
    Edit, Element, Join, LineLocator, List, Locator, Parser, Replacer, Span, Symbol, Word,
};
use proptest::prelude::*;

/// Identifiers that are not separated by anything the word pattern would swallow
fn word_strategy() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,8}"
}

/// Lines of `indentation word [tail]`, with no blank lines in between
fn source_lines_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        (" {0,4}", word_strategy(), prop::option::of("[a-z(); ]{1,10}")).prop_map(
            |(indent, word, tail)| match tail {
                Some(tail) => format!("{indent}{word} {tail}"),
                None => format!("{indent}{word}"),
            },
        ),
        1..12,
    )
}

fn edit_strategy(len: usize) -> impl Strategy<Value = Edit> {
    (0..=len, 0..=len, "[A-Z]{0,3}").prop_map(|(a, b, replacement)| {
        Edit::new(a.min(b), a.max(b), replacement)
    })
}

const TEXT: &str = "fn main() {\n    let x = 1;\n    let y = 2;\n}\n";

#[cfg(test)]
mod proptest_tests {
    use super::*;

    proptest! {
        #[test]
        fn test_element_validity_follows_range_order(
            span_start in 0usize..60,
            start in 0usize..60,
            end in 0usize..60,
            span_end in 0usize..60,
        ) {
            let ordered = span_start <= start
                && start <= end
                && end <= span_end
                && span_end <= TEXT.len();
            let elem = BasicElement::try_new(TEXT, start, end, Span::new(span_start, span_end));
            prop_assert_eq!(elem.is_ok(), ordered);

            let lenient = BasicElement::with_span(TEXT, start, end, Span::new(span_start, span_end));
            prop_assert_eq!(lenient.is_valid(), ordered);
            if ordered {
                prop_assert_eq!(lenient.content(), Some(&TEXT[start..end]));
                prop_assert_eq!(lenient.textspan(), Some(&TEXT[span_start..span_end]));
            } else {
                prop_assert_eq!(lenient.content(), None);
                prop_assert_eq!(lenient.textspan(), None);
            }
        }

        #[test]
        fn test_join_is_associative(words in prop::collection::vec(word_strategy(), 3)) {
            let text = words.join("  ");
            let flat = Join::new(vec![Word.into_rule(), Word.into_rule(), Word.into_rule()]);
            let nested = Join::new(vec![
                Join::new(vec![Word.into_rule(), Word.into_rule()]).into_rule(),
                Word.into_rule(),
            ]);

            let flat = flat.parse(&text, 0).unwrap();
            let nested = nested.parse(&text, 0).unwrap();
            prop_assert_eq!(flat.span(), nested.span());
            prop_assert_eq!(flat.content(), nested.content());
            prop_assert_eq!(flat.content(), Some(text.as_str()));
        }

        #[test]
        fn test_list_collects_every_item(
            words in prop::collection::vec(word_strategy(), 1..8),
            trailing in any::<bool>(),
        ) {
            let mut text = words.join(", ");
            if trailing {
                text.push(',');
            }
            let list = List::new(Word, Symbol::new(","));
            let elem = list.parse(&text, 0).unwrap();
            let list = elem.as_list().unwrap();

            prop_assert_eq!(list.len(), words.len());
            prop_assert_eq!(list.has_trailing_separator(), trailing);
            let items: Vec<_> = list.iter().filter_map(Element::content).collect();
            prop_assert_eq!(items, words.iter().map(String::as_str).collect::<Vec<_>>());
            prop_assert_eq!(elem.span().end, text.len());
        }

        #[test]
        fn test_located_lines_are_ordered_and_disjoint(lines in source_lines_strategy()) {
            let text = lines.join("\n") + "\n";
            let blocks = LineLocator::new(Word).locate_all(&text, 0, text.len());

            prop_assert_eq!(blocks.len(), lines.len());
            for pair in blocks.windows(2) {
                prop_assert!(pair[0].end() <= pair[1].start());
            }
            for (block, line) in blocks.iter().zip(&lines) {
                prop_assert_eq!(block.content(), line.split_whitespace().next().unwrap());
                prop_assert_eq!(block.indentation().len(), line.len() - line.trim_start().len());
            }
        }

        #[test]
        fn test_digest_without_edits_is_the_window(start in 0usize..50, end in 0usize..50) {
            let (start, end) = (start.min(end), start.max(end));
            let replacer = Replacer::new(TEXT, start, end);
            let scope = replacer.scope();
            prop_assert_eq!(replacer.digest(), &TEXT[scope.start..scope.end]);
        }

        #[test]
        fn test_accepted_edits_never_conflict(edits in prop::collection::vec(edit_strategy(TEXT.len()), 0..16)) {
            let mut replacer = Replacer::whole(TEXT);
            let mut rejected = 0;
            for edit in edits.iter().cloned() {
                if !replacer.submit(edit) {
                    rejected += 1;
                }
            }

            prop_assert_eq!(replacer.diagnostics().len(), rejected);
            prop_assert_eq!(replacer.edits().len() + rejected, edits.len());
            let accepted = replacer.edits();
            for (i, a) in accepted.iter().enumerate() {
                for b in &accepted[i + 1..] {
                    prop_assert!(!a.conflicts_with(b));
                }
            }

            let removed: usize = accepted.iter().map(|edit| edit.end - edit.start).sum();
            let added: usize = accepted.iter().map(|edit| edit.replacement.len()).sum();
            prop_assert_eq!(replacer.digest().len(), TEXT.len() - removed + added);
        }

        #[test]
        fn test_insertions_at_one_position_keep_submission_order(
            pos in 0usize..45,
            inserts in prop::collection::vec("[a-z]{1,3}", 1..5),
        ) {
            let mut replacer = Replacer::whole(TEXT);
            for insert in &inserts {
                prop_assert!(replacer.update(pos, pos, insert.as_str()));
            }
            let expected = format!("{}{}{}", &TEXT[..pos], inserts.concat(), &TEXT[pos..]);
            prop_assert_eq!(replacer.digest(), expected);
        }
    }
}
