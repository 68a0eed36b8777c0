use crate::combinator::{Forward, Join, List, Or};
use crate::element::{Element, TypeNameElement};
use crate::error::{raise, GrammarDefect};
use crate::parser::{Bool, Number, Parser, Rule, StringLiteral, Symbol, Word, WordDot};
use once_cell::sync::OnceCell;

/// A construction context for rules that grammars reuse everywhere.
///
/// Each accessor builds its rule on first use and hands out clones of the same
/// [`Rule`] afterwards. Rules built from different `Grammar` values share nothing, so
/// tests and unrelated grammars never observe each other's state.
#[derive(Debug, Default)]
pub struct Grammar {
    word: OnceCell<Rule>,
    word_dot: OnceCell<Rule>,
    string: OnceCell<Rule>,
    number: OnceCell<Rule>,
    boolean: OnceCell<Rule>,
    type_name: OnceCell<Rule>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn word(&self) -> Rule {
        self.word.get_or_init(|| Word.into_rule()).clone()
    }

    pub fn word_dot(&self) -> Rule {
        self.word_dot.get_or_init(|| WordDot.into_rule()).clone()
    }

    pub fn string(&self) -> Rule {
        self.string.get_or_init(|| StringLiteral.into_rule()).clone()
    }

    pub fn number(&self) -> Rule {
        self.number.get_or_init(|| Number.into_rule()).clone()
    }

    pub fn boolean(&self) -> Rule {
        self.boolean.get_or_init(|| Bool.into_rule()).clone()
    }

    /// Dotted type names with nested generic arguments, e.g. `core.Map<K, List<V>>`.
    pub fn type_name(&self) -> Rule {
        self.type_name
            .get_or_init(|| TypeName::build(self.word_dot()))
            .clone()
    }
}

/// A possibly generic type name.
///
/// ```text
/// TypeName ::= name "<" TypeName { "," TypeName } [ "," ] ">"
///            | name
/// ```
///
/// An empty argument list is not accepted: `List<>` parses as the plain name `List`.
///
/// The generic alternative is tried first.
#[derive(Debug)]
pub struct TypeName {
    inner: Rule,
}

impl TypeName {
    /// Builds the recursive rule around `name`, which must produce word elements.
    pub fn build(name: Rule) -> Rule {
        let forward = Forward::new();
        let arguments = List::new(forward.clone(), Symbol::new(","))
            .allow_empty(false)
            .prefix(Symbol::new("<"))
            .postfix(Symbol::new(">"));
        let inner = Or::new(vec![
            Join::new(vec![name.clone(), arguments.into_rule()]).into_rule(),
            name,
        ])
        .into_rule();

        let rule = TypeName { inner }.into_rule();
        forward.define(&rule);
        rule
    }
}

impl Parser for TypeName {
    fn parse<'t>(&self, text: &'t str, pos: usize) -> Option<Element<'t>> {
        let elem = self.inner.parse(text, pos)?;
        let span = elem.span();
        let type_name = match elem {
            Element::Word(name) | Element::WordDot(name) => {
                TypeNameElement::new(text, name, None, span)
            }
            Element::Join(join) => {
                let mut parts = join.into_elements().into_iter();
                match (parts.next(), parts.next(), parts.next()) {
                    (
                        Some(Element::Word(name) | Element::WordDot(name)),
                        Some(Element::List(arguments)),
                        None,
                    ) => TypeNameElement::new(text, name, Some(arguments), span),
                    (first, second, _) => raise(GrammarDefect::UnexpectedShape {
                        rule: "type name",
                        expected: "a name followed by an argument list",
                        found: format!(
                            "join of {} and {}",
                            first.as_ref().map_or("nothing", Element::kind),
                            second.as_ref().map_or("nothing", Element::kind)
                        ),
                    }),
                }
            }
            other => raise(GrammarDefect::UnexpectedShape {
                rule: "type name",
                expected: "a name or a name with arguments",
                found: other.kind().to_string(),
            }),
        };
        Some(Element::TypeName(type_name))
    }
}
