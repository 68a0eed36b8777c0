use crate::element::{
    BasicElement, Element, JoinElement, ListElement, OneOrMoreElement, Span,
};
use crate::error::{raise, GrammarDefect};
use crate::parser::{Parser, Rule};
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::{Arc, Weak};

/// Sequence: every sub-parser in order, each starting where the previous span ended.
#[derive(Debug, Clone)]
pub struct Join {
    parsers: Vec<Rule>,
}

impl Join {
    pub fn new(parsers: Vec<Rule>) -> Self {
        Self { parsers }
    }
}

impl Parser for Join {
    fn parse<'t>(&self, text: &'t str, pos: usize) -> Option<Element<'t>> {
        if self.parsers.is_empty() {
            return None;
        }

        let mut elements = Vec::with_capacity(self.parsers.len());
        let mut curr = pos;
        for parser in &self.parsers {
            let elem = parser.parse(text, curr)?;
            curr = elem.span().end;
            elements.push(elem);
        }
        Some(Element::Join(JoinElement::new(
            text,
            elements,
            Span::new(pos, curr),
        )))
    }
}

/// Ordered alternation. The first alternative that matches wins, so the order the
/// alternatives are listed in is part of the grammar.
#[derive(Debug, Clone)]
pub struct Or {
    parsers: Vec<Rule>,
}

impl Or {
    pub fn new(parsers: Vec<Rule>) -> Self {
        Self { parsers }
    }
}

impl Parser for Or {
    fn parse<'t>(&self, text: &'t str, pos: usize) -> Option<Element<'t>> {
        self.parsers
            .iter()
            .find_map(|parser| parser.parse(text, pos))
    }
}

/// Tries each sub-parser once, in order, tolerating misses; fails only when none matched.
///
/// Meant for modifier groups such as `static final` where each part is optional.
#[derive(Debug, Clone)]
pub struct OneOrMore {
    parsers: Vec<Rule>,
}

impl OneOrMore {
    pub fn new(parsers: Vec<Rule>) -> Self {
        Self { parsers }
    }
}

impl Parser for OneOrMore {
    fn parse<'t>(&self, text: &'t str, pos: usize) -> Option<Element<'t>> {
        let mut items = Vec::with_capacity(self.parsers.len());
        let mut curr = pos;
        let mut bounds: Option<(usize, usize)> = None;

        for parser in &self.parsers {
            let elem = parser.parse(text, curr);
            if let Some(elem) = &elem {
                curr = elem.span().end;
                let start = bounds.map_or(elem.start(), |(start, _)| start);
                bounds = Some((start, elem.end()));
            }
            items.push(elem);
        }

        let (start, end) = bounds?;
        let base = BasicElement::with_span(text, start, end, Span::new(pos, curr));
        Some(Element::OneOrMore(OneOrMoreElement::new(base, items)))
    }
}

/// Turns a miss of the wrapped parser into a zero-width match at `pos`.
#[derive(Debug, Clone)]
pub struct Optional {
    parser: Rule,
}

impl Optional {
    pub fn new(parser: impl Parser + 'static) -> Self {
        Self {
            parser: parser.into_rule(),
        }
    }
}

impl Parser for Optional {
    fn parse<'t>(&self, text: &'t str, pos: usize) -> Option<Element<'t>> {
        if pos > text.len() {
            return None;
        }
        self.parser
            .parse(text, pos)
            .or_else(|| Some(Element::Basic(BasicElement::new(text, pos, pos))))
    }
}

/// A separated list of items, optionally bracketed.
///
/// ```text
/// List ::= [ prefix ] item { separator item } [ separator ] [ postfix ]
/// ```
///
/// Without brackets at least one item is required. With both brackets `[]` is an
/// empty list unless [`allow_empty`](Self::allow_empty) turns that off. When there is
/// no postfix and trailing separators are not allowed, a dangling separator is left
/// outside the list.
#[derive(Debug, Clone)]
pub struct List {
    item: Rule,
    separator: Rule,
    allow_trailing_separator: bool,
    allow_empty: bool,
    prefix: Option<Rule>,
    postfix: Option<Rule>,
}

impl List {
    pub fn new(item: impl Parser + 'static, separator: impl Parser + 'static) -> Self {
        Self {
            item: item.into_rule(),
            separator: separator.into_rule(),
            allow_trailing_separator: true,
            allow_empty: true,
            prefix: None,
            postfix: None,
        }
    }

    pub fn allow_trailing_separator(mut self, allow: bool) -> Self {
        self.allow_trailing_separator = allow;
        self
    }

    /// Whether a bracketed list may hold no items at all.
    pub fn allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = allow;
        self
    }

    pub fn prefix(mut self, prefix: impl Parser + 'static) -> Self {
        self.prefix = Some(prefix.into_rule());
        self
    }

    pub fn postfix(mut self, postfix: impl Parser + 'static) -> Self {
        self.postfix = Some(postfix.into_rule());
        self
    }
}

impl Parser for List {
    fn parse<'t>(&self, text: &'t str, pos: usize) -> Option<Element<'t>> {
        let mut curr = pos;
        let mut start = None;
        if let Some(prefix) = &self.prefix {
            let pre = prefix.parse(text, curr)?;
            curr = pre.span().end;
            start = Some(pre.start());
        }

        // (span end, semantic end) of the last item and of the last token consumed
        let mut items = Vec::new();
        let mut last_item = (curr, curr);
        let mut last = (curr, curr);
        let mut last_is_item = false;
        loop {
            let iteration_start = curr;
            let Some(item) = self.item.parse(text, curr) else {
                break;
            };
            curr = item.span().end;
            last_item = (curr, item.end());
            last = last_item;
            last_is_item = true;
            items.push(item);

            let Some(separator) = self.separator.parse(text, curr) else {
                break;
            };
            if separator.span().end == iteration_start {
                break;
            }
            curr = separator.span().end;
            last = (curr, separator.end());
            last_is_item = false;
        }

        let bracketed = self.prefix.is_some() && self.postfix.is_some();
        if items.is_empty() && !(bracketed && self.allow_empty) {
            return None;
        }

        let end = match &self.postfix {
            Some(postfix) => {
                if !self.allow_trailing_separator && !items.is_empty() && !last_is_item {
                    return None;
                }
                let post = postfix.parse(text, curr)?;
                curr = post.span().end;
                post.end()
            }
            None => {
                if !self.allow_trailing_separator && !last_is_item {
                    last = last_item;
                    last_is_item = true;
                }
                curr = last.0;
                last.1
            }
        };

        let has_trailing_separator = !items.is_empty() && !last_is_item;
        let start = match (start, items.first()) {
            (Some(start), _) => start,
            (None, Some(first)) => first.start(),
            (None, None) => return None,
        };
        let join = JoinElement::with_bounds(text, items, Span::new(pos, curr), start, end);
        Some(Element::List(ListElement::new(join, has_trailing_separator)))
    }
}

/// A placeholder for a rule that is not built yet, for self-referential grammars.
///
/// Clones share one slot. The slot is filled once with [`define`](Self::define) and
/// holds the target weakly, so a rule containing its own forward does not leak.
#[derive(Clone, Default)]
pub struct Forward {
    target: Arc<OnceCell<Weak<dyn Parser>>>,
}

impl Forward {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points this forward, and every clone of it, at `rule`.
    ///
    /// # Panics
    ///
    /// Panics if the forward was already defined.
    pub fn define(&self, rule: &Rule) {
        if self.target.set(rule.downgrade()).is_err() {
            raise(GrammarDefect::RedefinedForward);
        }
    }

    pub fn is_defined(&self) -> bool {
        self.target.get().is_some()
    }
}

impl Parser for Forward {
    fn parse<'t>(&self, text: &'t str, pos: usize) -> Option<Element<'t>> {
        let Some(target) = self.target.get() else {
            raise(GrammarDefect::UndefinedForward);
        };
        let Some(rule) = target.upgrade() else {
            raise(GrammarDefect::DroppedForward);
        };
        rule.parse(text, pos)
    }
}

impl fmt::Debug for Forward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Forward")
            .field("defined", &self.is_defined())
            .finish()
    }
}
