use crate::element::{
    BasicElement, BoolElement, Element, NumberElement, Span, StringElement,
};
use crate::error::GrammarError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::sync::{Arc, Weak};

static WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\b([_A-Za-z]\w*)\b").expect("word pattern is valid"));
static WORD_DOT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\b([_A-Za-z]\w*(?:[.][_A-Za-z]\w*)*)\b").expect("dotted word pattern is valid")
});
static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(-?\d+)(?:\.(\d+))?").expect("number pattern is valid"));
static BOOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(true|false)").expect("bool pattern is valid"));
static SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s+").expect("space pattern is valid"));

/// A recognizer for one grammar rule.
///
/// `parse` answers whether the rule matches at exactly `pos`. `None` is the ordinary "no
/// match here" answer and is cheap to produce; grammars try many alternatives and
/// most of them fail. A match never reads past `text.len()`.
pub trait Parser: Send + Sync {
    fn parse<'t>(&self, text: &'t str, pos: usize) -> Option<Element<'t>>;

    /// Moves the parser behind a shareable [`Rule`] handle.
    fn into_rule(self) -> Rule
    where
        Self: Sized + 'static,
    {
        Rule::new(self)
    }
}

/// A shared, type-erased parser. Cloning is cheap and clones parse identically.
#[derive(Clone)]
pub struct Rule(Arc<dyn Parser>);

impl Rule {
    pub fn new<P: Parser + 'static>(parser: P) -> Self {
        Rule(Arc::new(parser))
    }

    pub(crate) fn downgrade(&self) -> Weak<dyn Parser> {
        Arc::downgrade(&self.0)
    }
}

impl Parser for Rule {
    fn parse<'t>(&self, text: &'t str, pos: usize) -> Option<Element<'t>> {
        self.0.parse(text, pos)
    }

    fn into_rule(self) -> Rule {
        self
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rule({:p})", Arc::as_ptr(&self.0))
    }
}

/// Runs an anchored regex on `text[pos..]`. Capture group 1, when it took part in the
/// match, is the semantic range; otherwise the whole match is.
fn scan_regex(regex: &Regex, text: &str, pos: usize) -> Option<(usize, usize, Span)> {
    if pos >= text.len() {
        return None;
    }
    let caps = regex.captures(text.get(pos..)?)?;
    let whole = caps.get(0)?;
    let inner = caps.get(1).unwrap_or(whole);
    Some((
        pos + inner.start(),
        pos + inner.end(),
        Span::new(pos + whole.start(), pos + whole.end()),
    ))
}

fn skip_blanks(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && matches!(bytes[pos], b' ' | b'\t' | b'\n' | b'\r') {
        pos += 1;
    }
    pos
}

// === Lexical primitives ===

/// Matches a user-supplied regular expression anchored at the scan position.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    pub fn new(pattern: &str) -> Result<Self, GrammarError> {
        let regex = Regex::new(&format!("^(?:{pattern})")).map_err(|source| {
            GrammarError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;
        Ok(Self { regex })
    }
}

impl Parser for Pattern {
    fn parse<'t>(&self, text: &'t str, pos: usize) -> Option<Element<'t>> {
        let (start, end, span) = scan_regex(&self.regex, text, pos)?;
        Some(Element::Basic(BasicElement::with_span(text, start, end, span)))
    }
}

/// Always matches, consuming nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Empty;

impl Parser for Empty {
    fn parse<'t>(&self, text: &'t str, pos: usize) -> Option<Element<'t>> {
        if pos > text.len() {
            return None;
        }
        Some(Element::Basic(BasicElement::new(text, pos, pos)))
    }
}

/// Exact literal at the scan position.
#[derive(Debug, Clone)]
pub struct Plain {
    literal: String,
}

impl Plain {
    pub fn new(literal: impl Into<String>) -> Self {
        Self {
            literal: literal.into(),
        }
    }
}

impl Parser for Plain {
    fn parse<'t>(&self, text: &'t str, pos: usize) -> Option<Element<'t>> {
        if pos >= text.len() || !text.get(pos..)?.starts_with(&self.literal) {
            return None;
        }
        Some(Element::Basic(BasicElement::new(
            text,
            pos,
            pos + self.literal.len(),
        )))
    }
}

/// A literal preceded by any run of spaces, tabs and line breaks.
///
/// The skipped run belongs to the span only, so `start` is the literal's first byte.
#[derive(Debug, Clone)]
pub struct Symbol {
    literal: String,
}

impl Symbol {
    pub fn new(literal: impl Into<String>) -> Self {
        Self {
            literal: literal.into(),
        }
    }
}

impl Parser for Symbol {
    fn parse<'t>(&self, text: &'t str, pos: usize) -> Option<Element<'t>> {
        if pos >= text.len() {
            return None;
        }
        let start = skip_blanks(text.as_bytes(), pos);
        if !text.get(start..)?.starts_with(&self.literal) {
            return None;
        }
        let end = start + self.literal.len();
        Some(Element::Symbol(BasicElement::with_span(
            text,
            start,
            end,
            Span::new(pos, end),
        )))
    }
}

/// One or more whitespace characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Space;

impl Parser for Space {
    fn parse<'t>(&self, text: &'t str, pos: usize) -> Option<Element<'t>> {
        let (start, end, span) = scan_regex(&SPACE, text, pos)?;
        Some(Element::Basic(BasicElement::with_span(text, start, end, span)))
    }
}

/// An identifier, `[_A-Za-z]\w*`, bounded by word boundaries on both sides.
#[derive(Debug, Clone, Copy, Default)]
pub struct Word;

impl Parser for Word {
    fn parse<'t>(&self, text: &'t str, pos: usize) -> Option<Element<'t>> {
        let (start, end, span) = scan_regex(&WORD, text, pos)?;
        Some(Element::Word(BasicElement::with_span(text, start, end, span)))
    }
}

/// Identifiers joined by dots, such as `a.b.c`. A trailing dot is not consumed.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordDot;

impl Parser for WordDot {
    fn parse<'t>(&self, text: &'t str, pos: usize) -> Option<Element<'t>> {
        let (start, end, span) = scan_regex(&WORD_DOT, text, pos)?;
        Some(Element::WordDot(BasicElement::with_span(
            text, start, end, span,
        )))
    }
}

/// A quoted string with `'` or `"` delimiters and an optional `r` raw marker.
///
/// The semantic range includes the marker and both delimiters. A backslash escapes
/// whatever follows it, the delimiter included.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringLiteral;

impl Parser for StringLiteral {
    fn parse<'t>(&self, text: &'t str, pos: usize) -> Option<Element<'t>> {
        let bytes = text.as_bytes();
        let start = skip_blanks(bytes, pos);
        let mut curr = start;

        let is_raw = bytes.get(curr) == Some(&b'r');
        if is_raw {
            curr += 1;
        }
        let mark = *bytes.get(curr)?;
        if mark != b'"' && mark != b'\'' {
            return None;
        }
        curr += 1;

        let inner_start = curr;
        let mut escaped = false;
        while curr < bytes.len() {
            let byte = bytes[curr];
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == mark {
                let base = BasicElement::with_span(text, start, curr + 1, Span::new(pos, curr + 1));
                return Some(Element::String(StringElement::new(
                    base,
                    Span::new(inner_start, curr),
                    is_raw,
                )));
            }
            curr += 1;
        }
        None
    }
}

/// An integer or decimal literal with an optional leading minus.
#[derive(Debug, Clone, Copy, Default)]
pub struct Number;

impl Parser for Number {
    fn parse<'t>(&self, text: &'t str, pos: usize) -> Option<Element<'t>> {
        if pos >= text.len() {
            return None;
        }
        let caps = NUMBER.captures(text.get(pos..)?)?;
        let whole = caps.get(0)?;
        let int_part = caps.get(1)?;
        let frac_part = caps.get(2);

        let end = frac_part.map_or(int_part.end(), |frac| frac.end());
        let base = BasicElement::with_span(
            text,
            pos + int_part.start(),
            pos + end,
            Span::new(pos + whole.start(), pos + whole.end()),
        );
        Some(Element::Number(NumberElement::new(
            base,
            int_part.as_str(),
            frac_part.map(|frac| frac.as_str()),
        )))
    }
}

/// `true` or `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bool;

impl Parser for Bool {
    fn parse<'t>(&self, text: &'t str, pos: usize) -> Option<Element<'t>> {
        let (start, end, span) = scan_regex(&BOOL, text, pos)?;
        let base = BasicElement::with_span(text, start, end, span);
        let value = base.content() == Some("true");
        Some(Element::Bool(BoolElement::new(base, value)))
    }
}
