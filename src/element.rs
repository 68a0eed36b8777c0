use crate::error::RangeError;
use std::fmt;
use std::ops::{Index, Range};

/// A half-open byte range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub const fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Whether the two ranges share a position in their open interiors.
    pub const fn overlaps(self, other: Span) -> bool {
        self.end > other.start && other.end > self.start
    }

    pub const fn contains(self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        (span.start, span.len()).into()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
struct Bounds {
    start: usize,
    end: usize,
    span: Span,
}

/// The fields every element carries.
///
/// An element built from a range that breaks `span.start <= start <= end <= span.end <=
/// text.len()` is *invalid*: it still exists, but [`content`](Self::content) and
/// [`textspan`](Self::textspan) report nothing. Use [`try_new`](Self::try_new) to get
/// the reason instead.
#[derive(Clone, Copy)]
pub struct BasicElement<'t> {
    text: &'t str,
    bounds: Option<Bounds>,
}

impl<'t> BasicElement<'t> {
    pub fn new(text: &'t str, start: usize, end: usize) -> Self {
        Self::with_span(text, start, end, Span::new(start, end))
    }

    pub fn with_span(text: &'t str, start: usize, end: usize, span: Span) -> Self {
        match Self::try_new(text, start, end, span) {
            Ok(element) => element,
            Err(err) => {
                log::debug!("invalid element: {err}");
                Self::invalid(text)
            }
        }
    }

    pub fn try_new(text: &'t str, start: usize, end: usize, span: Span) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::Inverted { start, end });
        }
        if span.end > text.len() || end > text.len() {
            return Err(RangeError::OutOfBounds {
                offset: span.end.max(end),
                len: text.len(),
            });
        }
        if span.start > start || span.end < end {
            return Err(RangeError::SpanMismatch {
                start,
                end,
                span_start: span.start,
                span_end: span.end,
            });
        }
        if let Some(offset) = [span.start, start, end, span.end]
            .into_iter()
            .find(|&offset| !text.is_char_boundary(offset))
        {
            return Err(RangeError::NotCharBoundary { offset });
        }

        Ok(Self {
            text,
            bounds: Some(Bounds { start, end, span }),
        })
    }

    pub fn invalid(text: &'t str) -> Self {
        Self { text, bounds: None }
    }

    pub fn is_valid(&self) -> bool {
        self.bounds.is_some()
    }

    pub fn text(&self) -> &'t str {
        self.text
    }

    pub fn start(&self) -> usize {
        self.bounds.map_or(0, |b| b.start)
    }

    pub fn end(&self) -> usize {
        self.bounds.map_or(0, |b| b.end)
    }

    /// Everything consumed by the match. Empty at offset 0 for an invalid element.
    pub fn span(&self) -> Span {
        self.bounds.map_or_else(Span::default, |b| b.span)
    }

    pub fn content(&self) -> Option<&'t str> {
        let b = self.bounds?;
        self.text.get(b.start..b.end)
    }

    pub fn textspan(&self) -> Option<&'t str> {
        let b = self.bounds?;
        self.text.get(b.span.start..b.span.end)
    }
}

impl fmt::Debug for BasicElement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bounds {
            Some(b) => f
                .debug_struct("BasicElement")
                .field("start", &b.start)
                .field("end", &b.end)
                .field("span", &(b.span.start..b.span.end))
                .field("content", &self.content())
                .finish(),
            None => f.write_str("BasicElement(invalid)"),
        }
    }
}

impl PartialEq for BasicElement<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.text, other.text) && self.bounds == other.bounds
    }
}

/// A quoted literal such as `"a\"b"` or `r'raw'`.
#[derive(Debug, Clone, PartialEq)]
pub struct StringElement<'t> {
    base: BasicElement<'t>,
    inner: Span,
    is_raw: bool,
}

impl<'t> StringElement<'t> {
    pub fn new(base: BasicElement<'t>, inner: Span, is_raw: bool) -> Self {
        Self {
            base,
            inner,
            is_raw,
        }
    }

    pub fn base(&self) -> &BasicElement<'t> {
        &self.base
    }

    /// The range between the delimiters.
    pub fn inner(&self) -> Span {
        self.inner
    }

    /// The literal's text without delimiters or raw marker, escapes left as written.
    pub fn inner_content(&self) -> Option<&'t str> {
        self.base.text().get(self.inner.start..self.inner.end)
    }

    pub fn is_raw(&self) -> bool {
        self.is_raw
    }
}

/// A numeric literal. Kept as text so the source formatting survives.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberElement<'t> {
    base: BasicElement<'t>,
    int_part: &'t str,
    frac_part: Option<&'t str>,
}

impl<'t> NumberElement<'t> {
    pub fn new(base: BasicElement<'t>, int_part: &'t str, frac_part: Option<&'t str>) -> Self {
        Self {
            base,
            int_part,
            frac_part,
        }
    }

    pub fn base(&self) -> &BasicElement<'t> {
        &self.base
    }

    /// The integer digits including a leading minus sign.
    pub fn int_part(&self) -> &'t str {
        self.int_part
    }

    pub fn frac_part(&self) -> Option<&'t str> {
        self.frac_part
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoolElement<'t> {
    base: BasicElement<'t>,
    value: bool,
}

impl<'t> BoolElement<'t> {
    pub fn new(base: BasicElement<'t>, value: bool) -> Self {
        Self { base, value }
    }

    pub fn base(&self) -> &BasicElement<'t> {
        &self.base
    }

    pub fn value(&self) -> bool {
        self.value
    }
}

/// A fixed-arity run of sub-elements produced by a sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinElement<'t> {
    base: BasicElement<'t>,
    elements: Vec<Element<'t>>,
}

impl<'t> JoinElement<'t> {
    /// Semantic range from the first element's start to the last element's end.
    /// Without elements the result is invalid.
    pub fn new(text: &'t str, elements: Vec<Element<'t>>, span: Span) -> Self {
        let base = match (elements.first(), elements.last()) {
            (Some(first), Some(last)) => {
                BasicElement::with_span(text, first.start(), last.end(), span)
            }
            _ => BasicElement::invalid(text),
        };
        Self { base, elements }
    }

    /// Semantic range given explicitly, for runs whose own delimiters bound them.
    pub fn with_bounds(
        text: &'t str,
        elements: Vec<Element<'t>>,
        span: Span,
        start: usize,
        end: usize,
    ) -> Self {
        Self {
            base: BasicElement::with_span(text, start, end, span),
            elements,
        }
    }

    pub fn base(&self) -> &BasicElement<'t> {
        &self.base
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Element<'t>> {
        self.elements.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Element<'t>> {
        self.elements.iter()
    }

    pub fn elements(&self) -> &[Element<'t>] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<Element<'t>> {
        self.elements
    }
}

impl<'t> Index<usize> for JoinElement<'t> {
    type Output = Element<'t>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.elements[index]
    }
}

/// Items of a separated list; the separators themselves are not kept.
#[derive(Debug, Clone, PartialEq)]
pub struct ListElement<'t> {
    items: JoinElement<'t>,
    has_trailing_separator: bool,
}

impl<'t> ListElement<'t> {
    pub fn new(items: JoinElement<'t>, has_trailing_separator: bool) -> Self {
        Self {
            items,
            has_trailing_separator,
        }
    }

    pub fn base(&self) -> &BasicElement<'t> {
        self.items.base()
    }

    pub fn has_trailing_separator(&self) -> bool {
        self.has_trailing_separator
    }

    pub fn as_join(&self) -> &JoinElement<'t> {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Element<'t>> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Element<'t>> {
        self.items.iter()
    }
}

impl<'t> Index<usize> for ListElement<'t> {
    type Output = Element<'t>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.items[index]
    }
}

/// One slot per sub-parser of a one-or-more group; `None` where it did not match.
#[derive(Debug, Clone, PartialEq)]
pub struct OneOrMoreElement<'t> {
    base: BasicElement<'t>,
    items: Vec<Option<Element<'t>>>,
}

impl<'t> OneOrMoreElement<'t> {
    pub fn new(base: BasicElement<'t>, items: Vec<Option<Element<'t>>>) -> Self {
        Self { base, items }
    }

    pub fn base(&self) -> &BasicElement<'t> {
        &self.base
    }

    pub fn items(&self) -> &[Option<Element<'t>>] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&Element<'t>> {
        self.items.get(index)?.as_ref()
    }

    /// How many sub-parsers contributed a match.
    pub fn matched(&self) -> usize {
        self.items.iter().flatten().count()
    }
}

/// A possibly generic type name such as `Map<String, List<Widget>>`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeNameElement<'t> {
    base: BasicElement<'t>,
    name: BasicElement<'t>,
    template_types: Option<ListElement<'t>>,
}

impl<'t> TypeNameElement<'t> {
    /// The semantic range runs from the name to the closing bracket of the arguments.
    pub fn new(
        text: &'t str,
        name: BasicElement<'t>,
        template_types: Option<ListElement<'t>>,
        span: Span,
    ) -> Self {
        let end = template_types
            .as_ref()
            .map_or(name.end(), |args| args.base().span().end);
        Self {
            base: BasicElement::with_span(text, name.start(), end, span),
            name,
            template_types,
        }
    }

    pub fn base(&self) -> &BasicElement<'t> {
        &self.base
    }

    pub fn name(&self) -> &BasicElement<'t> {
        &self.name
    }

    /// The bracketed argument list, brackets included in its content.
    pub fn template_types(&self) -> Option<&ListElement<'t>> {
        self.template_types.as_ref()
    }

    pub fn arguments(&self) -> impl Iterator<Item = &TypeNameElement<'t>> {
        self.template_types
            .iter()
            .flat_map(ListElement::iter)
            .filter_map(Element::as_type_name)
    }

    pub fn is_generic(&self) -> bool {
        self.template_types.is_some()
    }
}

/// The result of every recognizer and combinator.
#[derive(Debug, Clone, PartialEq)]
pub enum Element<'t> {
    /// Plain match: literal, pattern, whitespace, empty or missed optional.
    Basic(BasicElement<'t>),
    /// Literal matched after skipping leading whitespace.
    Symbol(BasicElement<'t>),
    Word(BasicElement<'t>),
    WordDot(BasicElement<'t>),
    String(StringElement<'t>),
    Number(NumberElement<'t>),
    Bool(BoolElement<'t>),
    Join(JoinElement<'t>),
    List(ListElement<'t>),
    OneOrMore(OneOrMoreElement<'t>),
    TypeName(TypeNameElement<'t>),
}

impl<'t> Element<'t> {
    pub fn base(&self) -> &BasicElement<'t> {
        match self {
            Element::Basic(base)
            | Element::Symbol(base)
            | Element::Word(base)
            | Element::WordDot(base) => base,
            Element::String(e) => e.base(),
            Element::Number(e) => e.base(),
            Element::Bool(e) => e.base(),
            Element::Join(e) => e.base(),
            Element::List(e) => e.base(),
            Element::OneOrMore(e) => e.base(),
            Element::TypeName(e) => e.base(),
        }
    }

    /// Short name of the variant, used in defect messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Element::Basic(_) => "basic",
            Element::Symbol(_) => "symbol",
            Element::Word(_) => "word",
            Element::WordDot(_) => "dotted word",
            Element::String(_) => "string",
            Element::Number(_) => "number",
            Element::Bool(_) => "bool",
            Element::Join(_) => "join",
            Element::List(_) => "list",
            Element::OneOrMore(_) => "one-or-more",
            Element::TypeName(_) => "type name",
        }
    }

    pub fn start(&self) -> usize {
        self.base().start()
    }

    pub fn end(&self) -> usize {
        self.base().end()
    }

    pub fn span(&self) -> Span {
        self.base().span()
    }

    pub fn is_valid(&self) -> bool {
        self.base().is_valid()
    }

    pub fn content(&self) -> Option<&'t str> {
        self.base().content()
    }

    pub fn textspan(&self) -> Option<&'t str> {
        self.base().textspan()
    }

    /// Whether the semantic range is zero-width, as for a missed optional.
    pub fn is_empty(&self) -> bool {
        self.start() == self.end()
    }

    /// The sub-elements of a join or list.
    pub fn as_join(&self) -> Option<&JoinElement<'t>> {
        match self {
            Element::Join(join) => Some(join),
            Element::List(list) => Some(list.as_join()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListElement<'t>> {
        match self {
            Element::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&StringElement<'t>> {
        match self {
            Element::String(string) => Some(string),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&NumberElement<'t>> {
        match self {
            Element::Number(number) => Some(number),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<&BoolElement<'t>> {
        match self {
            Element::Bool(boolean) => Some(boolean),
            _ => None,
        }
    }

    pub fn as_one_or_more(&self) -> Option<&OneOrMoreElement<'t>> {
        match self {
            Element::OneOrMore(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_type_name(&self) -> Option<&TypeNameElement<'t>> {
        match self {
            Element::TypeName(type_name) => Some(type_name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = r#"/* hello world
This is a test string.
Below is a C program */

#include <stdio.h>

int main() {
	printf("Hello World");
	return 0;
}
"#;

    #[test]
    fn test_basic_element() {
        let pos = TEXT.find("main").unwrap();
        let elem = BasicElement::new(TEXT, pos, pos + 4);
        assert_eq!(elem.content(), Some("main"));
        assert_eq!(elem.textspan(), Some("main"));

        let elem = BasicElement::with_span(TEXT, pos, pos + 4, Span::new(pos - 1, pos + 4));
        assert_eq!(elem.content(), Some("main"));
        assert_eq!(elem.textspan(), Some(" main"));

        let elem = BasicElement::with_span(TEXT, pos, pos + 4, Span::new(pos + 1, pos + 4));
        assert!(!elem.is_valid());
        assert_eq!(elem.content(), None);
        assert_eq!(elem.textspan(), None);
    }

    #[test]
    fn test_try_new_reports_reason() {
        assert_eq!(
            BasicElement::try_new("abc", 2, 1, Span::new(1, 2)).unwrap_err(),
            RangeError::Inverted { start: 2, end: 1 }
        );
        assert_eq!(
            BasicElement::try_new("abc", 0, 4, Span::new(0, 4)).unwrap_err(),
            RangeError::OutOfBounds { offset: 4, len: 3 }
        );
        assert!(matches!(
            BasicElement::try_new("abc", 0, 2, Span::new(1, 3)),
            Err(RangeError::SpanMismatch { .. })
        ));
        assert_eq!(
            BasicElement::try_new("é", 0, 1, Span::new(0, 1)).unwrap_err(),
            RangeError::NotCharBoundary { offset: 1 }
        );
    }

    #[test]
    fn test_word_element() {
        let pos = TEXT.find("main").unwrap();
        let elem = Element::Word(BasicElement::new(TEXT, pos, pos + 4));
        assert_eq!(elem.content(), Some("main"));
        assert_eq!(elem.kind(), "word");
    }

    #[test]
    fn test_join_element_bounds() {
        let text = "int x";
        let join = JoinElement::new(
            text,
            vec![
                Element::Word(BasicElement::new(text, 0, 3)),
                Element::Word(BasicElement::with_span(text, 4, 5, Span::new(3, 5))),
            ],
            Span::new(0, 5),
        );
        assert_eq!(join.len(), 2);
        assert_eq!(join.base().content(), Some("int x"));
        assert_eq!(join[1].content(), Some("x"));

        let empty = JoinElement::new(text, Vec::new(), Span::new(0, 0));
        assert!(!empty.base().is_valid());
        assert_eq!(empty.base().content(), None);
    }

    #[test]
    fn test_span_overlap() {
        assert!(Span::new(10, 20).overlaps(Span::new(15, 25)));
        assert!(!Span::new(10, 20).overlaps(Span::new(20, 25)));
        assert!(!Span::new(12, 12).overlaps(Span::new(12, 12)));
        assert!(Span::new(10, 20).contains(Span::new(12, 12)));
        assert_eq!(Span::new(3, 7).len(), 4);
    }
}
