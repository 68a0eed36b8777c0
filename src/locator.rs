use crate::element::{Element, Span};
use crate::parser::{Parser, Rule};
use crate::utils::{
    contains_blank_line, indentation_at, is_blank, line_end, next_line_start,
    next_line_start_or_here, start_of_line,
};
use std::fmt;

/// A located construct.
///
/// `start..end` runs from the header's first non-blank character to the end of the
/// construct; `span` additionally covers whitespace skipped before the header.
#[derive(Clone, PartialEq)]
pub struct Block<'t> {
    text: &'t str,
    start: usize,
    end: usize,
    span: Span,
    indentation: &'t str,
    header: Option<Element<'t>>,
    interior: Option<Span>,
}

impl<'t> Block<'t> {
    pub fn text(&self) -> &'t str {
        self.text
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Leading whitespace of the line the header sits on.
    pub fn indentation(&self) -> &'t str {
        self.indentation
    }

    pub fn header(&self) -> Option<&Element<'t>> {
        self.header.as_ref()
    }

    /// The body between the header line and the closing line, or between the header
    /// and the terminator. `None` for line constructs.
    pub fn interior(&self) -> Option<Span> {
        self.interior
    }

    pub fn content(&self) -> &'t str {
        &self.text[self.start..self.end]
    }

    pub fn textspan(&self) -> &'t str {
        &self.text[self.span.start..self.span.end]
    }

    pub fn interior_content(&self) -> Option<&'t str> {
        let interior = self.interior?;
        self.text.get(interior.start..interior.end)
    }
}

impl fmt::Debug for Block<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("span", &(self.span.start..self.span.end))
            .field("indentation", &self.indentation)
            .field("header", &self.header.as_ref().and_then(Element::content))
            .field("interior", &self.interior.map(|i| i.start..i.end))
            .finish()
    }
}

pub trait Locator {
    /// Locates a construct whose header matches at exactly `pos` and which ends no
    /// later than `limit`.
    fn locate_within<'t>(&self, text: &'t str, pos: usize, limit: usize) -> Option<Block<'t>>;

    fn locate<'t>(&self, text: &'t str, pos: usize) -> Option<Block<'t>> {
        self.locate_within(text, pos, text.len())
    }

    /// Every construct inside `[start, end)`, left to right and non-overlapping.
    ///
    /// A miss moves the scan to the next line. A hit moves it to the first line start
    /// at or after the construct's end, so constructs nested in one already found
    /// are not reported again.
    fn locate_all<'t>(&self, text: &'t str, start: usize, end: usize) -> Vec<Block<'t>> {
        let end = end.min(text.len());
        let mut blocks = Vec::new();
        let mut curr = start;

        while curr < end {
            match self.locate_within(text, curr, end) {
                Some(block) => {
                    log::trace!("located construct at {}..{}", block.start, block.end);
                    let next = next_line_start_or_here(text, block.end);
                    curr = if next > curr {
                        next
                    } else {
                        next_line_start(text, curr)
                    };
                    blocks.push(block);
                }
                None => curr = next_line_start(text, curr),
            }
        }
        blocks
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Closing {
    Line(String),
    Terminator(char),
}

/// Locates header-led constructs with a body.
///
/// The body ends either at a closing line made of the header's own indentation plus
/// a marker (`}` by default), or at a terminator character such as `;`. Nested
/// braces are never counted, so the input must be consistently indented.
#[derive(Debug, Clone)]
pub struct BlockLocator {
    header: Rule,
    closing: Closing,
    indentation: Option<String>,
}

impl BlockLocator {
    pub fn new(header: impl Parser + 'static) -> Self {
        Self {
            header: header.into_rule(),
            closing: Closing::Line("}".to_string()),
            indentation: None,
        }
    }

    /// The body ends at a line holding exactly the header's indentation plus `marker`.
    pub fn closing_line(mut self, marker: impl Into<String>) -> Self {
        self.closing = Closing::Line(marker.into());
        self
    }

    /// The body ends at the first `terminator` after the header instead of a closing
    /// line. Candidates with a blank line before the terminator are rejected.
    pub fn terminator(mut self, terminator: char) -> Self {
        self.closing = Closing::Terminator(terminator);
        self
    }

    /// Only accept constructs whose header line has exactly this indentation.
    pub fn indentation(mut self, expected: impl Into<String>) -> Self {
        self.indentation = Some(expected.into());
        self
    }

    fn find_closing_line(
        &self,
        text: &str,
        marker: &str,
        indentation: &str,
        header_end: usize,
        limit: usize,
    ) -> Option<(usize, Span)> {
        let first_line = next_line_start_or_here(text, header_end);
        let opening = if first_line == header_end {
            header_end
        } else {
            line_end(text, header_end)
        };

        let mut line = first_line;
        while line < limit {
            let next = next_line_start(text, line);
            if next > limit {
                break;
            }
            let content = text[line..next].strip_suffix('\n').unwrap_or(&text[line..next]);
            if content.strip_prefix(indentation) == Some(marker) {
                return Some((next, Span::new(opening, line)));
            }
            if !is_blank(content) && !content.starts_with(indentation) {
                log::trace!("line at {line} leaves indentation {indentation:?}, giving up");
                return None;
            }
            line = next;
        }
        None
    }
}

impl Locator for BlockLocator {
    fn locate_within<'t>(&self, text: &'t str, pos: usize, limit: usize) -> Option<Block<'t>> {
        let limit = limit.min(text.len());
        if pos >= limit {
            return None;
        }
        let header = self.header.parse(text, pos)?;
        let header_end = header.span().end;
        if header_end > limit {
            return None;
        }

        let indentation = indentation_at(text, start_of_line(text, header.start()));
        if let Some(expected) = &self.indentation {
            if indentation != expected.as_str() {
                log::trace!("header at {} has indentation {indentation:?}", header.start());
                return None;
            }
        }

        let (end, interior) = match &self.closing {
            Closing::Terminator(terminator) => {
                let offset = text.get(header_end..limit)?.find(*terminator)?;
                let at = header_end + offset;
                if contains_blank_line(text, header_end, at) {
                    log::trace!("blank line between header at {pos} and terminator at {at}");
                    return None;
                }
                (at + terminator.len_utf8(), Span::new(header_end, at))
            }
            Closing::Line(marker) => {
                self.find_closing_line(text, marker, indentation, header_end, limit)?
            }
        };

        Some(Block {
            text,
            start: header.start(),
            end,
            span: Span::new(pos, end),
            indentation,
            header: Some(header),
            interior: Some(interior),
        })
    }
}

/// Locates single constructs, each matched in full by one parser.
#[derive(Debug, Clone)]
pub struct LineLocator {
    parser: Rule,
    indentation: Option<String>,
}

impl LineLocator {
    pub fn new(parser: impl Parser + 'static) -> Self {
        Self {
            parser: parser.into_rule(),
            indentation: None,
        }
    }

    pub fn indentation(mut self, expected: impl Into<String>) -> Self {
        self.indentation = Some(expected.into());
        self
    }
}

impl Locator for LineLocator {
    fn locate_within<'t>(&self, text: &'t str, pos: usize, limit: usize) -> Option<Block<'t>> {
        let limit = limit.min(text.len());
        if pos >= limit {
            return None;
        }
        let elem = self.parser.parse(text, pos)?;
        let span = elem.span();
        if span.end > limit || !elem.is_valid() {
            return None;
        }

        let indentation = indentation_at(text, start_of_line(text, elem.start()));
        if self
            .indentation
            .as_deref()
            .is_some_and(|expected| expected != indentation)
        {
            return None;
        }
        if contains_blank_line(text, elem.start(), elem.end()) {
            log::trace!("construct at {} spans a blank line", elem.start());
            return None;
        }

        Some(Block {
            text,
            start: elem.start(),
            end: elem.end(),
            span,
            indentation,
            header: Some(elem),
            interior: None,
        })
    }
}
