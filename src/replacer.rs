use crate::element::Span;
use crate::error::ReplaceError;
use crate::utils::{floor_char_boundary, LineIndex, Location};
use miette::SourceSpan;

/// A request to replace `text[start..end]`. Zero-width edits insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
}

impl Edit {
    pub fn new(start: usize, end: usize, replacement: impl Into<String>) -> Self {
        Self {
            start,
            end,
            replacement: replacement.into(),
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// Whether both edits claim the same text. Edits that only touch at a boundary
    /// do not conflict, and neither do two insertions at one position.
    pub fn conflicts_with(&self, other: &Edit) -> bool {
        let (a, b) = (self.span(), other.span());
        a.overlaps(b) || (a == b && !a.is_empty())
    }
}

/// Collects edits against a window of a buffer and splices them in one pass.
///
/// Edits outside the window, edits that split a character and edits that conflict
/// with an already accepted edit are refused. Each refusal is kept as a
/// [`ReplaceError`] and the rest of the edits still apply.
#[derive(Debug, Clone)]
pub struct Replacer<'t> {
    text: &'t str,
    scope: Span,
    edits: Vec<Edit>,
    diagnostics: Vec<ReplaceError>,
    lines: LineIndex,
}

impl<'t> Replacer<'t> {
    /// A replacer over `text[start..end]`. The window is clamped to the text.
    pub fn new(text: &'t str, start: usize, end: usize) -> Self {
        let end = floor_char_boundary(text, end.min(text.len()));
        let start = floor_char_boundary(text, start.min(end));
        Self {
            text,
            scope: Span::new(start, end),
            edits: Vec::new(),
            diagnostics: Vec::new(),
            lines: LineIndex::new(text),
        }
    }

    pub fn whole(text: &'t str) -> Self {
        Self::new(text, 0, text.len())
    }

    pub fn text(&self) -> &'t str {
        self.text
    }

    pub fn scope(&self) -> Span {
        self.scope
    }

    /// Accepted edits in submission order.
    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    pub fn diagnostics(&self) -> &[ReplaceError] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<ReplaceError> {
        self.diagnostics
    }

    pub fn line_col(&self, pos: usize) -> Location {
        self.lines.locate(self.text, pos)
    }

    /// Requests `text[start..end]` to be replaced. Returns whether the edit was accepted.
    pub fn update(&mut self, start: usize, end: usize, replacement: impl Into<String>) -> bool {
        self.submit(Edit::new(start, end, replacement))
    }

    pub fn submit(&mut self, edit: Edit) -> bool {
        match self.check(&edit) {
            Ok(()) => {
                log::debug!(
                    "accepted edit {}..{} ({} bytes)",
                    edit.start,
                    edit.end,
                    edit.replacement.len()
                );
                self.edits.push(edit);
                true
            }
            Err(err) => {
                log::warn!("{err}");
                self.diagnostics.push(err);
                false
            }
        }
    }

    fn check(&self, edit: &Edit) -> Result<(), ReplaceError> {
        let (start, end) = (edit.start, edit.end);
        if start > end || !self.scope.contains(edit.span()) {
            return Err(ReplaceError::OutOfScope {
                span: self.label(start, end),
                start: self.line_col(start),
                end: self.line_col(end),
                scope_start: self.line_col(self.scope.start),
                scope_end: self.line_col(self.scope.end),
                context: self.lines.excerpt(self.text, start, end),
            });
        }

        if !self.text.is_char_boundary(start) || !self.text.is_char_boundary(end) {
            return Err(ReplaceError::NotCharBoundary {
                span: self.label(start, end),
                start: self.line_col(start),
                end: self.line_col(end),
                context: self.lines.excerpt(self.text, start, end),
            });
        }

        if let Some(accepted) = self.edits.iter().find(|other| other.conflicts_with(edit)) {
            return Err(ReplaceError::Conflict {
                span: self.label(start, end),
                accepted: self.label(accepted.start, accepted.end),
                start: self.line_col(start),
                end: self.line_col(end),
                accepted_start: self.line_col(accepted.start),
                accepted_end: self.line_col(accepted.end),
                context: format!(
                    "rejected {}accepted {}",
                    self.lines.excerpt(self.text, start, end),
                    self.lines.excerpt(self.text, accepted.start, accepted.end)
                ),
            });
        }

        Ok(())
    }

    fn label(&self, start: usize, end: usize) -> SourceSpan {
        let start = start.min(self.text.len());
        let end = end.clamp(start, self.text.len());
        (start, end - start).into()
    }

    /// The window's text with every accepted edit applied.
    ///
    /// Edits are applied in `(start, end)` order; insertions at one position keep their
    /// submission order.
    pub fn digest(&self) -> String {
        let mut ordered: Vec<&Edit> = self.edits.iter().collect();
        ordered.sort_by_key(|edit| (edit.start, edit.end));

        let mut out = String::with_capacity(self.scope.len());
        let mut curr = self.scope.start;
        for edit in ordered {
            if curr < edit.start {
                out.push_str(&self.text[curr..edit.start]);
            }
            out.push_str(&edit.replacement);
            curr = curr.max(edit.end);
        }
        if curr < self.scope.end {
            out.push_str(&self.text[curr..self.scope.end]);
        }
        out
    }
}
