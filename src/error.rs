use crate::utils::Location;
use miette::{Diagnostic, NamedSource, Report, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum RewriteError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Range(#[from] RangeError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Replace(#[from] ReplaceError),
}

/// Errors raised while composing a grammar out of user input such as patterns.
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum GrammarError {
    #[error("invalid pattern `{pattern}`")]
    #[diagnostic(
        code(grammar::invalid_pattern),
        help("The pattern must be a valid regular expression for the `regex` crate.")
    )]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Why a range could not back an element.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("range {start}..{end} is inverted")]
    #[diagnostic(code(element::inverted_range))]
    Inverted { start: usize, end: usize },

    #[error("offset {offset} lies past the end of the text ({len} bytes)")]
    #[diagnostic(code(element::out_of_bounds))]
    OutOfBounds { offset: usize, len: usize },

    #[error("span {span_start}..{span_end} does not cover content range {start}..{end}")]
    #[diagnostic(code(element::span_mismatch))]
    SpanMismatch {
        start: usize,
        end: usize,
        span_start: usize,
        span_end: usize,
    },

    #[error("offset {offset} is not on a character boundary")]
    #[diagnostic(code(element::char_boundary))]
    NotCharBoundary { offset: usize },
}

/// A rejected edit request. Collected by the replacer, never raised.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum ReplaceError {
    #[error("edit {start}-{end} is out of scope {scope_start}-{scope_end}")]
    #[diagnostic(code(replacer::out_of_scope))]
    OutOfScope {
        #[label("edit requested here")]
        span: SourceSpan,
        start: Location,
        end: Location,
        scope_start: Location,
        scope_end: Location,
        #[help]
        context: String,
    },

    #[error("edit {start}-{end} conflicts with accepted edit {accepted_start}-{accepted_end}")]
    #[diagnostic(code(replacer::conflict))]
    Conflict {
        #[label("rejected edit")]
        span: SourceSpan,
        #[label("accepted edit")]
        accepted: SourceSpan,
        start: Location,
        end: Location,
        accepted_start: Location,
        accepted_end: Location,
        #[help]
        context: String,
    },

    #[error("edit {start}-{end} splits a multi-byte character")]
    #[diagnostic(code(replacer::char_boundary))]
    NotCharBoundary {
        #[label("edit requested here")]
        span: SourceSpan,
        start: Location,
        end: Location,
        #[help]
        context: String,
    },
}

impl ReplaceError {
    /// Where the rejected edit begins.
    pub fn location(&self) -> Location {
        match self {
            ReplaceError::OutOfScope { start, .. }
            | ReplaceError::Conflict { start, .. }
            | ReplaceError::NotCharBoundary { start, .. } => *start,
        }
    }

    /// Source span of the rejected edit.
    pub fn span(&self) -> SourceSpan {
        match self {
            ReplaceError::OutOfScope { span, .. }
            | ReplaceError::Conflict { span, .. }
            | ReplaceError::NotCharBoundary { span, .. } => *span,
        }
    }

    pub fn context(&self) -> &str {
        match self {
            ReplaceError::OutOfScope { context, .. }
            | ReplaceError::Conflict { context, .. }
            | ReplaceError::NotCharBoundary { context, .. } => context,
        }
    }
}

/// Attaches `source` to each diagnostic so labels render against the original text.
pub fn to_reports(diagnostics: &[ReplaceError], name: &str, source: &str) -> Vec<Report> {
    diagnostics
        .iter()
        .map(|diagnostic| {
            Report::new(diagnostic.clone())
                .with_source_code(NamedSource::new(name, source.to_string()))
        })
        .collect()
}

/// A grammar that was wired incorrectly. These are programming mistakes, so they are
/// raised as panics through [`raise`] instead of being returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarDefect {
    #[error("forward rule used before it was defined")]
    UndefinedForward,

    #[error("forward rule outlived the rule it points to")]
    DroppedForward,

    #[error("forward rule defined twice")]
    RedefinedForward,

    #[error("{rule} expected {expected}, but its inner rule produced a {found} element")]
    UnexpectedShape {
        rule: &'static str,
        expected: &'static str,
        found: String,
    },
}

#[track_caller]
pub(crate) fn raise(defect: GrammarDefect) -> ! {
    log::error!("grammar defect: {defect}");
    panic!("grammar defect: {defect}")
}
