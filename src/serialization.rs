use crate::error::ReplaceError;
use miette::Diagnostic;
use serde::Serialize;

/// A flat, serializable view of one rejected edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticRecord {
    pub code: String,
    pub message: String,
    pub offset: usize,
    pub length: usize,
    pub line: usize,
    pub column: usize,
}

#[derive(Serialize)]
pub(crate) struct RewriteRecord<'a> {
    pub output: &'a str,
    pub diagnostics: Vec<DiagnosticRecord>,
}

pub(crate) fn to_record(diagnostic: &ReplaceError) -> DiagnosticRecord {
    let location = diagnostic.location();
    DiagnosticRecord {
        code: diagnostic
            .code()
            .map(|code| code.to_string())
            .unwrap_or_default(),
        message: diagnostic.to_string(),
        offset: location.offset,
        length: diagnostic.span().len(),
        line: location.line,
        column: location.column,
    }
}
