use crate::error::{to_reports, ReplaceError, RewriteError};
use crate::locator::{Block, Locator};
use crate::replacer::Replacer;
use crate::serialization::{to_record, DiagnosticRecord, RewriteRecord};
use miette::{GraphicalReportHandler, GraphicalTheme, Report};
use serde::{Serialize, Serializer};

/// The rewritten text of one window, plus every edit that was refused on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteResult {
    pub output: String,
    pub diagnostics: Vec<ReplaceError>,
}

impl Serialize for RewriteResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        RewriteRecord {
            output: &self.output,
            diagnostics: self.records(),
        }
        .serialize(serializer)
    }
}

impl RewriteResult {
    #[must_use]
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.diagnostics.iter().map(to_record).collect()
    }

    /// The output, or the first diagnostic if any edit was refused.
    ///
    /// # Errors
    /// Returns the first collected [`ReplaceError`], wrapped in a [`RewriteError`].
    pub fn into_output(self) -> Result<String, RewriteError> {
        match self.diagnostics.into_iter().next() {
            Some(diagnostic) => Err(diagnostic.into()),
            None => Ok(self.output),
        }
    }

    /// Hands the diagnostics to an enclosing rewrite and returns the output. Meant for
    /// transformations that rewrite a construct's interior before replacing it.
    pub fn collect_into(self, sink: &mut Vec<ReplaceError>) -> String {
        sink.extend(self.diagnostics);
        self.output
    }

    /// Serializes the output and diagnostics into a pretty-printed JSON string.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self)
    }

    /// Serializes the output and diagnostics into a YAML string.
    ///
    /// # Errors
    /// Returns a `serde_yaml::Error` if serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self)
    }

    /// One report per diagnostic, with `source` attached under `name`.
    #[must_use]
    pub fn reports(&self, name: &str, source: &str) -> Vec<Report> {
        to_reports(&self.diagnostics, name, source)
    }

    /// Renders every diagnostic as uncolored text.
    ///
    /// # Errors
    /// Returns `std::fmt::Error` if a report cannot be rendered.
    pub fn render(&self, name: &str, source: &str) -> Result<String, std::fmt::Error> {
        let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor());
        let mut buffer = String::new();
        for report in self.reports(name, source) {
            handler.render_report(&mut buffer, &*report)?;
        }
        Ok(buffer)
    }
}

/// Rewrites every construct `locator` finds inside `text[start..end]`.
///
/// `transform` sees each located [`Block`] and returns its replacement, or `None` to
/// leave it as it is. The replacement covers `block.start()..block.end()`, so
/// whitespace before a construct is kept. To handle nested constructs, call
/// `rewrite` again over [`Block::interior`] and pass the inner result's diagnostics
/// to the vector handed to `transform` (see [`RewriteResult::collect_into`]).
///
/// Refused edits never abort the rewrite. They show up in
/// [`RewriteResult::diagnostics`] next to the best-effort output.
pub fn rewrite<'t, L, F>(
    text: &'t str,
    start: usize,
    end: usize,
    locator: &L,
    mut transform: F,
) -> RewriteResult
where
    L: Locator + ?Sized,
    F: FnMut(&Block<'t>, &mut Vec<ReplaceError>) -> Option<String>,
{
    let mut replacer = Replacer::new(text, start, end);
    let scope = replacer.scope();
    let mut diagnostics = Vec::new();

    for block in locator.locate_all(text, scope.start, scope.end) {
        if let Some(replacement) = transform(&block, &mut diagnostics) {
            replacer.update(block.start(), block.end(), replacement);
        }
    }

    let output = replacer.digest();
    diagnostics.extend(replacer.into_diagnostics());
    RewriteResult {
        output,
        diagnostics,
    }
}
