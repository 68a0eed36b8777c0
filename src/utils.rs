use serde::Serialize;
use std::fmt::{self, Display};

/// Returns the offset of the first byte of the line following `pos`, or `text.len()`
/// if `pos` is on the last line.
pub fn next_line_start(text: &str, pos: usize) -> usize {
    let from = pos.min(text.len());
    match text.as_bytes()[from..].iter().position(|&b| b == b'\n') {
        Some(offset) => from + offset + 1,
        None => text.len(),
    }
}

/// Like [`next_line_start`], but returns `pos` itself when it already is a line start.
pub fn next_line_start_or_here(text: &str, pos: usize) -> usize {
    if pos == 0 || (pos <= text.len() && text.as_bytes()[pos - 1] == b'\n') {
        return pos;
    }
    next_line_start(text, pos)
}

/// Returns the offset of the first byte of the line containing `pos`.
pub fn start_of_line(text: &str, pos: usize) -> usize {
    let to = pos.min(text.len());
    match text.as_bytes()[..to].iter().rposition(|&b| b == b'\n') {
        Some(newline) => newline + 1,
        None => 0,
    }
}

/// Returns the offset of the newline terminating the line containing `pos`, or
/// `text.len()` when that line has no terminator.
pub fn line_end(text: &str, pos: usize) -> usize {
    let from = pos.min(text.len());
    match text.as_bytes()[from..].iter().position(|&b| b == b'\n') {
        Some(offset) => from + offset,
        None => text.len(),
    }
}

/// The largest char boundary not after `pos`, clamped to the text.
pub fn floor_char_boundary(text: &str, pos: usize) -> usize {
    let mut pos = pos.min(text.len());
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// The run of spaces and tabs starting at `pos`.
pub fn indentation_at(text: &str, pos: usize) -> &str {
    let from = floor_char_boundary(text, pos);
    let width = text.as_bytes()[from..]
        .iter()
        .take_while(|&&b| b == b' ' || b == b'\t')
        .count();
    &text[from..from + width]
}

pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Whether `text[start..end]` contains a complete line that holds only whitespace.
///
/// The partial lines at either edge of the range do not count: a blank line needs a
/// newline on both sides inside the range.
pub fn contains_blank_line(text: &str, start: usize, end: usize) -> bool {
    let Some(region) = text.get(start..end.min(text.len())) else {
        return false;
    };
    let mut lines = region.split('\n');
    lines.next();
    let mut inner: Vec<&str> = lines.collect();
    inner.pop();
    inner.iter().any(|line| is_blank(line))
}

/// A 1-based line and column (in characters) for a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(line {}, col {})", self.line, self.column)
    }
}

/// Index of line starts over a text buffer.
///
/// Built once by scanning the whole buffer for newlines, so that every later
/// position lookup is a binary search instead of a rescan.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            text.bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { starts }
    }

    /// 1-based line number of `pos`.
    pub fn line_of(&self, pos: usize) -> usize {
        self.starts.partition_point(|&start| start <= pos)
    }

    /// Byte offset where the given 1-based line begins.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.starts.get(line.checked_sub(1)?).copied()
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }

    /// Offsets past the end of `text` are reported at the end.
    pub fn locate(&self, text: &str, pos: usize) -> Location {
        let pos = pos.min(text.len());
        let line = self.line_of(pos);
        let start = self.starts[line - 1];
        let column = match text.get(start..pos) {
            Some(prefix) => prefix.chars().count() + 1,
            None => pos - start + 1,
        };
        Location {
            offset: pos,
            line,
            column,
        }
    }

    /// Renders the lines touched by `start..end` the way they appear in diagnostics:
    /// a `line N` / `lines N-M` heading followed by the numbered source lines.
    pub fn excerpt(&self, text: &str, start: usize, end: usize) -> String {
        let first = self.line_of(start);
        let mut last = self.line_of(end);
        if end > start && last > first && self.line_start(last) == Some(end) {
            last -= 1;
        }

        let mut out = if last > first {
            format!("lines {first}-{last}\n")
        } else {
            format!("line {first}\n")
        };
        out.push_str(&self.numbered_line(text, first));
        if last > first + 1 {
            out.push_str("    ...\n");
        }
        if last > first {
            out.push_str(&self.numbered_line(text, last));
        }
        out
    }

    fn numbered_line(&self, text: &str, line: usize) -> String {
        let Some(start) = self.line_start(line).filter(|&start| start < text.len()) else {
            return "    eof\n".to_string();
        };
        let end = next_line_start(text, start);
        let content = text[start..end].trim_end_matches('\n');
        format!("{line:>7}: {content}\n")
    }
}
