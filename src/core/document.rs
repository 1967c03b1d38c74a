//! Line-addressable document contract and an in-memory implementation.

/// A mutable, line-addressable text buffer the diff engine scans.
///
/// The engine never owns the document; it reads lines through this trait and
/// applies two kinds of mutation: deleting a line range after a hunk has been
/// consumed, and toggling a "hidden" attribute over a line range. Hidden lines
/// stay in the raw text but are skipped by line-number projection.
pub trait LineDocument {
    /// Number of lines in the document.
    fn line_count(&self) -> usize;

    /// Text of the given 0-based line, without its trailing newline.
    /// Returns `None` when the line is out of bounds.
    fn line_text(&self, line: usize) -> Option<&str>;

    /// Delete the half-open line range `[start, end)`.
    fn delete_lines(&mut self, start: usize, end: usize);

    /// Apply or remove the hidden marking over `[start, end)`.
    fn set_lines_hidden(&mut self, start: usize, end: usize, hidden: bool);

    /// Whether the given line carries the hidden marking.
    fn is_line_hidden(&self, line: usize) -> bool;
}

#[derive(Debug, Clone)]
struct LineRecord {
    text: String,
    hidden: bool,
}

/// In-memory [`LineDocument`] used by the CLI and tests.
///
/// - Normalizes CRLF to LF on construction and append.
/// - Lines arrive and are stored without trailing newlines.
#[derive(Debug, Clone, Default)]
pub struct TextDocument {
    lines: Vec<LineRecord>,
}

impl TextDocument {
    /// Create a document from raw text, splitting on newlines.
    pub fn new(text: &str) -> Self {
        let mut doc = Self { lines: Vec::new() };
        doc.append_text(text);
        doc
    }

    /// Create a document from individual lines.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        Self {
            lines: lines
                .iter()
                .map(|l| LineRecord {
                    text: l.as_ref().to_string(),
                    hidden: false,
                })
                .collect(),
        }
    }

    /// Append one line at the end of the document.
    pub fn append_line(&mut self, line: &str) {
        self.lines.push(LineRecord {
            text: line.trim_end_matches('\r').to_string(),
            hidden: false,
        });
    }

    /// Append a chunk of text as trailing whole lines.
    ///
    /// A trailing newline does not produce an empty final line; diff output
    /// arrives line-wise so partial trailing lines are not supported.
    pub fn append_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let body = text.strip_suffix('\n').unwrap_or(text);
        for line in body.split('\n') {
            self.append_line(line);
        }
    }

    /// Whether the document has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Reassemble the full text, one trailing newline per line.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for record in &self.lines {
            out.push_str(&record.text);
            out.push('\n');
        }
        out
    }
}

impl LineDocument for TextDocument {
    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line_text(&self, line: usize) -> Option<&str> {
        self.lines.get(line).map(|r| r.text.as_str())
    }

    fn delete_lines(&mut self, start: usize, end: usize) {
        let end = end.min(self.lines.len());
        if start >= end {
            return;
        }
        self.lines.drain(start..end);
    }

    fn set_lines_hidden(&mut self, start: usize, end: usize, hidden: bool) {
        let end = end.min(self.lines.len());
        for record in self.lines.get_mut(start..end).unwrap_or_default() {
            record.hidden = hidden;
        }
    }

    fn is_line_hidden(&self, line: usize) -> bool {
        self.lines.get(line).map(|r| r.hidden).unwrap_or(false)
    }
}
