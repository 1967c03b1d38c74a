//! Single-pass, resumable scanner for file-header and hunk boundaries.

use crate::core::LineDocument;

/// Metadata for a region discovered by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionDescriptor {
    /// A `diff --git` file header. Blob hashes are parsed lazily later.
    Header,
    /// An `@@ -old,count +new,count @@` hunk marker.
    Hunk {
        /// Old-file start line parsed from the marker (0 when malformed).
        old_start: u32,
        /// New-file start line parsed from the marker (0 when malformed).
        new_start: u32,
    },
}

/// Lazy iterator over the regions starting in `[from_line, to_line]`.
///
/// The sequence is finite and resumable only by constructing a new scanner
/// from a given line. Cost is O(line length) per visited line.
pub struct DiffScanner<'a, D: LineDocument + ?Sized> {
    document: &'a D,
    line: usize,
    to_line: usize,
}

impl<'a, D: LineDocument + ?Sized> DiffScanner<'a, D> {
    /// Scan `document` over the inclusive line range `[from_line, to_line]`.
    pub fn new(document: &'a D, from_line: usize, to_line: usize) -> Self {
        Self {
            document,
            line: from_line,
            to_line,
        }
    }
}

impl<'a, D: LineDocument + ?Sized> Iterator for DiffScanner<'a, D> {
    type Item = (usize, RegionDescriptor);

    fn next(&mut self) -> Option<Self::Item> {
        while self.line <= self.to_line {
            let line = self.line;
            self.line += 1;
            let text = self.document.line_text(line)?;
            if let Some(descriptor) = classify_line(text) {
                return Some((line, descriptor));
            }
        }
        None
    }
}

/// Classify one line as a region start, or `None` for ordinary diff body.
pub fn classify_line(text: &str) -> Option<RegionDescriptor> {
    if text.starts_with("@@ ") {
        let (old_start, new_start) = parse_hunk_marker(text);
        Some(RegionDescriptor::Hunk {
            old_start,
            new_start,
        })
    } else if text.starts_with("diff --git ") {
        Some(RegionDescriptor::Header)
    } else {
        None
    }
}

/// Parse `old_start`/`new_start` from a hunk marker line.
///
/// `old_start` is the integer following the first `'-'`, `new_start` the
/// integer following the first `'+'`. A marker missing either field yields
/// `(0, 0)`: the region is still recorded, with degenerate line numbers.
fn parse_hunk_marker(text: &str) -> (u32, u32) {
    match (number_after(text, '-'), number_after(text, '+')) {
        (Some(old), Some(new)) => (old, new),
        _ => (0, 0),
    }
}

fn number_after(text: &str, marker: char) -> Option<u32> {
    let rest = &text[text.find(marker)? + marker.len_utf8()..];
    let digits: &str = &rest[..rest
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(rest.len())];
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TextDocument;

    #[test]
    fn classifies_header() {
        assert_eq!(
            classify_line("diff --git a/x b/x"),
            Some(RegionDescriptor::Header)
        );
    }

    #[test]
    fn classifies_hunk_marker() {
        assert_eq!(
            classify_line("@@ -12,4 +15,6 @@ fn main() {"),
            Some(RegionDescriptor::Hunk {
                old_start: 12,
                new_start: 15
            })
        );
    }

    #[test]
    fn marker_without_counts() {
        // Single-line hunks omit the count; the start still parses.
        assert_eq!(
            classify_line("@@ -1 +1 @@"),
            Some(RegionDescriptor::Hunk {
                old_start: 1,
                new_start: 1
            })
        );
    }

    #[test]
    fn malformed_marker_yields_zeros() {
        assert_eq!(
            classify_line("@@ garbage @@"),
            Some(RegionDescriptor::Hunk {
                old_start: 0,
                new_start: 0
            })
        );
    }

    #[test]
    fn body_lines_are_not_regions() {
        assert_eq!(classify_line(" context"), None);
        assert_eq!(classify_line("+added"), None);
        assert_eq!(classify_line("-removed"), None);
        assert_eq!(classify_line("index aaaa..bbbb 100644"), None);
        // "@@" without the trailing space is not a marker start
        assert_eq!(classify_line("@@"), None);
    }

    #[test]
    fn scans_range_in_order() {
        let doc = TextDocument::from_lines(&[
            "diff --git a/x b/x",
            "--- a/x",
            "+++ b/x",
            "@@ -1,2 +1,2 @@",
            " ctx",
        ]);
        let found: Vec<_> = DiffScanner::new(&doc, 0, 4).collect();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0], (0, RegionDescriptor::Header));
        assert_eq!(
            found[1],
            (
                3,
                RegionDescriptor::Hunk {
                    old_start: 1,
                    new_start: 1
                }
            )
        );
    }

    #[test]
    fn resumes_from_given_line() {
        let doc = TextDocument::from_lines(&[
            "diff --git a/x b/x",
            "@@ -1,1 +1,1 @@",
            "diff --git a/y b/y",
        ]);
        let found: Vec<_> = DiffScanner::new(&doc, 1, 2).collect();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].0, 1);
        assert_eq!(found[1].0, 2);
    }

    #[test]
    fn range_past_document_end_terminates() {
        let doc = TextDocument::from_lines(&["@@ -1,1 +1,1 @@"]);
        let found: Vec<_> = DiffScanner::new(&doc, 0, 100).collect();
        assert_eq!(found.len(), 1);
    }
}
