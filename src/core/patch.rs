//! Single-hunk patch extraction and post-apply region removal.

use log::debug;
use thiserror::Error;

use crate::core::{LineDocument, RegionId, RegionIndex, RegionKind};

/// Errors from patch extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PatchError {
    /// The cursor is not inside a recognized, visible hunk, or the enclosing
    /// file header is incomplete. Callers treat this as "no action
    /// available".
    #[error("cursor is not inside a visible hunk")]
    NotAHunk,
}

/// The visible region covering `line`, if any.
pub fn region_at(index: &RegionIndex, line: usize) -> Option<RegionId> {
    index.find_at_or_before(line)
}

/// Whether a patch can be extracted at `line`: the covering region must be a
/// visible hunk recorded by the last scan.
pub fn has_hunk_marker(index: &RegionIndex, line: usize) -> bool {
    hunk_at(index, line).is_some()
}

fn hunk_at(index: &RegionIndex, line: usize) -> Option<RegionId> {
    let id = index.find_at_or_before(line)?;
    (index.get(id)?.kind() == RegionKind::Hunk).then_some(id)
}

/// Reconstruct a minimal unified-diff patch for the hunk covering
/// `cursor_line`: the file header (through its `+++` line) plus exactly one
/// `@@` block, byte-compatible with `git apply`.
///
/// The caller snaps a visual cursor to the start of its enclosing line
/// before passing it here. Fails with [`PatchError::NotAHunk`] when the
/// cursor is outside a visible hunk, the enclosing `diff --git` or `+++`
/// line is missing, or the hunk body is empty.
pub fn extract_patch<D: LineDocument + ?Sized>(
    index: &mut RegionIndex,
    document: &D,
    cursor_line: usize,
) -> Result<String, PatchError> {
    index.ensure_scanned(document, cursor_line);
    let id = hunk_at(index, cursor_line).ok_or(PatchError::NotAHunk)?;
    let hunk_line = match index.get(id) {
        Some(region) => region.line(),
        None => return Err(PatchError::NotAHunk),
    };
    let mut patch = header_text(document, hunk_line)?;
    patch.push_str(&hunk_text(document, hunk_line)?);
    Ok(patch)
}

/// Walk backward from `line` to the enclosing `diff --git` line, remembering
/// the first `+++` line met on the way back. Returns that inclusive span.
fn header_text<D: LineDocument + ?Sized>(
    document: &D,
    line: usize,
) -> Result<String, PatchError> {
    let mut found_start = None;
    let mut found_end = None;
    let mut cursor = line;
    loop {
        let text = document.line_text(cursor).ok_or(PatchError::NotAHunk)?;
        if text.starts_with("diff --git ") {
            found_start = Some(cursor);
            break;
        }
        if found_end.is_none() && text.starts_with("+++ ") {
            found_end = Some(cursor);
        }
        if cursor == 0 {
            break;
        }
        cursor -= 1;
    }
    match (found_start, found_end) {
        (Some(start), Some(end)) => Ok(collect_lines(document, start, end + 1)),
        _ => Err(PatchError::NotAHunk),
    }
}

/// The hunk-marker line and its body, up to the next `@@`/`diff --git`
/// boundary or document end (exclusive). An empty body is an error.
fn hunk_text<D: LineDocument + ?Sized>(document: &D, line: usize) -> Result<String, PatchError> {
    let mut end = line + 1;
    while end < document.line_count() {
        let Some(text) = document.line_text(end) else {
            break;
        };
        if text.starts_with("@@") || text.starts_with("diff --git ") {
            break;
        }
        end += 1;
    }
    if end == line + 1 {
        return Err(PatchError::NotAHunk);
    }
    Ok(collect_lines(document, line, end))
}

fn collect_lines<D: LineDocument + ?Sized>(document: &D, start: usize, end: usize) -> String {
    let mut out = String::new();
    for line in start..end {
        if let Some(text) = document.line_text(line) {
            out.push_str(text);
            out.push('\n');
        }
    }
    out
}

/// Delete a consumed hunk's span from the document after its patch was
/// applied, then invalidate the index.
///
/// When the hunk is the sole one in its file section and nothing precedes
/// it, the deletion extends to the document start so the orphaned header
/// goes too. With a preceding header the header text is left in place; the
/// next rescan then indexes a header with no hunks.
///
/// The caller reschedules the idle rescan after this.
pub fn remove_region_after_apply<D: LineDocument + ?Sized>(
    index: &mut RegionIndex,
    document: &mut D,
    id: RegionId,
) {
    let Some(region) = index.get(id) else {
        return;
    };
    let mut start = region.line();
    let next = region.next();
    let end = next
        .and_then(|n| index.get(n))
        .map(|n| n.line())
        .unwrap_or_else(|| document.line_count());

    let prev = if region.line() == 0 {
        None
    } else {
        index.find_at_or_before(region.line() - 1)
    };
    let next_kind = next.and_then(|n| index.get(n)).map(|n| n.kind());
    let prev_kind = prev.and_then(|p| index.get(p)).map(|p| p.kind());

    let sole_hunk_in_file = matches!(next_kind, None | Some(RegionKind::Header))
        && matches!(prev_kind, None | Some(RegionKind::Header));
    if sole_hunk_in_file && prev.is_none() {
        start = 0;
    }

    debug!("removing consumed hunk span [{start}, {end})");
    document.delete_lines(start, end);
    index.invalidate_and_clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{set_region_visible, RegionKind, TextDocument};

    const SINGLE: &[&str] = &[
        "diff --git a/x b/x",      // 0
        "index aaaa..bbbb 100644", // 1
        "--- a/x",                 // 2
        "+++ b/x",                 // 3
        "@@ -1,2 +1,3 @@",         // 4
        " ctx",                    // 5
        "-old",                    // 6
        "+new1",                   // 7
        "+new2",                   // 8
    ];

    fn scanned(doc: &TextDocument) -> RegionIndex {
        let mut index = RegionIndex::new();
        index.ensure_scanned(doc, doc.line_count() - 1);
        index
    }

    #[test]
    fn extracts_whole_single_hunk_document() {
        let doc = TextDocument::from_lines(SINGLE);
        let mut index = RegionIndex::new();
        let patch = extract_patch(&mut index, &doc, 4).unwrap();
        assert_eq!(patch, doc.text());
    }

    #[test]
    fn cursor_anywhere_in_hunk_body_works() {
        let doc = TextDocument::from_lines(SINGLE);
        let mut index = RegionIndex::new();
        let from_marker = extract_patch(&mut index, &doc, 4).unwrap();
        let from_body = extract_patch(&mut index, &doc, 7).unwrap();
        assert_eq!(from_marker, from_body);
    }

    #[test]
    fn extracted_patch_is_syntactically_complete() {
        let doc = TextDocument::from_lines(&[
            "diff --git a/x b/x", // 0
            "--- a/x",            // 1
            "+++ b/x",            // 2
            "@@ -1,1 +1,1 @@",    // 3
            "-a",                 // 4
            "+b",                 // 5
            "@@ -9,1 +9,1 @@",    // 6
            "-c",                 // 7
            "+d",                 // 8
            "diff --git a/y b/y", // 9
            "--- a/y",            // 10
            "+++ b/y",            // 11
            "@@ -1,1 +1,1 @@",    // 12
            "-e",                 // 13
            "+f",                 // 14
        ]);
        let mut index = RegionIndex::new();
        for cursor in [3, 7, 13] {
            let patch = extract_patch(&mut index, &doc, cursor).unwrap();
            assert!(patch.starts_with("diff --git "), "patch at {cursor}");
            let lines: Vec<&str> = patch.lines().collect();
            let marker_count = lines.iter().filter(|l| l.starts_with("@@")).count();
            assert_eq!(marker_count, 1, "patch at {cursor}");
            let plus_count = lines.iter().filter(|l| l.starts_with("+++ ")).count();
            assert_eq!(plus_count, 1, "patch at {cursor}");
            let marker_pos = lines.iter().position(|l| l.starts_with("@@")).unwrap();
            let plus_pos = lines.iter().position(|l| l.starts_with("+++ ")).unwrap();
            assert!(plus_pos < marker_pos, "patch at {cursor}");
        }
        // second hunk of the first file stops at the next file header
        let patch = extract_patch(&mut index, &doc, 7).unwrap();
        assert!(patch.ends_with("+d\n"));
    }

    #[test]
    fn cursor_in_header_is_not_a_hunk() {
        let doc = TextDocument::from_lines(SINGLE);
        let mut index = RegionIndex::new();
        assert_eq!(extract_patch(&mut index, &doc, 2), Err(PatchError::NotAHunk));
    }

    #[test]
    fn hidden_hunk_is_not_a_hunk() {
        let mut doc = TextDocument::from_lines(SINGLE);
        let mut index = scanned(&doc);
        let hunk = index.find_at_or_before(4).unwrap();
        set_region_visible(&mut index, &mut doc, hunk, false);
        assert!(!has_hunk_marker(&index, 5));
        assert_eq!(extract_patch(&mut index, &doc, 5), Err(PatchError::NotAHunk));
    }

    #[test]
    fn missing_plus_line_fails() {
        let doc = TextDocument::from_lines(&[
            "diff --git a/x b/x",
            "--- a/x",
            "@@ -1,1 +1,1 @@",
            "-a",
            "+b",
        ]);
        let mut index = RegionIndex::new();
        assert_eq!(extract_patch(&mut index, &doc, 2), Err(PatchError::NotAHunk));
    }

    #[test]
    fn empty_hunk_body_fails() {
        let doc = TextDocument::from_lines(&[
            "diff --git a/x b/x",
            "--- a/x",
            "+++ b/x",
            "@@ -1,0 +1,0 @@",
        ]);
        let mut index = RegionIndex::new();
        assert_eq!(extract_patch(&mut index, &doc, 3), Err(PatchError::NotAHunk));
    }

    #[test]
    fn region_queries() {
        let doc = TextDocument::from_lines(SINGLE);
        let index = scanned(&doc);
        let header = region_at(&index, 1).unwrap();
        assert_eq!(index.get(header).unwrap().kind(), RegionKind::Header);
        assert!(!has_hunk_marker(&index, 1));
        assert!(has_hunk_marker(&index, 6));
    }

    #[test]
    fn removing_middle_hunk_keeps_neighbors() {
        let mut doc = TextDocument::from_lines(&[
            "diff --git a/x b/x", // 0
            "--- a/x",            // 1
            "+++ b/x",            // 2
            "@@ -1,1 +1,1 @@",    // 3
            "-a",                 // 4
            "+b",                 // 5
            "@@ -9,1 +9,1 @@",    // 6
            "-c",                 // 7
            "+d",                 // 8
        ]);
        let mut index = scanned(&doc);
        let hunk_count_before = index.iter().filter(|(_, r)| r.hunk().is_some()).count();
        let first_hunk = index.find_at_or_before(3).unwrap();
        remove_region_after_apply(&mut index, &mut doc, first_hunk);

        assert!(index.is_empty());
        index.ensure_scanned(&doc, doc.line_count() - 1);
        let hunk_count_after = index.iter().filter(|(_, r)| r.hunk().is_some()).count();
        assert_eq!(hunk_count_after, hunk_count_before - 1);
        // the surviving hunk moved up under the intact header
        assert_eq!(doc.line_text(3), Some("@@ -9,1 +9,1 @@"));
    }

    #[test]
    fn removing_sole_hunk_with_preceding_header_keeps_header() {
        let mut doc = TextDocument::from_lines(SINGLE);
        let mut index = scanned(&doc);
        let hunk = index.find_at_or_before(4).unwrap();
        remove_region_after_apply(&mut index, &mut doc, hunk);

        // observed quirk: the header section stays behind
        assert_eq!(doc.line_count(), 4);
        assert_eq!(doc.line_text(0), Some("diff --git a/x b/x"));
        index.ensure_scanned(&doc, doc.line_count() - 1);
        assert_eq!(index.iter().filter(|(_, r)| r.hunk().is_some()).count(), 0);
    }

    #[test]
    fn removing_sole_hunk_without_header_region_clears_to_start() {
        // a deletion already consumed the header region; only the hunk was
        // rescanned (header text absent from the document)
        let mut doc = TextDocument::from_lines(&[
            "@@ -1,1 +1,1 @@",
            "-a",
            "+b",
        ]);
        let mut index = scanned(&doc);
        let hunk = index.find_at_or_before(0).unwrap();
        remove_region_after_apply(&mut index, &mut doc, hunk);
        assert!(doc.is_empty());
    }
}
