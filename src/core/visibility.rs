//! Per-region visibility with header-to-hunk cascading.

use crate::core::{LineDocument, RegionId, RegionIndex, RegionKind};

/// Toggle a region's visibility, hiding or revealing its line span.
///
/// A header's span runs to the next header (or document end) and the change
/// cascades to every hunk in between; a hunk's span runs to the next region
/// of any kind. The span receives the document's hidden marking, which keeps
/// the raw text intact while excluding the lines from projection and from
/// cursor-driven hunk queries.
///
/// No-op when the region already has the requested visibility or the id is
/// dangling.
pub fn set_region_visible<D: LineDocument + ?Sized>(
    index: &mut RegionIndex,
    document: &mut D,
    id: RegionId,
    visible: bool,
) {
    let Some(region) = index.get(id) else {
        return;
    };
    if region.is_visible() == visible {
        return;
    }
    let kind = region.kind();
    let start = region.line();
    let end = span_end(index, id, kind).unwrap_or_else(|| document.line_count());

    index.set_visible_flag(id, visible);
    if kind == RegionKind::Header {
        cascade_to_hunks(index, id, visible);
    }
    document.set_lines_hidden(start, end, !visible);
}

/// End line of a region's span: next header for headers, next region of any
/// kind for hunks. `None` means the span runs to the document end.
fn span_end(index: &RegionIndex, id: RegionId, kind: RegionKind) -> Option<usize> {
    let mut cursor = index.get(id)?.next();
    while let Some(next_id) = cursor {
        let next = index.get(next_id)?;
        if kind == RegionKind::Hunk || next.kind() == kind {
            return Some(next.line());
        }
        cursor = next.next();
    }
    None
}

/// Set the visibility flag on every hunk between `header` and the next
/// header. Cascade is unconditional in both directions.
fn cascade_to_hunks(index: &mut RegionIndex, header: RegionId, visible: bool) {
    let mut cursor = index.get(header).and_then(|r| r.next());
    while let Some(id) = cursor {
        let Some(region) = index.get(id) else {
            break;
        };
        if region.kind() == RegionKind::Header {
            break;
        }
        cursor = region.next();
        index.set_visible_flag(id, visible);
    }
}
