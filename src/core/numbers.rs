//! Dual old/new line-number projection for the diff gutter.

use std::ops::Range;

use crate::core::{LineDocument, RegionIndex};

/// Projected gutter numbers for one displayed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineNumbers {
    /// Old-file line number, absent on new-only lines.
    pub old: Option<u32>,
    /// New-file line number, absent on old-only lines.
    pub new: Option<u32>,
}

impl LineNumbers {
    /// No numbers: marker lines, header spans, hidden lines.
    pub const NONE: Self = Self {
        old: None,
        new: None,
    };
}

/// A line missing the `'+'` prefix advances/displays the old counter.
fn old_eligible(text: &str) -> bool {
    !text.starts_with('+')
}

/// A line missing the `'-'` prefix advances/displays the new counter.
fn new_eligible(text: &str) -> bool {
    !text.starts_with('-')
}

/// Replay counters over `[from, to)` to pick up projection mid-hunk.
/// `from` is the line after the hunk marker; the marker never counts.
fn initial_counters<D: LineDocument + ?Sized>(document: &D, from: usize, to: usize) -> [u32; 2] {
    let mut counters = [0, 0];
    for line in from..to {
        let text = document.line_text(line).unwrap_or("");
        if old_eligible(text) {
            counters[0] += 1;
        }
        if new_eligible(text) {
            counters[1] += 1;
        }
    }
    counters
}

/// Compute old/new line numbers for each document line in `range`.
///
/// Scans up to the end of the range first, so the gutter is always accurate
/// for the lines about to be rendered. Counters are per-hunk and zero-based:
/// context lines count toward both sides, `'-'` lines only toward old,
/// `'+'` lines only toward new, and the marker line projects nothing.
/// Lines in hidden regions project [`LineNumbers::NONE`].
pub fn project_line_numbers<D: LineDocument + ?Sized>(
    index: &mut RegionIndex,
    document: &D,
    range: Range<usize>,
) -> Vec<LineNumbers> {
    let mut out = Vec::with_capacity(range.len());
    if range.is_empty() {
        return out;
    }
    index.ensure_scanned(document, range.end - 1);

    let mut current = None;
    let mut counters = [0u32; 2];

    for line in range {
        if current.is_none() {
            current = index.find_at_or_before(line);
            if let Some(id) = current {
                if let Some(region) = index.get(id) {
                    counters = initial_counters(document, region.line() + 1, line);
                }
            }
        }

        let mut numbers = LineNumbers::NONE;
        if let Some(id) = current {
            let Some(region) = index.get(id) else {
                out.push(numbers);
                continue;
            };
            if let Some(hunk) = region.hunk() {
                if region.is_visible() && line != region.line() && !document.is_line_hidden(line) {
                    let text = document.line_text(line).unwrap_or("");
                    if old_eligible(text) {
                        numbers.old = Some(hunk.old_start + counters[0]);
                        counters[0] += 1;
                    }
                    if new_eligible(text) {
                        numbers.new = Some(hunk.new_start + counters[1]);
                        counters[1] += 1;
                    }
                }
            }
            // hand over to the next region on its last covered line
            if let Some(next_id) = region.next() {
                if let Some(next) = index.get(next_id) {
                    if line + 1 == next.line() {
                        current = next.is_visible().then_some(next_id);
                        counters = [0, 0];
                    }
                }
            }
        }
        out.push(numbers);
    }
    out
}
