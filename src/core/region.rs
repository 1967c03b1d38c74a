//! Region model and the ordered, line-keyed region index.

use log::trace;

use crate::core::schedule::IDLE_SCAN_BATCH;
use crate::core::{DiffScanner, LineDocument, RegionDescriptor};

/// Gutter width floor: an empty index still sizes the gutter for "99".
const MAX_LINE_FLOOR: u32 = 99;

/// Discriminates the two region flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    /// File-header span (`diff --git` through the `+++` line and mode lines).
    Header,
    /// One `@@ ... @@` block and its body.
    Hunk,
}

/// Stable handle to a region inside one [`RegionIndex`] generation.
///
/// Handles are invalidated wholesale by [`RegionIndex::invalidate_and_clear`];
/// lookups after that return `None` rather than stale regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionId(usize);

/// Header-specific data. Blob hashes stay unparsed until first requested.
#[derive(Debug, Clone, Default)]
pub struct HeaderData {
    pub(crate) hashes: Option<(String, String)>,
}

/// Hunk-specific data parsed from the marker line.
#[derive(Debug, Clone, Copy)]
pub struct HunkData {
    /// Old-file start line from `@@ -old_start,...`.
    pub old_start: u32,
    /// New-file start line from `... +new_start,...`.
    pub new_start: u32,
}

/// Kind-specific region payload.
#[derive(Debug, Clone)]
pub enum RegionData {
    /// Header payload.
    Header(HeaderData),
    /// Hunk payload.
    Hunk(HunkData),
}

/// One indexed region: a header or hunk boundary discovered by scanning.
#[derive(Debug, Clone)]
pub struct Region {
    data: RegionData,
    line: usize,
    visible: bool,
    next: Option<RegionId>,
    prev: Option<RegionId>,
}

impl Region {
    /// The region's kind.
    pub fn kind(&self) -> RegionKind {
        match self.data {
            RegionData::Header(_) => RegionKind::Header,
            RegionData::Hunk(_) => RegionKind::Hunk,
        }
    }

    /// 0-based starting line at the time of the last scan.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Whether the region participates in projection and cursor queries.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Positional successor in document order.
    pub fn next(&self) -> Option<RegionId> {
        self.next
    }

    /// Positional predecessor in document order.
    pub fn prev(&self) -> Option<RegionId> {
        self.prev
    }

    /// Hunk payload, when this region is a hunk.
    pub fn hunk(&self) -> Option<&HunkData> {
        match &self.data {
            RegionData::Hunk(hunk) => Some(hunk),
            RegionData::Header(_) => None,
        }
    }
}

/// Ordered sequence of regions plus a line-keyed sorted index.
///
/// Owns all region nodes in an arena; `next`/`prev` are arena ids, never
/// pointers. The sorted index and the linked list always contain the same
/// regions in the same relative order, and `line` is strictly increasing
/// along `next`.
#[derive(Default)]
pub struct RegionIndex {
    arena: Vec<Region>,
    by_line: Vec<RegionId>,
    head: Option<RegionId>,
    tail: Option<RegionId>,
    last_scan_line: usize,
    max_line_count: u32,
    region_added: Option<Box<dyn FnMut(RegionId, RegionKind, usize)>>,
}

impl RegionIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self {
            max_line_count: MAX_LINE_FLOOR,
            ..Self::default()
        }
    }

    /// Register a callback fired once per newly discovered region.
    ///
    /// Dependent UI uses this to mirror per-file visibility state.
    pub fn set_region_added_listener<F>(&mut self, listener: F)
    where
        F: FnMut(RegionId, RegionKind, usize) + 'static,
    {
        self.region_added = Some(Box::new(listener));
    }

    /// Look up a region by id. `None` after invalidation.
    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.arena.get(id.0)
    }

    /// Number of indexed regions.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Whether no regions have been indexed.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// First region in document order.
    pub fn first(&self) -> Option<RegionId> {
        self.head
    }

    /// Iterate regions in document order by following `next` links.
    pub fn iter(&self) -> Regions<'_> {
        Regions {
            index: self,
            cursor: self.head,
        }
    }

    /// Number of lines scanned so far; lines `[0, last_scan_line)` are indexed.
    pub fn last_scan_line(&self) -> usize {
        self.last_scan_line
    }

    /// Largest old/new line number seen, floored at 99 for gutter sizing.
    pub fn max_line_count(&self) -> u32 {
        self.max_line_count
    }

    /// Digit count needed to display the largest projected line number.
    pub fn gutter_width(&self) -> usize {
        let mut value = self.max_line_count.max(MAX_LINE_FLOOR);
        let mut digits = 0;
        while value > 0 {
            digits += 1;
            value /= 10;
        }
        digits
    }

    /// Append a region discovered at `line`, linking it after the tail.
    pub fn append(&mut self, line: usize, descriptor: RegionDescriptor) -> RegionId {
        let data = match descriptor {
            RegionDescriptor::Header => RegionData::Header(HeaderData::default()),
            RegionDescriptor::Hunk {
                old_start,
                new_start,
            } => RegionData::Hunk(HunkData {
                old_start,
                new_start,
            }),
        };
        let id = RegionId(self.arena.len());
        self.arena.push(Region {
            data,
            line,
            visible: true,
            next: None,
            prev: self.tail,
        });
        if let Some(tail) = self.tail {
            self.arena[tail.0].next = Some(id);
            self.ensure_max_line(tail);
        } else {
            self.head = Some(id);
        }
        self.tail = Some(id);

        let arena = &self.arena;
        let pos = self.by_line.partition_point(|&r| arena[r.0].line <= line);
        self.by_line.insert(pos, id);

        let kind = self.arena[id.0].kind();
        if let Some(listener) = self.region_added.as_mut() {
            listener(id, kind, line);
        }
        id
    }

    /// Find the visible region with the greatest `line <= target`.
    ///
    /// An exact start-line match returns that region. Returns `None` when the
    /// nearest candidate is hidden or nothing precedes the line.
    pub fn find_at_or_before(&self, line: usize) -> Option<RegionId> {
        let arena = &self.arena;
        let idx = self.by_line.partition_point(|&r| arena[r.0].line <= line);
        if idx == 0 {
            return None;
        }
        let id = self.by_line[idx - 1];
        if self.arena[id.0].visible {
            Some(id)
        } else {
            None
        }
    }

    /// Drop every region and reset scan progress and gutter sizing.
    ///
    /// The owning view cancels any pending idle scan alongside this call;
    /// previously handed-out [`RegionId`]s become dangling and resolve to
    /// `None`.
    pub fn invalidate_and_clear(&mut self) {
        self.arena.clear();
        self.by_line.clear();
        self.head = None;
        self.tail = None;
        self.last_scan_line = 0;
        self.max_line_count = MAX_LINE_FLOOR;
    }

    /// Scan forward so that lines up to `up_to_line` (inclusive) are indexed.
    ///
    /// Idempotent when the range is already covered. Newly discovered regions
    /// are appended without touching existing ones.
    pub fn ensure_scanned<D: LineDocument + ?Sized>(&mut self, document: &D, up_to_line: usize) {
        let line_count = document.line_count();
        if line_count == 0 {
            return;
        }
        let up_to = up_to_line.min(line_count - 1);
        if self.last_scan_line > up_to {
            return;
        }
        let _timer = crate::metrics::Timer::start("region_index.ensure_scanned");
        let from = self.last_scan_line;
        for (line, descriptor) in DiffScanner::new(document, from, up_to) {
            self.append(line, descriptor);
        }
        self.last_scan_line = up_to + 1;
        if let Some(tail) = self.tail {
            self.ensure_max_line(tail);
        }
        trace!(
            "scanned lines {}..={} ({} regions total)",
            from,
            up_to,
            self.arena.len()
        );
    }

    /// Scan one amortized batch of [`IDLE_SCAN_BATCH`] lines.
    ///
    /// Returns whether progress was made; `false` means the document is fully
    /// scanned and the idle task can stop.
    pub fn scan_batch<D: LineDocument + ?Sized>(&mut self, document: &D) -> bool {
        let line_count = document.line_count();
        if self.last_scan_line >= line_count {
            return false;
        }
        let batch = (line_count - self.last_scan_line).min(IDLE_SCAN_BATCH);
        let before = self.last_scan_line;
        self.ensure_scanned(document, before + batch - 1);
        self.last_scan_line != before
    }

    /// Lazily parse and cache the `index from..to` blob hashes of a header.
    ///
    /// Returns `None` for hunks, dangling ids, or headers without a parseable
    /// `index` line in their span.
    pub fn header_blob_hashes<D: LineDocument + ?Sized>(
        &mut self,
        document: &D,
        id: RegionId,
    ) -> Option<(String, String)> {
        let region = self.arena.get(id.0)?;
        let header = match &region.data {
            RegionData::Header(header) => header,
            RegionData::Hunk(_) => return None,
        };
        if let Some(cached) = &header.hashes {
            return Some(cached.clone());
        }
        let start = region.line;
        let end = region
            .next
            .map(|n| self.arena[n.0].line)
            .unwrap_or_else(|| document.line_count());
        let mut parsed = None;
        for line in start..end {
            let Some(text) = document.line_text(line) else {
                break;
            };
            if let Some(rest) = text.strip_prefix("index ") {
                if let Some((from, to)) = rest.split_once("..") {
                    let to = to.split_whitespace().next().unwrap_or(to);
                    parsed = Some((from.to_string(), to.to_string()));
                }
                break;
            }
        }
        let parsed = parsed?;
        if let RegionData::Header(header) = &mut self.arena[id.0].data {
            header.hashes = Some(parsed.clone());
        }
        Some(parsed)
    }

    pub(crate) fn set_visible_flag(&mut self, id: RegionId, visible: bool) {
        if let Some(region) = self.arena.get_mut(id.0) {
            region.visible = visible;
        }
    }

    /// Grow `max_line_count` from a hunk: its start numbers plus the line
    /// span up to the following region.
    fn ensure_max_line(&mut self, id: RegionId) {
        let region = &self.arena[id.0];
        let hunk = match &region.data {
            RegionData::Hunk(hunk) => *hunk,
            RegionData::Header(_) => return,
        };
        let span = region
            .next
            .map(|n| (self.arena[n.0].line - region.line) as u32)
            .unwrap_or(0);
        let largest = (hunk.old_start + span).max(hunk.new_start + span);
        if largest > self.max_line_count {
            self.max_line_count = largest;
        }
    }
}

impl std::fmt::Debug for RegionIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionIndex")
            .field("regions", &self.arena.len())
            .field("last_scan_line", &self.last_scan_line)
            .field("max_line_count", &self.max_line_count)
            .finish()
    }
}

/// Iterator over regions in document order. See [`RegionIndex::iter`].
pub struct Regions<'a> {
    index: &'a RegionIndex,
    cursor: Option<RegionId>,
}

impl<'a> Iterator for Regions<'a> {
    type Item = (RegionId, &'a Region);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let region = self.index.get(id)?;
        self.cursor = region.next;
        Some((id, region))
    }
}
