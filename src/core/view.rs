//! The engine facade bound to one document instance.

use std::ops::Range;

use log::debug;

use crate::core::{
    extract_patch, has_hunk_marker, project_line_numbers, region_at, remove_region_after_apply,
    set_region_visible, LineDocument, LineNumbers, PatchError, RegionId, RegionIndex, RegionKind,
    ScanScheduler,
};

/// Diff engine attached to a single document.
///
/// Bundles the region index with the idle-scan scheduling state and exposes
/// the surface consumed by staging UI: line-number projection, hunk-at-cursor
/// queries, patch extraction, post-apply removal, and visibility toggles.
///
/// The view is driven by three host notifications: [`DiffView::text_inserted`]
/// when trailing diff text arrives, [`DiffView::text_deleted`] when any range
/// was removed, and [`DiffView::idle_scan`] polled from the host event loop
/// while a scan task is pending. A view is valid for exactly one document;
/// attach a fresh one when the document changes identity.
pub struct DiffView {
    index: RegionIndex,
    scheduler: ScanScheduler,
    enabled: bool,
}

impl Default for DiffView {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffView {
    /// Create a view with diff indexing enabled and an initial scan pending.
    pub fn new() -> Self {
        let mut scheduler = ScanScheduler::new();
        scheduler.schedule();
        Self {
            index: RegionIndex::new(),
            scheduler,
            enabled: true,
        }
    }

    /// Enable or disable diff indexing output (projection returns empty
    /// numbers while disabled; the index itself is kept).
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether diff indexing output is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Read access to the underlying region index.
    pub fn index(&self) -> &RegionIndex {
        &self.index
    }

    /// Register the region-added notification hook.
    pub fn set_region_added_listener<F>(&mut self, listener: F)
    where
        F: FnMut(RegionId, RegionKind, usize) + 'static,
    {
        self.index.set_region_added_listener(listener);
    }

    /// Whether an idle scan task is pending.
    pub fn scan_pending(&self) -> bool {
        self.scheduler.is_scheduled()
    }

    /// Notification: trailing text was inserted into the document.
    ///
    /// An insertion inside the current viewport scans a batch synchronously
    /// so the gutter stays accurate; either way the idle task is (re)armed to
    /// pick up the rest.
    pub fn text_inserted<D: LineDocument + ?Sized>(&mut self, document: &D, in_viewport: bool) {
        if in_viewport {
            self.index.scan_batch(document);
        }
        self.scheduler.schedule();
    }

    /// Notification: a line range was deleted from the document.
    ///
    /// The whole index is discarded (region lines are stale) and the pending
    /// idle scan is superseded.
    pub fn text_deleted(&mut self) {
        debug!("document deletion: clearing region index");
        self.index.invalidate_and_clear();
        self.scheduler.cancel();
    }

    /// Run one idle scheduling slice: scan a bounded batch of lines.
    ///
    /// Returns `true` while more scanning remains (the host re-polls), and
    /// cancels the task once the document is fully scanned.
    pub fn idle_scan<D: LineDocument + ?Sized>(&mut self, document: &D) -> bool {
        if !self.scheduler.is_scheduled() {
            return false;
        }
        let more = self.index.scan_batch(document);
        if !more {
            self.scheduler.cancel();
        }
        more
    }

    /// Project old/new gutter numbers for the displayed line range.
    ///
    /// Scans synchronously up to the end of the range first. While the view
    /// is disabled every line projects empty numbers.
    pub fn project_line_numbers<D: LineDocument + ?Sized>(
        &mut self,
        document: &D,
        range: Range<usize>,
    ) -> Vec<LineNumbers> {
        if !self.enabled {
            return vec![LineNumbers::NONE; range.len()];
        }
        project_line_numbers(&mut self.index, document, range)
    }

    /// Digit width of the gutter's numeric columns.
    pub fn gutter_width(&self) -> usize {
        self.index.gutter_width()
    }

    /// The visible region covering `cursor_line`, scanning up to it first.
    pub fn region_at<D: LineDocument + ?Sized>(
        &mut self,
        document: &D,
        cursor_line: usize,
    ) -> Option<RegionId> {
        self.index.ensure_scanned(document, cursor_line);
        region_at(&self.index, cursor_line)
    }

    /// Whether the handle refers to a hunk region.
    pub fn is_hunk(&self, id: RegionId) -> bool {
        self.index
            .get(id)
            .map(|r| r.kind() == RegionKind::Hunk)
            .unwrap_or(false)
    }

    /// Whether a single-hunk patch can be extracted at `cursor_line`.
    pub fn has_hunk_marker<D: LineDocument + ?Sized>(
        &mut self,
        document: &D,
        cursor_line: usize,
    ) -> bool {
        self.index.ensure_scanned(document, cursor_line);
        has_hunk_marker(&self.index, cursor_line)
    }

    /// Extract a minimal `git apply`-ready patch for the hunk at the cursor.
    pub fn extract_patch<D: LineDocument + ?Sized>(
        &mut self,
        document: &D,
        cursor_line: usize,
    ) -> Result<String, PatchError> {
        if !self.enabled {
            return Err(PatchError::NotAHunk);
        }
        extract_patch(&mut self.index, document, cursor_line)
    }

    /// Remove a consumed hunk's span after its patch was applied, then
    /// schedule the rescan of the shrunken document.
    pub fn remove_region_after_apply<D: LineDocument + ?Sized>(
        &mut self,
        document: &mut D,
        id: RegionId,
    ) {
        remove_region_after_apply(&mut self.index, document, id);
        self.scheduler.schedule();
    }

    /// Toggle region visibility, cascading headers to their hunks.
    pub fn set_region_visible<D: LineDocument + ?Sized>(
        &mut self,
        document: &mut D,
        id: RegionId,
        visible: bool,
    ) {
        set_region_visible(&mut self.index, document, id, visible);
    }

    /// Lazily parsed blob hashes from a header's `index` line.
    pub fn header_blob_hashes<D: LineDocument + ?Sized>(
        &mut self,
        document: &D,
        id: RegionId,
    ) -> Option<(String, String)> {
        self.index.header_blob_hashes(document, id)
    }
}
