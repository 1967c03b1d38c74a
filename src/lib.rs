//! diffhunk - incremental unified-diff indexing and hunk extraction.
//!
//! Scans unified-diff text line by line, maintains an index of file-header
//! and hunk boundaries over a mutating document, projects dual old/new line
//! numbers for a diff gutter, and extracts syntactically valid single-hunk
//! patches suitable for `git apply --cached`.
//!
//! # Quick Start
//!
//! ```rust
//! use diffhunk::prelude::*;
//!
//! let doc = TextDocument::new("diff --git a/x b/x\n--- a/x\n+++ b/x\n@@ -1,1 +1,1 @@\n-a\n+b\n");
//! let mut view = DiffView::new();
//! while view.idle_scan(&doc) {}
//! let patch = view.extract_patch(&doc, 4).unwrap();
//! assert!(patch.starts_with("diff --git "));
//! ```

#![deny(missing_docs)]

pub mod core;
pub mod metrics;
pub mod prelude;
