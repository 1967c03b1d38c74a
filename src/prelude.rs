//! Common re-exports for convenient importing.
//!
//! # Example
//!
//! ```rust,ignore
//! use diffhunk::prelude::*;
//! ```

pub use crate::core::{
    ApplyError, ApplyMode, DiffView, GitApplier, LineDocument, LineNumbers, PatchError, RegionId,
    RegionIndex, RegionKind, TextDocument,
};
