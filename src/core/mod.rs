//! Core diff-indexing engine (no CLI dependencies).

mod apply;
mod document;
mod numbers;
mod patch;
mod region;
mod scanner;
mod schedule;
mod view;
mod visibility;

pub use apply::*;
pub use document::*;
pub use numbers::*;
pub use patch::*;
pub use region::*;
pub use scanner::*;
pub use schedule::*;
pub use view::*;
pub use visibility::*;
