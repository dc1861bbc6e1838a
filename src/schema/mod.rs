//! Schema module - merge metadata for typed resources.
//!
//! A schema is a set of named types describing, per field, whether lists are
//! replaced, merged by key or merged as sets, and whether maps are merged
//! entry by entry or replaced. [`PatchMeta`] walks a schema alongside a
//! document and answers those questions for the strategic merge.

mod elements;
mod patchmeta;

pub use elements::*;
pub use patchmeta::*;
