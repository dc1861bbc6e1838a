//! JSON module - document clean-up applied before comparison.

mod nulls;
mod prune;

pub use nulls::*;
pub use prune::*;
