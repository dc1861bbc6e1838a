//! Field path module - Locations of values inside serialized objects.
//!
//! Paths are used to report removed null fields, to name fields that should be
//! ignored during a comparison, and to point at merge conflicts.

mod path;

pub use path::*;
