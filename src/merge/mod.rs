//! Merge module - three-way patch algorithms.
//!
//! Two algorithms are provided: a JSON merge patch for documents without
//! merge metadata, and a strategic merge patch that consults a schema to
//! decide how lists and maps merge.

mod error;
mod jsonmerge;
mod strategic;

#[cfg(test)]
mod strategic_test;

pub use error::*;
pub use jsonmerge::*;
pub use strategic::*;

use serde_json::{Map, Value};

/// Parses one side of a three-way merge. Empty input is the empty object.
pub(crate) fn parse_document(document: &'static str, data: &[u8]) -> Result<Map<String, Value>, MergeError> {
    if data.is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_slice(data) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(MergeError::NotAnObject { document }),
        Err(source) => Err(MergeError::InvalidDocument { document, source }),
    }
}
