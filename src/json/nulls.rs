//! Removal of explicit null fields from desired-state documents.
//!
//! Serializing a partially populated object emits `"field": null` for optional
//! fields the caller never set. A merge algorithm would read those as "clear
//! this field" and fight server-populated defaults, so they are removed
//! before the document is compared.

use crate::error::{Error, Result};
use crate::fieldpath::{Path, PathElement};
use serde_json::Value;

/// Removes every object field whose value is null from a serialized JSON
/// document.
///
/// Returns the stripped document and the paths of the removed fields. Null
/// array elements are kept since positions in an array carry meaning; objects
/// nested in arrays are still stripped.
pub fn delete_null_in_json(json: &[u8]) -> Result<(Vec<u8>, Vec<Path>)> {
    let mut value: Value = serde_json::from_slice(json).map_err(Error::MalformedInput)?;
    let removed = delete_null_in_value(&mut value);
    let stripped = serde_json::to_vec(&value).map_err(Error::MalformedInput)?;
    Ok((stripped, removed))
}

/// Removes null object fields from a parsed document in place.
pub fn delete_null_in_value(value: &mut Value) -> Vec<Path> {
    let mut removed = Vec::new();
    strip(value, &mut Path::new(), &mut removed);
    removed
}

fn strip(value: &mut Value, path: &mut Path, removed: &mut Vec<Path>) {
    match value {
        Value::Object(map) => {
            map.retain(|key, field| {
                if field.is_null() {
                    removed.push(path.with(PathElement::field_name(key.as_str())));
                    false
                } else {
                    true
                }
            });
            for (key, field) in map.iter_mut() {
                path.push(PathElement::field_name(key.as_str()));
                strip(field, path, removed);
                path.pop();
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter_mut().enumerate() {
                path.push(PathElement::index(i));
                strip(item, path, removed);
                path.pop();
            }
        }
        _ => {}
    }
}
