//! Three-way JSON merge patch for documents without merge metadata.
//!
//! Every key is merged with whole-value replace semantics: lists are never
//! merged element-wise.

use super::{parse_document, MergeError};
use crate::fieldpath::{Path, PathElement};
use serde_json::{Map, Value};

/// JsonMergePatch computes three-way JSON merge patches.
pub trait JsonMergePatch: Send + Sync {
    /// Creates a patch turning `current` into `modified`, deleting only the
    /// fields that `original` had and `modified` dropped.
    fn create_three_way_json_merge_patch(
        &self,
        original: &[u8],
        modified: &[u8],
        current: &[u8],
    ) -> Result<Vec<u8>, MergeError>;
}

/// JsonMergePatcher is the default [`JsonMergePatch`] implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMergePatcher;

impl JsonMergePatch for JsonMergePatcher {
    fn create_three_way_json_merge_patch(
        &self,
        original: &[u8],
        modified: &[u8],
        current: &[u8],
    ) -> Result<Vec<u8>, MergeError> {
        create_three_way_json_merge_patch(original, modified, current)
    }
}

/// Creates a three-way JSON merge patch.
///
/// Additions and changes come from the diff of `current` against `modified`;
/// deletions come from the diff of `original` against `modified`, so fields
/// added to the live object by other actors are left alone.
pub fn create_three_way_json_merge_patch(
    original: &[u8],
    modified: &[u8],
    current: &[u8],
) -> Result<Vec<u8>, MergeError> {
    let original = parse_document("original", original)?;
    let modified = parse_document("modified", modified)?;
    let current = parse_document("current", current)?;

    let add_and_change = keep_or_delete_null(&create_merge_patch(&current, &modified), false);
    let deletions = keep_or_delete_null(&create_merge_patch(&original, &modified), true);

    if let Some(path) = find_conflict(&add_and_change, &deletions, &mut Path::new()) {
        return Err(MergeError::conflict(path.to_string()));
    }

    let mut patch = deletions;
    merge_patch_into(&mut patch, add_and_change);
    serde_json::to_vec(&Value::Object(patch)).map_err(MergeError::Serialize)
}

/// Creates a two-way merge patch: applying it to `original` yields `modified`.
pub fn create_merge_patch(original: &Map<String, Value>, modified: &Map<String, Value>) -> Map<String, Value> {
    let mut patch = Map::new();
    for (key, modified_value) in modified {
        match (original.get(key), modified_value) {
            (Some(original_value), _) if original_value == modified_value => {}
            (Some(Value::Object(original_map)), Value::Object(modified_map)) => {
                let sub = create_merge_patch(original_map, modified_map);
                if !sub.is_empty() {
                    patch.insert(key.clone(), Value::Object(sub));
                }
            }
            _ => {
                patch.insert(key.clone(), modified_value.clone());
            }
        }
    }
    for key in original.keys() {
        if !modified.contains_key(key) {
            patch.insert(key.clone(), Value::Null);
        }
    }
    patch
}

/// Keeps only the deletions (`keep_null`) or only the additions and changes
/// of a merge patch.
fn keep_or_delete_null(patch: &Map<String, Value>, keep_null: bool) -> Map<String, Value> {
    let mut filtered = Map::new();
    for (key, value) in patch {
        match value {
            Value::Null => {
                if keep_null {
                    filtered.insert(key.clone(), Value::Null);
                }
            }
            // An empty map only appears when the key is missing or not an
            // object on the other side; there it is a value.
            Value::Object(map) if map.is_empty() => {
                if !keep_null {
                    filtered.insert(key.clone(), value.clone());
                }
            }
            Value::Object(map) => {
                let sub = keep_or_delete_null(map, keep_null);
                if !sub.is_empty() {
                    filtered.insert(key.clone(), Value::Object(sub));
                }
            }
            // Lists and scalars are replaced as a whole.
            _ => {
                if !keep_null {
                    filtered.insert(key.clone(), value.clone());
                }
            }
        }
    }
    filtered
}

/// Returns the path of the first key both patches set to different values.
pub(crate) fn find_conflict(
    left: &Map<String, Value>,
    right: &Map<String, Value>,
    path: &mut Path,
) -> Option<Path> {
    for (key, left_value) in left {
        let Some(right_value) = right.get(key) else {
            continue;
        };
        path.push(PathElement::field_name(key.as_str()));
        let conflict = match (left_value, right_value) {
            (Value::Object(l), Value::Object(r)) => find_conflict(l, r, path),
            (l, r) if l != r => Some(path.clone()),
            _ => None,
        };
        path.pop();
        if conflict.is_some() {
            return conflict;
        }
    }
    None
}

/// Applies `patch` to `doc` with merge patch semantics.
fn merge_patch_into(doc: &mut Map<String, Value>, patch: Map<String, Value>) {
    for (key, value) in patch {
        match value {
            Value::Null => {
                doc.remove(&key);
            }
            Value::Object(sub) => {
                if let Some(Value::Object(target)) = doc.get_mut(&key) {
                    merge_patch_into(target, sub);
                    continue;
                }
                doc.insert(key, Value::Object(sub));
            }
            value => {
                doc.insert(key, value);
            }
        }
    }
}
