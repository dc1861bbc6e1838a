//! Three-way strategic merge patch.
//!
//! The patch format extends JSON merge patch with directives understood by
//! the object store:
//!
//! - `{"$patch": "delete", <keys>}` list entries delete the element with
//!   those merge keys;
//! - `$setElementOrder/<field>` carries the order of a merged list;
//! - `$deleteFromPrimitiveList/<field>` removes scalars from a merged set.

use super::{parse_document, MergeError};
use crate::fieldpath::{Path, PathElement};
use crate::schema::{MergeStrategy, PatchMeta};
use serde_json::{Map, Value};

pub const DIRECTIVE_MARKER: &str = "$patch";
pub const DELETE_DIRECTIVE: &str = "delete";
pub const SET_ELEMENT_ORDER_PREFIX: &str = "$setElementOrder";
pub const DELETE_FROM_PRIMITIVE_LIST_PREFIX: &str = "$deleteFromPrimitiveList";

/// StrategicMerge computes three-way strategic merge patches.
pub trait StrategicMerge: Send + Sync {
    /// Creates a patch turning `current` into `modified`, using `meta` for
    /// list and map merge strategies.
    ///
    /// With `overwrite` false, a patch that changes a field which was also
    /// changed between `original` and `current` is a conflict.
    fn create_three_way_merge_patch(
        &self,
        original: &[u8],
        modified: &[u8],
        current: &[u8],
        meta: &PatchMeta,
        overwrite: bool,
    ) -> Result<Vec<u8>, MergeError>;
}

/// StrategicMerger is the default [`StrategicMerge`] implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrategicMerger;

impl StrategicMerge for StrategicMerger {
    fn create_three_way_merge_patch(
        &self,
        original: &[u8],
        modified: &[u8],
        current: &[u8],
        meta: &PatchMeta,
        overwrite: bool,
    ) -> Result<Vec<u8>, MergeError> {
        create_three_way_merge_patch(original, modified, current, meta, overwrite)
    }
}

/// Creates a three-way strategic merge patch.
pub fn create_three_way_merge_patch(
    original: &[u8],
    modified: &[u8],
    current: &[u8],
    meta: &PatchMeta,
    overwrite: bool,
) -> Result<Vec<u8>, MergeError> {
    let original = parse_document("original", original)?;
    let modified = parse_document("modified", modified)?;
    let current = parse_document("current", current)?;

    let delta = DiffWalker::new(DiffOptions {
        ignore_deletions: true,
        set_element_order: true,
        ..Default::default()
    })
    .diff_maps(&current, &modified, meta)?;

    let deletions = DiffWalker::new(DiffOptions {
        ignore_changes_and_additions: true,
        set_element_order: true,
        ..Default::default()
    })
    .diff_maps(&original, &modified, meta)?;

    let mut patch = deletions;
    merge_patches(&mut patch, delta, meta);

    if !overwrite {
        let changed = DiffWalker::new(DiffOptions::default()).diff_maps(&original, &current, meta)?;
        if let Some(path) = find_patch_conflict(&patch, &changed, meta, &mut Path::new()) {
            return Err(MergeError::conflict(path.to_string()));
        }
    }

    serde_json::to_vec(&Value::Object(patch)).map_err(MergeError::Serialize)
}

#[derive(Debug, Clone, Copy, Default)]
struct DiffOptions {
    ignore_deletions: bool,
    ignore_changes_and_additions: bool,
    set_element_order: bool,
}

/// DiffWalker computes a two-way strategic diff, tracking the path of the
/// value under comparison for error reporting.
struct DiffWalker {
    options: DiffOptions,
    path: Path,
}

impl DiffWalker {
    fn new(options: DiffOptions) -> Self {
        DiffWalker {
            options,
            path: Path::new(),
        }
    }

    fn diff_maps(
        &mut self,
        original: &Map<String, Value>,
        modified: &Map<String, Value>,
        meta: &PatchMeta,
    ) -> Result<Map<String, Value>, MergeError> {
        let mut patch = Map::new();
        for (key, modified_value) in modified {
            self.path.push(PathElement::field_name(key.as_str()));
            let result = self.diff_entry(key, original.get(key), modified_value, &meta.field(key), &mut patch);
            self.path.pop();
            result?;
        }

        if !self.options.ignore_deletions {
            for key in original.keys() {
                if !modified.contains_key(key) {
                    patch.insert(key.clone(), Value::Null);
                }
            }
        }
        Ok(patch)
    }

    fn diff_entry(
        &mut self,
        key: &str,
        original: Option<&Value>,
        modified: &Value,
        meta: &PatchMeta,
        patch: &mut Map<String, Value>,
    ) -> Result<(), MergeError> {
        let Some(original) = original else {
            self.replace(key, modified, patch);
            return Ok(());
        };
        if original == modified {
            return Ok(());
        }

        match (original, modified) {
            (Value::Object(o), Value::Object(m)) if meta.map_strategy() == MergeStrategy::Merge => {
                let sub = self.diff_maps(o, m, meta)?;
                if !sub.is_empty() {
                    patch.insert(key.to_string(), Value::Object(sub));
                }
            }
            (Value::Array(o), Value::Array(m)) => match meta.list_strategy() {
                MergeStrategy::MergeByKeys(keys) => {
                    self.diff_keyed_lists(key, o, m, &keys, &meta.element(), patch)?
                }
                MergeStrategy::MergeSet => self.diff_sets(key, o, m, patch),
                _ => self.replace(key, modified, patch),
            },
            _ => self.replace(key, modified, patch),
        }
        Ok(())
    }

    fn replace(&self, key: &str, modified: &Value, patch: &mut Map<String, Value>) {
        if !self.options.ignore_changes_and_additions {
            patch.insert(key.to_string(), modified.clone());
        }
    }

    fn diff_keyed_lists(
        &mut self,
        key: &str,
        original: &[Value],
        modified: &[Value],
        keys: &[String],
        element_meta: &PatchMeta,
        patch: &mut Map<String, Value>,
    ) -> Result<(), MergeError> {
        let original = self.keyed_elements(original, keys)?;
        let modified = self.keyed_elements(modified, keys)?;

        let mut patch_list = Vec::new();
        for (modified_element, element_key) in &modified {
            let Some((original_element, _)) = original.iter().find(|(_, k)| k == element_key) else {
                if !self.options.ignore_changes_and_additions {
                    patch_list.push(Value::Object((*modified_element).clone()));
                }
                continue;
            };
            if original_element == modified_element {
                continue;
            }

            self.path.push(PathElement::key(element_key.clone()));
            let sub = self.diff_maps(original_element, modified_element, element_meta);
            self.path.pop();
            let mut sub = sub?;
            if !sub.is_empty() {
                sub.extend(element_key.iter().cloned());
                patch_list.push(Value::Object(sub));
            }
        }

        if !self.options.ignore_deletions {
            for (_, element_key) in &original {
                if !modified.iter().any(|(_, k)| k == element_key) {
                    let mut directive: Map<String, Value> = element_key.iter().cloned().collect();
                    directive.insert(DIRECTIVE_MARKER.to_string(), Value::from(DELETE_DIRECTIVE));
                    patch_list.push(Value::Object(directive));
                }
            }
        }

        if patch_list.is_empty() {
            return Ok(());
        }
        patch.insert(key.to_string(), Value::Array(patch_list));
        if self.options.set_element_order {
            let order = modified
                .iter()
                .map(|(_, k)| Value::Object(k.iter().cloned().collect()))
                .collect();
            patch.insert(format!("{SET_ELEMENT_ORDER_PREFIX}/{key}"), Value::Array(order));
        }
        Ok(())
    }

    /// Pairs every element of a keyed list with its merge key values.
    fn keyed_elements<'a>(
        &self,
        list: &'a [Value],
        keys: &[String],
    ) -> Result<Vec<(&'a Map<String, Value>, Vec<(String, Value)>)>, MergeError> {
        let mut elements = Vec::with_capacity(list.len());
        for (i, element) in list.iter().enumerate() {
            let at = self.path.with(PathElement::index(i));
            let Value::Object(map) = element else {
                return Err(MergeError::NonMapListElement { path: at.to_string() });
            };
            let mut element_key = Vec::with_capacity(keys.len());
            for key in keys {
                let value = map
                    .get(key)
                    .ok_or_else(|| MergeError::missing_merge_key(at.to_string(), key.as_str()))?;
                element_key.push((key.clone(), value.clone()));
            }
            elements.push((map, element_key));
        }
        Ok(elements)
    }

    fn diff_sets(&self, key: &str, original: &[Value], modified: &[Value], patch: &mut Map<String, Value>) {
        let additions: Vec<Value> = modified.iter().filter(|v| !original.contains(v)).cloned().collect();
        let deletions: Vec<Value> = original.iter().filter(|v| !modified.contains(v)).cloned().collect();

        let mut changed = false;
        if !self.options.ignore_changes_and_additions && !additions.is_empty() {
            patch.insert(key.to_string(), Value::Array(additions));
            changed = true;
        }
        if !self.options.ignore_deletions && !deletions.is_empty() {
            patch.insert(
                format!("{DELETE_FROM_PRIMITIVE_LIST_PREFIX}/{key}"),
                Value::Array(deletions),
            );
            changed = true;
        }
        if changed && self.options.set_element_order {
            patch.insert(
                format!("{SET_ELEMENT_ORDER_PREFIX}/{key}"),
                Value::Array(modified.to_vec()),
            );
        }
    }
}

/// Merges `patch` into `into`; keyed list entries are combined by merge key.
fn merge_patches(into: &mut Map<String, Value>, patch: Map<String, Value>, meta: &PatchMeta) {
    for (key, value) in patch {
        let field_meta = meta.field(&key);
        match value {
            Value::Object(sub) => {
                if let Some(Value::Object(target)) = into.get_mut(&key) {
                    merge_patches(target, sub, &field_meta);
                    continue;
                }
                into.insert(key, Value::Object(sub));
            }
            Value::Array(elements) => {
                if let (Some(Value::Array(target)), MergeStrategy::MergeByKeys(keys)) =
                    (into.get_mut(&key), field_meta.list_strategy())
                {
                    merge_keyed_entries(target, elements, &keys, &field_meta.element());
                    continue;
                }
                into.insert(key, Value::Array(elements));
            }
            value => {
                into.insert(key, value);
            }
        }
    }
}

fn merge_keyed_entries(target: &mut Vec<Value>, entries: Vec<Value>, keys: &[String], meta: &PatchMeta) {
    for entry in entries {
        let entry = match entry {
            Value::Object(entry) => entry,
            other => {
                target.push(other);
                continue;
            }
        };
        let position = target
            .iter()
            .position(|t| t.as_object().is_some_and(|t| same_merge_key(t, &entry, keys)));
        match position.and_then(|i| target.get_mut(i)) {
            Some(Value::Object(existing)) => merge_patches(existing, entry, meta),
            _ => target.push(Value::Object(entry)),
        }
    }
}

fn same_merge_key(a: &Map<String, Value>, b: &Map<String, Value>, keys: &[String]) -> bool {
    keys.iter().all(|k| a.get(k).is_some_and(|v| Some(v) == b.get(k)))
}

/// Returns the path of the first field that the patch and the
/// original-to-current changes set differently.
fn find_patch_conflict(
    patch: &Map<String, Value>,
    changed: &Map<String, Value>,
    meta: &PatchMeta,
    path: &mut Path,
) -> Option<Path> {
    for (key, patch_value) in patch {
        if key.starts_with('$') {
            continue;
        }
        let Some(changed_value) = changed.get(key) else {
            continue;
        };

        path.push(PathElement::field_name(key.as_str()));
        let field_meta = meta.field(key);
        let conflict = match (patch_value, changed_value) {
            (Value::Object(p), Value::Object(c)) => find_patch_conflict(p, c, &field_meta, path),
            (Value::Array(p), Value::Array(c)) => match field_meta.list_strategy() {
                MergeStrategy::MergeByKeys(keys) => {
                    find_keyed_list_conflict(p, c, &keys, &field_meta.element(), path)
                }
                MergeStrategy::MergeSet => None,
                _ => (p != c).then(|| path.clone()),
            },
            (p, c) if p != c => Some(path.clone()),
            _ => None,
        };
        path.pop();
        if conflict.is_some() {
            return conflict;
        }
    }
    None
}

fn find_keyed_list_conflict(
    patch: &[Value],
    changed: &[Value],
    keys: &[String],
    meta: &PatchMeta,
    path: &mut Path,
) -> Option<Path> {
    for entry in patch.iter().filter_map(Value::as_object) {
        let Some(other) = changed
            .iter()
            .filter_map(Value::as_object)
            .find(|c| same_merge_key(c, entry, keys))
        else {
            continue;
        };
        let element_key = keys
            .iter()
            .filter_map(|k| entry.get(k).map(|v| (k.clone(), v.clone())))
            .collect();
        path.push(PathElement::key(element_key));
        let conflict = find_patch_conflict(entry, other, meta, path);
        path.pop();
        if conflict.is_some() {
            return conflict;
        }
    }
    None
}
