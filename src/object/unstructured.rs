//! Unstructured objects: free-form JSON documents with metadata accessors.

use super::{Object, Representation, TypeMeta};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Unstructured is an object whose shape is not known statically.
///
/// It is merged with plain JSON merge patch semantics, without any per-field
/// strategy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Unstructured {
    object: Map<String, Value>,
}

impl Unstructured {
    pub fn new() -> Self {
        Unstructured::default()
    }

    /// Wraps a JSON value. Returns None unless the value is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(object) => Some(Unstructured { object }),
            _ => None,
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.object
    }

    pub fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.object
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.object)
    }

    /// Returns the value at a path of field names.
    pub fn get_nested(&self, fields: &[&str]) -> Option<&Value> {
        let (first, rest) = fields.split_first()?;
        let mut current = self.object.get(*first)?;
        for field in rest {
            current = current.as_object()?.get(*field)?;
        }
        Some(current)
    }

    /// Sets the value at a path of field names, creating intermediate objects
    /// and replacing any non-object value in the way.
    pub fn set_nested(&mut self, fields: &[&str], value: Value) {
        let Some((last, parents)) = fields.split_last() else {
            return;
        };
        let mut current = &mut self.object;
        for field in parents {
            let entry = current
                .entry(field.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            current = match entry {
                Value::Object(map) => map,
                _ => unreachable!("entry was just made an object"),
            };
        }
        current.insert(last.to_string(), value);
    }

    /// Removes the value at a path of field names.
    pub fn remove_nested(&mut self, fields: &[&str]) -> Option<Value> {
        let (last, parents) = fields.split_last()?;
        let mut current = &mut self.object;
        for field in parents {
            current = current.get_mut(*field)?.as_object_mut()?;
        }
        current.remove(*last)
    }

    fn string_field(&self, fields: &[&str]) -> Option<String> {
        self.get_nested(fields)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn string_map(&self, fields: &[&str]) -> BTreeMap<String, String> {
        self.get_nested(fields)
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn labels(&self) -> BTreeMap<String, String> {
        self.string_map(&["metadata", "labels"])
    }

    pub fn set_labels(&mut self, labels: BTreeMap<String, String>) {
        self.set_string_map(&["metadata", "labels"], labels);
    }

    fn set_string_map(&mut self, fields: &[&str], entries: BTreeMap<String, String>) {
        if entries.is_empty() {
            self.remove_nested(fields);
            return;
        }
        let map = entries
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        self.set_nested(fields, Value::Object(map));
    }
}

impl Object for Unstructured {
    fn type_meta(&self) -> TypeMeta {
        TypeMeta {
            api_version: self.string_field(&["apiVersion"]).unwrap_or_default(),
            kind: self.string_field(&["kind"]).unwrap_or_default(),
        }
    }

    fn name(&self) -> Option<String> {
        self.string_field(&["metadata", "name"])
    }

    fn namespace(&self) -> Option<String> {
        self.string_field(&["metadata", "namespace"])
    }

    fn annotations(&self) -> BTreeMap<String, String> {
        self.string_map(&["metadata", "annotations"])
    }

    fn set_annotations(&mut self, annotations: BTreeMap<String, String>) {
        self.set_string_map(&["metadata", "annotations"], annotations);
    }

    fn representation(&self) -> Representation {
        Representation::Unstructured
    }
}
