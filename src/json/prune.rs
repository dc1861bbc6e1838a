//! Removal of ignored fields before documents are compared.

use crate::fieldpath::{Path, PathElement};
use serde_json::Value;

/// Removes the value at `path` from `value`. Returns the removed value.
///
/// Field names descend into objects, indices into arrays. Key elements never
/// match since a document carries no merge metadata.
pub fn remove_path(value: &mut Value, path: &Path) -> Option<Value> {
    let (last, parents) = path.as_slice().split_last()?;
    let mut current = value;
    for element in parents {
        current = child_mut(current, element)?;
    }
    match (current, last) {
        (Value::Object(map), PathElement::FieldName(name)) => map.remove(name),
        (Value::Array(items), PathElement::Index(i)) if *i < items.len() => Some(items.remove(*i)),
        _ => None,
    }
}

fn child_mut<'a>(value: &'a mut Value, element: &PathElement) -> Option<&'a mut Value> {
    match (value, element) {
        (Value::Object(map), PathElement::FieldName(name)) => map.get_mut(name),
        (Value::Array(items), PathElement::Index(i)) => items.get_mut(*i),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_remove_nested_field() {
        let mut doc = json!({"metadata": {"name": "a", "resourceVersion": "12"}});
        let removed = remove_path(&mut doc, &Path::parse_dotted("metadata.resourceVersion"));
        assert_eq!(removed, Some(json!("12")));
        assert_eq!(doc, json!({"metadata": {"name": "a"}}));
    }

    #[test]
    fn test_remove_missing_field() {
        let mut doc = json!({"metadata": {"name": "a"}});
        assert!(remove_path(&mut doc, &Path::parse_dotted("status")).is_none());
        assert!(remove_path(&mut doc, &Path::parse_dotted("metadata.name.first")).is_none());
        assert!(remove_path(&mut doc, &Path::new()).is_none());
        assert_eq!(doc, json!({"metadata": {"name": "a"}}));
    }

    #[test]
    fn test_remove_through_array() {
        let mut doc = json!({"items": [{"a": 1, "b": 2}]});
        let path = Path::from_elements(vec![
            PathElement::field_name("items"),
            PathElement::index(0),
            PathElement::field_name("b"),
        ]);
        assert_eq!(remove_path(&mut doc, &path), Some(json!(2)));
        assert_eq!(doc, json!({"items": [{"a": 1}]}));
    }
}
