//! PatchMeta resolves the merge strategy of fields while walking a document.

use super::elements::{Atom, ElementRelationship, Schema, TypeRef};
use std::sync::Arc;

/// MergeStrategy is how a value merges with its counterpart in another
/// version of the same document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeStrategy {
    /// The value is replaced as a whole when it differs.
    Replace,
    /// Object entries are merged one by one.
    Merge,
    /// List elements are objects merged by the values of these keys.
    MergeByKeys(Vec<String>),
    /// List elements are scalars merged as a set.
    MergeSet,
}

/// PatchMeta is a cursor into a schema pointing at the type of one value.
///
/// A PatchMeta with no type describes a value the schema knows nothing
/// about: objects merge entry by entry and lists are replaced.
#[derive(Debug, Clone)]
pub struct PatchMeta {
    schema: Arc<Schema>,
    atom: Option<Atom>,
}

impl PatchMeta {
    /// Creates a cursor at the given type of the schema.
    ///
    /// Returns None if the type can't be resolved.
    pub fn new(schema: Arc<Schema>, type_ref: &TypeRef) -> Option<Self> {
        let atom = schema.resolve(type_ref)?;
        Some(PatchMeta {
            schema,
            atom: Some(atom),
        })
    }

    /// Metadata for documents without a schema.
    pub fn untyped() -> Self {
        PatchMeta {
            schema: Arc::new(Schema::new()),
            atom: None,
        }
    }

    fn descend(&self, type_ref: &TypeRef) -> PatchMeta {
        PatchMeta {
            schema: Arc::clone(&self.schema),
            atom: self
                .schema
                .resolve(type_ref)
                .filter(|atom| *atom != Atom::default()),
        }
    }

    fn untyped_child(&self) -> PatchMeta {
        PatchMeta {
            schema: Arc::clone(&self.schema),
            atom: None,
        }
    }

    /// Metadata of an object entry.
    pub fn field(&self, name: &str) -> PatchMeta {
        match self.atom.as_ref().and_then(|a| a.map.as_ref()) {
            Some(map) => self.descend(map.entry_type(name)),
            None => self.untyped_child(),
        }
    }

    /// Metadata of the elements of a list.
    pub fn element(&self) -> PatchMeta {
        match self.atom.as_ref().and_then(|a| a.list.as_ref()) {
            Some(list) => self.descend(&list.element_type),
            None => self.untyped_child(),
        }
    }

    /// Strategy used when this value is an object.
    pub fn map_strategy(&self) -> MergeStrategy {
        match self.atom.as_ref().and_then(|a| a.map.as_ref()) {
            Some(map) if map.element_relationship == ElementRelationship::Atomic => {
                MergeStrategy::Replace
            }
            _ => MergeStrategy::Merge,
        }
    }

    /// Strategy used when this value is a list.
    pub fn list_strategy(&self) -> MergeStrategy {
        match self.atom.as_ref().and_then(|a| a.list.as_ref()) {
            Some(list) if list.element_relationship == ElementRelationship::Associative => {
                if list.keys.is_empty() {
                    MergeStrategy::MergeSet
                } else {
                    MergeStrategy::MergeByKeys(list.keys.clone())
                }
            }
            _ => MergeStrategy::Replace,
        }
    }

    /// Returns true if the schema has a type for this value.
    pub fn is_typed(&self) -> bool {
        self.atom.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"types:
- name: service
  map:
    fields:
    - name: spec
      type:
        namedType: serviceSpec
- name: serviceSpec
  map:
    fields:
    - name: ports
      type:
        list:
          elementType:
            namedType: port
          elementRelationship: associative
          keys:
          - port
    - name: finalizers
      type:
        list:
          elementType:
            scalar: string
          elementRelationship: associative
    - name: selector
      type:
        map:
          elementType:
            scalar: string
          elementRelationship: atomic
    - name: externalIPs
      type:
        list:
          elementType:
            scalar: string
- name: port
  map:
    fields:
    - name: port
      type:
        scalar: numeric
"#;

    fn root() -> PatchMeta {
        let schema = Arc::new(Schema::from_yaml(SCHEMA).unwrap());
        PatchMeta::new(schema, &TypeRef::named("service")).unwrap()
    }

    #[test]
    fn test_strategies() {
        let spec = root().field("spec");
        assert_eq!(spec.map_strategy(), MergeStrategy::Merge);
        assert_eq!(
            spec.field("ports").list_strategy(),
            MergeStrategy::MergeByKeys(vec!["port".to_string()])
        );
        assert_eq!(spec.field("finalizers").list_strategy(), MergeStrategy::MergeSet);
        assert_eq!(spec.field("selector").map_strategy(), MergeStrategy::Replace);
        assert_eq!(spec.field("externalIPs").list_strategy(), MergeStrategy::Replace);
    }

    #[test]
    fn test_unknown_fields_are_untyped() {
        let unknown = root().field("spec").field("nope");
        assert!(!unknown.is_typed());
        assert_eq!(unknown.map_strategy(), MergeStrategy::Merge);
        assert_eq!(unknown.list_strategy(), MergeStrategy::Replace);
        assert!(!unknown.element().is_typed());
    }

    #[test]
    fn test_missing_root_type() {
        let schema = Arc::new(Schema::from_yaml(SCHEMA).unwrap());
        assert!(PatchMeta::new(schema, &TypeRef::named("pod")).is_none());
    }
}
