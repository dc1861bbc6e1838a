//! Catalog module - lookup of merge metadata by object type.
//!
//! The patch engine treats the catalog as an opaque service: given the type of
//! the desired object it returns a [`PatchMeta`] positioned at the root of
//! that type. [`SchemaCatalog`] is the schema-backed implementation.

mod builtin;

pub use builtin::BUILTIN_CATALOG_YAML;

use crate::error::{Error, Result};
use crate::object::TypeMeta;
use crate::schema::{PatchMeta, Schema, TypeDef, TypeRef};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

/// MergeMetadataSource resolves per-field merge metadata for a type.
pub trait MergeMetadataSource: Send + Sync {
    /// Returns the metadata at the root of the given type.
    fn lookup_merge_metadata(&self, type_meta: &TypeMeta) -> Result<PatchMeta>;
}

/// KindMapping associates an API version and kind with a schema type.
#[derive(Debug, Clone, Deserialize)]
pub struct KindMapping {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    kinds: Vec<KindMapping>,
    #[serde(default)]
    types: Vec<TypeDef>,
}

/// SchemaCatalog resolves merge metadata from a schema.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    schema: Arc<Schema>,
    kinds: HashMap<TypeMeta, String>,
}

static BUILTIN: Lazy<Arc<SchemaCatalog>> = Lazy::new(|| {
    Arc::new(
        SchemaCatalog::from_yaml(BUILTIN_CATALOG_YAML).expect("built-in catalog should parse"),
    )
});

impl SchemaCatalog {
    /// Creates a catalog over a schema with no kinds registered.
    pub fn new(schema: Schema) -> Self {
        SchemaCatalog {
            schema: Arc::new(schema),
            kinds: HashMap::new(),
        }
    }

    /// Parses a catalog document: a `kinds` list mapping API version and kind
    /// to a type name, and the `types` of the schema.
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        let doc: CatalogDocument = serde_yaml::from_str(yaml)?;
        let mut catalog = SchemaCatalog::new(Schema::with_types(doc.types));
        for mapping in doc.kinds {
            catalog.register(
                TypeMeta::new(mapping.api_version, mapping.kind),
                mapping.type_name,
            );
        }
        Ok(catalog)
    }

    /// Returns the catalog of the built-in kinds.
    ///
    /// The catalog is parsed once and shared; it is never mutated.
    pub fn builtin() -> Arc<SchemaCatalog> {
        Arc::clone(&BUILTIN)
    }

    /// Maps a kind to a type of the schema.
    pub fn register(&mut self, type_meta: TypeMeta, type_name: impl Into<String>) {
        self.kinds.insert(type_meta, type_name.into());
    }

    /// Adds the kinds and types of another catalog. Entries of `other` win
    /// over existing ones with the same name.
    pub fn extend(&mut self, other: &SchemaCatalog) {
        let mut types: Vec<TypeDef> = self
            .schema
            .types
            .iter()
            .filter(|t| other.schema.find_named_type(&t.name).is_none())
            .cloned()
            .collect();
        types.extend(other.schema.types.iter().cloned());
        self.schema = Arc::new(Schema::with_types(types));
        for (type_meta, type_name) in &other.kinds {
            self.kinds.insert(type_meta.clone(), type_name.clone());
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the registered kinds.
    pub fn kinds(&self) -> impl Iterator<Item = &TypeMeta> {
        self.kinds.keys()
    }
}

impl MergeMetadataSource for SchemaCatalog {
    fn lookup_merge_metadata(&self, type_meta: &TypeMeta) -> Result<PatchMeta> {
        let type_name = self
            .kinds
            .get(type_meta)
            .ok_or_else(|| Error::MergeMetadataLookup {
                type_meta: type_meta.to_string(),
                message: "kind is not registered".to_string(),
            })?;

        PatchMeta::new(Arc::clone(&self.schema), &TypeRef::named(type_name.as_str())).ok_or_else(
            || Error::MergeMetadataLookup {
                type_meta: type_meta.to_string(),
                message: format!("no type found matching: {}", type_name),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::MergeStrategy;

    #[test]
    fn test_builtin_catalog_resolves_all_kinds() {
        let catalog = SchemaCatalog::builtin();
        let kinds: Vec<TypeMeta> = catalog.kinds().cloned().collect();
        assert_eq!(kinds.len(), 5);
        for kind in &kinds {
            let meta = catalog.lookup_merge_metadata(kind).unwrap();
            assert!(meta.is_typed(), "{} has no type", kind);
        }
    }

    #[test]
    fn test_builtin_strategies() {
        let catalog = SchemaCatalog::builtin();
        let pod = catalog
            .lookup_merge_metadata(&TypeMeta::new("v1", "Pod"))
            .unwrap();
        let containers = pod.field("spec").field("containers");
        assert_eq!(
            containers.list_strategy(),
            MergeStrategy::MergeByKeys(vec!["name".to_string()])
        );
        assert_eq!(
            containers.element().field("env").list_strategy(),
            MergeStrategy::MergeByKeys(vec!["name".to_string()])
        );
        assert_eq!(
            containers.element().field("args").list_strategy(),
            MergeStrategy::Replace
        );
        assert_eq!(
            pod.field("metadata").field("finalizers").list_strategy(),
            MergeStrategy::MergeSet
        );

        let deployment = catalog
            .lookup_merge_metadata(&TypeMeta::new("apps/v1", "Deployment"))
            .unwrap();
        assert_eq!(
            deployment.field("spec").field("selector").map_strategy(),
            MergeStrategy::Replace
        );
        assert_eq!(
            deployment
                .field("spec")
                .field("template")
                .field("spec")
                .field("containers")
                .list_strategy(),
            MergeStrategy::MergeByKeys(vec!["name".to_string()])
        );
    }

    #[test]
    fn test_unknown_kind() {
        let catalog = SchemaCatalog::builtin();
        let err = catalog
            .lookup_merge_metadata(&TypeMeta::new("example.com/v1", "Widget"))
            .unwrap_err();
        assert!(matches!(err, Error::MergeMetadataLookup { .. }));
        assert!(err.to_string().contains("Widget"));
    }

    #[test]
    fn test_registered_kind_without_type() {
        let mut catalog = SchemaCatalog::new(Schema::new());
        catalog.register(TypeMeta::new("v1", "Thing"), "missing");
        let err = catalog
            .lookup_merge_metadata(&TypeMeta::new("v1", "Thing"))
            .unwrap_err();
        assert!(err.to_string().contains("no type found matching: missing"));
    }

    #[test]
    fn test_extend() {
        let extra = SchemaCatalog::from_yaml(
            r#"kinds:
- apiVersion: example.com/v1
  kind: Widget
  type: widget
types:
- name: widget
  map:
    fields:
    - name: parts
      type:
        list:
          elementType:
            scalar: string
          elementRelationship: associative
"#,
        )
        .unwrap();

        let mut catalog = (*SchemaCatalog::builtin()).clone();
        catalog.extend(&extra);

        let widget = catalog
            .lookup_merge_metadata(&TypeMeta::new("example.com/v1", "Widget"))
            .unwrap();
        assert_eq!(widget.field("parts").list_strategy(), MergeStrategy::MergeSet);
        assert!(catalog
            .lookup_merge_metadata(&TypeMeta::new("v1", "ConfigMap"))
            .is_ok());
    }
}
