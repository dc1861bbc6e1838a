//! Schema elements describing how the fields of a resource merge.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Schema is a list of named types.
///
/// Types are indexed by name on the first lookup, so a schema should be
/// treated as immutable once it is in use.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<TypeDef>,

    #[serde(skip)]
    type_map: OnceCell<HashMap<String, usize>>,
}

impl Clone for Schema {
    fn clone(&self) -> Self {
        Schema::with_types(self.types.clone())
    }
}

/// TypeDef represents a named type in a schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeDef {
    /// Every top level type must have a unique name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(flatten)]
    pub atom: Atom,
}

/// TypeRef either refers to a named type or declares an inlined type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeRef {
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "namedType")]
    pub named_type: Option<String>,

    #[serde(flatten)]
    pub inlined: Box<Atom>,

    /// Overrides the relationship of the referred list or map type.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        rename = "elementRelationship"
    )]
    pub element_relationship: Option<ElementRelationship>,
}

impl TypeRef {
    /// Creates a reference to a named type.
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef {
            named_type: Some(name.into()),
            ..Default::default()
        }
    }
}

/// Atom is the shape of a value. Exactly one of the fields is normally set;
/// an atom with none set describes a value with no merge metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scalar: Option<Scalar>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<List>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<Map>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scalar {
    Numeric,
    String,
    Boolean,
    Untyped,
}

/// ElementRelationship states how the items of a container merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementRelationship {
    /// Lists only: items are merged by their keys, or as a set when the list
    /// declares no keys.
    Associative,
    /// The container is replaced as a whole.
    Atomic,
    /// Items are merged independently (maps).
    #[default]
    Separable,
}

/// Map describes an object, either a struct with known fields or a free-form
/// mapping whose entries share `element_type`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Map {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<StructField>,

    #[serde(default, rename = "elementType")]
    pub element_type: TypeRef,

    #[serde(
        default,
        skip_serializing_if = "is_default_element_relationship",
        rename = "elementRelationship"
    )]
    pub element_relationship: ElementRelationship,

    #[serde(skip)]
    field_map: OnceCell<HashMap<String, usize>>,
}

impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
            && self.element_type == other.element_type
            && self.element_relationship == other.element_relationship
    }
}

fn is_default_element_relationship(er: &ElementRelationship) -> bool {
    *er == ElementRelationship::Separable
}

/// StructField pairs a field name with a field type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructField {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, rename = "type")]
    pub field_type: TypeRef,
}

/// List describes an array whose elements share a type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct List {
    #[serde(default, rename = "elementType")]
    pub element_type: TypeRef,

    /// Lists are atomic unless declared otherwise.
    #[serde(default = "atomic", rename = "elementRelationship")]
    pub element_relationship: ElementRelationship,

    /// Merge keys of the element map type, for associative lists.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,
}

fn atomic() -> ElementRelationship {
    ElementRelationship::Atomic
}

impl Schema {
    pub fn new() -> Self {
        Schema::default()
    }

    /// Creates a schema with the given type definitions.
    pub fn with_types(types: Vec<TypeDef>) -> Self {
        Schema {
            types,
            type_map: OnceCell::new(),
        }
    }

    /// Parses a schema from its YAML form.
    pub fn from_yaml(yaml: &str) -> Result<Schema, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Returns the named type, if it exists.
    pub fn find_named_type(&self, name: &str) -> Option<&TypeDef> {
        let map = self.type_map.get_or_init(|| {
            self.types
                .iter()
                .enumerate()
                .map(|(i, t)| (t.name.clone(), i))
                .collect()
        });
        map.get(name).map(|&i| &self.types[i])
    }

    /// Resolve returns the atom referenced, whether it is inline or named,
    /// with any element relationship override of the reference applied.
    /// Returns None if a named type can't be found.
    pub fn resolve(&self, tr: &TypeRef) -> Option<Atom> {
        let mut atom = match tr.named_type {
            Some(ref named) => self.find_named_type(named)?.atom.clone(),
            None => (*tr.inlined).clone(),
        };

        if let Some(er) = tr.element_relationship {
            if let Some(ref mut list) = atom.list {
                list.element_relationship = er;
            }
            if let Some(ref mut map) = atom.map {
                map.element_relationship = er;
            }
        }
        Some(atom)
    }
}

impl Map {
    /// Returns the struct field with the given name, if it exists.
    pub fn find_field(&self, name: &str) -> Option<&StructField> {
        let map = self.field_map.get_or_init(|| {
            self.fields
                .iter()
                .enumerate()
                .map(|(i, f)| (f.name.clone(), i))
                .collect()
        });
        map.get(name).map(|&i| &self.fields[i])
    }

    /// Returns the type of the named entry: the struct field's type when one
    /// is declared, the element type otherwise.
    pub fn entry_type(&self, name: &str) -> &TypeRef {
        match self.find_field(name) {
            Some(field) => &field.field_type,
            None => &self.element_type,
        }
    }
}
