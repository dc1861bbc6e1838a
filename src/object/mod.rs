//! Object module - the resources compared by the patch engine.
//!
//! Every resource handed to the engine implements [`Object`]. The trait gives
//! access to the identity and annotations of the object and tells the engine
//! which merge path applies through [`Object::representation`]. Typed kinds
//! get their merge metadata from a [`MergeMetadataSource`]; free-form
//! documents are wrapped in [`Unstructured`].

mod meta;
mod unstructured;

pub use meta::*;
pub use unstructured::*;

use crate::catalog::MergeMetadataSource;
use crate::error::Result;
use crate::schema::PatchMeta;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Representation is the closed set of shapes the patch engine knows how to
/// merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    /// The object has a static shape with per-field merge metadata.
    Typed,
    /// The object is a free-form JSON document.
    Unstructured,
}

/// Object is a resource stored in the object store.
pub trait Object: Serialize {
    /// API version and kind of the object.
    fn type_meta(&self) -> TypeMeta;

    fn name(&self) -> Option<String>;

    fn namespace(&self) -> Option<String>;

    /// Returns a copy of the object's annotations.
    fn annotations(&self) -> BTreeMap<String, String>;

    /// Replaces the object's annotations. An empty map clears them.
    fn set_annotations(&mut self, annotations: BTreeMap<String, String>);

    fn representation(&self) -> Representation {
        Representation::Typed
    }

    fn is_unstructured(&self) -> bool {
        self.representation() == Representation::Unstructured
    }

    /// Resolves the merge metadata of this object's type.
    fn merge_metadata(&self, source: &dyn MergeMetadataSource) -> Result<PatchMeta> {
        source.lookup_merge_metadata(&self.type_meta())
    }

    /// Identity of the object, for error messages and logs.
    fn object_ref(&self) -> ObjectRef {
        ObjectRef {
            kind: self.type_meta().kind,
            namespace: self.namespace(),
            name: self.name(),
        }
    }
}

/// ObjectRef identifies an object in messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectRef {
    pub kind: String,
    pub namespace: Option<String>,
    pub name: Option<String>,
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name.as_deref().unwrap_or("<unnamed>");
        match self.namespace.as_deref() {
            Some(ns) if !ns.is_empty() => write!(f, "{} {}/{}", self.kind, ns, name),
            _ => write!(f, "{} {}", self.kind, name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_ref_display() {
        let namespaced = ObjectRef {
            kind: "Service".to_string(),
            namespace: Some("default".to_string()),
            name: Some("web".to_string()),
        };
        assert_eq!(namespaced.to_string(), "Service default/web");

        let cluster_scoped = ObjectRef {
            kind: "ClusterRole".to_string(),
            namespace: None,
            name: None,
        };
        assert_eq!(cluster_scoped.to_string(), "ClusterRole <unnamed>");
    }
}
