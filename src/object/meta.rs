//! Type and object metadata shared by all typed resources.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// TypeMeta names the API version and kind of an object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
}

impl TypeMeta {
    pub fn new(api_version: impl Into<String>, kind: impl Into<String>) -> Self {
        TypeMeta {
            api_version: api_version.into(),
            kind: kind.into(),
        }
    }
}

impl fmt::Display for TypeMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Kind={}", self.api_version, self.kind)
    }
}

/// ObjectMeta is the metadata every persisted object carries.
///
/// `creation_timestamp` is serialized even when unset, so a freshly built
/// object serializes it as `null`; the patch engine strips such nulls from
/// desired objects before comparing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<i64>,

    #[serde(default)]
    pub creation_timestamp: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
}

impl ObjectMeta {
    /// Metadata for an object with a fixed name.
    pub fn named(namespace: Option<&str>, name: &str) -> Self {
        ObjectMeta {
            name: Some(name.to_string()),
            namespace: namespace.map(str::to_string),
            ..Default::default()
        }
    }

    /// Metadata for an object named by the server from a prefix.
    pub fn generated(namespace: Option<&str>, prefix: &str) -> Self {
        ObjectMeta {
            generate_name: Some(prefix.to_string()),
            namespace: namespace.map(str::to_string),
            ..Default::default()
        }
    }

    /// Sets the labels, builder style.
    pub fn with_labels<K, V>(mut self, labels: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.labels = Some(
            labels
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub(crate) fn annotations_or_empty(&self) -> BTreeMap<String, String> {
        self.annotations.clone().unwrap_or_default()
    }

    pub(crate) fn replace_annotations(&mut self, annotations: BTreeMap<String, String>) {
        self.annotations = if annotations.is_empty() {
            None
        } else {
            Some(annotations)
        };
    }
}
