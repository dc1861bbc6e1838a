//! Resources module - built-in typed kinds.
//!
//! These are trimmed-down versions of common cluster objects. Their merge
//! metadata lives in the built-in catalog, see
//! [`SchemaCatalog::builtin`](crate::catalog::SchemaCatalog::builtin).

use serde::{Deserialize, Serialize};

/// Implements [`Object`](crate::object::Object) for a kind with a
/// `metadata: ObjectMeta` field.
macro_rules! typed_object {
    ($ty:ty, $api_version:expr, $kind:expr) => {
        impl $crate::object::Object for $ty {
            fn type_meta(&self) -> $crate::object::TypeMeta {
                $crate::object::TypeMeta::new($api_version, $kind)
            }

            fn name(&self) -> Option<String> {
                self.metadata.name.clone()
            }

            fn namespace(&self) -> Option<String> {
                self.metadata.namespace.clone()
            }

            fn annotations(&self) -> std::collections::BTreeMap<String, String> {
                self.metadata.annotations_or_empty()
            }

            fn set_annotations(&mut self, annotations: std::collections::BTreeMap<String, String>) {
                self.metadata.replace_annotations(annotations);
            }
        }
    };
}

pub(crate) use typed_object;

mod apps_v1;
mod core_v1;
mod rbac_v1;

pub use apps_v1::*;
pub use core_v1::*;
pub use rbac_v1::*;

/// IntOrString holds either a port number or a port name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntOrString {
    Int(i32),
    String(String),
}

impl From<i32> for IntOrString {
    fn from(i: i32) -> Self {
        IntOrString::Int(i)
    }
}

impl From<&str> for IntOrString {
    fn from(s: &str) -> Self {
        IntOrString::String(s.to_string())
    }
}
