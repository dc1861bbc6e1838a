//! Client module - access to the object store.
//!
//! The patch engine itself never talks to the store. The client is used by
//! reconciliation harnesses to create live objects and read them back, so the
//! server-assigned and defaulted fields take part in comparisons.

mod defaults;
mod memory;

pub use defaults::*;
pub use memory::*;

use crate::error::{Error, Result};
use crate::object::{Object, TypeMeta};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// ObjectClient stores objects as JSON documents.
pub trait ObjectClient: Send + Sync {
    /// Persists a new object and returns it with server-assigned fields set.
    /// Fails if the object exists already or is invalid.
    fn create(&self, type_meta: &TypeMeta, object: Value) -> Result<Value>;

    fn get(&self, type_meta: &TypeMeta, namespace: Option<&str>, name: &str) -> Result<Value>;

    fn delete(
        &self,
        type_meta: &TypeMeta,
        namespace: Option<&str>,
        name: &str,
        grace_period_seconds: Option<i64>,
    ) -> Result<()>;
}

/// Creates `obj` and returns the stored object.
pub fn create_object<O>(client: &dyn ObjectClient, obj: &O) -> Result<O>
where
    O: Object + DeserializeOwned,
{
    let value = serde_json::to_value(obj).map_err(|e| Error::serialization("create object", obj.object_ref(), e))?;
    let created = client.create(&obj.type_meta(), value)?;
    serde_json::from_value(created)
        .map_err(|e| Error::Client(format!("decode created {}: {}", obj.object_ref(), e)))
}

/// Reads back the stored version of `obj`.
pub fn get_object<O>(client: &dyn ObjectClient, obj: &O) -> Result<O>
where
    O: Object + DeserializeOwned,
{
    let name = obj.name().unwrap_or_default();
    let value = client.get(&obj.type_meta(), obj.namespace().as_deref(), &name)?;
    serde_json::from_value(value).map_err(|e| Error::Client(format!("decode {}: {}", obj.object_ref(), e)))
}

/// DeleteGuard deletes an object from the store when dropped.
pub struct DeleteGuard<'a> {
    client: &'a dyn ObjectClient,
    type_meta: TypeMeta,
    namespace: Option<String>,
    name: String,
}

impl<'a> DeleteGuard<'a> {
    /// Guards a stored object.
    pub fn new<O: Object>(client: &'a dyn ObjectClient, obj: &O) -> Self {
        DeleteGuard {
            client,
            type_meta: obj.type_meta(),
            namespace: obj.namespace(),
            name: obj.name().unwrap_or_default(),
        }
    }
}

impl Drop for DeleteGuard<'_> {
    fn drop(&mut self) {
        if let Err(err) = self
            .client
            .delete(&self.type_meta, self.namespace.as_deref(), &self.name, Some(0))
        {
            warn!(kind = %self.type_meta.kind, name = %self.name, error = %err, "cleanup failed");
        }
    }
}
