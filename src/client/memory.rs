//! In-memory object store.

use super::{BuiltinDefaulter, Defaulter, ObjectClient};
use crate::error::{Error, Result};
use crate::json::delete_null_in_value;
use crate::object::TypeMeta;
use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

const NAME_SUFFIX_ALPHABET: &[u8] = b"bcdfghjklmnpqrstvwxz2456789";
const NAME_SUFFIX_LEN: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ObjectKey {
    api_version: String,
    kind: String,
    namespace: String,
    name: String,
}

impl ObjectKey {
    fn new(type_meta: &TypeMeta, namespace: Option<&str>, name: &str) -> Self {
        ObjectKey {
            api_version: type_meta.api_version.clone(),
            kind: type_meta.kind.clone(),
            namespace: namespace.unwrap_or_default().to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Default)]
struct Store {
    objects: BTreeMap<ObjectKey, Value>,
    resource_version: u64,
    generated_names: u64,
}

/// MemoryClient is an [`ObjectClient`] keeping objects in memory.
///
/// Created objects get a uid, a resource version, a generation and a
/// creation timestamp; `generateName` is turned into a name. Registered
/// defaulters run on every create.
#[derive(Default)]
pub struct MemoryClient {
    store: Mutex<Store>,
    defaulters: Vec<Arc<dyn Defaulter>>,
}

impl MemoryClient {
    /// Creates an empty store without defaulting.
    pub fn new() -> Self {
        MemoryClient::default()
    }

    /// Creates an empty store applying the defaults of the built-in kinds.
    pub fn with_builtin_defaults() -> Self {
        MemoryClient::new().with_defaulter(Arc::new(BuiltinDefaulter::default()))
    }

    /// Adds a defaulter, builder style.
    pub fn with_defaulter(mut self, defaulter: Arc<dyn Defaulter>) -> Self {
        self.defaulters.push(defaulter);
        self
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.store.lock().objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn name_suffix(mut n: u64) -> String {
    let base = NAME_SUFFIX_ALPHABET.len() as u64;
    let mut suffix = Vec::with_capacity(NAME_SUFFIX_LEN);
    for _ in 0..NAME_SUFFIX_LEN {
        suffix.push(NAME_SUFFIX_ALPHABET[(n % base) as usize]);
        n /= base;
    }
    suffix.reverse();
    String::from_utf8_lossy(&suffix).into_owned()
}

fn metadata_mut<'a>(type_meta: &TypeMeta, object: &'a mut Map<String, Value>) -> Result<&'a mut Map<String, Value>> {
    object
        .entry("metadata")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| Error::Client(format!("{}: metadata must be an object", type_meta)))
}

impl ObjectClient for MemoryClient {
    fn create(&self, type_meta: &TypeMeta, object: Value) -> Result<Value> {
        let mut object = object;
        delete_null_in_value(&mut object);
        let Value::Object(mut object) = object else {
            return Err(Error::Client(format!("{}: object must be a JSON object", type_meta)));
        };

        let mut store = self.store.lock();
        let metadata = metadata_mut(type_meta, &mut object)?;

        let name = match metadata.get("name").and_then(Value::as_str) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                let prefix = metadata
                    .get("generateName")
                    .and_then(Value::as_str)
                    .filter(|prefix| !prefix.is_empty())
                    .ok_or_else(|| Error::Client(format!("{}: name or generateName is required", type_meta)))?;
                store.generated_names += 1;
                let name = format!("{}{}", prefix, name_suffix(store.generated_names));
                metadata.insert("name".to_string(), Value::from(name.as_str()));
                name
            }
        };
        let namespace = metadata
            .get("namespace")
            .and_then(Value::as_str)
            .map(str::to_string);

        let key = ObjectKey::new(type_meta, namespace.as_deref(), &name);
        if store.objects.contains_key(&key) {
            return Err(Error::Client(format!("{} {} already exists", type_meta.kind, name)));
        }

        store.resource_version += 1;
        metadata.insert("uid".to_string(), Value::from(Uuid::new_v4().to_string()));
        metadata.insert(
            "resourceVersion".to_string(),
            Value::from(store.resource_version.to_string()),
        );
        metadata.insert("generation".to_string(), Value::from(1));
        metadata.insert(
            "creationTimestamp".to_string(),
            Value::from(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        );

        for defaulter in &self.defaulters {
            defaulter.apply_defaults(type_meta, &mut object);
        }

        let object = Value::Object(object);
        store.objects.insert(key, object.clone());
        debug!(kind = %type_meta.kind, name = %name, "created object");
        Ok(object)
    }

    fn get(&self, type_meta: &TypeMeta, namespace: Option<&str>, name: &str) -> Result<Value> {
        self.store
            .lock()
            .objects
            .get(&ObjectKey::new(type_meta, namespace, name))
            .cloned()
            .ok_or_else(|| Error::Client(format!("{} {} not found", type_meta.kind, name)))
    }

    fn delete(
        &self,
        type_meta: &TypeMeta,
        namespace: Option<&str>,
        name: &str,
        grace_period_seconds: Option<i64>,
    ) -> Result<()> {
        let removed = self
            .store
            .lock()
            .objects
            .remove(&ObjectKey::new(type_meta, namespace, name));
        match removed {
            Some(_) => {
                debug!(kind = %type_meta.kind, name = %name, grace_period_seconds = ?grace_period_seconds, "deleted object");
                Ok(())
            }
            None => Err(Error::Client(format!("{} {} not found", type_meta.kind, name))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{create_object, get_object, DeleteGuard};
    use crate::object::{Object, ObjectMeta};
    use crate::resources::{ConfigMap, Service, ServicePort, ServiceSpec};
    use serde_json::json;

    fn config_map_type() -> TypeMeta {
        TypeMeta::new("v1", "ConfigMap")
    }

    #[test]
    fn test_create_assigns_server_fields() {
        let client = MemoryClient::new();
        let created = client
            .create(&config_map_type(), json!({"metadata": {"name": "a", "namespace": "default"}}))
            .unwrap();
        let metadata = &created["metadata"];
        assert!(metadata["uid"].is_string());
        assert_eq!(metadata["resourceVersion"], json!("1"));
        assert_eq!(metadata["generation"], json!(1));
        assert!(metadata["creationTimestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_generate_name() {
        let client = MemoryClient::new();
        let first = client
            .create(&config_map_type(), json!({"metadata": {"generateName": "test-"}}))
            .unwrap();
        let second = client
            .create(&config_map_type(), json!({"metadata": {"generateName": "test-"}}))
            .unwrap();
        let first = first["metadata"]["name"].as_str().unwrap().to_string();
        let second = second["metadata"]["name"].as_str().unwrap().to_string();
        assert!(first.starts_with("test-"));
        assert_eq!(first.len(), "test-".len() + NAME_SUFFIX_LEN);
        assert_ne!(first, second);
    }

    #[test]
    fn test_create_requires_name() {
        let err = MemoryClient::new()
            .create(&config_map_type(), json!({"metadata": {}}))
            .unwrap_err();
        assert!(matches!(err, Error::Client(_)));
    }

    #[test]
    fn test_duplicate_create_fails() {
        let client = MemoryClient::new();
        let obj = json!({"metadata": {"name": "a"}});
        client.create(&config_map_type(), obj.clone()).unwrap();
        let err = client.create(&config_map_type(), obj).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_get_and_delete() {
        let client = MemoryClient::new();
        client
            .create(&config_map_type(), json!({"metadata": {"name": "a", "namespace": "ns"}}))
            .unwrap();
        assert!(client.get(&config_map_type(), Some("ns"), "a").is_ok());
        assert!(client.get(&config_map_type(), None, "a").is_err());

        client.delete(&config_map_type(), Some("ns"), "a", Some(0)).unwrap();
        assert!(client.is_empty());
        assert!(client.delete(&config_map_type(), Some("ns"), "a", None).is_err());
    }

    #[test]
    fn test_typed_round_trip_with_defaults() {
        let client = MemoryClient::with_builtin_defaults();
        let service = Service {
            metadata: ObjectMeta::named(Some("default"), "web"),
            spec: Some(ServiceSpec {
                ports: Some(vec![ServicePort {
                    port: 80,
                    ..Default::default()
                }]),
                ..Default::default()
            }),
        };

        let created = create_object(&client, &service).unwrap();
        let spec = created.spec.as_ref().unwrap();
        assert_eq!(spec.type_.as_deref(), Some("ClusterIP"));
        assert_eq!(spec.ports.as_ref().unwrap()[0].protocol.as_deref(), Some("TCP"));
        assert!(created.metadata.creation_timestamp.is_some());

        assert_eq!(get_object(&client, &service).unwrap(), created);
    }

    #[test]
    fn test_delete_guard() {
        let client = MemoryClient::new();
        let cm = ConfigMap {
            metadata: ObjectMeta::named(Some("default"), "scoped"),
            data: None,
        };
        {
            let created = create_object(&client, &cm).unwrap();
            let _guard = DeleteGuard::new(&client, &created);
            assert_eq!(client.len(), 1);
            assert_eq!(created.name().as_deref(), Some("scoped"));
        }
        assert!(client.is_empty());
    }
}
