//! Server-side defaulting of the built-in kinds.

use crate::object::TypeMeta;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU32, Ordering};

/// Defaulter fills in fields the server sets when an object is created.
pub trait Defaulter: Send + Sync {
    fn apply_defaults(&self, type_meta: &TypeMeta, object: &mut Map<String, Value>);
}

/// BuiltinDefaulter applies the defaults of the built-in kinds.
#[derive(Debug, Default)]
pub struct BuiltinDefaulter {
    allocated_ips: AtomicU32,
}

impl Defaulter for BuiltinDefaulter {
    fn apply_defaults(&self, type_meta: &TypeMeta, object: &mut Map<String, Value>) {
        match (type_meta.api_version.as_str(), type_meta.kind.as_str()) {
            ("v1", "Service") => self.default_service(object),
            ("v1", "Pod") => {
                if let Some(spec) = child_map(object, "spec") {
                    default_pod_spec(spec);
                }
                if let Some(status) = child_map(object, "status") {
                    set_default(status, "phase", "Pending");
                }
            }
            ("apps/v1", "Deployment") => default_deployment(object),
            _ => {}
        }
    }
}

impl BuiltinDefaulter {
    fn default_service(&self, object: &mut Map<String, Value>) {
        let Some(spec) = child_map(object, "spec") else {
            return;
        };
        set_default(spec, "type", "ClusterIP");
        set_default(spec, "sessionAffinity", "None");
        if spec.get("type").and_then(Value::as_str) != Some("ExternalName") && !spec.contains_key("clusterIP") {
            let n = self.allocated_ips.fetch_add(1, Ordering::SeqCst);
            spec.insert(
                "clusterIP".to_string(),
                Value::from(format!("10.96.{}.{}", n / 250, n % 250 + 1)),
            );
        }
        for port in list_maps(spec, "ports") {
            set_default(port, "protocol", "TCP");
            if let Some(number) = port.get("port").cloned() {
                set_default(port, "targetPort", number);
            }
        }
    }
}

fn default_deployment(object: &mut Map<String, Value>) {
    if let Some(spec) = child_map(object, "spec") {
        set_default(spec, "replicas", 1);
        set_default(spec, "revisionHistoryLimit", 10);
        set_default(spec, "progressDeadlineSeconds", 600);
        if let Some(pod_spec) = child_map(spec, "template").and_then(|t| child_map(t, "spec")) {
            default_pod_spec(pod_spec);
        }
    }
    if let Some(status) = child_map(object, "status") {
        set_default(status, "observedGeneration", 1);
    }
}

fn default_pod_spec(spec: &mut Map<String, Value>) {
    set_default(spec, "restartPolicy", "Always");
    set_default(spec, "dnsPolicy", "ClusterFirst");
    set_default(spec, "terminationGracePeriodSeconds", 30);
    for container in list_maps(spec, "containers") {
        let policy = match container.get("image").and_then(Value::as_str) {
            Some(image) => image_pull_policy(image),
            None => "IfNotPresent",
        };
        set_default(container, "imagePullPolicy", policy);
        set_default(container, "terminationMessagePath", "/dev/termination-log");
        for port in list_maps(container, "ports") {
            set_default(port, "protocol", "TCP");
        }
    }
}

/// Images without a tag or tagged `latest` are always pulled.
fn image_pull_policy(image: &str) -> &'static str {
    if image.contains('@') {
        return "IfNotPresent";
    }
    let last = image.rsplit('/').next().unwrap_or(image);
    match last.split_once(':') {
        Some((_, tag)) if tag != "latest" => "IfNotPresent",
        _ => "Always",
    }
}

fn set_default(map: &mut Map<String, Value>, key: &str, value: impl Into<Value>) {
    map.entry(key).or_insert_with(|| value.into());
}

/// Returns the object at `key`, creating it if missing. A non-object value
/// is replaced.
fn child_map<'a>(map: &'a mut Map<String, Value>, key: &str) -> Option<&'a mut Map<String, Value>> {
    if !map.get(key).is_some_and(Value::is_object) {
        map.insert(key.to_string(), Value::Object(Map::new()));
    }
    map.get_mut(key).and_then(Value::as_object_mut)
}

fn list_maps<'a>(map: &'a mut Map<String, Value>, key: &str) -> impl Iterator<Item = &'a mut Map<String, Value>> {
    map.get_mut(key)
        .and_then(Value::as_array_mut)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object_mut)
}
