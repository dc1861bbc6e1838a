//! Annotation module - the original-configuration annotation protocol.
//!
//! Every successful apply stores the applied desired state on the live object
//! under a single annotation. The next reconciliation reads it back as the
//! *original* side of the three-way comparison, which lets the patch engine
//! tell user-driven changes apart from changes made by the server or by other
//! actors.
//!
//! Values are stored as plain JSON. Documents larger than the annotation size
//! limit are stored as a base64-encoded zip archive holding one entry named
//! `original`; reads accept JSON, base64 and zipped values.

mod compress;

use crate::error::{Error, Result};
use crate::json::delete_null_in_json;
use crate::object::Object;
use serde_json::Value;
use tracing::debug;

/// LAST_APPLIED_CONFIG is the default annotation key.
pub const LAST_APPLIED_CONFIG: &str = "objectmatcher.io/last-applied";

/// MAX_ANNOTATION_SIZE is the size above which values are compressed.
pub const MAX_ANNOTATION_SIZE: usize = 256 * 1024;

const EMPTY_CONFIGURATION: &[u8] = b"{}";

/// Annotator reads and writes the original configuration of objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotator {
    key: String,
    compression_threshold: usize,
}

impl Default for Annotator {
    fn default() -> Self {
        Annotator::new(LAST_APPLIED_CONFIG)
    }
}

impl Annotator {
    /// Creates an annotator storing the original configuration under `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Annotator {
            key: key.into(),
            compression_threshold: MAX_ANNOTATION_SIZE,
        }
    }

    /// Sets the size above which values are zipped, builder style.
    pub fn with_compression_threshold(mut self, threshold: usize) -> Self {
        self.compression_threshold = threshold;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the original configuration stored on the object.
    ///
    /// An object without the annotation has the empty configuration `{}`, so
    /// the comparison degrades to a two-way diff.
    pub fn get_original_configuration<O: Object>(&self, obj: &O) -> Result<Vec<u8>> {
        let annotations = obj.annotations();
        let Some(original) = annotations.get(&self.key) else {
            return Ok(EMPTY_CONFIGURATION.to_vec());
        };

        if let Ok(value) = serde_json::from_str::<Value>(original) {
            require_object(obj, &value)?;
            return Ok(original.as_bytes().to_vec());
        }

        let decoded = compress::decode(original)
            .ok_or_else(|| Error::decode(obj.object_ref(), "value is neither JSON nor base64"))?
            .map_err(|e| Error::decode(obj.object_ref(), e.to_string()))?;

        let value = serde_json::from_slice::<Value>(&decoded)
            .map_err(|e| Error::decode(obj.object_ref(), e.to_string()))?;
        require_object(obj, &value)?;
        Ok(decoded)
    }

    /// Stores `original` as the original configuration of the in-memory
    /// object, replacing any previous value. Persisting the object is up to
    /// the caller. Empty input leaves the object untouched.
    pub fn set_original_configuration<O: Object>(&self, obj: &mut O, original: &[u8]) -> Result<()> {
        if original.is_empty() {
            return Ok(());
        }

        let value = if original.len() > self.compression_threshold {
            debug!(
                object = %obj.object_ref(),
                size = original.len(),
                "compressing original configuration"
            );
            compress::zip_and_encode(original)
                .map_err(|e| Error::encode(obj.object_ref(), e.to_string()))?
        } else {
            String::from_utf8(original.to_vec())
                .map_err(|e| Error::encode(obj.object_ref(), e.to_string()))?
        };

        let mut annotations = obj.annotations();
        annotations.insert(self.key.clone(), value);
        obj.set_annotations(annotations);
        Ok(())
    }

    /// Serializes the object as it would be stored as an original
    /// configuration: without the annotation itself.
    ///
    /// With `annotate`, the result is written to the annotation afterwards;
    /// otherwise the object's annotations are left as they were.
    pub fn get_modified_configuration<O: Object>(&self, obj: &mut O, annotate: bool) -> Result<Vec<u8>> {
        let annotations = obj.annotations();
        let had_annotation = annotations.contains_key(&self.key);
        if had_annotation {
            let mut without = annotations.clone();
            without.remove(&self.key);
            obj.set_annotations(without);
        }

        let modified = serde_json::to_vec(&*obj)
            .map_err(|e| Error::serialization("get modified configuration", obj.object_ref(), e));

        if had_annotation {
            obj.set_annotations(annotations);
        }
        let modified = modified?;

        if annotate {
            self.set_original_configuration(obj, &modified)?;
        }
        Ok(modified)
    }

    /// Records the object's current content, without nulls, as its original
    /// configuration. Call this on the desired object right before it is
    /// created or updated.
    pub fn set_last_applied_annotation<O: Object>(&self, obj: &mut O) -> Result<()> {
        let modified = self.get_modified_configuration(obj, false)?;
        let (modified, _) = delete_null_in_json(&modified)?;
        self.set_original_configuration(obj, &modified)
    }
}

/// The original configuration is always a JSON object.
fn require_object<O: Object>(obj: &O, value: &Value) -> Result<()> {
    if value.is_object() {
        Ok(())
    } else {
        Err(Error::decode(obj.object_ref(), "original configuration is not a JSON object"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{ObjectMeta, Unstructured};
    use crate::resources::ConfigMap;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::collections::BTreeMap;

    fn config_map() -> ConfigMap {
        ConfigMap {
            metadata: ObjectMeta::named(Some("default"), "settings").with_labels([("a", "1")]),
            data: Some(BTreeMap::from([("key".to_string(), "value".to_string())])),
        }
    }

    fn annotate(cm: &mut ConfigMap, key: &str, value: &str) {
        let mut annotations = cm.annotations();
        annotations.insert(key.to_string(), value.to_string());
        cm.set_annotations(annotations);
    }

    #[test]
    fn test_missing_annotation_is_empty_configuration() {
        let original = Annotator::default()
            .get_original_configuration(&config_map())
            .unwrap();
        assert_eq!(original, b"{}".to_vec());
    }

    #[test]
    fn test_set_then_get() {
        let annotator = Annotator::default();
        let mut cm = config_map();
        annotator
            .set_original_configuration(&mut cm, br#"{"data":{"key":"value"}}"#)
            .unwrap();
        assert_eq!(
            cm.annotations().get(LAST_APPLIED_CONFIG).map(String::as_str),
            Some(r#"{"data":{"key":"value"}}"#)
        );

        // overwrite
        annotator
            .set_original_configuration(&mut cm, br#"{"data":{}}"#)
            .unwrap();
        assert_eq!(
            annotator.get_original_configuration(&cm).unwrap(),
            br#"{"data":{}}"#.to_vec()
        );
        // spec fields untouched
        assert_eq!(cm.data, config_map().data);
    }

    #[test]
    fn test_set_empty_is_noop() {
        let mut cm = config_map();
        Annotator::default()
            .set_original_configuration(&mut cm, b"")
            .unwrap();
        assert!(cm.metadata.annotations.is_none());
    }

    #[test]
    fn test_invalid_annotation_is_decode_error() {
        let mut cm = config_map();
        annotate(&mut cm, LAST_APPLIED_CONFIG, "{not json");
        let err = Annotator::default()
            .get_original_configuration(&cm)
            .unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
        assert!(err.to_string().contains("ConfigMap default/settings"));
    }

    #[test]
    fn test_non_object_annotation_is_decode_error() {
        for value in ["[1,2]", "\"x\"", "42", "null"] {
            let mut cm = config_map();
            annotate(&mut cm, LAST_APPLIED_CONFIG, value);
            let err = Annotator::default()
                .get_original_configuration(&cm)
                .unwrap_err();
            assert!(matches!(err, Error::Decode { .. }), "{}: {:?}", value, err);
        }

        let mut cm = config_map();
        annotate(&mut cm, LAST_APPLIED_CONFIG, &STANDARD.encode(b"[1,2]"));
        let err = Annotator::default()
            .get_original_configuration(&cm)
            .unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn test_base64_annotation() {
        let mut cm = config_map();
        annotate(&mut cm, LAST_APPLIED_CONFIG, &STANDARD.encode(br#"{"a":1}"#));
        assert_eq!(
            Annotator::default().get_original_configuration(&cm).unwrap(),
            br#"{"a":1}"#.to_vec()
        );
    }

    #[test]
    fn test_large_values_are_compressed() {
        let annotator = Annotator::default().with_compression_threshold(16);
        let mut cm = config_map();
        let original = br#"{"data":{"key":"a rather long value that exceeds the threshold"}}"#;
        annotator.set_original_configuration(&mut cm, original).unwrap();

        let stored = cm.annotations().get(LAST_APPLIED_CONFIG).cloned().unwrap();
        assert!(serde_json::from_str::<Value>(&stored).is_err());
        assert_eq!(
            annotator.get_original_configuration(&cm).unwrap(),
            original.to_vec()
        );
    }

    #[test]
    fn test_custom_key() {
        let annotator = Annotator::new("example.com/applied");
        let mut cm = config_map();
        annotator.set_original_configuration(&mut cm, b"{}").unwrap();
        assert!(cm.annotations().contains_key("example.com/applied"));
        assert!(!cm.annotations().contains_key(LAST_APPLIED_CONFIG));
    }

    #[test]
    fn test_modified_configuration_excludes_annotation() {
        let annotator = Annotator::default();
        let mut cm = config_map();
        annotate(&mut cm, LAST_APPLIED_CONFIG, "{}");
        annotate(&mut cm, "other", "kept");

        let modified = annotator.get_modified_configuration(&mut cm, false).unwrap();
        let modified: Value = serde_json::from_slice(&modified).unwrap();
        assert_eq!(modified["metadata"]["annotations"], json!({"other": "kept"}));

        // the object itself is restored
        assert_eq!(cm.annotations().get(LAST_APPLIED_CONFIG).map(String::as_str), Some("{}"));
    }

    #[test]
    fn test_modified_configuration_annotate() {
        let annotator = Annotator::default();
        let mut cm = config_map();
        let modified = annotator.get_modified_configuration(&mut cm, true).unwrap();
        assert_eq!(annotator.get_original_configuration(&cm).unwrap(), modified);
    }

    #[test]
    fn test_set_last_applied_annotation_strips_nulls() {
        let annotator = Annotator::default();
        let mut cm = config_map();
        annotator.set_last_applied_annotation(&mut cm).unwrap();

        let original: Value =
            serde_json::from_slice(&annotator.get_original_configuration(&cm).unwrap()).unwrap();
        assert_eq!(
            original,
            json!({
                "metadata": {"name": "settings", "namespace": "default", "labels": {"a": "1"}},
                "data": {"key": "value"}
            })
        );
    }

    #[test]
    fn test_unstructured_objects() {
        let annotator = Annotator::default();
        let mut obj = Unstructured::from_value(json!({
            "apiVersion": "example.com/v1",
            "kind": "Widget",
            "metadata": {"name": "w"},
            "spec": {"size": 1}
        }))
        .unwrap();
        annotator.set_last_applied_annotation(&mut obj).unwrap();
        let original: Value =
            serde_json::from_slice(&annotator.get_original_configuration(&obj).unwrap()).unwrap();
        assert_eq!(original["spec"], json!({"size": 1}));
        assert!(original["metadata"].get("annotations").is_none());
    }
}
