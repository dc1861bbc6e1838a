//! Tests for the strategic three-way merge patch.

#[cfg(test)]
mod tests {
    use crate::catalog::{MergeMetadataSource, SchemaCatalog};
    use crate::merge::{create_three_way_merge_patch, MergeError};
    use crate::object::TypeMeta;
    use crate::schema::PatchMeta;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    struct PatchTestCase {
        name: &'static str,
        api_version: &'static str,
        kind: &'static str,
        original: &'static str,
        modified: &'static str,
        current: &'static str,
        out: &'static str,
    }

    fn meta(api_version: &str, kind: &str) -> PatchMeta {
        SchemaCatalog::builtin()
            .lookup_merge_metadata(&TypeMeta::new(api_version, kind))
            .unwrap()
    }

    fn json_bytes(yaml: &str) -> Vec<u8> {
        let value: Value = serde_yaml::from_str(yaml).unwrap();
        serde_json::to_vec(&value).unwrap()
    }

    fn three_way(
        original: &str,
        modified: &str,
        current: &str,
        meta: &PatchMeta,
        overwrite: bool,
    ) -> Result<Value, MergeError> {
        let patch = create_three_way_merge_patch(
            &json_bytes(original),
            &json_bytes(modified),
            &json_bytes(current),
            meta,
            overwrite,
        )?;
        Ok(serde_json::from_slice(&patch).unwrap())
    }

    fn run_patch_test_case(tc: PatchTestCase) {
        let meta = meta(tc.api_version, tc.kind);
        let patch = three_way(tc.original, tc.modified, tc.current, &meta, true)
            .unwrap_or_else(|e| panic!("patch failed for {}: {}", tc.name, e));
        let expected: Value = serde_yaml::from_str(tc.out).unwrap();
        assert_eq!(patch, expected, "patch mismatch for {}", tc.name);
    }

    #[test]
    fn test_server_defaults_produce_empty_patch() {
        run_patch_test_case(PatchTestCase {
            name: "server defaults",
            api_version: "v1",
            kind: "Service",
            original: "spec: {ports: [{port: 80}]}",
            modified: "spec: {ports: [{port: 80}]}",
            current: "spec: {ports: [{port: 80, protocol: TCP}], clusterIP: 10.0.0.1}",
            out: "{}",
        });
    }

    #[test]
    fn test_keyed_list_addition() {
        run_patch_test_case(PatchTestCase {
            name: "port added",
            api_version: "v1",
            kind: "Service",
            original: "spec: {ports: [{port: 80}]}",
            modified: "spec: {ports: [{port: 80}, {port: 443}]}",
            current: "spec: {ports: [{port: 80, protocol: TCP}]}",
            out: r#"
spec:
  ports: [{port: 443}]
  $setElementOrder/ports: [{port: 80}, {port: 443}]
"#,
        });
    }

    #[test]
    fn test_keyed_list_deletion() {
        run_patch_test_case(PatchTestCase {
            name: "port removed",
            api_version: "v1",
            kind: "Service",
            original: "spec: {ports: [{port: 80}, {port: 443}]}",
            modified: "spec: {ports: [{port: 80}]}",
            current: "spec: {ports: [{port: 80, protocol: TCP}, {port: 443, protocol: TCP}]}",
            out: r#"
spec:
  ports: [{port: 443, $patch: delete}]
  $setElementOrder/ports: [{port: 80}]
"#,
        });
    }

    #[test]
    fn test_keyed_list_element_change() {
        run_patch_test_case(PatchTestCase {
            name: "container image changed",
            api_version: "apps/v1",
            kind: "Deployment",
            original: "spec: {template: {spec: {containers: [{name: app, image: 'app:v1'}]}}}",
            modified: "spec: {template: {spec: {containers: [{name: app, image: 'app:v2'}]}}}",
            current: r#"
spec:
  template:
    spec:
      containers:
      - {name: app, image: 'app:v1', imagePullPolicy: IfNotPresent}
"#,
            out: r#"
spec:
  template:
    spec:
      containers: [{name: app, image: 'app:v2'}]
      $setElementOrder/containers: [{name: app}]
"#,
        });
    }

    #[test]
    fn test_primitive_set() {
        run_patch_test_case(PatchTestCase {
            name: "finalizers",
            api_version: "v1",
            kind: "ConfigMap",
            original: "metadata: {finalizers: [a, b]}",
            modified: "metadata: {finalizers: [a, c]}",
            current: "metadata: {finalizers: [a, b]}",
            out: r#"
metadata:
  finalizers: [c]
  $setElementOrder/finalizers: [a, c]
  $deleteFromPrimitiveList/finalizers: [b]
"#,
        });
    }

    #[test]
    fn test_atomic_list_is_replaced() {
        run_patch_test_case(PatchTestCase {
            name: "external IPs",
            api_version: "v1",
            kind: "Service",
            original: "spec: {externalIPs: [1.1.1.1]}",
            modified: "spec: {externalIPs: [1.1.1.1, 2.2.2.2]}",
            current: "spec: {externalIPs: [1.1.1.1]}",
            out: "spec: {externalIPs: [1.1.1.1, 2.2.2.2]}",
        });
    }

    #[test]
    fn test_atomic_map_is_replaced() {
        run_patch_test_case(PatchTestCase {
            name: "selector",
            api_version: "v1",
            kind: "Service",
            original: "spec: {selector: {app: a, tier: web}}",
            modified: "spec: {selector: {app: b}}",
            current: "spec: {selector: {app: a, tier: web}}",
            out: "spec: {selector: {app: b}}",
        });
    }

    #[test]
    fn test_map_entry_deletion_keeps_foreign_entries() {
        run_patch_test_case(PatchTestCase {
            name: "labels",
            api_version: "v1",
            kind: "ConfigMap",
            original: "metadata: {labels: {a: '1', b: '2'}}",
            modified: "metadata: {labels: {a: '1'}}",
            current: "metadata: {labels: {a: '1', b: '2', c: server}}",
            out: "metadata: {labels: {b: null}}",
        });
    }

    #[test]
    fn test_missing_merge_key() {
        let meta = meta("v1", "Service");
        let err = three_way(
            "spec: {ports: [{port: 80}]}",
            "spec: {ports: [{name: http}]}",
            "spec: {ports: [{port: 80}]}",
            &meta,
            true,
        )
        .unwrap_err();
        match err {
            MergeError::MissingMergeKey { path, key } => {
                assert_eq!(path, ".spec.ports[0]");
                assert_eq!(key, "port");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_non_map_list_element() {
        let meta = meta("v1", "Service");
        let err = three_way(
            "spec: {ports: [{port: 80}]}",
            "spec: {ports: [80]}",
            "spec: {ports: [{port: 80}]}",
            &meta,
            true,
        )
        .unwrap_err();
        assert!(matches!(err, MergeError::NonMapListElement { .. }));
    }

    #[test]
    fn test_overwrite() {
        let meta = meta("apps/v1", "Deployment");
        let original = "spec: {replicas: 1}";
        let current = "spec: {replicas: 3}";

        let patch = three_way(original, "spec: {replicas: 2}", current, &meta, true).unwrap();
        assert_eq!(patch, serde_json::json!({"spec": {"replicas": 2}}));

        let err = three_way(original, "spec: {replicas: 2}", current, &meta, false).unwrap_err();
        match err {
            MergeError::Conflict { path } => assert_eq!(path, ".spec.replicas"),
            other => panic!("unexpected error: {}", other),
        }

        // agreeing with the live change is not a conflict
        let patch = three_way(original, "spec: {replicas: 3}", current, &meta, false).unwrap();
        assert_eq!(patch, serde_json::json!({}));
    }

    #[test]
    fn test_untyped_lists_are_replaced() {
        let patch = three_way(
            "items: [{name: a}]",
            "items: [{name: a}, {name: b}]",
            "items: [{name: a, extra: true}]",
            &PatchMeta::untyped(),
            true,
        )
        .unwrap();
        assert_eq!(patch, serde_json::json!({"items": [{"name": "a"}, {"name": "b"}]}));
    }

    #[test]
    fn test_empty_original_is_empty_object() {
        let meta = meta("v1", "ConfigMap");
        let patch = create_three_way_merge_patch(b"", br#"{"data":{"a":"1"}}"#, br#"{"data":{"a":"1"}}"#, &meta, true)
            .unwrap();
        assert_eq!(patch, b"{}".to_vec());
    }
}
