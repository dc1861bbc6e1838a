//! Merge metadata of the built-in kinds.

/// BUILTIN_CATALOG_YAML maps the built-in kinds to their schema types.
///
/// Fields that are not listed have no merge metadata: objects merge entry by
/// entry and lists are replaced.
pub const BUILTIN_CATALOG_YAML: &str = r#"kinds:
- apiVersion: v1
  kind: ConfigMap
  type: io.k8s.api.core.v1.ConfigMap
- apiVersion: v1
  kind: Service
  type: io.k8s.api.core.v1.Service
- apiVersion: v1
  kind: Pod
  type: io.k8s.api.core.v1.Pod
- apiVersion: apps/v1
  kind: Deployment
  type: io.k8s.api.apps.v1.Deployment
- apiVersion: rbac.authorization.k8s.io/v1
  kind: ClusterRole
  type: io.k8s.api.rbac.v1.ClusterRole
types:
- name: io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta
  map:
    fields:
    - name: labels
      type:
        namedType: stringMap
    - name: annotations
      type:
        namedType: stringMap
    - name: finalizers
      type:
        list:
          elementType:
            scalar: string
          elementRelationship: associative
- name: io.k8s.apimachinery.pkg.apis.meta.v1.LabelSelector
  map:
    fields:
    - name: matchLabels
      type:
        namedType: stringMap
    elementRelationship: atomic
- name: stringMap
  map:
    elementType:
      scalar: string
- name: io.k8s.api.core.v1.ConfigMap
  map:
    fields:
    - name: metadata
      type:
        namedType: io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta
    - name: data
      type:
        namedType: stringMap
- name: io.k8s.api.core.v1.Service
  map:
    fields:
    - name: metadata
      type:
        namedType: io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta
    - name: spec
      type:
        namedType: io.k8s.api.core.v1.ServiceSpec
- name: io.k8s.api.core.v1.ServiceSpec
  map:
    fields:
    - name: ports
      type:
        list:
          elementType:
            namedType: io.k8s.api.core.v1.ServicePort
          elementRelationship: associative
          keys:
          - port
    - name: selector
      type:
        namedType: stringMap
        elementRelationship: atomic
    - name: externalIPs
      type:
        list:
          elementType:
            scalar: string
- name: io.k8s.api.core.v1.ServicePort
  map:
    fields:
    - name: port
      type:
        scalar: numeric
    - name: protocol
      type:
        scalar: string
- name: io.k8s.api.core.v1.Pod
  map:
    fields:
    - name: metadata
      type:
        namedType: io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta
    - name: spec
      type:
        namedType: io.k8s.api.core.v1.PodSpec
- name: io.k8s.api.core.v1.PodTemplateSpec
  map:
    fields:
    - name: metadata
      type:
        namedType: io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta
    - name: spec
      type:
        namedType: io.k8s.api.core.v1.PodSpec
- name: io.k8s.api.core.v1.PodSpec
  map:
    fields:
    - name: containers
      type:
        list:
          elementType:
            namedType: io.k8s.api.core.v1.Container
          elementRelationship: associative
          keys:
          - name
    - name: initContainers
      type:
        list:
          elementType:
            namedType: io.k8s.api.core.v1.Container
          elementRelationship: associative
          keys:
          - name
    - name: nodeSelector
      type:
        namedType: stringMap
        elementRelationship: atomic
- name: io.k8s.api.core.v1.Container
  map:
    fields:
    - name: args
      type:
        list:
          elementType:
            scalar: string
    - name: ports
      type:
        list:
          elementType:
            namedType: io.k8s.api.core.v1.ContainerPort
          elementRelationship: associative
          keys:
          - containerPort
    - name: env
      type:
        list:
          elementType:
            namedType: io.k8s.api.core.v1.EnvVar
          elementRelationship: associative
          keys:
          - name
- name: io.k8s.api.core.v1.ContainerPort
  map:
    fields:
    - name: containerPort
      type:
        scalar: numeric
- name: io.k8s.api.core.v1.EnvVar
  map:
    fields:
    - name: name
      type:
        scalar: string
    - name: value
      type:
        scalar: string
- name: io.k8s.api.apps.v1.Deployment
  map:
    fields:
    - name: metadata
      type:
        namedType: io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta
    - name: spec
      type:
        namedType: io.k8s.api.apps.v1.DeploymentSpec
- name: io.k8s.api.apps.v1.DeploymentSpec
  map:
    fields:
    - name: selector
      type:
        namedType: io.k8s.apimachinery.pkg.apis.meta.v1.LabelSelector
    - name: template
      type:
        namedType: io.k8s.api.core.v1.PodTemplateSpec
- name: io.k8s.api.rbac.v1.ClusterRole
  map:
    fields:
    - name: metadata
      type:
        namedType: io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta
    - name: rules
      type:
        list:
          elementType:
            namedType: io.k8s.api.rbac.v1.PolicyRule
- name: io.k8s.api.rbac.v1.PolicyRule
  map:
    fields:
    - name: verbs
      type:
        list:
          elementType:
            scalar: string
"#;
