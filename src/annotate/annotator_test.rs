use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;

use super::*;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::hash::{self, ResourceHasher};
use crate::resource::Resource;
use crate::store::ResourceList;
use crate::value::from_yaml;

const MANIFEST: &str = r#"
apiVersion: v1
kind: ConfigMap
metadata:
  name: cm1
data:
  k: v
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: dep1
  annotations: {}
"#;

fn annotator(config: &str) -> Annotator {
    Annotator::new(Config::from_yaml(config).unwrap())
}

fn resource(yaml: &str) -> Resource {
    Resource::new(from_yaml(yaml).unwrap())
}

#[test]
fn test_hash_key_format() {
    let cluster_scoped = resource("kind: ConfigMap\nmetadata:\n  name: cm1\n");
    assert_eq!(
        hash_key("kustomize.config.k8s.io/hash", &cluster_scoped),
        "kustomize.config.k8s.io/hash--configmap-cm1"
    );

    let namespaced = resource("kind: ConfigMap\nmetadata:\n  name: cm1\n  namespace: prod\n");
    assert_eq!(hash_key("p", &namespaced), "p-prod-configmap-cm1");

    let unnamed = resource("kind: Secret\n");
    assert_eq!(hash_key("p", &unnamed), "p--secret-");
}

#[test]
fn test_configmap_to_deployment() {
    let a = annotator("resource:\n  kind: ConfigMap\ntarget:\n  kind: Deployment\n");
    let mut list = ResourceList::parse(MANIFEST).unwrap();
    let original = list.clone();
    let cm_hash = hash::hash(list.as_slice()[0].value()).unwrap();

    let applied = a.annotate(&mut list).unwrap();
    let key = "kustomize.config.k8s.io/hash--configmap-cm1";
    assert_eq!(applied.get(key), Some(&cm_hash));

    let dep = &list.as_slice()[1];
    assert_eq!(dep.annotations().get(key).copied(), Some(cm_hash.as_str()));
    assert_eq!(dep.annotations().len(), 1);
    assert_eq!(list.as_slice()[0], original.as_slice()[0]);
}

#[test]
fn test_run_end_to_end() {
    let a = annotator("resource:\n  kind: ConfigMap\ntarget:\n  kind: Deployment\n");
    let out = a.run(MANIFEST).unwrap();

    let cm = resource("apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: cm1\ndata:\n  k: v\n");
    let expected = format!(
        r#"apiVersion: v1
kind: ConfigMap
metadata:
  name: cm1
data:
  k: v
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: dep1
  annotations:
    kustomize.config.k8s.io/hash--configmap-cm1: {}
"#,
        hash::hash(cm.value()).unwrap()
    );
    assert_eq!(out, expected);
}

#[test]
fn test_no_matching_target_leaves_output_unchanged() {
    let a = annotator("resource:\n  kind: ConfigMap\ntarget:\n  kind: StatefulSet\n");
    let out = a.run(MANIFEST).unwrap();
    assert_eq!(out, MANIFEST.trim_start());
}

#[test]
fn test_missing_path_without_create_leaves_output_unchanged() {
    let manifest = r#"apiVersion: v1
kind: ConfigMap
metadata:
  name: cm1
data:
  k: v
---
apiVersion: apps/v1
kind: Deployment
spec:
  replicas: 1
"#;
    let a = annotator(
        r#"
resource:
  kind: ConfigMap
target:
  kind: Deployment
fieldSpecs:
  - path: metadata/annotations
    createIfNotPresent: false
"#,
    );
    let out = a.run(manifest).unwrap();
    assert_eq!(out, manifest);
}

#[test]
fn test_no_matching_resource_leaves_output_unchanged() {
    let a = annotator("resource:\n  kind: Secret\ntarget:\n  kind: Deployment\n");
    let mut list = ResourceList::parse("kind: Deployment\nmetadata:\n  name: dep1\n").unwrap();
    let original = list.clone();
    let applied = a.annotate(&mut list).unwrap();
    assert!(applied.is_empty());
    assert_eq!(list, original);
}

#[test]
fn test_key_collision_is_an_error() {
    let manifest = r#"
kind: ConfigMap
metadata:
  name: cm1
data:
  k: a
---
kind: ConfigMap
metadata:
  name: cm1
data:
  k: b
---
kind: Deployment
metadata:
  name: dep1
"#;
    let a = annotator("resource:\n  kind: ConfigMap\ntarget:\n  kind: Deployment\n");
    let err = a.run(manifest).unwrap_err();
    match err {
        Error::KeyCollision { key, first, second } => {
            assert_eq!(key, "kustomize.config.k8s.io/hash--configmap-cm1");
            assert_eq!(first, "ConfigMap/cm1");
            assert_eq!(second, "ConfigMap/cm1");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_overlapping_selectors_hash_once() {
    let a = annotator(
        r#"
resources:
  - kind: ConfigMap
  - name: cm*
targets:
  - kind: Deployment
  - name: dep*
"#,
    );
    let mut list = ResourceList::parse(MANIFEST).unwrap();
    let applied = a.annotate(&mut list).unwrap();
    assert_eq!(applied.len(), 1);
    assert_eq!(list.as_slice()[1].annotations().len(), 1);
}

#[test]
fn test_resource_that_is_also_a_target() {
    let manifest = r#"
kind: ConfigMap
metadata:
  name: a
data:
  k: v
---
kind: ConfigMap
metadata:
  name: b
data:
  k: w
"#;
    let a = annotator("resource:\n  kind: ConfigMap\ntarget:\n  name: a\n");
    let mut list = ResourceList::parse(manifest).unwrap();
    let original_a = hash::hash(list.as_slice()[0].value()).unwrap();
    let applied = a.annotate(&mut list).unwrap();

    // Both hashes are computed before `a` is annotated.
    assert_eq!(applied.get("kustomize.config.k8s.io/hash--configmap-a"), Some(&original_a));
    let annotations = list.as_slice()[0].annotations();
    assert_eq!(annotations.len(), 2);
    assert!(list.as_slice()[1].annotations().is_empty());
}

#[test]
fn test_field_specs_and_key_prefix() {
    let manifest = r#"
apiVersion: v1
kind: Secret
metadata:
  name: creds
  namespace: prod
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
  namespace: prod
spec:
  template:
    metadata:
      labels:
        app: web
"#;
    let a = annotator(
        r#"
resources:
  - kind: Secret
targets:
  - kind: Deployment
fieldSpecs:
  - path: spec/template/metadata/annotations
    create: true
keyPrefix: example.com/checksum
"#,
    );
    let mut list = ResourceList::parse(manifest).unwrap();
    a.annotate(&mut list).unwrap();

    let dep = list.as_slice()[1].value();
    assert!(dep
        .lookup_str(&[
            "spec",
            "template",
            "metadata",
            "annotations",
            "example.com/checksum-prod-secret-creds",
        ])
        .is_some());
    assert!(dep.lookup(&["metadata", "annotations"]).is_none());
}

#[test]
fn test_path_conflict_aborts_run() {
    let manifest = concat!(
        "kind: ConfigMap\nmetadata:\n  name: cm1\n---\n",
        "kind: Deployment\nmetadata:\n  name: dep1\n  annotations: [x]\n",
    );
    let a = annotator("resource:\n  kind: ConfigMap\ntarget:\n  kind: Deployment\n");
    let err = a.run(manifest).unwrap_err();
    assert!(matches!(err, Error::PathConflict { .. }));
}

#[test]
fn test_invalid_selector_aborts_run() {
    let a = annotator("resource:\n  labelSelector: 'app in (x'\ntarget: {}\n");
    let err = a.run(MANIFEST).unwrap_err();
    assert!(matches!(err, Error::InvalidSelector { .. }));
}

#[test]
fn test_json_manifest_stays_json() {
    let manifest = r#"[
  {"kind": "ConfigMap", "metadata": {"name": "cm1"}},
  {"kind": "Deployment", "metadata": {"name": "dep1"}}
]"#;
    let a = annotator("resource:\n  kind: ConfigMap\ntarget:\n  kind: Deployment\n");
    let out = a.run(manifest).unwrap();
    assert!(out.starts_with('['));
    assert!(out.ends_with("]\n"));

    let list = ResourceList::parse(&out).unwrap();
    assert!(list.as_slice()[1]
        .annotations()
        .contains_key("kustomize.config.k8s.io/hash--configmap-cm1"));
}

struct RecordingHasher {
    calls: Rc<RefCell<Vec<String>>>,
    fail_on: Option<&'static str>,
}

impl ResourceHasher for RecordingHasher {
    fn hash(&self, resource: &Resource) -> Result<String> {
        self.calls.borrow_mut().push(resource.name().to_string());
        if self.fail_on == Some(resource.name()) {
            return Err(Error::hash(".", "refused"));
        }
        Ok(format!("h-{}", resource.name()))
    }
}

#[test]
fn test_custom_hasher() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let config = Config::from_yaml("resources: [{}]\ntargets: [{kind: Deployment}]\n").unwrap();
    let a = Annotator::builder(config)
        .hasher(Box::new(RecordingHasher {
            calls: calls.clone(),
            fail_on: None,
        }))
        .build();

    let mut list = ResourceList::parse(MANIFEST).unwrap();
    let applied = a.annotate(&mut list).unwrap();
    assert_eq!(*calls.borrow(), vec!["cm1", "dep1"]);
    assert_eq!(
        applied.get("kustomize.config.k8s.io/hash--deployment-dep1"),
        Some(&"h-dep1".to_string())
    );
}

#[test]
fn test_hash_error_aborts_run() {
    let config = Config::from_yaml("resources: [{}]\ntargets: [{}]\n").unwrap();
    let a = Annotator::builder(config)
        .hasher(Box::new(RecordingHasher {
            calls: Rc::new(RefCell::new(Vec::new())),
            fail_on: Some("cm1"),
        }))
        .build();
    let err = a.run(MANIFEST).unwrap_err();
    assert!(matches!(err, Error::Hash { .. }));
}
