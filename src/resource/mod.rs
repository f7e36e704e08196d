//! Resource module - Kubernetes-style objects held as value trees.
//!
//! A [`Resource`] exposes the identity fields every manifest object carries
//! by convention (`apiVersion`, `kind`, `metadata.name`, ...), without
//! assuming anything else about its shape.

use crate::value::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Gvk identifies the type of a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Gvk {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl Gvk {
    /// Splits an `apiVersion` into group and version. Core resources
    /// (`apiVersion: v1`) have an empty group.
    pub fn from_api_version(api_version: &str, kind: &str) -> Self {
        let (group, version) = match api_version.rsplit_once('/') {
            Some((group, version)) => (group, version),
            None => ("", api_version),
        };
        Gvk {
            group: group.to_string(),
            version: version.to_string(),
            kind: kind.to_string(),
        }
    }
}

/// Resource is one document of a manifest stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    value: Value,
}

impl Resource {
    pub fn new(value: Value) -> Self {
        Resource { value }
    }

    /// Returns the underlying document.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns the underlying document for in-place mutation.
    pub fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    pub fn api_version(&self) -> &str {
        self.value.lookup_str(&["apiVersion"]).unwrap_or_default()
    }

    pub fn kind(&self) -> &str {
        self.value.lookup_str(&["kind"]).unwrap_or_default()
    }

    pub fn gvk(&self) -> Gvk {
        Gvk::from_api_version(self.api_version(), self.kind())
    }

    pub fn name(&self) -> &str {
        self.value.lookup_str(&["metadata", "name"]).unwrap_or_default()
    }

    /// Returns the namespace, or the empty string when it is not set.
    pub fn namespace(&self) -> &str {
        self.value
            .lookup_str(&["metadata", "namespace"])
            .unwrap_or_default()
    }

    pub fn labels(&self) -> BTreeMap<&str, &str> {
        self.string_map(&["metadata", "labels"])
    }

    pub fn annotations(&self) -> BTreeMap<&str, &str> {
        self.string_map(&["metadata", "annotations"])
    }

    fn string_map(&self, keys: &[&str]) -> BTreeMap<&str, &str> {
        self.value
            .lookup(keys)
            .and_then(Value::as_map)
            .map(Map::string_entries)
            .unwrap_or_default()
    }

    /// Returns a short human readable identifier, used in logs and errors.
    pub fn id(&self) -> ResourceId<'_> {
        ResourceId(self)
    }
}

/// ResourceId displays a resource as `[namespace/]Kind/name`.
pub struct ResourceId<'a>(&'a Resource);

impl fmt::Display for ResourceId<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let namespace = self.0.namespace();
        if !namespace.is_empty() {
            write!(f, "{}/", namespace)?;
        }
        write!(f, "{}/{}", self.0.kind(), self.0.name())
    }
}
