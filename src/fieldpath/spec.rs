//! Field specs: where in a resource computed annotations are written.

use serde::{Deserialize, Deserializer};

use super::path::Path;
use crate::resource::Gvk;

/// FieldSpec names a map inside a resource and whether it may be created.
///
/// The optional group, version and kind restrict the spec to resources of
/// that type; unset fields match any resource.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldSpec {
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    pub path: Path,
    #[serde(default, alias = "createIfNotPresent")]
    pub create: bool,
}

impl FieldSpec {
    /// Creates a field spec that applies to every resource.
    pub fn new(path: Path, create: bool) -> Self {
        FieldSpec {
            group: None,
            version: None,
            kind: None,
            path,
            create,
        }
    }

    /// The field spec used when a config names none:
    /// `metadata/annotations`, created when missing.
    pub fn default_annotations() -> Self {
        FieldSpec::new(
            Path::from_elements(vec!["metadata".into(), "annotations".into()]),
            true,
        )
    }

    /// Returns true if this spec applies to resources of the given type.
    pub fn applies_to(&self, gvk: &Gvk) -> bool {
        fn matches(want: &Option<String>, have: &str) -> bool {
            want.as_deref().map_or(true, |w| w == have)
        }
        matches(&self.group, &gvk.group)
            && matches(&self.version, &gvk.version)
            && matches(&self.kind, &gvk.kind)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Path::parse(&s).map_err(serde::de::Error::custom)
    }
}
