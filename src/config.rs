//! Annotator configuration.
//!
//! The configuration file names the resources to hash, the targets to
//! annotate, and where in each target the annotations go:
//!
//! ```yaml
//! resources:
//!   - kind: ConfigMap
//! targets:
//!   - kind: Deployment
//! fieldSpecs:
//!   - path: spec/template/metadata/annotations
//!     create: true
//! ```
//!
//! The singular keys `resource` and `target` are accepted as aliases and are
//! folded into the lists when the file is loaded.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::fieldpath::FieldSpec;
use crate::selector::Selector;

/// Annotation key prefix used when the config does not set one.
pub const DEFAULT_KEY_PREFIX: &str = "kustomize.config.k8s.io/hash";

/// Config is a validated annotator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub resources: Vec<Selector>,
    pub targets: Vec<Selector>,
    pub field_specs: Vec<FieldSpec>,
    pub key_prefix: String,
}

// Many must be tried first: a struct also deserializes from a sequence, so
// `[]` would otherwise become a match-everything selector.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Selector>),
    One(Selector),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<Selector> {
        match self {
            OneOrMany::Many(selectors) => selectors,
            OneOrMany::One(selector) => vec![selector],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    resource: Option<OneOrMany>,
    #[serde(default)]
    resources: Option<OneOrMany>,
    #[serde(default)]
    target: Option<OneOrMany>,
    #[serde(default)]
    targets: Option<OneOrMany>,
    #[serde(default)]
    field_specs: Option<Vec<FieldSpec>>,
    #[serde(default)]
    key_prefix: Option<String>,
}

impl Config {
    /// Parses and validates a YAML (or JSON) configuration.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let raw: RawConfig =
            serde_yaml::from_str(content).map_err(|e| Error::config(e.to_string()))?;
        Config::from_raw(raw)
    }

    /// Reads, parses and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| Error::io("unable to read in config", e))?;
        Config::from_yaml(&content)
    }

    fn from_raw(raw: RawConfig) -> Result<Self> {
        let resources = merge_selectors(raw.resource, raw.resources);
        let targets = merge_selectors(raw.target, raw.targets);

        if resources.is_empty() {
            return Err(Error::config("no resource selector configured"));
        }
        if targets.is_empty() {
            return Err(Error::config("no target selector configured"));
        }

        let field_specs = match raw.field_specs {
            Some(specs) if specs.is_empty() => {
                return Err(Error::config("fieldSpecs must not be empty"))
            }
            Some(specs) => specs,
            None => vec![FieldSpec::default_annotations()],
        };

        let key_prefix = raw
            .key_prefix
            .unwrap_or_else(|| DEFAULT_KEY_PREFIX.to_string());
        if key_prefix.is_empty() {
            return Err(Error::config("keyPrefix must not be empty"));
        }

        Ok(Config {
            resources,
            targets,
            field_specs,
            key_prefix,
        })
    }
}

fn merge_selectors(singular: Option<OneOrMany>, plural: Option<OneOrMany>) -> Vec<Selector> {
    singular
        .into_iter()
        .chain(plural)
        .flat_map(OneOrMany::into_vec)
        .collect()
}
