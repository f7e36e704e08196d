//! Selector module - Declarative resource selection.
//!
//! A [`Selector`] is the configuration form; [`Selector::compile`] validates
//! it once into a [`CompiledSelector`] that can be matched against any
//! number of resources.

mod pattern;
mod requirements;


pub use pattern::*;
pub use requirements::*;

use serde::Deserialize;

use crate::error::Result;
use crate::resource::Resource;

/// Selector picks resources by type, name, namespace, labels and
/// annotations. Every field is optional and an unset field matches any
/// resource, so the empty selector matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Selector {
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    /// Pattern on `metadata.namespace` where `*` matches any substring.
    #[serde(default)]
    pub namespace: Option<String>,
    /// Pattern on `metadata.name` where `*` matches any substring. No other
    /// character is special.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub label_selector: Option<String>,
    #[serde(default)]
    pub annotation_selector: Option<String>,
}

impl Selector {
    /// Validates the selector's patterns and expressions.
    pub fn compile(&self) -> Result<CompiledSelector> {
        Ok(CompiledSelector {
            group: self.group.clone(),
            version: self.version.clone(),
            kind: self.kind.clone(),
            namespace: self.namespace.as_deref().map(Pattern::new).transpose()?,
            name: self.name.as_deref().map(Pattern::new).transpose()?,
            labels: Requirements::parse(self.label_selector.as_deref().unwrap_or_default())?,
            annotations: Requirements::parse(
                self.annotation_selector.as_deref().unwrap_or_default(),
            )?,
        })
    }
}

/// CompiledSelector is a validated [`Selector`].
#[derive(Debug, Clone)]
pub struct CompiledSelector {
    group: Option<String>,
    version: Option<String>,
    kind: Option<String>,
    namespace: Option<Pattern>,
    name: Option<Pattern>,
    labels: Requirements,
    annotations: Requirements,
}

impl CompiledSelector {
    pub fn matches(&self, resource: &Resource) -> bool {
        let gvk = resource.gvk();
        exact(&self.group, &gvk.group)
            && exact(&self.version, &gvk.version)
            && exact(&self.kind, &gvk.kind)
            && pattern(&self.namespace, resource.namespace())
            && pattern(&self.name, resource.name())
            && (self.labels.is_empty() || self.labels.matches(&resource.labels()))
            && (self.annotations.is_empty() || self.annotations.matches(&resource.annotations()))
    }
}

fn exact(want: &Option<String>, have: &str) -> bool {
    want.as_deref().map_or(true, |w| w == have)
}

fn pattern(want: &Option<Pattern>, have: &str) -> bool {
    want.as_ref().map_or(true, |p| p.is_match(have))
}

/// Returns the positions of the resources matching the selector, in order.
pub fn select(resources: &[Resource], selector: &Selector) -> Result<Vec<usize>> {
    let compiled = selector.compile()?;
    Ok(resources
        .iter()
        .enumerate()
        .filter(|(_, r)| compiled.matches(r))
        .map(|(i, _)| i)
        .collect())
}
