//! Annotator: the hash-and-annotate pipeline over a manifest.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fieldpath::AnnotationFilter;
use crate::hash::{CanonicalHasher, ResourceHasher};
use crate::resource::Resource;
use crate::store::ResourceList;

/// Builds the annotation key of a resource:
/// `<prefix>-<namespace>-<lowercase kind>-<name>`.
///
/// The namespace segment is always present. A resource without a namespace
/// gets an empty segment (`hash--configmap-cm1`), which keeps keys produced
/// for existing manifests stable.
pub fn hash_key(prefix: &str, resource: &Resource) -> String {
    format!(
        "{}-{}-{}-{}",
        prefix,
        resource.namespace(),
        resource.kind().to_lowercase(),
        resource.name()
    )
}

/// AnnotatorBuilder is a builder for creating an Annotator.
pub struct AnnotatorBuilder {
    config: Config,
    hasher: Option<Box<dyn ResourceHasher>>,
}

impl AnnotatorBuilder {
    /// Creates a new AnnotatorBuilder.
    pub fn new(config: Config) -> Self {
        AnnotatorBuilder {
            config,
            hasher: None,
        }
    }

    /// Sets the hasher. Defaults to [`CanonicalHasher`].
    pub fn hasher(mut self, hasher: Box<dyn ResourceHasher>) -> Self {
        self.hasher = Some(hasher);
        self
    }

    /// Builds the Annotator.
    pub fn build(self) -> Annotator {
        Annotator {
            config: self.config,
            hasher: self.hasher.unwrap_or_else(|| Box::new(CanonicalHasher)),
        }
    }
}

/// Annotator hashes the configured resources of a manifest and writes the
/// hashes into the configured targets.
///
/// Every resource is hashed before any target is touched, so resources and
/// targets may overlap without the result depending on processing order.
pub struct Annotator {
    config: Config,
    hasher: Box<dyn ResourceHasher>,
}

impl Annotator {
    pub fn new(config: Config) -> Self {
        AnnotatorBuilder::new(config).build()
    }

    /// Creates a new AnnotatorBuilder.
    pub fn builder(config: Config) -> AnnotatorBuilder {
        AnnotatorBuilder::new(config)
    }

    /// Hashes every resource matched by the resource selectors and returns
    /// the annotations keyed by [`hash_key`].
    ///
    /// A resource matched by several selectors is hashed once. Two distinct
    /// resources producing the same key are an [`Error::KeyCollision`].
    pub fn annotations(&self, list: &ResourceList) -> Result<BTreeMap<String, String>> {
        let resources = list.as_slice();
        let mut seen = BTreeSet::new();
        let mut owners: BTreeMap<String, usize> = BTreeMap::new();
        let mut annotations = BTreeMap::new();

        for selector in &self.config.resources {
            let matched = list.select(selector)?;
            debug!(?selector, count = matched.len(), "resolved resource selector");

            for index in matched {
                if !seen.insert(index) {
                    continue;
                }
                let resource = &resources[index];
                let key = hash_key(&self.config.key_prefix, resource);
                if let Some(&first) = owners.get(&key) {
                    return Err(Error::key_collision(
                        key,
                        resources[first].id().to_string(),
                        resource.id().to_string(),
                    ));
                }

                let hash = self.hasher.hash(resource)?;
                info!(resource = %resource.id(), %key, %hash, "hashed resource");
                owners.insert(key.clone(), index);
                annotations.insert(key, hash);
            }
        }
        Ok(annotations)
    }

    /// Returns the positions of every resource matched by any target
    /// selector, in list order and without duplicates.
    pub fn targets(&self, list: &ResourceList) -> Result<Vec<usize>> {
        let mut targets = BTreeSet::new();
        for selector in &self.config.targets {
            let matched = list.select(selector)?;
            debug!(?selector, count = matched.len(), "resolved target selector");
            targets.extend(matched);
        }
        Ok(targets.into_iter().collect())
    }

    /// Annotates the list in place and returns the annotations applied.
    pub fn annotate(&self, list: &mut ResourceList) -> Result<BTreeMap<String, String>> {
        let annotations = self.annotations(list)?;
        let targets = self.targets(list)?;

        if annotations.is_empty() {
            warn!("no resources matched, targets left unchanged");
            return Ok(annotations);
        }
        if targets.is_empty() {
            warn!("no targets matched");
        }

        let filter = AnnotationFilter::new(&annotations, &self.config.field_specs);
        for index in targets {
            if let Some(resource) = list.get_mut(index) {
                filter.filter(resource)?;
                info!(target = %resource.id(), count = annotations.len(), "annotated target");
            }
        }
        Ok(annotations)
    }

    /// Runs the whole pipeline over a manifest stream and returns the
    /// re-serialized manifest.
    pub fn run(&self, input: &str) -> Result<String> {
        let mut list = ResourceList::parse(input)?;
        if list.is_empty() {
            warn!("manifest contains no resources");
        }
        debug!(count = list.len(), format = ?list.format(), "annotating manifest");
        self.annotate(&mut list)?;
        list.serialize()
    }
}
