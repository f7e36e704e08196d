//! The annotation filter: merges computed annotations into resources.

use std::collections::BTreeMap;

use tracing::debug;

use super::spec::FieldSpec;
use crate::error::{Error, Result};
use crate::resource::Resource;
use crate::value::{Map, Value};

/// AnnotationFilter merges a set of annotations into the maps named by its
/// field specs.
#[derive(Debug, Clone, Copy)]
pub struct AnnotationFilter<'a> {
    pub annotations: &'a BTreeMap<String, String>,
    pub field_specs: &'a [FieldSpec],
}

impl<'a> AnnotationFilter<'a> {
    pub fn new(annotations: &'a BTreeMap<String, String>, field_specs: &'a [FieldSpec]) -> Self {
        AnnotationFilter {
            annotations,
            field_specs,
        }
    }

    /// Applies every field spec that matches the resource's type, in place.
    ///
    /// Existing keys at the target map are overwritten and other keys are
    /// left alone. A spec whose path is missing and that may not create it is
    /// skipped. A non-map value on the path is a [`Error::PathConflict`].
    pub fn filter(&self, resource: &mut Resource) -> Result<()> {
        let gvk = resource.gvk();
        for spec in self.field_specs.iter().filter(|s| s.applies_to(&gvk)) {
            let applied = self.apply(resource, spec)?;
            debug!(resource = %resource.id(), path = %spec.path, applied, "field spec");
        }
        Ok(())
    }

    fn apply(&self, resource: &mut Resource, spec: &FieldSpec) -> Result<bool> {
        let id = resource.id().to_string();
        let mut current = resource.value_mut();

        for (depth, key) in spec.path.iter().enumerate() {
            let map = match current {
                Value::Map(map) => map,
                other => {
                    return Err(Error::path_conflict(
                        id,
                        spec.path.prefix(depth).to_string(),
                        other.type_name(),
                    ))
                }
            };

            if !spec.create && map.get(key).map_or(true, Value::is_null) {
                return Ok(false);
            }
            let slot = map.fields.entry(key.to_string()).or_default();
            if slot.is_null() {
                *slot = Value::Map(Map::new());
            }
            current = slot;
        }

        match current {
            Value::Map(map) => {
                for (key, value) in self.annotations {
                    map.set(key.clone(), Value::from(value.as_str()));
                }
                Ok(true)
            }
            other => Err(Error::path_conflict(
                id,
                spec.path.to_string(),
                other.type_name(),
            )),
        }
    }
}
