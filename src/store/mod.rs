//! Store module - Parses and re-emits manifest streams.
//!
//! A manifest is either a YAML stream (documents separated by `---`) or
//! JSON: one or more concatenated objects, or a single array of objects.
//! The detected [`Format`] is kept so the stream is written back the way it
//! was read.

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::resource::Resource;
use crate::selector::Selector;
use crate::value::Value;

/// Format of a manifest stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    /// Concatenated JSON objects.
    Json,
    /// A single JSON array of objects.
    JsonArray,
}

impl Format {
    /// Detects the format from the first non-whitespace character.
    pub fn detect(input: &str) -> Self {
        match input.trim_start().chars().next() {
            Some('[') => Format::JsonArray,
            Some('{') => Format::Json,
            _ => Format::Yaml,
        }
    }
}

/// ResourceList is the ordered collection of resources of one manifest.
///
/// Resources are only ever mutated in place: the list keeps its length and
/// order from parsing to serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceList {
    resources: Vec<Resource>,
    format: Format,
}

impl ResourceList {
    /// Parses a manifest stream. Empty YAML documents are dropped; every
    /// other document must be a map.
    pub fn parse(input: &str) -> Result<Self> {
        let format = Format::detect(input);
        let values = match format {
            Format::Yaml => parse_yaml(input)?,
            Format::Json => serde_json::Deserializer::from_str(input)
                .into_iter::<Value>()
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| Error::parse(e.to_string()))?,
            Format::JsonArray => serde_json::from_str::<Vec<Value>>(input)
                .map_err(|e| Error::parse(e.to_string()))?,
        };

        let mut resources = Vec::with_capacity(values.len());
        for (i, value) in values.into_iter().enumerate() {
            if !value.is_map() {
                return Err(Error::parse(format!(
                    "document {} is a {}, expected a map",
                    i,
                    value.type_name()
                )));
            }
            resources.push(Resource::new(value));
        }
        debug!(count = resources.len(), ?format, "parsed manifest");
        Ok(ResourceList { resources, format })
    }

    /// Serializes the list in the format it was parsed from. Non-empty
    /// output always ends with a newline.
    pub fn serialize(&self) -> Result<String> {
        let values: Vec<&Value> = self.resources.iter().map(Resource::value).collect();
        match self.format {
            Format::Yaml => {
                let mut out = String::new();
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        out.push_str("---\n");
                    }
                    let doc = serde_yaml::to_string(value)
                        .map_err(|e| Error::serialization(e.to_string()))?;
                    out.push_str(&doc);
                }
                Ok(out)
            }
            Format::Json => {
                let mut out = String::new();
                for value in values {
                    let doc = serde_json::to_string_pretty(value)
                        .map_err(|e| Error::serialization(e.to_string()))?;
                    out.push_str(&doc);
                    out.push('\n');
                }
                Ok(out)
            }
            Format::JsonArray => {
                let mut out = serde_json::to_string_pretty(&values)
                    .map_err(|e| Error::serialization(e.to_string()))?;
                out.push('\n');
                Ok(out)
            }
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Resource> {
        self.resources.get_mut(index)
    }

    pub fn as_slice(&self) -> &[Resource] {
        &self.resources
    }

    /// Returns the positions of the resources matching the selector, in
    /// list order.
    pub fn select(&self, selector: &Selector) -> Result<Vec<usize>> {
        crate::selector::select(&self.resources, selector)
    }
}

fn parse_yaml(input: &str) -> Result<Vec<Value>> {
    let mut values = Vec::new();
    for document in serde_yaml::Deserializer::from_str(input) {
        let value = Value::deserialize(document)
            .map_err(|e| Error::parse(format!("document {}: {}", values.len(), e)))?;
        if !value.is_null() {
            values.push(value);
        }
    }
    Ok(values)
}
