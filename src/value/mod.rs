//! Value module - In-memory representation of YAML/JSON documents.
//!
//! Manifests are dynamically shaped, so every document is held as a tree of
//! [`Value`]s and inspected through explicit path-walking helpers.

mod value;

pub use value::*;
