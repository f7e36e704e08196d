//! # Hash Annotator
//!
//! Annotates Kubernetes manifests with content hashes of the resources they
//! depend on.
//!
//! Selected "resource" documents (typically ConfigMaps and Secrets) are
//! hashed, and the hashes are written as annotations into selected "target"
//! documents (typically Deployments), so that any change to a dependency
//! changes the target and forces a rollout.
//!
//! ## Modules
//!
//! - [`value`] - In-memory representation of YAML/JSON documents
//! - [`resource`] - Identity accessors for Kubernetes-style objects
//! - [`store`] - Parsing and re-emitting manifest streams
//! - [`selector`] - Declarative resource selection
//! - [`hash`] - Canonical content fingerprints
//! - [`fieldpath`] - Field paths and the annotation filter
//! - [`config`] - Annotator configuration
//! - [`annotate`] - The hash-and-annotate pipeline

pub mod annotate;
pub mod config;
pub mod error;
pub mod fieldpath;
pub mod hash;
pub mod resource;
pub mod selector;
pub mod store;
pub mod value;

pub use annotate::{hash_key, Annotator, AnnotatorBuilder};
pub use config::Config;
pub use error::{Error, Result};
pub use fieldpath::{AnnotationFilter, FieldSpec};
pub use hash::{CanonicalHasher, ResourceHasher};
pub use resource::{Gvk, Resource};
pub use selector::Selector;
pub use store::{Format, ResourceList};
pub use value::Value;
