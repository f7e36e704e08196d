//! Hash module - Canonical content fingerprints of resources.
//!
//! A resource is first rendered into a canonical byte form: compact JSON with
//! map keys in ascending code point order at every level, list order kept,
//! integers in decimal, floats in their shortest round-trip form and strings
//! JSON-escaped. The fingerprint is the SHA-256 digest of those bytes,
//! truncated to 160 bits and encoded as lowercase hex.
//!
//! The whole object is hashed, `metadata.name` and `metadata.namespace`
//! included, so renaming a resource changes its hash.

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::resource::Resource;
use crate::value::Value;

/// Length in bytes of a fingerprint before hex encoding.
pub const DIGEST_LEN: usize = 20;

/// ResourceHasher computes the fingerprint of a resource.
pub trait ResourceHasher {
    fn hash(&self, resource: &Resource) -> Result<String>;
}

/// CanonicalHasher fingerprints the canonical form of the whole resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalHasher;

impl ResourceHasher for CanonicalHasher {
    fn hash(&self, resource: &Resource) -> Result<String> {
        hash(resource.value())
    }
}

/// Computes the fingerprint of a value.
pub fn hash(value: &Value) -> Result<String> {
    let canonical = canonical_bytes(value)?;

    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    let digest = hasher.finalize();
    Ok(hex::encode(&digest[..DIGEST_LEN]))
}

/// Renders a value into its canonical byte form: compact JSON of a copy of
/// the value with every map sorted by key.
///
/// Fails with [`Error::Hash`] on values that have no canonical rendering
/// (non-finite floats).
pub fn canonical_bytes(value: &Value) -> Result<Vec<u8>> {
    let mut sorted = value.clone();
    let mut path = String::new();
    canonicalize(&mut sorted, &mut path)?;
    serde_json::to_vec(&sorted).map_err(|e| Error::hash(".", e.to_string()))
}

fn canonicalize(value: &mut Value, path: &mut String) -> Result<()> {
    match value {
        Value::Float(f) if !f.is_finite() => Err(Error::hash(
            display_path(path),
            format!("cannot canonicalize non-finite number {}", f),
        )),
        Value::List(items) => {
            for (i, item) in items.iter_mut().enumerate() {
                let len = path.len();
                path.push_str(&format!("[{}]", i));
                canonicalize(item, path)?;
                path.truncate(len);
            }
            Ok(())
        }
        Value::Map(map) => {
            // String order is byte order, which for UTF-8 is code point order.
            map.fields.sort_keys();
            for (key, item) in map.fields.iter_mut() {
                let len = path.len();
                path.push('.');
                path.push_str(key);
                canonicalize(item, path)?;
                path.truncate(len);
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "."
    } else {
        path
    }
}
