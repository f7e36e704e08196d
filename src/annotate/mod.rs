//! Annotate module - Sequences selection, hashing and mutation.
//!
//! This module ties the [`crate::selector`], [`crate::hash`] and
//! [`crate::fieldpath`] modules into one pass over a manifest.

mod annotator;

#[cfg(test)]
mod annotator_test;

pub use annotator::*;
