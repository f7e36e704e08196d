//! Field path module - Locates and mutates nested maps inside resources.
//!
//! A [`FieldSpec`] names a map by its slash-delimited [`Path`]; the
//! [`AnnotationFilter`] walks that path, creating missing maps when the spec
//! allows it, and merges annotations into the map it ends on.

mod filter;
mod path;
mod spec;


pub use filter::*;
pub use path::*;
pub use spec::*;
