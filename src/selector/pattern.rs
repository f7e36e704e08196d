//! Name and namespace patterns.

use globset::{GlobBuilder, GlobMatcher};

use crate::error::{Error, Result};

/// Pattern matches a name or namespace, either exactly or as a glob where
/// `*` stands for any substring.
///
/// `*` is the only wildcard. Every other character, `?`, `[` and `{`
/// included, matches itself.
#[derive(Debug, Clone)]
pub enum Pattern {
    Exact(String),
    Glob(GlobMatcher),
}

impl Pattern {
    pub fn new(pattern: &str) -> Result<Self> {
        if !pattern.contains('*') {
            return Ok(Pattern::Exact(pattern.to_string()));
        }
        let glob = GlobBuilder::new(&escape(pattern))
            .backslash_escape(true)
            .build()
            .map_err(|e| Error::invalid_selector(format!("pattern {:?}: {}", pattern, e)))?;
        Ok(Pattern::Glob(glob.compile_matcher()))
    }

    /// Returns true if the value matches. An empty pattern only matches an
    /// empty value.
    pub fn is_match(&self, value: &str) -> bool {
        match self {
            Pattern::Exact(exact) => exact == value,
            Pattern::Glob(matcher) => matcher.is_match(value),
        }
    }
}

/// Escapes every glob metacharacter except `*`.
fn escape(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if matches!(c, '\\' | '?' | '[' | ']' | '{' | '}') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
