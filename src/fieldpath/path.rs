//! Slash-delimited field paths.

use std::fmt;

use crate::error::Error;

/// Path is a sequence of map keys leading from a document root to a nested
/// field, written as `metadata/annotations`.
///
/// A key containing a slash escapes it as `\/`, so
/// `metadata/annotations/example.com\/owner` has three elements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    elements: Vec<String>,
}

impl Path {
    /// Creates a path from a vector of keys.
    pub fn from_elements(elements: Vec<String>) -> Self {
        Path { elements }
    }

    /// Parses a slash-delimited path. Empty paths and empty keys are rejected.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let mut elements = Vec::new();
        let mut current = String::new();
        let mut chars = s.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\\' if chars.peek() == Some(&'/') => {
                    chars.next();
                    current.push('/');
                }
                '/' => elements.push(std::mem::take(&mut current)),
                c => current.push(c),
            }
        }
        elements.push(current);

        if elements.iter().any(String::is_empty) {
            return Err(Error::config(format!("invalid field path {:?}", s)));
        }
        Ok(Path { elements })
    }

    /// Returns an iterator over the path elements.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(String::as_str)
    }

    /// Returns the prefix of this path made of its first `n` elements.
    pub fn prefix(&self, n: usize) -> Path {
        Path {
            elements: self.elements[..n.min(self.elements.len())].to_vec(),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{}", element.replace('/', "\\/"))?;
        }
        Ok(())
    }
}
