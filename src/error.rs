//! Error types shared by every stage of the annotation pipeline.

use thiserror::Error;

/// Error represents any failure of an annotation run.
///
/// Every variant is fatal: the pipeline never produces partial output.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{message}")]
    Config { message: String },

    #[error("annotation key {key} produced by both {first} and {second}")]
    KeyCollision {
        key: String,
        first: String,
        second: String,
    },

    #[error("invalid selector: {message}")]
    InvalidSelector { message: String },

    #[error("{path}: {message}")]
    Hash { path: String, message: String },

    #[error("{resource}: path {path}: expected map, found {found}")]
    PathConflict {
        resource: String,
        path: String,
        found: String,
    },

    #[error("{message}")]
    Parse { message: String },

    #[error("{message}")]
    Serialization { message: String },
}

impl Error {
    /// Creates an I/O error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Creates a key collision error.
    pub fn key_collision(
        key: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        Error::KeyCollision {
            key: key.into(),
            first: first.into(),
            second: second.into(),
        }
    }

    /// Creates an invalid selector error.
    pub fn invalid_selector(message: impl Into<String>) -> Self {
        Error::InvalidSelector {
            message: message.into(),
        }
    }

    /// Creates a hashing error at the given value path.
    pub fn hash(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Hash {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a path conflict error.
    pub fn path_conflict(
        resource: impl Into<String>,
        path: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Error::PathConflict {
            resource: resource.into(),
            path: path.into(),
            found: found.into(),
        }
    }

    /// Creates a manifest parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Error::Parse {
            message: message.into(),
        }
    }

    /// Creates an output serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Error::Serialization {
            message: message.into(),
        }
    }

    /// Returns a short description of the stage that failed, used to prefix
    /// the diagnostic line.
    pub fn stage(&self) -> &'static str {
        match self {
            Error::Io { .. } => "i/o error",
            Error::Config { .. } => "error unmarshalling config content",
            Error::KeyCollision { .. } => "error hashing resource",
            Error::InvalidSelector { .. } => "error selecting resources",
            Error::Hash { .. } => "error hashing resource",
            Error::PathConflict { .. } => "error applying annotations filter",
            Error::Parse { .. } => "unable to parse manifest",
            Error::Serialization { .. } => "error converting resources to output",
        }
    }

    /// Returns the single-line diagnostic reported for this error.
    pub fn diagnostic(&self) -> String {
        match self {
            // The context of an I/O error already names the stage.
            Error::Io { .. } => self.to_string(),
            _ => format!("{}: {}", self.stage(), self),
        }
        .replace('\n', " ")
    }
}

pub type Result<T> = std::result::Result<T, Error>;
