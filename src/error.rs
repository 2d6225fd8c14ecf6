use thiserror::Error;

use crate::value::Key;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MunchError {
    /// Raised by the attribute path. Carries the attribute name only.
    #[error("{0}")]
    Attribute(String),
    #[error("{0}")]
    Key(Key),
    #[error("Key {key} rejected: {reason}")]
    Rejected { key: Key, reason: String },
    #[error("Expected a mapping, found {found}")]
    NotAMapping { found: &'static str },
    #[error("Compound keys must be strings, found {key}")]
    NotAString { key: Key },
    #[error("Path conflict at '{path}': not a mapping")]
    PathConflict { path: String },
    #[error("Separator must not be empty")]
    EmptySeparator,
    #[error("Cycle through an immutable tuple cannot be reconstructed")]
    TupleCycle,
    #[error("Invalid named tuple: {0}")]
    NamedTuple(String),
    #[error("Parse error: {message}")]
    Parse { message: String, line: Option<usize>, col: Option<usize> },
    #[error("JSON error: {0}")]
    Json(String),
    #[error("YAML error: {0}")]
    Yaml(String),
    #[error("State error: {0}")]
    State(String),
    #[error("Config error: {0}")]
    Config(String),
}

impl MunchError {
    pub fn is_attribute_error(&self) -> bool {
        matches!(self, MunchError::Attribute(_))
    }
    pub fn is_key_error(&self) -> bool {
        matches!(self, MunchError::Key(_))
    }
}

pub type Result<T> = std::result::Result<T, MunchError>;

// Helper conversions
impl From<serde_json::Error> for MunchError {
    fn from(e: serde_json::Error) -> Self { Self::Json(e.to_string()) }
}
impl From<serde_yaml::Error> for MunchError {
    fn from(e: serde_yaml::Error) -> Self { Self::Yaml(e.to_string()) }
}
impl From<config::ConfigError> for MunchError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
