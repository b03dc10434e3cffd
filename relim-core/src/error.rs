//! Structured configuration errors
//!
//! A rule record that fails validation produces a `ConfigError`. Errors are
//! values: the registry records them next to the record index and keeps
//! loading the remaining records.

use std::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const NOT_AN_OBJECT: &str = "NOT_AN_OBJECT";
    pub const MISSING_FIELD: &str = "MISSING_FIELD";
    pub const WRONG_TYPE: &str = "WRONG_TYPE";
    pub const EMPTY_NAME: &str = "EMPTY_NAME";
    pub const INVALID_UNIT: &str = "INVALID_UNIT";
    pub const EMPTY_OUTPUTS: &str = "EMPTY_OUTPUTS";
    pub const EMPTY_PAIR: &str = "EMPTY_PAIR";
    pub const MISSING_TOLERANCE: &str = "MISSING_TOLERANCE";
}

/// Where in a rule record an error was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "in", content = "index", rename_all = "lowercase")]
pub enum Location {
    /// The top level of the rule record
    Rule,
    /// Element of the `outputs` array
    Output(usize),
    /// Element of the `limits` array
    Limit(usize),
}

impl Location {
    /// Array index for output and limit locations
    pub fn index(&self) -> Option<usize> {
        match self {
            Location::Rule => None,
            Location::Output(i) | Location::Limit(i) => Some(*i),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Rule => Ok(()),
            Location::Output(i) => write!(f, "output #{}: ", i),
            Location::Limit(i) => write!(f, "limit #{}: ", i),
        }
    }
}

/// A rule record failed validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{location}element is not an object")]
    NotAnObject { location: Location },

    #[error("{location}key \"{field}\" does not exist")]
    MissingField { location: Location, field: String },

    #[error("{location}key \"{field}\" must be {expected}, got {found}")]
    WrongType {
        location: Location,
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("key \"name\" must not be empty")]
    EmptyName,

    #[error("\"unit\" must be exactly \"g/l\" or \"%w/w\", got {found:?}")]
    InvalidUnit { found: String },

    #[error("key \"outputs\" must contain at least one output")]
    EmptyOutputs,

    #[error("{location}key \"{field}\" must contain \"+\", \"-\" or both")]
    EmptyPair { location: Location, field: String },

    #[error("limit #{index}: has neither a \"percent\" nor an \"absolute\" value or value pair")]
    MissingTolerance { index: usize },
}

impl ConfigError {
    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::NotAnObject { .. } => codes::NOT_AN_OBJECT,
            ConfigError::MissingField { .. } => codes::MISSING_FIELD,
            ConfigError::WrongType { .. } => codes::WRONG_TYPE,
            ConfigError::EmptyName => codes::EMPTY_NAME,
            ConfigError::InvalidUnit { .. } => codes::INVALID_UNIT,
            ConfigError::EmptyOutputs => codes::EMPTY_OUTPUTS,
            ConfigError::EmptyPair { .. } => codes::EMPTY_PAIR,
            ConfigError::MissingTolerance { .. } => codes::MISSING_TOLERANCE,
        }
    }

    /// The part of the record the error refers to
    pub fn location(&self) -> Location {
        match self {
            ConfigError::NotAnObject { location }
            | ConfigError::MissingField { location, .. }
            | ConfigError::WrongType { location, .. }
            | ConfigError::EmptyPair { location, .. } => *location,
            ConfigError::MissingTolerance { index } => Location::Limit(*index),
            ConfigError::EmptyName | ConfigError::InvalidUnit { .. } | ConfigError::EmptyOutputs => {
                Location::Rule
            }
        }
    }

    /// The offending field, if the error is about a single field
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::MissingField { field, .. }
            | ConfigError::WrongType { field, .. }
            | ConfigError::EmptyPair { field, .. } => Some(field),
            ConfigError::EmptyName => Some("name"),
            ConfigError::InvalidUnit { .. } => Some("unit"),
            ConfigError::EmptyOutputs => Some("outputs"),
            ConfigError::NotAnObject { .. } | ConfigError::MissingTolerance { .. } => None,
        }
    }

    // ========== Common Error Constructors ==========

    pub fn missing(location: Location, field: impl Into<String>) -> Self {
        ConfigError::MissingField { location, field: field.into() }
    }

    pub fn wrong_type(
        location: Location,
        field: impl Into<String>,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        ConfigError::WrongType { location, field: field.into(), expected, found }
    }
}
