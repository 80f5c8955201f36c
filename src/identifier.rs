//! Procedure identifiers
//!
//! Every procedure is named by a `namespace:path` identifier. A bare `path`
//! takes the default namespace.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Namespace used when an identifier is written without one
pub const DEFAULT_NAMESPACE: &str = "minecraft";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("Empty namespace in identifier '{0}'")]
    EmptyNamespace(String),

    #[error("Empty path in identifier '{0}'")]
    EmptyPath(String),

    #[error("Invalid character '{ch}' in namespace of identifier '{id}'")]
    InvalidNamespaceChar { id: String, ch: char },

    #[error("Invalid character '{ch}' in path of identifier '{id}'")]
    InvalidPathChar { id: String, ch: char },
}

/// Globally unique procedure name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier {
    namespace: String,
    path: String,
}

impl Identifier {
    /// Build an identifier from already separated parts
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> Result<Self, IdentifierError> {
        let namespace = namespace.into();
        let path = path.into();
        let full = format!("{}:{}", namespace, path);

        if namespace.is_empty() {
            return Err(IdentifierError::EmptyNamespace(full));
        }
        if path.is_empty() {
            return Err(IdentifierError::EmptyPath(full));
        }
        if let Some(ch) = namespace.chars().find(|c| !is_namespace_char(*c)) {
            return Err(IdentifierError::InvalidNamespaceChar { id: full, ch });
        }
        if let Some(ch) = path.chars().find(|c| !is_path_char(*c)) {
            return Err(IdentifierError::InvalidPathChar { id: full, ch });
        }

        Ok(Self { namespace, path })
    }

    /// Parse `namespace:path`, or `path` in the default namespace
    pub fn parse(s: &str) -> Result<Self, IdentifierError> {
        Self::parse_with_default(s, DEFAULT_NAMESPACE)
    }

    /// Parse `namespace:path`, or `path` in `default_namespace`
    pub fn parse_with_default(s: &str, default_namespace: &str) -> Result<Self, IdentifierError> {
        match s.split_once(':') {
            Some((namespace, path)) => Self::new(namespace, path),
            None => Self::new(default_namespace, s),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

fn is_namespace_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.')
}

fn is_path_char(c: char) -> bool {
    is_namespace_char(c) || c == '/'
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(de::Error::custom)
    }
}
