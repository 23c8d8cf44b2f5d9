//! Provider account handles (`name#tag`).

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Separator between the display name and the tag of a handle.
pub const HANDLE_SEPARATOR: char = '#';

/// Errors produced when a stored handle cannot be split.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandleError {
    #[error("Invalid handle format: {0:?} (expected name#tag)")]
    Malformed(String),
}

/// A parsed provider account key.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle {
    name: String,
    tag: String,
}

impl Handle {
    /// Build a handle from its parts.
    pub fn new(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
        }
    }

    /// Parse `name#tag`. Only the first two segments are considered, so
    /// `a#b#c` parses as name `a`, tag `b`.
    pub fn parse(raw: &str) -> Result<Self, HandleError> {
        let mut parts = raw.split(HANDLE_SEPARATOR);
        let name = parts.next().unwrap_or_default();
        let tag = parts.next().unwrap_or_default();

        if name.is_empty() || tag.is_empty() {
            return Err(HandleError::Malformed(raw.to_string()));
        }

        Ok(Self::new(name, tag))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.name, HANDLE_SEPARATOR, self.tag)
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self)
    }
}

impl std::str::FromStr for Handle {
    type Err = HandleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
