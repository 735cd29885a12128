//! Newtype wrappers for domain identifiers.
//!
//! These types prevent accidental mixing of different ID types (e.g., using a
//! run id where a repository key is expected) and make the code more
//! self-documenting.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A workflow run identifier assigned by the remote system.
///
/// Globally unique within a repository's remote system and stable for the
/// run's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RunId {
    fn from(n: u64) -> Self {
        RunId(n)
    }
}

/// Error returned when parsing an `owner/name` repository key fails.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidRepoId {
    /// The key did not contain exactly one `/` separator.
    #[error("repository key must be of the form owner/name: {0:?}")]
    MissingSeparator(String),

    /// The owner or name component was empty.
    #[error("repository key has an empty component: {0:?}")]
    EmptyComponent(String),
}

/// A repository identifier (owner/name format).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        RepoId {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parses a composite `owner/name` key.
    ///
    /// Both components must be non-empty and the key must contain exactly one
    /// separator.
    pub fn parse(key: &str) -> Result<Self, InvalidRepoId> {
        let mut parts = key.splitn(2, '/');
        let owner = parts.next().unwrap_or_default();
        let name = parts
            .next()
            .ok_or_else(|| InvalidRepoId::MissingSeparator(key.to_string()))?;

        if owner.is_empty() || name.is_empty() {
            return Err(InvalidRepoId::EmptyComponent(key.to_string()));
        }
        if name.contains('/') {
            return Err(InvalidRepoId::MissingSeparator(key.to_string()));
        }

        Ok(RepoId::new(owner, name))
    }

    /// Returns true if either component is empty.
    ///
    /// Such a key cannot name a repository on the remote system.
    pub fn is_empty(&self) -> bool {
        self.owner.is_empty() || self.name.is_empty()
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
