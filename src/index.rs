//! Coordinates and node identifiers.

use std::borrow::Cow;

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// The sentinel coordinate standing in for an unbounded (infinite) range end.
pub const UNBOUNDED: u64 = u64::MAX;

/// A coordinate into a single level of a resource.
///
/// Range dimensions are addressed by [`Index::Number`], index dimensions by [`Index::Key`].
/// A number and a key with the same decimal text address the same entry of an index dimension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Index {
    /// A numeric coordinate.
    #[display("{_0}")]
    Number(u64),
    /// A string key.
    #[display("{_0}")]
    Key(String),
}

impl From<&str> for Index {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl Index {
    /// Returns the numeric coordinate, if this is a number or a key holding a decimal integer.
    #[must_use]
    pub fn as_number(&self) -> Option<u64> {
        match self {
            Self::Number(number) => Some(*number),
            Self::Key(key) => key.parse().ok(),
        }
    }

    /// Returns the index as a key of an index dimension.
    #[must_use]
    pub fn as_key(&self) -> Cow<'_, str> {
        match self {
            Self::Number(number) => Cow::Owned(number.to_string()),
            Self::Key(key) => Cow::Borrowed(key),
        }
    }

    /// Returns true if `self` and `other` address the same index dimension entry.
    #[must_use]
    pub fn same_key(&self, other: &Index) -> bool {
        self.as_key() == other.as_key()
    }
}

/// A deterministic generator of node identifiers.
///
/// Trees built with the same generator state receive the same ids.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    /// Create a new id generator starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new id generator starting at `start`.
    #[must_use]
    pub fn starting_at(start: u64) -> Self {
        Self { next: start }
    }

    /// Return the next identifier.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}
