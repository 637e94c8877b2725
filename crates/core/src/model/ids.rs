use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a dictionary word.
///
/// Scoped to one dictionary; progress records carry the same id, which is how
/// the reconciler matches them back to dictionary entries.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WordId(u64);

impl WordId {
    /// Creates a new `WordId`
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying u64 value
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for WordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WordId({})", self.0)
    }
}

impl fmt::Display for WordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for parsing a `WordId` from a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWordIdError;

impl fmt::Display for ParseWordIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse WordId from string")
    }
}

impl std::error::Error for ParseWordIdError {}

impl FromStr for WordId {
    type Err = ParseWordIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(WordId::new).map_err(|_| ParseWordIdError)
    }
}

// ─── Decentralized identifiers ─────────────────────────────────────────────────

/// Decentralized identifier of the user owning the data node.
///
/// Only the `did:<method>:<id>` shape is validated here; resolution is the
/// store's concern.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Did(String);

impl Did {
    /// Creates a `Did` from its string form.
    ///
    /// # Errors
    ///
    /// Returns `ParseDidError` when the string is not `did:<method>:<id>`.
    pub fn new(raw: impl Into<String>) -> Result<Self, ParseDidError> {
        let raw = raw.into();
        let mut parts = raw.splitn(3, ':');
        let scheme = parts.next().unwrap_or_default();
        let method = parts.next().unwrap_or_default();
        let id = parts.next().unwrap_or_default();
        if scheme != "did" || method.is_empty() || id.is_empty() {
            return Err(ParseDidError { raw });
        }
        Ok(Self(raw))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Did({})", self.0)
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Did {
    type Err = ParseDidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Did::new(s)
    }
}

/// Error type for parsing a `Did` from a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDidError {
    raw: String,
}

impl fmt::Display for ParseDidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a did:<method>:<id> identifier: {}", self.raw)
    }
}

impl std::error::Error for ParseDidError {}

// ─── Tests ─────────────────────────────────────────────────────────────────────
