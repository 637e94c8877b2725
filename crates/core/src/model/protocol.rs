use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use url::Url;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProtocolDefinitionError {
    #[error("not an absolute uri: {0}")]
    InvalidUri(String),

    #[error("protocol must declare at least one record type")]
    NoRecordTypes,

    #[error("duplicate record path: {0}")]
    DuplicatePath(String),

    #[error("record path cannot be empty")]
    EmptyPath,
}

//
// ─── URIS ──────────────────────────────────────────────────────────────────────
//

/// Absolute URI naming a protocol. Stores key installed protocols by this.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProtocolUri(String);

impl ProtocolUri {
    /// Validates and wraps a protocol URI.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolDefinitionError::InvalidUri` if the string is not an
    /// absolute URI.
    pub fn new(raw: impl Into<String>) -> Result<Self, ProtocolDefinitionError> {
        let raw = raw.into();
        Url::parse(&raw).map_err(|_| ProtocolDefinitionError::InvalidUri(raw.clone()))?;
        Ok(Self(raw))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ProtocolUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProtocolUri({})", self.0)
    }
}

impl fmt::Display for ProtocolUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Absolute URI naming the payload schema of one record type.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaUri(String);

impl SchemaUri {
    /// Validates and wraps a schema URI.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolDefinitionError::InvalidUri` if the string is not an
    /// absolute URI.
    pub fn new(raw: impl Into<String>) -> Result<Self, ProtocolDefinitionError> {
        let raw = raw.into();
        Url::parse(&raw).map_err(|_| ProtocolDefinitionError::InvalidUri(raw.clone()))?;
        Ok(Self(raw))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SchemaUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SchemaUri({})", self.0)
    }
}

impl fmt::Display for SchemaUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ─── DEFINITION ────────────────────────────────────────────────────────────────
//

/// Who an action rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Actor {
    Anyone,
    Author,
}

/// What an action rule permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    Write,
}

/// One access-control rule on a record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRule {
    pub who: Actor,
    pub can: Action,
}

/// A record type declared by a protocol: its path, payload schema, data
/// format and access rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTypeDef {
    path: String,
    schema: SchemaUri,
    data_format: String,
    actions: Vec<ActionRule>,
}

impl RecordTypeDef {
    /// Creates a record type definition.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolDefinitionError::EmptyPath` on a blank path.
    pub fn new(
        path: impl Into<String>,
        schema: SchemaUri,
        data_format: impl Into<String>,
        actions: Vec<ActionRule>,
    ) -> Result<Self, ProtocolDefinitionError> {
        let path = path.into();
        if path.trim().is_empty() {
            return Err(ProtocolDefinitionError::EmptyPath);
        }
        Ok(Self {
            path,
            schema,
            data_format: data_format.into(),
            actions,
        })
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn schema(&self) -> &SchemaUri {
        &self.schema
    }

    #[must_use]
    pub fn data_format(&self) -> &str {
        &self.data_format
    }

    #[must_use]
    pub fn actions(&self) -> &[ActionRule] {
        &self.actions
    }
}

/// A protocol: the record types and access rules the application and the data
/// store agree on before anything is written.
///
/// Exactly one logical protocol exists per (identity, application);
/// negotiation installs it at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolDefinition {
    protocol: ProtocolUri,
    published: bool,
    types: Vec<RecordTypeDef>,
}

impl ProtocolDefinition {
    /// Creates a protocol definition.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolDefinitionError` when no record types are declared or
    /// a record path repeats.
    pub fn new(
        protocol: ProtocolUri,
        published: bool,
        types: Vec<RecordTypeDef>,
    ) -> Result<Self, ProtocolDefinitionError> {
        if types.is_empty() {
            return Err(ProtocolDefinitionError::NoRecordTypes);
        }
        for (i, ty) in types.iter().enumerate() {
            if types[..i].iter().any(|other| other.path == ty.path) {
                return Err(ProtocolDefinitionError::DuplicatePath(ty.path.clone()));
            }
        }
        Ok(Self {
            protocol,
            published,
            types,
        })
    }

    #[must_use]
    pub fn protocol(&self) -> &ProtocolUri {
        &self.protocol
    }

    #[must_use]
    pub fn published(&self) -> bool {
        self.published
    }

    #[must_use]
    pub fn types(&self) -> &[RecordTypeDef] {
        &self.types
    }

    #[must_use]
    pub fn record_type(&self, path: &str) -> Option<&RecordTypeDef> {
        self.types.iter().find(|ty| ty.path == path)
    }

    /// The vocabulary-quiz protocol: a single published `vocabulary` record
    /// type holding JSON progress records, writable by the author and
    /// readable by anyone.
    #[must_use]
    pub fn vocabulary_quiz() -> Self {
        // Constants below are validated by unit test, so construct directly.
        Self {
            protocol: ProtocolUri(QUIZ_PROTOCOL_URI.to_owned()),
            published: true,
            types: vec![RecordTypeDef {
                path: VOCABULARY_PATH.to_owned(),
                schema: SchemaUri(VOCABULARY_SCHEMA_URI.to_owned()),
                data_format: JSON_DATA_FORMAT.to_owned(),
                actions: vec![
                    ActionRule {
                        who: Actor::Author,
                        can: Action::Write,
                    },
                    ActionRule {
                        who: Actor::Anyone,
                        can: Action::Read,
                    },
                ],
            }],
        }
    }
}

/// URI of the vocabulary-quiz protocol.
pub const QUIZ_PROTOCOL_URI: &str = "https://parrotly.dev/quiz";

/// Record path progress records are written under.
pub const VOCABULARY_PATH: &str = "vocabulary";

/// Payload schema of a progress record.
pub const VOCABULARY_SCHEMA_URI: &str = "https://parrotly.dev/quiz/vocabulary/schema";

/// Data format of a progress record payload.
pub const JSON_DATA_FORMAT: &str = "application/json";

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
