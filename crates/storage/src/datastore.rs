//! Contract with the user-owned personal data node.
//!
//! Everything the sync engine does goes through [`DataStore`]: querying
//! installed protocols, installing one, querying records and creating
//! records. The node's own replication is behind this boundary and is not
//! modeled here.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use thiserror::Error;

use parrotly_core::model::{Did, ProtocolDefinition, ProtocolUri, SchemaUri};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Transport-level failures talking to a data node.
///
/// Application-level rejections travel as [`Status`] codes inside replies,
/// not as `StoreError`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// Outcome code attached to every reply, HTTP-shaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub code: u16,
    pub detail: Option<String>,
}

impl Status {
    #[must_use]
    pub fn new(code: u16, detail: Option<String>) -> Self {
        Self { code, detail }
    }

    #[must_use]
    pub fn ok() -> Self {
        Self::new(200, None)
    }

    #[must_use]
    pub fn rejected(detail: impl Into<String>) -> Self {
        Self::new(400, Some(detail.into()))
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{} ({detail})", self.code),
            None => write!(f, "{}", self.code),
        }
    }
}

//
// ─── FILTERS & MESSAGES ────────────────────────────────────────────────────────
//

/// Filter for installed-protocol queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolFilter {
    pub protocol: ProtocolUri,
}

/// Filter for record queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFilter {
    pub protocol: ProtocolUri,
}

/// Metadata accompanying a record write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteMessage {
    pub protocol: ProtocolUri,
    pub protocol_path: String,
    pub schema: SchemaUri,
    pub published: bool,
}

//
// ─── RECORDS ───────────────────────────────────────────────────────────────────
//

/// A record as returned by the node: metadata plus an asynchronously
/// resolvable payload.
#[derive(Clone)]
pub struct RecordEnvelope {
    record_id: String,
    author: Did,
    protocol: ProtocolUri,
    protocol_path: String,
    schema: SchemaUri,
    data_format: String,
    published: bool,
    date_created: DateTime<Utc>,
    data: Arc<Vec<u8>>,
}

impl RecordEnvelope {
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        record_id: String,
        author: Did,
        protocol: ProtocolUri,
        protocol_path: String,
        schema: SchemaUri,
        data_format: String,
        published: bool,
        date_created: DateTime<Utc>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            record_id,
            author,
            protocol,
            protocol_path,
            schema,
            data_format,
            published,
            date_created,
            data: Arc::new(data),
        }
    }

    #[must_use]
    pub fn record_id(&self) -> &str {
        &self.record_id
    }

    #[must_use]
    pub fn author(&self) -> &Did {
        &self.author
    }

    #[must_use]
    pub fn protocol(&self) -> &ProtocolUri {
        &self.protocol
    }

    #[must_use]
    pub fn protocol_path(&self) -> &str {
        &self.protocol_path
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
    pub fn published(&self) -> bool {
        self.published
    }

    #[must_use]
    pub fn date_created(&self) -> DateTime<Utc> {
        self.date_created
    }

    /// Resolves the record payload as JSON.
    ///
    /// Resolution is an awaited boundary by contract; real nodes fetch the
    /// payload lazily.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialization` when the payload does not decode
    /// into `T`.
    pub async fn json<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        serde_json::from_slice(&self.data).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

impl fmt::Debug for RecordEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordEnvelope")
            .field("record_id", &self.record_id)
            .field("author", &self.author)
            .field("protocol", &self.protocol)
            .field("protocol_path", &self.protocol_path)
            .field("date_created", &self.date_created)
            .field("data_len", &self.data.len())
            .finish_non_exhaustive()
    }
}

//
// ─── REPLIES ───────────────────────────────────────────────────────────────────
//

/// Reply to an installed-protocol query.
#[derive(Debug, Clone)]
pub struct ProtocolsReply {
    pub status: Status,
    pub protocols: Vec<ProtocolDefinition>,
}

/// Reply to a protocol install. A missing `protocol` handle is a hard
/// failure regardless of the status code.
#[derive(Clone)]
pub struct ConfigureReply {
    pub status: Status,
    pub protocol: Option<InstalledProtocol>,
}

/// Reply to a record query. `records == None` with a success status means
/// "zero records", not an error.
#[derive(Debug, Clone)]
pub struct RecordsReply {
    pub status: Status,
    pub records: Option<Vec<RecordEnvelope>>,
}

/// Reply to a record create.
#[derive(Debug, Clone)]
pub struct CreateReply {
    pub status: Status,
    pub record: Option<RecordEnvelope>,
}

//
// ─── PROPAGATION ───────────────────────────────────────────────────────────────
//

/// A remote counterpart of the identity that can accept a protocol install.
#[async_trait]
pub trait RemotePeer: Send + Sync {
    /// Install `definition` on the remote node on behalf of `owner`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` when the peer is unreachable; application-level
    /// rejection comes back as a non-success [`Status`].
    async fn install_protocol(
        &self,
        owner: &Did,
        definition: &ProtocolDefinition,
    ) -> Result<Status, StoreError>;
}

/// Handle to a protocol that was just installed locally, used to propagate
/// it to the identity's remote node.
#[derive(Clone)]
pub struct InstalledProtocol {
    definition: ProtocolDefinition,
    remote: Option<Arc<dyn RemotePeer>>,
}

impl InstalledProtocol {
    #[must_use]
    pub fn new(definition: ProtocolDefinition, remote: Option<Arc<dyn RemotePeer>>) -> Self {
        Self { definition, remote }
    }

    #[must_use]
    pub fn definition(&self) -> &ProtocolDefinition {
        &self.definition
    }

    /// Push the installed protocol to the remote node, if one is configured.
    ///
    /// Without a remote peer this reports status 204, which counts as
    /// success: a purely local node has nothing to propagate to.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` when the remote peer is unreachable.
    pub async fn send(&self, owner: &Did) -> Result<Status, StoreError> {
        match &self.remote {
            None => Ok(Status::new(204, Some("no remote peer configured".into()))),
            Some(peer) => peer.install_protocol(owner, &self.definition).await,
        }
    }
}

impl fmt::Debug for InstalledProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstalledProtocol")
            .field("protocol", self.definition.protocol())
            .field("has_remote", &self.remote.is_some())
            .finish_non_exhaustive()
    }
}

//
// ─── STORE CONTRACT ────────────────────────────────────────────────────────────
//

/// The personal data node as seen by the sync engine.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// List protocols installed on the node matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on transport failure.
    async fn query_protocols(&self, filter: &ProtocolFilter) -> Result<ProtocolsReply, StoreError>;

    /// Install a protocol definition on the node.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on transport failure.
    async fn configure_protocol(
        &self,
        definition: &ProtocolDefinition,
    ) -> Result<ConfigureReply, StoreError>;

    /// Fetch all records matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on transport failure.
    async fn query_records(&self, filter: &RecordFilter) -> Result<RecordsReply, StoreError>;

    /// Create a record with the given JSON payload and write metadata.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on transport failure.
    async fn create_record(
        &self,
        data: &serde_json::Value,
        message: &WriteMessage,
    ) -> Result<CreateReply, StoreError>;
}

/// An open session with a data node: the store handle plus the owning
/// identity. Constructed once at startup and passed explicitly to everything
/// that needs store access.
#[derive(Clone)]
pub struct Connection {
    pub store: Arc<dyn DataStore>,
    pub did: Did,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("did", &self.did)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
