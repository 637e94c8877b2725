//! In-memory personal data node for local sessions, prototyping and tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use parrotly_core::Clock;
use parrotly_core::model::{Did, ProtocolDefinition, ProtocolUri};

use crate::datastore::{
    ConfigureReply, Connection, CreateReply, DataStore, InstalledProtocol, ProtocolFilter,
    ProtocolsReply, RecordEnvelope, RecordFilter, RecordsReply, RemotePeer, Status, StoreError,
    WriteMessage,
};

/// A single-tenant data node held in memory.
///
/// Mirrors the external node contract closely enough to exercise the sync
/// engine: writes against a protocol that was never configured are rejected,
/// and a query matching nothing reports `records: None`.
#[derive(Clone)]
pub struct InMemoryNode {
    owner: Did,
    clock: Clock,
    remote: Option<Arc<dyn RemotePeer>>,
    protocols: Arc<Mutex<HashMap<ProtocolUri, ProtocolDefinition>>>,
    records: Arc<Mutex<Vec<RecordEnvelope>>>,
}

impl InMemoryNode {
    #[must_use]
    pub fn new(owner: Did) -> Self {
        Self {
            owner,
            clock: Clock::default_clock(),
            remote: None,
            protocols: Arc::new(Mutex::new(HashMap::new())),
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Attach the remote counterpart protocol installs propagate to.
    #[must_use]
    pub fn with_remote(mut self, remote: Arc<dyn RemotePeer>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Open a session against a fresh node under a newly generated identity.
    #[must_use]
    pub fn connect() -> Connection {
        Self::connect_with(Clock::default_clock(), None)
    }

    /// Open a session with an explicit clock and optional remote peer.
    #[must_use]
    pub fn connect_with(clock: Clock, remote: Option<Arc<dyn RemotePeer>>) -> Connection {
        let did = generate_did();
        let mut node = Self::new(did.clone()).with_clock(clock);
        if let Some(remote) = remote {
            node = node.with_remote(remote);
        }
        Connection {
            store: Arc::new(node),
            did,
        }
    }

    #[must_use]
    pub fn owner(&self) -> &Did {
        &self.owner
    }

    /// Installed protocol definitions, for assertions and diagnostics.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Connection` if the node's state lock is poisoned.
    pub fn installed_protocols(&self) -> Result<Vec<ProtocolDefinition>, StoreError> {
        let guard = self
            .protocols
            .lock()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(guard.values().cloned().collect())
    }

    /// Number of stored records, for assertions and diagnostics.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Connection` if the node's state lock is poisoned.
    pub fn record_count(&self) -> Result<usize, StoreError> {
        let guard = self
            .records
            .lock()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(guard.len())
    }
}

fn generate_did() -> Did {
    Did::new(format!("did:key:{}", Uuid::new_v4().simple()))
        .expect("generated did should be well-formed")
}

#[async_trait]
impl DataStore for InMemoryNode {
    async fn query_protocols(&self, filter: &ProtocolFilter) -> Result<ProtocolsReply, StoreError> {
        let guard = self
            .protocols
            .lock()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        let protocols = guard
            .get(&filter.protocol)
            .cloned()
            .into_iter()
            .collect();
        Ok(ProtocolsReply {
            status: Status::ok(),
            protocols,
        })
    }

    async fn configure_protocol(
        &self,
        definition: &ProtocolDefinition,
    ) -> Result<ConfigureReply, StoreError> {
        let mut guard = self
            .protocols
            .lock()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        guard.insert(definition.protocol().clone(), definition.clone());
        tracing::debug!(protocol = %definition.protocol(), "protocol configured locally");
        Ok(ConfigureReply {
            status: Status::ok(),
            protocol: Some(InstalledProtocol::new(
                definition.clone(),
                self.remote.clone(),
            )),
        })
    }

    async fn query_records(&self, filter: &RecordFilter) -> Result<RecordsReply, StoreError> {
        let guard = self
            .records
            .lock()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        let matching: Vec<RecordEnvelope> = guard
            .iter()
            .filter(|record| record.protocol() == &filter.protocol)
            .cloned()
            .collect();
        Ok(RecordsReply {
            status: Status::ok(),
            // Zero matches surface as an absent list, matching the node
            // contract consumers must handle.
            records: if matching.is_empty() {
                None
            } else {
                Some(matching)
            },
        })
    }

    async fn create_record(
        &self,
        data: &serde_json::Value,
        message: &WriteMessage,
    ) -> Result<CreateReply, StoreError> {
        let definition = {
            let guard = self
                .protocols
                .lock()
                .map_err(|e| StoreError::Connection(e.to_string()))?;
            guard.get(&message.protocol).cloned()
        };

        let Some(definition) = definition else {
            return Ok(CreateReply {
                status: Status::rejected("protocol not configured"),
                record: None,
            });
        };
        let Some(record_type) = definition.record_type(&message.protocol_path) else {
            return Ok(CreateReply {
                status: Status::rejected("unknown record path"),
                record: None,
            });
        };
        if record_type.schema() != &message.schema {
            return Ok(CreateReply {
                status: Status::rejected("schema does not match record type"),
                record: None,
            });
        }

        let payload =
            serde_json::to_vec(data).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let record = RecordEnvelope::new(
            Uuid::new_v4().to_string(),
            self.owner.clone(),
            message.protocol.clone(),
            message.protocol_path.clone(),
            message.schema.clone(),
            record_type.data_format().to_owned(),
            message.published,
            self.clock.now(),
            payload,
        );

        let mut guard = self
            .records
            .lock()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        guard.push(record.clone());
        Ok(CreateReply {
            status: Status::ok(),
            record: Some(record),
        })
    }
}

#[async_trait]
impl RemotePeer for InMemoryNode {
    async fn install_protocol(
        &self,
        owner: &Did,
        definition: &ProtocolDefinition,
    ) -> Result<Status, StoreError> {
        let mut guard = self
            .protocols
            .lock()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        guard.insert(definition.protocol().clone(), definition.clone());
        tracing::debug!(
            protocol = %definition.protocol(),
            owner = %owner,
            "protocol accepted on remote node"
        );
        Ok(Status::new(202, None))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
