//! HTTP client for a remote data node's protocol-configure endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use parrotly_core::model::{Did, ProtocolDefinition};

use crate::datastore::{RemotePeer, Status, StoreError};

/// Remote peer reached over HTTP.
///
/// Only protocol propagation goes through this client; record replication is
/// the node's own business.
#[derive(Clone)]
pub struct HttpRemotePeer {
    client: Client,
    base_url: String,
}

impl HttpRemotePeer {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, Serialize)]
struct ConfigureRequest<'a> {
    owner: &'a Did,
    definition: &'a ProtocolDefinition,
}

#[async_trait]
impl RemotePeer for HttpRemotePeer {
    async fn install_protocol(
        &self,
        owner: &Did,
        definition: &ProtocolDefinition,
    ) -> Result<Status, StoreError> {
        let url = format!(
            "{}/protocols/configure",
            self.base_url.trim_end_matches('/')
        );
        let payload = ConfigureRequest { owner, definition };

        let response = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let code = response.status().as_u16();
        let detail = if response.status().is_success() {
            None
        } else {
            response.text().await.ok().filter(|body| !body.is_empty())
        };
        Ok(Status::new(code, detail))
    }
}
