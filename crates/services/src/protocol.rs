//! Idempotent protocol negotiation with the data node.

use parrotly_core::model::{Did, ProtocolDefinition};
use storage::{DataStore, ProtocolFilter};

use crate::error::ProtocolError;

/// Ensure `definition` is installed on the node.
///
/// Must run before any record write or query against the protocol; a node
/// rejects writes under a protocol it never saw. Safe to call repeatedly:
/// an already-installed protocol short-circuits to success, so negotiation
/// can never produce a second, divergent install.
///
/// A fresh install is propagated to the identity's remote counterpart.
/// Propagation failure is logged and does not fail negotiation: the local
/// node stays usable even while remote sync lags.
///
/// # Errors
///
/// Returns `ProtocolError::InstallFailed` when local installation yields no
/// handle, or `ProtocolError::Store` on transport failure.
pub async fn ensure_protocol(
    store: &dyn DataStore,
    owner: &Did,
    definition: &ProtocolDefinition,
) -> Result<(), ProtocolError> {
    let reply = store
        .query_protocols(&ProtocolFilter {
            protocol: definition.protocol().clone(),
        })
        .await?;
    if reply.status.is_success() && !reply.protocols.is_empty() {
        tracing::debug!(protocol = %definition.protocol(), "protocol already installed");
        return Ok(());
    }

    let configured = store.configure_protocol(definition).await?;
    let Some(installed) = configured.protocol else {
        return Err(ProtocolError::InstallFailed);
    };

    match installed.send(owner).await {
        Ok(status) if status.is_success() => {
            tracing::debug!(protocol = %definition.protocol(), %status, "protocol propagated to remote node");
        }
        Ok(status) => {
            tracing::warn!(
                protocol = %definition.protocol(),
                %status,
                "remote propagation rejected; continuing with local node only"
            );
        }
        Err(err) => {
            tracing::warn!(
                protocol = %definition.protocol(),
                error = %err,
                "remote propagation failed; continuing with local node only"
            );
        }
    }

    Ok(())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
