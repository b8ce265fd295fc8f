// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use super::error::AgentError;
use super::token::TokenGenerator;
use crate::bpv7::EndpointId;

/// Live client sessions: opaque token → registered endpoint.
///
/// Reads (lookup, recipient resolution) vastly outnumber writes
/// (register/unregister), so the map sits behind a read/write lock — any
/// number of concurrent readers, writers exclusive. A token maps to exactly
/// one endpoint for its lifetime; several live sessions may share an
/// endpoint.
pub struct SessionRegistry {
    token_gen: Arc<dyn TokenGenerator>,
    clients: RwLock<HashMap<String, EndpointId>>,
}

impl SessionRegistry {
    pub fn new(token_gen: Arc<dyn TokenGenerator>) -> Self {
        Self {
            token_gen,
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Bind a fresh token to `endpoint` and return it.
    ///
    /// Token generation failure leaves no partial state behind.
    pub async fn register(&self, endpoint: EndpointId) -> Result<String, AgentError> {
        let token = self.token_gen.generate()?;
        self.clients.write().await.insert(token.clone(), endpoint.clone());
        info!(endpoint = %endpoint, "client session registered");
        Ok(token)
    }

    /// Remove a token's binding. Unknown tokens are a no-op, not an error.
    pub async fn unregister(&self, token: &str) {
        if self.clients.write().await.remove(token).is_some() {
            info!("client session unregistered");
        }
    }

    pub async fn lookup(&self, token: &str) -> Option<EndpointId> {
        self.clients.read().await.get(token).cloned()
    }

    /// Snapshot of all currently bound endpoints, one entry per live
    /// session — an endpoint with several sessions appears several times.
    pub async fn endpoints(&self) -> Vec<EndpointId> {
        self.clients.read().await.values().cloned().collect()
    }

    /// Every token bound to `endpoint`. Multiple clients may register for
    /// the same endpoint; all of them receive deliveries.
    pub async fn tokens_for(&self, endpoint: &EndpointId) -> Vec<String> {
        self.clients
            .read()
            .await
            .iter()
            .filter(|(_, bound)| *bound == endpoint)
            .map(|(token, _)| token.clone())
            .collect()
    }

    pub async fn session_count(&self) -> usize {
        self.clients.read().await.len()
    }
}
