// SPDX-License-Identifier: MIT
//! Interface to the node's bundle storage.
//!
//! Storage itself lives in the node core; the agent only ever sees
//! [`BundleDescriptor`]s handed to its delivery path and materializes their
//! content on demand.

use async_trait::async_trait;

use crate::bpv7::{Bundle, BundleId, EndpointId};

/// Errors raised while materializing a bundle's content.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("bundle content unavailable: {0}")]
    Unavailable(String),
}

/// Reference to a bundle held by the node's storage.
///
/// Carries the bundle's identity and destination cheaply; the full content
/// is materialized by [`load`](Self::load), which may fail (storage I/O).
#[async_trait]
pub trait BundleDescriptor: Send + Sync {
    fn id(&self) -> &BundleId;

    fn destination(&self) -> &EndpointId;

    /// Materialize the full bundle content.
    async fn load(&self) -> Result<Bundle, StoreError>;
}

/// Descriptor over a bundle that is already in memory.
///
/// Used when a bundle reaches the agent without a storage round-trip, and
/// by tests.
pub struct MemoryDescriptor {
    id: BundleId,
    destination: EndpointId,
    bundle: Bundle,
}

impl MemoryDescriptor {
    pub fn new(bundle: Bundle) -> Self {
        Self {
            id: bundle.id(),
            destination: bundle.primary_block.destination.clone(),
            bundle,
        }
    }
}

#[async_trait]
impl BundleDescriptor for MemoryDescriptor {
    fn id(&self) -> &BundleId {
        &self.id
    }

    fn destination(&self) -> &EndpointId {
        &self.destination
    }

    async fn load(&self) -> Result<Bundle, StoreError> {
        Ok(self.bundle.clone())
    }
}
