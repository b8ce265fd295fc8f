// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use tokio::sync::Mutex;
use tracing::debug;

use super::error::AgentError;
use crate::bpv7::{Bundle, BundleId};
use crate::store::BundleDescriptor;

/// Pending bundles per client session, keyed by session token.
///
/// A mailbox is created lazily on first delivery and removed whole by a
/// fetch or an unregistration — an empty mailbox and a missing mailbox are
/// indistinguishable. Every mutation runs under one exclusive lock:
/// deliveries and fetches both read-modify-write the same aggregate map,
/// and fetch's drain-and-clear has to be a single atomic step. A delivery
/// racing a fetch for the same token is ordered entirely before or after
/// it, never interleaved.
#[derive(Default)]
pub struct MailboxStore {
    mailboxes: Mutex<HashMap<String, HashMap<BundleId, Bundle>>>,
}

impl MailboxStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the descriptor's content once and insert it into every listed
    /// token's mailbox, creating mailboxes as needed. Load and fan-out form
    /// one all-or-nothing critical section: a load failure aborts delivery
    /// to every token in this call before any mailbox is touched. A
    /// (token, bundle id) pair already present is a no-op — redelivery
    /// never duplicates.
    pub async fn deliver(
        &self,
        descriptor: &dyn BundleDescriptor,
        tokens: &[String],
    ) -> Result<(), AgentError> {
        let mut mailboxes = self.mailboxes.lock().await;

        let bundle = descriptor.load().await?;
        let id = descriptor.id();

        for token in tokens {
            let mailbox = mailboxes.entry(token.clone()).or_default();
            if mailbox.contains_key(id) {
                debug!(bundle = %id, "bundle already in mailbox, not delivering twice");
                continue;
            }
            mailbox.insert(id.clone(), bundle.clone());
            debug!(bundle = %id, "bundle delivered into mailbox");
        }

        Ok(())
    }

    /// Atomically drain a token's mailbox: remove it whole and return its
    /// bundles, in no particular order. A missing mailbox yields an empty
    /// collection — indistinguishable from one that existed but was empty.
    pub async fn fetch(&self, token: &str) -> Vec<Bundle> {
        self.mailboxes
            .lock()
            .await
            .remove(token)
            .map(|mailbox| mailbox.into_values().collect())
            .unwrap_or_default()
    }

    /// Remove a token's mailbox unconditionally (unregistration path).
    pub async fn drop_mailbox(&self, token: &str) {
        self.mailboxes.lock().await.remove(token);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::bpv7::{
        CanonicalBlock, CreationTimestamp, DtnTime, EndpointId, PrimaryBlock,
    };
    use crate::store::{MemoryDescriptor, StoreError};

    fn bundle(sequence: u64) -> Bundle {
        let source = EndpointId::parse("dtn://sender/").unwrap();
        Bundle {
            primary_block: PrimaryBlock {
                destination: EndpointId::parse("dtn://foo/bar").unwrap(),
                source: source.clone(),
                report_to: source,
                creation_timestamp: CreationTimestamp::new(DtnTime(1_000), sequence),
                lifetime: 86_400_000,
            },
            canonical_blocks: vec![CanonicalBlock {
                block_number: 1,
                block_type_code: 1,
                data: b"payload".to_vec(),
            }],
        }
    }

    fn descriptor(sequence: u64) -> MemoryDescriptor {
        MemoryDescriptor::new(bundle(sequence))
    }

    struct BrokenDescriptor {
        id: BundleId,
        destination: EndpointId,
    }

    #[async_trait]
    impl BundleDescriptor for BrokenDescriptor {
        fn id(&self) -> &BundleId {
            &self.id
        }

        fn destination(&self) -> &EndpointId {
            &self.destination
        }

        async fn load(&self) -> Result<Bundle, StoreError> {
            Err(StoreError::Unavailable("disk on fire".to_string()))
        }
    }

    #[tokio::test]
    async fn redelivery_of_the_same_identity_stores_one_copy() {
        let store = MailboxStore::new();
        let tokens = vec!["t".to_string()];

        store.deliver(&descriptor(0), &tokens).await.unwrap();
        store.deliver(&descriptor(0), &tokens).await.unwrap();

        assert_eq!(store.fetch("t").await.len(), 1);
    }

    #[tokio::test]
    async fn fetch_drains_and_clears() {
        let store = MailboxStore::new();
        let tokens = vec!["t".to_string()];

        store.deliver(&descriptor(0), &tokens).await.unwrap();
        store.deliver(&descriptor(1), &tokens).await.unwrap();

        assert_eq!(store.fetch("t").await.len(), 2);
        assert!(store.fetch("t").await.is_empty());
    }

    #[tokio::test]
    async fn fetch_of_an_unknown_token_is_empty_not_an_error() {
        let store = MailboxStore::new();
        assert!(store.fetch("never-seen").await.is_empty());
    }

    #[tokio::test]
    async fn one_delivery_fans_out_to_every_token() {
        let store = MailboxStore::new();
        let tokens = vec!["t1".to_string(), "t2".to_string()];

        store.deliver(&descriptor(0), &tokens).await.unwrap();

        assert_eq!(store.fetch("t1").await.len(), 1);
        assert_eq!(store.fetch("t2").await.len(), 1);
    }

    #[tokio::test]
    async fn load_failure_touches_no_mailbox() {
        let store = MailboxStore::new();
        let b = bundle(0);
        let broken = BrokenDescriptor {
            id: b.id(),
            destination: b.primary_block.destination.clone(),
        };

        let result = store
            .deliver(&broken, &["t1".to_string(), "t2".to_string()])
            .await;

        assert!(matches!(result, Err(AgentError::Load(_))));
        assert!(store.fetch("t1").await.is_empty());
        assert!(store.fetch("t2").await.is_empty());
    }

    #[tokio::test]
    async fn drop_mailbox_discards_pending_bundles() {
        let store = MailboxStore::new();

        store
            .deliver(&descriptor(0), &["t".to_string()])
            .await
            .unwrap();
        store.drop_mailbox("t").await;

        assert!(store.fetch("t").await.is_empty());
    }

    /// A deliver racing a fetch is ordered before or after it, never
    /// interleaved — no bundle is ever lost between the two.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_deliver_and_fetch_lose_nothing() {
        const DELIVERIES: u64 = 200;

        let store = Arc::new(MailboxStore::new());

        let deliverer = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                for sequence in 0..DELIVERIES {
                    store
                        .deliver(&descriptor(sequence), &["t".to_string()])
                        .await
                        .unwrap();
                }
            })
        };

        let fetcher = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let mut seen = std::collections::HashSet::new();
                while seen.len() < DELIVERIES as usize {
                    for fetched in store.fetch("t").await {
                        assert!(
                            seen.insert(fetched.id()),
                            "bundle fetched twice: {}",
                            fetched.id()
                        );
                    }
                    tokio::task::yield_now().await;
                }
                seen
            })
        };

        deliverer.await.unwrap();
        let seen = fetcher.await.unwrap();
        assert_eq!(seen.len(), DELIVERIES as usize);
    }
}
