// SPDX-License-Identifier: MIT
//! The client-facing application agent.
//!
//! Clients register themselves for an endpoint ID, poll a per-session
//! mailbox for bundles the node received for that endpoint, build and
//! submit new bundles, and finally unregister. The node core's delivery
//! path pushes inbound bundles in through [`ApplicationAgent::deliver`],
//! concurrently with any client request.

pub mod error;
pub mod mailbox;
pub mod registry;
pub mod sender;
pub mod token;
pub mod validator;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::bpv7::{bundle_from_args, Bundle, EndpointId};
use crate::store::BundleDescriptor;

pub use error::AgentError;
pub use mailbox::MailboxStore;
pub use registry::SessionRegistry;
pub use sender::{BundleSender, ChannelSender};
pub use token::{SecureTokenGenerator, TokenGenerator};
pub use validator::SubmissionValidator;

/// The node core's view of an application agent: bundles flow in through
/// `deliver`, `endpoints` tells the routing layer which destinations this
/// agent wants to receive.
#[async_trait]
pub trait ApplicationAgent: Send + Sync {
    /// Push an inbound bundle towards every matching client session.
    async fn deliver(&self, descriptor: &dyn BundleDescriptor) -> Result<(), AgentError>;

    /// All endpoints with at least one live session.
    async fn endpoints(&self) -> Vec<EndpointId>;

    async fn shutdown(&self);
}

/// Session and mailbox bookkeeping behind the client REST API.
pub struct RestAgent {
    registry: Arc<SessionRegistry>,
    mailboxes: MailboxStore,
    validator: SubmissionValidator,
    sender: Arc<dyn BundleSender>,
}

impl RestAgent {
    pub fn new(token_gen: Arc<dyn TokenGenerator>, sender: Arc<dyn BundleSender>) -> Self {
        let registry = Arc::new(SessionRegistry::new(token_gen));
        Self {
            validator: SubmissionValidator::new(Arc::clone(&registry)),
            mailboxes: MailboxStore::new(),
            registry,
            sender,
        }
    }

    /// Register a client for `endpoint_id`, returning the fresh session
    /// token. Fails on a malformed endpoint identifier or when token
    /// generation fails; neither leaves partial state.
    pub async fn register(&self, endpoint_id: &str) -> Result<String, AgentError> {
        let endpoint = EndpointId::parse(endpoint_id).map_err(AgentError::InvalidEndpoint)?;
        self.registry.register(endpoint).await
    }

    /// Tear down a session and discard its undelivered bundles. Unknown
    /// tokens are a no-op.
    pub async fn unregister(&self, token: &str) {
        self.registry.unregister(token).await;
        self.mailboxes.drop_mailbox(token).await;
    }

    /// Drain the session's mailbox. An unknown token yields an empty
    /// collection — indistinguishable from a known session with nothing
    /// pending.
    pub async fn fetch(&self, token: &str) -> Vec<Bundle> {
        let bundles = self.mailboxes.fetch(token).await;
        if !bundles.is_empty() {
            info!(count = bundles.len(), "client fetched bundles");
        }
        bundles
    }

    /// Construct a bundle from the named-argument mapping and, if the
    /// session owns it, hand it to the sender.
    pub async fn build(&self, token: &str, arguments: &Map<String, Value>) -> Result<(), AgentError> {
        // Unknown session is reported before construction is attempted.
        if self.registry.lookup(token).await.is_none() {
            return Err(AgentError::UnknownSession);
        }

        let bundle = bundle_from_args(arguments).map_err(AgentError::Construction)?;
        let endpoint = self.validator.authorize(token, &bundle).await?;

        info!(endpoint = %endpoint, bundle = %bundle.id(), "client submitted bundle");
        self.sender.send(bundle).await
    }

    pub async fn session_count(&self) -> usize {
        self.registry.session_count().await
    }
}

#[async_trait]
impl ApplicationAgent for RestAgent {
    /// Resolve every session registered for the bundle's destination, then
    /// load the content once and fan it out.
    ///
    /// The load happens before any mailbox is touched: a load failure
    /// aborts delivery to *all* resolved recipients of this bundle. That is
    /// the storage-efficiency trade of loading once per bundle rather than
    /// once per recipient; the warn log below is what makes the dropped
    /// distribution observable to the surrounding system.
    async fn deliver(&self, descriptor: &dyn BundleDescriptor) -> Result<(), AgentError> {
        let recipients = self.registry.tokens_for(descriptor.destination()).await;
        if recipients.is_empty() {
            debug!(bundle = %descriptor.id(), "no client session for destination");
            return Ok(());
        }

        if let Err(err) = self.mailboxes.deliver(descriptor, &recipients).await {
            warn!(
                bundle = %descriptor.id(),
                recipients = recipients.len(),
                error = %err,
                "bundle content load failed, delivery aborted for all recipients"
            );
            return Err(err);
        }
        Ok(())
    }

    async fn endpoints(&self) -> Vec<EndpointId> {
        self.registry.endpoints().await
    }

    async fn shutdown(&self) {}
}
