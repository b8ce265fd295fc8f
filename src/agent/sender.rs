// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::AgentError;
use crate::bpv7::Bundle;

/// Capability to dispatch a constructed bundle into the network core.
///
/// Injected at agent construction so the submission path carries no hidden
/// process-wide state and tests can capture what was sent.
#[async_trait]
pub trait BundleSender: Send + Sync {
    async fn send(&self, bundle: Bundle) -> Result<(), AgentError>;
}

/// Sender backed by an mpsc channel whose receiving end is the forwarding
/// core's ingress.
pub struct ChannelSender {
    tx: mpsc::Sender<Bundle>,
}

impl ChannelSender {
    /// Create the sender plus the receiver the forwarding core drains.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Bundle>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl BundleSender for ChannelSender {
    async fn send(&self, bundle: Bundle) -> Result<(), AgentError> {
        self.tx
            .send(bundle)
            .await
            .map_err(|_| AgentError::Send("forwarding channel closed".to_string()))
    }
}
