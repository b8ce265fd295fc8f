// SPDX-License-Identifier: MIT

use crate::bpv7::BundleError;
use crate::store::StoreError;

/// Errors surfaced by the client agent's operations.
///
/// None of these are fatal to the process; the session registry and mailbox
/// store remain usable after any failed operation. Client-facing errors are
/// rendered into the response body via `Display`.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error(transparent)]
    InvalidEndpoint(BundleError),

    #[error("session token generation failed: {0}")]
    TokenGeneration(String),

    #[error("no session registered for this token")]
    UnknownSession,

    #[error("session endpoint is neither the bundle's source nor its report-to endpoint")]
    NotAuthorized,

    #[error("bundle construction failed: {0}")]
    Construction(BundleError),

    #[error(transparent)]
    Load(#[from] StoreError),

    #[error("bundle could not be handed to the sender: {0}")]
    Send(String),
}
