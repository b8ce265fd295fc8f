// SPDX-License-Identifier: MIT
//! Minimal bundle protocol data model.
//!
//! Covers the pieces of a bundle the client agent handles: endpoint
//! identifiers, the primary block's addressing fields, a payload block, and
//! the bundle identity used for mailbox deduplication. The CBOR wire
//! encoding of bundles is the node core's concern, not ours — bundles cross
//! this crate's boundary as Rust values and leave it as JSON only in the
//! fetch response.

pub mod builder;
pub mod bundle;
pub mod endpoint;

pub use builder::{bundle_from_args, BundleBuilder};
pub use bundle::{Bundle, BundleId, CanonicalBlock, CreationTimestamp, DtnTime, PrimaryBlock};
pub use endpoint::EndpointId;

/// Errors from endpoint parsing and bundle construction.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("'{0}' is not a valid endpoint identifier")]
    InvalidEndpoint(String),

    #[error("missing required bundle argument '{0}'")]
    MissingArgument(&'static str),

    #[error("unknown bundle argument '{0}'")]
    UnknownArgument(String),

    #[error("invalid value for bundle argument '{arg}': {reason}")]
    InvalidArgument { arg: &'static str, reason: String },
}
