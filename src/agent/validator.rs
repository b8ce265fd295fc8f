// SPDX-License-Identifier: MIT

use std::sync::Arc;

use tracing::warn;

use super::error::AgentError;
use super::registry::SessionRegistry;
use crate::bpv7::Bundle;

/// Ownership check on the submission path.
///
/// A session may only originate bundles, or ask for delivery reports, on
/// behalf of traffic it legitimately owns: the submitted bundle's source or
/// report-to endpoint must equal the session's registered endpoint.
/// Anything else would let a client spoof another endpoint's outbound
/// traffic through this interface.
pub struct SubmissionValidator {
    registry: Arc<SessionRegistry>,
}

impl SubmissionValidator {
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    /// Check that `token`'s session authorizes submitting `bundle`.
    ///
    /// Returns the session's endpoint on success, `UnknownSession` for an
    /// unregistered token, `NotAuthorized` when neither the source nor the
    /// report-to endpoint matches.
    pub async fn authorize(
        &self,
        token: &str,
        bundle: &Bundle,
    ) -> Result<crate::bpv7::EndpointId, AgentError> {
        let endpoint = self
            .registry
            .lookup(token)
            .await
            .ok_or(AgentError::UnknownSession)?;

        let primary = &bundle.primary_block;
        if primary.source != endpoint && primary.report_to != endpoint {
            warn!(
                endpoint = %endpoint,
                bundle = %bundle.id(),
                "rejecting submission, session owns neither source nor report-to"
            );
            return Err(AgentError::NotAuthorized);
        }

        Ok(endpoint)
    }
}
