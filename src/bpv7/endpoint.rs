// SPDX-License-Identifier: MIT

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use super::BundleError;

/// A bundle protocol endpoint identifier.
///
/// Two schemes are understood:
///
/// - `dtn` — `dtn://node/` or `dtn://node/demux`, plus the null endpoint
///   `dtn:none`. The node name must be non-empty; the demux part may be
///   empty but the separating slash is required.
/// - `ipn` — `ipn:node.service`, both components unsigned integers.
///
/// The identifier is kept in its validated textual form; equality and
/// hashing are textual. Clients that want the same mailbox must register
/// the same spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EndpointId(String);

impl EndpointId {
    /// Parse and validate an endpoint identifier.
    pub fn parse(s: &str) -> Result<Self, BundleError> {
        if s == "dtn:none" {
            return Ok(Self(s.to_string()));
        }

        if let Some(rest) = s.strip_prefix("dtn://") {
            let (node, demux) = rest
                .split_once('/')
                .ok_or_else(|| BundleError::InvalidEndpoint(s.to_string()))?;
            if node.is_empty() || !node.chars().all(valid_node_char) {
                return Err(BundleError::InvalidEndpoint(s.to_string()));
            }
            if demux.chars().any(|c| c.is_whitespace() || c.is_control()) {
                return Err(BundleError::InvalidEndpoint(s.to_string()));
            }
            return Ok(Self(s.to_string()));
        }

        if let Some(rest) = s.strip_prefix("ipn:") {
            let valid = rest
                .split_once('.')
                .map(|(node, service)| {
                    node.parse::<u64>().is_ok() && service.parse::<u64>().is_ok()
                })
                .unwrap_or(false);
            if valid {
                return Ok(Self(s.to_string()));
            }
        }

        Err(BundleError::InvalidEndpoint(s.to_string()))
    }

    /// The null endpoint, `dtn:none`.
    pub fn none() -> Self {
        Self("dtn:none".to_string())
    }

    pub fn is_none(&self) -> bool {
        self.0 == "dtn:none"
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn valid_node_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~')
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EndpointId {
    type Err = BundleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for EndpointId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for EndpointId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(de::Error::custom)
    }
}
