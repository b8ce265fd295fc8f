// SPDX-License-Identifier: MIT

use std::time::Duration;

use serde_json::{Map, Value};

use super::bundle::PAYLOAD_BLOCK_TYPE;
use super::{Bundle, BundleError, CanonicalBlock, CreationTimestamp, EndpointId, PrimaryBlock};

const DEFAULT_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

// ─── BundleBuilder ────────────────────────────────────────────────────────────

/// Step-by-step construction of an outbound bundle.
///
/// `source` and `destination` are required; `report_to` defaults to the
/// source, the creation timestamp to the current instant, and the lifetime
/// to 24 hours.
#[derive(Debug, Default)]
pub struct BundleBuilder {
    destination: Option<EndpointId>,
    source: Option<EndpointId>,
    report_to: Option<EndpointId>,
    creation_timestamp: Option<CreationTimestamp>,
    lifetime: Option<Duration>,
    payload: Option<Vec<u8>>,
}

impl BundleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn destination(mut self, destination: EndpointId) -> Self {
        self.destination = Some(destination);
        self
    }

    pub fn source(mut self, source: EndpointId) -> Self {
        self.source = Some(source);
        self
    }

    pub fn report_to(mut self, report_to: EndpointId) -> Self {
        self.report_to = Some(report_to);
        self
    }

    /// Stamp the bundle with the current instant and a fresh sequence number.
    pub fn creation_timestamp_now(mut self) -> Self {
        self.creation_timestamp = Some(CreationTimestamp::now());
        self
    }

    pub fn lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    pub fn payload(mut self, data: Vec<u8>) -> Self {
        self.payload = Some(data);
        self
    }

    pub fn build(self) -> Result<Bundle, BundleError> {
        let source = self.source.ok_or(BundleError::MissingArgument("source"))?;
        let destination = self
            .destination
            .ok_or(BundleError::MissingArgument("destination"))?;
        let payload = self
            .payload
            .ok_or(BundleError::MissingArgument("payload_block"))?;

        let report_to = self.report_to.unwrap_or_else(|| source.clone());
        let creation_timestamp = self.creation_timestamp.unwrap_or_else(CreationTimestamp::now);
        let lifetime = self.lifetime.unwrap_or(DEFAULT_LIFETIME);

        Ok(Bundle {
            primary_block: PrimaryBlock {
                destination,
                source,
                report_to,
                creation_timestamp,
                lifetime: lifetime.as_millis() as u64,
            },
            canonical_blocks: vec![CanonicalBlock {
                block_number: 1,
                block_type_code: PAYLOAD_BLOCK_TYPE,
                data: payload,
            }],
        })
    }
}

// ─── Named-argument construction ──────────────────────────────────────────────

/// Build a bundle from the `build` operation's named-argument mapping.
///
/// Understood keys: `source`, `destination`, `report_to`,
/// `creation_timestamp_now` (truthy), `lifetime` (human duration string,
/// e.g. `"24h"`), `payload_block` (UTF-8 payload). Unknown keys are
/// construction failures, as are missing required values.
pub fn bundle_from_args(args: &Map<String, Value>) -> Result<Bundle, BundleError> {
    let mut builder = BundleBuilder::new();

    for (key, value) in args {
        match key.as_str() {
            "source" => builder = builder.source(endpoint_arg("source", value)?),
            "destination" => builder = builder.destination(endpoint_arg("destination", value)?),
            "report_to" => builder = builder.report_to(endpoint_arg("report_to", value)?),
            "creation_timestamp_now" => {
                if truthy_arg("creation_timestamp_now", value)? {
                    builder = builder.creation_timestamp_now();
                }
            }
            "lifetime" => {
                let raw = str_arg("lifetime", value)?;
                let lifetime = humantime::parse_duration(raw).map_err(|e| {
                    BundleError::InvalidArgument {
                        arg: "lifetime",
                        reason: e.to_string(),
                    }
                })?;
                builder = builder.lifetime(lifetime);
            }
            "payload_block" => {
                builder = builder.payload(str_arg("payload_block", value)?.as_bytes().to_vec());
            }
            _ => return Err(BundleError::UnknownArgument(key.clone())),
        }
    }

    builder.build()
}

fn str_arg<'a>(arg: &'static str, value: &'a Value) -> Result<&'a str, BundleError> {
    value.as_str().ok_or(BundleError::InvalidArgument {
        arg,
        reason: "expected a string".to_string(),
    })
}

fn endpoint_arg(arg: &'static str, value: &Value) -> Result<EndpointId, BundleError> {
    EndpointId::parse(str_arg(arg, value)?).map_err(|e| BundleError::InvalidArgument {
        arg,
        reason: e.to_string(),
    })
}

fn truthy_arg(arg: &'static str, value: &Value) -> Result<bool, BundleError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => Ok(n.as_i64().unwrap_or(0) != 0 || n.as_u64().unwrap_or(0) != 0),
        _ => Err(BundleError::InvalidArgument {
            arg,
            reason: "expected a boolean or integer".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn builds_from_the_documented_argument_set() {
        let bundle = bundle_from_args(&args(json!({
            "destination": "dtn://dst/",
            "source": "dtn://foo/bar",
            "creation_timestamp_now": 1,
            "lifetime": "24h",
            "payload_block": "hello world",
        })))
        .unwrap();

        assert_eq!(bundle.primary_block.destination.as_str(), "dtn://dst/");
        assert_eq!(bundle.primary_block.source.as_str(), "dtn://foo/bar");
        // report_to falls back to the source.
        assert_eq!(bundle.primary_block.report_to.as_str(), "dtn://foo/bar");
        assert_eq!(bundle.primary_block.lifetime, 86_400_000);
        assert_eq!(bundle.payload(), Some(&b"hello world"[..]));
    }

    #[test]
    fn explicit_report_to_wins_over_source_fallback() {
        let bundle = bundle_from_args(&args(json!({
            "destination": "dtn://dst/",
            "source": "dtn://foo/bar",
            "report_to": "dtn://reports/",
            "payload_block": "x",
        })))
        .unwrap();
        assert_eq!(bundle.primary_block.report_to.as_str(), "dtn://reports/");
    }

    #[test]
    fn missing_required_arguments_fail() {
        let err = bundle_from_args(&args(json!({
            "destination": "dtn://dst/",
            "payload_block": "x",
        })))
        .unwrap_err();
        assert!(matches!(err, BundleError::MissingArgument("source")));

        let err = bundle_from_args(&args(json!({
            "destination": "dtn://dst/",
            "source": "dtn://foo/bar",
        })))
        .unwrap_err();
        assert!(matches!(err, BundleError::MissingArgument("payload_block")));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = bundle_from_args(&args(json!({
            "destination": "dtn://dst/",
            "source": "dtn://foo/bar",
            "payload_block": "x",
            "hop_count_block": 23,
        })))
        .unwrap_err();
        assert!(matches!(err, BundleError::UnknownArgument(k) if k == "hop_count_block"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = bundle_from_args(&args(json!({
            "destination": "nonsense",
            "source": "dtn://foo/bar",
            "payload_block": "x",
        })))
        .unwrap_err();
        assert!(matches!(err, BundleError::InvalidArgument { arg: "destination", .. }));

        let err = bundle_from_args(&args(json!({
            "destination": "dtn://dst/",
            "source": "dtn://foo/bar",
            "lifetime": "later",
            "payload_block": "x",
        })))
        .unwrap_err();
        assert!(matches!(err, BundleError::InvalidArgument { arg: "lifetime", .. }));
    }

    #[test]
    fn two_builds_get_distinct_identities() {
        let make = || {
            BundleBuilder::new()
                .source(EndpointId::parse("dtn://foo/bar").unwrap())
                .destination(EndpointId::parse("dtn://dst/").unwrap())
                .payload(b"x".to_vec())
                .build()
                .unwrap()
        };
        assert_ne!(make().id(), make().id());
    }
}
