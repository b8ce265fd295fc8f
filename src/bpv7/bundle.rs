// SPDX-License-Identifier: MIT

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EndpointId;

/// Block type code of the payload block.
pub const PAYLOAD_BLOCK_TYPE: u64 = 1;

/// Unix milliseconds at the DTN epoch, 2000-01-01 00:00:00 UTC.
const DTN_EPOCH_UNIX_MS: i64 = 946_684_800_000;

// ─── DtnTime ──────────────────────────────────────────────────────────────────

/// Milliseconds since the DTN epoch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct DtnTime(pub u64);

impl DtnTime {
    pub fn now() -> Self {
        let unix_ms = Utc::now().timestamp_millis();
        Self(unix_ms.saturating_sub(DTN_EPOCH_UNIX_MS).max(0) as u64)
    }

    fn as_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0 as i64 + DTN_EPOCH_UNIX_MS)
    }
}

impl fmt::Display for DtnTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_datetime() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            None => write!(f, "{}", self.0),
        }
    }
}

// ─── CreationTimestamp ────────────────────────────────────────────────────────

/// Creation time plus a sequence number distinguishing bundles a source
/// created within the same millisecond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreationTimestamp {
    pub time: DtnTime,
    pub sequence_number: u64,
}

/// Process-wide sequence counter; two bundles built in the same instant by
/// the same source still get distinct identities.
static SEQUENCE: AtomicU64 = AtomicU64::new(0);

impl CreationTimestamp {
    pub fn new(time: DtnTime, sequence_number: u64) -> Self {
        Self { time, sequence_number }
    }

    /// Current time with the next process-wide sequence number.
    pub fn now() -> Self {
        Self {
            time: DtnTime::now(),
            sequence_number: SEQUENCE.fetch_add(1, Ordering::Relaxed),
        }
    }
}

// ─── Blocks ───────────────────────────────────────────────────────────────────

/// Addressing and metadata of a bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryBlock {
    pub destination: EndpointId,
    pub source: EndpointId,
    pub report_to: EndpointId,
    pub creation_timestamp: CreationTimestamp,
    /// Lifetime in milliseconds after which the bundle expires.
    pub lifetime: u64,
}

/// A canonical (payload or extension) block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalBlock {
    pub block_number: u64,
    pub block_type_code: u64,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

/// The atomic unit of data transported by the network.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    pub primary_block: PrimaryBlock,
    pub canonical_blocks: Vec<CanonicalBlock>,
}

impl Bundle {
    /// The bundle's identity: source plus creation timestamp.
    pub fn id(&self) -> BundleId {
        BundleId {
            source: self.primary_block.source.clone(),
            timestamp: self.primary_block.creation_timestamp,
        }
    }

    /// The payload block's data, if the bundle carries one.
    pub fn payload(&self) -> Option<&[u8]> {
        self.canonical_blocks
            .iter()
            .find(|block| block.block_type_code == PAYLOAD_BLOCK_TYPE)
            .map(|block| block.data.as_slice())
    }
}

// ─── BundleId ─────────────────────────────────────────────────────────────────

/// Identity of a bundle, the mailbox deduplication key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BundleId {
    pub source: EndpointId,
    pub timestamp: CreationTimestamp,
}

impl fmt::Display for BundleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}",
            self.source, self.timestamp.time.0, self.timestamp.sequence_number
        )
    }
}

// ─── Payload data as base64 in JSON ───────────────────────────────────────────

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle() -> Bundle {
        Bundle {
            primary_block: PrimaryBlock {
                destination: EndpointId::parse("dtn://foo/bar").unwrap(),
                source: EndpointId::parse("dtn://sender/").unwrap(),
                report_to: EndpointId::parse("dtn://sender/").unwrap(),
                creation_timestamp: CreationTimestamp::new(DtnTime(640_000_000_000), 7),
                lifetime: 86_400_000,
            },
            canonical_blocks: vec![CanonicalBlock {
                block_number: 1,
                block_type_code: PAYLOAD_BLOCK_TYPE,
                data: b"hello world".to_vec(),
            }],
        }
    }

    #[test]
    fn id_combines_source_and_timestamp() {
        let id = bundle().id();
        assert_eq!(id.to_string(), "dtn://sender/-640000000000-7");
    }

    #[test]
    fn same_identity_hashes_equal() {
        let a = bundle().id();
        let b = bundle().id();
        assert_eq!(a, b);

        let mut other = bundle();
        other.primary_block.creation_timestamp.sequence_number = 8;
        assert_ne!(a, other.id());
    }

    #[test]
    fn payload_is_the_type_1_block() {
        assert_eq!(bundle().payload(), Some(&b"hello world"[..]));
    }

    #[test]
    fn json_shape_is_camel_case_with_base64_payload() {
        let value = serde_json::to_value(bundle()).unwrap();
        assert_eq!(value["primaryBlock"]["destination"], "dtn://foo/bar");
        assert_eq!(value["primaryBlock"]["reportTo"], "dtn://sender/");
        assert_eq!(value["canonicalBlocks"][0]["data"], "aGVsbG8gd29ybGQ=");

        let back: Bundle = serde_json::from_value(value).unwrap();
        assert_eq!(back.payload(), Some(&b"hello world"[..]));
    }

    #[test]
    fn creation_timestamp_now_is_monotonic_in_sequence() {
        let a = CreationTimestamp::now();
        let b = CreationTimestamp::now();
        assert!(b.sequence_number > a.sequence_number);
    }

    #[test]
    fn dtn_time_renders_a_date() {
        // 2020-04-14 14:32:06 UTC.
        let t = DtnTime(640_189_926_000);
        assert_eq!(t.to_string(), "2020-04-14 14:32:06");
    }
}
