// SPDX-License-Identifier: MIT

use rand_core::{OsRng, RngCore};

use super::error::AgentError;

/// Source of fresh session tokens.
///
/// A trait so tests can substitute a deterministic generator; production
/// uses [`SecureTokenGenerator`].
pub trait TokenGenerator: Send + Sync {
    /// Produce a fresh, unguessable session token.
    fn generate(&self) -> Result<String, AgentError>;
}

/// Session tokens from the OS CSPRNG: 16 bytes, formatted as five
/// dash-separated hex groups of 4-2-2-2-6 bytes.
///
/// The result looks like a UUID but is deliberately **not** RFC 4122
/// compliant — no version or variant bits, no structural meaning in any
/// byte. It only needs to be unguessable and distinguishable. The exact
/// grouping is kept for wire compatibility with existing clients.
pub struct SecureTokenGenerator;

impl TokenGenerator for SecureTokenGenerator {
    fn generate(&self) -> Result<String, AgentError> {
        let mut raw = [0u8; 16];
        OsRng
            .try_fill_bytes(&mut raw)
            .map_err(|e| AgentError::TokenGeneration(e.to_string()))?;
        Ok(format!(
            "{}-{}-{}-{}-{}",
            hex::encode(&raw[0..4]),
            hex::encode(&raw[4..6]),
            hex::encode(&raw[6..8]),
            hex::encode(&raw[8..10]),
            hex::encode(&raw[10..16]),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_have_the_documented_grouping() {
        let token = SecureTokenGenerator.generate().unwrap();
        assert_eq!(token.len(), 36);

        let groups: Vec<&str> = token.split('-').collect();
        let lengths: Vec<usize> = groups.iter().map(|g| g.len()).collect();
        assert_eq!(lengths, vec![8, 4, 4, 4, 12]);
        for group in groups {
            assert!(
                group.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()),
                "group {group:?} is not lowercase hex"
            );
        }
    }

    #[test]
    fn tokens_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            assert!(seen.insert(SecureTokenGenerator.generate().unwrap()));
        }
    }
}
