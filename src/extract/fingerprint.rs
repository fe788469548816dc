// src/extract/fingerprint.rs

//! Content fingerprinting.

use sha2::{Digest, Sha256};

/// Compute the lowercase hex SHA-256 digest of stabilized markup.
///
/// Used purely as an equality oracle between cycles; never decoded.
pub fn fingerprint(stable_text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(stable_text.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        assert_eq!(fingerprint("<table></table>"), fingerprint("<table></table>"));
    }

    #[test]
    fn test_sensitive_to_content() {
        assert_ne!(fingerprint("<td>1</td>"), fingerprint("<td>2</td>"));
    }

    #[test]
    fn test_fixed_length_hex() {
        let digest = fingerprint("");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
