//! Challenge-response credential verification.
//!
//! The server never receives the client's secret. It issues a random salt
//! and the client answers with `SHA256(salt ++ secret)` in hex; the server
//! recomputes the digest from the stored secret and compares.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use sha2::{Digest, Sha256};

/// Salt length on the wire: 8 random bytes as 16 hex characters.
pub const SALT_LEN: usize = 16;

/// Submitted digest length: SHA-256 as 64 hex characters.
pub const DIGEST_LEN: usize = 64;

/// Salt issuer for the authentication handshake.
///
/// Owns its RNG, seeded once from OS entropy at construction. There is no
/// process-global random state.
pub struct Authenticator {
    rng: StdRng,
}

impl Authenticator {
    /// Create an authenticator seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Create an authenticator with a fixed seed, for deterministic tests.
    #[cfg(test)]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate a fresh salt: 8 random bytes as 16 uppercase hex characters.
    pub fn generate_salt(&mut self) -> String {
        let mut bytes = [0u8; SALT_LEN / 2];
        self.rng.fill_bytes(&mut bytes);
        hex::encode_upper(bytes)
    }
}

impl Default for Authenticator {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the expected digest: uppercase hex of `SHA256(salt ++ secret)`.
pub fn digest_hex(salt: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode_upper(hasher.finalize())
}

/// Verify a submitted digest against the salt and the stored secret.
///
/// The submitted digest must be exactly 64 hex characters; comparison is
/// case-insensitive.
pub fn verify(submitted: &str, salt: &str, secret: &str) -> bool {
    if !is_hex_string(submitted, DIGEST_LEN) {
        return false;
    }
    submitted.eq_ignore_ascii_case(&digest_hex(salt, secret))
}

/// Check that a string is exactly `expected_len` hex characters.
pub fn is_hex_string(s: &str, expected_len: usize) -> bool {
    s.len() == expected_len && s.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salt_format() {
        let mut auth = Authenticator::from_seed(7);
        let salt = auth.generate_salt();
        assert_eq!(salt.len(), SALT_LEN);
        assert!(salt
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b)));
    }

    #[test]
    fn test_salt_is_fresh_per_attempt() {
        let mut auth = Authenticator::from_seed(7);
        assert_ne!(auth.generate_salt(), auth.generate_salt());
    }

    #[test]
    fn test_verify_round_trip() {
        let digest = digest_hex("00DEADBEEF00CAFE", "pw1");
        assert!(verify(&digest, "00DEADBEEF00CAFE", "pw1"));
    }

    #[test]
    fn test_verify_is_case_insensitive() {
        let digest = digest_hex("00DEADBEEF00CAFE", "pw1");
        assert!(verify(&digest.to_lowercase(), "00DEADBEEF00CAFE", "pw1"));
    }

    #[test]
    fn test_verify_rejects_wrong_salt_or_secret() {
        let digest = digest_hex("00DEADBEEF00CAFE", "pw1");
        assert!(!verify(&digest, "00DEADBEEF00CAFF", "pw1"));
        assert!(!verify(&digest, "00DEADBEEF00CAFE", "pw2"));
    }

    #[test]
    fn test_verify_rejects_malformed_digest() {
        assert!(!verify("", "00DEADBEEF00CAFE", "pw1"));
        assert!(!verify(&"A".repeat(63), "00DEADBEEF00CAFE", "pw1"));
        assert!(!verify(&"A".repeat(65), "00DEADBEEF00CAFE", "pw1"));
        // Right length, non-hex content.
        assert!(!verify(&"G".repeat(64), "00DEADBEEF00CAFE", "pw1"));
    }

    #[test]
    fn test_digest_is_uppercase_sha256() {
        // SHA256("abc") is a well-known vector; salt "ab" + secret "c".
        let digest = digest_hex("ab", "c");
        assert_eq!(
            digest,
            "BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD"
        );
    }

    #[test]
    fn test_is_hex_string() {
        assert!(is_hex_string("00ff00FF", 8));
        assert!(!is_hex_string("00ff00F", 8));
        assert!(!is_hex_string("00fg00FF", 8));
    }
}
