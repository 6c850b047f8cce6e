//! Password hashing over bcrypt.
//!
//! The work factor comes from [`crate::AuthConfig::hash_cost`] (reference
//! cost 12). Plaintext never leaves these functions and is never logged.

use anyhow::Context;

use crate::error::AuthError;

/// Hash a plaintext password with the given bcrypt cost.
pub fn hash(plaintext: &str, cost: u32) -> Result<String, AuthError> {
    bcrypt::hash(plaintext, cost)
        .context("failed to hash password")
        .map_err(AuthError::Unavailable)
}

/// Verify a plaintext password against a stored digest.
///
/// Comparison timing is handled by the bcrypt primitive. A malformed stored
/// digest is an infrastructure failure, never a caller-facing kind.
pub fn verify(plaintext: &str, digest: &str) -> Result<bool, AuthError> {
    bcrypt::verify(plaintext, digest)
        .context("failed to verify password digest")
        .map_err(AuthError::Unavailable)
}

#[cfg(test)]
mod tests {
    use super::{hash, verify};
    use crate::error::AuthError;

    // minimum cost bcrypt accepts; keeps the tests fast
    const TEST_COST: u32 = 4;

    #[test]
    fn hash_then_verify_round_trip() {
        let digest = hash("Passw0rd!", TEST_COST).expect("hashing succeeds");
        assert_ne!(digest, "Passw0rd!");
        assert!(verify("Passw0rd!", &digest).expect("verify succeeds"));
        assert!(!verify("wrong", &digest).expect("verify succeeds"));
    }

    #[test]
    fn same_password_hashes_differently() {
        let first = hash("Passw0rd!", TEST_COST).expect("hashing succeeds");
        let second = hash("Passw0rd!", TEST_COST).expect("hashing succeeds");
        // salted: equal inputs must not produce equal digests
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_digest_is_internal_error() {
        let err = verify("Passw0rd!", "not-a-bcrypt-digest").unwrap_err();
        assert!(matches!(err, AuthError::Unavailable(_)));
    }
}
