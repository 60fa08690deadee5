//! Hashing helpers for the admin key check.

use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input and returns it as a hex string.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Checks a presented admin key against the configured one.
///
/// Both sides are hashed first so the comparison always runs over two
/// 64-byte digests, independent of the presented key's length. An empty
/// configured key never matches.
pub fn verify_admin_key(presented: &str, configured: &str) -> bool {
    if configured.is_empty() {
        return false;
    }

    let presented = sha256_hex(presented);
    let configured = sha256_hex(configured);

    presented
        .bytes()
        .zip(configured.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
