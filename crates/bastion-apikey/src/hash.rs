//! Credential hashing.

use sha2::{Digest, Sha256};

/// SHA-256 digest of a raw API key, including its `ptr_` marker.
///
/// The digest is the only persisted form of the secret.
pub fn hash_raw(raw_key: &str) -> Vec<u8> {
    Sha256::digest(raw_key.as_bytes()).to_vec()
}
