//! Deterministic hashing of canonical artifacts.
//!
//! Digests are lowercase hex over canonical JSON bytes, so they are stable
//! across platforms and runs with the same allocation.

use serde::Serialize;
use sha2::{Digest, Sha256};

use adm_engine::FinalAllocation;

use crate::canonical_json::to_canonical_bytes;
use crate::IoResult;

/// SHA-256 over raw bytes, lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// SHA-256 over the canonical JSON bytes of any serializable value.
pub fn sha256_canonical<T: Serialize>(value: &T) -> IoResult<String> {
    Ok(sha256_hex(&to_canonical_bytes(value)?))
}

/// Digest of a terminal allocation.
pub fn allocation_digest(allocation: &FinalAllocation) -> IoResult<String> {
    sha256_canonical(allocation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn digest_is_64_lower_hex() {
        let d = sha256_hex(b"abc");
        assert_eq!(d.len(), 64);
        assert!(d.bytes().all(|c| matches!(c, b'0'..=b'9' | b'a'..=b'f')));
        // Known vector for "abc".
        assert_eq!(
            d,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn key_order_does_not_change_the_digest() {
        let a = sha256_canonical(&json!({"x": 1, "y": 2})).unwrap();
        let b = sha256_canonical(&json!({"y": 2, "x": 1})).unwrap();
        assert_eq!(a, b);
    }
}
