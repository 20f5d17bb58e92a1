//! Cryptographic hashing utilities for the ledger
//!
//! Provides the SHA-256 helpers used for block hashes and proof-of-work
//! checks.

use sha2::{Digest, Sha256};

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Computes SHA-256 hash and returns it as a lowercase hex string
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Checks if a hash meets the difficulty target
/// The hash must have `difficulty` leading zero bits
pub fn meets_difficulty(hash: &[u8], difficulty: u32) -> bool {
    let required_zeros = difficulty as usize / 8;
    let remaining_bits = difficulty as usize % 8;

    if hash.len() < required_zeros {
        return false;
    }

    // Check full zero bytes
    if hash.iter().take(required_zeros).any(|byte| *byte != 0) {
        return false;
    }

    // Check remaining bits
    if remaining_bits > 0 {
        let mask = 0xFFu8 << (8 - remaining_bits);
        match hash.get(required_zeros) {
            Some(byte) if byte & mask != 0 => return false,
            None => return false,
            _ => {}
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256() {
        let data = b"hello world";
        let hash = sha256(data);
        assert_eq!(hash.len(), 32);
        assert_eq!(
            sha256_hex(data),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_meets_difficulty() {
        let hash = vec![0x00, 0x00, 0x0F, 0xFF, 0xFF, 0xFF];
        assert!(meets_difficulty(&hash, 16)); // 16 bits = 2 bytes of zeros
        assert!(meets_difficulty(&hash, 12)); // 12 bits = 1.5 bytes of zeros
        assert!(meets_difficulty(&hash, 20));
        assert!(!meets_difficulty(&hash, 21));
        assert!(!meets_difficulty(&hash, 24)); // Need 3 bytes of zeros
    }

    #[test]
    fn test_difficulty_on_short_input() {
        assert!(!meets_difficulty(&[0x00], 16));
        assert!(!meets_difficulty(&[0x00], 12));
        assert!(meets_difficulty(&[], 0));
    }

    #[test]
    fn test_sixteen_bits_match_four_hex_zeros() {
        let hash = [0x00, 0x00, 0x9a, 0x10];
        assert!(hex::encode(hash).starts_with("0000"));
        assert!(meets_difficulty(&hash, 16));

        let hash = [0x00, 0x01, 0x9a, 0x10];
        assert!(!hex::encode(hash).starts_with("0000"));
        assert!(!meets_difficulty(&hash, 16));
    }
}
