//! Cryptographic utilities for the ledger
//!
//! This module provides:
//! - SHA-256 hashing
//! - Canonical JSON encoding for hashing records

pub mod canonical;
pub mod hash;

pub use canonical::Canonical;
pub use hash::{meets_difficulty, sha256, sha256_hex};
