//! PoW Ledger: a minimal proof-of-work ledger node in Rust
//!
//! This crate provides:
//! - Canonical, order-independent block hashing (SHA-256)
//! - A proof-of-work puzzle chained through consecutive proofs
//! - A ledger of blocks plus a pending-transaction pool
//! - Chain validation with lenient and strict policies
//! - A peer registry and longest-valid-chain consensus
//! - An HTTP API exposing the node
//!
//! # Example
//!
//! ```rust
//! use pow_ledger::core::{is_valid_chain, Ledger};
//! use pow_ledger::mining::Miner;
//!
//! let mut ledger = Ledger::new();
//! ledger.new_transaction("alice", "bob", 5);
//!
//! let miner = Miner::new("node-1");
//! let (block, stats) = miner.mine_block(&mut ledger);
//! println!("Mined block {} in {}ms", block.index, stats.time_ms);
//!
//! assert!(is_valid_chain(ledger.chain()));
//! ```

pub mod api;
pub mod config;
pub mod core;
pub mod crypto;
pub mod mining;
pub mod network;

// Re-export commonly used types
pub use api::{create_router, ApiState};
pub use config::{ConfigError, NodeConfig};
pub use core::{Block, ChainSnapshot, ChainValidator, Ledger, Transaction, ValidationPolicy};
pub use mining::{find_proof, valid_proof, Miner};
pub use network::{ConsensusResolver, Node, PeerRegistry};
