//! Peer networking and consensus
//!
//! # Features
//! - Peer registry keyed by canonical `host:port`
//! - Chain retrieval from peers over HTTP
//! - Longest-valid-chain conflict resolution
//! - The node that serializes mining and consensus around one ledger lock

pub mod client;
pub mod consensus;
pub mod node;
pub mod peer;

pub use client::{ChainSource, HttpChainSource, CHAIN_PATH, DEFAULT_PEER_TIMEOUT};
#[cfg(test)]
pub use client::MemoryChainSource;
pub use consensus::ConsensusResolver;
pub use node::{Node, NodeError};
pub use peer::{normalize_address, PeerError, PeerRegistry};
