//! Peer registry
//!
//! Tracks the network locations of known peers. Entries are addresses only;
//! nothing here checks that a peer is reachable.

use std::collections::BTreeSet;
use thiserror::Error;
use tokio::sync::RwLock;
use url::Url;

/// Peer-related errors
#[derive(Error, Debug)]
pub enum PeerError {
    #[error("Invalid peer address: {0}")]
    InvalidAddress(String),
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Peer answered with status {0}")]
    BadStatus(u16),
    #[error("Malformed chain response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Reported length {reported} does not match chain of {actual} blocks")]
    LengthMismatch { reported: usize, actual: usize },
    #[error("Peer {0} is unreachable")]
    Unreachable(String),
}

/// Reduce an address to its canonical `host:port` form.
///
/// Accepts full URLs (`http://10.0.0.2:5000/path`) as well as bare
/// `host:port`. Scheme, credentials and path are discarded; a missing port is
/// filled in from the scheme's default.
pub fn normalize_address(address: &str) -> Result<String, PeerError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(PeerError::InvalidAddress(address.to_string()));
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    let url = Url::parse(&with_scheme)
        .map_err(|e| PeerError::InvalidAddress(format!("{}: {}", address, e)))?;

    let host = url
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| PeerError::InvalidAddress(address.to_string()))?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| PeerError::InvalidAddress(address.to_string()))?;

    Ok(format!("{}:{}", host, port))
}

/// Set of known peers, keyed by canonical address
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: RwLock<BTreeSet<String>>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a peer. Returns the canonical address it is stored under.
    pub async fn register(&self, address: &str) -> Result<String, PeerError> {
        let canonical = normalize_address(address)?;
        let mut peers = self.peers.write().await;
        if peers.insert(canonical.clone()) {
            log::info!("Registered peer: {}", canonical);
        }
        Ok(canonical)
    }

    /// Register several peers at once.
    ///
    /// Every address is checked first; if any is invalid nothing is added.
    pub async fn register_all<I, S>(&self, addresses: I) -> Result<Vec<String>, PeerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let canonical = addresses
            .into_iter()
            .map(|address| normalize_address(address.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut peers = self.peers.write().await;
        for address in &canonical {
            if peers.insert(address.clone()) {
                log::info!("Registered peer: {}", address);
            }
        }
        Ok(canonical)
    }

    /// Get all known peer addresses
    pub async fn peers(&self) -> Vec<String> {
        let peers = self.peers.read().await;
        peers.iter().cloned().collect()
    }

    /// Get peer count
    pub async fn len(&self) -> usize {
        self.peers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.peers.read().await.is_empty()
    }

    pub async fn contains(&self, address: &str) -> bool {
        match normalize_address(address) {
            Ok(canonical) => self.peers.read().await.contains(&canonical),
            Err(_) => false,
        }
    }
}
