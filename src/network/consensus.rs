//! Longest-valid-chain consensus
//!
//! The resolver asks every known peer for its chain and adopts the longest
//! one that validates, provided it is strictly longer than the local chain.
//! Peer requests run without holding the ledger; only the final swap takes
//! the write lock.

use crate::core::{Block, ChainSnapshot, ChainValidator, Ledger};
use crate::network::client::ChainSource;
use crate::network::peer::PeerError;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Resolves divergence between the local chain and peer chains
pub struct ConsensusResolver {
    source: Arc<dyn ChainSource>,
    validator: ChainValidator,
}

impl ConsensusResolver {
    pub fn new(source: Arc<dyn ChainSource>, validator: ChainValidator) -> Self {
        Self { source, validator }
    }

    pub fn validator(&self) -> &ChainValidator {
        &self.validator
    }

    /// Run one consensus round over `peers`.
    ///
    /// Returns `true` if the ledger's chain was replaced. Unreachable peers,
    /// malformed answers and invalid chains are skipped.
    pub async fn resolve(&self, peers: &[String], ledger: &RwLock<Ledger>) -> bool {
        let local_length = ledger.read().await.length();

        let Some(candidate) = self.best_candidate(peers, local_length).await else {
            log::info!("Local chain of {} blocks is authoritative", local_length);
            return false;
        };

        let mut ledger = ledger.write().await;
        if candidate.len() <= ledger.length() {
            // The local chain grew while peers were being consulted
            log::info!(
                "Discarding candidate of {} blocks, local chain now has {}",
                candidate.len(),
                ledger.length()
            );
            return false;
        }

        let (previous, adopted) = (ledger.length(), candidate.len());
        match ledger.replace_chain(candidate) {
            Ok(()) => {
                log::info!(
                    "Replaced local chain of {} blocks with peer chain of {} blocks",
                    previous,
                    adopted
                );
                true
            }
            Err(e) => {
                log::warn!("Chain replacement rejected: {}", e);
                false
            }
        }
    }

    /// Fetch every peer's chain and pick the longest valid one that beats
    /// `local_length`. Among equally long chains the first peer wins.
    async fn best_candidate(&self, peers: &[String], local_length: usize) -> Option<Vec<Block>> {
        let responses = join_all(peers.iter().map(|peer| async move {
            (peer, self.source.fetch_chain(peer).await)
        }))
        .await;

        let mut max_length = local_length;
        let mut best = None;

        for (peer, response) in responses {
            let snapshot = match response.and_then(checked_snapshot) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    log::warn!("Skipping peer {}: {}", peer, e);
                    continue;
                }
            };

            if snapshot.length <= max_length {
                log::debug!(
                    "Peer {} chain of {} blocks is not longer than {}",
                    peer,
                    snapshot.length,
                    max_length
                );
                continue;
            }

            if let Err(e) = self.validator.validate(&snapshot.chain) {
                log::warn!("Rejecting chain from peer {}: {}", peer, e);
                continue;
            }

            log::info!("Peer {} offers a valid chain of {} blocks", peer, snapshot.length);
            max_length = snapshot.length;
            best = Some(snapshot.chain);
        }

        best
    }
}

/// A snapshot whose reported length disagrees with its chain is malformed
fn checked_snapshot(snapshot: ChainSnapshot) -> Result<ChainSnapshot, PeerError> {
    if snapshot.length != snapshot.chain.len() {
        return Err(PeerError::LengthMismatch {
            reported: snapshot.length,
            actual: snapshot.chain.len(),
        });
    }
    Ok(snapshot)
}
