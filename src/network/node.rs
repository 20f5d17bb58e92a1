//! Ledger node
//!
//! The node owns the single ledger lock and exposes the operations the request
//! layer calls. Two rules keep it responsive:
//! - proof searches and peer requests never run under the ledger lock;
//! - at most one search and one consensus round are in flight at a time.
//!
//! Mining snapshots the tip, searches on a blocking thread, then re-checks
//! the tip before sealing. A proof found against a tip that has since moved
//! is discarded and the search restarts. A chain replacement cancels any
//! search in progress.

use crate::config::NodeConfig;
use crate::core::{
    Block, ChainSnapshot, ChainValidator, Ledger, LedgerError, ValidationPolicy,
};
use crate::mining::{Miner, MiningStats};
use crate::network::client::{ChainSource, HttpChainSource};
use crate::network::consensus::ConsensusResolver;
use crate::network::peer::{PeerError, PeerRegistry};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

/// Node-level errors
#[derive(Error, Debug)]
pub enum NodeError {
    #[error("Peer error: {0}")]
    Peer(#[from] PeerError),
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("Mining task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("Node is shutting down")]
    ShuttingDown,
}

/// The tip a proof search was started from
#[derive(Debug, Clone, PartialEq, Eq)]
struct TipSnapshot {
    last_proof: u64,
    hash: String,
}

impl TipSnapshot {
    fn of(ledger: &Ledger) -> Self {
        Self {
            last_proof: ledger.last_block().proof,
            hash: ledger.tip_hash(),
        }
    }
}

/// Publishes a search token for the lifetime of one search.
///
/// Dropping the guard clears the slot. Unless the search finished, it also
/// cancels the token, so a search whose caller went away stops too.
struct ActiveSearch<'a> {
    slot: &'a StdMutex<Option<CancellationToken>>,
    token: CancellationToken,
    finished: bool,
}

impl<'a> ActiveSearch<'a> {
    fn publish(slot: &'a StdMutex<Option<CancellationToken>>, token: CancellationToken) -> Self {
        if let Ok(mut active) = slot.lock() {
            *active = Some(token.clone());
        }
        Self {
            slot,
            token,
            finished: false,
        }
    }

    fn finish(mut self) {
        self.finished = true;
    }
}

impl Drop for ActiveSearch<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.token.cancel();
        }
        if let Ok(mut active) = self.slot.lock() {
            *active = None;
        }
    }
}

/// A ledger node
pub struct Node {
    config: NodeConfig,
    node_id: String,
    ledger: Arc<RwLock<Ledger>>,
    peers: PeerRegistry,
    resolver: ConsensusResolver,
    miner: Miner,
    /// Held for the whole of a mining attempt
    mining: Mutex<()>,
    /// Held for the whole of a consensus round
    consensus: Mutex<()>,
    /// Cancels the search currently in flight
    active_search: StdMutex<Option<CancellationToken>>,
    shutdown: CancellationToken,
}

impl Node {
    /// Create a node that retrieves peer chains over HTTP
    pub async fn new(config: NodeConfig) -> Result<Self, NodeError> {
        let source = HttpChainSource::new(Duration::from_millis(config.peer_timeout_ms))?;
        Self::with_source(config, Arc::new(source)).await
    }

    /// Create a node with a custom chain source
    pub async fn with_source(
        config: NodeConfig,
        source: Arc<dyn ChainSource>,
    ) -> Result<Self, NodeError> {
        let node_id = config.node_id.clone().unwrap_or_else(generate_node_id);
        let policy = if config.strict_validation {
            ValidationPolicy::Strict
        } else {
            ValidationPolicy::Lenient
        };

        let peers = PeerRegistry::new();
        peers.register_all(&config.bootstrap_peers).await?;

        log::info!("Node {} created ({:?} chain validation)", node_id, policy);

        Ok(Self {
            miner: Miner::with_reward(&node_id, config.mining_reward),
            resolver: ConsensusResolver::new(source, ChainValidator::new(policy)),
            ledger: Arc::new(RwLock::new(Ledger::new())),
            peers,
            config,
            node_id,
            mining: Mutex::new(()),
            consensus: Mutex::new(()),
            active_search: StdMutex::new(None),
            shutdown: CancellationToken::new(),
        })
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Identifier mining rewards are paid to
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Shared handle to the ledger
    pub fn ledger(&self) -> Arc<RwLock<Ledger>> {
        self.ledger.clone()
    }

    /// Queue a transaction. Returns the index of the block it will land in.
    pub async fn submit_transaction(&self, sender: &str, recipient: &str, amount: i64) -> u64 {
        let mut ledger = self.ledger.write().await;
        let index = ledger.new_transaction(sender, recipient, amount);
        log::debug!(
            "Queued transaction {} -> {} ({}) for block {}",
            sender,
            recipient,
            amount,
            index
        );
        index
    }

    /// Current chain and its length
    pub async fn get_chain(&self) -> ChainSnapshot {
        self.ledger.read().await.snapshot()
    }

    /// Register peer addresses; all are rejected if any is malformed
    pub async fn register_peers<I, S>(&self, addresses: I) -> Result<Vec<String>, NodeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(self.peers.register_all(addresses).await?)
    }

    /// All known peers
    pub async fn peers(&self) -> Vec<String> {
        self.peers.peers().await
    }

    /// Mine a block: search for a proof, pay the reward, seal the pool.
    pub async fn mine(&self) -> Result<(Block, MiningStats), NodeError> {
        let _mining = self.mining.lock().await;

        loop {
            if self.shutdown.is_cancelled() {
                return Err(NodeError::ShuttingDown);
            }

            // Published before the tip is read, so a replacement landing
            // after the read always finds the token to cancel.
            let token = self.shutdown.child_token();
            let search = ActiveSearch::publish(&self.active_search, token.clone());
            let tip = TipSnapshot::of(&*self.ledger.read().await);

            let miner = self.miner.clone();
            let last_proof = tip.last_proof;
            let found =
                tokio::task::spawn_blocking(move || miner.search(last_proof, &token)).await;
            search.finish();

            let Some((proof, stats)) = found? else {
                log::info!("Search against {} was interrupted, retrying", tip.last_proof);
                continue;
            };

            if let Some(block) = self.commit(&tip, proof).await {
                return Ok((block, stats));
            }
        }
    }

    /// Seal a block with `proof` if the tip is still the one it was found for
    async fn commit(&self, tip: &TipSnapshot, proof: u64) -> Option<Block> {
        let mut ledger = self.ledger.write().await;
        if TipSnapshot::of(&ledger) != *tip {
            log::warn!(
                "Discarding stale proof {} (tip moved from {})",
                proof,
                tip.last_proof
            );
            return None;
        }

        let block = self.miner.seal(&mut ledger, proof).clone();
        log::info!(
            "New block {} forged with {} transactions",
            block.index,
            block.tx_count()
        );
        Some(block)
    }

    /// Run consensus against all known peers.
    ///
    /// Returns whether the chain was replaced, and the chain afterwards.
    pub async fn run_consensus(&self) -> (bool, ChainSnapshot) {
        let _consensus = self.consensus.lock().await;

        let peers = self.peers.peers().await;
        let replaced = self.resolver.resolve(&peers, &self.ledger).await;
        if replaced {
            self.cancel_active_search();
        }

        (replaced, self.get_chain().await)
    }

    fn cancel_active_search(&self) {
        let active = match self.active_search.lock() {
            Ok(mut active) => active.take(),
            Err(_) => None,
        };
        if let Some(token) = active {
            log::info!("Cancelling proof search made stale by chain replacement");
            token.cancel();
        }
    }

    /// Stop any search in progress and refuse further mining
    pub fn shutdown(&self) {
        log::info!("Node {} shutting down", self.node_id);
        self.shutdown.cancel();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

/// Random 32-hex-character node identifier
fn generate_node_id() -> String {
    hex::encode(rand::random::<[u8; 16]>())
}
