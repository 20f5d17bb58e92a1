//! Mining engine for the ledger
//!
//! The miner runs the proof search against a snapshot of the last proof and
//! reports how much work it took. Sealing the block is left to the caller so
//! the search never has to hold the ledger.

use crate::core::{Block, Ledger, MINING_REWARD_SENDER};
use crate::mining::pow::{ProofSearch, SearchOutcome};
use log::info;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Default amount paid to a node for each block it mines
pub const DEFAULT_MINING_REWARD: i64 = 1;

/// Mining statistics
#[derive(Debug, Clone)]
pub struct MiningStats {
    /// Number of hash attempts
    pub hash_attempts: u64,
    /// Time taken in milliseconds
    pub time_ms: u128,
    /// Hash rate (hashes per second)
    pub hash_rate: f64,
}

impl MiningStats {
    fn measure(hash_attempts: u64, start: Instant) -> Self {
        let time_ms = start.elapsed().as_millis();
        let hash_rate = if time_ms > 0 {
            (hash_attempts as f64) / (time_ms as f64 / 1000.0)
        } else {
            hash_attempts as f64
        };

        Self {
            hash_attempts,
            time_ms,
            hash_rate,
        }
    }
}

/// Miner that pays its rewards to `address`
#[derive(Debug, Clone)]
pub struct Miner {
    /// Miner's address for receiving rewards
    pub address: String,
    /// Amount of the reward transaction
    pub reward: i64,
}

impl Miner {
    /// Create a new miner
    pub fn new(address: &str) -> Self {
        Self::with_reward(address, DEFAULT_MINING_REWARD)
    }

    pub fn with_reward(address: &str, reward: i64) -> Self {
        Self {
            address: address.to_string(),
            reward,
        }
    }

    /// Search for a proof without touching the ledger.
    ///
    /// Returns `None` if `cancel` fires first.
    pub fn search(
        &self,
        last_proof: u64,
        cancel: &CancellationToken,
    ) -> Option<(u64, MiningStats)> {
        let start = Instant::now();
        let mut search = ProofSearch::new(last_proof);

        info!("Searching for proof against {}...", last_proof);

        match search.run(cancel) {
            SearchOutcome::Found(proof) => {
                let stats = MiningStats::measure(search.attempts(), start);
                info!(
                    "Proof {} found in {}ms ({} attempts, {:.2} H/s)",
                    proof, stats.time_ms, stats.hash_attempts, stats.hash_rate
                );
                Some((proof, stats))
            }
            SearchOutcome::Cancelled => {
                info!(
                    "Proof search against {} cancelled after {} attempts",
                    last_proof,
                    search.attempts()
                );
                None
            }
        }
    }

    /// Append the reward transaction and seal the pool with `proof`
    pub fn seal<'a>(&self, ledger: &'a mut Ledger, proof: u64) -> &'a Block {
        ledger.new_transaction(MINING_REWARD_SENDER, self.address.as_str(), self.reward);
        let previous_hash = ledger.tip_hash();
        ledger.new_block(proof, Some(previous_hash))
    }

    /// Mine a block directly on an exclusively held ledger
    pub fn mine_block(&self, ledger: &mut Ledger) -> (Block, MiningStats) {
        let last_proof = ledger.last_block().proof;
        let start = Instant::now();
        let mut search = ProofSearch::new(last_proof);
        let proof = loop {
            if let Some(proof) = search.step(u64::MAX) {
                break proof;
            }
        };
        let stats = MiningStats::measure(search.attempts(), start);

        let block = self.seal(ledger, proof).clone();
        info!(
            "Block {} mined in {}ms ({} attempts)",
            block.index, stats.time_ms, stats.hash_attempts
        );
        (block, stats)
    }
}
