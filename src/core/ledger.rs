//! Ledger implementation
//!
//! The ledger owns the chain and the pool of pending transactions. A freshly
//! constructed ledger holds exactly the genesis block and the chain is never
//! empty afterwards.

use crate::core::block::{Block, GENESIS_PREVIOUS_HASH, GENESIS_PROOF};
use crate::core::transaction::Transaction;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ledger-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Replacement chain is empty")]
    EmptyChain,
}

/// A chain together with its length, as exchanged between peers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub chain: Vec<Block>,
    pub length: usize,
}

impl ChainSnapshot {
    pub fn new(chain: Vec<Block>) -> Self {
        let length = chain.len();
        Self { chain, length }
    }
}

/// The chain plus the pending-transaction pool
#[derive(Debug, Clone)]
pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
}

impl Ledger {
    /// Create a ledger holding only the genesis block
    pub fn new() -> Self {
        let mut ledger = Self {
            chain: Vec::new(),
            pending: Vec::new(),
        };
        ledger.new_block(GENESIS_PROOF, Some(GENESIS_PREVIOUS_HASH.to_string()));
        ledger
    }

    /// Queue a transaction for the next block.
    ///
    /// Returns the index of the block it will be sealed into.
    pub fn new_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: i64,
    ) -> u64 {
        self.pending.push(Transaction::new(sender, recipient, amount));
        self.next_index()
    }

    /// Seal the pending pool into a new block and append it.
    ///
    /// `previous_hash` defaults to the hash of the current last block. The
    /// caller is responsible for `proof` solving the last block's proof.
    pub fn new_block(&mut self, proof: u64, previous_hash: Option<String>) -> &Block {
        let previous_hash = match previous_hash {
            Some(hash) => hash,
            None => self.tip_hash(),
        };

        let block = Block::new(
            self.next_index(),
            std::mem::take(&mut self.pending),
            proof,
            previous_hash,
        );
        self.chain.push(block);
        self.last_block()
    }

    /// Get the latest block
    pub fn last_block(&self) -> &Block {
        self.chain
            .last()
            .expect("Ledger should have at least the genesis block")
    }

    /// Hash of the latest block
    pub fn tip_hash(&self) -> String {
        self.chain.last().map(Block::hash).unwrap_or_default()
    }

    /// Number of blocks in the chain
    pub fn length(&self) -> usize {
        self.chain.len()
    }

    /// Index the next sealed block will get
    pub fn next_index(&self) -> u64 {
        self.chain.len() as u64 + 1
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    /// Transactions waiting for the next block
    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    /// Copy of the chain and its length
    pub fn snapshot(&self) -> ChainSnapshot {
        ChainSnapshot::new(self.chain.clone())
    }

    /// Swap in a whole new chain.
    ///
    /// Validation is the caller's job; this only keeps the ledger non-empty.
    /// Pending transactions are kept.
    pub fn replace_chain(&mut self, chain: Vec<Block>) -> Result<(), LedgerError> {
        if chain.is_empty() {
            return Err(LedgerError::EmptyChain);
        }
        self.chain = chain;
        Ok(())
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
