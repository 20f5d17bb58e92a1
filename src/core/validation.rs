//! Chain validation
//!
//! Checks that an arbitrary sequence of blocks links by hash and that every
//! proof solves the puzzle posed by its predecessor. Used on the local chain
//! and on every chain a peer offers during consensus.

use crate::core::block::Block;
use crate::mining::pow::valid_proof;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a chain is rejected. Positions are 0-based offsets into the chain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("Block at position {position} does not reference the hash of its predecessor")]
    BrokenLink { position: usize },
    #[error("Block at position {position} carries an invalid proof of work")]
    InvalidProof { position: usize },
    #[error("Block at position {position} has index {found}, expected {expected}")]
    IndexMismatch {
        position: usize,
        expected: u64,
        found: u64,
    },
    #[error("First block is not a genesis block")]
    InvalidGenesis,
}

/// Which rules the validator enforces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPolicy {
    /// Hash links and proofs only
    Lenient,
    /// Also require sequential indices from 1 and a genesis first block
    #[default]
    Strict,
}

/// Validates chains under a [`ValidationPolicy`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainValidator {
    policy: ValidationPolicy,
}

impl ChainValidator {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    /// Validate the chain, reporting the first violation found
    pub fn validate(&self, chain: &[Block]) -> Result<(), ChainError> {
        if self.policy == ValidationPolicy::Strict {
            if let Some(first) = chain.first() {
                if !first.is_genesis() {
                    return Err(ChainError::InvalidGenesis);
                }
            }
        }

        for (position, pair) in chain.windows(2).enumerate() {
            let (previous, current) = (&pair[0], &pair[1]);
            let position = position + 1;

            if current.previous_hash != previous.hash() {
                return Err(ChainError::BrokenLink { position });
            }

            if !valid_proof(previous.proof, current.proof) {
                return Err(ChainError::InvalidProof { position });
            }

            if self.policy == ValidationPolicy::Strict {
                let expected = previous.index.saturating_add(1);
                if current.index != expected {
                    return Err(ChainError::IndexMismatch {
                        position,
                        expected,
                        found: current.index,
                    });
                }
            }
        }

        Ok(())
    }

    pub fn is_valid(&self, chain: &[Block]) -> bool {
        self.validate(chain).is_ok()
    }
}

/// Check hash links and proofs of `chain`.
///
/// Empty and single-block chains are valid.
pub fn is_valid_chain(chain: &[Block]) -> bool {
    ChainValidator::new(ValidationPolicy::Lenient).is_valid(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Ledger, Transaction};
    use crate::mining::pow::find_proof;

    fn build_chain(blocks: usize) -> Vec<Block> {
        let mut ledger = Ledger::new();
        for i in 1..blocks {
            ledger.new_transaction("alice", "bob", i as i64);
            ledger.new_transaction("bob", "carol", -(i as i64));
            let proof = find_proof(ledger.last_block().proof);
            ledger.new_block(proof, None);
        }
        ledger.chain().to_vec()
    }

    #[test]
    fn test_short_chains_are_valid() {
        assert!(is_valid_chain(&[]));
        assert!(is_valid_chain(&[Block::genesis()]));
        assert!(ChainValidator::default().is_valid(&[]));
    }

    #[test]
    fn test_mined_chain_is_valid() {
        let chain = build_chain(4);
        assert!(is_valid_chain(&chain));
        assert_eq!(ChainValidator::default().validate(&chain), Ok(()));
    }

    #[test]
    fn test_tampered_transaction_detected() {
        let mut chain = build_chain(4);
        chain[1].transactions[0].amount = 1_000_000;
        assert!(!is_valid_chain(&chain));
        assert_eq!(
            ChainValidator::default().validate(&chain),
            Err(ChainError::BrokenLink { position: 2 })
        );
    }

    #[test]
    fn test_inserted_transaction_detected() {
        let mut chain = build_chain(3);
        chain[1]
            .transactions
            .push(Transaction::new("mallory", "mallory", 99));
        assert!(!is_valid_chain(&chain));
    }

    #[test]
    fn test_tampered_proof_detected() {
        let mut chain = build_chain(4);
        chain[2].proof += 1;
        assert!(!is_valid_chain(&chain));
    }

    #[test]
    fn test_tampered_previous_hash_detected() {
        let mut chain = build_chain(4);
        chain[1].previous_hash = "0".repeat(64);
        assert_eq!(
            ChainValidator::default().validate(&chain),
            Err(ChainError::BrokenLink { position: 1 })
        );
    }

    #[test]
    fn test_terminal_block_proof_checked() {
        let mut chain = build_chain(3);
        let last = chain.len() - 1;
        chain[last].proof += 1;
        assert_eq!(
            ChainValidator::default().validate(&chain),
            Err(ChainError::InvalidProof { position: last })
        );
    }

    #[test]
    fn test_index_gap_only_rejected_when_strict() {
        let mut chain = build_chain(2);
        chain[1].index = 7;

        assert!(is_valid_chain(&chain));
        assert_eq!(
            ChainValidator::new(ValidationPolicy::Strict).validate(&chain),
            Err(ChainError::IndexMismatch {
                position: 1,
                expected: 2,
                found: 7
            })
        );
    }

    #[test]
    fn test_non_genesis_start_only_rejected_when_strict() {
        let chain = build_chain(3);
        let tail = &chain[1..];

        assert!(is_valid_chain(tail));
        assert_eq!(
            ChainValidator::new(ValidationPolicy::Strict).validate(tail),
            Err(ChainError::InvalidGenesis)
        );
    }

    #[test]
    fn test_policy_from_config_text() {
        let policy: ValidationPolicy = serde_json::from_str(r#""lenient""#).unwrap();
        assert_eq!(policy, ValidationPolicy::Lenient);
        assert_eq!(ValidationPolicy::default(), ValidationPolicy::Strict);
    }
}
