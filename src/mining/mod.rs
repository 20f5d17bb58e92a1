//! Mining module: the proof-of-work puzzle and the miner that solves it

pub mod miner;
pub mod pow;

pub use miner::{Miner, MiningStats, DEFAULT_MINING_REWARD};
pub use pow::{
    find_proof, valid_proof, ProofSearch, SearchOutcome, CANCEL_POLL_INTERVAL,
    PROOF_DIFFICULTY_BITS,
};
