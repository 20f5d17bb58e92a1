//! Proof-of-work puzzle
//!
//! A proof is valid when SHA-256 over the decimal text of the previous proof
//! followed by the candidate starts with [`PROOF_DIFFICULTY_BITS`] zero bits
//! (four `0` hex digits). The difficulty is fixed.
//!
//! [`ProofSearch`] walks candidates upward from zero. It keeps its position
//! between calls, so a search can run in bounded slices and it checks a
//! cancellation token while running unattended.

use crate::crypto::{meets_difficulty, sha256};
use std::fmt::Write;
use tokio_util::sync::CancellationToken;

/// Leading zero bits a proof hash must have
pub const PROOF_DIFFICULTY_BITS: u32 = 16;

/// Candidates tried between two cancellation checks
pub const CANCEL_POLL_INTERVAL: u64 = 1024;

/// Check whether `proof` solves the puzzle posed by `last_proof`
pub fn valid_proof(last_proof: u64, proof: u64) -> bool {
    let mut guess = String::with_capacity(40);
    let _ = write!(guess, "{}{}", last_proof, proof);
    meets_difficulty(&sha256(guess.as_bytes()), PROOF_DIFFICULTY_BITS)
}

/// Find the smallest proof for `last_proof`.
///
/// Runs to completion; use [`ProofSearch::run`] when the search must be
/// abortable.
pub fn find_proof(last_proof: u64) -> u64 {
    let mut search = ProofSearch::new(last_proof);
    loop {
        if let Some(proof) = search.step(u64::MAX) {
            return proof;
        }
    }
}

/// Result of a cancellable search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A valid proof was found
    Found(u64),
    /// The token was cancelled before a proof was found
    Cancelled,
}

/// Resumable linear search over candidate proofs
#[derive(Debug, Clone)]
pub struct ProofSearch {
    last_proof: u64,
    next_candidate: u64,
    attempts: u64,
    guess: String,
}

impl ProofSearch {
    pub fn new(last_proof: u64) -> Self {
        Self {
            last_proof,
            next_candidate: 0,
            attempts: 0,
            guess: String::with_capacity(40),
        }
    }

    /// The proof this search is solving against
    pub fn last_proof(&self) -> u64 {
        self.last_proof
    }

    /// Candidates hashed so far
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Next candidate that will be tried
    pub fn next_candidate(&self) -> u64 {
        self.next_candidate
    }

    /// Try at most `budget` candidates, returning the first valid one.
    pub fn step(&mut self, budget: u64) -> Option<u64> {
        for _ in 0..budget {
            let candidate = self.next_candidate;
            self.next_candidate = self.next_candidate.checked_add(1)?;
            self.attempts += 1;

            self.guess.clear();
            let _ = write!(self.guess, "{}{}", self.last_proof, candidate);
            if meets_difficulty(&sha256(self.guess.as_bytes()), PROOF_DIFFICULTY_BITS) {
                return Some(candidate);
            }
        }
        None
    }

    /// Search until a proof is found or `cancel` fires.
    ///
    /// The token is polled every [`CANCEL_POLL_INTERVAL`] candidates.
    pub fn run(&mut self, cancel: &CancellationToken) -> SearchOutcome {
        loop {
            if cancel.is_cancelled() {
                return SearchOutcome::Cancelled;
            }
            if let Some(proof) = self.step(CANCEL_POLL_INTERVAL) {
                return SearchOutcome::Found(proof);
            }
            if self.next_candidate == u64::MAX {
                // Candidate space exhausted; unreachable at this difficulty
                log::warn!("Proof search for {} exhausted", self.last_proof);
                return SearchOutcome::Cancelled;
            }
        }
    }
}
