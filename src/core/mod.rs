//! Core ledger components
//!
//! This module contains the fundamental building blocks:
//! - Transactions (plain sender/recipient/amount records)
//! - Blocks (canonically hashed, carrying a proof of work)
//! - Ledger (chain plus pending-transaction pool)
//! - Chain validation

pub mod block;
pub mod ledger;
pub mod transaction;
pub mod validation;

pub use block::{current_timestamp, Block, GENESIS_PREVIOUS_HASH, GENESIS_PROOF};
pub use ledger::{ChainSnapshot, Ledger, LedgerError};
pub use transaction::{Transaction, MINING_REWARD_SENDER};
pub use validation::{is_valid_chain, ChainError, ChainValidator, ValidationPolicy};
