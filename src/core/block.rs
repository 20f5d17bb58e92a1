//! Block implementation for the ledger
//!
//! A block seals an ordered batch of transactions together with the proof
//! that was found against its predecessor's proof.

use crate::core::transaction::Transaction;
use crate::crypto::Canonical;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Proof carried by the genesis block
pub const GENESIS_PROOF: u64 = 100;

/// `previous_hash` sentinel of the genesis block
pub const GENESIS_PREVIOUS_HASH: &str = "1";

/// A sealed block in the chain
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Block {
    /// Position in the chain, starting at 1
    pub index: u64,
    /// Seconds since the Unix epoch
    pub timestamp: f64,
    /// Transactions in submission order
    pub transactions: Vec<Transaction>,
    /// Proof of work found against the previous block's proof
    pub proof: u64,
    /// Hash of the previous block
    pub previous_hash: String,
}

impl Block {
    /// Create a block stamped with the current time
    pub fn new(
        index: u64,
        transactions: Vec<Transaction>,
        proof: u64,
        previous_hash: String,
    ) -> Self {
        Self {
            index,
            timestamp: current_timestamp(),
            transactions,
            proof,
            previous_hash,
        }
    }

    /// Create the genesis block
    pub fn genesis() -> Self {
        Self::new(
            1,
            Vec::new(),
            GENESIS_PROOF,
            GENESIS_PREVIOUS_HASH.to_string(),
        )
    }

    /// Whether this block carries the genesis sentinel values
    pub fn is_genesis(&self) -> bool {
        self.index == 1
            && self.proof == GENESIS_PROOF
            && self.previous_hash == GENESIS_PREVIOUS_HASH
    }

    /// SHA-256 over the canonical encoding of every field, as lowercase hex
    pub fn hash(&self) -> String {
        self.canonical_hash()
    }

    /// Get number of transactions in this block
    pub fn tx_count(&self) -> usize {
        self.transactions.len()
    }
}

impl Canonical for Block {
    fn canonical_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("index".to_string(), Value::from(self.index));
        map.insert(
            "previous_hash".to_string(),
            Value::from(self.previous_hash.as_str()),
        );
        map.insert("proof".to_string(), Value::from(self.proof));
        map.insert("timestamp".to_string(), Value::from(self.timestamp));
        map.insert(
            "transactions".to_string(),
            Value::Array(
                self.transactions
                    .iter()
                    .map(Canonical::canonical_value)
                    .collect(),
            ),
        );
        Value::Object(map)
    }
}

/// Current time as fractional seconds since the Unix epoch (microsecond precision)
pub fn current_timestamp() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_block() -> Block {
        Block {
            index: 2,
            timestamp: 1_700_000_000.5,
            transactions: vec![
                Transaction::reward("node", 1),
                Transaction::new("alice", "b\u{f3}b", 5),
            ],
            proof: 35293,
            previous_hash: "abc".to_string(),
        }
    }

    #[test]
    fn test_genesis_block() {
        let genesis = Block::genesis();
        assert_eq!(genesis.index, 1);
        assert_eq!(genesis.proof, GENESIS_PROOF);
        assert_eq!(genesis.previous_hash, GENESIS_PREVIOUS_HASH);
        assert!(genesis.transactions.is_empty());
        assert!(genesis.is_genesis());
        assert!(genesis.timestamp > 0.0);
    }

    #[test]
    fn test_canonical_json_layout() {
        let genesis = Block {
            index: 1,
            timestamp: 1_700_000_000.0,
            transactions: vec![],
            proof: GENESIS_PROOF,
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
        };
        assert_eq!(
            genesis.canonical_json(),
            concat!(
                r#"{"index": 1, "previous_hash": "1", "proof": 100, "#,
                r#""timestamp": 1700000000.0, "transactions": []}"#
            )
        );
        assert_eq!(
            genesis.hash(),
            "525afe96d81a5e16082be3818542c9dab09537ac6e961295c671877fcb12a431"
        );
    }

    #[test]
    fn test_known_hash() {
        assert_eq!(
            sample_block().hash(),
            "66f366e758d5e3fd25b868d8dd0025d4ec299d7b2ea6864fdd5338ab11844bab"
        );
    }

    #[test]
    fn test_hash_is_deterministic() {
        let block = sample_block();
        assert_eq!(block.hash(), block.hash());

        // Built independently, same content
        let twin: Block = serde_json::from_value(serde_json::json!({
            "previous_hash": "abc",
            "proof": 35293,
            "transactions": [
                {"amount": 1, "sender": "0", "recipient": "node"},
                {"recipient": "b\u{f3}b", "amount": 5, "sender": "alice"}
            ],
            "timestamp": 1_700_000_000.5,
            "index": 2
        }))
        .unwrap();
        assert_eq!(block.hash(), twin.hash());
    }

    #[test]
    fn test_hash_covers_every_field() {
        let original = sample_block().hash();

        let mut block = sample_block();
        block.index += 1;
        assert_ne!(block.hash(), original);

        let mut block = sample_block();
        block.timestamp += 0.000001;
        assert_ne!(block.hash(), original);

        let mut block = sample_block();
        block.proof += 1;
        assert_ne!(block.hash(), original);

        let mut block = sample_block();
        block.previous_hash.push('0');
        assert_ne!(block.hash(), original);

        let mut block = sample_block();
        block.transactions[1].amount = 6;
        assert_ne!(block.hash(), original);

        let mut block = sample_block();
        block.transactions.swap(0, 1);
        assert_ne!(block.hash(), original);
    }

    #[test]
    fn test_wire_round_trip_preserves_hash() {
        let block = sample_block();
        let json = serde_json::to_string(&block).unwrap();
        let decoded: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, block);
        assert_eq!(decoded.hash(), block.hash());
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let json = concat!(
            r#"{"index":1,"timestamp":1.0,"transactions":[],"#,
            r#""proof":100,"previous_hash":"1","nonce":7}"#
        );
        assert!(serde_json::from_str::<Block>(json).is_err());
    }
}
