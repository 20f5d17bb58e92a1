//! Transaction record for the ledger
//!
//! A transaction is a plain transfer record. There are no signatures and no
//! balance checks: any caller may originate one and amounts are not policed.

use crate::crypto::Canonical;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Sender used for the reward transaction a node pays itself when mining
pub const MINING_REWARD_SENDER: &str = "0";

/// A transfer of `amount` from `sender` to `recipient`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: i64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: i64) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }

    /// Create the system-originated reward transaction for a miner
    pub fn reward(recipient: impl Into<String>, amount: i64) -> Self {
        Self::new(MINING_REWARD_SENDER, recipient, amount)
    }

    /// Whether this is a mining reward rather than a client transfer
    pub fn is_reward(&self) -> bool {
        self.sender == MINING_REWARD_SENDER
    }
}

impl Canonical for Transaction {
    fn canonical_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("amount".to_string(), Value::from(self.amount));
        map.insert("recipient".to_string(), Value::from(self.recipient.as_str()));
        map.insert("sender".to_string(), Value::from(self.sender.as_str()));
        Value::Object(map)
    }
}
