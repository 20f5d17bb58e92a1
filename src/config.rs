//! Node configuration
//!
//! Every field has a default, so a config file only needs the values it
//! changes:
//!
//! ```toml
//! port = 5001
//! bootstrap_peers = ["http://127.0.0.1:5000"]
//! strict_validation = false
//! ```

use crate::mining::DEFAULT_MINING_REWARD;
use crate::network::DEFAULT_PEER_TIMEOUT;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Node configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NodeConfig {
    /// Address the API listens on
    pub host: String,
    /// Port the API listens on
    pub port: u16,
    /// Peers registered at startup
    pub bootstrap_peers: Vec<String>,
    /// Timeout for a single peer chain request, in milliseconds
    pub peer_timeout_ms: u64,
    /// Also check block indices and the genesis block of peer chains
    pub strict_validation: bool,
    /// Amount of the reward transaction for each mined block
    pub mining_reward: i64,
    /// Reward recipient; random when unset
    pub node_id: Option<String>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            bootstrap_peers: Vec::new(),
            peer_timeout_ms: DEFAULT_PEER_TIMEOUT.as_millis() as u64,
            strict_validation: true,
            mining_reward: DEFAULT_MINING_REWARD,
            node_id: None,
        }
    }
}

impl NodeConfig {
    /// Load a config from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// `host:port` the API binds to
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = NodeConfig::default();
        assert_eq!(config.listen_addr(), "0.0.0.0:5000");
        assert!(config.strict_validation);
        assert_eq!(config.mining_reward, 1);
        assert!(config.node_id.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = NodeConfig::from_toml(
            r#"
            port = 5001
            bootstrap_peers = ["http://127.0.0.1:5000"]
            strict_validation = false
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 5001);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.bootstrap_peers, vec!["http://127.0.0.1:5000"]);
        assert!(!config.strict_validation);
        assert_eq!(config.peer_timeout_ms, 5000);
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(matches!(
            NodeConfig::from_toml("difficulty = 4"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "node_id = \"miner-1\"\nmining_reward = 10").unwrap();

        let config = NodeConfig::from_file(file.path()).unwrap();
        assert_eq!(config.node_id.as_deref(), Some("miner-1"));
        assert_eq!(config.mining_reward, 10);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = NodeConfig::from_file(dir.path().join("missing.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
