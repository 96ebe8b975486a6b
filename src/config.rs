//! Configuration management for minichain

use serde::Deserialize;
use serde_json::Number;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::ChainError;
use crate::miner::MAX_DIFFICULTY;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub mining: MiningConfig,
    #[serde(default)]
    pub node: NodeConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Who searches for proofs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MiningMode {
    /// The node searches (or validates a supplied proof) against the previous
    /// block's canonical string and credits itself a reward.
    #[default]
    Server,
    /// External miners search against the previous block's hash; the node
    /// only validates.
    Client,
}

impl std::fmt::Display for MiningMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MiningMode::Server => write!(f, "server"),
            MiningMode::Client => write!(f, "client"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MiningConfig {
    #[serde(default)]
    pub mode: MiningMode,
    /// Leading zero hex characters a proof's digest must have.
    #[serde(default = "default_difficulty")]
    pub difficulty: u32,
    #[serde(default = "default_reward_amount")]
    pub reward_amount: Number,
    /// Sender of reward transactions.
    #[serde(default = "default_mint_sender")]
    pub mint_sender: String,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            mode: MiningMode::default(),
            difficulty: default_difficulty(),
            reward_amount: default_reward_amount(),
            mint_sender: default_mint_sender(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeConfig {
    /// Fixed node identifier; a random one is generated when absent.
    #[serde(default)]
    pub identifier: Option<String>,
}

impl Config {
    pub fn validate(&self) -> Result<(), ChainError> {
        if self.mining.difficulty > MAX_DIFFICULTY {
            return Err(ChainError::Config(format!(
                "mining.difficulty must be at most {}, got {}",
                MAX_DIFFICULTY, self.mining.difficulty
            )));
        }

        if self.mining.mint_sender.is_empty() {
            return Err(ChainError::Config("mining.mint_sender must not be empty".to_string()));
        }

        if let Some(identifier) = &self.node.identifier {
            if identifier.is_empty() {
                return Err(ChainError::Config(
                    "node.identifier must not be empty when set".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Reads `path` as TOML, falling back to defaults when the file is absent.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ChainError> {
    let path = path.as_ref();
    let config: Config = if path.exists() {
        let config_str = fs::read_to_string(path)?;
        toml::from_str(&config_str)?
    } else {
        info!("No config at {}, using defaults", path.display());
        Config::default()
    };

    config.validate()?;
    Ok(config)
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_difficulty() -> u32 {
    4
}

fn default_reward_amount() -> Number {
    Number::from(1)
}

fn default_mint_sender() -> String {
    "0".to_string()
}
