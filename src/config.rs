//! Configuration management for powledger

use crate::blockchain::{DEFAULT_DIFFICULTY, REQUIRED_AUTHORIZATIONS, REWARD_ACCOUNT};
use crate::error::ChainError;
use crate::miner::MAX_DIFFICULTY;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "ledger.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_difficulty")]
    pub difficulty: u32,
    #[serde(default = "default_mining_reward")]
    pub mining_reward: f64,
    /// Fee the presentation layer attaches to new transfers.
    #[serde(default = "default_fee")]
    pub default_fee: f64,
    #[serde(default = "default_required_authorizations")]
    pub required_authorizations: usize,
    #[serde(default = "default_reward_account")]
    pub reward_account: String,
    /// Balances seeded right after genesis.
    #[serde(default)]
    pub initial_balances: BTreeMap<String, f64>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: default_difficulty(),
            mining_reward: default_mining_reward(),
            default_fee: default_fee(),
            required_authorizations: default_required_authorizations(),
            reward_account: default_reward_account(),
            initial_balances: BTreeMap::new(),
        }
    }
}

impl LedgerConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ChainError> {
        let config: LedgerConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ChainError> {
        if self.difficulty == 0 || self.difficulty > MAX_DIFFICULTY {
            return Err(ChainError::ConfigError(format!(
                "difficulty must be between 1 and {}, got {}",
                MAX_DIFFICULTY, self.difficulty
            )));
        }

        if !self.mining_reward.is_finite() || self.mining_reward < 0.0 {
            return Err(ChainError::ConfigError(format!(
                "mining_reward must be a non-negative number, got {}",
                self.mining_reward
            )));
        }

        if !self.default_fee.is_finite() || self.default_fee < 0.0 {
            return Err(ChainError::ConfigError(format!(
                "default_fee must be a non-negative number, got {}",
                self.default_fee
            )));
        }

        if self.reward_account.trim().is_empty() {
            return Err(ChainError::ConfigError(
                "reward_account must not be empty".to_string(),
            ));
        }

        if let Some((account, _)) = self
            .initial_balances
            .iter()
            .find(|(_, balance)| !balance.is_finite())
        {
            return Err(ChainError::ConfigError(format!(
                "initial balance for {} is not a finite number",
                account
            )));
        }

        Ok(())
    }
}

/// Loads the ledger config from `path`. A missing file yields the defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<LedgerConfig, ChainError> {
    match fs::read_to_string(path.as_ref()) {
        Ok(contents) => LedgerConfig::from_toml_str(&contents),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(LedgerConfig::default()),
        Err(e) => Err(e.into()),
    }
}

fn default_difficulty() -> u32 {
    DEFAULT_DIFFICULTY
}

fn default_mining_reward() -> f64 {
    10.0
}

fn default_fee() -> f64 {
    0.01
}

fn default_required_authorizations() -> usize {
    REQUIRED_AUTHORIZATIONS
}

fn default_reward_account() -> String {
    REWARD_ACCOUNT.to_string()
}
