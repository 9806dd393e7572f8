//! Error types for powledger

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChainError {
    #[error("Sender and receiver cannot be the same account ({0})")]
    SelfTransfer(String),
    #[error("Insufficient balance for {account}: has {balance}, requires {required}")]
    InsufficientBalance {
        account: String,
        balance: String,
        required: String,
    },
    #[error("Insufficient authorization: requires {required}, provided {provided}")]
    InsufficientAuthorization { required: usize, provided: usize },
    #[error("Transaction rejected by contract")]
    ContractRejected,
    #[error("No pending transactions to mine")]
    EmptyMempool,
    #[error("Invalid block: {0}")]
    InvalidBlock(String),
    #[error("Invalid block linkage at index {0}")]
    InvalidBlockLinkage(u64),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Balance of {0} would leave the representable range")]
    BalanceOverflow(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::IoError(err.to_string())
    }
}

impl From<toml::de::Error> for ChainError {
    fn from(err: toml::de::Error) -> Self {
        ChainError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for ChainError {
    fn from(err: serde_json::Error) -> Self {
        ChainError::SerializationError(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
