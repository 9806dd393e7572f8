/// Transaction types for powledger
use crate::amount::{format_amount, Amount, DEFAULT_FEE};
use crate::blockchain::Sha256Hash;
use crate::error::ChainError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A transfer of value between two named accounts, gated by a count of
/// opaque authorization tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub receiver: String,
    pub amount: Amount,
    pub fee: Amount,
    pub authorizations: Vec<String>,
    /// Seconds since the Unix epoch, captured at construction.
    pub timestamp: u64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, receiver: impl Into<String>, amount: Amount) -> Self {
        Transaction {
            sender: sender.into(),
            receiver: receiver.into(),
            amount,
            fee: DEFAULT_FEE,
            authorizations: Vec::new(),
            timestamp: chrono::Utc::now().timestamp().max(0) as u64,
        }
    }

    pub fn with_fee(mut self, fee: Amount) -> Self {
        self.fee = fee;
        self
    }

    pub fn with_authorization(mut self, token: impl Into<String>) -> Self {
        self.authorizations.push(token.into());
        self
    }

    pub fn add_authorization(&mut self, token: impl Into<String>) -> &mut Self {
        self.authorizations.push(token.into());
        self
    }

    pub fn authorization_count(&self) -> usize {
        self.authorizations.len()
    }

    pub fn has_sufficient_authorization(&self, threshold: usize) -> bool {
        self.authorizations.len() >= threshold
    }

    /// Total the sender must hold for this transaction to be accepted.
    /// `None` when amount + fee does not fit in an [`Amount`].
    pub fn total_cost(&self) -> Option<Amount> {
        self.amount.checked_add(self.fee)
    }

    /// Consumes the transaction and returns it with the fee taken out of the
    /// transferred amount. Applied once, when the ledger accepts it.
    pub(crate) fn into_net_of_fee(mut self) -> Result<Self, ChainError> {
        self.amount = self.amount.checked_sub(self.fee).ok_or_else(|| {
            ChainError::InvalidAmount(format!(
                "{} minus fee {} is out of range",
                format_amount(self.amount),
                format_amount(self.fee)
            ))
        })?;
        Ok(self)
    }

    /// Canonical digest of every field, in declaration order. Strings and the
    /// token list are length-prefixed so distinct field splits never collide.
    pub fn hash(&self) -> Sha256Hash {
        let mut hasher = Sha256::new();
        update_str(&mut hasher, &self.sender);
        update_str(&mut hasher, &self.receiver);
        hasher.update(self.amount.to_le_bytes());
        hasher.update(self.fee.to_le_bytes());
        hasher.update((self.authorizations.len() as u64).to_le_bytes());
        for token in &self.authorizations {
            update_str(&mut hasher, token);
        }
        hasher.update(self.timestamp.to_le_bytes());
        hasher.finalize().into()
    }

    pub fn hash_str(&self) -> String {
        hex::encode(self.hash())
    }
}

fn update_str(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}: {} (fee: {}, authorizations: {}, timestamp: {})",
            self.sender,
            self.receiver,
            format_amount(self.amount),
            format_amount(self.fee),
            self.authorizations.len(),
            self.timestamp
        )
    }
}
