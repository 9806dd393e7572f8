use crate::amount::Amount;
use crate::error::ChainError;
use crate::transaction::Transaction;
use std::collections::HashMap;

/// Account balances. The ledger is its only writer.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct BalanceState {
    pub address_balances: HashMap<String, Amount>,
}

impl BalanceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unknown accounts hold zero.
    pub fn get_balance(&self, account: &str) -> Amount {
        self.address_balances
            .get(account)
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    pub fn set_balance(&mut self, account: impl Into<String>, amount: Amount) {
        self.address_balances.insert(account.into(), amount);
    }

    pub fn contains(&self, account: &str) -> bool {
        self.address_balances.contains_key(account)
    }

    /// Balances sorted by account name, for stable rendering.
    pub fn sorted(&self) -> Vec<(String, Amount)> {
        let mut entries: Vec<(String, Amount)> = self
            .address_balances
            .iter()
            .map(|(account, amount)| (account.clone(), *amount))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Applies one mined transaction. Real senders are debited amount + fee with
    /// no sufficiency re-check; the issuing account is never debited. Nothing is
    /// written when either side would leave the `Amount` range.
    pub fn apply_transaction(&mut self, tx: &Transaction, reward_account: &str) -> Result<(), ChainError> {
        let debited = if tx.sender != reward_account {
            let balance = tx
                .total_cost()
                .and_then(|cost| self.get_balance(&tx.sender).checked_sub(cost))
                .ok_or_else(|| ChainError::BalanceOverflow(tx.sender.clone()))?;
            Some(balance)
        } else {
            None
        };

        let receiver_balance = match debited {
            Some(balance) if tx.sender == tx.receiver => balance,
            _ => self.get_balance(&tx.receiver),
        };
        let credited = receiver_balance
            .checked_add(tx.amount)
            .ok_or_else(|| ChainError::BalanceOverflow(tx.receiver.clone()))?;

        if let Some(balance) = debited {
            self.set_balance(tx.sender.clone(), balance);
        }
        self.set_balance(tx.receiver.clone(), credited);
        Ok(())
    }

    /// Applies `transactions` in order, all or nothing.
    pub fn apply_transactions(&mut self, transactions: &[Transaction], reward_account: &str) -> Result<(), ChainError> {
        let mut next = self.clone();
        for tx in transactions {
            next.apply_transaction(tx, reward_account)?;
        }
        *self = next;
        Ok(())
    }
}
