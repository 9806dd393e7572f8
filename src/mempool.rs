//! Pending pool of accepted, not-yet-mined transactions, kept in arrival order.

use crate::amount::Amount;
use crate::transaction::Transaction;

#[derive(Debug, Clone, Default)]
pub struct Mempool {
    transactions: Vec<Transaction>,
}

impl Mempool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_transaction(&mut self, tx: Transaction) {
        self.transactions.push(tx);
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Sum of pending fees; `None` if it does not fit in an [`Amount`].
    pub fn total_fees(&self) -> Option<Amount> {
        self.transactions
            .iter()
            .try_fold(Amount::ZERO, |total, tx| total.checked_add(tx.fee))
    }

    /// Takes every pending transaction in arrival order, leaving the pool empty.
    pub fn drain(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.transactions)
    }
}
