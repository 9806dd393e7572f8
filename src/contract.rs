//! Admission policies a caller can attach to a single submission.
//!
//! A contract sees the transaction exactly as submitted, before the ledger's own
//! checks and before the fee is taken out of the amount.

use crate::amount::Amount;
use crate::transaction::Transaction;
use std::collections::HashSet;

pub trait Contract {
    /// Returns `true` when the transaction may proceed to ledger validation.
    fn evaluate(&self, transaction: &Transaction) -> bool;
}

impl<F> Contract for F
where
    F: Fn(&Transaction) -> bool,
{
    fn evaluate(&self, transaction: &Transaction) -> bool {
        self(transaction)
    }
}

/// Caps the transferred amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpendingLimit {
    pub max_amount: Amount,
}

impl SpendingLimit {
    pub fn new(max_amount: Amount) -> Self {
        Self { max_amount }
    }
}

impl Contract for SpendingLimit {
    fn evaluate(&self, transaction: &Transaction) -> bool {
        transaction.amount <= self.max_amount
    }
}

/// Only lets value flow to a fixed set of receivers.
#[derive(Debug, Clone, Default)]
pub struct ReceiverAllowlist {
    receivers: HashSet<String>,
}

impl ReceiverAllowlist {
    pub fn new<I, S>(receivers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            receivers: receivers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allow(&mut self, receiver: impl Into<String>) {
        self.receivers.insert(receiver.into());
    }
}

impl Contract for ReceiverAllowlist {
    fn evaluate(&self, transaction: &Transaction) -> bool {
        self.receivers.contains(&transaction.receiver)
    }
}

/// Approves only when every inner contract approves. Empty means approve.
#[derive(Default)]
pub struct AllOf {
    contracts: Vec<Box<dyn Contract>>,
}

impl AllOf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, contract: impl Contract + 'static) -> Self {
        self.contracts.push(Box::new(contract));
        self
    }
}

impl Contract for AllOf {
    fn evaluate(&self, transaction: &Transaction) -> bool {
        self.contracts.iter().all(|c| c.evaluate(transaction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer(receiver: &str, amount: i32) -> Transaction {
        Transaction::new("Alice", receiver, Amount::from_num(amount))
    }

    #[test]
    fn test_spending_limit() {
        let limit = SpendingLimit::new(Amount::from_num(25));
        assert!(limit.evaluate(&transfer("Bob", 25)));
        assert!(!limit.evaluate(&transfer("Bob", 26)));
    }

    #[test]
    fn test_receiver_allowlist() {
        let mut allowlist = ReceiverAllowlist::new(["Bob"]);
        assert!(allowlist.evaluate(&transfer("Bob", 1)));
        assert!(!allowlist.evaluate(&transfer("Carol", 1)));
        allowlist.allow("Carol");
        assert!(allowlist.evaluate(&transfer("Carol", 1)));
    }

    #[test]
    fn test_closure_contract() {
        let even_only = |tx: &Transaction| tx.amount.to_num::<i64>() % 2 == 0;
        assert!(even_only.evaluate(&transfer("Bob", 4)));
        assert!(!even_only.evaluate(&transfer("Bob", 3)));
    }

    #[test]
    fn test_all_of() {
        assert!(AllOf::new().evaluate(&transfer("Anyone", 1_000)));

        let policy = AllOf::new()
            .with(SpendingLimit::new(Amount::from_num(10)))
            .with(ReceiverAllowlist::new(["Bob"]));
        assert!(policy.evaluate(&transfer("Bob", 10)));
        assert!(!policy.evaluate(&transfer("Bob", 11)));
        assert!(!policy.evaluate(&transfer("Carol", 5)));
    }
}
