/// Validation logic for transactions separated from type definitions
use crate::amount::format_amount;
use crate::blockchain::BalanceState;
use crate::error::ChainError;
use crate::transaction::types::Transaction;

impl Transaction {
    /// Stateless check: a transfer must move value between two distinct accounts.
    pub fn validate_distinct_parties(&self) -> Result<(), ChainError> {
        if self.sender == self.receiver {
            return Err(ChainError::SelfTransfer(self.sender.clone()));
        }
        Ok(())
    }

    /// Full validation against current balances.
    /// Ensures: balance(sender) >= amount + fee AND enough authorizations.
    /// Unknown senders hold nothing.
    pub fn validate_with_state(
        &self,
        state: &BalanceState,
        required_authorizations: usize,
    ) -> Result<(), ChainError> {
        let balance = state.get_balance(&self.sender);
        let required = self.total_cost().ok_or_else(|| {
            ChainError::InvalidAmount(format!(
                "amount {} plus fee {} is out of range",
                format_amount(self.amount),
                format_amount(self.fee)
            ))
        })?;
        if balance < required {
            return Err(ChainError::InsufficientBalance {
                account: self.sender.clone(),
                balance: format_amount(balance),
                required: format_amount(required),
            });
        }

        if !self.has_sufficient_authorization(required_authorizations) {
            return Err(ChainError::InsufficientAuthorization {
                required: required_authorizations,
                provided: self.authorization_count(),
            });
        }

        Ok(())
    }
}
