use crate::amount::{amount_from_f64, Amount, DEFAULT_MINING_REWARD};
use crate::config::LedgerConfig;
use crate::contract::Contract;
use crate::error::ChainError;
use crate::mempool::Mempool;
use crate::miner::{mine_block, MiningOutcome};
use crate::transaction::Transaction;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use super::state::BalanceState;
use super::validation::validate_chain;

pub type Sha256Hash = [u8; 32];

/// Previous-hash sentinel carried by the genesis block. Renders as 64 zero
/// hex digits.
pub const GENESIS_PREVIOUS_HASH: Sha256Hash = [0u8; 32];
pub const DEFAULT_DIFFICULTY: u32 = 2;
pub const REQUIRED_AUTHORIZATIONS: usize = 2;
/// Issuer of mining rewards. Never debited.
pub const REWARD_ACCOUNT: &str = "Reward";

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BlockHeader {
    pub index: u64,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
    pub previous_hash: Sha256Hash,
    pub nonce: u64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
    pub hash: Sha256Hash,
}

impl Block {
    pub fn new(
        index: u64,
        previous_hash: Sha256Hash,
        timestamp: u64,
        transactions: Vec<Transaction>,
    ) -> Self {
        let mut block = Block {
            header: BlockHeader {
                index,
                timestamp,
                previous_hash,
                nonce: 0,
            },
            transactions,
            hash: [0u8; 32],
        };
        block.hash = block.compute_hash();
        block
    }

    /// Digest of index, every transaction in order, timestamp, previous hash and nonce.
    pub fn compute_hash(&self) -> Sha256Hash {
        let mut hasher = Sha256::new();
        hasher.update(self.header.index.to_le_bytes());
        hasher.update((self.transactions.len() as u64).to_le_bytes());
        for tx in &self.transactions {
            hasher.update(tx.hash());
        }
        hasher.update(self.header.timestamp.to_le_bytes());
        hasher.update(self.header.previous_hash);
        hasher.update(self.header.nonce.to_le_bytes());
        hasher.finalize().into()
    }

    /// Searches nonces until the hash has `difficulty` leading zero hex digits.
    ///
    /// # Panics
    ///
    /// Panics when `difficulty` is 0 or greater than 64.
    pub fn mine(&mut self, difficulty: u32) -> MiningOutcome {
        mine_block(self, difficulty)
    }

    pub fn hash_str(&self) -> String {
        hex::encode(self.hash)
    }

    pub fn previous_hash_str(&self) -> String {
        hex::encode(self.header.previous_hash)
    }

    pub fn index(&self) -> u64 {
        self.header.index
    }
}

fn now_secs() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

/// The ledger: owns the chain, the pending pool and every balance.
#[derive(Debug, Clone)]
pub struct Blockchain {
    blocks: Vec<Block>,
    mempool: Mempool,
    difficulty: u32,
    mining_reward: Amount,
    required_authorizations: usize,
    reward_account: String,
    state: BalanceState,
}

impl Blockchain {
    /// Creates a ledger with the default reward and authorization threshold and
    /// mines its genesis block.
    ///
    /// # Panics
    ///
    /// Panics when `difficulty` is 0 or greater than 64.
    pub fn new(difficulty: u32) -> Self {
        Self::with_parameters(
            difficulty,
            DEFAULT_MINING_REWARD,
            REQUIRED_AUTHORIZATIONS,
            REWARD_ACCOUNT.to_string(),
        )
    }

    /// Validates `config`, builds the ledger from it and seeds its initial balances.
    pub fn with_config(config: &LedgerConfig) -> Result<Self, ChainError> {
        config.validate()?;
        let mut blockchain = Self::with_parameters(
            config.difficulty,
            amount_from_f64(config.mining_reward)?,
            config.required_authorizations,
            config.reward_account.clone(),
        );
        for (account, balance) in &config.initial_balances {
            blockchain.seed_balance(account.clone(), amount_from_f64(*balance)?);
        }
        Ok(blockchain)
    }

    fn with_parameters(
        difficulty: u32,
        mining_reward: Amount,
        required_authorizations: usize,
        reward_account: String,
    ) -> Self {
        let mut state = BalanceState::new();
        state.set_balance(reward_account.clone(), Amount::ZERO);

        let mut genesis = Block::new(0, GENESIS_PREVIOUS_HASH, now_secs(), Vec::new());
        let outcome = genesis.mine(difficulty);
        info!(
            "Mined genesis block (difficulty {}, nonce {}, {} attempts): {}",
            difficulty,
            genesis.header.nonce,
            outcome.attempts,
            genesis.hash_str()
        );

        Blockchain {
            blocks: vec![genesis],
            mempool: Mempool::new(),
            difficulty,
            mining_reward,
            required_authorizations,
            reward_account,
            state,
        }
    }

    pub fn chain(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false: the genesis block is present from construction.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn latest_block(&self) -> &Block {
        // The chain holds the genesis block from construction onward.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn pending_transactions(&self) -> &[Transaction] {
        self.mempool.transactions()
    }

    pub fn mempool(&self) -> &Mempool {
        &self.mempool
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn mining_reward(&self) -> Amount {
        self.mining_reward
    }

    pub fn required_authorizations(&self) -> usize {
        self.required_authorizations
    }

    pub fn reward_account(&self) -> &str {
        &self.reward_account
    }

    pub fn balance_of(&self, account: &str) -> Amount {
        self.state.get_balance(account)
    }

    pub fn balances(&self) -> Vec<(String, Amount)> {
        self.state.sorted()
    }

    pub fn state(&self) -> &BalanceState {
        &self.state
    }

    /// Sets an account balance directly, outside of any block.
    pub fn seed_balance(&mut self, account: impl Into<String>, amount: Amount) {
        self.state.set_balance(account, amount);
    }

    /// Balance and authorization check against current balances, using the
    /// amount as submitted.
    pub fn check_transaction(&self, tx: &Transaction) -> Result<(), ChainError> {
        tx.validate_with_state(&self.state, self.required_authorizations)
    }

    pub fn validate_transaction(&self, tx: &Transaction) -> bool {
        self.check_transaction(tx).is_ok()
    }

    /// Queues `tx` if the contract (when given) approves it, it moves value between
    /// two distinct accounts, and it passes [`Self::check_transaction`]. On
    /// acceptance the fee is taken out of the queued amount.
    pub fn try_submit_transaction(
        &mut self,
        tx: Transaction,
        contract: Option<&dyn Contract>,
    ) -> Result<(), ChainError> {
        if let Some(contract) = contract {
            if !contract.evaluate(&tx) {
                warn!("Contract rejected transaction {} -> {}", tx.sender, tx.receiver);
                return Err(ChainError::ContractRejected);
            }
        }

        if let Err(e) = tx
            .validate_distinct_parties()
            .and_then(|_| self.check_transaction(&tx))
        {
            warn!("Rejected transaction {} -> {}: {}", tx.sender, tx.receiver, e);
            return Err(e);
        }

        let queued = tx.into_net_of_fee().inspect_err(|e| warn!("Rejected transaction: {}", e))?;
        debug!("Queued transaction {}", queued);
        self.mempool.add_transaction(queued);
        Ok(())
    }

    pub fn submit_transaction(&mut self, tx: Transaction, contract: Option<&dyn Contract>) -> bool {
        self.try_submit_transaction(tx, contract).is_ok()
    }

    /// Builds a transfer from raw parts and submits it without a contract.
    pub fn submit_transfer<I, S>(
        &mut self,
        sender: &str,
        receiver: &str,
        amount: Amount,
        fee: Amount,
        authorizations: I,
    ) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tx = Transaction::new(sender, receiver, amount).with_fee(fee);
        for token in authorizations {
            tx.add_authorization(token);
        }
        self.submit_transaction(tx, None)
    }

    /// Seals every pending transaction plus a reward for `miner_address` into a
    /// new block, appends it and applies its balance changes. Balances are
    /// computed before mining, so a block that would push any balance out of range
    /// is never built and the pool is left as it was.
    pub fn try_mine_pending(&mut self, miner_address: &str) -> Result<(&Block, MiningOutcome), ChainError> {
        if self.mempool.is_empty() {
            return Err(ChainError::EmptyMempool);
        }

        let reward = Transaction::new(self.reward_account.clone(), miner_address, self.mining_reward)
            .with_fee(Amount::ZERO);
        let mut transactions = self.mempool.transactions().to_vec();
        transactions.push(reward);

        let mut next_state = self.state.clone();
        next_state
            .apply_transactions(&transactions, &self.reward_account)
            .inspect_err(|e| warn!("Refusing to mine pending transactions: {}", e))?;
        self.mempool.drain();

        let (index, previous_hash) = {
            let tip = self.latest_block();
            (tip.header.index + 1, tip.hash)
        };
        let mut block = Block::new(index, previous_hash, now_secs(), transactions);
        let outcome = block.mine(self.difficulty);
        info!(
            "Mined block {} with {} transactions (nonce {}, {} attempts in {:?}): {}",
            index,
            block.transactions.len(),
            block.header.nonce,
            outcome.attempts,
            outcome.elapsed,
            block.hash_str()
        );

        self.blocks.push(block);
        self.state = next_state;
        Ok((&self.blocks[self.blocks.len() - 1], outcome))
    }

    pub fn mine_pending(&mut self, miner_address: &str) -> bool {
        self.try_mine_pending(miner_address).is_ok()
    }

    /// Applies transactions to balances in order without re-checking funds.
    /// Fails, leaving balances unchanged, if any balance would leave the
    /// `Amount` range.
    pub fn apply_balances(&mut self, transactions: &[Transaction]) -> Result<(), ChainError> {
        self.state.apply_transactions(transactions, &self.reward_account)
    }

    pub fn verify_chain(&self) -> Result<(), ChainError> {
        validate_chain(&self.blocks).inspect_err(|e| warn!("Chain integrity check failed: {}", e))
    }

    pub fn is_valid(&self) -> bool {
        self.verify_chain().is_ok()
    }

    pub fn to_json(&self) -> Result<String, ChainError> {
        Ok(serde_json::to_string_pretty(&self.blocks)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::DEFAULT_FEE;
    use crate::contract::SpendingLimit;

    fn funded_chain() -> Blockchain {
        let mut chain = Blockchain::new(1);
        chain.seed_balance("Alice", Amount::from_num(100));
        chain.seed_balance("Bob", Amount::from_num(50));
        chain
    }

    fn signed(sender: &str, receiver: &str, amount: i32) -> Transaction {
        Transaction::new(sender, receiver, Amount::from_num(amount))
            .with_authorization("sig-1")
            .with_authorization("sig-2")
    }

    fn chain_with_mined_block() -> Blockchain {
        let mut chain = funded_chain();
        assert!(chain.submit_transaction(signed("Alice", "Bob", 30), None));
        assert!(chain.mine_pending("Carol"));
        assert!(chain.submit_transaction(signed("Bob", "Alice", 5), None));
        assert!(chain.mine_pending("Carol"));
        chain
    }

    #[test]
    fn test_genesis_block() {
        let chain = Blockchain::new(2);
        assert_eq!(chain.len(), 1);
        let genesis = &chain.chain()[0];
        assert_eq!(genesis.header.index, 0);
        assert_eq!(genesis.header.previous_hash, GENESIS_PREVIOUS_HASH);
        assert!(genesis.transactions.is_empty());
        assert!(genesis.hash_str().starts_with("00"));
        assert_eq!(chain.balance_of(REWARD_ACCOUNT), Amount::ZERO);
        assert!(chain.state().contains(REWARD_ACCOUNT));
        assert!(chain.is_valid());
    }

    #[test]
    #[should_panic(expected = "mining difficulty")]
    fn test_zero_difficulty_panics() {
        Blockchain::new(0);
    }

    #[test]
    fn test_block_hash_is_deterministic() {
        let block = Block::new(3, [1u8; 32], 42, vec![signed("Alice", "Bob", 1)]);
        assert_eq!(block.hash, block.compute_hash());
        assert_eq!(block.clone().compute_hash(), block.hash);
        assert_eq!(block.header.nonce, 0);
    }

    #[test]
    fn test_contract_rejection_leaves_state_untouched() {
        let mut chain = funded_chain();
        let limit = SpendingLimit::new(Amount::from_num(10));
        assert_eq!(
            chain.try_submit_transaction(signed("Alice", "Bob", 30), Some(&limit)),
            Err(ChainError::ContractRejected)
        );
        assert!(chain.pending_transactions().is_empty());
        assert!(chain.submit_transaction(signed("Alice", "Bob", 10), Some(&limit)));
        assert_eq!(chain.pending_transactions().len(), 1);
    }

    #[test]
    fn test_self_transfer_rejected_before_validation() {
        let mut chain = funded_chain();
        assert_eq!(
            chain.try_submit_transaction(signed("Alice", "Alice", 1), None),
            Err(ChainError::SelfTransfer("Alice".to_string()))
        );
    }

    #[test]
    fn test_accepted_amount_is_net_of_fee() {
        let mut chain = funded_chain();
        assert!(chain.submit_transaction(signed("Alice", "Bob", 50), None));
        let queued = &chain.pending_transactions()[0];
        assert_eq!(queued.amount, Amount::from_num(50) - DEFAULT_FEE);
        assert_eq!(queued.fee, DEFAULT_FEE);
    }

    #[test]
    fn test_submit_transfer_entry_point() {
        let mut chain = funded_chain();
        assert!(chain.submit_transfer("Alice", "Bob", Amount::from_num(1), DEFAULT_FEE, ["a", "b"]));
        assert!(!chain.submit_transfer("Alice", "Bob", Amount::from_num(1), DEFAULT_FEE, ["a"]));
        assert_eq!(chain.pending_transactions().len(), 1);
    }

    #[test]
    fn test_mined_block_layout() -> Result<(), ChainError> {
        let mut chain = funded_chain();
        chain.try_submit_transaction(signed("Alice", "Bob", 30), None)?;
        let genesis_hash = chain.latest_block().hash;

        let (block, outcome) = chain.try_mine_pending("Carol")?;
        assert_eq!(outcome.attempts, block.header.nonce + 1);
        assert_eq!(block.header.index, 1);
        assert_eq!(block.header.previous_hash, genesis_hash);
        assert_eq!(block.transactions.len(), 2);
        let reward = &block.transactions[1];
        assert_eq!(reward.sender, REWARD_ACCOUNT);
        assert_eq!(reward.receiver, "Carol");
        assert_eq!(reward.amount, DEFAULT_MINING_REWARD);
        assert_eq!(reward.fee, Amount::ZERO);
        assert!(reward.authorizations.is_empty());
        assert!(block.hash_str().starts_with('0'));
        Ok(())
    }

    #[test]
    fn test_empty_pool_is_not_mined() {
        let mut chain = funded_chain();
        assert_eq!(chain.try_mine_pending("Carol").err(), Some(ChainError::EmptyMempool));
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.balance_of("Carol"), Amount::ZERO);
    }

    #[test]
    fn test_apply_balances_trusts_caller() -> Result<(), ChainError> {
        let mut chain = funded_chain();
        let overdraft = Transaction::new("Bob", "Alice", Amount::from_num(80)).with_fee(Amount::ZERO);
        chain.apply_balances(&[overdraft])?;
        assert_eq!(chain.balance_of("Bob"), Amount::from_num(-30));
        assert_eq!(chain.balance_of("Alice"), Amount::from_num(180));
        Ok(())
    }

    #[test]
    fn test_mining_overflow_leaves_ledger_untouched() {
        let mut chain = funded_chain();
        chain.seed_balance("Carol", Amount::MAX - Amount::from_num(5));
        assert!(chain.submit_transaction(signed("Alice", "Bob", 1), None));
        let tip = chain.latest_block().hash;

        assert_eq!(
            chain.try_mine_pending("Carol").err(),
            Some(ChainError::BalanceOverflow("Carol".to_string()))
        );
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.latest_block().hash, tip);
        assert_eq!(chain.pending_transactions().len(), 1);
        assert_eq!(chain.balance_of("Alice"), Amount::from_num(100));
        assert_eq!(chain.balance_of("Bob"), Amount::from_num(50));

        assert!(chain.mine_pending("Dave"));
        assert_eq!(chain.len(), 2);
        assert!(chain.pending_transactions().is_empty());
    }

    #[test]
    fn test_mined_chain_is_valid() {
        let chain = chain_with_mined_block();
        assert_eq!(chain.len(), 3);
        assert!(chain.is_valid());
    }

    #[test]
    fn test_tampered_nonce_detected() {
        let mut chain = chain_with_mined_block();
        chain.blocks[1].header.nonce += 1;
        assert!(!chain.is_valid());
        assert!(matches!(chain.verify_chain(), Err(ChainError::InvalidBlock(_))));
    }

    #[test]
    fn test_tampered_previous_hash_detected() {
        let mut chain = chain_with_mined_block();
        chain.blocks[2].header.previous_hash = [9u8; 32];
        assert!(!chain.is_valid());
    }

    #[test]
    fn test_tampered_transaction_amount_detected() {
        let mut chain = chain_with_mined_block();
        chain.blocks[1].transactions[0].amount = Amount::from_num(1_000);
        assert!(!chain.is_valid());
    }

    #[test]
    fn test_rehashed_block_breaks_linkage() {
        let mut chain = chain_with_mined_block();
        chain.blocks[1].transactions[0].amount = Amount::from_num(1_000);
        chain.blocks[1].hash = chain.blocks[1].compute_hash();
        assert_eq!(chain.verify_chain(), Err(ChainError::InvalidBlockLinkage(2)));
    }

    #[test]
    fn test_genesis_contents_are_not_rechecked() {
        let mut chain = chain_with_mined_block();
        chain.blocks[0].header.timestamp += 1;
        assert!(chain.is_valid());
    }

    #[test]
    fn test_to_json_lists_blocks() -> Result<(), ChainError> {
        let chain = chain_with_mined_block();
        let json = chain.to_json()?;
        let parsed: Vec<Block> = serde_json::from_str(&json)?;
        assert_eq!(parsed, chain.chain().to_vec());
        Ok(())
    }
}
