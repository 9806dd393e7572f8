//! powledger - a single-process proof-of-work ledger
//!
//! Named accounts transfer value to one another. Accepted transfers wait in a
//! pending pool until a miner seals them, together with a reward for itself,
//! into a block whose hash must start with a configurable number of zero hex
//! digits. Every block commits to its predecessor's hash.
//!
//! # Architecture
//!
//! ## Core Ledger
//! - [`blockchain`] - Blocks, the ledger, balances and chain integrity checks
//! - [`transaction`] - Transfers, authorization tokens and their validation
//! - [`mempool`] - Pending pool in arrival order
//! - [`contract`] - Optional admission policies for a submission
//!
//! ## Consensus
//! - [`miner`] - Proof-of-work nonce search
//!
//! ## Configuration & Utilities
//! - [`amount`] - Fixed-point amounts
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//! - [`cli`] - Table rendering for the interactive front end

#![forbid(unsafe_code)]

// ============================================================================
// Core Ledger
// ============================================================================
pub mod blockchain;
pub mod contract;
pub mod mempool;
pub mod transaction;

// ============================================================================
// Consensus & Mining
// ============================================================================
pub mod miner;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod amount;
pub mod cli;
pub mod config;
pub mod error;
