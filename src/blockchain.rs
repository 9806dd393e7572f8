// Thin re-export module: implementation is in `blockchain/core.rs`, split into
// block/ledger management, balance state, and chain integrity checks.

pub mod core;
pub use self::core::*;
