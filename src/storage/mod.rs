//! Wallet persistence
//!
//! The sled database behind the wallet server, the in-memory pool of named
//! transactions being built, the v1 wallet reader and record encryption.

pub mod encrypted;
pub mod legacy;
pub mod transactions;
pub mod wallet_db;

pub use encrypted::{EncryptionHeader, WalletKey};
pub use legacy::{read_legacy_wallet, write_legacy_wallet, LegacyKind, LegacyRecord};
pub use transactions::TransactionPool;
pub use wallet_db::{DbSeed, KeyTree, NextSeed, WalletDb};
