//! # Factom Client - talking to factomd and factom-walletd from Rust
//!
//! This crate builds, signs and submits Factom data (chains, entries,
//! Factoid transactions), reads back what the network stored, and ships a
//! small wallet daemon of its own. Notes for when I come back to it:
//!
//! ## How the code is organised
//! - `utils/`: hashes, Ed25519, base58, varints and serde/bincode helpers
//! - `address/`: FA/Fs, EC/Es and idpub/idsec keys, BIP-39/44 derivation
//! - `core/`: entries, chains, commits, the Factoid transaction, identity
//!   chains and the block decoders
//! - `network/`: the JSON-RPC envelope, the HTTP client and one function
//!   per factomd or walletd method
//! - `storage/`: sled-backed key store, pending transactions, v1 import
//! - `wallet/`: the wallet model, its RPC dispatcher and HTTP listener
//! - `config/`, `error/`, `cli/`: endpoints, the error type, flags
//!
//! ## Things worth remembering
//! - Every RPC function takes an explicit `&Client`; `GLOBAL_CONFIG` is only
//!   a convenience for building one from the environment
//! - Nothing in `core` or `address` touches the network
//! - Amounts are always integer factoshis or entry credits
//!
//! Start with `network/factomd.rs` for the read side and
//! `wallet/wallet.rs` for the key-holding side.

pub mod address;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod network;
pub mod storage;
pub mod utils;
pub mod wallet;

// Re-export commonly used types for convenience
pub use address::{EcAddress, FactoidAddress, IdentityKey, Signer};
pub use config::{Config, Credentials, Settings, GLOBAL_CONFIG};
pub use core::{chain_exists, chain_id_from_strings, entry_cost, Chain, Entry, Transaction};
pub use error::{FactomError, Result};
pub use network::{Client, Request, Response, RpcError};
pub use storage::WalletDb;
pub use utils::{base58_decode, base58_encode, current_timestamp, sha256_digest, shad};
pub use wallet::{Wallet, WalletServer};
