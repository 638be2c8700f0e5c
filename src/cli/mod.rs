//! Command-line interface for `factom-walletd`

pub mod commands;

pub use commands::{Opt, DEFAULT_UNLOCK_SECS, DEFAULT_WALLET_PATH};
