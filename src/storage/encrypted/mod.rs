//! At-rest protection for wallet secrets
//!
//! Only secret records are sealed. Public addresses and the derivation
//! counters stay readable so a locked wallet can still list what it holds.

pub mod cipher;
pub mod wallet_encryption;

pub use cipher::{derive_key, Aes256GcmCipher, SealedRecord, SecureKey};
pub use wallet_encryption::{EncryptionHeader, WalletKey};
