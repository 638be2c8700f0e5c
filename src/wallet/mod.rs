//! The wallet daemon
//!
//! `Wallet` owns the key store and the named transactions being built,
//! `api` maps JSON-RPC methods onto it and `server` puts that on HTTP or HTTPS.

pub mod api;
pub mod server;
#[allow(clippy::module_inception)]
pub mod wallet;

pub use api::{dispatch, handle_request, transaction_info, METHODS};
pub use server::{TlsFiles, WalletServer, DEFAULT_WALLETD_PORT, MAX_BODY_LEN, RPC_PATH};
pub use wallet::{Wallet, WALLET_API_VERSION, WALLET_VERSION};
