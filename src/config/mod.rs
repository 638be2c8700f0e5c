//! Configuration management
//!
//! Endpoints and credentials for factomd and walletd, loaded from defaults,
//! an optional TOML file and the environment.

pub mod settings;

pub use settings::{
    Config, Credentials, Settings, DEFAULT_FACTOMD_SERVER, DEFAULT_WALLETD_SERVER, GLOBAL_CONFIG,
};
