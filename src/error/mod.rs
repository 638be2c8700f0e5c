//! Error handling for the Factom client
//!
//! One error type covers every layer: key encoding, entry construction,
//! block decoding, the JSON-RPC transport and the embedded wallet.

use std::fmt;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, FactomError>;

/// Error types for Factom client operations
#[derive(Debug, Clone, PartialEq)]
pub enum FactomError {
    /// Wrong length, prefix or checksum on an address or key string
    InvalidAddress(String),
    /// A 32-byte Ed25519 seed was expected
    InvalidSeed(usize),
    /// BIP-39 validation failed or the word count is not 12
    InvalidMnemonic(String),
    /// Admin block entry with an unrecognised `adminidtype`
    UnknownAdminId(u64),
    /// Entry credit block entry with an unrecognised `ecid`
    UnknownEcId(u64),
    /// Entry payload above the 10KiB limit
    EntryTooLarge { size: usize },
    /// The chain has no head yet but sits in the current process list
    ChainPending,
    /// A wallet transaction with this name already exists
    TxExists(String),
    /// No wallet transaction with this name
    TxNotFound(String),
    /// The wallet holds no key for this address
    NoSuchAddress(String),
    /// Error object returned by a JSON-RPC peer, propagated unchanged
    Rpc {
        code: i64,
        message: String,
        data: Option<String>,
    },
    /// HTTP, TLS or I/O failure below the RPC envelope
    Transport(String),
    /// The wallet endpoint answered 401
    WalletCredentials,
    /// Encrypted wallet used before `unlock-wallet`
    WalletLocked,
    /// Wallet database errors
    Database(String),
    /// Serialization/deserialization errors
    Serialization(String),
    /// Cryptographic operation errors
    Crypto(String),
    /// Factoid transaction building and validation errors
    Transaction(String),
    /// Encryption/decryption errors
    Encryption(String),
    /// Configuration errors
    Config(String),
    /// File I/O errors
    Io(String),
}

impl FactomError {
    /// JSON-RPC code used when the wallet server reports this error
    pub fn rpc_code(&self) -> i64 {
        match self {
            FactomError::Rpc { code, .. } => *code,
            FactomError::InvalidAddress(_)
            | FactomError::InvalidSeed(_)
            | FactomError::InvalidMnemonic(_)
            | FactomError::EntryTooLarge { .. } => crate::network::INVALID_PARAMS,
            _ => crate::network::INTERNAL_ERROR,
        }
    }
}

impl fmt::Display for FactomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactomError::InvalidAddress(addr) => write!(f, "Invalid address: {addr}"),
            FactomError::InvalidSeed(len) => {
                write!(f, "Invalid seed: expected 32 bytes, got {len}")
            }
            FactomError::InvalidMnemonic(msg) => write!(f, "Invalid mnemonic: {msg}"),
            FactomError::UnknownAdminId(id) => write!(f, "Unknown admin block entry type: {id}"),
            FactomError::UnknownEcId(id) => write!(f, "Unknown entry credit block entry type: {id}"),
            FactomError::EntryTooLarge { size } => {
                write!(f, "Entry too large: payload is {size} bytes, limit is 10240")
            }
            FactomError::ChainPending => write!(f, "Chain not yet included in a directory block"),
            FactomError::TxExists(name) => write!(f, "Transaction name already exists: {name}"),
            FactomError::TxNotFound(name) => write!(f, "Transaction not found: {name}"),
            FactomError::NoSuchAddress(addr) => write!(f, "No such address in wallet: {addr}"),
            FactomError::Rpc { message, data, .. } => match data {
                Some(data) => write!(f, "{message}: {data}"),
                None => write!(f, "{message}"),
            },
            FactomError::Transport(msg) => write!(f, "Transport error: {msg}"),
            FactomError::WalletCredentials => write!(
                f,
                "Factom-walletd username/password is required and/or incorrect"
            ),
            FactomError::WalletLocked => write!(f, "Wallet is locked"),
            FactomError::Database(msg) => write!(f, "Database error: {msg}"),
            FactomError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            FactomError::Crypto(msg) => write!(f, "Cryptographic error: {msg}"),
            FactomError::Transaction(msg) => write!(f, "Transaction error: {msg}"),
            FactomError::Encryption(msg) => write!(f, "Encryption error: {msg}"),
            FactomError::Config(msg) => write!(f, "Configuration error: {msg}"),
            FactomError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for FactomError {}

impl From<std::io::Error> for FactomError {
    fn from(err: std::io::Error) -> Self {
        FactomError::Io(err.to_string())
    }
}

impl From<sled::Error> for FactomError {
    fn from(err: sled::Error) -> Self {
        FactomError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for FactomError {
    fn from(err: serde_json::Error) -> Self {
        FactomError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for FactomError {
    fn from(err: reqwest::Error) -> Self {
        FactomError::Transport(err.to_string())
    }
}

impl From<bincode::error::EncodeError> for FactomError {
    fn from(err: bincode::error::EncodeError) -> Self {
        FactomError::Serialization(err.to_string())
    }
}

impl From<bincode::error::DecodeError> for FactomError {
    fn from(err: bincode::error::DecodeError) -> Self {
        FactomError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_error_display_with_data() {
        let err = FactomError::Rpc {
            code: -32602,
            message: "Invalid params".to_string(),
            data: Some("Chain not found".to_string()),
        };
        assert_eq!(err.to_string(), "Invalid params: Chain not found");
    }

    #[test]
    fn test_rpc_error_display_without_data() {
        let err = FactomError::Rpc {
            code: -32601,
            message: "Method not found".to_string(),
            data: None,
        };
        assert_eq!(err.to_string(), "Method not found");
        assert_eq!(err.rpc_code(), -32601);
    }

    #[test]
    fn test_domain_errors_map_to_rpc_codes() {
        assert_eq!(
            FactomError::InvalidAddress("x".into()).rpc_code(),
            crate::network::INVALID_PARAMS
        );
        assert_eq!(
            FactomError::TxNotFound("tx".into()).rpc_code(),
            crate::network::INTERNAL_ERROR
        );
    }
}
