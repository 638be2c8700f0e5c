//! JSON-RPC networking
//!
//! The envelope types, the blocking HTTP client that talks to factomd and
//! walletd, and one typed function per remote method.

pub mod client;
pub mod factomd;
pub mod jsonrpc;
pub mod walletd;

pub use client::{next_request_id, Client, Target};
pub use jsonrpc::{error_message, Request, Response, RpcError, JSONRPC_VERSION};

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;
