//! Utility functions and helpers
//!
//! Hashing, signatures, base58, Factom varints and the serde/bincode
//! adapters shared by the wire types and the wallet database.

pub mod crypto;
pub mod serialization;
pub mod varint;

pub use crypto::{
    base58_decode, base58_encode, current_timestamp, ed25519_public_key, ed25519_sign,
    ed25519_verify, hash160, hmac_sha512, random_bytes, sha256_digest, sha512_digest, sha52, shad,
    HASH_LEN, SIGNATURE_LEN,
};
pub use serialization::{deserialize, hex_decode, hex_decode_32, serialize};
pub use varint::{decode_varint, encode_varint, varint_len};
