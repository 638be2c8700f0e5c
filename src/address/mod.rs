//! Addresses and keys
//!
//! Factoid, Entry Credit and Identity key pairs, their base58 text forms
//! and deterministic derivation from a mnemonic.

pub mod derivation;
pub mod ec;
pub mod encoding;
pub mod factoid;
pub mod identity_key;

use crate::error::{FactomError, Result};

pub use derivation::{
    bip44_ec_address, bip44_factoid_address, bip44_identity_key, bip44_seed,
    koinify_factoid_address, mnemonic_to_seed, new_mnemonic, parse_mnemonic, ExtendedKey,
    COIN_TYPE_ENTRY_CREDIT, COIN_TYPE_FACTOID, COIN_TYPE_IDENTITY, HARDENED,
};
pub use ec::{ec_pub_string, ec_public_from_string, EcAddress};
pub use encoding::{
    classify, is_valid, is_valid_identity_key, AddressKind, ADDRESS_CHECK_SUM_LEN, ADDRESS_LEN,
    IDENTITY_KEY_LEN, IDENTITY_KEY_STRING_LEN,
};
pub use factoid::{
    factoid_pub_string, rcd_hash_from_string, FactoidAddress, Rcd1, RCD_1_LEN, RCD_TYPE_1,
};
pub use identity_key::{identity_pub_string, identity_public_from_string, IdentityKey};

/// Anything that holds an Ed25519 secret and can sign with it
pub trait Signer {
    fn public_key(&self) -> [u8; 32];
    fn sign(&self, message: &[u8]) -> Result<[u8; 64]>;
}

pub(crate) fn seed_from_slice(seed: &[u8]) -> Result<[u8; 32]> {
    <[u8; 32]>::try_from(seed).map_err(|_| FactomError::InvalidSeed(seed.len()))
}
