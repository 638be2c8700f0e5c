//! Deterministic key derivation
//!
//! BIP-39 mnemonics feed a BIP-32 tree over secp256k1. The 32-byte child
//! private key is then used directly as an Ed25519 seed. Two layouts are in
//! use: Koinify (`m/7'`, one Factoid address per mnemonic) and BIP-44
//! (`m/44'/coin'/account'/chain/index`).

use crate::address::{EcAddress, FactoidAddress, IdentityKey};
use crate::error::{FactomError, Result};
use crate::utils::{hash160, hmac_sha512, random_bytes};
use bip39::{Language, Mnemonic};
use once_cell::sync::Lazy;
use secp256k1::{PublicKey, Scalar, Secp256k1, SecretKey, SignOnly};
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const HARDENED: u32 = 0x8000_0000;
pub const MNEMONIC_WORDS: usize = 12;

pub const BIP44_PURPOSE: u32 = 44;
pub const COIN_TYPE_FACTOID: u32 = 131;
pub const COIN_TYPE_ENTRY_CREDIT: u32 = 132;
pub const COIN_TYPE_IDENTITY: u32 = 281;

const KOINIFY_CHILD: u32 = 7;
const MASTER_HMAC_KEY: &[u8] = b"Bitcoin seed";

static SECP: Lazy<Secp256k1<SignOnly>> = Lazy::new(Secp256k1::signing_only);

/// Trim, lower-case and collapse whitespace; exactly twelve words are accepted
pub fn parse_mnemonic(mnemonic: &str) -> Result<String> {
    let lowered = mnemonic.trim().to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();
    if words.len() != MNEMONIC_WORDS {
        return Err(FactomError::InvalidMnemonic(format!(
            "expected {MNEMONIC_WORDS} words, got {}",
            words.len()
        )));
    }
    Ok(words.join(" "))
}

/// BIP-39 seed (empty passphrase) after word-list and checksum validation
pub fn mnemonic_to_seed(mnemonic: &str) -> Result<[u8; 64]> {
    let normalized = parse_mnemonic(mnemonic)?;
    let parsed = Mnemonic::parse_in_normalized(Language::English, &normalized)
        .map_err(|e| FactomError::InvalidMnemonic(e.to_string()))?;
    Ok(parsed.to_seed_normalized(""))
}

/// Fresh 12-word mnemonic from 128 bits of system randomness
pub fn new_mnemonic() -> Result<String> {
    let entropy = random_bytes::<16>()?;
    let mnemonic = Mnemonic::from_entropy(&entropy)
        .map_err(|e| FactomError::Crypto(format!("Failed to build mnemonic: {e}")))?;
    Ok(mnemonic.to_string())
}

/// BIP-32 extended private key
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ExtendedKey {
    key: [u8; 32],
    chain_code: [u8; 32],
    depth: u8,
    child_number: u32,
    parent_fingerprint: [u8; 4],
}

impl ExtendedKey {
    pub fn master(seed: &[u8]) -> Result<ExtendedKey> {
        let digest = hmac_sha512(MASTER_HMAC_KEY, seed);
        let mut key = [0u8; 32];
        let mut chain_code = [0u8; 32];
        key.copy_from_slice(&digest[..32]);
        chain_code.copy_from_slice(&digest[32..]);
        validate_private_key(&key)?;
        Ok(ExtendedKey {
            key,
            chain_code,
            depth: 0,
            child_number: 0,
            parent_fingerprint: [0u8; 4],
        })
    }

    /// Compressed secp256k1 public key
    pub fn public_key(&self) -> Result<[u8; 33]> {
        let secret = SecretKey::from_slice(&self.key)
            .map_err(|e| FactomError::Crypto(format!("Invalid BIP-32 private key: {e}")))?;
        Ok(PublicKey::from_secret_key(&SECP, &secret).serialize())
    }

    pub fn fingerprint(&self) -> Result<[u8; 4]> {
        let hash = hash160(&self.public_key()?);
        let mut out = [0u8; 4];
        out.copy_from_slice(&hash[..4]);
        Ok(out)
    }

    pub fn child(&self, index: u32) -> Result<ExtendedKey> {
        let mut data = Vec::with_capacity(37);
        if index >= HARDENED {
            data.push(0x00);
            data.extend_from_slice(&self.key);
        } else {
            data.extend_from_slice(&self.public_key()?);
        }
        data.extend_from_slice(&index.to_be_bytes());

        let digest = hmac_sha512(&self.chain_code, &data);
        data.zeroize();

        // IL >= n or a zero child key means this index has no key
        let invalid = || FactomError::Crypto(format!("BIP-32 child {index} is invalid"));
        let mut il = [0u8; 32];
        il.copy_from_slice(&digest[..32]);
        let tweak = Scalar::from_be_bytes(il).map_err(|_| invalid())?;
        il.zeroize();
        let parent = SecretKey::from_slice(&self.key)
            .map_err(|e| FactomError::Crypto(format!("Invalid BIP-32 private key: {e}")))?;
        let key = parent.add_tweak(&tweak).map_err(|_| invalid())?.secret_bytes();

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&digest[32..]);
        Ok(ExtendedKey {
            key,
            chain_code,
            depth: self.depth.saturating_add(1),
            child_number: index,
            parent_fingerprint: self.fingerprint()?,
        })
    }

    pub fn derive_path(&self, path: &[u32]) -> Result<ExtendedKey> {
        let mut key = self.clone();
        for index in path {
            key = key.child(*index)?;
        }
        Ok(key)
    }

    pub fn private_key(&self) -> &[u8; 32] {
        &self.key
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn child_number(&self) -> u32 {
        self.child_number
    }

    pub fn parent_fingerprint(&self) -> &[u8; 4] {
        &self.parent_fingerprint
    }
}

fn validate_private_key(key: &[u8; 32]) -> Result<()> {
    SecretKey::from_slice(key)
        .map(|_| ())
        .map_err(|e| FactomError::Crypto(format!("Invalid BIP-32 private key: {e}")))
}

/// Ed25519 seed of the single Koinify address for this mnemonic
pub fn koinify_seed(mnemonic: &str) -> Result<[u8; 32]> {
    let seed = mnemonic_to_seed(mnemonic)?;
    let child = ExtendedKey::master(&seed)?.child(HARDENED + KOINIFY_CHILD)?;
    Ok(*child.private_key())
}

pub fn koinify_factoid_address(mnemonic: &str) -> Result<FactoidAddress> {
    FactoidAddress::from_seed(&koinify_seed(mnemonic)?)
}

/// `m/44'/coin'/account'/chain/index` from a BIP-39 seed
pub fn bip44_seed(
    seed: &[u8],
    coin: u32,
    account: u32,
    chain: u32,
    index: u32,
) -> Result<[u8; 32]> {
    let path = [
        HARDENED + BIP44_PURPOSE,
        HARDENED + coin,
        HARDENED + account,
        chain,
        index,
    ];
    let key = ExtendedKey::master(seed)?.derive_path(&path)?;
    Ok(*key.private_key())
}

pub fn bip44_factoid_address(mnemonic: &str, account: u32, chain: u32, index: u32) -> Result<FactoidAddress> {
    let seed = mnemonic_to_seed(mnemonic)?;
    FactoidAddress::from_seed(&bip44_seed(&seed, COIN_TYPE_FACTOID, account, chain, index)?)
}

pub fn bip44_ec_address(mnemonic: &str, account: u32, chain: u32, index: u32) -> Result<EcAddress> {
    let seed = mnemonic_to_seed(mnemonic)?;
    EcAddress::from_seed(&bip44_seed(&seed, COIN_TYPE_ENTRY_CREDIT, account, chain, index)?)
}

pub fn bip44_identity_key(mnemonic: &str, account: u32, chain: u32, index: u32) -> Result<IdentityKey> {
    let seed = mnemonic_to_seed(mnemonic)?;
    IdentityKey::from_seed(&bip44_seed(&seed, COIN_TYPE_IDENTITY, account, chain, index)?)
}
