use crate::address::encoding::{decode_with_prefix, encode_with_prefix, ID_PUB_PREFIX, ID_SEC_PREFIX};
use crate::address::{seed_from_slice, Signer};
use crate::error::Result;
use crate::utils::{ed25519_public_key, ed25519_sign, random_bytes};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Identity key: an Ed25519 pair rendered as `idpub` / `idsec`
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct IdentityKey {
    seed: [u8; 32],
    public: [u8; 32],
}

impl IdentityKey {
    pub fn from_seed(seed: &[u8]) -> Result<IdentityKey> {
        let seed = seed_from_slice(seed)?;
        let public = ed25519_public_key(&seed)?;
        Ok(IdentityKey { seed, public })
    }

    pub fn generate() -> Result<IdentityKey> {
        Self::from_seed(&random_bytes::<32>()?)
    }

    pub fn from_secret_string(s: &str) -> Result<IdentityKey> {
        let seed = decode_with_prefix(s, &ID_SEC_PREFIX)?;
        Self::from_seed(&seed)
    }

    pub fn pub_string(&self) -> String {
        identity_pub_string(&self.public)
    }

    pub fn sec_string(&self) -> String {
        encode_with_prefix(&ID_SEC_PREFIX, &self.seed)
    }

    pub fn seed(&self) -> &[u8; 32] {
        &self.seed
    }
}

impl Signer for IdentityKey {
    fn public_key(&self) -> [u8; 32] {
        self.public
    }

    fn sign(&self, message: &[u8]) -> Result<[u8; 64]> {
        ed25519_sign(&self.seed, message)
    }
}

impl std::fmt::Debug for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityKey")
            .field("public", &self.pub_string())
            .finish()
    }
}

/// Raw public key carried by an `idpub` string
pub fn identity_public_from_string(s: &str) -> Result<[u8; 32]> {
    decode_with_prefix(s, &ID_PUB_PREFIX)
}

pub fn identity_pub_string(public: &[u8; 32]) -> String {
    encode_with_prefix(&ID_PUB_PREFIX, public)
}
