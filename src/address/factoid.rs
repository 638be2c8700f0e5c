use crate::address::encoding::{
    decode_with_prefix, encode_with_prefix, FACTOID_PUB_PREFIX, FACTOID_SEC_PREFIX,
};
use crate::address::{seed_from_slice, Signer};
use crate::error::{FactomError, Result};
use crate::utils::{ed25519_public_key, ed25519_sign, random_bytes, shad};
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const RCD_TYPE_1: u8 = 0x01;
pub const RCD_1_LEN: usize = 33;

/// Redeem Condition Datastructure, type 1: a single Ed25519 key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rcd1 {
    public: [u8; 32],
}

impl Rcd1 {
    pub fn new(public: [u8; 32]) -> Rcd1 {
        Rcd1 { public }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Rcd1> {
        if bytes.len() < RCD_1_LEN || bytes[0] != RCD_TYPE_1 {
            return Err(FactomError::Transaction("Unsupported RCD".to_string()));
        }
        let mut public = [0u8; 32];
        public.copy_from_slice(&bytes[1..RCD_1_LEN]);
        Ok(Rcd1 { public })
    }

    pub fn public_key(&self) -> &[u8; 32] {
        &self.public
    }

    pub fn to_bytes(&self) -> [u8; RCD_1_LEN] {
        let mut out = [0u8; RCD_1_LEN];
        out[0] = RCD_TYPE_1;
        out[1..].copy_from_slice(&self.public);
        out
    }

    /// Body of the `FA` address
    pub fn hash(&self) -> [u8; 32] {
        shad(&self.to_bytes())
    }
}

/// Factoid key pair
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct FactoidAddress {
    seed: [u8; 32],
    #[zeroize(skip)]
    rcd: Rcd1,
}

impl FactoidAddress {
    pub fn from_seed(seed: &[u8]) -> Result<FactoidAddress> {
        let seed = seed_from_slice(seed)?;
        let public = ed25519_public_key(&seed)?;
        Ok(FactoidAddress {
            seed,
            rcd: Rcd1::new(public),
        })
    }

    pub fn generate() -> Result<FactoidAddress> {
        Self::from_seed(&random_bytes::<32>()?)
    }

    /// Parse an `Fs` secret string
    pub fn from_secret_string(s: &str) -> Result<FactoidAddress> {
        let seed = decode_with_prefix(s, &FACTOID_SEC_PREFIX)?;
        Self::from_seed(&seed)
    }

    pub fn rcd(&self) -> &Rcd1 {
        &self.rcd
    }

    pub fn rcd_hash(&self) -> [u8; 32] {
        self.rcd.hash()
    }

    pub fn pub_string(&self) -> String {
        encode_with_prefix(&FACTOID_PUB_PREFIX, &self.rcd_hash())
    }

    pub fn sec_string(&self) -> String {
        encode_with_prefix(&FACTOID_SEC_PREFIX, &self.seed)
    }

    pub fn seed(&self) -> &[u8; 32] {
        &self.seed
    }
}

impl Signer for FactoidAddress {
    fn public_key(&self) -> [u8; 32] {
        *self.rcd.public_key()
    }

    fn sign(&self, message: &[u8]) -> Result<[u8; 64]> {
        ed25519_sign(&self.seed, message)
    }
}

impl std::fmt::Debug for FactoidAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoidAddress")
            .field("public", &self.pub_string())
            .finish()
    }
}

/// RCD hash carried by an `FA` address string
pub fn rcd_hash_from_string(s: &str) -> Result<[u8; 32]> {
    decode_with_prefix(s, &FACTOID_PUB_PREFIX)
}

pub fn factoid_pub_string(rcd_hash: &[u8; 32]) -> String {
    encode_with_prefix(&FACTOID_PUB_PREFIX, rcd_hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{classify, AddressKind};

    #[test]
    fn test_secret_round_trip() {
        let seed = [42u8; 32];
        let fa = FactoidAddress::from_seed(&seed).unwrap();
        assert_eq!(classify(&fa.sec_string()), AddressKind::FactoidSec);
        assert_eq!(classify(&fa.pub_string()), AddressKind::FactoidPub);
        let parsed = FactoidAddress::from_secret_string(&fa.sec_string()).unwrap();
        assert_eq!(parsed.seed(), &seed);
        assert_eq!(parsed.pub_string(), fa.pub_string());
    }

    #[test]
    fn test_pub_string_is_rcd_hash() {
        let fa = FactoidAddress::from_seed(&[1u8; 32]).unwrap();
        let mut rcd = vec![RCD_TYPE_1];
        rcd.extend_from_slice(&fa.public_key());
        assert_eq!(fa.rcd_hash(), shad(&rcd));
        assert_eq!(rcd_hash_from_string(&fa.pub_string()).unwrap(), shad(&rcd));
        assert_eq!(factoid_pub_string(&fa.rcd_hash()), fa.pub_string());
    }

    #[test]
    fn test_rcd_parse() {
        let rcd = Rcd1::new([8u8; 32]);
        assert_eq!(Rcd1::from_bytes(&rcd.to_bytes()).unwrap(), rcd);
        assert!(Rcd1::from_bytes(&[0x02; 33]).is_err());
        assert!(Rcd1::from_bytes(&[0x01; 10]).is_err());
    }

    #[test]
    fn test_invalid_seed_length() {
        match FactoidAddress::from_seed(&[0u8; 64]) {
            Err(FactomError::InvalidSeed(64)) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
