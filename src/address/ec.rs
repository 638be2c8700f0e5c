use crate::address::encoding::{decode_with_prefix, encode_with_prefix, EC_PUB_PREFIX, EC_SEC_PREFIX};
use crate::address::{seed_from_slice, Signer};
use crate::error::Result;
use crate::utils::{ed25519_public_key, ed25519_sign, random_bytes};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Entry Credit key pair. The public address body is the raw Ed25519 key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EcAddress {
    seed: [u8; 32],
    public: [u8; 32],
}

impl EcAddress {
    pub fn from_seed(seed: &[u8]) -> Result<EcAddress> {
        let seed = seed_from_slice(seed)?;
        let public = ed25519_public_key(&seed)?;
        Ok(EcAddress { seed, public })
    }

    pub fn generate() -> Result<EcAddress> {
        Self::from_seed(&random_bytes::<32>()?)
    }

    /// Parse an `Es` secret string
    pub fn from_secret_string(s: &str) -> Result<EcAddress> {
        let seed = decode_with_prefix(s, &EC_SEC_PREFIX)?;
        Self::from_seed(&seed)
    }

    pub fn pub_string(&self) -> String {
        encode_with_prefix(&EC_PUB_PREFIX, &self.public)
    }

    pub fn sec_string(&self) -> String {
        encode_with_prefix(&EC_SEC_PREFIX, &self.seed)
    }

    pub fn seed(&self) -> &[u8; 32] {
        &self.seed
    }
}

impl Signer for EcAddress {
    fn public_key(&self) -> [u8; 32] {
        self.public
    }

    fn sign(&self, message: &[u8]) -> Result<[u8; 64]> {
        ed25519_sign(&self.seed, message)
    }
}

impl std::fmt::Debug for EcAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcAddress")
            .field("public", &self.pub_string())
            .finish()
    }
}

/// Raw public key carried by an `EC` address string
pub fn ec_public_from_string(s: &str) -> Result<[u8; 32]> {
    decode_with_prefix(s, &EC_PUB_PREFIX)
}

pub fn ec_pub_string(public: &[u8; 32]) -> String {
    encode_with_prefix(&EC_PUB_PREFIX, public)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{classify, AddressKind};
    use crate::utils::ed25519_verify;

    #[test]
    fn test_zero_seed_secret_string() {
        let ec = EcAddress::from_seed(&[0u8; 32]).unwrap();
        assert_eq!(
            ec.sec_string(),
            "Es2Rf7iM6PdsqfYCo3D1tnAR65SkLENyWJG1deUzpRMQmbh9F3eG"
        );
        // Public string carries the derived key, not the seed
        assert_eq!(
            ec.pub_string(),
            "EC2DKSYyRcNWf7RS963VFYgMExoHRYLHVeCfQ9PGPmNzwrcmgm2r"
        );
    }

    #[test]
    fn test_secret_round_trip() {
        let ec = EcAddress::generate().unwrap();
        assert_eq!(classify(&ec.sec_string()), AddressKind::EcSec);
        assert_eq!(classify(&ec.pub_string()), AddressKind::EcPub);
        let parsed = EcAddress::from_secret_string(&ec.sec_string()).unwrap();
        assert_eq!(parsed.seed(), ec.seed());
        assert_eq!(parsed.pub_string(), ec.pub_string());
        assert_eq!(ec_public_from_string(&ec.pub_string()).unwrap(), ec.public_key());
    }

    #[test]
    fn test_rejects_short_seed() {
        assert!(EcAddress::from_seed(&[1u8; 31]).is_err());
    }

    #[test]
    fn test_factoid_secret_is_not_ec() {
        let fs = crate::address::FactoidAddress::from_seed(&[3u8; 32]).unwrap();
        assert!(EcAddress::from_secret_string(&fs.sec_string()).is_err());
    }

    #[test]
    fn test_sign() {
        let ec = EcAddress::from_seed(&[5u8; 32]).unwrap();
        let sig = ec.sign(b"commit").unwrap();
        assert!(ed25519_verify(&ec.public_key(), &sig, b"commit"));
    }
}
