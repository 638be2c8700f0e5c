use ring::digest::{self, Context, SHA256, SHA512};
use ring::hmac;
use ring::rand::{SecureRandom, SystemRandom};
use ring::signature::{Ed25519KeyPair, KeyPair, UnparsedPublicKey, ED25519};
use ripemd::{Digest as RipemdDigest, Ripemd160};

use crate::error::{FactomError, Result};
use std::time::{SystemTime, UNIX_EPOCH};

pub const HASH_LEN: usize = 32;
pub const SIGNATURE_LEN: usize = 64;

/// Milliseconds since the Unix epoch
pub fn current_timestamp() -> Result<u64> {
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| FactomError::Crypto(format!("System time error: {e}")))?
        .as_millis();

    // Factom timestamps travel as 6 bytes
    if duration >= 1u128 << 48 {
        return Err(FactomError::Crypto("Timestamp overflow".to_string()));
    }

    Ok(duration as u64)
}

pub fn sha256_digest(data: &[u8]) -> [u8; HASH_LEN] {
    let mut context = Context::new(&SHA256);
    context.update(data);
    let digest = context.finish();
    let mut out = [0u8; HASH_LEN];
    out.copy_from_slice(digest.as_ref());
    out
}

pub fn sha512_digest(data: &[u8]) -> [u8; 64] {
    let digest = digest::digest(&SHA512, data);
    let mut out = [0u8; 64];
    out.copy_from_slice(digest.as_ref());
    out
}

/// Double SHA-256, used for address checksums, RCD hashes and the chain commit weld
pub fn shad(data: &[u8]) -> [u8; HASH_LEN] {
    sha256_digest(&sha256_digest(data))
}

/// SHA256(SHA512(x) || x), the entry hash
pub fn sha52(data: &[u8]) -> [u8; HASH_LEN] {
    let mut context = Context::new(&SHA256);
    context.update(&sha512_digest(data));
    context.update(data);
    let digest = context.finish();
    let mut out = [0u8; HASH_LEN];
    out.copy_from_slice(digest.as_ref());
    out
}

pub fn hmac_sha512(key: &[u8], data: &[u8]) -> [u8; 64] {
    let key = hmac::Key::new(hmac::HMAC_SHA512, key);
    let tag = hmac::sign(&key, data);
    let mut out = [0u8; 64];
    out.copy_from_slice(tag.as_ref());
    out
}

/// RIPEMD160(SHA256(x)), used for BIP-32 fingerprints
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let mut hasher = Ripemd160::new();
    hasher.update(sha256_digest(data));
    let mut out = [0u8; 20];
    out.copy_from_slice(&hasher.finalize());
    out
}

pub fn base58_encode(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

pub fn base58_decode(data: &str) -> Result<Vec<u8>> {
    bs58::decode(data)
        .into_vec()
        .map_err(|e| FactomError::InvalidAddress(format!("Invalid base58 encoding: {e}")))
}

pub fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut out = [0u8; N];
    SystemRandom::new()
        .fill(&mut out)
        .map_err(|_| FactomError::Crypto("System random source failed".to_string()))?;
    Ok(out)
}

fn ed25519_key_pair(seed: &[u8; 32]) -> Result<Ed25519KeyPair> {
    Ed25519KeyPair::from_seed_unchecked(seed)
        .map_err(|e| FactomError::Crypto(format!("Failed to create Ed25519 key pair: {e}")))
}

pub fn ed25519_public_key(seed: &[u8; 32]) -> Result<[u8; 32]> {
    let key_pair = ed25519_key_pair(seed)?;
    let mut public = [0u8; 32];
    public.copy_from_slice(key_pair.public_key().as_ref());
    Ok(public)
}

pub fn ed25519_sign(seed: &[u8; 32], message: &[u8]) -> Result<[u8; SIGNATURE_LEN]> {
    let key_pair = ed25519_key_pair(seed)?;
    let mut signature = [0u8; SIGNATURE_LEN];
    signature.copy_from_slice(key_pair.sign(message).as_ref());
    Ok(signature)
}

pub fn ed25519_verify(public_key: &[u8], signature: &[u8], message: &[u8]) -> bool {
    let public_key = UnparsedPublicKey::new(&ED25519, public_key);
    public_key.verify(message, signature).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_encoding::HEXLOWER;

    #[test]
    fn test_sha52_is_not_plain_sha256() {
        let data = b"factom";
        let expected = {
            let mut buf = sha512_digest(data).to_vec();
            buf.extend_from_slice(data);
            sha256_digest(&buf)
        };
        assert_eq!(sha52(data), expected);
        assert_ne!(sha52(data), sha256_digest(data));
    }

    #[test]
    fn test_shad_known_vector() {
        // Bitcoin's double SHA-256 of the empty string
        assert_eq!(
            HEXLOWER.encode(&shad(b"")),
            "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
        );
    }

    #[test]
    fn test_ed25519_sign_verify() {
        let seed = [7u8; 32];
        let public = ed25519_public_key(&seed).unwrap();
        let signature = ed25519_sign(&seed, b"message").unwrap();
        assert!(ed25519_verify(&public, &signature, b"message"));
        assert!(!ed25519_verify(&public, &signature, b"other message"));
    }

    #[test]
    fn test_ed25519_zero_seed_public_key() {
        // RFC 8032 style check: the all-zero seed has a well known public key
        let public = ed25519_public_key(&[0u8; 32]).unwrap();
        assert_eq!(
            HEXLOWER.encode(&public),
            "3b6a27bcceb6a42d62a3a8d02a6f0d73653215771de243a63ac048a18b59da29"
        );
    }

    #[test]
    fn test_base58_round_trip() {
        let data = vec![0u8, 0, 1, 2, 3, 255];
        let encoded = base58_encode(&data);
        assert_eq!(base58_decode(&encoded).unwrap(), data);
        assert!(base58_decode("0OIl").is_err());
    }

    #[test]
    fn test_timestamp_fits_six_bytes() {
        let ts = current_timestamp().unwrap();
        assert!(ts < 1u64 << 48);
        assert!(ts > 1_500_000_000_000);
    }
}
