use crate::error::{FactomError, Result};
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use zeroize::ZeroizeOnDrop;

pub const KEY_LEN: usize = 32;
pub const NONCE_LEN: usize = 12;
pub const SALT_LEN: usize = 16;

/// One AES-256-GCM ciphertext with the nonce it was sealed under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct SealedRecord {
    pub nonce: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

/// Key material, zeroed on drop
#[derive(Clone, ZeroizeOnDrop)]
pub struct SecureKey {
    key: Vec<u8>,
}

impl SecureKey {
    pub fn new(key: Vec<u8>) -> Self {
        Self { key }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

impl std::fmt::Debug for SecureKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureKey")
            .field("length", &self.key.len())
            .finish()
    }
}

/// Argon2id over the passphrase; 64 MiB, 3 passes
pub fn derive_key(passphrase: &str, salt: &[u8]) -> Result<SecureKey> {
    let params = Params::new(65536, 3, 1, Some(KEY_LEN))
        .map_err(|e| FactomError::Encryption(format!("Invalid Argon2 parameters: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = vec![0u8; KEY_LEN];
    argon2
        .hash_password_into(passphrase.as_bytes(), salt, &mut key)
        .map_err(|e| FactomError::Encryption(format!("Key derivation failed: {e}")))?;
    Ok(SecureKey::new(key))
}

pub fn random_salt() -> [u8; SALT_LEN] {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

pub struct Aes256GcmCipher {
    cipher: Aes256Gcm,
}

impl Aes256GcmCipher {
    pub fn new(key: &SecureKey) -> Result<Self> {
        if key.len() != KEY_LEN {
            return Err(FactomError::Encryption(
                "AES-256-GCM requires a 32-byte key".to_string(),
            ));
        }
        let aes_key = Key::<Aes256Gcm>::from_slice(key.as_bytes());
        Ok(Self {
            cipher: Aes256Gcm::new(aes_key),
        })
    }

    /// Seal under a fresh random nonce
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<SealedRecord> {
        use rand::RngCore;
        let mut nonce = vec![0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|e| FactomError::Encryption(format!("AES-256-GCM encryption failed: {e}")))?;
        Ok(SealedRecord { nonce, ciphertext })
    }

    /// Fails on a wrong key or any tampering
    pub fn decrypt(&self, sealed: &SealedRecord) -> Result<Vec<u8>> {
        if sealed.nonce.len() != NONCE_LEN {
            return Err(FactomError::Encryption(
                "AES-256-GCM requires a 12-byte nonce".to_string(),
            ));
        }
        self.cipher
            .decrypt(Nonce::from_slice(&sealed.nonce), sealed.ciphertext.as_slice())
            .map_err(|e| FactomError::Encryption(format!("AES-256-GCM decryption failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cipher_rejects_short_key() {
        assert!(Aes256GcmCipher::new(&SecureKey::new(vec![0u8; 32])).is_ok());
        assert!(Aes256GcmCipher::new(&SecureKey::new(vec![0u8; 16])).is_err());
    }

    #[test]
    fn test_seal_and_open() {
        let cipher = Aes256GcmCipher::new(&SecureKey::new(vec![1u8; 32])).unwrap();
        let sealed = cipher.encrypt(b"Fs1KWJrpLdfucvmYwN2nWrwepLn8ercpMbzXshd1g8zyhKXLVLWj").unwrap();
        assert_eq!(sealed.nonce.len(), NONCE_LEN);
        assert_eq!(
            cipher.decrypt(&sealed).unwrap(),
            b"Fs1KWJrpLdfucvmYwN2nWrwepLn8ercpMbzXshd1g8zyhKXLVLWj"
        );
    }

    #[test]
    fn test_wrong_key_and_tampering_fail() {
        let cipher = Aes256GcmCipher::new(&SecureKey::new(vec![1u8; 32])).unwrap();
        let other = Aes256GcmCipher::new(&SecureKey::new(vec![2u8; 32])).unwrap();
        let mut sealed = cipher.encrypt(b"secret").unwrap();
        assert!(other.decrypt(&sealed).is_err());

        sealed.ciphertext[0] ^= 0xff;
        assert!(cipher.decrypt(&sealed).is_err());
    }

    #[test]
    fn test_derive_key_depends_on_salt() {
        let a = derive_key("correct horse", &[0u8; SALT_LEN]).unwrap();
        let b = derive_key("correct horse", &[0u8; SALT_LEN]).unwrap();
        let c = derive_key("correct horse", &[1u8; SALT_LEN]).unwrap();
        assert_eq!(a.len(), KEY_LEN);
        assert_eq!(a.as_bytes(), b.as_bytes());
        assert_ne!(a.as_bytes(), c.as_bytes());
    }

    #[test]
    fn test_debug_hides_key() {
        let key = SecureKey::new(vec![7u8; 32]);
        assert_eq!(format!("{key:?}"), "SecureKey { length: 32 }");
    }
}
