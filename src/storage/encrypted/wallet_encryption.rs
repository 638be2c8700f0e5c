use crate::error::{FactomError, Result};
use crate::storage::encrypted::cipher::{derive_key, random_salt, Aes256GcmCipher, SealedRecord};
use crate::utils::{deserialize, serialize};
use serde::{Deserialize, Serialize};

// Sealed with the wallet key so a wrong passphrase is caught at unlock time
// instead of on the first secret read
const CHECK_PLAINTEXT: &[u8] = b"factom-walletd";

/// Stored unsealed next to the seeds; holds what unlock needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct EncryptionHeader {
    pub salt: Vec<u8>,
    pub check: SealedRecord,
}

/// The unlocked wallet key
pub struct WalletKey {
    cipher: Aes256GcmCipher,
}

impl std::fmt::Debug for WalletKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WalletKey")
    }
}

impl WalletKey {
    /// Fresh salt and header for a newly encrypted wallet
    pub fn create(passphrase: &str) -> Result<(WalletKey, EncryptionHeader)> {
        if passphrase.is_empty() {
            return Err(FactomError::Encryption("Empty passphrase".to_string()));
        }
        let salt = random_salt().to_vec();
        let cipher = Aes256GcmCipher::new(&derive_key(passphrase, &salt)?)?;
        let check = cipher.encrypt(CHECK_PLAINTEXT)?;
        Ok((WalletKey { cipher }, EncryptionHeader { salt, check }))
    }

    pub fn unlock(passphrase: &str, header: &EncryptionHeader) -> Result<WalletKey> {
        let cipher = Aes256GcmCipher::new(&derive_key(passphrase, &header.salt)?)?;
        match cipher.decrypt(&header.check) {
            Ok(plain) if plain == CHECK_PLAINTEXT => Ok(WalletKey { cipher }),
            _ => Err(FactomError::Encryption("Incorrect passphrase".to_string())),
        }
    }

    /// bincode(SealedRecord) of the plaintext
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        serialize(&self.cipher.encrypt(plaintext)?)
    }

    pub fn open(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let sealed: SealedRecord = deserialize(bytes)?;
        self.cipher.decrypt(&sealed)
    }
}
