use crate::error::{FactomError, Result};
use crate::storage::encrypted::{EncryptionHeader, WalletKey};
use crate::utils::{deserialize, serialize};
use serde::{Deserialize, Serialize};
use std::path::Path;
use zeroize::Zeroize;

pub const FACTOIDS_TREE: &str = "Factoids";
pub const ENTRY_CREDITS_TREE: &str = "Entry Credits";
pub const IDENTITY_KEYS_TREE: &str = "Identity Keys";
pub const SEEDS_TREE: &str = "Seeds";

pub const DB_SEED_KEY: &str = "DB Seed";
pub const NEXT_SEED_KEY: &str = "Next Seed";
const ENCRYPTION_KEY: &str = "Encryption";

/// Which bucket a key pair lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyTree {
    Factoids,
    EntryCredits,
    IdentityKeys,
}

impl KeyTree {
    pub fn name(&self) -> &'static str {
        match self {
            KeyTree::Factoids => FACTOIDS_TREE,
            KeyTree::EntryCredits => ENTRY_CREDITS_TREE,
            KeyTree::IdentityKeys => IDENTITY_KEYS_TREE,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
struct SecretRecord {
    secret: Vec<u8>,
}

impl Drop for SecretRecord {
    fn drop(&mut self) {
        self.secret.zeroize();
    }
}

/// The wallet's mnemonic and the BIP-39 seed it produces
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct DbSeed {
    pub mnemonic: String,
    pub seed: Vec<u8>,
}

impl std::fmt::Debug for DbSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DbSeed")
    }
}

impl Drop for DbSeed {
    fn drop(&mut self) {
        self.mnemonic.zeroize();
        self.seed.zeroize();
    }
}

/// Next BIP-44 address index per class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct NextSeed {
    pub factoid: u32,
    pub entry_credit: u32,
    pub identity: u32,
}

/// Sled store behind the wallet server
///
/// Key pairs are keyed by their public string. Secret values are sealed
/// when the database carries an encryption header, and every method that
/// reads or writes one takes the unlocked key for that case.
pub struct WalletDb {
    db: sled::Db,
    factoids: sled::Tree,
    entry_credits: sled::Tree,
    identity_keys: sled::Tree,
    seeds: sled::Tree,
    encryption: Option<EncryptionHeader>,
}

impl WalletDb {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<WalletDb> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// In-memory database that disappears on drop
    pub fn temporary() -> Result<WalletDb> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> Result<WalletDb> {
        let factoids = db.open_tree(FACTOIDS_TREE)?;
        let entry_credits = db.open_tree(ENTRY_CREDITS_TREE)?;
        let identity_keys = db.open_tree(IDENTITY_KEYS_TREE)?;
        let seeds = db.open_tree(SEEDS_TREE)?;
        let encryption = match seeds.get(ENCRYPTION_KEY)? {
            Some(bytes) => Some(deserialize(&bytes)?),
            None => None,
        };
        Ok(WalletDb {
            db,
            factoids,
            entry_credits,
            identity_keys,
            seeds,
            encryption,
        })
    }

    fn tree(&self, tree: KeyTree) -> &sled::Tree {
        match tree {
            KeyTree::Factoids => &self.factoids,
            KeyTree::EntryCredits => &self.entry_credits,
            KeyTree::IdentityKeys => &self.identity_keys,
        }
    }

    pub fn is_encrypted(&self) -> bool {
        self.encryption.is_some()
    }

    /// Turn on encryption for a wallet that holds no secrets yet
    pub fn init_encryption(&mut self, passphrase: &str) -> Result<WalletKey> {
        if self.encryption.is_some() {
            return Err(FactomError::Encryption("Wallet is already encrypted".to_string()));
        }
        let holds_secrets = !self.factoids.is_empty()
            || !self.entry_credits.is_empty()
            || !self.identity_keys.is_empty()
            || self.seeds.contains_key(DB_SEED_KEY)?;
        if holds_secrets {
            return Err(FactomError::Encryption(
                "Cannot encrypt a wallet that already holds plaintext secrets".to_string(),
            ));
        }
        let (key, header) = WalletKey::create(passphrase)?;
        self.seeds.insert(ENCRYPTION_KEY, serialize(&header)?)?;
        self.encryption = Some(header);
        Ok(key)
    }

    pub fn unlock(&self, passphrase: &str) -> Result<WalletKey> {
        match &self.encryption {
            Some(header) => WalletKey::unlock(passphrase, header),
            None => Err(FactomError::Encryption("Wallet is not encrypted".to_string())),
        }
    }

    fn seal(&self, plain: Vec<u8>, key: Option<&WalletKey>) -> Result<Vec<u8>> {
        if !self.is_encrypted() {
            return Ok(plain);
        }
        let key = key.ok_or(FactomError::WalletLocked)?;
        let sealed = key.seal(&plain);
        let mut plain = plain;
        plain.zeroize();
        sealed
    }

    fn unseal(&self, stored: &[u8], key: Option<&WalletKey>) -> Result<Vec<u8>> {
        if !self.is_encrypted() {
            return Ok(stored.to_vec());
        }
        key.ok_or(FactomError::WalletLocked)?.open(stored)
    }

    pub fn put_secret(&self, tree: KeyTree, public: &str, secret: &[u8; 32], key: Option<&WalletKey>) -> Result<()> {
        let record = SecretRecord {
            secret: secret.to_vec(),
        };
        let value = self.seal(serialize(&record)?, key)?;
        self.tree(tree).insert(public.as_bytes(), value)?;
        Ok(())
    }

    pub fn contains(&self, tree: KeyTree, public: &str) -> Result<bool> {
        Ok(self.tree(tree).contains_key(public.as_bytes())?)
    }

    pub fn get_secret(&self, tree: KeyTree, public: &str, key: Option<&WalletKey>) -> Result<[u8; 32]> {
        let stored = self
            .tree(tree)
            .get(public.as_bytes())?
            .ok_or_else(|| FactomError::NoSuchAddress(public.to_string()))?;
        self.decode_secret(&stored, key)
    }

    fn decode_secret(&self, stored: &[u8], key: Option<&WalletKey>) -> Result<[u8; 32]> {
        let mut plain = self.unseal(stored, key)?;
        let decoded: Result<SecretRecord> = deserialize(&plain);
        plain.zeroize();
        let record = decoded?;
        <[u8; 32]>::try_from(record.secret.as_slice())
            .map_err(|_| FactomError::InvalidSeed(record.secret.len()))
    }

    pub fn remove(&self, tree: KeyTree, public: &str) -> Result<()> {
        self.tree(tree)
            .remove(public.as_bytes())?
            .ok_or_else(|| FactomError::NoSuchAddress(public.to_string()))?;
        Ok(())
    }

    /// Public strings in key order; never needs the wallet key
    pub fn publics(&self, tree: KeyTree) -> Result<Vec<String>> {
        let mut publics = vec![];
        for item in self.tree(tree).iter() {
            let (k, _) = item?;
            publics.push(String::from_utf8_lossy(&k).into_owned());
        }
        Ok(publics)
    }

    pub fn secrets(&self, tree: KeyTree, key: Option<&WalletKey>) -> Result<Vec<(String, [u8; 32])>> {
        let mut secrets = vec![];
        for item in self.tree(tree).iter() {
            let (k, v) = item?;
            let public = String::from_utf8_lossy(&k).into_owned();
            secrets.push((public, self.decode_secret(&v, key)?));
        }
        Ok(secrets)
    }

    pub fn get_db_seed(&self, key: Option<&WalletKey>) -> Result<Option<DbSeed>> {
        match self.seeds.get(DB_SEED_KEY)? {
            Some(stored) => {
                let mut plain = self.unseal(&stored, key)?;
                let seed = deserialize(&plain);
                plain.zeroize();
                Ok(Some(seed?))
            }
            None => Ok(None),
        }
    }

    pub fn put_db_seed(&self, seed: &DbSeed, key: Option<&WalletKey>) -> Result<()> {
        let value = self.seal(serialize(seed)?, key)?;
        self.seeds.insert(DB_SEED_KEY, value)?;
        Ok(())
    }

    pub fn get_next_seed(&self) -> Result<Option<NextSeed>> {
        match self.seeds.get(NEXT_SEED_KEY)? {
            Some(bytes) => Ok(Some(deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn put_next_seed(&self, next: &NextSeed) -> Result<()> {
        self.seeds.insert(NEXT_SEED_KEY, serialize(next)?)?;
        Ok(())
    }

    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    /// Flush and drop every handle
    pub fn close(self) -> Result<()> {
        self.flush()
    }
}
