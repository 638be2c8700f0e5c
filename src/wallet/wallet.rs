use crate::address::{
    bip44_seed, classify, factoid_pub_string, is_valid_identity_key, koinify_factoid_address,
    mnemonic_to_seed, new_mnemonic, AddressKind, EcAddress, FactoidAddress, IdentityKey, Signer,
    COIN_TYPE_ENTRY_CREDIT, COIN_TYPE_FACTOID, COIN_TYPE_IDENTITY,
};
use crate::core::{
    compose_chain_commit, compose_chain_reveal, compose_entry_commit, compose_entry_reveal, Chain,
    Entry, Transaction,
};
use crate::error::{FactomError, Result};
use crate::network::factomd::{self, FactoidSubmitResult};
use crate::network::walletd::{AddressPair, BalancePair, ComposeResult, WalletBackup, WalletBalances};
use crate::network::{Client, Request, Target};
use crate::storage::{read_legacy_wallet, DbSeed, KeyTree, NextSeed, TransactionPool, WalletDb, WalletKey};
use crate::utils::current_timestamp;
use data_encoding::HEXLOWER;
use log::{info, warn};
use serde_json::json;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, RwLock};

pub const WALLET_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const WALLET_API_VERSION: &str = "2.0";

// All wallet addresses come from account 0, external chain
const BIP44_ACCOUNT: u32 = 0;
const BIP44_CHAIN: u32 = 0;

struct Unlocked {
    key: WalletKey,
    until_ms: u64,
}

/// The wallet server's state: one key store and the named transactions in
/// progress
///
/// Mutations are serialised under a single mutex. Reads of stored keys go
/// straight to sled.
pub struct Wallet {
    db: WalletDb,
    transactions: TransactionPool,
    write_lock: Mutex<()>,
    unlocked: RwLock<Option<Unlocked>>,
    factomd: Option<Client>,
    ec_rate: Option<u64>,
}

fn address_pair_fct(addr: &FactoidAddress) -> AddressPair {
    AddressPair {
        public: addr.pub_string(),
        secret: addr.sec_string(),
    }
}

fn address_pair_ec(addr: &EcAddress) -> AddressPair {
    AddressPair {
        public: addr.pub_string(),
        secret: addr.sec_string(),
    }
}

fn address_pair_id(key: &IdentityKey) -> AddressPair {
    AddressPair {
        public: key.pub_string(),
        secret: key.sec_string(),
    }
}

/// A parsed secret ready to store
enum ImportedKey {
    Factoid(FactoidAddress),
    EntryCredit(EcAddress),
}

impl ImportedKey {
    fn parse(secret: &str) -> Result<ImportedKey> {
        match classify(secret) {
            AddressKind::FactoidSec => Ok(ImportedKey::Factoid(FactoidAddress::from_secret_string(secret)?)),
            AddressKind::EcSec => Ok(ImportedKey::EntryCredit(EcAddress::from_secret_string(secret)?)),
            _ => Err(FactomError::InvalidAddress(
                "Expected an Fs or Es secret".to_string(),
            )),
        }
    }
}

impl Wallet {
    /// Plain wallets get their seed on open; encrypted ones on first unlock
    pub fn open(db: WalletDb, factomd: Option<Client>) -> Result<Wallet> {
        let wallet = Wallet {
            db,
            transactions: TransactionPool::new(),
            write_lock: Mutex::new(()),
            unlocked: RwLock::new(None),
            factomd,
            ec_rate: None,
        };
        if wallet.db.is_encrypted() {
            info!("Opened encrypted wallet; locked until unlock-wallet");
        } else {
            let _guard = wallet.lock_writes();
            wallet.get_or_create_seed(None)?;
            info!("Opened wallet");
        }
        Ok(wallet)
    }

    /// Use a fixed EC rate instead of asking factomd
    pub fn with_ec_rate(mut self, rate: u64) -> Wallet {
        self.ec_rate = Some(rate);
        self
    }

    pub fn close(self) -> Result<()> {
        info!("Closing wallet");
        self.db.close()
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn factomd(&self) -> Result<&Client> {
        self.factomd
            .as_ref()
            .ok_or_else(|| FactomError::Config("No factomd endpoint configured".to_string()))
    }

    pub fn ec_rate(&self) -> Result<u64> {
        match self.ec_rate {
            Some(rate) => Ok(rate),
            None => factomd::entry_credit_rate(self.factomd()?),
        }
    }

    pub fn is_encrypted(&self) -> bool {
        self.db.is_encrypted()
    }

    pub fn is_locked(&self) -> bool {
        if !self.is_encrypted() {
            return false;
        }
        let state = self.unlocked.read().unwrap_or_else(|e| e.into_inner());
        match (state.as_ref(), current_timestamp()) {
            (Some(u), Ok(now)) => u.until_ms <= now,
            _ => true,
        }
    }

    /// Unlock for `timeout` seconds; returns the expiry in Unix seconds
    pub fn unlock(&self, passphrase: &str, timeout: u64) -> Result<u64> {
        let _guard = self.lock_writes();
        let key = self.db.unlock(passphrase)?;
        let until_ms = current_timestamp()?.saturating_add(timeout.saturating_mul(1000));
        {
            let mut state = self.unlocked.write().unwrap_or_else(|e| e.into_inner());
            *state = Some(Unlocked { key, until_ms });
        }
        self.with_key(|key| self.get_or_create_seed(key).map(|_| ()))?;
        info!("Wallet unlocked for {timeout}s");
        Ok(until_ms / 1000)
    }

    pub fn lock(&self) {
        let mut state = self.unlocked.write().unwrap_or_else(|e| e.into_inner());
        *state = None;
    }

    /// Run `f` with the key that secret records need, or fail with WalletLocked
    fn with_key<R>(&self, f: impl FnOnce(Option<&WalletKey>) -> Result<R>) -> Result<R> {
        if !self.is_encrypted() {
            return f(None);
        }
        let state = self.unlocked.read().unwrap_or_else(|e| e.into_inner());
        match state.as_ref() {
            Some(u) if u.until_ms > current_timestamp()? => f(Some(&u.key)),
            _ => Err(FactomError::WalletLocked),
        }
    }

    /// Caller holds the write lock
    fn get_or_create_seed(&self, key: Option<&WalletKey>) -> Result<DbSeed> {
        if self.db.get_next_seed()?.is_none() {
            self.db.put_next_seed(&NextSeed::default())?;
        }
        if let Some(seed) = self.db.get_db_seed(key)? {
            return Ok(seed);
        }
        let mnemonic = new_mnemonic()?;
        let seed = DbSeed {
            seed: mnemonic_to_seed(&mnemonic)?.to_vec(),
            mnemonic,
        };
        self.db.put_db_seed(&seed, key)?;
        info!("Created new wallet seed");
        Ok(seed)
    }

    /// Derive the next key for `coin` and advance its counter
    fn next_derived_seed(&self, key: Option<&WalletKey>, coin: u32) -> Result<[u8; 32]> {
        let seed = self.get_or_create_seed(key)?;
        let mut next = self.db.get_next_seed()?.unwrap_or_default();
        let counter = match coin {
            COIN_TYPE_FACTOID => &mut next.factoid,
            COIN_TYPE_ENTRY_CREDIT => &mut next.entry_credit,
            _ => &mut next.identity,
        };
        let derived = bip44_seed(&seed.seed, coin, BIP44_ACCOUNT, BIP44_CHAIN, *counter)?;
        *counter += 1;
        self.db.put_next_seed(&next)?;
        Ok(derived)
    }

    pub fn generate_factoid_address(&self) -> Result<AddressPair> {
        let _guard = self.lock_writes();
        self.with_key(|key| {
            let addr = FactoidAddress::from_seed(&self.next_derived_seed(key, COIN_TYPE_FACTOID)?)?;
            self.db.put_secret(KeyTree::Factoids, &addr.pub_string(), addr.seed(), key)?;
            info!("Generated factoid address {}", addr.pub_string());
            Ok(address_pair_fct(&addr))
        })
    }

    pub fn generate_ec_address(&self) -> Result<AddressPair> {
        let _guard = self.lock_writes();
        self.with_key(|key| {
            let addr = EcAddress::from_seed(&self.next_derived_seed(key, COIN_TYPE_ENTRY_CREDIT)?)?;
            self.db.put_secret(KeyTree::EntryCredits, &addr.pub_string(), addr.seed(), key)?;
            info!("Generated entry credit address {}", addr.pub_string());
            Ok(address_pair_ec(&addr))
        })
    }

    pub fn generate_identity_key(&self) -> Result<AddressPair> {
        let _guard = self.lock_writes();
        self.with_key(|key| {
            let id = IdentityKey::from_seed(&self.next_derived_seed(key, COIN_TYPE_IDENTITY)?)?;
            self.db.put_secret(KeyTree::IdentityKeys, &id.pub_string(), id.seed(), key)?;
            info!("Generated identity key {}", id.pub_string());
            Ok(address_pair_id(&id))
        })
    }

    /// All secrets are parsed before any is stored
    pub fn import_addresses(&self, secrets: &[String]) -> Result<Vec<AddressPair>> {
        let parsed = secrets
            .iter()
            .map(|s| ImportedKey::parse(s))
            .collect::<Result<Vec<_>>>()?;

        let _guard = self.lock_writes();
        self.with_key(|key| {
            let mut pairs = Vec::with_capacity(parsed.len());
            for imported in &parsed {
                let pair = match imported {
                    ImportedKey::Factoid(addr) => {
                        self.db.put_secret(KeyTree::Factoids, &addr.pub_string(), addr.seed(), key)?;
                        address_pair_fct(addr)
                    }
                    ImportedKey::EntryCredit(addr) => {
                        self.db.put_secret(KeyTree::EntryCredits, &addr.pub_string(), addr.seed(), key)?;
                        address_pair_ec(addr)
                    }
                };
                info!("Imported address {}", pair.public);
                pairs.push(pair);
            }
            Ok(pairs)
        })
    }

    pub fn import_identity_keys(&self, secrets: &[String]) -> Result<Vec<AddressPair>> {
        let parsed = secrets
            .iter()
            .map(|s| IdentityKey::from_secret_string(s))
            .collect::<Result<Vec<_>>>()?;

        let _guard = self.lock_writes();
        self.with_key(|key| {
            let mut pairs = Vec::with_capacity(parsed.len());
            for id in &parsed {
                self.db.put_secret(KeyTree::IdentityKeys, &id.pub_string(), id.seed(), key)?;
                info!("Imported identity key {}", id.pub_string());
                pairs.push(address_pair_id(id));
            }
            Ok(pairs)
        })
    }

    /// The single address of a Koinify sale wallet
    pub fn import_koinify(&self, words: &str) -> Result<AddressPair> {
        let addr = koinify_factoid_address(words)?;
        let _guard = self.lock_writes();
        self.with_key(|key| {
            self.db.put_secret(KeyTree::Factoids, &addr.pub_string(), addr.seed(), key)?;
            info!("Imported koinify address {}", addr.pub_string());
            Ok(address_pair_fct(&addr))
        })
    }

    /// Re-import every address of a v1 wallet file
    pub fn import_legacy<P: AsRef<Path>>(&self, path: P) -> Result<Vec<AddressPair>> {
        let records = read_legacy_wallet(path)?;
        let secrets = records
            .iter()
            .map(|(_, record)| record.secret_string())
            .collect::<Result<Vec<_>>>()?;
        info!("Importing {} addresses from v1 wallet", secrets.len());
        self.import_addresses(&secrets)
    }

    fn address_tree(public: &str) -> Result<KeyTree> {
        match classify(public) {
            AddressKind::FactoidPub => Ok(KeyTree::Factoids),
            AddressKind::EcPub => Ok(KeyTree::EntryCredits),
            _ => Err(FactomError::InvalidAddress(public.to_string())),
        }
    }

    pub fn get_address(&self, public: &str) -> Result<AddressPair> {
        let tree = Self::address_tree(public)?;
        self.with_key(|key| {
            let seed = self.db.get_secret(tree, public, key)?;
            match tree {
                KeyTree::Factoids => Ok(address_pair_fct(&FactoidAddress::from_seed(&seed)?)),
                _ => Ok(address_pair_ec(&EcAddress::from_seed(&seed)?)),
            }
        })
    }

    fn factoid_key(&self, public: &str, key: Option<&WalletKey>) -> Result<FactoidAddress> {
        FactoidAddress::from_seed(&self.db.get_secret(KeyTree::Factoids, public, key)?)
    }

    fn ec_key(&self, public: &str, key: Option<&WalletKey>) -> Result<EcAddress> {
        EcAddress::from_seed(&self.db.get_secret(KeyTree::EntryCredits, public, key)?)
    }

    fn identity_key(&self, public: &str, key: Option<&WalletKey>) -> Result<IdentityKey> {
        if !is_valid_identity_key(public) {
            return Err(FactomError::InvalidAddress(public.to_string()));
        }
        IdentityKey::from_seed(&self.db.get_secret(KeyTree::IdentityKeys, public, key)?)
    }

    pub fn get_identity_key(&self, public: &str) -> Result<AddressPair> {
        self.with_key(|key| Ok(address_pair_id(&self.identity_key(public, key)?)))
    }

    /// Factoid addresses first, then entry credit addresses
    pub fn all_addresses(&self) -> Result<Vec<AddressPair>> {
        self.with_key(|key| {
            let mut pairs = vec![];
            for (_, seed) in self.db.secrets(KeyTree::Factoids, key)? {
                pairs.push(address_pair_fct(&FactoidAddress::from_seed(&seed)?));
            }
            for (_, seed) in self.db.secrets(KeyTree::EntryCredits, key)? {
                pairs.push(address_pair_ec(&EcAddress::from_seed(&seed)?));
            }
            Ok(pairs)
        })
    }

    pub fn all_identity_keys(&self) -> Result<Vec<AddressPair>> {
        self.with_key(|key| {
            self.db
                .secrets(KeyTree::IdentityKeys, key)?
                .into_iter()
                .map(|(_, seed)| Ok(address_pair_id(&IdentityKey::from_seed(&seed)?)))
                .collect()
        })
    }

    pub fn remove_address(&self, public: &str) -> Result<()> {
        let tree = Self::address_tree(public)?;
        let _guard = self.lock_writes();
        self.db.remove(tree, public)?;
        info!("Removed address {public}");
        Ok(())
    }

    pub fn remove_identity_key(&self, public: &str) -> Result<()> {
        if !is_valid_identity_key(public) {
            return Err(FactomError::InvalidAddress(public.to_string()));
        }
        let _guard = self.lock_writes();
        self.db.remove(KeyTree::IdentityKeys, public)?;
        info!("Removed identity key {public}");
        Ok(())
    }

    /// Mnemonic plus every stored secret
    pub fn backup(&self) -> Result<WalletBackup> {
        let _guard = self.lock_writes();
        let wallet_seed = self.with_key(|key| Ok(self.get_or_create_seed(key)?.mnemonic.clone()))?;
        Ok(WalletBackup {
            wallet_seed,
            addresses: self.all_addresses()?,
            identity_keys: self.all_identity_keys()?,
        })
    }

    /// Acknowledged and saved totals over every held address
    pub fn balances(&self) -> Result<WalletBalances> {
        let client = self.factomd()?;
        let fct = self.db.publics(KeyTree::Factoids)?;
        let ec = self.db.publics(KeyTree::EntryCredits)?;

        let mut balances = WalletBalances::default();
        if !fct.is_empty() {
            balances.factoid = sum_balances(factomd::multiple_fct_balances(client, &fct)?.balances.iter())?;
        }
        if !ec.is_empty() {
            balances.entry_credit = sum_balances(factomd::multiple_ec_balances(client, &ec)?.balances.iter())?;
        }
        Ok(balances)
    }

    pub fn new_transaction(&self, name: &str) -> Result<Transaction> {
        let _guard = self.lock_writes();
        let tx = self.transactions.create(name, Transaction::new()?)?;
        info!("New transaction {name}");
        Ok(tx)
    }

    pub fn delete_transaction(&self, name: &str) -> Result<Transaction> {
        let _guard = self.lock_writes();
        let tx = self.transactions.remove(name)?;
        info!("Deleted transaction {name}");
        Ok(tx)
    }

    pub fn get_transaction(&self, name: &str) -> Result<Transaction> {
        self.transactions.get(name)
    }

    pub fn transactions(&self) -> Vec<(String, Transaction)> {
        self.transactions.get_all()
    }

    fn factoid_public(address: &str) -> Result<[u8; 32]> {
        match classify(address) {
            AddressKind::FactoidPub => crate::address::rcd_hash_from_string(address),
            _ => Err(FactomError::InvalidAddress(format!("{address} is not a factoid address"))),
        }
    }

    pub fn add_input(&self, name: &str, address: &str, amount: u64) -> Result<Transaction> {
        let rcd_hash = Self::factoid_public(address)?;
        let _guard = self.lock_writes();
        self.transactions.update(name, |tx| tx.add_input(rcd_hash, amount))
    }

    pub fn add_output(&self, name: &str, address: &str, amount: u64) -> Result<Transaction> {
        let rcd_hash = Self::factoid_public(address)?;
        let _guard = self.lock_writes();
        self.transactions.update(name, |tx| tx.add_output(rcd_hash, amount))
    }

    pub fn add_ec_output(&self, name: &str, address: &str, amount: u64) -> Result<Transaction> {
        if classify(address) != AddressKind::EcPub {
            return Err(FactomError::InvalidAddress(format!("{address} is not an entry credit address")));
        }
        let ec_public = crate::address::ec_public_from_string(address)?;
        let _guard = self.lock_writes();
        self.transactions.update(name, |tx| tx.add_ec_output(ec_public, amount))
    }

    /// Pay the required fee out of one input. Inputs must already equal outputs.
    pub fn add_fee(&self, name: &str, address: &str) -> Result<Transaction> {
        let rcd_hash = Self::factoid_public(address)?;
        let rate = self.ec_rate()?;
        let _guard = self.lock_writes();
        self.transactions.update(name, |tx| {
            ensure_balanced(tx)?;
            let fee = tx.required_fee(rate)?;
            tx.add_fee_to_input(&rcd_hash, fee)
        })
    }

    /// Take the required fee out of one output. Inputs must already equal outputs.
    pub fn sub_fee(&self, name: &str, address: &str) -> Result<Transaction> {
        let rcd_hash = Self::factoid_public(address)?;
        let rate = self.ec_rate()?;
        let _guard = self.lock_writes();
        self.transactions.update(name, |tx| {
            ensure_balanced(tx)?;
            let fee = tx.required_fee(rate)?;
            tx.sub_fee_from_output(&rcd_hash, fee)
        })
    }

    /// Validate, then sign every input with its held key
    pub fn sign_transaction(&self, name: &str, force: bool) -> Result<Transaction> {
        let rate = if force { 0 } else { self.ec_rate()? };
        let _guard = self.lock_writes();
        self.with_key(|key| {
            self.transactions.update(name, |tx| {
                tx.validate(rate, force)?;
                let keys = tx
                    .get_inputs()
                    .iter()
                    .map(|input| self.factoid_key(&factoid_pub_string(input.get_address()), key))
                    .collect::<Result<Vec<_>>>()?;
                let refs: Vec<&FactoidAddress> = keys.iter().collect();
                tx.sign(&refs)
            })
        })
    }

    /// The `factoid-submit` request for a signed transaction
    pub fn compose_transaction(&self, name: &str) -> Result<Request> {
        let tx = self.transactions.get(name)?;
        if !tx.is_signed() {
            return Err(FactomError::Transaction(format!("Transaction {name} is not signed")));
        }
        let params = json!({ "transaction": HEXLOWER.encode(&tx.marshal()?) });
        Ok(Request::new("factoid-submit", 0, Some(params)))
    }

    pub fn transaction_hash(&self, name: &str) -> Result<String> {
        self.transactions.get(name)?.txid_hex()
    }

    /// Compose, submit and forget. The transaction is kept if factomd refuses it.
    pub fn send_transaction(&self, name: &str) -> Result<FactoidSubmitResult> {
        let request = self.compose_transaction(name)?;
        let result: FactoidSubmitResult = self.factomd()?.send(Target::Factomd, &request)?;
        let _guard = self.lock_writes();
        self.transactions.remove(name)?;
        info!("Sent transaction {name} as {}", result.tx_id);
        Ok(result)
    }

    pub fn compose_chain(&self, chain: &Chain, ec_pub: &str) -> Result<ComposeResult> {
        self.with_key(|key| {
            let ec = self.ec_key(ec_pub, key)?;
            Ok(ComposeResult {
                commit: compose_chain_commit(chain, &ec)?,
                reveal: compose_chain_reveal(chain)?,
            })
        })
    }

    pub fn compose_entry(&self, entry: &Entry, ec_pub: &str) -> Result<ComposeResult> {
        self.with_key(|key| {
            let ec = self.ec_key(ec_pub, key)?;
            Ok(ComposeResult {
                commit: compose_entry_commit(entry, &ec)?,
                reveal: compose_entry_reveal(entry)?,
            })
        })
    }

    /// Ed25519 signature by a held FA, EC or identity key
    pub fn sign_data(&self, signer: &str, data: &[u8]) -> Result<([u8; 32], [u8; 64])> {
        self.with_key(|key| match classify(signer) {
            AddressKind::FactoidPub => sign_with(&self.factoid_key(signer, key)?, data),
            AddressKind::EcPub => sign_with(&self.ec_key(signer, key)?, data),
            _ if signer.starts_with("idpub") => sign_with(&self.identity_key(signer, key)?, data),
            _ => {
                warn!("sign-data with unusable signer");
                Err(FactomError::InvalidAddress(signer.to_string()))
            }
        })
    }
}

fn sign_with<S: Signer>(signer: &S, data: &[u8]) -> Result<([u8; 32], [u8; 64])> {
    Ok((signer.public_key(), signer.sign(data)?))
}

fn ensure_balanced(tx: &Transaction) -> Result<()> {
    let spent = tx
        .total_outputs()?
        .checked_add(tx.total_ec_outputs()?)
        .ok_or_else(|| FactomError::Transaction("Amount overflow".to_string()))?;
    if tx.total_inputs()? != spent {
        return Err(FactomError::Transaction(
            "Inputs and outputs don't add up".to_string(),
        ));
    }
    Ok(())
}

fn sum_balances<'a, I>(rows: I) -> Result<BalancePair>
where
    I: Iterator<Item = &'a factomd::AddressBalance>,
{
    rows.filter(|row| row.err.is_empty())
        .try_fold(BalancePair::default(), |acc, row| {
            match (acc.ack.checked_add(row.ack), acc.saved.checked_add(row.saved)) {
                (Some(ack), Some(saved)) => Ok(BalancePair { ack, saved }),
                _ => Err(FactomError::Transaction("Balance overflow".to_string())),
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{LegacyKind, LegacyRecord};

    // Fs1KWJrpLdfucvmYwN2nWrwepLn8ercpMbzXshd1g8zyhKXLVLWj is the all-zero seed
    const FS_ZERO: &str = "Fs1KWJrpLdfucvmYwN2nWrwepLn8ercpMbzXshd1g8zyhKXLVLWj";
    const FA_ZERO: &str = "FA1zT4aFpEvcnPqPCigB3fvGu4Q4mTXY22iiuV69DqE1pNhdF2MC";
    const ES_ZERO: &str = "Es2Rf7iM6PdsqfYCo3D1tnAR65SkLENyWJG1deUzpRMQmbh9F3eG";
    const EC_ZERO: &str = "EC2DKSYyRcNWf7RS963VFYgMExoHRYLHVeCfQ9PGPmNzwrcmgm2r";

    fn wallet() -> Wallet {
        Wallet::open(WalletDb::temporary().unwrap(), None)
            .unwrap()
            .with_ec_rate(1000)
    }

    #[test]
    fn test_generated_addresses_advance() {
        let wallet = wallet();
        let a = wallet.generate_factoid_address().unwrap();
        let b = wallet.generate_factoid_address().unwrap();
        let e = wallet.generate_ec_address().unwrap();
        assert_ne!(a.public, b.public);
        assert!(a.public.starts_with("FA"));
        assert!(e.public.starts_with("EC"));
        assert_eq!(
            wallet.db.get_next_seed().unwrap(),
            Some(NextSeed {
                factoid: 2,
                entry_credit: 1,
                identity: 0
            })
        );

        // Same seed, same first address
        let seed = wallet.db.get_db_seed(None).unwrap().unwrap();
        let first = FactoidAddress::from_seed(
            &bip44_seed(&seed.seed, COIN_TYPE_FACTOID, 0, 0, 0).unwrap(),
        )
        .unwrap();
        assert_eq!(first.pub_string(), a.public);
    }

    #[test]
    fn test_import_does_not_advance() {
        let wallet = wallet();
        let pairs = wallet
            .import_addresses(&[FS_ZERO.to_string(), ES_ZERO.to_string()])
            .unwrap();
        assert_eq!(pairs[0].public, FA_ZERO);
        assert_eq!(pairs[1].public, EC_ZERO);
        assert_eq!(wallet.db.get_next_seed().unwrap(), Some(NextSeed::default()));

        assert_eq!(wallet.get_address(FA_ZERO).unwrap().secret, FS_ZERO);
        assert_eq!(wallet.all_addresses().unwrap().len(), 2);
    }

    #[test]
    fn test_import_rejects_publics_and_stores_nothing() {
        let wallet = wallet();
        let err = wallet
            .import_addresses(&[FS_ZERO.to_string(), FA_ZERO.to_string()])
            .unwrap_err();
        assert!(matches!(err, FactomError::InvalidAddress(_)));
        assert!(wallet.all_addresses().unwrap().is_empty());
    }

    #[test]
    fn test_remove_and_lookup_miss() {
        let wallet = wallet();
        wallet.import_addresses(&[FS_ZERO.to_string()]).unwrap();
        wallet.remove_address(FA_ZERO).unwrap();
        assert_eq!(
            wallet.get_address(FA_ZERO).unwrap_err(),
            FactomError::NoSuchAddress(FA_ZERO.to_string())
        );
    }

    #[test]
    fn test_transaction_flow() {
        let wallet = wallet();
        wallet.import_addresses(&[FS_ZERO.to_string()]).unwrap();
        let to = wallet.generate_factoid_address().unwrap();

        wallet.new_transaction("tx").unwrap();
        assert_eq!(
            wallet.new_transaction("tx").unwrap_err(),
            FactomError::TxExists("tx".to_string())
        );
        wallet.add_input("tx", FA_ZERO, 1000).unwrap();
        // Same input again replaces the amount
        wallet.add_input("tx", FA_ZERO, 5000).unwrap();
        wallet.add_output("tx", &to.public, 5000).unwrap();
        assert!(wallet.add_output("tx", EC_ZERO, 1).is_err());
        assert!(wallet.add_ec_output("tx", FA_ZERO, 1).is_err());

        let tx = wallet.add_fee("tx", FA_ZERO).unwrap();
        assert_eq!(tx.get_inputs().len(), 1);
        let fee = tx.required_fee(1000).unwrap();
        assert_eq!(tx.get_inputs()[0].get_amount(), 5000 + fee);

        assert!(wallet.compose_transaction("tx").is_err());
        let tx = wallet.sign_transaction("tx", false).unwrap();
        assert!(tx.verify_signatures());

        let request = wallet.compose_transaction("tx").unwrap();
        assert_eq!(request.method, "factoid-submit");
        let hex = request.params.unwrap()["transaction"].as_str().unwrap().to_string();
        assert_eq!(HEXLOWER.encode(&tx.marshal().unwrap()), hex);

        assert_eq!(wallet.transaction_hash("tx").unwrap(), tx.txid_hex().unwrap());
        wallet.delete_transaction("tx").unwrap();
        assert!(wallet.transactions().is_empty());
    }

    #[test]
    fn test_add_fee_needs_balanced_transaction() {
        let wallet = wallet();
        wallet.new_transaction("tx").unwrap();
        wallet.add_input("tx", FA_ZERO, 10).unwrap();
        let err = wallet.add_fee("tx", FA_ZERO).unwrap_err();
        assert_eq!(err, FactomError::Transaction("Inputs and outputs don't add up".to_string()));
    }

    #[test]
    fn test_sign_requires_held_inputs() {
        let wallet = wallet();
        wallet.new_transaction("tx").unwrap();
        wallet.add_input("tx", FA_ZERO, 10).unwrap();
        let err = wallet.sign_transaction("tx", true).unwrap_err();
        assert_eq!(err, FactomError::NoSuchAddress(FA_ZERO.to_string()));
    }

    #[test]
    fn test_signed_transaction_refuses_edits() {
        let wallet = wallet();
        wallet.import_addresses(&[FS_ZERO.to_string()]).unwrap();
        wallet.new_transaction("tx").unwrap();
        wallet.add_input("tx", FA_ZERO, 1000).unwrap();
        wallet.add_output("tx", FA_ZERO, 1000).unwrap();
        let signed = wallet.sign_transaction("tx", true).unwrap();

        let frozen = FactomError::Transaction("Transaction is already signed".to_string());
        assert_eq!(wallet.add_output("tx", FA_ZERO, 1).unwrap_err(), frozen);
        assert_eq!(wallet.add_input("tx", FA_ZERO, 5000).unwrap_err(), frozen);
        assert_eq!(wallet.add_ec_output("tx", EC_ZERO, 1).unwrap_err(), frozen);
        assert_eq!(wallet.add_fee("tx", FA_ZERO).unwrap_err(), frozen);
        assert_eq!(wallet.sub_fee("tx", FA_ZERO).unwrap_err(), frozen);

        let tx = wallet.get_transaction("tx").unwrap();
        assert_eq!(tx, signed);
        assert!(tx.is_signed());
        assert!(wallet.compose_transaction("tx").is_ok());
    }

    #[test]
    fn test_balance_sums() {
        let row = |ack: i64, saved: i64, err: &str| factomd::AddressBalance {
            ack,
            saved,
            err: err.to_string(),
        };
        let rows = [row(5, 3, ""), row(7, 7, ""), row(100, 100, "bad address")];
        assert_eq!(
            sum_balances(rows.iter()).unwrap(),
            BalancePair { ack: 12, saved: 10 }
        );

        let huge = [row(i64::MAX, 0, ""), row(1, 0, "")];
        assert_eq!(
            sum_balances(huge.iter()).unwrap_err(),
            FactomError::Transaction("Balance overflow".to_string())
        );
        let huge = [row(0, i64::MAX, ""), row(0, 1, "")];
        assert!(sum_balances(huge.iter()).is_err());
    }

    #[test]
    fn test_compose_entry_and_sign_data() {
        let wallet = wallet();
        wallet.import_addresses(&[ES_ZERO.to_string()]).unwrap();
        let entry = Entry::new([0x11; 32], vec![b"a".to_vec()], b"b".to_vec());
        let composed = wallet.compose_entry(&entry, EC_ZERO).unwrap();
        assert_eq!(composed.commit.method, "commit-entry");
        assert_eq!(composed.reveal.method, "reveal-entry");

        let (public, signature) = wallet.sign_data(EC_ZERO, b"data").unwrap();
        assert!(crate::utils::ed25519_verify(&public, &signature, b"data"));
        assert!(wallet.sign_data("nonsense", b"data").is_err());
    }

    #[test]
    fn test_identity_keys() {
        let wallet = wallet();
        let generated = wallet.generate_identity_key().unwrap();
        assert!(generated.public.starts_with("idpub"));
        assert_eq!(wallet.get_identity_key(&generated.public).unwrap(), generated);
        assert_eq!(wallet.all_identity_keys().unwrap(), vec![generated.clone()]);

        let (public, _) = wallet.sign_data(&generated.public, b"x").unwrap();
        assert_eq!(crate::address::identity_pub_string(&public), generated.public);

        wallet.remove_identity_key(&generated.public).unwrap();
        assert!(wallet.all_identity_keys().unwrap().is_empty());
    }

    #[test]
    fn test_backup_holds_mnemonic() {
        let wallet = wallet();
        wallet.generate_ec_address().unwrap();
        let backup = wallet.backup().unwrap();
        assert_eq!(backup.wallet_seed.split_whitespace().count(), 12);
        assert_eq!(backup.addresses.len(), 1);
    }

    #[test]
    fn test_encrypted_wallet_starts_locked() {
        let mut db = WalletDb::temporary().unwrap();
        db.init_encryption("passphrase").unwrap();
        let wallet = Wallet::open(db, None).unwrap();

        assert!(wallet.is_locked());
        assert_eq!(wallet.generate_factoid_address().unwrap_err(), FactomError::WalletLocked);
        assert!(wallet.unlock("wrong", 60).is_err());

        wallet.unlock("passphrase", 60).unwrap();
        assert!(!wallet.is_locked());
        let pair = wallet.generate_factoid_address().unwrap();
        assert_eq!(wallet.get_address(&pair.public).unwrap(), pair);

        wallet.lock();
        assert_eq!(wallet.get_address(&pair.public).unwrap_err(), FactomError::WalletLocked);
    }

    #[test]
    fn test_legacy_import() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v1");
        crate::storage::write_legacy_wallet(
            &path,
            &[(
                "main".to_string(),
                LegacyRecord {
                    kind: LegacyKind::Factoid,
                    secret: vec![0u8; 32],
                },
            )],
        )
        .unwrap();

        let wallet = wallet();
        let pairs = wallet.import_legacy(&path).unwrap();
        assert_eq!(pairs[0].public, FA_ZERO);
    }
}
