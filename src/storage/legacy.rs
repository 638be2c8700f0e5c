// Reader for version 1 wallet files. Those kept every address in a single
// `addresses` tree, name -> { kind, secret }; the wallet re-imports each
// secret through its normal import path.

use crate::address::{EcAddress, FactoidAddress};
use crate::error::{FactomError, Result};
use crate::utils::{deserialize, serialize};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const LEGACY_ADDRESSES_TREE: &str = "addresses";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub enum LegacyKind {
    Factoid,
    EntryCredit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct LegacyRecord {
    pub kind: LegacyKind,
    pub secret: Vec<u8>,
}

impl LegacyRecord {
    /// Secret in its Fs/Es text form
    pub fn secret_string(&self) -> Result<String> {
        match self.kind {
            LegacyKind::Factoid => Ok(FactoidAddress::from_seed(&self.secret)?.sec_string()),
            LegacyKind::EntryCredit => Ok(EcAddress::from_seed(&self.secret)?.sec_string()),
        }
    }
}

/// Every record in a v1 wallet, by name
pub fn read_legacy_wallet<P: AsRef<Path>>(path: P) -> Result<Vec<(String, LegacyRecord)>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(FactomError::Io(format!("{}: no such wallet", path.display())));
    }
    let db = sled::open(path)?;
    let tree = db.open_tree(LEGACY_ADDRESSES_TREE)?;

    let mut records = vec![];
    for item in tree.iter() {
        let (k, v) = item?;
        let name = String::from_utf8_lossy(&k).into_owned();
        let record: LegacyRecord = deserialize(&v)
            .map_err(|e| FactomError::Serialization(format!("Legacy record {name}: {e}")))?;
        records.push((name, record));
    }
    Ok(records)
}

/// Write a v1 wallet; used to produce fixtures
pub fn write_legacy_wallet<P: AsRef<Path>>(path: P, records: &[(String, LegacyRecord)]) -> Result<()> {
    let db = sled::open(path)?;
    let tree = db.open_tree(LEGACY_ADDRESSES_TREE)?;
    for (name, record) in records {
        tree.insert(name.as_bytes(), serialize(record)?)?;
    }
    db.flush()?;
    Ok(())
}
