//! Identity chains
//!
//! An identity is a chain whose first entry names it and lists its keys in
//! descending priority. Later `ReplaceKey` entries swap keys one slot at a
//! time; attributes and endorsements are signed records about identities
//! written to arbitrary chains.

pub mod attribute;
pub mod key_set;

use crate::address::{identity_public_from_string, IdentityKey};
use crate::core::{Chain, Entry};
use crate::error::{FactomError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub use attribute::{
    build_attribute_entry, build_endorsement_entry, validate_attribute_entry,
    validate_endorsement_entry, Attribute, AttributeRecord, EndorsementRecord,
};
pub use key_set::{
    active_keys_at_height, build_key_replacement, ActiveKeySet, ApplyOutcome, HistoricalSet,
    RejectReason,
};

pub const IDENTITY_CHAIN_TAG: &str = "IdentityChain";
pub const IDENTITY_VERSION: u32 = 1;

/// Content of an identity chain's first entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityContent {
    pub version: u32,
    pub keys: Vec<String>,
}

impl IdentityContent {
    /// Parse and check that every key is a distinct idpub
    pub fn parse(content: &[u8]) -> Result<IdentityContent> {
        let parsed: IdentityContent = serde_json::from_slice(content)?;
        if parsed.version != IDENTITY_VERSION {
            return Err(FactomError::Serialization(format!(
                "Unsupported identity version {}",
                parsed.version
            )));
        }
        if parsed.keys.is_empty() {
            return Err(FactomError::Serialization(
                "Identity declares no keys".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for key in &parsed.keys {
            identity_public_from_string(key)?;
            if !seen.insert(key.as_str()) {
                return Err(FactomError::InvalidAddress(format!(
                    "{key}: duplicate identity key"
                )));
            }
        }
        Ok(parsed)
    }
}

/// ExtIDs for the first entry: the tag followed by the name parts
pub fn identity_ext_ids(name: &[&str]) -> Vec<Vec<u8>> {
    let mut ext_ids = vec![IDENTITY_CHAIN_TAG.as_bytes().to_vec()];
    ext_ids.extend(name.iter().map(|part| part.as_bytes().to_vec()));
    ext_ids
}

/// The identity chain: first entry tagged `IdentityChain`, keys in priority order
pub fn new_identity_chain(name: &[&str], keys: &[String]) -> Result<Chain> {
    let content = serde_json::to_vec(&IdentityContent {
        version: IDENTITY_VERSION,
        keys: keys.to_vec(),
    })?;
    IdentityContent::parse(&content)?;
    Ok(Chain::new(Entry::new_first(identity_ext_ids(name), content)))
}

/// Convenience for building an identity from key pairs
pub fn new_identity_chain_from_keys(name: &[&str], keys: &[IdentityKey]) -> Result<Chain> {
    let keys: Vec<String> = keys.iter().map(|k| k.pub_string()).collect();
    new_identity_chain(name, &keys)
}
