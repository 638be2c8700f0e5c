use crate::address::{identity_pub_string, identity_public_from_string, IdentityKey, Signer};
use crate::core::identity::IdentityContent;
use crate::core::Entry;
use crate::error::{FactomError, Result};
use crate::utils::ed25519_verify;
use data_encoding::HEXLOWER;
use log::{debug, warn};
use std::collections::HashSet;
use std::fmt;

pub const REPLACE_KEY_TAG: &str = "ReplaceKey";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Not a ReplaceKey entry, or its ExtIDs are the wrong shape
    Malformed(String),
    /// The key being replaced is not in the active set
    OldKeyNotActive,
    /// The replacement has been used by this identity before
    NewKeyReused,
    /// The signer is not in the active set
    SignerNotActive,
    /// The signer sits below the slot it is trying to replace
    SignerPriorityTooLow { signer: usize, slot: usize },
    BadSignature,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Malformed(why) => write!(f, "malformed replacement: {why}"),
            RejectReason::OldKeyNotActive => write!(f, "old key is not active"),
            RejectReason::NewKeyReused => write!(f, "new key was already used"),
            RejectReason::SignerNotActive => write!(f, "signer key is not active"),
            RejectReason::SignerPriorityTooLow { signer, slot } => {
                write!(f, "signer at priority {signer} cannot replace priority {slot}")
            }
            RejectReason::BadSignature => write!(f, "signature does not verify"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Accepted { slot: usize },
    Rejected(RejectReason),
}

impl ApplyOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ApplyOutcome::Accepted { .. })
    }
}

/// Every key the identity has ever held, retired ones included
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoricalSet {
    keys: HashSet<[u8; 32]>,
}

impl HistoricalSet {
    pub fn contains(&self, key: &[u8; 32]) -> bool {
        self.keys.contains(key)
    }

    pub fn insert(&mut self, key: [u8; 32]) -> bool {
        self.keys.insert(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Slot index is priority; 0 is the highest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveKeySet {
    slots: Vec<[u8; 32]>,
    history: HistoricalSet,
}

struct Replacement {
    old: String,
    new: String,
    signature: Vec<u8>,
    signer: String,
}

fn parse_replacement(entry: &Entry) -> std::result::Result<Replacement, RejectReason> {
    let ext_ids = entry.get_ext_ids();
    if ext_ids.len() != 5 {
        return Err(RejectReason::Malformed(format!(
            "expected 5 ExtIDs, found {}",
            ext_ids.len()
        )));
    }
    if ext_ids[0] != REPLACE_KEY_TAG.as_bytes() {
        return Err(RejectReason::Malformed("not a ReplaceKey entry".to_string()));
    }
    let text = |i: usize| {
        String::from_utf8(ext_ids[i].clone())
            .map_err(|_| RejectReason::Malformed(format!("ExtID {i} is not text")))
    };
    if ext_ids[3].len() != 64 {
        return Err(RejectReason::Malformed("signature is not 64 bytes".to_string()));
    }
    Ok(Replacement {
        old: text(1)?,
        new: text(2)?,
        signature: ext_ids[3].clone(),
        signer: text(4)?,
    })
}

fn replacement_message(chain_id: &str, old: &str, new: &str) -> Vec<u8> {
    let mut msg = Vec::with_capacity(chain_id.len() + old.len() + new.len());
    msg.extend_from_slice(chain_id.as_bytes());
    msg.extend_from_slice(old.as_bytes());
    msg.extend_from_slice(new.as_bytes());
    msg
}

impl ActiveKeySet {
    /// Initial keys from the identity's first entry
    pub fn from_first_entry(entry: &Entry) -> Result<ActiveKeySet> {
        let content = IdentityContent::parse(entry.get_content())?;
        let mut slots = Vec::with_capacity(content.keys.len());
        let mut history = HistoricalSet::default();
        for key in &content.keys {
            let public = identity_public_from_string(key)?;
            history.insert(public);
            slots.push(public);
        }
        Ok(ActiveKeySet { slots, history })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn priority_of(&self, key: &[u8; 32]) -> Option<usize> {
        self.slots.iter().position(|k| k == key)
    }

    pub fn history(&self) -> &HistoricalSet {
        &self.history
    }

    /// idpub strings, highest priority first
    pub fn keys(&self) -> Vec<String> {
        self.slots.iter().map(identity_pub_string).collect()
    }

    /// Single transition of the identity state machine. Rejections leave
    /// the set untouched.
    pub fn apply(&mut self, entry: &Entry, chain_id: &str) -> ApplyOutcome {
        match self.try_apply(entry, chain_id) {
            Ok(slot) => {
                debug!("Identity {chain_id}: key at priority {slot} replaced");
                ApplyOutcome::Accepted { slot }
            }
            Err(reason) => {
                warn!("Identity {chain_id}: rejected key replacement, {reason}");
                ApplyOutcome::Rejected(reason)
            }
        }
    }

    fn try_apply(&mut self, entry: &Entry, chain_id: &str) -> std::result::Result<usize, RejectReason> {
        let r = parse_replacement(entry)?;
        let key = |s: &str| {
            identity_public_from_string(s).map_err(|e| RejectReason::Malformed(e.to_string()))
        };
        let old = key(&r.old)?;
        let new = key(&r.new)?;
        let signer = key(&r.signer)?;

        let slot = self.priority_of(&old).ok_or(RejectReason::OldKeyNotActive)?;
        if self.history.contains(&new) {
            return Err(RejectReason::NewKeyReused);
        }
        let signer_slot = self.priority_of(&signer).ok_or(RejectReason::SignerNotActive)?;
        if signer_slot > slot {
            return Err(RejectReason::SignerPriorityTooLow {
                signer: signer_slot,
                slot,
            });
        }
        let msg = replacement_message(chain_id, &r.old, &r.new);
        if !ed25519_verify(&signer, &r.signature, &msg) {
            return Err(RejectReason::BadSignature);
        }

        self.slots[slot] = new;
        self.history.insert(new);
        Ok(slot)
    }
}

/// Keys active at `height`. `entries` are the chain's later entries with
/// their block heights, in chain order; anything that is not a valid
/// replacement is skipped.
pub fn active_keys_at_height(
    first_entry: &Entry,
    entries: &[(u32, Entry)],
    height: u32,
) -> Result<Vec<String>> {
    let chain_id = HEXLOWER.encode(first_entry.get_chain_id());
    let mut set = ActiveKeySet::from_first_entry(first_entry)?;
    for (entry_height, entry) in entries {
        if *entry_height > height {
            break;
        }
        set.apply(entry, &chain_id);
    }
    Ok(set.keys())
}

/// ReplaceKey entry for `chain_id`, signed by `signer`
pub fn build_key_replacement(
    chain_id: &str,
    old_key: &str,
    new_key: &str,
    signer: &IdentityKey,
) -> Result<Entry> {
    identity_public_from_string(old_key)?;
    identity_public_from_string(new_key)?;
    let chain_id_bytes = crate::utils::hex_decode_32(chain_id)
        .map_err(|_| FactomError::InvalidAddress(format!("{chain_id}: not a chain id")))?;

    let signature = signer.sign(&replacement_message(chain_id, old_key, new_key))?;
    let ext_ids = vec![
        REPLACE_KEY_TAG.as_bytes().to_vec(),
        old_key.as_bytes().to_vec(),
        new_key.as_bytes().to_vec(),
        signature.to_vec(),
        signer.pub_string().into_bytes(),
    ];
    Ok(Entry::new(chain_id_bytes, ext_ids, vec![]))
}
