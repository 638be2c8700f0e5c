use crate::address::{identity_public_from_string, IdentityKey, Signer};
use crate::core::Entry;
use crate::error::{FactomError, Result};
use crate::utils::{ed25519_verify, hex_decode_32, sha256_digest};
use data_encoding::HEXLOWER;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const ATTRIBUTE_TAG: &str = "IdentityAttribute";
pub const ENDORSEMENT_TAG: &str = "IdentityAttributeEndorsement";

const CHAIN_ID_HEX_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: Value,
    pub value: Value,
}

/// A validated attribute entry
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeRecord {
    pub receiver_chain_id: String,
    pub destination_chain_id: String,
    pub signer_key: String,
    pub signer_chain_id: String,
    pub attributes: Vec<Attribute>,
}

/// A validated endorsement entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndorsementRecord {
    pub destination_chain_id: String,
    pub signer_key: String,
    pub signer_chain_id: String,
    pub entry_hash: String,
}

fn check_chain_id(field: &str, value: &str) -> Result<()> {
    if value.len() != CHAIN_ID_HEX_LEN || hex_decode_32(value).is_err() {
        return Err(FactomError::Serialization(format!(
            "{field} must be {CHAIN_ID_HEX_LEN} hex characters"
        )));
    }
    Ok(())
}

fn text_ext_id(entry: &Entry, i: usize) -> Result<String> {
    String::from_utf8(entry.get_ext_ids()[i].clone())
        .map_err(|_| FactomError::Serialization(format!("ExtID {i} is not text")))
}

fn attribute_message(receiver: &str, destination: &str, content: &[u8]) -> Vec<u8> {
    let mut msg = Vec::with_capacity(receiver.len() + destination.len() + 32);
    msg.extend_from_slice(receiver.as_bytes());
    msg.extend_from_slice(destination.as_bytes());
    msg.extend_from_slice(&sha256_digest(content));
    msg
}

fn endorsement_message(destination: &str, entry_hash: &str) -> Vec<u8> {
    let mut msg = Vec::with_capacity(destination.len() + entry_hash.len());
    msg.extend_from_slice(destination.as_bytes());
    msg.extend_from_slice(entry_hash.as_bytes());
    msg
}

/// Attribute entry on `destination_chain_id` about `receiver_chain_id`
pub fn build_attribute_entry(
    receiver_chain_id: &str,
    destination_chain_id: &str,
    attributes: &[Attribute],
    signer: &IdentityKey,
    signer_chain_id: &str,
) -> Result<Entry> {
    check_chain_id("receiver chain id", receiver_chain_id)?;
    check_chain_id("signer chain id", signer_chain_id)?;
    let destination = hex_decode_32(destination_chain_id)?;

    let content = serde_json::to_vec(attributes)?;
    let signature = signer.sign(&attribute_message(
        receiver_chain_id,
        destination_chain_id,
        &content,
    ))?;
    let ext_ids = vec![
        ATTRIBUTE_TAG.as_bytes().to_vec(),
        receiver_chain_id.as_bytes().to_vec(),
        signature.to_vec(),
        signer.pub_string().into_bytes(),
        signer_chain_id.as_bytes().to_vec(),
    ];
    Ok(Entry::new(destination, ext_ids, content))
}

/// Endorsement of the entry `entry_hash`, written to `destination_chain_id`
pub fn build_endorsement_entry(
    destination_chain_id: &str,
    entry_hash: &str,
    signer: &IdentityKey,
    signer_chain_id: &str,
) -> Result<Entry> {
    check_chain_id("signer chain id", signer_chain_id)?;
    hex_decode_32(entry_hash)?;
    let destination = hex_decode_32(destination_chain_id)?;

    let signature = signer.sign(&endorsement_message(destination_chain_id, entry_hash))?;
    let ext_ids = vec![
        ENDORSEMENT_TAG.as_bytes().to_vec(),
        signature.to_vec(),
        signer.pub_string().into_bytes(),
        signer_chain_id.as_bytes().to_vec(),
    ];
    Ok(Entry::new(destination, ext_ids, entry_hash.as_bytes().to_vec()))
}

// Neither validator checks whether the signer key was active for the signer's
// identity at the entry's height; callers with chain history can do that with
// active_keys_at_height.

pub fn validate_attribute_entry(entry: &Entry) -> Result<AttributeRecord> {
    let ext_ids = entry.get_ext_ids();
    if ext_ids.len() != 5 || ext_ids[0] != ATTRIBUTE_TAG.as_bytes() {
        return Err(FactomError::Serialization(
            "Not an IdentityAttribute entry".to_string(),
        ));
    }
    let receiver = text_ext_id(entry, 1)?;
    let signer_key = text_ext_id(entry, 3)?;
    let signer_chain_id = text_ext_id(entry, 4)?;
    check_chain_id("receiver chain id", &receiver)?;
    check_chain_id("signer chain id", &signer_chain_id)?;
    let public = identity_public_from_string(&signer_key)?;

    let destination = HEXLOWER.encode(entry.get_chain_id());
    let msg = attribute_message(&receiver, &destination, entry.get_content());
    if !ed25519_verify(&public, &ext_ids[2], &msg) {
        return Err(FactomError::Crypto(
            "Attribute signature does not verify".to_string(),
        ));
    }

    let attributes: Vec<Attribute> = serde_json::from_slice(entry.get_content())?;
    Ok(AttributeRecord {
        receiver_chain_id: receiver,
        destination_chain_id: destination,
        signer_key,
        signer_chain_id,
        attributes,
    })
}

pub fn validate_endorsement_entry(entry: &Entry) -> Result<EndorsementRecord> {
    let ext_ids = entry.get_ext_ids();
    if ext_ids.len() != 4 || ext_ids[0] != ENDORSEMENT_TAG.as_bytes() {
        return Err(FactomError::Serialization(
            "Not an IdentityAttributeEndorsement entry".to_string(),
        ));
    }
    let signer_key = text_ext_id(entry, 2)?;
    let signer_chain_id = text_ext_id(entry, 3)?;
    check_chain_id("signer chain id", &signer_chain_id)?;
    let public = identity_public_from_string(&signer_key)?;

    let entry_hash = String::from_utf8(entry.get_content().to_vec())
        .map_err(|_| FactomError::Serialization("Endorsed hash is not text".to_string()))?;
    hex_decode_32(&entry_hash)?;

    let destination = HEXLOWER.encode(entry.get_chain_id());
    if !ed25519_verify(&public, &ext_ids[1], &endorsement_message(&destination, &entry_hash)) {
        return Err(FactomError::Crypto(
            "Endorsement signature does not verify".to_string(),
        ));
    }
    Ok(EndorsementRecord {
        destination_chain_id: destination,
        signer_key,
        signer_chain_id,
        entry_hash,
    })
}
