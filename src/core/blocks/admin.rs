// Admin block entries are a tagged union on `adminidtype`. I read that field by
// name from the JSON object, then decode the rest with the variant's own schema.

use crate::error::{FactomError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinuteNumber {
    #[serde(rename = "minutenumber")]
    pub minute_number: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbSignatureValue {
    #[serde(rename = "pub")]
    pub public_key: String,
    #[serde(rename = "sig")]
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbSignature {
    #[serde(rename = "identityadminchainid")]
    pub identity_admin_chain_id: String,
    #[serde(rename = "prevdbsig")]
    pub prev_db_sig: DbSignatureValue,
}

/// Shared by the reveal (2) and add/replace (3) matryoshka variants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatryoshkaHash {
    #[serde(rename = "identitychainid")]
    pub identity_chain_id: String,
    #[serde(rename = "mhash")]
    pub mhash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncreaseServerCount {
    pub amount: u8,
}

/// Shared by the add federated (5), add audit (6) and remove federated (7) variants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerChange {
    #[serde(rename = "identitychainid")]
    pub identity_chain_id: String,
    #[serde(rename = "dbheight")]
    pub db_height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddSigningKey {
    #[serde(rename = "identitychainid")]
    pub identity_chain_id: String,
    #[serde(rename = "keypriority")]
    pub key_priority: u8,
    #[serde(rename = "publickey")]
    pub public_key: String,
    #[serde(rename = "dbheight")]
    pub db_height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddBtcAnchorKey {
    #[serde(rename = "identitychainid")]
    pub identity_chain_id: String,
    #[serde(rename = "keypriority")]
    pub key_priority: u8,
    #[serde(rename = "keytype")]
    pub key_type: u8,
    #[serde(rename = "ecdsapublickey")]
    pub ecdsa_public_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinbaseOutput {
    pub amount: u64,
    pub address: String,
    #[serde(rename = "useraddress", default)]
    pub user_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinbaseDescriptor {
    #[serde(default)]
    pub outputs: Vec<CoinbaseOutput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinbaseDescriptorCancel {
    #[serde(rename = "descriptor_height")]
    pub descriptor_height: u32,
    #[serde(rename = "descriptor_index")]
    pub descriptor_index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityFactoidAddress {
    #[serde(rename = "identitychainid")]
    pub identity_chain_id: String,
    #[serde(rename = "factoidaddress")]
    pub factoid_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityEfficiency {
    #[serde(rename = "identitychainid")]
    pub identity_chain_id: String,
    pub efficiency: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminEntry {
    MinuteNumber(MinuteNumber),
    DbSignature(DbSignature),
    RevealMatryoshkaHash(MatryoshkaHash),
    AddReplaceMatryoshkaHash(MatryoshkaHash),
    IncreaseServerCount(IncreaseServerCount),
    AddFederatedServer(ServerChange),
    AddAuditServer(ServerChange),
    RemoveFederatedServer(ServerChange),
    AddFederatedServerSigningKey(AddSigningKey),
    AddFederatedServerBitcoinAnchorKey(AddBtcAnchorKey),
    ServerFaultHandoff,
    CoinbaseDescriptor(CoinbaseDescriptor),
    CoinbaseDescriptorCancel(CoinbaseDescriptorCancel),
    AddAuthorityFactoidAddress(AuthorityFactoidAddress),
    AddAuthorityEfficiency(AuthorityEfficiency),
}

fn variant<T: serde::de::DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(FactomError::from)
}

impl AdminEntry {
    /// The numeric `adminidtype` of this variant
    pub fn admin_id_type(&self) -> u8 {
        match self {
            AdminEntry::MinuteNumber(_) => 0,
            AdminEntry::DbSignature(_) => 1,
            AdminEntry::RevealMatryoshkaHash(_) => 2,
            AdminEntry::AddReplaceMatryoshkaHash(_) => 3,
            AdminEntry::IncreaseServerCount(_) => 4,
            AdminEntry::AddFederatedServer(_) => 5,
            AdminEntry::AddAuditServer(_) => 6,
            AdminEntry::RemoveFederatedServer(_) => 7,
            AdminEntry::AddFederatedServerSigningKey(_) => 8,
            AdminEntry::AddFederatedServerBitcoinAnchorKey(_) => 9,
            AdminEntry::ServerFaultHandoff => 10,
            AdminEntry::CoinbaseDescriptor(_) => 11,
            AdminEntry::CoinbaseDescriptorCancel(_) => 12,
            AdminEntry::AddAuthorityFactoidAddress(_) => 13,
            AdminEntry::AddAuthorityEfficiency(_) => 14,
        }
    }

    pub fn from_value(value: Value) -> Result<AdminEntry> {
        let id = value
            .get("adminidtype")
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                FactomError::Serialization("Admin entry has no numeric adminidtype".to_string())
            })?;

        let entry = match id {
            0 => AdminEntry::MinuteNumber(variant(value)?),
            1 => AdminEntry::DbSignature(variant(value)?),
            2 => AdminEntry::RevealMatryoshkaHash(variant(value)?),
            3 => AdminEntry::AddReplaceMatryoshkaHash(variant(value)?),
            4 => AdminEntry::IncreaseServerCount(variant(value)?),
            5 => AdminEntry::AddFederatedServer(variant(value)?),
            6 => AdminEntry::AddAuditServer(variant(value)?),
            7 => AdminEntry::RemoveFederatedServer(variant(value)?),
            8 => AdminEntry::AddFederatedServerSigningKey(variant(value)?),
            9 => AdminEntry::AddFederatedServerBitcoinAnchorKey(variant(value)?),
            10 => AdminEntry::ServerFaultHandoff,
            11 => AdminEntry::CoinbaseDescriptor(variant(value)?),
            12 => AdminEntry::CoinbaseDescriptorCancel(variant(value)?),
            13 => AdminEntry::AddAuthorityFactoidAddress(variant(value)?),
            14 => AdminEntry::AddAuthorityEfficiency(variant(value)?),
            other => return Err(FactomError::UnknownAdminId(other)),
        };
        Ok(entry)
    }
}

impl<'de> Deserialize<'de> for AdminEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        AdminEntry::from_value(value).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ABlockHeader {
    #[serde(rename = "prevbackrefhash")]
    pub prev_back_ref_hash: String,
    #[serde(rename = "dbheight")]
    pub db_height: u32,
    #[serde(rename = "headerexpansionsize", default)]
    pub header_expansion_size: u64,
    #[serde(rename = "headerexpansionarea", default)]
    pub header_expansion_area: String,
    #[serde(rename = "messagecount")]
    pub message_count: u32,
    #[serde(rename = "bodysize")]
    pub body_size: u32,
    #[serde(rename = "adminchainid", default)]
    pub admin_chain_id: String,
    #[serde(rename = "chainid", default)]
    pub chain_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ABlock {
    pub header: ABlockHeader,
    pub entries: Vec<AdminEntry>,
    pub back_reference_hash: String,
    pub lookup_hash: String,
}

#[derive(Deserialize)]
struct RawABlock {
    header: ABlockHeader,
    #[serde(rename = "abentries", default)]
    entries: Vec<Value>,
    #[serde(rename = "backreferencehash", default)]
    back_reference_hash: String,
    #[serde(rename = "lookuphash", default)]
    lookup_hash: String,
}

impl ABlock {
    /// Decode keeping UnknownAdminId intact for the caller
    pub fn from_value(value: Value) -> Result<ABlock> {
        let raw: RawABlock = serde_json::from_value(value)?;
        let entries = raw
            .entries
            .into_iter()
            .map(AdminEntry::from_value)
            .collect::<Result<Vec<_>>>()?;
        Ok(ABlock {
            header: raw.header,
            entries,
            back_reference_hash: raw.back_reference_hash,
            lookup_hash: raw.lookup_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_adminidtype_may_come_last() {
        let value = json!({"minutenumber": 4, "adminidtype": 0});
        assert_eq!(
            AdminEntry::from_value(value).unwrap(),
            AdminEntry::MinuteNumber(MinuteNumber { minute_number: 4 })
        );
    }

    #[test]
    fn test_unknown_type_fails_fast() {
        let err = AdminEntry::from_value(json!({"adminidtype": 15})).unwrap_err();
        assert_eq!(err, FactomError::UnknownAdminId(15));
        assert!(AdminEntry::from_value(json!({"minutenumber": 1})).is_err());
    }

    #[test]
    fn test_shared_schemas_keep_their_tag() {
        let body = json!({"identitychainid": "888888", "dbheight": 10});
        let mut add = body.clone();
        add["adminidtype"] = json!(5);
        let mut remove = body;
        remove["adminidtype"] = json!(7);
        assert_eq!(AdminEntry::from_value(add).unwrap().admin_id_type(), 5);
        assert_eq!(AdminEntry::from_value(remove).unwrap().admin_id_type(), 7);
    }

    #[test]
    fn test_coinbase_and_fault_handoff() {
        let cb = json!({"adminidtype": 11, "outputs": [{"amount": 5, "address": "ab", "useraddress": "FA"}]});
        match AdminEntry::from_value(cb).unwrap() {
            AdminEntry::CoinbaseDescriptor(d) => assert_eq!(d.outputs[0].amount, 5),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            AdminEntry::from_value(json!({"adminidtype": 10})).unwrap(),
            AdminEntry::ServerFaultHandoff
        );
    }

    #[test]
    fn test_ablock_with_bad_entry() {
        let block = json!({
            "header": {"prevbackrefhash": "00", "dbheight": 1, "messagecount": 1, "bodysize": 2},
            "abentries": [{"adminidtype": 0, "minutenumber": 1}, {"adminidtype": 99}],
        });
        assert_eq!(
            ABlock::from_value(block).unwrap_err(),
            FactomError::UnknownAdminId(99)
        );
    }
}
