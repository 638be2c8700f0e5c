use crate::error::{FactomError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const ECID_SERVER_INDEX_NUMBER: u64 = 0;
pub const ECID_MINUTE_NUMBER: u64 = 1;
pub const ECID_CHAIN_COMMIT: u64 = 2;
pub const ECID_ENTRY_COMMIT: u64 = 3;
pub const ECID_BALANCE_INCREASE: u64 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerIndexNumber {
    #[serde(rename = "serverindexnumber")]
    pub server_index_number: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcMinuteNumber {
    pub number: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcChainCommit {
    pub version: u8,
    #[serde(rename = "millitime")]
    pub milli_time: String,
    #[serde(rename = "chainidhash")]
    pub chain_id_hash: String,
    pub weld: String,
    #[serde(rename = "entryhash")]
    pub entry_hash: String,
    pub credits: u8,
    #[serde(rename = "ecpubkey")]
    pub ec_pub_key: String,
    pub sig: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcEntryCommit {
    pub version: u8,
    #[serde(rename = "millitime")]
    pub milli_time: String,
    #[serde(rename = "entryhash")]
    pub entry_hash: String,
    pub credits: u8,
    #[serde(rename = "ecpubkey")]
    pub ec_pub_key: String,
    pub sig: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceIncrease {
    #[serde(rename = "ecpubkey")]
    pub ec_pub_key: String,
    #[serde(rename = "txid")]
    pub tx_id: String,
    pub index: u64,
    #[serde(rename = "numec")]
    pub num_ec: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EcEntry {
    ServerIndexNumber(ServerIndexNumber),
    MinuteNumber(EcMinuteNumber),
    ChainCommit(EcChainCommit),
    EntryCommit(EcEntryCommit),
    BalanceIncrease(BalanceIncrease),
}

/// factomd omits `ecid` from its JSON, so without one I go by the field each
/// variant alone carries
fn infer_ecid(value: &Value) -> Option<u64> {
    let has = |field: &str| value.get(field).is_some();
    if has("serverindexnumber") {
        Some(ECID_SERVER_INDEX_NUMBER)
    } else if has("chainidhash") {
        Some(ECID_CHAIN_COMMIT)
    } else if has("entryhash") {
        Some(ECID_ENTRY_COMMIT)
    } else if has("numec") {
        Some(ECID_BALANCE_INCREASE)
    } else if has("number") {
        Some(ECID_MINUTE_NUMBER)
    } else {
        None
    }
}

impl EcEntry {
    pub fn ecid(&self) -> u64 {
        match self {
            EcEntry::ServerIndexNumber(_) => ECID_SERVER_INDEX_NUMBER,
            EcEntry::MinuteNumber(_) => ECID_MINUTE_NUMBER,
            EcEntry::ChainCommit(_) => ECID_CHAIN_COMMIT,
            EcEntry::EntryCommit(_) => ECID_ENTRY_COMMIT,
            EcEntry::BalanceIncrease(_) => ECID_BALANCE_INCREASE,
        }
    }

    pub fn from_value(value: Value) -> Result<EcEntry> {
        let ecid = match value.get("ecid") {
            Some(id) => id.as_u64().ok_or_else(|| {
                FactomError::Serialization("ecid is not a number".to_string())
            })?,
            None => infer_ecid(&value).ok_or_else(|| {
                FactomError::Serialization("Unrecognised entry credit block entry".to_string())
            })?,
        };
        let entry = match ecid {
            ECID_SERVER_INDEX_NUMBER => EcEntry::ServerIndexNumber(serde_json::from_value(value)?),
            ECID_MINUTE_NUMBER => EcEntry::MinuteNumber(serde_json::from_value(value)?),
            ECID_CHAIN_COMMIT => EcEntry::ChainCommit(serde_json::from_value(value)?),
            ECID_ENTRY_COMMIT => EcEntry::EntryCommit(serde_json::from_value(value)?),
            ECID_BALANCE_INCREASE => EcEntry::BalanceIncrease(serde_json::from_value(value)?),
            other => return Err(FactomError::UnknownEcId(other)),
        };
        Ok(entry)
    }
}

impl<'de> Deserialize<'de> for EcEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        EcEntry::from_value(value).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ECBlockHeader {
    #[serde(rename = "bodyhash")]
    pub body_hash: String,
    #[serde(rename = "prevheaderhash")]
    pub prev_header_hash: String,
    #[serde(rename = "prevfullhash")]
    pub prev_full_hash: String,
    #[serde(rename = "dbheight")]
    pub db_height: u32,
    #[serde(rename = "headerexpansionarea", default)]
    pub header_expansion_area: String,
    #[serde(rename = "objectcount")]
    pub object_count: u64,
    #[serde(rename = "bodysize")]
    pub body_size: u64,
    #[serde(rename = "chainid", default)]
    pub chain_id: String,
    #[serde(rename = "ecchainid", default)]
    pub ec_chain_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ECBlock {
    pub header: ECBlockHeader,
    pub entries: Vec<EcEntry>,
}

#[derive(Deserialize)]
struct RawECBlockBody {
    #[serde(default)]
    entries: Vec<Value>,
}

#[derive(Deserialize)]
struct RawECBlock {
    header: ECBlockHeader,
    body: RawECBlockBody,
}

impl ECBlock {
    pub fn from_value(value: Value) -> Result<ECBlock> {
        let raw: RawECBlock = serde_json::from_value(value)?;
        let entries = raw
            .body
            .entries
            .into_iter()
            .map(EcEntry::from_value)
            .collect::<Result<Vec<_>>>()?;
        Ok(ECBlock {
            header: raw.header,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_explicit_ecid() {
        let entry = EcEntry::from_value(json!({"ecid": 1, "number": 7})).unwrap();
        assert_eq!(entry, EcEntry::MinuteNumber(EcMinuteNumber { number: 7 }));
        assert_eq!(
            EcEntry::from_value(json!({"ecid": 5})).unwrap_err(),
            FactomError::UnknownEcId(5)
        );
    }

    #[test]
    fn test_inferred_variants() {
        let commit = json!({
            "version": 0, "millitime": "0167", "entryhash": "ab", "credits": 1,
            "ecpubkey": "cd", "sig": "ef"
        });
        assert_eq!(EcEntry::from_value(commit.clone()).unwrap().ecid(), ECID_ENTRY_COMMIT);

        let mut chain_commit = commit;
        chain_commit["chainidhash"] = json!("11");
        chain_commit["weld"] = json!("22");
        assert_eq!(EcEntry::from_value(chain_commit).unwrap().ecid(), ECID_CHAIN_COMMIT);

        let increase = json!({"ecpubkey": "aa", "txid": "bb", "index": 0, "numec": 100});
        assert_eq!(EcEntry::from_value(increase).unwrap().ecid(), ECID_BALANCE_INCREASE);
        assert_eq!(
            EcEntry::from_value(json!({"serverindexnumber": 0})).unwrap().ecid(),
            ECID_SERVER_INDEX_NUMBER
        );
    }

    #[test]
    fn test_block() {
        let block = json!({
            "header": {
                "bodyhash": "a", "prevheaderhash": "b", "prevfullhash": "c", "dbheight": 10,
                "objectcount": 2, "bodysize": 4
            },
            "body": {"entries": [{"serverindexnumber": 0}, {"number": 1}]}
        });
        let ecblock = ECBlock::from_value(block).unwrap();
        assert_eq!(ecblock.entries.len(), 2);
        assert_eq!(ecblock.header.db_height, 10);
    }
}
