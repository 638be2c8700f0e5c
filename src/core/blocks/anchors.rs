use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// factomd sends `false` for a missing anchor; `null` and absence mean the same
fn false_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Null | Value::Bool(false) => Ok(None),
        value => serde_json::from_value(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleNode {
    #[serde(default)]
    pub left: String,
    #[serde(default)]
    pub right: String,
    #[serde(default)]
    pub top: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitcoinAnchor {
    #[serde(rename = "transactionhash")]
    pub transaction_hash: String,
    #[serde(rename = "blockhash")]
    pub block_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthereumAnchor {
    #[serde(rename = "recordheight")]
    pub record_height: u32,
    #[serde(rename = "dbheightmax")]
    pub db_height_max: u32,
    #[serde(rename = "dbheightmin")]
    pub db_height_min: u32,
    #[serde(rename = "windowmr")]
    pub window_mr: String,
    #[serde(rename = "merklebranch", default)]
    pub merkle_branch: Vec<MerkleNode>,
    #[serde(rename = "contractaddress")]
    pub contract_address: String,
    #[serde(rename = "txid")]
    pub tx_id: String,
    #[serde(rename = "blockhash")]
    pub block_hash: String,
    #[serde(rename = "txindex")]
    pub tx_index: u64,
}

/// `anchors` result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchors {
    #[serde(rename = "directoryblockheight")]
    pub directory_block_height: u32,
    #[serde(rename = "directoryblockkeymr")]
    pub directory_block_key_mr: String,
    #[serde(default, deserialize_with = "false_as_none")]
    pub bitcoin: Option<BitcoinAnchor>,
    #[serde(default, deserialize_with = "false_as_none")]
    pub ethereum: Option<EthereumAnchor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptEntry {
    #[serde(rename = "entryhash")]
    pub entry_hash: String,
}

/// Merkle proof from an entry up to its anchored directory block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub entry: ReceiptEntry,
    #[serde(rename = "merklebranch", default)]
    pub merkle_branch: Vec<MerkleNode>,
    #[serde(rename = "entryblockkeymr", default)]
    pub entry_block_key_mr: String,
    #[serde(rename = "directoryblockkeymr", default)]
    pub directory_block_key_mr: String,
    #[serde(rename = "bitcointransactionhash", default)]
    pub bitcoin_transaction_hash: String,
    #[serde(rename = "bitcoinblockhash", default)]
    pub bitcoin_block_hash: String,
}
