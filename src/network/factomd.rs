//! Typed wrappers for the factomd API
//!
//! Each function posts one method to the client's factomd endpoint and
//! decodes the result. Admin and entry credit blocks go through their
//! tag-dispatching decoders.

use crate::core::blocks::{ABlock, Anchors, DBlock, DBlockHead, DBlockSummary, EBlock, ECBlock, FBlock, Receipt};
use crate::core::entry::Entry;
use crate::error::Result;
use crate::network::client::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties {
    #[serde(rename = "factomdversion", default)]
    pub factomd_version: String,
    #[serde(rename = "factomdapiversion", default)]
    pub factomd_api_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heights {
    #[serde(rename = "directoryblockheight")]
    pub directory_block_height: i64,
    #[serde(rename = "leaderheight")]
    pub leader_height: i64,
    #[serde(rename = "entryblockheight")]
    pub entry_block_height: i64,
    #[serde(rename = "entryheight")]
    pub entry_height: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentMinute {
    #[serde(rename = "leaderheight")]
    pub leader_height: i64,
    #[serde(rename = "directoryblockheight")]
    pub directory_block_height: i64,
    pub minute: i64,
    #[serde(rename = "currentblockstarttime")]
    pub current_block_start_time: i64,
    #[serde(rename = "currentminutestarttime")]
    pub current_minute_start_time: i64,
    #[serde(rename = "currenttime")]
    pub current_time: i64,
    #[serde(rename = "directoryblockinseconds")]
    pub directory_block_in_seconds: i64,
    #[serde(rename = "stalldetected", default)]
    pub stall_detected: bool,
    #[serde(rename = "faulttimeout", default)]
    pub fault_timeout: i64,
    #[serde(rename = "roundtimeout", default)]
    pub round_timeout: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TpsRate {
    #[serde(rename = "totaltxrate")]
    pub total_tx_rate: f64,
    #[serde(rename = "instanttxrate")]
    pub instant_tx_rate: f64,
}

/// Node self-report; the nested election and sync sections vary between
/// factomd releases and are kept as raw JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "id", default)]
    pub id: String,
    #[serde(rename = "publickey", default)]
    pub public_key: String,
    #[serde(default)]
    pub role: String,
    #[serde(rename = "leaderheight", default)]
    pub leader_height: i64,
    #[serde(rename = "currentminute", default)]
    pub current_minute: i64,
    #[serde(rename = "currentminuteduration", default)]
    pub current_minute_duration: f64,
    #[serde(rename = "previousminuteduration", default)]
    pub previous_minute_duration: f64,
    #[serde(rename = "balancehash", default)]
    pub balance_hash: String,
    #[serde(rename = "tempbalancehash", default)]
    pub temp_balance_hash: String,
    #[serde(rename = "lastblockfromdbstate", default)]
    pub last_block_from_dbstate: bool,
    #[serde(default)]
    pub syncing: Value,
    #[serde(rename = "authset", default)]
    pub auth_set: Value,
    #[serde(default)]
    pub elections: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorSigningKey {
    #[serde(rename = "BlockChain", default)]
    pub block_chain: String,
    #[serde(rename = "KeyLevel", default)]
    pub key_level: u8,
    #[serde(rename = "KeyType", default)]
    pub key_type: u8,
    #[serde(rename = "SigningKey", default)]
    pub signing_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authority {
    #[serde(rename = "chainid")]
    pub chain_id: String,
    #[serde(rename = "manageid", default)]
    pub management_chain_id: String,
    #[serde(rename = "matroyshka", default)]
    pub matryoshka_hash: String,
    #[serde(rename = "signingkey", default)]
    pub signing_key: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "anchorkeys", default)]
    pub anchor_keys: Vec<AnchorSigningKey>,
}

#[derive(Deserialize)]
struct AuthoritiesResult {
    #[serde(default)]
    authorities: Vec<Authority>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoidSubmitResult {
    pub message: String,
    #[serde(rename = "txid")]
    pub tx_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitResult {
    pub message: String,
    #[serde(rename = "txid")]
    pub tx_id: String,
    #[serde(rename = "entryhash", default)]
    pub entry_hash: String,
    #[serde(rename = "chainidhash", default)]
    pub chain_id_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealResult {
    pub message: String,
    #[serde(rename = "entryhash")]
    pub entry_hash: String,
    #[serde(rename = "chainid")]
    pub chain_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainHead {
    #[serde(rename = "chainhead", default)]
    pub chain_head: String,
    #[serde(rename = "chaininprocesslist", default)]
    pub chain_in_process_list: bool,
}

#[derive(Deserialize)]
struct BalanceResult {
    balance: i64,
}

#[derive(Deserialize)]
struct RateResult {
    rate: u64,
}

/// One row of `multiple-fct-balances` / `multiple-ec-balances`.
/// `err` is empty when the address was valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressBalance {
    pub ack: i64,
    pub saved: i64,
    #[serde(default)]
    pub err: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipleBalances {
    #[serde(rename = "currentheight")]
    pub current_height: u32,
    #[serde(rename = "lastsavedheight")]
    pub last_saved_height: u32,
    #[serde(default)]
    pub balances: Vec<AddressBalance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckStatus {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoidAck {
    #[serde(rename = "txid")]
    pub tx_id: String,
    #[serde(rename = "transactiondate", default)]
    pub transaction_date: i64,
    #[serde(rename = "transactiondatestring", default)]
    pub transaction_date_string: String,
    #[serde(rename = "blockdate", default)]
    pub block_date: i64,
    #[serde(rename = "blockdatestring", default)]
    pub block_date_string: String,
    pub status: AckStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryAck {
    #[serde(rename = "committxid", default)]
    pub commit_tx_id: String,
    #[serde(rename = "entryhash", default)]
    pub entry_hash: String,
    #[serde(rename = "commitdata")]
    pub commit_data: AckStatus,
    #[serde(rename = "entrydata")]
    pub entry_data: AckStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAmount {
    pub amount: u64,
    pub address: String,
    #[serde(rename = "useraddress", default)]
    pub user_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction {
    #[serde(rename = "TransactionID")]
    pub transaction_id: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Inputs", default)]
    pub inputs: Vec<PendingAmount>,
    #[serde(rename = "Outputs", default)]
    pub outputs: Vec<PendingAmount>,
    #[serde(rename = "ECOutputs", default)]
    pub ec_outputs: Vec<PendingAmount>,
    #[serde(default)]
    pub fees: u64,
}

#[derive(Deserialize)]
struct RawData {
    data: String,
}

#[derive(Deserialize)]
struct MessageResult {
    message: String,
}

#[derive(Deserialize)]
struct ReceiptResult {
    receipt: Receipt,
}

#[derive(Deserialize)]
struct DBlockResult {
    dblock: DBlock,
}

#[derive(Deserialize)]
struct FBlockResult {
    fblock: FBlock,
}

/// `{"<key>": block, "rawdata": ...}` unwrapped to the block value
fn unwrap_block(mut result: Value, key: &str) -> Value {
    result.get_mut(key).map(Value::take).unwrap_or(Value::Null)
}

pub fn properties(client: &Client) -> Result<Properties> {
    client.factomd_request("properties", None)
}

pub fn heights(client: &Client) -> Result<Heights> {
    client.factomd_request("heights", None)
}

pub fn current_minute(client: &Client) -> Result<CurrentMinute> {
    client.factomd_request("current-minute", None)
}

pub fn tps_rate(client: &Client) -> Result<TpsRate> {
    client.factomd_request("tps-rate", None)
}

pub fn diagnostics(client: &Client) -> Result<Diagnostics> {
    client.factomd_request("diagnostics", None)
}

pub fn authorities(client: &Client) -> Result<Vec<Authority>> {
    let result: AuthoritiesResult = client.factomd_request("authorities", None)?;
    Ok(result.authorities)
}

/// Submit a signed Factoid transaction given as hex
pub fn factoid_submit(client: &Client, transaction_hex: &str) -> Result<FactoidSubmitResult> {
    client.factomd_request("factoid-submit", Some(json!({ "transaction": transaction_hex })))
}

pub fn commit_chain(client: &Client, message_hex: &str) -> Result<CommitResult> {
    client.factomd_request("commit-chain", Some(json!({ "message": message_hex })))
}

pub fn reveal_chain(client: &Client, entry_hex: &str) -> Result<RevealResult> {
    client.factomd_request("reveal-chain", Some(json!({ "entry": entry_hex })))
}

pub fn commit_entry(client: &Client, message_hex: &str) -> Result<CommitResult> {
    client.factomd_request("commit-entry", Some(json!({ "message": message_hex })))
}

pub fn reveal_entry(client: &Client, entry_hex: &str) -> Result<RevealResult> {
    client.factomd_request("reveal-entry", Some(json!({ "entry": entry_hex })))
}

pub fn entry_by_hash(client: &Client, hash: &str) -> Result<Entry> {
    client.factomd_request("entry", Some(json!({ "hash": hash })))
}

pub fn entry_block_by_keymr(client: &Client, keymr: &str) -> Result<EBlock> {
    client.factomd_request("entry-block", Some(json!({ "keymr": keymr })))
}

pub fn directory_block_by_keymr(client: &Client, keymr: &str) -> Result<DBlockSummary> {
    client.factomd_request("directory-block", Some(json!({ "keymr": keymr })))
}

pub fn directory_block_head(client: &Client) -> Result<DBlockHead> {
    client.factomd_request("directory-block-head", None)
}

pub fn chain_head(client: &Client, chain_id: &str) -> Result<ChainHead> {
    client.factomd_request("chain-head", Some(json!({ "chainid": chain_id })))
}

pub fn entry_credit_balance(client: &Client, ec_public: &str) -> Result<i64> {
    let result: BalanceResult =
        client.factomd_request("entry-credit-balance", Some(json!({ "address": ec_public })))?;
    Ok(result.balance)
}

pub fn factoid_balance(client: &Client, fct_public: &str) -> Result<i64> {
    let result: BalanceResult =
        client.factomd_request("factoid-balance", Some(json!({ "address": fct_public })))?;
    Ok(result.balance)
}

/// Factoshis per entry credit
pub fn entry_credit_rate(client: &Client) -> Result<u64> {
    let result: RateResult = client.factomd_request("entry-credit-rate", None)?;
    Ok(result.rate)
}

pub fn multiple_fct_balances(client: &Client, addresses: &[String]) -> Result<MultipleBalances> {
    client.factomd_request("multiple-fct-balances", Some(json!({ "addresses": addresses })))
}

pub fn multiple_ec_balances(client: &Client, addresses: &[String]) -> Result<MultipleBalances> {
    client.factomd_request("multiple-ec-balances", Some(json!({ "addresses": addresses })))
}

pub fn dblock_by_height(client: &Client, height: u32) -> Result<DBlock> {
    let result: DBlockResult =
        client.factomd_request("dblock-by-height", Some(json!({ "height": height })))?;
    Ok(result.dblock)
}

pub fn ablock_by_height(client: &Client, height: u32) -> Result<ABlock> {
    let result: Value = client.factomd_request("ablock-by-height", Some(json!({ "height": height })))?;
    ABlock::from_value(unwrap_block(result, "ablock"))
}

pub fn fblock_by_height(client: &Client, height: u32) -> Result<FBlock> {
    let result: FBlockResult =
        client.factomd_request("fblock-by-height", Some(json!({ "height": height })))?;
    Ok(result.fblock)
}

pub fn ecblock_by_height(client: &Client, height: u32) -> Result<ECBlock> {
    let result: Value = client.factomd_request("ecblock-by-height", Some(json!({ "height": height })))?;
    ECBlock::from_value(unwrap_block(result, "ecblock"))
}

pub fn admin_block(client: &Client, keymr: &str) -> Result<ABlock> {
    let result: Value = client.factomd_request("admin-block", Some(json!({ "keymr": keymr })))?;
    ABlock::from_value(unwrap_block(result, "ablock"))
}

pub fn entry_credit_block(client: &Client, keymr: &str) -> Result<ECBlock> {
    let result: Value = client.factomd_request("entrycredit-block", Some(json!({ "keymr": keymr })))?;
    ECBlock::from_value(unwrap_block(result, "ecblock"))
}

pub fn factoid_block(client: &Client, keymr: &str) -> Result<FBlock> {
    let result: FBlockResult = client.factomd_request("factoid-block", Some(json!({ "keymr": keymr })))?;
    Ok(result.fblock)
}

pub fn receipt(client: &Client, entry_hash: &str) -> Result<Receipt> {
    let result: ReceiptResult = client.factomd_request("receipt", Some(json!({ "hash": entry_hash })))?;
    Ok(result.receipt)
}

/// Anchors by directory block height
pub fn anchors_by_height(client: &Client, height: u32) -> Result<Anchors> {
    client.factomd_request("anchors", Some(json!({ "height": height })))
}

/// Anchors for the block holding an entry, or for a block keymr
pub fn anchors_by_hash(client: &Client, hash: &str) -> Result<Anchors> {
    client.factomd_request("anchors", Some(json!({ "hash": hash })))
}

pub fn factoid_ack(client: &Client, tx_id: &str) -> Result<FactoidAck> {
    client.factomd_request("factoid-ack", Some(json!({ "TxID": tx_id })))
}

/// Entry status by entry hash or commit txid
pub fn entry_ack(client: &Client, tx_id: &str) -> Result<EntryAck> {
    client.factomd_request("entry-ack", Some(json!({ "TxID": tx_id })))
}

/// Pending Factoid transactions, optionally only those touching `address`
pub fn pending_transactions(client: &Client, address: Option<&str>) -> Result<Vec<PendingTransaction>> {
    let params = address.map(|a| json!({ "address": a }));
    let result: Option<Vec<PendingTransaction>> = client.factomd_request("pending-transactions", params)?;
    Ok(result.unwrap_or_default())
}

/// Raw binary of any block, entry or transaction, as hex
pub fn get_raw_data(client: &Client, hash: &str) -> Result<String> {
    let result: RawData = client.factomd_request("raw-data", Some(json!({ "hash": hash })))?;
    Ok(result.data)
}

pub fn send_raw_message(client: &Client, message_hex: &str) -> Result<String> {
    let result: MessageResult =
        client.factomd_request("send-raw-message", Some(json!({ "message": message_hex })))?;
    Ok(result.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_head_decodes() {
        let head: ChainHead = serde_json::from_value(json!({
            "chainhead": "",
            "chaininprocesslist": true
        }))
        .unwrap();
        assert!(head.chain_head.is_empty());
        assert!(head.chain_in_process_list);
    }

    #[test]
    fn test_unwrap_block() {
        let raw = json!({"ablock": {"x": 1}, "rawdata": "00"});
        assert_eq!(unwrap_block(raw, "ablock"), json!({"x": 1}));
        assert_eq!(unwrap_block(json!({}), "ablock"), Value::Null);
    }

    #[test]
    fn test_multiple_balances_decode() {
        let balances: MultipleBalances = serde_json::from_value(json!({
            "currentheight": 200,
            "lastsavedheight": 199,
            "balances": [
                {"ack": 10, "saved": 5, "err": ""},
                {"ack": 0, "saved": 0, "err": "Error decoding address"}
            ]
        }))
        .unwrap();
        assert_eq!(balances.balances.len(), 2);
        assert!(!balances.balances[1].err.is_empty());
    }

    #[test]
    fn test_entry_ack_decodes() {
        let ack: EntryAck = serde_json::from_value(json!({
            "committxid": "aa",
            "entryhash": "bb",
            "commitdata": {"status": "TransactionACK"},
            "entrydata": {"status": "Unknown"}
        }))
        .unwrap();
        assert_eq!(ack.commit_data.status, "TransactionACK");
    }
}
