//! Typed wrappers for the walletd API
//!
//! The parameter and result structs here are shared with the embedded wallet
//! server, so both sides agree on the wire shape.

use crate::core::chain::Chain;
use crate::core::entry::Entry;
use crate::error::Result;
use crate::network::client::Client;
use crate::network::factomd::FactoidSubmitResult;
use crate::network::jsonrpc::Request;
use crate::utils::hex_decode_32;
use crate::utils::serialization::{base64_bytes, hex_bytes, hex_vec};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressPair {
    pub public: String,
    pub secret: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretParam {
    pub secret: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportAddressesParams {
    pub addresses: Vec<SecretParam>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressesResult {
    pub addresses: Vec<AddressPair>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressParam {
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportIdentityKeysParams {
    pub keys: Vec<SecretParam>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeysResult {
    pub keys: Vec<AddressPair>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicParam {
    pub public: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KoinifyParams {
    pub words: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResult {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletBackup {
    #[serde(rename = "wallet-seed")]
    pub wallet_seed: String,
    pub addresses: Vec<AddressPair>,
    #[serde(rename = "identity-keys", default)]
    pub identity_keys: Vec<AddressPair>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BalancePair {
    pub ack: i64,
    pub saved: i64,
}

/// Totals over every address the wallet holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WalletBalances {
    #[serde(rename = "fctaccountbalances")]
    pub factoid: BalancePair,
    #[serde(rename = "ecaccountbalances")]
    pub entry_credit: BalancePair,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletBalancesResult {
    pub balances: WalletBalances,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxNameParam {
    #[serde(rename = "tx-name")]
    pub tx_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxAmountParams {
    #[serde(rename = "tx-name")]
    pub tx_name: String,
    pub address: String,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxAddressParams {
    #[serde(rename = "tx-name")]
    pub tx_name: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignTransactionParams {
    #[serde(rename = "tx-name")]
    pub tx_name: String,
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxAmountInfo {
    pub address: String,
    pub amount: u64,
}

/// walletd's view of an in-progress transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInfo {
    pub name: String,
    #[serde(rename = "txid")]
    pub tx_id: String,
    pub timestamp: u64,
    #[serde(rename = "totalinputs")]
    pub total_inputs: u64,
    #[serde(rename = "totaloutputs")]
    pub total_outputs: u64,
    #[serde(rename = "totalecoutputs")]
    pub total_ec_outputs: u64,
    #[serde(rename = "feespaid")]
    pub fees_paid: u64,
    pub signed: bool,
    #[serde(default)]
    pub inputs: Vec<TxAmountInfo>,
    #[serde(default)]
    pub outputs: Vec<TxAmountInfo>,
    #[serde(rename = "ecoutputs", default)]
    pub ec_outputs: Vec<TxAmountInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionsResult {
    pub transactions: Vec<TransactionInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxHashResult {
    #[serde(rename = "tx-name")]
    pub tx_name: String,
    #[serde(rename = "txid")]
    pub tx_id: String,
}

/// Entry as compose-chain and compose-entry take it; the chain id is absent
/// for a first entry
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntryParam {
    #[serde(rename = "chainid", default, skip_serializing_if = "String::is_empty")]
    pub chain_id: String,
    #[serde(rename = "extids", with = "hex_vec", default)]
    pub ext_ids: Vec<Vec<u8>>,
    #[serde(with = "hex_bytes", default)]
    pub content: Vec<u8>,
}

impl EntryParam {
    pub fn from_entry(entry: &Entry) -> EntryParam {
        EntryParam {
            chain_id: entry.chain_id_hex(),
            ext_ids: entry.get_ext_ids().to_vec(),
            content: entry.get_content().to_vec(),
        }
    }

    pub fn into_entry(self) -> Result<Entry> {
        let chain_id = hex_decode_32(&self.chain_id)?;
        Ok(Entry::new(chain_id, self.ext_ids, self.content))
    }

    pub fn into_chain(self) -> Chain {
        Chain::new(Entry::new_first(self.ext_ids, self.content))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainParam {
    #[serde(rename = "firstentry")]
    pub first_entry: EntryParam,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeChainParams {
    pub chain: ChainParam,
    #[serde(rename = "ecpub")]
    pub ec_pub: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposeEntryParams {
    pub entry: EntryParam,
    #[serde(rename = "ecpub")]
    pub ec_pub: String,
}

/// The two requests to post to factomd, commit first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposeResult {
    pub commit: Request,
    pub reveal: Request,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignDataParams {
    pub signer: String,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignDataResult {
    #[serde(rename = "pubkey", with = "base64_bytes")]
    pub public_key: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub signature: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletProperties {
    #[serde(rename = "walletversion")]
    pub wallet_version: String,
    #[serde(rename = "walletapiversion")]
    pub wallet_api_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockParams {
    pub passphrase: String,
    pub timeout: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockResult {
    pub success: bool,
    #[serde(rename = "unlockeduntil")]
    pub unlocked_until: u64,
}

pub fn generate_factoid_address(client: &Client) -> Result<AddressPair> {
    client.walletd_request("generate-factoid-address", None)
}

pub fn generate_ec_address(client: &Client) -> Result<AddressPair> {
    client.walletd_request("generate-ec-address", None)
}

pub fn generate_identity_key(client: &Client) -> Result<AddressPair> {
    client.walletd_request("generate-identity-key", None)
}

/// Import Fs/Es secrets; returns the stored pairs in the order given
pub fn import_addresses(client: &Client, secrets: &[&str]) -> Result<Vec<AddressPair>> {
    let params = ImportAddressesParams {
        addresses: secrets
            .iter()
            .map(|s| SecretParam { secret: s.to_string() })
            .collect(),
    };
    let result: AddressesResult =
        client.walletd_request("import-addresses", Some(serde_json::to_value(params)?))?;
    Ok(result.addresses)
}

pub fn import_identity_keys(client: &Client, secrets: &[&str]) -> Result<Vec<AddressPair>> {
    let params = ImportIdentityKeysParams {
        keys: secrets
            .iter()
            .map(|s| SecretParam { secret: s.to_string() })
            .collect(),
    };
    let result: KeysResult =
        client.walletd_request("import-identity-keys", Some(serde_json::to_value(params)?))?;
    Ok(result.keys)
}

pub fn import_koinify(client: &Client, words: &str) -> Result<AddressPair> {
    client.walletd_request("import-koinify", Some(json!({ "words": words })))
}

/// Look up the secret for an FA or EC public address
pub fn fetch_address(client: &Client, public: &str) -> Result<AddressPair> {
    client.walletd_request("address", Some(json!({ "address": public })))
}

pub fn fetch_identity_key(client: &Client, public: &str) -> Result<AddressPair> {
    client.walletd_request("identity-key", Some(json!({ "public": public })))
}

pub fn all_addresses(client: &Client) -> Result<Vec<AddressPair>> {
    let result: AddressesResult = client.walletd_request("all-addresses", None)?;
    Ok(result.addresses)
}

pub fn all_identity_keys(client: &Client) -> Result<Vec<AddressPair>> {
    let result: KeysResult = client.walletd_request("all-identity-keys", None)?;
    Ok(result.keys)
}

pub fn remove_address(client: &Client, public: &str) -> Result<()> {
    let _: SuccessResult = client.walletd_request("remove-address", Some(json!({ "address": public })))?;
    Ok(())
}

pub fn remove_identity_key(client: &Client, public: &str) -> Result<()> {
    let _: SuccessResult =
        client.walletd_request("remove-identity-key", Some(json!({ "public": public })))?;
    Ok(())
}

pub fn wallet_backup(client: &Client) -> Result<WalletBackup> {
    client.walletd_request("wallet-backup", None)
}

pub fn wallet_balances(client: &Client) -> Result<WalletBalances> {
    let result: WalletBalancesResult = client.walletd_request("wallet-balances", None)?;
    Ok(result.balances)
}

pub fn new_transaction(client: &Client, name: &str) -> Result<TransactionInfo> {
    client.walletd_request("new-transaction", Some(json!({ "tx-name": name })))
}

pub fn delete_transaction(client: &Client, name: &str) -> Result<TransactionInfo> {
    client.walletd_request("delete-transaction", Some(json!({ "tx-name": name })))
}

pub fn list_transactions(client: &Client) -> Result<Vec<TransactionInfo>> {
    let result: TransactionsResult = client.walletd_request("transactions", None)?;
    Ok(result.transactions)
}

pub fn add_input(client: &Client, name: &str, address: &str, amount: u64) -> Result<TransactionInfo> {
    client.walletd_request(
        "add-input",
        Some(json!({ "tx-name": name, "address": address, "amount": amount })),
    )
}

pub fn add_output(client: &Client, name: &str, address: &str, amount: u64) -> Result<TransactionInfo> {
    client.walletd_request(
        "add-output",
        Some(json!({ "tx-name": name, "address": address, "amount": amount })),
    )
}

pub fn add_ec_output(client: &Client, name: &str, address: &str, amount: u64) -> Result<TransactionInfo> {
    client.walletd_request(
        "add-ec-output",
        Some(json!({ "tx-name": name, "address": address, "amount": amount })),
    )
}

pub fn add_fee(client: &Client, name: &str, address: &str) -> Result<TransactionInfo> {
    client.walletd_request("add-fee", Some(json!({ "tx-name": name, "address": address })))
}

pub fn sub_fee(client: &Client, name: &str, address: &str) -> Result<TransactionInfo> {
    client.walletd_request("sub-fee", Some(json!({ "tx-name": name, "address": address })))
}

/// `force` signs even when the fee is off
pub fn sign_transaction(client: &Client, name: &str, force: bool) -> Result<TransactionInfo> {
    client.walletd_request(
        "sign-transaction",
        Some(json!({ "tx-name": name, "force": force })),
    )
}

/// The `factoid-submit` request for a signed transaction
pub fn compose_transaction(client: &Client, name: &str) -> Result<Request> {
    client.walletd_request("compose-transaction", Some(json!({ "tx-name": name })))
}

pub fn transaction_hash(client: &Client, name: &str) -> Result<String> {
    let result: TxHashResult =
        client.walletd_request("transaction-hash", Some(json!({ "tx-name": name })))?;
    Ok(result.tx_id)
}

/// Compose, submit to factomd and forget the named transaction
pub fn send_transaction(client: &Client, name: &str) -> Result<FactoidSubmitResult> {
    client.walletd_request("send-transaction", Some(json!({ "tx-name": name })))
}

pub fn compose_chain(client: &Client, chain: &Chain, ec_pub: &str) -> Result<ComposeResult> {
    let mut first_entry = EntryParam::from_entry(chain.get_first_entry());
    first_entry.chain_id.clear();
    let params = ComposeChainParams {
        chain: ChainParam { first_entry },
        ec_pub: ec_pub.to_string(),
    };
    client.walletd_request("compose-chain", Some(serde_json::to_value(params)?))
}

pub fn compose_entry(client: &Client, entry: &Entry, ec_pub: &str) -> Result<ComposeResult> {
    let params = ComposeEntryParams {
        entry: EntryParam::from_entry(entry),
        ec_pub: ec_pub.to_string(),
    };
    client.walletd_request("compose-entry", Some(serde_json::to_value(params)?))
}

/// Sign arbitrary bytes with a held FA, EC or identity key
pub fn sign_data(client: &Client, signer: &str, data: &[u8]) -> Result<SignDataResult> {
    let params = SignDataParams {
        signer: signer.to_string(),
        data: data.to_vec(),
    };
    client.walletd_request("sign-data", Some(serde_json::to_value(params)?))
}

pub fn properties(client: &Client) -> Result<WalletProperties> {
    client.walletd_request("properties", None)
}

pub fn unlock_wallet(client: &Client, passphrase: &str, timeout: u64) -> Result<UnlockResult> {
    client.walletd_request(
        "unlock-wallet",
        Some(json!({ "passphrase": passphrase, "timeout": timeout })),
    )
}
