use crate::address::{ec_pub_string, factoid_pub_string};
use crate::core::Transaction;
use crate::error::{FactomError, Result};
use crate::network::walletd::{
    AddressParam, AddressesResult, ComposeChainParams, ComposeEntryParams, ImportAddressesParams,
    ImportIdentityKeysParams, KeysResult, KoinifyParams, PublicParam, SignDataParams, SignDataResult,
    SignTransactionParams, SuccessResult, TransactionInfo, TransactionsResult, TxAddressParams,
    TxAmountInfo, TxAmountParams, TxHashResult, TxNameParam, UnlockParams, UnlockResult,
    WalletBalancesResult, WalletProperties,
};
use crate::network::{
    error_message, Request, Response, RpcError, INVALID_REQUEST, METHOD_NOT_FOUND, JSONRPC_VERSION,
};
use crate::wallet::wallet::{Wallet, WALLET_API_VERSION, WALLET_VERSION};
use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;

/// Every method the wallet server answers
pub const METHODS: &[&str] = &[
    "add-ec-output",
    "add-fee",
    "add-input",
    "add-output",
    "address",
    "all-addresses",
    "all-identity-keys",
    "compose-chain",
    "compose-entry",
    "compose-transaction",
    "delete-transaction",
    "generate-ec-address",
    "generate-factoid-address",
    "generate-identity-key",
    "identity-key",
    "import-addresses",
    "import-identity-keys",
    "import-koinify",
    "new-transaction",
    "properties",
    "remove-address",
    "remove-identity-key",
    "send-transaction",
    "sign-data",
    "sign-transaction",
    "sub-fee",
    "tmp-transactions",
    "transaction-hash",
    "transactions",
    "unlock-wallet",
    "wallet-backup",
    "wallet-balances",
];

pub fn transaction_info(name: &str, tx: &Transaction) -> Result<TransactionInfo> {
    let amounts = |list: &[crate::core::TXAmount], ec: bool| -> Vec<TxAmountInfo> {
        list.iter()
            .map(|io| TxAmountInfo {
                address: if ec {
                    ec_pub_string(io.get_address())
                } else {
                    factoid_pub_string(io.get_address())
                },
                amount: io.get_amount(),
            })
            .collect()
    };
    let total_inputs = tx.total_inputs()?;
    let total_outputs = tx.total_outputs()?;
    let total_ec_outputs = tx.total_ec_outputs()?;
    Ok(TransactionInfo {
        name: name.to_string(),
        tx_id: tx.txid_hex()?,
        timestamp: tx.get_timestamp(),
        total_inputs,
        total_outputs,
        total_ec_outputs,
        fees_paid: total_inputs.saturating_sub(total_outputs.saturating_add(total_ec_outputs)),
        signed: tx.is_signed(),
        inputs: amounts(tx.get_inputs(), false),
        outputs: amounts(tx.get_outputs(), false),
        ec_outputs: amounts(tx.get_ec_outputs(), true),
    })
}

fn to_value<T: Serialize>(result: T) -> Result<Value> {
    Ok(serde_json::to_value(result)?)
}

fn tx_value(name: &str, tx: Result<Transaction>) -> Result<Value> {
    to_value(transaction_info(name, &tx?)?)
}

fn success() -> Result<Value> {
    to_value(SuccessResult { success: true })
}

/// Run one method against the wallet
pub fn dispatch(wallet: &Wallet, request: &Request) -> Result<Value> {
    match request.method.as_str() {
        "generate-factoid-address" => to_value(wallet.generate_factoid_address()?),
        "generate-ec-address" => to_value(wallet.generate_ec_address()?),
        "generate-identity-key" => to_value(wallet.generate_identity_key()?),
        "import-addresses" => {
            let params: ImportAddressesParams = request.params_as()?;
            let secrets: Vec<String> = params.addresses.into_iter().map(|a| a.secret).collect();
            to_value(AddressesResult {
                addresses: wallet.import_addresses(&secrets)?,
            })
        }
        "import-identity-keys" => {
            let params: ImportIdentityKeysParams = request.params_as()?;
            let secrets: Vec<String> = params.keys.into_iter().map(|k| k.secret).collect();
            to_value(KeysResult {
                keys: wallet.import_identity_keys(&secrets)?,
            })
        }
        "import-koinify" => {
            let params: KoinifyParams = request.params_as()?;
            to_value(wallet.import_koinify(&params.words)?)
        }
        "address" => {
            let params: AddressParam = request.params_as()?;
            to_value(wallet.get_address(&params.address)?)
        }
        "identity-key" => {
            let params: PublicParam = request.params_as()?;
            to_value(wallet.get_identity_key(&params.public)?)
        }
        "all-addresses" => to_value(AddressesResult {
            addresses: wallet.all_addresses()?,
        }),
        "all-identity-keys" => to_value(KeysResult {
            keys: wallet.all_identity_keys()?,
        }),
        "remove-address" => {
            let params: AddressParam = request.params_as()?;
            wallet.remove_address(&params.address)?;
            success()
        }
        "remove-identity-key" => {
            let params: PublicParam = request.params_as()?;
            wallet.remove_identity_key(&params.public)?;
            success()
        }
        "wallet-backup" => to_value(wallet.backup()?),
        "wallet-balances" => to_value(WalletBalancesResult {
            balances: wallet.balances()?,
        }),
        "new-transaction" => {
            let params: TxNameParam = request.params_as()?;
            tx_value(&params.tx_name, wallet.new_transaction(&params.tx_name))
        }
        "delete-transaction" => {
            let params: TxNameParam = request.params_as()?;
            tx_value(&params.tx_name, wallet.delete_transaction(&params.tx_name))
        }
        "transactions" | "tmp-transactions" => {
            let transactions = wallet
                .transactions()
                .iter()
                .map(|(name, tx)| transaction_info(name, tx))
                .collect::<Result<Vec<_>>>()?;
            to_value(TransactionsResult { transactions })
        }
        "add-input" => {
            let p: TxAmountParams = request.params_as()?;
            tx_value(&p.tx_name, wallet.add_input(&p.tx_name, &p.address, p.amount))
        }
        "add-output" => {
            let p: TxAmountParams = request.params_as()?;
            tx_value(&p.tx_name, wallet.add_output(&p.tx_name, &p.address, p.amount))
        }
        "add-ec-output" => {
            let p: TxAmountParams = request.params_as()?;
            tx_value(&p.tx_name, wallet.add_ec_output(&p.tx_name, &p.address, p.amount))
        }
        "add-fee" => {
            let p: TxAddressParams = request.params_as()?;
            tx_value(&p.tx_name, wallet.add_fee(&p.tx_name, &p.address))
        }
        "sub-fee" => {
            let p: TxAddressParams = request.params_as()?;
            tx_value(&p.tx_name, wallet.sub_fee(&p.tx_name, &p.address))
        }
        "sign-transaction" => {
            let p: SignTransactionParams = request.params_as()?;
            tx_value(&p.tx_name, wallet.sign_transaction(&p.tx_name, p.force))
        }
        "compose-transaction" => {
            let p: TxNameParam = request.params_as()?;
            to_value(wallet.compose_transaction(&p.tx_name)?)
        }
        "transaction-hash" => {
            let p: TxNameParam = request.params_as()?;
            let tx_id = wallet.transaction_hash(&p.tx_name)?;
            to_value(TxHashResult {
                tx_name: p.tx_name,
                tx_id,
            })
        }
        "send-transaction" => {
            let p: TxNameParam = request.params_as()?;
            to_value(wallet.send_transaction(&p.tx_name)?)
        }
        "compose-chain" => {
            let p: ComposeChainParams = request.params_as()?;
            let chain = p.chain.first_entry.into_chain();
            to_value(wallet.compose_chain(&chain, &p.ec_pub)?)
        }
        "compose-entry" => {
            let p: ComposeEntryParams = request.params_as()?;
            let entry = p.entry.into_entry()?;
            to_value(wallet.compose_entry(&entry, &p.ec_pub)?)
        }
        "sign-data" => {
            let p: SignDataParams = request.params_as()?;
            let (public_key, signature) = wallet.sign_data(&p.signer, &p.data)?;
            to_value(SignDataResult {
                public_key: public_key.to_vec(),
                signature: signature.to_vec(),
            })
        }
        "properties" => to_value(WalletProperties {
            wallet_version: WALLET_VERSION.to_string(),
            wallet_api_version: WALLET_API_VERSION.to_string(),
        }),
        "unlock-wallet" => {
            let p: UnlockParams = request.params_as()?;
            let unlocked_until = wallet.unlock(&p.passphrase, p.timeout)?;
            to_value(UnlockResult {
                success: true,
                unlocked_until,
            })
        }
        other => Err(FactomError::Rpc {
            code: METHOD_NOT_FOUND,
            message: error_message(METHOD_NOT_FOUND).to_string(),
            data: Some(other.to_string()),
        }),
    }
}

/// Wrap `dispatch` in a response envelope carrying the caller's id
pub fn handle_request(wallet: &Wallet, request: &Request) -> Response {
    if request.jsonrpc != JSONRPC_VERSION {
        return Response::failure(
            request.id.clone(),
            RpcError::new(INVALID_REQUEST, error_message(INVALID_REQUEST), None),
        );
    }
    debug!("wallet rpc {} id={}", request.method, request.id);
    match dispatch(wallet, request) {
        Ok(result) => Response::success(request.id.clone(), result),
        Err(e) => {
            warn!("{} failed: {e}", request.method);
            Response::failure(request.id.clone(), RpcError::from(&e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::INVALID_PARAMS;
    use crate::storage::WalletDb;
    use serde_json::json;

    fn wallet() -> Wallet {
        Wallet::open(WalletDb::temporary().unwrap(), None)
            .unwrap()
            .with_ec_rate(1000)
    }

    fn call(wallet: &Wallet, method: &str, params: Option<Value>) -> Response {
        handle_request(wallet, &Request::new(method, 7, params))
    }

    #[test]
    fn test_unknown_method() {
        let resp = call(&wallet(), "no-such-method", None);
        let err = resp.error.unwrap();
        assert_eq!(err.code, METHOD_NOT_FOUND);
        assert_eq!(err.message, "Method not found");
        assert_eq!(resp.id, json!(7));
    }

    #[test]
    fn test_bad_params() {
        let resp = call(&wallet(), "add-input", Some(json!({"tx-name": "a"})));
        assert_eq!(resp.error.unwrap().code, INVALID_PARAMS);
    }

    #[test]
    fn test_wrong_version() {
        let mut request = Request::new("properties", 1, None);
        request.jsonrpc = "1.0".to_string();
        let resp = handle_request(&wallet(), &request);
        assert_eq!(resp.error.unwrap().code, INVALID_REQUEST);
    }

    #[test]
    fn test_domain_error_carries_text() {
        let resp = call(&wallet(), "delete-transaction", Some(json!({"tx-name": "missing"})));
        let err = resp.error.unwrap();
        assert_eq!(err.code, crate::network::INTERNAL_ERROR);
        assert_eq!(err.data, Some(json!("Transaction not found: missing")));
    }

    #[test]
    fn test_transaction_listing_alias() {
        let wallet = wallet();
        let resp = call(&wallet, "new-transaction", Some(json!({"tx-name": "t1"})));
        let info: TransactionInfo = serde_json::from_value(resp.result.unwrap()).unwrap();
        assert_eq!(info.name, "t1");
        assert!(!info.signed);

        for method in ["transactions", "tmp-transactions"] {
            let resp = call(&wallet, method, None);
            let list: TransactionsResult = serde_json::from_value(resp.result.unwrap()).unwrap();
            assert_eq!(list.transactions.len(), 1);
        }
    }

    #[test]
    fn test_properties() {
        let resp = call(&wallet(), "properties", None);
        let props: WalletProperties = serde_json::from_value(resp.result.unwrap()).unwrap();
        assert_eq!(props.wallet_api_version, "2.0");
    }

    #[test]
    fn test_method_list_is_served() {
        let wallet = wallet();
        for method in METHODS {
            let resp = call(&wallet, method, None);
            if let Some(err) = resp.error {
                assert_ne!(err.code, METHOD_NOT_FOUND, "{method}");
            }
        }
    }
}
