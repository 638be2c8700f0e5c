use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FBlockAmount {
    pub amount: u64,
    pub address: String,
    #[serde(rename = "useraddress", default)]
    pub user_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureBlock {
    #[serde(default)]
    pub signatures: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FBlockTransaction {
    #[serde(rename = "txid")]
    pub tx_id: String,
    #[serde(rename = "blockheight", default)]
    pub block_height: u32,
    #[serde(rename = "millitimestamp")]
    pub milli_timestamp: u64,
    #[serde(default)]
    pub inputs: Vec<FBlockAmount>,
    #[serde(default)]
    pub outputs: Vec<FBlockAmount>,
    #[serde(rename = "outecs", default)]
    pub ec_outputs: Vec<FBlockAmount>,
    #[serde(default)]
    pub rcds: Vec<String>,
    #[serde(rename = "sigblocks", default)]
    pub sig_blocks: Vec<SignatureBlock>,
}

/// Factoid block; unlike the other blocks its header fields sit at the top level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FBlock {
    #[serde(rename = "chainid", default)]
    pub chain_id: String,
    #[serde(rename = "bodymr")]
    pub body_mr: String,
    #[serde(rename = "prevkeymr")]
    pub prev_key_mr: String,
    #[serde(rename = "prevledgerkeymr")]
    pub prev_ledger_key_mr: String,
    #[serde(rename = "exchrate")]
    pub exchange_rate: u64,
    #[serde(rename = "dbheight")]
    pub db_height: u32,
    #[serde(default)]
    pub transactions: Vec<FBlockTransaction>,
    #[serde(rename = "keymr", default)]
    pub key_mr: String,
    #[serde(rename = "ledgerkeymr", default)]
    pub ledger_key_mr: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_header() {
        let block: FBlock = serde_json::from_value(json!({
            "bodymr": "a", "prevkeymr": "b", "prevledgerkeymr": "c", "exchrate": 90000,
            "dbheight": 3,
            "transactions": [{
                "txid": "dd", "millitimestamp": 10,
                "outputs": [{"amount": 5, "address": "ee", "useraddress": "FA2"}],
                "sigblocks": [{"signatures": ["ff"]}]
            }]
        }))
        .unwrap();
        assert_eq!(block.exchange_rate, 90000);
        assert_eq!(block.transactions[0].outputs[0].amount, 5);
        assert!(block.transactions[0].inputs.is_empty());
    }
}
