use serde::{Deserialize, Serialize};

/// One chain's entry block as listed in a directory block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DBlockEntry {
    #[serde(rename = "chainid")]
    pub chain_id: String,
    #[serde(rename = "keymr")]
    pub key_mr: String,
}

/// Header as returned by `directory-block-by-keymr`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DBlockSummaryHeader {
    #[serde(rename = "prevblockkeymr")]
    pub prev_block_key_mr: String,
    #[serde(rename = "sequencenumber")]
    pub sequence_number: u32,
    pub timestamp: u64,
}

/// `directory-block-by-keymr` result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DBlockSummary {
    pub header: DBlockSummaryHeader,
    #[serde(rename = "entryblocklist", default)]
    pub entry_block_list: Vec<DBlockEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DBlockHeader {
    pub version: u8,
    #[serde(rename = "networkid")]
    pub network_id: u32,
    #[serde(rename = "bodymr")]
    pub body_mr: String,
    #[serde(rename = "prevkeymr")]
    pub prev_key_mr: String,
    #[serde(rename = "prevfullhash")]
    pub prev_full_hash: String,
    pub timestamp: u64,
    #[serde(rename = "dbheight")]
    pub db_height: u32,
    #[serde(rename = "blockcount")]
    pub block_count: u32,
    #[serde(rename = "chainid", default)]
    pub chain_id: String,
}

/// Full directory block as returned by `dblock-by-height`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DBlock {
    pub header: DBlockHeader,
    #[serde(rename = "dbentries", default)]
    pub entries: Vec<DBlockEntry>,
    #[serde(rename = "dbhash", default)]
    pub db_hash: String,
    #[serde(rename = "keymr", default)]
    pub key_mr: String,
}

/// `directory-block-head` result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DBlockHead {
    #[serde(rename = "keymr")]
    pub key_mr: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_decodes() {
        let summary: DBlockSummary = serde_json::from_value(json!({
            "header": {"prevblockkeymr": "aa", "sequencenumber": 5, "timestamp": 1_487_042_520},
            "entryblocklist": [{"chainid": "000a", "keymr": "bb"}]
        }))
        .unwrap();
        assert_eq!(summary.header.sequence_number, 5);
        assert_eq!(summary.entry_block_list[0].chain_id, "000a");
    }
}
