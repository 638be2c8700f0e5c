use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EBlockHeader {
    #[serde(rename = "blocksequencenumber")]
    pub block_sequence_number: u32,
    #[serde(rename = "chainid")]
    pub chain_id: String,
    #[serde(rename = "prevkeymr")]
    pub prev_key_mr: String,
    pub timestamp: u64,
    #[serde(rename = "dbheight")]
    pub db_height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EBlockEntry {
    #[serde(rename = "entryhash")]
    pub entry_hash: String,
    pub timestamp: u64,
}

/// `entry-block-by-keymr` result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EBlock {
    pub header: EBlockHeader,
    #[serde(rename = "entrylist", default)]
    pub entry_list: Vec<EBlockEntry>,
}

impl EBlock {
    /// The first entry block of a chain points back to all zeros
    pub fn is_first(&self) -> bool {
        self.header.prev_key_mr.chars().all(|c| c == '0')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_block() {
        let block: EBlock = serde_json::from_value(json!({
            "header": {
                "blocksequencenumber": 0, "chainid": "ab", "prevkeymr": "0".repeat(64),
                "timestamp": 1, "dbheight": 7
            },
            "entrylist": [{"entryhash": "cd", "timestamp": 2}]
        }))
        .unwrap();
        assert!(block.is_first());
        assert_eq!(block.entry_list.len(), 1);
    }
}
