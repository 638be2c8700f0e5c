// Entries are the unit of data on Factom: a chain id, some external ids and content.
// The canonical bytes defined here are what gets hashed, paid for and revealed.

use crate::error::{FactomError, Result};
use crate::utils::serialization::{hex_array, hex_bytes, hex_vec};
use crate::utils::{sha256_digest, sha52};
use data_encoding::HEXLOWER;
use serde::{Deserialize, Serialize};

/// Version byte + ChainID + ExtID section length
pub const ENTRY_HEADER_LEN: usize = 1 + 32 + 2;
pub const MAX_ENTRY_PAYLOAD: usize = 10240;
pub const MAX_ENTRY_COST: u8 = 10;

const ENTRY_VERSION: u8 = 0x00;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Entry {
    #[serde(rename = "chainid", with = "hex_array")]
    chain_id: [u8; 32],
    #[serde(rename = "extids", with = "hex_vec", default)]
    ext_ids: Vec<Vec<u8>>,
    #[serde(with = "hex_bytes", default)]
    content: Vec<u8>,
}

impl Entry {
    pub fn new(chain_id: [u8; 32], ext_ids: Vec<Vec<u8>>, content: Vec<u8>) -> Entry {
        Entry {
            chain_id,
            ext_ids,
            content,
        }
    }

    /// First entry of a new chain; the chain id follows from the ext ids
    pub fn new_first(ext_ids: Vec<Vec<u8>>, content: Vec<u8>) -> Entry {
        let chain_id = chain_id_from_ext_ids(&ext_ids);
        Entry::new(chain_id, ext_ids, content)
    }

    pub fn get_chain_id(&self) -> &[u8; 32] {
        &self.chain_id
    }

    pub fn chain_id_hex(&self) -> String {
        HEXLOWER.encode(&self.chain_id)
    }

    pub fn get_ext_ids(&self) -> &[Vec<u8>] {
        self.ext_ids.as_slice()
    }

    pub fn get_content(&self) -> &[u8] {
        self.content.as_slice()
    }

    pub(crate) fn set_chain_id(&mut self, chain_id: [u8; 32]) {
        self.chain_id = chain_id;
    }

    fn ext_id_section_len(&self) -> usize {
        self.ext_ids.iter().map(|x| 2 + x.len()).sum()
    }

    /// ExtID section (with its length prefixes) plus content
    pub fn payload_size(&self) -> usize {
        self.ext_id_section_len() + self.content.len()
    }

    /// Canonical binary form
    pub fn marshal(&self) -> Result<Vec<u8>> {
        let payload = self.payload_size();
        if payload > MAX_ENTRY_PAYLOAD {
            return Err(FactomError::EntryTooLarge { size: payload });
        }
        for ext_id in &self.ext_ids {
            if ext_id.len() > u16::MAX as usize {
                return Err(FactomError::EntryTooLarge { size: ext_id.len() });
            }
        }

        let mut out = Vec::with_capacity(ENTRY_HEADER_LEN + payload);
        out.push(ENTRY_VERSION);
        out.extend_from_slice(&self.chain_id);
        out.extend_from_slice(&(self.ext_id_section_len() as u16).to_be_bytes());
        for ext_id in &self.ext_ids {
            out.extend_from_slice(&(ext_id.len() as u16).to_be_bytes());
            out.extend_from_slice(ext_id);
        }
        out.extend_from_slice(&self.content);
        Ok(out)
    }

    pub fn unmarshal(data: &[u8]) -> Result<Entry> {
        if data.len() < ENTRY_HEADER_LEN {
            return Err(FactomError::Serialization(format!(
                "Entry is {} bytes, shorter than its header",
                data.len()
            )));
        }
        if data[0] != ENTRY_VERSION {
            return Err(FactomError::Serialization(format!(
                "Unsupported entry version {}",
                data[0]
            )));
        }
        if data.len() - ENTRY_HEADER_LEN > MAX_ENTRY_PAYLOAD {
            return Err(FactomError::EntryTooLarge {
                size: data.len() - ENTRY_HEADER_LEN,
            });
        }

        let mut chain_id = [0u8; 32];
        chain_id.copy_from_slice(&data[1..33]);
        let section_len = u16::from_be_bytes([data[33], data[34]]) as usize;
        let section_end = ENTRY_HEADER_LEN + section_len;
        if section_end > data.len() {
            return Err(FactomError::Serialization(
                "ExtID section runs past the end of the entry".to_string(),
            ));
        }

        let mut ext_ids = vec![];
        let mut pos = ENTRY_HEADER_LEN;
        while pos < section_end {
            if pos + 2 > section_end {
                return Err(FactomError::Serialization(
                    "Truncated ExtID length".to_string(),
                ));
            }
            let len = u16::from_be_bytes([data[pos], data[pos + 1]]) as usize;
            pos += 2;
            if pos + len > section_end {
                return Err(FactomError::Serialization(
                    "ExtID runs past the end of its section".to_string(),
                ));
            }
            ext_ids.push(data[pos..pos + len].to_vec());
            pos += len;
        }

        Ok(Entry {
            chain_id,
            ext_ids,
            content: data[section_end..].to_vec(),
        })
    }

    /// sha52 of the canonical bytes
    pub fn hash(&self) -> Result<[u8; 32]> {
        Ok(sha52(&self.marshal()?))
    }

    pub fn hash_hex(&self) -> Result<String> {
        Ok(HEXLOWER.encode(&self.hash()?))
    }

    /// Entry Credits needed to commit this entry
    pub fn cost(&self) -> Result<u8> {
        entry_cost(self.payload_size())
    }
}

/// ceil(payload / 1024), at least 1
pub fn entry_cost(payload_size: usize) -> Result<u8> {
    if payload_size > MAX_ENTRY_PAYLOAD {
        return Err(FactomError::EntryTooLarge { size: payload_size });
    }
    let cost = payload_size.div_ceil(1024).max(1);
    Ok(cost as u8)
}

/// SHA256 over the concatenated SHA256 of each ExtID
pub fn chain_id_from_ext_ids(ext_ids: &[Vec<u8>]) -> [u8; 32] {
    let mut hashes = Vec::with_capacity(ext_ids.len() * 32);
    for ext_id in ext_ids {
        hashes.extend_from_slice(&sha256_digest(ext_id));
    }
    sha256_digest(&hashes)
}

pub fn chain_id_from_strings(parts: &[&str]) -> [u8; 32] {
    let ext_ids: Vec<Vec<u8>> = parts.iter().map(|p| p.as_bytes().to_vec()).collect();
    chain_id_from_ext_ids(&ext_ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hello_entry() -> Entry {
        Entry::new_first(
            vec![b"hello".to_vec(), b"world".to_vec()],
            b"test content".to_vec(),
        )
    }

    #[test]
    fn test_chain_id_from_name_parts() {
        let id = chain_id_from_strings(&["John", "Jacob", "Jingleheimer-Schmidt"]);
        assert_eq!(
            HEXLOWER.encode(&id),
            "e0cf1713b492e09e783d5d9f4fc6e2c71b5bdc9af4806a7937a5e935819717e9"
        );
    }

    #[test]
    fn test_canonical_bytes_and_hash() {
        let entry = hello_entry();
        assert_eq!(
            entry.chain_id_hex(),
            "7305db9b2abccd706c256db3d97e5ff48d677cfe4d3a5904afb7da0e3950e1e2"
        );
        let raw = entry.marshal().unwrap();
        assert_eq!(
            HEXLOWER.encode(&raw),
            "007305db9b2abccd706c256db3d97e5ff48d677cfe4d3a5904afb7da0e3950e1e2\
             000e000568656c6c6f0005776f726c647465737420636f6e74656e74"
        );
        assert_eq!(
            entry.hash_hex().unwrap(),
            "c98ee4d57ed6d821e0c0260e86e330e1d2865913077ce903f911d89108450852"
        );
        assert_eq!(entry.hash().unwrap(), sha52(&raw));
    }

    #[test]
    fn test_unmarshal_recovers_entry() {
        let entry = Entry::new([7u8; 32], vec![vec![], b"x".to_vec()], vec![0xff; 300]);
        let parsed = Entry::unmarshal(&entry.marshal().unwrap()).unwrap();
        assert_eq!(parsed, entry);
    }

    #[test]
    fn test_unmarshal_rejects_bad_input() {
        let raw = hello_entry().marshal().unwrap();
        let mut bad_version = raw.clone();
        bad_version[0] = 1;
        assert!(Entry::unmarshal(&bad_version).is_err());
        assert!(Entry::unmarshal(&raw[..20]).is_err());

        // Section length pointing past the end
        let mut bad_section = raw.clone();
        bad_section[33] = 0xff;
        assert!(Entry::unmarshal(&bad_section).is_err());
    }

    #[test]
    fn test_cost_boundaries() {
        assert_eq!(entry_cost(0).unwrap(), 1);
        assert_eq!(entry_cost(1).unwrap(), 1);
        assert_eq!(entry_cost(1024).unwrap(), 1);
        assert_eq!(entry_cost(1025).unwrap(), 2);
        assert_eq!(entry_cost(MAX_ENTRY_PAYLOAD).unwrap(), MAX_ENTRY_COST);
        assert!(matches!(
            entry_cost(MAX_ENTRY_PAYLOAD + 1),
            Err(FactomError::EntryTooLarge { size: 10241 })
        ));
    }

    #[test]
    fn test_cost_is_monotone() {
        let mut last = 0;
        for size in (0..=MAX_ENTRY_PAYLOAD).step_by(97) {
            let cost = entry_cost(size).unwrap();
            assert!(cost >= last);
            last = cost;
        }
    }

    #[test]
    fn test_oversized_entry_rejected() {
        let entry = Entry::new([0u8; 32], vec![b"a".to_vec()], vec![0u8; MAX_ENTRY_PAYLOAD]);
        assert!(matches!(
            entry.marshal(),
            Err(FactomError::EntryTooLarge { .. })
        ));
        assert!(entry.cost().is_err());
    }

    #[test]
    fn test_json_shape() {
        let entry = hello_entry();
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["chainid"], entry.chain_id_hex());
        assert_eq!(json["extids"][0], "68656c6c6f");
        assert_eq!(json["content"], "7465737420636f6e74656e74");
        let back: Entry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }
}
