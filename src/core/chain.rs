use crate::core::entry::{chain_id_from_ext_ids, Entry};
use crate::error::{FactomError, Result};
use crate::network::{factomd, Client};
use data_encoding::HEXLOWER;
use log::debug;

/// factomd's code for "Missing Chain Head"
const MISSING_CHAIN_HEAD: i64 = -32009;

/// A new chain: its id and the first entry that defines it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    chain_id: [u8; 32],
    first_entry: Entry,
}

impl Chain {
    /// Fills the first entry's chain id from its ext ids
    pub fn new(mut first_entry: Entry) -> Chain {
        let chain_id = chain_id_from_ext_ids(first_entry.get_ext_ids());
        first_entry.set_chain_id(chain_id);
        Chain {
            chain_id,
            first_entry,
        }
    }

    pub fn get_chain_id(&self) -> &[u8; 32] {
        &self.chain_id
    }

    pub fn chain_id_hex(&self) -> String {
        HEXLOWER.encode(&self.chain_id)
    }

    pub fn get_first_entry(&self) -> &Entry {
        &self.first_entry
    }

    pub fn first_entry_hash(&self) -> Result<[u8; 32]> {
        self.first_entry.hash()
    }
}

/// Ok(true) with a head, Ok(false) when factomd has never seen the chain,
/// ChainPending while it only sits in the process list
pub fn chain_exists(client: &Client, chain_id: &str) -> Result<bool> {
    match factomd::chain_head(client, chain_id) {
        Ok(head) => {
            if !head.chain_head.is_empty() {
                Ok(true)
            } else if head.chain_in_process_list {
                Err(FactomError::ChainPending)
            } else {
                Ok(false)
            }
        }
        Err(FactomError::Rpc { code, .. }) if code == MISSING_CHAIN_HEAD => {
            debug!("No chain head for {chain_id}");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_chain_sets_entry_chain_id() {
        let entry = Entry::new([0u8; 32], vec![b"a".to_vec(), b"b".to_vec()], b"c".to_vec());
        let chain = Chain::new(entry);
        let expected = chain_id_from_ext_ids(&[b"a".to_vec(), b"b".to_vec()]);
        assert_eq!(chain.get_chain_id(), &expected);
        assert_eq!(chain.get_first_entry().get_chain_id(), &expected);
        assert_eq!(
            chain.first_entry_hash().unwrap(),
            Entry::new_first(vec![b"a".to_vec(), b"b".to_vec()], b"c".to_vec())
                .hash()
                .unwrap()
        );
    }
}
