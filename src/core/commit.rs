// Commit messages pay for an entry or a new chain before it is revealed.
// The signature covers every byte that precedes the EC public key.

use crate::address::Signer;
use crate::core::{Chain, Entry};
use crate::error::{FactomError, Result};
use crate::network::Request;
use crate::utils::{current_timestamp, ed25519_verify, shad, SIGNATURE_LEN};
use data_encoding::HEXLOWER;
use serde_json::json;

const COMMIT_VERSION: u8 = 0x00;
const TIMESTAMP_LEN: usize = 6;

/// Extra Entry Credits charged for creating a chain
pub const CHAIN_CREATION_SURCHARGE: u8 = 10;

/// version + timestamp + entry hash + cost
pub const ENTRY_COMMIT_SIGNED_LEN: usize = 1 + TIMESTAMP_LEN + 32 + 1;
pub const ENTRY_COMMIT_LEN: usize = ENTRY_COMMIT_SIGNED_LEN + 32 + SIGNATURE_LEN;

/// version + timestamp + chain id hash + weld + entry hash + cost
pub const CHAIN_COMMIT_SIGNED_LEN: usize = 1 + TIMESTAMP_LEN + 32 + 32 + 32 + 1;
pub const CHAIN_COMMIT_LEN: usize = CHAIN_COMMIT_SIGNED_LEN + 32 + SIGNATURE_LEN;

fn timestamp_bytes(milli: u64) -> [u8; TIMESTAMP_LEN] {
    let full = milli.to_be_bytes();
    let mut out = [0u8; TIMESTAMP_LEN];
    out.copy_from_slice(&full[2..]);
    out
}

fn read_timestamp(bytes: &[u8]) -> u64 {
    let mut full = [0u8; 8];
    full[2..].copy_from_slice(&bytes[..TIMESTAMP_LEN]);
    u64::from_be_bytes(full)
}

fn read_32(bytes: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes[..32]);
    out
}

fn read_sig(bytes: &[u8]) -> [u8; SIGNATURE_LEN] {
    let mut out = [0u8; SIGNATURE_LEN];
    out.copy_from_slice(&bytes[..SIGNATURE_LEN]);
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryCommit {
    timestamp: u64,
    entry_hash: [u8; 32],
    cost: u8,
    ec_public: [u8; 32],
    signature: [u8; SIGNATURE_LEN],
}

impl EntryCommit {
    pub fn new<S: Signer>(entry: &Entry, ec: &S) -> Result<EntryCommit> {
        Self::with_timestamp(entry, current_timestamp()?, ec)
    }

    pub fn with_timestamp<S: Signer>(entry: &Entry, timestamp: u64, ec: &S) -> Result<EntryCommit> {
        let mut commit = EntryCommit {
            timestamp,
            entry_hash: entry.hash()?,
            cost: entry.cost()?,
            ec_public: ec.public_key(),
            signature: [0u8; SIGNATURE_LEN],
        };
        commit.signature = ec.sign(&commit.signed_bytes())?;
        Ok(commit)
    }

    /// The 40 bytes covered by the signature
    pub fn signed_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(ENTRY_COMMIT_SIGNED_LEN);
        out.push(COMMIT_VERSION);
        out.extend_from_slice(&timestamp_bytes(self.timestamp));
        out.extend_from_slice(&self.entry_hash);
        out.push(self.cost);
        out
    }

    pub fn marshal(&self) -> Vec<u8> {
        let mut out = self.signed_bytes();
        out.extend_from_slice(&self.ec_public);
        out.extend_from_slice(&self.signature);
        out
    }

    pub fn unmarshal(data: &[u8]) -> Result<EntryCommit> {
        if data.len() != ENTRY_COMMIT_LEN || data[0] != COMMIT_VERSION {
            return Err(FactomError::Serialization(format!(
                "Entry commit must be {ENTRY_COMMIT_LEN} bytes with version 0"
            )));
        }
        let mut pos = 1;
        let timestamp = read_timestamp(&data[pos..]);
        pos += TIMESTAMP_LEN;
        let entry_hash = read_32(&data[pos..]);
        pos += 32;
        let cost = data[pos];
        pos += 1;
        let ec_public = read_32(&data[pos..]);
        pos += 32;
        Ok(EntryCommit {
            timestamp,
            entry_hash,
            cost,
            ec_public,
            signature: read_sig(&data[pos..]),
        })
    }

    pub fn verify(&self) -> bool {
        ed25519_verify(&self.ec_public, &self.signature, &self.signed_bytes())
    }

    pub fn get_timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn get_entry_hash(&self) -> &[u8; 32] {
        &self.entry_hash
    }

    pub fn get_cost(&self) -> u8 {
        self.cost
    }

    pub fn get_ec_public(&self) -> &[u8; 32] {
        &self.ec_public
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainCommit {
    timestamp: u64,
    chain_id_hash: [u8; 32],
    weld: [u8; 32],
    entry_hash: [u8; 32],
    cost: u8,
    ec_public: [u8; 32],
    signature: [u8; SIGNATURE_LEN],
}

impl ChainCommit {
    pub fn new<S: Signer>(chain: &Chain, ec: &S) -> Result<ChainCommit> {
        Self::with_timestamp(chain, current_timestamp()?, ec)
    }

    pub fn with_timestamp<S: Signer>(chain: &Chain, timestamp: u64, ec: &S) -> Result<ChainCommit> {
        let entry = chain.get_first_entry();
        let entry_hash = entry.hash()?;
        let chain_id = chain.get_chain_id();

        let mut weld_input = Vec::with_capacity(64);
        weld_input.extend_from_slice(&entry_hash);
        weld_input.extend_from_slice(chain_id);

        let mut commit = ChainCommit {
            timestamp,
            chain_id_hash: shad(chain_id),
            weld: shad(&weld_input),
            entry_hash,
            cost: entry.cost()? + CHAIN_CREATION_SURCHARGE,
            ec_public: ec.public_key(),
            signature: [0u8; SIGNATURE_LEN],
        };
        commit.signature = ec.sign(&commit.signed_bytes())?;
        Ok(commit)
    }

    pub fn signed_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(CHAIN_COMMIT_SIGNED_LEN);
        out.push(COMMIT_VERSION);
        out.extend_from_slice(&timestamp_bytes(self.timestamp));
        out.extend_from_slice(&self.chain_id_hash);
        out.extend_from_slice(&self.weld);
        out.extend_from_slice(&self.entry_hash);
        out.push(self.cost);
        out
    }

    pub fn marshal(&self) -> Vec<u8> {
        let mut out = self.signed_bytes();
        out.extend_from_slice(&self.ec_public);
        out.extend_from_slice(&self.signature);
        out
    }

    pub fn unmarshal(data: &[u8]) -> Result<ChainCommit> {
        if data.len() != CHAIN_COMMIT_LEN || data[0] != COMMIT_VERSION {
            return Err(FactomError::Serialization(format!(
                "Chain commit must be {CHAIN_COMMIT_LEN} bytes with version 0"
            )));
        }
        let mut pos = 1;
        let timestamp = read_timestamp(&data[pos..]);
        pos += TIMESTAMP_LEN;
        let chain_id_hash = read_32(&data[pos..]);
        pos += 32;
        let weld = read_32(&data[pos..]);
        pos += 32;
        let entry_hash = read_32(&data[pos..]);
        pos += 32;
        let cost = data[pos];
        pos += 1;
        let ec_public = read_32(&data[pos..]);
        pos += 32;
        Ok(ChainCommit {
            timestamp,
            chain_id_hash,
            weld,
            entry_hash,
            cost,
            ec_public,
            signature: read_sig(&data[pos..]),
        })
    }

    pub fn verify(&self) -> bool {
        ed25519_verify(&self.ec_public, &self.signature, &self.signed_bytes())
    }

    pub fn get_entry_hash(&self) -> &[u8; 32] {
        &self.entry_hash
    }

    pub fn get_cost(&self) -> u8 {
        self.cost
    }

    pub fn get_weld(&self) -> &[u8; 32] {
        &self.weld
    }

    pub fn get_chain_id_hash(&self) -> &[u8; 32] {
        &self.chain_id_hash
    }
}

// The compose functions hand back complete requests with id 0; the caller
// can post them to factomd as they are.

pub fn compose_entry_commit<S: Signer>(entry: &Entry, ec: &S) -> Result<Request> {
    let commit = EntryCommit::new(entry, ec)?;
    let params = json!({ "message": HEXLOWER.encode(&commit.marshal()) });
    Ok(Request::new("commit-entry", 0, Some(params)))
}

pub fn compose_entry_reveal(entry: &Entry) -> Result<Request> {
    let params = json!({ "entry": HEXLOWER.encode(&entry.marshal()?) });
    Ok(Request::new("reveal-entry", 0, Some(params)))
}

pub fn compose_chain_commit<S: Signer>(chain: &Chain, ec: &S) -> Result<Request> {
    let commit = ChainCommit::new(chain, ec)?;
    let params = json!({ "message": HEXLOWER.encode(&commit.marshal()) });
    Ok(Request::new("commit-chain", 0, Some(params)))
}

pub fn compose_chain_reveal(chain: &Chain) -> Result<Request> {
    let params = json!({ "entry": HEXLOWER.encode(&chain.get_first_entry().marshal()?) });
    Ok(Request::new("reveal-chain", 0, Some(params)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::EcAddress;
    use crate::utils::hex_decode;

    const EC_SECRET: &str = "Es2Rf7iM6PdsqfYCo3D1tnAR65SkLENyWJG1deUzpRMQmbh9F3eG";

    fn sample_entry() -> Entry {
        Entry::new([0x11; 32], vec![b"id".to_vec()], b"some content".to_vec())
    }

    #[test]
    fn test_entry_commit_layout() {
        let ec = EcAddress::from_secret_string(EC_SECRET).unwrap();
        let entry = sample_entry();
        let commit = EntryCommit::with_timestamp(&entry, 1_500_000_000_000, &ec).unwrap();
        let raw = commit.marshal();

        assert_eq!(raw.len(), ENTRY_COMMIT_LEN);
        assert_eq!(raw[0], 0);
        assert_eq!(&raw[1..7], &timestamp_bytes(1_500_000_000_000));
        assert_eq!(&raw[7..39], &entry.hash().unwrap());
        assert_eq!(raw[39], entry.cost().unwrap());
        assert_eq!(&raw[40..72], &ec.public_key());
        assert!(ed25519_verify(&raw[40..72], &raw[72..], &raw[..40]));
        assert!(commit.verify());
    }

    #[test]
    fn test_entry_commit_parse_and_tamper() {
        let ec = EcAddress::from_secret_string(EC_SECRET).unwrap();
        let commit = EntryCommit::new(&sample_entry(), &ec).unwrap();
        let parsed = EntryCommit::unmarshal(&commit.marshal()).unwrap();
        assert_eq!(parsed, commit);

        let mut raw = commit.marshal();
        raw[39] ^= 0x01;
        assert!(!EntryCommit::unmarshal(&raw).unwrap().verify());
        assert!(EntryCommit::unmarshal(&raw[..100]).is_err());
    }

    #[test]
    fn test_chain_commit_weld_and_cost() {
        let ec = EcAddress::from_seed(&[3u8; 32]).unwrap();
        let chain = Chain::new(Entry::new_first(
            vec![b"my".to_vec(), b"chain".to_vec()],
            vec![0u8; 2000],
        ));
        let commit = ChainCommit::with_timestamp(&chain, 42, &ec).unwrap();
        let raw = commit.marshal();
        let entry_hash = chain.get_first_entry().hash().unwrap();

        assert_eq!(raw.len(), CHAIN_COMMIT_LEN);
        assert_eq!(&raw[7..39], &shad(chain.get_chain_id()));
        let mut weld = entry_hash.to_vec();
        weld.extend_from_slice(chain.get_chain_id());
        assert_eq!(&raw[39..71], &shad(&weld));
        assert_eq!(&raw[71..103], &entry_hash);
        assert_eq!(raw[103], 2 + CHAIN_CREATION_SURCHARGE);
        assert!(commit.verify());
        assert_eq!(ChainCommit::unmarshal(&raw).unwrap(), commit);
    }

    #[test]
    fn test_compose_requests() {
        let ec = EcAddress::from_seed(&[4u8; 32]).unwrap();
        let entry = sample_entry();

        let commit = compose_entry_commit(&entry, &ec).unwrap();
        assert_eq!(commit.method, "commit-entry");
        let message = commit.params.as_ref().unwrap()["message"].as_str().unwrap();
        assert_eq!(hex_decode(message).unwrap().len(), ENTRY_COMMIT_LEN);

        let reveal = compose_entry_reveal(&entry).unwrap();
        assert_eq!(reveal.method, "reveal-entry");
        let hex = reveal.params.as_ref().unwrap()["entry"].as_str().unwrap();
        assert_eq!(Entry::unmarshal(&hex_decode(hex).unwrap()).unwrap(), entry);

        let chain = Chain::new(Entry::new_first(vec![b"c".to_vec()], vec![]));
        assert_eq!(compose_chain_commit(&chain, &ec).unwrap().method, "commit-chain");
        assert_eq!(compose_chain_reveal(&chain).unwrap().method, "reveal-chain");
    }
}
