//! Core Factom data structures
//!
//! Entries and chains with their commit messages, the wallet's Factoid
//! transaction, identity chains, and the block types factomd returns.

pub mod blocks;
pub mod chain;
pub mod commit;
pub mod entry;
pub mod identity;
pub mod transaction;

pub use chain::{chain_exists, Chain};
pub use commit::{
    compose_chain_commit, compose_chain_reveal, compose_entry_commit, compose_entry_reveal,
    ChainCommit, EntryCommit,
};
pub use entry::{chain_id_from_ext_ids, chain_id_from_strings, entry_cost, Entry, MAX_ENTRY_PAYLOAD};
pub use transaction::{RcdSignature, TXAmount, TXInput, TXOutput, Transaction};
