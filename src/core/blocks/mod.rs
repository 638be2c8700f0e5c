//! Decoders for the block types factomd returns as JSON
//!
//! Admin and entry credit blocks carry tagged entries and are decoded through
//! `from_value`; the rest are plain serde structs.

pub mod admin;
pub mod anchors;
pub mod dblock;
pub mod eblock;
pub mod ecblock;
pub mod fblock;

pub use admin::{ABlock, ABlockHeader, AdminEntry};
pub use anchors::{Anchors, BitcoinAnchor, EthereumAnchor, MerkleNode, Receipt};
pub use dblock::{DBlock, DBlockEntry, DBlockHead, DBlockSummary};
pub use eblock::{EBlock, EBlockEntry};
pub use ecblock::{ECBlock, EcEntry};
pub use fblock::{FBlock, FBlockTransaction};
