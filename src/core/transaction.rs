// This file implements the Factoid transaction the wallet builds, signs and submits.
// Inputs and outputs are plain (amount, address) pairs; every input later gets an
// RCD plus signature, in input order, appended after the signed ledger bytes.

use crate::address::{FactoidAddress, Rcd1, Signer, RCD_1_LEN};
use crate::error::{FactomError, Result};
use crate::utils::{
    current_timestamp, decode_varint, ed25519_verify, encode_varint, sha256_digest, SIGNATURE_LEN,
};
use data_encoding::HEXLOWER;

pub const TRANSACTION_VERSION: u64 = 2;

// I size unsigned transactions as if every input already carried its RCD and signature
const SIGNATURE_BLOCK_LEN: usize = RCD_1_LEN + SIGNATURE_LEN;
const KILOBYTE: usize = 1024;
const OUTPUT_FEE_WEIGHT: u64 = 10;

/// One input or output: an amount in factoshis and a 32-byte address body
/// (RCD hash for Factoid addresses, public key for EC addresses)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TXAmount {
    amount: u64,
    address: [u8; 32],
}

impl TXAmount {
    pub fn new(amount: u64, address: [u8; 32]) -> TXAmount {
        TXAmount { amount, address }
    }

    pub fn get_amount(&self) -> u64 {
        self.amount
    }

    pub fn get_address(&self) -> &[u8; 32] {
        &self.address
    }
}

pub type TXInput = TXAmount;
pub type TXOutput = TXAmount;

/// RCD and signature proving ownership of one input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RcdSignature {
    rcd: Rcd1,
    signature: [u8; SIGNATURE_LEN],
}

impl RcdSignature {
    pub fn get_rcd(&self) -> &Rcd1 {
        &self.rcd
    }

    pub fn get_signature(&self) -> &[u8; SIGNATURE_LEN] {
        &self.signature
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    timestamp: u64,              // Milliseconds since the epoch, 48 bits on the wire
    inputs: Vec<TXInput>,        // Factoid addresses being spent from
    outputs: Vec<TXOutput>,      // Factoid addresses being paid
    ec_outputs: Vec<TXOutput>,   // EC addresses being funded
    signatures: Vec<RcdSignature>, // One per input once signed, empty before
}

fn upsert(list: &mut Vec<TXAmount>, address: [u8; 32], amount: u64) {
    match list.iter_mut().find(|io| io.address == address) {
        Some(io) => io.amount = amount,
        None => list.push(TXAmount::new(amount, address)),
    }
}

fn checked_sum(list: &[TXAmount]) -> Result<u64> {
    list.iter().try_fold(0u64, |acc, io| {
        acc.checked_add(io.amount)
            .ok_or_else(|| FactomError::Transaction("Amount overflow".to_string()))
    })
}

impl Transaction {
    pub fn new() -> Result<Transaction> {
        Ok(Self::with_timestamp(current_timestamp()?))
    }

    pub fn with_timestamp(timestamp: u64) -> Transaction {
        Transaction {
            timestamp,
            inputs: vec![],
            outputs: vec![],
            ec_outputs: vec![],
            signatures: vec![],
        }
    }

    // Signatures cover the ledger bytes, so a signed body is frozen
    fn ensure_unsigned(&self) -> Result<()> {
        if self.signatures.is_empty() {
            Ok(())
        } else {
            Err(FactomError::Transaction("Transaction is already signed".to_string()))
        }
    }

    /// Adding an address that is already an input replaces its amount
    pub fn add_input(&mut self, rcd_hash: [u8; 32], amount: u64) -> Result<()> {
        self.ensure_unsigned()?;
        upsert(&mut self.inputs, rcd_hash, amount);
        Ok(())
    }

    pub fn add_output(&mut self, rcd_hash: [u8; 32], amount: u64) -> Result<()> {
        self.ensure_unsigned()?;
        upsert(&mut self.outputs, rcd_hash, amount);
        Ok(())
    }

    pub fn add_ec_output(&mut self, ec_public: [u8; 32], amount: u64) -> Result<()> {
        self.ensure_unsigned()?;
        upsert(&mut self.ec_outputs, ec_public, amount);
        Ok(())
    }

    /// Grow the named input by `fee`
    pub fn add_fee_to_input(&mut self, rcd_hash: &[u8; 32], fee: u64) -> Result<()> {
        self.ensure_unsigned()?;
        let input = self
            .inputs
            .iter_mut()
            .find(|io| &io.address == rcd_hash)
            .ok_or_else(|| FactomError::Transaction("Address is not an input".to_string()))?;
        input.amount = input
            .amount
            .checked_add(fee)
            .ok_or_else(|| FactomError::Transaction("Amount overflow".to_string()))?;
        Ok(())
    }

    /// Shrink the named output by `fee`
    pub fn sub_fee_from_output(&mut self, rcd_hash: &[u8; 32], fee: u64) -> Result<()> {
        self.ensure_unsigned()?;
        let output = self
            .outputs
            .iter_mut()
            .find(|io| &io.address == rcd_hash)
            .ok_or_else(|| FactomError::Transaction("Address is not an output".to_string()))?;
        output.amount = output.amount.checked_sub(fee).ok_or_else(|| {
            FactomError::Transaction("Output is smaller than the fee".to_string())
        })?;
        Ok(())
    }

    pub fn get_timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn get_inputs(&self) -> &[TXInput] {
        self.inputs.as_slice()
    }

    pub fn get_outputs(&self) -> &[TXOutput] {
        self.outputs.as_slice()
    }

    pub fn get_ec_outputs(&self) -> &[TXOutput] {
        self.ec_outputs.as_slice()
    }

    pub fn get_signatures(&self) -> &[RcdSignature] {
        self.signatures.as_slice()
    }

    pub fn total_inputs(&self) -> Result<u64> {
        checked_sum(&self.inputs)
    }

    pub fn total_outputs(&self) -> Result<u64> {
        checked_sum(&self.outputs)
    }

    pub fn total_ec_outputs(&self) -> Result<u64> {
        checked_sum(&self.ec_outputs)
    }

    /// Inputs minus all outputs; zero when outputs exceed inputs
    pub fn fees_paid(&self) -> Result<u64> {
        let out = self
            .total_outputs()?
            .checked_add(self.total_ec_outputs()?)
            .ok_or_else(|| FactomError::Transaction("Amount overflow".to_string()))?;
        Ok(self.total_inputs()?.saturating_sub(out))
    }

    /// The bytes every input signs
    pub fn ledger_bytes(&self) -> Result<Vec<u8>> {
        for list in [&self.inputs, &self.outputs, &self.ec_outputs] {
            if list.len() > u8::MAX as usize {
                return Err(FactomError::Transaction(
                    "Too many inputs or outputs".to_string(),
                ));
            }
        }

        let mut out = Vec::new();
        encode_varint(&mut out, TRANSACTION_VERSION);
        out.extend_from_slice(&self.timestamp.to_be_bytes()[2..]);
        out.push(self.inputs.len() as u8);
        out.push(self.outputs.len() as u8);
        out.push(self.ec_outputs.len() as u8);
        for io in self
            .inputs
            .iter()
            .chain(self.outputs.iter())
            .chain(self.ec_outputs.iter())
        {
            encode_varint(&mut out, io.amount);
            out.extend_from_slice(&io.address);
        }
        Ok(out)
    }

    pub fn marshal(&self) -> Result<Vec<u8>> {
        let mut out = self.ledger_bytes()?;
        for sig in &self.signatures {
            out.extend_from_slice(&sig.rcd.to_bytes());
            out.extend_from_slice(&sig.signature);
        }
        Ok(out)
    }

    pub fn unmarshal(data: &[u8]) -> Result<Transaction> {
        let short = || FactomError::Transaction("Truncated transaction".to_string());

        let (version, mut pos) = decode_varint(data)?;
        if version != TRANSACTION_VERSION {
            return Err(FactomError::Transaction(format!(
                "Unsupported transaction version {version}"
            )));
        }
        if data.len() < pos + 9 {
            return Err(short());
        }
        let mut ts = [0u8; 8];
        ts[2..].copy_from_slice(&data[pos..pos + 6]);
        pos += 6;
        let counts = [data[pos] as usize, data[pos + 1] as usize, data[pos + 2] as usize];
        pos += 3;

        let mut tx = Transaction::with_timestamp(u64::from_be_bytes(ts));
        for (kind, count) in counts.iter().enumerate() {
            for _ in 0..*count {
                let (amount, used) = decode_varint(&data[pos..])?;
                pos += used;
                if data.len() < pos + 32 {
                    return Err(short());
                }
                let mut address = [0u8; 32];
                address.copy_from_slice(&data[pos..pos + 32]);
                pos += 32;
                let io = TXAmount::new(amount, address);
                match kind {
                    0 => tx.inputs.push(io),
                    1 => tx.outputs.push(io),
                    _ => tx.ec_outputs.push(io),
                }
            }
        }

        while pos < data.len() {
            if data.len() < pos + SIGNATURE_BLOCK_LEN {
                return Err(short());
            }
            let rcd = Rcd1::from_bytes(&data[pos..pos + RCD_1_LEN])?;
            pos += RCD_1_LEN;
            let mut signature = [0u8; SIGNATURE_LEN];
            signature.copy_from_slice(&data[pos..pos + SIGNATURE_LEN]);
            pos += SIGNATURE_LEN;
            tx.signatures.push(RcdSignature { rcd, signature });
        }
        Ok(tx)
    }

    /// SHA256 of the ledger bytes
    pub fn txid(&self) -> Result<[u8; 32]> {
        Ok(sha256_digest(&self.ledger_bytes()?))
    }

    pub fn txid_hex(&self) -> Result<String> {
        Ok(HEXLOWER.encode(&self.txid()?))
    }

    /// Size once fully signed
    pub fn signed_size(&self) -> Result<usize> {
        Ok(self.ledger_bytes()?.len() + self.inputs.len() * SIGNATURE_BLOCK_LEN)
    }

    /// rate * (kilobytes + 10 per output + 1 per input)
    pub fn required_fee(&self, ec_rate: u64) -> Result<u64> {
        let kilobytes = self.signed_size()?.div_ceil(KILOBYTE) as u64;
        let outputs = (self.outputs.len() + self.ec_outputs.len()) as u64;
        let units = kilobytes + OUTPUT_FEE_WEIGHT * outputs + self.inputs.len() as u64;
        units
            .checked_mul(ec_rate)
            .ok_or_else(|| FactomError::Transaction("Fee overflow".to_string()))
    }

    /// Balance and fee checks run before signing. `force` skips the fee floor
    /// but never the balance check.
    pub fn validate(&self, ec_rate: u64, force: bool) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(FactomError::Transaction(
                "Transaction has no inputs".to_string(),
            ));
        }
        let spent = self
            .total_outputs()?
            .checked_add(self.total_ec_outputs()?)
            .ok_or_else(|| FactomError::Transaction("Amount overflow".to_string()))?;
        let available = self.total_inputs()?;
        if available < spent {
            return Err(FactomError::Transaction(format!(
                "Inputs {available} are less than outputs {spent}"
            )));
        }
        if !force {
            let fee = available - spent;
            let required = self.required_fee(ec_rate)?;
            if fee < required {
                return Err(FactomError::Transaction(format!(
                    "Insufficient fee: paying {fee}, need {required}"
                )));
            }
            if fee > required {
                return Err(FactomError::Transaction(format!(
                    "Overpaying fee: paying {fee}, need {required}"
                )));
            }
        }
        Ok(())
    }

    /// Sign with one key per input, in input order
    pub fn sign(&mut self, keys: &[&FactoidAddress]) -> Result<()> {
        if keys.len() != self.inputs.len() {
            return Err(FactomError::Transaction(format!(
                "{} keys for {} inputs",
                keys.len(),
                self.inputs.len()
            )));
        }
        let ledger = self.ledger_bytes()?;

        let mut signatures = Vec::with_capacity(keys.len());
        for (input, key) in self.inputs.iter().zip(keys.iter()) {
            if key.rcd_hash() != input.address {
                return Err(FactomError::Transaction(
                    "Signing key does not match its input".to_string(),
                ));
            }
            signatures.push(RcdSignature {
                rcd: *key.rcd(),
                signature: key.sign(&ledger)?,
            });
        }
        self.signatures = signatures;
        Ok(())
    }

    pub fn is_signed(&self) -> bool {
        !self.inputs.is_empty() && self.signatures.len() == self.inputs.len()
    }

    /// Every input has a matching RCD and a valid signature over the ledger bytes
    pub fn verify_signatures(&self) -> bool {
        if !self.is_signed() {
            return false;
        }
        let ledger = match self.ledger_bytes() {
            Ok(bytes) => bytes,
            Err(e) => {
                log::error!("Cannot serialize transaction for verification: {e}");
                return false;
            }
        };
        self.inputs.iter().zip(self.signatures.iter()).all(|(input, sig)| {
            sig.rcd.hash() == input.address
                && ed25519_verify(sig.rcd.public_key(), &sig.signature, &ledger)
        })
    }
}
