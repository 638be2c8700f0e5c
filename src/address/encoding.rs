use crate::error::{FactomError, Result};
use crate::utils::{base58_decode, base58_encode, shad};

pub const ADDRESS_CHECK_SUM_LEN: usize = 4;
pub const BODY_LEN: usize = 32;

/// Decoded length of FA/Fs/EC/Es strings: 2-byte prefix, body, checksum
pub const ADDRESS_LEN: usize = 2 + BODY_LEN + ADDRESS_CHECK_SUM_LEN;
/// Decoded length of idpub/idsec strings: 5-byte prefix, body, checksum
pub const IDENTITY_KEY_LEN: usize = 5 + BODY_LEN + ADDRESS_CHECK_SUM_LEN;
/// Textual length of idpub/idsec strings
pub const IDENTITY_KEY_STRING_LEN: usize = 55;

pub const FACTOID_PUB_PREFIX: [u8; 2] = [0x5f, 0xb1];
pub const FACTOID_SEC_PREFIX: [u8; 2] = [0x64, 0x78];
pub const EC_PUB_PREFIX: [u8; 2] = [0x59, 0x2a];
pub const EC_SEC_PREFIX: [u8; 2] = [0x5d, 0xb6];
pub const ID_PUB_PREFIX: [u8; 5] = [0x03, 0x45, 0xef, 0x9d, 0xe0];
pub const ID_SEC_PREFIX: [u8; 5] = [0x03, 0x45, 0xf3, 0xd0, 0xd6];

fn checksum(payload: &[u8]) -> [u8; ADDRESS_CHECK_SUM_LEN] {
    let hash = shad(payload);
    let mut out = [0u8; ADDRESS_CHECK_SUM_LEN];
    out.copy_from_slice(&hash[..ADDRESS_CHECK_SUM_LEN]);
    out
}

/// prefix || body || shad(prefix || body)[..4], base58 encoded
pub fn encode_with_prefix(prefix: &[u8], body: &[u8; BODY_LEN]) -> String {
    let mut payload = Vec::with_capacity(prefix.len() + BODY_LEN + ADDRESS_CHECK_SUM_LEN);
    payload.extend_from_slice(prefix);
    payload.extend_from_slice(body);
    let checksum = checksum(&payload);
    payload.extend_from_slice(&checksum);
    base58_encode(&payload)
}

/// Base58-decode and verify the checksum, returning the raw payload without it
fn decode_checked(s: &str, expected_len: usize) -> Result<Vec<u8>> {
    let mut payload = base58_decode(s)?;
    if payload.len() != expected_len {
        return Err(FactomError::InvalidAddress(format!(
            "{s}: decoded length {} is not {expected_len}",
            payload.len()
        )));
    }
    let split = payload.len() - ADDRESS_CHECK_SUM_LEN;
    if checksum(&payload[..split]) != payload[split..] {
        return Err(FactomError::InvalidAddress(format!("{s}: checksum mismatch")));
    }
    payload.truncate(split);
    Ok(payload)
}

/// Decode a string that must carry `prefix`, returning the 32-byte body
pub fn decode_with_prefix(s: &str, prefix: &[u8]) -> Result<[u8; BODY_LEN]> {
    let payload = decode_checked(s, prefix.len() + BODY_LEN + ADDRESS_CHECK_SUM_LEN)?;
    if &payload[..prefix.len()] != prefix {
        return Err(FactomError::InvalidAddress(format!("{s}: unexpected prefix")));
    }
    let mut body = [0u8; BODY_LEN];
    body.copy_from_slice(&payload[prefix.len()..]);
    Ok(body)
}

/// The four address varieties; `Invalid` for anything else
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressKind {
    Invalid,
    FactoidPub,
    FactoidSec,
    EcPub,
    EcSec,
}

impl AddressKind {
    pub fn prefix(&self) -> Option<[u8; 2]> {
        match self {
            AddressKind::FactoidPub => Some(FACTOID_PUB_PREFIX),
            AddressKind::FactoidSec => Some(FACTOID_SEC_PREFIX),
            AddressKind::EcPub => Some(EC_PUB_PREFIX),
            AddressKind::EcSec => Some(EC_SEC_PREFIX),
            AddressKind::Invalid => None,
        }
    }

    pub fn is_factoid(&self) -> bool {
        matches!(self, AddressKind::FactoidPub | AddressKind::FactoidSec)
    }

    pub fn is_ec(&self) -> bool {
        matches!(self, AddressKind::EcPub | AddressKind::EcSec)
    }

    pub fn is_secret(&self) -> bool {
        matches!(self, AddressKind::FactoidSec | AddressKind::EcSec)
    }
}

pub fn classify(s: &str) -> AddressKind {
    let payload = match decode_checked(s, ADDRESS_LEN) {
        Ok(payload) => payload,
        Err(_) => return AddressKind::Invalid,
    };
    match [payload[0], payload[1]] {
        FACTOID_PUB_PREFIX => AddressKind::FactoidPub,
        FACTOID_SEC_PREFIX => AddressKind::FactoidSec,
        EC_PUB_PREFIX => AddressKind::EcPub,
        EC_SEC_PREFIX => AddressKind::EcSec,
        _ => AddressKind::Invalid,
    }
}

pub fn is_valid(s: &str) -> bool {
    classify(s) != AddressKind::Invalid
}

/// Identity key strings: idpub or idsec with a valid checksum
pub fn is_valid_identity_key(s: &str) -> bool {
    match decode_checked(s, IDENTITY_KEY_LEN) {
        Ok(payload) => payload[..5] == ID_PUB_PREFIX || payload[..5] == ID_SEC_PREFIX,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO_EC_PUB: &str = "EC1m9mouvUQeEidmqpUYpYtXg8fvTYi6GNHaKg8KMLbdMBrFfmUa";
    const ZERO_EC_SEC: &str = "Es2Rf7iM6PdsqfYCo3D1tnAR65SkLENyWJG1deUzpRMQmbh9F3eG";

    #[test]
    fn test_zero_body_strings() {
        assert_eq!(encode_with_prefix(&EC_PUB_PREFIX, &[0u8; 32]), ZERO_EC_PUB);
        assert_eq!(encode_with_prefix(&EC_SEC_PREFIX, &[0u8; 32]), ZERO_EC_SEC);
    }

    #[test]
    fn test_classify_each_kind() {
        let body = [9u8; 32];
        assert_eq!(
            classify(&encode_with_prefix(&FACTOID_PUB_PREFIX, &body)),
            AddressKind::FactoidPub
        );
        assert_eq!(
            classify(&encode_with_prefix(&FACTOID_SEC_PREFIX, &body)),
            AddressKind::FactoidSec
        );
        assert_eq!(classify(ZERO_EC_PUB), AddressKind::EcPub);
        assert_eq!(classify(ZERO_EC_SEC), AddressKind::EcSec);
        assert_eq!(classify("not an address"), AddressKind::Invalid);
        assert_eq!(classify(""), AddressKind::Invalid);
    }

    #[test]
    fn test_unknown_prefix_is_invalid() {
        let s = encode_with_prefix(&[0x00, 0x01], &[1u8; 32]);
        assert_eq!(classify(&s), AddressKind::Invalid);
        assert!(decode_with_prefix(&s, &EC_PUB_PREFIX).is_err());
    }

    #[test]
    fn test_checksum_byte_flip_invalidates() {
        let mut payload = base58_decode(ZERO_EC_PUB).unwrap();
        for i in ADDRESS_LEN - ADDRESS_CHECK_SUM_LEN..ADDRESS_LEN {
            payload[i] ^= 0x01;
            let tampered = base58_encode(&payload);
            assert!(!is_valid(&tampered), "byte {i} flip should invalidate");
            payload[i] ^= 0x01;
        }
        assert!(is_valid(&base58_encode(&payload)));
    }

    #[test]
    fn test_identity_key_validity() {
        let idpub = "idpub1p4YkMzskVrtbK45nBHaikGda9w5SMvKvVsQtgVUfLK5Y8tByb";
        assert_eq!(idpub.len(), IDENTITY_KEY_STRING_LEN);
        assert!(is_valid_identity_key(idpub));
        assert!(!is_valid(idpub));
        assert!(!is_valid_identity_key(ZERO_EC_PUB));
    }
}
