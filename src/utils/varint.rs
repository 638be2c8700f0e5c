//! Factom variable-length integers
//!
//! Big-endian base-128: every byte but the last carries the 0x80
//! continuation bit. Zero is the single byte `0x00`.

use crate::error::{FactomError, Result};

pub fn encode_varint(out: &mut Vec<u8>, value: u64) {
    let mut groups = [0u8; 10];
    let mut count = 0;
    let mut v = value;
    loop {
        groups[count] = (v & 0x7f) as u8;
        count += 1;
        v >>= 7;
        if v == 0 {
            break;
        }
    }
    for i in (0..count).rev() {
        let byte = if i == 0 { groups[i] } else { groups[i] | 0x80 };
        out.push(byte);
    }
}

/// Decode a varint from the front of `data`, returning the value and bytes consumed
pub fn decode_varint(data: &[u8]) -> Result<(u64, usize)> {
    let mut value: u64 = 0;
    for (i, byte) in data.iter().enumerate() {
        if i >= 10 || value > (u64::MAX >> 7) {
            return Err(FactomError::Serialization("Varint overflow".to_string()));
        }
        value = (value << 7) | u64::from(byte & 0x7f);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(FactomError::Serialization("Truncated varint".to_string()))
}

pub fn varint_len(value: u64) -> usize {
    let mut out = Vec::with_capacity(10);
    encode_varint(&mut out, value);
    out.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(value: u64) -> Vec<u8> {
        let mut out = vec![];
        encode_varint(&mut out, value);
        out
    }

    #[test]
    fn test_small_values() {
        assert_eq!(encoded(0), vec![0x00]);
        assert_eq!(encoded(1), vec![0x01]);
        assert_eq!(encoded(127), vec![0x7f]);
        assert_eq!(encoded(128), vec![0x81, 0x00]);
        assert_eq!(encoded(300), vec![0x82, 0x2c]);
    }

    #[test]
    fn test_decode_reports_consumed_bytes() {
        let data = [0x82, 0x2c, 0xff];
        assert_eq!(decode_varint(&data).unwrap(), (300, 2));
        assert_eq!(varint_len(300), 2);
    }

    #[test]
    fn test_max_value() {
        let bytes = encoded(u64::MAX);
        assert_eq!(bytes.len(), 10);
        assert_eq!(decode_varint(&bytes).unwrap(), (u64::MAX, 10));
    }

    #[test]
    fn test_truncated() {
        assert!(decode_varint(&[0x81]).is_err());
        assert!(decode_varint(&[]).is_err());
    }
}
