//! Arbitrary precision integers in the engine's varint blob layout.
//!
//! A varint is a 3-byte header followed by the big-endian magnitude. The header
//! holds the magnitude's byte length with bit 23 set for non-negative values.
//! Negative values store the one's complement of the whole blob.

use crate::common::constants::VARINT_HEADER_SIZE;
use crate::common::error::{DuckBridgeError, DuckBridgeResult};
use num_bigint::{BigInt, BigUint, Sign};

const POSITIVE_FLAG: u32 = 0x80_0000;
const LENGTH_MASK: u32 = 0x7F_FFFF;

/// Decode a varint blob
pub fn decode_varint(blob: &[u8]) -> DuckBridgeResult<BigInt> {
    if blob.len() <= VARINT_HEADER_SIZE {
        return Err(DuckBridgeError::InvalidValue(format!(
            "Varint blob of {} bytes is too short",
            blob.len()
        )));
    }
    let header = u32::from(blob[0]) << 16 | u32::from(blob[1]) << 8 | u32::from(blob[2]);
    let is_negative = header & POSITIVE_FLAG == 0;
    let declared = if is_negative {
        !header & LENGTH_MASK
    } else {
        header & LENGTH_MASK
    } as usize;

    let payload = &blob[VARINT_HEADER_SIZE..];
    if declared != payload.len() {
        return Err(DuckBridgeError::InvalidValue(format!(
            "Varint header declares {} bytes but {} follow",
            declared,
            payload.len()
        )));
    }

    if is_negative {
        let inverted: Vec<u8> = payload.iter().map(|b| !b).collect();
        Ok(BigInt::from_biguint(
            Sign::Minus,
            BigUint::from_bytes_be(&inverted),
        ))
    } else {
        Ok(BigInt::from_biguint(
            Sign::Plus,
            BigUint::from_bytes_be(payload),
        ))
    }
}

/// Encode a big integer as a varint blob
pub fn encode_varint(value: &BigInt) -> DuckBridgeResult<Vec<u8>> {
    let (sign, magnitude) = value.to_bytes_be();
    let length = u32::try_from(magnitude.len())
        .ok()
        .filter(|len| *len <= LENGTH_MASK)
        .ok_or_else(|| crate::overflow_err!("Varint of {} bytes is too large", magnitude.len()))?;

    let is_negative = sign == Sign::Minus;
    let header = if is_negative {
        !(length | POSITIVE_FLAG) & 0xFF_FFFF
    } else {
        length | POSITIVE_FLAG
    };

    let mut blob = Vec::with_capacity(VARINT_HEADER_SIZE + magnitude.len());
    blob.push((header >> 16) as u8);
    blob.push((header >> 8) as u8);
    blob.push(header as u8);
    if is_negative {
        blob.extend(magnitude.iter().map(|b| !b));
    } else {
        blob.extend_from_slice(&magnitude);
    }
    Ok(blob)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_layout() {
        let blob = encode_varint(&BigInt::from(0)).unwrap();
        assert_eq!(blob, vec![0x80, 0x00, 0x01, 0x00]);
        assert_eq!(decode_varint(&blob).unwrap(), BigInt::from(0));
    }

    #[test]
    fn test_negative_is_ones_complement() {
        let blob = encode_varint(&BigInt::from(-1)).unwrap();
        assert_eq!(blob, vec![0x7F, 0xFF, 0xFE, 0xFE]);
        assert_eq!(decode_varint(&blob).unwrap(), BigInt::from(-1));
    }

    #[test]
    fn test_boundaries() {
        let max = BigInt::from(i128::MAX);
        let min = -BigInt::from(i128::MAX);
        for value in [max.clone(), min, max * 1000 + 7] {
            let blob = encode_varint(&value).unwrap();
            assert_eq!(decode_varint(&blob).unwrap(), value);
        }
    }

    #[test]
    fn test_negative_header_clears_the_sign_bit() {
        let blob = encode_varint(&BigInt::from(-300)).unwrap();
        // magnitude 0x012C takes two bytes
        assert_eq!(blob, vec![0x7F, 0xFF, 0xFD, 0xFE, 0xD3]);
        assert_eq!(blob[0] & 0x80, 0);
        assert_eq!(decode_varint(&blob).unwrap(), BigInt::from(-300));
    }

    #[test]
    fn test_malformed_blob() {
        assert!(decode_varint(&[0x80, 0x00]).is_err());
        assert!(decode_varint(&[0x80, 0x00, 0x02, 0x01]).is_err());
    }
}
