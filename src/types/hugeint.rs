//! 128-bit integers as two 64-bit words, and the UUID encoding built on them

use uuid::Uuid;

const SIGN_BIT: u64 = 1 << 63;

/// Split a signed 128-bit integer into (low, high) words
pub fn split_i128(value: i128) -> (u64, i64) {
    (value as u64, (value >> 64) as i64)
}

/// Join (low, high) words into a signed 128-bit integer
pub fn join_i128(low: u64, high: i64) -> i128 {
    (i128::from(high) << 64) | i128::from(low)
}

/// Split an unsigned 128-bit integer into (low, high) words
pub fn split_u128(value: u128) -> (u64, u64) {
    (value as u64, (value >> 64) as u64)
}

/// Join (low, high) words into an unsigned 128-bit integer
pub fn join_u128(low: u64, high: u64) -> u128 {
    (u128::from(high) << 64) | u128::from(low)
}

/// Decode a UUID stored as a hugeint whose top bit is flipped so that signed
/// comparison orders UUIDs like unsigned ones
pub fn uuid_from_words(low: u64, high: i64) -> Uuid {
    let upper = (high as u64) ^ SIGN_BIT;
    Uuid::from_u128(join_u128(low, upper))
}

/// Encode a UUID into hugeint (low, high) words
pub fn words_from_uuid(uuid: &Uuid) -> (u64, i64) {
    let (low, upper) = split_u128(uuid.as_u128());
    (low, (upper ^ SIGN_BIT) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_i128_words() {
        for value in [0i128, 1, -1, i128::MAX, i128::MIN, -(i128::MAX), 1 << 64] {
            let (low, high) = split_i128(value);
            assert_eq!(join_i128(low, high), value);
        }
        assert_eq!(split_i128(-1), (u64::MAX, -1));
    }

    #[test]
    fn test_u128_words() {
        for value in [0u128, u128::MAX, 1 << 100] {
            let (low, high) = split_u128(value);
            assert_eq!(join_u128(low, high), value);
        }
    }

    #[test]
    fn test_uuid_sign_flip() {
        let uuid = Uuid::parse_str("a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11").unwrap();
        let (low, high) = words_from_uuid(&uuid);
        // top nibble 0xa has its high bit cleared once flipped
        assert!(high >= 0);
        assert_eq!(uuid_from_words(low, high), uuid);
        let (_, nil_high) = words_from_uuid(&Uuid::nil());
        assert_eq!(nil_high, i64::MIN);
    }
}
