use super::numeric::{out_of_range, HostNumber};
use super::Decoder;
use crate::common::error::DuckBridgeResult;
use crate::types::hugeint::{join_i128, join_u128};
use crate::types::varint::decode_varint;
use crate::types::{LogicalType, Value};
use crate::vector::string::read_string_bytes;
use crate::vector::{FixedWidth, ForeignVector};
use num_bigint::BigInt;
use num_traits::ToPrimitive;

/// HUGEINT and UHUGEINT: a low u64 word followed by the high word
#[derive(Debug)]
pub struct BigIntegerReader<'a> {
    vector: ForeignVector<'a>,
    unsigned: bool,
}

impl<'a> BigIntegerReader<'a> {
    pub fn new(vector: ForeignVector<'a>) -> Self {
        let unsigned = matches!(vector.logical_type(), LogicalType::UHugeInt);
        Self { vector, unsigned }
    }

    fn words(&self, offset: usize) -> DuckBridgeResult<(u64, u64)> {
        let element = self.vector.data().element(offset)?;
        Ok((u64::decode(&element[0..8]), u64::decode(&element[8..16])))
    }

    pub fn read_i128(&self, offset: usize) -> DuckBridgeResult<i128> {
        let (low, high) = self.words(offset)?;
        if self.unsigned {
            let value = join_u128(low, high);
            i128::try_from(value).map_err(|_| out_of_range::<i128>(value))
        } else {
            Ok(join_i128(low, high as i64))
        }
    }

    pub fn read_u128(&self, offset: usize) -> DuckBridgeResult<u128> {
        let (low, high) = self.words(offset)?;
        if self.unsigned {
            Ok(join_u128(low, high))
        } else {
            let value = join_i128(low, high as i64);
            u128::try_from(value).map_err(|_| out_of_range::<u128>(value))
        }
    }

    pub fn read_bigint(&self, offset: usize) -> DuckBridgeResult<BigInt> {
        let (low, high) = self.words(offset)?;
        Ok(if self.unsigned {
            BigInt::from(join_u128(low, high))
        } else {
            BigInt::from(join_i128(low, high as i64))
        })
    }

    /// Narrow into any host number, failing instead of wrapping
    pub fn read_number<T: HostNumber>(&self, offset: usize) -> DuckBridgeResult<T> {
        let (low, high) = self.words(offset)?;
        if self.unsigned {
            let value = join_u128(low, high);
            T::from_u128(value).ok_or_else(|| out_of_range::<T>(value))
        } else {
            let value = join_i128(low, high as i64);
            T::from_i128(value).ok_or_else(|| out_of_range::<T>(value))
        }
    }
}

impl<'a> Decoder<'a> for BigIntegerReader<'a> {
    fn vector(&self) -> &ForeignVector<'a> {
        &self.vector
    }

    fn read_value(&self, offset: usize) -> DuckBridgeResult<Value> {
        if self.unsigned {
            Ok(Value::UHugeInt(self.read_u128(offset)?))
        } else {
            Ok(Value::HugeInt(self.read_i128(offset)?))
        }
    }
}

/// Arbitrary precision integers stored as varint blobs
#[derive(Debug)]
pub struct VarIntReader<'a> {
    vector: ForeignVector<'a>,
}

impl<'a> VarIntReader<'a> {
    pub fn new(vector: ForeignVector<'a>) -> Self {
        Self { vector }
    }

    pub fn read_bigint(&self, offset: usize) -> DuckBridgeResult<BigInt> {
        decode_varint(read_string_bytes(self.vector.data(), offset)?)
    }

    /// Narrow into any host number, failing instead of wrapping
    pub fn read_number<T: HostNumber>(&self, offset: usize) -> DuckBridgeResult<T> {
        let value = self.read_bigint(offset)?;
        let converted = if let Some(v) = value.to_i128() {
            T::from_i128(v)
        } else if let Some(v) = value.to_u128() {
            T::from_u128(v)
        } else if T::IS_FLOAT {
            value.to_f64().and_then(T::from_f64)
        } else {
            None
        };
        converted.ok_or_else(|| out_of_range::<T>(&value))
    }
}

impl<'a> Decoder<'a> for VarIntReader<'a> {
    fn vector(&self) -> &ForeignVector<'a> {
        &self.vector
    }

    fn read_value(&self, offset: usize) -> DuckBridgeResult<Value> {
        Ok(Value::VarInt(self.read_bigint(offset)?))
    }
}
