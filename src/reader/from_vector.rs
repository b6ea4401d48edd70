use super::numeric::{out_of_range, HostNumber};
use super::{mismatch, Decoder, VectorReader};
use crate::common::error::DuckBridgeResult;
use crate::types::{IntervalValue, TimeTzValue, Value};
use bytes::Bytes;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use num_bigint::BigInt;
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use uuid::Uuid;

/// Host type a vector row can be read into.
///
/// `from_null` says what a null row becomes; `None` makes a null row a
/// `NullViolation`. `from_valid` is only called for rows that hold a value.
pub trait FromVector: Sized {
    fn from_null() -> Option<Self> {
        None
    }

    fn from_valid(reader: &VectorReader<'_>, offset: usize) -> DuckBridgeResult<Self>;
}

fn read_host_number<T: HostNumber>(reader: &VectorReader<'_>, offset: usize) -> DuckBridgeResult<T> {
    match reader {
        VectorReader::Numeric(r) => r.read_number(offset),
        VectorReader::BigInteger(r) => r.read_number(offset),
        VectorReader::VarInt(r) => r.read_number(offset),
        VectorReader::Decimal(r) if T::IS_FLOAT => {
            let v = r.read_f64(offset)?;
            T::from_f64(v).ok_or_else(|| out_of_range::<T>(v))
        }
        VectorReader::Enum(r) if T::IS_UNSIGNED => {
            let index = r.read_index(offset)?;
            T::from_usize(index).ok_or_else(|| out_of_range::<T>(index))
        }
        other => Err(mismatch::<T>(other)),
    }
}

macro_rules! impl_from_vector_number {
    ($($ty:ty),*) => {
        $(
            impl FromVector for $ty {
                fn from_valid(reader: &VectorReader<'_>, offset: usize) -> DuckBridgeResult<Self> {
                    read_host_number(reader, offset)
                }
            }
        )*
    };
}

impl_from_vector_number!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, f32, f64);

impl FromVector for bool {
    fn from_valid(reader: &VectorReader<'_>, offset: usize) -> DuckBridgeResult<Self> {
        match reader {
            VectorReader::Boolean(r) => r.read_bool(offset),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl FromVector for String {
    fn from_valid(reader: &VectorReader<'_>, offset: usize) -> DuckBridgeResult<Self> {
        match reader {
            VectorReader::String(r) => r.read_string(offset),
            VectorReader::Enum(r) => r.read_name(offset).map(str::to_string),
            VectorReader::Uuid(r) => Ok(r.read_uuid(offset)?.hyphenated().to_string()),
            VectorReader::Decimal(r) => r.read_string(offset),
            VectorReader::BigInteger(r) => Ok(r.read_bigint(offset)?.to_string()),
            VectorReader::VarInt(r) => Ok(r.read_bigint(offset)?.to_string()),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl FromVector for Bytes {
    fn from_valid(reader: &VectorReader<'_>, offset: usize) -> DuckBridgeResult<Self> {
        match reader {
            VectorReader::String(r) => r.read_blob(offset),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl FromVector for Decimal {
    fn from_valid(reader: &VectorReader<'_>, offset: usize) -> DuckBridgeResult<Self> {
        match reader {
            VectorReader::Decimal(r) => r.read_decimal(offset),
            VectorReader::Numeric(r) if r.vector().logical_type().is_integral() => {
                exact_decimal(r.read_number::<i128>(offset)?)
            }
            VectorReader::BigInteger(r) => exact_decimal(r.read_number::<i128>(offset)?),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

/// Integers beyond the 96-bit mantissa overflow instead of rounding
fn exact_decimal(value: i128) -> DuckBridgeResult<Decimal> {
    Decimal::from_i128(value).ok_or_else(|| out_of_range::<Decimal>(value))
}

impl FromVector for BigInt {
    fn from_valid(reader: &VectorReader<'_>, offset: usize) -> DuckBridgeResult<Self> {
        match reader {
            VectorReader::BigInteger(r) => r.read_bigint(offset),
            VectorReader::VarInt(r) => r.read_bigint(offset),
            VectorReader::Numeric(r) if r.vector().logical_type().is_integral() => {
                Ok(BigInt::from(r.read_number::<i128>(offset)?))
            }
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl FromVector for Uuid {
    fn from_valid(reader: &VectorReader<'_>, offset: usize) -> DuckBridgeResult<Self> {
        match reader {
            VectorReader::Uuid(r) => r.read_uuid(offset),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl FromVector for NaiveDate {
    fn from_valid(reader: &VectorReader<'_>, offset: usize) -> DuckBridgeResult<Self> {
        match reader {
            VectorReader::Temporal(r) => r.read_date(offset),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl FromVector for NaiveTime {
    fn from_valid(reader: &VectorReader<'_>, offset: usize) -> DuckBridgeResult<Self> {
        match reader {
            VectorReader::Temporal(r) => r.read_time(offset),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl FromVector for TimeTzValue {
    fn from_valid(reader: &VectorReader<'_>, offset: usize) -> DuckBridgeResult<Self> {
        match reader {
            VectorReader::Temporal(r) => r.read_time_tz(offset),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl FromVector for NaiveDateTime {
    fn from_valid(reader: &VectorReader<'_>, offset: usize) -> DuckBridgeResult<Self> {
        match reader {
            VectorReader::Temporal(r) => r.read_timestamp(offset),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl FromVector for DateTime<Utc> {
    fn from_valid(reader: &VectorReader<'_>, offset: usize) -> DuckBridgeResult<Self> {
        match reader {
            VectorReader::Temporal(r) => r.read_timestamp_utc(offset),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl FromVector for IntervalValue {
    fn from_valid(reader: &VectorReader<'_>, offset: usize) -> DuckBridgeResult<Self> {
        match reader {
            VectorReader::Interval(r) => r.read_interval(offset),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl FromVector for TimeDelta {
    fn from_valid(reader: &VectorReader<'_>, offset: usize) -> DuckBridgeResult<Self> {
        match reader {
            VectorReader::Interval(r) => r.read_duration(offset),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl FromVector for Value {
    fn from_null() -> Option<Self> {
        Some(Value::Null)
    }

    fn from_valid(reader: &VectorReader<'_>, offset: usize) -> DuckBridgeResult<Self> {
        reader.get_value(offset)
    }
}

impl<T: FromVector> FromVector for Option<T> {
    fn from_null() -> Option<Self> {
        Some(None)
    }

    fn from_valid(reader: &VectorReader<'_>, offset: usize) -> DuckBridgeResult<Self> {
        T::from_valid(reader, offset).map(Some)
    }
}

impl<T: FromVector> FromVector for Vec<T> {
    fn from_valid(reader: &VectorReader<'_>, offset: usize) -> DuckBridgeResult<Self> {
        match reader {
            VectorReader::List(r) => r.read_vec(offset),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl<K, V> FromVector for HashMap<K, V>
where
    K: FromVector + Eq + Hash,
    V: FromVector,
{
    fn from_valid(reader: &VectorReader<'_>, offset: usize) -> DuckBridgeResult<Self> {
        match reader {
            VectorReader::Map(r) => Ok(r.read_entries(offset)?.into_iter().collect()),
            other => Err(mismatch::<Self>(other)),
        }
    }
}

impl<K, V> FromVector for BTreeMap<K, V>
where
    K: FromVector + Ord,
    V: FromVector,
{
    fn from_valid(reader: &VectorReader<'_>, offset: usize) -> DuckBridgeResult<Self> {
        match reader {
            VectorReader::Map(r) => Ok(r.read_entries(offset)?.into_iter().collect()),
            other => Err(mismatch::<Self>(other)),
        }
    }
}
