//! Writes host values into one vector of a data chunk.
//!
//! A value is first encoded against the vector's declared type into an
//! `Encoded` tree. Nothing touches the vector until that succeeds, so a
//! rejected value never leaves a half-written row behind.

use crate::common::error::{DuckBridgeError, DuckBridgeResult};
use crate::native::WritableVector;
use crate::reader::temporal::TemporalKind;
use crate::types::decimal::{scaled_from_decimal, scaled_from_integer};
use crate::types::hugeint::{split_i128, split_u128, words_from_uuid};
use crate::types::temporal::{
    days_from_date, micros_from_time, pack_time_tz, ticks_from_timestamp, TimestampUnit,
};
use crate::types::varint::encode_varint;
use crate::types::{LogicalType, PhysicalType, Value};
use crate::vector::{set_invalid, set_valid, FixedWidth};
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::borrow::Cow;

const MAX_FIXED_WIDTH: usize = 16;

/// A value encoded for its destination, ready to be placed
#[derive(Debug)]
enum Encoded<'v> {
    Null,
    Fixed {
        bytes: [u8; MAX_FIXED_WIDTH],
        width: usize,
    },
    /// String, blob or varint payload
    Payload(Cow<'v, [u8]>),
    /// List or map entries appended to the child vector
    List(Vec<Encoded<'v>>),
    /// Fixed-size array elements at `offset * size + i`
    Array(Vec<Encoded<'v>>),
    /// Struct fields in declaration order
    Struct(Vec<Encoded<'v>>),
}

fn fixed<T: FixedWidth>(value: T) -> Encoded<'static> {
    let mut bytes = [0u8; MAX_FIXED_WIDTH];
    value.encode(&mut bytes[..T::SIZE]);
    Encoded::Fixed {
        bytes,
        width: T::SIZE,
    }
}

fn words(low: u64, high: u64) -> Encoded<'static> {
    let mut bytes = [0u8; MAX_FIXED_WIDTH];
    low.encode(&mut bytes[0..8]);
    high.encode(&mut bytes[8..16]);
    Encoded::Fixed {
        bytes,
        width: MAX_FIXED_WIDTH,
    }
}

fn mismatch(logical_type: &LogicalType, value: &Value) -> DuckBridgeError {
    crate::type_mismatch_err!(
        "Cannot append {} value to a {} column",
        value.kind(),
        logical_type
    )
}

fn overflow(logical_type: &LogicalType, value: &Value) -> DuckBridgeError {
    crate::overflow_err!("{} does not fit in {}", value, logical_type)
}

fn convert_integer<T: FromPrimitive>(logical_type: &LogicalType, value: &Value) -> DuckBridgeResult<T> {
    let converted = match value {
        Value::UHugeInt(v) => T::from_u128(*v),
        Value::VarInt(v) => v
            .to_i128()
            .and_then(T::from_i128)
            .or_else(|| v.to_u128().and_then(T::from_u128)),
        other => match other.as_i128() {
            Some(v) => T::from_i128(v),
            None => return Err(mismatch(logical_type, value)),
        },
    };
    converted.ok_or_else(|| overflow(logical_type, value))
}

fn encode_integer<T>(logical_type: &LogicalType, value: &Value) -> DuckBridgeResult<Encoded<'static>>
where
    T: FixedWidth + FromPrimitive,
{
    convert_integer::<T>(logical_type, value).map(fixed)
}

/// Integers and decimals are taken only when the column stores them exactly
fn encode_float(logical_type: &LogicalType, value: &Value) -> DuckBridgeResult<f64> {
    let single = matches!(logical_type, LogicalType::Float);
    let stored = |v: f64| if single { f64::from(v as f32) } else { v };
    match value {
        Value::Float(v) => Ok(f64::from(*v)),
        Value::Double(v) => Ok(*v),
        Value::Decimal(d) => {
            let v = d.to_f64().map(stored).ok_or_else(|| mismatch(logical_type, value))?;
            let back = if single {
                Decimal::from_f32(v as f32)
            } else {
                Decimal::from_f64(v)
            };
            if back == Some(*d) {
                Ok(v)
            } else {
                Err(mismatch(logical_type, value))
            }
        }
        other => {
            let exact = other.as_i128().ok_or_else(|| mismatch(logical_type, value))?;
            let v = stored(exact as f64);
            if v.to_i128() == Some(exact) {
                Ok(v)
            } else {
                Err(mismatch(logical_type, value))
            }
        }
    }
}

fn encode_decimal(
    logical_type: &LogicalType,
    value: &Value,
    width: u8,
    scale: u8,
) -> DuckBridgeResult<Encoded<'static>> {
    let scaled = match value {
        Value::Decimal(v) => scaled_from_decimal(v, width, scale)?,
        other => match other.as_i128() {
            Some(v) => scaled_from_integer(v, width, scale)?,
            None => return Err(mismatch(logical_type, value)),
        },
    };
    let narrow = |fits: Option<Encoded<'static>>| fits.ok_or_else(|| overflow(logical_type, value));
    match logical_type.physical_type() {
        PhysicalType::Int16 => narrow(i16::try_from(scaled).ok().map(fixed)),
        PhysicalType::Int32 => narrow(i32::try_from(scaled).ok().map(fixed)),
        PhysicalType::Int64 => narrow(i64::try_from(scaled).ok().map(fixed)),
        _ => {
            let (low, high) = split_i128(scaled);
            Ok(words(low, high as u64))
        }
    }
}

fn encode_timestamp(
    logical_type: &LogicalType,
    value: &Value,
    unit: TimestampUnit,
) -> DuckBridgeResult<Encoded<'static>> {
    let timestamp = match value {
        Value::Timestamp(v) => *v,
        Value::TimestampTz(v) => v.naive_utc(),
        Value::Date(v) => v.and_time(chrono::NaiveTime::MIN),
        other => return Err(mismatch(logical_type, other)),
    };
    Ok(fixed(ticks_from_timestamp(timestamp, unit)?))
}

fn encode_enum(logical_type: &LogicalType, value: &Value) -> DuckBridgeResult<Encoded<'static>> {
    let LogicalType::Enum(dictionary) = logical_type else {
        return Err(mismatch(logical_type, value));
    };
    let index = match value {
        Value::Enum(name) | Value::Varchar(name) => dictionary.index_of(name).ok_or_else(|| {
            DuckBridgeError::InvalidValue(format!("'{}' is not a member of {}", name, logical_type))
        })?,
        other => match other.as_i128().and_then(|v| usize::try_from(v).ok()) {
            Some(index) if index < dictionary.len() => index,
            Some(_) => return Err(overflow(logical_type, value)),
            None => return Err(mismatch(logical_type, value)),
        },
    };
    let encoded = match logical_type.physical_type() {
        PhysicalType::UInt8 => u8::try_from(index).ok().map(fixed),
        PhysicalType::UInt16 => u16::try_from(index).ok().map(fixed),
        _ => u32::try_from(index).ok().map(fixed),
    };
    encoded.ok_or_else(|| overflow(logical_type, value))
}

fn encode_struct<'v>(
    fields: &[(String, LogicalType)],
    logical_type: &LogicalType,
    value: &'v Value,
) -> DuckBridgeResult<Encoded<'v>> {
    let Value::Struct(given) = value else {
        return Err(mismatch(logical_type, value));
    };
    if let Some((unknown, _)) = given
        .iter()
        .find(|(name, _)| !fields.iter().any(|(field, _)| field.eq_ignore_ascii_case(name)))
    {
        return Err(crate::type_mismatch_err!(
            "{} has no field '{}'",
            logical_type,
            unknown
        ));
    }
    fields
        .iter()
        .map(|(name, field_type)| {
            match given.iter().find(|(given_name, _)| given_name.eq_ignore_ascii_case(name)) {
                Some((_, field_value)) => encode(field_type, field_value)
                    .map_err(|e| e.within(&format!("field '{}'", name))),
                None => Ok(Encoded::Null),
            }
        })
        .collect::<DuckBridgeResult<Vec<_>>>()
        .map(Encoded::Struct)
}

/// Validate `value` against `logical_type` and encode it
fn encode<'v>(logical_type: &LogicalType, value: &'v Value) -> DuckBridgeResult<Encoded<'v>> {
    if value.is_null() {
        return Ok(Encoded::Null);
    }
    match logical_type {
        LogicalType::Boolean => match value {
            Value::Boolean(v) => Ok(fixed(u8::from(*v))),
            other => Err(mismatch(logical_type, other)),
        },
        LogicalType::TinyInt => encode_integer::<i8>(logical_type, value),
        LogicalType::SmallInt => encode_integer::<i16>(logical_type, value),
        LogicalType::Integer => encode_integer::<i32>(logical_type, value),
        LogicalType::BigInt => encode_integer::<i64>(logical_type, value),
        LogicalType::UTinyInt => encode_integer::<u8>(logical_type, value),
        LogicalType::USmallInt => encode_integer::<u16>(logical_type, value),
        LogicalType::UInteger => encode_integer::<u32>(logical_type, value),
        LogicalType::UBigInt => encode_integer::<u64>(logical_type, value),
        LogicalType::HugeInt => {
            let (low, high) = split_i128(convert_integer(logical_type, value)?);
            Ok(words(low, high as u64))
        }
        LogicalType::UHugeInt => {
            let (low, high) = split_u128(convert_integer(logical_type, value)?);
            Ok(words(low, high))
        }
        LogicalType::Float => {
            let v = encode_float(logical_type, value)?;
            if v.is_finite() && v.abs() > f64::from(f32::MAX) {
                return Err(overflow(logical_type, value));
            }
            Ok(fixed(v as f32))
        }
        LogicalType::Double => Ok(fixed(encode_float(logical_type, value)?)),
        LogicalType::Decimal { width, scale } => encode_decimal(logical_type, value, *width, *scale),
        LogicalType::Date
        | LogicalType::Time
        | LogicalType::TimeTz
        | LogicalType::Timestamp
        | LogicalType::TimestampS
        | LogicalType::TimestampMs
        | LogicalType::TimestampNs
        | LogicalType::TimestampTz => match (TemporalKind::of(logical_type), value) {
            (Some(TemporalKind::Date), Value::Date(v)) => Ok(fixed(days_from_date(*v))),
            (Some(TemporalKind::Time), Value::Time(v)) => Ok(fixed(micros_from_time(*v))),
            (Some(TemporalKind::TimeTz), Value::TimeTz(v)) => Ok(fixed(pack_time_tz(v))),
            (Some(TemporalKind::Timestamp(unit)), v) => encode_timestamp(logical_type, v, unit),
            (Some(TemporalKind::TimestampTz), v) => {
                encode_timestamp(logical_type, v, TimestampUnit::Micros)
            }
            (_, other) => Err(mismatch(logical_type, other)),
        },
        LogicalType::Interval => match value {
            Value::Interval(v) => {
                let mut bytes = [0u8; MAX_FIXED_WIDTH];
                v.months.encode(&mut bytes[0..4]);
                v.days.encode(&mut bytes[4..8]);
                v.micros.encode(&mut bytes[8..16]);
                Ok(Encoded::Fixed {
                    bytes,
                    width: MAX_FIXED_WIDTH,
                })
            }
            other => Err(mismatch(logical_type, other)),
        },
        LogicalType::Varchar => match value {
            Value::Varchar(v) | Value::Enum(v) => Ok(Encoded::Payload(Cow::Borrowed(v.as_bytes()))),
            other => Err(mismatch(logical_type, other)),
        },
        LogicalType::Blob => match value {
            Value::Blob(v) => Ok(Encoded::Payload(Cow::Borrowed(v.as_slice()))),
            other => Err(mismatch(logical_type, other)),
        },
        LogicalType::VarInt => {
            let v = value
                .as_bigint()
                .ok_or_else(|| mismatch(logical_type, value))?;
            Ok(Encoded::Payload(Cow::Owned(encode_varint(&v)?)))
        }
        LogicalType::Uuid => match value {
            Value::Uuid(v) => {
                let (low, high) = words_from_uuid(v);
                Ok(words(low, high as u64))
            }
            other => Err(mismatch(logical_type, other)),
        },
        LogicalType::Enum(_) => encode_enum(logical_type, value),
        LogicalType::List(child) => match value {
            Value::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    encode(child, item).map_err(|e| e.within(&format!("list element {}", i)))
                })
                .collect::<DuckBridgeResult<Vec<_>>>()
                .map(Encoded::List),
            other => Err(mismatch(logical_type, other)),
        },
        LogicalType::Array { child, size } => match value {
            Value::List(items) if items.len() == *size => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    encode(child, item).map_err(|e| e.within(&format!("array element {}", i)))
                })
                .collect::<DuckBridgeResult<Vec<_>>>()
                .map(Encoded::Array),
            Value::List(items) => Err(DuckBridgeError::InvalidValue(format!(
                "{} needs exactly {} elements, got {}",
                logical_type,
                size,
                items.len()
            ))),
            other => Err(mismatch(logical_type, other)),
        },
        LogicalType::Struct(fields) => encode_struct(fields, logical_type, value),
        LogicalType::Map { key, value: value_type } => match value {
            Value::Map(entries) => entries
                .iter()
                .enumerate()
                .map(|(i, (k, v))| {
                    if k.is_null() {
                        return Err(DuckBridgeError::null_violation(format!("map key {}", i)));
                    }
                    let k = encode(key, k).map_err(|e| e.within(&format!("map key {}", i)))?;
                    let v = encode(value_type, v)
                        .map_err(|e| e.within(&format!("map value {}", i)))?;
                    Ok(Encoded::Struct(vec![k, v]))
                })
                .collect::<DuckBridgeResult<Vec<_>>>()
                .map(Encoded::List),
            other => Err(mismatch(logical_type, other)),
        },
    }
}

fn check_offset(vector: &dyn WritableVector, offset: usize) -> DuckBridgeResult<()> {
    if offset >= vector.capacity() {
        return Err(DuckBridgeError::OutOfBounds(format!(
            "Row {} outside a {} vector of capacity {}",
            offset,
            vector.logical_type(),
            vector.capacity()
        )));
    }
    Ok(())
}

fn null_at(vector: &mut dyn WritableVector, offset: usize) -> DuckBridgeResult<()> {
    vector.ensure_validity_writable();
    if let Some(validity) = vector.validity_mut() {
        set_invalid(validity, offset);
    }
    let fields = match vector.logical_type() {
        LogicalType::Struct(fields) => fields.len(),
        _ => 0,
    };
    for index in 0..fields {
        null_at(vector.child_mut(index)?, offset)?;
    }
    Ok(())
}

fn mark_valid(vector: &mut dyn WritableVector, offset: usize) {
    // rows are all valid until a validity buffer exists
    if let Some(validity) = vector.validity_mut() {
        set_valid(validity, offset);
    }
}

fn place(vector: &mut dyn WritableVector, offset: usize, encoded: Encoded<'_>) -> DuckBridgeResult<()> {
    match encoded {
        Encoded::Null => return null_at(vector, offset),
        Encoded::Fixed { bytes, width } => {
            let start = offset * width;
            let data = vector.data_mut();
            let available = data.len();
            let slot = data.get_mut(start..start + width).ok_or_else(|| {
                DuckBridgeError::OutOfBounds(format!(
                    "Row {} past a data buffer of {} bytes",
                    offset, available
                ))
            })?;
            slot.copy_from_slice(&bytes[..width]);
        }
        Encoded::Payload(payload) => vector.assign_string_element(offset, &payload)?,
        Encoded::List(items) => {
            let start = vector.list_size();
            let len = items.len();
            vector.reserve_list_child(start + len)?;
            {
                let child = vector.child_mut(0)?;
                for (i, item) in items.into_iter().enumerate() {
                    place(child, start + i, item)?;
                }
            }
            vector.set_list_size(start + len)?;
            let mut entry = [0u8; MAX_FIXED_WIDTH];
            (start as u64).encode(&mut entry[0..8]);
            (len as u64).encode(&mut entry[8..16]);
            place(
                vector,
                offset,
                Encoded::Fixed {
                    bytes: entry,
                    width: MAX_FIXED_WIDTH,
                },
            )?;
        }
        Encoded::Array(items) => {
            let size = items.len();
            let child = vector.child_mut(0)?;
            for (i, item) in items.into_iter().enumerate() {
                place(child, offset * size + i, item)?;
            }
        }
        Encoded::Struct(fields) => {
            for (index, field) in fields.into_iter().enumerate() {
                place(vector.child_mut(index)?, offset, field)?;
            }
        }
    }
    mark_valid(vector, offset);
    Ok(())
}

/// Writer over one vector of a chunk being filled
pub struct VectorWriter<'w> {
    vector: &'w mut dyn WritableVector,
}

impl<'w> VectorWriter<'w> {
    pub fn new(vector: &'w mut dyn WritableVector) -> Self {
        tracing::trace!("creating writer for {} vector", vector.logical_type());
        Self { vector }
    }

    pub fn logical_type(&self) -> &LogicalType {
        self.vector.logical_type()
    }

    /// Mark a row null, allocating the validity buffer on first use
    pub fn append_null(&mut self, offset: usize) -> DuckBridgeResult<()> {
        check_offset(self.vector, offset)?;
        null_at(self.vector, offset)
    }

    /// Write a value at `offset`. The value is checked against the declared
    /// type first; on error the vector is unchanged.
    pub fn append_value(&mut self, offset: usize, value: &Value) -> DuckBridgeResult<()> {
        check_offset(self.vector, offset)?;
        let encoded = encode(self.vector.logical_type(), value)?;
        place(self.vector, offset, encoded)
    }
}

impl std::fmt::Debug for VectorWriter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorWriter")
            .field("logical_type", self.vector.logical_type())
            .field("capacity", &self.vector.capacity())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::local::LocalVector;
    use crate::reader::{ReaderFactory, TypeCache};
    use std::str::FromStr;
    use std::sync::Arc;

    fn read_back(vector: &LocalVector, rows: usize, offset: usize) -> Value {
        let factory = ReaderFactory::new(Arc::new(TypeCache::new()));
        let reader = factory.create_reader(vector.as_foreign(rows)).unwrap();
        reader.get_value(offset).unwrap()
    }

    #[test]
    fn test_integer_range_checked() {
        let mut vector = LocalVector::new(LogicalType::TinyInt, 4);
        let mut writer = VectorWriter::new(&mut vector);
        writer.append_value(0, &Value::Integer(127)).unwrap();
        let err = writer.append_value(1, &Value::Integer(128)).unwrap_err();
        assert!(matches!(err, DuckBridgeError::Overflow(_)));
        let err = writer.append_value(1, &Value::from("7")).unwrap_err();
        assert!(matches!(err, DuckBridgeError::TypeMismatch(_)));
        assert_eq!(read_back(&vector, 1, 0), Value::TinyInt(127));
    }

    #[test]
    fn test_floating_columns_refuse_inexact_numbers() {
        let mut vector = LocalVector::new(LogicalType::Double, 4);
        let mut writer = VectorWriter::new(&mut vector);
        writer.append_value(0, &Value::BigInt(1 << 53)).unwrap();
        writer
            .append_value(1, &Value::Decimal(Decimal::from_str("2.5").unwrap()))
            .unwrap();
        let err = writer.append_value(2, &Value::BigInt(i64::MAX - 1)).unwrap_err();
        assert!(matches!(err, DuckBridgeError::TypeMismatch(_)));
        let err = writer
            .append_value(2, &Value::Decimal(Decimal::from_str("0.12345678901234567890123").unwrap()))
            .unwrap_err();
        assert!(matches!(err, DuckBridgeError::TypeMismatch(_)));
        assert_eq!(read_back(&vector, 3, 0), Value::Double(9007199254740992.0));
        assert_eq!(read_back(&vector, 3, 1), Value::Double(2.5));
        assert_eq!(read_back(&vector, 3, 2), Value::Double(0.0));

        let mut vector = LocalVector::new(LogicalType::Float, 2);
        let mut writer = VectorWriter::new(&mut vector);
        writer.append_value(0, &Value::Integer(1 << 24)).unwrap();
        let err = writer.append_value(1, &Value::Integer((1 << 24) + 1)).unwrap_err();
        assert!(matches!(err, DuckBridgeError::TypeMismatch(_)));
        assert_eq!(read_back(&vector, 1, 0), Value::Float(16777216.0));
    }

    #[test]
    fn test_null_allocates_validity_lazily() {
        let mut vector = LocalVector::new(LogicalType::Integer, 64);
        VectorWriter::new(&mut vector)
            .append_value(0, &Value::Integer(1))
            .unwrap();
        assert!(!vector.has_validity());
        VectorWriter::new(&mut vector).append_null(1).unwrap();
        assert!(vector.has_validity());
        let foreign = vector.as_foreign(2);
        assert!(foreign.is_valid(0));
        assert!(!foreign.is_valid(1));
    }

    #[test]
    fn test_decimal_rescaled() {
        let logical_type = LogicalType::decimal(9, 4).unwrap();
        let mut vector = LocalVector::new(logical_type, 2);
        let mut writer = VectorWriter::new(&mut vector);
        writer
            .append_value(0, &Value::Decimal(Decimal::from_str("1.23455").unwrap()))
            .unwrap();
        assert_eq!(
            read_back(&vector, 1, 0),
            Value::Decimal(Decimal::from_str("1.2346").unwrap())
        );
    }

    #[test]
    fn test_rejected_struct_leaves_vector_untouched() {
        let logical_type = LogicalType::struct_of(vec![
            ("name", LogicalType::Varchar),
            ("age", LogicalType::TinyInt),
        ]);
        let mut vector = LocalVector::new(logical_type, 2);
        let bad = Value::struct_(vec![
            ("name", Value::from("a name longer than twelve")),
            ("age", Value::Integer(1_000)),
        ]);
        assert!(VectorWriter::new(&mut vector).append_value(0, &bad).is_err());
        assert_eq!(vector.children()[0].heap_bytes(), 0);
    }

    #[test]
    fn test_map_rejects_null_key() {
        let logical_type = LogicalType::map(LogicalType::Varchar, LogicalType::Integer);
        let mut vector = LocalVector::new(logical_type, 2);
        let value = Value::map(vec![(Value::Null, Value::Integer(1))]);
        let err = VectorWriter::new(&mut vector)
            .append_value(0, &value)
            .unwrap_err();
        assert_eq!(err.to_string(), "Null value is not allowed for map key 0");
    }

    #[test]
    fn test_array_length_checked() {
        let logical_type = LogicalType::array(LogicalType::Integer, 2);
        let mut vector = LocalVector::new(logical_type, 2);
        let mut writer = VectorWriter::new(&mut vector);
        let short = Value::list(vec![Value::Integer(1)]);
        assert!(matches!(
            writer.append_value(0, &short),
            Err(DuckBridgeError::InvalidValue(_))
        ));
        let pair = Value::list(vec![Value::Integer(1), Value::Null]);
        writer.append_value(1, &pair).unwrap();
        assert_eq!(read_back(&vector, 2, 1), pair);
    }
}
