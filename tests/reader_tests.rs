//! Scalar values through the appender and back out of the result cursor

mod common;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use common::{column_names, load, load_column, read_column, test_config};
use duckbridge::native::local::{CollectingSink, LocalVector, MemoryResult};
use duckbridge::native::WritableVector;
use duckbridge::reader::{ReaderFactory, TypeCache};
use duckbridge::{
    Appender, DuckBridgeError, DuckBridgeResult, EnumValue, HostEnum, IntervalValue, LogicalType,
    QueryResult, TimeTzValue, Value, VectorWriter,
};
use num_bigint::BigInt;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

fn values_of(logical_type: LogicalType, values: &[Value]) -> DuckBridgeResult<Vec<Value>> {
    let mut result = load_column(logical_type, values)?;
    Ok(result.collect_rows()?.into_iter().flatten().collect())
}

#[test]
fn test_integer_boundaries_round_trip() -> DuckBridgeResult<()> {
    let cases = vec![
        (LogicalType::TinyInt, vec![Value::TinyInt(i8::MIN), Value::TinyInt(i8::MAX)]),
        (LogicalType::SmallInt, vec![Value::SmallInt(i16::MIN), Value::SmallInt(i16::MAX)]),
        (LogicalType::Integer, vec![Value::Integer(i32::MIN), Value::Integer(i32::MAX)]),
        (LogicalType::BigInt, vec![Value::BigInt(i64::MIN), Value::BigInt(i64::MAX)]),
        (LogicalType::UTinyInt, vec![Value::UTinyInt(0), Value::UTinyInt(u8::MAX)]),
        (LogicalType::USmallInt, vec![Value::USmallInt(0), Value::USmallInt(u16::MAX)]),
        (LogicalType::UInteger, vec![Value::UInteger(0), Value::UInteger(u32::MAX)]),
        (LogicalType::UBigInt, vec![Value::UBigInt(0), Value::UBigInt(u64::MAX)]),
        (LogicalType::HugeInt, vec![Value::HugeInt(i128::MIN + 1), Value::HugeInt(i128::MAX)]),
        (LogicalType::UHugeInt, vec![Value::UHugeInt(0), Value::UHugeInt(u128::MAX)]),
    ];
    for (logical_type, values) in cases {
        assert_eq!(values_of(logical_type, &values)?, values);
    }
    Ok(())
}

#[test]
fn test_float_specials_round_trip() -> DuckBridgeResult<()> {
    let values = [
        Value::Double(f64::NAN),
        Value::Double(f64::INFINITY),
        Value::Double(f64::NEG_INFINITY),
        Value::Double(-0.5),
    ];
    let mut result = load_column(LogicalType::Double, &values)?;
    let read: Vec<f64> = read_column(&mut result)?;
    assert!(read[0].is_nan());
    assert_eq!(read[1], f64::INFINITY);
    assert_eq!(read[2], f64::NEG_INFINITY);
    assert_eq!(read[3], -0.5);

    let mut result = load_column(LogicalType::Float, &[Value::Float(f32::MAX), Value::Float(f32::NAN)])?;
    let read: Vec<f32> = read_column(&mut result)?;
    assert_eq!(read[0], f32::MAX);
    assert!(read[1].is_nan());
    Ok(())
}

#[test]
fn test_narrowing_overflows_instead_of_wrapping() -> DuckBridgeResult<()> {
    let mut result = load_column(LogicalType::BigInt, &[Value::BigInt(i64::from(i32::MAX) + 1)])?;
    let mut chunk = result.next_chunk()?.unwrap();
    assert!(chunk.next_row());
    assert_eq!(chunk.get::<i64>(0)?, 2_147_483_648);
    assert!(matches!(chunk.get::<i32>(0), Err(DuckBridgeError::Overflow(_))));
    assert!(matches!(chunk.get::<u8>(0), Err(DuckBridgeError::Overflow(_))));
    assert!(matches!(chunk.get::<String>(0), Err(DuckBridgeError::TypeMismatch(_))));
    Ok(())
}

#[test]
fn test_decimal_exact_across_backing_widths() -> DuckBridgeResult<()> {
    let cases = [(4u8, "0.1234"), (9, "1.2345"), (18, "1.2345"), (38, "1.2345")];
    for (width, text) in cases {
        let logical_type = LogicalType::decimal(width, 4)?;
        let expected = Decimal::from_str(text).unwrap();
        let mut result = load_column(logical_type, &[Value::Decimal(expected)])?;
        let read: Vec<Decimal> = read_column(&mut result)?;
        assert_eq!(read, vec![expected], "width {}", width);
        assert_eq!(read[0].to_string(), text);
    }
    Ok(())
}

#[test]
fn test_decimal_precision_checked_on_append() {
    let logical_type = LogicalType::decimal(4, 2).unwrap();
    let err = load_column(logical_type, &[Value::Decimal(Decimal::from(100))]).unwrap_err();
    assert!(matches!(err, DuckBridgeError::Overflow(_)));
}

#[test]
fn test_integer_columns_as_decimal() -> DuckBridgeResult<()> {
    let mut result = load_column(LogicalType::UBigInt, &[Value::UBigInt(u64::MAX)])?;
    let read: Vec<Decimal> = read_column(&mut result)?;
    assert_eq!(read, vec![Decimal::from(u64::MAX)]);

    let huge = [Value::HugeInt(-(1i128 << 90)), Value::HugeInt(i128::MAX)];
    let mut result = load_column(LogicalType::HugeInt, &huge)?;
    let mut chunk = result.next_chunk()?.unwrap();
    assert!(chunk.next_row());
    assert_eq!(chunk.get::<Decimal>(0)?.to_string(), (-(1i128 << 90)).to_string());
    assert!(chunk.next_row());
    assert!(matches!(chunk.get::<Decimal>(0), Err(DuckBridgeError::Overflow(_))));
    Ok(())
}

#[test]
fn test_wide_decimal_as_string() -> DuckBridgeResult<()> {
    let logical_type = LogicalType::decimal(38, 10)?;
    let mut result = load_column(logical_type, &[Value::HugeInt(-12_345)])?;
    let read: Vec<String> = read_column(&mut result)?;
    assert_eq!(read, vec!["-12345.0000000000".to_string()]);
    Ok(())
}

#[test]
fn test_huge_and_varint_boundaries() -> DuckBridgeResult<()> {
    let max = i128::MAX;
    let big_values = [
        Value::VarInt(BigInt::from(max)),
        Value::VarInt(-BigInt::from(max)),
        Value::VarInt(BigInt::from(0)),
        Value::VarInt(BigInt::from(u128::MAX) * BigInt::from(u128::MAX)),
    ];
    assert_eq!(values_of(LogicalType::VarInt, &big_values)?, big_values);

    let mut result = load_column(LogicalType::HugeInt, &[Value::HugeInt(-max)])?;
    let mut chunk = result.next_chunk()?.unwrap();
    assert!(chunk.next_row());
    assert_eq!(chunk.get::<i128>(0)?, -max);
    assert_eq!(chunk.get::<BigInt>(0)?, BigInt::from(-max));
    assert!(matches!(chunk.get::<i32>(0), Err(DuckBridgeError::Overflow(_))));
    Ok(())
}

#[test]
fn test_varint_overflow_into_fixed_width() -> DuckBridgeResult<()> {
    let huge = BigInt::from(u64::MAX) * BigInt::from(4);
    let mut result = load_column(LogicalType::VarInt, &[Value::VarInt(huge.clone())])?;
    let mut chunk = result.next_chunk()?.unwrap();
    assert!(chunk.next_row());
    assert!(matches!(chunk.get::<i64>(0), Err(DuckBridgeError::Overflow(_))));
    assert_eq!(chunk.get::<i128>(0)?, 4 * i128::from(u64::MAX));
    assert_eq!(chunk.get::<String>(0)?, huge.to_string());
    Ok(())
}

#[test]
fn test_string_inline_boundary() -> DuckBridgeResult<()> {
    let values = [
        Value::from(""),
        Value::from("twelve bytes"),
        Value::from("thirteen byte"),
        Value::from("ünïcödé spanning the pointer layout"),
    ];
    assert_eq!("twelve bytes".len(), 12);
    assert_eq!("thirteen byte".len(), 13);
    assert_eq!(values_of(LogicalType::Varchar, &values)?, values);
    Ok(())
}

#[test]
fn test_blob_is_not_a_string() -> DuckBridgeResult<()> {
    let payload = vec![0u8, 159, 146, 150, 255, 1, 2, 3, 4, 5, 6, 7, 8, 9];
    let mut result = load_column(LogicalType::Blob, &[Value::Blob(payload.clone())])?;
    let mut chunk = result.next_chunk()?.unwrap();
    assert!(chunk.next_row());
    assert_eq!(chunk.get::<bytes::Bytes>(0)?.as_ref(), payload.as_slice());
    assert!(matches!(chunk.get::<String>(0), Err(DuckBridgeError::TypeMismatch(_))));
    Ok(())
}

#[test]
fn test_invalid_utf8_strict_and_lossy() -> DuckBridgeResult<()> {
    let mut vector = LocalVector::new(LogicalType::Varchar, 4);
    vector.assign_string_element(0, &[b'o', b'k', 0xFF])?;

    let strict = ReaderFactory::new(Arc::new(TypeCache::new()));
    let reader = strict.create_reader(vector.as_foreign(1))?;
    assert!(matches!(reader.get::<String>(0), Err(DuckBridgeError::InvalidValue(_))));

    let lossy = strict.clone().with_strict_utf8(false);
    let reader = lossy.create_reader(vector.as_foreign(1))?;
    assert_eq!(reader.get::<String>(0)?, "ok\u{FFFD}");
    Ok(())
}

#[test]
fn test_uuid_sign_bit() -> DuckBridgeResult<()> {
    let values = [
        Value::Uuid(Uuid::nil()),
        Value::Uuid(Uuid::from_u128(u128::MAX)),
        Value::Uuid(Uuid::from_u128(1u128 << 127)),
        Value::Uuid(Uuid::from_str("a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11").unwrap()),
    ];
    assert_eq!(values_of(LogicalType::Uuid, &values)?, values);

    let mut result = load_column(LogicalType::Uuid, &values[3..])?;
    let read: Vec<String> = read_column(&mut result)?;
    assert_eq!(read, vec!["a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11".to_string()]);
    Ok(())
}

#[test]
fn test_timestamp_units_agree() -> DuckBridgeResult<()> {
    let instant = NaiveDate::from_ymd_opt(2023, 11, 5)
        .and_then(|d| d.and_hms_opt(22, 13, 7))
        .unwrap();
    let types = [
        LogicalType::TimestampS,
        LogicalType::TimestampMs,
        LogicalType::Timestamp,
        LogicalType::TimestampNs,
    ];
    let row = vec![Value::Timestamp(instant); types.len()];
    let mut result = load(&types, &[row])?;
    let mut chunk = result.next_chunk()?.unwrap();
    assert!(chunk.next_row());
    for column in 0..types.len() {
        assert_eq!(chunk.get::<NaiveDateTime>(column)?, instant);
        assert_eq!(chunk.get::<DateTime<Utc>>(column)?, instant.and_utc());
        assert_eq!(chunk.get::<NaiveDate>(column)?, instant.date());
    }
    Ok(())
}

#[test]
fn test_timestamp_truncates_below_unit() -> DuckBridgeResult<()> {
    let precise = NaiveDate::from_ymd_opt(2020, 2, 29)
        .and_then(|d| d.and_hms_nano_opt(1, 2, 3, 456_789_123))
        .unwrap();
    let mut result = load(
        &[LogicalType::TimestampMs, LogicalType::TimestampNs],
        &[vec![Value::Timestamp(precise), Value::Timestamp(precise)]],
    )?;
    let rows = result.collect_rows()?;
    let millis = NaiveDate::from_ymd_opt(2020, 2, 29)
        .and_then(|d| d.and_hms_milli_opt(1, 2, 3, 456))
        .unwrap();
    assert_eq!(rows, vec![vec![Value::Timestamp(millis), Value::Timestamp(precise)]]);
    Ok(())
}

#[test]
fn test_dates_times_and_zones() -> DuckBridgeResult<()> {
    let date = NaiveDate::from_ymd_opt(1969, 7, 20).unwrap();
    let time = NaiveTime::from_hms_micro_opt(20, 17, 40, 999_999).unwrap();
    let zoned = TimeTzValue::new(time, FixedOffset::west_opt(5 * 3600).unwrap());
    let row = vec![Value::Date(date), Value::Time(time), Value::TimeTz(zoned)];
    let mut result = load(
        &[LogicalType::Date, LogicalType::Time, LogicalType::TimeTz],
        &[row.clone()],
    )?;
    assert_eq!(result.collect_rows()?, vec![row]);
    Ok(())
}

#[test]
fn test_interval_duration_requires_zero_months() -> DuckBridgeResult<()> {
    let values = [
        Value::Interval(IntervalValue::new(0, 2, 3_000_000)),
        Value::Interval(IntervalValue::new(1, 0, 0)),
    ];
    let mut result = load_column(LogicalType::Interval, &values)?;
    let mut chunk = result.next_chunk()?.unwrap();
    assert!(chunk.next_row());
    assert_eq!(
        chunk.get::<TimeDelta>(0)?,
        TimeDelta::days(2) + TimeDelta::seconds(3)
    );
    assert!(chunk.next_row());
    assert!(chunk.get::<TimeDelta>(0).is_err());
    assert_eq!(chunk.get::<IntervalValue>(0)?, IntervalValue::new(1, 0, 0));
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Suit {
    Hearts,
    Spades,
    Clubs,
}

impl HostEnum for Suit {
    const VARIANTS: &'static [(&'static str, Self)] = &[
        ("hearts", Suit::Hearts),
        ("spades", Suit::Spades),
        ("clubs", Suit::Clubs),
    ];
}

#[test]
fn test_enum_names_and_host_variants() -> DuckBridgeResult<()> {
    let logical_type = LogicalType::enumeration(["CLUBS", "Hearts", "2", "jokers"]);
    let values = [
        Value::Enum("CLUBS".to_string()),
        Value::Enum("Hearts".to_string()),
        Value::Enum("2".to_string()),
        Value::Enum("jokers".to_string()),
    ];
    let mut result = load_column(logical_type, &values)?;
    let mut chunk = result.next_chunk()?.unwrap();
    let mut suits = Vec::new();
    while chunk.next_row() {
        suits.push(chunk.get::<Option<EnumValue<Suit>>>(0).map(|s| s.map(EnumValue::into_inner)));
    }
    assert_eq!(suits[0].as_ref().ok(), Some(&Some(Suit::Clubs)));
    assert_eq!(suits[1].as_ref().ok(), Some(&Some(Suit::Hearts)));
    assert_eq!(suits[2].as_ref().ok(), Some(&Some(Suit::Clubs)));
    assert!(matches!(suits[3], Err(DuckBridgeError::InvalidValue(_))));

    assert_eq!(chunk.get_at::<String>(1, 0)?, "Hearts");
    assert_eq!(chunk.get_at::<u8>(3, 0)?, 3);
    Ok(())
}

#[test]
fn test_enum_mapping_shared_across_results() -> DuckBridgeResult<()> {
    let cache = Arc::new(TypeCache::new());
    for _ in 0..3 {
        // each result describes its column with a freshly built dictionary
        let types = vec![LogicalType::enumeration(["spades", "hearts"])];
        let mut sink = CollectingSink::new();
        {
            let mut appender = Appender::new(types.clone(), &mut sink, &test_config())?;
            appender.append_row(&[Value::Enum("hearts".to_string())])?;
            appender.close()?;
        }
        let source = MemoryResult::new(column_names(1), types, sink.into_chunks())?;
        let mut result = QueryResult::new(source, Arc::clone(&cache));
        let suits: Vec<EnumValue<Suit>> = read_column(&mut result)?;
        assert_eq!(suits, vec![EnumValue(Suit::Hearts)]);
    }
    assert_eq!(cache.len(), 1);
    Ok(())
}

#[test]
fn test_enum_rejects_unknown_member() {
    let logical_type = LogicalType::enumeration(["a", "b"]);
    let err = load_column(logical_type, &[Value::Enum("c".to_string())]).unwrap_err();
    assert!(matches!(err, DuckBridgeError::InvalidValue(_)));
}

#[test]
fn test_validity_matches_bits() -> DuckBridgeResult<()> {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let rows = 300;
    let mut vector = LocalVector::new(LogicalType::Integer, rows);
    let mut expected = Vec::with_capacity(rows);
    for offset in 0..rows {
        let valid = rng.random_bool(0.7);
        let mut writer = VectorWriter::new(&mut vector);
        if valid {
            writer.append_value(offset, &Value::Integer(offset as i32))?;
        } else {
            writer.append_null(offset)?;
        }
        expected.push(valid);
    }
    let foreign = vector.as_foreign(rows);
    let words = foreign.validity().words().unwrap();
    for (offset, valid) in expected.iter().enumerate() {
        assert_eq!(foreign.is_valid(offset), *valid);
        assert_eq!(words[offset / 64] >> (offset % 64) & 1 == 1, *valid);
    }
    assert_eq!(
        foreign.validity().null_count(rows),
        expected.iter().filter(|v| !**v).count()
    );
    Ok(())
}

#[test]
fn test_null_rows_need_nullable_targets() -> DuckBridgeResult<()> {
    let mut result = load_column(LogicalType::Integer, &[Value::Null])?;
    let mut chunk = result.next_chunk()?.unwrap();
    assert!(chunk.next_row());
    assert!(chunk.is_null(0)?);
    assert_eq!(chunk.get::<Option<i32>>(0)?, None);
    assert_eq!(chunk.get_value(0)?, Value::Null);
    let err = chunk.get::<i32>(0).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Null value is not allowed for row 0 of column 'c0'"
    );
    Ok(())
}
