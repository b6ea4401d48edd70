//! Conversions between the engine's integer temporal encodings and chrono types

use crate::common::constants::{
    DATE_INFINITY, DATE_NEGATIVE_INFINITY, MAX_TZ_OFFSET_SECONDS, MICROS_PER_DAY,
    MICROS_PER_SECOND, NANOS_PER_SECOND, TIMESTAMP_INFINITY, TIMESTAMP_NEGATIVE_INFINITY,
};
use crate::common::error::{DuckBridgeError, DuckBridgeResult};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Day number of 1970-01-01 counted from 0001-01-01 (day 1)
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

const OFFSET_MASK: u64 = 0xFF_FFFF;

/// Tick unit of a stored timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimestampUnit {
    Seconds,
    Millis,
    Micros,
    Nanos,
}

impl TimestampUnit {
    /// Ticks per second
    pub const fn per_second(self) -> i64 {
        match self {
            TimestampUnit::Seconds => 1,
            TimestampUnit::Millis => 1_000,
            TimestampUnit::Micros => MICROS_PER_SECOND,
            TimestampUnit::Nanos => NANOS_PER_SECOND,
        }
    }

    /// Nanoseconds per tick
    pub const fn nanos_per_tick(self) -> i64 {
        NANOS_PER_SECOND / self.per_second()
    }
}

impl fmt::Display for TimestampUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimestampUnit::Seconds => "s",
            TimestampUnit::Millis => "ms",
            TimestampUnit::Micros => "us",
            TimestampUnit::Nanos => "ns",
        };
        write!(f, "{}", name)
    }
}

/// Time of day with a fixed zone offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeTzValue {
    pub time: NaiveTime,
    pub offset: FixedOffset,
}

impl TimeTzValue {
    pub fn new(time: NaiveTime, offset: FixedOffset) -> Self {
        Self { time, offset }
    }
}

impl fmt::Display for TimeTzValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.time, self.offset)
    }
}

impl Serialize for TimeTzValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Decode days since the epoch
pub fn date_from_days(days: i32) -> DuckBridgeResult<NaiveDate> {
    if days == DATE_INFINITY || days == DATE_NEGATIVE_INFINITY {
        return Err(crate::overflow_err!("Infinite date cannot be represented"));
    }
    days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or_else(|| crate::overflow_err!("Date of {} days is out of range", days))
}

/// Encode a date as days since the epoch
pub fn days_from_date(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

/// Decode microseconds since midnight
pub fn time_from_micros(micros: i64) -> DuckBridgeResult<NaiveTime> {
    if !(0..MICROS_PER_DAY).contains(&micros) {
        return Err(crate::overflow_err!(
            "Time of {} microseconds is outside a day",
            micros
        ));
    }
    let seconds = (micros / MICROS_PER_SECOND) as u32;
    let nanos = ((micros % MICROS_PER_SECOND) * 1_000) as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, nanos)
        .ok_or_else(|| crate::overflow_err!("Time of {} microseconds is invalid", micros))
}

/// Encode a time as microseconds since midnight
pub fn micros_from_time(time: NaiveTime) -> i64 {
    let sub_second = i64::from(time.nanosecond() % NANOS_PER_SECOND as u32) / 1_000;
    i64::from(time.num_seconds_from_midnight()) * MICROS_PER_SECOND + sub_second
}

/// Pack a time with zone into the engine's 64-bit layout: 40 bits of
/// microseconds above 24 bits of offset, the offset stored biased so that
/// larger offsets sort first.
pub fn pack_time_tz(value: &TimeTzValue) -> u64 {
    let micros = micros_from_time(value.time) as u64;
    let offset = value.offset.local_minus_utc();
    let biased = (MAX_TZ_OFFSET_SECONDS - offset) as u64 & OFFSET_MASK;
    (micros << 24) | biased
}

/// Unpack the engine's 64-bit time with zone
pub fn unpack_time_tz(bits: u64) -> DuckBridgeResult<TimeTzValue> {
    let micros = (bits >> 24) as i64;
    let offset_seconds = MAX_TZ_OFFSET_SECONDS - (bits & OFFSET_MASK) as i32;
    let offset = FixedOffset::east_opt(offset_seconds).ok_or_else(|| {
        crate::overflow_err!("Time zone offset of {} seconds is invalid", offset_seconds)
    })?;
    Ok(TimeTzValue::new(time_from_micros(micros)?, offset))
}

/// Decode a timestamp stored in `unit` ticks since the epoch
pub fn timestamp_from_ticks(ticks: i64, unit: TimestampUnit) -> DuckBridgeResult<NaiveDateTime> {
    if ticks == TIMESTAMP_INFINITY || ticks == TIMESTAMP_NEGATIVE_INFINITY {
        return Err(crate::overflow_err!("Infinite timestamp cannot be represented"));
    }
    let per_second = unit.per_second();
    let seconds = ticks.div_euclid(per_second);
    let nanos = ticks.rem_euclid(per_second) * unit.nanos_per_tick();
    DateTime::from_timestamp(seconds, nanos as u32)
        .map(|instant| instant.naive_utc())
        .ok_or_else(|| {
            crate::overflow_err!("Timestamp of {} {} ticks is out of range", ticks, unit)
        })
}

/// Encode a timestamp as `unit` ticks since the epoch, dropping precision finer
/// than the unit
pub fn ticks_from_timestamp(
    timestamp: NaiveDateTime,
    unit: TimestampUnit,
) -> DuckBridgeResult<i64> {
    let instant = timestamp.and_utc();
    let sub_second = i64::from(instant.timestamp_subsec_nanos()) / unit.nanos_per_tick();
    instant
        .timestamp()
        .checked_mul(unit.per_second())
        .and_then(|ticks| ticks.checked_add(sub_second))
        .ok_or_else(|| {
            DuckBridgeError::Overflow(format!(
                "Timestamp {} does not fit in {} ticks",
                timestamp, unit
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_round_trip() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let days = days_from_date(date);
        assert_eq!(date_from_days(days).unwrap(), date);
        assert_eq!(days_from_date(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()), 0);
        assert_eq!(date_from_days(-1).unwrap(), NaiveDate::from_ymd_opt(1969, 12, 31).unwrap());
    }

    #[test]
    fn test_date_infinity_rejected() {
        assert!(date_from_days(DATE_INFINITY).is_err());
        assert!(date_from_days(DATE_NEGATIVE_INFINITY).is_err());
    }

    #[test]
    fn test_time_bounds() {
        let time = time_from_micros(MICROS_PER_DAY - 1).unwrap();
        assert_eq!(micros_from_time(time), MICROS_PER_DAY - 1);
        assert!(time_from_micros(MICROS_PER_DAY).is_err());
        assert!(time_from_micros(-1).is_err());
    }

    #[test]
    fn test_time_tz_packing() {
        let value = TimeTzValue::new(
            NaiveTime::from_hms_micro_opt(13, 45, 30, 123_456).unwrap(),
            FixedOffset::east_opt(-5 * 3600).unwrap(),
        );
        let bits = pack_time_tz(&value);
        assert_eq!(unpack_time_tz(bits).unwrap(), value);
        // zero offset is stored as the bias itself
        let utc = TimeTzValue::new(NaiveTime::MIN, FixedOffset::east_opt(0).unwrap());
        assert_eq!(pack_time_tz(&utc), MAX_TZ_OFFSET_SECONDS as u64);
    }

    #[test]
    fn test_timestamp_units_agree() {
        let expected = timestamp_from_ticks(1_700_000_000, TimestampUnit::Seconds).unwrap();
        assert_eq!(
            timestamp_from_ticks(1_700_000_000_000, TimestampUnit::Millis).unwrap(),
            expected
        );
        assert_eq!(
            timestamp_from_ticks(1_700_000_000_000_000, TimestampUnit::Micros).unwrap(),
            expected
        );
        assert_eq!(
            timestamp_from_ticks(1_700_000_000_000_000_000, TimestampUnit::Nanos).unwrap(),
            expected
        );
    }

    #[test]
    fn test_negative_sub_second_ticks() {
        let ts = timestamp_from_ticks(-1, TimestampUnit::Micros).unwrap();
        assert_eq!(ts.to_string(), "1969-12-31 23:59:59.999999");
        assert_eq!(ticks_from_timestamp(ts, TimestampUnit::Micros).unwrap(), -1);
    }

    #[test]
    fn test_nanosecond_overflow_on_encode() {
        let far = NaiveDate::from_ymd_opt(2500, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert!(ticks_from_timestamp(far, TimestampUnit::Micros).is_ok());
        assert!(matches!(
            ticks_from_timestamp(far, TimestampUnit::Nanos),
            Err(DuckBridgeError::Overflow(_))
        ));
    }
}
