use super::Decoder;
use crate::common::error::{DuckBridgeError, DuckBridgeResult};
use crate::types::temporal::{
    date_from_days, time_from_micros, timestamp_from_ticks, unpack_time_tz, TimeTzValue,
    TimestampUnit,
};
use crate::types::{LogicalType, Value};
use crate::vector::ForeignVector;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Which temporal encoding a vector holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalKind {
    Date,
    Time,
    TimeTz,
    Timestamp(TimestampUnit),
    TimestampTz,
}

impl TemporalKind {
    pub fn of(logical_type: &LogicalType) -> Option<TemporalKind> {
        Some(match logical_type {
            LogicalType::Date => TemporalKind::Date,
            LogicalType::Time => TemporalKind::Time,
            LogicalType::TimeTz => TemporalKind::TimeTz,
            LogicalType::Timestamp => TemporalKind::Timestamp(TimestampUnit::Micros),
            LogicalType::TimestampS => TemporalKind::Timestamp(TimestampUnit::Seconds),
            LogicalType::TimestampMs => TemporalKind::Timestamp(TimestampUnit::Millis),
            LogicalType::TimestampNs => TemporalKind::Timestamp(TimestampUnit::Nanos),
            LogicalType::TimestampTz => TemporalKind::TimestampTz,
            _ => return None,
        })
    }
}

/// Dates, times and timestamps in every stored unit
#[derive(Debug)]
pub struct TemporalReader<'a> {
    vector: ForeignVector<'a>,
    kind: TemporalKind,
}

impl<'a> TemporalReader<'a> {
    pub fn new(vector: ForeignVector<'a>) -> DuckBridgeResult<Self> {
        let kind = TemporalKind::of(vector.logical_type()).ok_or_else(|| {
            DuckBridgeError::Internal(format!("Temporal reader over {}", vector.logical_type()))
        })?;
        Ok(Self { vector, kind })
    }

    pub fn kind(&self) -> TemporalKind {
        self.kind
    }

    fn mismatch(&self, target: &str) -> DuckBridgeError {
        crate::type_mismatch_err!("Cannot read {} as {}", self.vector.logical_type(), target)
    }

    /// Date of a DATE row, or the date part of a timestamp
    pub fn read_date(&self, offset: usize) -> DuckBridgeResult<NaiveDate> {
        match self.kind {
            TemporalKind::Date => date_from_days(self.vector.data().read::<i32>(offset)?),
            TemporalKind::Timestamp(_) | TemporalKind::TimestampTz => {
                Ok(self.read_timestamp(offset)?.date())
            }
            _ => Err(self.mismatch("NaiveDate")),
        }
    }

    pub fn read_time(&self, offset: usize) -> DuckBridgeResult<NaiveTime> {
        match self.kind {
            TemporalKind::Time => time_from_micros(self.vector.data().read::<i64>(offset)?),
            TemporalKind::TimeTz => Ok(self.read_time_tz(offset)?.time),
            _ => Err(self.mismatch("NaiveTime")),
        }
    }

    pub fn read_time_tz(&self, offset: usize) -> DuckBridgeResult<TimeTzValue> {
        match self.kind {
            TemporalKind::TimeTz => unpack_time_tz(self.vector.data().read::<u64>(offset)?),
            _ => Err(self.mismatch("TimeTzValue")),
        }
    }

    /// Timestamp of any unit, or a date at midnight
    pub fn read_timestamp(&self, offset: usize) -> DuckBridgeResult<NaiveDateTime> {
        match self.kind {
            TemporalKind::Timestamp(unit) => {
                timestamp_from_ticks(self.vector.data().read::<i64>(offset)?, unit)
            }
            TemporalKind::TimestampTz => timestamp_from_ticks(
                self.vector.data().read::<i64>(offset)?,
                TimestampUnit::Micros,
            ),
            TemporalKind::Date => Ok(self.read_date(offset)?.and_time(NaiveTime::MIN)),
            _ => Err(self.mismatch("NaiveDateTime")),
        }
    }

    /// Instant of any timestamp, zone-less units taken as UTC
    pub fn read_timestamp_utc(&self, offset: usize) -> DuckBridgeResult<DateTime<Utc>> {
        match self.kind {
            TemporalKind::Timestamp(_) | TemporalKind::TimestampTz => {
                Ok(self.read_timestamp(offset)?.and_utc())
            }
            _ => Err(self.mismatch("DateTime<Utc>")),
        }
    }
}

impl<'a> Decoder<'a> for TemporalReader<'a> {
    fn vector(&self) -> &ForeignVector<'a> {
        &self.vector
    }

    fn read_value(&self, offset: usize) -> DuckBridgeResult<Value> {
        Ok(match self.kind {
            TemporalKind::Date => Value::Date(self.read_date(offset)?),
            TemporalKind::Time => Value::Time(self.read_time(offset)?),
            TemporalKind::TimeTz => Value::TimeTz(self.read_time_tz(offset)?),
            TemporalKind::Timestamp(_) => Value::Timestamp(self.read_timestamp(offset)?),
            TemporalKind::TimestampTz => Value::TimestampTz(self.read_timestamp_utc(offset)?),
        })
    }
}
