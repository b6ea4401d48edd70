//! Interval value stored as calendar months, whole days and microseconds.

use crate::common::constants::MICROS_PER_DAY;
use crate::common::error::{DuckBridgeError, DuckBridgeResult};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Interval value in the engine's (months, days, micros) layout.
///
/// Months cannot be turned into a fixed duration, so conversions to
/// `TimeDelta` only succeed for month-free intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct IntervalValue {
    pub months: i32,
    pub days: i32,
    pub micros: i64,
}

impl IntervalValue {
    pub const fn new(months: i32, days: i32, micros: i64) -> Self {
        Self {
            months,
            days,
            micros,
        }
    }

    pub const fn zero() -> Self {
        Self::new(0, 0, 0)
    }

    pub const fn is_zero(self) -> bool {
        self.months == 0 && self.days == 0 && self.micros == 0
    }

    /// Total microseconds of a month-free interval
    pub fn total_micros(self) -> DuckBridgeResult<i64> {
        if self.months != 0 {
            return Err(crate::type_mismatch_err!(
                "Interval with {} months has no fixed duration",
                self.months
            ));
        }
        i64::from(self.days)
            .checked_mul(MICROS_PER_DAY)
            .and_then(|day_micros| day_micros.checked_add(self.micros))
            .ok_or_else(|| {
                crate::overflow_err!(
                    "Interval of {} days and {} micros exceeds the duration range",
                    self.days,
                    self.micros
                )
            })
    }

    /// Convert to a fixed duration
    pub fn to_duration(self) -> DuckBridgeResult<TimeDelta> {
        Ok(TimeDelta::microseconds(self.total_micros()?))
    }

    /// Build a month-free interval from a duration, splitting whole days out
    pub fn from_duration(duration: TimeDelta) -> DuckBridgeResult<Self> {
        let total = duration.num_microseconds().ok_or_else(|| {
            crate::overflow_err!("Duration {} does not fit in microseconds", duration)
        })?;
        let days = i32::try_from(total / MICROS_PER_DAY).map_err(|_| {
            DuckBridgeError::Overflow(format!("Duration {} has too many days", duration))
        })?;
        Ok(Self::new(0, days, total % MICROS_PER_DAY))
    }
}

impl fmt::Display for IntervalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} months {} days {} micros",
            self.months, self.days, self.micros
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_free_interval_converts() {
        let interval = IntervalValue::new(0, 2, 1_500_000);
        let duration = interval.to_duration().unwrap();
        assert_eq!(duration, TimeDelta::days(2) + TimeDelta::milliseconds(1500));
        assert_eq!(IntervalValue::from_duration(duration).unwrap(), interval);
    }

    #[test]
    fn test_months_reject_duration() {
        let err = IntervalValue::new(1, 0, 0).to_duration().unwrap_err();
        assert!(matches!(err, DuckBridgeError::TypeMismatch(_)));
    }

    #[test]
    fn test_overflowing_interval() {
        let err = IntervalValue::new(0, i32::MAX, i64::MAX)
            .to_duration()
            .unwrap_err();
        assert!(matches!(err, DuckBridgeError::Overflow(_)));
    }

    #[test]
    fn test_negative_duration_split() {
        let interval = IntervalValue::from_duration(-TimeDelta::hours(30)).unwrap();
        assert_eq!(interval.days, -1);
        assert_eq!(interval.micros, -6 * 3_600_000_000);
    }
}
