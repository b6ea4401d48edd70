use super::Decoder;
use crate::common::error::DuckBridgeResult;
use crate::types::{IntervalValue, Value};
use crate::vector::{FixedWidth, ForeignVector};
use chrono::TimeDelta;

/// (i32 months, i32 days, i64 micros) per row
#[derive(Debug)]
pub struct IntervalReader<'a> {
    vector: ForeignVector<'a>,
}

impl<'a> IntervalReader<'a> {
    pub fn new(vector: ForeignVector<'a>) -> Self {
        Self { vector }
    }

    pub fn read_interval(&self, offset: usize) -> DuckBridgeResult<IntervalValue> {
        let element = self.vector.data().element(offset)?;
        Ok(IntervalValue::new(
            i32::decode(&element[0..4]),
            i32::decode(&element[4..8]),
            i64::decode(&element[8..16]),
        ))
    }

    /// Fixed duration of a month-free interval
    pub fn read_duration(&self, offset: usize) -> DuckBridgeResult<TimeDelta> {
        self.read_interval(offset)?.to_duration()
    }
}

impl<'a> Decoder<'a> for IntervalReader<'a> {
    fn vector(&self) -> &ForeignVector<'a> {
        &self.vector
    }

    fn read_value(&self, offset: usize) -> DuckBridgeResult<Value> {
        Ok(Value::Interval(self.read_interval(offset)?))
    }
}
