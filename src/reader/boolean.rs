use super::Decoder;
use crate::common::error::DuckBridgeResult;
use crate::types::Value;
use crate::vector::ForeignVector;

/// One byte per row, non-zero is true
#[derive(Debug)]
pub struct BooleanReader<'a> {
    vector: ForeignVector<'a>,
}

impl<'a> BooleanReader<'a> {
    pub fn new(vector: ForeignVector<'a>) -> Self {
        Self { vector }
    }

    pub fn read_bool(&self, offset: usize) -> DuckBridgeResult<bool> {
        Ok(self.vector.data().read::<u8>(offset)? != 0)
    }
}

impl<'a> Decoder<'a> for BooleanReader<'a> {
    fn vector(&self) -> &ForeignVector<'a> {
        &self.vector
    }

    fn read_value(&self, offset: usize) -> DuckBridgeResult<Value> {
        Ok(Value::Boolean(self.read_bool(offset)?))
    }
}
