use super::Decoder;
use crate::common::error::DuckBridgeResult;
use crate::types::hugeint::uuid_from_words;
use crate::types::Value;
use crate::vector::{FixedWidth, ForeignVector};
use uuid::Uuid;

/// UUIDs stored as hugeints with the top bit flipped
#[derive(Debug)]
pub struct UuidReader<'a> {
    vector: ForeignVector<'a>,
}

impl<'a> UuidReader<'a> {
    pub fn new(vector: ForeignVector<'a>) -> Self {
        Self { vector }
    }

    pub fn read_uuid(&self, offset: usize) -> DuckBridgeResult<Uuid> {
        let element = self.vector.data().element(offset)?;
        Ok(uuid_from_words(
            u64::decode(&element[0..8]),
            i64::decode(&element[8..16]),
        ))
    }
}

impl<'a> Decoder<'a> for UuidReader<'a> {
    fn vector(&self) -> &ForeignVector<'a> {
        &self.vector
    }

    fn read_value(&self, offset: usize) -> DuckBridgeResult<Value> {
        Ok(Value::Uuid(self.read_uuid(offset)?))
    }
}
