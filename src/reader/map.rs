use super::list::ListReader;
use super::{read_nested, Decoder, FromVector, VectorReader};
use crate::common::error::{DuckBridgeError, DuckBridgeResult};
use crate::types::Value;
use crate::vector::ForeignVector;

/// MAP as a list of (key, value) structs
#[derive(Debug)]
pub struct MapReader<'a> {
    entries: ListReader<'a>,
}

impl<'a> MapReader<'a> {
    pub fn new(vector: ForeignVector<'a>, child: VectorReader<'a>) -> DuckBridgeResult<Self> {
        match &child {
            VectorReader::Struct(entry) if entry.field_names().len() == 2 => {}
            other => {
                return Err(DuckBridgeError::Internal(format!(
                    "Map child must be a (key, value) struct, got {}",
                    other.logical_type()
                )))
            }
        }
        Ok(Self {
            entries: ListReader::new(vector, child),
        })
    }

    fn key_value(&self) -> DuckBridgeResult<(&VectorReader<'a>, &VectorReader<'a>)> {
        match self.entries.child() {
            VectorReader::Struct(entry) => match (entry.child(0), entry.child(1)) {
                (Some(key), Some(value)) => Ok((key, value)),
                _ => Err(DuckBridgeError::Internal("Map entry lost a child".to_string())),
            },
            _ => Err(DuckBridgeError::Internal("Map entry is not a struct".to_string())),
        }
    }

    /// Entries of a row in stored order
    pub fn read_entries<K, V>(&self, offset: usize) -> DuckBridgeResult<Vec<(K, V)>>
    where
        K: FromVector,
        V: FromVector,
    {
        let (keys, values) = self.key_value()?;
        let (start, len) = self.entries.span(offset)?;
        (0..len)
            .map(|i| {
                let position = start + i;
                let key = read_nested(keys, position, || format!("map key {}", i))?;
                let value = read_nested(values, position, || format!("map value {}", i))?;
                Ok((key, value))
            })
            .collect()
    }
}

impl<'a> Decoder<'a> for MapReader<'a> {
    fn vector(&self) -> &ForeignVector<'a> {
        self.entries.vector()
    }

    fn read_value(&self, offset: usize) -> DuckBridgeResult<Value> {
        let (keys, values) = self.key_value()?;
        let (start, len) = self.entries.span(offset)?;
        let entries = (start..start + len)
            .map(|position| Ok((keys.get_value(position)?, values.get_value(position)?)))
            .collect::<DuckBridgeResult<Vec<_>>>()?;
        Ok(Value::Map(entries))
    }
}
