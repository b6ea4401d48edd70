use super::{read_nested, Decoder, FromVector, VectorReader};
use crate::common::error::{DuckBridgeError, DuckBridgeResult};
use crate::types::{LogicalType, Value};
use crate::vector::{FixedWidth, ForeignVector};

/// LIST (offset, length entries) and fixed-size ARRAY over one child vector
#[derive(Debug)]
pub struct ListReader<'a> {
    vector: ForeignVector<'a>,
    child: Box<VectorReader<'a>>,
    array_size: Option<usize>,
}

impl<'a> ListReader<'a> {
    pub fn new(vector: ForeignVector<'a>, child: VectorReader<'a>) -> Self {
        let array_size = match vector.logical_type() {
            LogicalType::Array { size, .. } => Some(*size),
            _ => None,
        };
        Self {
            vector,
            child: Box::new(child),
            array_size,
        }
    }

    pub fn child(&self) -> &VectorReader<'a> {
        &self.child
    }

    /// (first child row, element count) of a row, checked against the child
    pub fn span(&self, offset: usize) -> DuckBridgeResult<(usize, usize)> {
        let (start, len) = match self.array_size {
            Some(size) => (offset.checked_mul(size), size),
            None => {
                let entry = self.vector.data().element(offset)?;
                let start = u64::decode(&entry[0..8]);
                let len = u64::decode(&entry[8..16]);
                (
                    usize::try_from(start).ok(),
                    usize::try_from(len).unwrap_or(usize::MAX),
                )
            }
        };
        let end = start.and_then(|start| start.checked_add(len));
        match (start, end) {
            (Some(start), Some(end)) if end <= self.child.len() => Ok((start, len)),
            _ => Err(DuckBridgeError::OutOfBounds(format!(
                "Row {} spans {} elements past a child of {} rows",
                offset,
                len,
                self.child.len()
            ))),
        }
    }

    /// Elements of a row; nulls only where `T` accepts them
    pub fn read_vec<T: FromVector>(&self, offset: usize) -> DuckBridgeResult<Vec<T>> {
        let (start, len) = self.span(offset)?;
        (0..len)
            .map(|i| read_nested(&self.child, start + i, || format!("list element {}", i)))
            .collect()
    }
}

impl<'a> Decoder<'a> for ListReader<'a> {
    fn vector(&self) -> &ForeignVector<'a> {
        &self.vector
    }

    fn read_value(&self, offset: usize) -> DuckBridgeResult<Value> {
        let (start, len) = self.span(offset)?;
        let values = (start..start + len)
            .map(|position| self.child.get_value(position))
            .collect::<DuckBridgeResult<Vec<_>>>()?;
        Ok(Value::List(values))
    }
}
