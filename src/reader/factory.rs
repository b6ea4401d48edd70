use super::cache::TypeCache;
use super::*;
use crate::common::error::{DuckBridgeError, DuckBridgeResult};
use crate::types::LogicalType;
use crate::vector::ForeignVector;
use std::sync::Arc;

/// Builds reader trees for vectors.
///
/// Every call returns an independent tree; the only state shared between
/// trees is the type cache handed in at construction.
#[derive(Debug, Clone)]
pub struct ReaderFactory {
    cache: Arc<TypeCache>,
    strict_utf8: bool,
}

impl ReaderFactory {
    pub fn new(cache: Arc<TypeCache>) -> Self {
        Self {
            cache,
            strict_utf8: true,
        }
    }

    /// Replace invalid UTF-8 instead of failing the read
    pub fn with_strict_utf8(mut self, strict_utf8: bool) -> Self {
        self.strict_utf8 = strict_utf8;
        self
    }

    pub fn cache(&self) -> &Arc<TypeCache> {
        &self.cache
    }

    /// Reader for `vector` and, recursively, all of its children
    pub fn create_reader<'a>(&self, vector: ForeignVector<'a>) -> DuckBridgeResult<VectorReader<'a>> {
        tracing::debug!(
            "creating reader for {} vector of {} rows",
            vector.logical_type(),
            vector.len()
        );
        self.build(vector)
    }

    fn build<'a>(&self, mut vector: ForeignVector<'a>) -> DuckBridgeResult<VectorReader<'a>> {
        let logical_type = vector.logical_type().clone();
        let reader = match &logical_type {
            LogicalType::Boolean => VectorReader::Boolean(BooleanReader::new(vector)),
            LogicalType::TinyInt
            | LogicalType::SmallInt
            | LogicalType::Integer
            | LogicalType::BigInt
            | LogicalType::UTinyInt
            | LogicalType::USmallInt
            | LogicalType::UInteger
            | LogicalType::UBigInt
            | LogicalType::Float
            | LogicalType::Double => VectorReader::Numeric(NumericReader::new(vector)),
            LogicalType::HugeInt | LogicalType::UHugeInt => {
                VectorReader::BigInteger(BigIntegerReader::new(vector))
            }
            LogicalType::VarInt => VectorReader::VarInt(VarIntReader::new(vector)),
            LogicalType::Decimal { .. } => VectorReader::Decimal(DecimalReader::new(vector)?),
            LogicalType::Date
            | LogicalType::Time
            | LogicalType::TimeTz
            | LogicalType::Timestamp
            | LogicalType::TimestampS
            | LogicalType::TimestampMs
            | LogicalType::TimestampNs
            | LogicalType::TimestampTz => VectorReader::Temporal(TemporalReader::new(vector)?),
            LogicalType::Interval => VectorReader::Interval(IntervalReader::new(vector)),
            LogicalType::Varchar | LogicalType::Blob => {
                VectorReader::String(StringReader::new(vector, self.strict_utf8))
            }
            LogicalType::Uuid => VectorReader::Uuid(UuidReader::new(vector)),
            LogicalType::Enum(_) => {
                VectorReader::Enum(EnumReader::new(vector, Arc::clone(&self.cache))?)
            }
            LogicalType::List(_) | LogicalType::Array { .. } => {
                let child = self.single_child(&mut vector)?;
                VectorReader::List(ListReader::new(vector, child))
            }
            LogicalType::Map { .. } => {
                let child = self.single_child(&mut vector)?;
                VectorReader::Map(MapReader::new(vector, child)?)
            }
            LogicalType::Struct(fields) => {
                let children = vector.take_children();
                if children.len() != fields.len() {
                    return Err(DuckBridgeError::Engine(format!(
                        "{} vector has {} children",
                        logical_type,
                        children.len()
                    )));
                }
                let names = fields.iter().map(|(name, _)| name.clone()).collect();
                let readers = children
                    .into_iter()
                    .map(|child| self.build(child))
                    .collect::<DuckBridgeResult<Vec<_>>>()?;
                VectorReader::Struct(StructReader::new(
                    vector,
                    names,
                    readers,
                    Arc::clone(&self.cache),
                )?)
            }
        };
        Ok(reader)
    }

    fn single_child<'a>(&self, vector: &mut ForeignVector<'a>) -> DuckBridgeResult<VectorReader<'a>> {
        let mut children = vector.take_children();
        if children.len() != 1 {
            return Err(DuckBridgeError::Engine(format!(
                "{} vector has {} children",
                vector.logical_type(),
                children.len()
            )));
        }
        let child = children.remove(0);
        if let LogicalType::Array { size, .. } = vector.logical_type() {
            let expected = vector.len().saturating_mul(*size);
            if child.len() < expected {
                tracing::warn!(
                    "array child holds {} rows, {} expected",
                    child.len(),
                    expected
                );
            }
        }
        tracing::trace!("building child reader for {}", child.logical_type());
        self.build(child)
    }
}
