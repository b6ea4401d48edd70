use super::Decoder;
use crate::common::error::{DuckBridgeError, DuckBridgeResult};
use crate::types::{LogicalType, Value};
use crate::vector::string::read_string_bytes;
use crate::vector::ForeignVector;
use bytes::Bytes;

/// VARCHAR and BLOB over the 16-byte string header
#[derive(Debug)]
pub struct StringReader<'a> {
    vector: ForeignVector<'a>,
    is_blob: bool,
    strict_utf8: bool,
}

impl<'a> StringReader<'a> {
    pub fn new(vector: ForeignVector<'a>, strict_utf8: bool) -> Self {
        let is_blob = matches!(vector.logical_type(), LogicalType::Blob);
        Self {
            vector,
            is_blob,
            strict_utf8,
        }
    }

    pub fn is_blob(&self) -> bool {
        self.is_blob
    }

    /// Payload bytes, borrowed from the chunk
    pub fn read_bytes(&self, offset: usize) -> DuckBridgeResult<&'a [u8]> {
        read_string_bytes(self.vector.data(), offset)
    }

    pub fn read_blob(&self, offset: usize) -> DuckBridgeResult<Bytes> {
        Ok(Bytes::copy_from_slice(self.read_bytes(offset)?))
    }

    pub fn read_string(&self, offset: usize) -> DuckBridgeResult<String> {
        if self.is_blob {
            return Err(crate::type_mismatch_err!("Cannot read BLOB as String"));
        }
        let bytes = self.read_bytes(offset)?;
        if self.strict_utf8 {
            std::str::from_utf8(bytes)
                .map(str::to_string)
                .map_err(|e| DuckBridgeError::InvalidValue(format!("VARCHAR row {}: {}", offset, e)))
        } else {
            Ok(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

impl<'a> Decoder<'a> for StringReader<'a> {
    fn vector(&self) -> &ForeignVector<'a> {
        &self.vector
    }

    fn read_value(&self, offset: usize) -> DuckBridgeResult<Value> {
        if self.is_blob {
            Ok(Value::Blob(self.read_bytes(offset)?.to_vec()))
        } else {
            Ok(Value::Varchar(self.read_string(offset)?))
        }
    }
}
