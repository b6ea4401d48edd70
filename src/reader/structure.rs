use super::cache::TypeCache;
use super::{read_nested, Decoder, FromVector, VectorReader};
use crate::common::error::{DuckBridgeError, DuckBridgeResult};
use crate::types::Value;
use crate::vector::ForeignVector;
use std::sync::Arc;

/// Host record built from one struct row
pub trait FromStructRow: Sized + 'static {
    /// Declared field names, matched case-insensitively against the struct
    const FIELDS: &'static [&'static str];

    fn from_row(row: &StructRow<'_, '_>) -> DuckBridgeResult<Self>;
}

/// Declared record fields resolved against one struct shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructBinding {
    declared: &'static [&'static str],
    shape: Vec<String>,
    slots: Vec<Option<usize>>,
}

impl StructBinding {
    pub fn resolve(declared: &'static [&'static str], shape: &[String]) -> Self {
        let slots = declared
            .iter()
            .map(|name| shape.iter().position(|field| field.eq_ignore_ascii_case(name)))
            .collect();
        Self {
            declared,
            shape: shape.to_vec(),
            slots,
        }
    }

    /// Field names of the struct this binding was built for
    pub fn shape(&self) -> &[String] {
        &self.shape
    }

    /// Name of the declared field at `declared`
    pub fn declared_name(&self, declared: usize) -> Option<&'static str> {
        self.declared.get(declared).copied()
    }

    /// Child index of the declared field at `declared`
    pub fn slot(&self, declared: usize) -> Option<usize> {
        self.slots.get(declared).copied().flatten()
    }
}

/// Record read through a struct column
#[derive(Debug, Clone, PartialEq)]
pub struct Record<R>(pub R);

impl<R> Record<R> {
    pub fn into_inner(self) -> R {
        self.0
    }
}

/// One child reader per struct field
#[derive(Debug)]
pub struct StructReader<'a> {
    vector: ForeignVector<'a>,
    names: Vec<String>,
    children: Vec<VectorReader<'a>>,
    cache: Arc<TypeCache>,
}

impl<'a> StructReader<'a> {
    pub fn new(
        vector: ForeignVector<'a>,
        names: Vec<String>,
        children: Vec<VectorReader<'a>>,
        cache: Arc<TypeCache>,
    ) -> DuckBridgeResult<Self> {
        if names.len() != children.len() {
            return Err(DuckBridgeError::Internal(format!(
                "Struct with {} fields has {} child vectors",
                names.len(),
                children.len()
            )));
        }
        Ok(Self {
            vector,
            names,
            children,
            cache,
        })
    }

    pub fn field_names(&self) -> &[String] {
        &self.names
    }

    pub fn child(&self, index: usize) -> Option<&VectorReader<'a>> {
        self.children.get(index)
    }

    /// Child reader by case-insensitive field name
    pub fn child_by_name(&self, name: &str) -> Option<&VectorReader<'a>> {
        self.names
            .iter()
            .position(|field| field.eq_ignore_ascii_case(name))
            .and_then(|index| self.children.get(index))
    }

    /// Row accessor without a record binding
    pub fn row(&self, offset: usize) -> StructRow<'_, 'a> {
        StructRow {
            reader: self,
            offset,
            binding: None,
        }
    }

    pub fn read_record<R: FromStructRow>(&self, offset: usize) -> DuckBridgeResult<R> {
        let binding = self.cache.struct_binding::<R>(&self.names);
        R::from_row(&StructRow {
            reader: self,
            offset,
            binding: Some(binding),
        })
    }
}

impl<'a> Decoder<'a> for StructReader<'a> {
    fn vector(&self) -> &ForeignVector<'a> {
        &self.vector
    }

    fn read_value(&self, offset: usize) -> DuckBridgeResult<Value> {
        let fields = self
            .names
            .iter()
            .zip(&self.children)
            .map(|(name, child)| Ok((name.clone(), child.get_value(offset)?)))
            .collect::<DuckBridgeResult<Vec<_>>>()?;
        Ok(Value::Struct(fields))
    }
}

/// One row of a struct vector
#[derive(Debug)]
pub struct StructRow<'r, 'a> {
    reader: &'r StructReader<'a>,
    offset: usize,
    binding: Option<Arc<StructBinding>>,
}

impl<'r, 'a> StructRow<'r, 'a> {
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Read the declared field at position `declared` of the record's field
    /// list. A field the struct lacks reads as null when `T` accepts null.
    pub fn field<T: FromVector>(&self, declared: usize) -> DuckBridgeResult<T> {
        let binding = self.binding.as_ref().ok_or_else(|| {
            DuckBridgeError::Internal("Struct row read by position without a binding".to_string())
        })?;
        let name = binding.declared_name(declared).ok_or_else(|| {
            DuckBridgeError::OutOfBounds(format!("Record has no declared field {}", declared))
        })?;
        match binding.slot(declared) {
            Some(index) => self.read_child(index, name),
            None => T::from_null().ok_or_else(|| {
                crate::type_mismatch_err!(
                    "Struct({}) has no field '{}'",
                    self.reader.names.join(", "),
                    name
                )
            }),
        }
    }

    /// Read a field by case-insensitive name
    pub fn get<T: FromVector>(&self, name: &str) -> DuckBridgeResult<T> {
        let index = self
            .reader
            .names
            .iter()
            .position(|field| field.eq_ignore_ascii_case(name))
            .ok_or_else(|| crate::type_mismatch_err!("Struct has no field '{}'", name))?;
        self.read_child(index, name)
    }

    fn read_child<T: FromVector>(&self, index: usize, name: &str) -> DuckBridgeResult<T> {
        let child = &self.reader.children[index];
        read_nested(child, self.offset, || format!("field {}", name))
    }
}

impl<R: FromStructRow> FromVector for Record<R> {
    fn from_valid(reader: &VectorReader<'_>, offset: usize) -> DuckBridgeResult<Self> {
        match reader {
            VectorReader::Struct(r) => r.read_record::<R>(offset).map(Record),
            other => Err(super::mismatch::<R>(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_is_case_insensitive() {
        let shape = vec!["ID".to_string(), "Name".to_string()];
        let binding = StructBinding::resolve(&["name", "id", "email"], &shape);
        assert_eq!(binding.slot(0), Some(1));
        assert_eq!(binding.slot(1), Some(0));
        assert_eq!(binding.slot(2), None);
        assert_eq!(binding.declared_name(2), Some("email"));
        assert_eq!(binding.shape(), shape.as_slice());
    }
}
