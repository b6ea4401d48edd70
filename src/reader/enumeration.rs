use super::cache::TypeCache;
use super::{Decoder, FromVector, VectorReader};
use crate::common::error::{DuckBridgeError, DuckBridgeResult};
use crate::types::{EnumDictionary, LogicalType, PhysicalType, Value};
use crate::vector::ForeignVector;
use parking_lot::Mutex;
use std::any::TypeId;
use std::sync::Arc;

/// Host enumeration that enum columns can be read into.
///
/// Dictionary entries match variants by case-insensitive name, or by ordinal
/// when the entry is a decimal number.
pub trait HostEnum: Copy + 'static {
    /// Variants with their names, in ordinal order
    const VARIANTS: &'static [(&'static str, Self)];
}

/// Dictionary position to variant index, for one host enum and dictionary
#[derive(Debug)]
pub struct EnumMapping {
    variants: Vec<Option<usize>>,
}

impl EnumMapping {
    pub fn resolve<E: HostEnum>(dictionary: &EnumDictionary) -> Self {
        let variants = dictionary
            .values()
            .iter()
            .map(|entry| {
                E::VARIANTS
                    .iter()
                    .position(|(name, _)| name.eq_ignore_ascii_case(entry))
                    .or_else(|| {
                        entry
                            .trim()
                            .parse::<usize>()
                            .ok()
                            .filter(|ordinal| *ordinal < E::VARIANTS.len())
                    })
            })
            .collect();
        Self { variants }
    }

    /// Variant index for a dictionary position, if the entry maps
    pub fn variant(&self, index: usize) -> Option<usize> {
        self.variants.get(index).copied().flatten()
    }
}

/// Host enum value read from an enum column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumValue<E>(pub E);

impl<E> EnumValue<E> {
    pub fn into_inner(self) -> E {
        self.0
    }
}

/// Dictionary indices of u8, u16 or u32 width
#[derive(Debug)]
pub struct EnumReader<'a> {
    vector: ForeignVector<'a>,
    dictionary: EnumDictionary,
    physical: PhysicalType,
    cache: Arc<TypeCache>,
    // last mapping handed out, so rows skip the dictionary-keyed lookup
    mapping: Mutex<Option<(TypeId, Arc<EnumMapping>)>>,
}

impl<'a> EnumReader<'a> {
    pub fn new(vector: ForeignVector<'a>, cache: Arc<TypeCache>) -> DuckBridgeResult<Self> {
        let dictionary = match vector.logical_type() {
            LogicalType::Enum(dictionary) => dictionary.clone(),
            other => {
                return Err(DuckBridgeError::Internal(format!(
                    "Enum reader over {}",
                    other
                )))
            }
        };
        let physical = vector.logical_type().physical_type();
        Ok(Self {
            vector,
            dictionary,
            physical,
            cache,
            mapping: Mutex::new(None),
        })
    }

    pub fn dictionary(&self) -> &EnumDictionary {
        &self.dictionary
    }

    /// Dictionary position of a row
    pub fn read_index(&self, offset: usize) -> DuckBridgeResult<usize> {
        let data = self.vector.data();
        let index = match self.physical {
            PhysicalType::UInt8 => usize::from(data.read::<u8>(offset)?),
            PhysicalType::UInt16 => usize::from(data.read::<u16>(offset)?),
            _ => data.read::<u32>(offset)? as usize,
        };
        if index >= self.dictionary.len() {
            return Err(DuckBridgeError::InvalidValue(format!(
                "Enum index {} outside a dictionary of {} entries",
                index,
                self.dictionary.len()
            )));
        }
        Ok(index)
    }

    pub fn read_name(&self, offset: usize) -> DuckBridgeResult<&str> {
        let index = self.read_index(offset)?;
        self.dictionary.get(index).ok_or_else(|| {
            DuckBridgeError::InvalidValue(format!("Enum index {} has no entry", index))
        })
    }

    fn mapping_for<E: HostEnum>(&self) -> Arc<EnumMapping> {
        let mut last = self.mapping.lock();
        if let Some((host, mapping)) = last.as_ref() {
            if *host == TypeId::of::<E>() {
                return Arc::clone(mapping);
            }
        }
        let mapping = self.cache.enum_mapping::<E>(&self.dictionary);
        *last = Some((TypeId::of::<E>(), Arc::clone(&mapping)));
        mapping
    }

    pub fn read_host<E: HostEnum>(&self, offset: usize) -> DuckBridgeResult<E> {
        let index = self.read_index(offset)?;
        self.mapping_for::<E>()
            .variant(index)
            .map(|variant| E::VARIANTS[variant].1)
            .ok_or_else(|| {
                DuckBridgeError::InvalidValue(format!(
                    "'{}' is not a variant of {}",
                    self.dictionary.get(index).unwrap_or_default(),
                    std::any::type_name::<E>()
                ))
            })
    }
}

impl<'a> Decoder<'a> for EnumReader<'a> {
    fn vector(&self) -> &ForeignVector<'a> {
        &self.vector
    }

    fn read_value(&self, offset: usize) -> DuckBridgeResult<Value> {
        Ok(Value::Enum(self.read_name(offset)?.to_string()))
    }
}

impl<E: HostEnum> FromVector for EnumValue<E> {
    fn from_valid(reader: &VectorReader<'_>, offset: usize) -> DuckBridgeResult<Self> {
        match reader {
            VectorReader::Enum(r) => r.read_host::<E>(offset).map(EnumValue),
            other => Err(super::mismatch::<E>(other)),
        }
    }
}
