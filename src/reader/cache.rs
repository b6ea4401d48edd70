use super::enumeration::{EnumMapping, HostEnum};
use super::structure::{FromStructRow, StructBinding};
use crate::types::EnumDictionary;
use parking_lot::RwLock;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

/// Resolved host-type mappings shared by every reader built from one factory.
///
/// Struct bindings are keyed by record type and struct shape, enum mappings
/// by host enum type and dictionary contents. Entries stay until `clear()`.
#[derive(Debug, Default)]
pub struct TypeCache {
    struct_bindings: RwLock<HashMap<TypeId, Vec<Arc<StructBinding>>>>,
    enum_mappings: RwLock<HashMap<(TypeId, EnumDictionary), Arc<EnumMapping>>>,
}

impl TypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binding of `R`'s declared fields onto a struct with the given field names
    pub fn struct_binding<R: FromStructRow>(&self, shape: &[String]) -> Arc<StructBinding> {
        let key = TypeId::of::<R>();
        if let Some(found) = self
            .struct_bindings
            .read()
            .get(&key)
            .and_then(|bindings| bindings.iter().find(|b| b.shape() == shape))
        {
            return Arc::clone(found);
        }

        let binding = Arc::new(StructBinding::resolve(R::FIELDS, shape));
        tracing::debug!(
            "bound {} onto struct({})",
            std::any::type_name::<R>(),
            shape.join(", ")
        );
        let mut bindings = self.struct_bindings.write();
        let entry = bindings.entry(key).or_default();
        match entry.iter().find(|b| b.shape() == shape) {
            Some(raced) => Arc::clone(raced),
            None => {
                entry.push(Arc::clone(&binding));
                binding
            }
        }
    }

    /// Mapping from dictionary positions to `E`'s variants
    pub fn enum_mapping<E: HostEnum>(&self, dictionary: &EnumDictionary) -> Arc<EnumMapping> {
        let key = (TypeId::of::<E>(), dictionary.clone());
        if let Some(found) = self.enum_mappings.read().get(&key) {
            return Arc::clone(found);
        }
        let mapping = Arc::new(EnumMapping::resolve::<E>(dictionary));
        tracing::debug!(
            "mapped {} dictionary entries onto {}",
            dictionary.len(),
            std::any::type_name::<E>()
        );
        Arc::clone(self.enum_mappings.write().entry(key).or_insert(mapping))
    }

    /// Drop every cached mapping
    pub fn clear(&self) {
        self.struct_bindings.write().clear();
        self.enum_mappings.write().clear();
    }

    /// Number of cached mappings
    pub fn len(&self) -> usize {
        let bindings: usize = self.struct_bindings.read().values().map(Vec::len).sum();
        bindings + self.enum_mappings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::DuckBridgeResult;
    use crate::reader::StructRow;

    struct Pair;

    impl FromStructRow for Pair {
        const FIELDS: &'static [&'static str] = &["a", "b"];

        fn from_row(_row: &StructRow<'_, '_>) -> DuckBridgeResult<Self> {
            Ok(Pair)
        }
    }

    #[derive(Clone, Copy)]
    enum Side {
        Left,
    }

    impl HostEnum for Side {
        const VARIANTS: &'static [(&'static str, Self)] = &[("left", Side::Left)];
    }

    #[test]
    fn test_bindings_are_shared_per_shape() {
        let cache = TypeCache::new();
        let ab = vec!["A".to_string(), "B".to_string()];
        let ba = vec!["b".to_string(), "a".to_string()];
        let first = cache.struct_binding::<Pair>(&ab);
        let again = cache.struct_binding::<Pair>(&ab);
        assert!(Arc::ptr_eq(&first, &again));
        let other = cache.struct_binding::<Pair>(&ba);
        assert_eq!(other.slot(0), Some(1));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_equal_dictionaries_share_a_mapping() {
        let cache = TypeCache::new();
        let dictionary = EnumDictionary::new(["LEFT"]);
        let first = cache.enum_mapping::<Side>(&dictionary);
        // every chunk decodes its own copy of the same dictionary
        for _ in 0..100 {
            let again = cache.enum_mapping::<Side>(&EnumDictionary::new(["LEFT"]));
            assert!(Arc::ptr_eq(&first, &again));
        }
        assert_eq!(cache.len(), 1);
        cache.enum_mapping::<Side>(&EnumDictionary::new(["LEFT", "RIGHT"]));
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }
}
