use crate::common::constants::VALIDITY_WORD_BITS;

/// Read-only view over a vector's validity words.
///
/// Bit `offset % 64` of word `offset / 64` is set when the row holds a value.
/// A vector without a validity buffer has no nulls at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidityMask<'a> {
    words: Option<&'a [u64]>,
}

impl<'a> ValidityMask<'a> {
    /// Mask of a vector that never allocated validity
    pub const fn all_valid() -> Self {
        Self { words: None }
    }

    pub const fn from_words(words: &'a [u64]) -> Self {
        Self { words: Some(words) }
    }

    /// View a validity buffer handed out by the engine.
    ///
    /// # Safety
    /// A non-null `ptr` must point to at least `validity_words(rows)` words that
    /// stay valid and unmodified for `'a`.
    pub unsafe fn from_raw(ptr: *const u64, rows: usize) -> Self {
        if ptr.is_null() {
            Self::all_valid()
        } else {
            Self::from_words(std::slice::from_raw_parts(ptr, validity_words(rows)))
        }
    }

    pub fn has_buffer(&self) -> bool {
        self.words.is_some()
    }

    pub fn words(&self) -> Option<&'a [u64]> {
        self.words
    }

    #[inline]
    pub fn is_valid(&self, offset: usize) -> bool {
        match self.words {
            None => true,
            Some(words) => words
                .get(offset / VALIDITY_WORD_BITS)
                .is_some_and(|word| word & (1u64 << (offset % VALIDITY_WORD_BITS)) != 0),
        }
    }

    /// Number of null rows among the first `rows`
    pub fn null_count(&self, rows: usize) -> usize {
        match self.words {
            None => 0,
            Some(_) => (0..rows).filter(|offset| !self.is_valid(*offset)).count(),
        }
    }
}

/// Words needed to cover `rows` validity bits
pub const fn validity_words(rows: usize) -> usize {
    rows.div_ceil(VALIDITY_WORD_BITS)
}

/// Mark a row as null
#[inline]
pub fn set_invalid(words: &mut [u64], offset: usize) {
    if let Some(word) = words.get_mut(offset / VALIDITY_WORD_BITS) {
        *word &= !(1u64 << (offset % VALIDITY_WORD_BITS));
    }
}

/// Mark a row as holding a value
#[inline]
pub fn set_valid(words: &mut [u64], offset: usize) {
    if let Some(word) = words.get_mut(offset / VALIDITY_WORD_BITS) {
        *word |= 1u64 << (offset % VALIDITY_WORD_BITS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_buffer_is_all_valid() {
        let mask = ValidityMask::all_valid();
        assert!(mask.is_valid(0));
        assert!(mask.is_valid(1_000_000));
        assert_eq!(mask.null_count(2048), 0);
    }

    #[test]
    fn test_bit_addressing() {
        let mut words = vec![u64::MAX; validity_words(130)];
        assert_eq!(words.len(), 3);
        set_invalid(&mut words, 0);
        set_invalid(&mut words, 63);
        set_invalid(&mut words, 64);
        set_invalid(&mut words, 129);
        let mask = ValidityMask::from_words(&words);
        assert!(!mask.is_valid(0));
        assert!(mask.is_valid(1));
        assert!(!mask.is_valid(63));
        assert!(!mask.is_valid(64));
        assert!(mask.is_valid(65));
        assert!(!mask.is_valid(129));
        assert_eq!(mask.null_count(130), 4);
    }

    #[test]
    fn test_set_valid_restores_bit() {
        let mut words = vec![0u64; 1];
        set_valid(&mut words, 5);
        assert_eq!(words[0], 1 << 5);
        // beyond the buffer is ignored on write and null on read
        set_valid(&mut words, 64);
        assert!(!ValidityMask::from_words(&words).is_valid(64));
    }
}
