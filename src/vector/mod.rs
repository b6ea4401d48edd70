//! Views over the engine's vector memory: data buffers, validity and the
//! string header layout

pub mod foreign;
pub mod string;
pub mod validity;

pub use foreign::{FixedWidth, ForeignBuffer, ForeignVector};
pub use validity::{set_invalid, set_valid, validity_words, ValidityMask};
