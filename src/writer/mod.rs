//! Write side: encoding host values into data chunk vectors and the
//! row-oriented appender built on top of it

pub mod appender;
pub mod vector_writer;

pub use appender::{Appender, AppenderRow};
pub use vector_writer::VectorWriter;
