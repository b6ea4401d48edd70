//! Error handling for the marshaling layer

use thiserror::Error;

/// Main error type for vector reads, writes and appender rows
#[derive(Error, Debug)]
pub enum DuckBridgeError {
    /// Requested host type is incompatible with the physical or declared type
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// A null was read into, or appended where, a non-nullable target sits
    #[error("Null value is not allowed for {target}")]
    NullViolation { target: String },

    /// Numeric or temporal conversion exceeds the target range
    #[error("Overflow: {0}")]
    Overflow(String),

    /// Appender row ended with too few or too many columns
    #[error("Row protocol violation: {0}")]
    RowProtocol(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Out of bounds: {0}")]
    OutOfBounds(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DuckBridgeError {
    /// Null violation for the given target description
    pub fn null_violation(target: impl Into<String>) -> Self {
        DuckBridgeError::NullViolation {
            target: target.into(),
        }
    }

    /// Prefix the target of a null violation with an outer location, leaving
    /// other errors untouched
    pub fn within(self, outer: &str) -> Self {
        match self {
            DuckBridgeError::NullViolation { target } => DuckBridgeError::NullViolation {
                target: format!("{} of {}", target, outer),
            },
            other => other,
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, DuckBridgeError>;

/// Result type alias for duckbridge operations (alias for Result)
pub type DuckBridgeResult<T> = std::result::Result<T, DuckBridgeError>;

/// Macro for creating type mismatch errors
#[macro_export]
macro_rules! type_mismatch_err {
    ($msg:expr) => {
        $crate::common::error::DuckBridgeError::TypeMismatch($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::common::error::DuckBridgeError::TypeMismatch(format!($fmt, $($arg)*))
    };
}

/// Macro for creating overflow errors
#[macro_export]
macro_rules! overflow_err {
    ($msg:expr) => {
        $crate::common::error::DuckBridgeError::Overflow($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::common::error::DuckBridgeError::Overflow(format!($fmt, $($arg)*))
    };
}

/// Macro for creating not implemented errors
#[macro_export]
macro_rules! not_implemented_err {
    ($msg:expr) => {
        $crate::common::error::DuckBridgeError::NotImplemented($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::common::error::DuckBridgeError::NotImplemented(format!($fmt, $($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_violation_nesting() {
        let err = DuckBridgeError::null_violation("list element 2").within("column 'tags'");
        assert_eq!(
            err.to_string(),
            "Null value is not allowed for list element 2 of column 'tags'"
        );
    }

    #[test]
    fn test_macros() {
        let err = type_mismatch_err!("cannot read {} as {}", "VARCHAR", "i32");
        assert!(matches!(err, DuckBridgeError::TypeMismatch(ref m) if m == "cannot read VARCHAR as i32"));
        let err = overflow_err!("too big");
        assert!(matches!(err, DuckBridgeError::Overflow(_)));
    }
}
