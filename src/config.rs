use crate::common::constants::{STANDARD_VECTOR_SIZE, VALIDITY_WORD_BITS};
use crate::common::error::{DuckBridgeError, DuckBridgeResult};

/// Environment variable overriding the appender's chunk capacity
pub const VECTOR_SIZE_ENV: &str = "DUCKBRIDGE_VECTOR_SIZE";

/// Environment variable holding the default log filter
pub const LOG_FILTER_ENV: &str = "DUCKBRIDGE_LOG";

/// Driver configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Rows per data chunk built by appenders
    pub vector_capacity: usize,
    /// Log filter used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Reject invalid UTF-8 in VARCHAR columns instead of replacing it
    pub strict_utf8: bool,
}

impl DriverConfig {
    pub fn with_vector_capacity(mut self, vector_capacity: usize) -> Self {
        self.vector_capacity = vector_capacity;
        self
    }

    pub fn with_log_filter(mut self, log_filter: impl Into<String>) -> Self {
        self.log_filter = log_filter.into();
        self
    }

    pub fn with_strict_utf8(mut self, strict_utf8: bool) -> Self {
        self.strict_utf8 = strict_utf8;
        self
    }

    /// Defaults overridden by `DUCKBRIDGE_VECTOR_SIZE` and `DUCKBRIDGE_LOG`
    pub fn from_env() -> DuckBridgeResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the variable names
    pub fn from_lookup<F>(lookup: F) -> DuckBridgeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(VECTOR_SIZE_ENV) {
            config.vector_capacity = raw.trim().parse().map_err(|_| {
                DuckBridgeError::InvalidArgument(format!(
                    "{} must be a positive integer, got '{}'",
                    VECTOR_SIZE_ENV, raw
                ))
            })?;
        }
        if let Some(filter) = lookup(LOG_FILTER_ENV) {
            config.log_filter = filter;
        }
        config.validate()?;
        Ok(config)
    }

    /// Check that chunks of this capacity keep validity words aligned
    pub fn validate(&self) -> DuckBridgeResult<()> {
        if self.vector_capacity == 0 || self.vector_capacity % VALIDITY_WORD_BITS != 0 {
            return Err(DuckBridgeError::InvalidArgument(format!(
                "Vector capacity must be a positive multiple of {}, got {}",
                VALIDITY_WORD_BITS, self.vector_capacity
            )));
        }
        Ok(())
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            vector_capacity: STANDARD_VECTOR_SIZE,
            log_filter: "info".to_string(),
            strict_utf8: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = DriverConfig::default();
        assert_eq!(config.vector_capacity, 2048);
        assert!(config.strict_utf8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_lookup_overrides() {
        let vars: HashMap<&str, &str> =
            [(VECTOR_SIZE_ENV, "128"), (LOG_FILTER_ENV, "duckbridge=trace")].into();
        let config = DriverConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.vector_capacity, 128);
        assert_eq!(config.log_filter, "duckbridge=trace");
    }

    #[test]
    fn test_capacity_validation() {
        for bad in ["0", "100", "abc"] {
            let result = DriverConfig::from_lookup(|key| {
                (key == VECTOR_SIZE_ENV).then(|| bad.to_string())
            });
            assert!(matches!(result, Err(DuckBridgeError::InvalidArgument(_))));
        }
    }
}
