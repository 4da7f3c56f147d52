//! Error types for evlog-core

use thiserror::Error;

/// Errors raised while resolving fields, validating events or decoding configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A field name outside the registry
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// A log level name outside the fixed level set
    #[error("Unknown log level: {0}")]
    UnknownLevel(String),

    /// Event name was empty
    #[error("Event name must not be empty")]
    EmptyEventName,

    /// A timestamp string could not be parsed
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Configuration document could not be decoded
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CoreError {
    /// Create a new UnknownField error
    pub fn unknown_field(name: impl Into<String>) -> Self {
        Self::UnknownField(name.into())
    }

    /// Create a new InvalidConfig error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::InvalidConfig(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_field_error() {
        let err = CoreError::unknown_field("shoe_size");
        assert!(matches!(err, CoreError::UnknownField(_)));
        assert!(err.to_string().contains("shoe_size"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::InvalidConfig(_)));
    }
}
