//! Unified error handling for dmimatch
//!
//! This crate provides the single error type used by the identity provider,
//! the settings layer and the CLI. Acquisition errors never escape the
//! identity store; they are logged there and turned into "unavailable".

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

/// Result type alias using DmiError
pub type Result<T> = std::result::Result<T, DmiError>;

/// Unified error type for all dmimatch operations
#[derive(thiserror::Error, Debug)]
pub enum DmiError {
    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: io::Error,
    },

    // ============================================================================
    // Identity Provider Errors
    // ============================================================================
    #[error("Failed to start identity provider {command}: {source}")]
    ProviderSpawn {
        command: String,
        source: io::Error,
    },

    #[error("Failed to read answer for {key}: {source}")]
    ProviderRead {
        key: String,
        source: io::Error,
    },

    #[error("Identity provider exited with {status} while querying {key}")]
    ProviderStatus {
        key: String,
        status: ExitStatus,
    },

    #[error("Identity provider timed out after {timeout:?} while querying {key}")]
    ProviderTimeout {
        key: String,
        timeout: Duration,
    },

    #[error("DMI attribute not found: {0}")]
    AttributeNotFound(PathBuf),

    #[error("Unknown identity key: {0}")]
    UnknownKey(String),

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig {
        field: String,
        reason: String,
    },
}

impl DmiError {
    /// Create a config error from a string
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid configuration value error
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a read error for the answer of one identity key
    pub fn provider_read(key: impl Into<String>, source: io::Error) -> Self {
        Self::ProviderRead {
            key: key.into(),
            source,
        }
    }

    /// Whether this error came from talking to the identity provider
    pub fn is_acquisition_failure(&self) -> bool {
        matches!(
            self,
            Self::ProviderSpawn { .. }
                | Self::ProviderRead { .. }
                | Self::ProviderStatus { .. }
                | Self::ProviderTimeout { .. }
                | Self::AttributeNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquisition_failure_classification() {
        let err = DmiError::provider_read(
            "system-version",
            io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"),
        );
        assert!(err.is_acquisition_failure());
        assert!(err.to_string().contains("system-version"));

        assert!(!DmiError::config("bad").is_acquisition_failure());
        assert!(!DmiError::UnknownKey("zz".into()).is_acquisition_failure());
    }

    #[test]
    fn test_json_error_conversion() {
        let parse: std::result::Result<u32, _> = serde_json::from_str("not json");
        let err: DmiError = parse.unwrap_err().into();
        assert!(matches!(err, DmiError::JsonParse(_)));
    }
}
