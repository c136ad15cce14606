//! Custom error types for hostvault
//!
//! This module defines the error hierarchy for the vault using thiserror.
//! The first four variants are the kinds collaborators are expected to
//! branch on; the rest are ambient failures of the CLI and settings layer.

use thiserror::Error;

use crate::keystore::EnclaveError;

/// The main error type for hostvault operations
#[derive(Error, Debug)]
pub enum VaultError {
    /// Bad input lengths or types (a programming error, not bad data)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An interchange record or password record failed structural validation
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// GCM tag verification failed.
    ///
    /// Carries no detail: wrong password, tampered ciphertext,
    /// tampered tag and tampered IV are indistinguishable to the caller.
    #[error("Authentication failed: wrong password or tampered data")]
    AuthenticationFailure,

    /// Failure reported by the secure key custodian's backing enclave
    #[error("Enclave error: {0}")]
    Enclave(#[from] EnclaveError),

    /// The secure random source could not produce bytes
    #[error("Random source error: {0}")]
    Random(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),
}

impl VaultError {
    /// Create a "malformed record" error
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedRecord(detail.into())
    }

    /// Create an "invalid argument" error
    pub fn invalid_argument(detail: impl Into<String>) -> Self {
        Self::InvalidArgument(detail.into())
    }

    /// Check if this is an authentication failure
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, Self::AuthenticationFailure)
    }

    /// Check if this is a malformed-record error
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedRecord(_))
    }

    /// Check if this is an invalid-argument error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

impl From<std::io::Error> for VaultError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for hostvault operations
pub type VaultResult<T> = Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VaultError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_authentication_failure_carries_no_detail() {
        let err = VaultError::AuthenticationFailure;
        assert_eq!(
            err.to_string(),
            "Authentication failed: wrong password or tampered data"
        );
        assert!(err.is_authentication_failure());
        assert!(!err.is_malformed());
    }

    #[test]
    fn test_malformed_helper() {
        let err = VaultError::malformed("missing field `iv`");
        assert_eq!(err.to_string(), "Malformed record: missing field `iv`");
        assert!(err.is_malformed());
    }

    #[test]
    fn test_from_enclave_error() {
        let err: VaultError = EnclaveError::KeyNotFound("db".into()).into();
        assert!(matches!(err, VaultError::Enclave(EnclaveError::KeyNotFound(_))));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let vault_err: VaultError = io_err.into();
        assert!(matches!(vault_err, VaultError::Io(_)));
    }
}
