//! Unified error types for the crypto module.

use cosmian_crypto_core::CryptoCoreError;
use thiserror::Error;

/// Errors that can occur during low-level cryptographic operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Invalid point on the G1 curve
    #[error("invalid G1 point")]
    InvalidG1Point,

    /// Invalid point on the G2 curve
    #[error("invalid G2 point")]
    InvalidG2Point,

    /// Invalid target group element
    #[error("invalid Gt element")]
    InvalidGtElement,

    /// Invalid scalar value
    #[error("invalid scalar: {0}")]
    InvalidScalar(String),

    /// Authenticated decryption of a payload failed
    #[error("authenticated decryption failed")]
    DecryptionFailed,

    /// Authenticated encryption of a payload failed
    #[error("authenticated encryption failed")]
    EncryptionFailed,

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    SerializationError(String),
}

impl From<CryptoCoreError> for CryptoError {
    fn from(e: CryptoCoreError) -> Self {
        CryptoError::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for CryptoError {
    fn from(e: std::io::Error) -> Self {
        CryptoError::SerializationError(e.to_string())
    }
}
