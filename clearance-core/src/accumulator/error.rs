use crate::crypto::CryptoError;
use cosmian_crypto_core::CryptoCoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Curve setup or key derivation produced an unusable value
    #[error("curve error: {0}")]
    Curve(String),

    /// Group arithmetic failed for the supplied key material
    #[error("accumulator arithmetic failed: {0}")]
    Crypto(String),

    /// Encoded key, accumulator or witness bytes are malformed
    #[error("malformed accumulator data: {0}")]
    Deserialization(String),
}

impl From<CryptoCoreError> for Error {
    fn from(e: CryptoCoreError) -> Self {
        Self::Deserialization(e.to_string())
    }
}

impl From<CryptoError> for Error {
    fn from(e: CryptoError) -> Self {
        Self::Deserialization(e.to_string())
    }
}
