use crate::{crypto::CryptoError, policy};
use cosmian_crypto_core::CryptoCoreError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The presented attribute keys do not satisfy the ciphertext policy.
    ///
    /// Deliberately carries no detail about which attribute was missing.
    #[error("insufficient privilege: policy not satisfied")]
    PolicyNotSatisfied,

    #[error(transparent)]
    Policy(#[from] policy::Error),

    /// An authority was asked about an attribute it does not manage
    #[error("attribute {0} is not managed by this authority")]
    UnknownAttribute(String),

    /// No public key was supplied for an attribute the policy mentions
    #[error("missing public key for attribute {0}")]
    MissingPublicKey(String),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Encoded ciphertext or authority material is malformed
    #[error("malformed ABE data: {0}")]
    Deserialization(String),

    /// A mutex lock was poisoned (another thread panicked while holding the lock)
    #[error("mutex lock poisoned")]
    MutexPoisoned,
}

impl From<CryptoCoreError> for Error {
    fn from(e: CryptoCoreError) -> Self {
        Self::Deserialization(e.to_string())
    }
}
