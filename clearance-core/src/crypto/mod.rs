//! Cryptographic building blocks
//!
//! Everything above this module speaks in terms of accumulators, witnesses,
//! policies and ciphertexts; this is where those reduce to BLS12-381 group
//! operations.
//!
//! # Components
//!
//! - [`pairing`] - the bilinear pairing, scalar sampling, fixed-size encodings
//! - [`hash`] - domain-separated hash-to-scalar, hash-to-G1 and Gt key derivation
//! - [`dem`] - ChaCha20-Poly1305 payload encryption keyed from a Gt element

pub mod dem;
pub mod error;
pub mod hash;
pub mod pairing;

pub use dem::{AE, ChaChaDem, DEM_KEY_LENGTH};
pub use error::CryptoError;
pub use hash::{derive_session_key, hash_to_g1, hash_to_scalar};
pub use pairing::{G1Projective, G2Projective, Gt, Scalar, pairing, random_scalar};
