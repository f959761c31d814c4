//! Attribute-based encryption of documents
//!
//! A `(department, level)` pair is compiled into an access policy, the policy
//! into a monotone span program, and the document is encrypted so that only a
//! set of attribute keys satisfying the program recovers it.
//!
//! Two interchangeable backends exist, selected per deployment by [`AbeMode`]:
//!
//! - [`single`] - one trusted authority with a master key pair
//! - [`multi`] - independent "department" and "level" authorities
//!
//! Both are used as a KEM: the policy protects a Gt session element which is
//! hashed into a ChaCha20-Poly1305 key for the payload, so a key set that does
//! not satisfy the policy yields an authentication failure, never plausible
//! garbage.

mod error;
mod msp;
pub mod multi;
mod service;
pub mod single;

pub use error::Error;
pub use msp::Msp;
pub use service::{
    AbeMode, AuthorityMaterial, DEPARTMENT_AUTHORITY, DocumentCiphertext, EncryptionService,
    LEVEL_AUTHORITY,
};
