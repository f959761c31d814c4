//! # Clearance Core
//!
//! Clearance-level and department access control for encrypted documents.
//!
//! Two independent mechanisms guard every document:
//!
//! - **Dual-accumulator authorization**: each security level and each
//!   department owns a pairing-based accumulator. A requester holds one
//!   membership witness per dimension and is admitted only if both verify.
//! - **Attribute-based encryption**: a `(department, level)` pair compiles
//!   into a monotone access policy and documents are encrypted under it, so
//!   only matching attribute keys recover the plaintext.
//!
//! # Quick Start
//!
//! ```ignore
//! use clearance_core::prelude::*;
//!
//! let config = ClearanceConfiguration::from_file("clearance.json")?;
//! let gateway = DocumentGateway::new(Arc::new(MemoryAccumulatorStore::new()), &config)?;
//!
//! let witness = gateway.enroll(b"alice", 3, Department(1)).await?;
//! let doc = gateway.store_document(3, Department(1), &witness, b"memo").await?;
//! let memo = gateway.read_document(3, Department(1), &witness, &doc).await?;
//! ```
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        DocumentGateway                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────────┐        ┌──────────────────────┐       │
//! │  │    Authorization     │        │  Encryption Service  │       │
//! │  │  enroll / verify /   │        │  compile → MSP →     │       │
//! │  │  revoke / refresh    │        │  single | multi ABE  │       │
//! │  └──────────┬───────────┘        └──────────┬───────────┘       │
//! │             │                               │                   │
//! │  ┌──────────┴───────────┐        ┌──────────┴───────────┐       │
//! │  │  Accumulator Engine  │        │   Policy Compiler    │       │
//! │  │  + AccumulatorStore  │        │   levels / depts     │       │
//! │  └──────────┬───────────┘        └──────────────────────┘       │
//! │             │                                                   │
//! │  ┌──────────┴────────────────────────────────────────────┐      │
//! │  │                     Crypto Layer                      │      │
//! │  │   BLS12-381 pairings · hash-to-curve · ChaCha20 DEM   │      │
//! │  └───────────────────────────────────────────────────────┘      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Security Considerations
//!
//! - BLS12-381 provides 128-bit classical security and is not post-quantum
//!   secure
//! - Every accumulator mutation invalidates outstanding witnesses for it;
//!   holders must refresh
//! - Authority material returned with a document contains secret keys and
//!   must be stored with the same care as the keys themselves

/// Pairing-based dynamic accumulator
pub mod accumulator;

/// Policy-driven attribute-based encryption (single and multi-authority)
pub mod abe;

/// Dual-accumulator enrollment, verification and revocation
pub mod authorization;

/// Deployment configuration
pub mod configuration;

/// BLS12-381 helpers, hashing and the payload DEM
pub mod crypto;

/// Boundary facade
pub mod gateway;

/// Security levels, departments and access policies
pub mod policy;

/// Accumulator persistence
pub mod storage;

/// Re-exported logging macros from tracing
pub mod log {
    pub use tracing::{debug, error, info, trace, warn};
}

/// Prelude module for convenient imports.
///
/// ```ignore
/// use clearance_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        abe::{AbeMode, EncryptionService},
        authorization::{AuthorizationService, AuthzError, DualWitness},
        configuration::ClearanceConfiguration,
        gateway::{DocumentGateway, GatewayError, SealedDocument},
        policy::{AccessPolicy, Department, LevelHierarchy, LevelOrdering, SecurityLevel},
        storage::{AccumulatorStore, DirectoryAccumulatorStore, MemoryAccumulatorStore},
    };
    pub use std::sync::Arc;
}
